//! Camera transform between model space and screen space.
//!
//! `screen = center + model * scale + pan`, where `center` is the middle of
//! the canvas. The pan offset is a screen-space translation applied after
//! scaling, so panning is unaffected by zoom.

use super::model::{GraphNode, Point};

/// Smallest allowed zoom factor.
pub const MIN_SCALE: f64 = 0.5;
/// Largest allowed zoom factor.
pub const MAX_SCALE: f64 = 3.0;
/// Zoom-to-fit never zooms in further than this.
pub const FIT_MAX_SCALE: f64 = 2.0;

/// Scale and pan offset for one graph session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	scale: f64,
	pan: Point,
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			scale: 1.0,
			pan: Point::ORIGIN,
		}
	}
}

impl Viewport {
	pub fn new() -> Self {
		Self::default()
	}

	/// Current zoom factor, always within `[MIN_SCALE, MAX_SCALE]`.
	pub fn scale(&self) -> f64 {
		self.scale
	}

	/// Screen-space translation applied after scaling.
	pub fn pan_offset(&self) -> Point {
		self.pan
	}

	/// Saturates into `[MIN_SCALE, MAX_SCALE]`. NaN is ignored.
	pub fn set_scale(&mut self, scale: f64) {
		if scale.is_nan() {
			return;
		}
		self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
	}

	/// Unclamped; panning far away is recovered with reset or zoom-to-fit.
	pub fn set_pan_offset(&mut self, pan: Point) {
		if pan.is_finite() {
			self.pan = pan;
		}
	}

	pub fn pan_by(&mut self, delta: Point) {
		self.set_pan_offset(self.pan + delta);
	}

	/// Multiplies the scale by `factor`, keeping the model point under
	/// `anchor` (screen space) fixed on screen.
	pub fn zoom_at(&mut self, factor: f64, anchor: Point, center: Point) {
		if !(factor.is_finite() && factor > 0.0) {
			return;
		}
		let pinned = self.to_model(anchor, center);
		let before = self.scale;
		self.set_scale(self.scale * factor);
		if self.scale == before {
			return;
		}
		let moved = self.to_screen(pinned, center);
		self.pan_by(anchor - moved);
	}

	pub fn to_screen(&self, model: Point, center: Point) -> Point {
		center + model * self.scale + self.pan
	}

	pub fn to_model(&self, screen: Point, center: Point) -> Point {
		(screen - center - self.pan) / self.scale
	}

	pub fn reset_view(&mut self) {
		*self = Self::default();
	}

	/// Scales and pans so the bounding box of `nodes` fills `fit_target`
	/// screen units, centered on the canvas. A no-op for an empty set or a
	/// box with no extent on either axis.
	pub fn zoom_to_fit(&mut self, nodes: &[GraphNode], fit_target: f64) {
		let mut positions = nodes.iter().map(|n| n.position).filter(|p| p.is_finite());
		let Some(first) = positions.next() else {
			return;
		};
		let (min, max) = positions.fold((first, first), |(min, max), p| {
			(
				Point::new(min.x.min(p.x), min.y.min(p.y)),
				Point::new(max.x.max(p.x), max.y.max(p.y)),
			)
		});

		let extent = (max.x - min.x).max(max.y - min.y);
		if extent <= 0.0 || !(fit_target.is_finite() && fit_target > 0.0) {
			return;
		}

		self.set_scale((fit_target / extent).min(FIT_MAX_SCALE));
		let middle = (min + max) / 2.0;
		self.pan = Point::ORIGIN - middle * self.scale;
	}
}
