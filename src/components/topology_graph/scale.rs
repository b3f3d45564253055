//! Zoom-dependent sizes for graph visuals and hit targets.
//!
//! # Coordinate Spaces
//!
//! - **Model-space**: the coordinate system node positions are stored in.
//!   Drawing happens in model space after the canvas transform is applied.
//! - **Screen-space**: pixel coordinates on the canvas.
//!
//! Every size in [`ScaleConfig`] is declared once with a [`ScaleBehavior`]
//! that says how it reacts to the zoom factor `k`. [`ScaledValues`] resolves
//! them to model-space values for one zoom level.

use super::model::NodeKind;

/// How a size reacts to the zoom factor.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant model-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size. Divides by `k` to counteract the transform.
	Screen,
	/// Model-space size whose on-screen size stays within bounds.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// Model-space value of `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Per-kind visual radius in screen pixels.
#[derive(Clone, Debug)]
pub struct NodeRadii {
	pub network_group: f64,
	pub application: f64,
	pub addon: f64,
	pub external_peer: f64,
	pub internal_peer: f64,
}

impl NodeRadii {
	pub fn for_kind(&self, kind: NodeKind) -> f64 {
		match kind {
			NodeKind::NetworkGroup => self.network_group,
			NodeKind::Application => self.application,
			NodeKind::Addon => self.addon,
			NodeKind::ExternalPeer => self.external_peer,
			NodeKind::InternalPeer => self.internal_peer,
		}
	}
}

/// Complete scale configuration for all graph elements.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	pub radii: NodeRadii,
	/// How node radii scale with zoom.
	pub radius_behavior: ScaleBehavior,
	/// How hit radii scale with zoom. Hit radius equals the visual radius.
	pub hit_behavior: ScaleBehavior,
	/// Edge stroke width in screen pixels.
	pub edge_width: f64,
	/// Dash pattern (dash, gap) for peering edges, in model units.
	pub dash_pattern: (f64, f64),
	pub dash_behavior: ScaleBehavior,
	/// Title font size in screen pixels.
	pub label_size: f64,
	/// Below this zoom, labels stop shrinking.
	pub label_min_k: f64,
	/// Selection ring width in screen pixels.
	pub ring_width: f64,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			radii: NodeRadii {
				network_group: 34.0,
				application: 24.0,
				addon: 20.0,
				external_peer: 22.0,
				internal_peer: 22.0,
			},
			radius_behavior: ScaleBehavior::Screen,
			hit_behavior: ScaleBehavior::Screen,
			edge_width: 2.0,
			dash_pattern: (8.0, 6.0),
			dash_behavior: ScaleBehavior::Clamped {
				min_screen: 4.0,
				max_screen: 24.0,
			},
			label_size: 12.0,
			label_min_k: 0.75,
			ring_width: 3.0,
		}
	}
}

impl ScaleConfig {
	/// Model-space hit radius of a node of `kind` at zoom `k`.
	pub fn hit_radius(&self, kind: NodeKind, k: f64) -> f64 {
		self.hit_behavior.apply(self.radii.for_kind(kind), k)
	}
}

/// Pre-computed values for a specific zoom level.
///
/// Create this once per frame and pass it to drawing functions.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	pub k: f64,
	radii: NodeRadii,
	radius_behavior: ScaleBehavior,
	/// Edge line width in model space.
	pub edge_width: f64,
	/// Peering dash pattern in model space.
	pub dash_pattern: (f64, f64),
	/// Title font, e.g. "12px sans-serif".
	pub label_font: String,
	/// Subtitle font, a step smaller than the title.
	pub sublabel_font: String,
	pub ring_width: f64,
}

impl ScaledValues {
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let label_px = config.label_size / k.max(config.label_min_k);
		let dash = |v| config.dash_behavior.apply(v, k);
		Self {
			k,
			radii: config.radii.clone(),
			radius_behavior: config.radius_behavior.clone(),
			edge_width: config.edge_width / k,
			dash_pattern: (dash(config.dash_pattern.0), dash(config.dash_pattern.1)),
			label_font: format!("600 {label_px}px sans-serif"),
			sublabel_font: format!("{}px monospace", label_px * 0.8),
			ring_width: config.ring_width / k,
		}
	}

	/// Model-space radius of a node of `kind`.
	pub fn node_radius(&self, kind: NodeKind) -> f64 {
		self.radius_behavior.apply(self.radii.for_kind(kind), self.k)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn screen_behavior_cancels_zoom() {
		let config = ScaleConfig::default();
		for k in [0.5, 1.0, 3.0] {
			let r = config.hit_radius(NodeKind::Application, k);
			assert!((r * k - 24.0).abs() < 1e-9);
		}
	}

	#[test]
	fn clamped_behavior_bounds_screen_size() {
		let behavior = ScaleBehavior::Clamped {
			min_screen: 4.0,
			max_screen: 24.0,
		};
		assert_eq!(behavior.apply(8.0, 1.0), 8.0);
		assert_eq!(behavior.apply(8.0, 3.0) * 3.0, 24.0);
		assert_eq!(behavior.apply(8.0, 0.5) * 0.5, 4.0);
		assert_eq!(ScaleBehavior::World.apply(8.0, 3.0), 8.0);
	}

	#[test]
	fn root_is_largest() {
		let scaled = ScaledValues::new(&ScaleConfig::default(), 1.0);
		let root = scaled.node_radius(NodeKind::NetworkGroup);
		for kind in [
			NodeKind::Application,
			NodeKind::Addon,
			NodeKind::ExternalPeer,
			NodeKind::InternalPeer,
		] {
			assert!(scaled.node_radius(kind) < root);
		}
		assert_eq!(scaled.label_font, "600 12px sans-serif");
	}
}
