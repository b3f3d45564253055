//! Gesture arbitration state machine.
//!
//! Host input arrives as discrete begin/change/end callbacks. At most one of
//! pan or node drag is active at a time, and whichever claimed the initial
//! touch-down location wins. Pinch zoom is tracked separately and composes
//! with either. Out-of-order callbacks are dropped and return the machine to
//! `Idle`; nothing here can leave input blocked.

use log::debug;
use serde::Deserialize;

use super::hit_test::hit_test;
use super::model::{GraphModel, NodeId, Point};
use super::scale::ScaleConfig;
use super::selection::Selection;
use super::viewport::Viewport;

/// Gesture tuning.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
	/// A gesture whose net translation never reaches this many screen units
	/// is a tap, not a drag.
	pub tap_slop: f64,
}

impl Default for InteractionConfig {
	fn default() -> Self {
		Self { tap_slop: 4.0 }
	}
}

/// Public view of the primary gesture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GestureState {
	Idle,
	Panning,
	DraggingNode(NodeId),
}

/// Screen-space bookkeeping for one pointer gesture.
#[derive(Clone, Debug, PartialEq)]
struct Track {
	/// Last pointer position, when the host reports absolute positions.
	last: Option<Point>,
	/// Sum of all deltas so far.
	net: Point,
	/// Largest `|net|` seen over the gesture.
	max_travel: f64,
}

impl Track {
	fn at(point: Point) -> Self {
		Self {
			last: Some(point),
			net: Point::ORIGIN,
			max_travel: 0.0,
		}
	}

	fn detached() -> Self {
		Self {
			last: None,
			net: Point::ORIGIN,
			max_travel: 0.0,
		}
	}

	fn advance(&mut self, point: Point) -> Option<Point> {
		let delta = self.last.map(|last| point - last);
		self.last = Some(point);
		delta
	}

	fn record(&mut self, delta: Point) {
		self.net += delta;
		self.max_travel = self.max_travel.max(self.net.length());
	}
}

#[derive(Clone, Debug, PartialEq)]
enum Primary {
	Idle,
	Panning(Track),
	DraggingNode {
		id: NodeId,
		/// Model-space offset not yet committed to the node.
		provisional: Point,
		track: Track,
	},
}

/// Everything a gesture may read or mutate.
pub struct Scene<'a> {
	pub model: &'a mut GraphModel,
	pub viewport: &'a mut Viewport,
	pub selection: &'a mut Selection,
	/// Canvas center in screen space.
	pub center: Point,
	pub scale: &'a ScaleConfig,
}

impl Scene<'_> {
	fn hit(&self, point: Point) -> Option<NodeId> {
		hit_test(
			point,
			&*self.model,
			self.selection.selected(),
			&*self.viewport,
			self.center,
			self.scale,
		)
		.map(str::to_string)
	}
}

/// The interaction state machine. Every handler returns whether anything
/// visible changed.
#[derive(Clone, Debug)]
pub struct InteractionController {
	config: InteractionConfig,
	primary: Primary,
	/// Scale at pinch start, while a pinch is active.
	pinch_base: Option<f64>,
}

impl Default for InteractionController {
	fn default() -> Self {
		Self::new(InteractionConfig::default())
	}
}

impl InteractionController {
	pub fn new(config: InteractionConfig) -> Self {
		Self {
			config,
			primary: Primary::Idle,
			pinch_base: None,
		}
	}

	pub fn state(&self) -> GestureState {
		match &self.primary {
			Primary::Idle => GestureState::Idle,
			Primary::Panning(_) => GestureState::Panning,
			Primary::DraggingNode { id, .. } => GestureState::DraggingNode(id.clone()),
		}
	}

	pub fn is_zooming(&self) -> bool {
		self.pinch_base.is_some()
	}

	/// No pan, drag or pinch in progress.
	pub fn is_idle(&self) -> bool {
		self.primary == Primary::Idle && self.pinch_base.is_none()
	}

	/// Uncommitted model-space offset of the node being dragged.
	pub fn drag_offset(&self, node: &str) -> Option<Point> {
		match &self.primary {
			Primary::DraggingNode { id, provisional, .. } if id == node => Some(*provisional),
			_ => None,
		}
	}

	// Pointer-level input: the host reports absolute positions and the
	// controller arbitrates by hit-testing the touch-down location.

	/// Claims the gesture for a node drag if `point` hits a node, otherwise
	/// for a background pan.
	pub fn pointer_down(&mut self, scene: &mut Scene<'_>, point: Point) -> bool {
		if self.primary != Primary::Idle {
			debug!("topology: pointer down while {:?} is active, ignored", self.state());
			return false;
		}
		self.primary = match scene.hit(point) {
			Some(id) => Primary::DraggingNode {
				id,
				provisional: Point::ORIGIN,
				track: Track::at(point),
			},
			None => Primary::Panning(Track::at(point)),
		};
		false
	}

	pub fn pointer_moved(&mut self, scene: &mut Scene<'_>, point: Point) -> bool {
		let delta = match &mut self.primary {
			Primary::Idle => return false,
			Primary::Panning(track) | Primary::DraggingNode { track, .. } => track.advance(point),
		};
		let Some(delta) = delta else {
			return false;
		};
		match &self.primary {
			Primary::Idle => false,
			Primary::Panning(_) => self.pan_changed(scene, delta),
			Primary::DraggingNode { id, .. } => {
				let id = id.clone();
				self.drag_node_changed(scene, &id, delta)
			}
		}
	}

	/// Ends the pointer gesture. One that never travelled past the tap slop
	/// is a tap: it leaves the node and the pan where they started and
	/// toggles the node it started on, or clears the selection if it started
	/// on the background.
	pub fn pointer_up(&mut self, scene: &mut Scene<'_>, point: Point) -> bool {
		let mut changed = self.pointer_moved(scene, point);
		let (tap, target) = match &self.primary {
			Primary::Idle => {
				debug!("topology: pointer up without a gesture, ignored");
				return changed;
			}
			Primary::Panning(track) => (track.max_travel < self.config.tap_slop, None),
			Primary::DraggingNode { id, track, .. } => {
				(track.max_travel < self.config.tap_slop, Some(id.clone()))
			}
		};
		if tap {
			changed |= self.abandon_primary(scene);
			changed |= match target {
				Some(id) => scene.selection.toggle(&id),
				None => scene.selection.clear(),
			};
		} else {
			changed |= self.finish_primary(scene);
		}
		changed
	}

	/// The pointer left the surface; ends the gesture without a tap.
	pub fn pointer_cancel(&mut self, scene: &mut Scene<'_>) -> bool {
		self.finish_primary(scene)
	}

	// Recognizer-level input: the host's own gesture recognizers report
	// deltas. The first change event of an idle machine starts the gesture.

	/// Pans by a screen-space delta.
	pub fn pan_changed(&mut self, scene: &mut Scene<'_>, delta: Point) -> bool {
		if !delta.is_finite() {
			debug!("topology: non-finite pan delta dropped");
			return false;
		}
		if self.primary == Primary::Idle {
			self.primary = Primary::Panning(Track::detached());
		}
		match &mut self.primary {
			Primary::Panning(track) => {
				track.record(delta);
				scene.viewport.pan_by(delta);
				true
			}
			_ => {
				debug!("topology: pan during a node drag, ignored");
				false
			}
		}
	}

	pub fn pan_ended(&mut self) -> bool {
		match self.primary {
			Primary::Panning(_) => {
				self.primary = Primary::Idle;
				false
			}
			Primary::Idle => {
				debug!("topology: pan end without a pan, ignored");
				false
			}
			Primary::DraggingNode { .. } => self.violation("pan end during a node drag"),
		}
	}

	/// Drags `node` by a screen-space delta. The node follows the pointer 1:1
	/// on screen, so the model-space offset is `delta / scale`.
	pub fn drag_node_changed(&mut self, scene: &mut Scene<'_>, node: &str, delta: Point) -> bool {
		if !delta.is_finite() {
			debug!("topology: non-finite drag delta dropped");
			return false;
		}
		if self.primary == Primary::Idle {
			if scene.model.node(node).is_none() {
				debug!("topology: drag of unknown node `{node}` ignored");
				return false;
			}
			self.primary = Primary::DraggingNode {
				id: node.to_string(),
				provisional: Point::ORIGIN,
				track: Track::detached(),
			};
		}
		let scale = scene.viewport.scale();
		match &mut self.primary {
			Primary::DraggingNode {
				id,
				provisional,
				track,
			} if id == node => {
				track.record(delta);
				*provisional += delta / scale;
				true
			}
			_ => {
				debug!("topology: drag of `{node}` while another gesture is active, ignored");
				false
			}
		}
	}

	/// Commits the provisional offset of `node` exactly once.
	pub fn drag_node_ended(&mut self, scene: &mut Scene<'_>, node: &str) -> bool {
		match &self.primary {
			Primary::DraggingNode { id, .. } if id == node => self.finish_primary(scene),
			Primary::Idle => {
				debug!("topology: drag end for `{node}` without a drag, ignored");
				false
			}
			_ => self.violation("drag end for a gesture that is not active"),
		}
	}

	/// Sets the scale to `factor` times the scale at pinch start.
	pub fn pinch_changed(&mut self, viewport: &mut Viewport, factor: f64) -> bool {
		if !(factor.is_finite() && factor > 0.0) {
			debug!("topology: pinch factor {factor} dropped");
			return false;
		}
		let base = *self.pinch_base.get_or_insert(viewport.scale());
		let before = viewport.scale();
		viewport.set_scale(base * factor);
		viewport.scale() != before
	}

	pub fn pinch_ended(&mut self) -> bool {
		if self.pinch_base.take().is_none() {
			debug!("topology: pinch end without a pinch, ignored");
		}
		false
	}

	/// A discrete tap. Toggles the node under `point`, or clears the
	/// selection on background. A tap arriving during a gesture that already
	/// travelled past the slop is not a tap and is dropped.
	pub fn tap(&mut self, scene: &mut Scene<'_>, point: Point) -> bool {
		let travelled = match &self.primary {
			Primary::Idle => 0.0,
			Primary::Panning(track) | Primary::DraggingNode { track, .. } => track.max_travel,
		};
		if travelled >= self.config.tap_slop {
			debug!("topology: tap during a moving {:?}, ignored", self.state());
			return false;
		}
		let mut changed = self.abandon_primary(scene);
		changed |= match scene.hit(point) {
			Some(id) => scene.selection.toggle(&id),
			None => scene.selection.clear(),
		};
		changed
	}

	/// Returns to idle, committing a node drag if one is active.
	fn finish_primary(&mut self, scene: &mut Scene<'_>) -> bool {
		match std::mem::replace(&mut self.primary, Primary::Idle) {
			Primary::DraggingNode { id, provisional, .. } => {
				scene.model.translate_node(&id, provisional) && provisional != Point::ORIGIN
			}
			Primary::Panning(_) | Primary::Idle => false,
		}
	}

	/// Returns to idle, undoing whatever a sub-slop gesture moved: the drag
	/// offset is dropped and the pan is rolled back.
	fn abandon_primary(&mut self, scene: &mut Scene<'_>) -> bool {
		match std::mem::replace(&mut self.primary, Primary::Idle) {
			Primary::DraggingNode { provisional, .. } => provisional != Point::ORIGIN,
			Primary::Panning(track) => {
				scene.viewport.pan_by(Point::ORIGIN - track.net);
				track.net != Point::ORIGIN
			}
			Primary::Idle => false,
		}
	}

	/// Drops the offending event and any uncommitted drag.
	fn violation(&mut self, what: &str) -> bool {
		debug!("topology: {what} while {:?}, resetting to idle", self.state());
		let dropped = matches!(self.primary, Primary::DraggingNode { provisional, .. } if provisional != Point::ORIGIN);
		self.primary = Primary::Idle;
		dropped
	}
}
