//! Graph session state: the built model plus everything that interacts with it.
//!
//! One `TopologyState` lives for the lifetime of a canvas. It owns the
//! current [`GraphModel`], the viewport, the selection and the gesture state
//! machine, and it serializes rebuilds against gestures: a snapshot that
//! arrives mid-gesture waits until the controller is idle, and only the most
//! recently requested snapshot is ever applied.

use log::{debug, info, warn};
use serde::Deserialize;

use super::error::DataIntegrityError;
use super::hit_test::hit_test;
use super::interaction::{GestureState, InteractionConfig, InteractionController, Scene};
use super::layout::{LayoutConfig, LayoutStrategy};
use super::model::{GraphModel, Point};
use super::scale::ScaleConfig;
use super::selection::{Selection, SubscriptionId};
use super::types::TopologySnapshot;
use super::viewport::Viewport;

/// Engine configuration a host page may override.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
	pub layout: LayoutConfig,
	pub interaction: InteractionConfig,
	/// Fraction of the shorter canvas side left as margin by zoom-to-fit.
	pub fit_margin: f64,
}

impl Default for TopologyConfig {
	fn default() -> Self {
		Self {
			layout: LayoutConfig::default(),
			interaction: InteractionConfig::default(),
			fit_margin: 0.1,
		}
	}
}

/// Ticket for an asynchronous snapshot fetch. Only the newest one is honored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// What happened to a rebuild request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebuildOutcome {
	/// The new model is live.
	Applied,
	/// A gesture is in progress; the snapshot is applied when it ends.
	Queued,
	/// A newer request exists; this snapshot was dropped.
	Superseded,
}

type ErrorListener = Box<dyn FnMut(&DataIntegrityError)>;

/// Core graph session state.
pub struct TopologyState {
	model: Option<GraphModel>,
	viewport: Viewport,
	controller: InteractionController,
	selection: Selection,
	layout: Box<dyn LayoutStrategy>,
	scale: ScaleConfig,
	fit_margin: f64,
	pending: Option<TopologySnapshot>,
	latest: u64,
	last_error: Option<DataIntegrityError>,
	error_listeners: Vec<ErrorListener>,
	redraw: bool,
	pub width: f64,
	pub height: f64,
}

impl TopologyState {
	pub fn new(config: TopologyConfig, width: f64, height: f64) -> Self {
		let layout = config.layout.strategy();
		Self::with_layout(config, layout, width, height)
	}

	/// Uses a caller-supplied layout instead of the configured one.
	pub fn with_layout(
		config: TopologyConfig,
		layout: Box<dyn LayoutStrategy>,
		width: f64,
		height: f64,
	) -> Self {
		Self {
			model: None,
			viewport: Viewport::new(),
			controller: InteractionController::new(config.interaction),
			selection: Selection::default(),
			layout,
			scale: ScaleConfig::default(),
			fit_margin: config.fit_margin,
			pending: None,
			latest: 0,
			last_error: None,
			error_listeners: Vec::new(),
			redraw: true,
			width,
			height,
		}
	}

	pub fn model(&self) -> Option<&GraphModel> {
		self.model.as_ref()
	}

	pub fn viewport(&self) -> &Viewport {
		&self.viewport
	}

	pub fn scale_config(&self) -> &ScaleConfig {
		&self.scale
	}

	pub fn selected(&self) -> Option<&str> {
		self.selection.selected()
	}

	pub fn gesture_state(&self) -> GestureState {
		self.controller.state()
	}

	/// The error from the most recent failed rebuild, cleared by a successful one.
	pub fn last_error(&self) -> Option<&DataIntegrityError> {
		self.last_error.as_ref()
	}

	/// Canvas center in screen space.
	pub fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}

	/// Registers a listener for selection changes.
	pub fn subscribe_selection(
		&mut self,
		listener: impl FnMut(Option<&str>) + 'static,
	) -> SubscriptionId {
		self.selection.subscribe(listener)
	}

	pub fn unsubscribe_selection(&mut self, id: SubscriptionId) -> bool {
		self.selection.unsubscribe(id)
	}

	/// Registers a listener for failed rebuilds.
	pub fn on_rebuild_failed(&mut self, listener: impl FnMut(&DataIntegrityError) + 'static) {
		self.error_listeners.push(Box::new(listener));
	}

	/// Returns and clears the redraw flag.
	pub fn take_redraw(&mut self) -> bool {
		std::mem::take(&mut self.redraw)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.redraw = true;
	}

	// Rebuilds

	/// Starts an asynchronous fetch. Any fetch started earlier becomes stale,
	/// and so does a snapshot still queued behind a gesture.
	pub fn begin_fetch(&mut self) -> Generation {
		self.latest += 1;
		if self.pending.take().is_some() {
			debug!("topology: queued rebuild dropped for a newer fetch");
		}
		Generation(self.latest)
	}

	/// Delivers the result of the fetch identified by `generation`.
	pub fn submit(
		&mut self,
		generation: Generation,
		snapshot: TopologySnapshot,
	) -> Result<RebuildOutcome, DataIntegrityError> {
		if generation.0 != self.latest {
			debug!(
				"topology: dropping stale snapshot (generation {}, latest {})",
				generation.0, self.latest
			);
			return Ok(RebuildOutcome::Superseded);
		}
		self.request_rebuild(snapshot)
	}

	/// Rebuilds from `snapshot` now, or once the current gesture ends.
	/// Supersedes every fetch still in flight.
	pub fn rebuild(
		&mut self,
		snapshot: TopologySnapshot,
	) -> Result<RebuildOutcome, DataIntegrityError> {
		self.latest += 1;
		self.request_rebuild(snapshot)
	}

	fn request_rebuild(
		&mut self,
		snapshot: TopologySnapshot,
	) -> Result<RebuildOutcome, DataIntegrityError> {
		if !self.controller.is_idle() {
			debug!("topology: gesture in progress, queueing rebuild of `{}`", snapshot.group.id);
			if self.pending.replace(snapshot).is_some() {
				debug!("topology: queued rebuild replaced by a newer snapshot");
			}
			return Ok(RebuildOutcome::Queued);
		}
		self.pending = None;
		self.apply(snapshot)
	}

	fn apply(&mut self, snapshot: TopologySnapshot) -> Result<RebuildOutcome, DataIntegrityError> {
		let model = match GraphModel::build(&snapshot, self.layout.as_mut()) {
			Ok(model) => model,
			Err(err) => {
				warn!("topology: rebuild of `{}` aborted: {}", snapshot.group.id, err);
				for listener in &mut self.error_listeners {
					listener(&err);
				}
				self.last_error = Some(err.clone());
				return Err(err);
			}
		};

		let switched = self
			.model
			.as_ref()
			.is_none_or(|old| old.root().id != model.root().id);
		if switched {
			self.viewport.reset_view();
			self.selection.clear();
		} else if self
			.selection
			.selected()
			.is_some_and(|id| model.node(id).is_none())
		{
			self.selection.clear();
		}

		info!(
			"topology: built `{}` with {} nodes, {} connections",
			model.root().id,
			model.nodes().len(),
			model.connections().len()
		);
		self.model = Some(model);
		self.last_error = None;
		self.redraw = true;
		Ok(RebuildOutcome::Applied)
	}

	/// Applies a queued snapshot once the controller is idle.
	fn flush_pending(&mut self) {
		if !self.controller.is_idle() {
			return;
		}
		if let Some(snapshot) = self.pending.take() {
			// Failures are already logged and reported to listeners.
			let _ = self.apply(snapshot);
		}
	}

	// Input

	fn with_scene(
		&mut self,
		f: impl FnOnce(&mut InteractionController, &mut Scene<'_>) -> bool,
	) -> bool {
		let center = self.center();
		let changed = match self.model.as_mut() {
			Some(model) => {
				let mut scene = Scene {
					model,
					viewport: &mut self.viewport,
					selection: &mut self.selection,
					center,
					scale: &self.scale,
				};
				f(&mut self.controller, &mut scene)
			}
			None => false,
		};
		self.after_input(changed)
	}

	fn after_input(&mut self, changed: bool) -> bool {
		self.redraw |= changed;
		self.flush_pending();
		changed
	}

	pub fn pointer_down(&mut self, point: Point) -> bool {
		self.with_scene(|c, s| c.pointer_down(s, point))
	}

	pub fn pointer_moved(&mut self, point: Point) -> bool {
		self.with_scene(|c, s| c.pointer_moved(s, point))
	}

	pub fn pointer_up(&mut self, point: Point) -> bool {
		self.with_scene(|c, s| c.pointer_up(s, point))
	}

	pub fn pointer_cancel(&mut self) -> bool {
		self.with_scene(|c, s| c.pointer_cancel(s))
	}

	pub fn pan_changed(&mut self, delta: Point) -> bool {
		self.with_scene(|c, s| c.pan_changed(s, delta))
	}

	pub fn pan_ended(&mut self) -> bool {
		let changed = self.controller.pan_ended();
		self.after_input(changed)
	}

	pub fn pinch_changed(&mut self, factor: f64) -> bool {
		let changed = self.controller.pinch_changed(&mut self.viewport, factor);
		self.after_input(changed)
	}

	pub fn pinch_ended(&mut self) -> bool {
		let changed = self.controller.pinch_ended();
		self.after_input(changed)
	}

	pub fn tap(&mut self, point: Point) -> bool {
		self.with_scene(|c, s| c.tap(s, point))
	}

	pub fn drag_node_changed(&mut self, node: &str, delta: Point) -> bool {
		self.with_scene(|c, s| c.drag_node_changed(s, node, delta))
	}

	pub fn drag_node_ended(&mut self, node: &str) -> bool {
		self.with_scene(|c, s| c.drag_node_ended(s, node))
	}

	/// Mouse-wheel zoom around the cursor.
	pub fn wheel_zoom(&mut self, factor: f64, anchor: Point) -> bool {
		let before = self.viewport;
		let center = self.center();
		self.viewport.zoom_at(factor, anchor, center);
		let changed = self.viewport != before;
		self.after_input(changed)
	}

	// View

	pub fn reset_view(&mut self) {
		self.viewport.reset_view();
		self.redraw = true;
	}

	/// Fits every node into the canvas, minus the configured margin.
	pub fn zoom_to_fit(&mut self) {
		let Some(model) = self.model.as_ref() else {
			return;
		};
		let margin = self.fit_margin.clamp(0.0, 0.45);
		let target = self.width.min(self.height) * (1.0 - 2.0 * margin);
		self.viewport.zoom_to_fit(model.nodes(), target);
		self.redraw = true;
	}

	/// Topmost node under a screen-space point.
	pub fn hit_test(&self, point: Point) -> Option<&str> {
		let model = self.model.as_ref()?;
		hit_test(
			point,
			model,
			self.selection.selected(),
			&self.viewport,
			self.center(),
			&self.scale,
		)
	}

	/// Where a node is drawn right now, including any uncommitted drag.
	pub fn display_position(&self, id: &str) -> Option<Point> {
		let node = self.model.as_ref()?.node(id)?;
		Some(node.position + self.controller.drag_offset(id).unwrap_or(Point::ORIGIN))
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;
	use crate::components::topology_graph::model::tests::{FixedLayout, member, peer, snapshot};
	use crate::components::topology_graph::types::{MemberKind, SnapshotLink};

	fn session() -> TopologyState {
		TopologyState::with_layout(
			TopologyConfig::default(),
			Box::new(FixedLayout(Point::new(100.0, 0.0))),
			800.0,
			600.0,
		)
	}

	fn group(id: &str) -> TopologySnapshot {
		snapshot(
			id,
			vec![member("A", MemberKind::Application)],
			vec![peer("C", true)],
		)
	}

	fn corrupt() -> TopologySnapshot {
		let mut snap = group("G");
		snap.links.push(SnapshotLink {
			source: "G".into(),
			target: "ghost".into(),
		});
		snap
	}

	#[test]
	fn failed_rebuild_keeps_previous_model() {
		let mut state = session();
		state.rebuild(group("G")).unwrap();
		let before = state.model().cloned();

		let reported = Rc::new(RefCell::new(Vec::new()));
		let sink = reported.clone();
		state.on_rebuild_failed(move |err| sink.borrow_mut().push(err.clone()));

		let err = state.rebuild(corrupt()).unwrap_err();
		assert!(matches!(err, DataIntegrityError::DanglingConnection { .. }));
		assert_eq!(state.model().cloned(), before);
		assert_eq!(state.last_error(), Some(&err));
		assert_eq!(reported.borrow().len(), 1);

		state.rebuild(group("G")).unwrap();
		assert_eq!(state.last_error(), None);
	}

	#[test]
	fn stale_fetches_are_superseded() {
		let mut state = session();
		let first = state.begin_fetch();
		let second = state.begin_fetch();
		assert_eq!(state.submit(second, group("second")), Ok(RebuildOutcome::Applied));
		assert_eq!(state.submit(first, group("first")), Ok(RebuildOutcome::Superseded));
		assert_eq!(state.model().unwrap().root().id, "second");

		let inflight = state.begin_fetch();
		state.rebuild(group("direct")).unwrap();
		assert_eq!(state.submit(inflight, group("late")), Ok(RebuildOutcome::Superseded));
		assert_eq!(state.model().unwrap().root().id, "direct");
	}

	#[test]
	fn rebuild_waits_for_drag_to_finish() {
		let mut state = session();
		state.rebuild(group("G")).unwrap();
		state.drag_node_changed("A", Point::new(10.0, 0.0));

		assert_eq!(state.rebuild(group("H")), Ok(RebuildOutcome::Queued));
		assert_eq!(state.rebuild(group("K")), Ok(RebuildOutcome::Queued));
		assert_eq!(state.model().unwrap().root().id, "G");
		assert_eq!(state.display_position("A"), Some(Point::new(110.0, 0.0)));

		state.drag_node_ended("A");
		assert_eq!(state.gesture_state(), GestureState::Idle);
		assert_eq!(state.model().unwrap().root().id, "K");
		assert_eq!(state.display_position("A"), Some(Point::new(100.0, 0.0)));
	}

	#[test]
	fn new_fetch_discards_queued_snapshot() {
		let mut state = session();
		state.rebuild(group("G")).unwrap();
		state.pan_changed(Point::new(10.0, 0.0));
		assert_eq!(state.rebuild(group("H")), Ok(RebuildOutcome::Queued));

		let fetch = state.begin_fetch();
		state.pan_ended();
		assert_eq!(state.model().unwrap().root().id, "G");

		assert_eq!(state.submit(fetch, group("K")), Ok(RebuildOutcome::Applied));
		assert_eq!(state.model().unwrap().root().id, "K");
	}

	#[test]
	fn rebuild_waits_for_pinch_to_finish() {
		let mut state = session();
		state.rebuild(group("G")).unwrap();
		state.pinch_changed(1.5);
		assert_eq!(state.rebuild(group("H")), Ok(RebuildOutcome::Queued));
		state.pinch_ended();
		assert_eq!(state.model().unwrap().root().id, "H");
	}

	#[test]
	fn switching_groups_resets_view_and_selection() {
		let mut state = session();
		state.rebuild(group("G")).unwrap();
		state.tap(Point::new(500.0, 300.0));
		assert_eq!(state.selected(), Some("C"));
		state.pan_changed(Point::new(30.0, 30.0));
		state.pan_ended();
		state.pinch_changed(2.0);
		state.pinch_ended();

		state.rebuild(group("G")).unwrap();
		assert_eq!(state.viewport().scale(), 2.0);
		assert_eq!(state.selected(), Some("C"));

		state.rebuild(group("H")).unwrap();
		assert_eq!(*state.viewport(), Viewport::default());
		assert_eq!(state.selected(), None);
	}

	#[test]
	fn refresh_drops_vanished_selection() {
		let mut state = session();
		state.rebuild(group("G")).unwrap();
		state.tap(Point::new(500.0, 300.0));
		assert!(state.selected().is_some());
		state.rebuild(snapshot("G", vec![], vec![])).unwrap();
		assert_eq!(state.selected(), None);
	}

	#[test]
	fn zoom_to_fit_uses_canvas_margin() {
		let mut state = TopologyState::with_layout(
			TopologyConfig::default(),
			Box::new(FixedLayout(Point::new(400.0, 0.0))),
			800.0,
			600.0,
		);
		state.rebuild(group("G")).unwrap();
		state.zoom_to_fit();
		// 600 * 0.8 / 400
		assert!((state.viewport().scale() - 1.2).abs() < 1e-9);
		let pan = state.viewport().pan_offset();
		assert!((pan.x + 240.0).abs() < 1e-9 && pan.y.abs() < 1e-9);

		state.reset_view();
		assert_eq!(*state.viewport(), Viewport::default());
	}

	#[test]
	fn redraw_flag_tracks_changes() {
		let mut state = session();
		assert!(state.take_redraw());
		assert!(!state.take_redraw());
		assert!(!state.pan_changed(Point::new(5.0, 0.0)));
		state.rebuild(group("G")).unwrap();
		assert!(state.take_redraw());
		state.pan_changed(Point::new(5.0, 0.0));
		assert!(state.take_redraw());
		state.pan_ended();
		assert!(!state.take_redraw());
	}

	#[test]
	fn wheel_zoom_clamps() {
		let mut state = session();
		for _ in 0..40 {
			state.wheel_zoom(1.1, Point::new(10.0, 10.0));
		}
		assert_eq!(state.viewport().scale(), 3.0);
		assert!(!state.wheel_zoom(1.1, Point::new(10.0, 10.0)));
	}
}
