//! End-to-end scenarios driven through the public engine API.

// Test target reuses lib deps, silence noisy lint.
#![allow(unused_crate_dependencies)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use net_topology::components::topology_graph::{
	ConnectionKind, DataIntegrityError, GestureState, LayoutStrategy, Member, MemberKind,
	NetworkGroupInfo, NodeKind, Peer, Point, RebuildOutcome, SnapshotLink, TopologyConfig,
	TopologySnapshot, TopologyState, Viewport,
};

const EPS: f64 = 1e-9;

fn approx(a: Point, b: Point) -> bool {
	(a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
}

/// Hands out positions in order, cycling when exhausted.
struct Scripted {
	queue: VecDeque<Point>,
}

impl Scripted {
	fn new(points: &[Point]) -> Self {
		Self {
			queue: points.iter().copied().collect(),
		}
	}
}

impl LayoutStrategy for Scripted {
	fn place(&mut self, _node_count: usize, _kind: NodeKind) -> Point {
		let p = self.queue.pop_front().unwrap_or(Point::ORIGIN);
		self.queue.push_back(p);
		p
	}
}

fn scenario() -> TopologySnapshot {
	TopologySnapshot {
		group: NetworkGroupInfo {
			id: "G".into(),
			name: "prod".into(),
			status: "active".into(),
		},
		members: vec![
			Member {
				id: "A".into(),
				name: "api".into(),
				kind: MemberKind::Application,
				ip: Some("10.0.0.2".into()),
				status: "running".into(),
			},
			Member {
				id: "B".into(),
				name: "redis".into(),
				kind: MemberKind::Addon,
				ip: None,
				status: "stopped".into(),
			},
		],
		peers: vec![Peer {
			id: "C".into(),
			name: "office".into(),
			external: true,
			endpoint: Some("1.2.3.4:51820".into()),
			status: "up".into(),
		}],
		links: Vec::new(),
	}
}

/// A at (100, 0), B at (-100, 0), C at (0, 200) on an 800x600 canvas.
fn session() -> TopologyState {
	TopologyState::with_layout(
		TopologyConfig::default(),
		Box::new(Scripted::new(&[
			Point::new(100.0, 0.0),
			Point::new(-100.0, 0.0),
			Point::new(0.0, 200.0),
		])),
		800.0,
		600.0,
	)
}

const CENTER: Point = Point::new(400.0, 300.0);

#[test]
fn build_tap_and_clear() {
	let mut state = session();
	assert_eq!(state.rebuild(scenario()), Ok(RebuildOutcome::Applied));

	let model = state.model().unwrap();
	let ids: Vec<_> = model.nodes().iter().map(|n| n.id.as_str()).collect();
	assert_eq!(ids, vec!["G", "A", "B", "C"]);
	let edges: Vec<_> = model
		.connections()
		.iter()
		.map(|c| (c.from.as_str(), c.to.as_str(), c.kind))
		.collect();
	assert_eq!(
		edges,
		vec![
			("G", "A", ConnectionKind::Membership),
			("G", "B", ConnectionKind::Membership),
			("G", "C", ConnectionKind::Peering),
		]
	);

	let selections = Rc::new(RefCell::new(Vec::new()));
	let sink = selections.clone();
	state.subscribe_selection(move |id| sink.borrow_mut().push(id.map(str::to_string)));

	let a_screen = state.viewport().to_screen(Point::new(100.0, 0.0), CENTER);
	assert!(state.tap(a_screen));
	assert_eq!(state.selected(), Some("A"));

	assert!(state.tap(Point::new(20.0, 20.0)));
	assert_eq!(state.selected(), None);
	assert_eq!(*selections.borrow(), vec![Some("A".to_string()), None]);
}

#[test]
fn pointer_gestures_pick_drag_or_pan_from_touch_down() {
	let mut state = session();
	state.rebuild(scenario()).unwrap();

	// Press on B and drag it 30px right.
	state.pointer_down(Point::new(300.0, 300.0));
	assert_eq!(state.gesture_state(), GestureState::DraggingNode("B".into()));
	state.pointer_moved(Point::new(315.0, 300.0));
	state.pointer_up(Point::new(330.0, 300.0));
	assert_eq!(state.gesture_state(), GestureState::Idle);
	assert!(approx(
		state.model().unwrap().node("B").unwrap().position,
		Point::new(-70.0, 0.0)
	));
	assert_eq!(state.selected(), None);

	// Press on background and pan.
	state.pointer_down(Point::new(50.0, 50.0));
	assert_eq!(state.gesture_state(), GestureState::Panning);
	state.pointer_up(Point::new(60.0, 40.0));
	assert!(approx(state.viewport().pan_offset(), Point::new(10.0, -10.0)));
}

#[test]
fn drag_respects_zoom() {
	let mut state = session();
	state.rebuild(scenario()).unwrap();
	state.pinch_changed(2.0);
	state.pinch_ended();
	assert_eq!(state.viewport().scale(), 2.0);

	state.drag_node_changed("C", Point::new(10.0, 0.0));
	state.drag_node_changed("C", Point::new(10.0, 20.0));
	state.drag_node_ended("C");
	// Re-ending is a no-op.
	state.drag_node_ended("C");
	assert!(approx(
		state.model().unwrap().node("C").unwrap().position,
		Point::new(10.0, 210.0)
	));
}

#[test]
fn corrupt_snapshot_keeps_previous_model() {
	let mut state = session();
	state.rebuild(scenario()).unwrap();
	let before = state.model().cloned();

	let mut corrupt = scenario();
	corrupt.links.push(SnapshotLink {
		source: "G".into(),
		target: "ghost".into(),
	});
	let err = state.rebuild(corrupt).unwrap_err();
	assert_eq!(
		err,
		DataIntegrityError::DanglingConnection {
			from: "G".into(),
			to: "ghost".into(),
			missing: "ghost".into(),
		}
	);
	assert_eq!(state.model().cloned(), before);
	assert_eq!(state.last_error(), Some(&err));
}

#[test]
fn single_node_fit_is_a_no_op() {
	let mut state = session();
	let mut lonely = scenario();
	lonely.members.clear();
	lonely.peers.clear();
	state.rebuild(lonely).unwrap();
	state.pan_changed(Point::new(5.0, 5.0));
	state.pan_ended();
	let before = *state.viewport();
	state.zoom_to_fit();
	assert_eq!(*state.viewport(), before);
	assert_ne!(before, Viewport::default());
}

#[test]
fn pinch_stays_within_bounds() {
	let mut state = session();
	state.rebuild(scenario()).unwrap();
	for factor in [1.5, 4.0, 100.0] {
		state.pinch_changed(factor);
	}
	assert_eq!(state.viewport().scale(), 3.0);
	state.pinch_ended();
	for factor in [0.5, 0.01] {
		state.pinch_changed(factor);
	}
	assert_eq!(state.viewport().scale(), 0.5);
}
