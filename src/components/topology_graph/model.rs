//! Typed nodes and connections derived from a topology snapshot.
//!
//! The model is a star: one `NetworkGroup` root at the model-space origin,
//! with every member and peer connected directly to it.

use std::collections::HashSet;
use std::ops::{Add, AddAssign, Div, Mul, Sub};

use super::error::DataIntegrityError;
use super::layout::LayoutStrategy;
use super::types::{MemberKind, SnapshotLink, TopologySnapshot};

/// Stable node identifier, equal to the underlying domain entity's id.
pub type NodeId = String;

/// A 2D point or vector. Used for both model-space and screen-space values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean length when treated as a vector.
	pub fn length(self) -> f64 {
		(self.x * self.x + self.y * self.y).sqrt()
	}

	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}
}

impl Add for Point {
	type Output = Point;

	fn add(self, rhs: Point) -> Point {
		Point::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl AddAssign for Point {
	fn add_assign(&mut self, rhs: Point) {
		self.x += rhs.x;
		self.y += rhs.y;
	}
}

impl Sub for Point {
	type Output = Point;

	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl Mul<f64> for Point {
	type Output = Point;

	fn mul(self, k: f64) -> Point {
		Point::new(self.x * k, self.y * k)
	}
}

impl Div<f64> for Point {
	type Output = Point;

	fn div(self, k: f64) -> Point {
		Point::new(self.x / k, self.y / k)
	}
}

/// What a node represents. Drives radius, color category and z-order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
	NetworkGroup,
	Application,
	Addon,
	ExternalPeer,
	InternalPeer,
}

impl NodeKind {
	/// Members sit on the inner ring, peers on the outer one.
	pub fn is_member(self) -> bool {
		matches!(self, NodeKind::Application | NodeKind::Addon)
	}

	pub fn is_peer(self) -> bool {
		matches!(self, NodeKind::ExternalPeer | NodeKind::InternalPeer)
	}
}

impl From<MemberKind> for NodeKind {
	fn from(kind: MemberKind) -> Self {
		match kind {
			MemberKind::Application => NodeKind::Application,
			MemberKind::Addon => NodeKind::Addon,
		}
	}
}

/// Kind of edge between the root and a member or peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionKind {
	/// Solid stroke.
	Membership,
	/// Dashed stroke.
	Peering,
}

/// A node in the topology graph.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: NodeId,
	pub kind: NodeKind,
	/// Display name, never empty.
	pub title: String,
	/// IP address or endpoint.
	pub subtitle: Option<String>,
	pub status: String,
	/// Model-space position.
	pub position: Point,
}

/// A derived edge. `from` is always the root id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphConnection {
	pub from: NodeId,
	pub to: NodeId,
	pub kind: ConnectionKind,
}

/// Nodes and connections for one network group.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphModel {
	nodes: Vec<GraphNode>,
	connections: Vec<GraphConnection>,
}

fn display_title(name: &str, id: &str) -> String {
	let name = name.trim();
	if name.is_empty() {
		id.to_string()
	} else {
		name.to_string()
	}
}

impl GraphModel {
	/// Derives the star topology for `snapshot`, asking `layout` for the
	/// position of every non-root node.
	pub fn build(
		snapshot: &TopologySnapshot,
		layout: &mut dyn LayoutStrategy,
	) -> Result<Self, DataIntegrityError> {
		let group = &snapshot.group;
		let root_id = group.id.trim();
		if root_id.is_empty() {
			return Err(DataIntegrityError::MissingRoot);
		}

		let placed = snapshot.members.len() + snapshot.peers.len();
		let mut nodes = Vec::with_capacity(placed + 1);
		let mut connections = Vec::with_capacity(placed);
		let mut seen: HashSet<&str> = HashSet::with_capacity(placed + 1);
		seen.insert(root_id);

		nodes.push(GraphNode {
			id: root_id.to_string(),
			kind: NodeKind::NetworkGroup,
			title: display_title(&group.name, root_id),
			subtitle: None,
			status: group.status.clone(),
			position: Point::ORIGIN,
		});

		for member in &snapshot.members {
			if member.id.trim().is_empty() {
				return Err(DataIntegrityError::EmptyId("member"));
			}
			if !seen.insert(member.id.as_str()) {
				return Err(DataIntegrityError::DuplicateNode(member.id.clone()));
			}
			let kind = NodeKind::from(member.kind);
			nodes.push(GraphNode {
				id: member.id.clone(),
				kind,
				title: display_title(&member.name, &member.id),
				subtitle: member.ip.clone(),
				status: member.status.clone(),
				position: layout.place(placed, kind),
			});
			connections.push(GraphConnection {
				from: root_id.to_string(),
				to: member.id.clone(),
				kind: ConnectionKind::Membership,
			});
		}

		for peer in &snapshot.peers {
			if peer.id.trim().is_empty() {
				return Err(DataIntegrityError::EmptyId("peer"));
			}
			if !seen.insert(peer.id.as_str()) {
				return Err(DataIntegrityError::DuplicateNode(peer.id.clone()));
			}
			let kind = if peer.external {
				NodeKind::ExternalPeer
			} else {
				NodeKind::InternalPeer
			};
			nodes.push(GraphNode {
				id: peer.id.clone(),
				kind,
				title: display_title(&peer.name, &peer.id),
				subtitle: peer.endpoint.clone(),
				status: peer.status.clone(),
				position: layout.place(placed, kind),
			});
			connections.push(GraphConnection {
				from: root_id.to_string(),
				to: peer.id.clone(),
				kind: ConnectionKind::Peering,
			});
		}

		let mut model = Self { nodes, connections };
		model.check_declared_links(&snapshot.links)?;
		model.validate()?;
		layout.settle(&mut model);
		Ok(model)
	}

	/// Provider-declared links must agree with the derived star.
	fn check_declared_links(&self, links: &[SnapshotLink]) -> Result<(), DataIntegrityError> {
		for link in links {
			for end in [&link.source, &link.target] {
				if self.node(end).is_none() {
					return Err(DataIntegrityError::DanglingConnection {
						from: link.source.clone(),
						to: link.target.clone(),
						missing: end.clone(),
					});
				}
			}
			if link.source != self.root().id {
				return Err(DataIntegrityError::DetachedConnection {
					from: link.source.clone(),
					to: link.target.clone(),
				});
			}
		}
		Ok(())
	}

	/// Checks the structural invariants: a single root, every connection
	/// anchored at the root and pointing at an existing node.
	pub fn validate(&self) -> Result<(), DataIntegrityError> {
		let roots = self
			.nodes
			.iter()
			.filter(|n| n.kind == NodeKind::NetworkGroup)
			.count();
		let root_id = match self.nodes.first() {
			Some(root) if roots == 1 && root.kind == NodeKind::NetworkGroup => &root.id,
			_ => return Err(DataIntegrityError::MissingRoot),
		};
		for conn in &self.connections {
			for end in [&conn.from, &conn.to] {
				if self.node(end).is_none() {
					return Err(DataIntegrityError::DanglingConnection {
						from: conn.from.clone(),
						to: conn.to.clone(),
						missing: end.clone(),
					});
				}
			}
			if &conn.from != root_id {
				return Err(DataIntegrityError::DetachedConnection {
					from: conn.from.clone(),
					to: conn.to.clone(),
				});
			}
		}
		Ok(())
	}

	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	pub fn connections(&self) -> &[GraphConnection] {
		&self.connections
	}

	/// The `NetworkGroup` node. Always the first node.
	pub fn root(&self) -> &GraphNode {
		&self.nodes[0]
	}

	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub(crate) fn nodes_mut(&mut self) -> &mut [GraphNode] {
		&mut self.nodes
	}

	/// Moves a node by `delta` model units. Returns false for unknown ids.
	pub fn translate_node(&mut self, id: &str, delta: Point) -> bool {
		match self.nodes.iter_mut().find(|n| n.id == id) {
			Some(node) => {
				node.position += delta;
				true
			}
			None => false,
		}
	}

	/// Render order, bottom first: ordinary nodes in snapshot order, then the
	/// root, then the selected node. Hit testing walks this in reverse.
	pub fn z_order(&self, selected: Option<&str>) -> Vec<&GraphNode> {
		let selected = selected.filter(|id| *id != self.root().id);
		let mut order: Vec<&GraphNode> = self
			.nodes
			.iter()
			.skip(1)
			.filter(|n| Some(n.id.as_str()) != selected)
			.collect();
		order.push(self.root());
		if let Some(node) = selected.and_then(|id| self.node(id)) {
			order.push(node);
		}
		order
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use crate::components::topology_graph::types::{Member, NetworkGroupInfo, Peer};

	/// Places every node at a fixed point so tests are deterministic.
	pub(crate) struct FixedLayout(pub Point);

	impl LayoutStrategy for FixedLayout {
		fn place(&mut self, _node_count: usize, _kind: NodeKind) -> Point {
			self.0
		}
	}

	pub(crate) fn member(id: &str, kind: MemberKind) -> Member {
		Member {
			id: id.into(),
			name: format!("{id}-name"),
			kind,
			ip: Some("10.0.0.2".into()),
			status: "running".into(),
		}
	}

	pub(crate) fn peer(id: &str, external: bool) -> Peer {
		Peer {
			id: id.into(),
			name: String::new(),
			external,
			endpoint: Some("203.0.113.7:51820".into()),
			status: "up".into(),
		}
	}

	pub(crate) fn snapshot(group: &str, members: Vec<Member>, peers: Vec<Peer>) -> TopologySnapshot {
		TopologySnapshot {
			group: NetworkGroupInfo {
				id: group.into(),
				name: "group".into(),
				status: "active".into(),
			},
			members,
			peers,
			links: Vec::new(),
		}
	}

	fn sample() -> TopologySnapshot {
		snapshot(
			"G",
			vec![
				member("A", MemberKind::Application),
				member("B", MemberKind::Addon),
			],
			vec![peer("C", true)],
		)
	}

	#[test]
	fn build_produces_star_topology() {
		let model = GraphModel::build(&sample(), &mut FixedLayout(Point::new(5.0, 5.0))).unwrap();

		assert_eq!(model.nodes().len(), 4);
		assert_eq!(model.connections().len(), 3);
		assert!(model.connections().iter().all(|c| c.from == "G"));
		assert_eq!(model.root().position, Point::ORIGIN);

		let kinds: Vec<_> = model.nodes().iter().map(|n| n.kind).collect();
		assert_eq!(
			kinds,
			vec![
				NodeKind::NetworkGroup,
				NodeKind::Application,
				NodeKind::Addon,
				NodeKind::ExternalPeer
			]
		);
		let peering = &model.connections()[2];
		assert_eq!((peering.to.as_str(), peering.kind), ("C", ConnectionKind::Peering));
	}

	#[test]
	fn empty_group_still_has_root() {
		let model = GraphModel::build(&snapshot("G", vec![], vec![]), &mut FixedLayout(Point::ORIGIN))
			.unwrap();
		assert_eq!(model.nodes().len(), 1);
		assert!(model.connections().is_empty());
		assert_eq!(model.root().kind, NodeKind::NetworkGroup);
	}

	#[test]
	fn missing_root_is_rejected() {
		let err = GraphModel::build(&snapshot("  ", vec![], vec![]), &mut FixedLayout(Point::ORIGIN))
			.unwrap_err();
		assert_eq!(err, DataIntegrityError::MissingRoot);
	}

	#[test]
	fn blank_member_and_peer_ids_are_rejected() {
		let mut blank = member("A", MemberKind::Application);
		blank.id = String::new();
		blank.name = String::new();
		let err = GraphModel::build(&snapshot("G", vec![blank], vec![]), &mut FixedLayout(Point::ORIGIN))
			.unwrap_err();
		assert_eq!(err, DataIntegrityError::EmptyId("member"));

		let snap = snapshot("G", vec![], vec![peer(" ", true)]);
		let err = GraphModel::build(&snap, &mut FixedLayout(Point::ORIGIN)).unwrap_err();
		assert_eq!(err, DataIntegrityError::EmptyId("peer"));
	}

	#[test]
	fn duplicate_ids_are_rejected() {
		let snap = snapshot("G", vec![member("A", MemberKind::Addon)], vec![peer("A", false)]);
		let err = GraphModel::build(&snap, &mut FixedLayout(Point::ORIGIN)).unwrap_err();
		assert_eq!(err, DataIntegrityError::DuplicateNode("A".into()));
	}

	#[test]
	fn dangling_declared_link_is_rejected() {
		let mut snap = sample();
		snap.links.push(SnapshotLink {
			source: "G".into(),
			target: "ghost".into(),
		});
		let err = GraphModel::build(&snap, &mut FixedLayout(Point::ORIGIN)).unwrap_err();
		assert!(matches!(
			err,
			DataIntegrityError::DanglingConnection { ref missing, .. } if missing == "ghost"
		));
	}

	#[test]
	fn member_to_member_link_is_rejected() {
		let mut snap = sample();
		snap.links.push(SnapshotLink {
			source: "A".into(),
			target: "B".into(),
		});
		let err = GraphModel::build(&snap, &mut FixedLayout(Point::ORIGIN)).unwrap_err();
		assert!(matches!(err, DataIntegrityError::DetachedConnection { .. }));
	}

	#[test]
	fn titles_fall_back_to_ids() {
		let model = GraphModel::build(&sample(), &mut FixedLayout(Point::ORIGIN)).unwrap();
		assert_eq!(model.node("C").unwrap().title, "C");
		assert_eq!(model.node("A").unwrap().title, "A-name");
	}

	#[test]
	fn z_order_puts_root_then_selection_on_top() {
		let model = GraphModel::build(&sample(), &mut FixedLayout(Point::ORIGIN)).unwrap();

		let ids = |sel: Option<&str>| -> Vec<String> {
			model.z_order(sel).into_iter().map(|n| n.id.clone()).collect()
		};
		assert_eq!(ids(None), vec!["A", "B", "C", "G"]);
		assert_eq!(ids(Some("A")), vec!["B", "C", "G", "A"]);
		assert_eq!(ids(Some("G")), vec!["A", "B", "C", "G"]);
		assert_eq!(ids(Some("nope")), vec!["A", "B", "C", "G"]);
	}

	#[test]
	fn translate_node_moves_known_nodes_only() {
		let mut model = GraphModel::build(&sample(), &mut FixedLayout(Point::ORIGIN)).unwrap();
		assert!(model.translate_node("B", Point::new(3.0, -4.0)));
		assert_eq!(model.node("B").unwrap().position, Point::new(3.0, -4.0));
		assert!(!model.translate_node("ghost", Point::new(1.0, 1.0)));
	}
}
