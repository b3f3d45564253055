//! Domain snapshot structures supplied by the network data provider.
//!
//! The engine treats a snapshot as read-only input: it never fetches or
//! mutates one, it only derives a [`GraphModel`](super::model::GraphModel)
//! from it.

use serde::Deserialize;

/// The network group at the center of the topology.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NetworkGroupInfo {
	/// Stable group id. Becomes the root node id.
	pub id: String,
	/// Display name. Falls back to `id` when empty.
	#[serde(default)]
	pub name: String,
	/// Free-form status string, e.g. "active".
	#[serde(default)]
	pub status: String,
}

/// Declared type of a group member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
	Application,
	Addon,
}

/// An application or add-on attached to the network group.
#[derive(Clone, Debug, Deserialize)]
pub struct Member {
	pub id: String,
	#[serde(default)]
	pub name: String,
	pub kind: MemberKind,
	/// Address inside the network, shown as the node subtitle.
	#[serde(default)]
	pub ip: Option<String>,
	#[serde(default)]
	pub status: String,
}

/// A peer connected to the network group.
#[derive(Clone, Debug, Deserialize)]
pub struct Peer {
	pub id: String,
	#[serde(default)]
	pub name: String,
	/// External peers live outside the provider's infrastructure.
	#[serde(default)]
	pub external: bool,
	/// Public endpoint, shown as the node subtitle.
	#[serde(default)]
	pub endpoint: Option<String>,
	#[serde(default)]
	pub status: String,
}

/// A connection as declared by the provider. Cross-checked against the
/// derived star topology at build time.
#[derive(Clone, Debug, Deserialize)]
pub struct SnapshotLink {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
}

/// Complete snapshot of one network group: the group, its members and peers.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TopologySnapshot {
	pub group: NetworkGroupInfo,
	#[serde(default)]
	pub members: Vec<Member>,
	#[serde(default)]
	pub peers: Vec<Peer>,
	/// Optional provider-declared links.
	#[serde(default)]
	pub links: Vec<SnapshotLink>,
}
