//! Errors surfaced to the collaborator when a snapshot cannot be turned into a graph.

/// A snapshot that would produce a corrupt graph. Fatal to the rebuild that
/// hit it; the previously built model stays in place.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DataIntegrityError {
	#[error("snapshot has no network group id")]
	MissingRoot,
	#[error("a {0} entry has an empty id")]
	EmptyId(&'static str),
	#[error("node id `{0}` appears more than once")]
	DuplicateNode(String),
	#[error("connection {from} -> {to} references unknown node `{missing}`")]
	DanglingConnection {
		from: String,
		to: String,
		missing: String,
	},
	#[error("connection {from} -> {to} does not originate at the network group")]
	DetachedConnection { from: String, to: String },
}
