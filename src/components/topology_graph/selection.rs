//! Zero-or-one selected node, with change notification for detail panels.

use std::fmt;

use super::model::NodeId;

type Listener = Box<dyn FnMut(Option<&str>)>;

/// Handle returned by [`Selection::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptionId(usize);

/// Selected node id plus its subscribers. Listeners run on every change and
/// never on a no-op.
#[derive(Default)]
pub struct Selection {
	current: Option<NodeId>,
	listeners: Vec<(SubscriptionId, Listener)>,
	next_id: usize,
}

impl fmt::Debug for Selection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Selection")
			.field("current", &self.current)
			.field("listeners", &self.listeners.len())
			.finish()
	}
}

impl Selection {
	pub fn selected(&self) -> Option<&str> {
		self.current.as_deref()
	}

	pub fn subscribe(&mut self, listener: impl FnMut(Option<&str>) + 'static) -> SubscriptionId {
		let id = SubscriptionId(self.next_id);
		self.next_id += 1;
		self.listeners.push((id, Box::new(listener)));
		id
	}

	pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		let before = self.listeners.len();
		self.listeners.retain(|(sid, _)| *sid != id);
		self.listeners.len() != before
	}

	/// Selects `id`, or deselects it if it is already selected.
	pub fn toggle(&mut self, id: &str) -> bool {
		if self.selected() == Some(id) {
			self.set(None)
		} else {
			self.set(Some(id))
		}
	}

	pub fn clear(&mut self) -> bool {
		self.set(None)
	}

	/// Returns whether the selection changed.
	pub fn set(&mut self, id: Option<&str>) -> bool {
		if self.selected() == id {
			return false;
		}
		self.current = id.map(str::to_string);
		let current = self.current.as_deref();
		for (_, listener) in &mut self.listeners {
			listener(current);
		}
		true
	}
}
