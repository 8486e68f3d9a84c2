//! Observer registration for widget events.
//!
//! Each event kind has its own [`EventHub`]. Subscribing returns a
//! [`Subscription`] guard: dropping it unsubscribes, [`Subscription::detach`]
//! keeps the observer for the hub's lifetime.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Listener<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Listeners<T> {
	next_id: u64,
	entries: Vec<(u64, Listener<T>)>,
}

/// Fan-out point for one event kind. Cloning shares the same listener list.
pub struct EventHub<T> {
	listeners: Rc<RefCell<Listeners<T>>>,
}

impl<T> Clone for EventHub<T> {
	fn clone(&self) -> Self {
		Self {
			listeners: self.listeners.clone(),
		}
	}
}

impl<T: 'static> Default for EventHub<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: 'static> EventHub<T> {
	/// Creates a hub with no observers.
	pub fn new() -> Self {
		Self {
			listeners: Rc::new(RefCell::new(Listeners {
				next_id: 0,
				entries: Vec::new(),
			})),
		}
	}

	/// Registers an observer.
	pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
		let mut listeners = self.listeners.borrow_mut();
		let id = listeners.next_id;
		listeners.next_id += 1;
		let listener: Listener<T> = Rc::new(RefCell::new(callback));
		listeners.entries.push((id, listener));

		let weak: Weak<RefCell<Listeners<T>>> = Rc::downgrade(&self.listeners);
		Subscription {
			unsubscribe: Some(Box::new(move || {
				if let Some(listeners) = weak.upgrade() {
					listeners.borrow_mut().entries.retain(|(i, _)| *i != id);
				}
			})),
		}
	}

	/// Delivers `value` to every observer, in subscription order.
	///
	/// Observers may subscribe or unsubscribe from inside the callback; the
	/// change takes effect from the next emit.
	pub fn emit(&self, value: &T) {
		let snapshot: Vec<Listener<T>> = self
			.listeners
			.borrow()
			.entries
			.iter()
			.map(|(_, l)| l.clone())
			.collect();
		for listener in snapshot {
			(listener.borrow_mut())(value);
		}
	}

	/// Number of registered observers.
	pub fn len(&self) -> usize {
		self.listeners.borrow().entries.len()
	}

	/// Whether no observer is registered.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Keeps an observer registered while alive.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
	unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
	/// Keeps the observer registered for as long as the hub lives.
	pub fn detach(mut self) {
		self.unsubscribe = None;
	}

	/// Unsubscribes now.
	pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(unsubscribe) = self.unsubscribe.take() {
			unsubscribe();
		}
	}
}

/// Phase of a node drag gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragPhase {
	/// Pointer pressed on the node.
	Start,
	/// Node followed the pointer.
	Drag,
	/// Pointer released or cancelled.
	End,
}

/// Payload of the node drag event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeDragEvent {
	/// Which part of the gesture this is.
	pub phase: DragPhase,
	/// Dragged node id.
	pub node_id: String,
}
