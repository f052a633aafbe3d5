//! Observer primitive for event fan-out
//!
//! One [`EventBus`] instance backs each session event channel (message
//! received, face-up changed, battery voltage changed) and doubles as the hook
//! point for transient acknowledgement listeners. Delivery is synchronous and
//! single-threaded, matching the cooperative delivery discipline of the
//! notification transport; the type is deliberately `!Send`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Handle identifying one attached callback, used to detach it later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Listener<T> {
    id: ListenerId,
    callback: Callback<T>,
}

/// A list of callbacks invoked synchronously, in attachment order
///
/// Attaching or detaching from inside a callback running under [`notify`] is
/// safe: notification iterates over a snapshot of the listeners present when it
/// began, so a callback attached mid-notify first fires on the next event, and
/// a callback detached mid-notify by an earlier listener is skipped. Panics in
/// callbacks propagate to the notifier, never swallowed.
///
/// [`notify`]: EventBus::notify
pub struct EventBus<T> {
    listeners: RefCell<Vec<Listener<T>>>,
    next_id: Cell<u64>,
}

impl<T: 'static> EventBus<T> {
    /// Creates an empty bus
    pub fn new() -> Self {
        EventBus {
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Attaches a callback, returning the handle needed to detach it
    pub fn attach(&self, callback: impl FnMut(&T) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push(Listener {
            id,
            callback: Rc::new(RefCell::new(callback)),
        });
        id
    }

    /// Detaches a callback; returns false if the handle was not attached
    pub fn detach(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|listener| listener.id != id);
        listeners.len() != before
    }

    /// Invokes every currently attached callback with the value
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<(ListenerId, Callback<T>)> = self
            .listeners
            .borrow()
            .iter()
            .map(|listener| (listener.id, Rc::clone(&listener.callback)))
            .collect();
        for (id, callback) in snapshot {
            let still_attached = self
                .listeners
                .borrow()
                .iter()
                .any(|listener| listener.id == id);
            if still_attached {
                (callback.borrow_mut())(value);
            }
        }
    }

    /// Number of attached callbacks
    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Whether no callbacks are attached
    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }
}

impl<T: 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_in_attachment_order() {
        let bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Rc::clone(&order);
            bus.attach(move |_: &u8| order.borrow_mut().push(tag));
        }

        bus.notify(&0);
        assert_eq!(&*order.borrow(), &["first", "second", "third"]);
    }

    #[test]
    fn test_detach() {
        let bus = EventBus::new();
        let count = Rc::new(Cell::new(0u32));

        let counter = Rc::clone(&count);
        let id = bus.attach(move |_: &u8| counter.set(counter.get() + 1));

        bus.notify(&0);
        assert!(bus.detach(id));
        bus.notify(&0);

        assert_eq!(count.get(), 1);
        assert!(!bus.detach(id));
        assert!(bus.is_empty());
    }

    #[test]
    fn test_attach_during_notify_fires_next_time() {
        let bus = Rc::new(EventBus::new());
        let count = Rc::new(Cell::new(0u32));

        let inner_bus = Rc::clone(&bus);
        let inner_count = Rc::clone(&count);
        bus.attach(move |_: &u8| {
            let counter = Rc::clone(&inner_count);
            inner_bus.attach(move |_: &u8| counter.set(counter.get() + 1));
        });

        bus.notify(&0);
        assert_eq!(count.get(), 0, "listener attached mid-notify must not fire");

        bus.notify(&0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_detach_during_notify_skips_listener() {
        let bus = Rc::new(EventBus::new());
        let fired = Rc::new(Cell::new(false));

        let victim_fired = Rc::clone(&fired);
        // Attach the victim second so the detaching listener runs first
        let detacher_bus = Rc::clone(&bus);
        let victim_id = Rc::new(Cell::new(Option::<ListenerId>::None));
        let victim_slot = Rc::clone(&victim_id);
        bus.attach(move |_: &u8| {
            if let Some(id) = victim_slot.get() {
                detacher_bus.detach(id);
            }
        });
        let id = bus.attach(move |_: &u8| victim_fired.set(true));
        victim_id.set(Some(id));

        bus.notify(&0);
        assert!(!fired.get(), "listener detached mid-notify must be skipped");
        assert_eq!(bus.len(), 1);
    }
}
