//! Transient acknowledgement listener
//!
//! [`AckWaiter`] implements the attach-wait-detach idiom behind synchronous
//! request/acknowledgement correlation: it hooks the message-received bus,
//! records the first message of the expected kind, and detaches its listener
//! when dropped so every exit path of the wait (success, timeout, error)
//! releases the hook.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::{Message, MessageKind};
use super::event::{EventBus, ListenerId};

/// Records the first observed message of a given kind
pub struct AckWaiter {
    bus: Rc<EventBus<Message>>,
    listener: ListenerId,
    slot: Rc<RefCell<Option<Message>>>,
}

impl AckWaiter {
    /// Registers a listener for the next message of kind `ack`
    ///
    /// Registration must happen before the request is written so the
    /// acknowledgement cannot slip past unobserved.
    pub fn register(bus: &Rc<EventBus<Message>>, ack: MessageKind) -> Self {
        let slot = Rc::new(RefCell::new(None));
        let recorder = Rc::clone(&slot);
        let listener = bus.attach(move |message: &Message| {
            let mut slot = recorder.borrow_mut();
            if slot.is_none() && message.kind == ack {
                *slot = Some(message.clone());
            }
        });
        AckWaiter {
            bus: Rc::clone(bus),
            listener,
            slot,
        }
    }

    /// Takes the recorded acknowledgement, if one has arrived
    pub fn take(&self) -> Option<Message> {
        self.slot.borrow_mut().take()
    }
}

impl Drop for AckWaiter {
    fn drop(&mut self) {
        self.bus.detach(self.listener);
    }
}
