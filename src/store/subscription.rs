//! Deregistration handle returned by `subscribe`

use std::cell::RefCell;
use std::fmt;

/// Handle that stops an observer from receiving further notifications
///
/// Dropping a `Subscription` does not deregister the observer; call
/// [`Subscription::unsubscribe`]. Unsubscribing more than once is a no-op.
#[must_use = "keep the Subscription to be able to unsubscribe later"]
pub struct Subscription {
    cancel: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: RefCell::new(Some(Box::new(cancel))),
        }
    }

    /// Stop future notifications for this observer
    pub fn unsubscribe(&self) {
        let cancel = self.cancel.borrow_mut().take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    /// Whether `unsubscribe` has not been called yet
    pub fn is_active(&self) -> bool {
        self.cancel.borrow().is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
