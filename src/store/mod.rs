//! Observable state primitives
//!
//! - [`Cell`]: a writable value with synchronous change notification.
//! - [`Derived`]: a read-only value computed from one or more sources.
//! - [`Subscription`]: handle that deregisters an observer.
//!
//! # Model
//!
//! Everything here is single-threaded (`Rc`/`RefCell`) and synchronous:
//! `set` returns only after every observer has run. Observers are notified
//! in the order they subscribed, and subscribing calls the observer once
//! right away with the current value.

mod cell;
mod derived;
mod observers;
mod subscription;

use std::rc::Rc;

pub use cell::Cell;
pub use derived::{Derived, RecomputePolicy};
pub use subscription::Subscription;

/// Read side shared by [`Cell`] and [`Derived`]
///
/// Consumers written against this trait cannot tell a plain cell from a
/// derived one.
pub trait Readable<T> {
    /// Snapshot of the current value
    fn get(&self) -> T;

    /// Observe the value: called now, then on every change
    fn subscribe<F: Fn(&T) + 'static>(&self, observer: F) -> Subscription;
}

/// Something a [`Derived`] cell can depend on
pub trait Source {
    /// Run `on_change` after each change, without an initial call
    fn watch(&self, on_change: Rc<dyn Fn()>) -> Subscription;

    /// Owned, type-erased handle to the same source
    fn share(&self) -> Rc<dyn Source>;
}
