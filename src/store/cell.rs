//! Writable observable cell
//!
//! A `Cell<T>` is a cheap, clonable handle to one slot of shared state. All
//! clones see the same value and the same observer list.

use std::cell::{Cell as FlagCell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use super::observers::{Callback, ObserverList};
use super::subscription::Subscription;
use super::{Readable, Source};

struct CellInner<T> {
    name: &'static str,
    value: RefCell<T>,
    observers: ObserverList<T>,
    dispatching: FlagCell<bool>,
    pending: RefCell<VecDeque<T>>,
}

/// A named, observable, mutable value
pub struct Cell<T> {
    inner: Rc<CellInner<T>>,
}

/// Ends a notification round, even one cut short by a panicking observer
///
/// Sets queued behind an aborted round are dropped with it.
struct DispatchGuard<'a, T>(&'a CellInner<T>);

impl<T> Drop for DispatchGuard<'_, T> {
    fn drop(&mut self) {
        self.0.dispatching.set(false);
        if let Ok(mut pending) = self.0.pending.try_borrow_mut() {
            pending.clear();
        }
    }
}

impl<T: Clone + 'static> Cell<T> {
    /// Create an anonymous cell holding `value`
    pub fn new(value: T) -> Self {
        Self::named("cell", value)
    }

    /// Create a cell with a name used in diagnostics
    pub fn named(name: &'static str, value: T) -> Self {
        Self {
            inner: Rc::new(CellInner {
                name,
                value: RefCell::new(value),
                observers: ObserverList::new(),
                dispatching: FlagCell::new(false),
                pending: RefCell::new(VecDeque::new()),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Snapshot of the current value
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Borrow the current value without cloning it
    ///
    /// `f` must not write to this cell.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replace the value and notify every observer in subscription order
    ///
    /// A `set` issued from inside this cell's own notification round is
    /// queued and applied once the running round has finished.
    pub fn set(&self, value: T) {
        if self.inner.dispatching.get() {
            tracing::trace!(cell = self.inner.name, "queueing reentrant set");
            self.inner.pending.borrow_mut().push_back(value);
            return;
        }

        self.inner.dispatching.set(true);
        let _guard = DispatchGuard(&*self.inner);

        let mut next = Some(value);
        while let Some(value) = next {
            *self.inner.value.borrow_mut() = value;
            let snapshot = self.get();
            tracing::trace!(
                cell = self.inner.name,
                observers = self.inner.observers.len(),
                "dispatching"
            );
            self.inner.observers.notify(&snapshot);
            next = self.inner.pending.borrow_mut().pop_front();
        }
    }

    /// Replace the value with `f(current)`
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let current = self.get();
        self.set(f(&current));
    }

    /// Replace the value with `f(current)` unless `f` fails
    ///
    /// On error the value is unchanged, nobody is notified, and the error is
    /// handed back to the caller as is.
    pub fn try_update<E>(&self, f: impl FnOnce(&T) -> Result<T, E>) -> Result<(), E> {
        let current = self.get();
        let next = f(&current)?;
        self.set(next);
        Ok(())
    }

    /// Register `observer`, call it once with the current value, then on
    /// every later `set`/`update`
    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> Subscription {
        let callback: Callback<T> = Rc::new(observer);
        let subscription = self.attach(Rc::clone(&callback));
        let current = self.get();
        callback(&current);
        subscription
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.inner.observers.len()
    }

    fn attach(&self, callback: Callback<T>) -> Subscription {
        let id = self.inner.observers.insert(callback);
        let observers = self.inner.observers.downgrade();
        let name = self.inner.name;
        tracing::trace!(cell = name, id, "observer attached");
        Subscription::new(move || {
            if observers.remove(id) {
                tracing::trace!(cell = name, id, "observer detached");
            }
        })
    }
}

impl<T> Clone for Cell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Default + Clone + 'static> Default for Cell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Cell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("name", &self.inner.name)
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}

impl<T: Clone + 'static> Readable<T> for Cell<T> {
    fn get(&self) -> T {
        Cell::get(self)
    }

    fn subscribe<F: Fn(&T) + 'static>(&self, observer: F) -> Subscription {
        Cell::subscribe(self, observer)
    }
}

impl<T: Clone + 'static> Source for Cell<T> {
    fn watch(&self, on_change: Rc<dyn Fn()>) -> Subscription {
        self.attach(Rc::new(move |_: &T| on_change()))
    }

    fn share(&self) -> Rc<dyn Source> {
        Rc::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    fn record<T: Clone + 'static>(cell: &Cell<T>) -> (Rc<RefCell<Vec<T>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = cell.subscribe(move |v: &T| sink.borrow_mut().push(v.clone()));
        (seen, sub)
    }

    #[test]
    fn test_set_then_get() {
        let cell = Cell::new(vec![1, 2]);
        cell.set(vec![3]);
        assert_eq!(cell.get(), vec![3]);
    }

    #[test]
    fn test_update_applies_function() {
        let cell = Cell::new(10);
        cell.update(|v| v * 3);
        assert_eq!(cell.get(), 30);
    }

    #[test]
    fn test_try_update_error_leaves_value() {
        let cell = Cell::new(5);
        let (seen, _sub) = record(&cell);

        let result: Result<(), String> = cell.try_update(|_| Err("boom".to_string()));

        assert_eq!(result, Err("boom".to_string()));
        assert_eq!(cell.get(), 5);
        assert_eq!(*seen.borrow(), vec![5]);
    }

    #[test]
    fn test_try_update_ok() {
        let cell = Cell::new(5);
        let result: Result<(), String> = cell.try_update(|v| Ok(v + 1));
        assert!(result.is_ok());
        assert_eq!(cell.get(), 6);
    }

    #[test]
    fn test_subscribe_calls_immediately() {
        let cell = Cell::new("initial".to_string());
        let (seen, _sub) = record(&cell);
        assert_eq!(*seen.borrow(), vec!["initial".to_string()]);
    }

    #[test]
    fn test_observers_called_in_order_once_each() {
        let cell = Cell::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut subs = Vec::new();
        for tag in ["o1", "o2", "o3"] {
            let log = Rc::clone(&log);
            subs.push(cell.subscribe(move |v: &i32| log.borrow_mut().push((tag, *v))));
        }
        log.borrow_mut().clear();

        cell.set(4);

        assert_eq!(*log.borrow(), vec![("o1", 4), ("o2", 4), ("o3", 4)]);
    }

    #[test]
    fn test_set_equal_value_still_notifies() {
        let cell = Cell::new(false);
        let (seen, _sub) = record(&cell);
        cell.set(false);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let cell = Cell::new(0);
        let (seen, sub) = record(&cell);

        sub.unsubscribe();
        sub.unsubscribe();
        cell.set(1);

        assert_eq!(*seen.borrow(), vec![0]);
        assert_eq!(cell.observer_count(), 0);
    }

    #[test]
    fn test_clones_share_state() {
        let cell = Cell::new(1);
        let other = cell.clone();
        other.set(2);
        assert_eq!(cell.get(), 2);
    }

    #[test]
    fn test_observer_can_read_cell() {
        let cell = Cell::new(1);
        let reader = cell.clone();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = cell.subscribe(move |v: &i32| sink.borrow_mut().push(*v + reader.get()));

        cell.set(5);

        assert_eq!(*seen.borrow(), vec![2, 10]);
    }

    #[test]
    fn test_reentrant_set_is_deferred() {
        let cell = Cell::new(0);
        let writer = cell.clone();
        let _bump = cell.subscribe(move |v: &i32| {
            if *v == 1 {
                writer.set(2);
            }
        });
        let (seen, _sub) = record(&cell);

        cell.set(1);

        // The second observer sees 1 before the queued 2.
        assert_eq!(*seen.borrow(), vec![0, 1, 2]);
        assert_eq!(cell.get(), 2);
    }

    #[test]
    fn test_observer_unsubscribing_during_dispatch() {
        let cell = Cell::new(0);
        let holder: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let target = Rc::clone(&holder);
        let _first = cell.subscribe(move |v: &i32| {
            if *v == 1 {
                if let Some(sub) = target.borrow().as_ref() {
                    sub.unsubscribe();
                }
            }
        });
        let (seen, second) = record(&cell);
        *holder.borrow_mut() = Some(second);

        cell.set(1);

        assert_eq!(*seen.borrow(), vec![0]);
    }

    #[test]
    fn test_subscribing_during_dispatch() {
        let cell = Cell::new(0);
        let late_seen = Rc::new(RefCell::new(Vec::new()));
        let late_subs = Rc::new(RefCell::new(Vec::new()));

        let (source, sink, subs) = (cell.clone(), Rc::clone(&late_seen), Rc::clone(&late_subs));
        let _first = cell.subscribe(move |v: &i32| {
            if *v == 1 {
                let sink = Rc::clone(&sink);
                let sub = source.subscribe(move |v: &i32| sink.borrow_mut().push(*v));
                subs.borrow_mut().push(sub);
            }
        });

        cell.set(1);
        cell.set(2);

        // Called once on subscribing, not again in the round that added it.
        assert_eq!(*late_seen.borrow(), vec![1, 2]);
        assert_eq!(cell.observer_count(), 2);
    }

    #[test]
    fn test_panicking_update_leaves_value() {
        let cell = Cell::new(7);
        let (seen, _sub) = record(&cell);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            cell.update(|_: &i32| -> i32 { panic!("bad update") })
        }));

        assert!(result.is_err());
        assert_eq!(cell.get(), 7);
        assert_eq!(*seen.borrow(), vec![7]);
    }

    #[test]
    fn test_panicking_observer_drops_queued_sets() {
        let cell = Cell::new(0);
        let writer = cell.clone();
        let _faulty = cell.subscribe(move |v: &i32| {
            if *v == 1 {
                writer.set(99);
                panic!("observer failed");
            }
        });

        let result = panic::catch_unwind(AssertUnwindSafe(|| cell.set(1)));
        assert!(result.is_err());

        let (seen, _sub) = record(&cell);
        cell.set(2);

        assert_eq!(cell.get(), 2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }
}
