//! Read-only cells computed from other cells
//!
//! A `Derived<T>` is idle until someone observes it. While idle, `get()`
//! recomputes from the sources on every call. The first observer connects it
//! to its sources; from then on the value is cached and recomputed after each
//! source change. When the last observer leaves, it disconnects from its
//! sources and drops the cache, so no notification chain outlives its use.

use std::cell::{Cell as FlagCell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::observers::{Callback, ObserverList};
use super::subscription::Subscription;
use super::{Readable, Source};

/// When a connected derived cell forwards a recomputed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecomputePolicy {
    /// Notify observers only when the recomputed value differs
    #[default]
    Memoized,
    /// Notify observers after every source change
    Always,
}

struct DerivedInner<T> {
    name: &'static str,
    compute: Box<dyn Fn() -> T>,
    sources: Vec<Rc<dyn Source>>,
    policy: RecomputePolicy,
    connected: FlagCell<bool>,
    dispatching: FlagCell<bool>,
    rerun: FlagCell<bool>,
    cache: RefCell<Option<T>>,
    observers: ObserverList<T>,
    upstream: RefCell<Vec<Subscription>>,
}

/// A read-only cell whose value is a pure function of its sources
pub struct Derived<T> {
    inner: Rc<DerivedInner<T>>,
}

impl<T: Clone + PartialEq + 'static> Derived<T> {
    /// Derive a value from `sources` with the default policy
    ///
    /// `compute` reads the sources itself (usually through captured cell
    /// handles); `sources` only says which changes should trigger it.
    pub fn new(
        name: &'static str,
        sources: &[&dyn Source],
        compute: impl Fn() -> T + 'static,
    ) -> Self {
        Self::with_policy(name, sources, RecomputePolicy::default(), compute)
    }

    pub fn with_policy(
        name: &'static str,
        sources: &[&dyn Source],
        policy: RecomputePolicy,
        compute: impl Fn() -> T + 'static,
    ) -> Self {
        Self {
            inner: Rc::new(DerivedInner {
                name,
                compute: Box::new(compute),
                sources: sources.iter().map(|s| s.share()).collect(),
                policy,
                connected: FlagCell::new(false),
                dispatching: FlagCell::new(false),
                rerun: FlagCell::new(false),
                cache: RefCell::new(None),
                observers: ObserverList::new(),
                upstream: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    pub fn policy(&self) -> RecomputePolicy {
        self.inner.policy
    }

    /// Whether the cell is currently wired to its sources
    pub fn is_connected(&self) -> bool {
        self.inner.connected.get()
    }

    /// Current value: cached while observed, recomputed otherwise
    pub fn get(&self) -> T {
        if self.inner.connected.get() {
            if let Some(value) = self.inner.cache.borrow().as_ref() {
                return value.clone();
            }
        }
        (self.inner.compute)()
    }

    /// Call `observer` with the current value, then again on every
    /// propagated change
    ///
    /// The first observer connects the cell, which computes the value once.
    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> Subscription {
        let callback: Callback<T> = Rc::new(observer);
        let subscription = self.attach(Rc::clone(&callback));
        let value = self.get();
        callback(&value);
        subscription
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.len()
    }

    fn attach(&self, callback: Callback<T>) -> Subscription {
        let id = self.inner.observers.insert(callback);
        if !self.inner.connected.get() {
            connect(&self.inner);
        }

        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                if inner.observers.remove(id) && inner.observers.is_empty() {
                    disconnect(&inner);
                }
            }
        })
    }
}

fn connect<T: Clone + PartialEq + 'static>(inner: &Rc<DerivedInner<T>>) {
    tracing::debug!(
        cell = inner.name,
        sources = inner.sources.len(),
        "connecting derived cell"
    );
    inner.connected.set(true);
    *inner.cache.borrow_mut() = Some((inner.compute)());

    let upstream: Vec<Subscription> = inner
        .sources
        .iter()
        .map(|source| {
            let weak: Weak<DerivedInner<T>> = Rc::downgrade(inner);
            source.watch(Rc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    on_source_change(&inner);
                }
            }))
        })
        .collect();
    *inner.upstream.borrow_mut() = upstream;
}

fn disconnect<T>(inner: &DerivedInner<T>) {
    tracing::debug!(cell = inner.name, "disconnecting derived cell");
    inner.connected.set(false);
    let upstream = std::mem::take(&mut *inner.upstream.borrow_mut());
    for subscription in &upstream {
        subscription.unsubscribe();
    }
    inner.cache.borrow_mut().take();
}

/// Ends a propagation round, even one cut short by a panicking observer
struct DispatchGuard<'a, T>(&'a DerivedInner<T>);

impl<T> Drop for DispatchGuard<'_, T> {
    fn drop(&mut self) {
        self.0.dispatching.set(false);
        self.0.rerun.set(false);
    }
}

/// Recompute and propagate after a source change
///
/// Source changes made by observers while a round is running collapse into
/// one more round after it.
fn on_source_change<T: Clone + PartialEq + 'static>(inner: &DerivedInner<T>) {
    if inner.dispatching.get() {
        tracing::trace!(cell = inner.name, "deferring reentrant recompute");
        inner.rerun.set(true);
        return;
    }

    inner.dispatching.set(true);
    let _guard = DispatchGuard(inner);

    loop {
        let value = (inner.compute)();
        let changed = {
            let mut cache = inner.cache.borrow_mut();
            let changed = cache.as_ref() != Some(&value);
            *cache = Some(value.clone());
            changed
        };

        if changed || inner.policy == RecomputePolicy::Always {
            tracing::trace!(cell = inner.name, changed, "propagating derived value");
            inner.observers.notify(&value);
        }

        if !inner.rerun.replace(false) {
            break;
        }
    }
}

impl<S: Clone + 'static> Cell<S> {
    /// Derive a read-only view of this cell through `f`
    pub fn map<T: Clone + PartialEq + 'static>(
        &self,
        name: &'static str,
        f: impl Fn(&S) -> T + 'static,
    ) -> Derived<T> {
        let source = self.clone();
        Derived::new(name, &[self], move || source.with(|value| f(value)))
    }
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Derived<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Derived")
            .field("name", &self.inner.name)
            .field("policy", &self.inner.policy)
            .field("connected", &self.inner.connected.get())
            .field("cache", &*self.inner.cache.borrow())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Readable<T> for Derived<T> {
    fn get(&self) -> T {
        Derived::get(self)
    }

    fn subscribe<F: Fn(&T) + 'static>(&self, observer: F) -> Subscription {
        Derived::subscribe(self, observer)
    }
}

impl<T: Clone + PartialEq + 'static> Source for Derived<T> {
    fn watch(&self, on_change: Rc<dyn Fn()>) -> Subscription {
        self.attach(Rc::new(move |_: &T| on_change()))
    }

    fn share(&self) -> Rc<dyn Source> {
        Rc::new(self.clone())
    }
}
