//! Ordered observer storage shared by cells and derived cells
//!
//! Observers are kept in registration order. Dispatch walks a snapshot of the
//! list so callbacks may subscribe or unsubscribe while a round is running;
//! an observer removed mid-round is skipped for the rest of that round.

use std::cell::{Cell as FlagCell, RefCell};
use std::rc::{Rc, Weak};

/// Callback invoked with a cell's new value
pub(crate) type Callback<T> = Rc<dyn Fn(&T)>;

struct Entry<T> {
    id: u64,
    active: FlagCell<bool>,
    callback: Callback<T>,
}

struct Inner<T> {
    next_id: u64,
    entries: Vec<Rc<Entry<T>>>,
}

/// Registration-ordered list of observers for one cell
pub(crate) struct ObserverList<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

/// Non-owning handle used by subscriptions to remove themselves
pub(crate) struct WeakObserverList<T> {
    inner: Weak<RefCell<Inner<T>>>,
}

impl<T: 'static> ObserverList<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Append an observer and return its id
    pub(crate) fn insert(&self, callback: Callback<T>) -> u64 {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push(Rc::new(Entry {
            id,
            active: FlagCell::new(true),
            callback,
        }));
        id
    }

    /// Remove an observer; returns false if it was already gone
    pub(crate) fn remove(&self, id: u64) -> bool {
        remove_entry(&self.inner, id)
    }

    pub(crate) fn downgrade(&self) -> WeakObserverList<T> {
        WeakObserverList {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call every active observer with `value`, in registration order
    pub(crate) fn notify(&self, value: &T) {
        let snapshot: Vec<Rc<Entry<T>>> = self.inner.borrow().entries.clone();
        for entry in snapshot {
            if entry.active.get() {
                (entry.callback)(value);
            }
        }
    }
}

impl<T> WeakObserverList<T> {
    /// Remove an observer if the list is still alive
    pub(crate) fn remove(&self, id: u64) -> bool {
        match self.inner.upgrade() {
            Some(inner) => remove_entry(&inner, id),
            None => false,
        }
    }
}

fn remove_entry<T>(inner: &RefCell<Inner<T>>, id: u64) -> bool {
    // The removed entry is dropped after the borrow ends: its callback may own
    // handles whose drop glue touches other cells.
    let removed = {
        let mut inner = inner.borrow_mut();
        match inner.entries.iter().position(|e| e.id == id) {
            Some(pos) => {
                let entry = inner.entries.remove(pos);
                entry.active.set(false);
                Some(entry)
            }
            None => None,
        }
    };
    removed.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(log: &Rc<RefCell<Vec<String>>>, tag: &'static str) -> Callback<i32> {
        let log = Rc::clone(log);
        Rc::new(move |v: &i32| log.borrow_mut().push(format!("{}:{}", tag, v)))
    }

    #[test]
    fn test_notify_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let list = ObserverList::new();
        list.insert(recorder(&log, "a"));
        list.insert(recorder(&log, "b"));
        list.insert(recorder(&log, "c"));

        list.notify(&7);

        assert_eq!(*log.borrow(), vec!["a:7", "b:7", "c:7"]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let list: ObserverList<i32> = ObserverList::new();
        let id = list.insert(Rc::new(|_: &i32| {}));

        assert!(list.remove(id));
        assert!(!list.remove(id));
        assert!(list.is_empty());
    }

    #[test]
    fn test_removed_mid_round_is_skipped() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let list = Rc::new(ObserverList::new());

        let weak = list.downgrade();
        let second_id = Rc::new(FlagCell::new(0u64));
        let target = Rc::clone(&second_id);
        list.insert(Rc::new(move |_: &i32| {
            weak.remove(target.get());
        }));
        second_id.set(list.insert(recorder(&log, "second")));

        list.notify(&1);

        assert!(log.borrow().is_empty());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_weak_list_outlived() {
        let list: ObserverList<i32> = ObserverList::new();
        let id = list.insert(Rc::new(|_: &i32| {}));
        let weak = list.downgrade();
        drop(list);

        assert!(!weak.remove(id));
    }
}
