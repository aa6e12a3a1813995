//! Change journal over a state registry
//!
//! Subscribes to every writable cell and turns each change into an
//! [`AuditEntry`]. The first value seen for a cell is its baseline and is not
//! logged. Every entry goes to the logger; only the most recent ones are kept
//! in memory, and older history is read back from the log with
//! [`read_entries`](super::read_entries).

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::rc::Rc;

use serde_json::Value;

use crate::config::AuditSettings;
use crate::registry::{CellId, StateRegistry};
use crate::store::Subscription;

use super::diff::{generate_detailed_diff, generate_diff};
use super::entry::AuditEntry;
use super::logger::AuditLogger;

struct JournalState<W: Write> {
    logger: AuditLogger<W>,
    detailed_diff: bool,
    last: HashMap<CellId, Value>,
    recent: VecDeque<AuditEntry>,
    retained: usize,
    recorded: usize,
    failed_writes: usize,
}

impl<W: Write> JournalState<W> {
    fn record(&mut self, cell: CellId, value: &Value) {
        let Some(before) = self.last.insert(cell, value.clone()) else {
            return;
        };

        let diff_summary = if self.detailed_diff {
            let changes = generate_detailed_diff(&before, value, cell.as_str());
            (!changes.is_empty()).then(|| changes.join(", "))
        } else {
            generate_diff(&before, value)
        };

        let entry = AuditEntry::new(cell, before, value.clone(), diff_summary);
        if let Err(e) = self.logger.log(&entry) {
            self.failed_writes += 1;
            tracing::warn!(cell = %cell, error = %e, "failed to write audit entry");
        }
        self.recorded += 1;

        if self.retained == 0 {
            return;
        }
        if self.recent.len() == self.retained {
            self.recent.pop_front();
        }
        self.recent.push_back(entry);
    }
}

/// Records every cell change of a registry while attached
pub struct ChangeJournal<W: Write> {
    state: Rc<RefCell<JournalState<W>>>,
    subscriptions: Vec<Subscription>,
}

impl<W: Write + 'static> ChangeJournal<W> {
    /// Subscribe to every writable cell of `registry`
    pub fn attach(
        registry: &StateRegistry,
        logger: AuditLogger<W>,
        settings: &AuditSettings,
    ) -> Self {
        let state = Rc::new(RefCell::new(JournalState {
            logger,
            detailed_diff: settings.detailed_diff,
            last: HashMap::new(),
            recent: VecDeque::with_capacity(settings.retained_entries),
            retained: settings.retained_entries,
            recorded: 0,
            failed_writes: 0,
        }));

        let subscriptions = CellId::WRITABLE
            .into_iter()
            .map(|cell| {
                let state = Rc::clone(&state);
                registry.subscribe_json(cell, move |value| {
                    state.borrow_mut().record(cell, value)
                })
            })
            .collect();

        tracing::debug!("audit journal attached");
        Self {
            state,
            subscriptions,
        }
    }

    /// The most recent entries still held in memory, oldest first
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.state.borrow().recent.iter().cloned().collect()
    }

    /// Number of entries recorded since attaching
    pub fn recorded(&self) -> usize {
        self.state.borrow().recorded
    }

    /// Entries that could not be written to the logger
    pub fn failed_writes(&self) -> usize {
        self.state.borrow().failed_writes
    }

    /// Inspect the underlying logger
    pub fn with_logger<R>(&self, f: impl FnOnce(&AuditLogger<W>) -> R) -> R {
        f(&self.state.borrow().logger)
    }

    /// Stop recording; already recorded entries stay available
    pub fn detach(&self) {
        for subscription in &self.subscriptions {
            subscription.unsubscribe();
        }
        tracing::debug!("audit journal detached");
    }

    pub fn is_attached(&self) -> bool {
        self.subscriptions.iter().any(Subscription::is_active)
    }
}
