//! The state registry
//!
//! One `StateRegistry` holds every piece of client state as an observable
//! cell. The presentation layer gets it by reference, reads and writes cells
//! through the typed accessors, or addresses them by [`CellId`] with JSON
//! values.
//!
//! # Example
//!
//! ```rust
//! use finance_store::registry::{CellId, StateRegistry};
//!
//! let registry = StateRegistry::new();
//! assert_eq!(registry.filter_month().get(), -1);
//!
//! registry.filter_month().set(3);
//! registry.set_json(CellId::FilterYear, serde_json::json!(2023)).unwrap();
//! assert_eq!(registry.filter_year().get(), 2023);
//! ```

mod cell_id;

use std::io::Write;

use serde_json::{Map, Value};

use crate::audit::{AuditLogger, ChangeJournal};
use crate::config::Settings;
use crate::error::{StoreError, StoreResult};
use crate::models::filter;
use crate::models::{Balance, Budget, LinkToken, Money, Rule, Transaction};
use crate::selectors::{self, BudgetProgress};
use crate::store::{Cell, Derived, Subscription};

pub use cell_id::CellId;

/// Apply `$body` to the cell named by `$id`, derived cells included
macro_rules! read_cell {
    ($registry:expr, $id:expr, |$cell:ident| $body:expr) => {
        match $id {
            CellId::Balances => {
                let $cell = &$registry.balances;
                $body
            }
            CellId::Transactions => {
                let $cell = &$registry.transactions;
                $body
            }
            CellId::LinkToken => {
                let $cell = &$registry.link_token;
                $body
            }
            CellId::IsPageLoaded => {
                let $cell = &$registry.is_page_loaded;
                $body
            }
            CellId::IsBokehInitialized => {
                let $cell = &$registry.is_bokeh_initialized;
                $body
            }
            CellId::IsPlaidLinkInitialized => {
                let $cell = &$registry.is_plaid_link_initialized;
                $body
            }
            CellId::FilterMonth => {
                let $cell = &$registry.filter_month;
                $body
            }
            CellId::FilterYear => {
                let $cell = &$registry.filter_year;
                $body
            }
            CellId::FilterYearlyTransactions => {
                let $cell = &$registry.filter_yearly_transactions;
                $body
            }
            CellId::YearlyTransactions => {
                let $cell = &$registry.yearly_transactions;
                $body
            }
            CellId::Budget => {
                let $cell = &$registry.budget;
                $body
            }
            CellId::Rules => {
                let $cell = &$registry.rules;
                $body
            }
            CellId::FilteredTransactions => {
                let $cell = &$registry.filtered_transactions;
                $body
            }
            CellId::BudgetProgress => {
                let $cell = &$registry.budget_progress;
                $body
            }
        }
    };
}

/// Apply `$body` to a writable cell, or evaluate `$derived` for a derived one
macro_rules! write_cell {
    ($registry:expr, $id:expr, |$cell:ident| $body:expr, derived => $derived:expr) => {
        match $id {
            CellId::Balances => {
                let $cell = &$registry.balances;
                $body
            }
            CellId::Transactions => {
                let $cell = &$registry.transactions;
                $body
            }
            CellId::LinkToken => {
                let $cell = &$registry.link_token;
                $body
            }
            CellId::IsPageLoaded => {
                let $cell = &$registry.is_page_loaded;
                $body
            }
            CellId::IsBokehInitialized => {
                let $cell = &$registry.is_bokeh_initialized;
                $body
            }
            CellId::IsPlaidLinkInitialized => {
                let $cell = &$registry.is_plaid_link_initialized;
                $body
            }
            CellId::FilterMonth => {
                let $cell = &$registry.filter_month;
                $body
            }
            CellId::FilterYear => {
                let $cell = &$registry.filter_year;
                $body
            }
            CellId::FilterYearlyTransactions => {
                let $cell = &$registry.filter_yearly_transactions;
                $body
            }
            CellId::YearlyTransactions => {
                let $cell = &$registry.yearly_transactions;
                $body
            }
            CellId::Budget => {
                let $cell = &$registry.budget;
                $body
            }
            CellId::Rules => {
                let $cell = &$registry.rules;
                $body
            }
            CellId::FilteredTransactions | CellId::BudgetProgress => $derived,
        }
    };
}

/// Every observable piece of client state
#[derive(Debug)]
pub struct StateRegistry {
    settings: Settings,

    balances: Cell<Vec<Balance>>,
    transactions: Cell<Vec<Transaction>>,
    link_token: Cell<Vec<LinkToken>>,
    is_page_loaded: Cell<bool>,
    is_bokeh_initialized: Cell<bool>,
    is_plaid_link_initialized: Cell<bool>,
    filter_month: Cell<i32>,
    filter_year: Cell<i32>,
    filter_yearly_transactions: Cell<i32>,
    yearly_transactions: Cell<Vec<Transaction>>,
    budget: Cell<Budget>,
    rules: Cell<Vec<Rule>>,

    filtered_transactions: Derived<Vec<Transaction>>,
    budget_progress: Derived<Vec<BudgetProgress>>,
}

impl StateRegistry {
    /// Create a registry with default settings and every cell at its
    /// initial value
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let transactions: Cell<Vec<Transaction>> =
            Cell::named(CellId::Transactions.as_str(), Vec::new());
        let filter_month = Cell::named(CellId::FilterMonth.as_str(), filter::UNSET);
        let filter_year = Cell::named(CellId::FilterYear.as_str(), filter::UNSET);
        let budget = Cell::named(CellId::Budget.as_str(), Budget::new());

        let filtered_transactions = {
            let (all, month, year) =
                (transactions.clone(), filter_month.clone(), filter_year.clone());
            Derived::with_policy(
                CellId::FilteredTransactions.as_str(),
                &[&transactions, &filter_month, &filter_year],
                settings.recompute_policy,
                move || {
                    let (month, year) = (month.get(), year.get());
                    all.with(|all| selectors::filter_by_period(all, month, year))
                },
            )
        };

        let budget_progress = {
            let (amounts, filtered) = (budget.clone(), filtered_transactions.clone());
            let excluded = settings.excluded_budget_categories.clone();
            Derived::with_policy(
                CellId::BudgetProgress.as_str(),
                &[&budget, &filtered_transactions],
                settings.recompute_policy,
                move || {
                    let transactions = filtered.get();
                    amounts.with(|b| selectors::budget_progress(b, &transactions, &excluded))
                },
            )
        };

        tracing::debug!(policy = ?settings.recompute_policy, "state registry created");

        Self {
            settings,
            balances: Cell::named(CellId::Balances.as_str(), Vec::new()),
            transactions,
            link_token: Cell::named(CellId::LinkToken.as_str(), Vec::new()),
            is_page_loaded: Cell::named(CellId::IsPageLoaded.as_str(), false),
            is_bokeh_initialized: Cell::named(CellId::IsBokehInitialized.as_str(), false),
            is_plaid_link_initialized: Cell::named(CellId::IsPlaidLinkInitialized.as_str(), false),
            filter_month,
            filter_year,
            filter_yearly_transactions: Cell::named(
                CellId::FilterYearlyTransactions.as_str(),
                filter::UNSET,
            ),
            yearly_transactions: Cell::named(CellId::YearlyTransactions.as_str(), Vec::new()),
            budget,
            rules: Cell::named(CellId::Rules.as_str(), Vec::new()),
            filtered_transactions,
            budget_progress,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn balances(&self) -> &Cell<Vec<Balance>> {
        &self.balances
    }

    pub fn transactions(&self) -> &Cell<Vec<Transaction>> {
        &self.transactions
    }

    /// Link token for the account-linking widget; one token expected
    pub fn link_token(&self) -> &Cell<Vec<LinkToken>> {
        &self.link_token
    }

    pub fn is_page_loaded(&self) -> &Cell<bool> {
        &self.is_page_loaded
    }

    pub fn is_bokeh_initialized(&self) -> &Cell<bool> {
        &self.is_bokeh_initialized
    }

    pub fn is_plaid_link_initialized(&self) -> &Cell<bool> {
        &self.is_plaid_link_initialized
    }

    /// Month filter, 1-12 or `-1` for none
    pub fn filter_month(&self) -> &Cell<i32> {
        &self.filter_month
    }

    /// Year filter, a calendar year or `-1` for none
    pub fn filter_year(&self) -> &Cell<i32> {
        &self.filter_year
    }

    pub fn filter_yearly_transactions(&self) -> &Cell<i32> {
        &self.filter_yearly_transactions
    }

    pub fn yearly_transactions(&self) -> &Cell<Vec<Transaction>> {
        &self.yearly_transactions
    }

    pub fn budget(&self) -> &Cell<Budget> {
        &self.budget
    }

    pub fn rules(&self) -> &Cell<Vec<Rule>> {
        &self.rules
    }

    /// Transactions within the current month/year filter
    pub fn filtered_transactions(&self) -> &Derived<Vec<Transaction>> {
        &self.filtered_transactions
    }

    /// Budget against spending over the filtered transactions
    pub fn budget_progress(&self) -> &Derived<Vec<BudgetProgress>> {
        &self.budget_progress
    }

    /// Current value of a cell as JSON
    pub fn get_json(&self, id: CellId) -> StoreResult<Value> {
        read_cell!(self, id, |cell| cell.to_json())
    }

    /// Replace a writable cell's value from JSON
    ///
    /// Fails with `Json` if the value does not fit the cell's type (the cell
    /// is left as it was) and with `ReadOnly` for derived cells.
    pub fn set_json(&self, id: CellId, value: Value) -> StoreResult<()> {
        tracing::debug!(cell = %id, "set from JSON");
        write_cell!(
            self,
            id,
            |cell| {
                cell.set(serde_json::from_value(value)?);
                Ok(())
            },
            derived => Err(StoreError::ReadOnly(id.to_string()))
        )
    }

    /// Observe a cell as JSON; called now and on every change
    pub fn subscribe_json(&self, id: CellId, observer: impl Fn(&Value) + 'static) -> Subscription {
        read_cell!(self, id, |cell| cell.subscribe(move |value| {
            match serde_json::to_value(value) {
                Ok(json) => observer(&json),
                Err(e) => tracing::warn!(
                    cell = %id,
                    error = %e,
                    "cell value is not representable as JSON"
                ),
            }
        }))
    }

    /// Every writable cell as one JSON object keyed by cell name
    pub fn snapshot(&self) -> StoreResult<Value> {
        let mut object = Map::new();
        for id in CellId::WRITABLE {
            object.insert(id.to_string(), self.get_json(id)?);
        }
        Ok(Value::Object(object))
    }

    /// Put every cell back to its initial value, notifying observers
    pub fn reset(&self) {
        tracing::debug!("resetting state registry");
        self.balances.set(Vec::new());
        self.transactions.set(Vec::new());
        self.link_token.set(Vec::new());
        self.is_page_loaded.set(false);
        self.is_bokeh_initialized.set(false);
        self.is_plaid_link_initialized.set(false);
        self.clear_filters();
        self.yearly_transactions.set(Vec::new());
        self.budget.set(Budget::new());
        self.rules.set(Vec::new());
    }

    /// The link token, if one has been stored
    pub fn current_link_token(&self) -> Option<LinkToken> {
        self.link_token.with(|tokens| tokens.first().cloned())
    }

    /// Set the month, year and yearly-transactions filters back to `-1`
    pub fn clear_filters(&self) {
        self.filter_month.set(filter::UNSET);
        self.filter_year.set(filter::UNSET);
        self.filter_yearly_transactions.set(filter::UNSET);
    }

    /// Append a rule unless an identical one exists
    ///
    /// Returns whether the rule was added. A duplicate leaves the cell
    /// untouched and notifies nobody.
    pub fn add_rule(&self, rule: Rule) -> bool {
        if self.rules.with(|rules| rules.contains(&rule)) {
            tracing::debug!(rule = %rule, "rule already present");
            return false;
        }

        tracing::debug!(rule = %rule, "adding rule");
        self.rules.update(|rules| {
            let mut rules = rules.clone();
            rules.push(rule);
            rules
        });
        true
    }

    /// Remove the rule at `index`; later rules shift down by one
    pub fn remove_rule(&self, index: usize) -> StoreResult<Rule> {
        let mut rules = self.rules.get();
        if index >= rules.len() {
            return Err(StoreError::rule_not_found(index));
        }

        let removed = rules.remove(index);
        tracing::debug!(index, rule = %removed, "removing rule");
        self.rules.set(rules);
        Ok(removed)
    }

    /// Set the budgeted amount for one category
    pub fn set_budget_category(&self, category: impl Into<String>, amount: Money) {
        let category = category.into();
        self.budget.update(|budget| {
            let mut budget = budget.clone();
            budget.set_category(category, amount);
            budget
        });
    }

    /// Align the budget with the configured category list
    pub fn sync_budget_categories(&self) {
        let categories = &self.settings.budget_categories;
        self.budget.update(|budget| {
            let mut budget = budget.clone();
            budget.sync_categories(categories.as_slice());
            budget
        });
    }

    /// Start journaling cell changes to `writer`
    ///
    /// Returns `None` when auditing is disabled in the settings.
    pub fn start_journal<W: Write + 'static>(&self, writer: W) -> Option<ChangeJournal<W>> {
        if !self.settings.audit.enabled {
            tracing::debug!("audit journal disabled");
            return None;
        }
        Some(ChangeJournal::attach(
            self,
            AuditLogger::new(writer),
            &self.settings.audit,
        ))
    }
}

impl Default for StateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A cell's current value as JSON
trait ToJson {
    fn to_json(&self) -> StoreResult<Value>;
}

impl<T: serde::Serialize + Clone + 'static> ToJson for Cell<T> {
    fn to_json(&self) -> StoreResult<Value> {
        self.with(|value| serde_json::to_value(value).map_err(StoreError::from))
    }
}

impl<T: serde::Serialize + Clone + PartialEq + 'static> ToJson for Derived<T> {
    fn to_json(&self) -> StoreResult<Value> {
        Ok(serde_json::to_value(self.get())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn tx(id: &str, cents: i64, month: u32, category: &str) -> Transaction {
        Transaction::new(
            id,
            "acc",
            id,
            Money::from_cents(cents),
            NaiveDate::from_ymd_opt(2023, month, 1).unwrap(),
        )
        .with_category(category)
    }

    #[test]
    fn test_initial_values() {
        let registry = StateRegistry::new();

        assert!(registry.balances().get().is_empty());
        assert!(registry.transactions().get().is_empty());
        assert!(registry.link_token().get().is_empty());
        assert!(!registry.is_page_loaded().get());
        assert!(!registry.is_bokeh_initialized().get());
        assert!(!registry.is_plaid_link_initialized().get());
        assert_eq!(registry.filter_month().get(), -1);
        assert_eq!(registry.filter_year().get(), -1);
        assert_eq!(registry.filter_yearly_transactions().get(), -1);
        assert!(registry.yearly_transactions().get().is_empty());
        assert!(registry.budget().get().is_empty());
        assert!(registry.rules().get().is_empty());
    }

    #[test]
    fn test_initial_snapshot() {
        let registry = StateRegistry::new();
        assert_eq!(
            registry.snapshot().unwrap(),
            json!({
                "balances": [],
                "transactions": [],
                "link_token": [],
                "is_page_loaded": false,
                "is_bokeh_initialized": false,
                "is_plaid_link_initialized": false,
                "filter_month": -1,
                "filter_year": -1,
                "filter_yearly_transactions": -1,
                "yearly_transactions": [],
                "budget": {},
                "rules": []
            })
        );
    }

    #[test]
    fn test_filter_scenario_leaves_budget_alone() {
        let registry = StateRegistry::new();
        assert_eq!(registry.filter_month().get(), -1);
        assert_eq!(registry.filter_year().get(), -1);

        registry.filter_month().set(3);
        registry.filter_year().set(2023);

        assert_eq!(registry.filter_month().get(), 3);
        assert_eq!(registry.filter_year().get(), 2023);
        assert_eq!(registry.get_json(CellId::Budget).unwrap(), json!({}));
    }

    #[test]
    fn test_balances_scenario() {
        let registry = StateRegistry::new();
        registry
            .set_json(CellId::Balances, json!([{"id": 1, "amount": 100}]))
            .unwrap();

        assert_eq!(
            registry.get_json(CellId::Balances).unwrap(),
            json!([{"id": 1, "amount": 100}])
        );
        assert_eq!(registry.balances().get()[0].get("id"), Some(&json!(1)));
        assert!(registry.transactions().get().is_empty());
    }

    #[test]
    fn test_json_values_read_back_unchanged() {
        let registry = StateRegistry::new();
        let values = [
            (
                CellId::Transactions,
                json!([{
                    "transaction_id": "t1",
                    "amount": 12.345,
                    "date": 1577836800000_i64,
                    "datestr": "2020-01-01",
                    "pending": false
                }]),
            ),
            (CellId::Budget, json!({"TRAVEL": 100, "MEDICAL": 20.125})),
            (
                CellId::Rules,
                json!([{
                    "search_str": "A",
                    "transaction_field": "name",
                    "categorize": "X",
                    "note": "manual"
                }]),
            ),
            (CellId::LinkToken, json!(["link-sandbox-1"])),
        ];

        for (id, value) in values {
            registry.set_json(id, value.clone()).unwrap();
            assert_eq!(registry.get_json(id).unwrap(), value, "{}", id);
        }
    }

    #[test]
    fn test_epoch_dates_are_filtered() {
        let registry = StateRegistry::new();
        registry
            .set_json(
                CellId::Transactions,
                json!([
                    {"transaction_id": "a", "amount": 1, "date": 1577836800000_i64},
                    {"transaction_id": "b", "amount": 2, "date": 1612137600000_i64}
                ]),
            )
            .unwrap();

        registry.filter_year().set(2021);

        let filtered = registry.filtered_transactions().get();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].transaction_id(), Some("b"));
    }

    #[test]
    fn test_out_of_range_filter_accepted() {
        let registry = StateRegistry::new();
        registry.filter_month().set(42);
        assert_eq!(registry.filter_month().get(), 42);
    }

    #[test]
    fn test_set_json_type_mismatch_keeps_value() {
        let registry = StateRegistry::new();
        let err = registry
            .set_json(CellId::IsPageLoaded, json!("yes"))
            .unwrap_err();

        assert!(matches!(err, StoreError::Json(_)));
        assert!(!registry.is_page_loaded().get());
    }

    #[test]
    fn test_derived_cells_are_read_only() {
        let registry = StateRegistry::new();
        let err = registry
            .set_json(CellId::BudgetProgress, json!([]))
            .unwrap_err();

        assert!(err.is_read_only());
        assert_eq!(registry.get_json(CellId::FilteredTransactions).unwrap(), json!([]));
    }

    #[test]
    fn test_subscribe_json() {
        let registry = StateRegistry::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = registry.subscribe_json(CellId::FilterYear, move |v| {
            sink.borrow_mut().push(v.clone())
        });

        registry.filter_year().set(2024);
        sub.unsubscribe();
        registry.filter_year().set(2025);

        assert_eq!(*seen.borrow(), vec![json!(-1), json!(2024)]);
    }

    #[test]
    fn test_filtered_transactions_follow_filters() {
        let registry = StateRegistry::new();
        registry.transactions().set(vec![
            tx("jan", 100, 1, "TRAVEL"),
            tx("mar", 200, 3, "TRAVEL"),
        ]);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = registry.filtered_transactions().subscribe(move |txs: &Vec<Transaction>| {
            sink.borrow_mut().push(txs.len());
        });

        registry.filter_month().set(3);
        registry.filter_year().set(2023);
        registry.clear_filters();

        // Both transactions are from 2023, so the year filter changes nothing
        // and is not propagated.
        assert_eq!(*seen.borrow(), vec![2, 1, 2]);
    }

    #[test]
    fn test_budget_progress_tracks_budget_and_filters() {
        let registry = StateRegistry::new();
        registry.transactions().set(vec![
            tx("a", 1500, 1, "FOOD_AND_DRINK"),
            tx("b", 2500, 2, "FOOD_AND_DRINK"),
            tx("c", -90000, 2, "INCOME"),
        ]);
        registry.set_budget_category("FOOD_AND_DRINK", Money::from_cents(5000));
        registry.set_budget_category("INCOME", Money::from_cents(100000));

        let progress = registry.budget_progress().get();
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].spent, Money::from_cents(4000));

        registry.filter_month().set(2);
        assert_eq!(
            registry.budget_progress().get()[0].spent,
            Money::from_cents(2500)
        );
    }

    #[test]
    fn test_add_rule_ignores_duplicates() {
        let registry = StateRegistry::new();
        let notifications = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&notifications);
        let _sub = registry.rules().subscribe(move |_: &Vec<Rule>| *counter.borrow_mut() += 1);

        assert!(registry.add_rule(Rule::new("HOME TELE", "name", "Utilities")));
        assert!(!registry.add_rule(Rule::new("HOME TELE", "name", "Utilities")));
        assert!(registry.add_rule(Rule::new("HOME TELE", "name", "Phone")));

        assert_eq!(registry.rules().get().len(), 2);
        assert_eq!(*notifications.borrow(), 3);
    }

    #[test]
    fn test_remove_rule() {
        let registry = StateRegistry::new();
        registry.add_rule(Rule::new("A", "name", "X"));
        registry.add_rule(Rule::new("B", "name", "Y"));
        registry.add_rule(Rule::new("C", "name", "Z"));

        let removed = registry.remove_rule(1).unwrap();
        assert_eq!(removed.search_str, "B");

        let remaining: Vec<String> = registry
            .rules()
            .get()
            .into_iter()
            .map(|r| r.search_str)
            .collect();
        assert_eq!(remaining, vec!["A", "C"]);

        let err = registry.remove_rule(2).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(registry.rules().get().len(), 2);
    }

    #[test]
    fn test_sync_budget_categories() {
        let mut settings = Settings::default();
        settings.budget_categories = vec!["TRAVEL".into(), "MEDICAL".into()];
        let registry = StateRegistry::with_settings(settings);

        registry.set_budget_category("TRAVEL", Money::from_cents(1000));
        registry.set_budget_category("UNKNOWN", Money::from_cents(1));
        registry.sync_budget_categories();

        let budget = registry.budget().get();
        assert_eq!(budget.get_category("TRAVEL"), Some(Money::from_cents(1000)));
        assert_eq!(budget.get_category("MEDICAL"), Some(Money::zero()));
        assert_eq!(budget.get_category("UNKNOWN"), None);
    }

    #[test]
    fn test_current_link_token() {
        let registry = StateRegistry::new();
        assert!(registry.current_link_token().is_none());

        registry.link_token().set(vec![LinkToken::new("link-sandbox-1")]);
        assert_eq!(
            registry.current_link_token(),
            Some(LinkToken::new("link-sandbox-1"))
        );
    }

    #[test]
    fn test_reset_restores_initial_values() {
        let registry = StateRegistry::new();
        let initial = registry.snapshot().unwrap();

        registry.is_page_loaded().set(true);
        registry.filter_yearly_transactions().set(2021);
        registry.add_rule(Rule::new("A", "name", "X"));
        registry.set_budget_category("TRAVEL", Money::from_cents(10));

        registry.reset();
        assert_eq!(registry.snapshot().unwrap(), initial);
    }

    #[test]
    fn test_registries_are_independent() {
        let first = StateRegistry::new();
        let second = StateRegistry::new();

        first.is_bokeh_initialized().set(true);
        assert!(!second.is_bokeh_initialized().get());
    }

    #[test]
    fn test_disabled_audit_has_no_journal() {
        let mut settings = Settings::default();
        settings.audit.enabled = false;
        let registry = StateRegistry::with_settings(settings);

        assert!(registry.start_journal(Vec::new()).is_none());
    }
}
