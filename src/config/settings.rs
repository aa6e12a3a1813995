//! Settings for the state registry
//!
//! Controls how derived cells propagate, whether cell changes are journaled,
//! and which spending categories the budget tracks.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{StoreError, StoreResult};
use crate::models::Money;
use crate::store::RecomputePolicy;

/// Primary personal-finance categories reported by the aggregator
pub const DEFAULT_BUDGET_CATEGORIES: &[&str] = &[
    "INCOME",
    "TRANSFER_IN",
    "TRANSFER_OUT",
    "LOAN_PAYMENTS",
    "BANK_FEES",
    "ENTERTAINMENT",
    "FOOD_AND_DRINK",
    "GENERAL_MERCHANDISE",
    "HOME_IMPROVEMENT",
    "MEDICAL",
    "PERSONAL_CARE",
    "GENERAL_SERVICES",
    "GOVERNMENT_AND_NON_PROFIT",
    "TRANSPORTATION",
    "TRAVEL",
    "RENT_AND_UTILITIES",
];

/// Audit journal settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSettings {
    /// Whether the registry journals cell changes
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Use nested, per-element diffs instead of top-level summaries
    #[serde(default)]
    pub detailed_diff: bool,

    /// Most recent entries the journal keeps in memory; older ones are only
    /// in the log
    #[serde(default = "default_retained_entries")]
    pub retained_entries: usize,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            detailed_diff: false,
            retained_entries: default_retained_entries(),
        }
    }
}

/// Settings for finance-store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Propagation policy for the registry's derived cells
    #[serde(default)]
    pub recompute_policy: RecomputePolicy,

    #[serde(default)]
    pub audit: AuditSettings,

    /// Categories the budget is synced against
    #[serde(default = "default_budget_categories")]
    pub budget_categories: Vec<String>,

    /// Categories left out of budget progress
    #[serde(default = "default_excluded_categories")]
    pub excluded_budget_categories: Vec<String>,

    /// Default currency symbol
    #[serde(default = "default_currency")]
    pub currency_symbol: String,
}

fn default_true() -> bool {
    true
}

fn default_retained_entries() -> usize {
    100
}

fn default_budget_categories() -> Vec<String> {
    DEFAULT_BUDGET_CATEGORIES
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn default_excluded_categories() -> Vec<String> {
    vec!["TRANSFER_IN".to_string(), "INCOME".to_string()]
}

fn default_currency() -> String {
    "$".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            recompute_policy: RecomputePolicy::default(),
            audit: AuditSettings::default(),
            budget_categories: default_budget_categories(),
            excluded_budget_categories: default_excluded_categories(),
            currency_symbol: default_currency(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON
    pub fn from_json_str(contents: &str) -> StoreResult<Self> {
        serde_json::from_str(contents)
            .map_err(|e| StoreError::Config(format!("Failed to parse settings: {}", e)))
    }

    /// Parse settings from YAML
    pub fn from_yaml_str(contents: &str) -> StoreResult<Self> {
        serde_yaml::from_str(contents)
            .map_err(|e| StoreError::Config(format!("Failed to parse settings: {}", e)))
    }

    /// Load settings from a file, or use defaults if it doesn't exist
    ///
    /// `.yaml`/`.yml` files are read as YAML, anything else as JSON.
    pub fn load(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "settings file missing, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Io(format!("Failed to read settings file: {}", e)))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents),
            _ => Self::from_json_str(&contents),
        }
    }

    /// Format an amount with the configured currency symbol
    pub fn format_money(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.currency_symbol)
    }
}
