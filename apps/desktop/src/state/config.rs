//! # Configuration State
//!
//! Application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`JOBCOST_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use directories::{ProjectDirs, UserDirs};
use jobcost_core::money::format_inr;
use jobcost_core::Money;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Shown in report headers and footers
    pub business_name: String,

    /// Currency symbol for on-screen amounts. PDFs always use "Rs."
    pub currency_symbol: String,

    /// Where generated reports are written when no path is given
    pub reports_dir: PathBuf,

    /// Load demo data into an empty database on startup
    pub seed_demo: bool,

    /// Database file override (`JOBCOST_DB_PATH`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

impl Default for ConfigState {
    /// ## Default Values
    /// - Business: "JobCost Pro"
    /// - Currency: ₹
    /// - Reports: the documents folder, falling back to the app data folder
    /// - Demo data: enabled
    fn default() -> Self {
        ConfigState {
            business_name: "JobCost Pro".to_string(),
            currency_symbol: "₹".to_string(),
            reports_dir: default_reports_dir(),
            seed_demo: true,
            db_path: None,
        }
    }
}

impl ConfigState {
    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `JOBCOST_BUSINESS_NAME`: Business name on reports
    /// - `JOBCOST_CURRENCY_SYMBOL`: Currency symbol
    /// - `JOBCOST_REPORTS_DIR`: Report output folder
    /// - `JOBCOST_SEED_DEMO`: `false`/`0`/`no` disables demo data
    /// - `JOBCOST_DB_PATH`: Database file
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = ConfigState::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(name) = var("JOBCOST_BUSINESS_NAME") {
            config.business_name = name;
        }

        if let Some(symbol) = var("JOBCOST_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(dir) = var("JOBCOST_REPORTS_DIR") {
            config.reports_dir = PathBuf::from(dir);
        }

        if let Some(flag) = var("JOBCOST_SEED_DEMO") {
            config.seed_demo = !matches!(flag.to_ascii_lowercase().as_str(), "false" | "0" | "no" | "off");
        }

        config.db_path = var("JOBCOST_DB_PATH").map(PathBuf::from);

        config
    }

    /// Formats a paise amount with the configured symbol.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(12345678), "₹1,23,456.78");
    /// ```
    pub fn format_currency(&self, paise: i64) -> String {
        format_inr(Money::from_paise(paise), &self.currency_symbol)
    }
}

/// Platform project directories for the app.
pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "jobcostpro", "JobCost Pro")
}

fn default_reports_dir() -> PathBuf {
    UserDirs::new()
        .and_then(|dirs| dirs.document_dir().map(|d| d.join("JobCost Pro Reports")))
        .or_else(|| project_dirs().map(|dirs| dirs.data_dir().join("reports")))
        .unwrap_or_else(|| PathBuf::from("reports"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ConfigState::from_vars(lookup(&[]));
        assert_eq!(config.business_name, "JobCost Pro");
        assert_eq!(config.currency_symbol, "₹");
        assert!(config.seed_demo);
        assert_eq!(config.db_path, None);
    }

    #[test]
    fn test_overrides() {
        let config = ConfigState::from_vars(lookup(&[
            ("JOBCOST_BUSINESS_NAME", "Sri Murugan Printers"),
            ("JOBCOST_CURRENCY_SYMBOL", "Rs. "),
            ("JOBCOST_REPORTS_DIR", "/tmp/reports"),
            ("JOBCOST_SEED_DEMO", "false"),
            ("JOBCOST_DB_PATH", "/tmp/jobcost.db"),
        ]));

        assert_eq!(config.business_name, "Sri Murugan Printers");
        assert_eq!(config.currency_symbol, "Rs.");
        assert_eq!(config.reports_dir, PathBuf::from("/tmp/reports"));
        assert!(!config.seed_demo);
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/jobcost.db")));
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let config = ConfigState::from_vars(lookup(&[("JOBCOST_BUSINESS_NAME", "  ")]));
        assert_eq!(config.business_name, "JobCost Pro");
    }

    #[test]
    fn test_format_currency() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(12345678), "₹1,23,456.78");
        assert_eq!(config.format_currency(0), "₹0.00");
        assert_eq!(config.format_currency(-550), "-₹5.50");
    }
}
