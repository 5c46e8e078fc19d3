use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use astroshop_core::DateWindow;

use crate::errors::GenerationError;

/// Options for the generation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Seed of the single RNG shared by every stage.
    pub seed: u64,
    /// Target number of customers after derivation.
    pub customers: usize,
    /// Number of sales to generate before filtering.
    pub sales: usize,
    /// Fraction of completed sales that receive a return.
    pub return_fraction: f64,
    /// First day of the generation window.
    pub window_start: NaiveDate,
    /// Last day of the generation window (inclusive).
    pub window_end: NaiveDate,
    /// Directory where exported tables are written.
    pub out_dir: PathBuf,
    /// Probability that a customer email is corrupted.
    pub email_noise_rate: f64,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            customers: 1000,
            sales: 5000,
            return_fraction: 0.08,
            window_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            window_end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            out_dir: PathBuf::from("data"),
            email_noise_rate: 0.05,
        }
    }
}

impl GenerateOptions {
    /// Check option ranges and return the generation window.
    pub fn validate(&self) -> Result<DateWindow, GenerationError> {
        if self.customers == 0 {
            return Err(GenerationError::InvalidConfig(
                "customers must be greater than zero".to_string(),
            ));
        }
        if self.sales == 0 {
            return Err(GenerationError::InvalidConfig(
                "sales must be greater than zero".to_string(),
            ));
        }
        check_probability("return_fraction", self.return_fraction)?;
        check_probability("email_noise_rate", self.email_noise_rate)?;
        DateWindow::new(self.window_start, self.window_end)
            .map_err(|err| GenerationError::InvalidConfig(err.to_string()))
    }
}

fn check_probability(name: &str, value: f64) -> Result<(), GenerationError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(GenerationError::InvalidConfig(format!(
            "{name} must be within [0, 1], got {value}"
        )));
    }
    Ok(())
}

/// Row count of an exported table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReport {
    pub table: String,
    pub rows: u64,
}

/// Structured generation issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationIssue {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_id: Option<String>,
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub seed: u64,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub tables: Vec<TableReport>,
    pub identities_pooled: u64,
    pub sales_generated: u64,
    pub sales_dropped_unselected: u64,
    pub sales_dropped_predated: u64,
    pub sale_dates_clamped: u64,
    pub returns_requested: u64,
    pub returns_skipped: u64,
    pub sales_reconciled: u64,
    pub sales_by_status: BTreeMap<String, u64>,
    pub customers_without_purchases: u64,
    pub noisy_emails: u64,
    pub duration_ms: u64,
    pub bytes_written: u64,
    pub warnings_by_code: BTreeMap<String, u64>,
    pub warnings: Vec<GenerationIssue>,
}

impl GenerationReport {
    pub fn new(run_id: String, seed: u64, window: &DateWindow) -> Self {
        Self {
            run_id,
            seed,
            window_start: window.start(),
            window_end: window.end(),
            tables: Vec::new(),
            identities_pooled: 0,
            sales_generated: 0,
            sales_dropped_unselected: 0,
            sales_dropped_predated: 0,
            sale_dates_clamped: 0,
            returns_requested: 0,
            returns_skipped: 0,
            sales_reconciled: 0,
            sales_by_status: BTreeMap::new(),
            customers_without_purchases: 0,
            noisy_emails: 0,
            duration_ms: 0,
            bytes_written: 0,
            warnings_by_code: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    pub fn record_warning(&mut self, issue: GenerationIssue) {
        *self.warnings_by_code.entry(issue.code.clone()).or_insert(0) += 1;
        self.warnings.push(issue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_valid() {
        let window = GenerateOptions::default().validate().expect("valid defaults");
        assert_eq!(window.len_days(), 366);
    }

    #[test]
    fn rejects_out_of_range_fraction() {
        let options = GenerateOptions {
            return_fraction: 1.5,
            ..GenerateOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(GenerationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_nan_noise_rate() {
        let options = GenerateOptions {
            email_noise_rate: f64::NAN,
            ..GenerateOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn rejects_inverted_window() {
        let options = GenerateOptions {
            window_start: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap_or_default(),
            window_end: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
            ..GenerateOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(GenerationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn parses_partial_options_with_defaults() {
        let options: GenerateOptions =
            serde_json::from_str(r#"{"seed": 7, "window_start": "2025-01-01", "window_end": "2025-01-10"}"#)
                .expect("parse options");
        assert_eq!(options.seed, 7);
        assert_eq!(options.customers, 1000);
        assert_eq!(
            options.window_end,
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap_or_default()
        );
    }
}
