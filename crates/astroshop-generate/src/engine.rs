use std::path::{Path, PathBuf};
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{error, info, warn};

use astroshop_core::{Dataset, DateWindow, validate_dataset};

use crate::catalog::{ASTRONOMY_CATALOG, build_catalog};
use crate::customers::{derive_customers, filter_consistent};
use crate::errors::GenerationError;
use crate::metrics::apply_customer_metrics;
use crate::model::{GenerateOptions, GenerationIssue, GenerationReport, TableReport};
use crate::output::csv::write_dataset;
use crate::pool::build_identity_pool;
use crate::reconcile::reconcile_sale_status;
use crate::returns::generate_returns;
use crate::sales::generate_sales;

pub const REPORT_FILE: &str = "generation_report.json";

/// Final tables and the report of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub dataset: Dataset,
    pub report: GenerationReport,
}

/// Entry point for generating the storefront dataset.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    /// Run every stage in memory. Nothing touches the filesystem.
    ///
    /// Fatal conditions (empty pool or catalog, no surviving customers)
    /// stop the run before later stages execute.
    pub fn generate(&self) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        let window = self.options.validate()?;
        let run_id = uuid::Uuid::new_v4().to_string();
        let mut report = GenerationReport::new(run_id.clone(), self.options.seed, &window);
        let mut rng = ChaCha8Rng::seed_from_u64(self.options.seed);

        info!(
            run_id = %run_id,
            seed = self.options.seed,
            customers = self.options.customers,
            sales = self.options.sales,
            window_start = %window.start(),
            window_end = %window.end(),
            "generation started"
        );

        let products = build_catalog(ASTRONOMY_CATALOG);
        info!(stage = "catalog", products = products.len(), "catalog built");

        let pool = build_identity_pool(self.options.customers, &window, &mut rng);
        report.identities_pooled = pool.len() as u64;

        let generated = generate_sales(&pool, &products, self.options.sales, &window, &mut rng)?;
        report.sales_generated = generated.sales.len() as u64;
        report.sale_dates_clamped = generated.clamped_dates;
        if generated.clamped_dates > 0 {
            report.record_warning(GenerationIssue {
                code: "sale_date_clamped".to_string(),
                message: format!(
                    "{} sale dates clamped to the window end",
                    generated.clamped_dates
                ),
                row_id: None,
            });
        }

        let derived = derive_customers(
            &generated.sales,
            self.options.customers,
            self.options.email_noise_rate,
            &mut rng,
        )
        .inspect_err(|err| error!(error = %err, "customer derivation failed"))?;
        let mut customers = derived.customers;
        report.noisy_emails = derived.noisy_emails;

        let consistent = filter_consistent(&customers, generated);
        report.sales_dropped_unselected = consistent.dropped_unselected;
        report.sales_dropped_predated = consistent.dropped_predated;
        let mut sales = consistent.sales;
        let sale_items = consistent.items;

        let batch = generate_returns(
            &sales,
            &sale_items,
            self.options.return_fraction,
            &window,
            &mut rng,
        )?;
        report.returns_requested = batch.requested;
        report.returns_skipped = batch.skipped.len() as u64;
        for skip in &batch.skipped {
            report.record_warning(GenerationIssue {
                code: skip.reason.code().to_string(),
                message: skip.reason.message().to_string(),
                row_id: Some(skip.sale_id.clone()),
            });
        }

        let summary = reconcile_sale_status(&mut sales, &sale_items, &batch.returns, &batch.items);
        report.sales_reconciled = summary.changed();

        report.customers_without_purchases =
            apply_customer_metrics(&mut customers, &sales, &sale_items);

        let dataset = Dataset {
            customers,
            products,
            sales,
            sale_items,
            returns: batch.returns,
            return_items: batch.items,
        };
        check_invariants(&dataset, &window)?;

        for sale in &dataset.sales {
            *report
                .sales_by_status
                .entry(sale.status.label().to_string())
                .or_insert(0) += 1;
        }
        report.tables = dataset
            .row_counts()
            .iter()
            .map(|(table, rows)| TableReport {
                table: (*table).to_string(),
                rows: *rows as u64,
            })
            .collect();
        report.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            run_id = %run_id,
            customers = dataset.customers.len(),
            sales = dataset.sales.len(),
            returns = dataset.returns.len(),
            customers_without_purchases = report.customers_without_purchases,
            duration_ms = report.duration_ms,
            "generation completed"
        );
        info!(sales_by_status = ?report.sales_by_status, "sales by status");

        Ok(GenerationResult { dataset, report })
    }

    /// Write the tables and the report into the configured output directory.
    ///
    /// The in-memory result is left untouched on failure.
    pub fn export(&self, result: &mut GenerationResult) -> Result<PathBuf, GenerationError> {
        let out_dir = self.options.out_dir.clone();
        let bytes = write_dataset(&out_dir, &result.dataset)
            .inspect_err(|err| warn!(out_dir = %out_dir.display(), error = %err, "export failed"))?;
        result.report.bytes_written = bytes;
        write_report(&out_dir, &result.report)?;
        info!(out_dir = %out_dir.display(), bytes_written = bytes, "dataset exported");
        Ok(out_dir)
    }

    /// Generate and export in one call.
    pub fn run(&self) -> Result<GenerationResult, GenerationError> {
        let mut result = self.generate()?;
        self.export(&mut result)?;
        Ok(result)
    }
}

fn check_invariants(dataset: &Dataset, window: &DateWindow) -> Result<(), GenerationError> {
    validate_dataset(dataset, window).map_err(|err| {
        error!(error = %err, "generated dataset failed validation");
        GenerationError::from(err)
    })
}

fn write_report(dir: &Path, report: &GenerationReport) -> Result<(), GenerationError> {
    std::fs::write(dir.join(REPORT_FILE), serde_json::to_vec_pretty(report)?)?;
    Ok(())
}
