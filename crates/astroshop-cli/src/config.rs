use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;

use astroshop_generate::GenerateOptions;

use crate::CliError;

/// Configuration sources shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// TOML file with generation options; flags override its values.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Seed of the random generator.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Target number of customers.
    #[arg(long)]
    pub customers: Option<usize>,
    /// Number of sales to generate before filtering.
    #[arg(long)]
    pub sales: Option<usize>,
    /// Fraction of completed sales that receive a return.
    #[arg(long)]
    pub return_fraction: Option<f64>,
    /// First day of the generation window (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub start: Option<NaiveDate>,
    /// Last day of the generation window (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub end: Option<NaiveDate>,
    /// Output directory for exported tables.
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,
    /// Probability that a customer email is corrupted.
    #[arg(long)]
    pub email_noise_rate: Option<f64>,
}

/// Merge defaults, the optional TOML file and flag overrides, then validate.
pub fn load_options(args: &ConfigArgs) -> Result<GenerateOptions, CliError> {
    let mut options = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GenerateOptions::default(),
    };

    if let Some(seed) = args.seed {
        options.seed = seed;
    }
    if let Some(customers) = args.customers {
        options.customers = customers;
    }
    if let Some(sales) = args.sales {
        options.sales = sales;
    }
    if let Some(fraction) = args.return_fraction {
        options.return_fraction = fraction;
    }
    if let Some(start) = args.start {
        options.window_start = start;
    }
    if let Some(end) = args.end {
        options.window_end = end;
    }
    if let Some(out) = &args.out {
        options.out_dir = out.clone();
    }
    if let Some(rate) = args.email_noise_rate {
        options.email_noise_rate = rate;
    }

    options.validate()?;
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("astroshop_config_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).expect("write config");
        path
    }

    #[test]
    fn defaults_without_file_or_flags() {
        let options = load_options(&ConfigArgs::default()).expect("defaults");
        assert_eq!(options, GenerateOptions::default());
    }

    #[test]
    fn flags_override_file_values() {
        let path = write_config(
            "seed = 7\ncustomers = 20\nsales = 100\nwindow_start = \"2025-01-01\"\nwindow_end = \"2025-01-10\"\n",
        );
        let args = ConfigArgs {
            config: Some(path),
            sales: Some(250),
            ..ConfigArgs::default()
        };
        let options = load_options(&args).expect("merged options");
        assert_eq!(options.seed, 7);
        assert_eq!(options.customers, 20);
        assert_eq!(options.sales, 250);
        assert_eq!(
            options.window_end,
            NaiveDate::from_ymd_opt(2025, 1, 10).expect("date")
        );
        assert_eq!(options.return_fraction, GenerateOptions::default().return_fraction);
    }

    #[test]
    fn invalid_merged_options_are_rejected() {
        let args = ConfigArgs {
            start: NaiveDate::from_ymd_opt(2025, 3, 1),
            end: NaiveDate::from_ymd_opt(2025, 2, 1),
            ..ConfigArgs::default()
        };
        assert!(matches!(load_options(&args), Err(CliError::Generation(_))));
    }

    #[test]
    fn malformed_toml_is_reported() {
        let path = write_config("seed = \"not a number\"\n");
        let args = ConfigArgs {
            config: Some(path),
            ..ConfigArgs::default()
        };
        assert!(matches!(load_options(&args), Err(CliError::Toml(_))));
    }
}
