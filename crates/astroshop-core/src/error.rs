use thiserror::Error;

/// Core error type shared across astroshop crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The dataset violates one of its structural invariants.
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),
    /// A date window whose start lies after its end.
    #[error("invalid date window: {start} > {end}")]
    InvalidWindow {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
}

/// Convenience alias for results returned by astroshop crates.
pub type Result<T> = std::result::Result<T, Error>;
