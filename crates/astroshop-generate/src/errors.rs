use thiserror::Error;

/// Errors emitted by the generation pipeline.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("identity pool is empty; no sale can be assigned a customer")]
    EmptyIdentityPool,
    #[error("product catalog is empty; no sale can be assigned items")]
    EmptyCatalog,
    #[error("no customers survived derivation")]
    NoCustomers,
    #[error("dataset invariant violated: {0}")]
    Invariant(#[from] astroshop_core::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
