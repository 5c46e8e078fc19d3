//! Seeded generation pipeline for the astroshop storefront dataset.
//!
//! Sales are generated first and customers are derived from them; returns
//! are layered on completed sales and their effects reconciled back onto
//! sale status and customer metrics. Every stage draws from one RNG handle
//! passed in by the engine, so a seed reproduces the whole dataset.

pub mod catalog;
pub mod customers;
pub mod engine;
pub mod errors;
pub mod metrics;
pub mod model;
pub mod output;
pub mod pool;
pub mod reconcile;
pub mod returns;
pub mod sales;
pub mod sampling;

pub use engine::{GenerationEngine, GenerationResult};
pub use errors::GenerationError;
pub use model::{GenerateOptions, GenerationReport, TableReport};
