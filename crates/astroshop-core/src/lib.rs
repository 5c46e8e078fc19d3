//! Core contracts for the astroshop dataset.
//!
//! This crate defines the storefront entities, their enumerated value sets,
//! the exact `Money` type, and the invariant checks shared by the generator
//! and the CLI.

pub mod dataset;
pub mod error;
pub mod model;
pub mod money;
pub mod types;
pub mod validation;
pub mod window;

pub use dataset::{Dataset, group_by_key, index_by_key};
pub use error::{Error, Result};
pub use model::{Customer, Product, Return, ReturnItem, Sale, SaleItem};
pub use money::Money;
pub use types::{Category, Channel, ItemReason, Region, ReturnReason, ReturnStatus, SaleStatus};
pub use validation::validate_dataset;
pub use window::DateWindow;

/// Date rendering used by every exported table.
pub const DATE_FORMAT: &str = "%d/%m/%Y";
