use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use astroshop_core::{ItemReason, ReturnReason, ReturnStatus, SaleStatus};

use crate::errors::GenerationError;

pub const SALE_STATUS_WEIGHTS: &[(SaleStatus, f64)] = &[
    (SaleStatus::Completed, 0.90),
    (SaleStatus::Cancelled, 0.10),
];

pub const RETURN_STATUS_WEIGHTS: &[(ReturnStatus, f64)] = &[
    (ReturnStatus::Processing, 0.15),
    (ReturnStatus::Approved, 0.40),
    (ReturnStatus::Rejected, 0.10),
    (ReturnStatus::Finalized, 0.35),
];

pub const RETURN_REASON_WEIGHTS: &[(ReturnReason, f64)] = &[
    (ReturnReason::Defect, 0.35),
    (ReturnReason::DidNotLike, 0.20),
    (ReturnReason::WrongPurchase, 0.15),
    (ReturnReason::NotAsExpected, 0.30),
];

pub const ITEM_REASON_WEIGHTS: &[(ItemReason, f64)] = &[
    (ItemReason::DamagedInTransit, 0.35),
    (ItemReason::MissingParts, 0.25),
    (ItemReason::WrongModel, 0.20),
    (ItemReason::MisalignedOptics, 0.20),
];

/// Categorical distribution over a fixed value set.
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    values: Vec<T>,
    index: WeightedIndex<f64>,
}

impl<T: Copy> WeightedTable<T> {
    pub fn new(entries: &[(T, f64)]) -> Result<Self, GenerationError> {
        let index = WeightedIndex::new(entries.iter().map(|(_, weight)| *weight))
            .map_err(|err| GenerationError::InvalidConfig(format!("invalid weights: {err}")))?;
        Ok(Self {
            values: entries.iter().map(|(value, _)| *value).collect(),
            index,
        })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        self.values[self.index.sample(rng)]
    }
}

/// Uniform pick from a non-empty constant slice.
pub fn pick<T: Copy, R: Rng + ?Sized>(values: &[T], rng: &mut R) -> Option<T> {
    if values.is_empty() {
        return None;
    }
    Some(values[rng.random_range(0..values.len())])
}
