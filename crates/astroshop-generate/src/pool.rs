use std::collections::HashSet;

use chrono::NaiveDate;
use rand::Rng;
use tracing::info;

use astroshop_core::DateWindow;

/// Oversampling factor of the placeholder pool over the customer target.
pub const POOL_OVERSAMPLING: usize = 2;

/// Anonymous identifier sales are assigned to before customers exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    /// Earliest date a sale of this identity may carry.
    pub earliest: NaiveDate,
}

/// Build `POOL_OVERSAMPLING * target` unique identities anchored at the
/// window start.
///
/// Only a subset of the identities touched by sales survives derivation, so
/// the pool is larger than the customer target.
pub fn build_identity_pool<R: Rng + ?Sized>(
    target: usize,
    window: &DateWindow,
    rng: &mut R,
) -> Vec<Identity> {
    let size = target.saturating_mul(POOL_OVERSAMPLING);
    let mut seen = HashSet::with_capacity(size);
    let mut pool = Vec::with_capacity(size);

    while pool.len() < size {
        let id = random_uuid(rng);
        if seen.insert(id.clone()) {
            pool.push(Identity {
                id,
                earliest: window.start(),
            });
        }
    }

    info!(stage = "pool", identities = pool.len(), "identity pool built");
    pool
}

/// UUID v4 built from RNG bytes so ids follow the run seed.
pub fn random_uuid<R: Rng + ?Sized>(rng: &mut R) -> String {
    let bytes: [u8; 16] = rng.random();
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .to_string()
}
