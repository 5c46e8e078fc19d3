use chrono::{Days, NaiveDate};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, info};

use astroshop_core::{Channel, DateWindow, Money, Product, Sale, SaleItem};

use crate::errors::GenerationError;
use crate::pool::Identity;
use crate::sampling::{SALE_STATUS_WEIGHTS, WeightedTable, pick};

pub const MAX_ITEMS_PER_SALE: usize = 3;
pub const MAX_QUANTITY: u32 = 3;

/// Sales and their line items, as produced before customer derivation.
#[derive(Debug, Clone, Default)]
pub struct GeneratedSales {
    pub sales: Vec<Sale>,
    pub items: Vec<SaleItem>,
    /// Sales whose lower date bound fell past the window end.
    pub clamped_dates: u64,
}

/// Generate `count` sales with 1-3 distinct products each.
pub fn generate_sales<R: Rng + ?Sized>(
    pool: &[Identity],
    catalog: &[Product],
    count: usize,
    window: &DateWindow,
    rng: &mut R,
) -> Result<GeneratedSales, GenerationError> {
    if pool.is_empty() {
        return Err(GenerationError::EmptyIdentityPool);
    }
    if catalog.is_empty() {
        return Err(GenerationError::EmptyCatalog);
    }

    let statuses = WeightedTable::new(SALE_STATUS_WEIGHTS)?;
    let mut generated = GeneratedSales {
        sales: Vec::with_capacity(count),
        items: Vec::with_capacity(count * 2),
        clamped_dates: 0,
    };

    for sale_idx in 0..count {
        let identity = pool.choose(rng).ok_or(GenerationError::EmptyIdentityPool)?;
        let (date, clamped) = sale_date(identity.earliest, window, rng);
        if clamped {
            generated.clamped_dates += 1;
            debug!(customer = %identity.id, %date, "sale date clamped to window end");
        }
        let status = statuses.sample(rng);
        let channel = pick(&Channel::ALL, rng).unwrap_or(Channel::Website);

        let sale_id = format!("sale_{:05}", sale_idx + 1);
        let lines = rng.random_range(1..=MAX_ITEMS_PER_SALE).min(catalog.len());
        let mut total = Money::ZERO;
        for product in catalog.choose_multiple(rng, lines) {
            let quantity = rng.random_range(1..=MAX_QUANTITY);
            let line_total = product.price.times(quantity);
            total += line_total;
            generated.items.push(SaleItem {
                id: format!("item_{:06}", generated.items.len() + 1),
                sale_id: sale_id.clone(),
                product_id: product.id.clone(),
                quantity,
                unit_price: product.price,
                line_total,
            });
        }

        generated.sales.push(Sale {
            id: sale_id,
            customer_id: identity.id.clone(),
            date,
            channel,
            status,
            total,
        });
    }

    info!(
        stage = "sales",
        sales = generated.sales.len(),
        items = generated.items.len(),
        clamped_dates = generated.clamped_dates,
        "sales generated"
    );
    Ok(generated)
}

/// Draw a sale date in `[max(floor, window.start), window.end]`.
///
/// An unsatisfiable interval clamps to the window end instead of failing;
/// the flag reports the clamp.
pub fn sale_date<R: Rng + ?Sized>(
    floor: NaiveDate,
    window: &DateWindow,
    rng: &mut R,
) -> (NaiveDate, bool) {
    let lower = floor.max(window.start());
    if lower > window.end() {
        return (window.end(), true);
    }
    (uniform_date(lower, window.end(), rng), false)
}

/// Uniform calendar date in the closed interval `[lower, upper]`.
pub fn uniform_date<R: Rng + ?Sized>(
    lower: NaiveDate,
    upper: NaiveDate,
    rng: &mut R,
) -> NaiveDate {
    let span = (upper - lower).num_days().max(0) as u64;
    let offset = rng.random_range(0..=span);
    lower.checked_add_days(Days::new(offset)).unwrap_or(upper)
}
