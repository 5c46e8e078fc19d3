use chrono::{Days, NaiveDate};
use rand::Rng;
use tracing::{info, warn};

use astroshop_core::{
    DateWindow, ItemReason, Return, ReturnItem, Sale, SaleItem, SaleStatus, group_by_key,
};

use crate::errors::GenerationError;
use crate::sales::uniform_date;
use crate::sampling::{
    ITEM_REASON_WEIGHTS, RETURN_REASON_WEIGHTS, RETURN_STATUS_WEIGHTS, WeightedTable,
};

pub const RETURN_ALL_ITEMS_PROBABILITY: f64 = 0.7;
pub const PARTIAL_QUANTITY_PROBABILITY: f64 = 0.2;
pub const SPECIFIC_REASON_PROBABILITY: f64 = 0.7;
pub const MIN_SETTLEMENT_DAYS: u64 = 2;
pub const MAX_SETTLEMENT_DAYS: u64 = 30;

/// Returns generated for a batch of sales.
#[derive(Debug, Clone, Default)]
pub struct ReturnBatch {
    pub returns: Vec<Return>,
    pub items: Vec<ReturnItem>,
    /// Number of sales picked for a return.
    pub requested: u64,
    /// Picked sales that did not get a return.
    pub skipped: Vec<SkippedReturn>,
}

/// Why a picked sale ended up without a return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No date fits after the sale and inside the window.
    EmptyInterval,
    /// The sale has no items to return.
    NoItems,
}

impl SkipReason {
    pub fn code(self) -> &'static str {
        match self {
            SkipReason::EmptyInterval => "return_interval_empty",
            SkipReason::NoItems => "return_sale_without_items",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            SkipReason::EmptyInterval => "return date interval is empty",
            SkipReason::NoItems => "sale has no items to return",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedReturn {
    pub sale_id: String,
    pub reason: SkipReason,
}

/// Sample `fraction` of completed sales and give each one return event.
///
/// Picked sales are processed in table order. A sale whose return interval
/// is empty loses its return; the batch continues.
pub fn generate_returns<R: Rng + ?Sized>(
    sales: &[Sale],
    items: &[SaleItem],
    fraction: f64,
    window: &DateWindow,
    rng: &mut R,
) -> Result<ReturnBatch, GenerationError> {
    let statuses = WeightedTable::new(RETURN_STATUS_WEIGHTS)?;
    let reasons = WeightedTable::new(RETURN_REASON_WEIGHTS)?;
    let item_reasons = WeightedTable::new(ITEM_REASON_WEIGHTS)?;

    let completed: Vec<&Sale> = sales
        .iter()
        .filter(|sale| sale.status == SaleStatus::Completed)
        .collect();
    let requested = ((completed.len() as f64) * fraction).floor() as usize;
    let requested = requested.min(completed.len());
    let mut picked = rand::seq::index::sample(rng, completed.len(), requested).into_vec();
    picked.sort_unstable();

    let items_by_sale = group_by_key(items, |item| item.sale_id.as_str());
    let mut batch = ReturnBatch {
        requested: requested as u64,
        ..ReturnBatch::default()
    };

    for idx in picked {
        let sale = completed[idx];
        let delay = rng.random_range(MIN_SETTLEMENT_DAYS..=MAX_SETTLEMENT_DAYS);
        let Some((lower, upper)) = return_interval(sale.date, delay, window) else {
            warn!(
                sale = %sale.id,
                sale_date = %sale.date,
                window_end = %window.end(),
                "no valid return date; skipping return"
            );
            batch.skipped.push(SkippedReturn {
                sale_id: sale.id.clone(),
                reason: SkipReason::EmptyInterval,
            });
            continue;
        };
        let Some(sale_items) = items_by_sale.get(sale.id.as_str()) else {
            warn!(sale = %sale.id, "sale has no items; skipping return");
            batch.skipped.push(SkippedReturn {
                sale_id: sale.id.clone(),
                reason: SkipReason::NoItems,
            });
            continue;
        };

        let return_id = format!("ret_{:05}", batch.returns.len() + 1);
        let reason = reasons.sample(rng);
        batch.returns.push(Return {
            id: return_id.clone(),
            sale_id: sale.id.clone(),
            reason,
            date: uniform_date(lower, upper, rng),
            status: statuses.sample(rng),
        });

        for original in select_items(sale_items, rng) {
            let quantity = if rng.random_bool(PARTIAL_QUANTITY_PROBABILITY) {
                rng.random_range(1..=original.quantity)
            } else {
                original.quantity
            };
            let item_reason = if rng.random_bool(SPECIFIC_REASON_PROBABILITY) {
                item_reasons.sample(rng)
            } else {
                ItemReason::Inherited(reason)
            };
            batch.items.push(ReturnItem {
                id: format!("ritem_{:06}", batch.items.len() + 1),
                return_id: return_id.clone(),
                sale_item_id: original.id.clone(),
                product_id: original.product_id.clone(),
                quantity,
                reason: item_reason,
            });
        }
    }

    info!(
        stage = "returns",
        requested = batch.requested,
        returns = batch.returns.len(),
        items = batch.items.len(),
        skipped = batch.skipped.len(),
        "returns generated"
    );
    Ok(batch)
}

/// Closed interval a return of a sale dated `sale_date` may fall in.
///
/// Lower bound is the day after the sale, raised to the window start;
/// upper bound is `sale_date + delay_days`, capped at the window end.
/// `None` when the interval is empty: such returns are dropped rather than
/// given a date that is not after the sale or past the horizon.
pub fn return_interval(
    sale_date: NaiveDate,
    delay_days: u64,
    window: &DateWindow,
) -> Option<(NaiveDate, NaiveDate)> {
    let lower = sale_date.checked_add_days(Days::new(1))?.max(window.start());
    let upper = sale_date
        .checked_add_days(Days::new(delay_days))?
        .min(window.end());
    (lower <= upper).then_some((lower, upper))
}

/// All items with probability 0.7, otherwise a random non-empty subset in
/// original order.
fn select_items<'a, R: Rng + ?Sized>(items: &[&'a SaleItem], rng: &mut R) -> Vec<&'a SaleItem> {
    if items.len() <= 1 || rng.random_bool(RETURN_ALL_ITEMS_PROBABILITY) {
        return items.to_vec();
    }
    let amount = rng.random_range(1..=items.len());
    let mut picked = rand::seq::index::sample(rng, items.len(), amount).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|idx| items[idx]).collect()
}
