use std::collections::HashMap;

use tracing::info;

use astroshop_core::{Customer, Money, Sale, SaleItem, group_by_key};

/// Purchase count and spend of one customer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CustomerMetrics {
    pub purchase_count: u32,
    pub total_spend: Money,
}

/// Aggregate metrics per customer id from final sales and items.
///
/// Only sales whose status counts as spend contribute; spend is the sum of
/// their line totals.
pub fn compute_customer_metrics<'a>(
    sales: &'a [Sale],
    items: &[SaleItem],
) -> HashMap<&'a str, CustomerMetrics> {
    let items_by_sale = group_by_key(items, |item| item.sale_id.as_str());
    let mut metrics: HashMap<&'a str, CustomerMetrics> = HashMap::new();
    for sale in sales.iter().filter(|sale| sale.status.counts_as_spend()) {
        let spend: Money = items_by_sale
            .get(sale.id.as_str())
            .map(|items| items.iter().map(|item| item.line_total).sum::<Money>())
            .unwrap_or_default();
        let entry = metrics.entry(sale.customer_id.as_str()).or_default();
        entry.purchase_count += 1;
        entry.total_spend += spend;
    }
    metrics
}

/// Overwrite every customer's metrics from scratch.
///
/// Customers without qualifying sales get zero. Returns how many customers
/// ended with no qualifying purchase.
pub fn apply_customer_metrics(
    customers: &mut [Customer],
    sales: &[Sale],
    items: &[SaleItem],
) -> u64 {
    let metrics = compute_customer_metrics(sales, items);
    let mut without_purchases = 0;
    for customer in customers.iter_mut() {
        let entry = metrics
            .get(customer.id.as_str())
            .copied()
            .unwrap_or_default();
        customer.purchase_count = entry.purchase_count;
        customer.total_spend = entry.total_spend;
        if entry.purchase_count == 0 {
            without_purchases += 1;
        }
    }

    info!(
        stage = "metrics",
        customers = customers.len(),
        without_purchases,
        "customer metrics aggregated"
    );
    without_purchases
}
