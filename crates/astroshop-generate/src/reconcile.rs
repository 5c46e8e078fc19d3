use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use astroshop_core::{Return, ReturnItem, Sale, SaleItem, SaleStatus, group_by_key};

/// Outcome counters of a reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub fully_returned: u64,
    pub partially_returned: u64,
}

impl ReconcileSummary {
    pub fn changed(&self) -> u64 {
        self.fully_returned + self.partially_returned
    }
}

/// Derive sale status from the quantities of impactful returns.
///
/// Per sale, each item's returned quantity is summed over every approved or
/// finalized return. All items covered gives `FullyReturned`; some
/// coverage gives `PartiallyReturned`; none leaves the status untouched.
/// Only completed sales are considered: cancelled and returned states are
/// terminal. Each sale is classified independently, so the pass is
/// order-free and running it again changes nothing.
pub fn reconcile_sale_status(
    sales: &mut [Sale],
    items: &[SaleItem],
    returns: &[Return],
    return_items: &[ReturnItem],
) -> ReconcileSummary {
    let impactful: HashMap<&str, &str> = returns
        .iter()
        .filter(|ret| ret.status.is_impactful())
        .map(|ret| (ret.id.as_str(), ret.sale_id.as_str()))
        .collect();

    let mut returned: HashMap<&str, u32> = HashMap::new();
    let mut affected: HashSet<&str> = HashSet::new();
    for item in return_items {
        if let Some(sale_id) = impactful.get(item.return_id.as_str()) {
            *returned.entry(item.sale_item_id.as_str()).or_insert(0) += item.quantity;
            affected.insert(*sale_id);
        }
    }

    let items_by_sale = group_by_key(items, |item| item.sale_id.as_str());
    let mut summary = ReconcileSummary::default();
    for sale in sales.iter_mut() {
        if !sale.status.is_reconcilable() || !affected.contains(sale.id.as_str()) {
            continue;
        }
        let Some(sale_items) = items_by_sale.get(sale.id.as_str()) else {
            continue;
        };
        let Some(status) = classify(sale_items, &returned) else {
            continue;
        };
        match status {
            SaleStatus::FullyReturned => summary.fully_returned += 1,
            _ => summary.partially_returned += 1,
        }
        debug!(sale = %sale.id, from = %sale.status, to = %status, "sale status reconciled");
        sale.status = status;
    }

    info!(
        stage = "reconcile",
        fully_returned = summary.fully_returned,
        partially_returned = summary.partially_returned,
        "sale statuses reconciled"
    );
    summary
}

fn classify(items: &[&SaleItem], returned: &HashMap<&str, u32>) -> Option<SaleStatus> {
    let mut any_returned = false;
    let mut all_covered = true;
    for item in items {
        let quantity = returned.get(item.id.as_str()).copied().unwrap_or(0);
        any_returned |= quantity > 0;
        all_covered &= quantity >= item.quantity;
    }
    match (any_returned, all_covered) {
        (false, _) => None,
        (true, true) => Some(SaleStatus::FullyReturned),
        (true, false) => Some(SaleStatus::PartiallyReturned),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use astroshop_core::{Channel, ItemReason, Money, ReturnReason, ReturnStatus};

    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).expect("valid date")
    }

    fn sale(id: &str, status: SaleStatus) -> Sale {
        Sale {
            id: id.to_string(),
            customer_id: "c1".to_string(),
            date: date(2),
            channel: Channel::Website,
            status,
            total: Money::ZERO,
        }
    }

    fn item(id: &str, sale_id: &str, quantity: u32) -> SaleItem {
        SaleItem {
            id: id.to_string(),
            sale_id: sale_id.to_string(),
            product_id: format!("prod_{id}"),
            quantity,
            unit_price: Money::from_cents(100),
            line_total: Money::from_cents(100).times(quantity),
        }
    }

    fn ret(id: &str, sale_id: &str, status: ReturnStatus) -> Return {
        Return {
            id: id.to_string(),
            sale_id: sale_id.to_string(),
            reason: ReturnReason::Defect,
            date: date(5),
            status,
        }
    }

    fn ret_item(id: &str, return_id: &str, sale_item_id: &str, quantity: u32) -> ReturnItem {
        ReturnItem {
            id: id.to_string(),
            return_id: return_id.to_string(),
            sale_item_id: sale_item_id.to_string(),
            product_id: format!("prod_{sale_item_id}"),
            quantity,
            reason: ItemReason::Inherited(ReturnReason::Defect),
        }
    }

    #[test]
    fn full_item_plus_partial_item_is_partially_returned() {
        let mut sales = vec![sale("s1", SaleStatus::Completed)];
        let items = vec![item("i1", "s1", 3), item("i2", "s1", 2)];
        let returns = vec![ret("r1", "s1", ReturnStatus::Approved)];
        let return_items = vec![ret_item("ri1", "r1", "i1", 3), ret_item("ri2", "r1", "i2", 1)];

        reconcile_sale_status(&mut sales, &items, &returns, &return_items);
        assert_eq!(sales[0].status, SaleStatus::PartiallyReturned);
    }

    #[test]
    fn every_item_covered_is_fully_returned() {
        let mut sales = vec![sale("s1", SaleStatus::Completed)];
        let items = vec![item("i1", "s1", 3), item("i2", "s1", 2)];
        let returns = vec![ret("r1", "s1", ReturnStatus::Finalized)];
        let return_items = vec![ret_item("ri1", "r1", "i1", 3), ret_item("ri2", "r1", "i2", 2)];

        let summary = reconcile_sale_status(&mut sales, &items, &returns, &return_items);
        assert_eq!(sales[0].status, SaleStatus::FullyReturned);
        assert_eq!(summary.fully_returned, 1);
    }

    #[test]
    fn quantities_accumulate_across_returns() {
        let mut sales = vec![sale("s1", SaleStatus::Completed)];
        let items = vec![item("i1", "s1", 3)];
        let returns = vec![
            ret("r1", "s1", ReturnStatus::Approved),
            ret("r2", "s1", ReturnStatus::Finalized),
        ];
        let return_items = vec![ret_item("ri1", "r1", "i1", 1), ret_item("ri2", "r2", "i1", 2)];

        reconcile_sale_status(&mut sales, &items, &returns, &return_items);
        assert_eq!(sales[0].status, SaleStatus::FullyReturned);
    }

    #[test]
    fn non_impactful_returns_leave_status_alone() {
        let mut sales = vec![
            sale("s1", SaleStatus::Completed),
            sale("s2", SaleStatus::Completed),
        ];
        let items = vec![item("i1", "s1", 1), item("i2", "s2", 1)];
        let returns = vec![
            ret("r1", "s1", ReturnStatus::Processing),
            ret("r2", "s2", ReturnStatus::Rejected),
        ];
        let return_items = vec![ret_item("ri1", "r1", "i1", 1), ret_item("ri2", "r2", "i2", 1)];

        let summary = reconcile_sale_status(&mut sales, &items, &returns, &return_items);
        assert!(sales.iter().all(|s| s.status == SaleStatus::Completed));
        assert_eq!(summary.changed(), 0);
    }

    #[test]
    fn cancelled_sales_are_terminal() {
        let mut sales = vec![sale("s1", SaleStatus::Cancelled)];
        let items = vec![item("i1", "s1", 1)];
        let returns = vec![ret("r1", "s1", ReturnStatus::Approved)];
        let return_items = vec![ret_item("ri1", "r1", "i1", 1)];

        reconcile_sale_status(&mut sales, &items, &returns, &return_items);
        assert_eq!(sales[0].status, SaleStatus::Cancelled);
    }

    #[test]
    fn returned_sales_are_terminal() {
        let mut sales = vec![
            sale("s1", SaleStatus::FullyReturned),
            sale("s2", SaleStatus::PartiallyReturned),
        ];
        let items = vec![item("i1", "s1", 3), item("i2", "s2", 2)];
        let returns = vec![
            ret("r1", "s1", ReturnStatus::Approved),
            ret("r2", "s2", ReturnStatus::Finalized),
        ];
        let return_items = vec![ret_item("ri1", "r1", "i1", 1), ret_item("ri2", "r2", "i2", 2)];

        let summary = reconcile_sale_status(&mut sales, &items, &returns, &return_items);
        assert_eq!(sales[0].status, SaleStatus::FullyReturned);
        assert_eq!(sales[1].status, SaleStatus::PartiallyReturned);
        assert_eq!(summary.changed(), 0);
    }

    #[test]
    fn second_pass_changes_nothing() {
        let mut sales = vec![
            sale("s1", SaleStatus::Completed),
            sale("s2", SaleStatus::Completed),
            sale("s3", SaleStatus::Completed),
        ];
        let items = vec![
            item("i1", "s1", 2),
            item("i2", "s2", 2),
            item("i3", "s2", 1),
            item("i4", "s3", 1),
        ];
        let returns = vec![
            ret("r1", "s1", ReturnStatus::Approved),
            ret("r2", "s2", ReturnStatus::Finalized),
        ];
        let return_items = vec![ret_item("ri1", "r1", "i1", 2), ret_item("ri2", "r2", "i3", 1)];

        reconcile_sale_status(&mut sales, &items, &returns, &return_items);
        let first = sales.clone();
        let again = reconcile_sale_status(&mut sales, &items, &returns, &return_items);
        assert_eq!(sales, first);
        assert_eq!(again.changed(), 0);
        let statuses: Vec<SaleStatus> = sales.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![
                SaleStatus::FullyReturned,
                SaleStatus::PartiallyReturned,
                SaleStatus::Completed
            ]
        );
    }

    #[test]
    fn processing_order_does_not_matter() {
        let items = vec![item("i1", "s1", 2), item("i2", "s2", 1)];
        let returns = vec![
            ret("r1", "s1", ReturnStatus::Approved),
            ret("r2", "s2", ReturnStatus::Approved),
        ];
        let return_items = vec![ret_item("ri1", "r1", "i1", 1), ret_item("ri2", "r2", "i2", 1)];

        let mut forward = vec![sale("s1", SaleStatus::Completed), sale("s2", SaleStatus::Completed)];
        let mut backward = vec![sale("s2", SaleStatus::Completed), sale("s1", SaleStatus::Completed)];
        reconcile_sale_status(&mut forward, &items, &returns, &return_items);
        reconcile_sale_status(&mut backward, &items, &returns, &return_items);
        backward.reverse();
        assert_eq!(forward, backward);
    }
}
