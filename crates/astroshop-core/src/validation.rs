use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::dataset::{Dataset, group_by_key, index_by_key};
use crate::error::{Error, Result};
use crate::model::SaleItem;
use crate::money::Money;
use crate::window::DateWindow;

/// Validate internal consistency of a generated dataset.
///
/// This checks:
/// - unique identifiers per table
/// - every foreign key resolves to an existing row
/// - line totals, sale totals and returned quantities
/// - sale and return dates against the window and each other
/// - customer registration dates and aggregated metrics
pub fn validate_dataset(dataset: &Dataset, window: &DateWindow) -> Result<()> {
    unique_ids("clientes", dataset.customers.iter().map(|c| c.id.as_str()))?;
    unique_ids("produtos", dataset.products.iter().map(|p| p.id.as_str()))?;
    unique_ids("vendas", dataset.sales.iter().map(|s| s.id.as_str()))?;
    unique_ids("itens_venda", dataset.sale_items.iter().map(|i| i.id.as_str()))?;
    unique_ids("devolucoes", dataset.returns.iter().map(|r| r.id.as_str()))?;
    unique_ids(
        "itens_devolucao",
        dataset.return_items.iter().map(|i| i.id.as_str()),
    )?;

    let customers = index_by_key(&dataset.customers, |c| c.id.as_str());
    let products = index_by_key(&dataset.products, |p| p.id.as_str());
    let sales = index_by_key(&dataset.sales, |s| s.id.as_str());
    let sale_items = index_by_key(&dataset.sale_items, |i| i.id.as_str());
    let returns = index_by_key(&dataset.returns, |r| r.id.as_str());
    let items_by_sale = group_by_key(&dataset.sale_items, |i| i.sale_id.as_str());

    for item in &dataset.sale_items {
        if !sales.contains_key(item.sale_id.as_str()) {
            return Err(invalid(format!(
                "sale item {} references missing sale {}",
                item.id, item.sale_id
            )));
        }
        if !products.contains_key(item.product_id.as_str()) {
            return Err(invalid(format!(
                "sale item {} references missing product {}",
                item.id, item.product_id
            )));
        }
        if item.quantity == 0 {
            return Err(invalid(format!("sale item {} has zero quantity", item.id)));
        }
        if item.line_total != item.unit_price.times(item.quantity) {
            return Err(invalid(format!(
                "sale item {} line total {} != {} x {}",
                item.id, item.line_total, item.unit_price, item.quantity
            )));
        }
    }

    let mut first_sale: HashMap<&str, NaiveDate> = HashMap::new();
    for sale in &dataset.sales {
        let customer = customers.get(sale.customer_id.as_str()).ok_or_else(|| {
            invalid(format!(
                "sale {} references missing customer {}",
                sale.id, sale.customer_id
            ))
        })?;
        if !window.contains(sale.date) {
            return Err(invalid(format!(
                "sale {} dated {} outside window",
                sale.id, sale.date
            )));
        }
        if sale.date < customer.registered_on {
            return Err(invalid(format!(
                "sale {} dated {} before customer registration {}",
                sale.id, sale.date, customer.registered_on
            )));
        }
        let items = items_by_sale.get(sale.id.as_str()).ok_or_else(|| {
            invalid(format!("sale {} has no items", sale.id))
        })?;
        let total: Money = items.iter().map(|item| item.line_total).sum();
        if total != sale.total {
            return Err(invalid(format!(
                "sale {} total {} != sum of items {}",
                sale.id, sale.total, total
            )));
        }
        first_sale
            .entry(sale.customer_id.as_str())
            .and_modify(|date| *date = (*date).min(sale.date))
            .or_insert(sale.date);
    }

    for ret in &dataset.returns {
        let sale = sales.get(ret.sale_id.as_str()).ok_or_else(|| {
            invalid(format!(
                "return {} references missing sale {}",
                ret.id, ret.sale_id
            ))
        })?;
        if ret.date <= sale.date {
            return Err(invalid(format!(
                "return {} dated {} not after sale date {}",
                ret.id, ret.date, sale.date
            )));
        }
        if ret.date > window.end() {
            return Err(invalid(format!(
                "return {} dated {} past window end {}",
                ret.id,
                ret.date,
                window.end()
            )));
        }
    }

    let mut returned: HashMap<&str, u32> = HashMap::new();
    for item in &dataset.return_items {
        let ret = returns.get(item.return_id.as_str()).ok_or_else(|| {
            invalid(format!(
                "return item {} references missing return {}",
                item.id, item.return_id
            ))
        })?;
        let original = sale_items.get(item.sale_item_id.as_str()).ok_or_else(|| {
            invalid(format!(
                "return item {} references missing sale item {}",
                item.id, item.sale_item_id
            ))
        })?;
        if original.sale_id != ret.sale_id {
            return Err(invalid(format!(
                "return item {} points at sale item {} of another sale",
                item.id, original.id
            )));
        }
        if original.product_id != item.product_id {
            return Err(invalid(format!(
                "return item {} product {} != sale item product {}",
                item.id, item.product_id, original.product_id
            )));
        }
        let total = returned.entry(original.id.as_str()).or_insert(0);
        *total += item.quantity;
        if item.quantity == 0 || *total > original.quantity {
            return Err(invalid(format!(
                "return item {} returns {} of {} units",
                item.id, total, original.quantity
            )));
        }
    }

    for customer in &dataset.customers {
        if let Some(first) = first_sale.get(customer.id.as_str())
            && *first != customer.registered_on
        {
            return Err(invalid(format!(
                "customer {} registered on {} but first sale is {}",
                customer.id, customer.registered_on, first
            )));
        }
    }

    check_metrics(dataset, &items_by_sale)
}

fn check_metrics(
    dataset: &Dataset,
    items_by_sale: &HashMap<&str, Vec<&SaleItem>>,
) -> Result<()> {
    let mut expected: HashMap<&str, (u32, Money)> = HashMap::new();
    for sale in dataset.sales.iter().filter(|s| s.status.counts_as_spend()) {
        let entry = expected.entry(sale.customer_id.as_str()).or_default();
        entry.0 += 1;
        if let Some(items) = items_by_sale.get(sale.id.as_str()) {
            entry.1 += items.iter().map(|item| item.line_total).sum::<Money>();
        }
    }

    for customer in &dataset.customers {
        let (count, spend) = expected
            .get(customer.id.as_str())
            .copied()
            .unwrap_or_default();
        if customer.purchase_count != count || customer.total_spend != spend {
            return Err(invalid(format!(
                "customer {} metrics ({}, {}) != recomputed ({}, {})",
                customer.id, customer.purchase_count, customer.total_spend, count, spend
            )));
        }
    }

    Ok(())
}

fn unique_ids<'a>(table: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(invalid(format!("duplicate id in {table}: {id}")));
        }
    }
    Ok(())
}

fn invalid(message: String) -> Error {
    Error::InvalidDataset(message)
}
