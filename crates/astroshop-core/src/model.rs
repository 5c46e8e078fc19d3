use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Category, Channel, ItemReason, Region, ReturnReason, ReturnStatus, SaleStatus};

/// Catalog entry. Static reference data once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub price: Money,
}

/// Customer derived from generated sales.
///
/// `registered_on`, `purchase_count` and `total_spend` are projections of
/// the sales tables, never independently drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub age: u8,
    pub region: Region,
    pub registered_on: NaiveDate,
    pub purchase_count: u32,
    pub total_spend: Money,
}

/// One checkout event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub customer_id: String,
    pub date: NaiveDate,
    pub channel: Channel,
    pub status: SaleStatus,
    pub total: Money,
}

/// One product line within a sale, with its price snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Return event referencing exactly one sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Return {
    pub id: String,
    pub sale_id: String,
    pub reason: ReturnReason,
    pub date: NaiveDate,
    pub status: ReturnStatus,
}

/// Returned quantity of one sale item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnItem {
    pub id: String,
    pub return_id: String,
    pub sale_item_id: String,
    pub product_id: String,
    pub quantity: u32,
    pub reason: ItemReason,
}
