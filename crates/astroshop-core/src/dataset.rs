use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::model::{Customer, Product, Return, ReturnItem, Sale, SaleItem};

/// The six final tables of a generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub customers: Vec<Customer>,
    pub products: Vec<Product>,
    pub sales: Vec<Sale>,
    pub sale_items: Vec<SaleItem>,
    pub returns: Vec<Return>,
    pub return_items: Vec<ReturnItem>,
}

impl Dataset {
    /// Row counts keyed by exported table name, in export order.
    pub fn row_counts(&self) -> [(&'static str, usize); 6] {
        [
            ("clientes", self.customers.len()),
            ("produtos", self.products.len()),
            ("vendas", self.sales.len()),
            ("itens_venda", self.sale_items.len()),
            ("devolucoes", self.returns.len()),
            ("itens_devolucao", self.return_items.len()),
        ]
    }
}

/// Group rows by a borrowed foreign key, keeping row order inside each group.
pub fn group_by_key<'a, T, K, F>(rows: &'a [T], key: F) -> HashMap<K, Vec<&'a T>>
where
    K: Eq + Hash,
    F: Fn(&'a T) -> K,
{
    let mut groups: HashMap<K, Vec<&'a T>> = HashMap::new();
    for row in rows {
        groups.entry(key(row)).or_default().push(row);
    }
    groups
}

/// Index rows by a unique key. Later duplicates replace earlier rows.
pub fn index_by_key<'a, T, K, F>(rows: &'a [T], key: F) -> HashMap<K, &'a T>
where
    K: Eq + Hash,
    F: Fn(&'a T) -> K,
{
    rows.iter().map(|row| (key(row), row)).collect()
}
