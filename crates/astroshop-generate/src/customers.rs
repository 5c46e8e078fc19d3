use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use fake::Fake;
use fake::faker::internet::raw::FreeEmail;
use fake::faker::name::raw::Name;
use fake::locales::PT_BR;
use rand::Rng;
use tracing::{info, warn};

use astroshop_core::{Customer, Money, Region, Sale, SaleItem};

use crate::errors::GenerationError;
use crate::sales::GeneratedSales;
use crate::sampling::pick;

pub const MIN_AGE: u8 = 18;
pub const MAX_AGE: u8 = 75;
const EMAIL_NOISE_MARKS: [char; 3] = ['#', '%', '&'];

/// Customers surviving derivation.
#[derive(Debug, Clone, Default)]
pub struct DerivedCustomers {
    pub customers: Vec<Customer>,
    pub noisy_emails: u64,
}

/// Collapse sales to at most `target` customers.
///
/// Registration date is the earliest sale date of the identity. When more
/// identities than `target` were touched, a uniform sample without
/// replacement is kept. Demographics are drawn fresh per survivor; metrics
/// start at zero and are filled by the aggregator.
pub fn derive_customers<R: Rng + ?Sized>(
    sales: &[Sale],
    target: usize,
    email_noise_rate: f64,
    rng: &mut R,
) -> Result<DerivedCustomers, GenerationError> {
    let mut first_sale: BTreeMap<&str, NaiveDate> = BTreeMap::new();
    for sale in sales {
        first_sale
            .entry(sale.customer_id.as_str())
            .and_modify(|date| *date = (*date).min(sale.date))
            .or_insert(sale.date);
    }

    let touched: Vec<(&str, NaiveDate)> = first_sale.into_iter().collect();
    let touched_count = touched.len();
    let survivors = if touched.len() > target {
        let mut picked = rand::seq::index::sample(rng, touched.len(), target).into_vec();
        picked.sort_unstable();
        picked.into_iter().map(|idx| touched[idx]).collect()
    } else {
        touched
    };

    if survivors.is_empty() {
        return Err(GenerationError::NoCustomers);
    }

    let mut derived = DerivedCustomers {
        customers: Vec::with_capacity(survivors.len()),
        noisy_emails: 0,
    };
    for (id, registered_on) in survivors {
        let name: String = Name(PT_BR).fake_with_rng(rng);
        let mut email: String = FreeEmail(PT_BR).fake_with_rng(rng);
        if rng.random_bool(email_noise_rate) {
            let mark = pick(&EMAIL_NOISE_MARKS, rng).unwrap_or('#');
            email = email.replace('@', &mark.to_string());
            derived.noisy_emails += 1;
        }
        derived.customers.push(Customer {
            id: id.to_string(),
            name,
            email,
            age: rng.random_range(MIN_AGE..=MAX_AGE),
            region: pick(&Region::ALL, rng).unwrap_or(Region::North),
            registered_on,
            purchase_count: 0,
            total_spend: Money::ZERO,
        });
    }

    info!(
        stage = "customers",
        touched = touched_count,
        customers = derived.customers.len(),
        noisy_emails = derived.noisy_emails,
        "customers derived"
    );
    Ok(derived)
}

/// Sales and items left after the consistency filter.
#[derive(Debug, Clone, Default)]
pub struct ConsistentSales {
    pub sales: Vec<Sale>,
    pub items: Vec<SaleItem>,
    /// Sales owned by identities that did not become customers.
    pub dropped_unselected: u64,
    /// Sales dated before their customer's registration.
    pub dropped_predated: u64,
}

/// Keep only sales of selected customers dated on or after registration.
///
/// Violating sales are dropped, never repaired; their items go with them.
pub fn filter_consistent(customers: &[Customer], generated: GeneratedSales) -> ConsistentSales {
    let registered: HashMap<&str, NaiveDate> = customers
        .iter()
        .map(|customer| (customer.id.as_str(), customer.registered_on))
        .collect();

    let mut outcome = ConsistentSales::default();
    let mut kept_ids: HashSet<String> = HashSet::new();
    for sale in generated.sales {
        match registered.get(sale.customer_id.as_str()) {
            None => outcome.dropped_unselected += 1,
            Some(registered_on) if sale.date < *registered_on => {
                warn!(
                    sale = %sale.id,
                    date = %sale.date,
                    registered_on = %registered_on,
                    "sale predates customer registration; dropping"
                );
                outcome.dropped_predated += 1;
            }
            Some(_) => {
                kept_ids.insert(sale.id.clone());
                outcome.sales.push(sale);
            }
        }
    }
    outcome.items = generated
        .items
        .into_iter()
        .filter(|item| kept_ids.contains(&item.sale_id))
        .collect();

    info!(
        stage = "filter",
        sales = outcome.sales.len(),
        items = outcome.items.len(),
        dropped_unselected = outcome.dropped_unselected,
        dropped_predated = outcome.dropped_predated,
        "sales filtered"
    );
    outcome
}
