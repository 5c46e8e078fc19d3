//! Enumerated value sets of the storefront.
//!
//! Every enum renders to the Portuguese label used in exported tables via
//! `label()`; serde uses snake_case identifiers for JSON artifacts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Product category of the fixed catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Telescope,
    Binoculars,
    StarMaps,
    AstronomyBooks,
    ObservationKits,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Telescope => "Telescópio",
            Category::Binoculars => "Binóculo",
            Category::StarMaps => "Mapas Celestes",
            Category::AstronomyBooks => "Livros de Astronomia",
            Category::ObservationKits => "Kits de Observação",
        }
    }
}

/// Checkout channel of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Website,
    Marketplace,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Website, Channel::Marketplace];

    pub fn label(self) -> &'static str {
        match self {
            Channel::Website => "site",
            Channel::Marketplace => "marketplace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    North,
    South,
    East,
    West,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::North, Region::South, Region::East, Region::West];

    pub fn label(self) -> &'static str {
        match self {
            Region::North => "Norte",
            Region::South => "Sul",
            Region::East => "Leste",
            Region::West => "Oeste",
        }
    }
}

/// Lifecycle state of a sale.
///
/// `Cancelled` is decided at creation and final. The only later transitions
/// go from `Completed` to one of the returned states, driven by reconciled
/// return quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Completed,
    Cancelled,
    PartiallyReturned,
    FullyReturned,
}

impl SaleStatus {
    pub fn label(self) -> &'static str {
        match self {
            SaleStatus::Completed => "concluída",
            SaleStatus::Cancelled => "cancelada",
            SaleStatus::PartiallyReturned => "parcialmente devolvida",
            SaleStatus::FullyReturned => "devolvida",
        }
    }

    /// Statuses whose items count as genuine customer spend.
    pub fn counts_as_spend(self) -> bool {
        matches!(self, SaleStatus::Completed | SaleStatus::PartiallyReturned)
    }

    /// Only a completed sale can still move; every other status is terminal.
    pub fn is_reconcilable(self) -> bool {
        matches!(self, SaleStatus::Completed)
    }
}

/// Processing state of a return event, independent of the sale status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    Processing,
    Approved,
    Rejected,
    Finalized,
}

impl ReturnStatus {
    pub fn label(self) -> &'static str {
        match self {
            ReturnStatus::Processing => "em processamento",
            ReturnStatus::Approved => "aprovada",
            ReturnStatus::Rejected => "rejeitada",
            ReturnStatus::Finalized => "finalizada",
        }
    }

    /// Only approved and finalized returns move the sale status.
    pub fn is_impactful(self) -> bool {
        matches!(self, ReturnStatus::Approved | ReturnStatus::Finalized)
    }
}

/// General reason attached to a return event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnReason {
    Defect,
    DidNotLike,
    WrongPurchase,
    NotAsExpected,
}

impl ReturnReason {
    pub fn label(self) -> &'static str {
        match self {
            ReturnReason::Defect => "defeito",
            ReturnReason::DidNotLike => "não gostei",
            ReturnReason::WrongPurchase => "erro na compra",
            ReturnReason::NotAsExpected => "não era o esperado",
        }
    }
}

/// Reason recorded on a single returned item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemReason {
    DamagedInTransit,
    MissingParts,
    WrongModel,
    MisalignedOptics,
    /// Same as the general reason of the owning return.
    Inherited(ReturnReason),
}

impl ItemReason {
    pub fn label(self) -> &'static str {
        match self {
            ItemReason::DamagedInTransit => "avaria no transporte",
            ItemReason::MissingParts => "peças faltando",
            ItemReason::WrongModel => "modelo errado",
            ItemReason::MisalignedOptics => "óptica desalinhada",
            ItemReason::Inherited(reason) => reason.label(),
        }
    }
}

macro_rules! display_label {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )*
    };
}

display_label!(
    Category,
    Channel,
    Region,
    SaleStatus,
    ReturnStatus,
    ReturnReason,
    ItemReason,
);

#[cfg(test)]
mod tests {
    use super::*;

    const SALE_STATUSES: [SaleStatus; 4] = [
        SaleStatus::Completed,
        SaleStatus::Cancelled,
        SaleStatus::PartiallyReturned,
        SaleStatus::FullyReturned,
    ];

    #[test]
    fn only_completed_and_partial_count_as_spend() {
        let counted: Vec<SaleStatus> = SALE_STATUSES
            .into_iter()
            .filter(|status| status.counts_as_spend())
            .collect();
        assert_eq!(
            counted,
            vec![SaleStatus::Completed, SaleStatus::PartiallyReturned]
        );
    }

    #[test]
    fn only_completed_sales_are_reconcilable() {
        let open: Vec<SaleStatus> = SALE_STATUSES
            .into_iter()
            .filter(|status| status.is_reconcilable())
            .collect();
        assert_eq!(open, vec![SaleStatus::Completed]);
    }

    #[test]
    fn only_approved_and_finalized_are_impactful() {
        assert!(ReturnStatus::Approved.is_impactful());
        assert!(ReturnStatus::Finalized.is_impactful());
        assert!(!ReturnStatus::Processing.is_impactful());
        assert!(!ReturnStatus::Rejected.is_impactful());
    }

    #[test]
    fn inherited_item_reason_uses_return_label() {
        let reason = ItemReason::Inherited(ReturnReason::NotAsExpected);
        assert_eq!(reason.to_string(), "não era o esperado");
    }
}
