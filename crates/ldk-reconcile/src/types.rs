use ldk_keys::{OrderKey, ProductKey};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// Positions are tracked per product and normalized length.
pub type PositionKey = (ProductKey, String);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
    Flat,
}

/// Derived net position. Never persisted; rebuilt from the book on demand.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Position {
    /// MBF bought.
    pub bought: f64,
    /// MBF sold.
    pub sold: f64,
    /// Sum of buy price × volume.
    pub bought_value: f64,
    /// Sum of sell FOB (price less freight/MBF) × volume.
    pub sold_value: f64,
}

impl Position {
    pub fn net(&self) -> f64 {
        self.bought - self.sold
    }

    pub fn side(&self) -> PositionSide {
        let net = self.net();
        if net > 0.0 {
            PositionSide::Long
        } else if net < 0.0 {
            PositionSide::Short
        } else {
            PositionSide::Flat
        }
    }

    pub fn avg_buy(&self) -> f64 {
        if self.bought > 0.0 {
            self.bought_value / self.bought
        } else {
            0.0
        }
    }

    pub fn avg_sell(&self) -> f64 {
        if self.sold > 0.0 {
            self.sold_value / self.sold
        } else {
            0.0
        }
    }
}

// ---------------------------------------------------------------------------
// Duplicate order keys
// ---------------------------------------------------------------------------

/// A different trade on the same side already carries this order key.
///
/// Surfaced to the trader as a confirmation prompt. The save is neither merged
/// nor rejected here.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DuplicateOrder {
    pub key: OrderKey,
    pub existing_id: String,
    /// Mill for buys, customer for sells.
    pub counterparty: Option<String>,
    pub product: ProductKey,
    pub date: String,
}

// ---------------------------------------------------------------------------
// Book reconciliation report
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum BookStatus {
    Clean,
    NeedsAttention,
}

/// Stable ordering enforced by the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ReconcileReason {
    OverSold,
    ShortSell,
    DuplicateBuyKey,
}

#[derive(Clone, Debug, PartialEq, PartialOrd, Serialize)]
pub enum ReconcileDiff {
    OverSold {
        key: OrderKey,
        buy_id: String,
        bought: f64,
        sold: f64,
        available: f64,
    },
    ShortSell {
        sell_id: String,
        /// Empty when the sell carries no order reference at all.
        key: OrderKey,
        volume: f64,
    },
    DuplicateBuyKey {
        key: OrderKey,
        buy_ids: Vec<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub status: BookStatus,
    pub reasons: Vec<ReconcileReason>,
    pub diffs: Vec<ReconcileDiff>,
}

impl ReconcileReport {
    pub fn clean() -> Self {
        Self {
            status: BookStatus::Clean,
            reasons: Vec::new(),
            diffs: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.status == BookStatus::Clean
    }
}
