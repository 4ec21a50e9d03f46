//! ldk-schemas
//!
//! Shared record shapes: trades, freight lanes, mill quotes and pricing options.
//!
//! Records deserialize leniently from whatever the desk exported. Numbers may
//! arrive as strings (`"$1,234"`), order references as numbers, and fields may be
//! missing or `null`. Product, region, length and date are canonicalized on the
//! way in.

mod lenient;

use chrono::{DateTime, NaiveDate, Utc};
use ldk_keys::{parse_trade_date, OrderKey, ProductKey, RegionKey};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Trades
// ---------------------------------------------------------------------------

/// Soft-delete marker. Cancelled trades stay in the book for audit but are
/// ignored by reconciliation and P&L.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    #[default]
    Active,
    Cancelled,
    /// Anything else the desk typed ("open", "pending", ...) counts as live.
    #[serde(other)]
    Other,
}

impl TradeStatus {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TradeStatus::Cancelled)
    }
}

/// A purchase from a mill.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buy {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::reference")]
    pub order_num: Option<String>,
    /// Alternate order reference.
    #[serde(default, deserialize_with = "lenient::reference")]
    pub po: Option<String>,
    #[serde(default, deserialize_with = "lenient::product")]
    pub product: ProductKey,
    #[serde(default, deserialize_with = "lenient::length")]
    pub length: String,
    /// MBF.
    #[serde(default, deserialize_with = "lenient::amount")]
    pub volume: f64,
    /// FOB mill, $/MBF.
    #[serde(default, deserialize_with = "lenient::amount")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient::opt_amount")]
    pub freight: Option<f64>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::region")]
    pub region: RegionKey,
    #[serde(default, deserialize_with = "lenient::status")]
    pub status: TradeStatus,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub trader: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub mill: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub origin: Option<String>,
}

impl Buy {
    /// `order_num`, then `po`.
    pub fn order_key(&self) -> OrderKey {
        OrderKey::first_of([self.order_num.as_deref(), self.po.as_deref()])
    }

    /// Raw reference that produced [`Buy::order_key`], as the trader typed it.
    pub fn order_ref(&self) -> Option<&str> {
        [self.order_num.as_deref(), self.po.as_deref()]
            .into_iter()
            .flatten()
            .find(|r| !ldk_keys::normalize_order_num(r).is_empty())
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.is_cancelled()
    }

    pub fn trade_date(&self) -> Option<NaiveDate> {
        parse_trade_date(&self.date)
    }
}

/// A sale to a customer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sell {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::reference")]
    pub order_num: Option<String>,
    #[serde(default, alias = "linkedPO", deserialize_with = "lenient::reference")]
    pub linked_po: Option<String>,
    /// Order confirmation number.
    #[serde(default, deserialize_with = "lenient::reference")]
    pub oc: Option<String>,
    #[serde(default, deserialize_with = "lenient::product")]
    pub product: ProductKey,
    #[serde(default, deserialize_with = "lenient::length")]
    pub length: String,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub volume: f64,
    /// Delivered price, $/MBF.
    #[serde(default, deserialize_with = "lenient::amount")]
    pub price: f64,
    /// Total freight for the load, $.
    #[serde(default, deserialize_with = "lenient::opt_amount")]
    pub freight: Option<f64>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::region")]
    pub region: RegionKey,
    #[serde(default, deserialize_with = "lenient::status")]
    pub status: TradeStatus,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub trader: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub customer: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub destination: Option<String>,
}

impl Sell {
    /// `order_num`, then `linked_po`, then `oc`.
    pub fn order_key(&self) -> OrderKey {
        OrderKey::first_of([
            self.order_num.as_deref(),
            self.linked_po.as_deref(),
            self.oc.as_deref(),
        ])
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.is_cancelled()
    }

    pub fn trade_date(&self) -> Option<NaiveDate> {
        parse_trade_date(&self.date)
    }

    /// Freight spread over the load, $/MBF. 0 for an empty load.
    pub fn freight_per_mbf(&self) -> f64 {
        if self.volume > 0.0 {
            self.freight.unwrap_or(0.0) / self.volume
        } else {
            0.0
        }
    }
}

/// Either side of a trade, for code that handles both (duplicate checks, imports).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "side", rename_all = "lowercase")]
pub enum Trade {
    Buy(Buy),
    Sell(Sell),
}

impl Trade {
    pub fn id(&self) -> &str {
        match self {
            Trade::Buy(b) => &b.id,
            Trade::Sell(s) => &s.id,
        }
    }

    pub fn order_key(&self) -> OrderKey {
        match self {
            Trade::Buy(b) => b.order_key(),
            Trade::Sell(s) => s.order_key(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        match self {
            Trade::Buy(b) => b.is_cancelled(),
            Trade::Sell(s) => s.is_cancelled(),
        }
    }

    pub fn product(&self) -> &ProductKey {
        match self {
            Trade::Buy(b) => &b.product,
            Trade::Sell(s) => &s.product,
        }
    }
}

// ---------------------------------------------------------------------------
// Freight lanes
// ---------------------------------------------------------------------------

/// Known truck mileage between a mill origin and a delivery point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub origin: String,
    pub dest: String,
    pub miles: f64,
    pub added: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Quotes and pricing
// ---------------------------------------------------------------------------

/// A mill's offer: FOB price for a product/length out of one origin.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MillQuote {
    #[serde(default, deserialize_with = "lenient::text")]
    pub mill: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub origin: String,
    #[serde(default, deserialize_with = "lenient::product")]
    pub product: ProductKey,
    #[serde(default, deserialize_with = "lenient::length")]
    pub length: String,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub volume: f64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub ship_window: String,
    #[serde(default, deserialize_with = "lenient::date")]
    pub date: String,
}

/// One candidate source for a delivered quote.
///
/// `freight_per_mbf` and `landed_cost` are `None` when the lane mileage is
/// unknown; such options are still shown but rank after priced ones.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingOption {
    pub mill: String,
    pub origin: String,
    pub fob_price: f64,
    pub miles: Option<f64>,
    pub freight_per_mbf: Option<f64>,
    pub landed_cost: Option<f64>,
    pub volume: f64,
    pub ship_window: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_key_prefers_order_num_then_po() {
        let b = Buy {
            order_num: Some("  ".into()),
            po: Some("PO-7".into()),
            ..Default::default()
        };
        assert_eq!(b.order_key().as_str(), "po7");
        assert_eq!(b.order_ref(), Some("PO-7"));
    }

    #[test]
    fn sell_key_falls_through_to_oc() {
        let s = Sell {
            oc: Some("OC 55".into()),
            ..Default::default()
        };
        assert_eq!(s.order_key().as_str(), "oc55");
    }

    #[test]
    fn lenient_deserialize_from_desk_export() {
        let raw = r#"{
            "id": 17,
            "orderNum": 12345,
            "product": "2X4 #2",
            "length": "16'",
            "volume": "23",
            "price": "$1,050.50",
            "freight": "",
            "region": "WEST",
            "status": "cancelled",
            "mill": "Canfor"
        }"#;
        let b: Buy = serde_json::from_str(raw).unwrap();
        assert_eq!(b.id, "17");
        assert_eq!(b.order_key().as_str(), "12345");
        assert_eq!(b.product.as_str(), "2x4#2");
        assert_eq!(b.length, "16");
        assert_eq!(b.volume, 23.0);
        assert_eq!(b.price, 1050.5);
        assert_eq!(b.freight, None);
        assert_eq!(b.region, RegionKey::West);
        assert!(b.is_cancelled());
    }

    #[test]
    fn sell_accepts_linked_po_alias() {
        let s: Sell = serde_json::from_str(r#"{"linkedPO":"PO-9","volume":10}"#).unwrap();
        assert_eq!(s.order_key().as_str(), "po9");
        assert_eq!(s.volume, 10.0);
        assert_eq!(s.status, TradeStatus::Active);
    }

    #[test]
    fn unknown_status_is_live() {
        let s: Sell = serde_json::from_str(r#"{"status":"pending"}"#).unwrap();
        assert!(!s.is_cancelled());
    }

    #[test]
    fn null_fields_fall_back_to_defaults() {
        let raw = r#"{
            "id": "b1",
            "product": null,
            "region": null,
            "status": null,
            "trader": null,
            "mill": 4417,
            "origin": null,
            "date": ""
        }"#;
        let b: Buy = serde_json::from_str(raw).unwrap();
        assert_eq!(b.product.as_str(), "");
        assert_eq!(b.region, RegionKey::Central);
        assert_eq!(b.status, TradeStatus::Active);
        assert_eq!(b.trader, None);
        assert_eq!(b.mill.as_deref(), Some("4417"));
        assert_eq!(b.date, "");

        let s: Sell = serde_json::from_str(
            r#"{"customer":null,"destination":75201,"date":"03/15/2026","status":" Cancelled "}"#,
        )
        .unwrap();
        assert_eq!(s.customer, None);
        assert_eq!(s.destination.as_deref(), Some("75201"));
        assert_eq!(s.date, "2026-03-15");
        assert!(s.is_cancelled());
    }

    #[test]
    fn null_date_becomes_today() {
        let b: Buy = serde_json::from_str(r#"{"date":null}"#).unwrap();
        assert_eq!(b.date, Utc::now().date_naive().format("%Y-%m-%d").to_string());
    }

    #[test]
    fn mill_quote_tolerates_null_and_numeric_fields() {
        let raw = r#"{
            "mill": 12,
            "origin": null,
            "product": null,
            "shipWindow": null,
            "date": null,
            "price": "$410"
        }"#;
        let q: MillQuote = serde_json::from_str(raw).unwrap();
        assert_eq!(q.mill, "12");
        assert_eq!(q.origin, "");
        assert_eq!(q.product.as_str(), "");
        assert_eq!(q.ship_window, "");
        assert_eq!(q.date.len(), 10);
    }

    #[test]
    fn freight_per_mbf_handles_empty_load() {
        let s = Sell {
            freight: Some(69.0),
            volume: 23.0,
            ..Default::default()
        };
        assert_eq!(s.freight_per_mbf(), 3.0);
        let empty = Sell {
            freight: Some(69.0),
            ..Default::default()
        };
        assert_eq!(empty.freight_per_mbf(), 0.0);
    }

    #[test]
    fn trade_enum_is_tagged_by_side() {
        let t: Trade = serde_json::from_str(r#"{"side":"sell","id":"s1","oc":"A-1"}"#).unwrap();
        assert_eq!(t.id(), "s1");
        assert_eq!(t.order_key().as_str(), "a1");
    }
}
