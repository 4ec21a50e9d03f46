use std::collections::BTreeMap;
use std::fmt;

use ldk_keys::OrderKey;
use ldk_schemas::{Buy, Sell};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::position::{available_volume, build_buy_by_order, build_order_sold};

/// The live trade collections every reconciliation question is asked against.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeBook {
    #[serde(default)]
    pub buys: Vec<Buy>,
    #[serde(default)]
    pub sells: Vec<Sell>,
}

impl TradeBook {
    pub fn new(buys: Vec<Buy>, sells: Vec<Sell>) -> Self {
        Self { buys, sells }
    }

    pub fn order_sold(&self) -> BTreeMap<OrderKey, f64> {
        build_order_sold(&self.sells)
    }

    /// Rebuilds the sold map on every call; use [`available_volume`] with a
    /// shared map when asking about many buys.
    pub fn available_volume(&self, buy: &Buy) -> f64 {
        available_volume(Some(buy), &self.order_sold())
    }

    pub fn buy_by_order(&self) -> BTreeMap<OrderKey, &Buy> {
        build_buy_by_order(&self.buys)
    }

    pub fn buy(&self, id: &str) -> Option<&Buy> {
        self.buys.iter().find(|b| b.id == id)
    }

    pub fn sell(&self, id: &str) -> Option<&Sell> {
        self.sells.iter().find(|s| s.id == id)
    }

    /// Link a short sell to a buy by copying the buy's order reference into all
    /// of the sell's reference fields.
    pub fn confirm_match(&mut self, sell_id: &str, buy_id: &str) -> Result<OrderKey, MatchError> {
        let buy = self
            .buy(buy_id)
            .ok_or_else(|| MatchError::UnknownBuy(buy_id.to_string()))?;
        let reference = buy
            .order_ref()
            .map(str::trim)
            .ok_or_else(|| MatchError::BuyHasNoReference(buy_id.to_string()))?
            .to_string();
        let key = buy.order_key();

        let sell = self
            .sells
            .iter_mut()
            .find(|s| s.id == sell_id)
            .ok_or_else(|| MatchError::UnknownSell(sell_id.to_string()))?;
        sell.order_num = Some(reference.clone());
        sell.linked_po = Some(reference.clone());
        sell.oc = Some(reference);

        info!(sell_id, buy_id, key = %key, "sell linked to buy");
        Ok(key)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchError {
    UnknownSell(String),
    UnknownBuy(String),
    BuyHasNoReference(String),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::UnknownSell(id) => write!(f, "sell not found: {id}"),
            MatchError::UnknownBuy(id) => write!(f, "buy not found: {id}"),
            MatchError::BuyHasNoReference(id) => write!(f, "buy {id} has no order number"),
        }
    }
}

impl std::error::Error for MatchError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> TradeBook {
        TradeBook::new(
            vec![
                Buy {
                    id: "b1".into(),
                    order_num: Some("PO-1".into()),
                    volume: 23.0,
                    ..Default::default()
                },
                Buy {
                    id: "b2".into(),
                    volume: 10.0,
                    ..Default::default()
                },
            ],
            vec![
                Sell {
                    id: "s1".into(),
                    order_num: Some("po 1".into()),
                    volume: 10.0,
                    ..Default::default()
                },
                Sell {
                    id: "s2".into(),
                    volume: 5.0,
                    ..Default::default()
                },
            ],
        )
    }

    #[test]
    fn available_volume_uses_live_sells() {
        let book = book();
        let b1 = book.buy("b1").unwrap();
        assert_eq!(book.available_volume(b1), 13.0);
    }

    #[test]
    fn confirm_match_links_all_references() {
        let mut book = book();
        let key = book.confirm_match("s2", "b1").unwrap();
        assert_eq!(key.as_str(), "po1");
        let s2 = book.sell("s2").unwrap();
        assert_eq!(s2.order_num.as_deref(), Some("PO-1"));
        assert_eq!(s2.linked_po.as_deref(), Some("PO-1"));
        assert_eq!(s2.oc.as_deref(), Some("PO-1"));
        assert_eq!(book.available_volume(book.buy("b1").unwrap()), 8.0);
    }

    #[test]
    fn confirm_match_errors() {
        let mut book = book();
        assert_eq!(
            book.confirm_match("s2", "nope"),
            Err(MatchError::UnknownBuy("nope".into()))
        );
        assert_eq!(
            book.confirm_match("s2", "b2"),
            Err(MatchError::BuyHasNoReference("b2".into()))
        );
        assert_eq!(
            book.confirm_match("nope", "b1"),
            Err(MatchError::UnknownSell("nope".into()))
        );
    }
}
