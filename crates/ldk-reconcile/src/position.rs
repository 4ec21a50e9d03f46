use std::collections::BTreeMap;

use ldk_keys::{normalize_length, OrderKey};
use ldk_schemas::{Buy, Sell, Trade};

use crate::{DuplicateOrder, Position, PositionKey};

/// Total volume sold against each order key.
///
/// Cancelled sells and sells with no order reference are skipped.
pub fn build_order_sold<'a, I>(sells: I) -> BTreeMap<OrderKey, f64>
where
    I: IntoIterator<Item = &'a Sell>,
{
    let mut sold: BTreeMap<OrderKey, f64> = BTreeMap::new();
    for s in sells {
        if s.is_cancelled() {
            continue;
        }
        let key = s.order_key();
        if key.is_empty() {
            continue;
        }
        *sold.entry(key).or_insert(0.0) += s.volume;
    }
    sold
}

/// Volume still unsold on `buy`. Negative when over-sold; 0 for a missing buy.
pub fn available_volume(buy: Option<&Buy>, order_sold: &BTreeMap<OrderKey, f64>) -> f64 {
    let Some(buy) = buy else {
        return 0.0;
    };
    let key = buy.order_key();
    if key.is_empty() {
        return buy.volume;
    }
    buy.volume - order_sold.get(&key).copied().unwrap_or(0.0)
}

/// One live buy per order key; the first in iteration order wins.
pub fn build_buy_by_order<'a, I>(buys: I) -> BTreeMap<OrderKey, &'a Buy>
where
    I: IntoIterator<Item = &'a Buy>,
{
    let mut by_order: BTreeMap<OrderKey, &'a Buy> = BTreeMap::new();
    for b in buys {
        if b.is_cancelled() {
            continue;
        }
        let key = b.order_key();
        if key.is_empty() {
            continue;
        }
        by_order.entry(key).or_insert(b);
    }
    by_order
}

/// Net position per (product, length) across all live trades.
pub fn build_positions<'a, B, S>(buys: B, sells: S) -> BTreeMap<PositionKey, Position>
where
    B: IntoIterator<Item = &'a Buy>,
    S: IntoIterator<Item = &'a Sell>,
{
    let mut out: BTreeMap<PositionKey, Position> = BTreeMap::new();

    for b in buys.into_iter().filter(|b| !b.is_cancelled()) {
        let key = (b.product.clone(), normalize_length(&b.length));
        let p = out.entry(key).or_default();
        p.bought += b.volume;
        p.bought_value += b.price * b.volume;
    }

    for s in sells.into_iter().filter(|s| !s.is_cancelled()) {
        let key = (s.product.clone(), normalize_length(&s.length));
        let p = out.entry(key).or_default();
        p.sold += s.volume;
        p.sold_value += (s.price - s.freight_per_mbf()) * s.volume;
    }

    out
}

/// Save-time check: does another live trade on the same side already use the
/// candidate's order key?
pub fn find_duplicate_order(
    candidate: &Trade,
    buys: &[Buy],
    sells: &[Sell],
) -> Option<DuplicateOrder> {
    let key = candidate.order_key();
    if key.is_empty() {
        return None;
    }
    let id = candidate.id();

    match candidate {
        Trade::Buy(_) => buys
            .iter()
            .filter(|b| b.id != id && !b.is_cancelled())
            .find(|b| b.order_key() == key)
            .map(|b| DuplicateOrder {
                key: key.clone(),
                existing_id: b.id.clone(),
                counterparty: b.mill.clone(),
                product: b.product.clone(),
                date: b.date.clone(),
            }),
        Trade::Sell(_) => sells
            .iter()
            .filter(|s| s.id != id && !s.is_cancelled())
            .find(|s| s.order_key() == key)
            .map(|s| DuplicateOrder {
                key: key.clone(),
                existing_id: s.id.clone(),
                counterparty: s.customer.clone(),
                product: s.product.clone(),
                date: s.date.clone(),
            }),
    }
}
