use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use ldk_keys::OrderKey;
use ldk_schemas::Sell;
use tracing::debug;

use crate::position::{build_buy_by_order, build_order_sold};
use crate::{BookStatus, ReconcileDiff, ReconcileReason, ReconcileReport, TradeBook};

// Sub-cent residue from summing fractional volumes is not an over-sell.
const VOLUME_EPSILON: f64 = 1e-6;

fn push_reason_once(reasons: &mut Vec<ReconcileReason>, r: ReconcileReason) {
    if !reasons.contains(&r) {
        reasons.push(r);
    }
}

/// Live sells with no live buy behind them (short positions).
pub fn unmatched_sells(book: &TradeBook) -> Vec<&Sell> {
    let buy_keys: BTreeSet<OrderKey> = book
        .buys
        .iter()
        .filter(|b| !b.is_cancelled())
        .map(|b| b.order_key())
        .filter(|k| !k.is_empty())
        .collect();

    book.sells
        .iter()
        .filter(|s| !s.is_cancelled())
        .filter(|s| {
            let key = s.order_key();
            key.is_empty() || !buy_keys.contains(&key)
        })
        .collect()
}

/// Deterministic book reconciliation:
/// - a buy whose linked sells exceed its volume => OverSold
/// - a live sell with no linked buy => ShortSell
/// - two live buys normalizing to the same key => DuplicateBuyKey
pub fn reconcile_book(book: &TradeBook) -> ReconcileReport {
    let mut reasons: Vec<ReconcileReason> = Vec::new();
    let mut diffs: Vec<ReconcileDiff> = Vec::new();

    // 1) Over-sold orders. Only the buy that owns the key is checked.
    let sold = build_order_sold(&book.sells);
    for (key, buy) in build_buy_by_order(&book.buys) {
        let s = sold.get(&key).copied().unwrap_or(0.0);
        let available = buy.volume - s;
        if available < -VOLUME_EPSILON {
            diffs.push(ReconcileDiff::OverSold {
                key,
                buy_id: buy.id.clone(),
                bought: buy.volume,
                sold: s,
                available,
            });
            push_reason_once(&mut reasons, ReconcileReason::OverSold);
        }
    }

    // 2) Short sells.
    for s in unmatched_sells(book) {
        diffs.push(ReconcileDiff::ShortSell {
            sell_id: s.id.clone(),
            key: s.order_key(),
            volume: s.volume,
        });
        push_reason_once(&mut reasons, ReconcileReason::ShortSell);
    }

    // 3) Duplicate buy keys.
    let mut ids_by_key: BTreeMap<OrderKey, Vec<String>> = BTreeMap::new();
    for b in book.buys.iter().filter(|b| !b.is_cancelled()) {
        let key = b.order_key();
        if !key.is_empty() {
            ids_by_key.entry(key).or_default().push(b.id.clone());
        }
    }
    for (key, buy_ids) in ids_by_key {
        if buy_ids.len() > 1 {
            diffs.push(ReconcileDiff::DuplicateBuyKey { key, buy_ids });
            push_reason_once(&mut reasons, ReconcileReason::DuplicateBuyKey);
        }
    }

    // Stable ordering for reasons + diffs (deterministic output).
    reasons.sort();
    diffs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    debug!(
        diffs = diffs.len(),
        buys = book.buys.len(),
        sells = book.sells.len(),
        "book reconciled"
    );

    if reasons.is_empty() {
        ReconcileReport::clean()
    } else {
        ReconcileReport {
            status: BookStatus::NeedsAttention,
            reasons,
            diffs,
        }
    }
}

pub fn is_clean_book(book: &TradeBook) -> bool {
    reconcile_book(book).is_clean()
}
