//! ldk-reconcile
//!
//! Buy/sell linkage and volume reconciliation.
//!
//! - A sell is linked to a buy when both normalize to the same [`OrderKey`].
//! - Available volume on a buy is its volume minus everything sold against its
//!   key. It is never clamped: a negative value means the order is over-sold.
//! - Sells with no linked buy are short positions. Match suggestions for them
//!   are advisory; linking only happens through [`TradeBook::confirm_match`].
//!
//! Deterministic, pure logic. No IO.
//!
//! [`OrderKey`]: ldk_keys::OrderKey

mod book;
mod engine;
mod position;
mod scoring;
mod types;

pub use book::{MatchError, TradeBook};
pub use engine::{is_clean_book, reconcile_book, unmatched_sells};
pub use position::{
    available_volume, build_buy_by_order, build_order_sold, build_positions, find_duplicate_order,
};
pub use scoring::{
    calc_match_score, is_product_match, margin_preview, suggest_matches_for_short,
    AutoMatchConfig, MatchSuggestion, MarginPreview, MAX_SUGGESTIONS,
};
pub use types::*;
