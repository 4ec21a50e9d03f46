//! ldk-keys
//!
//! Canonicalization of free-text business identifiers.
//!
//! Order numbers, product codes, regions, lengths, dates and counterparty names
//! arrive as whatever a trader typed. Everything downstream (reconciliation,
//! matching, P&L, pricing) compares the canonical forms produced here and never
//! the raw strings.
//!
//! Keys that are used for linking carry their own types ([`OrderKey`],
//! [`ProductKey`], [`RegionKey`]) and can only be obtained through the
//! normalizers, so a raw string cannot be compared against a normalized key by
//! accident.
//!
//! Every function in this crate is pure and total: malformed input degrades to a
//! safe default instead of returning an error.

mod fields;
mod names;
mod order;
mod product;
mod region;

pub use fields::{
    normalize_date, normalize_date_on, normalize_length, normalize_price, normalize_price_value,
    normalize_ship_window, normalize_volume, parse_trade_date, LENGTH_RANDOM, SHIP_PROMPT,
    SHIP_STANDARD,
};
pub use names::{normalize_customer_name, normalize_location, normalize_mill_company, Location};
pub use order::{normalize_order_num, OrderKey};
pub use product::{is_msr_product, normalize_product, normalize_product_for_match, ProductKey};
pub use region::{normalize_region, RegionKey};
