//! ldk-pricing
//!
//! Delivered ("landed") pricing of mill quotes.
//!
//! Freight per MBF follows the desk's base-plus-state-rate model:
//!
//! ```text
//! freight/MBF = max(floor, round((base + miles × state_rate) / MBF per truckload))
//! ```
//!
//! A quote whose lane mileage is unknown has no landed cost. It is still listed
//! but always ranks after priced quotes.

mod freight;
mod product;
mod select;

pub use freight::{
    calc_freight_per_mbf, extract_state, landed_cost, region_from_origin, FreightConfig,
    SUPPORTED_STATES,
};
pub use product::{parse_product_string, ParsedProduct};
pub use select::{
    build_pricing_options, lanes_to_resolve, rank_options, select_source, QuoteConfig,
    SourceOutcome, SourceSelection,
};
