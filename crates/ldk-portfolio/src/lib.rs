//! ldk-portfolio
//!
//! Realized P&L attribution for matched trades.
//! - A sell is matched when a live buy shares its order key
//! - Per-trade components net freight out of the delivered price
//! - Aggregates by product, trader, region, customer, mill or month
//! - Pure deterministic logic (no IO; "today" is always passed in)

mod attribution;
mod breakdown;
mod period;

pub use attribution::{matched_trades_with_pnl, trade_pnl_components, MatchedTrade, PnLComponents};
pub use breakdown::{pnl_breakdown, BreakdownRow, BreakdownTotals, GroupBy, PnLBreakdown};
pub use period::{Period, UnknownGrouping, UnknownPeriod};
