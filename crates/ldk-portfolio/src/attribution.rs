use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use ldk_keys::{OrderKey, ProductKey, RegionKey};
use ldk_reconcile::TradeBook;
use ldk_schemas::{Buy, Sell};
use serde::Serialize;

use crate::Period;

/// P&L of one sell against the buy it was sourced from.
///
/// All money is in dollars, prices in $/MBF, volume in MBF.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PnLComponents {
    pub volume: f64,
    /// price × volume
    pub gross_revenue: f64,
    pub freight_cost: f64,
    pub freight_per_mbf: f64,
    /// Delivered price less freight/MBF.
    pub sell_fob: f64,
    /// sell_fob × volume
    pub net_revenue: f64,
    /// buy price × volume
    pub buy_cost: f64,
    pub gross_pnl: f64,
    pub margin_per_mbf: f64,
    /// gross_pnl / buy_cost × 100; 0 with no cost basis.
    pub margin_pct: f64,
}

impl PnLComponents {
    pub fn compute(sell: &Sell, buy: &Buy) -> Self {
        let volume = sell.volume;
        let freight_cost = sell.freight.unwrap_or(0.0);
        let freight_per_mbf = sell.freight_per_mbf();
        let sell_fob = sell.price - freight_per_mbf;
        let margin_per_mbf = sell_fob - buy.price;
        let buy_cost = buy.price * volume;
        let gross_pnl = margin_per_mbf * volume;

        Self {
            volume,
            gross_revenue: sell.price * volume,
            freight_cost,
            freight_per_mbf,
            sell_fob,
            net_revenue: sell_fob * volume,
            buy_cost,
            gross_pnl,
            margin_per_mbf,
            margin_pct: if buy_cost != 0.0 {
                gross_pnl / buy_cost * 100.0
            } else {
                0.0
            },
        }
    }
}

/// Components for `sell`, or `None` when no live buy shares its order key.
pub fn trade_pnl_components(
    sell: &Sell,
    buy_by_order: &BTreeMap<OrderKey, &Buy>,
) -> Option<PnLComponents> {
    let key = sell.order_key();
    if key.is_empty() {
        return None;
    }
    buy_by_order
        .get(&key)
        .map(|buy| PnLComponents::compute(sell, buy))
}

/// A matched sell with its buy and the dimensions it is reported under.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedTrade<'a> {
    pub sell: &'a Sell,
    pub buy: &'a Buy,
    pub date: Option<NaiveDate>,
    pub trader: Option<&'a str>,
    pub product: &'a ProductKey,
    pub customer: Option<&'a str>,
    pub mill: Option<&'a str>,
    pub region: RegionKey,
    pub components: PnLComponents,
}

/// Every live, matched sell dated inside `period`, newest first.
pub fn matched_trades_with_pnl(
    book: &TradeBook,
    period: Period,
    today: NaiveDate,
) -> Vec<MatchedTrade<'_>> {
    let buy_by_order = book.buy_by_order();

    let mut trades: Vec<MatchedTrade<'_>> = book
        .sells
        .iter()
        .filter(|s| !s.is_cancelled())
        .filter(|s| period.contains(s.trade_date(), today))
        .filter_map(|s| {
            let buy = *buy_by_order.get(&s.order_key())?;
            Some(MatchedTrade {
                sell: s,
                buy,
                date: s.trade_date(),
                trader: s.trader.as_deref().or(buy.trader.as_deref()),
                product: &s.product,
                customer: s.customer.as_deref(),
                mill: buy.mill.as_deref(),
                region: s.region,
                components: PnLComponents::compute(s, buy),
            })
        })
        .collect();

    trades.sort_by_key(|t| Reverse(t.date));
    trades
}
