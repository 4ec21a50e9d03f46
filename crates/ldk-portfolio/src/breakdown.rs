use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use ldk_reconcile::TradeBook;
use ldk_schemas::{Buy, Sell};
use serde::Serialize;

use crate::{Period, UnknownGrouping};

const UNKNOWN: &str = "Unknown";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Product,
    Trader,
    Region,
    Customer,
    Mill,
    Month,
}

impl GroupBy {
    fn key(&self, sell: &Sell, buy: Option<&Buy>) -> String {
        let text = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(UNKNOWN)
                .to_string()
        };
        match self {
            GroupBy::Product => text(Some(sell.product.as_str())),
            GroupBy::Trader => text(
                sell.trader
                    .as_deref()
                    .filter(|t| !t.trim().is_empty())
                    .or(buy.and_then(|b| b.trader.as_deref())),
            ),
            GroupBy::Region => sell.region.as_str().to_string(),
            GroupBy::Customer => text(sell.customer.as_deref()),
            GroupBy::Mill => text(buy.and_then(|b| b.mill.as_deref())),
            GroupBy::Month => sell
                .trade_date()
                .map(|d| d.format("%Y-%m").to_string())
                .unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }
}

impl FromStr for GroupBy {
    type Err = UnknownGrouping;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "product" => Ok(GroupBy::Product),
            "trader" => Ok(GroupBy::Trader),
            "region" => Ok(GroupBy::Region),
            "customer" => Ok(GroupBy::Customer),
            "mill" => Ok(GroupBy::Mill),
            "month" => Ok(GroupBy::Month),
            other => Err(UnknownGrouping(other.to_string())),
        }
    }
}

/// Aggregate for one group. Revenue is FOB (freight netted out); cost and P&L
/// only count matched sells.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownRow {
    pub key: String,
    pub trades: u32,
    pub volume: f64,
    pub revenue: f64,
    pub cost: f64,
    pub freight: f64,
    pub pnl: f64,
    pub matched_trades: u32,
    pub matched_volume: f64,
    pub avg_sell_price: f64,
    pub avg_cost: f64,
    pub margin_per_mbf: f64,
    pub margin_pct: f64,
}

impl BreakdownRow {
    fn finish(mut self) -> Self {
        let ratio = |num: f64, den: f64| if den != 0.0 { num / den } else { 0.0 };
        self.avg_sell_price = ratio(self.revenue, self.volume);
        self.avg_cost = ratio(self.cost, self.matched_volume);
        self.margin_per_mbf = ratio(self.pnl, self.matched_volume);
        self.margin_pct = ratio(self.pnl, self.cost) * 100.0;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownTotals {
    pub trades: u32,
    pub volume: f64,
    pub revenue: f64,
    pub cost: f64,
    pub freight: f64,
    pub pnl: f64,
    pub matched_trades: u32,
    pub matched_volume: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PnLBreakdown {
    pub group_by: GroupBy,
    pub period: Period,
    /// Highest P&L first; ties keep key order.
    pub items: Vec<BreakdownRow>,
    pub totals: BreakdownTotals,
}

/// P&L per group over live sells dated inside `period`.
pub fn pnl_breakdown(
    book: &TradeBook,
    group_by: GroupBy,
    period: Period,
    today: NaiveDate,
) -> PnLBreakdown {
    let buy_by_order = book.buy_by_order();
    let mut groups: BTreeMap<String, BreakdownRow> = BTreeMap::new();

    for s in book.sells.iter().filter(|s| !s.is_cancelled()) {
        if !period.contains(s.trade_date(), today) {
            continue;
        }
        let buy = buy_by_order.get(&s.order_key()).copied();
        let key = group_by.key(s, buy);

        let vol = s.volume;
        let sell_fob = s.price - s.freight_per_mbf();

        let row = groups.entry(key.clone()).or_insert_with(|| BreakdownRow {
            key,
            ..Default::default()
        });
        row.trades += 1;
        row.volume += vol;
        row.revenue += sell_fob * vol;
        row.freight += s.freight.unwrap_or(0.0);

        if let Some(b) = buy {
            let cost = b.price * vol;
            row.cost += cost;
            row.pnl += sell_fob * vol - cost;
            row.matched_trades += 1;
            row.matched_volume += vol;
        }
    }

    let mut items: Vec<BreakdownRow> = groups.into_values().map(BreakdownRow::finish).collect();
    items.sort_by(|a, b| b.pnl.partial_cmp(&a.pnl).unwrap_or(Ordering::Equal));

    let totals = items.iter().fold(BreakdownTotals::default(), |mut t, r| {
        t.trades += r.trades;
        t.volume += r.volume;
        t.revenue += r.revenue;
        t.cost += r.cost;
        t.freight += r.freight;
        t.pnl += r.pnl;
        t.matched_trades += r.matched_trades;
        t.matched_volume += r.matched_volume;
        t
    });

    PnLBreakdown {
        group_by,
        period,
        items,
        totals,
    }
}
