use chrono::NaiveDate;
use ldk_keys::{normalize_product, RegionKey};
use ldk_portfolio::*;
use ldk_reconcile::TradeBook;
use ldk_schemas::{Buy, Sell, TradeStatus};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 20).unwrap()
}

fn buy(id: &str, ord: &str, price: f64, mill: &str, trader: &str) -> Buy {
    Buy {
        id: id.into(),
        order_num: Some(ord.into()),
        product: normalize_product("2x4#2"),
        volume: 46.0,
        price,
        mill: Some(mill.into()),
        trader: Some(trader.into()),
        ..Default::default()
    }
}

#[allow(clippy::too_many_arguments)]
fn sell(
    id: &str,
    ord: Option<&str>,
    product: &str,
    price: f64,
    freight: f64,
    date: &str,
    customer: &str,
    region: RegionKey,
) -> Sell {
    Sell {
        id: id.into(),
        order_num: ord.map(Into::into),
        product: normalize_product(product),
        volume: 23.0,
        price,
        freight: Some(freight),
        date: date.into(),
        customer: Some(customer.into()),
        region,
        ..Default::default()
    }
}

fn book() -> TradeBook {
    let mut cancelled = sell(
        "s-x",
        Some("PO-1"),
        "2x4#2",
        999.0,
        0.0,
        "2026-03-18",
        "Ghost",
        RegionKey::West,
    );
    cancelled.status = TradeStatus::Cancelled;

    TradeBook::new(
        vec![
            buy("b1", "PO-1", 400.0, "Canfor", "Ann"),
            buy("b2", "PO-2", 500.0, "West Fraser", "Bo"),
        ],
        vec![
            // +1081
            sell("s1", Some("PO-1"), "2x4#2", 450.0, 69.0, "2026-03-18", "Acme", RegionKey::West),
            // -2369: 2x6 sold under its cost basis
            sell("s2", Some("po2"), "2x6#2", 400.0, 69.0, "2026-03-10", "Acme", RegionKey::East),
            // unmatched: revenue counts, P&L does not
            sell("s3", None, "2x4#2", 460.0, 0.0, "2026-03-19", "Bilt", RegionKey::West),
            // outside 30d
            sell("s4", Some("PO-1"), "2x4#2", 900.0, 0.0, "2026-01-02", "Acme", RegionKey::West),
            cancelled,
        ],
    )
}

#[test]
fn scenario_breakdown_by_product_sorted_by_pnl() {
    let b = pnl_breakdown(&book(), GroupBy::Product, Period::Days30, today());

    let keys: Vec<&str> = b.items.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["2x4#2", "2x6#2"]);

    let top = &b.items[0];
    assert_eq!(top.trades, 2);
    assert_eq!(top.matched_trades, 1);
    assert_eq!(top.volume, 46.0);
    assert_eq!(top.matched_volume, 23.0);
    assert_eq!(top.pnl, 1081.0);
    assert_eq!(top.revenue, 447.0 * 23.0 + 460.0 * 23.0);
    assert_eq!(top.margin_per_mbf, 47.0);

    let bottom = &b.items[1];
    assert_eq!(bottom.pnl, 397.0 * 23.0 - 500.0 * 23.0);

    assert_eq!(b.totals.trades, 3);
    assert_eq!(b.totals.matched_trades, 2);
    assert_eq!(b.totals.freight, 138.0);
    assert_eq!(b.totals.pnl, top.pnl + bottom.pnl);
}

#[test]
fn scenario_breakdown_dimensions() {
    let book = book();

    let by_mill = pnl_breakdown(&book, GroupBy::Mill, Period::All, today());
    let mills: Vec<&str> = by_mill.items.iter().map(|r| r.key.as_str()).collect();
    // Canfor has s1 and s4; unmatched s3 lands in Unknown with zero P&L.
    assert_eq!(mills, vec!["Canfor", "Unknown", "West Fraser"]);

    let by_trader = pnl_breakdown(&book, GroupBy::Trader, Period::Days30, today());
    assert!(by_trader.items.iter().any(|r| r.key == "Ann"));
    assert!(by_trader.items.iter().any(|r| r.key == "Bo"));

    let by_region = pnl_breakdown(&book, GroupBy::Region, Period::Days30, today());
    let regions: Vec<&str> = by_region.items.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(regions, vec!["west", "east"]);

    let by_month = pnl_breakdown(&book, GroupBy::Month, Period::All, today());
    let months: Vec<&str> = by_month.items.iter().map(|r| r.key.as_str()).collect();
    assert!(months.contains(&"2026-01"));
    assert!(months.contains(&"2026-03"));

    let by_customer = pnl_breakdown(&book, GroupBy::Customer, Period::Days7, today());
    let customers: Vec<&str> = by_customer.items.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(customers, vec!["Acme", "Bilt"]);
}

#[test]
fn scenario_matched_trades_newest_first() {
    let book = book();
    let trades = matched_trades_with_pnl(&book, Period::Days30, today());
    let ids: Vec<&str> = trades.iter().map(|t| t.sell.id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s2"]);
    assert_eq!(trades[0].mill, Some("Canfor"));
    assert_eq!(trades[0].trader, Some("Ann"));
    assert_eq!(trades[0].components.gross_pnl, 1081.0);

    let all = matched_trades_with_pnl(&book, Period::All, today());
    assert_eq!(all.len(), 3);
    assert_eq!(all[2].sell.id, "s4");
}

#[test]
fn scenario_grouping_names_parse() {
    assert_eq!("Mill".parse::<GroupBy>(), Ok(GroupBy::Mill));
    assert!("desk".parse::<GroupBy>().is_err());
}
