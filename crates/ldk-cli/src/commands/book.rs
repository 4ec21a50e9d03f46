//! Trade book commands: import, reconcile, positions, P&L and short-sell matching.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use ldk_keys::{normalize_customer_name, normalize_mill_company};
use ldk_portfolio::{matched_trades_with_pnl, pnl_breakdown, GroupBy, Period};
use ldk_reconcile::{
    build_positions, find_duplicate_order, reconcile_book, suggest_matches_for_short, TradeBook,
};
use ldk_schemas::{Buy, MillQuote, Sell, Trade};
use serde::Serialize;
use tracing::{info, warn};

use super::{parse_today, print_json, read_json_file, Desk};

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Merge exported trades into the book by id. A trade whose order key is
/// already used by another live trade on the same side is still saved; the
/// clash is printed so the trader can confirm it.
pub fn import(
    desk: &mut Desk,
    buys: Option<PathBuf>,
    sells: Option<PathBuf>,
    quotes: Option<PathBuf>,
) -> Result<()> {
    if buys.is_none() && sells.is_none() && quotes.is_none() {
        bail!("nothing to import. pass --buys, --sells and/or --quotes");
    }

    let mut book = desk.load_book()?;
    let mut duplicates = 0usize;

    if let Some(path) = buys {
        let incoming: Vec<Buy> = read_json_file(&path)?;
        let n = incoming.len();
        for mut b in incoming {
            let mills = known_mills(&book);
            b.mill = normalize_mill_company(b.mill.as_deref(), &mills);
            if b.id.trim().is_empty() {
                b.id = unused_id("buy", book.buys.iter().map(|x| x.id.as_str()));
            }
            if report_duplicate(&Trade::Buy(b.clone()), &book) {
                duplicates += 1;
            }
            upsert_by_id(&mut book.buys, b, |x| &x.id);
        }
        info!(count = n, path = %path.display(), "buys imported");
    }

    if let Some(path) = sells {
        let incoming: Vec<Sell> = read_json_file(&path)?;
        let n = incoming.len();
        for mut s in incoming {
            let customers = known_customers(&book);
            s.customer = normalize_customer_name(s.customer.as_deref(), &customers);
            if s.id.trim().is_empty() {
                s.id = unused_id("sell", book.sells.iter().map(|x| x.id.as_str()));
            }
            if report_duplicate(&Trade::Sell(s.clone()), &book) {
                duplicates += 1;
            }
            upsert_by_id(&mut book.sells, s, |x| &x.id);
        }
        info!(count = n, path = %path.display(), "sells imported");
    }

    desk.save_book(&book)?;

    // A quote file is the mills' current sheet and replaces the stored one.
    let mut quote_count = None;
    if let Some(path) = quotes {
        let mut incoming: Vec<MillQuote> = read_json_file(&path)?;
        let mut mills: Vec<String> = Vec::new();
        for q in incoming.iter_mut() {
            if let Some(m) = normalize_mill_company(Some(q.mill.as_str()), &mills) {
                if !mills.contains(&m) {
                    mills.push(m.clone());
                }
                q.mill = m;
            }
        }
        desk.save_quotes(&incoming)?;
        quote_count = Some(incoming.len());
    }

    println!(
        "import_ok=true buys={} sells={} quotes={} duplicate_orders={}",
        book.buys.len(),
        book.sells.len(),
        quote_count.map(|n| n.to_string()).unwrap_or_else(|| "unchanged".into()),
        duplicates
    );
    Ok(())
}

/// `<prefix>-<n>` for the smallest n >= 1 not already taken.
fn unused_id<'a, I>(prefix: &str, taken: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: HashSet<&str> = taken.into_iter().collect();
    (1..)
        .map(|n| format!("{prefix}-{n}"))
        .find(|id| !taken.contains(id.as_str()))
        .unwrap_or_else(|| prefix.to_string())
}

fn upsert_by_id<T, F>(items: &mut Vec<T>, item: T, id: F)
where
    F: Fn(&T) -> &String,
{
    match items.iter().position(|x| id(x) == id(&item)) {
        Some(i) => items[i] = item,
        None => items.push(item),
    }
}

fn report_duplicate(candidate: &Trade, book: &TradeBook) -> bool {
    match find_duplicate_order(candidate, &book.buys, &book.sells) {
        Some(dup) => {
            warn!(id = candidate.id(), key = %dup.key, existing = %dup.existing_id, "duplicate order key");
            println!(
                "duplicate_order id={} key={} existing_id={} counterparty={} product={} date={}",
                candidate.id(),
                dup.key,
                dup.existing_id,
                dup.counterparty.as_deref().unwrap_or("-"),
                dup.product,
                dup.date
            );
            true
        }
        None => false,
    }
}

fn known_mills(book: &TradeBook) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for m in book.buys.iter().filter_map(|b| b.mill.as_ref()) {
        if !out.contains(m) {
            out.push(m.clone());
        }
    }
    out
}

fn known_customers(book: &TradeBook) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for c in book.sells.iter().filter_map(|s| s.customer.as_ref()) {
        if !out.contains(c) {
            out.push(c.clone());
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

pub fn reconcile(desk: &Desk, strict: bool) -> Result<()> {
    let book = desk.load_book()?;
    let report = reconcile_book(&book);
    print_json(&report)?;

    if strict && !report.is_clean() {
        bail!(
            "book needs attention: {} issue(s) ({:?})",
            report.diffs.len(),
            report.reasons
        );
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PositionRow<'a> {
    product: &'a str,
    length: &'a str,
    bought: f64,
    sold: f64,
    net: f64,
    side: ldk_reconcile::PositionSide,
    avg_buy: f64,
    avg_sell: f64,
}

pub fn positions(desk: &Desk) -> Result<()> {
    let book = desk.load_book()?;
    let positions = build_positions(&book.buys, &book.sells);
    let rows: Vec<PositionRow<'_>> = positions
        .iter()
        .map(|((product, length), p)| PositionRow {
            product: product.as_str(),
            length: length.as_str(),
            bought: p.bought,
            sold: p.sold,
            net: p.net(),
            side: p.side(),
            avg_buy: p.avg_buy(),
            avg_sell: p.avg_sell(),
        })
        .collect();
    print_json(&rows)
}

pub fn pnl(desk: &Desk, group_by: &str, period: &str, today: Option<&str>) -> Result<()> {
    let group_by: GroupBy = group_by.parse()?;
    let period: Period = period.parse()?;
    let today = parse_today(today)?;

    let book = desk.load_book()?;
    print_json(&pnl_breakdown(&book, group_by, period, today))
}

pub fn trades(desk: &Desk, period: &str, today: Option<&str>) -> Result<()> {
    let period: Period = period.parse()?;
    let today = parse_today(today)?;

    let book = desk.load_book()?;
    print_json(&matched_trades_with_pnl(&book, period, today))
}

// ---------------------------------------------------------------------------
// Short-sell matching
// ---------------------------------------------------------------------------

pub fn match_short(desk: &mut Desk, sell_id: &str, confirm: Option<&str>) -> Result<()> {
    let mut book = desk.load_book()?;

    if let Some(buy_id) = confirm {
        let key = book
            .confirm_match(sell_id, buy_id)
            .with_context(|| format!("match {sell_id} -> {buy_id} failed"))?;
        desk.save_book(&book)?;
        println!("matched=true sell_id={sell_id} buy_id={buy_id} order_key={key}");
        return Ok(());
    }

    let sell = book
        .sell(sell_id)
        .with_context(|| format!("sell not found: {sell_id}"))?;
    let suggestions = suggest_matches_for_short(sell, &book, &desk.cfg().auto_match);
    if suggestions.is_empty() {
        info!(sell_id, "no buy scored high enough to suggest");
    }
    print_json(&suggestions)
}
