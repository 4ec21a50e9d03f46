//! Lane, freight and delivered-quote commands.

use anyhow::{bail, ensure, Context, Result};
use ldk_keys::normalize_length;
use ldk_mileage::{DistanceResolver, LaneCache, LaneRequest, Upsert};
use ldk_pricing::{
    build_pricing_options, calc_freight_per_mbf, extract_state, landed_cost, lanes_to_resolve,
    parse_product_string, select_source, ParsedProduct, SourceSelection,
};
use serde::Serialize;
use tracing::{info, warn};

use super::{print_json, Desk};

// ---------------------------------------------------------------------------
// Lanes
// ---------------------------------------------------------------------------

pub fn lanes_list(desk: &Desk) -> Result<()> {
    let lanes = desk.load_lanes()?;
    let rows: Vec<_> = lanes.iter().collect();
    print_json(&rows)
}

pub fn lanes_add(desk: &mut Desk, origin: &str, dest: &str, miles: f64) -> Result<()> {
    ensure!(
        !origin.trim().is_empty() && !dest.trim().is_empty(),
        "origin and dest must not be empty"
    );
    let mut lanes = desk.load_lanes()?;
    let outcome = lanes.upsert(origin, dest, miles);
    if outcome == Upsert::Rejected {
        bail!("miles must be a positive number (got {miles})");
    }
    desk.save_lanes(&lanes)?;
    println!(
        "lane_saved=true origin={origin} dest={dest} miles={miles} outcome={}",
        format!("{outcome:?}").to_lowercase()
    );
    Ok(())
}

pub async fn lanes_lookup(desk: &mut Desk, origin: &str, dest: &str) -> Result<()> {
    let lanes = desk.load_lanes()?;
    let mut resolver = DistanceResolver::from_config(&desk.cfg().mileage, lanes)
        .context("mileage clients could not be built")?;

    let miles = resolver.single_lane(origin, dest).await;
    desk.save_lanes(resolver.lanes())?;

    match miles {
        Some(m) => {
            println!("origin={origin} dest={dest} miles={m}");
            Ok(())
        }
        None => bail!("no mileage found for {origin} -> {dest}. record it with `ldk lanes add`"),
    }
}

// ---------------------------------------------------------------------------
// Freight
// ---------------------------------------------------------------------------

pub fn freight(desk: &Desk, miles: f64, origin: &str, msr: bool, fob: Option<f64>) -> Result<()> {
    ensure!(
        miles.is_finite() && miles > 0.0,
        "--miles must be a positive number (got {miles})"
    );
    let cfg = &desk.cfg().pricing;
    let state = extract_state(origin);
    let per_mbf = calc_freight_per_mbf(Some(miles), origin, msr, cfg);

    println!(
        "origin_state={} rate_per_mile={} freight_per_mbf={per_mbf}",
        state.unwrap_or("-"),
        cfg.state_rate(state)
    );
    if let Some(fob) = fob {
        if let Some(landed) = landed_cost(fob, Some(per_mbf)) {
            println!("landed_cost={landed}");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteOutput<'a> {
    product: &'a ParsedProduct,
    length: Option<&'a str>,
    dest: &'a str,
    /// Lanes still without mileage; their options carry no landed cost.
    missing_lanes: Vec<LaneRequest>,
    #[serde(flatten)]
    selection: SourceSelection,
}

/// Price every stored mill quote for `product` delivered to `dest` and pick
/// the cheapest landed source.
pub async fn quote(
    desk: &mut Desk,
    product: &str,
    dest: &str,
    length: Option<&str>,
    resolve: bool,
) -> Result<()> {
    ensure!(!dest.trim().is_empty(), "--dest must not be empty");
    let parsed = parse_product_string(product);
    let length: Option<String> = length.map(normalize_length).or_else(|| parsed.length.clone());
    let base = parsed.base.as_str();

    let quotes = desk.load_quotes()?;
    let mut lanes: LaneCache = desk.load_lanes()?;

    let mut missing = lanes_to_resolve(&quotes, base, length.as_deref(), dest, |o, d| {
        lanes.miles(o, d)
    });

    if resolve && !missing.is_empty() {
        let requests: Vec<LaneRequest> = missing
            .iter()
            .map(|(o, d)| LaneRequest::new(o.as_str(), d.as_str()))
            .collect();
        let mut resolver = DistanceResolver::from_config(&desk.cfg().mileage, lanes)
            .context("mileage clients could not be built")?;
        let report = resolver.resolve(&requests).await;
        lanes = resolver.into_lanes();
        desk.save_lanes(&lanes)?;
        info!(
            resolved = report.resolved.len(),
            failed = report.failed.len(),
            "quote lanes resolved"
        );
        missing = report
            .failed
            .into_iter()
            .map(|r| (r.origin, r.dest))
            .collect();
    }

    for (o, d) in &missing {
        warn!(origin = %o, dest = %d, "no mileage for lane; landed cost unknown");
    }

    let cfg = desk.cfg();
    let options = build_pricing_options(
        &quotes,
        base,
        length.as_deref(),
        dest,
        |o, d| lanes.miles(o, d),
        &cfg.pricing,
    );
    let selection = select_source(options, cfg.quote.margin_range);

    print_json(&QuoteOutput {
        product: &parsed,
        length: length.as_deref(),
        dest,
        missing_lanes: missing
            .into_iter()
            .map(|(o, d)| LaneRequest::new(o, d))
            .collect(),
        selection,
    })
}
