use std::cmp::Ordering;
use std::collections::BTreeSet;

use ldk_keys::{is_msr_product, normalize_length, normalize_product_for_match, SHIP_PROMPT};
use ldk_schemas::{MillQuote, PricingOption};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::freight::{calc_freight_per_mbf, landed_cost, FreightConfig};

/// Quote-side settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    /// Target resale margin band, $/MBF over landed cost.
    pub margin_range: Option<(f64, f64)>,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            margin_range: Some((22.0, 35.0)),
        }
    }
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

fn compare_options(a: &PricingOption, b: &PricingOption) -> Ordering {
    match (a.landed_cost, b.landed_cost) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a
            .fob_price
            .partial_cmp(&b.fob_price)
            .unwrap_or(Ordering::Equal),
    }
}

/// Cheapest landed cost first; unpriced options last, by FOB among themselves.
pub fn rank_options(mut options: Vec<PricingOption>) -> Vec<PricingOption> {
    options.sort_by(compare_options);
    options
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum SourceOutcome {
    /// No mill quoted the product.
    NoOptions,
    /// Best option has a landed cost (profitable or not).
    Priced,
    /// Options exist but the best one has no landed cost yet.
    FreightUnknown,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSelection {
    pub outcome: SourceOutcome,
    pub best: Option<PricingOption>,
    /// Ranked.
    pub options: Vec<PricingOption>,
    pub margin_range: Option<(f64, f64)>,
    pub suggested_sell_price: Option<f64>,
}

/// Rank `options` and price a resale off the best one at the middle of the
/// margin band.
pub fn select_source(
    options: Vec<PricingOption>,
    margin_range: Option<(f64, f64)>,
) -> SourceSelection {
    let options = rank_options(options);
    let best = options.first().cloned();

    let outcome = match &best {
        None => SourceOutcome::NoOptions,
        Some(b) if b.landed_cost.is_some() => SourceOutcome::Priced,
        Some(_) => SourceOutcome::FreightUnknown,
    };

    let suggested_sell_price = match (best.as_ref().and_then(|b| b.landed_cost), margin_range) {
        (Some(landed), Some((lo, hi))) => Some(landed + (lo + hi) / 2.0),
        _ => None,
    };

    SourceSelection {
        outcome,
        best,
        options,
        margin_range,
        suggested_sell_price,
    }
}

// ---------------------------------------------------------------------------
// Options from mill quotes
// ---------------------------------------------------------------------------

fn quote_matches(q: &MillQuote, product: &str, length: Option<&str>) -> bool {
    if normalize_product_for_match(q.product.as_str()) != normalize_product_for_match(product) {
        return false;
    }
    match length {
        Some(l) => normalize_length(&q.length) == normalize_length(l),
        None => true,
    }
}

/// Distinct `(origin, dest)` lanes the matching quotes need and `miles_of`
/// cannot answer yet.
pub fn lanes_to_resolve<F>(
    quotes: &[MillQuote],
    product: &str,
    length: Option<&str>,
    dest: &str,
    miles_of: F,
) -> Vec<(String, String)>
where
    F: Fn(&str, &str) -> Option<f64>,
{
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut out = Vec::new();
    for q in quotes.iter().filter(|q| quote_matches(q, product, length)) {
        let origin = q.origin.trim();
        if origin.is_empty() || !seen.insert(origin.to_lowercase()) {
            continue;
        }
        if miles_of(origin, dest).is_none() {
            out.push((origin.to_string(), dest.to_string()));
        }
    }
    out
}

/// One option per quote for `product` (and `length`, when given) delivered to
/// `dest`. Quotes without an origin are skipped. `miles_of` answers from the
/// lane cache.
pub fn build_pricing_options<F>(
    quotes: &[MillQuote],
    product: &str,
    length: Option<&str>,
    dest: &str,
    miles_of: F,
    cfg: &FreightConfig,
) -> Vec<PricingOption>
where
    F: Fn(&str, &str) -> Option<f64>,
{
    let is_msr = is_msr_product(product);

    quotes
        .iter()
        .filter(|q| quote_matches(q, product, length))
        .filter(|q| !q.origin.trim().is_empty())
        .map(|q| {
            let miles = miles_of(&q.origin, dest).filter(|m| *m > 0.0);
            let freight = miles.map(|m| calc_freight_per_mbf(Some(m), &q.origin, is_msr, cfg));
            debug!(mill = %q.mill, origin = %q.origin, ?miles, ?freight, "priced quote");
            PricingOption {
                mill: q.mill.clone(),
                origin: q.origin.clone(),
                fob_price: q.price,
                miles,
                freight_per_mbf: freight,
                landed_cost: landed_cost(q.price, freight),
                volume: q.volume,
                ship_window: if q.ship_window.trim().is_empty() {
                    SHIP_PROMPT.to_string()
                } else {
                    q.ship_window.clone()
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opt(mill: &str, fob: f64, landed: Option<f64>) -> PricingOption {
        PricingOption {
            mill: mill.into(),
            fob_price: fob,
            landed_cost: landed,
            ..Default::default()
        }
    }

    #[test]
    fn ranking_puts_unknown_landed_last() {
        let ranked = rank_options(vec![
            opt("c", 390.0, None),
            opt("b", 350.0, Some(425.0)),
            opt("a", 360.0, Some(410.0)),
            opt("d", 380.0, None),
        ]);
        let mills: Vec<&str> = ranked.iter().map(|o| o.mill.as_str()).collect();
        assert_eq!(mills, vec!["a", "b", "d", "c"]);
    }

    #[test]
    fn suggested_price_uses_margin_midpoint() {
        let sel = select_source(
            vec![opt("b", 350.0, Some(425.0)), opt("a", 360.0, Some(410.0))],
            Some((22.0, 35.0)),
        );
        assert_eq!(sel.outcome, SourceOutcome::Priced);
        assert_eq!(sel.best.as_ref().map(|b| b.mill.as_str()), Some("a"));
        assert_eq!(sel.suggested_sell_price, Some(438.5));
    }

    #[test]
    fn outcomes_are_distinct() {
        let none = select_source(vec![], Some((22.0, 35.0)));
        assert_eq!(none.outcome, SourceOutcome::NoOptions);
        assert!(none.best.is_none());
        assert!(none.suggested_sell_price.is_none());

        let unknown = select_source(vec![opt("a", 360.0, None)], Some((22.0, 35.0)));
        assert_eq!(unknown.outcome, SourceOutcome::FreightUnknown);
        assert!(unknown.suggested_sell_price.is_none());

        let no_band = select_source(vec![opt("a", 360.0, Some(410.0))], None);
        assert_eq!(no_band.outcome, SourceOutcome::Priced);
        assert!(no_band.suggested_sell_price.is_none());
    }
}
