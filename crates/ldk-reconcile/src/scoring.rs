//! Advisory buy/sell match scoring.

use chrono::NaiveDate;
use ldk_keys::{normalize_product_for_match, LENGTH_RANDOM};
use ldk_schemas::{Buy, Sell};
use serde::{Deserialize, Serialize};

use crate::position::{available_volume, build_order_sold};
use crate::TradeBook;

pub const MAX_SUGGESTIONS: usize = 5;

/// Tolerances for auto-matching short sells to buys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoMatchConfig {
    /// Fraction of the sell volume a buy may be short by and still score.
    pub volume_tolerance: f64,
    /// $/MBF band around break-even for the price component.
    pub price_tolerance: f64,
    /// Suggestions scoring below this are dropped.
    pub min_score: u32,
}

impl Default for AutoMatchConfig {
    fn default() -> Self {
        Self {
            volume_tolerance: 0.2,
            price_tolerance: 20.0,
            min_score: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// Score
// ---------------------------------------------------------------------------

/// Exact or dimension-only product match (one normalized form contains the other).
pub fn is_product_match(buy: &Buy, sell: &Sell) -> bool {
    let b = normalize_product_for_match(buy.product.as_str());
    let s = normalize_product_for_match(sell.product.as_str());
    b == s || b.contains(&s) || s.contains(&b)
}

fn length_or_random(raw: &str) -> &str {
    if raw.is_empty() {
        LENGTH_RANDOM
    } else {
        raw
    }
}

/// Score how well `buy` covers `sell`, 0..=100. 0 when either side is missing.
///
/// | component | max | rule |
/// |-----------|-----|------|
/// | product   | 40  | exact 40, partial 25 |
/// | length    | 15  | equal 15, either `RL` 10 |
/// | volume    | 25  | full cover 25, within tolerance pro-rata |
/// | date      | 10  | ≤7d 10, ≤14d 7, ≤30d 4 |
/// | price     | 10  | margin above tolerance 10, positive 6, near break-even 2 |
pub fn calc_match_score(
    buy: Option<&Buy>,
    sell: Option<&Sell>,
    available: f64,
    cfg: &AutoMatchConfig,
) -> u32 {
    let (Some(buy), Some(sell)) = (buy, sell) else {
        return 0;
    };
    let mut score: i64 = 0;

    let bp = normalize_product_for_match(buy.product.as_str());
    let sp = normalize_product_for_match(sell.product.as_str());
    if bp == sp {
        score += 40;
    } else if bp.contains(&sp) || sp.contains(&bp) {
        score += 25;
    }

    let bl = length_or_random(&buy.length);
    let sl = length_or_random(&sell.length);
    if bl == sl {
        score += 15;
    } else if bl == LENGTH_RANDOM || sl == LENGTH_RANDOM {
        score += 10;
    }

    let sell_vol = sell.volume;
    if available >= sell_vol {
        score += 25;
    } else if sell_vol > 0.0 && available >= sell_vol * (1.0 - cfg.volume_tolerance) {
        score += (25.0 * available / sell_vol).round() as i64;
    }

    // Undated trades count from the epoch, like the desk's spreadsheets did.
    let bd = buy.trade_date().unwrap_or_default();
    let sd = sell.trade_date().unwrap_or_default();
    let days = days_between(bd, sd);
    if days <= 7 {
        score += 10;
    } else if days <= 14 {
        score += 7;
    } else if days <= 30 {
        score += 4;
    }

    let margin = sell.price - sell.freight_per_mbf() - buy.price;
    if margin > cfg.price_tolerance {
        score += 10;
    } else if margin > 0.0 {
        score += 6;
    } else if margin >= -cfg.price_tolerance {
        score += 2;
    }

    score.clamp(0, 100) as u32
}

fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days().abs()
}

// ---------------------------------------------------------------------------
// Margin preview
// ---------------------------------------------------------------------------

/// Whole-dollar margin figures shown next to a suggested match.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginPreview {
    pub buy_price: f64,
    pub sell_price: f64,
    pub freight_per_mbf: f64,
    pub margin_per_mbf: f64,
    pub total_margin: f64,
    pub volume: f64,
}

pub fn margin_preview(buy: &Buy, sell: &Sell) -> MarginPreview {
    let freight_per_mbf = sell.freight_per_mbf();
    let margin_per_mbf = sell.price - freight_per_mbf - buy.price;
    MarginPreview {
        buy_price: buy.price,
        sell_price: sell.price,
        freight_per_mbf: freight_per_mbf.round(),
        margin_per_mbf: margin_per_mbf.round(),
        total_margin: (margin_per_mbf * sell.volume).round(),
        volume: sell.volume,
    }
}

// ---------------------------------------------------------------------------
// Suggestions for short sells
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSuggestion<'a> {
    pub buy: &'a Buy,
    pub score: u32,
    pub margin: MarginPreview,
    pub available_volume: f64,
}

/// Up to [`MAX_SUGGESTIONS`] live buys that could cover `sell`, best first.
///
/// Candidates need enough availability (within the volume tolerance) and a
/// product match; anything scoring below `min_score` is dropped. Ties keep
/// book order.
pub fn suggest_matches_for_short<'a>(
    sell: &Sell,
    book: &'a TradeBook,
    cfg: &AutoMatchConfig,
) -> Vec<MatchSuggestion<'a>> {
    let sold = build_order_sold(&book.sells);
    let needed = sell.volume * (1.0 - cfg.volume_tolerance);

    let mut scored: Vec<MatchSuggestion<'a>> = book
        .buys
        .iter()
        .filter(|b| !b.is_cancelled())
        .filter_map(|b| {
            let avail = available_volume(Some(b), &sold);
            if avail < needed || !is_product_match(b, sell) {
                return None;
            }
            Some(MatchSuggestion {
                buy: b,
                score: calc_match_score(Some(b), Some(sell), avail, cfg),
                margin: margin_preview(b, sell),
                available_volume: avail,
            })
        })
        .filter(|m| m.score >= cfg.min_score)
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(MAX_SUGGESTIONS);
    scored
}
