use std::collections::BTreeMap;

use ldk_keys::RegionKey;
use serde::{Deserialize, Serialize};

/// Origin states the desk sources from. Order matters for the whole-word scan.
pub const SUPPORTED_STATES: [&str; 17] = [
    "AL", "MS", "FL", "GA", "SC", "AR", "NC", "TX", "TN", "LA", "OK", "MO", "KY", "VA", "OH", "IN",
    "IL",
];

/// Freight model parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreightConfig {
    /// Flat $ per truckload.
    pub freight_base: f64,
    /// MBF per truckload for standard product.
    pub mbf_per_tl: f64,
    /// MBF per truckload for MSR product.
    pub msr_mbf_per_tl: f64,
    /// Minimum $/MBF charged on any lane.
    pub short_haul_floor: f64,
    /// $ per mile, keyed by origin state.
    pub state_rates: BTreeMap<String, f64>,
    /// $ per mile when the origin state is unknown or has no rate.
    pub fallback_state_rate: f64,
}

impl Default for FreightConfig {
    fn default() -> Self {
        Self {
            freight_base: 300.0,
            mbf_per_tl: 23.0,
            msr_mbf_per_tl: 20.0,
            short_haul_floor: 0.0,
            state_rates: BTreeMap::new(),
            fallback_state_rate: 0.0,
        }
    }
}

impl FreightConfig {
    pub fn state_rate(&self, state: Option<&str>) -> f64 {
        state
            .and_then(|s| self.state_rates.get(s))
            .copied()
            .filter(|r| r.is_finite() && *r != 0.0)
            .unwrap_or(self.fallback_state_rate)
    }
}

/// Two-letter state of a location like `"Warren, AR"` or `"Monticello AR 71655"`.
///
/// A trailing `, XX` wins; otherwise the first supported state (in
/// [`SUPPORTED_STATES`] order) appearing as a whole word. `DALLAS` does not
/// yield `AL`.
pub fn extract_state(location: &str) -> Option<&'static str> {
    let up = location.to_uppercase();

    if let Some(st) = trailing_state(&up) {
        if let Some(hit) = SUPPORTED_STATES.iter().find(|s| **s == st) {
            return Some(*hit);
        }
    }

    let tokens: Vec<&str> = up
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();
    SUPPORTED_STATES
        .iter()
        .find(|st| tokens.contains(*st))
        .copied()
}

// `, XX` at the end of the string, ignoring trailing whitespace.
fn trailing_state(up: &str) -> Option<&str> {
    let s = up.trim_end();
    let mut it = s.char_indices().rev();
    let (i1, c1) = it.next()?;
    let (i0, c0) = it.next()?;
    if !(c0.is_ascii_uppercase() && c1.is_ascii_uppercase()) {
        return None;
    }
    let head = s[..i0].trim_end();
    if head.ends_with(',') {
        Some(&s[i0..i1 + c1.len_utf8()])
    } else {
        None
    }
}

/// Random Lengths pricing region of a mill origin. Unknown states price as West.
pub fn region_from_origin(origin: &str) -> RegionKey {
    match extract_state(origin) {
        Some("MS" | "AL") => RegionKey::Central,
        Some("NC" | "SC" | "FL" | "GA") => RegionKey::East,
        _ => RegionKey::West,
    }
}

/// Freight in whole $/MBF for a lane. 0 when the mileage is missing or unusable.
pub fn calc_freight_per_mbf(
    miles: Option<f64>,
    origin: &str,
    is_msr: bool,
    cfg: &FreightConfig,
) -> f64 {
    let miles = match miles {
        Some(m) if m.is_finite() && m != 0.0 => m,
        _ => return 0.0,
    };

    let mbf_per_load = if is_msr {
        cfg.msr_mbf_per_tl
    } else {
        cfg.mbf_per_tl
    };
    if !mbf_per_load.is_finite() || mbf_per_load <= 0.0 {
        return 0.0;
    }

    let rate = cfg.state_rate(extract_state(origin));
    let total = cfg.freight_base + miles * rate;
    (total / mbf_per_load).round().max(cfg.short_haul_floor)
}

/// FOB plus freight; `None` while freight is unknown.
pub fn landed_cost(fob: f64, freight_per_mbf: Option<f64>) -> Option<f64> {
    freight_per_mbf.map(|f| fob + f)
}
