use anyhow::{bail, ensure, Context, Result};
use ldk_mileage::MileageConfig;
use ldk_pricing::{FreightConfig, QuoteConfig, SUPPORTED_STATES};
use ldk_reconcile::AutoMatchConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level sections read by [`DeskConfig`].
pub const KNOWN_SECTIONS: [&str; 4] = ["pricing", "auto_match", "mileage", "quote"];

/// Typed desk settings. Every section is optional in YAML and falls back to
/// its defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    pub pricing: FreightConfig,
    pub auto_match: AutoMatchConfig,
    pub mileage: MileageConfig,
    pub quote: QuoteConfig,
}

impl DeskConfig {
    /// Read the known sections out of a merged config tree and validate them.
    /// Unknown top-level keys are ignored here; see `report_unused_keys`.
    pub fn from_json(config_json: &Value) -> Result<Self> {
        let mut known = serde_json::Map::new();
        if let Some(map) = config_json.as_object() {
            for s in KNOWN_SECTIONS {
                if let Some(v) = map.get(s).filter(|v| !v.is_null()) {
                    known.insert(s.to_string(), v.clone());
                }
            }
        }
        let cfg: DeskConfig =
            serde_json::from_value(Value::Object(known)).context("desk config has invalid shape")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        validate_pricing(&self.pricing).context("pricing")?;
        validate_auto_match(&self.auto_match).context("auto_match")?;
        validate_mileage(&self.mileage).context("mileage")?;
        validate_quote(&self.quote).context("quote")?;
        Ok(())
    }
}

fn non_negative(name: &str, v: f64) -> Result<()> {
    ensure!(
        v.is_finite() && v >= 0.0,
        "{name} must be a finite number >= 0 (got {v})"
    );
    Ok(())
}

fn positive(name: &str, v: f64) -> Result<()> {
    ensure!(
        v.is_finite() && v > 0.0,
        "{name} must be a finite number > 0 (got {v})"
    );
    Ok(())
}

fn validate_pricing(p: &FreightConfig) -> Result<()> {
    non_negative("freight_base", p.freight_base)?;
    positive("mbf_per_tl", p.mbf_per_tl)?;
    positive("msr_mbf_per_tl", p.msr_mbf_per_tl)?;
    non_negative("short_haul_floor", p.short_haul_floor)?;
    non_negative("fallback_state_rate", p.fallback_state_rate)?;
    for (state, rate) in &p.state_rates {
        // extract_state only ever yields one of these.
        ensure!(
            SUPPORTED_STATES.contains(&state.as_str()),
            "state_rates key '{state}' is not a supported origin state ({})",
            SUPPORTED_STATES.join(" ")
        );
        non_negative(&format!("state_rates.{state}"), *rate)?;
    }
    Ok(())
}

fn validate_auto_match(a: &AutoMatchConfig) -> Result<()> {
    ensure!(
        a.volume_tolerance.is_finite() && (0.0..=1.0).contains(&a.volume_tolerance),
        "volume_tolerance must be within [0, 1] (got {})",
        a.volume_tolerance
    );
    non_negative("price_tolerance", a.price_tolerance)?;
    ensure!(
        a.min_score <= 100,
        "min_score must be at most 100 (got {})",
        a.min_score
    );
    Ok(())
}

fn http_url(name: &str, url: &str) -> Result<()> {
    let u = url.trim();
    if !(u.starts_with("http://") || u.starts_with("https://")) {
        bail!("{name} must be an http(s) URL (got '{url}')");
    }
    Ok(())
}

fn validate_mileage(m: &MileageConfig) -> Result<()> {
    if let Some(url) = &m.server_url {
        http_url("server_url", url)?;
    }
    http_url("geocode_url", &m.geocode_url)?;
    http_url("route_url", &m.route_url)?;
    ensure!(!m.user_agent.trim().is_empty(), "user_agent must not be empty");
    ensure!(m.timeout_secs > 0, "timeout_secs must be > 0");
    Ok(())
}

fn validate_quote(q: &QuoteConfig) -> Result<()> {
    if let Some((lo, hi)) = q.margin_range {
        ensure!(
            lo.is_finite() && hi.is_finite() && lo <= hi,
            "margin_range must be [low, high] with low <= high (got [{lo}, {hi}])"
        );
    }
    Ok(())
}
