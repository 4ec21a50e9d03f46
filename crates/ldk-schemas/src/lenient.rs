//! Field deserializers that never reject a record for a badly typed value.

use ldk_keys::{
    normalize_date, normalize_length, normalize_price, normalize_price_value, normalize_product,
    normalize_region, ProductKey, RegionKey,
};
use serde::{Deserialize, Deserializer};

use crate::TradeStatus;

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Num(f64),
    Text(String),
    Flag(bool),
}

impl Raw {
    fn into_text(self) -> String {
        match self {
            Raw::Num(v) => format_number(v),
            Raw::Text(s) => s,
            Raw::Flag(_) => String::new(),
        }
    }
}

// 12345.0 -> "12345"
fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

pub(crate) fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<Raw>::deserialize(d)?
        .map(Raw::into_text)
        .unwrap_or_default())
}

pub(crate) fn reference<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Raw>::deserialize(d)?
        .map(Raw::into_text)
        .filter(|s| !s.trim().is_empty()))
}

pub(crate) fn amount<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(match Option::<Raw>::deserialize(d)? {
        Some(Raw::Num(v)) => normalize_price_value(v),
        Some(Raw::Text(s)) => normalize_price(&s),
        Some(Raw::Flag(_)) | None => 0.0,
    })
}

pub(crate) fn opt_amount<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Raw>::deserialize(d)? {
        Some(Raw::Num(v)) if v.is_finite() => Some(normalize_price_value(v)),
        Some(Raw::Text(s)) if !s.trim().is_empty() => Some(normalize_price(&s)),
        _ => None,
    })
}

pub(crate) fn length<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<Raw>::deserialize(d)?
        .map(|r| normalize_length(&r.into_text()))
        .unwrap_or_default())
}

/// Free text that may be `null` or a number (`"mill": 123`).
pub(crate) fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Raw>::deserialize(d)?.map(Raw::into_text))
}

pub(crate) fn product<'de, D: Deserializer<'de>>(d: D) -> Result<ProductKey, D::Error> {
    Ok(Option::<Raw>::deserialize(d)?
        .map(|r| normalize_product(&r.into_text()))
        .unwrap_or_default())
}

pub(crate) fn region<'de, D: Deserializer<'de>>(d: D) -> Result<RegionKey, D::Error> {
    Ok(Option::<Raw>::deserialize(d)?
        .map(|r| normalize_region(&r.into_text()))
        .unwrap_or_default())
}

pub(crate) fn status<'de, D: Deserializer<'de>>(d: D) -> Result<TradeStatus, D::Error> {
    let text = Option::<Raw>::deserialize(d)?
        .map(Raw::into_text)
        .unwrap_or_default();
    Ok(match text.trim().to_lowercase().as_str() {
        "" | "active" => TradeStatus::Active,
        "cancelled" => TradeStatus::Cancelled,
        _ => TradeStatus::Other,
    })
}

/// ISO `YYYY-MM-DD`. An empty string stays empty (undated); `null` or an
/// unparseable value becomes today.
pub(crate) fn date<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Option::<Raw>::deserialize(d)? {
        Some(Raw::Text(s)) if s.trim().is_empty() => String::new(),
        Some(r) => normalize_date(Some(&r.into_text())),
        None => normalize_date(None),
    })
}
