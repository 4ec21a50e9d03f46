//! Counterparty names and ship-from locations.

use serde::{Deserialize, Serialize};

/// Normalize a customer name against the CRM list.
///
/// Trims the input. If an existing customer matches case-insensitively its
/// stored casing wins, otherwise the trimmed input is returned as-is.
pub fn normalize_customer_name<S: AsRef<str>>(raw: Option<&str>, existing: &[S]) -> Option<String> {
    match_existing(raw, existing)
}

/// Same rule as [`normalize_customer_name`] against the mill company list.
pub fn normalize_mill_company<S: AsRef<str>>(raw: Option<&str>, existing: &[S]) -> Option<String> {
    match_existing(raw, existing)
}

fn match_existing<S: AsRef<str>>(raw: Option<&str>, existing: &[S]) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return Some(String::new());
    }
    let lower = trimmed.to_lowercase();
    let hit = existing
        .iter()
        .map(|s| s.as_ref().trim())
        .find(|s| s.to_lowercase() == lower);
    Some(hit.unwrap_or(trimmed).to_string())
}

/// A mill origin or delivery point split into city and state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub state: String,
    /// `"City, ST"`, or just the city when no state was given.
    pub display: String,
}

/// Parse `"dequincy, la"` into `Location { city: "DeQuincy", state: "LA", .. }`.
///
/// Cities are title-cased word by word. `Mc` prefixes always capitalize the
/// following letter; `De` prefixes keep a capital only if the input had one, so
/// `Denham` does not become `DeNham`.
pub fn normalize_location(raw: &str) -> Location {
    let mut parts = raw.trim().splitn(2, ',');
    let city_raw = parts.next().unwrap_or("").trim();
    let state: String = parts
        .next()
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .take(2)
        .collect();

    let city = city_raw
        .split(' ')
        .map(title_word)
        .collect::<Vec<_>>()
        .join(" ");

    let display = if state.is_empty() {
        city.clone()
    } else {
        format!("{city}, {state}")
    };
    Location {
        city,
        state,
        display,
    }
}

fn title_word(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    let mut out = String::with_capacity(word.len());
    for (i, c) in chars.iter().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
    }

    let lower = out.to_lowercase();
    let keep_cap = |idx: usize| chars.get(idx).map(|c| c.is_uppercase()).unwrap_or(false);
    let recap = |s: &str, idx: usize| -> String {
        s.chars()
            .enumerate()
            .map(|(i, c)| if i == idx { c.to_ascii_uppercase() } else { c })
            .collect()
    };

    if chars.len() > 2 && lower.starts_with("mc") && chars[2].is_alphabetic() {
        return recap(&out, 2);
    }
    if chars.len() > 2 && lower.starts_with("de") && keep_cap(2) {
        return recap(&out, 2);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_stays_none_and_blank_is_empty() {
        let crm: [&str; 0] = [];
        assert_eq!(normalize_customer_name(None, &crm), None);
        assert_eq!(normalize_customer_name(Some("   "), &crm), Some(String::new()));
    }

    #[test]
    fn existing_casing_wins() {
        let crm = ["ABC Lumber", "Smith Building Supply"];
        assert_eq!(
            normalize_customer_name(Some("  abc lumber "), &crm).as_deref(),
            Some("ABC Lumber")
        );
        assert_eq!(
            normalize_customer_name(Some("new customer inc"), &crm).as_deref(),
            Some("new customer inc")
        );
        let mills = vec!["Canfor Southern Pine".to_string()];
        assert_eq!(
            normalize_mill_company(Some("CANFOR SOUTHERN PINE"), &mills).as_deref(),
            Some("Canfor Southern Pine")
        );
    }

    #[test]
    fn location_title_cases_and_splits_state() {
        let loc = normalize_location("  monticello, ar ");
        assert_eq!(loc.city, "Monticello");
        assert_eq!(loc.state, "AR");
        assert_eq!(loc.display, "Monticello, AR");
    }

    #[test]
    fn location_prefix_rules() {
        assert_eq!(normalize_location("DeQuincy, LA").city, "DeQuincy");
        assert_eq!(normalize_location("denham springs, la").city, "Denham Springs");
        assert_eq!(normalize_location("el dorado, ar").city, "El Dorado");
        assert_eq!(normalize_location("mcgehee, ar").city, "McGehee");
    }

    #[test]
    fn location_without_state() {
        let loc = normalize_location("Warren");
        assert_eq!(loc.state, "");
        assert_eq!(loc.display, "Warren");
        assert_eq!(normalize_location(""), Location::default());
    }
}
