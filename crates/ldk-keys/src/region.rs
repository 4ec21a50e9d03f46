use std::fmt;

use serde::{Deserialize, Serialize};

/// Random Lengths pricing region.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum RegionKey {
    West,
    #[default]
    Central,
    East,
}

impl RegionKey {
    pub const ALL: [RegionKey; 3] = [RegionKey::West, RegionKey::Central, RegionKey::East];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegionKey::West => "west",
            RegionKey::Central => "central",
            RegionKey::East => "east",
        }
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for RegionKey {
    fn from(raw: String) -> Self {
        normalize_region(&raw)
    }
}

/// Case-insensitive `west|central|east`; anything else is `Central`.
pub fn normalize_region(raw: &str) -> RegionKey {
    match raw.trim().to_ascii_lowercase().as_str() {
        "west" => RegionKey::West,
        "east" => RegionKey::East,
        _ => RegionKey::Central,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_regions_parse_case_insensitively() {
        assert_eq!(normalize_region("WEST"), RegionKey::West);
        assert_eq!(normalize_region(" East "), RegionKey::East);
        assert_eq!(normalize_region("central"), RegionKey::Central);
    }

    #[test]
    fn unknown_defaults_to_central() {
        assert_eq!(normalize_region(""), RegionKey::Central);
        assert_eq!(normalize_region("northwest"), RegionKey::Central);
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&RegionKey::West).unwrap(), "\"west\"");
        let r: RegionKey = serde_json::from_str("\"EAST\"").unwrap();
        assert_eq!(r, RegionKey::East);
        let fallback: RegionKey = serde_json::from_str("\"mars\"").unwrap();
        assert_eq!(fallback, RegionKey::Central);
    }
}
