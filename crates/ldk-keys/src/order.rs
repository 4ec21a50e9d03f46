//! Order-number keys.
//!
//! Buys and sells are linked by the order number a trader typed on each side.
//! The same physical order shows up as `PO-123`, `po123`, `PO_123` or `PO 123`
//! depending on who entered it, so linking always goes through [`OrderKey`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized, format-agnostic order identifier.
///
/// Invariant: the inner string contains only lowercase ASCII letters and ASCII
/// digits. An empty key means "no order reference" and never links anything.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct OrderKey(String);

impl OrderKey {
    /// Key for a purely numeric order number (spreadsheet imports).
    pub fn from_number(n: u64) -> Self {
        normalize_order_num(&n.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First non-empty key among candidate references, in priority order.
    ///
    /// Sells may carry the order number, a linked PO or an OC number; buys the
    /// order number or a PO. The first reference that normalizes to something
    /// non-empty wins.
    pub fn first_of<'a, I>(refs: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        refs.into_iter()
            .flatten()
            .map(normalize_order_num)
            .find(|k| !k.is_empty())
            .unwrap_or_default()
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for OrderKey {
    fn from(raw: String) -> Self {
        normalize_order_num(&raw)
    }
}

impl From<OrderKey> for String {
    fn from(k: OrderKey) -> Self {
        k.0
    }
}

/// Normalize a raw order number.
///
/// Lowercases and drops everything that is not an ASCII letter or digit
/// (hyphens, underscores, dots, slashes, spaces, `#`, ...). Empty input yields
/// the empty key.
pub fn normalize_order_num(raw: &str) -> OrderKey {
    OrderKey(
        raw.chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect(),
    )
}
