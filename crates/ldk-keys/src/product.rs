//! Product codes (`2x4#2`, `2x6 MSR`, ...).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical product string.
///
/// Canonical form: lowercase `x` in the leading dimension token, a single space
/// before `MSR`, and no whitespace between a dimension and its grade `#`.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ProductKey(String);

impl ProductKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_msr(&self) -> bool {
        is_msr_product(&self.0)
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ProductKey {
    fn from(raw: String) -> Self {
        normalize_product(&raw)
    }
}

impl From<ProductKey> for String {
    fn from(k: ProductKey) -> Self {
        k.0
    }
}

/// Normalize a product string for storage and display.
///
/// - `2X4#2` -> `2x4#2`
/// - `2x4MSR`, `2x4  msr` -> `2x4 MSR`
/// - `2x4 #2` -> `2x4#2`
pub fn normalize_product(raw: &str) -> ProductKey {
    let chars: Vec<char> = raw.trim().chars().collect();
    let chars = lowercase_dimension(chars);
    let chars = collapse_msr(chars);
    let chars = attach_grade(chars);
    ProductKey(chars.into_iter().collect())
}

/// Looser form used only for fuzzy buy/sell matching: lowercase, no whitespace,
/// no `#`.
pub fn normalize_product_for_match(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '#')
        .flat_map(char::to_lowercase)
        .collect()
}

/// MSR (machine stress rated) lumber ships fewer MBF per truckload.
pub fn is_msr_product(raw: &str) -> bool {
    let up = raw.to_uppercase();
    up.contains("MSR") || up.contains("2400")
}

fn lowercase_dimension(mut chars: Vec<char>) -> Vec<char> {
    let lead = chars.iter().take_while(|c| c.is_ascii_digit()).count();
    if lead == 0 || lead >= chars.len() {
        return chars;
    }
    let has_trailing_digit = chars
        .get(lead + 1)
        .map(|c| c.is_ascii_digit())
        .unwrap_or(false);
    if chars[lead] == 'X' && has_trailing_digit {
        chars[lead] = 'x';
    }
    chars
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

// First occurrence only.
fn collapse_msr(chars: Vec<char>) -> Vec<char> {
    for i in 0..chars.len() {
        if !chars[i].is_ascii_digit() {
            continue;
        }
        let mut j = i + 1;
        while j < chars.len() && chars[j].is_whitespace() {
            j += 1;
        }
        if j + 3 > chars.len() {
            continue;
        }
        let word: String = chars[j..j + 3].iter().collect();
        if !word.eq_ignore_ascii_case("msr") {
            continue;
        }
        if chars.get(j + 3).map(|c| is_word_char(*c)).unwrap_or(false) {
            continue;
        }

        let mut out: Vec<char> = chars[..=i].to_vec();
        out.extend(" MSR".chars());
        out.extend_from_slice(&chars[j + 3..]);
        return out;
    }
    chars
}

fn attach_grade(chars: Vec<char>) -> Vec<char> {
    let mut out: Vec<char> = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        if c.is_ascii_digit() {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j > i + 1 && chars.get(j) == Some(&'#') {
                i = j;
                continue;
            }
        }
        i += 1;
    }
    out
}
