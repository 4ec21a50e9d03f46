//! Free-text product descriptions from quote requests ("2x4 16' #2", "2x6 MSR RL").

use ldk_keys::{normalize_product, ProductKey, LENGTH_RANDOM};
use serde::Serialize;

const SIZES: [&str; 7] = ["2x4", "2x6", "2x8", "2x10", "2x12", "4x4", "4x6"];
const STANDARD_LENGTHS: [&str; 7] = ["8", "10", "12", "14", "16", "18", "20"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParsedProduct {
    /// Canonical product, e.g. `2x4#2` or `2x6 MSR`.
    pub base: ProductKey,
    /// Feet as a string, `RL`, or `None` when nothing length-like was found.
    pub length: Option<String>,
    pub size: &'static str,
    /// `#1`..`#4` or `MSR`.
    pub grade: &'static str,
}

/// Parse a product description. Unrecognized sizes default to `2x4`, grades to `#2`.
pub fn parse_product_string(raw: &str) -> ParsedProduct {
    let s: String = raw
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '`' | '\u{2032}' => '\'',
            other => other,
        })
        .collect();

    let size = find_size(&s).unwrap_or("2x4");
    let grade = find_grade(&s);
    let base = if grade == "MSR" {
        format!("{size} MSR")
    } else {
        format!("{size}{grade}")
    };

    ParsedProduct {
        base: normalize_product(&base),
        length: find_length(&s),
        size,
        grade,
    }
}

fn find_size(s: &str) -> Option<&'static str> {
    (0..s.len())
        .filter(|i| s.is_char_boundary(*i))
        .find_map(|i| SIZES.iter().find(|sz| s[i..].starts_with(**sz)).copied())
}

fn find_grade(s: &str) -> &'static str {
    let any = |pats: &[&str]| pats.iter().any(|p| s.contains(p));
    if any(&["#1", "no.1", "no 1"]) {
        "#1"
    } else if any(&["#3", "no.3", "no 3"]) {
        "#3"
    } else if any(&["#4", "no.4", "no 4"]) {
        "#4"
    } else if any(&["msr", "2400"]) {
        "MSR"
    } else {
        "#2"
    }
}

fn find_length(s: &str) -> Option<String> {
    let chars: Vec<char> = s.chars().collect();

    // 16'  |  ` 8 #2`  |  12ft  |  12 foot
    let explicit = scan_digits(&chars, |_, rest| rest.first() == Some(&'\''))
        .or_else(|| {
            scan_digits(&chars, |start, rest| {
                start > 0 && chars[start - 1].is_whitespace() && skip_ws(rest).first() == Some(&'#')
            })
        })
        .or_else(|| scan_digits(&chars, |_, rest| starts_with(skip_ws(rest), "ft")))
        .or_else(|| scan_digits(&chars, |_, rest| starts_with(skip_ws(rest), "foot")));
    if explicit.is_some() {
        return explicit;
    }

    if s.contains("rl") || s.contains("random") || !chars.iter().any(char::is_ascii_digit) {
        return Some(LENGTH_RANDOM.to_string());
    }

    s.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .find(|w| STANDARD_LENGTHS.contains(w))
        .map(str::to_string)
}

/// Leftmost run of one or two digits whose remainder satisfies `follows`.
/// Two digits are tried before one at each position.
fn scan_digits<F>(chars: &[char], follows: F) -> Option<String>
where
    F: Fn(usize, &[char]) -> bool,
{
    for start in 0..chars.len() {
        for len in [2usize, 1] {
            let end = start + len;
            if end > chars.len() || !chars[start..end].iter().all(char::is_ascii_digit) {
                continue;
            }
            if follows(start, &chars[end..]) {
                return Some(chars[start..end].iter().collect());
            }
        }
    }
    None
}

fn skip_ws(chars: &[char]) -> &[char] {
    let n = chars.iter().take_while(|c| c.is_whitespace()).count();
    &chars[n..]
}

fn starts_with(chars: &[char], pat: &str) -> bool {
    let pat: Vec<char> = pat.chars().collect();
    chars.len() >= pat.len() && chars[..pat.len()] == pat[..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_before_grade() {
        let p = parse_product_string("2x4 8' #2");
        assert_eq!(p.base.as_str(), "2x4#2");
        assert_eq!(p.length.as_deref(), Some("8"));
        assert_eq!(p.size, "2x4");
    }

    #[test]
    fn length_after_grade() {
        let p = parse_product_string("2x4 #2 16\u{2019}");
        assert_eq!(p.length.as_deref(), Some("16"));
    }

    #[test]
    fn bare_number_before_grade_and_feet_suffix() {
        assert_eq!(parse_product_string("2x6 12 #1").length.as_deref(), Some("12"));
        assert_eq!(parse_product_string("2x8 14ft #3").length.as_deref(), Some("14"));
        assert_eq!(parse_product_string("2x8 10 foot").length.as_deref(), Some("10"));
    }

    #[test]
    fn msr_and_random_lengths() {
        let p = parse_product_string("2X6 MSR RL");
        assert_eq!(p.base.as_str(), "2x6 MSR");
        assert_eq!(p.grade, "MSR");
        assert_eq!(p.length.as_deref(), Some("RL"));
    }

    #[test]
    fn wide_sizes_are_not_truncated() {
        let p = parse_product_string("2x10 #2 20'");
        assert_eq!(p.size, "2x10");
        assert_eq!(p.base.as_str(), "2x10#2");
        assert_eq!(p.length.as_deref(), Some("20"));
    }

    #[test]
    fn standalone_standard_length() {
        let p = parse_product_string("2x4 #2 in 16s or 18");
        assert_eq!(p.length.as_deref(), Some("18"));
    }

    #[test]
    fn defaults() {
        let p = parse_product_string("");
        assert_eq!(p.base.as_str(), "2x4#2");
        assert_eq!(p.length.as_deref(), Some("RL"));
    }
}
