//! Shelf keys for call numbers.
//!
//! A shelf key is a string that sorts in shelf order. Library of Congress and Dewey
//! call numbers are recognized and their class numbers padded; anything else falls back
//! to an uppercased, whitespace-collapsed key.

use std::sync::LazyLock;

use regex::Regex;

/// LC call number: class letters, class number, remainder (cutters, dates).
static LC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z]{1,3})\s*(\d+(?:\.\d+)?)\s*(.*)$").expect("LC pattern should compile")
});

/// Dewey call number: three-digit class, optional decimal, remainder.
static DEWEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,3})(\.\d+)?\s*(.*)$").expect("Dewey pattern should compile")
});

/// Builds a shelf key, trying LC, then Dewey, then the generic form.
pub fn shelf_key(value: &str) -> String {
    let upper = value.trim().to_uppercase();
    lc_key(&upper)
        .or_else(|| dewey_key(&upper))
        .unwrap_or_else(|| generic_key(&upper))
}

/// LC key: `QA76.73 .J38` becomes `QA 276.73 J38`.
///
/// The integer part of the class number is prefixed with its digit count so that
/// `QA 9` sorts before `QA 76`.
fn lc_key(value: &str) -> Option<String> {
    let captures = LC_PATTERN.captures(value)?;
    let letters = &captures[1];
    let number = &captures[2];
    let (integer, fraction) = number.split_once('.').unwrap_or((number, ""));
    let fraction = if fraction.is_empty() {
        String::new()
    } else {
        format!(".{fraction}")
    };
    let key = format!(
        "{letters} {}{integer}{fraction} {}",
        integer.len(),
        cutters(&captures[3])
    );
    Some(key.trim_end().to_string())
}

/// Dewey key: `813.54 .S6` becomes `813.54 S6`, with the class padded to three digits.
fn dewey_key(value: &str) -> Option<String> {
    let captures = DEWEY_PATTERN.captures(value)?;
    let class = format!("{:0>3}", &captures[1]);
    let fraction = captures.get(2).map_or("", |m| m.as_str());
    let key = format!("{class}{fraction} {}", cutters(&captures[3]));
    Some(key.trim_end().to_string())
}

/// Normalizes a call-number remainder: leading dots dropped from each token.
fn cutters(rest: &str) -> String {
    rest.split_whitespace()
        .map(|token| token.trim_start_matches('.'))
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Generic key: whitespace collapsed.
fn generic_key(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lc_call_numbers() {
        assert_eq!(shelf_key("QA76.73 .J38"), "QA 276.73 J38");
        assert_eq!(shelf_key("pr 9199.3 .a1 2001"), "PR 49199.3 A1 2001");
        assert_eq!(shelf_key("Z 1"), "Z 11");
    }

    #[test]
    fn lc_keys_sort_by_class_number() {
        assert!(shelf_key("QA 9") < shelf_key("QA 76"));
        assert!(shelf_key("QA 76") < shelf_key("QA 76.5"));
    }

    #[test]
    fn dewey_call_numbers() {
        assert_eq!(shelf_key("813.54 .S6"), "813.54 S6");
        assert_eq!(shelf_key("5 .A1"), "005 A1");
        assert!(shelf_key("5") < shelf_key("42"));
    }

    #[test]
    fn generic_fallback() {
        assert_eq!(shelf_key("  microfilm   box  12 "), "MICROFILM BOX 12");
        assert_eq!(shelf_key(""), "");
    }
}
