//! Standard identifier cleanup: LCCN, OCLC numbers and ISBNs.

/// LCCN: whitespace removed, lowercased.
pub fn lccn(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// OCLC number: `(OCoLC)`, `ocm`, `ocn` and `on` prefixes and leading zeros removed.
pub fn oclc(value: &str) -> String {
    let trimmed = value.trim();
    let number = ["(OCoLC)", "ocm", "ocn", "on"]
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed)
        .trim_start();
    let stripped = number.trim_start_matches('0');
    if stripped.is_empty() && !number.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

/// ISBN: hyphens and spaces removed, uppercased, ISBN-10 converted to ISBN-13.
///
/// Values that are not well-formed ISBN-10s are returned cleaned but otherwise unchanged.
pub fn isbn(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    isbn10_to_isbn13(&cleaned).unwrap_or(cleaned)
}

/// Converts a ten-character ISBN to its `978` ISBN-13 form.
fn isbn10_to_isbn13(isbn10: &str) -> Option<String> {
    let bytes = isbn10.as_bytes();
    if bytes.len() != 10
        || !bytes[..9].iter().all(u8::is_ascii_digit)
        || !(bytes[9].is_ascii_digit() || bytes[9] == b'X')
    {
        return None;
    }

    let body = format!("978{}", &isbn10[..9]);
    let sum: u32 = body
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 { digit } else { digit * 3 }
        })
        .sum();
    let check = (10 - sum % 10) % 10;
    Some(format!("{body}{check}"))
}
