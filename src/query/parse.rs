//! Lenient parsing of query-string values

/// Parse a positive integer, falling back to `default` when the value is
/// absent, not a number, or zero.
pub fn parse_positive_or(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

/// Parse the longest numeric prefix of `raw`, ignoring leading whitespace.
///
/// `"10abc"` reads as `10`, `"-Infinity"` as negative infinity; a value with
/// no leading digits yields `None`.
pub fn parse_leading_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix(&['+', '-'][..]).unwrap_or(trimmed);

    if unsigned.starts_with("Infinity") {
        return Some(if trimmed.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let bytes = trimmed.as_bytes();
    let mut end = trimmed.len() - unsigned.len();
    let mut digits = count_digits(bytes, end);
    end += digits;

    if bytes.get(end) == Some(&b'.') {
        let fraction = count_digits(bytes, end + 1);
        if digits + fraction > 0 {
            end += 1 + fraction;
            digits += fraction;
        }
    }

    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exponent_start = end + 1;
        if matches!(bytes.get(exponent_start), Some(b'+') | Some(b'-')) {
            exponent_start += 1;
        }
        let exponent_digits = count_digits(bytes, exponent_start);
        if exponent_digits > 0 {
            end = exponent_start + exponent_digits;
        }
    }

    trimmed[..end].parse::<f64>().ok()
}

/// Split a comma-separated list, trimming entries and dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn count_digits(bytes: &[u8], start: usize) -> usize {
    bytes
        .get(start..)
        .map(|rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
        .unwrap_or(0)
}
