//! Per-field validation.
//!
//! Validation never fails hard. A field is either valid (with a normalized
//! value), not provided, or invalid with a [`ComposeWarning`] explaining why.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::FieldKind;
use crate::error::ComposeWarning;

/// `Ok(Some(v))` valid, `Ok(None)` not provided, `Err(w)` invalid.
pub type ValidationResult = Result<Option<String>, ComposeWarning>;

const MAX_HOST_LEN: usize = 253;

/// Hostname: dot-separated labels of 1-63 alphanumerics/hyphens that don't
/// start or end with a hyphen, ending in an alphabetic label of 2+ letters.
static HOSTNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$")
        .expect("hostname pattern is valid")
});

/// Trim a free-text field; blank means "not provided".
pub fn text(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Normalize a value that will be wrapped in double quotes.
///
/// Every `"` is removed so the phrase stays one quoted group; blank after
/// removal means "not provided".
pub fn phrase(value: &str) -> Option<String> {
    let cleaned: String = value.chars().filter(|&c| c != '"').collect();
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Normalize a file extension: `.pdf` and `pdf` are the same; `.` alone is blank.
pub fn extension(value: &str) -> Option<&str> {
    text(value.trim().trim_start_matches('.'))
}

/// Validate a domain-like field (`site:`, `related:`, `cache:`, preset domains).
///
/// Strips an `http(s)://` scheme and trailing slashes and lower-cases the
/// host. A path after the host is kept as-is, so `yoursite.com/blog` is valid.
pub fn domain(field: FieldKind, value: &str) -> ValidationResult {
    let Some(trimmed) = text(value) else {
        return Ok(None);
    };

    let lower = trimmed.to_ascii_lowercase();
    let start = if lower.starts_with("https://") {
        "https://".len()
    } else if lower.starts_with("http://") {
        "http://".len()
    } else {
        0
    };
    let rest = trimmed[start..].trim_end_matches('/');

    let (host, path) = match rest.find('/') {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };
    let host = host.to_ascii_lowercase();

    if host.len() > MAX_HOST_LEN || !HOSTNAME.is_match(&host) || path.contains(char::is_whitespace)
    {
        return Err(ComposeWarning::InvalidDomainFormat {
            field,
            value: trimmed.to_string(),
        });
    }

    Ok(Some(format!("{}{}", host, path)))
}

/// Split a list input on commas, pipes or newlines, dropping blanks.
pub fn list(value: &str) -> Vec<String> {
    value
        .split([',', '|', '\n'])
        .filter_map(text)
        .map(str::to_string)
        .collect()
}

/// Validate an `AROUND` pair.
///
/// Terms are normalized with [`phrase`] first. Both blank is "not provided";
/// exactly one blank is an incomplete pair.
pub fn around_pair(first: &str, second: &str) -> Result<Option<(String, String)>, ComposeWarning> {
    match (phrase(first), phrase(second)) {
        (Some(a), Some(b)) => Ok(Some((a, b))),
        (None, None) => Ok(None),
        (Some(present), None) | (None, Some(present)) => {
            Err(ComposeWarning::IncompleteOperatorPair {
                operator: "AROUND",
                present,
            })
        }
    }
}

/// Validate a numeric range: both bounds finite, non-negative and `min < max`.
///
/// A negative lower bound would start the token with `-`, the exclusion operator.
pub fn numeric_range(min: f64, max: f64) -> Result<(), ComposeWarning> {
    if min.is_finite() && max.is_finite() && min >= 0.0 && min < max {
        Ok(())
    } else {
        Err(ComposeWarning::InvalidNumericRange { min, max })
    }
}
