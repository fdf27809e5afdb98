//! Coercion of user-typed view and download limits.
//!
//! Form fields arrive as free text. Both widgets fall back to a single
//! view/download when the field does not hold a positive integer; the
//! transfer widget additionally caps the value at [`MAX_DOWNLOADS_CAP`].

use crate::constants::MAX_DOWNLOADS_CAP;

/// Parse a leading integer the way a browser's `parseInt` does: optional
/// sign, then digits, ignoring anything after them ("7 files" → 7).
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Overlong digit runs saturate instead of failing.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Positive integer typed into a limit field, if any.
fn positive_limit(raw: &str) -> Option<u32> {
    parse_leading_int(raw)
        .filter(|value| *value >= 1)
        .map(|value| u32::try_from(value).unwrap_or(u32::MAX))
}

/// Effective `max_views` for a paste: the typed value when it is a positive
/// integer, else 1.
pub fn effective_max_views(raw: &str) -> u32 {
    positive_limit(raw).unwrap_or(1)
}

/// Effective `max_downloads` for an upload.
///
/// With multi-mode off this is always 1. With it on, a positive integer is
/// capped at [`MAX_DOWNLOADS_CAP`]; anything else falls back to 1.
pub fn effective_max_downloads(multi_mode: bool, raw: &str) -> u32 {
    if !multi_mode {
        return 1;
    }
    positive_limit(raw)
        .map(|value| value.min(MAX_DOWNLOADS_CAP))
        .unwrap_or(1)
}
