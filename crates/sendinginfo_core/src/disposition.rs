//! Filename extraction from `Content-Disposition` headers.
//!
//! Handles the RFC 6266 forms servers actually send: quoted and bare
//! `filename=` values plus the RFC 5987 `filename*=charset'lang'pct-encoded`
//! form, which wins when both are present.

use crate::constants::DEFAULT_DOWNLOAD_FILENAME;

/// Split a header value into `;`-separated parameters, honoring quotes.
fn split_params(header: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for (idx, ch) in header.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                parts.push(&header[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&header[start..]);
    parts
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    let Some(inner) = value
        .strip_prefix('"')
        .map(|rest| rest.strip_suffix('"').unwrap_or(rest))
    else {
        return value.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Decode an RFC 5987 extended value (`UTF-8''na%C3%AFve.txt`).
fn decode_ext_value(value: &str) -> Option<String> {
    let value = unquote(value);
    let mut pieces = value.splitn(3, '\'');
    let charset = pieces.next()?.trim();
    let _language = pieces.next()?;
    let encoded = pieces.next()?;
    if charset.eq_ignore_ascii_case("utf-8") {
        urlencoding::decode(encoded).ok().map(|s| s.into_owned())
    } else if charset.eq_ignore_ascii_case("iso-8859-1") {
        let bytes = urlencoding::decode_binary(encoded.as_bytes());
        Some(bytes.iter().map(|b| char::from(*b)).collect())
    } else {
        None
    }
}

/// Reduce a server-supplied name to a single safe path component.
///
/// # Returns
/// `None` when nothing usable remains.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return None;
    }
    Some(cleaned.to_string())
}

/// Extract the filename a download should be saved under.
///
/// # Arguments
/// - `header`: raw `Content-Disposition` value, if the response carried one.
///
/// # Returns
/// The sanitized filename, or [`DEFAULT_DOWNLOAD_FILENAME`] when the header
/// is absent or names nothing usable.
pub fn filename_from_content_disposition(header: Option<&str>) -> String {
    let Some(header) = header else {
        return DEFAULT_DOWNLOAD_FILENAME.to_string();
    };

    let mut plain = None;
    let mut extended = None;
    // The first segment is the disposition type (attachment/inline).
    for param in split_params(header).into_iter().skip(1) {
        let Some((name, value)) = param.split_once('=') else {
            continue;
        };
        match name.trim().to_ascii_lowercase().as_str() {
            "filename*" => extended = extended.or_else(|| decode_ext_value(value)),
            "filename" => plain = plain.or_else(|| Some(unquote(value))),
            _ => {}
        }
    }

    extended
        .as_deref()
        .and_then(sanitize_file_name)
        .or_else(|| plain.as_deref().and_then(sanitize_file_name))
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_FILENAME.to_string())
}
