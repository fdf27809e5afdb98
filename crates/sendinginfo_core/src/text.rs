//! Shared text normalization helpers.

/// Trim an optional string and drop empty values.
///
/// # Returns
/// `None` when the input is missing or whitespace-only; otherwise the trimmed
/// string.
pub fn normalize_optional_nonempty(value: Option<&str>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// `true` when `value` is empty or whitespace-only.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Normalize a server URL for display and request building.
///
/// Plain-http `localhost` is pinned to `127.0.0.1` and trailing slashes are
/// dropped. Unparseable input is returned unchanged so URL building can
/// report it.
pub fn normalize_server(server: &str) -> String {
    let trimmed = server.trim();
    if let Ok(mut url) = reqwest::Url::parse(trimmed) {
        let should_normalize_localhost =
            url.scheme().eq_ignore_ascii_case("http") && url.host_str() == Some("localhost");
        if should_normalize_localhost && url.set_host(Some("127.0.0.1")).is_err() {
            return trimmed.to_string();
        }
        let mut normalized = url.to_string();
        while normalized.ends_with('/') {
            normalized.pop();
        }
        return normalized;
    }
    trimmed.to_string()
}
