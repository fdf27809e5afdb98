//! Shared constants used across SendingInfo crates.

/// Default base URL for clients when nothing else is configured.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Language tag sent when the paste form leaves it blank.
pub const DEFAULT_PASTE_LANGUAGE: &str = "plaintext";

/// Upper bound the transfer widget applies to a user-typed download limit.
pub const MAX_DOWNLOADS_CAP: u32 = 100;

/// Lifetime of uploaded files and pastes on the service.
pub const DEFAULT_EXPIRY_HOURS: u32 = 24;

/// Filename used when a download carries no usable `Content-Disposition`.
pub const DEFAULT_DOWNLOAD_FILENAME: &str = "download";

/// Name attached to feedback submitted without one.
pub const DEFAULT_FEEDBACK_NAME: &str = "Anonymous";

/// Literal value the upload endpoint expects for accepted terms.
pub const AGREED_TERMS_VALUE: &str = "true";
