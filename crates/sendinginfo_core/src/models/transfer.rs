//! Upload receipts and downloaded payloads.

use crate::constants::DEFAULT_EXPIRY_HOURS;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

fn default_expiry_hours() -> u32 {
    DEFAULT_EXPIRY_HOURS
}

/// Successful `POST /upload` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadReceipt {
    pub message: String,
    pub code: String,
    pub max_downloads: u32,
    #[serde(default = "default_expiry_hours")]
    pub expires_in_hours: u32,
}

impl UploadReceipt {
    /// Instant the upload stops being downloadable, counted from `issued_at`.
    ///
    /// `None` when the advertised hours push past the representable range.
    pub fn expires_at(&self, issued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        Duration::try_hours(i64::from(self.expires_in_hours))
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
    }
}

/// Fields of the multipart body sent to `POST /upload`, besides the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub max_downloads: u32,
    pub agreed_terms: bool,
}

/// Binary payload fetched from `GET /download/{code}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// Sanitized name taken from `Content-Disposition`.
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}
