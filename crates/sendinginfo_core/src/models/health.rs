//! `/healthz` payload.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    pub time_utc: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }

    /// Server clock as reported by the probe (naive ISO-8601, UTC).
    pub fn server_time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(self.time_utc.trim(), "%Y-%m-%dT%H:%M:%S%.f").ok()
    }
}
