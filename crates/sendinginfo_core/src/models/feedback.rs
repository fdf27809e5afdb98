//! Feedback submission payloads.

use serde::{Deserialize, Serialize};

/// Form body for `POST /feedback`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FeedbackRequest {
    pub name: String,
    pub message: String,
}

/// Successful `POST /feedback` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackAccepted {
    pub message: String,
}
