//! Paste creation payloads.

use serde::{Deserialize, Serialize};

/// JSON body for `POST /create_paste`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatePasteRequest {
    pub content: String,
    pub lang: String,
    pub max_views: u32,
}

/// Successful `POST /create_paste` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PasteCreated {
    pub message: String,
    pub code: String,
    pub max_views: u32,
}
