//! Core library for the SendingInfo share clients (config, wire models, HTTP client).

/// Typed async client for the share service endpoints.
pub mod api;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants used across SendingInfo crates.
pub mod constants;
/// `Content-Disposition` filename extraction.
pub mod disposition;
#[doc(hidden)]
pub mod env;
/// Client error types.
pub mod error;
/// Coercion of user-typed view/download limits.
pub mod limits;
/// Request and response payloads for the share service.
pub mod models;
/// Shared text normalization helpers.
pub mod text;

pub use api::{Endpoints, ShareClient};
pub use config::ClientConfig;
pub use constants::*;
pub use error::ClientError;
pub use reqwest::Url;
