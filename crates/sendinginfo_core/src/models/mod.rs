//! Request and response payloads for the share service.

/// Anonymous feedback submissions.
pub mod feedback;
/// Liveness probe payload.
pub mod health;
/// Text paste creation.
pub mod paste;
/// File upload receipts and downloaded payloads.
pub mod transfer;

