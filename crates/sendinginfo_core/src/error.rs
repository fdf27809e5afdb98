//! Error types for share client calls.
use thiserror::Error;

/// Failure of a single call against the share service.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered and the answer names an application error.
    /// `message` is `None` when the body named no error of its own.
    #[error("{}", describe_remote(.status, .message))]
    Remote {
        status: u16,
        message: Option<String>,
    },

    /// The request never produced a response (offline, DNS, refused, timeout).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a body that does not match the contract.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// A local file could not be read before sending.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
}

fn describe_remote(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(message) => message.clone(),
        None => reqwest::StatusCode::from_u16(*status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Request failed")
            .to_string(),
    }
}

impl ClientError {
    /// `true` when no HTTP response was received for the request.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Io(_))
    }

    /// Server-supplied message, if this error carries one.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Remote { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
