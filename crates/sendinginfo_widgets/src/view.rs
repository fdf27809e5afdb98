//! Presentation state shared by the widgets.

use crate::backend::NetCmd;
use sendinginfo_core::Url;

/// Visual severity of an inline message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Text shown in a widget's message region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(Severity::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(Severity::Success, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(Severity::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Severity::Error, text)
    }

    fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }
}

/// Lifecycle of the one request a widget path may have outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    /// Input was rejected before anything was sent.
    LocalError,
    RemoteError,
    NetworkError,
}

impl RequestState {
    pub fn is_pending(self) -> bool {
        self == Self::Pending
    }

    /// `true` for any of the three failure outcomes.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Self::LocalError | Self::RemoteError | Self::NetworkError
        )
    }
}

/// Work a widget asks its host to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Hand a request to the network worker.
    Send(NetCmd),
    /// Blocking alert; nothing else happens for this action.
    Alert(String),
    /// Open `Url` in a new browsing context.
    OpenInNewContext(Url),
    /// Save a downloaded payload under `file_name`.
    SaveFile { file_name: String, bytes: Vec<u8> },
}
