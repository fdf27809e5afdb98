//! Protocol types for the network worker.

use sendinginfo_core::models::feedback::{FeedbackAccepted, FeedbackRequest};
use sendinginfo_core::models::health::HealthStatus;
use sendinginfo_core::models::paste::{CreatePasteRequest, PasteCreated};
use sendinginfo_core::models::transfer::{DownloadedFile, UploadReceipt, UploadRequest};
use sendinginfo_core::ClientError;
use std::path::PathBuf;

/// Correlates a [`NetCmd`] with the [`NetEvent`] the worker sends back for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

/// Requests a widget hands to the worker. Each becomes exactly one HTTP call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetCmd {
    /// `POST /create_paste`.
    CreatePaste { request: CreatePasteRequest },
    /// `POST /upload` with the file at `path`.
    Upload {
        path: PathBuf,
        request: UploadRequest,
    },
    /// `GET /download/{code}`.
    Download { code: String },
    /// `POST /feedback`.
    SendFeedback { request: FeedbackRequest },
    /// `GET /healthz`.
    CheckHealth,
}

impl NetCmd {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CreatePaste { .. } => "create_paste",
            Self::Upload { .. } => "upload",
            Self::Download { .. } => "download",
            Self::SendFeedback { .. } => "feedback",
            Self::CheckHealth => "healthz",
        }
    }

    /// The failure reply this command would have produced, for when no
    /// reply can be waited for.
    pub fn failed(self, failure: Failure) -> NetEvent {
        match self {
            Self::CreatePaste { .. } => NetEvent::PasteFailed { failure },
            Self::Upload { .. } => NetEvent::UploadFailed { failure },
            Self::Download { code } => NetEvent::DownloadFailed { code, failure },
            Self::SendFeedback { .. } => NetEvent::FeedbackFailed { failure },
            Self::CheckHealth => NetEvent::HealthChecked {
                result: Err(failure),
            },
        }
    }
}

/// Replies produced by the worker, one per [`NetCmd`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetEvent {
    PasteCreated { created: PasteCreated },
    PasteFailed { failure: Failure },
    Uploaded { receipt: UploadReceipt },
    UploadFailed { failure: Failure },
    Downloaded { code: String, file: DownloadedFile },
    DownloadFailed { code: String, failure: Failure },
    FeedbackAccepted { accepted: FeedbackAccepted },
    FeedbackFailed { failure: Failure },
    HealthChecked { result: Result<HealthStatus, Failure> },
}

/// Why a request did not succeed, reduced to what a widget can show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The server answered with an application error. `message` is the
    /// server's own wording, when it gave one.
    Remote {
        status: Option<u16>,
        message: Option<String>,
    },
    /// No response arrived at all.
    Network { detail: String },
}

impl From<ClientError> for Failure {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Remote { status, message } => Self::Remote {
                status: Some(status),
                message,
            },
            // A body that breaks the contract is still an answer from the server.
            ClientError::Decode(_) => Self::Remote {
                status: None,
                message: None,
            },
            other => Self::Network {
                detail: other.to_string(),
            },
        }
    }
}

impl Failure {
    /// Message to show, with `fallback` standing in for a missing server message.
    pub fn describe(&self, fallback: &str) -> String {
        match self {
            Self::Remote {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}
