//! Page mounting: decide once which widgets a page can host, then route
//! worker replies to the widget that issued the request.

use crate::backend::{Failure, NetEvent};
use crate::feedback::FeedbackWidget;
use crate::paste::PasteWidget;
use crate::transfer::TransferWidget;
use crate::view::Effect;
use sendinginfo_core::models::health::HealthStatus;
use sendinginfo_core::Endpoints;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Element ids present on the host page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageElements {
    ids: BTreeSet<String>,
}

impl PageElements {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// A page carrying every element any widget needs.
    pub fn full() -> Self {
        Self::new(
            PasteWidget::REQUIRED_ELEMENTS
                .iter()
                .chain(TransferWidget::REQUIRED_ELEMENTS)
                .chain(FeedbackWidget::REQUIRED_ELEMENTS)
                .copied(),
        )
    }

    pub fn contains_all(&self, required: &[&str]) -> bool {
        required.iter().all(|id| self.ids.contains(*id))
    }

    fn missing<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|id| !self.ids.contains(*id))
            .collect()
    }
}

/// The widgets mounted on one page. A widget whose elements are missing is
/// absent here and never wired.
#[derive(Debug, Clone)]
pub struct Page {
    pub paste: Option<PasteWidget>,
    pub transfer: Option<TransferWidget>,
    pub feedback: Option<FeedbackWidget>,
    health: Option<Result<HealthStatus, Failure>>,
}

fn mount_if<W>(
    elements: &PageElements,
    widget: &str,
    required: &[&str],
    build: impl FnOnce() -> W,
) -> Option<W> {
    if elements.contains_all(required) {
        debug!(widget = widget, "widget mounted");
        Some(build())
    } else {
        info!(widget = widget, missing = ?elements.missing(required), "widget skipped");
        None
    }
}

impl Page {
    pub fn mount(elements: &PageElements, endpoints: &Endpoints) -> Self {
        Self {
            paste: mount_if(elements, "paste", PasteWidget::REQUIRED_ELEMENTS, || {
                PasteWidget::new(endpoints.clone())
            }),
            transfer: mount_if(
                elements,
                "transfer",
                TransferWidget::REQUIRED_ELEMENTS,
                || TransferWidget::new(endpoints.clone()),
            ),
            feedback: mount_if(
                elements,
                "feedback",
                FeedbackWidget::REQUIRED_ELEMENTS,
                FeedbackWidget::new,
            ),
            health: None,
        }
    }

    /// Hand a worker reply to the widget that owns it.
    pub fn route(&mut self, event: NetEvent) -> Option<Effect> {
        match event {
            NetEvent::PasteCreated { .. } | NetEvent::PasteFailed { .. } => {
                self.paste.as_mut().and_then(|paste| paste.apply(event))
            }
            NetEvent::Uploaded { .. }
            | NetEvent::UploadFailed { .. }
            | NetEvent::Downloaded { .. }
            | NetEvent::DownloadFailed { .. } => self
                .transfer
                .as_mut()
                .and_then(|transfer| transfer.apply(event)),
            NetEvent::FeedbackAccepted { .. } | NetEvent::FeedbackFailed { .. } => self
                .feedback
                .as_mut()
                .and_then(|feedback| feedback.apply(event)),
            NetEvent::HealthChecked { result } => {
                self.health = Some(result);
                None
            }
        }
    }

    /// Outcome of the most recent health probe.
    pub fn health(&self) -> Option<&Result<HealthStatus, Failure>> {
        self.health.as_ref()
    }
}
