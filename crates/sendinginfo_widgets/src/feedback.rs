//! Feedback widget.

use crate::backend::{NetCmd, NetEvent};
use crate::view::{Effect, Notice, RequestState};
use sendinginfo_core::models::feedback::FeedbackRequest;
use sendinginfo_core::text::{is_blank, normalize_optional_nonempty};
use sendinginfo_core::DEFAULT_FEEDBACK_NAME;
use tracing::debug;

const EMPTY_MESSAGE: &str = "Please write a message before sending.";
const FEEDBACK_FALLBACK_MESSAGE: &str = "Failed to send feedback.";
const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackIntent {
    EditName(String),
    EditMessage(String),
    Submit,
}

#[derive(Debug, Clone, Default)]
pub struct FeedbackWidget {
    name: String,
    message: String,
    state: RequestState,
    notice: Option<Notice>,
}

impl FeedbackWidget {
    pub const REQUIRED_ELEMENTS: &'static [&'static str] = &[
        "feedback-name",
        "feedback-message",
        "feedback-submit",
        "feedback-result",
    ];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, intent: FeedbackIntent) -> Option<Effect> {
        match intent {
            FeedbackIntent::EditName(name) => {
                self.name = name;
                None
            }
            FeedbackIntent::EditMessage(message) => {
                self.message = message;
                None
            }
            FeedbackIntent::Submit => self.on_submit(),
        }
    }

    fn on_submit(&mut self) -> Option<Effect> {
        if self.state.is_pending() {
            debug!("feedback submit ignored while a request is in flight");
            return None;
        }
        if is_blank(&self.message) {
            self.state = RequestState::LocalError;
            self.notice = Some(Notice::error(EMPTY_MESSAGE));
            return None;
        }
        let request = FeedbackRequest {
            name: normalize_optional_nonempty(Some(&self.name))
                .unwrap_or_else(|| DEFAULT_FEEDBACK_NAME.to_string()),
            message: self.message.trim().to_string(),
        };
        self.state = RequestState::Pending;
        self.notice = Some(Notice::info("Sending feedback..."));
        Some(Effect::Send(NetCmd::SendFeedback { request }))
    }

    pub fn apply(&mut self, event: NetEvent) -> Option<Effect> {
        match event {
            NetEvent::FeedbackAccepted { accepted } => {
                self.state = RequestState::Succeeded;
                self.notice = Some(Notice::success(accepted.message));
                self.message.clear();
            }
            NetEvent::FeedbackFailed { failure } if failure.is_network() => {
                self.state = RequestState::NetworkError;
                self.notice = Some(Notice::error(NETWORK_ERROR_MESSAGE));
            }
            NetEvent::FeedbackFailed { failure } => {
                self.state = RequestState::RemoteError;
                self.notice = Some(Notice::error(failure.describe(FEEDBACK_FALLBACK_MESSAGE)));
            }
            _ => {}
        }
        None
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Failure;
    use sendinginfo_core::models::feedback::FeedbackAccepted;

    #[test]
    fn blank_message_is_rejected_locally() {
        let mut feedback = FeedbackWidget::new();
        feedback.dispatch(FeedbackIntent::EditMessage(" \n".to_string()));
        assert_eq!(feedback.dispatch(FeedbackIntent::Submit), None);
        assert_eq!(feedback.state(), RequestState::LocalError);
    }

    #[test]
    fn blank_name_defaults_to_anonymous() {
        for (name, expected) in [("", "Anonymous"), ("   ", "Anonymous"), (" Kim ", "Kim")] {
            let mut feedback = FeedbackWidget::new();
            feedback.dispatch(FeedbackIntent::EditName(name.to_string()));
            feedback.dispatch(FeedbackIntent::EditMessage("Nice tool".to_string()));
            match feedback.dispatch(FeedbackIntent::Submit) {
                Some(Effect::Send(NetCmd::SendFeedback { request })) => {
                    assert_eq!(request.name, expected, "name: {:?}", name);
                    assert_eq!(request.message, "Nice tool");
                }
                other => panic!("unexpected effect: {:?}", other),
            }
        }
    }

    #[test]
    fn replies_update_notice() {
        let mut feedback = FeedbackWidget::new();
        feedback.dispatch(FeedbackIntent::EditMessage("hi".to_string()));
        feedback.dispatch(FeedbackIntent::Submit);
        assert_eq!(feedback.dispatch(FeedbackIntent::Submit), None);

        feedback.apply(NetEvent::FeedbackFailed {
            failure: Failure::Remote {
                status: Some(429),
                message: Some("Too many requests".to_string()),
            },
        });
        assert_eq!(feedback.notice(), Some(&Notice::error("Too many requests")));

        feedback.dispatch(FeedbackIntent::Submit);
        feedback.apply(NetEvent::FeedbackAccepted {
            accepted: FeedbackAccepted {
                message: "Thank you for your feedback!".to_string(),
            },
        });
        assert_eq!(feedback.state(), RequestState::Succeeded);
        assert_eq!(
            feedback.notice(),
            Some(&Notice::success("Thank you for your feedback!"))
        );
    }
}
