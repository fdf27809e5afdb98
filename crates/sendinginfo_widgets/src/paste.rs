//! Paste widget: text + language + view limit in, share code and links out.

use crate::backend::{NetCmd, NetEvent};
use crate::view::{Effect, Notice, RequestState};
use sendinginfo_core::limits::effective_max_views;
use sendinginfo_core::models::paste::{CreatePasteRequest, PasteCreated};
use sendinginfo_core::text::{is_blank, normalize_optional_nonempty};
use sendinginfo_core::{Endpoints, Url, DEFAULT_PASTE_LANGUAGE};
use tracing::debug;

const EMPTY_CONTENT_MESSAGE: &str = "Please enter some text to share.";
const CREATE_FALLBACK_MESSAGE: &str = "Failed to create paste.";
const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";
const EMPTY_CODE_ALERT: &str = "Please enter a paste code.";

/// User intents the paste widget understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteIntent {
    EditContent(String),
    EditLanguage(String),
    EditMaxViews(String),
    /// Show or hide the max-views input. The value is read either way.
    ToggleViewsInput,
    Submit,
    EditLookupCode(String),
    /// Open the formatted page for the lookup code in a new context.
    OpenView,
    /// Open the raw text for the lookup code in a new context.
    OpenRaw,
}

impl PasteIntent {
    fn name(&self) -> &'static str {
        match self {
            Self::EditContent(_) => "edit_content",
            Self::EditLanguage(_) => "edit_language",
            Self::EditMaxViews(_) => "edit_max_views",
            Self::ToggleViewsInput => "toggle_views_input",
            Self::Submit => "submit",
            Self::EditLookupCode(_) => "edit_lookup_code",
            Self::OpenView => "open_view",
            Self::OpenRaw => "open_raw",
        }
    }
}

/// A created paste together with the links rendered for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteShare {
    pub created: PasteCreated,
    pub view_url: Url,
    pub raw_url: Url,
}

impl PasteShare {
    /// Multi-line text rendering of the result region.
    pub fn render(&self) -> String {
        format!(
            "{}\nCode: {}\nMax views: {}\nView: {}\nRaw: {}",
            self.created.message,
            self.created.code,
            self.created.max_views,
            self.view_url,
            self.raw_url
        )
    }
}

/// State of one mounted paste form.
#[derive(Debug, Clone)]
pub struct PasteWidget {
    endpoints: Endpoints,
    content: String,
    language: String,
    max_views_input: String,
    views_input_visible: bool,
    lookup_code: String,
    state: RequestState,
    notice: Option<Notice>,
    share: Option<PasteShare>,
}

impl PasteWidget {
    /// Element ids the host page must provide for this widget to mount.
    pub const REQUIRED_ELEMENTS: &'static [&'static str] = &[
        "paste-content",
        "paste-language",
        "paste-max-views",
        "paste-submit",
        "paste-result",
    ];

    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            endpoints,
            content: String::new(),
            language: DEFAULT_PASTE_LANGUAGE.to_string(),
            max_views_input: "1".to_string(),
            views_input_visible: false,
            lookup_code: String::new(),
            state: RequestState::Idle,
            notice: None,
            share: None,
        }
    }

    /// Route one intent to its handler.
    pub fn dispatch(&mut self, intent: PasteIntent) -> Option<Effect> {
        debug!(intent = intent.name(), "paste widget intent");
        match intent {
            PasteIntent::EditContent(content) => {
                self.content = content;
                None
            }
            PasteIntent::EditLanguage(language) => {
                self.language = language;
                None
            }
            PasteIntent::EditMaxViews(raw) => {
                self.max_views_input = raw;
                None
            }
            PasteIntent::ToggleViewsInput => {
                self.views_input_visible = !self.views_input_visible;
                None
            }
            PasteIntent::Submit => self.on_submit(),
            PasteIntent::EditLookupCode(code) => {
                self.lookup_code = code;
                None
            }
            PasteIntent::OpenView => self.on_open(Endpoints::view_url),
            PasteIntent::OpenRaw => self.on_open(Endpoints::raw_url),
        }
    }

    fn on_submit(&mut self) -> Option<Effect> {
        if self.state.is_pending() {
            debug!("paste submit ignored while a request is in flight");
            return None;
        }
        self.share = None;
        if is_blank(&self.content) {
            self.state = RequestState::LocalError;
            self.notice = Some(Notice::error(EMPTY_CONTENT_MESSAGE));
            return None;
        }

        let request = CreatePasteRequest {
            content: self.content.clone(),
            lang: normalize_optional_nonempty(Some(&self.language))
                .unwrap_or_else(|| DEFAULT_PASTE_LANGUAGE.to_string()),
            max_views: effective_max_views(&self.max_views_input),
        };
        self.state = RequestState::Pending;
        self.notice = Some(Notice::info("Creating paste..."));
        Some(Effect::Send(NetCmd::CreatePaste { request }))
    }

    fn on_open(&mut self, link: fn(&Endpoints, &str) -> Url) -> Option<Effect> {
        match normalize_optional_nonempty(Some(&self.lookup_code)) {
            Some(code) => Some(Effect::OpenInNewContext(link(&self.endpoints, &code))),
            None => Some(Effect::Alert(EMPTY_CODE_ALERT.to_string())),
        }
    }

    /// Apply a worker reply. Events for other widgets are ignored.
    pub fn apply(&mut self, event: NetEvent) -> Option<Effect> {
        match event {
            NetEvent::PasteCreated { created } => {
                self.state = RequestState::Succeeded;
                self.notice = Some(Notice::success(created.message.clone()));
                self.share = Some(PasteShare {
                    view_url: self.endpoints.view_url(&created.code),
                    raw_url: self.endpoints.raw_url(&created.code),
                    created,
                });
            }
            NetEvent::PasteFailed { failure } => {
                if failure.is_network() {
                    self.state = RequestState::NetworkError;
                    self.notice = Some(Notice::error(NETWORK_ERROR_MESSAGE));
                } else {
                    self.state = RequestState::RemoteError;
                    self.notice = Some(Notice::error(failure.describe(CREATE_FALLBACK_MESSAGE)));
                }
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

    pub fn share(&self) -> Option<&PasteShare> {
        self.share.as_ref()
    }

    pub fn views_input_visible(&self) -> bool {
        self.views_input_visible
    }
}
