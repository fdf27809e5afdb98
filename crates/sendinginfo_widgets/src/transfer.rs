//! Transfer widget: file upload with download limits, and download by code.
//!
//! Upload and download are independent paths with their own request state,
//! so a pending upload never blocks a download and vice versa.

use crate::backend::{NetCmd, NetEvent};
use crate::view::{Effect, Notice, RequestState};
use chrono::{DateTime, Local, Utc};
use sendinginfo_core::limits::effective_max_downloads;
use sendinginfo_core::models::transfer::{UploadReceipt, UploadRequest};
use sendinginfo_core::text::normalize_optional_nonempty;
use sendinginfo_core::{Endpoints, Url};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DROP_PROMPT: &str = "Drag & drop a file here, or click to choose one";
const SINGLE_MODE_LABEL: &str = "Allow multiple downloads";
const MULTI_MODE_LABEL: &str = "Single download only";
const NO_FILE_ALERT: &str = "Please select a file first.";
const TERMS_ALERT: &str = "You must agree to the terms before uploading.";
const UPLOAD_FALLBACK_MESSAGE: &str = "Upload failed.";
const UPLOAD_NETWORK_MESSAGE: &str = "Upload failed. Please check your connection and try again.";
const EMPTY_DOWNLOAD_CODE: &str = "Please enter a download code.";
const DOWNLOAD_FALLBACK_MESSAGE: &str = "Download failed.";
const DOWNLOAD_NETWORK_MESSAGE: &str = "Network error while downloading. Please try again.";

/// How a file reached the widget. Both sources select the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSource {
    Picker,
    DragAndDrop,
}

impl FileSource {
    fn name(self) -> &'static str {
        match self {
            Self::Picker => "picker",
            Self::DragAndDrop => "drag_and_drop",
        }
    }
}

/// A file chosen for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

impl SelectedFile {
    /// Stat `path` and capture its display name and size.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
        })
    }
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// User intents the transfer widget understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferIntent {
    PickFile(SelectedFile),
    DragEnter,
    DragLeave,
    DropFile(SelectedFile),
    SetMultiMode(bool),
    ToggleMultiMode,
    EditMaxDownloads(String),
    SetAgreedTerms(bool),
    Upload,
    Clear,
    EditDownloadCode(String),
    Download,
}

impl TransferIntent {
    fn name(&self) -> &'static str {
        match self {
            Self::PickFile(_) => "pick_file",
            Self::DragEnter => "drag_enter",
            Self::DragLeave => "drag_leave",
            Self::DropFile(_) => "drop_file",
            Self::SetMultiMode(_) => "set_multi_mode",
            Self::ToggleMultiMode => "toggle_multi_mode",
            Self::EditMaxDownloads(_) => "edit_max_downloads",
            Self::SetAgreedTerms(_) => "set_agreed_terms",
            Self::Upload => "upload",
            Self::Clear => "clear",
            Self::EditDownloadCode(_) => "edit_download_code",
            Self::Download => "download",
        }
    }
}

/// A completed upload together with its download link and expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadShare {
    pub receipt: UploadReceipt,
    pub download_url: Url,
    /// `None` when the advertised lifetime cannot be placed on the calendar.
    pub expires_at: Option<DateTime<Utc>>,
}

impl UploadShare {
    pub fn render(&self) -> String {
        let downloads = if self.receipt.max_downloads == 1 {
            "1 download".to_string()
        } else {
            format!("{} downloads", self.receipt.max_downloads)
        };
        let local_expiry = self
            .expires_at
            .map(|at| format!(" ({})", at.with_timezone(&Local).format("%Y-%m-%d %H:%M %Z")))
            .unwrap_or_default();
        format!(
            "{}\nCode: {}\nAllowed: {}\nExpires in: {} hours{}\nDownload: {}",
            self.receipt.message,
            self.receipt.code,
            downloads,
            self.receipt.expires_in_hours,
            local_expiry,
            self.download_url
        )
    }
}

/// State of one mounted transfer form.
#[derive(Debug, Clone)]
pub struct TransferWidget {
    endpoints: Endpoints,
    selected: Option<SelectedFile>,
    drag_active: bool,
    multi_mode: bool,
    max_downloads_input: String,
    agreed_terms: bool,
    upload_state: RequestState,
    upload_notice: Option<Notice>,
    share: Option<UploadShare>,
    download_code: String,
    download_state: RequestState,
    download_notice: Option<Notice>,
}

impl TransferWidget {
    pub const REQUIRED_ELEMENTS: &'static [&'static str] = &[
        "drop-zone",
        "file-input",
        "multi-toggle",
        "max-downloads",
        "agree-terms",
        "upload-button",
        "clear-button",
        "upload-result",
        "download-code",
        "download-button",
        "download-message",
    ];

    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            endpoints,
            selected: None,
            drag_active: false,
            multi_mode: false,
            max_downloads_input: String::new(),
            agreed_terms: false,
            upload_state: RequestState::Idle,
            upload_notice: None,
            share: None,
            download_code: String::new(),
            download_state: RequestState::Idle,
            download_notice: None,
        }
    }

    /// Route one intent to its handler.
    pub fn dispatch(&mut self, intent: TransferIntent) -> Option<Effect> {
        debug!(intent = intent.name(), "transfer widget intent");
        match intent {
            TransferIntent::PickFile(file) => self.on_select(file, FileSource::Picker),
            TransferIntent::DragEnter => {
                self.drag_active = true;
                None
            }
            TransferIntent::DragLeave => {
                self.drag_active = false;
                None
            }
            TransferIntent::DropFile(file) => self.on_select(file, FileSource::DragAndDrop),
            TransferIntent::SetMultiMode(enabled) => {
                self.multi_mode = enabled;
                None
            }
            TransferIntent::ToggleMultiMode => {
                self.multi_mode = !self.multi_mode;
                None
            }
            TransferIntent::EditMaxDownloads(raw) => {
                self.max_downloads_input = raw;
                None
            }
            TransferIntent::SetAgreedTerms(agreed) => {
                self.agreed_terms = agreed;
                None
            }
            TransferIntent::Upload => self.on_upload(),
            TransferIntent::Clear => self.on_clear(),
            TransferIntent::EditDownloadCode(code) => {
                self.download_code = code;
                None
            }
            TransferIntent::Download => self.on_download(),
        }
    }

    fn on_select(&mut self, file: SelectedFile, source: FileSource) -> Option<Effect> {
        debug!(source = source.name(), file = %file.name, size = file.size, "file selected");
        self.drag_active = false;
        self.selected = Some(file);
        None
    }

    fn on_upload(&mut self) -> Option<Effect> {
        if self.upload_state.is_pending() {
            debug!("upload ignored while a request is in flight");
            return None;
        }
        let Some((path, name)) = self
            .selected
            .as_ref()
            .map(|file| (file.path.clone(), file.name.clone()))
        else {
            return Some(Effect::Alert(NO_FILE_ALERT.to_string()));
        };
        if !self.agreed_terms {
            return Some(Effect::Alert(TERMS_ALERT.to_string()));
        }

        let request = UploadRequest {
            max_downloads: effective_max_downloads(self.multi_mode, &self.max_downloads_input),
            agreed_terms: true,
        };
        self.share = None;
        self.upload_state = RequestState::Pending;
        self.upload_notice = Some(Notice::info(format!("Uploading {}...", name)));
        Some(Effect::Send(NetCmd::Upload { path, request }))
    }

    /// Multi-mode, the max-downloads field and the terms box survive a clear.
    fn on_clear(&mut self) -> Option<Effect> {
        self.selected = None;
        self.drag_active = false;
        self.share = None;
        self.upload_notice = None;
        if !self.upload_state.is_pending() {
            self.upload_state = RequestState::Idle;
        }
        None
    }

    fn on_download(&mut self) -> Option<Effect> {
        if self.download_state.is_pending() {
            debug!("download ignored while a request is in flight");
            return None;
        }
        let Some(code) = normalize_optional_nonempty(Some(&self.download_code)) else {
            self.download_state = RequestState::LocalError;
            self.download_notice = Some(Notice::warning(EMPTY_DOWNLOAD_CODE));
            return None;
        };
        self.download_state = RequestState::Pending;
        self.download_notice = Some(Notice::info("Downloading..."));
        Some(Effect::Send(NetCmd::Download { code }))
    }

    /// Apply a worker reply. Events for other widgets are ignored.
    pub fn apply(&mut self, event: NetEvent) -> Option<Effect> {
        match event {
            NetEvent::Uploaded { receipt } => {
                self.upload_state = RequestState::Succeeded;
                self.upload_notice = Some(Notice::success(receipt.message.clone()));
                self.share = Some(UploadShare {
                    download_url: self.endpoints.download_url(&receipt.code),
                    expires_at: receipt.expires_at(Utc::now()),
                    receipt,
                });
                None
            }
            NetEvent::UploadFailed { failure } => {
                if failure.is_network() {
                    self.upload_state = RequestState::NetworkError;
                    self.upload_notice = Some(Notice::error(UPLOAD_NETWORK_MESSAGE));
                } else {
                    self.upload_state = RequestState::RemoteError;
                    self.upload_notice =
                        Some(Notice::error(failure.describe(UPLOAD_FALLBACK_MESSAGE)));
                }
                None
            }
            NetEvent::Downloaded { code, file } => {
                self.download_state = RequestState::Succeeded;
                self.download_notice = Some(Notice::success(format!(
                    "Downloaded {} ({}).",
                    file.file_name,
                    format_size(file.bytes.len() as u64)
                )));
                debug!(code = %code, file = %file.file_name, "download ready to save");
                Some(Effect::SaveFile {
                    file_name: file.file_name,
                    bytes: file.bytes,
                })
            }
            NetEvent::DownloadFailed { code, failure } => {
                debug!(code = %code, "download failed");
                if failure.is_network() {
                    self.download_state = RequestState::NetworkError;
                    self.download_notice = Some(Notice::warning(DOWNLOAD_NETWORK_MESSAGE));
                } else {
                    self.download_state = RequestState::RemoteError;
                    self.download_notice =
                        Some(Notice::error(failure.describe(DOWNLOAD_FALLBACK_MESSAGE)));
                }
                None
            }
            _ => None,
        }
    }

    /// Text of the drop zone: the initial prompt, or the selected file.
    pub fn drop_prompt(&self) -> String {
        match &self.selected {
            Some(file) => format!("Selected: {} ({})", file.name, format_size(file.size)),
            None => DROP_PROMPT.to_string(),
        }
    }

    /// Label of the multi-mode toggle control.
    pub fn multi_toggle_label(&self) -> &'static str {
        if self.multi_mode {
            MULTI_MODE_LABEL
        } else {
            SINGLE_MODE_LABEL
        }
    }

    /// The upload controls are shown once a file is selected.
    pub fn upload_controls_visible(&self) -> bool {
        self.selected.is_some()
    }

    pub fn max_downloads_visible(&self) -> bool {
        self.multi_mode
    }

    pub fn drag_active(&self) -> bool {
        self.drag_active
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn upload_state(&self) -> RequestState {
        self.upload_state
    }

    pub fn upload_notice(&self) -> Option<&Notice> {
        self.upload_notice.as_ref()
    }

    pub fn share(&self) -> Option<&UploadShare> {
        self.share.as_ref()
    }

    pub fn download_state(&self) -> RequestState {
        self.download_state
    }

    pub fn download_notice(&self) -> Option<&Notice> {
        self.download_notice.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Failure;
    use crate::view::Severity;
    use sendinginfo_core::models::transfer::DownloadedFile;

    fn widget() -> TransferWidget {
        TransferWidget::new(Endpoints::new("http://127.0.0.1:5000").expect("endpoints"))
    }

    fn file(name: &str) -> SelectedFile {
        SelectedFile {
            path: PathBuf::from("/tmp").join(name),
            name: name.to_string(),
            size: 2048,
        }
    }

    fn ready_widget() -> TransferWidget {
        let mut transfer = widget();
        transfer.dispatch(TransferIntent::PickFile(file("notes.txt")));
        transfer.dispatch(TransferIntent::SetAgreedTerms(true));
        transfer
    }

    fn sent_request(effect: Option<Effect>) -> UploadRequest {
        match effect {
            Some(Effect::Send(NetCmd::Upload { request, .. })) => request,
            other => panic!("expected upload command, got {:?}", other),
        }
    }

    #[test]
    fn upload_requires_file_then_terms() {
        let mut transfer = widget();
        transfer.dispatch(TransferIntent::SetAgreedTerms(true));
        assert_eq!(
            transfer.dispatch(TransferIntent::Upload),
            Some(Effect::Alert(NO_FILE_ALERT.to_string()))
        );

        transfer.dispatch(TransferIntent::SetAgreedTerms(false));
        transfer.dispatch(TransferIntent::DropFile(file("a.bin")));
        assert_eq!(
            transfer.dispatch(TransferIntent::Upload),
            Some(Effect::Alert(TERMS_ALERT.to_string()))
        );
        assert_eq!(transfer.upload_state(), RequestState::Idle);
    }

    #[test]
    fn picker_and_drop_select_the_same_way_and_replace_each_other() {
        let mut transfer = widget();
        transfer.dispatch(TransferIntent::DragEnter);
        assert!(transfer.drag_active());
        transfer.dispatch(TransferIntent::DropFile(file("first.txt")));
        assert!(!transfer.drag_active());
        transfer.dispatch(TransferIntent::PickFile(file("second.txt")));

        assert_eq!(transfer.selected().map(|f| f.name.as_str()), Some("second.txt"));
        assert_eq!(transfer.drop_prompt(), "Selected: second.txt (2.0 KB)");
        assert!(transfer.upload_controls_visible());
    }

    #[test]
    fn max_downloads_follows_multi_mode_and_cap() {
        let cases = [
            (false, "150", 1),
            (false, "7", 1),
            (true, "150", 100),
            (true, "0", 1),
            (true, "7", 7),
            (true, "", 1),
        ];
        for (multi, raw, expected) in cases {
            let mut transfer = ready_widget();
            transfer.dispatch(TransferIntent::SetMultiMode(multi));
            transfer.dispatch(TransferIntent::EditMaxDownloads(raw.to_string()));
            let request = sent_request(transfer.dispatch(TransferIntent::Upload));
            assert_eq!(request.max_downloads, expected, "multi={} raw={:?}", multi, raw);
            assert!(request.agreed_terms);
        }
    }

    #[test]
    fn multi_mode_toggle_relabels_without_touching_the_value() {
        let mut transfer = widget();
        transfer.dispatch(TransferIntent::EditMaxDownloads("9".to_string()));
        assert_eq!(transfer.multi_toggle_label(), SINGLE_MODE_LABEL);
        assert!(!transfer.max_downloads_visible());

        transfer.dispatch(TransferIntent::ToggleMultiMode);
        assert_eq!(transfer.multi_toggle_label(), MULTI_MODE_LABEL);
        assert!(transfer.max_downloads_visible());

        transfer.dispatch(TransferIntent::ToggleMultiMode);
        transfer.dispatch(TransferIntent::ToggleMultiMode);
        transfer.dispatch(TransferIntent::PickFile(file("x")));
        transfer.dispatch(TransferIntent::SetAgreedTerms(true));
        let request = sent_request(transfer.dispatch(TransferIntent::Upload));
        assert_eq!(request.max_downloads, 9);
    }

    #[test]
    fn successful_upload_renders_code_count_and_hours() {
        let mut transfer = ready_widget();
        transfer.dispatch(TransferIntent::Upload);
        transfer.apply(NetEvent::Uploaded {
            receipt: UploadReceipt {
                message: "ok".to_string(),
                code: "AB12".to_string(),
                max_downloads: 5,
                expires_in_hours: 24,
            },
        });

        let share = transfer.share().expect("share");
        let rendered = share.render();
        assert!(rendered.contains("Code: AB12"));
        assert!(rendered.contains("Allowed: 5 downloads"));
        assert!(rendered.contains("Expires in: 24 hours"));
        assert!(rendered.contains("Download: http://127.0.0.1:5000/download/AB12"));
        assert!(share.expires_at.is_some());
        assert_eq!(transfer.upload_state(), RequestState::Succeeded);
    }

    #[test]
    fn receipt_with_unplaceable_expiry_still_renders() {
        let mut transfer = ready_widget();
        transfer.dispatch(TransferIntent::Upload);
        transfer.apply(NetEvent::Uploaded {
            receipt: UploadReceipt {
                message: "ok".to_string(),
                code: "AB12".to_string(),
                max_downloads: 1,
                expires_in_hours: u32::MAX,
            },
        });

        assert_eq!(transfer.upload_state(), RequestState::Succeeded);
        let share = transfer.share().expect("share");
        assert_eq!(share.expires_at, None);
        let rendered = share.render();
        assert!(rendered.contains(&format!("Expires in: {} hours\n", u32::MAX)));
        assert!(rendered.contains("Allowed: 1 download\n"));
    }

    #[test]
    fn upload_failures_render_server_error_or_generic_message() {
        let cases = [
            (
                Failure::Remote {
                    status: Some(200),
                    message: Some("Upload quota reached".to_string()),
                },
                "Upload quota reached",
                RequestState::RemoteError,
            ),
            (
                Failure::Network {
                    detail: "refused".to_string(),
                },
                UPLOAD_NETWORK_MESSAGE,
                RequestState::NetworkError,
            ),
        ];
        for (failure, text, state) in cases {
            let mut transfer = ready_widget();
            transfer.dispatch(TransferIntent::Upload);
            transfer.apply(NetEvent::UploadFailed { failure });
            assert_eq!(transfer.upload_notice(), Some(&Notice::error(text)));
            assert_eq!(transfer.upload_state(), state);
            assert!(transfer.share().is_none());
        }
    }

    #[test]
    fn clear_resets_selection_and_prompt_but_keeps_multi_mode() {
        let mut transfer = ready_widget();
        transfer.dispatch(TransferIntent::SetMultiMode(true));
        transfer.dispatch(TransferIntent::EditMaxDownloads("3".to_string()));
        transfer.dispatch(TransferIntent::Upload);
        transfer.apply(NetEvent::UploadFailed {
            failure: Failure::Remote {
                status: Some(413),
                message: None,
            },
        });

        transfer.dispatch(TransferIntent::Clear);

        assert!(!transfer.upload_controls_visible());
        assert_eq!(transfer.drop_prompt(), DROP_PROMPT);
        assert!(transfer.upload_notice().is_none());
        assert_eq!(transfer.upload_state(), RequestState::Idle);
        assert!(transfer.max_downloads_visible());
    }

    #[test]
    fn download_needs_a_code_and_saves_on_success() {
        let mut transfer = widget();
        assert_eq!(transfer.dispatch(TransferIntent::Download), None);
        assert_eq!(
            transfer.download_notice().map(|n| n.severity),
            Some(Severity::Warning)
        );

        transfer.dispatch(TransferIntent::EditDownloadCode(" AB12 ".to_string()));
        assert_eq!(
            transfer.dispatch(TransferIntent::Download),
            Some(Effect::Send(NetCmd::Download {
                code: "AB12".to_string()
            }))
        );
        let effect = transfer.apply(NetEvent::Downloaded {
            code: "AB12".to_string(),
            file: DownloadedFile {
                file_name: "report.pdf".to_string(),
                content_type: Some("application/pdf".to_string()),
                bytes: b"%PDF".to_vec(),
            },
        });
        assert_eq!(
            effect,
            Some(Effect::SaveFile {
                file_name: "report.pdf".to_string(),
                bytes: b"%PDF".to_vec(),
            })
        );
        assert_eq!(
            transfer.download_notice().map(|n| n.severity),
            Some(Severity::Success)
        );
    }

    #[test]
    fn download_failures_use_distinct_severities_and_never_save() {
        let cases = [
            (
                Failure::Remote {
                    status: Some(404),
                    message: Some("expired".to_string()),
                },
                Notice::error("expired"),
            ),
            (
                Failure::Remote {
                    status: Some(500),
                    message: None,
                },
                Notice::error(DOWNLOAD_FALLBACK_MESSAGE),
            ),
            (
                Failure::Network {
                    detail: "dns".to_string(),
                },
                Notice::warning(DOWNLOAD_NETWORK_MESSAGE),
            ),
        ];
        for (failure, expected) in cases {
            let mut transfer = widget();
            transfer.dispatch(TransferIntent::EditDownloadCode("ZZZZ".to_string()));
            transfer.dispatch(TransferIntent::Download);
            let effect = transfer.apply(NetEvent::DownloadFailed {
                code: "ZZZZ".to_string(),
                failure,
            });
            assert_eq!(effect, None);
            assert_eq!(transfer.download_notice(), Some(&expected));
        }
    }

    #[test]
    fn upload_and_download_do_not_block_each_other() {
        let mut transfer = ready_widget();
        assert!(transfer.dispatch(TransferIntent::Upload).is_some());
        transfer.dispatch(TransferIntent::EditDownloadCode("AB12".to_string()));
        assert!(transfer.dispatch(TransferIntent::Download).is_some());

        assert_eq!(transfer.dispatch(TransferIntent::Upload), None);
        assert_eq!(transfer.dispatch(TransferIntent::Download), None);
    }

    #[test]
    fn selected_file_from_path_reads_name_and_size() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("data.csv");
        std::fs::write(&path, b"a,b\n1,2\n").expect("write");

        let selected = SelectedFile::from_path(&path).expect("selected");
        assert_eq!(selected.name, "data.csv");
        assert_eq!(selected.size, 8);
        assert!(SelectedFile::from_path(dir.path()).is_err());
        assert_eq!(format_size(512), "512 B");
    }
}
