//! Headless share widgets for SendingInfo.
//!
//! Each widget is a plain struct owning its form fields. User intents go
//! through the widget's `dispatch` table and come back as [`Effect`]s for the
//! host to run; network replies arrive as [`NetEvent`]s from the background
//! worker and are routed back through [`Page::route`].

mod backend;
mod feedback;
mod mount;
mod paste;
mod session;
mod transfer;
mod view;

pub use backend::{spawn_backend, BackendHandle, Failure, NetCmd, NetEvent, RequestId};
pub use feedback::{FeedbackIntent, FeedbackWidget};
pub use mount::{Page, PageElements};
pub use paste::{PasteIntent, PasteShare, PasteWidget};
pub use session::{PageSession, SessionError};
pub use transfer::{FileSource, SelectedFile, TransferIntent, TransferWidget, UploadShare};
pub use view::{Effect, Notice, RequestState, Severity};
