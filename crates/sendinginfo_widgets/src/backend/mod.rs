//! Network worker wiring for the share widgets.
//!
//! This module exposes the command/event protocol plus the worker spawn helper
//! used by page hosts.

mod protocol;
mod worker;

pub use protocol::{Failure, NetCmd, NetEvent, RequestId};
pub use worker::{spawn_backend, BackendHandle};
