//! Host-side driver that pairs a mounted page with the network worker.

use crate::backend::{spawn_backend, BackendHandle, Failure, NetCmd, NetEvent, RequestId};
use crate::mount::{Page, PageElements};
use crate::view::Effect;
use crossbeam_channel::RecvTimeoutError;
use sendinginfo_core::ShareClient;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("network worker stopped")]
    BackendGone,
    #[error("no reply from the network worker within {0:?}")]
    TimedOut(Duration),
}

/// A mounted page plus the worker performing its requests.
pub struct PageSession {
    pub page: Page,
    backend: BackendHandle,
    wait: Duration,
    next_id: u64,
}

impl PageSession {
    /// Mount `elements` against `client`'s server and start the worker.
    ///
    /// `wait` bounds how long [`PageSession::run`] blocks for one reply.
    pub fn start(client: ShareClient, elements: &PageElements, wait: Duration) -> Self {
        let page = Page::mount(elements, client.endpoints());
        Self {
            page,
            backend: spawn_backend(client),
            wait,
            next_id: 0,
        }
    }

    /// Perform `effect`. A [`Effect::Send`] is executed and its reply routed
    /// back through the page; whatever the page asks for next is returned.
    /// Every other effect is host work and comes back untouched.
    ///
    /// On timeout the issuing widget is moved to a network failure before
    /// the error is returned, so it can be submitted again.
    ///
    /// # Errors
    /// [`SessionError::BackendGone`] if the worker exited, or
    /// [`SessionError::TimedOut`] if no reply arrived in time.
    pub fn run(&mut self, effect: Effect) -> Result<Vec<Effect>, SessionError> {
        match effect {
            Effect::Send(cmd) => {
                let event = self.settle(cmd)?;
                Ok(self.page.route(event).into_iter().collect())
            }
            other => Ok(vec![other]),
        }
    }

    /// Send one command and block until its own reply arrives.
    ///
    /// Replies to earlier requests that gave up waiting are discarded.
    pub fn request(&mut self, cmd: NetCmd) -> Result<NetEvent, SessionError> {
        self.next_id += 1;
        let id = RequestId(self.next_id);
        debug!(op = cmd.label(), request = id.0, "session request");
        self.backend
            .cmd_tx
            .send((id, cmd))
            .map_err(|_| SessionError::BackendGone)?;
        let deadline = Instant::now() + self.wait;
        loop {
            match self.backend.evt_rx.recv_deadline(deadline) {
                Ok((reply, event)) if reply == id => return Ok(event),
                Ok((stale, _)) => debug!(request = stale.0, "dropping stale reply"),
                Err(RecvTimeoutError::Timeout) => return Err(SessionError::TimedOut(self.wait)),
                Err(RecvTimeoutError::Disconnected) => return Err(SessionError::BackendGone),
            }
        }
    }

    /// Probe `/healthz` and record the outcome on the page.
    pub fn check_health(&mut self) -> Result<(), SessionError> {
        let event = self.settle(NetCmd::CheckHealth)?;
        self.page.route(event);
        Ok(())
    }

    /// [`PageSession::request`], but a timeout is first recorded on the page
    /// as a network failure for `cmd`.
    fn settle(&mut self, cmd: NetCmd) -> Result<NetEvent, SessionError> {
        let label = cmd.label();
        let fallback = cmd.clone();
        match self.request(cmd) {
            Err(SessionError::TimedOut(wait)) => {
                warn!(op = label, wait_ms = wait.as_millis() as u64, "gave up waiting for reply");
                let failure = Failure::Network {
                    detail: format!("no reply within {:?}", wait),
                };
                self.page.route(fallback.failed(failure));
                Err(SessionError::TimedOut(wait))
            }
            other => other,
        }
    }
}
