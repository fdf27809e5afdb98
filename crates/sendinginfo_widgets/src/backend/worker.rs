//! Background worker thread that performs the HTTP calls.

use super::{Failure, NetCmd, NetEvent, RequestId};
use crossbeam_channel::{unbounded, Receiver, Sender};
use sendinginfo_core::ShareClient;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// How long in-flight requests get to finish once every sender is gone.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Handle for sending commands to, and receiving events from, the worker.
///
/// Every event carries the [`RequestId`] of the command that produced it.
pub struct BackendHandle {
    pub cmd_tx: Sender<(RequestId, NetCmd)>,
    pub evt_rx: Receiver<(RequestId, NetEvent)>,
}

fn log_failure(label: &str, failure: &Failure) {
    match failure {
        Failure::Network { detail } => warn!(op = label, "request failed in transit: {}", detail),
        Failure::Remote { status, message } => {
            info!(op = label, status = ?status, message = ?message, "server rejected request")
        }
    }
}

async fn execute(client: &ShareClient, cmd: NetCmd) -> NetEvent {
    let label = cmd.label();
    let started = Instant::now();
    let event = match cmd {
        NetCmd::CreatePaste { request } => match client.create_paste(&request).await {
            Ok(created) => NetEvent::PasteCreated { created },
            Err(err) => NetEvent::PasteFailed {
                failure: err.into(),
            },
        },
        NetCmd::Upload { path, request } => match client.upload_file(&path, &request).await {
            Ok(receipt) => NetEvent::Uploaded { receipt },
            Err(err) => NetEvent::UploadFailed {
                failure: err.into(),
            },
        },
        NetCmd::Download { code } => match client.download(&code).await {
            Ok(file) => NetEvent::Downloaded { code, file },
            Err(err) => NetEvent::DownloadFailed {
                code,
                failure: err.into(),
            },
        },
        NetCmd::SendFeedback { request } => match client.submit_feedback(&request).await {
            Ok(accepted) => NetEvent::FeedbackAccepted { accepted },
            Err(err) => NetEvent::FeedbackFailed {
                failure: err.into(),
            },
        },
        NetCmd::CheckHealth => NetEvent::HealthChecked {
            result: client.health().await.map_err(Failure::from),
        },
    };

    let failure = match &event {
        NetEvent::PasteFailed { failure }
        | NetEvent::UploadFailed { failure }
        | NetEvent::DownloadFailed { failure, .. }
        | NetEvent::FeedbackFailed { failure }
        | NetEvent::HealthChecked {
            result: Err(failure),
        } => Some(failure),
        _ => None,
    };
    if let Some(failure) = failure {
        log_failure(label, failure);
    }
    debug!(
        op = label,
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "request finished"
    );
    event
}

/// Spawn the worker thread that owns the async runtime and performs all I/O.
///
/// Each command runs as its own task, so a slow upload never holds up a
/// paste or download issued from another widget. Replies arrive on
/// [`BackendHandle::evt_rx`] in completion order.
///
/// Dropping [`BackendHandle::cmd_tx`] stops the worker. Requests still in
/// flight then get a short grace period before the runtime is torn down.
///
/// # Returns
/// A [`BackendHandle`] containing the command sender and event receiver.
///
/// # Panics
/// Panics if the worker thread cannot be spawned.
pub fn spawn_backend(client: ShareClient) -> BackendHandle {
    let (cmd_tx, cmd_rx) = unbounded::<(RequestId, NetCmd)>();
    let (evt_tx, evt_rx) = unbounded::<(RequestId, NetEvent)>();

    thread::Builder::new()
        .name("sendinginfo-net".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .thread_name("sendinginfo-net-io")
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("failed to start network runtime: {}", err);
                    return;
                }
            };
            let in_flight = Arc::new(AtomicUsize::new(0));
            for (id, cmd) in cmd_rx.iter() {
                debug!(op = cmd.label(), request = id.0, "dispatching request");
                let client = client.clone();
                let evt_tx = evt_tx.clone();
                let in_flight = Arc::clone(&in_flight);
                in_flight.fetch_add(1, Ordering::SeqCst);
                runtime.spawn(async move {
                    let event = execute(&client, cmd).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    let _ = evt_tx.send((id, event));
                });
            }

            let abandoned = in_flight.load(Ordering::SeqCst);
            if abandoned > 0 {
                warn!(
                    abandoned = abandoned,
                    grace_ms = SHUTDOWN_GRACE.as_millis() as u64,
                    "command channel closed with requests in flight"
                );
            }
            runtime.shutdown_timeout(SHUTDOWN_GRACE);
            debug!("network worker stopped");
        })
        .expect("spawn network worker thread");

    BackendHandle { cmd_tx, evt_rx }
}
