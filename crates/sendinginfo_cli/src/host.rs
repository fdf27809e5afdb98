//! Runs the effects widgets ask for: network requests, file saves,
//! link opening and alerts.

use anyhow::{bail, Context, Result};
use sendinginfo_core::Url;
use sendinginfo_widgets::{Effect, Notice, PageSession, RequestState};
use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub(crate) fn log_timing(timing: bool, label: &str, duration: Duration) {
    if timing {
        eprintln!(
            "[timing] {}: {:.1} ms",
            label,
            duration.as_secs_f64() * 1000.0
        );
    }
}

/// `report.pdf` with `n = 2` becomes `report (2).pdf`.
pub(crate) fn numbered_name(file_name: &str, n: usize) -> String {
    if n == 0 {
        return file_name.to_string();
    }
    let path = Path::new(file_name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => format!(
            "{} ({}).{}",
            stem.to_string_lossy(),
            n,
            ext.to_string_lossy()
        ),
        _ => format!("{} ({})", file_name, n),
    }
}

/// Write `bytes` to `out`, a freshly created `path`. On failure `path` is
/// removed so no truncated file is left behind.
pub(crate) fn write_or_discard(path: &Path, mut out: impl Write, bytes: &[u8]) -> io::Result<()> {
    let written = out.write_all(bytes).and_then(|()| out.flush());
    drop(out);
    if let Err(err) = written {
        if let Err(cleanup) = std::fs::remove_file(path) {
            debug!(path = %path.display(), "could not remove partial file: {}", cleanup);
        }
        return Err(err);
    }
    Ok(())
}

/// Write `bytes` into `dir` under `file_name`, or the first free numbered
/// variant of it. Existing files are never touched.
pub(crate) fn save_unique(dir: &Path, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    for n in 0.. {
        let candidate = dir.join(numbered_name(file_name, n));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => {
                write_or_discard(&candidate, file, bytes)?;
                return Ok(candidate);
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        }
    }
    unreachable!("unbounded range")
}

/// Fail with the widget's notice when its last action did not succeed.
pub(crate) fn ensure_settled(
    action: &str,
    state: RequestState,
    notice: Option<&Notice>,
) -> Result<()> {
    if state.is_failure() {
        let message = notice.map(|n| n.text.as_str()).unwrap_or("unknown error");
        bail!("{} failed: {}", action, message);
    }
    Ok(())
}

pub(crate) struct Host {
    pub session: PageSession,
    pub timing: bool,
    pub out_dir: PathBuf,
    pub saved: Vec<PathBuf>,
    pub opened: Vec<Url>,
}

impl Host {
    pub fn new(session: PageSession, timing: bool, out_dir: PathBuf) -> Self {
        Self {
            session,
            timing,
            out_dir,
            saved: Vec::new(),
            opened: Vec::new(),
        }
    }

    /// Run `first` and everything it leads to. An alert stops the chain.
    pub fn perform(&mut self, first: Option<Effect>) -> Result<()> {
        let mut queue: VecDeque<Effect> = first.into_iter().collect();
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Send(cmd) => {
                    let label = cmd.label();
                    let started = Instant::now();
                    let follow_up = self.session.run(Effect::Send(cmd))?;
                    log_timing(self.timing, label, started.elapsed());
                    queue.extend(follow_up);
                }
                Effect::Alert(message) => bail!("{}", message),
                Effect::OpenInNewContext(url) => {
                    debug!(url = %url, "opening link");
                    self.opened.push(url);
                }
                Effect::SaveFile { file_name, bytes } => {
                    let path = save_unique(&self.out_dir, &file_name, &bytes).with_context(
                        || format!("failed to save {} into {}", file_name, self.out_dir.display()),
                    )?;
                    info!(path = %path.display(), bytes = bytes.len(), "download saved");
                    self.saved.push(path);
                }
            }
        }
        Ok(())
    }
}
