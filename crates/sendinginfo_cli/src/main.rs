//! Command-line host for the SendingInfo share widgets.

mod host;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use host::{ensure_settled, log_timing, Host};
use sendinginfo_core::config::SERVER_ENV;
use sendinginfo_core::text::normalize_optional_nonempty;
use sendinginfo_core::{ClientConfig, ShareClient};
use sendinginfo_widgets::{
    FeedbackIntent, PageElements, PageSession, PasteIntent, SelectedFile, TransferIntent,
};
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::prelude::*;

/// Extra time the host waits on the worker beyond the HTTP timeout itself.
const WORKER_GRACE: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "sendinfo", about = "SendingInfo paste and file transfer client", version)]
struct Cli {
    /// Server URL (can also be set via SENDINGINFO_SERVER env var)
    #[arg(short, long, env = SERVER_ENV)]
    server: Option<String>,

    /// Print the server's JSON payload instead of the rendered result
    #[arg(short, long, global = true)]
    json: bool,

    /// Print timing for API requests
    #[arg(long, global = true)]
    timing: bool,

    /// Request timeout in seconds (default: SENDINGINFO_TIMEOUT_SECS or 30)
    #[arg(short = 't', long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Share text as a paste (reads stdin when no file is given)
    Paste {
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Language tag used for highlighting
        #[arg(short, long)]
        lang: Option<String>,
        /// How many times the paste may be viewed
        #[arg(short, long)]
        max_views: Option<String>,
    },
    /// Print the formatted view link for a paste code
    View { code: String },
    /// Print the raw text link for a paste code
    Raw { code: String },
    /// Upload a file
    Upload {
        path: PathBuf,
        /// Allow more than one download (capped at 100)
        #[arg(short, long)]
        max_downloads: Option<String>,
        /// Accept the terms of service
        #[arg(long)]
        agree_terms: bool,
    },
    /// Download a file by code
    Download {
        code: String,
        /// Directory to save into (default: SENDINGINFO_DOWNLOAD_DIR or .)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
    /// Send feedback to the operators
    Feedback {
        message: String,
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Check that the server is up
    Health,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sendinginfo=warn,sendinfo=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Flag and environment values win over the configured defaults.
fn resolve_config(server: Option<String>, timeout: Option<u64>) -> ClientConfig {
    let mut config = ClientConfig::from_env();
    if let Some(server) = normalize_optional_nonempty(server.as_deref()) {
        config.server_url = server;
    }
    if let Some(secs) = timeout.filter(|secs| *secs > 0) {
        config.timeout_secs = secs;
    }
    config
}

fn read_paste_content(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_link(host: &mut Host, code: String, intent: PasteIntent, json: bool) -> Result<()> {
    let Some(paste) = host.session.page.paste.as_mut() else {
        anyhow::bail!("paste widget is not available");
    };
    paste.dispatch(PasteIntent::EditLookupCode(code));
    let effect = paste.dispatch(intent);
    host.perform(effect)?;
    for url in &host.opened {
        if json {
            print_json(&serde_json::json!({ "url": url.as_str() }))?;
        } else {
            println!("{}", url);
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        server,
        json,
        timing,
        timeout,
        command,
    } = cli;

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let config = resolve_config(server, timeout);
    let client = ShareClient::from_config(&config)?;
    let session = PageSession::start(
        client,
        &PageElements::full(),
        config.timeout() + WORKER_GRACE,
    );
    let mut host = Host::new(session, timing, config.download_dir.clone());

    match command {
        Commands::Completions { .. } => unreachable!("completions handled before client setup"),
        Commands::Paste {
            file,
            lang,
            max_views,
        } => {
            let content = read_paste_content(file)?;
            let Some(paste) = host.session.page.paste.as_mut() else {
                anyhow::bail!("paste widget is not available");
            };
            paste.dispatch(PasteIntent::EditContent(content));
            if let Some(lang) = lang {
                paste.dispatch(PasteIntent::EditLanguage(lang));
            }
            if let Some(max_views) = max_views {
                paste.dispatch(PasteIntent::EditMaxViews(max_views));
            }
            let effect = paste.dispatch(PasteIntent::Submit);
            host.perform(effect)?;

            let Some(paste) = host.session.page.paste.as_ref() else {
                anyhow::bail!("paste widget is not available");
            };
            ensure_settled("Paste", paste.state(), paste.notice())?;
            if let Some(share) = paste.share() {
                if json {
                    print_json(&share.created)?;
                } else {
                    println!("{}", share.render());
                }
            }
        }
        Commands::View { code } => open_link(&mut host, code, PasteIntent::OpenView, json)?,
        Commands::Raw { code } => open_link(&mut host, code, PasteIntent::OpenRaw, json)?,
        Commands::Upload {
            path,
            max_downloads,
            agree_terms,
        } => {
            let selected = SelectedFile::from_path(&path)
                .with_context(|| format!("cannot upload {}", path.display()))?;
            let Some(transfer) = host.session.page.transfer.as_mut() else {
                anyhow::bail!("transfer widget is not available");
            };
            transfer.dispatch(TransferIntent::PickFile(selected));
            if let Some(max_downloads) = max_downloads {
                transfer.dispatch(TransferIntent::SetMultiMode(true));
                transfer.dispatch(TransferIntent::EditMaxDownloads(max_downloads));
            }
            transfer.dispatch(TransferIntent::SetAgreedTerms(agree_terms));
            let effect = transfer.dispatch(TransferIntent::Upload);
            host.perform(effect)?;

            let Some(transfer) = host.session.page.transfer.as_ref() else {
                anyhow::bail!("transfer widget is not available");
            };
            ensure_settled("Upload", transfer.upload_state(), transfer.upload_notice())?;
            if let Some(share) = transfer.share() {
                if json {
                    print_json(&share.receipt)?;
                } else {
                    println!("{}", share.render());
                }
            }
        }
        Commands::Download { code, out_dir } => {
            if let Some(out_dir) = out_dir {
                host.out_dir = out_dir;
            }
            let Some(transfer) = host.session.page.transfer.as_mut() else {
                anyhow::bail!("transfer widget is not available");
            };
            transfer.dispatch(TransferIntent::EditDownloadCode(code));
            let effect = transfer.dispatch(TransferIntent::Download);
            host.perform(effect)?;

            let Some(transfer) = host.session.page.transfer.as_ref() else {
                anyhow::bail!("transfer widget is not available");
            };
            ensure_settled(
                "Download",
                transfer.download_state(),
                transfer.download_notice(),
            )?;
            for path in &host.saved {
                if json {
                    print_json(&serde_json::json!({ "saved_to": path }))?;
                } else {
                    if let Some(notice) = transfer.download_notice() {
                        println!("{}", notice.text);
                    }
                    println!("Saved to {}", path.display());
                }
            }
        }
        Commands::Feedback { message, name } => {
            let Some(feedback) = host.session.page.feedback.as_mut() else {
                anyhow::bail!("feedback widget is not available");
            };
            if let Some(name) = name {
                feedback.dispatch(FeedbackIntent::EditName(name));
            }
            feedback.dispatch(FeedbackIntent::EditMessage(message));
            let effect = feedback.dispatch(FeedbackIntent::Submit);
            host.perform(effect)?;

            let Some(feedback) = host.session.page.feedback.as_ref() else {
                anyhow::bail!("feedback widget is not available");
            };
            ensure_settled("Feedback", feedback.state(), feedback.notice())?;
            let text = feedback.notice().map(|n| n.text.as_str()).unwrap_or("");
            if json {
                print_json(&serde_json::json!({ "message": text }))?;
            } else {
                println!("{}", text);
            }
        }
        Commands::Health => {
            let started = Instant::now();
            host.session.check_health()?;
            log_timing(timing, "healthz", started.elapsed());
            match host.session.page.health() {
                Some(Ok(status)) if status.is_ok() => {
                    if json {
                        print_json(status)?;
                    } else {
                        let time = status
                            .server_time()
                            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                            .unwrap_or_else(|| status.time_utc.clone());
                        println!("{} (server time {})", status.status, time);
                    }
                }
                Some(Ok(status)) => anyhow::bail!("Health check failed: status {}", status.status),
                Some(Err(failure)) => anyhow::bail!(
                    "Health check failed: {}",
                    failure.describe("server unreachable")
                ),
                None => anyhow::bail!("Health check failed: no reply"),
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    run(Cli::parse())
}
