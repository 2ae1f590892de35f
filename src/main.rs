//! Entry point for the writing desk.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments (an optional file to import on startup).
//! - Load user configuration from `conf/config.toml`.
//! - Open the desk session from durable storage.
//! - Serve the front end over line-delimited JSON on stdin/stdout.

use anyhow::{Context, Result, anyhow};
use mesa_escrita::config::load_config;
use mesa_escrita::session::{DeskCommand, DeskSession};
use std::env;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let import_path = parse_args()?;
    let config = load_config(Path::new("conf/config.toml"));
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        data_dir = %config.data_dir,
        level = %config.log_level,
        "Starting writing desk"
    );

    let session = Arc::new(Mutex::new(DeskSession::open(config)));

    if let Some(path) = import_path {
        let mut guard = session
            .lock()
            .map_err(|_| anyhow!("Desk session lock poisoned"))?;
        let event = guard.apply_command(DeskCommand::ImportProject {
            path: path.display().to_string(),
        });
        if let Some(notice) = event.notice {
            warn!(path = %path.display(), %notice, "Startup import did not complete");
        } else {
            info!(path = %path.display(), "Imported startup file");
        }
    }

    {
        let session = Arc::clone(&session);
        if let Err(err) = ctrlc::set_handler(move || {
            info!("Received Ctrl+C; flushing pending autosave");
            if let Ok(guard) = session.lock() {
                guard.flush();
            }
            std::process::exit(130);
        }) {
            warn!("Failed to install Ctrl+C signal handler: {err}");
        }
    }

    serve(&session).context("Failed while serving desk commands")
}

/// One JSON command per stdin line, one JSON event per stdout line. EOF or an
/// explicit shutdown command ends the session after a final flush.
fn serve(session: &Arc<Mutex<DeskSession>>) -> Result<()> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());
    let mut stdout = io::stdout();
    let mut line = String::new();

    loop {
        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            info!("Front end closed stdin; shutting down");
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let command: DeskCommand = match serde_json::from_str(trimmed) {
            Ok(command) => command,
            Err(err) => {
                warn!("Rejected malformed command: {err}");
                let payload = serde_json::json!({
                    "action": "desk_error",
                    "error": err.to_string(),
                });
                writeln!(stdout, "{payload}")?;
                stdout.flush()?;
                continue;
            }
        };

        let shutdown = matches!(command, DeskCommand::Shutdown);
        let event = {
            let mut guard = session
                .lock()
                .map_err(|_| anyhow!("Desk session lock poisoned"))?;
            guard.apply_command(command)
        };
        let payload = serde_json::to_string(&event)?;
        writeln!(stdout, "{payload}")?;
        stdout.flush()?;

        if shutdown {
            info!("Shutdown command received");
            break;
        }
    }

    if let Ok(guard) = session.lock() {
        guard.flush();
    }
    Ok(())
}

fn parse_args() -> Result<Option<PathBuf>> {
    let mut args = env::args().skip(1);
    let Some(path) = args.next() else {
        return Ok(None);
    };
    let path = PathBuf::from(path);
    if !path.exists() {
        return Err(anyhow!("File not found: {}", path.as_path().display()));
    }
    Ok(Some(path))
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
