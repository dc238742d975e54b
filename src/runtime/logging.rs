use std::env;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "tether=info";

/// Resolve the log file from `TETHER_LOG_PATH` or the XDG state directory.
pub fn log_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("TETHER_LOG_PATH") {
        return Some(PathBuf::from(p));
    }
    let state_home = if let Some(xdg) = env::var_os("XDG_STATE_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("state"))
    };
    state_home.map(|d| d.join("tether").join("tether.log"))
}

fn open_log(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber.
///
/// The terminal belongs to the UI, so events go to a file; when it cannot be
/// opened they are dropped.
pub fn init() {
    let writer = match log_path().map(|p| open_log(&p)) {
        Some(Ok(file)) => BoxMakeWriter::new(Mutex::new(file)),
        _ => BoxMakeWriter::new(io::sink),
    };
    let filter =
        EnvFilter::try_from_env("TETHER_LOG").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer),
        )
        .with(filter)
        .try_init();
}
