//! SSE Clock - Logging
//!
//! `tracing` subscriber setup: human-readable events on stderr and, unless
//! disabled, in a size-rotated file ([`RotatingFile`]).

mod rotating;

#[cfg(test)]
mod capture;

pub use rotating::*;

#[cfg(test)]
pub(crate) use capture::CapturedLogs;

use std::fs;
use std::path::PathBuf;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::core::{ClockError, ClockResult, DEFAULT_LOG_FILTER};

/// Where and how much to log.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Directory of the log file; `None` logs to stderr only.
    pub directory: Option<PathBuf>,

    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            directory: Some(std::env::temp_dir()),
            default_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

/// Install the global subscriber.
///
/// Returns the path of the log file, if one is written.
pub fn init(options: &LogOptions) -> ClockResult<Option<PathBuf>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&options.default_filter))
        .map_err(|err| ClockError::Config(format!("invalid log filter: {err}")))?;

    let file = match &options.directory {
        Some(directory) => {
            fs::create_dir_all(directory)?;
            Some(RotatingFile::new(directory))
        }
        None => None,
    };
    let path = file.as_ref().map(|file| file.path().to_path_buf());
    let file_layer = file.map(|file| fmt::layer().with_ansi(false).with_writer(file));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|err| ClockError::Config(format!("cannot install logger: {err}")))?;

    Ok(path)
}
