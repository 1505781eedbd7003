// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide tracing setup

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Directive used when `RUST_LOG` is unset or unparseable
pub const DEFAULT_FILTER: &str = "info";

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("log path has no file name: {0}")]
    InvalidPath(PathBuf),
    #[error("failed to create log directory {0}: {1}")]
    CreateDir(PathBuf, #[source] std::io::Error),
    #[error("a global subscriber is already installed")]
    AlreadyInstalled,
}

/// Build the filter from an explicit directive string, falling back to `default`
pub fn filter_from(directives: Option<&str>, default: &str) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

/// Split a log file path into the directory and file name the appender wants
fn split_log_path(path: &Path) -> Result<(PathBuf, PathBuf), LoggingError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::InvalidPath(path.to_path_buf()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, PathBuf::from(file_name)))
}

/// Install the global subscriber
///
/// Filter comes from `RUST_LOG`, defaulting to [`DEFAULT_FILTER`]. File output
/// is written on a background thread; keep the returned guard alive until
/// exit or buffered lines are lost.
pub fn init(target: &LogTarget) -> Result<Option<WorkerGuard>, LoggingError> {
    let env = std::env::var("RUST_LOG").ok();
    let filter = filter_from(env.as_deref(), DEFAULT_FILTER);

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init()
                .map_err(|_| LoggingError::AlreadyInstalled)?;
            Ok(None)
        }
        LogTarget::File(path) => {
            let (dir, file_name) = split_log_path(path)?;
            std::fs::create_dir_all(&dir).map_err(|e| LoggingError::CreateDir(dir.clone(), e))?;

            let appender = tracing_appender::rolling::never(&dir, &file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
                .try_init()
                .map_err(|_| LoggingError::AlreadyInstalled)?;
            Ok(Some(guard))
        }
    }
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
