// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Child process execution shared by the console adapters

use std::path::Path;
use thiserror::Error;
use tokio::process::Command;

/// Errors from running an external command
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("failed to launch {program}: {message}")]
    Launch { program: String, message: String },
    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Run `program` to completion and return its stdout
///
/// The child is killed if the returned future is dropped, so callers can bound
/// it with `tokio::time::timeout`.
pub(crate) async fn run(program: &Path, args: &[String]) -> Result<String, CommandError> {
    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| CommandError::Launch {
            program: program.display().to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(CommandError::Exit {
            program: program.display().to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
