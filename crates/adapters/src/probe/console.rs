// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Console-command probe

use super::{ProbeAdapter, ProbeError};
use crate::process;
use async_trait::async_trait;
use std::path::PathBuf;
use vmgate_core::ConsoleConfig;

/// Probe backed by the emulator console and the device bridge
#[derive(Clone, Debug)]
pub struct ConsoleProbe {
    program: PathBuf,
    list_args: Vec<String>,
    adb: PathBuf,
    adb_args: Vec<String>,
}

impl ConsoleProbe {
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            program: config.program.clone(),
            list_args: config.list_args.clone(),
            adb: config.adb.clone(),
            adb_args: config.adb_args.clone(),
        }
    }
}

#[async_trait]
impl ProbeAdapter for ConsoleProbe {
    async fn list_resources(&self) -> Result<String, ProbeError> {
        Ok(process::run(&self.program, &self.list_args).await?)
    }

    async fn list_devices(&self) -> Result<String, ProbeError> {
        Ok(process::run(&self.adb, &self.adb_args).await?)
    }
}

#[cfg(test)]
#[path = "console_tests.rs"]
mod tests;
