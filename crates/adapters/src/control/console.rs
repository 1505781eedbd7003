// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Console-command control

use super::{ControlAdapter, ControlError};
use crate::process;
use async_trait::async_trait;
use std::path::PathBuf;
use vmgate_core::ConsoleConfig;

/// Starts and stops resources through the emulator console
#[derive(Clone, Debug)]
pub struct ConsoleControl {
    program: PathBuf,
    start_args: Vec<String>,
    stop_args: Vec<String>,
}

impl ConsoleControl {
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            program: config.program.clone(),
            start_args: config.start_args.clone(),
            stop_args: config.stop_args.clone(),
        }
    }
}

fn with_name(args: &[String], name: &str) -> Vec<String> {
    let mut args = args.to_vec();
    args.push(name.to_string());
    args
}

#[async_trait]
impl ControlAdapter for ConsoleControl {
    async fn start(&self, name: &str) -> Result<(), ControlError> {
        process::run(&self.program, &with_name(&self.start_args, name)).await?;
        Ok(())
    }

    async fn stop(&self, name: &str) -> Result<(), ControlError> {
        process::run(&self.program, &with_name(&self.stop_args, name)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "console_tests.rs"]
mod tests;
