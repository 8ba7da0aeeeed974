// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Subprocess Runner
//!
//! [`CommandRunner`] backed by `tokio::process`. Used for the compose tool
//! and git.

use crate::domain::process::{CommandInvocation, CommandOutput, CommandRunner};
use async_trait::async_trait;
use std::process::Stdio;
use tracing::debug;

/// Runs invocations with `tokio::process`, stdin closed, both streams captured.
#[derive(Debug, Clone, Default)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, invocation: CommandInvocation) -> std::io::Result<CommandOutput> {
        debug!(cwd = ?invocation.working_dir, "Running: {}", invocation);

        let mut cmd = tokio::process::Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }

        let output = cmd.output().await?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
