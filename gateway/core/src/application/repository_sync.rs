// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Repository Sync Controller
//!
//! Keeps the projects directory in step with the configured git remote:
//! clone on first use, pull afterwards.

use crate::domain::gateway_config::GatewayConfig;
use crate::domain::process::{CommandInvocation, CommandOutput, CommandRunner};
use crate::domain::repository_sync::{SyncError, SyncOutcome, REPOSITORY_MARKER, SKIP_TLS_ENV};
use crate::infrastructure::config_store::ConfigStore;
use std::sync::Arc;
use tracing::{info, warn};

pub const GIT_PROGRAM: &str = "git";

pub struct RepositorySyncController {
    config: Arc<ConfigStore>,
    runner: Arc<dyn CommandRunner>,
}

impl RepositorySyncController {
    pub fn new(config: Arc<ConfigStore>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    /// Clone into the projects directory, or pull if it already holds a clone.
    pub async fn sync_project_repository(&self) -> Result<SyncOutcome, SyncError> {
        let config = self.config.snapshot();
        // Checked before touching the filesystem.
        let url = config.repository_url().ok_or(SyncError::NotConfigured)?;

        let dir = &config.projects_directory;
        let is_dir = tokio::fs::metadata(dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(SyncError::DirectoryMissing(dir.display().to_string()));
        }

        let already_cloned = tokio::fs::try_exists(dir.join(REPOSITORY_MARKER))
            .await
            .unwrap_or(false);

        let result = if already_cloned {
            info!(dir = ?dir, "Pulling project definitions");
            self.run_git(self.git(&config, ["pull"])).await.map(|_| SyncOutcome::Pulled)
        } else {
            info!(dir = ?dir, repository = %url, "Cloning project definitions");
            match self.run_git(self.git(&config, ["clone", url, "."])).await {
                // Future pulls must fast-forward or fail.
                Ok(_) => self
                    .run_git(self.git(&config, ["config", "pull.ff", "only"]))
                    .await
                    .map(|_| SyncOutcome::Cloned),
                Err(e) => Err(e),
            }
        };

        let label = match &result {
            Ok(SyncOutcome::Cloned) => "cloned",
            Ok(SyncOutcome::Pulled) => "pulled",
            Err(_) => "failed",
        };
        metrics::counter!("berth_repository_syncs_total", "result" => label).increment(1);

        result
    }

    fn git<'a>(&self, config: &GatewayConfig, args: impl IntoIterator<Item = &'a str>) -> CommandInvocation {
        let invocation = CommandInvocation::new(GIT_PROGRAM, &config.projects_directory).args(args);
        if config.git_skip_tls_verify {
            invocation.env(SKIP_TLS_ENV, "true")
        } else {
            invocation
        }
    }

    async fn run_git(&self, invocation: CommandInvocation) -> Result<CommandOutput, SyncError> {
        let command = invocation.to_string();
        let output = self.runner.run(invocation).await?;
        if output.success() {
            Ok(output)
        } else {
            warn!(exit_code = ?output.exit_code, "{} failed", command);
            Err(SyncError::SyncFailed(output.stderr))
        }
    }
}
