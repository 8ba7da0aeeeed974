// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Gateway
//!
//! Wires the dispatcher, exec controller, project manager and repository sync
//! controller around one engine transport, one process runner and one
//! configuration store. This is what the presentation layer holds.

use crate::application::dispatcher::CommandDispatcher;
use crate::application::exec_session::{ExecError, ExecSessionController};
use crate::application::project_lifecycle::ProjectLifecycleManager;
use crate::application::repository_sync::RepositorySyncController;
use crate::domain::engine::EngineTransport;
use crate::domain::process::CommandRunner;
use crate::domain::quick_command::QuickCommandCatalog;
use crate::infrastructure::config_store::ConfigStore;
use std::sync::Arc;

pub struct Gateway {
    pub dispatcher: CommandDispatcher,
    pub exec: ExecSessionController,
    pub projects: ProjectLifecycleManager,
    pub repository: RepositorySyncController,
    pub quick_commands: Arc<QuickCommandCatalog>,
    pub config: Arc<ConfigStore>,
}

impl Gateway {
    pub fn new(
        config: Arc<ConfigStore>,
        transport: Arc<dyn EngineTransport>,
        runner: Arc<dyn CommandRunner>,
        quick_commands: QuickCommandCatalog,
    ) -> Self {
        Self {
            dispatcher: CommandDispatcher::new(transport.clone()),
            exec: ExecSessionController::new(transport),
            projects: ProjectLifecycleManager::new(config.clone(), runner.clone()),
            repository: RepositorySyncController::new(config.clone(), runner),
            quick_commands: Arc::new(quick_commands),
            config,
        }
    }

    /// Run the quick command `command_id` in `container_id`.
    pub async fn exec_in_container(&self, container_id: &str, command_id: &str) -> Result<String, ExecError> {
        let command = self
            .quick_commands
            .get(command_id)
            .ok_or_else(|| ExecError::UnknownQuickCommand(command_id.to_string()))?;
        self.exec.run_quick_command(container_id, command).await
    }
}
