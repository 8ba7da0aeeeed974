// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Project Lifecycle Manager
//!
//! Brings compose projects up, down or restarts them through the external
//! compose tool, and lists the compose files available in the projects
//! directory.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Precondition checks, compose invocation and result classification

use crate::domain::process::{CommandInvocation, CommandRunner};
use crate::domain::project::{
    compose_file_name, compose_file_path, is_plain_name, ProjectAction, ProjectError,
    ProjectSummary, COMPOSE_FILE_EXTENSION,
};
use crate::infrastructure::config_store::ConfigStore;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub struct ProjectLifecycleManager {
    config: Arc<ConfigStore>,
    runner: Arc<dyn CommandRunner>,
}

impl ProjectLifecycleManager {
    pub fn new(config: Arc<ConfigStore>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    /// Run `action` for `project`.
    ///
    /// Checks, in order: the action is known, the compose file exists, the
    /// compose binary exists. The first failure is returned without running
    /// anything. Exit status 0 returns stdout; anything else returns stderr as
    /// [`ProjectError::ActionFailed`].
    pub async fn apply_project_action(&self, project: &str, action: &str) -> Result<String, ProjectError> {
        let action: ProjectAction = action.parse()?;
        let config = self.config.snapshot();

        let compose_file = compose_file_path(&config.projects_directory, project);
        if !is_plain_name(project) || !path_exists(&compose_file).await {
            return Err(ProjectError::ProjectNotFound(compose_file.display().to_string()));
        }

        if !path_exists(&config.compose_binary_path).await {
            return Err(ProjectError::ToolNotFound(
                config.compose_binary_path.display().to_string(),
            ));
        }

        let invocation = CommandInvocation::new(&config.compose_binary_path, &config.projects_directory)
            .arg("--file")
            .arg(compose_file_name(project))
            .args(["--project-name", project])
            .args(action.compose_args());

        info!(project = %project, action = action.as_str(), "Running: {}", invocation);
        let output = self
            .runner
            .run(invocation)
            .await
            .map_err(ProjectError::Spawn)?;

        let result = if output.success() { "success" } else { "failure" };
        metrics::counter!(
            "berth_project_actions_total",
            "action" => action.as_str(),
            "result" => result
        )
        .increment(1);

        if output.success() {
            info!(project = %project, action = action.as_str(), "Project action completed");
            Ok(output.stdout)
        } else {
            warn!(
                project = %project,
                action = action.as_str(),
                exit_code = ?output.exit_code,
                "Project action failed"
            );
            Err(ProjectError::ActionFailed(output.stderr))
        }
    }

    /// Every `*.yml` file in the projects directory, sorted by file name.
    /// A missing directory is an empty catalog. Entries that are not regular
    /// files are skipped and invalid UTF-8 is replaced, not rejected.
    pub async fn list_projects(&self) -> Result<Vec<ProjectSummary>, ProjectError> {
        let config = self.config.snapshot();
        let dir = &config.projects_directory;

        if !path_exists(dir).await {
            warn!("Projects directory {:?} does not exist", dir);
            return Ok(Vec::new());
        }

        let mut entries = tokio::fs::read_dir(dir).await.map_err(ProjectError::Catalog)?;
        let mut projects = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(ProjectError::Catalog)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(COMPOSE_FILE_EXTENSION) {
                continue;
            }
            let (Some(stem), Some(filename)) = (
                path.file_stem().and_then(|s| s.to_str()),
                path.file_name().and_then(|s| s.to_str()),
            ) else {
                continue;
            };

            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => {}
                Ok(_) => continue,
                Err(e) => {
                    warn!("Skipping {:?}: {}", path, e);
                    continue;
                }
            }

            let raw = tokio::fs::read(&path).await.map_err(ProjectError::Catalog)?;
            let contents = String::from_utf8_lossy(&raw);
            projects.push(ProjectSummary {
                project: stem.to_string(),
                filename: filename.to_string(),
                yaml: contents.lines().map(str::to_string).collect(),
            });
        }

        projects.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(projects)
    }
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
