// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Compose Projects
//!
//! A project is a name mapped to `<projects_dir>/<name>.yml`. The file is
//! handed to the external compose tool untouched; its contents are never
//! interpreted here.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const COMPOSE_FILE_EXTENSION: &str = "yml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectAction {
    Up,
    Down,
    Restart,
}

impl ProjectAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectAction::Up => "up",
            ProjectAction::Down => "down",
            ProjectAction::Restart => "restart",
        }
    }

    /// Arguments appended after the global compose flags.
    pub fn compose_args(&self) -> Vec<String> {
        match self {
            // Detached so the call returns instead of following container logs.
            ProjectAction::Up => vec!["up".to_string(), "--detach".to_string()],
            other => vec![other.as_str().to_string()],
        }
    }
}

impl FromStr for ProjectAction {
    type Err = ProjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(ProjectAction::Up),
            "down" => Ok(ProjectAction::Down),
            "restart" => Ok(ProjectAction::Restart),
            other => Err(ProjectError::UnsupportedAction(other.to_string())),
        }
    }
}

/// File name of a project's compose file.
pub fn compose_file_name(project: &str) -> String {
    format!("{}.{}", project, COMPOSE_FILE_EXTENSION)
}

/// A name that stays a single file name once `.yml` is appended.
pub fn is_plain_name(project: &str) -> bool {
    !project.is_empty()
        && project != "."
        && project != ".."
        && !project.contains(['/', '\\', '\0'])
}

/// `<projects_dir>/<project>.yml`. The name is interpolated as given.
pub fn compose_file_path(projects_dir: &Path, project: &str) -> PathBuf {
    projects_dir.join(compose_file_name(project))
}

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("{0} is not a supported project action")]
    UnsupportedAction(String),

    #[error("Project definition not found: {0}")]
    ProjectNotFound(String),

    #[error("Compose tool not found at {0}")]
    ToolNotFound(String),

    #[error("{0}")]
    ActionFailed(String),

    #[error("Failed to run compose tool: {0}")]
    Spawn(std::io::Error),

    #[error("Failed to read projects directory: {0}")]
    Catalog(std::io::Error),
}

/// A compose file as listed by the project catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub project: String,
    pub filename: String,
    /// File contents split into lines, unparsed.
    pub yaml: Vec<String>,
}
