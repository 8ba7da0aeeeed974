// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Repository Sync Types

use serde::Serialize;
use thiserror::Error;

/// Marker whose presence means the projects directory is already a clone.
pub const REPOSITORY_MARKER: &str = ".git";

/// Set in the child environment only, when TLS verification is disabled.
pub const SKIP_TLS_ENV: &str = "GIT_SSL_NO_VERIFY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncOutcome {
    Cloned,
    Pulled,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("No git repository URL is configured")]
    NotConfigured,

    #[error("Projects directory does not exist: {0}")]
    DirectoryMissing(String),

    #[error("{0}")]
    SyncFailed(String),

    #[error("Failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
}

impl SyncError {
    /// Result token reported to callers.
    pub fn token(&self) -> &'static str {
        match self {
            SyncError::NotConfigured => "NotConfigured",
            SyncError::DirectoryMissing(_) => "DirectoryMissing",
            SyncError::SyncFailed(_) | SyncError::Spawn(_) => "SyncFailed",
        }
    }
}
