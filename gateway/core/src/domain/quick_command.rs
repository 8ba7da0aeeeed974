// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Quick Commands
//!
//! Pre-defined commands that can be run inside containers whose name matches a
//! filter. The catalog is loaded once at startup and never changes afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickCommand {
    pub id: String,
    /// Substring matched against a container name.
    pub filter: String,
    pub cmd: String,
    #[serde(default)]
    pub tooltip: String,
}

impl QuickCommand {
    /// Split the command line on whitespace.
    ///
    /// Quoting is not interpreted: `sh -c "ls -l"` yields four tokens.
    pub fn argv(&self) -> Vec<String> {
        self.cmd.split_whitespace().map(str::to_string).collect()
    }

    pub fn applies_to(&self, container_name: &str) -> bool {
        container_name.contains(&self.filter)
    }
}

#[derive(Debug, Error)]
pub enum QuickCommandError {
    #[error("Failed to read quick commands from {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid quick command definitions in {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Duplicate quick command id: {0}")]
    DuplicateId(String),

    #[error("Quick command {0} has an empty command line")]
    EmptyCommand(String),
}

/// Read-only set of quick commands.
#[derive(Debug, Clone, Default)]
pub struct QuickCommandCatalog {
    commands: Vec<QuickCommand>,
}

impl QuickCommandCatalog {
    pub fn new(commands: Vec<QuickCommand>) -> Result<Self, QuickCommandError> {
        let mut seen = HashSet::new();
        for command in &commands {
            if !seen.insert(command.id.as_str()) {
                return Err(QuickCommandError::DuplicateId(command.id.clone()));
            }
            if command.argv().is_empty() {
                return Err(QuickCommandError::EmptyCommand(command.id.clone()));
            }
        }
        Ok(Self { commands })
    }

    /// Load a JSON array of definitions. A missing file is an empty catalog.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, QuickCommandError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!("Quick command file {:?} not found; no quick commands available", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| QuickCommandError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let commands: Vec<QuickCommand> =
            serde_json::from_str(&content).map_err(|e| QuickCommandError::Parse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let catalog = Self::new(commands)?;
        tracing::info!("Loaded {} quick command(s) from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&QuickCommand> {
        self.commands.iter().find(|c| c.id == id)
    }

    pub fn for_container<'a>(&'a self, container_name: &'a str) -> impl Iterator<Item = &'a QuickCommand> + 'a {
        self.commands.iter().filter(move |c| c.applies_to(container_name))
    }

    pub fn all(&self) -> &[QuickCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(id: &str, filter: &str, cmd: &str) -> QuickCommand {
        QuickCommand {
            id: id.to_string(),
            filter: filter.to_string(),
            cmd: cmd.to_string(),
            tooltip: String::new(),
        }
    }

    #[test]
    fn test_argv_is_whitespace_split() {
        let cmd = command("1", "db", "  pg_isready   -U postgres ");
        assert_eq!(cmd.argv(), vec!["pg_isready", "-U", "postgres"]);

        let quoted = command("2", "web", "sh -c \"ls -l\"");
        assert_eq!(quoted.argv(), vec!["sh", "-c", "\"ls", "-l\""]);
    }

    #[test]
    fn test_catalog_lookup_and_filter() {
        let catalog = QuickCommandCatalog::new(vec![
            command("a", "nginx", "nginx -t"),
            command("b", "postgres", "pg_isready"),
        ])
        .unwrap();

        assert_eq!(catalog.get("b").unwrap().cmd, "pg_isready");
        assert!(catalog.get("c").is_none());

        let matched: Vec<_> = catalog.for_container("/web-nginx-1").map(|c| c.id.as_str()).collect();
        assert_eq!(matched, vec!["a"]);
    }

    #[test]
    fn test_catalog_rejects_duplicates_and_empty_commands() {
        let err = QuickCommandCatalog::new(vec![command("a", "x", "ls"), command("a", "y", "ps")]);
        assert!(matches!(err, Err(QuickCommandError::DuplicateId(id)) if id == "a"));

        let err = QuickCommandCatalog::new(vec![command("a", "x", "   ")]);
        assert!(matches!(err, Err(QuickCommandError::EmptyCommand(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quick-commands.json");
        std::fs::write(
            &path,
            r#"[{"id":"uptime","filter":"","cmd":"uptime","tooltip":"Show uptime"}]"#,
        )
        .unwrap();

        let catalog = QuickCommandCatalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("uptime").unwrap().tooltip, "Show uptime");

        let missing = QuickCommandCatalog::load(dir.path().join("missing.json")).unwrap();
        assert!(missing.is_empty());
    }
}
