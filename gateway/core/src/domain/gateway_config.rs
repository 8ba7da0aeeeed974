// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Gateway Configuration
//!
//! Persisted JSON settings for the gateway:
//! - Compose tool location and projects directory
//! - Git repository used to synchronize project definitions
//! - Listen port, engine socket and static asset directory (latched at startup)
//!
//! Services never hold on to a GatewayConfig between calls; they take a
//! snapshot from the ConfigStore at the start of each operation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV_VAR: &str = "BERTH_CONFIG_PATH";
pub const CONFIG_FILE_NAME: &str = "berth-config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse configuration {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Failed to write configuration {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Path of the external compose binary
    #[serde(default = "default_compose_binary")]
    pub compose_binary_path: PathBuf,

    /// Remote holding the project definitions (empty = not configured)
    #[serde(default, rename = "gitRepositoryURL")]
    pub git_repository_url: String,

    /// Disable TLS certificate verification for git invocations
    #[serde(default)]
    pub git_skip_tls_verify: bool,

    /// Directory containing `<project>.yml` compose files
    #[serde(default = "default_projects_directory")]
    pub projects_directory: PathBuf,

    /// HTTP listen port. Read once at startup.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Container engine socket. Read once at startup.
    #[serde(default = "default_engine_socket")]
    pub engine_socket: PathBuf,

    /// Browser client assets. Read once at startup.
    #[serde(default = "default_static_directory")]
    pub static_directory: PathBuf,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            compose_binary_path: default_compose_binary(),
            git_repository_url: String::new(),
            git_skip_tls_verify: false,
            projects_directory: default_projects_directory(),
            listen_port: default_listen_port(),
            engine_socket: default_engine_socket(),
            static_directory: default_static_directory(),
        }
    }
}

impl GatewayConfig {
    /// Configured repository URL, if any.
    pub fn repository_url(&self) -> Option<&str> {
        let url = self.git_repository_url.trim();
        if url.is_empty() {
            None
        } else {
            Some(url)
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Write as pretty JSON via a temporary file so readers never see a partial file.
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let write_err = |reason: String| ConfigError::Write {
            path: path.display().to_string(),
            reason,
        };

        let json = serde_json::to_string_pretty(self).map_err(|e| write_err(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| write_err(e.to_string()))?;
        std::fs::rename(&tmp, path).map_err(|e| write_err(e.to_string()))?;
        Ok(())
    }

    /// Copy of this configuration with the fields present in `patch` replaced.
    ///
    /// `patch` is a JSON object using the file's keys. Absent keys keep their
    /// current value; unknown keys are ignored.
    pub fn with_overrides(&self, patch: &serde_json::Value) -> Result<Self, ConfigError> {
        let fields = patch
            .as_object()
            .ok_or_else(|| ConfigError::Invalid("configuration must be a JSON object".to_string()))?;

        let mut merged = serde_json::to_value(self).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if let Some(current) = merged.as_object_mut() {
            for (key, value) in fields {
                current.insert(key.clone(), value.clone());
            }
        }

        serde_json::from_value(merged).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Discover configuration file using precedence order
    /// 1. BERTH_CONFIG_PATH environment variable
    /// 2. ./berth-config.json (working directory)
    /// 3. ~/.berth/config.json (user home)
    /// 4. /etc/berth/config.json
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from(format!("./{}", CONFIG_FILE_NAME));
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".berth").join("config.json");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/berth/config.json");
        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Where a configuration without an explicit or discovered path is saved.
    pub fn default_save_path() -> PathBuf {
        std::env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(format!("./{}", CONFIG_FILE_NAME)))
    }

    /// Load configuration with discovery, falling back to defaults.
    ///
    /// Returns the configuration and the path it is persisted to.
    pub fn load_or_default(cli_path: Option<PathBuf>) -> Result<(Self, PathBuf), ConfigError> {
        // Explicit path must exist and parse
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_json_file(&path)?;
            config.apply_env_overrides();
            return Ok((config, path));
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_json_file(&config_path)?;
            config.apply_env_overrides();
            Ok((config, config_path))
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok((config, Self::default_save_path()))
        }
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("BERTH_COMPOSE_BINARY") {
            tracing::info!("Environment override: BERTH_COMPOSE_BINARY={}", val);
            self.compose_binary_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("BERTH_GIT_SKIP_TLS_VERIFY") {
            match parse_flag(&val) {
                Some(flag) => {
                    tracing::info!("Environment override: BERTH_GIT_SKIP_TLS_VERIFY={}", flag);
                    self.git_skip_tls_verify = flag;
                }
                None => {
                    tracing::warn!(
                        "Invalid value for BERTH_GIT_SKIP_TLS_VERIFY: '{}'. Expected true/false. Ignoring.",
                        val
                    );
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.projects_directory.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("projectsDirectory cannot be empty".to_string()));
        }

        if self.compose_binary_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("composeBinaryPath cannot be empty".to_string()));
        }

        // The tool runs with the projects directory as its working directory.
        if !self.compose_binary_path.is_absolute() {
            return Err(ConfigError::Invalid(format!(
                "composeBinaryPath must be an absolute path, got {:?}",
                self.compose_binary_path
            )));
        }

        if self.listen_port == 0 {
            return Err(ConfigError::Invalid("listenPort must be between 1 and 65535".to_string()));
        }

        if let Some(repo) = self.repository_url() {
            validate_repository_url(repo)?;
        }

        Ok(())
    }
}

fn validate_repository_url(repo: &str) -> Result<(), ConfigError> {
    match url::Url::parse(repo) {
        Ok(parsed) => match parsed.scheme() {
            "https" | "http" | "ssh" | "git" | "file" => Ok(()),
            other => Err(ConfigError::Invalid(format!(
                "Unsupported gitRepositoryURL scheme '{}'",
                other
            ))),
        },
        // scp-like syntax: git@host:owner/repo.git
        Err(_) if repo.contains('@') && repo.contains(':') => Ok(()),
        Err(e) => Err(ConfigError::Invalid(format!(
            "gitRepositoryURL '{}' is not a valid URL: {}",
            repo, e
        ))),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn default_compose_binary() -> PathBuf {
    PathBuf::from("/usr/local/bin/docker-compose")
}

fn default_projects_directory() -> PathBuf {
    PathBuf::from("./compose")
}

fn default_listen_port() -> u16 {
    8088
}

fn default_engine_socket() -> PathBuf {
    PathBuf::from("/var/run/docker.sock")
}

fn default_static_directory() -> PathBuf {
    PathBuf::from("./static")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.listen_port, 8088);
        assert_eq!(config.engine_socket, PathBuf::from("/var/run/docker.sock"));
        assert!(config.repository_url().is_none());
        assert!(!config.git_skip_tls_verify);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_keys_and_partial_documents() {
        let config = GatewayConfig::from_json_str(
            r#"{
                "composeBinaryPath": "/usr/bin/docker-compose",
                "gitRepositoryURL": "https://git.example.com/ops/stacks.git",
                "gitSkipTlsVerify": true,
                "projectsDirectory": "/srv/compose"
            }"#,
        )
        .unwrap();

        assert_eq!(config.compose_binary_path, PathBuf::from("/usr/bin/docker-compose"));
        assert_eq!(config.repository_url(), Some("https://git.example.com/ops/stacks.git"));
        assert!(config.git_skip_tls_verify);
        assert_eq!(config.projects_directory, PathBuf::from("/srv/compose"));
        assert_eq!(config.listen_port, 8088);

        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("gitRepositoryURL").is_some());
        assert!(json.get("composeBinaryPath").is_some());
    }

    #[test]
    fn test_blank_repository_is_not_configured() {
        let config = GatewayConfig {
            git_repository_url: "   ".to_string(),
            ..Default::default()
        };
        assert!(config.repository_url().is_none());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = GatewayConfig {
            listen_port: 9000,
            git_repository_url: "git@github.com:ops/stacks.git".to_string(),
            ..Default::default()
        };

        config.to_json_file(&path).unwrap();
        let loaded = GatewayConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_validation() {
        let mut config = GatewayConfig::default();

        config.listen_port = 0;
        assert!(config.validate().is_err());
        config.listen_port = 8088;

        config.projects_directory = PathBuf::new();
        assert!(config.validate().is_err());
        config.projects_directory = PathBuf::from("/srv/compose");

        config.compose_binary_path = PathBuf::from("./bin/docker-compose");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(msg)) if msg.contains("absolute")));
        config.compose_binary_path = PathBuf::from("/usr/bin/docker-compose");

        config.git_repository_url = "ftp://example.com/repo".to_string();
        assert!(config.validate().is_err());

        config.git_repository_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.git_repository_url = "git@github.com:ops/stacks.git".to_string();
        assert!(config.validate().is_ok());

        config.git_repository_url = "https://github.com/ops/stacks.git".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_keep_absent_fields() {
        let current = GatewayConfig {
            compose_binary_path: PathBuf::from("/opt/compose/bin/docker-compose"),
            projects_directory: PathBuf::from("/srv/stacks"),
            ..GatewayConfig::default()
        };

        let merged = current
            .with_overrides(&serde_json::json!({ "gitSkipTlsVerify": true, "somethingElse": 1 }))
            .unwrap();

        assert!(merged.git_skip_tls_verify);
        assert_eq!(merged.projects_directory, PathBuf::from("/srv/stacks"));
        assert_eq!(merged.compose_binary_path, PathBuf::from("/opt/compose/bin/docker-compose"));

        assert!(current.with_overrides(&serde_json::json!(["not", "an", "object"])).is_err());
        assert!(current
            .with_overrides(&serde_json::json!({ "listenPort": "eighty" }))
            .is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("Yes"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
