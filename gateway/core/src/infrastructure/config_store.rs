// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration Store
//!
//! Holds the current [`GatewayConfig`] as an immutable snapshot. Readers clone
//! the `Arc` and keep using it for the whole operation; writers validate,
//! persist and then swap the whole snapshot. Fields are never mutated in place.

use crate::domain::gateway_config::{ConfigError, GatewayConfig};
use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub struct ConfigStore {
    current: RwLock<Arc<GatewayConfig>>,
    /// `None` keeps replacements in memory only.
    persist_path: Option<PathBuf>,
    /// Serializes writers so the file and the snapshot never disagree.
    write_lock: Mutex<()>,
}

impl ConfigStore {
    pub fn new(config: GatewayConfig, persist_path: Option<PathBuf>) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
            persist_path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn in_memory(config: GatewayConfig) -> Self {
        Self::new(config, None)
    }

    pub fn snapshot(&self) -> Arc<GatewayConfig> {
        self.current.read().clone()
    }

    pub fn persist_path(&self) -> Option<&Path> {
        self.persist_path.as_deref()
    }

    /// Validate, persist, then swap. Latched fields keep their startup values.
    pub fn replace(&self, mut next: GatewayConfig) -> Result<Arc<GatewayConfig>, ConfigError> {
        next.validate()?;

        let _guard = self.write_lock.lock();
        let previous = self.snapshot();
        if next.listen_port != previous.listen_port
            || next.engine_socket != previous.engine_socket
            || next.static_directory != previous.static_directory
        {
            info!("listenPort, engineSocket and staticDirectory changes apply after restart");
        }

        if let Some(path) = &self.persist_path {
            next.to_json_file(path)?;
            info!("Configuration saved to {:?}", path);
        }

        // Latched values stay as they were for the running process.
        next.listen_port = previous.listen_port;
        next.engine_socket = previous.engine_socket.clone();
        next.static_directory = previous.static_directory.clone();

        let next = Arc::new(next);
        *self.current.write() = next.clone();
        Ok(next)
    }
}
