// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Exec Session Controller
//!
//! Runs a quick command inside a container with the engine's two-step exec
//! protocol: create an exec instance, then start it.
//!
//! ```text
//! Idle ──create──▶ Created(exec_id) ──start──▶ Started ──▶ Idle
//! ```
//!
//! A created session is an [`ExecSession`] value that `start` takes by value,
//! so a session id is used for exactly one start and a start cannot happen
//! without a fresh create. Sessions for the same container run one at a time.
//!
//! No timeout is applied to the command: exec-start returns when the command
//! inside the container exits.

use crate::domain::engine::{EngineRequest, EngineTransport, TransportError};
use crate::domain::operation::encode_segment;
use crate::domain::outcome::{translate, Outcome};
use crate::domain::quick_command::QuickCommand;
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Replaces each newline in command output.
pub const LINE_BREAK_MARKER: &str = "<br>";

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Quick command not found: {0}")]
    UnknownQuickCommand(String),

    #[error("Failed to create exec instance in container {container}: {reason}")]
    ExecCreateFailed { container: String, reason: String },

    /// The engine reported the container or exec instance as missing.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// An exec instance that has been created but not started.
#[derive(Debug)]
pub struct ExecSession {
    exec_id: String,
}

impl ExecSession {
    pub fn exec_id(&self) -> &str {
        &self.exec_id
    }
}

#[derive(Deserialize)]
struct ExecCreated {
    #[serde(rename = "Id")]
    id: Option<String>,
}

pub struct ExecSessionController {
    transport: Arc<dyn EngineTransport>,
    container_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ExecSessionController {
    pub fn new(transport: Arc<dyn EngineTransport>) -> Self {
        Self {
            transport,
            container_locks: DashMap::new(),
        }
    }

    /// Create and start one exec session, returning its output with newlines
    /// replaced by [`LINE_BREAK_MARKER`].
    pub async fn run_quick_command(
        &self,
        container_id: &str,
        command: &QuickCommand,
    ) -> Result<String, ExecError> {
        let lock = self
            .container_locks
            .entry(container_id.to_string())
            .or_default()
            .clone();

        let result = {
            let _guard = lock.lock().await;
            info!(
                container = %container_id,
                command = %command.id,
                busy_containers = self.busy_containers(),
                "Running quick command"
            );
            match self.create(container_id, &command.argv()).await {
                Ok(session) => self.start(session).await,
                Err(e) => Err(e),
            }
        };

        drop(lock);
        self.container_locks
            .remove_if(container_id, |_, lock| Arc::strong_count(lock) == 1);

        result.map(|output| format_output(&output))
    }

    /// Containers with an exec session queued or in flight.
    pub fn busy_containers(&self) -> usize {
        self.container_locks.len()
    }

    /// Idle → Created.
    pub async fn create(&self, container_id: &str, argv: &[String]) -> Result<ExecSession, ExecError> {
        let create_failed = |reason: String| ExecError::ExecCreateFailed {
            container: container_id.to_string(),
            reason,
        };

        let request = EngineRequest::post(format!("/containers/{}/exec", encode_segment(container_id)))
            .with_json(&json!({
                "AttachStdin": false,
                "AttachStdout": true,
                "AttachStderr": true,
                "Tty": true,
                "Cmd": argv,
            }));

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| create_failed(e.to_string()))?;

        let body = match translate(response.status_code, response.body) {
            Outcome::NotFound => return Err(ExecError::NotFound(container_id.to_string())),
            outcome => outcome.into_body(),
        };

        let exec_id = serde_json::from_slice::<ExecCreated>(&body)
            .ok()
            .and_then(|created| created.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                create_failed(format!(
                    "engine returned no exec id: {}",
                    String::from_utf8_lossy(&body).trim()
                ))
            })?;

        debug!(container = %container_id, exec_id = %exec_id, "Exec instance created");
        Ok(ExecSession { exec_id })
    }

    /// Created → Started → Idle. Consumes the session.
    pub async fn start(&self, session: ExecSession) -> Result<String, ExecError> {
        let request = EngineRequest::post(format!("/exec/{}/start", encode_segment(&session.exec_id)))
            .with_json(&json!({
                "Detach": false,
                "Tty": true,
            }));

        let response = self.transport.send(request).await?;

        // Anything the engine sends back besides "not found" is shown to the
        // caller as the command's output, error messages included.
        match translate(response.status_code, response.body) {
            Outcome::NotFound => Err(ExecError::NotFound(session.exec_id)),
            outcome => Ok(String::from_utf8_lossy(&outcome.into_body()).to_string()),
        }
    }
}

/// Rewrite line breaks for display. `\r\n` from a TTY counts as one break.
pub fn format_output(raw: &str) -> String {
    raw.replace("\r\n", "\n").replace('\n', LINE_BREAK_MARKER)
}
