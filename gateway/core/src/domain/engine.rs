// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Engine Wire Types
//!
//! Request/response values exchanged with the container engine over its local
//! socket, and the [`EngineTransport`] port the application layer talks to.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Defines the engine transport contract

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use thiserror::Error;

/// Content type used when a request body is present and none was given.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMethod {
    Get,
    Post,
}

impl EngineMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineMethod::Get => "GET",
            EngineMethod::Post => "POST",
        }
    }
}

impl fmt::Display for EngineMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request to the engine. Built fresh for every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRequest {
    pub path: String,
    pub method: EngineMethod,
    pub body: Option<Bytes>,
    pub content_type: Option<String>,
}

impl EngineRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: EngineMethod::Get,
            body: None,
            content_type: None,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: EngineMethod::Post,
            body: None,
            content_type: None,
        }
    }

    /// Attach a JSON body.
    pub fn with_json(mut self, value: &serde_json::Value) -> Self {
        self.body = Some(Bytes::from(value.to_string()));
        self.content_type = Some(DEFAULT_CONTENT_TYPE.to_string());
        self
    }

    /// Path with the query string removed, used for logs and metric labels.
    pub fn normalized_path(&self) -> &str {
        match self.path.split_once('?') {
            Some((path, _)) => path,
            None => &self.path,
        }
    }

    /// Content type to send, if the body is non-empty.
    pub fn effective_content_type(&self) -> Option<&str> {
        match &self.body {
            Some(body) if !body.is_empty() => Some(
                self.content_type
                    .as_deref()
                    .unwrap_or(DEFAULT_CONTENT_TYPE),
            ),
            _ => None,
        }
    }
}

/// The engine's reply. Fully read before the transport returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineResponse {
    pub status_code: u16,
    pub body: Bytes,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to connect to engine socket {socket}: {reason}")]
    Connect { socket: String, reason: String },

    #[error("Engine connection failed during {path}: {reason}")]
    Connection { path: String, reason: String },

    #[error("Engine did not respond to {path} within {seconds}s")]
    Timeout { path: String, seconds: u64 },

    #[error("Malformed engine request: {0}")]
    InvalidRequest(String),
}

/// Issues one request to the container engine.
///
/// Implementations open a fresh connection per call and never retry: engine
/// calls such as start/stop are not idempotent.
#[async_trait]
pub trait EngineTransport: Send + Sync {
    async fn send(&self, request: EngineRequest) -> Result<EngineResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_path_strips_query() {
        let request = EngineRequest::get("/containers/json?all=true");
        assert_eq!(request.normalized_path(), "/containers/json");

        let request = EngineRequest::get("/info");
        assert_eq!(request.normalized_path(), "/info");
    }

    #[test]
    fn test_content_type_only_for_non_empty_body() {
        let request = EngineRequest::post("/containers/prune");
        assert_eq!(request.effective_content_type(), None);

        let mut request = EngineRequest::post("/exec/abc/start");
        request.body = Some(Bytes::new());
        assert_eq!(request.effective_content_type(), None);

        let request = EngineRequest::post("/exec/abc/start")
            .with_json(&serde_json::json!({"Detach": false}));
        assert_eq!(request.effective_content_type(), Some("application/json"));
    }

    #[test]
    fn test_explicit_content_type_wins() {
        let request = EngineRequest {
            path: "/build".to_string(),
            method: EngineMethod::Post,
            body: Some(Bytes::from_static(b"raw")),
            content_type: Some("application/x-tar".to_string()),
        };
        assert_eq!(request.effective_content_type(), Some("application/x-tar"));
    }
}
