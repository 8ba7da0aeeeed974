// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Engine Socket Transport
//!
//! Speaks HTTP/1.1 to the container engine over its Unix socket with a hyper
//! client connection. Implements the [`EngineTransport`] port.

use crate::domain::engine::{EngineMethod, EngineRequest, EngineResponse, EngineTransport, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::{CONTENT_TYPE, HOST};
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::net::UnixStream;
use tracing::debug;

/// Default bound on connecting and receiving the response head.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP/1.1 over the engine's Unix socket, one connection per request.
///
/// The timeout covers connecting and waiting for the status line. Reading the
/// body is not bounded: an attached exec streams output until the command in
/// the container exits.
#[derive(Debug, Clone)]
pub struct UnixSocketTransport {
    socket_path: PathBuf,
    response_timeout: Duration,
}

impl UnixSocketTransport {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    async fn send_head(&self, request: &EngineRequest) -> Result<Response<Incoming>, TransportError> {
        let stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| TransportError::Connect {
                socket: self.socket_path.display().to_string(),
                reason: e.to_string(),
            })?;

        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .map_err(|e| TransportError::Connection {
                path: request.path.clone(),
                reason: e.to_string(),
            })?;

        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!("Engine connection closed: {}", e);
            }
        });

        let method = match request.method {
            EngineMethod::Get => Method::GET,
            EngineMethod::Post => Method::POST,
        };

        let mut builder = Request::builder()
            .method(method)
            .uri(request.path.as_str())
            .header(HOST, "localhost");
        if let Some(content_type) = request.effective_content_type() {
            builder = builder.header(CONTENT_TYPE, content_type);
        }

        let http_request = builder
            .body(Full::new(request.body.clone().unwrap_or_default()))
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        sender
            .send_request(http_request)
            .await
            .map_err(|e| TransportError::Connection {
                path: request.path.clone(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl EngineTransport for UnixSocketTransport {
    async fn send(&self, request: EngineRequest) -> Result<EngineResponse, TransportError> {
        let response = tokio::time::timeout(self.response_timeout, self.send_head(&request))
            .await
            .map_err(|_| TransportError::Timeout {
                path: request.path.clone(),
                seconds: self.response_timeout.as_secs(),
            })??;

        let status_code = response.status().as_u16();
        let body: Bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| TransportError::Connection {
                path: request.path.clone(),
                reason: e.to_string(),
            })?
            .to_bytes();

        debug!(
            status = status_code,
            bytes = body.len(),
            "{} {}",
            request.method,
            request.normalized_path()
        );

        Ok(EngineResponse { status_code, body })
    }
}
