// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Command Dispatcher
//!
//! Turns an [`EngineOperation`] into one engine request and translates the
//! reply. Parameter validation happens before the transport is touched, so a
//! rejected operation has no side effect on the engine.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Engine request dispatch and outcome translation

use crate::domain::engine::EngineTransport;
use crate::domain::operation::{DispatchError, EngineOperation};
use crate::domain::outcome::{translate, Outcome};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

pub struct CommandDispatcher {
    transport: Arc<dyn EngineTransport>,
}

impl CommandDispatcher {
    pub fn new(transport: Arc<dyn EngineTransport>) -> Self {
        Self { transport }
    }

    /// Dispatch one operation on behalf of the caller at `origin`.
    pub async fn dispatch(
        &self,
        operation: EngineOperation,
        origin: Option<SocketAddr>,
    ) -> Result<Outcome, DispatchError> {
        let request = operation.to_request()?;
        let method = request.method;
        let path = request.normalized_path().to_string();
        let origin = origin
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "local".to_string());

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(origin = %origin, path = %path, "{} failed: {}", operation.name(), e);
                metrics::counter!(
                    "berth_engine_requests_total",
                    "method" => method.as_str(),
                    "status" => "transport_error"
                )
                .increment(1);
                return Err(e.into());
            }
        };

        info!(
            status = response.status_code,
            origin = %origin,
            path = %path,
            "{}",
            operation.name()
        );
        metrics::counter!(
            "berth_engine_requests_total",
            "method" => method.as_str(),
            "status" => response.status_code.to_string()
        )
        .increment(1);

        Ok(translate(response.status_code, response.body))
    }
}
