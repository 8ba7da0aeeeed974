// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

#![allow(dead_code)]

use async_trait::async_trait;
use berth_gateway_core::domain::engine::{EngineRequest, EngineResponse, EngineTransport, TransportError};
use berth_gateway_core::domain::process::{CommandInvocation, CommandOutput, CommandRunner};
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

pub enum Scripted {
    Respond { status: u16, body: Bytes },
    Fail,
}

pub fn respond(status: u16, body: &str) -> Scripted {
    Scripted::Respond {
        status,
        body: Bytes::from(body.to_string()),
    }
}

/// Engine fake that records every request and replays scripted replies.
/// Once the script is exhausted it answers with `fallback`.
pub struct RecordingTransport {
    requests: Mutex<Vec<EngineRequest>>,
    script: Mutex<VecDeque<Scripted>>,
    fallback: (u16, Bytes),
}

impl RecordingTransport {
    pub fn scripted(script: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            script: Mutex::new(script.into()),
            fallback: (500, Bytes::from_static(b"{\"message\":\"unscripted request\"}")),
        })
    }

    pub fn always(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            script: Mutex::new(VecDeque::new()),
            fallback: (status, Bytes::from(body.to_string())),
        })
    }

    pub fn requests(&self) -> Vec<EngineRequest> {
        self.requests.lock().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.path.clone()).collect()
    }
}

#[async_trait]
impl EngineTransport for RecordingTransport {
    async fn send(&self, request: EngineRequest) -> Result<EngineResponse, TransportError> {
        let path = request.path.clone();
        self.requests.lock().push(request);
        // Give concurrent callers a chance to run between request and reply.
        tokio::task::yield_now().await;

        let next = self.script.lock().pop_front();
        match next {
            Some(Scripted::Respond { status, body }) => Ok(EngineResponse {
                status_code: status,
                body,
            }),
            Some(Scripted::Fail) => Err(TransportError::Connection {
                path,
                reason: "connection reset by peer".to_string(),
            }),
            None => Ok(EngineResponse {
                status_code: self.fallback.0,
                body: self.fallback.1.clone(),
            }),
        }
    }
}

pub fn output(exit_code: i32, stdout: &str, stderr: &str) -> CommandOutput {
    CommandOutput {
        exit_code: Some(exit_code),
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    }
}

/// Process fake that records invocations. Unscripted runs succeed silently.
#[derive(Default)]
pub struct RecordingRunner {
    invocations: Mutex<Vec<CommandInvocation>>,
    script: Mutex<VecDeque<CommandOutput>>,
}

impl RecordingRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn scripted(outputs: Vec<CommandOutput>) -> Arc<Self> {
        Arc::new(Self {
            invocations: Mutex::new(Vec::new()),
            script: Mutex::new(outputs.into()),
        })
    }

    pub fn invocations(&self) -> Vec<CommandInvocation> {
        self.invocations.lock().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.invocations.lock().iter().map(|i| i.to_string()).collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, invocation: CommandInvocation) -> std::io::Result<CommandOutput> {
        self.invocations.lock().push(invocation);
        Ok(self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| output(0, "", "")))
    }
}

/// Write an executable shell script.
#[cfg(unix)]
pub fn write_script(path: &std::path::Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = std::fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).unwrap();
}
