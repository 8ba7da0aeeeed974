// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Berth gateway core
//!
//! Container control gateway for a single host: forwards requests to the
//! container engine over its Unix socket, runs quick commands through exec
//! sessions, and drives compose projects and their git-backed definitions.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain types, application services, infrastructure adapters and the HTTP surface

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
