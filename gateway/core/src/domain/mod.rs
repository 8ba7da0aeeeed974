// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain types for the container control gateway.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Value types, validation rules and the ports implemented by infrastructure

pub mod engine;
pub mod outcome;
pub mod operation;
pub mod quick_command;
pub mod project;
pub mod process;
pub mod repository_sync;
pub mod gateway_config;
