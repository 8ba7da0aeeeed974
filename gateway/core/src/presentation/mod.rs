// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`berth-gateway-core`)
//!
//! HTTP surface that translates external requests into gateway calls.
//! **No business logic lives here**: handlers only pick the operation and map
//! results and errors to responses.
//!
//! | Module | Transport | Description |
//! |--------|-----------|-------------|
//! | [`api`] | HTTP (Axum) | Engine passthrough, exec, project and config endpoints plus static assets |

pub mod api;
