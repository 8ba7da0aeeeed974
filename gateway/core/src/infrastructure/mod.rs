// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod engine_socket;
pub mod process;
pub mod config_store;

pub use config_store::ConfigStore;
pub use engine_socket::UnixSocketTransport;
pub use process::TokioCommandRunner;
