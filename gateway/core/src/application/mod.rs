// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod dispatcher;
pub mod exec_session;
pub mod project_lifecycle;
pub mod repository_sync;
pub mod gateway;

// Re-export services for convenience
pub use dispatcher::CommandDispatcher;
pub use exec_session::{ExecError, ExecSession, ExecSessionController};
pub use gateway::Gateway;
pub use project_lifecycle::ProjectLifecycleManager;
pub use repository_sync::RepositorySyncController;
