// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Compose project lifecycle, driven through stub compose binaries.

#![cfg(unix)]

mod common;

use berth_gateway_core::application::ProjectLifecycleManager;
use berth_gateway_core::domain::gateway_config::GatewayConfig;
use berth_gateway_core::domain::project::ProjectError;
use berth_gateway_core::infrastructure::{ConfigStore, TokioCommandRunner};
use common::{write_script, RecordingRunner};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

struct Fixture {
    _root: TempDir,
    config: GatewayConfig,
}

impl Fixture {
    /// A projects directory holding `web.yml`, and a compose binary path
    /// that does not exist yet.
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let projects = root.path().join("compose");
        std::fs::create_dir(&projects).unwrap();
        std::fs::write(
            projects.join("web.yml"),
            "services:\n  web:\n    image: nginx:1.27\n",
        )
        .unwrap();

        let config = GatewayConfig {
            compose_binary_path: root.path().join("docker-compose"),
            projects_directory: projects,
            ..GatewayConfig::default()
        };
        Self { _root: root, config }
    }

    fn install_compose(&self, body: &str) {
        write_script(&self.config.compose_binary_path, body);
    }

    fn projects_dir(&self) -> &Path {
        &self.config.projects_directory
    }

    fn manager(&self) -> ProjectLifecycleManager {
        ProjectLifecycleManager::new(
            Arc::new(ConfigStore::in_memory(self.config.clone())),
            Arc::new(TokioCommandRunner::new()),
        )
    }

    fn recording_manager(&self, runner: Arc<RecordingRunner>) -> ProjectLifecycleManager {
        ProjectLifecycleManager::new(Arc::new(ConfigStore::in_memory(self.config.clone())), runner)
    }
}

#[tokio::test]
async fn test_up_returns_compose_stdout() {
    let fixture = Fixture::new();
    fixture.install_compose("echo \"$@\"\necho \"cwd=$(pwd)\"");

    let output = fixture.manager().apply_project_action("web", "up").await.unwrap();

    let mut lines = output.lines();
    assert_eq!(
        lines.next(),
        Some("--file web.yml --project-name web up --detach")
    );
    let cwd = lines.next().unwrap().trim_start_matches("cwd=").to_string();
    assert_eq!(
        Path::new(&cwd).canonicalize().unwrap(),
        fixture.projects_dir().canonicalize().unwrap()
    );
}

#[tokio::test]
async fn test_down_and_restart_pass_action_through() {
    let fixture = Fixture::new();
    fixture.install_compose("echo \"$@\"");
    let manager = fixture.manager();

    let down = manager.apply_project_action("web", "down").await.unwrap();
    let restart = manager.apply_project_action("web", "restart").await.unwrap();

    assert_eq!(down.trim(), "--file web.yml --project-name web down");
    assert_eq!(restart.trim(), "--file web.yml --project-name web restart");
}

#[tokio::test]
async fn test_nonzero_exit_returns_stderr() {
    let fixture = Fixture::new();
    fixture.install_compose("echo 'pulling web' \necho 'no such image: nginx:1.27' >&2\nexit 1");

    let result = fixture.manager().apply_project_action("web", "up").await;

    match result {
        Err(ProjectError::ActionFailed(stderr)) => {
            assert_eq!(stderr.trim(), "no such image: nginx:1.27")
        }
        other => panic!("expected ActionFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_compose_binary_runs_nothing() {
    let fixture = Fixture::new();
    let runner = RecordingRunner::new();

    let result = fixture
        .recording_manager(runner.clone())
        .apply_project_action("web", "up")
        .await;

    assert!(matches!(result, Err(ProjectError::ToolNotFound(_))));
    assert!(runner.invocations().is_empty());
}

#[tokio::test]
async fn test_missing_compose_file_is_checked_before_binary() {
    let fixture = Fixture::new();
    let runner = RecordingRunner::new();

    let result = fixture
        .recording_manager(runner.clone())
        .apply_project_action("db", "up")
        .await;

    match result {
        Err(ProjectError::ProjectNotFound(path)) => assert!(path.ends_with("db.yml")),
        other => panic!("expected ProjectNotFound, got {:?}", other),
    }
    assert!(runner.invocations().is_empty());
}

#[tokio::test]
async fn test_unsupported_action_is_checked_first() {
    let fixture = Fixture::new();
    let runner = RecordingRunner::new();

    let result = fixture
        .recording_manager(runner.clone())
        .apply_project_action("db", "destroy")
        .await;

    assert!(matches!(result, Err(ProjectError::UnsupportedAction(a)) if a == "destroy"));
    assert!(runner.invocations().is_empty());
}

#[tokio::test]
async fn test_names_with_separators_are_not_projects() {
    let fixture = Fixture::new();
    fixture.install_compose("echo ran");
    std::fs::write(fixture.projects_dir().parent().unwrap().join("outside.yml"), "").unwrap();

    let result = fixture.manager().apply_project_action("../outside", "up").await;

    assert!(matches!(result, Err(ProjectError::ProjectNotFound(_))));
}

#[tokio::test]
async fn test_list_projects_reads_compose_files() {
    let fixture = Fixture::new();
    std::fs::write(fixture.projects_dir().join("cache.yml"), "services:\n  redis: {}\n").unwrap();
    std::fs::write(fixture.projects_dir().join("notes.txt"), "ignored").unwrap();

    let projects = fixture.manager().list_projects().await.unwrap();

    let names: Vec<_> = projects.iter().map(|p| p.project.as_str()).collect();
    assert_eq!(names, vec!["cache", "web"]);
    assert_eq!(projects[1].filename, "web.yml");
    assert_eq!(
        projects[1].yaml,
        vec!["services:", "  web:", "    image: nginx:1.27"]
    );
}

#[tokio::test]
async fn test_list_projects_tolerates_odd_entries() {
    let fixture = Fixture::new();
    std::fs::write(fixture.projects_dir().join("legacy.yml"), b"name: caf\xe9\n").unwrap();
    std::fs::create_dir(fixture.projects_dir().join("archive.yml")).unwrap();

    let projects = fixture.manager().list_projects().await.unwrap();

    let names: Vec<_> = projects.iter().map(|p| p.project.as_str()).collect();
    assert_eq!(names, vec!["legacy", "web"]);
    assert_eq!(projects[0].yaml, vec!["name: caf\u{FFFD}"]);
}

#[tokio::test]
async fn test_list_projects_without_directory_is_empty() {
    let mut fixture = Fixture::new();
    fixture.config.projects_directory = fixture.projects_dir().join("missing");

    let projects = fixture.manager().list_projects().await.unwrap();

    assert!(projects.is_empty());
}
