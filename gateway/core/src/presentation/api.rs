// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use crate::application::exec_session::ExecError;
use crate::application::gateway::Gateway;
use crate::domain::gateway_config::{ConfigError, GatewayConfig};
use crate::domain::operation::{DispatchError, EngineOperation};
use crate::domain::outcome::{Outcome, OutcomeToken};
use crate::domain::project::ProjectError;
use crate::domain::repository_sync::{SyncError, SyncOutcome};
use axum::{
    extract::{ConnectInfo, FromRequestParts, Path, Query, State},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub started_at: DateTime<Utc>,
    pub start_time: Instant,
}

/// Build the HTTP router. `static_dir` serves the browser client for any
/// path no API route claims.
pub fn app(gateway: Arc<Gateway>, static_dir: Option<PathBuf>) -> Router {
    let state = Arc::new(AppState {
        gateway,
        started_at: Utc::now(),
        start_time: Instant::now(),
    });

    let router = Router::new()
        .route("/health", get(health))
        .route("/containers", get(list_containers))
        .route("/containers/exec", get(list_quick_commands))
        .route("/containers/prune", post(prune_containers))
        .route("/containers/{id}/exec", post(exec_in_container))
        .route("/containers/{id}/exec/", post(exec_in_container))
        .route("/containers/{id}/{action}", post(container_action))
        .route("/images", get(list_images))
        .route("/images/pull/{image_tag}", post(pull_image))
        .route("/images/prune", post(prune_images))
        .route("/volumes", get(list_volumes))
        .route("/volumes/prune", post(prune_volumes))
        .route("/info", get(inspect_host))
        .route("/projects", get(list_projects))
        .route("/projects/sync", post(sync_repository))
        .route("/projects/{name}/{action}", post(project_action))
        .route("/config", get(get_config).post(replace_config))
        .with_state(state);

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}

/// Network origin of the caller, when the server was started with connect info.
pub struct CallerOrigin(pub Option<SocketAddr>);

impl<S> FromRequestParts<S> for CallerOrigin
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CallerOrigin(
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
        ))
    }
}

/// Body returned by operations that report an outcome token.
#[derive(Debug, Serialize)]
pub struct OutcomeBody {
    pub outcome: OutcomeToken,
    /// Engine body carried by an `unknown` outcome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<serde_json::Value>,
}

impl From<Outcome> for OutcomeBody {
    fn from(outcome: Outcome) -> Self {
        let outcome_token = outcome.token();
        let body = outcome.into_body();
        let engine = if body.is_empty() {
            None
        } else {
            Some(
                serde_json::from_slice(&body)
                    .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&body).to_string())),
            )
        };
        Self {
            outcome: outcome_token,
            engine,
        }
    }
}

pub enum ApiError {
    Dispatch(DispatchError),
    Exec(ExecError),
    Project(ProjectError),
    Config(ConfigError),
}

impl From<DispatchError> for ApiError {
    fn from(e: DispatchError) -> Self {
        ApiError::Dispatch(e)
    }
}

impl From<ExecError> for ApiError {
    fn from(e: ExecError) -> Self {
        ApiError::Exec(e)
    }
}

impl From<ProjectError> for ApiError {
    fn from(e: ProjectError) -> Self {
        ApiError::Project(e)
    }
}

impl From<ConfigError> for ApiError {
    fn from(e: ConfigError) -> Self {
        ApiError::Config(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Dispatch(e) => {
                let status = match e {
                    DispatchError::InvalidAction(_)
                    | DispatchError::UnsupportedTarget(_)
                    | DispatchError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
                    DispatchError::Transport(_) => StatusCode::BAD_GATEWAY,
                };
                (status, e.to_string())
            }
            ApiError::Exec(ExecError::UnknownQuickCommand(_) | ExecError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "not found".to_string())
            }
            ApiError::Exec(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            ApiError::Project(e) => {
                let status = match e {
                    ProjectError::UnsupportedAction(_) => StatusCode::NOT_ACCEPTABLE,
                    ProjectError::ProjectNotFound(_) => StatusCode::NOT_FOUND,
                    ProjectError::ToolNotFound(_)
                    | ProjectError::ActionFailed(_)
                    | ProjectError::Spawn(_)
                    | ProjectError::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string())
            }
            ApiError::Config(e) => {
                let status = match e {
                    ConfigError::Invalid(_) => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string())
            }
        };

        if status.is_server_error() {
            warn!(status = status.as_u16(), "{}", message);
        }
        (status, message).into_response()
    }
}

fn json_passthrough(body: Bytes) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn passthrough(
    state: &AppState,
    operation: EngineOperation,
    origin: Option<SocketAddr>,
) -> Result<Response, ApiError> {
    match state.gateway.dispatcher.dispatch(operation, origin).await? {
        Outcome::NotFound => Ok((StatusCode::NOT_FOUND, Json(OutcomeToken::NotFound)).into_response()),
        outcome => Ok(json_passthrough(outcome.into_body())),
    }
}

async fn outcome_of(
    state: &AppState,
    operation: EngineOperation,
    origin: Option<SocketAddr>,
) -> Result<Json<OutcomeBody>, ApiError> {
    let outcome = state.gateway.dispatcher.dispatch(operation, origin).await?;
    Ok(Json(outcome.into()))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "started_at": state.started_at.to_rfc3339(),
        "uptime_seconds": state.start_time.elapsed().as_secs(),
    }))
}

async fn list_containers(
    State(state): State<Arc<AppState>>,
    CallerOrigin(origin): CallerOrigin,
) -> Result<Response, ApiError> {
    passthrough(&state, EngineOperation::ListContainers, origin).await
}

async fn list_images(
    State(state): State<Arc<AppState>>,
    CallerOrigin(origin): CallerOrigin,
) -> Result<Response, ApiError> {
    passthrough(&state, EngineOperation::ListImages, origin).await
}

async fn list_volumes(
    State(state): State<Arc<AppState>>,
    CallerOrigin(origin): CallerOrigin,
) -> Result<Response, ApiError> {
    passthrough(&state, EngineOperation::ListVolumes, origin).await
}

async fn inspect_host(
    State(state): State<Arc<AppState>>,
    CallerOrigin(origin): CallerOrigin,
) -> Result<Response, ApiError> {
    passthrough(&state, EngineOperation::InspectHost, origin).await
}

async fn container_action(
    State(state): State<Arc<AppState>>,
    CallerOrigin(origin): CallerOrigin,
    Path((container_id, action)): Path<(String, String)>,
) -> Result<Json<OutcomeBody>, ApiError> {
    outcome_of(
        &state,
        EngineOperation::ContainerAction {
            container_id,
            action,
        },
        origin,
    )
    .await
}

async fn prune(state: &AppState, target: &str, origin: Option<SocketAddr>) -> Result<Json<OutcomeBody>, ApiError> {
    outcome_of(
        state,
        EngineOperation::Prune {
            target: target.to_string(),
        },
        origin,
    )
    .await
}

async fn prune_containers(
    State(state): State<Arc<AppState>>,
    CallerOrigin(origin): CallerOrigin,
) -> Result<Json<OutcomeBody>, ApiError> {
    prune(&state, "containers", origin).await
}

async fn prune_images(
    State(state): State<Arc<AppState>>,
    CallerOrigin(origin): CallerOrigin,
) -> Result<Json<OutcomeBody>, ApiError> {
    prune(&state, "images", origin).await
}

async fn prune_volumes(
    State(state): State<Arc<AppState>>,
    CallerOrigin(origin): CallerOrigin,
) -> Result<Json<OutcomeBody>, ApiError> {
    prune(&state, "volumes", origin).await
}

async fn pull_image(
    State(state): State<Arc<AppState>>,
    CallerOrigin(origin): CallerOrigin,
    Path(image_tag): Path<String>,
) -> Result<Response, ApiError> {
    passthrough(&state, EngineOperation::PullImage { reference: image_tag }, origin).await
}

#[derive(Deserialize)]
struct QuickCommandQuery {
    container: Option<String>,
}

/// The whole catalog, or only the commands whose filter matches `?container=`.
async fn list_quick_commands(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuickCommandQuery>,
) -> Response {
    let catalog = &state.gateway.quick_commands;
    match query.container {
        Some(name) => Json(catalog.for_container(&name).collect::<Vec<_>>()).into_response(),
        None => Json(catalog.all()).into_response(),
    }
}

#[derive(Deserialize)]
struct ExecForm {
    cmd: String,
}

async fn exec_in_container(
    State(state): State<Arc<AppState>>,
    Path(container_id): Path<String>,
    Form(form): Form<ExecForm>,
) -> Result<String, ApiError> {
    Ok(state.gateway.exec_in_container(&container_id, &form.cmd).await?)
}

async fn list_projects(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let projects = state.gateway.projects.list_projects().await?;
    Ok(Json(projects).into_response())
}

async fn project_action(
    State(state): State<Arc<AppState>>,
    Path((name, action)): Path<(String, String)>,
) -> Result<String, ApiError> {
    Ok(state.gateway.projects.apply_project_action(&name, &action).await?)
}

#[derive(Debug, Serialize)]
struct SyncBody {
    result: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

async fn sync_repository(State(state): State<Arc<AppState>>) -> Response {
    match state.gateway.repository.sync_project_repository().await {
        Ok(outcome) => {
            let result = match outcome {
                SyncOutcome::Cloned => "Cloned",
                SyncOutcome::Pulled => "Pulled",
            };
            Json(SyncBody { result, detail: None }).into_response()
        }
        Err(e) => {
            let status = match e {
                SyncError::NotConfigured => StatusCode::PRECONDITION_FAILED,
                SyncError::DirectoryMissing(_) => StatusCode::NOT_FOUND,
                SyncError::SyncFailed(_) | SyncError::Spawn(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            if status.is_server_error() {
                warn!("Repository sync failed: {}", e);
            }
            let body = SyncBody {
                result: e.token(),
                detail: Some(e.to_string()),
            };
            (status, Json(body)).into_response()
        }
    }
}

async fn get_config(State(state): State<Arc<AppState>>) -> Json<GatewayConfig> {
    Json(state.gateway.config.snapshot().as_ref().clone())
}

/// Fields missing from the body keep their current values.
async fn replace_config(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<GatewayConfig>, ApiError> {
    let config = state.gateway.config.snapshot().with_overrides(&patch)?;
    let applied = state.gateway.config.replace(config)?;
    Ok(Json(applied.as_ref().clone()))
}
