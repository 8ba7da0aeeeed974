// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Engine Operations
//!
//! High-level intents accepted by the command dispatcher and the pure mapping
//! from an intent to the engine request that carries it out. Caller supplied
//! enum values arrive as raw strings and are validated here, before any I/O.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Request construction and parameter validation

use crate::domain::engine::{EngineRequest, TransportError};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Platform requested for every image pull. Gateway policy, not configurable.
pub const PULL_PLATFORM: &str = "arm";

/// Registry host requested for every image pull. Gateway policy, not configurable.
pub const PULL_REGISTRY: &str = "hub.docker.com";

/// Characters escaped when a caller value becomes a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'?')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub(crate) fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{0} is not recognized.")]
    InvalidAction(String),

    #[error("{0} is not a supported prune target.")]
    UnsupportedTarget(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerAction {
    Start,
    Stop,
    Restart,
}

impl ContainerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerAction::Start => "start",
            ContainerAction::Stop => "stop",
            ContainerAction::Restart => "restart",
        }
    }
}

impl FromStr for ContainerAction {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(ContainerAction::Start),
            "stop" => Ok(ContainerAction::Stop),
            "restart" => Ok(ContainerAction::Restart),
            other => Err(DispatchError::InvalidAction(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneTarget {
    Containers,
    Images,
    Volumes,
}

impl PruneTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            PruneTarget::Containers => "containers",
            PruneTarget::Images => "images",
            PruneTarget::Volumes => "volumes",
        }
    }
}

impl FromStr for PruneTarget {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "containers" => Ok(PruneTarget::Containers),
            "images" => Ok(PruneTarget::Images),
            "volumes" => Ok(PruneTarget::Volumes),
            other => Err(DispatchError::UnsupportedTarget(other.to_string())),
        }
    }
}

/// An image reference in `name:tag` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub name: String,
    pub tag: String,
}

impl FromStr for ImageReference {
    type Err = DispatchError;

    /// Splits on the last `:`. A colon that belongs to a registry port
    /// (`host:5000/app`) leaves a tag containing `/`, which is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, tag) = s.rsplit_once(':').ok_or_else(|| {
            DispatchError::InvalidArgument(format!("'{}' is not in name:tag format", s))
        })?;

        if name.is_empty() || tag.is_empty() || tag.contains('/') {
            return Err(DispatchError::InvalidArgument(format!(
                "'{}' is not in name:tag format",
                s
            )));
        }

        Ok(Self {
            name: name.to_string(),
            tag: tag.to_string(),
        })
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.tag)
    }
}

/// A high-level intent. Parameters are kept as the caller sent them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOperation {
    ListContainers,
    ListImages,
    ListVolumes,
    InspectHost,
    ContainerAction { container_id: String, action: String },
    Prune { target: String },
    PullImage { reference: String },
}

impl EngineOperation {
    pub fn name(&self) -> &'static str {
        match self {
            EngineOperation::ListContainers => "list-containers",
            EngineOperation::ListImages => "list-images",
            EngineOperation::ListVolumes => "list-volumes",
            EngineOperation::InspectHost => "inspect-host",
            EngineOperation::ContainerAction { .. } => "container-action",
            EngineOperation::Prune { .. } => "prune",
            EngineOperation::PullImage { .. } => "pull-image",
        }
    }

    /// Validate parameters and build the engine request.
    pub fn to_request(&self) -> Result<EngineRequest, DispatchError> {
        match self {
            // The engine hides stopped containers and intermediate images by default.
            EngineOperation::ListContainers => Ok(EngineRequest::get("/containers/json?all=true")),
            EngineOperation::ListImages => Ok(EngineRequest::get("/images/json?all=true")),
            EngineOperation::ListVolumes => Ok(EngineRequest::get("/volumes")),
            EngineOperation::InspectHost => Ok(EngineRequest::get("/info")),
            EngineOperation::ContainerAction {
                container_id,
                action,
            } => {
                let action: ContainerAction = action.parse()?;
                if container_id.is_empty() {
                    return Err(DispatchError::InvalidArgument(
                        "container id cannot be empty".to_string(),
                    ));
                }
                Ok(EngineRequest::post(format!(
                    "/containers/{}/{}",
                    encode_segment(container_id),
                    action.as_str()
                )))
            }
            EngineOperation::Prune { target } => {
                let target: PruneTarget = target.parse()?;
                Ok(EngineRequest::post(format!("/{}/prune", target.as_str())))
            }
            EngineOperation::PullImage { reference } => {
                let image: ImageReference = reference.parse()?;
                let query = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("fromImage", &image.name)
                    .append_pair("platform", PULL_PLATFORM)
                    .append_pair("repo", PULL_REGISTRY)
                    .append_pair("tag", &image.tag)
                    .finish();
                Ok(EngineRequest::post(format!("/images/create?{}", query)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::engine::EngineMethod;

    #[test]
    fn test_list_operations_include_everything() {
        let request = EngineOperation::ListContainers.to_request().unwrap();
        assert_eq!(request.method, EngineMethod::Get);
        assert_eq!(request.path, "/containers/json?all=true");

        let request = EngineOperation::ListImages.to_request().unwrap();
        assert_eq!(request.path, "/images/json?all=true");

        assert_eq!(EngineOperation::ListVolumes.to_request().unwrap().path, "/volumes");
        assert_eq!(EngineOperation::InspectHost.to_request().unwrap().path, "/info");
    }

    #[test]
    fn test_container_action_paths() {
        for action in ["start", "stop", "restart"] {
            let op = EngineOperation::ContainerAction {
                container_id: "4f2a".to_string(),
                action: action.to_string(),
            };
            let request = op.to_request().unwrap();
            assert_eq!(request.method, EngineMethod::Post);
            assert_eq!(request.path, format!("/containers/4f2a/{}", action));
            assert!(request.body.is_none());
        }
    }

    #[test]
    fn test_container_action_rejects_unknown_action() {
        let op = EngineOperation::ContainerAction {
            container_id: "4f2a".to_string(),
            action: "delete".to_string(),
        };
        match op.to_request() {
            Err(DispatchError::InvalidAction(action)) => assert_eq!(action, "delete"),
            other => panic!("expected InvalidAction, got {:?}", other),
        }
    }

    #[test]
    fn test_container_id_cannot_escape_path() {
        let op = EngineOperation::ContainerAction {
            container_id: "../../images/x?force=1".to_string(),
            action: "stop".to_string(),
        };
        let request = op.to_request().unwrap();
        assert_eq!(request.path, "/containers/..%2F..%2Fimages%2Fx%3Fforce=1/stop");
    }

    #[test]
    fn test_prune_targets() {
        for target in ["containers", "images", "volumes"] {
            let request = EngineOperation::Prune {
                target: target.to_string(),
            }
            .to_request()
            .unwrap();
            assert_eq!(request.path, format!("/{}/prune", target));
            assert_eq!(request.method, EngineMethod::Post);
        }

        let err = EngineOperation::Prune {
            target: "networks".to_string(),
        }
        .to_request()
        .unwrap_err();
        assert!(matches!(err, DispatchError::UnsupportedTarget(t) if t == "networks"));
    }

    #[test]
    fn test_pull_image_request() {
        let request = EngineOperation::PullImage {
            reference: "busybox:1.36".to_string(),
        }
        .to_request()
        .unwrap();
        assert_eq!(request.method, EngineMethod::Post);
        assert!(request.path.starts_with("/images/create?"));
        assert!(request.path.contains("fromImage=busybox"));
        assert!(request.path.contains("tag=1.36"));
        assert!(request.path.contains("platform=arm"));
        assert!(request.path.contains("repo=hub.docker.com"));
    }

    #[test]
    fn test_image_reference_parsing() {
        let image: ImageReference = "library/nginx:1.25-alpine".parse().unwrap();
        assert_eq!(image.name, "library/nginx");
        assert_eq!(image.tag, "1.25-alpine");
        assert_eq!(image.to_string(), "library/nginx:1.25-alpine");

        assert!("busybox".parse::<ImageReference>().is_err());
        assert!(":latest".parse::<ImageReference>().is_err());
        assert!("busybox:".parse::<ImageReference>().is_err());
        assert!("registry:5000/app".parse::<ImageReference>().is_err());
    }
}
