//! A thin wrapper over [`bollard`] that exposes only what the ingestor
//! needs: the running container set, per-container network attachments, and
//! the lifecycle event stream. Nothing above this module touches a bollard
//! type directly.

use std::collections::HashMap;
use std::pin::Pin;

use bollard::Docker;
use bollard::container::{InspectContainerOptions, ListContainersOptions};
use bollard::system::EventsOptions;
use futures::Stream;
use futures::StreamExt;
use tokio::sync::mpsc;

use dockhound_common::{DockhoundError, DockhoundResult};

/// A `'static`, boxed stream of Docker lifecycle events. Boxed so it can be
/// returned from a trait method ([`ContainerSource::events`]) without the
/// trait itself becoming generic over the stream type.
pub type EventStream = Pin<Box<dyn Stream<Item = DockhoundResult<DockerEvent>> + Send>>;

/// The subset of the Docker daemon API the ingestor needs: the running
/// container set, a single container's details, and the lifecycle event
/// stream. A trait so tests can drive the ingestor against a fake
/// implementation instead of a live daemon.
#[async_trait::async_trait]
pub trait ContainerSource: Send + Sync {
    /// List the IDs of all currently running containers.
    async fn list_running_ids(&self) -> DockhoundResult<Vec<String>>;

    /// Inspect a single container by ID.
    async fn inspect(&self, container_id: &str) -> DockhoundResult<ContainerInfo>;

    /// Subscribe to the daemon's `container` event stream.
    fn events(&self) -> EventStream;
}

/// A container's identity and network attachments, as reported by the
/// daemon at the moment it was inspected.
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    /// Full container ID.
    pub id: String,
    /// Container name, as Docker reports it (commonly `/name`).
    pub name: String,
    /// `(network_id, ip_address)` pairs. `ip_address` is `None` when the
    /// container has not yet been assigned an address on that network.
    pub networks: Vec<(String, Option<String>)>,
}

/// A Docker lifecycle event, reduced to the fields the ingestor matches on.
#[derive(Debug, Clone)]
pub struct DockerEvent {
    /// The event action, e.g. `"start"` or `"die"`.
    pub status: String,
    /// The ID of the container the event concerns.
    pub container_id: String,
}

const EVENT_CHANNEL_CAPACITY: usize = 64;

fn docker_error(error: bollard::errors::Error) -> DockhoundError {
    DockhoundError::Docker { message: error.to_string() }
}

/// A connection to the local Docker daemon.
pub struct DockerClient {
    docker: Docker,
}

impl DockerClient {
    /// Connect using the daemon's default socket, honoring `DOCKER_HOST`
    /// when the caller's environment sets it.
    ///
    /// # Errors
    ///
    /// Returns [`DockhoundError::Docker`] if the daemon socket cannot be
    /// reached.
    pub fn connect() -> DockhoundResult<Self> {
        let docker = Docker::connect_with_local_defaults().map_err(docker_error)?;
        Ok(Self { docker })
    }

    /// List the IDs of all currently running containers.
    ///
    /// # Errors
    ///
    /// Returns [`DockhoundError::Docker`] if the daemon request fails.
    pub async fn list_running_ids(&self) -> DockhoundResult<Vec<String>> {
        let options = ListContainersOptions::<String> { all: false, ..Default::default() };
        let containers = self.docker.list_containers(Some(options)).await.map_err(docker_error)?;
        Ok(containers.into_iter().filter_map(|c| c.id).collect())
    }

    /// Inspect a single container by ID.
    ///
    /// # Errors
    ///
    /// Returns [`DockhoundError::Docker`] if the container no longer exists
    /// or the daemon request fails.
    pub async fn inspect(&self, container_id: &str) -> DockhoundResult<ContainerInfo> {
        let details = self
            .docker
            .inspect_container(container_id, None::<InspectContainerOptions>)
            .await
            .map_err(docker_error)?;

        let id = details.id.unwrap_or_else(|| container_id.to_owned());
        let name = details.name.unwrap_or_default();
        let networks = details
            .network_settings
            .and_then(|settings| settings.networks)
            .map(|networks| {
                networks.into_iter().map(|(network_id, endpoint)| (network_id, endpoint.ip_address)).collect()
            })
            .unwrap_or_default();

        Ok(ContainerInfo { id, name, networks })
    }

    /// Subscribe to the daemon's `container` event stream.
    ///
    /// A background task owns the connection clone and the daemon's own
    /// borrowed stream, forwarding decoded events over a channel; the
    /// returned stream just drains that channel, so it is `'static` and
    /// outlives `self` even after this client is moved elsewhere.
    pub fn events(&self) -> EventStream {
        let docker = self.docker.clone();
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let mut filters = HashMap::new();
            filters.insert("type".to_owned(), vec!["container".to_owned()]);
            let options = EventsOptions::<String> { filters, ..Default::default() };

            let mut inner = docker.events(Some(options));
            while let Some(event) = inner.next().await {
                let mapped = event.map_err(docker_error).map(|message| DockerEvent {
                    status: message.action.unwrap_or_default(),
                    container_id: message.actor.and_then(|actor| actor.id).unwrap_or_default(),
                });
                if tx.send(mapped).await.is_err() {
                    break;
                }
            }
        });

        Box::pin(futures::stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|item| (item, rx)) }))
    }
}

#[async_trait::async_trait]
impl ContainerSource for DockerClient {
    async fn list_running_ids(&self) -> DockhoundResult<Vec<String>> {
        self.list_running_ids().await
    }

    async fn inspect(&self, container_id: &str) -> DockhoundResult<ContainerInfo> {
        self.inspect(container_id).await
    }

    fn events(&self) -> EventStream {
        self.events()
    }
}
