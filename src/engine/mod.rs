use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use bollard::Docker;
use bollard::container::{InspectContainerOptions, ListContainersOptions};
use bollard::errors::Error as DockerError;
use bollard::image::ListImagesOptions;
use bollard::models::{ContainerInspectResponse, ContainerSummary, ImageInspect, ImageSummary};

mod error;

pub use error::{Error, Result};

/// Budget for a single remote call to the engine, not for a whole request.
pub const CALL_TIMEOUT: Duration = Duration::from_secs(2);

/// The seam between the aggregators and the container engine.
///
/// Implementations return raw engine results; [`bounded`] applies the
/// per-call timeout and classifies failures at the call site. List calls
/// include every resource (dangling images, non-running containers).
#[async_trait]
pub trait Engine: Send + Sync {
    async fn list_images(&self) -> std::result::Result<Vec<ImageSummary>, DockerError>;
    async fn inspect_image(&self, id: &str) -> std::result::Result<ImageInspect, DockerError>;
    async fn list_containers(&self) -> std::result::Result<Vec<ContainerSummary>, DockerError>;
    async fn inspect_container(
        &self,
        id: &str,
    ) -> std::result::Result<ContainerInspectResponse, DockerError>;
}

/// Long-lived handle to the Docker daemon, built once at startup and shared
/// across all requests. The underlying client is safe for concurrent
/// independent calls, so no locking sits on top of it.
pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    /// Connects using the ambient environment (`DOCKER_HOST` and friends)
    /// and negotiates the API version with the daemon.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connect`] if the client cannot be constructed or the
    /// daemon is unreachable. The process must not serve traffic without a
    /// working handle, so callers treat this as fatal.
    pub async fn from_env() -> Result<Self> {
        let docker = Docker::connect_with_defaults().map_err(Error::Connect)?;
        let docker = docker.negotiate_version().await.map_err(Error::Connect)?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl Engine for DockerEngine {
    async fn list_images(&self) -> std::result::Result<Vec<ImageSummary>, DockerError> {
        self.docker
            .list_images(Some(ListImagesOptions::<String> {
                all: true,
                ..Default::default()
            }))
            .await
    }

    async fn inspect_image(&self, id: &str) -> std::result::Result<ImageInspect, DockerError> {
        self.docker.inspect_image(id).await
    }

    async fn list_containers(&self) -> std::result::Result<Vec<ContainerSummary>, DockerError> {
        self.docker
            .list_containers(Some(ListContainersOptions::<String> {
                all: true,
                ..Default::default()
            }))
            .await
    }

    async fn inspect_container(
        &self,
        id: &str,
    ) -> std::result::Result<ContainerInspectResponse, DockerError> {
        self.docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
    }
}

/// Runs one engine call under [`CALL_TIMEOUT`] and maps failures into the
/// error taxonomy. The budget is scoped to this call only; a timeout here
/// says nothing about calls already completed for other items.
pub(crate) async fn bounded<T, F>(op: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, DockerError>>,
{
    match tokio::time::timeout(CALL_TIMEOUT, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(Error::Unavailable { op, source }),
        Err(_) => Err(Error::Timeout { op }),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use bollard::errors::Error as DockerError;
    use bollard::models::{ContainerInspectResponse, ContainerSummary, ImageInspect, ImageSummary};

    use super::Engine;

    /// In-process engine fake: canned summaries and inspect responses, with
    /// optional failure and delay injection.
    #[derive(Default)]
    pub struct FakeEngine {
        pub images: Vec<ImageSummary>,
        pub image_inspects: HashMap<String, ImageInspect>,
        pub containers: Vec<ContainerSummary>,
        pub container_inspects: HashMap<String, ContainerInspectResponse>,
        /// Id whose image inspect fails with a server error.
        pub fail_image_inspect: Option<String>,
        /// Id whose container inspect fails with a server error.
        pub fail_container_inspect: Option<String>,
        /// Delay applied to both list calls before they resolve.
        pub list_delay: Option<Duration>,
    }

    fn server_error(message: &str) -> DockerError {
        DockerError::DockerResponseServerError {
            status_code: 500,
            message: message.to_owned(),
        }
    }

    #[async_trait]
    impl Engine for FakeEngine {
        async fn list_images(&self) -> std::result::Result<Vec<ImageSummary>, DockerError> {
            if let Some(delay) = self.list_delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.images.clone())
        }

        async fn inspect_image(&self, id: &str) -> std::result::Result<ImageInspect, DockerError> {
            if self.fail_image_inspect.as_deref() == Some(id) {
                return Err(server_error("image inspect failed"));
            }
            self.image_inspects
                .get(id)
                .cloned()
                .ok_or_else(|| server_error("no such image"))
        }

        async fn list_containers(
            &self,
        ) -> std::result::Result<Vec<ContainerSummary>, DockerError> {
            if let Some(delay) = self.list_delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.containers.clone())
        }

        async fn inspect_container(
            &self,
            id: &str,
        ) -> std::result::Result<ContainerInspectResponse, DockerError> {
            if self.fail_container_inspect.as_deref() == Some(id) {
                return Err(server_error("container inspect failed"));
            }
            self.container_inspects
                .get(id)
                .cloned()
                .ok_or_else(|| server_error("no such container"))
        }
    }
}
