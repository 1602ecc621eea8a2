use std::sync::Arc;

use engine::Engine;

/// docmon: a stateless Docker host monitor exposing image and container
/// inventory over a small HTTP API.
///
/// Every request lists the resources, inspects each one under a fixed
/// per-call timeout, and maps the results into the external reporting
/// schema. Nothing is cached or persisted between requests; the only
/// process-wide state is the engine handle.
pub mod api;
pub mod container;
pub mod engine;
pub mod fmt;
pub mod image;

/// Runs the docmon service.
///
/// Connects to the Docker daemon from the ambient environment, builds the
/// image and container services over the shared handle, and serves the
/// reporting API. The listen address comes from `DOCMON_LISTEN_ADDR`
/// (default `0.0.0.0:8082`).
///
/// # Errors
///
/// Returns an error if the engine handle cannot be constructed; the process
/// must not serve traffic without one.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let engine: Arc<dyn Engine> = Arc::new(engine::DockerEngine::from_env().await?);
    log::debug!("Connected to container engine");

    let images = image::ImageService::new(Arc::clone(&engine));
    let containers = container::ContainerService::new(engine);

    let addr =
        std::env::var("DOCMON_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8082".to_owned());
    log::debug!("Listening on {addr}");
    let api = api::APIServer::new(images, containers).await;
    api.listen(addr).await;

    Ok(())
}
