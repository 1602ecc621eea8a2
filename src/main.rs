/// Entry point for the docmon Docker inventory API.
///
/// Connects to the Docker daemon configured in the ambient environment
/// (e.g. `DOCKER_HOST`) and serves the image and container inventory over
/// HTTP.
///
/// # Errors
///
/// Returns an error if startup fails (e.g., the daemon is unreachable or
/// misconfigured).
///
/// # Examples
///
/// ```bash
/// DOCKER_HOST=unix:///var/run/docker.sock cargo run
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    docmon::run().await
}
