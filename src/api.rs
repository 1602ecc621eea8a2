use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::ToSocketAddrs;

use crate::container::ContainerService;
use crate::engine;
use crate::image::ImageService;

#[derive(Clone)]
struct Services {
    images: ImageService,
    containers: ContainerService,
}

fn error_response(err: engine::Error) -> Response {
    (
        axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": err.to_string() })),
    )
        .into_response()
}

async fn list_images(State(services): State<Services>) -> Response {
    match services.images.list().await {
        Ok(images) => (axum::http::StatusCode::OK, Json(images)).into_response(),
        Err(err) => {
            log::error!("failed to list images: {err}");
            error_response(err)
        }
    }
}

async fn list_containers(State(services): State<Services>) -> Response {
    match services.containers.list().await {
        Ok(containers) => (axum::http::StatusCode::OK, Json(containers)).into_response(),
        Err(err) => {
            log::error!("failed to list containers: {err}");
            error_response(err)
        }
    }
}

pub struct APIServer {
    router: axum::Router,
}

impl APIServer {
    pub async fn new(images: ImageService, containers: ContainerService) -> Self {
        let router = axum::Router::new()
            .route("/api/images", get(list_images))
            .route("/api/containers", get(list_containers))
            .with_state(Services { images, containers });
        Self { router }
    }

    pub async fn listen(self, addr: impl ToSocketAddrs) {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("TCP Listener bind");
        axum::serve(listener, self.router.into_make_service())
            .await
            .unwrap()
    }
}
