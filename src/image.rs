use std::collections::HashMap;
use std::sync::Arc;

use bollard::models::{ImageInspect, ImageSummary};

use crate::engine::{self, Engine};
use crate::fmt;

/// One image as reported by the API: summary fields plus the detail block
/// obtained from inspect.
#[derive(Debug, serde::Serialize)]
pub struct ImageRecord {
    /// Truncated content digest, never carrying the `sha256:` prefix.
    pub id: String,
    /// `repo:tag` references; empty for dangling images.
    pub repo_tags: Vec<String>,
    pub size: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ImageDetail>,
}

#[derive(Debug, serde::Serialize)]
pub struct ImageDetail {
    pub parent_id: String,
    pub architecture: String,
    pub os: String,
    pub labels: HashMap<String, String>,
    /// Engine-reported usage counter, passed through as-is.
    pub container_count: i64,
}

#[derive(Clone)]
pub struct ImageService {
    engine: Arc<dyn Engine>,
}

impl ImageService {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self { engine }
    }

    /// Lists all images (dangling included) and enriches each with its
    /// inspect result.
    ///
    /// The list call and every per-image inspect run under their own 2 s
    /// budget, sequentially. Any inspect failure aborts the whole listing;
    /// partial results are never returned. Output preserves the engine's
    /// list order.
    ///
    /// # Errors
    ///
    /// [`engine::Error::Timeout`] or [`engine::Error::Unavailable`] if the
    /// list call fails, [`engine::Error::Inspect`] if any inspect fails
    /// after a successful list.
    pub async fn list(&self) -> engine::Result<Vec<ImageRecord>> {
        let summaries = engine::bounded("image list", self.engine.list_images()).await?;
        log::debug!("engine reported {} images", summaries.len());

        let mut records = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let inspect =
                engine::bounded("image inspect", self.engine.inspect_image(&summary.id))
                    .await
                    .map_err(|source| engine::Error::Inspect {
                        id: fmt::short_id(&summary.id),
                        source: Box::new(source),
                    })?;
            records.push(ImageRecord::from_engine(summary, inspect));
        }

        Ok(records)
    }
}

impl ImageRecord {
    fn from_engine(summary: ImageSummary, inspect: ImageInspect) -> Self {
        Self {
            id: fmt::short_id(&summary.id),
            repo_tags: summary.repo_tags,
            size: fmt::size_mb(summary.size),
            created_at: fmt::created_at(summary.created),
            detail: Some(ImageDetail {
                parent_id: inspect.parent.unwrap_or_default(),
                architecture: inspect.architecture.unwrap_or_default(),
                os: inspect.os.unwrap_or_default(),
                labels: inspect
                    .config
                    .and_then(|config| config.labels)
                    .unwrap_or_default(),
                container_count: summary.containers,
            }),
        }
    }
}
