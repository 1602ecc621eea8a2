#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to connect to container engine: {0}")]
    Connect(#[source] bollard::errors::Error),
    #[error("engine call `{op}` timed out after {}s", super::CALL_TIMEOUT.as_secs())]
    Timeout { op: &'static str },
    #[error("engine call `{op}` failed: {source}")]
    Unavailable {
        op: &'static str,
        #[source]
        source: bollard::errors::Error,
    },
    #[error("inspect of `{id}` failed after listing succeeded: {source}")]
    Inspect {
        id: String,
        #[source]
        source: Box<Error>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
