//! Workload error types.

use kubesim_resource::ParseError;
use thiserror::Error;

/// Errors that can occur while loading workload manifests.
#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML manifest: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to render TOML manifest: {0}")]
    TomlRender(#[from] toml::ser::Error),

    #[error("invalid JSON manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("container {container}: {source}")]
    Resource {
        container: String,
        #[source]
        source: ParseError,
    },
}

pub type WorkloadResult<T> = Result<T, WorkloadError>;
