use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("invalid device status JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected device status shape: {0}")]
    Shape(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
