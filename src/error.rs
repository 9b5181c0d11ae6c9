use std::path::PathBuf;

use thiserror::Error;

/// The result type used across the training pipeline.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Fatal pipeline errors.
///
/// There is no local recovery anywhere in the pipeline: every variant
/// propagates to the top level and terminates the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode image {path:?}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("class directory {0:?} does not name a digit between 0 and 9")]
    InvalidLabel(String),

    #[error("no labeled images found under {0:?}")]
    EmptyDataset(PathBuf),

    #[error("hold-out fraction {0} must lie strictly between 0 and 1")]
    InvalidSplitFraction(f64),

    #[error("failed to load config {path:?}: {source}")]
    Config {
        path: PathBuf,
        source: burn::config::ConfigError,
    },

    #[error("failed to record model artifact {path:?}: {source}")]
    Record {
        path: PathBuf,
        source: burn::record::RecorderError,
    },
}
