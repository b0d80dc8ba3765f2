use std::path::PathBuf;
use thiserror::Error;

/// Failures at the engine's fallible edges. Analysis itself never fails;
/// malformed records degrade to defaults.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("activity snapshot is not valid JSON: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("cyclic dependency between activities: {}", activity_ids.join(", "))]
    CyclicDependency { activity_ids: Vec<String> },
}

pub type Result<T> = std::result::Result<T, PlanError>;
