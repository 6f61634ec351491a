use comment_attach::AttachError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiagramError>;

#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Duplicate node id: {0}")]
    DuplicateId(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid diagram: {0}")]
    Invalid(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Attach(#[from] AttachError),
}
