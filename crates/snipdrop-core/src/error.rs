/// Errors raised while talking to the snippet service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// The service could not be reached, or refused the connection handshake.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The service answered with a non-success status.
    #[error("Remote service error: {0}")]
    Remote(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A scheduled task panicked or was aborted before producing a result.
    #[error("Task failed: {0}")]
    Task(String),
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Serialization(e.to_string())
    }
}
