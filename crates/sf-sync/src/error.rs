use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),
    /// Non-2xx response whose body was not a recognised payload.
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    /// The server answered `{ok: false}` / `{success: false}` / `{error}`.
    #[error("{0}")]
    Application(String),
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("precondition failed: {0}")]
    Precondition(String),
}

impl SyncError {
    /// Whether the user gets an alert for this failure. Decode and
    /// precondition failures are logged and the operation is dropped.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            SyncError::Network(_) | SyncError::Http { .. } | SyncError::Application(_)
        )
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Decode(err.to_string())
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
