use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),
    #[error("failed to sign request: {0}")]
    Signing(String),
    #[error("queue request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("queue service responded with {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}
