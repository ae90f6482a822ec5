use hyper::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("connection failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
    #[error("reading response body: {0}")]
    Body(#[from] hyper::Error),
    #[error("building request: {0}")]
    Request(#[from] hyper::http::Error),
    #[error("invalid API URL `{0}`")]
    InvalidUrl(String),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    /// Non-2xx answer. `message` is the server's own when it sent one.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("malformed JSON response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(&'static str),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
