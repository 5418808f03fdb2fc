/// Failure of a backend call.
#[derive(Debug)]
pub enum ApiError {
    InvalidBaseUrl(String),
    /// Connection, TLS or body-read failure.
    Transport(reqwest::Error),
    /// Non-2xx response. `body` is whatever text the server sent.
    Status { status: u16, body: String },
    Decode(serde_json::Error),
}

impl ApiError {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        ApiError::Status {
            status: 404,
            body: format!("{what} not found"),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::InvalidBaseUrl(url) => write!(f, "invalid API base URL: {url}"),
            ApiError::Transport(e) => write!(f, "request failed: {e}"),
            ApiError::Status { status, body } if body.is_empty() => {
                write!(f, "server responded with {status}")
            }
            ApiError::Status { status, body } => {
                write!(f, "server responded with {status}: {body}")
            }
            ApiError::Decode(e) => write!(f, "unexpected response body: {e}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(e) => Some(e),
            ApiError::Decode(e) => Some(e),
            ApiError::InvalidBaseUrl(_) | ApiError::Status { .. } => None,
        }
    }
}
