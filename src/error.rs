// MIT License - Copyright (c) 2026 The dahua-cam Authors

/// All errors that can occur while talking to a camera.
#[derive(Debug, thiserror::Error)]
pub enum CamError {
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("HTTP {status} from {path}")]
    Status { status: u16, path: String },

    #[error("Credentials rejected for {path}")]
    Unauthorized { path: String },

    #[error("Unusable authentication challenge: {details}")]
    Challenge { details: String },

    #[error("Malformed response: {details}")]
    Parse { details: String },

    #[error("Event stream error: {0}")]
    Stream(#[source] reqwest::Error),

    #[error("Event listener already running")]
    AlreadyListening,

    #[error("No event stream response from {path}")]
    StreamTimeout { path: String },

    #[error("Invalid configuration: {details}")]
    Config { details: String },
}

impl CamError {
    /// Whether this error is transient and the operation may succeed if repeated.
    pub fn is_retryable(&self) -> bool {
        match self {
            CamError::Request(e) | CamError::Stream(e) => {
                e.is_connect() || e.is_timeout() || e.is_request() || e.is_body()
            }
            CamError::Status { status, .. } => *status >= 500,
            CamError::StreamTimeout { .. } => true,
            _ => false,
        }
    }

    /// Whether this error belongs to the one-shot request family
    /// (transport failure, bad status, rejected credentials).
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            CamError::Request(_)
                | CamError::Status { .. }
                | CamError::Unauthorized { .. }
                | CamError::Challenge { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CamError>;
