use thiserror::Error;

/// Everything that can go wrong between sending the filter request and
/// holding a parsed `FilteredResources`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Request timed out: {message}")]
    Timeout { message: String },

    #[error("Endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {message}")]
    Malformed { message: String },
}

pub type FetchResult<T> = Result<T, FetchError>;

impl FetchError {
    pub fn short_message(&self) -> String {
        match self {
            FetchError::Network { .. } => "Network error".to_string(),
            FetchError::Timeout { .. } => "Timeout".to_string(),
            FetchError::Status { status, .. } => format!("HTTP {}", status),
            FetchError::Malformed { .. } => "Malformed response".to_string(),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            FetchError::Status { status, body } if body.is_empty() => {
                format!("Endpoint returned status {}", status)
            }
            _ => self.to_string(),
        }
    }

    pub(crate) fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout {
                message: error.to_string(),
            }
        } else {
            FetchError::Network {
                message: error.to_string(),
            }
        }
    }
}
