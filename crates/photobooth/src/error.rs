//! Failure taxonomy for calls against the capture service.

use reqwest::StatusCode;
use thiserror::Error;

/// How a failed call is classified. Both kinds read the same to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The service could not be reached at all.
    ConnectFailure,
    /// The service answered, but not with a usable success response.
    RequestFailure,
}

#[derive(Debug, Error)]
pub enum BoothError {
    #[error("cannot reach capture service at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("capture service returned {status} for {url}")]
    Request { url: String, status: StatusCode },

    #[error("unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("preview frame is not valid base64: {0}")]
    Frame(#[from] base64::DecodeError),
}

impl BoothError {
    pub fn kind(&self) -> FailureKind {
        match self {
            BoothError::Connect { .. } => FailureKind::ConnectFailure,
            BoothError::Request { .. } | BoothError::Decode { .. } | BoothError::Frame(_) => {
                FailureKind::RequestFailure
            }
        }
    }

    /// Status code of a non-success response, if that is what failed.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            BoothError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failure_kind() {
        let err = BoothError::Request {
            url: "http://localhost:5000/start-capture".to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        };
        assert_eq!(err.kind(), FailureKind::RequestFailure);
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_frame_failure_has_no_status() {
        let err = BoothError::from(base64::DecodeError::InvalidLength(3));
        assert_eq!(err.kind(), FailureKind::RequestFailure);
        assert_eq!(err.status(), None);
    }
}
