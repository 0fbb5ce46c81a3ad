use thiserror::Error;

/// Why a backend call failed. Kept for diagnostics only; callers treat every
/// cause the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// The server answered with a non-success status
    Status(u16),
    /// Connection refused, DNS failure, timeout, ...
    Transport(String),
    /// The body was not the JSON we expected
    Decode(String),
}

/// The single error kind produced by the API client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}", describe(.cause))]
pub struct RequestFailed {
    pub endpoint: String,
    pub cause: FailureCause,
}

fn describe(cause: &FailureCause) -> String {
    match cause {
        FailureCause::Status(code) => format!("HTTP error! status: {}", code),
        FailureCause::Transport(msg) => msg.clone(),
        FailureCause::Decode(msg) => format!("invalid response body: {}", msg),
    }
}

impl RequestFailed {
    pub fn status(endpoint: &str, code: u16) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            cause: FailureCause::Status(code),
        }
    }

    pub fn transport(endpoint: &str, err: impl std::fmt::Display) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            cause: FailureCause::Transport(err.to_string()),
        }
    }

    pub fn decode(endpoint: &str, err: impl std::fmt::Display) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            cause: FailureCause::Decode(err.to_string()),
        }
    }

    /// Classify a reqwest error raised while sending or reading a body.
    pub(crate) fn from_reqwest(endpoint: &str, err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::decode(endpoint, err)
        } else if let Some(status) = err.status() {
            Self::status(endpoint, status.as_u16())
        } else {
            Self::transport(endpoint, err)
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, RequestFailed>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = RequestFailed::status("/api/chat", 500);
        assert_eq!(err.to_string(), "HTTP error! status: 500");
        assert_eq!(err.endpoint, "/api/chat");
    }

    #[test]
    fn test_transport_display_passes_message_through() {
        let err = RequestFailed::transport("/api/health", "connection refused");
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.cause, FailureCause::Transport("connection refused".into()));
    }

    #[test]
    fn test_decode_display() {
        let err = RequestFailed::decode("/api/agents", "expected value at line 1");
        assert!(err.to_string().contains("invalid response body"));
    }
}
