//! Error types shared by remote clients and resource stores

use thiserror::Error;

/// Failure of a single remote call
///
/// Produced by [`RemoteResource`](crate::RemoteResource) implementations.
/// No retry is attempted at this level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request could not be completed (connection, timeout, ...)
    #[error("{0}")]
    Network(String),

    /// The backend answered with a non-success status
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// The single error kind surfaced by resource store operations
///
/// Transport detail is flattened into the message; the message is also what
/// the owning store records in its `error` field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct OperationError {
    message: String,
}

impl OperationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Human-readable failure description
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<TransportError> for OperationError {
    fn from(err: TransportError) -> Self {
        Self::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_keeps_message() {
        let err = OperationError::from(TransportError::Network("network down".into()));
        assert_eq!(err.message(), "network down");
        assert_eq!(err.to_string(), "network down");
    }

    #[test]
    fn test_status_error_message() {
        let err = OperationError::from(TransportError::Status {
            status: 404,
            message: "AOI not found".into(),
        });
        assert_eq!(
            err.message(),
            "request failed with status 404: AOI not found"
        );
    }
}
