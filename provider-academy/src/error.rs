//! Error types for the catalog provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Remote catalog errors
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The catalog service answered with a non-success status
    #[error("Catalog API error (status {status_code}): {message}")]
    Api { status_code: u16, message: String },

    /// No payload exists for the requested key
    #[error("Not found in catalog: {0}")]
    NotFound(String),

    /// Payload was not valid catalog JSON
    #[error("Failed to parse catalog payload: {0}")]
    Parse(String),

    /// Request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// Reading a bundled asset failed
    #[error("Asset read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl From<serde_json::Error> for RemoteError {
    fn from(error: serde_json::Error) -> Self {
        RemoteError::Parse(error.to_string())
    }
}

/// Result type for remote catalog operations
pub type Result<T> = std::result::Result<T, RemoteError>;

impl From<RemoteError> for BridgeError {
    fn from(error: RemoteError) -> Self {
        match error {
            RemoteError::Bridge(e) => e,
            RemoteError::Io(e) => BridgeError::Io(e),
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = RemoteError::Api {
            status_code: 503,
            message: "maintenance".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Catalog API error (status 503): maintenance"
        );
    }

    #[test]
    fn test_error_conversion() {
        let bridge_error: BridgeError = RemoteError::Network("offline".to_string()).into();
        assert!(matches!(bridge_error, BridgeError::OperationFailed(_)));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let bridge_error: BridgeError = RemoteError::Io(io).into();
        assert!(matches!(bridge_error, BridgeError::Io(_)));
    }

    #[test]
    fn test_parse_error_from_serde() {
        let err = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        assert!(matches!(RemoteError::from(err), RemoteError::Parse(_)));
    }
}
