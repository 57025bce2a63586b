//! Type Conversions for VaultError
//!
//! `From` implementations for the error types raised by the libraries the
//! dispatch core sits on.

use super::types::VaultError;

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::DeserializationError(err.to_string())
    }
}

impl From<reqwest::Error> for VaultError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return Self::InvalidArgument(err.to_string());
        }
        Self::TransportError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: VaultError = json_err.into();
        assert!(matches!(err, VaultError::DeserializationError(_)));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.pdf");
        let err: VaultError = io_err.into();
        match err {
            VaultError::IoError(msg) => assert!(msg.contains("missing.pdf")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
