//! Decoded command replies.

use serde_json::{Map, Value};

use crate::{Error, Result};

/// The decoded outcome of one scheduler command.
///
/// A remote error banner is a normal, expected outcome (the scheduler
/// rejected the command), distinct from transport or decoding problems; the
/// latter surface as [`Error`] values instead of a `DecodedResult`.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedResult {
    /// The reply contained a JSON object; returned verbatim.
    Success(Map<String, Value>),
    /// The reply was an error banner; `message` is the cleaned text.
    Failure {
        /// Human-readable message extracted from the banner
        message: String,
    },
}

impl DecodedResult {
    /// Whether this is the success path.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Borrow the success mapping, if any.
    pub fn as_map(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Success(map) => Some(map),
            Self::Failure { .. } => None,
        }
    }

    /// Convert into the success mapping, turning a remote banner into
    /// [`Error::RemoteRejected`].
    pub fn into_map(self) -> Result<Map<String, Value>> {
        match self {
            Self::Success(map) => Ok(map),
            Self::Failure { message } => Err(Error::RemoteRejected(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("status".to_string(), Value::String("ok".to_string()));
        map
    }

    #[test]
    fn test_success_accessors() {
        let result = DecodedResult::Success(sample_map());
        assert!(result.is_success());
        assert_eq!(
            result.as_map().unwrap().get("status"),
            Some(&Value::String("ok".to_string()))
        );
        assert!(result.into_map().is_ok());
    }

    #[test]
    fn test_failure_accessors() {
        let result = DecodedResult::Failure {
            message: "Unknown command: foo".to_string(),
        };
        assert!(!result.is_success());
        assert!(result.as_map().is_none());
    }

    #[test]
    fn test_into_map_maps_failure_to_remote_rejected() {
        let result = DecodedResult::Failure {
            message: "Bad command".to_string(),
        };
        let err = result.into_map().unwrap_err();
        assert!(matches!(err, Error::RemoteRejected(msg) if msg == "Bad command"));
    }
}
