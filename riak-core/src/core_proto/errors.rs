/*
    errors.rs - Error types for response decoding

    One taxonomy shared by synchronous and deferred callers:
    - DecodeError: code/payload/datatype failures raised by converters
    - TransportError: failures reported by the (external) transport
    - ExecutionError: what a deferred conversion or an operation resolves to
*/

use super::codes::MessageCode;
use crate::core_crdt::element::CrdtType;
use thiserror::Error;

/// Errors raised while turning a response into a typed value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Code is not recognised by the selected converter
    #[error("Unknown message code {code}: converter expects {expected}")]
    UnknownCode { code: u8, expected: MessageCode },

    /// Payload bytes do not match the schema implied by the code
    #[error("Malformed payload for code {code}: {reason}")]
    MalformedPayload { code: u8, reason: String },

    /// Frame envelope is truncated or oversized
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// Element variant differs from the requested datatype family
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: CrdtType, found: CrdtType },

    /// Map nesting is deeper than the configured limit
    #[error("Map nesting exceeds limit of {limit}")]
    NestingTooDeep { limit: usize },

    /// Server answered with an error frame
    #[error("Server error {errcode}: {message}")]
    Server { errcode: u32, message: String },
}

impl DecodeError {
    pub fn malformed(code: u8, reason: impl Into<String>) -> Self {
        DecodeError::MalformedPayload { code, reason: reason.into() }
    }

    pub fn mismatch(expected: CrdtType, found: CrdtType) -> Self {
        DecodeError::TypeMismatch { expected, found }
    }

    /// Decoding the same bytes again can never succeed, so nothing here is
    /// retryable. A fresh request is the transport's call to make.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Short label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::UnknownCode { .. } => "unknown_code",
            DecodeError::MalformedPayload { .. } => "malformed_payload",
            DecodeError::MalformedFrame(_) => "malformed_frame",
            DecodeError::TypeMismatch { .. } => "type_mismatch",
            DecodeError::NestingTooDeep { .. } => "nesting_too_deep",
            DecodeError::Server { .. } => "server_error",
        }
    }
}

/// Result type for decode operations
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors surfaced by a transport implementation
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out")]
    Timeout,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure carrier for deferred conversions and transport-backed operations
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Task running the conversion panicked or was cancelled
    #[error("Conversion task interrupted: {0}")]
    Interrupted(String),
}

impl ExecutionError {
    /// The decode failure, if this is one
    pub fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            ExecutionError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::UnknownCode { code: 42, expected: MessageCode::DtFetchResp };
        assert_eq!(err.to_string(), "Unknown message code 42: converter expects DtFetchResp(81)");

        let err = DecodeError::mismatch(CrdtType::Counter, CrdtType::Set);
        assert_eq!(err.to_string(), "Type mismatch: expected counter, found set");
    }

    #[test]
    fn test_nothing_is_retryable() {
        let errors = vec![
            DecodeError::malformed(10, "truncated"),
            DecodeError::MalformedFrame("short".to_string()),
            DecodeError::NestingTooDeep { limit: 4 },
            DecodeError::Server { errcode: 0, message: "overload".to_string() },
        ];
        for err in errors {
            assert!(!err.is_retryable(), "{} should not be retryable", err);
        }
    }

    #[test]
    fn test_execution_error_wraps_decode() {
        let exec: ExecutionError = DecodeError::malformed(81, "bad").into();
        assert_eq!(exec.as_decode(), Some(&DecodeError::malformed(81, "bad")));
        assert_eq!(exec.to_string(), "Malformed payload for code 81: bad");

        let exec: ExecutionError = TransportError::Timeout.into();
        assert!(exec.as_decode().is_none());
    }
}
