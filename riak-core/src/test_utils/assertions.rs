//! Assertions over decode results

use crate::core_proto::errors::{DecodeError, DecodeResult};
use std::fmt::Debug;

/// Assert success and return the value
pub fn assert_decoded<T>(result: DecodeResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => panic!("Expected successful decode, got {:?}", e),
    }
}

/// Assert failure with the given `DecodeError::kind()` label
pub fn assert_decode_error<T: Debug>(result: DecodeResult<T>, kind: &str) -> DecodeError {
    match result {
        Ok(value) => panic!("Expected {} error, decoded {:?}", kind, value),
        Err(e) => {
            assert_eq!(e.kind(), kind, "unexpected error: {}", e);
            e
        }
    }
}
