//! Test utilities shared by unit tests
//!
//! Builders for protobuf payloads and assertions over decode results.

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;
