//! Tracing spans around decode operations

use crate::core_crdt::element::CrdtType;
use crate::core_proto::errors::DecodeError;
use std::time::Instant;
use tracing::{debug_span, Span};

/// Span plus start time for one decode or conversion
pub struct TracedOperation {
    span: Span,
    start: Instant,
}

impl TracedOperation {
    /// Start a new traced operation
    pub fn new(operation_name: &'static str) -> Self {
        let span = debug_span!("riak_decode", op = operation_name);
        Self { span, start: Instant::now() }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Run `f` inside the span
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        self.span.in_scope(f)
    }

    /// Record a failure; the span closes when `self` drops
    pub fn record_error(&self, error: &DecodeError) {
        tracing::debug!(parent: &self.span, error = %error, kind = error.kind(), "decode failed");
    }

    /// Complete the operation and record duration
    pub fn complete(self) {
        let elapsed = self.start.elapsed();
        tracing::trace!(
            parent: &self.span,
            elapsed_us = elapsed.as_micros() as u64,
            "decode completed"
        );
    }
}

/// Spans for the decode pipeline
pub mod decode {
    use super::*;

    pub fn trace_response(converter: &'static str, code: u8, payload_len: usize) -> TracedOperation {
        let op = TracedOperation::new(converter);
        tracing::debug!(parent: &op.span, code, payload_len, "decoding response");
        op
    }

    pub fn trace_datatype(kind: CrdtType) -> TracedOperation {
        let op = TracedOperation::new("datatype_convert");
        tracing::trace!(parent: &op.span, kind = kind.as_str(), "converting element");
        op
    }
}
