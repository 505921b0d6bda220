/*
    converter.rs - ResponseConverter capability

    A ResponseConverter interprets a (code, payload) pair as a typed value.
    Each converter recognises a fixed set of codes; everything else is an
    UnknownCode error. An error frame (code 0) is always decoded and surfaced
    as DecodeError::Server, whichever converter receives it.

    Conversions are pure. The deferred entry point runs the same conversion
    on the blocking pool and reports failures through ExecutionError, so
    synchronous and asynchronous callers share one error taxonomy.
*/

use super::codes::MessageCode;
use super::errors::{DecodeError, DecodeResult, ExecutionError};
use super::message::ProtocolMessage;
use super::pb;
use crate::telemetry::{counters, spans};
use prost::Message;
use std::sync::Arc;
use tracing::warn;

/// Capability to interpret a code and payload as `Self::Output`
pub trait ResponseConverter {
    type Output;

    /// Convert one response. Must not retain `payload`.
    fn convert(&self, code: u8, payload: &[u8]) -> DecodeResult<Self::Output>;
}

impl<C: ResponseConverter + ?Sized> ResponseConverter for &C {
    type Output = C::Output;

    fn convert(&self, code: u8, payload: &[u8]) -> DecodeResult<Self::Output> {
        (**self).convert(code, payload)
    }
}

impl<C: ResponseConverter + ?Sized> ResponseConverter for Arc<C> {
    type Output = C::Output;

    fn convert(&self, code: u8, payload: &[u8]) -> DecodeResult<Self::Output> {
        (**self).convert(code, payload)
    }
}

/// Run a conversion off the async executor.
///
/// Decode failures arrive as `ExecutionError::Decode`; a panicking or
/// cancelled conversion task arrives as `ExecutionError::Interrupted`.
pub async fn convert_deferred<C>(
    message: ProtocolMessage,
    converter: C,
) -> Result<C::Output, ExecutionError>
where
    C: ResponseConverter + Send + 'static,
    C::Output: Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || message.convert_response(&converter))
        .await
        .map_err(|e| ExecutionError::Interrupted(e.to_string()))?;

    result.map_err(ExecutionError::from)
}

/// Accept `expected`, turn an error frame into `DecodeError::Server`, reject the rest
pub(crate) fn expect_code(code: u8, payload: &[u8], expected: MessageCode) -> DecodeResult<()> {
    if code == expected.as_u8() {
        return Ok(());
    }
    if code == MessageCode::ErrorResp.as_u8() {
        return Err(server_error(payload));
    }
    Err(DecodeError::UnknownCode { code, expected })
}

/// Decode an `RpbErrorResp` payload
pub fn server_error(payload: &[u8]) -> DecodeError {
    match pb::RpbErrorResp::decode(payload) {
        Ok(resp) => {
            let message = String::from_utf8_lossy(&resp.errmsg).into_owned();
            warn!(errcode = resp.errcode, %message, "server returned error response");
            DecodeError::Server { errcode: resp.errcode, message }
        }
        Err(e) => DecodeError::malformed(MessageCode::ErrorResp.as_u8(), e.to_string()),
    }
}

/// Decode a protobuf payload, mapping wire errors to MalformedPayload
pub(crate) fn decode_pb<M: Message + Default>(code: u8, payload: &[u8]) -> DecodeResult<M> {
    M::decode(payload).map_err(|e| DecodeError::malformed(code, e.to_string()))
}

/// Wrap a converter body with a span, a debug event and decode counters
pub(crate) fn instrumented<T>(
    converter: &'static str,
    code: u8,
    payload: &[u8],
    body: impl FnOnce() -> DecodeResult<T>,
) -> DecodeResult<T> {
    let op = spans::decode::trace_response(converter, code, payload.len());
    let result = op.in_scope(body);

    match &result {
        Ok(_) => {
            counters::record_decode(converter, "ok", payload.len());
            op.complete();
        }
        Err(e) => {
            counters::record_decode(converter, e.kind(), payload.len());
            op.record_error(e);
        }
    }
    result
}
