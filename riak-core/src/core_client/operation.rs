/*
    operation.rs - One request/response exchange

    An Operation pairs a pre-built request with the converter for its
    response. Executing it sends the request through a Transport, then runs
    the conversion on the blocking pool. Failures from either side come back
    as ExecutionError. Nothing is retried.

    fetch_counter / fetch_set / fetch_map go one step further and turn a
    DtFetchResp into the typed datatype plus its causal context.
*/

use crate::core_crdt::converter::{as_counter, as_map, as_set, DatatypeConverter};
use crate::core_crdt::datatypes::{RiakCounter, RiakMap, RiakSet};
use crate::core_crdt::response::DtFetchConverter;
use crate::core_proto::converter::{convert_deferred, ResponseConverter};
use crate::core_proto::errors::{DecodeResult, ExecutionError};
use crate::core_proto::message::ProtocolMessage;
use crate::core_client::transport::Transport;
use bytes::Bytes;
use tracing::{debug, debug_span, Instrument};

/// Request plus the converter that reads its response
#[derive(Debug, Clone)]
pub struct Operation<C> {
    request: ProtocolMessage,
    converter: C,
}

impl<C> Operation<C>
where
    C: ResponseConverter + Send + 'static,
    C::Output: Send + 'static,
{
    pub fn new(request: ProtocolMessage, converter: C) -> Self {
        Operation { request, converter }
    }

    pub fn request(&self) -> &ProtocolMessage {
        &self.request
    }

    pub async fn execute<T>(self, transport: &T) -> Result<C::Output, ExecutionError>
    where
        T: Transport + ?Sized,
    {
        let span = debug_span!("riak_operation", request_code = self.request.code());
        async move {
            let response = transport.exchange(self.request).await?;
            debug!(response_code = response.code(), payload_len = response.payload().len(), "response received");
            convert_deferred(response, self.converter).await
        }
        .instrument(span)
        .await
    }
}

/// Typed datatype with its causal context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatatypeResponse<T> {
    pub context: Option<Bytes>,
    /// `None` when the datatype does not exist
    pub value: Option<T>,
}

impl<T> DatatypeResponse<T> {
    pub fn is_not_found(&self) -> bool {
        self.value.is_none()
    }
}

/// DtFetchResp straight to a typed datatype
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedFetchConverter<D> {
    fetch: DtFetchConverter,
    datatype: D,
}

impl<D: DatatypeConverter> TypedFetchConverter<D> {
    pub fn new(fetch: DtFetchConverter, datatype: D) -> Self {
        TypedFetchConverter { fetch, datatype }
    }
}

impl<D: DatatypeConverter> ResponseConverter for TypedFetchConverter<D> {
    type Output = DatatypeResponse<D::Output>;

    fn convert(&self, code: u8, payload: &[u8]) -> DecodeResult<Self::Output> {
        let mut fetched = self.fetch.convert(code, payload)?;
        let context = fetched.context.take();
        let value = fetched.into_datatype(&self.datatype)?;
        Ok(DatatypeResponse { context, value })
    }
}

/// Send a `DtFetchReq` and convert the answer with `datatype`
pub async fn fetch_datatype<T, D>(
    transport: &T,
    request: ProtocolMessage,
    fetch: DtFetchConverter,
    datatype: D,
) -> Result<DatatypeResponse<D::Output>, ExecutionError>
where
    T: Transport + ?Sized,
    D: DatatypeConverter + Send + 'static,
    D::Output: Send + 'static,
{
    Operation::new(request, TypedFetchConverter::new(fetch, datatype)).execute(transport).await
}

pub async fn fetch_counter<T: Transport + ?Sized>(
    transport: &T,
    request: ProtocolMessage,
) -> Result<DatatypeResponse<RiakCounter>, ExecutionError> {
    fetch_datatype(transport, request, DtFetchConverter::new(), as_counter()).await
}

pub async fn fetch_set<T: Transport + ?Sized>(
    transport: &T,
    request: ProtocolMessage,
) -> Result<DatatypeResponse<RiakSet>, ExecutionError> {
    fetch_datatype(transport, request, DtFetchConverter::new(), as_set()).await
}

pub async fn fetch_map<T: Transport + ?Sized>(
    transport: &T,
    request: ProtocolMessage,
) -> Result<DatatypeResponse<RiakMap>, ExecutionError> {
    fetch_datatype(transport, request, DtFetchConverter::new(), as_map()).await
}
