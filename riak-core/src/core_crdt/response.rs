/*
    response.rs - Converters for datatype responses

    DtFetchResp  -> FetchedDatatype (context, kind, optional element)
    DtUpdateResp -> UpdatedDatatype (key, context, optional element)

    Both stop at the CrdtElement tree. Turning that into a RiakCounter,
    RiakSet or RiakMap is the DatatypeConverter's job.
*/

use super::converter::{convert_any, supported_depth, DatatypeConverter, DEFAULT_MAX_MAP_DEPTH};
use super::datatypes::{DatatypeKind, RiakDatatype};
use super::element::CrdtElement;
use super::parser::ElementParser;
use crate::core_proto::codes::MessageCode;
use crate::core_proto::converter::{expect_code, instrumented, ResponseConverter};
use crate::core_proto::errors::{DecodeError, DecodeResult};
use crate::core_proto::pb;
use crate::core_proto::pb::dt_fetch_resp::DataType;
use bytes::Bytes;
use prost::Message;
use tracing::debug;

/// Decoded `DtFetchResp`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDatatype {
    /// Opaque causal context to send back with the next update
    pub context: Option<Bytes>,
    pub kind: DatatypeKind,
    /// `None` when the datatype does not exist
    pub element: Option<CrdtElement>,
}

impl FetchedDatatype {
    pub fn is_not_found(&self) -> bool {
        self.element.is_none()
    }

    /// Convert the element with `converter`.
    ///
    /// Fails with TypeMismatch when the response declares a different family
    /// than the converter produces, even for a not-found response.
    pub fn into_datatype<C: DatatypeConverter>(self, converter: &C) -> DecodeResult<Option<C::Output>> {
        if self.kind != converter.kind() {
            return Err(DecodeError::mismatch(converter.kind().crdt_type(), self.kind.crdt_type()));
        }
        self.element.map(|element| converter.convert(element)).transpose()
    }

    /// Convert with the family the response declared
    pub fn into_any(self, max_depth: usize) -> DecodeResult<Option<RiakDatatype>> {
        let kind = self.kind;
        self.element.map(|element| convert_any(kind, element, max_depth)).transpose()
    }
}

/// Decoded `DtUpdateResp`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdatedDatatype {
    /// Server-assigned key, when the update carried none
    pub key: Option<Bytes>,
    pub context: Option<Bytes>,
    /// Returned body, when the update asked for it.
    ///
    /// An empty set or map body has no populated field on the wire, so it
    /// also decodes to `None`. `None` does not mean the body was not
    /// requested.
    pub element: Option<CrdtElement>,
}

impl UpdatedDatatype {
    pub fn into_datatype<C: DatatypeConverter>(self, converter: &C) -> DecodeResult<Option<C::Output>> {
        self.element.map(|element| converter.convert(element)).transpose()
    }

    /// Convert with the family the body carries.
    ///
    /// A register or flag body is not a datatype response and is malformed.
    pub fn into_any(self, max_depth: usize) -> DecodeResult<Option<RiakDatatype>> {
        self.element
            .map(|element| {
                let kind = DatatypeKind::try_from(element.crdt_type()).map_err(|found| {
                    DecodeError::malformed(
                        MessageCode::DtUpdateResp.as_u8(),
                        format!("update body is a {}, not a datatype", found),
                    )
                })?;
                convert_any(kind, element, max_depth)
            })
            .transpose()
    }
}

/// prost's error text when nesting exceeds its recursion limit
const RECURSION_LIMIT_REACHED: &str = "recursion limit reached";

/// Decode a datatype response; nesting too deep for prost is NestingTooDeep
fn decode_datatype_pb<M: Message + Default>(code: u8, payload: &[u8], max_depth: usize) -> DecodeResult<M> {
    M::decode(payload).map_err(|e| {
        let reason = e.to_string();
        if reason.contains(RECURSION_LIMIT_REACHED) {
            DecodeError::NestingTooDeep { limit: max_depth }
        } else {
            DecodeError::malformed(code, reason)
        }
    })
}

fn datatype_kind(code: u8, data_type: i32) -> DecodeResult<DatatypeKind> {
    match DataType::try_from(data_type) {
        Ok(DataType::Counter) => Ok(DatatypeKind::Counter),
        Ok(DataType::Set) => Ok(DatatypeKind::Set),
        Ok(DataType::Map) => Ok(DatatypeKind::Map),
        Err(_) => Err(DecodeError::malformed(code, format!("missing or unknown datatype {}", data_type))),
    }
}

/// `DtFetchResp` -> `FetchedDatatype`
#[derive(Debug, Clone, Copy)]
pub struct DtFetchConverter {
    max_depth: usize,
}

impl DtFetchConverter {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_MAP_DEPTH)
    }

    /// Depths above `MAX_SUPPORTED_MAP_DEPTH` are clamped to it
    pub fn with_max_depth(max_depth: usize) -> Self {
        DtFetchConverter { max_depth: supported_depth(max_depth) }
    }
}

impl Default for DtFetchConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseConverter for DtFetchConverter {
    type Output = FetchedDatatype;

    fn convert(&self, code: u8, payload: &[u8]) -> DecodeResult<FetchedDatatype> {
        instrumented("dt_fetch", code, payload, || {
            expect_code(code, payload, MessageCode::DtFetchResp)?;
            let resp: pb::DtFetchResp = decode_datatype_pb(code, payload, self.max_depth)?;
            let kind = datatype_kind(code, resp.data_type)?;

            let parser = ElementParser::with_max_depth(code, self.max_depth);
            let element = resp.value.map(|value| parser.parse_value(kind, value)).transpose()?;
            debug!(%kind, found = element.is_some(), "decoded datatype fetch");

            Ok(FetchedDatatype { context: resp.context.map(Bytes::from), kind, element })
        })
    }
}

/// `DtUpdateResp` -> `UpdatedDatatype`
#[derive(Debug, Clone, Copy)]
pub struct DtUpdateConverter {
    kind: Option<DatatypeKind>,
    max_depth: usize,
}

impl DtUpdateConverter {
    /// Accept whichever family the body carries
    pub fn new() -> Self {
        DtUpdateConverter { kind: None, max_depth: DEFAULT_MAX_MAP_DEPTH }
    }

    /// Require the body, if any, to be of `kind`
    pub fn for_kind(kind: DatatypeKind) -> Self {
        DtUpdateConverter { kind: Some(kind), max_depth: DEFAULT_MAX_MAP_DEPTH }
    }

    /// Depths above `MAX_SUPPORTED_MAP_DEPTH` are clamped to it
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = supported_depth(max_depth);
        self
    }
}

impl Default for DtUpdateConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseConverter for DtUpdateConverter {
    type Output = UpdatedDatatype;

    fn convert(&self, code: u8, payload: &[u8]) -> DecodeResult<UpdatedDatatype> {
        instrumented("dt_update", code, payload, || {
            expect_code(code, payload, MessageCode::DtUpdateResp)?;
            let mut resp: pb::DtUpdateResp = decode_datatype_pb(code, payload, self.max_depth)?;

            let parser = ElementParser::with_max_depth(code, self.max_depth);
            let element = parser.parse_update(self.kind, &mut resp)?;

            Ok(UpdatedDatatype {
                key: resp.key.map(Bytes::from),
                context: resp.context.map(Bytes::from),
                element,
            })
        })
    }
}
