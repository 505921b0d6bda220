/*
    core_crdt - CRDT value trees and typed datatypes

    - element:   CrdtElement tree and MapKey
    - parser:    builds element trees from datatype payloads
    - response:  DtFetch / DtUpdate response converters
    - converter: DatatypeConverter family (as_counter, as_set, as_map)
    - datatypes: RiakCounter, RiakSet, RiakMap and map-only leaves
*/

pub mod converter;
pub mod datatypes;
pub mod element;
pub mod parser;
pub mod response;

pub use converter::{
    as_counter, as_map, as_set, convert_any, CounterConverter, DatatypeConverter, MapConverter,
    SetConverter, DEFAULT_MAX_MAP_DEPTH, MAX_SUPPORTED_MAP_DEPTH, PROTOBUF_RECURSION_LIMIT,
};
pub use datatypes::{DatatypeKind, RiakCounter, RiakDatatype, RiakFlag, RiakMap, RiakRegister, RiakSet};
pub use element::{CrdtElement, CrdtType, MapKey};
pub use parser::ElementParser;
pub use response::{DtFetchConverter, DtUpdateConverter, FetchedDatatype, UpdatedDatatype};
