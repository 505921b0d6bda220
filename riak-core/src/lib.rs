pub mod config;
pub mod core_client;
pub mod core_crdt;
pub mod core_proto;
pub mod logging;
pub mod telemetry;

#[cfg(test)]
pub mod test_utils;

pub use config::{Config, ConfigError, DecodeConfig};
pub use core_client::{fetch_counter, fetch_map, fetch_set, Operation, Transport};
pub use core_crdt::{
    as_counter, as_map, as_set, CrdtElement, CrdtType, DatatypeConverter, DatatypeKind, MapKey,
    RiakCounter, RiakDatatype, RiakFlag, RiakMap, RiakRegister, RiakSet,
};
pub use core_proto::{
    convert_deferred, DecodeError, DecodeResult, ExecutionError, MessageCode, ProtocolMessage,
    ResponseConverter, TransportError,
};
pub use logging::{init_logging, LogLevel};
