/*
    core_proto - Response envelope and wire decoding

    Turns the (code, payload) pairs delivered by the transport into typed
    results:
    - Message codes and the length-prefixed frame envelope
    - Protobuf payload schema
    - ResponseConverter capability and the object converters
    - Shared error taxonomy for sync and deferred callers
*/

pub mod codes;
pub mod converter;
pub mod errors;
pub mod message;
pub mod object;
pub mod pb;

pub use codes::MessageCode;
pub use converter::{convert_deferred, server_error, ResponseConverter};
pub use errors::{DecodeError, DecodeResult, ExecutionError, TransportError};
pub use message::{ProtocolMessage, DEFAULT_MAX_FRAME_SIZE};
pub use object::{
    DeleteConverter, FetchObjectConverter, FetchedObject, PingConverter, RiakLink, RiakObject,
    ServerInfo, ServerInfoConverter, StoreObjectConverter, StoredObject,
};
