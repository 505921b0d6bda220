/*
    core_client - Operations over an abstract transport

    - transport: Transport trait, shared handle and a replaying transport
    - operation: Operation runner and typed datatype fetch helpers
*/

pub mod operation;
pub mod transport;

pub use operation::{
    fetch_counter, fetch_datatype, fetch_map, fetch_set, DatatypeResponse, Operation, TypedFetchConverter,
};
pub use transport::{ReplayTransport, Transport, TransportHandle};
