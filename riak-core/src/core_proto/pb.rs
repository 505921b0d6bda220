//! Protobuf payload definitions for the response messages this client decodes.
//!
//! Field numbers follow the server's `riak.proto`, `riak_kv.proto` and
//! `riak_dt.proto` schemas (proto2). Request messages are not defined here;
//! building requests belongs to the caller.

use prost::Message;

/// RpbErrorResp, code 0
#[derive(Clone, PartialEq, Message)]
pub struct RpbErrorResp {
    #[prost(bytes = "vec", required, tag = "1")]
    pub errmsg: Vec<u8>,
    #[prost(uint32, required, tag = "2")]
    pub errcode: u32,
}

/// RpbGetServerInfoResp, code 8
#[derive(Clone, PartialEq, Message)]
pub struct RpbGetServerInfoResp {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub node: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub server_version: Option<Vec<u8>>,
}

/// Key/value pair used for user metadata and secondary indexes
#[derive(Clone, PartialEq, Message)]
pub struct RpbPair {
    #[prost(bytes = "vec", required, tag = "1")]
    pub key: Vec<u8>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub value: Option<Vec<u8>>,
}

/// Link to another object
#[derive(Clone, PartialEq, Message)]
pub struct RpbLink {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub bucket: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub key: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub tag: Option<Vec<u8>>,
}

/// One sibling of a stored object
#[derive(Clone, PartialEq, Message)]
pub struct RpbContent {
    #[prost(bytes = "vec", required, tag = "1")]
    pub value: Vec<u8>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub content_type: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub charset: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub content_encoding: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "5")]
    pub vtag: Option<Vec<u8>>,
    #[prost(message, repeated, tag = "6")]
    pub links: Vec<RpbLink>,
    #[prost(uint32, optional, tag = "7")]
    pub last_mod: Option<u32>,
    #[prost(uint32, optional, tag = "8")]
    pub last_mod_usecs: Option<u32>,
    #[prost(message, repeated, tag = "9")]
    pub usermeta: Vec<RpbPair>,
    #[prost(message, repeated, tag = "10")]
    pub indexes: Vec<RpbPair>,
    #[prost(bool, optional, tag = "11")]
    pub deleted: Option<bool>,
}

/// RpbGetResp, code 10
#[derive(Clone, PartialEq, Message)]
pub struct RpbGetResp {
    #[prost(message, repeated, tag = "1")]
    pub content: Vec<RpbContent>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub vclock: Option<Vec<u8>>,
    #[prost(bool, optional, tag = "3")]
    pub unchanged: Option<bool>,
}

/// RpbPutResp, code 12
#[derive(Clone, PartialEq, Message)]
pub struct RpbPutResp {
    #[prost(message, repeated, tag = "1")]
    pub content: Vec<RpbContent>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub vclock: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub key: Option<Vec<u8>>,
}

/// Name and type of an entry inside a map datatype
#[derive(Clone, PartialEq, Message)]
pub struct MapField {
    #[prost(bytes = "vec", required, tag = "1")]
    pub name: Vec<u8>,
    #[prost(enumeration = "map_field::MapFieldType", required, tag = "2")]
    pub field_type: i32,
}

pub mod map_field {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum MapFieldType {
        Counter = 1,
        Set = 2,
        Register = 3,
        Flag = 4,
        Map = 5,
    }
}

/// A map entry; only the value field matching `field.field_type` is meaningful
#[derive(Clone, PartialEq, Message)]
pub struct MapEntry {
    #[prost(message, optional, tag = "1")]
    pub field: Option<MapField>,
    #[prost(sint64, optional, tag = "2")]
    pub counter_value: Option<i64>,
    #[prost(bytes = "vec", repeated, tag = "3")]
    pub set_value: Vec<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub register_value: Option<Vec<u8>>,
    #[prost(bool, optional, tag = "5")]
    pub flag_value: Option<bool>,
    #[prost(message, repeated, tag = "6")]
    pub map_value: Vec<MapEntry>,
}

/// Value of a fetched datatype
#[derive(Clone, PartialEq, Message)]
pub struct DtValue {
    #[prost(sint64, optional, tag = "1")]
    pub counter_value: Option<i64>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub set_value: Vec<Vec<u8>>,
    #[prost(message, repeated, tag = "3")]
    pub map_value: Vec<MapEntry>,
}

/// DtFetchResp, code 81
#[derive(Clone, PartialEq, Message)]
pub struct DtFetchResp {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub context: Option<Vec<u8>>,
    #[prost(enumeration = "dt_fetch_resp::DataType", required, tag = "2")]
    pub data_type: i32,
    #[prost(message, optional, tag = "3")]
    pub value: Option<DtValue>,
}

pub mod dt_fetch_resp {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum DataType {
        Counter = 1,
        Set = 2,
        Map = 3,
    }
}

/// DtUpdateResp, code 83
#[derive(Clone, PartialEq, Message)]
pub struct DtUpdateResp {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub key: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub context: Option<Vec<u8>>,
    #[prost(sint64, optional, tag = "3")]
    pub counter_value: Option<i64>,
    #[prost(bytes = "vec", repeated, tag = "4")]
    pub set_value: Vec<Vec<u8>>,
    #[prost(message, repeated, tag = "5")]
    pub map_value: Vec<MapEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dt_fetch_resp_wire_layout() {
        let resp = DtFetchResp {
            context: None,
            data_type: dt_fetch_resp::DataType::Counter as i32,
            value: Some(DtValue { counter_value: Some(-1), ..Default::default() }),
        };
        let bytes = resp.encode_to_vec();
        // field 2 varint 1, field 3 length 2, field 1 zigzag(-1) = 1
        assert_eq!(bytes, vec![0x10, 0x01, 0x1a, 0x02, 0x08, 0x01]);
        assert_eq!(DtFetchResp::decode(bytes.as_slice()).unwrap(), resp);
    }

    #[test]
    fn test_enumeration_try_from() {
        assert_eq!(map_field::MapFieldType::try_from(5).ok(), Some(map_field::MapFieldType::Map));
        assert!(map_field::MapFieldType::try_from(9).is_err());
        assert!(dt_fetch_resp::DataType::try_from(0).is_err());
    }
}
