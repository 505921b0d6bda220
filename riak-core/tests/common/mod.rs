//! Shared helpers for integration tests
#![allow(dead_code)]

use prost::Message;
use riak_core::core_proto::pb;
use riak_core::core_proto::pb::dt_fetch_resp::DataType;
use riak_core::core_proto::pb::map_field::MapFieldType;
use riak_core::{MessageCode, ProtocolMessage};

pub fn entry(name: &str, field_type: MapFieldType) -> pb::MapEntry {
    pb::MapEntry {
        field: Some(pb::MapField { name: name.as_bytes().to_vec(), field_type: field_type as i32 }),
        ..Default::default()
    }
}

pub fn counter_entry(name: &str, value: i64) -> pb::MapEntry {
    pb::MapEntry { counter_value: Some(value), ..entry(name, MapFieldType::Counter) }
}

pub fn set_entry(name: &str, members: &[&str]) -> pb::MapEntry {
    pb::MapEntry {
        set_value: members.iter().map(|m| m.as_bytes().to_vec()).collect(),
        ..entry(name, MapFieldType::Set)
    }
}

pub fn map_entry(name: &str, children: Vec<pb::MapEntry>) -> pb::MapEntry {
    pb::MapEntry { map_value: children, ..entry(name, MapFieldType::Map) }
}

/// Map nested `levels` deep with a counter at the bottom
pub fn nested_entries(levels: usize) -> Vec<pb::MapEntry> {
    let mut entries = vec![counter_entry("leaf", 1)];
    for level in 1..levels {
        entries = vec![map_entry(&format!("level{}", level), entries)];
    }
    entries
}

pub fn fetch_payload(data_type: DataType, value: Option<pb::DtValue>) -> Vec<u8> {
    pb::DtFetchResp { context: Some(b"ctx".to_vec()), data_type: data_type as i32, value }.encode_to_vec()
}

pub fn counter_message(value: i64) -> ProtocolMessage {
    let value = pb::DtValue { counter_value: Some(value), ..Default::default() };
    ProtocolMessage::new(MessageCode::DtFetchResp.as_u8(), fetch_payload(DataType::Counter, Some(value)))
}

pub fn set_message(members: &[Vec<u8>]) -> ProtocolMessage {
    let value = pb::DtValue { set_value: members.to_vec(), ..Default::default() };
    ProtocolMessage::new(MessageCode::DtFetchResp.as_u8(), fetch_payload(DataType::Set, Some(value)))
}

pub fn map_message(entries: Vec<pb::MapEntry>) -> ProtocolMessage {
    let value = pb::DtValue { map_value: entries, ..Default::default() };
    ProtocolMessage::new(MessageCode::DtFetchResp.as_u8(), fetch_payload(DataType::Map, Some(value)))
}
