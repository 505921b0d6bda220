//! Payload fixtures
//!
//! Builders for datatype payloads as the server would encode them.

use crate::core_proto::codes::MessageCode;
use crate::core_proto::message::ProtocolMessage;
use crate::core_proto::pb;
use crate::core_proto::pb::dt_fetch_resp::DataType;
use crate::core_proto::pb::map_field::MapFieldType;
use prost::Message;

/// Builder for a list of map entries
#[derive(Debug, Clone, Default)]
pub struct TestMapBuilder {
    entries: Vec<pb::MapEntry>,
}

impl TestMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(name: &str, field_type: MapFieldType) -> pb::MapEntry {
        pb::MapEntry {
            field: Some(pb::MapField { name: name.as_bytes().to_vec(), field_type: field_type as i32 }),
            ..Default::default()
        }
    }

    pub fn counter(mut self, name: &str, value: i64) -> Self {
        let mut entry = Self::entry(name, MapFieldType::Counter);
        entry.counter_value = Some(value);
        self.entries.push(entry);
        self
    }

    pub fn set(mut self, name: &str, members: &[&str]) -> Self {
        let mut entry = Self::entry(name, MapFieldType::Set);
        entry.set_value = members.iter().map(|m| m.as_bytes().to_vec()).collect();
        self.entries.push(entry);
        self
    }

    pub fn register(mut self, name: &str, value: &str) -> Self {
        let mut entry = Self::entry(name, MapFieldType::Register);
        entry.register_value = Some(value.as_bytes().to_vec());
        self.entries.push(entry);
        self
    }

    pub fn flag(mut self, name: &str, enabled: bool) -> Self {
        let mut entry = Self::entry(name, MapFieldType::Flag);
        entry.flag_value = Some(enabled);
        self.entries.push(entry);
        self
    }

    pub fn map(mut self, name: &str, inner: TestMapBuilder) -> Self {
        let mut entry = Self::entry(name, MapFieldType::Map);
        entry.map_value = inner.entries;
        self.entries.push(entry);
        self
    }

    pub fn build(self) -> Vec<pb::MapEntry> {
        self.entries
    }
}

fn fetch_message(data_type: DataType, value: Option<pb::DtValue>) -> ProtocolMessage {
    let resp = pb::DtFetchResp {
        context: Some(b"test-context".to_vec()),
        data_type: data_type as i32,
        value,
    };
    ProtocolMessage::new(MessageCode::DtFetchResp.as_u8(), resp.encode_to_vec())
}

pub fn counter_fetch(value: i64) -> ProtocolMessage {
    fetch_message(DataType::Counter, Some(pb::DtValue { counter_value: Some(value), ..Default::default() }))
}

pub fn set_fetch(members: &[&str]) -> ProtocolMessage {
    let set_value = members.iter().map(|m| m.as_bytes().to_vec()).collect();
    fetch_message(DataType::Set, Some(pb::DtValue { set_value, ..Default::default() }))
}

pub fn map_fetch(map: TestMapBuilder) -> ProtocolMessage {
    fetch_message(DataType::Map, Some(pb::DtValue { map_value: map.build(), ..Default::default() }))
}

pub fn not_found_fetch(data_type: DataType) -> ProtocolMessage {
    fetch_message(data_type, None)
}

pub fn error_response(errcode: u32, message: &str) -> ProtocolMessage {
    let resp = pb::RpbErrorResp { errmsg: message.as_bytes().to_vec(), errcode };
    ProtocolMessage::new(MessageCode::ErrorResp.as_u8(), resp.encode_to_vec())
}
