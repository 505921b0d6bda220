//! JSON rendering of decoded responses

use riak_core::core_crdt::{FetchedDatatype, UpdatedDatatype};
use riak_core::core_proto::{FetchedObject, RiakObject, ServerInfo, StoredObject};
use riak_core::{DecodeError, RiakDatatype, RiakMap, RiakSet};
use serde_json::{json, Map, Value};

/// UTF-8 text as a string, anything else as `{"hex": ...}`
pub fn bytes(value: &[u8]) -> Value {
    match std::str::from_utf8(value) {
        Ok(text) => Value::String(text.to_string()),
        Err(_) => json!({ "hex": hex::encode(value) }),
    }
}

fn optional_bytes(value: Option<&[u8]>) -> Value {
    value.map(bytes).unwrap_or(Value::Null)
}

fn set(set: &RiakSet) -> Value {
    Value::Array(set.to_sorted_vec().iter().map(|m| bytes(m)).collect())
}

fn map(map: &RiakMap) -> Value {
    let mut keys: Vec<_> = map.keys().collect();
    keys.sort();

    let mut out = Map::new();
    for key in keys {
        if let Some(value) = map.get(key.name(), key.field_type()) {
            out.insert(key.to_string(), datatype(value));
        }
    }
    Value::Object(out)
}

pub fn datatype(value: &RiakDatatype) -> Value {
    match value {
        RiakDatatype::Counter(counter) => json!(counter.value()),
        RiakDatatype::Set(s) => set(s),
        RiakDatatype::Map(m) => map(m),
        RiakDatatype::Register(register) => bytes(register.value()),
        RiakDatatype::Flag(flag) => json!(flag.enabled()),
    }
}

pub fn fetched_datatype(kind: &str, context: Option<&[u8]>, value: Option<RiakDatatype>) -> Value {
    json!({
        "type": kind,
        "context": context.map(hex::encode),
        "found": value.is_some(),
        "value": value.as_ref().map(datatype),
    })
}

pub fn fetched(fetched: FetchedDatatype, max_depth: usize) -> Result<Value, DecodeError> {
    let kind = fetched.kind;
    let context = fetched.context.clone();
    let value = fetched.into_any(max_depth)?;
    Ok(fetched_datatype(kind.as_str(), context.as_deref(), value))
}

pub fn updated(updated: UpdatedDatatype, max_depth: usize) -> Result<Value, DecodeError> {
    let key = optional_bytes(updated.key.as_deref());
    let context = updated.context.as_deref().map(hex::encode);
    let value = updated.into_any(max_depth)?;

    Ok(json!({
        "key": key,
        "context": context,
        "type": value.as_ref().map(|v| v.crdt_type().as_str()),
        "value": value.as_ref().map(datatype),
    }))
}

fn object(object: &RiakObject) -> Value {
    json!({
        "value": bytes(&object.value),
        "content_type": object.content_type,
        "vtag": object.vtag,
        "last_modified": object.last_modified.map(|(secs, usecs)| json!({ "secs": secs, "usecs": usecs })),
        "links": object.links.iter().map(|l| json!({ "bucket": l.bucket, "key": l.key, "tag": l.tag })).collect::<Vec<_>>(),
        "user_meta": object.user_meta.iter().map(|(k, v)| (k.clone(), bytes(v))).collect::<Map<_, _>>(),
        "indexes": object.indexes.iter().map(|(k, v)| json!([k, bytes(v)])).collect::<Vec<_>>(),
        "deleted": object.deleted,
    })
}

pub fn fetched_object(fetched: &FetchedObject) -> Value {
    json!({
        "found": !fetched.is_not_found(),
        "unchanged": fetched.unchanged,
        "vclock": fetched.vclock.as_deref().map(hex::encode),
        "siblings": fetched.siblings.iter().map(object).collect::<Vec<_>>(),
    })
}

pub fn stored_object(stored: &StoredObject) -> Value {
    json!({
        "key": optional_bytes(stored.key.as_deref()),
        "vclock": stored.vclock.as_deref().map(hex::encode),
        "siblings": stored.siblings.iter().map(object).collect::<Vec<_>>(),
    })
}

pub fn server_info(info: &ServerInfo) -> Value {
    json!({ "node": info.node, "server_version": info.server_version })
}

pub fn error(err: &DecodeError) -> Value {
    json!({ "error": err.kind(), "message": err.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use riak_core::{as_map, CrdtElement, CrdtType, DatatypeConverter, MapKey};

    #[test]
    fn test_bytes_rendering() {
        assert_eq!(bytes(b"plain"), json!("plain"));
        assert_eq!(bytes(&[0xff, 0x00]), json!({ "hex": "ff00" }));
    }

    #[test]
    fn test_map_rendering() {
        let element = CrdtElement::map([
            (MapKey::new("likes", CrdtType::Counter), CrdtElement::counter(3)),
            (MapKey::new("tags", CrdtType::Set), CrdtElement::set(["b", "a"])),
            (MapKey::new("admin", CrdtType::Flag), CrdtElement::flag(true)),
        ]);
        let value = RiakDatatype::Map(as_map().convert(element).unwrap());

        assert_eq!(
            datatype(&value),
            json!({ "admin:flag": true, "likes:counter": 3, "tags:set": ["a", "b"] })
        );
    }
}
