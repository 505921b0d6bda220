/*
    parser.rs - Build CrdtElement trees from datatype payloads

    The parser is the only producer of CrdtElement values on the decode path:
    - DtValue (fetch) and DtUpdateResp (update) bodies become one element
    - MapEntry lists become Map elements, recursing into nested maps

    Every element it returns agrees with the tag it was built for, and map
    nesting never exceeds max_depth. Errors carry the response code that
    delivered the payload.
*/

use super::converter::{supported_depth, DEFAULT_MAX_MAP_DEPTH};
use super::datatypes::DatatypeKind;
use super::element::{CrdtElement, CrdtType, MapKey};
use crate::core_proto::errors::{DecodeError, DecodeResult};
use crate::core_proto::pb;
use crate::core_proto::pb::map_field::MapFieldType;
use bytes::Bytes;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::trace;

/// Element builder for one response
#[derive(Debug, Clone, Copy)]
pub struct ElementParser {
    code: u8,
    max_depth: usize,
}

impl ElementParser {
    pub fn new(code: u8) -> Self {
        Self::with_max_depth(code, DEFAULT_MAX_MAP_DEPTH)
    }

    pub fn with_max_depth(code: u8, max_depth: usize) -> Self {
        ElementParser { code, max_depth: supported_depth(max_depth) }
    }

    fn malformed(&self, reason: impl Into<String>) -> DecodeError {
        DecodeError::malformed(self.code, reason)
    }

    /// Parse a fetched value whose family is `kind`.
    ///
    /// Only the field for `kind` may be populated.
    pub fn parse_value(&self, kind: DatatypeKind, value: pb::DtValue) -> DecodeResult<CrdtElement> {
        let populated = populated_fields(value.counter_value.is_some(), &value.set_value, &value.map_value);
        if let Some(other) = populated.iter().find(|k| **k != kind) {
            return Err(self.malformed(format!("{} value carries a {} field", kind, other)));
        }

        match kind {
            DatatypeKind::Counter => Ok(CrdtElement::Counter(value.counter_value.unwrap_or(0))),
            DatatypeKind::Set => Ok(set_element(value.set_value)),
            DatatypeKind::Map => self.parse_entries(value.map_value, 1),
        }
    }

    /// Parse an update body.
    ///
    /// With `expected` unset the family is taken from the populated field.
    /// Returns `None` when no value field is populated, which includes an
    /// empty set or map body.
    pub fn parse_update(
        &self,
        expected: Option<DatatypeKind>,
        resp: &mut pb::DtUpdateResp,
    ) -> DecodeResult<Option<CrdtElement>> {
        let populated = populated_fields(resp.counter_value.is_some(), &resp.set_value, &resp.map_value);
        let kind = match populated.as_slice() {
            [] => return Ok(None),
            [kind] => *kind,
            _ => return Err(self.malformed("update response carries more than one value field")),
        };
        if let Some(expected) = expected {
            if expected != kind {
                return Err(self.malformed(format!("expected {} update body, found {}", expected, kind)));
            }
        }

        let element = match kind {
            DatatypeKind::Counter => CrdtElement::Counter(resp.counter_value.unwrap_or(0)),
            DatatypeKind::Set => set_element(std::mem::take(&mut resp.set_value)),
            DatatypeKind::Map => self.parse_entries(std::mem::take(&mut resp.map_value), 1)?,
        };
        Ok(Some(element))
    }

    /// Parse map entries at nesting level `depth` (1 for a top-level map)
    pub fn parse_entries(&self, entries: Vec<pb::MapEntry>, depth: usize) -> DecodeResult<CrdtElement> {
        if depth > self.max_depth {
            return Err(DecodeError::NestingTooDeep { limit: self.max_depth });
        }
        trace!(code = self.code, depth, entries = entries.len(), "parsing map entries");

        let mut parsed = HashMap::with_capacity(entries.len());
        for entry in entries {
            let (key, element) = self.parse_entry(entry, depth)?;
            match parsed.entry(key) {
                Entry::Occupied(slot) => {
                    return Err(self.malformed(format!("duplicate map entry {}", slot.key())));
                }
                Entry::Vacant(slot) => {
                    slot.insert(element);
                }
            }
        }
        Ok(CrdtElement::Map(parsed))
    }

    fn parse_entry(&self, entry: pb::MapEntry, depth: usize) -> DecodeResult<(MapKey, CrdtElement)> {
        let field = entry.field.ok_or_else(|| self.malformed("map entry without field"))?;
        let field_type = MapFieldType::try_from(field.field_type)
            .map_err(|_| self.malformed(format!("unknown map field type {}", field.field_type)))?;
        let name = String::from_utf8(field.name)
            .map_err(|e| self.malformed(format!("map field name is not UTF-8: {}", e)))?;

        let element = match field_type {
            MapFieldType::Counter => CrdtElement::Counter(entry.counter_value.unwrap_or(0)),
            MapFieldType::Set => set_element(entry.set_value),
            MapFieldType::Register => {
                CrdtElement::Register(entry.register_value.map(Bytes::from).unwrap_or_default())
            }
            MapFieldType::Flag => CrdtElement::Flag(entry.flag_value.unwrap_or(false)),
            MapFieldType::Map => self.parse_entries(entry.map_value, depth + 1)?,
        };

        Ok((MapKey::new(name, crdt_type_of(field_type)), element))
    }
}

fn set_element(members: Vec<Vec<u8>>) -> CrdtElement {
    CrdtElement::Set(members.into_iter().map(Bytes::from).collect())
}

fn populated_fields(counter: bool, set: &[Vec<u8>], map: &[pb::MapEntry]) -> Vec<DatatypeKind> {
    let mut kinds = Vec::with_capacity(1);
    if counter {
        kinds.push(DatatypeKind::Counter);
    }
    if !set.is_empty() {
        kinds.push(DatatypeKind::Set);
    }
    if !map.is_empty() {
        kinds.push(DatatypeKind::Map);
    }
    kinds
}

fn crdt_type_of(field_type: MapFieldType) -> CrdtType {
    match field_type {
        MapFieldType::Counter => CrdtType::Counter,
        MapFieldType::Set => CrdtType::Set,
        MapFieldType::Register => CrdtType::Register,
        MapFieldType::Flag => CrdtType::Flag,
        MapFieldType::Map => CrdtType::Map,
    }
}
