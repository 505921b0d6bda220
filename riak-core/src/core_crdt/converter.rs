/*
    converter.rs - DatatypeConverter family

    One converter per datatype family: as_counter(), as_set(), as_map().
    The family is closed, so dispatch is a match on the element variant
    rather than a registry.

    The variant check happens before anything is built. Map entries are
    converted recursively, each by the converter its own key type selects.
    Map nesting is capped by the converter's max depth.
*/

use super::datatypes::{DatatypeKind, RiakCounter, RiakDatatype, RiakFlag, RiakMap, RiakRegister, RiakSet};
use super::element::{CrdtElement, CrdtType};
use crate::core_proto::errors::{DecodeError, DecodeResult};
use crate::telemetry::{counters, spans};
use std::collections::HashMap;

/// Default cap on map nesting
pub const DEFAULT_MAX_MAP_DEPTH: usize = 32;

/// Nested messages prost decodes before giving up
pub const PROTOBUF_RECURSION_LIMIT: usize = 100;

/// Deepest map nesting a response can carry.
///
/// Each map level is one nested `MapEntry`; the response, its value wrapper
/// and the entry's `MapField` use three more of prost's levels, plus one spare.
pub const MAX_SUPPORTED_MAP_DEPTH: usize = PROTOBUF_RECURSION_LIMIT - 4;

/// Clamp a configured depth to what the wire format can carry
pub(crate) fn supported_depth(max_depth: usize) -> usize {
    max_depth.min(MAX_SUPPORTED_MAP_DEPTH)
}

/// Converts a CrdtElement into one datatype family
pub trait DatatypeConverter {
    type Output;

    /// Family this converter produces
    fn kind(&self) -> DatatypeKind;

    fn convert(&self, element: CrdtElement) -> DecodeResult<Self::Output>;
}

/// Counter converter
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterConverter;

/// Set converter
#[derive(Debug, Clone, Copy, Default)]
pub struct SetConverter;

/// Map converter with a nesting cap
#[derive(Debug, Clone, Copy)]
pub struct MapConverter {
    max_depth: usize,
}

pub fn as_counter() -> CounterConverter {
    CounterConverter
}

pub fn as_set() -> SetConverter {
    SetConverter
}

pub fn as_map() -> MapConverter {
    MapConverter::default()
}

fn observed<T>(kind: CrdtType, convert: impl FnOnce() -> DecodeResult<T>) -> DecodeResult<T> {
    let op = spans::decode::trace_datatype(kind);
    let result = op.in_scope(convert);
    match &result {
        Ok(_) => {
            counters::record_datatype(kind.as_str(), "ok");
            op.complete();
        }
        Err(e) => {
            counters::record_datatype(kind.as_str(), e.kind());
            op.record_error(e);
        }
    }
    result
}

fn counter_of(element: CrdtElement) -> DecodeResult<RiakCounter> {
    element.as_counter().map(RiakCounter::new)
}

fn set_of(element: CrdtElement) -> DecodeResult<RiakSet> {
    element.into_set().map(RiakSet::new)
}

impl DatatypeConverter for CounterConverter {
    type Output = RiakCounter;

    fn kind(&self) -> DatatypeKind {
        DatatypeKind::Counter
    }

    fn convert(&self, element: CrdtElement) -> DecodeResult<RiakCounter> {
        observed(CrdtType::Counter, || counter_of(element))
    }
}

impl DatatypeConverter for SetConverter {
    type Output = RiakSet;

    fn kind(&self) -> DatatypeKind {
        DatatypeKind::Set
    }

    fn convert(&self, element: CrdtElement) -> DecodeResult<RiakSet> {
        observed(CrdtType::Set, || set_of(element))
    }
}

impl MapConverter {
    /// Depths above `MAX_SUPPORTED_MAP_DEPTH` are clamped to it
    pub fn with_max_depth(max_depth: usize) -> Self {
        MapConverter { max_depth: supported_depth(max_depth) }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn convert_at(&self, element: CrdtElement, depth: usize) -> DecodeResult<RiakMap> {
        let entries = element.into_map()?;
        if depth > self.max_depth {
            return Err(DecodeError::NestingTooDeep { limit: self.max_depth });
        }

        let mut converted = HashMap::with_capacity(entries.len());
        for (key, child) in entries {
            let value = match key.field_type() {
                CrdtType::Counter => RiakDatatype::Counter(counter_of(child)?),
                CrdtType::Set => RiakDatatype::Set(set_of(child)?),
                CrdtType::Map => RiakDatatype::Map(self.convert_at(child, depth + 1)?),
                CrdtType::Register => RiakDatatype::Register(RiakRegister::new(child.into_register()?)),
                CrdtType::Flag => RiakDatatype::Flag(RiakFlag::new(child.as_flag()?)),
            };
            converted.insert(key, value);
        }

        Ok(RiakMap::from_entries(converted))
    }
}

impl Default for MapConverter {
    fn default() -> Self {
        MapConverter { max_depth: DEFAULT_MAX_MAP_DEPTH }
    }
}

impl DatatypeConverter for MapConverter {
    type Output = RiakMap;

    fn kind(&self) -> DatatypeKind {
        DatatypeKind::Map
    }

    fn convert(&self, element: CrdtElement) -> DecodeResult<RiakMap> {
        observed(CrdtType::Map, || self.convert_at(element, 1))
    }
}

/// Convert with the family selected at runtime
pub fn convert_any(kind: DatatypeKind, element: CrdtElement, max_depth: usize) -> DecodeResult<RiakDatatype> {
    match kind {
        DatatypeKind::Counter => as_counter().convert(element).map(RiakDatatype::Counter),
        DatatypeKind::Set => as_set().convert(element).map(RiakDatatype::Set),
        DatatypeKind::Map => MapConverter::with_max_depth(max_depth).convert(element).map(RiakDatatype::Map),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_crdt::element::MapKey;
    use bytes::Bytes;

    fn key(name: &str, field_type: CrdtType) -> MapKey {
        MapKey::new(name, field_type)
    }

    #[test]
    fn test_counter_conversion() {
        assert_eq!(as_counter().convert(CrdtElement::counter(5)).unwrap().value(), 5);
        assert_eq!(as_counter().convert(CrdtElement::counter(-12)).unwrap().value(), -12);
    }

    #[test]
    fn test_counter_rejects_set() {
        let err = as_counter().convert(CrdtElement::set(["a"])).unwrap_err();
        assert_eq!(err, DecodeError::mismatch(CrdtType::Counter, CrdtType::Set));
    }

    #[test]
    fn test_set_collapses_duplicates() {
        let set = as_set().convert(CrdtElement::set(["a", "b", "a"])).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("a"));
        assert!(set.contains("b"));
    }

    #[test]
    fn test_set_rejects_map() {
        let err = as_set().convert(CrdtElement::map([])).unwrap_err();
        assert_eq!(err, DecodeError::mismatch(CrdtType::Set, CrdtType::Map));
    }

    #[test]
    fn test_map_with_counter_and_set() {
        let element = CrdtElement::map([
            (key("x", CrdtType::Counter), CrdtElement::counter(3)),
            (key("y", CrdtType::Set), CrdtElement::set(["z"])),
        ]);

        let map = as_map().convert(element).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get_counter("x"), Some(&RiakCounter::new(3)));
        assert_eq!(map.get_set("y"), Some(&RiakSet::new(vec![Bytes::from_static(b"z")])));
    }

    #[test]
    fn test_map_with_all_leaf_types() {
        let element = CrdtElement::map([
            (key("name", CrdtType::Register), CrdtElement::register("ann")),
            (key("admin", CrdtType::Flag), CrdtElement::flag(true)),
        ]);

        let map = as_map().convert(element).unwrap();
        assert_eq!(map.get_register("name").and_then(RiakRegister::as_str), Some("ann"));
        assert_eq!(map.get_flag("admin").map(RiakFlag::enabled), Some(true));
    }

    #[test]
    fn test_nested_maps() {
        let innermost = CrdtElement::map([(key("hits", CrdtType::Counter), CrdtElement::counter(9))]);
        let inner = CrdtElement::map([(key("stats", CrdtType::Map), innermost)]);
        let outer = CrdtElement::map([(key("profile", CrdtType::Map), inner)]);

        let map = as_map().convert(outer).unwrap();
        let hits = map
            .get_map("profile")
            .and_then(|m| m.get_map("stats"))
            .and_then(|m| m.get_counter("hits"))
            .map(RiakCounter::value);
        assert_eq!(hits, Some(9));
    }

    #[test]
    fn test_map_entry_tag_disagrees_with_element() {
        let element = CrdtElement::map([
            (key("ok", CrdtType::Counter), CrdtElement::counter(1)),
            (key("bad", CrdtType::Counter), CrdtElement::set(["oops"])),
        ]);
        let err = as_map().convert(element).unwrap_err();
        assert_eq!(err, DecodeError::mismatch(CrdtType::Counter, CrdtType::Set));
    }

    #[test]
    fn test_map_rejects_counter_before_building() {
        let err = as_map().convert(CrdtElement::counter(1)).unwrap_err();
        assert_eq!(err, DecodeError::mismatch(CrdtType::Map, CrdtType::Counter));
    }

    #[test]
    fn test_depth_guard() {
        let mut element = CrdtElement::map([(key("leaf", CrdtType::Flag), CrdtElement::flag(false))]);
        for i in 0..4 {
            element = CrdtElement::map([(key(&format!("level{}", i), CrdtType::Map), element)]);
        }
        assert_eq!(element.depth(), 5);

        assert!(MapConverter::with_max_depth(5).convert(element.clone()).is_ok());
        assert_eq!(
            MapConverter::with_max_depth(4).convert(element).unwrap_err(),
            DecodeError::NestingTooDeep { limit: 4 }
        );
    }

    #[test]
    fn test_depth_is_clamped() {
        assert_eq!(MapConverter::with_max_depth(200).max_depth(), MAX_SUPPORTED_MAP_DEPTH);
        assert_eq!(MapConverter::with_max_depth(7).max_depth(), 7);
        assert_eq!(as_map().max_depth(), DEFAULT_MAX_MAP_DEPTH);
    }

    #[test]
    fn test_convert_any() {
        let value = convert_any(DatatypeKind::Counter, CrdtElement::counter(2), DEFAULT_MAX_MAP_DEPTH).unwrap();
        assert_eq!(value.as_counter().map(RiakCounter::value), Some(2));
        assert!(convert_any(DatatypeKind::Map, CrdtElement::counter(2), DEFAULT_MAX_MAP_DEPTH).is_err());
    }
}
