/*
    element.rs - Decoded CRDT value tree

    A CrdtElement is exactly one of counter, set, map, register or flag.
    Maps own their children, so a tree is finite and acyclic by construction.
    Typed accessors fail with TypeMismatch for any other variant; nothing is
    coerced.
*/

use crate::core_proto::errors::{DecodeError, DecodeResult};
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;

/// Type tag of a CRDT value, also used in map keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CrdtType {
    Counter,
    Set,
    Map,
    Register,
    Flag,
}

impl CrdtType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrdtType::Counter => "counter",
            CrdtType::Set => "set",
            CrdtType::Map => "map",
            CrdtType::Register => "register",
            CrdtType::Flag => "flag",
        }
    }
}

impl fmt::Display for CrdtType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map entry key: a name is unique per type, so ("a", Counter) and
/// ("a", Set) are different entries
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapKey {
    name: String,
    field_type: CrdtType,
}

impl MapKey {
    pub fn new(name: impl Into<String>, field_type: CrdtType) -> Self {
        MapKey { name: name.into(), field_type }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> CrdtType {
        self.field_type
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.field_type)
    }
}

/// Tagged CRDT value tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrdtElement {
    Counter(i64),
    /// Members in wire order; duplicates are kept here and collapse in RiakSet
    Set(Vec<Bytes>),
    Map(HashMap<MapKey, CrdtElement>),
    Register(Bytes),
    Flag(bool),
}

impl CrdtElement {
    pub fn counter(value: i64) -> Self {
        CrdtElement::Counter(value)
    }

    pub fn set<I, B>(members: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        CrdtElement::Set(members.into_iter().map(Into::into).collect())
    }

    /// Build a map; a repeated key keeps the last value
    pub fn map<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (MapKey, CrdtElement)>,
    {
        CrdtElement::Map(entries.into_iter().collect())
    }

    pub fn register(value: impl Into<Bytes>) -> Self {
        CrdtElement::Register(value.into())
    }

    pub fn flag(enabled: bool) -> Self {
        CrdtElement::Flag(enabled)
    }

    /// Active variant
    pub fn crdt_type(&self) -> CrdtType {
        match self {
            CrdtElement::Counter(_) => CrdtType::Counter,
            CrdtElement::Set(_) => CrdtType::Set,
            CrdtElement::Map(_) => CrdtType::Map,
            CrdtElement::Register(_) => CrdtType::Register,
            CrdtElement::Flag(_) => CrdtType::Flag,
        }
    }

    pub fn is_counter(&self) -> bool {
        matches!(self, CrdtElement::Counter(_))
    }

    pub fn is_set(&self) -> bool {
        matches!(self, CrdtElement::Set(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, CrdtElement::Map(_))
    }

    pub fn is_register(&self) -> bool {
        matches!(self, CrdtElement::Register(_))
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, CrdtElement::Flag(_))
    }

    fn mismatch(&self, expected: CrdtType) -> DecodeError {
        DecodeError::mismatch(expected, self.crdt_type())
    }

    pub fn as_counter(&self) -> DecodeResult<i64> {
        match self {
            CrdtElement::Counter(value) => Ok(*value),
            other => Err(other.mismatch(CrdtType::Counter)),
        }
    }

    pub fn as_set(&self) -> DecodeResult<&[Bytes]> {
        match self {
            CrdtElement::Set(members) => Ok(members),
            other => Err(other.mismatch(CrdtType::Set)),
        }
    }

    pub fn as_map(&self) -> DecodeResult<&HashMap<MapKey, CrdtElement>> {
        match self {
            CrdtElement::Map(entries) => Ok(entries),
            other => Err(other.mismatch(CrdtType::Map)),
        }
    }

    pub fn as_register(&self) -> DecodeResult<&Bytes> {
        match self {
            CrdtElement::Register(value) => Ok(value),
            other => Err(other.mismatch(CrdtType::Register)),
        }
    }

    pub fn as_flag(&self) -> DecodeResult<bool> {
        match self {
            CrdtElement::Flag(enabled) => Ok(*enabled),
            other => Err(other.mismatch(CrdtType::Flag)),
        }
    }

    pub fn into_set(self) -> DecodeResult<Vec<Bytes>> {
        match self {
            CrdtElement::Set(members) => Ok(members),
            other => Err(other.mismatch(CrdtType::Set)),
        }
    }

    pub fn into_map(self) -> DecodeResult<HashMap<MapKey, CrdtElement>> {
        match self {
            CrdtElement::Map(entries) => Ok(entries),
            other => Err(other.mismatch(CrdtType::Map)),
        }
    }

    pub fn into_register(self) -> DecodeResult<Bytes> {
        match self {
            CrdtElement::Register(value) => Ok(value),
            other => Err(other.mismatch(CrdtType::Register)),
        }
    }

    /// Map nesting depth: 0 for leaves, 1 for a map of leaves
    pub fn depth(&self) -> usize {
        match self {
            CrdtElement::Map(entries) => 1 + entries.values().map(|e| e.depth()).max().unwrap_or(0),
            _ => 0,
        }
    }
}
