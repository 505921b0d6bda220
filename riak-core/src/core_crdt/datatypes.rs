/*
    datatypes.rs - Typed datatype snapshots

    Immutable values handed to application code after conversion:
    - RiakCounter, RiakSet, RiakMap: the top-level datatype families
    - RiakRegister, RiakFlag: leaves that only live inside maps

    A RiakMap owns its nested values, and each value's variant matches the
    type in its key. Only the converters build maps, which keeps that true.
*/

use super::element::{CrdtType, MapKey};
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Top-level datatype families a fetch can return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatatypeKind {
    Counter,
    Set,
    Map,
}

impl DatatypeKind {
    pub fn crdt_type(&self) -> CrdtType {
        match self {
            DatatypeKind::Counter => CrdtType::Counter,
            DatatypeKind::Set => CrdtType::Set,
            DatatypeKind::Map => CrdtType::Map,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.crdt_type().as_str()
    }
}

impl TryFrom<CrdtType> for DatatypeKind {
    type Error = CrdtType;

    fn try_from(value: CrdtType) -> Result<Self, Self::Error> {
        match value {
            CrdtType::Counter => Ok(DatatypeKind::Counter),
            CrdtType::Set => Ok(DatatypeKind::Set),
            CrdtType::Map => Ok(DatatypeKind::Map),
            other => Err(other),
        }
    }
}

impl fmt::Display for DatatypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counter value; may be negative after decrements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RiakCounter {
    value: i64,
}

impl RiakCounter {
    pub fn new(value: i64) -> Self {
        RiakCounter { value }
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

/// Set of distinct byte strings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RiakSet {
    elements: HashSet<Bytes>,
}

impl RiakSet {
    /// Duplicates collapse by byte content
    pub fn new<I: IntoIterator<Item = Bytes>>(members: I) -> Self {
        RiakSet { elements: members.into_iter().collect() }
    }

    pub fn contains(&self, member: impl AsRef<[u8]>) -> bool {
        self.elements.contains(member.as_ref())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bytes> {
        self.elements.iter()
    }

    pub fn elements(&self) -> &HashSet<Bytes> {
        &self.elements
    }

    /// Members sorted by byte content
    pub fn to_sorted_vec(&self) -> Vec<Bytes> {
        let mut members: Vec<Bytes> = self.elements.iter().cloned().collect();
        members.sort();
        members
    }
}

/// Last-write-wins register (map entries only)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RiakRegister {
    value: Bytes,
}

impl RiakRegister {
    pub fn new(value: Bytes) -> Self {
        RiakRegister { value }
    }

    pub fn value(&self) -> &Bytes {
        &self.value
    }

    /// Value as UTF-8, if it is valid
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.value).ok()
    }
}

/// Enable/disable flag (map entries only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RiakFlag {
    enabled: bool,
}

impl RiakFlag {
    pub fn new(enabled: bool) -> Self {
        RiakFlag { enabled }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

/// Map of named, typed datatypes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RiakMap {
    entries: HashMap<MapKey, RiakDatatype>,
}

impl RiakMap {
    pub(crate) fn from_entries(entries: HashMap<MapKey, RiakDatatype>) -> Self {
        RiakMap { entries }
    }

    pub fn get(&self, name: &str, field_type: CrdtType) -> Option<&RiakDatatype> {
        self.entries.get(&MapKey::new(name, field_type))
    }

    pub fn get_counter(&self, name: &str) -> Option<&RiakCounter> {
        self.get(name, CrdtType::Counter).and_then(RiakDatatype::as_counter)
    }

    pub fn get_set(&self, name: &str) -> Option<&RiakSet> {
        self.get(name, CrdtType::Set).and_then(RiakDatatype::as_set)
    }

    pub fn get_map(&self, name: &str) -> Option<&RiakMap> {
        self.get(name, CrdtType::Map).and_then(RiakDatatype::as_map)
    }

    pub fn get_register(&self, name: &str) -> Option<&RiakRegister> {
        self.get(name, CrdtType::Register).and_then(RiakDatatype::as_register)
    }

    pub fn get_flag(&self, name: &str) -> Option<&RiakFlag> {
        self.get(name, CrdtType::Flag).and_then(RiakDatatype::as_flag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MapKey, &RiakDatatype)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &MapKey> {
        self.entries.keys()
    }
}

/// Any converted datatype; the variant always matches `crdt_type()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiakDatatype {
    Counter(RiakCounter),
    Set(RiakSet),
    Map(RiakMap),
    Register(RiakRegister),
    Flag(RiakFlag),
}

impl RiakDatatype {
    pub fn crdt_type(&self) -> CrdtType {
        match self {
            RiakDatatype::Counter(_) => CrdtType::Counter,
            RiakDatatype::Set(_) => CrdtType::Set,
            RiakDatatype::Map(_) => CrdtType::Map,
            RiakDatatype::Register(_) => CrdtType::Register,
            RiakDatatype::Flag(_) => CrdtType::Flag,
        }
    }

    pub fn as_counter(&self) -> Option<&RiakCounter> {
        match self {
            RiakDatatype::Counter(counter) => Some(counter),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&RiakSet> {
        match self {
            RiakDatatype::Set(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&RiakMap> {
        match self {
            RiakDatatype::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_register(&self) -> Option<&RiakRegister> {
        match self {
            RiakDatatype::Register(register) => Some(register),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<&RiakFlag> {
        match self {
            RiakDatatype::Flag(flag) => Some(flag),
            _ => None,
        }
    }
}

impl From<RiakCounter> for RiakDatatype {
    fn from(value: RiakCounter) -> Self {
        RiakDatatype::Counter(value)
    }
}

impl From<RiakSet> for RiakDatatype {
    fn from(value: RiakSet) -> Self {
        RiakDatatype::Set(value)
    }
}

impl From<RiakMap> for RiakDatatype {
    fn from(value: RiakMap) -> Self {
        RiakDatatype::Map(value)
    }
}
