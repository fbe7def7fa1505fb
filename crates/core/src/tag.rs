//! Typed tag tree used as every version's decoded representation
//!
//! Each format version decodes its bytes into a [`Compound`]: an
//! insertion-ordered map of named [`Tag`]s. Keeping insertion order is what
//! lets a decode followed by an encode reproduce the original bytes exactly.

use crate::error::{Error, Result};
use std::fmt;

/// Discriminates between tag variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// 8-bit signed integer
    Byte,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// Raw byte array
    ByteArray,
    /// UTF-8 string
    String,
    /// Homogeneous list
    List,
    /// Nested compound
    Compound,
    /// 32-bit integer array
    IntArray,
    /// 64-bit integer array
    LongArray,
}

impl TagKind {
    /// Wire identifier of this kind
    pub const fn id(self) -> u8 {
        match self {
            TagKind::Byte => 1,
            TagKind::Short => 2,
            TagKind::Int => 3,
            TagKind::Long => 4,
            TagKind::Float => 5,
            TagKind::Double => 6,
            TagKind::ByteArray => 7,
            TagKind::String => 8,
            TagKind::List => 9,
            TagKind::Compound => 10,
            TagKind::IntArray => 11,
            TagKind::LongArray => 12,
        }
    }

    /// Kind for a wire identifier
    pub const fn from_id(id: u8) -> Option<Self> {
        Some(match id {
            1 => TagKind::Byte,
            2 => TagKind::Short,
            3 => TagKind::Int,
            4 => TagKind::Long,
            5 => TagKind::Float,
            6 => TagKind::Double,
            7 => TagKind::ByteArray,
            8 => TagKind::String,
            9 => TagKind::List,
            10 => TagKind::Compound,
            11 => TagKind::IntArray,
            12 => TagKind::LongArray,
            _ => return None,
        })
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A single typed value in the tree
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    /// 8-bit signed integer
    Byte(i8),
    /// 16-bit signed integer
    Short(i16),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// Raw byte array
    ByteArray(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// List of tags; all elements share one kind
    List(Vec<Tag>),
    /// Nested compound
    Compound(Compound),
    /// 32-bit integer array
    IntArray(Vec<i32>),
    /// 64-bit integer array
    LongArray(Vec<i64>),
}

impl Tag {
    /// Kind of this tag
    pub fn kind(&self) -> TagKind {
        match self {
            Tag::Byte(_) => TagKind::Byte,
            Tag::Short(_) => TagKind::Short,
            Tag::Int(_) => TagKind::Int,
            Tag::Long(_) => TagKind::Long,
            Tag::Float(_) => TagKind::Float,
            Tag::Double(_) => TagKind::Double,
            Tag::ByteArray(_) => TagKind::ByteArray,
            Tag::String(_) => TagKind::String,
            Tag::List(_) => TagKind::List,
            Tag::Compound(_) => TagKind::Compound,
            Tag::IntArray(_) => TagKind::IntArray,
            Tag::LongArray(_) => TagKind::LongArray,
        }
    }

    /// Integer value of any integral scalar tag
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Tag::Byte(v) => Some(*v as i64),
            Tag::Short(v) => Some(*v as i64),
            Tag::Int(v) => Some(*v as i64),
            Tag::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Float value of any floating scalar tag
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Tag::Float(v) => Some(*v as f64),
            Tag::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// String contents
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tag::String(s) => Some(s),
            _ => None,
        }
    }

    /// Compound contents
    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Tag::Compound(c) => Some(c),
            _ => None,
        }
    }

    /// List contents
    pub fn as_list(&self) -> Option<&[Tag]> {
        match self {
            Tag::List(items) => Some(items),
            _ => None,
        }
    }

    /// Int array contents
    pub fn as_int_array(&self) -> Option<&[i32]> {
        match self {
            Tag::IntArray(values) => Some(values),
            _ => None,
        }
    }

    /// Long array contents
    pub fn as_long_array(&self) -> Option<&[i64]> {
        match self {
            Tag::LongArray(values) => Some(values),
            _ => None,
        }
    }

    /// Byte array contents
    pub fn as_byte_array(&self) -> Option<&[u8]> {
        match self {
            Tag::ByteArray(values) => Some(values),
            _ => None,
        }
    }
}

impl From<Compound> for Tag {
    fn from(c: Compound) -> Self {
        Tag::Compound(c)
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Tag::String(s.to_string())
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        Tag::String(s)
    }
}

impl From<i32> for Tag {
    fn from(v: i32) -> Self {
        Tag::Int(v)
    }
}

impl From<i64> for Tag {
    fn from(v: i64) -> Self {
        Tag::Long(v)
    }
}

/// Insertion-ordered map of named tags with unique keys
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compound {
    entries: Vec<(String, Tag)>,
}

impl Compound {
    /// Create an empty compound
    pub fn new() -> Self {
        Compound {
            entries: Vec::new(),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the compound has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    /// Get the tag stored under `key`
    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Get a mutable reference to the tag stored under `key`
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Tag> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Whether `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Insert or replace. A replaced entry keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Tag>) -> Option<Tag> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove `key`, preserving the order of the remaining entries
    pub fn remove(&mut self, key: &str) -> Option<Tag> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    /// Rename `from` to `to` in place. Returns false if `from` is absent.
    ///
    /// An existing `to` entry is replaced; the renamed entry keeps the
    /// position of `from`.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return self.contains_key(from);
        }
        if !self.contains_key(from) {
            return false;
        }
        self.remove(to);
        match self.position(from) {
            Some(i) => {
                self.entries[i].0 = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    // =========================================================================
    // Typed access
    // =========================================================================

    /// Get `key` or fail with a structural mismatch
    pub fn require(&self, key: &str) -> Result<&Tag> {
        self.get(key)
            .ok_or_else(|| Error::mismatch(format!("missing field '{}'", key)))
    }

    fn require_kind<'a, T: ?Sized>(
        &'a self,
        key: &str,
        expected: TagKind,
        extract: impl FnOnce(&'a Tag) -> Option<&'a T>,
    ) -> Result<&'a T> {
        let tag = self.require(key)?;
        extract(tag).ok_or_else(|| {
            Error::mismatch(format!(
                "field '{}' is {}, expected {}",
                key,
                tag.kind(),
                expected
            ))
        })
    }

    /// Integral field widened to `i64`
    pub fn require_i64(&self, key: &str) -> Result<i64> {
        let tag = self.require(key)?;
        tag.as_i64().ok_or_else(|| {
            Error::mismatch(format!("field '{}' is {}, expected integer", key, tag.kind()))
        })
    }

    /// Floating field widened to `f64`
    pub fn require_f64(&self, key: &str) -> Result<f64> {
        let tag = self.require(key)?;
        tag.as_f64().ok_or_else(|| {
            Error::mismatch(format!("field '{}' is {}, expected float", key, tag.kind()))
        })
    }

    /// String field
    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.require_kind(key, TagKind::String, Tag::as_str)
    }

    /// Compound field
    pub fn require_compound(&self, key: &str) -> Result<&Compound> {
        self.require_kind(key, TagKind::Compound, Tag::as_compound)
    }

    /// List field
    pub fn require_list(&self, key: &str) -> Result<&[Tag]> {
        self.require_kind(key, TagKind::List, Tag::as_list)
    }

    /// Int array field
    pub fn require_int_array(&self, key: &str) -> Result<&[i32]> {
        self.require_kind(key, TagKind::IntArray, Tag::as_int_array)
    }

    /// Long array field
    pub fn require_long_array(&self, key: &str) -> Result<&[i64]> {
        self.require_kind(key, TagKind::LongArray, Tag::as_long_array)
    }
}

impl<K: Into<String>> FromIterator<(K, Tag)> for Compound {
    fn from_iter<I: IntoIterator<Item = (K, Tag)>>(iter: I) -> Self {
        let mut compound = Compound::new();
        for (k, v) in iter {
            compound.insert(k, v);
        }
        compound
    }
}

impl IntoIterator for Compound {
    type Item = (String, Tag);
    type IntoIter = std::vec::IntoIter<(String, Tag)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
