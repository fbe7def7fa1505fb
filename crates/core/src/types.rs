//! Namespaced identities and the value records built on them
//!
//! This module defines:
//! - NamespacedId: `(namespace, base_name)` pair naming a block/item/biome type
//! - Value: scalar-or-list value used for block properties and metadata
//! - Block: block state with properties and free-form metadata
//! - BlockItem / Item: item records with metadata
//!
//! All records are immutable by convention: builders return new values and
//! equality/hashing is structural over every field.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A `(namespace, base_name)` pair, written `namespace:base_name`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NamespacedId {
    namespace: String,
    base_name: String,
}

impl NamespacedId {
    /// Create an identity from its parts
    pub fn new(namespace: impl Into<String>, base_name: impl Into<String>) -> Self {
        NamespacedId {
            namespace: namespace.into(),
            base_name: base_name.into(),
        }
    }

    /// The namespace part
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The base name part
    pub fn base_name(&self) -> &str {
        &self.base_name
    }
}

impl fmt::Display for NamespacedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.base_name)
    }
}

impl FromStr for NamespacedId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((ns, base)) if !ns.is_empty() && !base.is_empty() && !base.contains(':') => {
                Ok(NamespacedId::new(ns, base))
            }
            _ => Err(Error::InvalidIdentifier(format!(
                "'{}' is not of the form namespace:base_name",
                s
            ))),
        }
    }
}

/// Records that carry a namespaced identity
pub trait Namespaced {
    /// The namespace part
    fn namespace(&self) -> &str;

    /// The base name part
    fn base_name(&self) -> &str;

    /// The identity as an owned pair
    fn namespaced_id(&self) -> NamespacedId {
        NamespacedId::new(self.namespace(), self.base_name())
    }
}

/// Property or metadata value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Value {
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// String
    Str(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Nested list
    List(Vec<Value>),
}

impl Value {
    /// Parse a blockstate property literal: `true`/`false`, an integer, or a bare string
    pub fn parse_literal(s: &str) -> Self {
        match s {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => match s.parse::<i64>() {
                Ok(v) => Value::Int(v),
                Err(_) => Value::Str(s.to_string()),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{}", v),
            Value::Bytes(v) => {
                for b in v {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

// =============================================================================
// Block
// =============================================================================

/// A block state
///
/// The blockstate string form is `namespace:base_name[key=value,...]` with
/// properties in key order. Property literals are parsed with
/// [`Value::parse_literal`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Block {
    namespace: String,
    base_name: String,
    #[serde(default)]
    properties: BTreeMap<String, Value>,
    #[serde(default)]
    metadata: BTreeMap<String, Value>,
}

impl Block {
    /// Create a block with no properties or metadata
    pub fn new(namespace: impl Into<String>, base_name: impl Into<String>) -> Self {
        Block {
            namespace: namespace.into(),
            base_name: base_name.into(),
            properties: BTreeMap::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Copy of this block with `key` set to `value`
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Copy of this block with metadata `key` set to `value`
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Block state properties
    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    /// Free-form auxiliary data
    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    /// The blockstate string, without metadata
    pub fn blockstate(&self) -> String {
        self.to_string()
    }
}

impl Namespaced for Block {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn base_name(&self) -> &str {
        &self.base_name
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.base_name)?;
        if !self.properties.is_empty() {
            write!(f, "[")?;
            for (i, (k, v)) in self.properties.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}={}", k, v)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl FromStr for Block {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (id, props) = match s.find('[') {
            Some(open) => {
                let body = s[open + 1..].strip_suffix(']').ok_or_else(|| {
                    Error::InvalidIdentifier(format!("unterminated properties in '{}'", s))
                })?;
                (&s[..open], Some(body))
            }
            None => (s, None),
        };
        let id: NamespacedId = id.parse()?;
        let mut block = Block::new(id.namespace, id.base_name);
        if let Some(body) = props.filter(|b| !b.is_empty()) {
            for pair in body.split(',') {
                let (k, v) = pair.split_once('=').ok_or_else(|| {
                    Error::InvalidIdentifier(format!("property '{}' has no value", pair))
                })?;
                let k = k.trim();
                if k.is_empty() {
                    return Err(Error::InvalidIdentifier(format!(
                        "empty property name in '{}'",
                        s
                    )));
                }
                block
                    .properties
                    .insert(k.to_string(), Value::parse_literal(v.trim()));
            }
        }
        Ok(block)
    }
}

// =============================================================================
// Items
// =============================================================================

/// An item that places a block
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockItem {
    namespace: String,
    base_name: String,
    #[serde(default)]
    metadata: BTreeMap<String, Value>,
}

impl BlockItem {
    /// Create a block item with no metadata
    pub fn new(namespace: impl Into<String>, base_name: impl Into<String>) -> Self {
        BlockItem {
            namespace: namespace.into(),
            base_name: base_name.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Copy with metadata `key` set to `value`
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Free-form auxiliary data
    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }
}

impl Namespaced for BlockItem {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn base_name(&self) -> &str {
        &self.base_name
    }
}

/// A plain item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    namespace: String,
    base_name: String,
    #[serde(default)]
    metadata: BTreeMap<String, Value>,
}

impl Item {
    /// Create an item with no metadata
    pub fn new(namespace: impl Into<String>, base_name: impl Into<String>) -> Self {
        Item {
            namespace: namespace.into(),
            base_name: base_name.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Copy with metadata `key` set to `value`
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Free-form auxiliary data
    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }
}

impl Namespaced for Item {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn base_name(&self) -> &str {
        &self.base_name
    }
}
