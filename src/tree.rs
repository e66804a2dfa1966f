//! In-memory configuration tree.
//!
//! A document is a finite tree of mappings, sequences and scalars. Nodes are
//! never mutated after construction; children are shared through `Arc` so a
//! merge result can reuse untouched subtrees of its inputs.

use crate::parser::out_of_range;
use indexmap::IndexMap;
use serde::de::{
    self, Deserialize, Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor,
};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;
use std::sync::Arc;

/// Key toml uses to smuggle datetimes through `deserialize_any`.
const TOML_DATETIME_KEY: &str = "$__toml_private_datetime";

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::String(s) => write!(f, "{s}"),
        }
    }
}

/// Insertion-ordered string-keyed mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: IndexMap<String, Arc<ConfigTree>>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Arc<ConfigTree>> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<ConfigTree>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns a copy of this mapping without `key`, preserving the order of
    /// the remaining entries.
    pub fn without(&self, key: &str) -> Mapping {
        let entries = self
            .entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect();
        Mapping { entries }
    }

    /// Appends `key`, or replaces its value in place if already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Arc<ConfigTree>>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl FromIterator<(String, Arc<ConfigTree>)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (String, Arc<ConfigTree>)>>(iter: I) -> Self {
        Mapping {
            entries: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Scalar,
    Mapping,
    Sequence,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Scalar => "scalar",
            NodeKind::Mapping => "mapping",
            NodeKind::Sequence => "sequence",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigTree {
    Scalar(Scalar),
    Mapping(Mapping),
    Sequence(Vec<Arc<ConfigTree>>),
}

impl ConfigTree {
    pub fn empty_mapping() -> Self {
        ConfigTree::Mapping(Mapping::new())
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            ConfigTree::Scalar(_) => NodeKind::Scalar,
            ConfigTree::Mapping(_) => NodeKind::Mapping,
            ConfigTree::Sequence(_) => NodeKind::Sequence,
        }
    }

    /// Walk a dot-separated path. Segments index mappings by key and
    /// sequences by decimal position. An empty path returns `self`.
    pub fn get(&self, path: &str) -> Option<&ConfigTree> {
        if path.is_empty() {
            return Some(self);
        }
        let mut node = self;
        for segment in path.split('.') {
            node = match node {
                ConfigTree::Mapping(map) => map.get(segment)?.as_ref(),
                ConfigTree::Sequence(items) => {
                    let index: usize = segment.parse().ok()?;
                    items.get(index)?.as_ref()
                }
                ConfigTree::Scalar(_) => return None,
            };
        }
        Some(node)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            ConfigTree::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            ConfigTree::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Arc<ConfigTree>]> {
        match self {
            ConfigTree::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigTree::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigTree::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigTree::Scalar(Scalar::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigTree::Scalar(Scalar::Float(x)) => Some(*x),
            ConfigTree::Scalar(Scalar::Integer(i)) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigTree::Scalar(Scalar::Null))
    }
}

impl From<Scalar> for ConfigTree {
    fn from(scalar: Scalar) -> Self {
        ConfigTree::Scalar(scalar)
    }
}

impl From<Mapping> for ConfigTree {
    fn from(map: Mapping) -> Self {
        ConfigTree::Mapping(map)
    }
}

impl Serialize for ConfigTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigTree::Scalar(Scalar::Null) => serializer.serialize_unit(),
            ConfigTree::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            ConfigTree::Scalar(Scalar::Integer(i)) => serializer.serialize_i64(*i),
            ConfigTree::Scalar(Scalar::Float(x)) => serializer.serialize_f64(*x),
            ConfigTree::Scalar(Scalar::String(s)) => serializer.serialize_str(s),
            ConfigTree::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item.as_ref())?;
                }
                seq.end()
            }
            ConfigTree::Mapping(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map.iter() {
                    out.serialize_entry(key, value.as_ref())?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ConfigTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TreeVisitor)
    }
}

struct TreeVisitor;

impl<'de> Visitor<'de> for TreeVisitor {
    type Value = ConfigTree;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping, sequence or scalar")
    }

    fn visit_bool<E>(self, v: bool) -> Result<ConfigTree, E> {
        Ok(Scalar::Bool(v).into())
    }

    fn visit_i64<E>(self, v: i64) -> Result<ConfigTree, E> {
        Ok(Scalar::Integer(v).into())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ConfigTree, E> {
        i64::try_from(v)
            .map(|i| Scalar::Integer(i).into())
            .map_err(|_| E::custom(out_of_range(v)))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<ConfigTree, E> {
        i64::try_from(v)
            .map(|i| Scalar::Integer(i).into())
            .map_err(|_| E::custom(out_of_range(v)))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<ConfigTree, E> {
        i64::try_from(v)
            .map(|i| Scalar::Integer(i).into())
            .map_err(|_| E::custom(out_of_range(v)))
    }

    fn visit_f64<E>(self, v: f64) -> Result<ConfigTree, E> {
        Ok(Scalar::Float(v).into())
    }

    fn visit_str<E>(self, v: &str) -> Result<ConfigTree, E> {
        Ok(Scalar::String(v.to_string()).into())
    }

    fn visit_string<E>(self, v: String) -> Result<ConfigTree, E> {
        Ok(Scalar::String(v).into())
    }

    fn visit_unit<E>(self) -> Result<ConfigTree, E> {
        Ok(Scalar::Null.into())
    }

    fn visit_none<E>(self) -> Result<ConfigTree, E> {
        Ok(Scalar::Null.into())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<ConfigTree, D::Error> {
        ConfigTree::deserialize(deserializer)
    }

    /// Tagged values (`!Tag value`) keep their value and drop the tag.
    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> Result<ConfigTree, A::Error> {
        let (_tag, variant): (String, _) = data.variant()?;
        variant.newtype_variant()
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ConfigTree, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<ConfigTree>()? {
            items.push(Arc::new(item));
        }
        Ok(ConfigTree::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ConfigTree, A::Error> {
        let mut map = Mapping::new();
        while let Some(key) = access.next_key::<String>()? {
            if key == TOML_DATETIME_KEY {
                let stamp: String = access.next_value()?;
                return Ok(Scalar::String(stamp).into());
            }
            if map.contains_key(&key) {
                return Err(de::Error::custom(format!("duplicate key `{key}`")));
            }
            let value: ConfigTree = access.next_value()?;
            map.insert(key, value);
        }
        Ok(ConfigTree::Mapping(map))
    }
}
