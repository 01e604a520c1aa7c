//! Kind-keyed mapping
//!
//! Every kind-keyed structure (selections, the component index, pending views,
//! dependency reports) shares one JSON shape: OmniStudio kinds are top-level
//! keys and metadata subtypes are nested under `Metadata`.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::value_objects::{ComponentKind, METADATA_KEY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindMap<V>(BTreeMap<ComponentKind, V>);

impl<V> KindMap<V> {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, kind: &ComponentKind) -> Option<&V> {
        self.0.get(kind)
    }

    pub fn get_mut(&mut self, kind: &ComponentKind) -> Option<&mut V> {
        self.0.get_mut(kind)
    }

    pub fn insert(&mut self, kind: ComponentKind, value: V) -> Option<V> {
        self.0.insert(kind, value)
    }

    pub fn remove(&mut self, kind: &ComponentKind) -> Option<V> {
        self.0.remove(kind)
    }

    pub fn contains_kind(&self, kind: &ComponentKind) -> bool {
        self.0.contains_key(kind)
    }

    /// Value for `kind`, inserting the default first if absent
    pub fn entry_or_default(&mut self, kind: ComponentKind) -> &mut V
    where
        V: Default,
    {
        self.0.entry(kind).or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ComponentKind, &V)> {
        self.0.iter()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &ComponentKind> {
        self.0.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drop entries whose value fails `keep`
    pub fn retain(&mut self, mut keep: impl FnMut(&ComponentKind, &mut V) -> bool) {
        self.0.retain(|k, v| keep(k, v));
    }
}

impl<V> Default for KindMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(ComponentKind, V)> for KindMap<V> {
    fn from_iter<I: IntoIterator<Item = (ComponentKind, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<V> IntoIterator for KindMap<V> {
    type Item = (ComponentKind, V);
    type IntoIter = std::collections::btree_map::IntoIter<ComponentKind, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a KindMap<V> {
    type Item = (&'a ComponentKind, &'a V);
    type IntoIter = std::collections::btree_map::Iter<'a, ComponentKind, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<V: Serialize> Serialize for KindMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut metadata: BTreeMap<&str, &V> = BTreeMap::new();
        let mut map = serializer.serialize_map(None)?;
        for (kind, value) in &self.0 {
            match kind {
                ComponentKind::Metadata(subtype) => {
                    metadata.insert(subtype.as_str(), value);
                }
                other => map.serialize_entry(other.label(), value)?,
            }
        }
        if !metadata.is_empty() {
            map.serialize_entry(METADATA_KEY, &metadata)?;
        }
        map.end()
    }
}

struct KindMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for KindMapVisitor<V> {
    type Value = KindMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map keyed by component type")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut out = BTreeMap::new();
        while let Some(key) = access.next_key::<String>()? {
            if key == METADATA_KEY {
                let nested: BTreeMap<String, V> = access.next_value()?;
                for (subtype, value) in nested {
                    if subtype.trim().is_empty() {
                        return Err(de::Error::custom("metadata subtype must not be empty"));
                    }
                    out.insert(ComponentKind::Metadata(subtype), value);
                }
            } else {
                let kind = ComponentKind::parse_omni(&key).ok_or_else(|| {
                    de::Error::custom(format!(
                        "unknown component type '{}' (metadata subtypes belong under '{}')",
                        key, METADATA_KEY
                    ))
                })?;
                out.insert(kind, access.next_value()?);
            }
        }
        Ok(KindMap(out))
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for KindMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(KindMapVisitor(PhantomData))
    }
}
