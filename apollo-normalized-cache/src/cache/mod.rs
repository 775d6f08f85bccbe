//! The normalized entity table and its supporting types.

use std::borrow::Borrow;
use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use crate::json_ext::Object;
use crate::json_ext::deep_merge_objects;
use crate::json_ext::Value;

pub mod key;
pub mod stale;

/// Entity anchoring the root fields of queries.
pub const ROOT_QUERY: &str = "ROOT_QUERY";
/// Entity anchoring the root fields of mutations.
pub const ROOT_MUTATION: &str = "ROOT_MUTATION";
/// Entity anchoring the root fields of subscriptions.
pub const ROOT_SUBSCRIPTION: &str = "ROOT_SUBSCRIPTION";

/// Unique identifier of a cached entity, such as `Post;123`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

impl From<String> for EntityKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl Borrow<str> for EntityKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<EntityKey> for Value {
    fn from(key: EntityKey) -> Self {
        Value::String(key.0.into())
    }
}

/// The fields of one cached entity.
///
/// Fields are stored under their response key (the alias if there is one). A field selecting an
/// entity holds the entity's key as a string, a list of entities holds a list of keys, and an
/// object that cannot be identified is embedded as a nested object.
pub type NormObj = Object;

/// Table of normalized entities, by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormMap(IndexMap<EntityKey, NormObj>);

impl NormMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&NormObj> {
        self.0.get(key)
    }

    pub(crate) fn get_key_value(&self, key: &str) -> Option<(&EntityKey, &NormObj)> {
        self.0.get_key_value(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Replaces the entity stored under this key.
    pub fn insert(&mut self, key: EntityKey, entity: NormObj) -> Option<NormObj> {
        self.0.insert(key, entity)
    }

    /// Writes fields into an entity, creating it if needed. Existing fields are overwritten.
    pub fn write(&mut self, key: EntityKey, fields: NormObj) {
        let entity = self.0.entry(key).or_default();
        for (name, value) in fields {
            entity.insert(name, value);
        }
    }

    /// Writes fields into an entity, creating it if needed. Embedded objects and lists already
    /// stored are merged with the written ones.
    pub(crate) fn write_deep(&mut self, key: EntityKey, fields: NormObj) {
        deep_merge_objects(self.0.entry(key).or_default(), fields);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityKey, &NormObj)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &EntityKey> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merges `incoming` over this table, see [`merge`].
    pub fn merge(&self, incoming: &NormMap) -> NormMap {
        merge(self, incoming)
    }

    /// The table as a JSON object, entity keys mapping to their fields.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, entity)| (key.as_str().into(), Value::Object(entity.clone())))
                .collect(),
        )
    }
}

impl FromIterator<(EntityKey, NormObj)> for NormMap {
    fn from_iter<I: IntoIterator<Item = (EntityKey, NormObj)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for NormMap {
    type Item = (EntityKey, NormObj);
    type IntoIter = indexmap::map::IntoIter<EntityKey, NormObj>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl TryFrom<Value> for NormMap {
    type Error = Value;

    /// Reads a table from a JSON object of objects, handing the value back if it has another
    /// shape.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(table) if table.values().all(Value::is_object) => Ok(table
                .into_iter()
                .filter_map(|(key, entity)| match entity {
                    Value::Object(entity) => Some((EntityKey::from(key.as_str()), entity)),
                    _ => None,
                })
                .collect()),
            other => Err(other),
        }
    }
}

/// Merges two tables into a new one.
///
/// Entities present in a single table are carried over as they are. Entities present in both
/// get the fields of both, `incoming` winning on conflicts. The merge is shallow: an embedded
/// object present in `incoming` replaces the stored one as a whole.
pub fn merge(base: &NormMap, incoming: &NormMap) -> NormMap {
    let mut merged = base.clone();
    for (key, entity) in incoming.iter() {
        merged.write(key.clone(), entity.clone());
    }
    tracing::trace!(
        base = base.len(),
        incoming = incoming.len(),
        merged = merged.len(),
        "merged normalized tables"
    );
    merged
}
