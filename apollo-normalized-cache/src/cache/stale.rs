//! Stale field markers.
//!
//! Marking is the caller's decision, typically after a mutation. Denormalization only reports
//! the markers it encounters, so that the caller can refetch what it needs.

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use super::EntityKey;
use super::NormMap;

/// Stale flags of entity fields, by entity key then field name.
///
/// Entities and fields absent from this structure are not stale. An entity never keeps an empty
/// entry: clearing its last stale field removes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StaleEntities(IndexMap<EntityKey, IndexMap<String, bool>>);

impl<'de> Deserialize<'de> for StaleEntities {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entities = IndexMap::<EntityKey, IndexMap<String, bool>>::deserialize(deserializer)?;
        Ok(entities.into_iter().collect())
    }
}

impl StaleEntities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether a field of an entity is marked stale.
    pub fn is_stale(&self, key: &str, field: &str) -> bool {
        self.0
            .get(key)
            .and_then(|fields| fields.get(field))
            .copied()
            .unwrap_or(false)
    }

    /// Stale fields of an entity.
    pub fn fields(&self, key: &str) -> impl Iterator<Item = &str> {
        self.0
            .get(key)
            .into_iter()
            .flat_map(|fields| fields.iter())
            .filter(|(_, stale)| **stale)
            .map(|(field, _)| field.as_str())
    }

    /// Returns a copy with these fields of the entity marked stale.
    pub fn mark_stale<I, S>(&self, key: &EntityKey, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut updated = self.clone();
        let entity = updated.0.entry(key.clone()).or_default();
        for field in fields {
            entity.insert(field.into(), true);
        }
        if entity.is_empty() {
            updated.0.shift_remove(key.as_str());
        }
        updated
    }

    /// Returns a copy without the stale markers of these fields of the entity.
    pub fn clear_stale<I, S>(&self, key: &EntityKey, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut updated = self.clone();
        if let Some(entity) = updated.0.get_mut(key.as_str()) {
            for field in fields {
                entity.shift_remove(field.as_ref());
            }
        }
        updated.prune();
        updated
    }

    /// Returns a copy without the stale markers of every field present in a freshly
    /// normalized table.
    pub fn refresh(&self, fresh: &NormMap) -> Self {
        let mut updated = self.clone();
        for (key, entity) in fresh.iter() {
            if let Some(stale) = updated.0.get_mut(key.as_str()) {
                stale.retain(|field, _| !entity.contains_key(field.as_str()));
            }
        }
        updated.prune();
        tracing::trace!(
            before = self.0.len(),
            after = updated.0.len(),
            "refreshed stale entities"
        );
        updated
    }

    fn prune(&mut self) {
        self.0.retain(|_, fields| fields.values().any(|stale| *stale));
    }
}

impl FromIterator<(EntityKey, IndexMap<String, bool>)> for StaleEntities {
    fn from_iter<I: IntoIterator<Item = (EntityKey, IndexMap<String, bool>)>>(iter: I) -> Self {
        let mut stale = Self(iter.into_iter().collect());
        stale.prune();
        stale
    }
}
