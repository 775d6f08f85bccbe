#![allow(dead_code)]

use apollo_normalized_cache::Configuration;
use apollo_normalized_cache::Denormalized;
use apollo_normalized_cache::NormMap;
use apollo_normalized_cache::Query;
use apollo_normalized_cache::StaleEntities;
use apollo_normalized_cache::json_ext::Object;
use apollo_normalized_cache::json_ext::Value;

/// A query with its variables, response data and the expected normalized table.
///
/// Shared cases hold in both directions: normalizing `data` gives `norm_map`, and denormalizing
/// `norm_map` gives back `data`.
pub struct SharedTest {
    pub name: &'static str,
    pub query: &'static str,
    pub variables: Value,
    pub data: Value,
    pub norm_map: Value,
}

impl SharedTest {
    pub fn query(&self) -> Query {
        Query::parse(self.query, None)
            .unwrap_or_else(|error| panic!("{}: invalid query: {error}", self.name))
    }

    pub fn variables(&self) -> Object {
        object(&self.variables)
    }

    pub fn norm_map(&self) -> NormMap {
        table(self.norm_map.clone())
    }
}

pub fn object(value: &Value) -> Object {
    value.as_object().cloned().unwrap_or_default()
}

pub fn table(value: Value) -> NormMap {
    NormMap::try_from(value).expect("a table of objects")
}

pub fn denormalize(
    query: &Query,
    variables: &Object,
    norm_map: &NormMap,
    stale: &StaleEntities,
) -> Denormalized {
    apollo_normalized_cache::denormalize(
        query,
        variables,
        norm_map,
        stale,
        &Configuration::default(),
    )
}
