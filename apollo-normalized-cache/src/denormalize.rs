//! Reconstruction of responses from a [`NormMap`].

use indexmap::IndexSet;

use crate::cache::EntityKey;
use crate::cache::NormMap;
use crate::cache::NormObj;
use crate::cache::stale::StaleEntities;
use crate::configuration::Configuration;
use crate::json_ext::Object;
use crate::json_ext::Value;
use crate::json_ext::ValueExt;
use crate::spec::Query;
use crate::spec::Selection;

/// The outcome of [`denormalize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Denormalized {
    /// The reconstructed response data.
    ///
    /// Fields that could not be resolved are left out, and so are list elements referencing a
    /// missing entity.
    pub data: Object,
    /// Whether any selected field or entity was missing from the table.
    pub partial: bool,
    /// Whether any selected field was marked stale.
    pub stale: bool,
    /// Entities with a selected stale field, in visit order.
    pub stale_entities: IndexSet<EntityKey>,
    /// Entities read from the table, root included, in visit order.
    pub entity_keys: IndexSet<EntityKey>,
}

impl Denormalized {
    /// The data, when it could be fully resolved.
    pub fn complete_data(&self) -> Option<&Object> {
        (!self.partial).then_some(&self.data)
    }
}

/// Answers `query` from a normalized table.
///
/// Follows the same selections as [`crate::normalize`], reading entities instead of writing
/// them. Nothing is an error here: missing fields and entities make the result partial, and
/// stale markers on selected fields make it stale.
#[tracing::instrument(skip_all, level = "trace", fields(operation = query.operation_name()))]
pub fn denormalize(
    query: &Query,
    variables: &Object,
    norm_map: &NormMap,
    stale_entities: &StaleEntities,
    configuration: &Configuration,
) -> Denormalized {
    let variables = query.all_variables(variables);
    let mut denormalizer = Denormalizer {
        variables: variables.as_ref(),
        configuration,
        norm_map,
        stale_entities,
        result: Denormalized::default(),
    };

    let root_key = query.root_key();
    if let Some(data) = denormalizer.denormalize_entity(&query.selection_set, root_key.as_str()) {
        denormalizer.result.data = data;
    }

    let result = denormalizer.result;
    tracing::debug!(
        partial = result.partial,
        stale = result.stale,
        entities = result.entity_keys.len(),
        "denormalized query"
    );
    result
}

struct Denormalizer<'a> {
    variables: &'a Object,
    configuration: &'a Configuration,
    norm_map: &'a NormMap,
    stale_entities: &'a StaleEntities,
    result: Denormalized,
}

impl Denormalizer<'_> {
    fn denormalize_entity(&mut self, selection_set: &[Selection], key: &str) -> Option<Object> {
        let norm_map = self.norm_map;
        let Some((entity_key, entity)) = norm_map.get_key_value(key) else {
            tracing::trace!(entity = key, "missing entity");
            self.result.partial = true;
            return None;
        };
        self.result.entity_keys.insert(entity_key.clone());

        let mut output = Object::new();
        self.apply_selection_set(selection_set, Some(entity_key), entity, &mut output);
        Some(output)
    }

    /// `entity` is the key of `input`, `None` for embedded objects.
    fn apply_selection_set(
        &mut self,
        selection_set: &[Selection],
        entity: Option<&EntityKey>,
        input: &NormObj,
        output: &mut Object,
    ) {
        for selection in selection_set {
            match selection {
                Selection::Field {
                    name,
                    alias,
                    selection_set,
                    include_skip,
                } => {
                    if !include_skip.is_included(self.variables) {
                        continue;
                    }

                    let field_name = alias.as_ref().unwrap_or(name);
                    if let Some(entity) = entity {
                        if self.stale_entities.is_stale(entity.as_str(), field_name.as_str()) {
                            tracing::trace!(
                                entity = entity.as_str(),
                                field = field_name.as_str(),
                                "stale field"
                            );
                            self.result.stale = true;
                            self.result.stale_entities.insert(entity.clone());
                        }
                    }

                    let Some(input_value) = input.get(field_name.as_str()) else {
                        tracing::trace!(
                            entity = entity.map(EntityKey::as_str),
                            field = field_name.as_str(),
                            "missing field"
                        );
                        self.result.partial = true;
                        continue;
                    };
                    if let Some(value) =
                        self.denormalize_value(selection_set.as_deref(), input_value)
                    {
                        match output.get_mut(field_name.as_str()) {
                            Some(existing) => existing.deep_merge(value),
                            None => {
                                output.insert(field_name.clone(), value);
                            }
                        }
                    }
                }
                Selection::InlineFragment {
                    type_condition,
                    include_skip,
                    selection_set,
                } => {
                    if !include_skip.is_included(self.variables) {
                        continue;
                    }

                    let typename = self.configuration.keys.typename(input);
                    if self
                        .configuration
                        .fragment_matches(type_condition.as_deref(), typename)
                    {
                        self.apply_selection_set(selection_set, entity, input, output);
                    }
                }
            }
        }
    }

    /// Returns `None` when the value cannot be resolved at all.
    fn denormalize_value(
        &mut self,
        selection_set: Option<&[Selection]>,
        input: &Value,
    ) -> Option<Value> {
        let Some(selection_set) = selection_set else {
            return Some(input.clone());
        };

        match input {
            Value::Null => Some(Value::Null),
            Value::String(key) => self
                .denormalize_entity(selection_set, key.as_str())
                .map(Value::Object),
            Value::Object(embedded) => {
                let mut output = Object::new();
                self.apply_selection_set(selection_set, None, embedded, &mut output);
                Some(Value::Object(output))
            }
            // unresolved elements are dropped, the result is partial anyway
            Value::Array(elements) => Some(Value::Array(
                elements
                    .iter()
                    .filter_map(|element| self.denormalize_value(Some(selection_set), element))
                    .collect(),
            )),
            scalar => {
                failfast_debug!("expected an entity key or an object, got {scalar:?}");
                self.result.partial = true;
                None
            }
        }
    }
}
