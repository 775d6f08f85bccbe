//! Flattening of responses into a [`NormMap`].

use crate::cache::NormMap;
use crate::cache::NormObj;
use crate::configuration::Configuration;
use crate::json_ext::Object;
use crate::json_ext::Value;
use crate::json_ext::ValueExt;
use crate::spec::Query;
use crate::spec::Selection;

/// Normalizes the data of a response to `query`.
///
/// Root fields are written to the query's root entity (`ROOT_QUERY` for queries). Every object
/// the configured [`crate::KeyPolicy`] can identify becomes its own entity and is referenced by
/// key from its parent. Other objects are embedded in their parent.
///
/// Fields excluded by `@skip`/`@include` are not written. Selected fields missing from the data
/// are stored as `null`. Without data, the table is empty.
#[tracing::instrument(skip_all, level = "trace", fields(operation = query.operation_name()))]
pub fn normalize(
    query: &Query,
    variables: &Object,
    data: Option<&Object>,
    configuration: &Configuration,
) -> NormMap {
    let Some(data) = data else {
        tracing::trace!("no data to normalize");
        return NormMap::new();
    };

    let variables = query.all_variables(variables);
    let mut normalizer = Normalizer {
        variables: variables.as_ref(),
        configuration,
        output: NormMap::new(),
    };

    let mut root = NormObj::new();
    normalizer.apply_selection_set(&query.selection_set, data, &mut root);
    // the root is written last, after the entities it references
    normalizer.output.write(query.root_key(), root);

    tracing::trace!(entities = normalizer.output.len(), "normalized response");
    normalizer.output
}

struct Normalizer<'a> {
    variables: &'a Object,
    configuration: &'a Configuration,
    output: NormMap,
}

impl Normalizer<'_> {
    fn apply_selection_set(
        &mut self,
        selection_set: &[Selection],
        input: &Object,
        output: &mut NormObj,
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
                    let value = match input.get(field_name.as_str()) {
                        Some(input_value) => {
                            self.normalize_value(selection_set.as_deref(), input_value)
                        }
                        None => {
                            tracing::trace!(
                                field = field_name.as_str(),
                                "missing from the response"
                            );
                            Value::Null
                        }
                    };
                    // a response key selected several times gets the union of the selections
                    match output.get_mut(field_name.as_str()) {
                        Some(existing) => existing.deep_merge(value),
                        None => {
                            output.insert(field_name.clone(), value);
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
                        self.apply_selection_set(selection_set, input, output);
                    }
                }
            }
        }
    }

    fn normalize_value(&mut self, selection_set: Option<&[Selection]>, input: &Value) -> Value {
        let Some(selection_set) = selection_set else {
            // leaf fields are stored as they are, including lists of scalars and custom scalars
            return input.clone();
        };

        match input {
            Value::Null => Value::Null,
            Value::Array(elements) => Value::Array(
                elements
                    .iter()
                    .map(|element| self.normalize_value(Some(selection_set), element))
                    .collect(),
            ),
            Value::Object(object) => {
                let mut normalized = NormObj::new();
                self.apply_selection_set(selection_set, object, &mut normalized);
                match self.configuration.resolve_key(object) {
                    Some(key) => {
                        self.output.write_deep(key.clone(), normalized);
                        key.into()
                    }
                    None => Value::Object(normalized),
                }
            }
            scalar => {
                failfast_debug!(
                    "expected an object for a field with a selection set, got {scalar:?}"
                );
                scalar.clone()
            }
        }
    }
}
