//! Logic for loading the cache configuration into an object model.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use schemars::schema::RootSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::cache::EntityKey;
use crate::cache::key::KeyPolicy;
use crate::error::ConfigurationError;
use crate::json_ext::Object;

/// The configuration of the cache.
///
/// Can be created through `serde::Deserialize` from various formats, with
/// [`Configuration::from_yaml`], or inline in Rust code with [`Configuration::builder`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    /// How entities are identified.
    #[serde(default)]
    pub keys: KeyPolicy,

    /// Concrete types of abstract types (interfaces and unions), used to match fragments whose
    /// type condition is abstract.
    #[serde(default)]
    pub possible_types: BTreeMap<String, Vec<String>>,
}

#[buildstructor::buildstructor]
impl Configuration {
    #[builder(visibility = "pub")]
    fn new(keys: Option<KeyPolicy>, possible_types: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            keys: keys.unwrap_or_default(),
            possible_types,
        }
    }

    /// Loads a configuration from YAML. An empty document yields the defaults.
    pub fn from_yaml(raw_yaml: &str) -> Result<Self, ConfigurationError> {
        if raw_yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let configuration: Configuration = serde_yaml::from_str(raw_yaml).map_err(|e| {
            ConfigurationError::InvalidConfiguration {
                message: "failed to parse yaml",
                error: e.to_string(),
            }
        })?;
        tracing::debug!(?configuration, "loaded cache configuration");
        Ok(configuration)
    }

    /// JSON schema of the configuration.
    pub fn schema() -> RootSchema {
        schemars::schema_for!(Configuration)
    }

    pub(crate) fn resolve_key(&self, object: &Object) -> Option<EntityKey> {
        self.keys.resolve(object)
    }

    /// Whether a fragment with this type condition applies to an object of this type.
    ///
    /// Objects without a type name match every fragment: without a schema there is nothing to
    /// decide on.
    pub(crate) fn fragment_matches(
        &self,
        type_condition: Option<&str>,
        typename: Option<&str>,
    ) -> bool {
        let (Some(type_condition), Some(typename)) = (type_condition, typename) else {
            return true;
        };
        type_condition == typename
            || self
                .possible_types
                .get(type_condition)
                .is_some_and(|types| types.iter().any(|t| t == typename))
    }
}
