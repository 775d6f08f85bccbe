//! Entity key derivation.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

use super::EntityKey;
use crate::json_ext::Object;
use crate::json_ext::Value;

/// Separates the type name from the identity values in an entity key.
///
/// GraphQL names cannot contain it, so the first separator of a key always ends the type name.
pub const KEY_SEPARATOR: char = ';';

/// Escapes [`KEY_SEPARATOR`] and itself inside identity values.
const KEY_ESCAPE: char = '\\';

pub(crate) const TYPENAME: &str = "__typename";

/// How objects of a response are identified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct KeyPolicy {
    /// Field holding the concrete type name of an object.
    /// default: "__typename"
    #[serde(default = "default_typename_field")]
    pub typename_field: String,

    /// Fields identifying objects whose type has no entry in `type_keys`.
    /// default: ["id"]
    #[serde(default = "default_id_fields")]
    pub id_fields: Vec<String>,

    /// Identifying fields per type name.
    #[serde(default)]
    pub type_keys: BTreeMap<String, Vec<String>>,
}

fn default_typename_field() -> String {
    TYPENAME.to_string()
}

fn default_id_fields() -> Vec<String> {
    vec!["id".to_string()]
}

impl Default for KeyPolicy {
    fn default() -> Self {
        Self {
            typename_field: default_typename_field(),
            id_fields: default_id_fields(),
            type_keys: BTreeMap::new(),
        }
    }
}

#[buildstructor::buildstructor]
impl KeyPolicy {
    #[builder(visibility = "pub")]
    fn new(
        typename_field: Option<String>,
        id_fields: Vec<String>,
        type_keys: BTreeMap<String, Vec<String>>,
    ) -> Self {
        Self {
            typename_field: typename_field.unwrap_or_else(default_typename_field),
            id_fields: if id_fields.is_empty() {
                default_id_fields()
            } else {
                id_fields
            },
            type_keys,
        }
    }

    /// Type name of an object, if it exposes one.
    pub fn typename<'a>(&self, object: &'a Object) -> Option<&'a str> {
        object
            .get(self.typename_field.as_str())
            .and_then(|typename| typename.as_str())
            .filter(|typename| !typename.is_empty())
    }

    /// Derives the key of an object, or `None` when it cannot be identified.
    ///
    /// The key is the type name followed by the identifying values, in the order of the
    /// identifying fields, each preceded by [`KEY_SEPARATOR`]. Identifying values must be strings
    /// or numbers. Separators inside string values are escaped with a backslash, so that distinct
    /// composite identities never share a key.
    pub fn resolve(&self, object: &Object) -> Option<EntityKey> {
        let typename = self.typename(object)?;
        let fields = self.type_keys.get(typename).unwrap_or(&self.id_fields);
        if fields.is_empty() {
            return None;
        }

        let mut key = typename.to_owned();
        for field in fields {
            key.push(KEY_SEPARATOR);
            match object.get(field.as_str())? {
                Value::String(id) => push_escaped(&mut key, id.as_str()),
                Value::Number(id) => key.push_str(&id.to_string()),
                _ => return None,
            }
        }
        Some(EntityKey::from(key))
    }
}

fn push_escaped(key: &mut String, value: &str) {
    for c in value.chars() {
        if c == KEY_SEPARATOR || c == KEY_ESCAPE {
            key.push(KEY_ESCAPE);
        }
        key.push(c);
    }
}
