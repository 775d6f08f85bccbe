//! Query preparation.
//!
//! Selects the operation of a document and converts it into the selections walked by
//! normalization and denormalization.

use std::borrow::Cow;

use apollo_compiler::ast;
use serde_json_bytes::ByteString;

use super::Fragments;
use super::Selection;
use super::selection_set_from_ast;
use crate::cache::EntityKey;
use crate::cache::ROOT_MUTATION;
use crate::cache::ROOT_QUERY;
use crate::cache::ROOT_SUBSCRIPTION;
use crate::error::InvalidDocument;
use crate::json_ext::Object;
use crate::json_ext::Value;

/// A GraphQL operation prepared for the cache.
///
/// Preparing does not involve any schema: documents are taken as they are, and selections that
/// do not match the cached data are reported when walking rather than rejected here.
#[derive(Debug, Clone)]
pub struct Query {
    name: Option<String>,
    kind: ast::OperationType,
    pub(crate) selection_set: Vec<Selection>,
    /// Default values of the operation variables
    default_variables: Object,
}

impl Query {
    /// Parse a document and prepare one of its operations.
    pub fn parse(
        source: impl Into<String>,
        operation_name: Option<&str>,
    ) -> Result<Self, InvalidDocument> {
        let document = ast::Document::parse(source, "query.graphql").map_err(|with_errors| {
            let errors = with_errors.errors.to_string();
            tracing::debug!("parsing error(s): {}", errors);
            InvalidDocument::ParsingError(errors)
        })?;
        Self::new(&document, operation_name)
    }

    /// Prepare an operation of an already parsed document.
    ///
    /// Without an operation name the document must contain exactly one operation.
    pub fn new(
        document: &ast::Document,
        operation_name: Option<&str>,
    ) -> Result<Self, InvalidDocument> {
        let mut operations = document
            .definitions
            .iter()
            .filter_map(|definition| match definition {
                // Spec: https://spec.graphql.org/draft/#sec-Language.Operations
                ast::Definition::OperationDefinition(operation) => Some(operation),
                _ => None,
            });

        let operation = match operation_name {
            Some(name) => operations
                .find(|operation| operation.name.as_ref().map(|n| n.as_str()) == Some(name))
                .ok_or_else(|| InvalidDocument::UnknownOperation(name.to_owned()))?,
            None => {
                let operation = operations.next().ok_or(InvalidDocument::NoOperation)?;
                if operations.next().is_some() {
                    return Err(InvalidDocument::OperationNameRequired);
                }
                operation
            }
        };

        let fragments = Fragments::from_ast(document);
        let selection_set = selection_set_from_ast(&operation.selection_set, &fragments, 0)?;

        let default_variables = operation
            .variables
            .iter()
            .filter_map(|definition| {
                let value = value_from_ast(definition.default_value.as_ref()?)?;
                Some((ByteString::from(definition.name.as_str()), value))
            })
            .collect();

        Ok(Query {
            name: operation.name.as_ref().map(|name| name.as_str().to_owned()),
            kind: operation.operation_type,
            selection_set,
            default_variables,
        })
    }

    /// Name of the prepared operation, if it has one.
    pub fn operation_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Key of the entity anchoring this operation's root fields.
    pub fn root_key(&self) -> EntityKey {
        EntityKey::from(match self.kind {
            ast::OperationType::Query => ROOT_QUERY,
            ast::OperationType::Mutation => ROOT_MUTATION,
            ast::OperationType::Subscription => ROOT_SUBSCRIPTION,
        })
    }

    /// Caller variables completed with the operation's default values.
    pub(crate) fn all_variables<'a>(&self, variables: &'a Object) -> Cow<'a, Object> {
        if self.default_variables.is_empty() {
            return Cow::Borrowed(variables);
        }
        let mut all_variables = variables.clone();
        for (name, value) in &self.default_variables {
            if !all_variables.contains_key(name.as_str()) {
                all_variables.insert(name.clone(), value.clone());
            }
        }
        Cow::Owned(all_variables)
    }
}

/// Converts a constant input value. Variables are not constants and yield `None`.
fn value_from_ast(value: &ast::Value) -> Option<Value> {
    match value {
        ast::Value::Variable(_) => None,
        ast::Value::Null => Some(Value::Null),
        ast::Value::Boolean(b) => Some(Value::Bool(*b)),
        ast::Value::String(s) => Some(s.as_str().into()),
        ast::Value::Enum(e) => Some(e.as_str().into()),
        ast::Value::Int(i) => {
            let s = i.as_str();
            s.parse::<i64>()
                .ok()
                .map(Into::into)
                .or_else(|| s.parse::<f64>().ok().map(Into::into))
        }
        ast::Value::Float(f) => f.as_str().parse::<f64>().ok().map(Into::into),
        ast::Value::List(l) => l
            .iter()
            .map(|v| value_from_ast(v))
            .collect::<Option<_>>()
            .map(Value::Array),
        ast::Value::Object(o) => o
            .iter()
            .map(|(name, v)| value_from_ast(v).map(|v| (ByteString::from(name.as_str()), v)))
            .collect::<Option<_>>()
            .map(Value::Object),
    }
}
