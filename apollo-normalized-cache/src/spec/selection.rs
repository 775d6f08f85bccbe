use apollo_compiler::ast;
use serde_json_bytes::ByteString;

use super::Fragments;
use crate::error::InvalidDocument;
use crate::json_ext::Object;

/// A selection of a prepared query.
///
/// Fragment spreads do not survive preparation: they are inlined at the point of the spread as
/// an inline fragment carrying the fragment's type condition and the spread's directives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Selection {
    Field {
        name: ByteString,
        alias: Option<ByteString>,
        selection_set: Option<Vec<Selection>>,
        include_skip: IncludeSkip,
    },
    InlineFragment {
        type_condition: Option<String>,
        include_skip: IncludeSkip,
        selection_set: Vec<Selection>,
    },
}

impl Selection {
    pub(crate) fn from_ast(
        selection: &ast::Selection,
        fragments: &Fragments<'_>,
        mut count: usize,
    ) -> Result<Option<Self>, InvalidDocument> {
        // The RECURSION_LIMIT is chosen to be:
        //   < # expected to cause stack overflow &&
        //   > # expected in a legitimate query
        // Fragment cycles are caught here as well.
        const RECURSION_LIMIT: usize = 512;
        if count > RECURSION_LIMIT {
            tracing::error!("selection processing recursion limit({RECURSION_LIMIT}) exceeded");
            return Err(InvalidDocument::RecursionLimitExceeded);
        }
        count += 1;
        Ok(match selection {
            // Spec: https://spec.graphql.org/draft/#Field
            ast::Selection::Field(field) => {
                let include_skip = IncludeSkip::parse(&field.directives);
                if include_skip.statically_skipped() {
                    return Ok(None);
                }

                let selection_set = if field.selection_set.is_empty() {
                    None
                } else {
                    Some(selection_set_from_ast(
                        &field.selection_set,
                        fragments,
                        count,
                    )?)
                };

                Some(Self::Field {
                    name: field.name.as_str().into(),
                    alias: field.alias.as_ref().map(|alias| alias.as_str().into()),
                    selection_set,
                    include_skip,
                })
            }
            // Spec: https://spec.graphql.org/draft/#InlineFragment
            ast::Selection::InlineFragment(inline_fragment) => {
                let include_skip = IncludeSkip::parse(&inline_fragment.directives);
                if include_skip.statically_skipped() {
                    return Ok(None);
                }

                let selection_set =
                    selection_set_from_ast(&inline_fragment.selection_set, fragments, count)?;
                // Can be empty with a statically skipped selection set
                if selection_set.is_empty() {
                    return Ok(None);
                }

                Some(Self::InlineFragment {
                    type_condition: inline_fragment
                        .type_condition
                        .as_ref()
                        .map(|name| name.as_str().to_owned()),
                    include_skip,
                    selection_set,
                })
            }
            // Spec: https://spec.graphql.org/draft/#FragmentSpread
            ast::Selection::FragmentSpread(fragment_spread) => {
                let include_skip = IncludeSkip::parse(&fragment_spread.directives);
                if include_skip.statically_skipped() {
                    return Ok(None);
                }

                let name = fragment_spread.fragment_name.as_str();
                let fragment = fragments
                    .get(name)
                    .ok_or_else(|| InvalidDocument::UnknownFragment(name.to_owned()))?;

                let selection_set =
                    selection_set_from_ast(&fragment.selection_set, fragments, count)?;
                if selection_set.is_empty() {
                    return Ok(None);
                }

                Some(Self::InlineFragment {
                    type_condition: Some(fragment.type_condition.as_str().to_owned()),
                    include_skip,
                    selection_set,
                })
            }
        })
    }
}

pub(crate) fn selection_set_from_ast(
    selection_set: &[ast::Selection],
    fragments: &Fragments<'_>,
    count: usize,
) -> Result<Vec<Selection>, InvalidDocument> {
    selection_set
        .iter()
        .filter_map(|selection| Selection::from_ast(selection, fragments, count).transpose())
        .collect()
}

/// The `@include` and `@skip` conditions of a selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct IncludeSkip {
    include: Condition,
    skip: Condition,
}

/// A directive `if` argument, either known statically or read from a variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Condition {
    Yes,
    No,
    Variable(String),
}

impl IncludeSkip {
    pub(crate) fn parse(directives: &ast::DirectiveList) -> Self {
        let mut include = None;
        let mut skip = None;
        for directive in &directives.0 {
            if include.is_none() && directive.name.as_str() == "include" {
                include = Condition::parse(directive)
            }
            if skip.is_none() && directive.name.as_str() == "skip" {
                skip = Condition::parse(directive)
            }
        }
        Self {
            include: include.unwrap_or(Condition::Yes),
            skip: skip.unwrap_or(Condition::No),
        }
    }

    pub(crate) fn statically_skipped(&self) -> bool {
        matches!(self.skip, Condition::Yes) || matches!(self.include, Condition::No)
    }

    /// Whether the selection takes part in the walk for these variables.
    ///
    /// A condition whose variable is missing or not a boolean is ignored, as if the directive
    /// was absent.
    pub(crate) fn is_included(&self, variables: &Object) -> bool {
        let skipped = self.skip.eval(variables).unwrap_or(false);
        let included = self.include.eval(variables).unwrap_or(true);
        included && !skipped
    }
}

impl Default for IncludeSkip {
    fn default() -> Self {
        Self {
            include: Condition::Yes,
            skip: Condition::No,
        }
    }
}

impl Condition {
    pub(crate) fn parse(directive: &ast::Directive) -> Option<Self> {
        let argument = directive
            .arguments
            .iter()
            .find(|argument| argument.name.as_str() == "if")?;
        match &*argument.value {
            ast::Value::Boolean(true) => Some(Condition::Yes),
            ast::Value::Boolean(false) => Some(Condition::No),
            ast::Value::Variable(variable) => {
                Some(Condition::Variable(variable.as_str().to_owned()))
            }
            _ => None,
        }
    }

    pub(crate) fn eval(&self, variables: &Object) -> Option<bool> {
        match self {
            Condition::Yes => Some(true),
            Condition::No => Some(false),
            Condition::Variable(variable_name) => {
                let value = variables
                    .get(variable_name.as_str())
                    .and_then(|value| value.as_bool());
                if value.is_none() {
                    tracing::debug!(
                        variable = variable_name.as_str(),
                        "directive condition variable is missing or not a boolean"
                    );
                }
                value
            }
        }
    }
}
