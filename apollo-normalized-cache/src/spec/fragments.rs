use std::collections::HashMap;

use apollo_compiler::Node;
use apollo_compiler::ast;

/// Fragment definitions of a document, by name.
#[derive(Debug, Default)]
pub(crate) struct Fragments<'a> {
    map: HashMap<&'a str, &'a Node<ast::FragmentDefinition>>,
}

impl<'a> Fragments<'a> {
    pub(crate) fn from_ast(document: &'a ast::Document) -> Self {
        let mut map = HashMap::new();
        for definition in &document.definitions {
            // Spec: https://spec.graphql.org/draft/#FragmentDefinition
            if let ast::Definition::FragmentDefinition(fragment) = definition {
                map.entry(fragment.name.as_str()).or_insert(fragment);
            }
        }
        Fragments { map }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&'a Node<ast::FragmentDefinition>> {
        self.map.get(name).copied()
    }
}
