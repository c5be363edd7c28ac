//! Store/load variable bindings
//!
//! A store node records, under a string key, the endpoint feeding its
//! single input; load nodes with the same key resolve to that endpoint
//! without a visible wire. Keys are collected in one pass over the
//! graph in document order; lookups happen lazily from the compiler so
//! a stored endpoint that is itself a reroute, a disabled node, or
//! another load still resolves through the normal bounded chase.

use std::collections::HashMap;

use crate::diagnostics::Diagnostic;
use crate::link_index::{Endpoint, LinkIndex};
use crate::registry::{KindRegistry, KindRole};
use crate::types::Graph;

/// Key -> immediate producer endpoint, built from store nodes
#[derive(Debug, Clone, Default)]
pub struct VariableBindings {
    bindings: HashMap<String, Endpoint>,
}

impl VariableBindings {
    /// Scan every store node in document order.
    ///
    /// The key is the store's first static value. When two stores share
    /// a key, the later one wins and an ambiguity warning is emitted;
    /// document order is the only order the input defines, so the
    /// tie-break is deterministic.
    pub fn collect(
        graph: &Graph,
        links: &LinkIndex,
        registry: &KindRegistry,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Self {
        let mut bindings: HashMap<String, Endpoint> = HashMap::new();

        for node in &graph.nodes {
            if registry.role(&node.kind) != KindRole::Store {
                continue;
            }

            let Some(key) = node.key_value() else {
                diagnostics.push(Diagnostic::warning(
                    &node.id,
                    "store node declares no key; it will be ignored",
                ));
                continue;
            };
            let Some(endpoint) = node
                .inputs
                .first()
                .and_then(|i| i.link.as_ref())
                .and_then(|l| links.producer(l))
            else {
                diagnostics.push(Diagnostic::warning(
                    &node.id,
                    format!("store for '{key}' has no connected input"),
                ));
                continue;
            };

            if bindings.insert(key.to_string(), endpoint.clone()).is_some() {
                log::warn!("variable '{key}' stored more than once; keeping '{}'", node.id);
                diagnostics.push(Diagnostic::ambiguous_binding(&node.id, "variable", key));
            }
        }

        Self { bindings }
    }

    /// The endpoint stored under a key, if any store declared it
    pub fn lookup(&self, key: &str) -> Option<&Endpoint> {
        self.bindings.get(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use serde_json::json;

    fn collect(graph: &Graph) -> (VariableBindings, Vec<Diagnostic>) {
        let registry = KindRegistry::builtin();
        let links = LinkIndex::build(graph).unwrap();
        let mut diagnostics = Vec::new();
        let bindings = VariableBindings::collect(graph, &links, &registry, &mut diagnostics);
        (bindings, diagnostics)
    }

    #[test]
    fn test_collects_store_keys() {
        let graph = GraphBuilder::new()
            .node("x", "loader")
            .node("s", "store")
            .value(json!("shared"))
            .link("x", 0, "s", "value")
            .build();

        let (bindings, diagnostics) = collect(&graph);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings.lookup("shared"), Some(&Endpoint::new("x", 0)));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_later_store_wins_with_warning() {
        let graph = GraphBuilder::new()
            .node("x", "loader")
            .node("y", "loader")
            .node("s1", "store")
            .value(json!("shared"))
            .node("s2", "store")
            .value(json!("shared"))
            .link("x", 0, "s1", "value")
            .link("y", 0, "s2", "value")
            .build();

        let (bindings, diagnostics) = collect(&graph);
        assert_eq!(bindings.lookup("shared"), Some(&Endpoint::new("y", 0)));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("more than once"));
    }

    #[test]
    fn test_store_without_key_is_skipped() {
        let graph = GraphBuilder::new()
            .node("x", "loader")
            .node("s", "store")
            .link("x", 0, "s", "value")
            .build();

        let (bindings, diagnostics) = collect(&graph);
        assert!(bindings.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("no key"));
    }

    #[test]
    fn test_store_without_input_is_skipped() {
        let graph = GraphBuilder::new()
            .node("s", "store")
            .value(json!("orphan"))
            .input("value")
            .build();

        let (bindings, diagnostics) = collect(&graph);
        assert!(bindings.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("no connected input"));
    }
}
