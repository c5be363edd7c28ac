//! Broadcast (everywhere) injection
//!
//! A broadcast node delivers its input to every compatible input in the
//! graph that has no explicit connection. The table built here maps a
//! declared data type to the endpoint feeding the broadcast node; the
//! compiler consults it as the last fallback for an input, after
//! explicit links, reroutes, bypasses, and variables have all had their
//! chance, so a broadcast can never override an explicit binding.

use std::collections::HashMap;

use crate::diagnostics::Diagnostic;
use crate::link_index::{Endpoint, LinkIndex};
use crate::registry::{KindRegistry, KindRole};
use crate::types::Graph;

/// Declared data type -> immediate producer endpoint
#[derive(Debug, Clone, Default)]
pub struct BroadcastTable {
    sources: HashMap<String, Endpoint>,
}

impl BroadcastTable {
    /// Scan every broadcast node in document order.
    ///
    /// The declared type is the node's first static value when it is a
    /// string, otherwise the kind descriptor's `broadcast` field. Two
    /// broadcasts sharing a type keep the later one and emit an
    /// ambiguity warning.
    pub fn collect(
        graph: &Graph,
        links: &LinkIndex,
        registry: &KindRegistry,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Self {
        let mut sources: HashMap<String, Endpoint> = HashMap::new();

        for node in &graph.nodes {
            if registry.role(&node.kind) != KindRole::Broadcast {
                continue;
            }

            let declared = node
                .key_value()
                .or_else(|| registry.get(&node.kind).and_then(|d| d.broadcast.as_deref()));
            let Some(data_type) = declared else {
                diagnostics.push(Diagnostic::warning(
                    &node.id,
                    "broadcast node declares no data type; it will be ignored",
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
                    format!("broadcast for type '{data_type}' has no connected input"),
                ));
                continue;
            };

            if sources
                .insert(data_type.to_string(), endpoint.clone())
                .is_some()
            {
                log::warn!(
                    "broadcast type '{data_type}' declared more than once; keeping '{}'",
                    node.id
                );
                diagnostics.push(Diagnostic::ambiguous_binding(
                    &node.id,
                    "broadcast type",
                    data_type,
                ));
            }
        }

        Self { sources }
    }

    /// The endpoint broadcast for a declared data type
    pub fn source_for(&self, data_type: &str) -> Option<&Endpoint> {
        self.sources.get(data_type)
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::registry::KindDescriptor;
    use serde_json::json;

    fn collect(graph: &Graph, registry: &KindRegistry) -> (BroadcastTable, Vec<Diagnostic>) {
        let links = LinkIndex::build(graph).unwrap();
        let mut diagnostics = Vec::new();
        let table = BroadcastTable::collect(graph, &links, registry, &mut diagnostics);
        (table, diagnostics)
    }

    #[test]
    fn test_type_from_static_value() {
        let graph = GraphBuilder::new()
            .node("m", "model-loader")
            .node("bc", "broadcast")
            .value(json!("model"))
            .link("m", 0, "bc", "value")
            .build();

        let (table, diagnostics) = collect(&graph, &KindRegistry::builtin());
        assert_eq!(table.source_for("model"), Some(&Endpoint::new("m", 0)));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_type_from_descriptor() {
        let mut registry = KindRegistry::builtin();
        registry.register(KindDescriptor::broadcast("inject-image", "image"));

        let graph = GraphBuilder::new()
            .node("src", "loader")
            .node("bc", "inject-image")
            .link("src", 0, "bc", "value")
            .build();

        let (table, diagnostics) = collect(&graph, &registry);
        assert_eq!(table.source_for("image"), Some(&Endpoint::new("src", 0)));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_later_broadcast_wins_with_warning() {
        let graph = GraphBuilder::new()
            .node("m1", "model-loader")
            .node("m2", "model-loader")
            .node("b1", "broadcast")
            .value(json!("model"))
            .node("b2", "broadcast")
            .value(json!("model"))
            .link("m1", 0, "b1", "value")
            .link("m2", 0, "b2", "value")
            .build();

        let (table, diagnostics) = collect(&graph, &KindRegistry::builtin());
        assert_eq!(table.source_for("model"), Some(&Endpoint::new("m2", 0)));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("more than once"));
    }

    #[test]
    fn test_typeless_broadcast_is_skipped() {
        let graph = GraphBuilder::new()
            .node("m", "model-loader")
            .node("bc", "broadcast")
            .link("m", 0, "bc", "value")
            .build();

        let (table, diagnostics) = collect(&graph, &KindRegistry::builtin());
        assert!(table.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("no data type"));
    }
}
