//! Graph compiler
//!
//! Orchestrates the individual resolvers in a fixed precedence order
//! and emits the minimal executable graph: structural nodes (reroutes,
//! disabled nodes, store/load pairs, broadcast injectors) are gone, and
//! every surviving input is bound to a real producing endpoint or a
//! literal value. Resolution-time problems become diagnostics; only a
//! structurally malformed graph aborts the whole compile.
//!
//! The compiler is a pure function of its input: no state survives a
//! call, and compiling the same graph twice yields identical output
//! (output maps are ordered, diagnostics keep emission order).

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::broadcast::BroadcastTable;
use crate::bypass::BypassResolver;
use crate::diagnostics::Diagnostic;
use crate::error::Result;
use crate::link_index::{Endpoint, LinkIndex};
use crate::registry::{KindRegistry, KindRole};
use crate::reroute::RerouteResolver;
use crate::types::{Graph, GraphNode, NodeId, NodeMap, NodeMode};
use crate::variables::VariableBindings;

/// Longest alternating chain (reroute -> bypass -> load -> ...)
/// followed for a single input before giving up
pub const MAX_CHAIN: usize = 64;

/// What an executable input is bound to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputBinding {
    /// A producing node's output slot
    Connection(Endpoint),
    /// A literal value attached directly to the node
    Literal(serde_json::Value),
}

/// A node with all indirection removed from its inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutableNode {
    pub kind: String,
    pub inputs: BTreeMap<String, InputBinding>,
}

/// The compiled graph plus everything that could not be resolved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedGraph {
    pub nodes: BTreeMap<NodeId, ExecutableNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Compile a visual graph into its minimal executable form.
///
/// Fails only on structural invariant violations; everything else is
/// reported in the returned diagnostics list while the rest of the
/// graph still compiles.
pub fn compile(graph: &Graph, registry: &KindRegistry) -> Result<ResolvedGraph> {
    graph.check_structure()?;
    let links = LinkIndex::build(graph)?;
    let nodes = graph.node_map();

    log::debug!(
        "compiling graph: {} nodes, {} links",
        graph.nodes.len(),
        links.len()
    );

    let mut diagnostics = Vec::new();
    let variables = VariableBindings::collect(graph, &links, registry, &mut diagnostics);
    let broadcasts = BroadcastTable::collect(graph, &links, registry, &mut diagnostics);

    let resolver = InputResolver {
        nodes: &nodes,
        links: &links,
        registry,
        reroute: RerouteResolver::new(&nodes, &links, registry),
        bypass: BypassResolver::new(&nodes, &links, registry),
        variables: &variables,
        broadcasts: &broadcasts,
    };

    // Computed once up front and applied once, rather than mutated from
    // inside the traversal.
    let excluded = structural_nodes(graph, registry);

    let mut resolved = BTreeMap::new();
    for node in &graph.nodes {
        if excluded.contains(node.id.as_str()) {
            continue;
        }
        let executable = resolver.resolve_node(node, &mut diagnostics);
        resolved.insert(node.id.clone(), executable);
    }

    Ok(ResolvedGraph {
        nodes: resolved,
        diagnostics,
    })
}

/// Node ids excluded from the executable graph: disabled nodes and
/// every structural kind.
fn structural_nodes<'a>(graph: &'a Graph, registry: &KindRegistry) -> HashSet<&'a str> {
    graph
        .nodes
        .iter()
        .filter(|n| n.mode == NodeMode::Disabled || registry.role(&n.kind) != KindRole::Value)
        .map(|n| n.id.as_str())
        .collect()
}

/// Per-compile resolution context shared by all inputs
struct InputResolver<'a> {
    nodes: &'a NodeMap<'a>,
    links: &'a LinkIndex,
    registry: &'a KindRegistry,
    reroute: RerouteResolver<'a>,
    bypass: BypassResolver<'a>,
    variables: &'a VariableBindings,
    broadcasts: &'a BroadcastTable,
}

impl InputResolver<'_> {
    fn resolve_node(&self, node: &GraphNode, diagnostics: &mut Vec<Diagnostic>) -> ExecutableNode {
        let mut inputs = BTreeMap::new();
        let mut next_value = 0usize;

        for input in &node.inputs {
            match &input.link {
                Some(link) => {
                    // Explicit connections are authoritative; a broken
                    // one is reported, never silently re-bound.
                    if let Some(endpoint) = self.trace_link(link, diagnostics) {
                        inputs.insert(input.name.clone(), InputBinding::Connection(endpoint));
                    } else {
                        diagnostics.push(Diagnostic::unresolved_input(&node.id, &input.name));
                    }
                }
                None => {
                    // Link-less inputs consume static values positionally.
                    let literal = node.values.get(next_value).cloned();
                    next_value += 1;

                    if let Some(value) = literal {
                        inputs.insert(input.name.clone(), InputBinding::Literal(value));
                    } else if let Some(endpoint) =
                        self.broadcast_fill(node, &input.name, diagnostics)
                    {
                        inputs.insert(input.name.clone(), InputBinding::Connection(endpoint));
                    }
                    // Otherwise the input is simply absent; unconnected
                    // optional inputs are normal, not diagnostics.
                }
            }
        }

        ExecutableNode {
            kind: node.kind.clone(),
            inputs,
        }
    }

    /// Broadcast fallback for an input with no explicit connection and
    /// no literal, matched by the input's declared type.
    fn broadcast_fill(
        &self,
        node: &GraphNode,
        input_name: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Endpoint> {
        let data_type = self.registry.input_type(&node.kind, input_name)?;
        let start = self.broadcasts.source_for(data_type)?.clone();
        log::debug!(
            "broadcast fill: {}.{input_name} <- type '{data_type}'",
            node.id
        );
        self.trace_endpoint(start, diagnostics)
    }

    fn trace_link(&self, link: &str, diagnostics: &mut Vec<Diagnostic>) -> Option<Endpoint> {
        let start = self.links.producer(link)?.clone();
        self.trace_endpoint(start, diagnostics)
    }

    /// Chase an endpoint through indirection until a stable producer is
    /// found: bypass for disabled nodes, reroute chains, variable
    /// lookups for load nodes, and pass-through for store/broadcast
    /// outputs. Bounded by [`MAX_CHAIN`] so alternating cycles
    /// terminate with a diagnostic.
    fn trace_endpoint(
        &self,
        start: Endpoint,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Endpoint> {
        let origin = start.node.clone();
        let mut endpoint = start;

        for _ in 0..MAX_CHAIN {
            let node = self.nodes.get(endpoint.node.as_str())?;

            if node.mode == NodeMode::Disabled {
                endpoint = self.bypass.resolve(&node.id, endpoint.slot, diagnostics)?;
                continue;
            }

            match self.registry.role(&node.kind) {
                KindRole::Value => return Some(endpoint),
                KindRole::Reroute => {
                    endpoint = self.reroute.resolve(&node.id, diagnostics)?;
                }
                KindRole::Load => {
                    let Some(key) = node.key_value() else {
                        diagnostics.push(Diagnostic::warning(
                            &node.id,
                            "load node declares no key",
                        ));
                        return None;
                    };
                    let Some(stored) = self.variables.lookup(key) else {
                        diagnostics.push(Diagnostic::unbound_variable(&node.id, key));
                        return None;
                    };
                    endpoint = stored.clone();
                }
                // A store or broadcast output consumed directly behaves
                // as a pass-through of the node's own input.
                KindRole::Store | KindRole::Broadcast => {
                    endpoint = node
                        .inputs
                        .first()
                        .and_then(|i| i.link.as_ref())
                        .and_then(|l| self.links.producer(l))?
                        .clone();
                }
            }
        }

        diagnostics.push(Diagnostic::chain_too_deep(&origin, MAX_CHAIN));
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use serde_json::json;

    #[test]
    fn test_identity_graph() {
        let graph = GraphBuilder::new()
            .node("a", "loader")
            .node("b", "blur")
            .node("c", "save")
            .link("a", 0, "b", "image")
            .link("b", 0, "c", "image")
            .build();

        let resolved = compile(&graph, &KindRegistry::builtin()).unwrap();
        assert!(resolved.diagnostics.is_empty());
        assert_eq!(resolved.nodes.len(), 3);
        assert_eq!(
            resolved.nodes["b"].inputs["image"],
            InputBinding::Connection(Endpoint::new("a", 0))
        );
        assert_eq!(
            resolved.nodes["c"].inputs["image"],
            InputBinding::Connection(Endpoint::new("b", 0))
        );
    }

    #[test]
    fn test_literal_values_bind_positionally() {
        let graph = GraphBuilder::new()
            .node("a", "loader")
            .node("b", "blur")
            .value(json!(2.5))
            .input("radius")
            .link("a", 0, "b", "image")
            .build();

        let resolved = compile(&graph, &KindRegistry::builtin()).unwrap();
        let blur = &resolved.nodes["b"];
        // "image" is linked, "radius" is the first link-less input
        assert_eq!(blur.inputs["radius"], InputBinding::Literal(json!(2.5)));
        assert_eq!(
            blur.inputs["image"],
            InputBinding::Connection(Endpoint::new("a", 0))
        );
    }

    #[test]
    fn test_structural_nodes_are_excluded() {
        let graph = GraphBuilder::new()
            .node("a", "loader")
            .node("r", "reroute")
            .node("s", "store")
            .value(json!("k"))
            .node("b", "save")
            .link("a", 0, "r", "in")
            .link("r", 0, "s", "value")
            .link("r", 0, "b", "image")
            .build();

        let resolved = compile(&graph, &KindRegistry::builtin()).unwrap();
        assert!(resolved.nodes.contains_key("a"));
        assert!(resolved.nodes.contains_key("b"));
        assert!(!resolved.nodes.contains_key("r"));
        assert!(!resolved.nodes.contains_key("s"));
    }

    #[test]
    fn test_compile_is_idempotent() {
        let graph = GraphBuilder::new()
            .node("a", "loader")
            .node("r1", "reroute")
            .node("r2", "reroute")
            .node("b", "save")
            .link("a", 0, "r1", "in")
            .link("r1", 0, "r2", "in")
            .link("r2", 0, "b", "image")
            .build();

        let registry = KindRegistry::builtin();
        let first = compile(&graph, &registry).unwrap();
        let second = compile(&graph, &registry).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_broken_link_degrades_to_diagnostic() {
        let graph = GraphBuilder::new()
            .node("r", "reroute") // unconnected reroute feeds "b"
            .node("b", "save")
            .link("r", 0, "b", "image")
            .build();

        let resolved = compile(&graph, &KindRegistry::builtin()).unwrap();
        assert!(resolved.nodes["b"].inputs.is_empty());
        assert_eq!(resolved.diagnostics.len(), 1);
        assert_eq!(resolved.diagnostics[0].input.as_deref(), Some("image"));
    }

    #[test]
    fn test_output_document_shape() {
        let graph = GraphBuilder::new()
            .node("a", "loader")
            .node("b", "blur")
            .value(json!(1.0))
            .input("radius")
            .link("a", 0, "b", "image")
            .build();

        let resolved = compile(&graph, &KindRegistry::builtin()).unwrap();
        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json["nodes"]["b"]["inputs"]["image"]["node"], "a");
        assert_eq!(json["nodes"]["b"]["inputs"]["image"]["slot"], 0);
        assert_eq!(json["nodes"]["b"]["inputs"]["radius"], json!(1.0));
    }
}
