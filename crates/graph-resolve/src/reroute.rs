//! Reroute (pass-through) chain collapse
//!
//! A reroute node has exactly one input and one output and forwards its
//! input unchanged; it exists only so the user can bend wires. Chains
//! of reroutes collapse to whatever feeds the first one.

use std::collections::HashSet;

use crate::diagnostics::Diagnostic;
use crate::link_index::{Endpoint, LinkIndex};
use crate::registry::{KindRegistry, KindRole};
use crate::types::NodeMap;

/// Collapses reroute chains to their ultimate non-reroute source
pub struct RerouteResolver<'a> {
    nodes: &'a NodeMap<'a>,
    links: &'a LinkIndex,
    registry: &'a KindRegistry,
}

impl<'a> RerouteResolver<'a> {
    pub fn new(nodes: &'a NodeMap<'a>, links: &'a LinkIndex, registry: &'a KindRegistry) -> Self {
        Self {
            nodes,
            links,
            registry,
        }
    }

    /// Follow the chain starting at a reroute node to the endpoint that
    /// actually produces the forwarded value.
    ///
    /// Returns `None` when the chain dead-ends (unconnected reroute) or
    /// loops; a loop additionally emits a cycle diagnostic. Iterative,
    /// with a per-chain visited set, so a cyclic graph terminates.
    pub fn resolve(&self, node_id: &str, diagnostics: &mut Vec<Diagnostic>) -> Option<Endpoint> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = node_id;

        loop {
            if !visited.insert(current) {
                log::debug!("reroute chain from '{node_id}' revisited '{current}'");
                diagnostics.push(Diagnostic::cycle(current));
                return None;
            }

            let node = self.nodes.get(current)?;
            let link = node.inputs.first().and_then(|i| i.link.as_ref())?;
            let endpoint = self.links.producer(link)?;

            let producer = self.nodes.get(endpoint.node.as_str())?;
            if self.registry.role(&producer.kind) == KindRole::Reroute {
                current = producer.id.as_str();
                continue;
            }

            return Some(endpoint.clone());
        }
    }
}
