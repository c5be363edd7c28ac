//! Disabled-node (bypass) substitution
//!
//! A disabled node logically disappears: consumers of its outputs
//! should instead receive whatever fed the corresponding input of the
//! disabled node. Which input corresponds to which output is
//! kind-specific and comes from the kind registry's bypass table; a
//! disabled node of a kind with no table entry leaves its consumers
//! unresolved rather than aborting the graph.

use crate::diagnostics::Diagnostic;
use crate::link_index::{Endpoint, LinkIndex};
use crate::registry::KindRegistry;
use crate::types::{NodeMap, NodeMode};

/// Longest chain of disabled nodes followed before giving up
pub const MAX_BYPASS_DEPTH: usize = 10;

/// Substitutes upstream producers for disabled nodes' outputs
pub struct BypassResolver<'a> {
    nodes: &'a NodeMap<'a>,
    links: &'a LinkIndex,
    registry: &'a KindRegistry,
}

impl<'a> BypassResolver<'a> {
    pub fn new(nodes: &'a NodeMap<'a>, links: &'a LinkIndex, registry: &'a KindRegistry) -> Self {
        Self {
            nodes,
            links,
            registry,
        }
    }

    /// Find the endpoint that should stand in for `output_slot` of the
    /// disabled node `node_id`.
    ///
    /// Chains of disabled producers are followed iteratively up to
    /// [`MAX_BYPASS_DEPTH`]; exceeding the bound or hitting a kind with
    /// no correspondence table emits a diagnostic and returns `None`.
    pub fn resolve(
        &self,
        node_id: &str,
        output_slot: u32,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Endpoint> {
        let mut current = node_id;
        let mut slot = output_slot;

        for _ in 0..MAX_BYPASS_DEPTH {
            let node = self.nodes.get(current)?;

            let Some(input_index) = self.registry.bypass_input(&node.kind, slot) else {
                diagnostics.push(Diagnostic::no_bypass_rule(current, &node.kind, slot));
                return None;
            };
            let Some(input) = node.inputs.get(input_index) else {
                diagnostics.push(Diagnostic::warning(
                    current,
                    format!(
                        "bypass rule for '{}' maps output slot {slot} to missing input {input_index}",
                        node.kind
                    ),
                ));
                return None;
            };

            // Unconnected corresponding input: nothing to substitute.
            let link = input.link.as_ref()?;
            let endpoint = self.links.producer(link)?;

            let producer = self.nodes.get(endpoint.node.as_str())?;
            if producer.mode == NodeMode::Disabled {
                log::debug!(
                    "bypass chain from '{node_id}' continues through disabled '{}'",
                    producer.id
                );
                current = producer.id.as_str();
                slot = endpoint.slot;
                continue;
            }

            return Some(endpoint.clone());
        }

        diagnostics.push(Diagnostic::chain_too_deep(node_id, MAX_BYPASS_DEPTH));
        None
    }
}
