//! Link index: link id -> producing endpoint
//!
//! Built once per resolution by scanning every node's declared outputs,
//! so producer lookups during resolution are O(1).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{MalformedGraphError, Result};
use crate::types::{Graph, LinkId, NodeId};

/// A (node, output slot) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub node: NodeId,
    pub slot: u32,
}

impl Endpoint {
    pub fn new(node: impl Into<String>, slot: u32) -> Self {
        Self {
            node: node.into(),
            slot,
        }
    }
}

/// Map from link id to the endpoint that produces it
#[derive(Debug, Clone, Default)]
pub struct LinkIndex {
    producers: HashMap<LinkId, Endpoint>,
}

impl LinkIndex {
    /// Scan the graph's declared outputs into an index.
    ///
    /// Fatal when two outputs claim the same link id, or an output
    /// declares a link id missing from the link set.
    pub fn build(graph: &Graph) -> Result<Self> {
        let link_ids: HashSet<&str> = graph.links.iter().map(|l| l.id.as_str()).collect();

        let mut producers: HashMap<LinkId, Endpoint> = HashMap::new();
        for node in &graph.nodes {
            for output in &node.outputs {
                for link in &output.links {
                    if !link_ids.contains(link.as_str()) {
                        return Err(MalformedGraphError::UnknownOutputLink {
                            node: node.id.clone(),
                            slot: output.slot,
                            link: link.clone(),
                        });
                    }
                    let endpoint = Endpoint::new(&node.id, output.slot);
                    if let Some(previous) = producers.insert(link.clone(), endpoint) {
                        return Err(MalformedGraphError::DuplicateLinkProducer {
                            link: link.clone(),
                            first: previous.node,
                            second: node.id.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self { producers })
    }

    /// The endpoint producing a link, if any output declares it
    pub fn producer(&self, link: &str) -> Option<&Endpoint> {
        self.producers.get(link)
    }

    /// Number of indexed links
    pub fn len(&self) -> usize {
        self.producers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::types::{GraphNode, OutputSlot};

    #[test]
    fn test_build_indexes_all_outputs() {
        let graph = GraphBuilder::new()
            .node("a", "loader")
            .node("b", "blur")
            .node("c", "save")
            .link("a", 0, "b", "image")
            .link("b", 0, "c", "image")
            .build();

        let index = LinkIndex::build(&graph).unwrap();
        assert_eq!(index.len(), 2);

        let first = graph.links[0].id.clone();
        assert_eq!(index.producer(&first), Some(&Endpoint::new("a", 0)));
    }

    #[test]
    fn test_duplicate_producer_is_fatal() {
        let mut graph = GraphBuilder::new()
            .node("a", "loader")
            .node("b", "save")
            .link("a", 0, "b", "image")
            .build();

        // Second node claiming the same link id
        let link = graph.links[0].id.clone();
        let mut rogue = GraphNode::new("x", "loader");
        rogue.outputs.push(OutputSlot {
            slot: 0,
            links: vec![link],
        });
        graph.nodes.push(rogue);

        let err = LinkIndex::build(&graph).unwrap_err();
        assert!(matches!(err, MalformedGraphError::DuplicateLinkProducer { .. }));
    }

    #[test]
    fn test_undeclared_link_is_fatal() {
        let mut node = GraphNode::new("a", "loader");
        node.outputs.push(OutputSlot {
            slot: 0,
            links: vec!["ghost".into()],
        });
        let graph = Graph {
            nodes: vec![node],
            links: Vec::new(),
        };

        let err = LinkIndex::build(&graph).unwrap_err();
        assert!(matches!(err, MalformedGraphError::UnknownOutputLink { .. }));
    }

    #[test]
    fn test_missing_link_lookup() {
        let index = LinkIndex::default();
        assert!(index.is_empty());
        assert_eq!(index.producer("nope"), None);
    }
}
