//! Core types for visual dataflow graphs
//!
//! These types describe the graph as the editor saved it: nodes with
//! ordered input and output slots, links between slots, and static
//! literal values for inputs that have no link. Indirection constructs
//! (reroutes, disabled nodes, store/load pairs, broadcast injectors)
//! appear here as ordinary nodes; stripping them out is the compiler's
//! job.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{MalformedGraphError, Result};

/// Unique identifier for a node
pub type NodeId = String;

/// Unique identifier for a link
pub type LinkId = String;

/// Whether a node participates in execution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeMode {
    /// Normal node
    #[default]
    Active,
    /// Bypassed: the node should behave as if removed, with its inputs
    /// flowing through to its outputs' consumers
    Disabled,
}

/// A named input slot on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSlot {
    /// Input name, unique within the node
    pub name: String,
    /// Link feeding this input, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<LinkId>,
}

/// An output slot on a node, listing the links it feeds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSlot {
    /// Slot index on the producing node
    pub slot: u32,
    /// Links carrying this output to consumers
    #[serde(default)]
    pub links: Vec<LinkId>,
}

/// A node instance in a graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Unique identifier for this node instance
    pub id: NodeId,
    /// Node type identifier (looked up in the kind registry)
    pub kind: String,
    /// Active or disabled
    #[serde(default)]
    pub mode: NodeMode,
    /// Ordered input slots
    #[serde(default)]
    pub inputs: Vec<InputSlot>,
    /// Ordered output slots
    #[serde(default)]
    pub outputs: Vec<OutputSlot>,
    /// Static literal values, consumed positionally by link-less inputs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<serde_json::Value>,
}

impl GraphNode {
    /// Create a node with no slots or values
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            mode: NodeMode::Active,
            inputs: Vec::new(),
            outputs: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Find an input slot by name
    pub fn input(&self, name: &str) -> Option<&InputSlot> {
        self.inputs.iter().find(|i| i.name == name)
    }

    /// The first static value interpreted as a string key, if present.
    ///
    /// Store and load nodes carry their variable key here; broadcast
    /// nodes may carry their declared type here.
    pub fn key_value(&self) -> Option<&str> {
        self.values.first().and_then(|v| v.as_str())
    }
}

/// A link connecting an output slot to an input slot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLink {
    /// Unique identifier for this link
    pub id: LinkId,
    /// Producing node
    pub source: NodeId,
    /// Output slot index on the producing node
    pub source_slot: u32,
    /// Consuming node
    pub target: NodeId,
    /// Input slot index on the consuming node
    pub target_slot: u32,
}

/// A complete visual graph as saved by the editor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    /// Nodes in document order
    pub nodes: Vec<GraphNode>,
    /// Links in document order
    pub links: Vec<GraphLink>,
}

/// Borrowed id -> node lookup built once per resolution
pub type NodeMap<'a> = HashMap<&'a str, &'a GraphNode>;

impl Graph {
    /// Parse and validate a raw graph document.
    ///
    /// Fails with [`MalformedGraphError`] when the document does not
    /// deserialize or a structural invariant is violated. No side
    /// effects; the returned graph is ready for compilation.
    pub fn parse(document: serde_json::Value) -> Result<Self> {
        let graph: Graph = serde_json::from_value(document)?;
        graph.check_structure()?;
        Ok(graph)
    }

    /// Find a node by id
    pub fn find_node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Build an id -> node lookup over all nodes
    pub fn node_map(&self) -> NodeMap<'_> {
        self.nodes.iter().map(|n| (n.id.as_str(), n)).collect()
    }

    /// Verify the structural invariants that resolution depends on.
    ///
    /// Checked: non-empty node ids and kinds, unique node ids, unique
    /// link ids, link endpoints referencing known nodes, input slots
    /// referencing known links.
    pub fn check_structure(&self) -> Result<()> {
        let mut node_ids: HashSet<&str> = HashSet::new();
        for (index, node) in self.nodes.iter().enumerate() {
            if node.id.is_empty() {
                return Err(MalformedGraphError::MissingNodeId { index });
            }
            if node.kind.is_empty() {
                return Err(MalformedGraphError::MissingNodeKind {
                    node: node.id.clone(),
                });
            }
            if !node_ids.insert(&node.id) {
                return Err(MalformedGraphError::DuplicateNodeId {
                    node: node.id.clone(),
                });
            }
        }

        let mut link_ids: HashSet<&str> = HashSet::new();
        for link in &self.links {
            if !link_ids.insert(&link.id) {
                return Err(MalformedGraphError::DuplicateLinkId {
                    link: link.id.clone(),
                });
            }
            if !node_ids.contains(link.source.as_str()) {
                return Err(MalformedGraphError::UnknownLinkEndpoint {
                    link: link.id.clone(),
                    node: link.source.clone(),
                });
            }
            if !node_ids.contains(link.target.as_str()) {
                return Err(MalformedGraphError::UnknownLinkEndpoint {
                    link: link.id.clone(),
                    node: link.target.clone(),
                });
            }
        }

        for node in &self.nodes {
            for input in &node.inputs {
                if let Some(link) = &input.link {
                    if !link_ids.contains(link.as_str()) {
                        return Err(MalformedGraphError::UnknownInputLink {
                            node: node.id.clone(),
                            input: input.name.clone(),
                            link: link.clone(),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}
