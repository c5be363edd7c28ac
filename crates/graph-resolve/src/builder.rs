//! Fluent builder for graphs
//!
//! Constructing a [`Graph`] by hand means keeping three things in sync:
//! the link record, the producing node's output declaration, and the
//! consuming node's input slot. The builder does that bookkeeping and
//! auto-generates link ids, which keeps test fixtures short.
//!
//! # Example
//!
//! ```
//! use graph_resolve::GraphBuilder;
//!
//! let graph = GraphBuilder::new()
//!     .node("a", "loader")
//!     .node("b", "save")
//!     .link("a", 0, "b", "image")
//!     .build();
//! assert_eq!(graph.links.len(), 1);
//! ```

use serde_json::Value;

use crate::types::{Graph, GraphLink, GraphNode, InputSlot, NodeMode, OutputSlot};

/// Fluent builder for constructing graphs programmatically
pub struct GraphBuilder {
    nodes: Vec<GraphNode>,
    links: Vec<GraphLink>,
    link_counter: usize,
}

impl GraphBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            link_counter: 0,
        }
    }

    /// Add a node
    pub fn node(mut self, id: impl Into<String>, kind: impl Into<String>) -> Self {
        self.nodes.push(GraphNode::new(id, kind));
        self
    }

    /// Mark the most recently added node as disabled
    ///
    /// Must be called immediately after `node`.
    pub fn disabled(mut self) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.mode = NodeMode::Disabled;
        }
        self
    }

    /// Append a static value to the most recently added node
    pub fn value(mut self, value: Value) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.values.push(value);
        }
        self
    }

    /// Declare an unconnected input on the most recently added node
    pub fn input(mut self, name: impl Into<String>) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.inputs.push(InputSlot {
                name: name.into(),
                link: None,
            });
        }
        self
    }

    /// Connect an output slot on `source` to the named input on `target`.
    ///
    /// Generates the link id, declares the link on the source node's
    /// output slot, and creates or rebinds the target input. Endpoints
    /// naming nodes that were never added still produce a link record,
    /// which is how malformed-graph fixtures are built.
    pub fn link(
        mut self,
        source: impl Into<String>,
        source_slot: u32,
        target: impl Into<String>,
        input_name: impl Into<String>,
    ) -> Self {
        let source = source.into();
        let target = target.into();
        let input_name = input_name.into();

        self.link_counter += 1;
        let link_id = format!("link-{}", self.link_counter);

        let mut target_slot = 0;
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == target) {
            let index = match node.inputs.iter().position(|i| i.name == input_name) {
                Some(index) => index,
                None => {
                    node.inputs.push(InputSlot {
                        name: input_name,
                        link: None,
                    });
                    node.inputs.len() - 1
                }
            };
            node.inputs[index].link = Some(link_id.clone());
            target_slot = index as u32;
        }

        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == source) {
            match node.outputs.iter_mut().find(|o| o.slot == source_slot) {
                Some(output) => output.links.push(link_id.clone()),
                None => node.outputs.push(OutputSlot {
                    slot: source_slot,
                    links: vec![link_id.clone()],
                }),
            }
        }

        self.links.push(GraphLink {
            id: link_id,
            source,
            source_slot,
            target,
            target_slot,
        });
        self
    }

    /// Build the graph without validation
    pub fn build(self) -> Graph {
        Graph {
            nodes: self.nodes,
            links: self.links,
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_wires_both_sides() {
        let graph = GraphBuilder::new()
            .node("a", "loader")
            .node("b", "save")
            .link("a", 0, "b", "image")
            .build();

        assert_eq!(graph.links.len(), 1);
        let link = &graph.links[0];
        assert_eq!(link.id, "link-1");
        assert_eq!(link.source, "a");
        assert_eq!(link.target, "b");

        let a = graph.find_node("a").unwrap();
        assert_eq!(a.outputs[0].links, vec!["link-1".to_string()]);
        let b = graph.find_node("b").unwrap();
        assert_eq!(b.input("image").unwrap().link, Some("link-1".into()));
    }

    #[test]
    fn test_builder_auto_link_ids() {
        let graph = GraphBuilder::new()
            .node("a", "loader")
            .node("b", "blur")
            .node("c", "save")
            .link("a", 0, "b", "image")
            .link("b", 0, "c", "image")
            .build();

        assert_eq!(graph.links[0].id, "link-1");
        assert_eq!(graph.links[1].id, "link-2");
    }

    #[test]
    fn test_builder_node_modifiers() {
        let graph = GraphBuilder::new()
            .node("d", "transform")
            .disabled()
            .value(json!(0.5))
            .input("left")
            .build();

        let node = graph.find_node("d").unwrap();
        assert_eq!(node.mode, NodeMode::Disabled);
        assert_eq!(node.values, vec![json!(0.5)]);
        assert!(node.input("left").unwrap().link.is_none());
    }

    #[test]
    fn test_builder_rebind_existing_input() {
        let graph = GraphBuilder::new()
            .node("a", "loader")
            .node("b", "loader")
            .node("c", "save")
            .link("a", 0, "c", "image")
            .link("b", 0, "c", "image")
            .build();

        // Second link wins the input; both remain in the link list
        let c = graph.find_node("c").unwrap();
        assert_eq!(c.inputs.len(), 1);
        assert_eq!(c.input("image").unwrap().link, Some("link-2".into()));
        assert_eq!(graph.links.len(), 2);
    }

    #[test]
    fn test_builder_passes_structure_check() {
        let graph = GraphBuilder::new()
            .node("a", "loader")
            .node("b", "save")
            .link("a", 0, "b", "image")
            .build();
        assert!(graph.check_structure().is_ok());
    }
}
