//! Advisory graph validation
//!
//! Collects every structural complaint in one pass so an editor can
//! show them all at once, including conditions `compile` would abort on
//! and softer ones it would merely warn about. Purely advisory:
//! [`crate::compiler::compile`] remains the authoritative gate.

use std::collections::{HashMap, HashSet};

use crate::registry::{KindRegistry, KindRole};
use crate::types::Graph;

/// A structural problem found during validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// A link endpoint references a node not in the graph
    UnknownNode { link: String, node: String },
    /// Two output slots declare the same link
    DuplicateProducer { link: String },
    /// A link exists that no output slot declares
    UnproducedLink { link: String },
    /// A link's recorded source disagrees with the declaring output
    SourceMismatch {
        link: String,
        declared: String,
        recorded: String,
    },
    /// A node's kind is not in the registry
    UnknownKind { node: String, kind: String },
    /// A store node has no key value
    StoreWithoutKey { node: String },
    /// A broadcast node has neither a type value nor a descriptor type
    BroadcastWithoutType { node: String },
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownNode { link, node } => {
                write!(f, "Link '{}' references unknown node '{}'", link, node)
            }
            Self::DuplicateProducer { link } => {
                write!(f, "Link '{}' is declared by more than one output", link)
            }
            Self::UnproducedLink { link } => {
                write!(f, "Link '{}' is not declared by any output", link)
            }
            Self::SourceMismatch {
                link,
                declared,
                recorded,
            } => {
                write!(
                    f,
                    "Link '{}' is declared by '{}' but records '{}' as its source",
                    link, declared, recorded
                )
            }
            Self::UnknownKind { node, kind } => {
                write!(f, "Unknown kind '{}' for node '{}'", kind, node)
            }
            Self::StoreWithoutKey { node } => {
                write!(f, "Store node '{}' declares no key", node)
            }
            Self::BroadcastWithoutType { node } => {
                write!(f, "Broadcast node '{}' declares no data type", node)
            }
        }
    }
}

impl std::error::Error for ValidationIssue {}

/// Validate a graph, returning all issues found (not just the first).
///
/// Pass a registry to enable kind-aware checks.
pub fn validate(graph: &Graph, registry: Option<&KindRegistry>) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    check_link_references(graph, &mut issues);
    check_producers(graph, &mut issues);

    if let Some(reg) = registry {
        check_kinds(graph, reg, &mut issues);
        check_structural_config(graph, reg, &mut issues);
    }

    issues
}

/// Check that all link endpoints reference existing nodes
fn check_link_references(graph: &Graph, issues: &mut Vec<ValidationIssue>) {
    let node_ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();

    for link in &graph.links {
        if !node_ids.contains(link.source.as_str()) {
            issues.push(ValidationIssue::UnknownNode {
                link: link.id.clone(),
                node: link.source.clone(),
            });
        }
        if !node_ids.contains(link.target.as_str()) {
            issues.push(ValidationIssue::UnknownNode {
                link: link.id.clone(),
                node: link.target.clone(),
            });
        }
    }
}

/// Cross-check declared outputs against the link records
fn check_producers(graph: &Graph, issues: &mut Vec<ValidationIssue>) {
    let mut declared_by: HashMap<&str, &str> = HashMap::new();

    for node in &graph.nodes {
        for output in &node.outputs {
            for link in &output.links {
                if declared_by.insert(link.as_str(), node.id.as_str()).is_some() {
                    issues.push(ValidationIssue::DuplicateProducer { link: link.clone() });
                }
            }
        }
    }

    for link in &graph.links {
        match declared_by.get(link.id.as_str()) {
            None => issues.push(ValidationIssue::UnproducedLink {
                link: link.id.clone(),
            }),
            Some(&declared) if declared != link.source => {
                issues.push(ValidationIssue::SourceMismatch {
                    link: link.id.clone(),
                    declared: declared.to_string(),
                    recorded: link.source.clone(),
                });
            }
            Some(_) => {}
        }
    }
}

/// Check that all node kinds are registered
fn check_kinds(graph: &Graph, registry: &KindRegistry, issues: &mut Vec<ValidationIssue>) {
    for node in &graph.nodes {
        if !registry.has_kind(&node.kind) {
            issues.push(ValidationIssue::UnknownKind {
                node: node.id.clone(),
                kind: node.kind.clone(),
            });
        }
    }
}

/// Check store/broadcast nodes carry the configuration they need
fn check_structural_config(
    graph: &Graph,
    registry: &KindRegistry,
    issues: &mut Vec<ValidationIssue>,
) {
    for node in &graph.nodes {
        match registry.role(&node.kind) {
            KindRole::Store | KindRole::Load => {
                if node.key_value().is_none() {
                    issues.push(ValidationIssue::StoreWithoutKey {
                        node: node.id.clone(),
                    });
                }
            }
            KindRole::Broadcast => {
                let has_type = node.key_value().is_some()
                    || registry
                        .get(&node.kind)
                        .is_some_and(|d| d.broadcast.is_some());
                if !has_type {
                    issues.push(ValidationIssue::BroadcastWithoutType {
                        node: node.id.clone(),
                    });
                }
            }
            _ => {}
        }
    }
}
