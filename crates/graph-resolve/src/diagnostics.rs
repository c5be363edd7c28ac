//! Resolution diagnostics
//!
//! Resolution-time problems are reported as data rather than raised, so
//! one pass can surface every issue in a graph and the caller can decide
//! whether a partially-resolved result is still usable.

use serde::{Deserialize, Serialize};

use crate::types::NodeId;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The input was left unresolved; the rest of the graph is intact
    Warning,
    /// The graph is unlikely to be usable as resolved
    Error,
}

/// A single resolution-time issue, tied to the node (and input) it
/// occurred on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    /// Node the issue was detected on
    pub node: NodeId,
    /// Input slot the issue applies to, when there is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    pub message: String,
}

impl Diagnostic {
    /// Create a warning diagnostic
    pub fn warning(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            node: node.into(),
            input: None,
            message: message.into(),
        }
    }

    /// Create an error diagnostic
    pub fn error(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            node: node.into(),
            input: None,
            message: message.into(),
        }
    }

    /// Attach the input name this diagnostic applies to
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// A reroute chain revisited a node
    pub fn cycle(node: &str) -> Self {
        Self::warning(
            node,
            format!("reroute chain through '{node}' loops back on itself"),
        )
    }

    /// A resolution chain exceeded the allowed length. An error: the
    /// graph contains indirection that cannot be resolved at all.
    pub fn chain_too_deep(node: &str, limit: usize) -> Self {
        Self::error(
            node,
            format!("resolution chain starting at '{node}' exceeds {limit} hops"),
        )
    }

    /// A disabled node's kind has no output/input correspondence
    pub fn no_bypass_rule(node: &str, kind: &str, slot: u32) -> Self {
        Self::warning(
            node,
            format!("no bypass rule for disabled '{kind}' node (output slot {slot})"),
        )
    }

    /// A load node's key has no matching store
    pub fn unbound_variable(node: &str, key: &str) -> Self {
        Self::warning(node, format!("no store defines variable '{key}'"))
    }

    /// Two stores share a key, or two broadcasts share a type
    pub fn ambiguous_binding(node: &str, what: &str, key: &str) -> Self {
        Self::warning(
            node,
            format!("{what} '{key}' is declared more than once; the later declaration wins"),
        )
    }

    /// An input had a link but no producer could be found for it
    pub fn unresolved_input(node: &str, input: &str) -> Self {
        Self::warning(node, format!("input '{input}' could not be resolved"))
            .with_input(input)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.severity, &self.input) {
            (Severity::Warning, Some(input)) => {
                write!(f, "warning [{}.{}]: {}", self.node, input, self.message)
            }
            (Severity::Warning, None) => write!(f, "warning [{}]: {}", self.node, self.message),
            (Severity::Error, Some(input)) => {
                write!(f, "error [{}.{}]: {}", self.node, input, self.message)
            }
            (Severity::Error, None) => write!(f, "error [{}]: {}", self.node, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_input() {
        let diag = Diagnostic::unresolved_input("b", "image");
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.to_string(), "warning [b.image]: input 'image' could not be resolved");
    }

    #[test]
    fn test_chain_too_deep_is_error() {
        let diag = Diagnostic::chain_too_deep("r", 64);
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.to_string(), "error [r]: resolution chain starting at 'r' exceeds 64 hops");
    }

    #[test]
    fn test_serializes_camel_case() {
        let diag = Diagnostic::cycle("r1");
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["node"], "r1");
        assert!(json.get("input").is_none());
    }
}
