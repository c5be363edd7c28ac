//! Error types for graph resolution
//!
//! Only structural invariant violations are fatal. Everything that can
//! go wrong while resolving an individual input is reported through
//! [`crate::diagnostics::Diagnostic`] instead, so one broken input
//! never aborts the rest of the graph.

use thiserror::Error;

/// Result type alias using MalformedGraphError
pub type Result<T> = std::result::Result<T, MalformedGraphError>;

/// A structural invariant of the input graph is violated
#[derive(Debug, Error)]
pub enum MalformedGraphError {
    /// The raw document could not be deserialized
    #[error("invalid graph document: {0}")]
    Document(#[from] serde_json::Error),

    /// A node record has an empty id
    #[error("node at index {index} has no id")]
    MissingNodeId { index: usize },

    /// A node record has an empty kind
    #[error("node '{node}' has no kind")]
    MissingNodeKind { node: String },

    /// Two node records share an id
    #[error("duplicate node id '{node}'")]
    DuplicateNodeId { node: String },

    /// Two link records share an id
    #[error("duplicate link id '{link}'")]
    DuplicateLinkId { link: String },

    /// A link endpoint references a node that is not in the graph
    #[error("link '{link}' references unknown node '{node}'")]
    UnknownLinkEndpoint { link: String, node: String },

    /// An input slot references a link that is not in the graph
    #[error("input '{input}' on node '{node}' references unknown link '{link}'")]
    UnknownInputLink {
        node: String,
        input: String,
        link: String,
    },

    /// An output slot declares a link that is not in the graph
    #[error("output slot {slot} on node '{node}' declares unknown link '{link}'")]
    UnknownOutputLink {
        node: String,
        slot: u32,
        link: String,
    },

    /// Two output slots claim to produce the same link
    #[error("link '{link}' is produced by both '{first}' and '{second}'")]
    DuplicateLinkProducer {
        link: String,
        first: String,
        second: String,
    },
}
