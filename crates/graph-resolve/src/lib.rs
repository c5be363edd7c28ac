//! Resolution engine for visual node graphs
//!
//! Takes a graph the way an editor serializes it, with all of its
//! UI-level indirection intact, and compiles it into the minimal graph
//! an executor needs: reroute chains are collapsed, disabled nodes are
//! bypassed through their kind's output/input correspondence,
//! store/load pairs become direct connections, and broadcast injectors
//! fill compatible unconnected inputs. Resolution problems that are
//! attributable to a single node degrade into [`Diagnostic`]s; only a
//! structurally malformed document fails the compile.
//!
//! The entry point is [`compile`]. Behavior per node kind comes from a
//! [`KindRegistry`], and [`GraphBuilder`] constructs graphs
//! programmatically without hand-maintaining link bookkeeping.

pub mod broadcast;
pub mod builder;
pub mod bypass;
pub mod compiler;
pub mod diagnostics;
pub mod error;
pub mod link_index;
pub mod registry;
pub mod reroute;
pub mod types;
pub mod validation;
pub mod variables;

pub use broadcast::BroadcastTable;
pub use builder::GraphBuilder;
pub use bypass::{BypassResolver, MAX_BYPASS_DEPTH};
pub use compiler::{compile, ExecutableNode, InputBinding, ResolvedGraph, MAX_CHAIN};
pub use diagnostics::{Diagnostic, Severity};
pub use error::{MalformedGraphError, Result};
pub use link_index::{Endpoint, LinkIndex};
pub use registry::{KindDescriptor, KindRegistry, KindRole, PortDecl};
pub use reroute::RerouteResolver;
pub use types::{Graph, GraphLink, GraphNode, InputSlot, LinkId, NodeId, NodeMode, OutputSlot};
pub use validation::{validate, ValidationIssue};
pub use variables::VariableBindings;
