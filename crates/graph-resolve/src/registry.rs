//! Kind registry for per-kind resolution behavior
//!
//! Maps node kind strings to small declarative descriptors: what role
//! the kind plays during resolution, its declared input types, and the
//! output/input correspondence used when a node of that kind is
//! disabled. Dispatch is a table lookup, not inheritance; a kind that
//! is not registered behaves as a plain value-producing node and the
//! resolvers degrade gracefully around it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Role a kind plays during resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindRole {
    /// Ordinary executable node that produces values
    #[default]
    Value,
    /// Pass-through with one input and one output
    Reroute,
    /// Records its input under a string key
    Store,
    /// Retrieves a value recorded under a string key
    Load,
    /// Injects its input into every compatible unconnected input
    Broadcast,
}

/// Declared input port on a kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortDecl {
    /// Input name
    pub name: String,
    /// Declared data type, matched against broadcast declarations
    pub data_type: String,
}

impl PortDecl {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Declarative description of one node kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindDescriptor {
    /// Kind identifier this descriptor applies to
    pub kind: String,
    /// Resolution role
    #[serde(default)]
    pub role: KindRole,
    /// Declared input ports, used for broadcast type matching
    #[serde(default)]
    pub inputs: Vec<PortDecl>,
    /// Output slot -> corresponding input index, consulted when a node
    /// of this kind is disabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bypass: Option<Vec<usize>>,
    /// Declared broadcast type, for kinds with [`KindRole::Broadcast`]
    /// that do not carry the type as a static value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcast: Option<String>,
}

impl KindDescriptor {
    /// Describe an ordinary value-producing kind
    pub fn value(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            role: KindRole::Value,
            inputs: Vec::new(),
            bypass: None,
            broadcast: None,
        }
    }

    /// Describe a pass-through kind
    pub fn reroute(kind: impl Into<String>) -> Self {
        Self {
            role: KindRole::Reroute,
            ..Self::value(kind)
        }
    }

    /// Describe a store kind
    pub fn store(kind: impl Into<String>) -> Self {
        Self {
            role: KindRole::Store,
            ..Self::value(kind)
        }
    }

    /// Describe a load kind
    pub fn load(kind: impl Into<String>) -> Self {
        Self {
            role: KindRole::Load,
            ..Self::value(kind)
        }
    }

    /// Describe a broadcast kind with a fixed declared type
    pub fn broadcast(kind: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            role: KindRole::Broadcast,
            broadcast: Some(data_type.into()),
            ..Self::value(kind)
        }
    }

    /// Set the declared input ports
    pub fn with_inputs(mut self, inputs: Vec<PortDecl>) -> Self {
        self.inputs = inputs;
        self
    }

    /// Set the output -> input correspondence used while disabled
    pub fn with_bypass(mut self, map: Vec<usize>) -> Self {
        self.bypass = Some(map);
        self
    }

    /// Declared type of a named input, if any
    pub fn input_type(&self, name: &str) -> Option<&str> {
        self.inputs
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data_type.as_str())
    }
}

/// Registry of kind descriptors
///
/// Registries can be composed by merging; entries from the merged
/// registry override entries already present with the same kind.
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    entries: HashMap<String, KindDescriptor>,
}

impl KindRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registry pre-populated with the structural kinds every editor
    /// emits: `reroute`, `store`, `load`, `broadcast`.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(KindDescriptor::reroute("reroute"));
        registry.register(KindDescriptor::store("store"));
        registry.register(KindDescriptor::load("load"));
        registry.register(KindDescriptor {
            role: KindRole::Broadcast,
            ..KindDescriptor::value("broadcast")
        });
        registry
    }

    /// Register a descriptor, replacing any existing one for the kind
    pub fn register(&mut self, descriptor: KindDescriptor) {
        self.entries.insert(descriptor.kind.clone(), descriptor);
    }

    /// Get the descriptor for a kind
    pub fn get(&self, kind: &str) -> Option<&KindDescriptor> {
        self.entries.get(kind)
    }

    /// Check if a kind is registered
    pub fn has_kind(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }

    /// Resolution role for a kind; unregistered kinds are plain values
    pub fn role(&self, kind: &str) -> KindRole {
        self.get(kind).map(|d| d.role).unwrap_or_default()
    }

    /// The input index substituted for an output slot while a node of
    /// this kind is disabled
    pub fn bypass_input(&self, kind: &str, output_slot: u32) -> Option<usize> {
        self.get(kind)?
            .bypass
            .as_ref()?
            .get(output_slot as usize)
            .copied()
    }

    /// Declared type of an input on a kind
    pub fn input_type(&self, kind: &str, input: &str) -> Option<&str> {
        self.get(kind)?.input_type(input)
    }

    /// Merge another registry into this one
    ///
    /// Entries from `other` override entries in `self` for the same kind.
    pub fn merge(&mut self, other: KindRegistry) {
        self.entries.extend(other.entries);
    }
}
