//! Endpoint tuples and the repository enumerating them

use crate::model::{ArchitectureItem, ArchitectureModel, CodeCompilationUnit, CodeModel};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A candidate pair (architecture item, compilation unit)
///
/// Equality is structural over both endpoints. Hashing only uses the two ids,
/// which equal endpoints always share.
#[derive(Debug, Clone)]
pub struct EndpointTuple {
    pub architecture: Arc<ArchitectureItem>,
    pub code: Arc<CodeCompilationUnit>,
}

impl EndpointTuple {
    pub fn new(architecture: Arc<ArchitectureItem>, code: Arc<CodeCompilationUnit>) -> Self {
        Self { architecture, code }
    }
}

impl PartialEq for EndpointTuple {
    fn eq(&self, other: &Self) -> bool {
        self.architecture == other.architecture && self.code == other.code
    }
}

impl Eq for EndpointTuple {}

impl Hash for EndpointTuple {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.architecture.id.hash(state);
        self.code.id.hash(state);
    }
}

impl std::fmt::Display for EndpointTuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.architecture.name, self.code)
    }
}

/// The full cross product of architecture endpoints and code endpoints.
///
/// Iteration order is stable: architecture items outer, compilation units
/// inner, both in model order. No filtering happens here; restricting the
/// candidate space is up to individual heuristics.
#[derive(Debug, Clone, Default)]
pub struct EndpointTupleRepo {
    tuples: Vec<EndpointTuple>,
    positions: HashMap<EndpointTuple, usize>,
}

impl EndpointTupleRepo {
    pub fn new(architecture: &ArchitectureModel, code: &CodeModel) -> Self {
        let mut tuples = Vec::with_capacity(architecture.len() * code.len());
        for item in architecture.endpoints() {
            for unit in code.endpoints() {
                tuples.push(EndpointTuple::new(Arc::clone(item), Arc::clone(unit)));
            }
        }
        let positions = tuples
            .iter()
            .enumerate()
            .map(|(position, tuple)| (tuple.clone(), position))
            .collect();
        Self { tuples, positions }
    }

    /// All candidate tuples in stable order
    pub fn tuples(&self) -> &[EndpointTuple] {
        &self.tuples
    }

    pub fn contains(&self, tuple: &EndpointTuple) -> bool {
        self.positions.contains_key(tuple)
    }

    /// Position of a tuple in iteration order
    pub fn position(&self, tuple: &EndpointTuple) -> Option<usize> {
        self.positions.get(tuple).copied()
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}
