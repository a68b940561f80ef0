//! Completed node results of one run

use super::error::{TraceError, TraceResult};
use super::result::NodeResult;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identifier of a computation node within one tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Sealed results published by finished nodes.
///
/// Nodes of the same scheduling wave publish concurrently; a result is only
/// inserted after it has been sealed, so every reader sees complete results.
#[derive(Debug, Default)]
pub struct ResultStore {
    results: DashMap<NodeId, Arc<NodeResult>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self {
            results: DashMap::new(),
        }
    }

    /// Publish a sealed result. Publishing twice for one node is rejected.
    pub fn publish(&self, id: NodeId, result: NodeResult) -> TraceResult<Arc<NodeResult>> {
        result.ensure_complete()?;
        let result = Arc::new(result);
        match self.results.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(TraceError::DuplicateEntry {
                node: result.node().to_string(),
                tuple: format!("result store slot {}", id),
            }),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&result));
                Ok(result)
            }
        }
    }

    /// The completed result of a node; `IncompleteDependency` if it has not finished
    pub fn get(&self, id: NodeId, label: &str) -> TraceResult<Arc<NodeResult>> {
        self.results
            .get(&id)
            .map(|r| Arc::clone(r.value()))
            .ok_or_else(|| TraceError::IncompleteDependency {
                node: label.to_string(),
                detail: "node has not completed its pass".to_string(),
            })
    }

    pub fn is_complete(&self, id: NodeId) -> bool {
        self.results.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
