//! Per-node confidence table

use super::confidence::Confidence;
use super::error::{TraceError, TraceResult};
use super::tuple::{EndpointTuple, EndpointTupleRepo};
use crate::model::{CodeCompilationUnit, ItemId};
use std::collections::HashMap;
use std::sync::Arc;

/// The confidences one computation node produced, keyed by endpoint tuple.
///
/// Each tuple is written exactly once. Once every tuple of the repository has
/// an entry the result is sealed and becomes read-only; downstream nodes only
/// ever see sealed results.
#[derive(Debug, Clone)]
pub struct NodeResult {
    node: String,
    entries: HashMap<EndpointTuple, Confidence>,
    order: Vec<EndpointTuple>,
    linked: HashMap<ItemId, Vec<Arc<CodeCompilationUnit>>>,
    complete: bool,
}

impl NodeResult {
    /// Create an empty result owned by the node with the given label
    pub fn new(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            entries: HashMap::new(),
            order: Vec::new(),
            linked: HashMap::new(),
            complete: false,
        }
    }

    /// Label of the owning node
    pub fn node(&self) -> &str {
        &self.node
    }

    /// Record the confidence of a tuple. Each tuple may be written once.
    pub fn set(&mut self, tuple: EndpointTuple, confidence: Confidence) -> TraceResult<()> {
        if self.complete {
            return Err(TraceError::InvalidArgument(format!(
                "result of node '{}' is sealed",
                self.node
            )));
        }
        if self.entries.contains_key(&tuple) {
            return Err(TraceError::DuplicateEntry {
                node: self.node.clone(),
                tuple: tuple.to_string(),
            });
        }
        if confidence.has_value() {
            self.linked
                .entry(tuple.architecture.id.clone())
                .or_default()
                .push(Arc::clone(&tuple.code));
        }
        self.entries.insert(tuple.clone(), confidence);
        self.order.push(tuple);
        Ok(())
    }

    /// The confidence of a tuple; unset if the tuple has no entry
    pub fn get(&self, tuple: &EndpointTuple) -> Confidence {
        self.entries.get(tuple).copied().unwrap_or_default()
    }

    /// Whether the tuple has been written (with or without value)
    pub fn contains(&self, tuple: &EndpointTuple) -> bool {
        self.entries.contains_key(tuple)
    }

    /// Compilation units this node linked to the item with a defined confidence.
    ///
    /// Units appear in write order, which is repository order for results
    /// produced by the executor.
    pub fn linked_endpoints(&self, item: &ItemId) -> &[Arc<CodeCompilationUnit>] {
        self.linked.get(item).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Verify that every tuple of the repository has an entry and mark the
    /// result read-only.
    pub fn seal(&mut self, repo: &EndpointTupleRepo) -> TraceResult<()> {
        let missing = repo
            .tuples()
            .iter()
            .filter(|tuple| !self.entries.contains_key(tuple))
            .count();
        if missing > 0 || self.entries.len() != repo.len() {
            return Err(TraceError::IncompleteDependency {
                node: self.node.clone(),
                detail: format!(
                    "{} of {} tuples missing, {} entries outside the repository",
                    missing,
                    repo.len(),
                    self.entries.len() + missing - repo.len()
                ),
            });
        }
        self.complete = true;
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Fail with `IncompleteDependency` unless the result is sealed
    pub fn ensure_complete(&self) -> TraceResult<()> {
        if self.complete {
            Ok(())
        } else {
            Err(TraceError::IncompleteDependency {
                node: self.node.clone(),
                detail: format!("{} entries written, result not sealed", self.entries.len()),
            })
        }
    }

    /// Entries in write order
    pub fn iter(&self) -> impl Iterator<Item = (&EndpointTuple, Confidence)> + '_ {
        self.order.iter().map(move |tuple| (tuple, self.get(tuple)))
    }

    /// Number of entries with a defined confidence
    pub fn defined_count(&self) -> usize {
        self.entries.values().filter(|c| c.has_value()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
