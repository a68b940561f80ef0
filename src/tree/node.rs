//! Computation nodes of a tree

use crate::aggregation::AggregationPolicy;
use crate::computation::NodeId;
use crate::heuristics::{Heuristic, HeuristicKind};
use std::sync::Arc;

/// What a node computes and which nodes it reads
#[derive(Clone)]
pub enum NodeKind {
    /// A leaf scoring tuples itself. Dependent heuristics read the results of
    /// `dependencies`, the first of which is the base they extend.
    Heuristic {
        heuristic: Arc<dyn Heuristic>,
        dependencies: Vec<NodeId>,
    },
    /// An internal node folding its children's results with a policy
    Aggregation {
        policy: AggregationPolicy,
        children: Vec<NodeId>,
    },
}

impl std::fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Heuristic { heuristic, dependencies } => f
                .debug_struct("Heuristic")
                .field("heuristic", &heuristic.id())
                .field("dependencies", dependencies)
                .finish(),
            Self::Aggregation { policy, children } => f
                .debug_struct("Aggregation")
                .field("policy", policy)
                .field("children", children)
                .finish(),
        }
    }
}

/// A node of a computation tree
#[derive(Debug, Clone)]
pub struct ComputationNode {
    id: NodeId,
    label: String,
    kind: NodeKind,
}

impl ComputationNode {
    pub(crate) fn new(id: NodeId, label: String, kind: NodeKind) -> Self {
        Self { id, label, kind }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Human-readable name, used in logs, errors and exported links
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub(crate) fn set_label(&mut self, label: String) {
        self.label = label;
    }

    pub(crate) fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    /// Nodes that must be complete before this node runs, in declaration order
    pub fn inputs(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Heuristic { dependencies, .. } => dependencies,
            NodeKind::Aggregation { children, .. } => children,
        }
    }

    /// Whether this is a heuristic that extends a base dependency
    pub fn is_dependent(&self) -> bool {
        matches!(&self.kind, NodeKind::Heuristic { heuristic, .. } if heuristic.kind() == HeuristicKind::Dependent)
    }
}
