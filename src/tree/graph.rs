//! Evaluation graph and scheduling waves
//!
//! Edges run from an input node to the node reading it: aggregation children
//! point to their parent, declared dependencies point to their dependent
//! heuristic. The graph is separate from the tree's parent/child shape because
//! dependencies may target siblings or ancestors.

use super::node::ComputationNode;
use crate::computation::{NodeId, TraceError, TraceResult};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, Reversed};
use petgraph::Direction;
use std::collections::{BTreeMap, HashSet};

/// Dependency DAG over the nodes of a tree
#[derive(Debug, Clone)]
pub struct EvaluationGraph {
    graph: DiGraph<NodeId, ()>,
    indices: Vec<NodeIndex>,
    order: Vec<NodeId>,
    waves: Vec<Vec<NodeId>>,
}

impl EvaluationGraph {
    /// Build the graph and schedule every node the root (transitively) reads.
    ///
    /// `nodes` must be indexed by their id. Fails with `UnresolvedReference`
    /// for an input id outside `nodes` and with `CyclicDependency` when no
    /// topological order exists.
    pub fn new(nodes: &[ComputationNode], root: NodeId) -> TraceResult<Self> {
        let mut graph = DiGraph::new();
        let indices: Vec<NodeIndex> = nodes.iter().map(|node| graph.add_node(node.id())).collect();

        for node in nodes {
            for input in node.inputs() {
                let from = indices.get(input.index()).ok_or_else(|| {
                    TraceError::UnresolvedReference(format!(
                        "node '{}' reads unknown node {}",
                        node.label(),
                        input
                    ))
                })?;
                graph.add_edge(*from, indices[node.id().index()], ());
            }
        }
        let root_index = *indices
            .get(root.index())
            .ok_or_else(|| TraceError::UnresolvedReference(format!("root node {}", root)))?;

        let sorted = toposort(&graph, None).map_err(|cycle| TraceError::CyclicDependency {
            node: nodes[graph[cycle.node_id()].index()].label().to_string(),
        })?;

        let mut reachable = HashSet::new();
        let mut dfs = Dfs::new(Reversed(&graph), root_index);
        while let Some(index) = dfs.next(Reversed(&graph)) {
            reachable.insert(index);
        }

        // Longest-path level: a node runs one wave after its latest input
        let mut levels = vec![0usize; nodes.len()];
        let mut by_level: BTreeMap<usize, Vec<NodeId>> = BTreeMap::new();
        let mut order = Vec::with_capacity(reachable.len());
        for index in sorted {
            if !reachable.contains(&index) {
                continue;
            }
            let level = graph
                .neighbors_directed(index, Direction::Incoming)
                .map(|input| levels[input.index()] + 1)
                .max()
                .unwrap_or(0);
            levels[index.index()] = level;
            order.push(graph[index]);
            by_level.entry(level).or_default().push(graph[index]);
        }
        let waves = by_level
            .into_values()
            .map(|mut wave| {
                wave.sort();
                wave
            })
            .collect();

        Ok(Self {
            graph,
            indices,
            order,
            waves,
        })
    }

    /// Reachable nodes in a dependency-respecting order
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    /// Reachable nodes grouped into waves. Every input of a node lies in an
    /// earlier wave, so the nodes of one wave may run concurrently.
    pub fn waves(&self) -> &[Vec<NodeId>] {
        &self.waves
    }

    /// Nodes whose results `id` reads
    pub fn inputs_of(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Nodes reading the result of `id`
    pub fn readers_of(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbors(id, Direction::Outgoing)
    }

    fn neighbors(&self, id: NodeId, direction: Direction) -> Vec<NodeId> {
        let Some(index) = self.indices.get(id.index()) else {
            return Vec::new();
        };
        let mut found: Vec<NodeId> = self
            .graph
            .neighbors_directed(*index, direction)
            .map(|n| self.graph[n])
            .collect();
        found.sort();
        found.dedup();
        found
    }
}
