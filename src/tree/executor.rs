//! Running computation trees over a pair of models

use super::builder::ComputationTree;
use super::cancel::CancellationToken;
use super::node::{ComputationNode, NodeKind};
use crate::computation::{
    Confidence, EndpointTuple, EndpointTupleRepo, NodeId, NodeResult, ResultStore, TraceError, TraceResult,
};
use crate::heuristics::EvaluationContext;
use crate::model::{ArchitectureModel, CodeModel};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Whether a run may use worker threads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parallelism {
    /// One node at a time, one tuple at a time
    Sequential,
    /// Nodes of a wave run concurrently and each node's tuples are split
    /// across the rayon pool
    #[default]
    Parallel,
}

impl std::str::FromStr for Parallelism {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "parallel" => Ok(Self::Parallel),
            other => Err(TraceError::Config(format!("unknown parallelism '{}'", other))),
        }
    }
}

/// Evaluates computation trees.
///
/// Each run builds a fresh tuple repository and result store; nothing is
/// shared between runs, so one executor can serve several runs at once.
#[derive(Debug, Clone, Default)]
pub struct TreeExecutor {
    parallelism: Parallelism,
    cancellation: CancellationToken,
}

impl TreeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Abort runs once the token is cancelled, checked before each node pass.
    /// A timeout on the token is counted from the start of every run.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn parallelism(&self) -> Parallelism {
        self.parallelism
    }

    /// Run every node the root depends on, then the root itself.
    pub fn run(
        &self,
        tree: &ComputationTree,
        architecture: &ArchitectureModel,
        code: &CodeModel,
    ) -> TraceResult<Evaluation> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let repo = EndpointTupleRepo::new(architecture, code);
        let store = ResultStore::new();
        info!(
            %run_id,
            tree = tree.name(),
            tuples = repo.len(),
            nodes = tree.graph().order().len(),
            "starting evaluation run"
        );

        let pass = NodePass {
            architecture,
            code,
            repo: &repo,
            store: &store,
            parallelism: self.parallelism,
            cancellation: self.cancellation.start(),
        };
        for wave in tree.graph().waves() {
            match self.parallelism {
                Parallelism::Sequential => {
                    for id in wave {
                        self.run_node(tree, *id, &pass)?;
                    }
                }
                Parallelism::Parallel => {
                    wave.par_iter()
                        .map(|id| self.run_node(tree, *id, &pass))
                        .collect::<TraceResult<Vec<()>>>()?;
                }
            }
        }

        let root_node = tree.node(tree.root())?;
        let root = store.get(tree.root(), root_node.label())?;
        info!(
            %run_id,
            tree = tree.name(),
            defined = root.defined_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "evaluation run finished"
        );
        Ok(Evaluation {
            run_id,
            tree: tree.name().to_string(),
            root_label: root_node.label().to_string(),
            root_id: tree.root(),
            repo,
            store,
            root,
        })
    }

    fn run_node(&self, tree: &ComputationTree, id: NodeId, pass: &NodePass<'_>) -> TraceResult<()> {
        let node = tree.node(id)?;
        if pass.cancellation.is_cancelled() {
            warn!(node = node.label(), "evaluation cancelled");
            return Err(TraceError::Cancelled {
                node: node.label().to_string(),
            });
        }
        let started = Instant::now();
        let result = pass.evaluate(node)?;
        debug!(
            node = node.label(),
            id = %id,
            defined = result.defined_count(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "node pass complete"
        );
        pass.store.publish(id, result)?;
        Ok(())
    }
}

/// Everything one node pass reads
struct NodePass<'a> {
    architecture: &'a ArchitectureModel,
    code: &'a CodeModel,
    repo: &'a EndpointTupleRepo,
    store: &'a ResultStore,
    parallelism: Parallelism,
    cancellation: CancellationToken,
}

impl NodePass<'_> {
    /// Compute a node's confidence for every tuple and seal the result.
    ///
    /// Tuples may be scored on several threads; writes happen afterwards on
    /// this thread in repository order, so each tuple is written exactly once.
    fn evaluate(&self, node: &ComputationNode) -> TraceResult<NodeResult> {
        let inputs = node
            .inputs()
            .iter()
            .map(|input| self.store.get(*input, node.label()))
            .collect::<TraceResult<Vec<_>>>()?;

        let confidences = match node.kind() {
            NodeKind::Heuristic { heuristic, .. } => {
                let base = if node.is_dependent() { inputs.first().cloned() } else { None };
                let context = EvaluationContext::new(self.architecture, self.code).with_dependencies(inputs)?;
                self.score(|tuple| {
                    // Entries the base already defines are carried over unchanged
                    if let Some(base) = &base {
                        let inherited = base.get(tuple);
                        if inherited.has_value() {
                            return Ok(inherited);
                        }
                    }
                    heuristic.evaluate(tuple, &context)
                })?
            }
            NodeKind::Aggregation { policy, .. } => self.score(|tuple| policy.evaluate(tuple, &inputs))?,
        };

        let mut result = NodeResult::new(node.label());
        for (tuple, confidence) in self.repo.tuples().iter().zip(confidences) {
            result.set(tuple.clone(), confidence)?;
        }
        result.seal(self.repo)?;
        Ok(result)
    }

    fn score<F>(&self, f: F) -> TraceResult<Vec<Confidence>>
    where
        F: Fn(&EndpointTuple) -> TraceResult<Confidence> + Send + Sync,
    {
        match self.parallelism {
            Parallelism::Sequential => self.repo.tuples().iter().map(f).collect(),
            Parallelism::Parallel => self.repo.tuples().par_iter().map(f).collect(),
        }
    }
}

/// The outcome of one run: the tuple repository and every node's sealed result
#[derive(Debug)]
pub struct Evaluation {
    run_id: Uuid,
    tree: String,
    root_label: String,
    root_id: NodeId,
    repo: EndpointTupleRepo,
    store: ResultStore,
    root: Arc<NodeResult>,
}

impl Evaluation {
    /// Unique id of the run, as logged
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Name of the evaluated tree
    pub fn tree_name(&self) -> &str {
        &self.tree
    }

    pub fn repo(&self) -> &EndpointTupleRepo {
        &self.repo
    }

    pub fn root_id(&self) -> NodeId {
        self.root_id
    }

    pub fn root_label(&self) -> &str {
        &self.root_label
    }

    /// The root node's result, the input of the trace-link exporter
    pub fn root_result(&self) -> &NodeResult {
        &self.root
    }

    /// The result of any evaluated node
    pub fn result(&self, id: NodeId) -> Option<Arc<NodeResult>> {
        self.store.get(id, "").ok()
    }

    /// Number of nodes that produced a result
    pub fn node_count(&self) -> usize {
        self.store.len()
    }
}
