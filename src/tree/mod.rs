//! Computation trees: assembly, scheduling and execution
//!
//! A tree is built once with a [`TreeBuilder`] and can then be run any number
//! of times by a [`TreeExecutor`], each run over one architecture model and
//! one code model.
//!
//! # Scheduling
//!
//! Nodes are scheduled over an explicit dependency graph rather than by tree
//! recursion, since dependent heuristics may read siblings or ancestors:
//!
//! 1. Edges come from aggregation children and declared dependencies
//! 2. The graph is topologically sorted (a cycle fails the build)
//! 3. Nodes are grouped into waves by longest path from the leaves
//! 4. Waves run in order; nodes of a wave may run concurrently
//!
//! A node's result is sealed and published before any reader starts.

mod builder;
mod cancel;
mod executor;
mod graph;
mod node;
mod standard;

pub use builder::{ComputationTree, TreeBuilder};
pub use cancel::CancellationToken;
pub use executor::{Evaluation, Parallelism, TreeExecutor};
pub use graph::EvaluationGraph;
pub use node::{ComputationNode, NodeKind};
pub use standard::{standard_tree, STANDARD_TREE, WEIGHTED_NAME_PATH};
