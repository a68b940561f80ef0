//! Archtrace: Architecture-to-Code Trace Link Recovery
//!
//! Recovers trace links between the items of an architecture model
//! (components, interfaces) and the compilation units of a code model by
//! running a tree of heuristics over every candidate pair.
//!
//! # Core Concepts
//!
//! - **Endpoint tuples**: every (architecture item, compilation unit) pair
//! - **Confidence**: per-tuple score in `[0, 1]`, or unset when a node abstains
//! - **Heuristics**: leaf nodes scoring tuples from names, paths or the
//!   results of other nodes
//! - **Aggregations**: internal nodes combining their children's confidences
//! - **Executor**: runs the nodes in dependency order and exposes the root
//!   result to the trace-link exporter
//!
//! # Example
//!
//! ```
//! use archtrace::{
//!     ArchitectureItem, ArchitectureModel, CodeCompilationUnit, CodeModel, NameResemblance,
//!     NameScope, PreprocessingMethod, TraceLinkExporter, TreeBuilder, TreeExecutor,
//! };
//!
//! let architecture = ArchitectureModel::new(vec![ArchitectureItem::component("c1", "OrderService")]).unwrap();
//! let code = CodeModel::new(vec![CodeCompilationUnit::new("u1", "OrderService")], vec![]).unwrap();
//!
//! let mut builder = TreeBuilder::new("names");
//! let root = builder.heuristic(NameResemblance::new(NameScope::Component, PreprocessingMethod::SplitFiltered));
//! let tree = builder.build(root).unwrap();
//!
//! let evaluation = TreeExecutor::new().run(&tree, &architecture, &code).unwrap();
//! let links = TraceLinkExporter::new(0.5).unwrap().export_evaluation(&evaluation).unwrap();
//! assert_eq!(links.len(), 1);
//! ```

pub mod aggregation;
pub mod computation;
pub mod config;
pub mod export;
pub mod heuristics;
pub mod model;
pub mod tree;

pub use aggregation::AggregationPolicy;
pub use computation::{
    Confidence, EndpointTuple, EndpointTupleRepo, NodeId, NodeResult, ResultStore, TraceError, TraceResult,
};
pub use config::TraceConfig;
pub use export::{
    evaluate, macro_average, micro_average, weighted_average, EvaluationMetrics, GoldStandard, TraceLink,
    TraceLinkExporter, TraceLinkReport,
};
pub use heuristics::{
    EvaluationContext, Heuristic, HeuristicKind, InheritLinks, NamePreprocessor, NameResemblance, NameScope,
    PathResemblance, PreprocessingMethod, SiblingResemblance,
};
pub use model::{
    ArchitectureItem, ArchitectureModel, CodeCompilationUnit, CodeItem, CodeItemKind, CodeModel, CodePackage,
    DataType, ItemId, ItemKind, UnitId,
};
pub use tree::{
    standard_tree, CancellationToken, ComputationNode, ComputationTree, Evaluation, NodeKind, Parallelism,
    TreeBuilder, TreeExecutor,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
