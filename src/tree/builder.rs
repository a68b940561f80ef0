//! Assembling computation trees

use super::graph::EvaluationGraph;
use super::node::{ComputationNode, NodeKind};
use crate::aggregation::AggregationPolicy;
use crate::computation::{NodeId, TraceError, TraceResult};
use crate::heuristics::{Heuristic, HeuristicKind};
use std::sync::Arc;

/// Collects nodes and their edges, then validates them into a
/// [`ComputationTree`].
///
/// Node ids are handed out in insertion order. Edges may point to nodes added
/// later, so every reference is only resolved in [`TreeBuilder::build`].
///
/// ```
/// use archtrace::{AggregationPolicy, NameResemblance, NameScope, PathResemblance, PreprocessingMethod, TreeBuilder};
///
/// let mut builder = TreeBuilder::new("example");
/// let name = builder.heuristic(NameResemblance::new(NameScope::Component, PreprocessingMethod::Split));
/// let path = builder.heuristic(PathResemblance::new());
/// let root = builder.aggregation(AggregationPolicy::Max, vec![name, path]);
/// let tree = builder.build(root).unwrap();
/// assert_eq!(tree.len(), 3);
/// ```
pub struct TreeBuilder {
    name: String,
    nodes: Vec<ComputationNode>,
}

impl TreeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    /// Add a heuristic leaf labelled with the heuristic's id
    pub fn heuristic(&mut self, heuristic: impl Heuristic + 'static) -> NodeId {
        self.shared_heuristic(Arc::new(heuristic))
    }

    /// Add a heuristic leaf sharing an existing heuristic instance
    pub fn shared_heuristic(&mut self, heuristic: Arc<dyn Heuristic>) -> NodeId {
        let label = heuristic.id().to_string();
        self.push(
            label,
            NodeKind::Heuristic {
                heuristic,
                dependencies: Vec::new(),
            },
        )
    }

    /// Add an aggregation over `children`, in the given order
    pub fn aggregation(&mut self, policy: AggregationPolicy, children: Vec<NodeId>) -> NodeId {
        let label = policy.name().to_string();
        self.push(label, NodeKind::Aggregation { policy, children })
    }

    /// Declare that heuristic `node` reads the completed result of `dependency`.
    ///
    /// The first declared dependency is the base a dependent heuristic extends.
    pub fn depends_on(&mut self, node: NodeId, dependency: NodeId) -> TraceResult<&mut Self> {
        let target = self
            .nodes
            .get_mut(node.index())
            .ok_or_else(|| TraceError::UnresolvedReference(format!("node {}", node)))?;
        let label = target.label().to_string();
        match target.kind_mut() {
            NodeKind::Heuristic { dependencies, .. } => dependencies.push(dependency),
            NodeKind::Aggregation { .. } => {
                return Err(TraceError::InvalidArgument(format!(
                    "aggregation node '{}' reads its children, not declared dependencies",
                    label
                )))
            }
        }
        Ok(self)
    }

    /// Override the label of a node
    pub fn label(&mut self, node: NodeId, label: impl Into<String>) -> TraceResult<&mut Self> {
        let target = self
            .nodes
            .get_mut(node.index())
            .ok_or_else(|| TraceError::UnresolvedReference(format!("node {}", node)))?;
        target.set_label(label.into());
        Ok(self)
    }

    fn push(&mut self, label: String, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(ComputationNode::new(id, label, kind));
        id
    }

    /// Validate every node and build the evaluation graph rooted at `root`
    pub fn build(self, root: NodeId) -> TraceResult<ComputationTree> {
        if root.index() >= self.nodes.len() {
            return Err(TraceError::UnresolvedReference(format!("root node {}", root)));
        }
        for node in &self.nodes {
            match node.kind() {
                NodeKind::Heuristic {
                    heuristic,
                    dependencies,
                } => match (heuristic.kind(), dependencies.is_empty()) {
                    (HeuristicKind::Dependent, true) => {
                        return Err(TraceError::InvalidArgument(format!(
                            "dependent heuristic '{}' declares no dependency",
                            node.label()
                        )))
                    }
                    (HeuristicKind::Standalone, false) => {
                        return Err(TraceError::InvalidArgument(format!(
                            "standalone heuristic '{}' cannot declare dependencies",
                            node.label()
                        )))
                    }
                    _ => {}
                },
                NodeKind::Aggregation { policy, children } => policy.validate(children.len())?,
            }
        }
        let graph = EvaluationGraph::new(&self.nodes, root)?;
        Ok(ComputationTree {
            name: self.name,
            nodes: self.nodes,
            root,
            graph,
        })
    }
}

/// A validated computation tree, ready to be run by a
/// [`TreeExecutor`](super::TreeExecutor) any number of times.
#[derive(Debug, Clone)]
pub struct ComputationTree {
    name: String,
    nodes: Vec<ComputationNode>,
    root: NodeId,
    graph: EvaluationGraph,
}

impl ComputationTree {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> TraceResult<&ComputationNode> {
        self.nodes
            .get(id.index())
            .ok_or_else(|| TraceError::UnresolvedReference(format!("node {} in tree '{}'", id, self.name)))
    }

    /// The first node carrying `label`
    pub fn find(&self, label: &str) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.label() == label).map(ComputationNode::id)
    }

    pub fn nodes(&self) -> &[ComputationNode] {
        &self.nodes
    }

    pub fn graph(&self) -> &EvaluationGraph {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::computation::{Confidence, EndpointTuple};
    use crate::heuristics::{EvaluationContext, InheritLinks, PathResemblance};

    struct Fixed;

    impl Heuristic for Fixed {
        fn id(&self) -> &str {
            "fixed"
        }

        fn evaluate(&self, _: &EndpointTuple, _: &EvaluationContext<'_>) -> TraceResult<Confidence> {
            Ok(Confidence::unset())
        }
    }

    #[test]
    fn mutual_dependency_is_cyclic() {
        let mut builder = TreeBuilder::new("cyclic");
        let h1 = builder.heuristic(InheritLinks::new());
        let h2 = builder.heuristic(InheritLinks::new());
        builder.depends_on(h1, h2).unwrap();
        builder.depends_on(h2, h1).unwrap();
        let root = builder.aggregation(AggregationPolicy::Max, vec![h1, h2]);
        assert!(matches!(builder.build(root), Err(TraceError::CyclicDependency { .. })));
    }

    #[test]
    fn self_dependency_is_cyclic() {
        let mut builder = TreeBuilder::new("self");
        let h = builder.heuristic(InheritLinks::new());
        builder.depends_on(h, h).unwrap();
        assert!(matches!(builder.build(h), Err(TraceError::CyclicDependency { .. })));
    }

    #[test]
    fn unknown_references_are_unresolved() {
        let mut builder = TreeBuilder::new("dangling");
        let h = builder.heuristic(Fixed);
        let root = builder.aggregation(AggregationPolicy::Max, vec![h, NodeId::new(7)]);
        assert!(matches!(builder.build(root), Err(TraceError::UnresolvedReference(_))));

        let mut builder = TreeBuilder::new("dangling");
        assert!(builder.depends_on(NodeId::new(3), NodeId::new(0)).is_err());
        let h = builder.heuristic(Fixed);
        assert!(matches!(
            builder.build(NodeId::new(h.index() + 1)),
            Err(TraceError::UnresolvedReference(_))
        ));
    }

    #[test]
    fn node_kinds_are_validated() {
        let mut builder = TreeBuilder::new("lonely");
        let h = builder.heuristic(InheritLinks::new());
        assert!(matches!(builder.build(h), Err(TraceError::InvalidArgument(_))));

        let mut builder = TreeBuilder::new("standalone");
        let a = builder.heuristic(Fixed);
        let b = builder.heuristic(PathResemblance::new());
        builder.depends_on(b, a).unwrap();
        assert!(matches!(builder.build(b), Err(TraceError::InvalidArgument(_))));

        let mut builder = TreeBuilder::new("empty");
        let root = builder.aggregation(AggregationPolicy::Average, vec![]);
        assert!(matches!(builder.build(root), Err(TraceError::InvalidArgument(_))));

        let mut builder = TreeBuilder::new("aggregation");
        let a = builder.heuristic(Fixed);
        let root = builder.aggregation(AggregationPolicy::Max, vec![a]);
        assert!(builder.depends_on(root, a).is_err());
    }

    #[test]
    fn labels_default_to_heuristic_ids() {
        let mut builder = TreeBuilder::new("labels");
        let a = builder.heuristic(Fixed);
        let b = builder.heuristic(PathResemblance::new());
        let root = builder.aggregation(AggregationPolicy::Max, vec![a, b]);
        builder.label(root, "combined").unwrap();
        let tree = builder.build(root).unwrap();

        assert_eq!(tree.node(a).unwrap().label(), "fixed");
        assert_eq!(tree.find("path-resemblance"), Some(b));
        assert_eq!(tree.find("combined"), Some(root));
        assert_eq!(tree.name(), "labels");
        assert!(tree.node(NodeId::new(9)).is_err());
    }
}
