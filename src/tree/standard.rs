//! The default computation tree

use super::builder::{ComputationTree, TreeBuilder};
use crate::aggregation::AggregationPolicy;
use crate::computation::TraceResult;
use crate::config::TraceConfig;
use crate::heuristics::{InheritLinks, NameResemblance, NameScope, PathResemblance, SiblingResemblance};

/// Name of the tree built by [`standard_tree`]
pub const STANDARD_TREE: &str = "standard";

/// Label of the weighted name/path node the propagating heuristics extend
pub const WEIGHTED_NAME_PATH: &str = "weighted-name-path";

/// Build the default tree:
///
/// ```text
/// max
/// ├── weighted(name·component, path)
/// ├── name·component-without-package
/// ├── name·interface
/// ├── sibling-resemblance   (extends the weighted node)
/// └── inherit-links         (extends the weighted node)
/// ```
pub fn standard_tree(config: &TraceConfig) -> TraceResult<ComputationTree> {
    config.validate()?;
    let preprocessor = config.name_preprocessor();
    let mut builder = TreeBuilder::new(STANDARD_TREE);

    let name = builder.heuristic(NameResemblance::with_preprocessor(NameScope::Component, preprocessor.clone()));
    let path = builder.heuristic(PathResemblance::new());
    let weighted = builder.aggregation(AggregationPolicy::Weighted(config.weights.clone()), vec![name, path]);
    builder.label(weighted, WEIGHTED_NAME_PATH)?;

    let without_package = builder.heuristic(NameResemblance::with_preprocessor(
        NameScope::ComponentWithoutPackage,
        preprocessor.clone(),
    ));
    let interface = builder.heuristic(NameResemblance::with_preprocessor(NameScope::Interface, preprocessor));

    let sibling = builder.heuristic(SiblingResemblance::with_common_words(&config.common_words));
    builder.depends_on(sibling, weighted)?;
    let inherit = builder.heuristic(InheritLinks::new());
    builder.depends_on(inherit, weighted)?;

    let root = builder.aggregation(
        AggregationPolicy::Max,
        vec![weighted, without_package, interface, sibling, inherit],
    );
    builder.build(root)
}
