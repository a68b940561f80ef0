//! Evaluation context handed to every heuristic

use super::names::split_identifier;
use crate::computation::{NodeResult, TraceError, TraceResult};
use crate::model::{ArchitectureModel, CodeModel};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Read-only view of a run for one node pass.
///
/// Holds the two input models, the sealed results of the node's declared
/// dependencies (in declaration order) and a few model-wide facts that several
/// heuristics need, computed once per pass instead of once per tuple.
#[derive(Debug)]
pub struct EvaluationContext<'a> {
    architecture: &'a ArchitectureModel,
    code: &'a CodeModel,
    dependencies: Vec<Arc<NodeResult>>,
    package_names: BTreeSet<String>,
    architecture_words: BTreeSet<String>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(architecture: &'a ArchitectureModel, code: &'a CodeModel) -> Self {
        let package_names = code.package_names().into_iter().map(str::to_lowercase).collect();
        let architecture_words = architecture
            .endpoints()
            .iter()
            .flat_map(|item| split_identifier(&item.name))
            .collect();
        Self {
            architecture,
            code,
            dependencies: Vec::new(),
            package_names,
            architecture_words,
        }
    }

    /// Attach the results of the declared dependencies. Each must be sealed.
    pub fn with_dependencies(mut self, dependencies: Vec<Arc<NodeResult>>) -> TraceResult<Self> {
        for dependency in &dependencies {
            dependency.ensure_complete()?;
        }
        self.dependencies = dependencies;
        Ok(self)
    }

    pub fn architecture(&self) -> &ArchitectureModel {
        self.architecture
    }

    pub fn code(&self) -> &CodeModel {
        self.code
    }

    /// Result of the dependency declared at `index`
    pub fn dependency(&self, index: usize) -> TraceResult<&NodeResult> {
        self.dependencies
            .get(index)
            .map(Arc::as_ref)
            .ok_or_else(|| {
                TraceError::UnresolvedReference(format!(
                    "dependency #{} (node declares {})",
                    index,
                    self.dependencies.len()
                ))
            })
    }

    /// Result of the first declared dependency, whose defined entries a
    /// dependent heuristic extends
    pub fn base(&self) -> TraceResult<&NodeResult> {
        self.dependency(0)
    }

    pub fn dependency_count(&self) -> usize {
        self.dependencies.len()
    }

    /// Lower-cased names of every declared package
    pub fn package_names(&self) -> &BTreeSet<String> {
        &self.package_names
    }

    /// Every lower-cased word used by any architecture item name
    pub fn architecture_words(&self) -> &BTreeSet<String> {
        &self.architecture_words
    }
}
