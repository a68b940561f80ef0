//! Link propagation along inheritance relations

use super::{EvaluationContext, Heuristic, HeuristicKind};
use crate::computation::{Confidence, EndpointTuple, TraceResult};
use std::sync::Arc;

/// Extends the base dependency's links to units whose types extend or
/// implement a type declared in an already-linked unit.
///
/// The unit inherits the best confidence among the linked units it derives
/// from. Supertypes that no unit of the code model declares (library types)
/// are simply not matched.
#[derive(Debug, Default)]
pub struct InheritLinks;

impl InheritLinks {
    pub fn new() -> Self {
        Self
    }
}

impl Heuristic for InheritLinks {
    fn id(&self) -> &str {
        "inherit-links"
    }

    fn kind(&self) -> HeuristicKind {
        HeuristicKind::Dependent
    }

    fn evaluate(&self, tuple: &EndpointTuple, context: &EvaluationContext<'_>) -> TraceResult<Confidence> {
        let base = context.base()?;
        if base.get(tuple).has_value() {
            return Ok(Confidence::unset());
        }
        let mut best = Confidence::unset();
        for linked in base.linked_endpoints(&tuple.architecture.id) {
            // Linked units must come from this run's code model
            context.code().unit(&linked.id)?;
            if !tuple.code.inherits_from(linked) {
                continue;
            }
            let linked_tuple = EndpointTuple::new(Arc::clone(&tuple.architecture), Arc::clone(linked));
            let inherited = base.get(&linked_tuple);
            if inherited > best {
                best = inherited;
            }
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::computation::{EndpointTupleRepo, NodeResult, TraceError};
    use crate::model::{ArchitectureItem, ArchitectureModel, CodeCompilationUnit, CodeModel, DataType};

    fn units() -> Vec<CodeCompilationUnit> {
        vec![
            CodeCompilationUnit::new("u1", "Repository").with_type(DataType::interface("Repository")),
            CodeCompilationUnit::new("u2", "SqlRepository")
                .with_type(DataType::class("SqlRepository").extending("Repository")),
            CodeCompilationUnit::new("u3", "Cache").with_type(DataType::class("Cache").extending("Object")),
        ]
    }

    fn sealed(repo: &EndpointTupleRepo, values: &[Option<f64>]) -> Arc<NodeResult> {
        let mut result = NodeResult::new("base");
        for (tuple, value) in repo.tuples().iter().zip(values) {
            let c = value.map(|v| Confidence::of(v).unwrap()).unwrap_or_default();
            result.set(tuple.clone(), c).unwrap();
        }
        result.seal(repo).unwrap();
        Arc::new(result)
    }

    #[test]
    fn derived_unit_inherits_link() {
        let architecture = ArchitectureModel::new(vec![ArchitectureItem::component("c1", "Persistence")]).unwrap();
        let code = CodeModel::new(units(), Vec::new()).unwrap();
        let repo = EndpointTupleRepo::new(&architecture, &code);
        let ctx = EvaluationContext::new(&architecture, &code)
            .with_dependencies(vec![sealed(&repo, &[Some(0.7), None, None])])
            .unwrap();

        let h = InheritLinks::new();
        assert_eq!(h.evaluate(&repo.tuples()[1], &ctx).unwrap(), Confidence::of(0.7).unwrap());
        assert!(!h.evaluate(&repo.tuples()[2], &ctx).unwrap().has_value());
        // Already linked by the base: left to the carry-over
        assert!(!h.evaluate(&repo.tuples()[0], &ctx).unwrap().has_value());
    }

    #[test]
    fn links_to_foreign_units_are_unresolved() {
        let architecture = ArchitectureModel::new(vec![ArchitectureItem::component("c1", "Persistence")]).unwrap();
        let full = CodeModel::new(units(), Vec::new()).unwrap();
        let repo = EndpointTupleRepo::new(&architecture, &full);
        let base = sealed(&repo, &[Some(0.7), None, None]);

        // Evaluate against a code model that lacks the linked unit
        let partial = CodeModel::new(units().into_iter().skip(1).collect(), Vec::new()).unwrap();
        let ctx = EvaluationContext::new(&architecture, &partial)
            .with_dependencies(vec![base])
            .unwrap();
        let err = InheritLinks::new().evaluate(&repo.tuples()[1], &ctx).unwrap_err();
        assert!(matches!(err, TraceError::UnresolvedReference(_)));
    }
}
