//! Link propagation to same-package units that differ only by a common word

use super::names::remove_words;
use super::{has_signatures, EvaluationContext, Heuristic, HeuristicKind};
use crate::computation::{Confidence, EndpointTuple, TraceResult};
use crate::model::CodeCompilationUnit;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Suffix words that usually mark a unit as a companion of another unit
pub const DEFAULT_COMMON_WORDS: &[&str] = &["Test", "Action", "Impl", "Factory", "Exception"];

/// Extends the base dependency's links to sibling units.
///
/// Common words (minus any word the architecture itself uses) are stripped
/// from both names. A unit whose stripped name equals the item's stripped
/// name scores 1. Otherwise the unit inherits the best confidence of a unit
/// already linked to the item that lives in the same package and has the
/// same stripped name (`OrderServiceTest` next to a linked `OrderService`).
pub struct SiblingResemblance {
    common_words: BTreeSet<String>,
}

impl Default for SiblingResemblance {
    fn default() -> Self {
        Self::new()
    }
}

impl SiblingResemblance {
    pub fn new() -> Self {
        Self::with_common_words(DEFAULT_COMMON_WORDS.iter().copied())
    }

    pub fn with_common_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            common_words: words.into_iter().map(|w| w.as_ref().to_lowercase()).collect(),
        }
    }

    fn filtered_words(&self, context: &EvaluationContext<'_>) -> BTreeSet<String> {
        self.common_words
            .difference(context.architecture_words())
            .cloned()
            .collect()
    }
}

fn are_similar<'n>(
    left: impl IntoIterator<Item = &'n str>,
    right: &[&str],
    filtered: &BTreeSet<String>,
) -> bool {
    left.into_iter().any(|l| {
        let l_words = remove_words(l, filtered);
        !l_words.is_empty() && right.iter().any(|r| remove_words(r, filtered) == l_words)
    })
}

fn names_of(unit: &CodeCompilationUnit) -> Vec<&str> {
    unit.all_data_types_and_self().into_iter().map(|i| i.name).collect()
}

impl Heuristic for SiblingResemblance {
    fn id(&self) -> &str {
        "sibling-resemblance"
    }

    fn kind(&self) -> HeuristicKind {
        HeuristicKind::Dependent
    }

    fn evaluate(&self, tuple: &EndpointTuple, context: &EvaluationContext<'_>) -> TraceResult<Confidence> {
        let base = context.base()?;
        if has_signatures(tuple) || base.get(tuple).has_value() {
            return Ok(Confidence::unset());
        }
        let filtered = self.filtered_words(context);
        let candidate_names = names_of(&tuple.code);

        if are_similar(candidate_names.iter().copied(), &[tuple.architecture.name.as_str()], &filtered) {
            return Confidence::of(1.0);
        }

        let mut best = Confidence::unset();
        for linked in base.linked_endpoints(&tuple.architecture.id) {
            if !tuple.code.same_package(linked)
                || !are_similar(candidate_names.iter().copied(), &names_of(linked), &filtered)
            {
                continue;
            }
            let linked_tuple = EndpointTuple::new(Arc::clone(&tuple.architecture), Arc::clone(linked));
            let extended = base.get(&linked_tuple);
            if extended > best {
                best = extended;
            }
        }
        Ok(best)
    }
}
