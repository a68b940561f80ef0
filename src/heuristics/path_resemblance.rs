//! Resemblance between an item's name and a unit's directory path

use super::names::{contained_ratio, split_identifier};
use super::{has_signatures, EvaluationContext, Heuristic};
use crate::computation::{Confidence, EndpointTuple, TraceResult};

/// Scores the fraction of the item's name words found in the unit's path.
///
/// For units inside a declared package, path segments that are themselves
/// package names are ignored; those are matched by name heuristics instead.
/// A score of zero abstains.
#[derive(Debug, Default)]
pub struct PathResemblance;

impl PathResemblance {
    pub fn new() -> Self {
        Self
    }
}

impl Heuristic for PathResemblance {
    fn id(&self) -> &str {
        "path-resemblance"
    }

    fn evaluate(&self, tuple: &EndpointTuple, context: &EvaluationContext<'_>) -> TraceResult<Confidence> {
        if has_signatures(tuple) {
            return Ok(Confidence::unset());
        }
        let unit = &tuple.code;
        let packages = context.package_names();
        let path_words: Vec<String> = unit
            .path_elements()
            .iter()
            .filter(|segment| !(unit.has_parent() && packages.contains(&segment.to_lowercase())))
            .flat_map(|segment| split_identifier(segment))
            .collect();

        let item_words = split_identifier(&tuple.architecture.name);
        let similarity = contained_ratio(&item_words, &path_words);
        if similarity == 0.0 {
            return Ok(Confidence::unset());
        }
        Confidence::of(similarity)
    }
}
