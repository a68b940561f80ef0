//! Policies combining the confidences of an aggregation node's children

use crate::computation::{Confidence, EndpointTuple, NodeResult, TraceError, TraceResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How an aggregation node combines its children's confidences for a tuple.
///
/// Unset child confidences are never treated as zero: every policy only looks
/// at defined values and abstains when none of the children has one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", content = "weights", rename_all = "snake_case")]
pub enum AggregationPolicy {
    /// Arithmetic mean of the defined values
    Average,
    /// Smallest defined value
    Min,
    /// Largest defined value
    Max,
    /// Weighted mean of the defined values, one weight per child; weights are
    /// renormalised over the children that produced a value
    Weighted(Vec<f64>),
}

impl AggregationPolicy {
    /// Short label used for node names and logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Average => "average",
            Self::Min => "min",
            Self::Max => "max",
            Self::Weighted(_) => "weighted",
        }
    }

    /// Check the policy against the number of children it will combine
    pub fn validate(&self, child_count: usize) -> TraceResult<()> {
        if child_count == 0 {
            return Err(TraceError::InvalidArgument(format!(
                "{} aggregation needs at least one child",
                self.name()
            )));
        }
        if let Self::Weighted(weights) = self {
            if weights.len() != child_count {
                return Err(TraceError::InvalidArgument(format!(
                    "weighted aggregation has {} weights for {} children",
                    weights.len(),
                    child_count
                )));
            }
            if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
                return Err(TraceError::InvalidArgument(format!(
                    "aggregation weight must be finite and non-negative, got {}",
                    bad
                )));
            }
        }
        Ok(())
    }

    /// Combine the child confidences of one tuple, in child order
    pub fn aggregate(&self, confidences: &[Confidence]) -> TraceResult<Confidence> {
        let defined = || confidences.iter().filter_map(Confidence::as_option);
        match self {
            Self::Average => {
                let (sum, count) = defined().fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
                if count == 0 {
                    return Ok(Confidence::unset());
                }
                Confidence::of((sum / count as f64).clamp(0.0, 1.0))
            }
            Self::Min => defined()
                .reduce(f64::min)
                .map_or(Ok(Confidence::unset()), Confidence::of),
            Self::Max => defined()
                .reduce(f64::max)
                .map_or(Ok(Confidence::unset()), Confidence::of),
            Self::Weighted(weights) => {
                self.validate(confidences.len())?;
                let (weighted, total) = confidences
                    .iter()
                    .zip(weights)
                    .filter_map(|(c, w)| c.as_option().map(|v| (v, *w)))
                    .fold((0.0, 0.0), |(s, t), (v, w)| (s + v * w, t + w));
                if total == 0.0 {
                    return Ok(Confidence::unset());
                }
                Confidence::of((weighted / total).clamp(0.0, 1.0))
            }
        }
    }

    /// Combine the children's results for one tuple.
    ///
    /// Every child result must be sealed; lookups against a partially written
    /// result fail with `IncompleteDependency`.
    pub fn evaluate(&self, tuple: &EndpointTuple, children: &[Arc<NodeResult>]) -> TraceResult<Confidence> {
        let mut confidences = Vec::with_capacity(children.len());
        for child in children {
            child.ensure_complete()?;
            confidences.push(child.get(tuple));
        }
        self.aggregate(&confidences)
    }
}

impl std::fmt::Display for AggregationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weighted(weights) => {
                let weights: Vec<String> = weights.iter().map(|w| w.to_string()).collect();
                write!(f, "weighted[{}]", weights.join(", "))
            }
            other => write!(f, "{}", other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(value: f64) -> Confidence {
        Confidence::of(value).unwrap()
    }

    fn approx(confidence: Confidence, expected: f64) -> bool {
        (confidence.value().unwrap() - expected).abs() < 1e-9
    }

    #[test]
    fn average_skips_unset_children() {
        let result = AggregationPolicy::Average
            .aggregate(&[c(0.2), Confidence::unset(), c(0.6)])
            .unwrap();
        assert!(approx(result, 0.4));
    }

    #[test]
    fn all_unset_children_abstain() {
        let unset = [Confidence::unset(), Confidence::unset()];
        for policy in [
            AggregationPolicy::Average,
            AggregationPolicy::Min,
            AggregationPolicy::Max,
            AggregationPolicy::Weighted(vec![0.5, 0.5]),
        ] {
            assert!(!policy.aggregate(&unset).unwrap().has_value(), "{}", policy);
        }
    }

    #[test]
    fn min_and_max_pick_defined_extremes() {
        let children = [Confidence::unset(), c(0.3), c(0.9)];
        assert_eq!(AggregationPolicy::Max.aggregate(&children).unwrap(), c(0.9));
        assert_eq!(AggregationPolicy::Min.aggregate(&children).unwrap(), c(0.3));
    }

    #[test]
    fn defined_zero_is_a_value() {
        let children = [c(0.0), Confidence::unset()];
        assert_eq!(AggregationPolicy::Min.aggregate(&children).unwrap(), c(0.0));
        assert!(approx(AggregationPolicy::Average.aggregate(&children).unwrap(), 0.0));
    }

    #[test]
    fn weighted_renormalises_over_defined_children() {
        let policy = AggregationPolicy::Weighted(vec![0.7, 0.3]);
        assert!(approx(policy.aggregate(&[c(1.0), c(0.5)]).unwrap(), 0.85));
        // Only the second child has a value: its weight becomes 1
        assert!(approx(policy.aggregate(&[Confidence::unset(), c(0.5)]).unwrap(), 0.5));
    }

    #[test]
    fn weighted_with_zero_weight_on_defined_children_abstains() {
        let policy = AggregationPolicy::Weighted(vec![0.0, 1.0]);
        assert!(!policy.aggregate(&[c(0.8), Confidence::unset()]).unwrap().has_value());
    }

    #[test]
    fn weights_are_validated() {
        assert!(AggregationPolicy::Weighted(vec![0.5]).validate(2).is_err());
        assert!(AggregationPolicy::Weighted(vec![0.5, -1.0]).validate(2).is_err());
        assert!(AggregationPolicy::Weighted(vec![f64::NAN, 1.0]).validate(2).is_err());
        assert!(AggregationPolicy::Max.validate(0).is_err());
        assert!(AggregationPolicy::Weighted(vec![0.0, 2.0]).validate(2).is_ok());
        assert!(matches!(
            AggregationPolicy::Weighted(vec![1.0]).aggregate(&[c(0.1), c(0.2)]),
            Err(TraceError::InvalidArgument(_))
        ));
    }

    #[test]
    fn unsealed_child_is_rejected() {
        use crate::model::{ArchitectureItem, CodeCompilationUnit};

        let tuple = EndpointTuple::new(
            Arc::new(ArchitectureItem::component("a", "A")),
            Arc::new(CodeCompilationUnit::new("x", "X")),
        );
        let child = Arc::new(NodeResult::new("h1"));
        let err = AggregationPolicy::Max.evaluate(&tuple, &[child]).unwrap_err();
        assert!(matches!(err, TraceError::IncompleteDependency { .. }));
    }

    #[test]
    fn policy_reads_from_yaml() {
        let policy: AggregationPolicy = serde_yaml::from_str("policy: weighted\nweights: [0.7, 0.3]\n").unwrap();
        assert_eq!(policy, AggregationPolicy::Weighted(vec![0.7, 0.3]));
        let policy: AggregationPolicy = serde_yaml::from_str("policy: max\n").unwrap();
        assert_eq!(policy, AggregationPolicy::Max);
    }
}
