//! Scoring trace links against a gold standard

use super::trace_link::TraceLink;
use crate::computation::{TraceError, TraceResult};
use crate::model::{ArchitectureModel, CodeModel, ItemId, UnitId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

const PATH_SEPARATOR: char = '/';

/// The links a correct run would recover
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoldStandard {
    pairs: BTreeSet<(ItemId, UnitId)>,
}

#[derive(Debug, Deserialize)]
struct GoldRow {
    architecture_id: String,
    code_id: String,
}

impl GoldStandard {
    pub fn new<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (ItemId, UnitId)>,
    {
        Self {
            pairs: pairs.into_iter().collect(),
        }
    }

    /// Parse CSV with an `architecture_id,code_id` header. Duplicate rows
    /// collapse into one pair.
    ///
    /// A `code_id` may also name a directory (`shop/orders/`); see
    /// [`GoldStandard::enroll`].
    pub fn from_csv_str(csv_data: &str) -> TraceResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(csv_data.as_bytes());
        let mut pairs = BTreeSet::new();
        for row in reader.deserialize() {
            let row: GoldRow = row?;
            pairs.insert((ItemId::new(row.architecture_id), UnitId::new(row.code_id)));
        }
        Ok(Self { pairs })
    }

    pub fn from_csv_file(path: impl AsRef<Path>) -> TraceResult<Self> {
        Self::from_csv_str(&std::fs::read_to_string(path)?)
    }

    /// Resolve the entries against the models of a run.
    ///
    /// An entry naming a unit id is kept as is. Any other entry is read as a
    /// directory path (trailing `/` optional) and replaced by every unit
    /// under it. Entries matching no unit are kept and count as missed links.
    /// Every architecture id must name an item of `architecture`.
    pub fn enroll(&self, architecture: &ArchitectureModel, code: &CodeModel) -> TraceResult<Self> {
        let mut pairs = BTreeSet::new();
        for (item, entry) in &self.pairs {
            architecture.item(item)?;
            if code.unit(entry).is_ok() {
                pairs.insert((item.clone(), entry.clone()));
                continue;
            }
            let prefix: Vec<&str> = entry
                .as_str()
                .split(PATH_SEPARATOR)
                .filter(|segment| !segment.is_empty())
                .collect();
            let units: Vec<&UnitId> = if prefix.is_empty() {
                Vec::new()
            } else {
                code.endpoints()
                    .iter()
                    .filter(|unit| unit.path.len() >= prefix.len())
                    .filter(|unit| unit.path.iter().zip(&prefix).all(|(segment, wanted)| segment.as_str() == *wanted))
                    .map(|unit| &unit.id)
                    .collect()
            };
            debug!(item = %item, entry = %entry, units = units.len(), "enrolled gold entry");
            if units.is_empty() {
                pairs.insert((item.clone(), entry.clone()));
            }
            pairs.extend(units.into_iter().map(|unit| (item.clone(), unit.clone())));
        }
        Ok(Self { pairs })
    }

    pub fn contains(&self, architecture: &ItemId, code: &UnitId) -> bool {
        self.pairs.contains(&(architecture.clone(), code.clone()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Confusion matrix of a run and the scores derived from it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_negatives: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub accuracy: f64,
    pub specificity: f64,
    /// Matthews correlation of found and gold links
    pub phi_coefficient: f64,
    /// Largest phi the matrix marginals allow
    pub phi_max: f64,
    pub phi_over_phi_max: f64,
}

impl EvaluationMetrics {
    /// Derive every score from the four confusion-matrix cells.
    /// A score with an empty denominator is 0.
    pub fn from_counts(
        true_positives: usize,
        false_positives: usize,
        false_negatives: usize,
        true_negatives: usize,
    ) -> Self {
        let (tp, fp, fn_, tn) = (
            true_positives as f64,
            false_positives as f64,
            false_negatives as f64,
            true_negatives as f64,
        );
        let total = tp + fp + fn_ + tn;
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = ratio(2.0 * precision * recall, precision + recall);
        let phi_coefficient = ratio(tp * tn - fp * fn_, ((tp + fp) * (tp + fn_) * (tn + fp) * (tn + fn_)).sqrt());

        // Marginal shares of found and of gold links
        let phi_max = if total == 0.0 {
            0.0
        } else {
            let found = (tp + fp) / total;
            let gold = (tp + fn_) / total;
            let (low, high) = (found.min(gold), found.max(gold));
            ratio(low * (1.0 - high), high * (1.0 - low)).sqrt()
        };

        Self {
            true_positives,
            false_positives,
            false_negatives,
            true_negatives,
            precision,
            recall,
            f1,
            accuracy: ratio(tp + tn, total),
            specificity: ratio(tn, tn + fp),
            phi_coefficient,
            phi_max,
            phi_over_phi_max: ratio(phi_coefficient, phi_max),
        }
    }

    fn gold_size(&self) -> usize {
        self.true_positives + self.false_negatives
    }

    fn scores(&self) -> [f64; 8] {
        [
            self.precision,
            self.recall,
            self.f1,
            self.accuracy,
            self.specificity,
            self.phi_coefficient,
            self.phi_max,
            self.phi_over_phi_max,
        ]
    }

    /// Cells summed over `results`, scores averaged with the given weights
    fn averaged(results: &[Self], weight: impl Fn(&Self) -> f64) -> TraceResult<Self> {
        let mut sum = Self::summed(results)?;
        let total: f64 = results.iter().map(&weight).sum();
        let mut scores = [0.0; 8];
        for result in results {
            for (acc, score) in scores.iter_mut().zip(result.scores()) {
                *acc += weight(result) * score;
            }
        }
        let [precision, recall, f1, accuracy, specificity, phi_coefficient, phi_max, phi_over_phi_max] =
            scores.map(|score| ratio(score, total));
        sum.precision = precision;
        sum.recall = recall;
        sum.f1 = f1;
        sum.accuracy = accuracy;
        sum.specificity = specificity;
        sum.phi_coefficient = phi_coefficient;
        sum.phi_max = phi_max;
        sum.phi_over_phi_max = phi_over_phi_max;
        Ok(sum)
    }

    fn summed(results: &[Self]) -> TraceResult<Self> {
        if results.is_empty() {
            return Err(TraceError::InvalidArgument("no results to average".to_string()));
        }
        Ok(results.iter().fold(Self::from_counts(0, 0, 0, 0), |acc, r| {
            Self::from_counts(
                acc.true_positives + r.true_positives,
                acc.false_positives + r.false_positives,
                acc.false_negatives + r.false_negatives,
                acc.true_negatives + r.true_negatives,
            )
        }))
    }
}

impl std::fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "precision {:.3}  recall {:.3}  f1 {:.3}  accuracy {:.3}  specificity {:.3}  phi {:.3}  (tp {}, fp {}, fn {}, tn {})",
            self.precision,
            self.recall,
            self.f1,
            self.accuracy,
            self.specificity,
            self.phi_coefficient,
            self.true_positives,
            self.false_positives,
            self.false_negatives,
            self.true_negatives
        )
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Compare recovered links with the gold standard.
///
/// `candidates` is the size of the candidate space (architecture endpoints
/// times code endpoints); the four confusion-matrix cells sum up to it.
/// Enroll directory-level gold entries first.
pub fn evaluate(links: &[TraceLink], gold: &GoldStandard, candidates: usize) -> EvaluationMetrics {
    let found: BTreeSet<(&ItemId, &UnitId)> = links.iter().map(|l| (&l.architecture_id, &l.code_id)).collect();
    let true_positives = found.iter().filter(|(a, c)| gold.contains(a, c)).count();
    let false_positives = found.len() - true_positives;
    let false_negatives = gold.len() - true_positives;
    let true_negatives = candidates.saturating_sub(true_positives + false_positives + false_negatives);
    EvaluationMetrics::from_counts(true_positives, false_positives, false_negatives, true_negatives)
}

/// Unweighted mean of each score over several runs; cells are summed
pub fn macro_average(results: &[EvaluationMetrics]) -> TraceResult<EvaluationMetrics> {
    EvaluationMetrics::averaged(results, |_| 1.0)
}

/// Mean of each score weighted by the run's gold-standard size
pub fn weighted_average(results: &[EvaluationMetrics]) -> TraceResult<EvaluationMetrics> {
    EvaluationMetrics::averaged(results, |r| r.gold_size() as f64)
}

/// Scores recomputed from the summed confusion matrices
pub fn micro_average(results: &[EvaluationMetrics]) -> TraceResult<EvaluationMetrics> {
    EvaluationMetrics::summed(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArchitectureItem, CodeCompilationUnit};

    fn link(architecture: &str, code: &str) -> TraceLink {
        TraceLink {
            architecture_id: ItemId::from(architecture),
            architecture_name: architecture.to_uppercase(),
            code_id: UnitId::from(code),
            code_name: code.to_uppercase(),
            confidence: 1.0,
            source: "test".into(),
        }
    }

    #[test]
    fn csv_with_header() {
        let gold = GoldStandard::from_csv_str("architecture_id,code_id\nc1, u1\nc1,u2\nc1,u1\n").unwrap();
        assert_eq!(gold.len(), 2);
        assert!(gold.contains(&ItemId::from("c1"), &UnitId::from("u1")));
        assert!(!gold.contains(&ItemId::from("c2"), &UnitId::from("u1")));
    }

    #[test]
    fn csv_with_wrong_header_fails() {
        let err = GoldStandard::from_csv_str("arch,code\nc1,u1\n").unwrap_err();
        assert!(matches!(err, TraceError::Csv(_)));
    }

    #[test]
    fn confusion_matrix_covers_every_candidate() {
        let gold = GoldStandard::new([
            (ItemId::from("c1"), UnitId::from("u1")),
            (ItemId::from("c2"), UnitId::from("u3")),
        ]);
        let links = vec![link("c1", "u1"), link("c1", "u2")];
        let metrics = evaluate(&links, &gold, 6);

        assert_eq!(metrics.true_positives, 1);
        assert_eq!(metrics.false_positives, 1);
        assert_eq!(metrics.false_negatives, 1);
        assert_eq!(metrics.true_negatives, 3);
        assert_eq!(metrics.precision, 0.5);
        assert_eq!(metrics.recall, 0.5);
        assert_eq!(metrics.f1, 0.5);
        assert!((metrics.accuracy - 4.0 / 6.0).abs() < 1e-9);
        // tn / (tn + fp) = 3 / 4
        assert_eq!(metrics.specificity, 0.75);
        // (1*3 - 1*1) / sqrt(2 * 2 * 4 * 4) = 2 / 8
        assert!((metrics.phi_coefficient - 0.25).abs() < 1e-9);
        // Found and gold marginals are equal, so phi may reach 1
        assert!((metrics.phi_max - 1.0).abs() < 1e-9);
        assert!((metrics.phi_over_phi_max - 0.25).abs() < 1e-9);
    }

    #[test]
    fn precise_but_incomplete_links_reach_phi_max() {
        // tp 1, fp 0, fn 2, tn 3
        let metrics = EvaluationMetrics::from_counts(1, 0, 2, 3);
        assert_eq!(metrics.specificity, 1.0);
        // 3 / sqrt(1 * 3 * 3 * 5)
        let phi = 3.0 / 45f64.sqrt();
        assert!((metrics.phi_coefficient - phi).abs() < 1e-9);
        // sqrt((1/6 * 1/2) / (1/2 * 5/6)) = sqrt(1/5)
        assert!((metrics.phi_max - 0.2f64.sqrt()).abs() < 1e-9);
        assert!((metrics.phi_over_phi_max - 1.0).abs() < 1e-9);
    }

    #[test]
    fn inverse_links_have_negative_phi() {
        let metrics = EvaluationMetrics::from_counts(0, 2, 2, 0);
        assert_eq!(metrics.phi_coefficient, -1.0);
        assert_eq!(metrics.specificity, 0.0);
    }

    #[test]
    fn macro_weighted_and_micro_averages() {
        let first = EvaluationMetrics::from_counts(1, 1, 1, 3);
        let second = EvaluationMetrics::from_counts(3, 0, 1, 0);
        let results = [first, second];

        let macro_avg = macro_average(&results).unwrap();
        assert_eq!(macro_avg.true_positives, 4);
        assert_eq!(macro_avg.true_negatives, 3);
        assert!((macro_avg.precision - 0.75).abs() < 1e-9);
        assert!((macro_avg.recall - 0.625).abs() < 1e-9);

        // Gold sizes 2 and 4
        let weighted = weighted_average(&results).unwrap();
        assert!((weighted.precision - 5.0 / 6.0).abs() < 1e-9);
        assert!((weighted.recall - (0.5 * 2.0 + 0.75 * 4.0) / 6.0).abs() < 1e-9);

        // tp 4, fp 1, fn 2, tn 3
        let micro = micro_average(&results).unwrap();
        assert!((micro.precision - 0.8).abs() < 1e-9);
        assert!((micro.recall - 4.0 / 6.0).abs() < 1e-9);
        assert_eq!(micro, EvaluationMetrics::from_counts(4, 1, 2, 3));

        assert!(matches!(macro_average(&[]), Err(TraceError::InvalidArgument(_))));
    }

    fn enrollment_models() -> (ArchitectureModel, CodeModel) {
        let architecture = ArchitectureModel::new(vec![ArchitectureItem::component("c1", "Orders")]).unwrap();
        let code = CodeModel::new(
            vec![
                CodeCompilationUnit::new("u1", "Orders").with_path(["shop", "orders"]),
                CodeCompilationUnit::new("u2", "OrdersTest").with_path(["shop", "orders", "test"]),
                CodeCompilationUnit::new("u3", "Invoice").with_path(["shop", "ordersx"]),
            ],
            Vec::new(),
        )
        .unwrap();
        (architecture, code)
    }

    #[test]
    fn directory_entries_expand_to_units_below() {
        let (architecture, code) = enrollment_models();
        let gold = GoldStandard::from_csv_str("architecture_id,code_id\nc1,shop/orders/\n")
            .unwrap()
            .enroll(&architecture, &code)
            .unwrap();
        assert_eq!(gold.len(), 2);
        assert!(gold.contains(&ItemId::from("c1"), &UnitId::from("u1")));
        assert!(gold.contains(&ItemId::from("c1"), &UnitId::from("u2")));
        assert!(!gold.contains(&ItemId::from("c1"), &UnitId::from("u3")));

        let without_slash = GoldStandard::new([(ItemId::from("c1"), UnitId::from("shop/orders/test"))])
            .enroll(&architecture, &code)
            .unwrap();
        assert_eq!(without_slash, GoldStandard::new([(ItemId::from("c1"), UnitId::from("u2"))]));
    }

    #[test]
    fn unit_ids_and_unmatched_entries_are_kept() {
        let (architecture, code) = enrollment_models();
        let gold = GoldStandard::new([
            (ItemId::from("c1"), UnitId::from("u3")),
            (ItemId::from("c1"), UnitId::from("shop/billing/")),
        ])
        .enroll(&architecture, &code)
        .unwrap();
        assert_eq!(gold.len(), 2);
        assert!(gold.contains(&ItemId::from("c1"), &UnitId::from("u3")));
        assert!(gold.contains(&ItemId::from("c1"), &UnitId::from("shop/billing/")));
    }

    #[test]
    fn unknown_architecture_item_fails_enrollment() {
        let (architecture, code) = enrollment_models();
        let err = GoldStandard::new([(ItemId::from("c9"), UnitId::from("u1"))])
            .enroll(&architecture, &code)
            .unwrap_err();
        assert!(matches!(err, TraceError::UnresolvedReference(_)));
    }

    #[test]
    fn empty_denominators_score_zero() {
        let metrics = evaluate(&[], &GoldStandard::default(), 0);
        assert_eq!(metrics.precision, 0.0);
        assert_eq!(metrics.recall, 0.0);
        assert_eq!(metrics.f1, 0.0);
        assert_eq!(metrics.accuracy, 0.0);
    }
}
