//! Trace links and the exporter producing them

use crate::computation::{EndpointTupleRepo, NodeResult, TraceError, TraceResult};
use crate::model::{ItemId, UnitId};
use crate::tree::Evaluation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// A recovered link between an architecture item and a compilation unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceLink {
    pub architecture_id: ItemId,
    pub architecture_name: String,
    pub code_id: UnitId,
    pub code_name: String,
    pub confidence: f64,
    /// Tree or node the confidence came from
    pub source: String,
}

/// Turns a root result into trace links above a confidence threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceLinkExporter {
    threshold: f64,
}

impl TraceLinkExporter {
    /// Fails with `InvalidArgument` for a threshold outside `[0, 1]`
    pub fn new(threshold: f64) -> TraceResult<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(TraceError::InvalidArgument(format!(
                "threshold must be between 0 and 1, got {}",
                threshold
            )));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// One link per tuple whose confidence is defined and at least the
    /// threshold, in repository order. The result must be sealed.
    pub fn export(&self, repo: &EndpointTupleRepo, result: &NodeResult, source: &str) -> TraceResult<Vec<TraceLink>> {
        result.ensure_complete()?;
        let links = repo
            .tuples()
            .iter()
            .filter_map(|tuple| {
                let confidence = result.get(tuple).as_option()?;
                (confidence >= self.threshold).then(|| TraceLink {
                    architecture_id: tuple.architecture.id.clone(),
                    architecture_name: tuple.architecture.name.clone(),
                    code_id: tuple.code.id.clone(),
                    code_name: tuple.code.name.clone(),
                    confidence,
                    source: source.to_string(),
                })
            })
            .collect();
        Ok(links)
    }

    /// Links of a finished run, sourced from the evaluated tree
    pub fn export_evaluation(&self, evaluation: &Evaluation) -> TraceResult<Vec<TraceLink>> {
        self.export(evaluation.repo(), evaluation.root_result(), evaluation.tree_name())
    }

    /// Links of a finished run together with the run's metadata
    pub fn report(&self, evaluation: &Evaluation) -> TraceResult<TraceLinkReport> {
        Ok(TraceLinkReport {
            run_id: evaluation.run_id(),
            tree: evaluation.tree_name().to_string(),
            threshold: self.threshold,
            candidates: evaluation.repo().len(),
            generated_at: Utc::now(),
            links: self.export_evaluation(evaluation)?,
        })
    }
}

/// Serialisable output of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceLinkReport {
    pub run_id: Uuid,
    pub tree: String,
    pub threshold: f64,
    /// Number of candidate tuples the run scored
    pub candidates: usize,
    pub generated_at: DateTime<Utc>,
    pub links: Vec<TraceLink>,
}

impl TraceLinkReport {
    pub fn to_json(&self) -> TraceResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> TraceResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
