//! Export: trace links from a root result, and their evaluation
//!
//! - [`TraceLinkExporter`] turns the root result of a run into trace links
//!   above a threshold, in candidate order
//! - [`TraceLinkReport`] wraps the links with run metadata for JSON output
//! - [`GoldStandard`] and [`evaluate`] score links against known-correct ones;
//!   [`macro_average`], [`weighted_average`] and [`micro_average`] combine runs

mod metrics;
mod trace_link;

pub use metrics::{evaluate, macro_average, micro_average, weighted_average, EvaluationMetrics, GoldStandard};
pub use trace_link::{TraceLink, TraceLinkExporter, TraceLinkReport};
