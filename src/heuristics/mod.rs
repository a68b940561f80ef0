//! Heuristics: leaf computation nodes that score endpoint tuples
//!
//! A heuristic computes one [`Confidence`] per endpoint tuple.
//!
//! - **Standalone** heuristics look only at the two endpoints' attributes
//!   (names, paths, declared types).
//! - **Dependent** heuristics additionally read the sealed results of one or
//!   more declared dependency nodes. Tuples the first dependency (the base)
//!   already defines are carried over by the executor and never re-evaluated;
//!   the heuristic only fills what the base left unset.
//!
//! # Built-in heuristics
//!
//! - [`NameResemblance`]: item name words contained in a unit or type name
//! - [`PathResemblance`]: item name words found in the unit's directory path
//! - [`SiblingResemblance`]: propagates links to same-package units that only
//!   differ by a common suffix (`OrderServiceTest`, `OrderServiceFactory`)
//! - [`InheritLinks`]: propagates links to units extending a linked unit's types

mod context;
mod inherit_links;
mod name_resemblance;
pub mod names;
mod path_resemblance;
mod sibling_resemblance;

pub use context::EvaluationContext;
pub use inherit_links::InheritLinks;
pub use name_resemblance::{NameResemblance, NameScope};
pub use names::{NamePreprocessor, PreprocessingMethod};
pub use path_resemblance::PathResemblance;
pub use sibling_resemblance::{SiblingResemblance, DEFAULT_COMMON_WORDS};

use crate::computation::{Confidence, EndpointTuple, TraceResult};

/// Whether a heuristic reads other nodes' results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeuristicKind {
    Standalone,
    Dependent,
}

/// The contract heuristics implement.
///
/// `evaluate` is called once per tuple and must be free of side effects;
/// the executor may call it from several threads at once. A heuristic that
/// cannot decide returns [`Confidence::unset`], never an error. Errors are
/// reserved for contract violations such as unresolved references.
pub trait Heuristic: Send + Sync {
    /// Stable label used in logs, errors and provenance
    fn id(&self) -> &str;

    fn kind(&self) -> HeuristicKind {
        HeuristicKind::Standalone
    }

    fn evaluate(&self, tuple: &EndpointTuple, context: &EvaluationContext<'_>) -> TraceResult<Confidence>;
}

/// Interfaces that declare method signatures are matched only by
/// interface-specific heuristics.
fn has_signatures(tuple: &EndpointTuple) -> bool {
    tuple.architecture.is_interface() && !tuple.architecture.method_signatures().is_empty()
}
