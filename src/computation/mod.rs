//! Computation primitives: confidences, candidate tuples and node results

mod confidence;
mod error;
mod result;
mod store;
mod tuple;

pub use confidence::Confidence;
pub use error::{TraceError, TraceResult};
pub use result::NodeResult;
pub use store::{NodeId, ResultStore};
pub use tuple::{EndpointTuple, EndpointTupleRepo};
