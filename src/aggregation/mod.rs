//! Aggregation: internal computation nodes combining their children
//!
//! An aggregation node has an ordered list of children. For every endpoint
//! tuple it collects each child's confidence and folds them with an
//! [`AggregationPolicy`]. Children may be heuristics or other aggregations.

mod policy;

pub use policy::AggregationPolicy;
