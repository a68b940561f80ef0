//! Error type shared by every stage of an evaluation run

use thiserror::Error;

/// Errors raised while building or evaluating a computation tree.
///
/// Every variant is a contract violation surfaced immediately. A run either
/// produces complete, consistent node results or aborts with one of these.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("confidence has no value")]
    NoValue,

    #[error("duplicate entry for {tuple} in result of node '{node}'")]
    DuplicateEntry { node: String, tuple: String },

    #[error("result of node '{node}' is incomplete: {detail}")]
    IncompleteDependency { node: String, detail: String },

    #[error("evaluation graph contains a cycle through node '{node}'")]
    CyclicDependency { node: String },

    #[error("unresolved reference: {0}")]
    UnresolvedReference(String),

    #[error("evaluation cancelled before node '{node}'")]
    Cancelled { node: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for engine operations
pub type TraceResult<T> = Result<T, TraceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = TraceError::DuplicateEntry {
            node: "name-resemblance".into(),
            tuple: "(c1, u1)".into(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate entry for (c1, u1) in result of node 'name-resemblance'"
        );

        let err = TraceError::CyclicDependency { node: "h1".into() };
        assert!(err.to_string().contains("'h1'"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.yaml");
        let err: TraceError = io.into();
        assert!(matches!(err, TraceError::Io(_)));
    }
}
