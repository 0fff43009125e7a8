use thiserror::Error;

use crate::types::PrimitiveType;

/// Canonical result for the engine.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure is terminal for the operation in progress; nothing here is
/// retried internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("no column named '{0}'")]
    UnknownColumn(String),

    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("cast error: {0}")]
    CastError(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("cannot coerce {0} to boolean")]
    InvalidBooleanCoercion(PrimitiveType),

    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),

    #[error("unsupported plan: {0}")]
    UnsupportedPlan(String),

    #[error("unsupported aggregate function: {0}")]
    UnsupportedAggregate(String),

    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("schema error: {0}")]
    Schema(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("internal invariant failed: {0}")]
    Invariant(String),
}

impl Error {
    pub fn type_mismatch(expected: impl std::fmt::Display, actual: impl std::fmt::Display) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e.to_string())
    }
}
