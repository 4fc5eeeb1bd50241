use thiserror::Error;

/// Failures of a single binary operation on the worker side.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputeError {
    #[error("division by zero is not allowed")]
    DivisionByZero,

    #[error("invalid operator: {0}")]
    InvalidOperator(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
