use thiserror::Error;

/// Why the verification evaluator could not produce a value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("mismatched parenthesis")]
    MismatchedParen,

    #[error("operator '{0}' is missing an operand")]
    MissingOperand(&'static str),

    #[error("operands left over without an operator")]
    TrailingOperand,

    #[error("division by zero")]
    DivisionByZero,

    #[error("'{0}' produced a non-finite value")]
    NonFinite(&'static str),
}
