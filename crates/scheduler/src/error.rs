use thiserror::Error;

use crate::task::TaskId;
use crate::tree::NodeId;

/// Rejected expression text. Every variant except `Empty` carries the byte
/// offset of the offending token.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("malformed number at {pos}")]
    MalformedNumber { pos: usize },

    #[error("expected a number or '(' at {pos}")]
    ExpectedOperand { pos: usize },

    #[error("parenthesis opened at {pos} is never closed")]
    UnclosedParen { pos: usize },

    #[error("unexpected '{token}' at {pos}")]
    UnexpectedToken { token: String, pos: usize },

    #[error("nesting too deep at {pos}")]
    TooDeep { pos: usize },
}

impl ParseError {
    pub fn position(&self) -> usize {
        match self {
            ParseError::Empty => 0,
            ParseError::UnexpectedChar { pos, .. }
            | ParseError::MalformedNumber { pos }
            | ParseError::ExpectedOperand { pos }
            | ParseError::UnclosedParen { pos }
            | ParseError::UnexpectedToken { pos, .. }
            | ParseError::TooDeep { pos } => *pos,
        }
    }
}

/// Id text that is not a plain decimal number.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid id '{0}'")]
pub struct InvalidId(pub String);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("node {0} is already resolved")]
    AlreadyResolved(NodeId),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("invalid expression: {0}")]
    InvalidExpression(#[from] ParseError),

    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    #[error("tree inconsistency: {0}")]
    Tree(#[from] TreeError),
}
