//! Independent arithmetic evaluator used to cross-check finished expressions.
//!
//! Works on exact rationals, so `0.1 + 0.2` is exactly `3/10`. Functions,
//! `^` and `%` go through `f64` and come back as the exact rational of the
//! float they produced.

pub mod error;
pub mod number;
pub mod postfix;
pub mod token;

use dashu::rational::RBig;

pub use error::EvalError;
pub use number::{from_f64, to_f64};

/// Evaluate `text` to an exact rational.
pub fn evaluate(text: &str) -> Result<RBig, EvalError> {
    let tokens = token::tokenize(text)?;
    if tokens.is_empty() {
        return Err(EvalError::Empty);
    }
    let program = postfix::to_postfix(tokens)?;
    postfix::eval_postfix(&program)
}

/// Evaluate and round to the nearest `f64`.
pub fn evaluate_f64(text: &str) -> Result<f64, EvalError> {
    evaluate(text).map(|v| to_f64(&v))
}
