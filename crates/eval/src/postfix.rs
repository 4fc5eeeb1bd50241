//! Shunting-yard conversion and postfix evaluation.

use std::cmp::Ordering;

use dashu::rational::RBig;

use crate::error::EvalError;
use crate::number::{finite, parse_decimal, to_f64};
use crate::token::{BinaryOp, Token};

const NEG_PRECEDENCE: u8 = 4;
const FUNC_PRECEDENCE: u8 = 5;

fn stack_precedence(token: &Token) -> Option<u8> {
    match token {
        Token::Binary(op) => Some(op.precedence()),
        Token::Neg => Some(NEG_PRECEDENCE),
        Token::Func(_) => Some(FUNC_PRECEDENCE),
        _ => None,
    }
}

/// Reorder infix tokens into postfix.
///
/// Prefix operators (negation, functions) are pushed without popping
/// anything. A binary operator first pops every stacked operator that binds
/// tighter, or equally tight when it is left-associative.
pub fn to_postfix(tokens: Vec<Token>) -> Result<Vec<Token>, EvalError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();

    for token in tokens {
        match token {
            Token::Number(_) => output.push(token),
            Token::Neg | Token::Func(_) | Token::LParen => stack.push(token),
            Token::Binary(op) => {
                let prec = op.precedence();
                while let Some(top_prec) = stack.last().and_then(stack_precedence) {
                    let pops = top_prec > prec || (top_prec == prec && !op.is_right_assoc());
                    if !pops {
                        break;
                    }
                    output.extend(stack.pop());
                }
                stack.push(token);
            }
            Token::RParen => {
                loop {
                    match stack.pop() {
                        Some(Token::LParen) => break,
                        Some(t) => output.push(t),
                        None => return Err(EvalError::MismatchedParen),
                    }
                }
                if matches!(stack.last(), Some(Token::Func(_))) {
                    output.extend(stack.pop());
                }
            }
        }
    }

    while let Some(token) = stack.pop() {
        if token == Token::LParen {
            return Err(EvalError::MismatchedParen);
        }
        output.push(token);
    }
    Ok(output)
}

fn flag(cond: bool) -> RBig {
    if cond {
        RBig::ONE
    } else {
        RBig::ZERO
    }
}

fn apply_binary(op: BinaryOp, lhs: RBig, rhs: RBig) -> Result<RBig, EvalError> {
    let ord = lhs.cmp(&rhs);
    Ok(match op {
        BinaryOp::Add => lhs + rhs,
        BinaryOp::Sub => lhs - rhs,
        BinaryOp::Mul => lhs * rhs,
        BinaryOp::Div => {
            if rhs.is_zero() {
                return Err(EvalError::DivisionByZero);
            }
            lhs / rhs
        }
        BinaryOp::Pow => finite(to_f64(&lhs).powf(to_f64(&rhs)), op.symbol())?,
        BinaryOp::Mod => finite(to_f64(&lhs) % to_f64(&rhs), op.symbol())?,
        BinaryOp::Lt => flag(ord == Ordering::Less),
        BinaryOp::Le => flag(ord != Ordering::Greater),
        BinaryOp::Gt => flag(ord == Ordering::Greater),
        BinaryOp::Ge => flag(ord != Ordering::Less),
        BinaryOp::Eq => flag(ord == Ordering::Equal),
        BinaryOp::Ne => flag(ord != Ordering::Equal),
    })
}

/// Run a postfix program and return its single value.
pub fn eval_postfix(program: &[Token]) -> Result<RBig, EvalError> {
    let mut stack: Vec<RBig> = Vec::new();

    for token in program {
        match token {
            Token::Number(literal) => stack.push(parse_decimal(literal)?),
            Token::Binary(op) => {
                let missing = || EvalError::MissingOperand(op.symbol());
                let rhs = stack.pop().ok_or_else(missing)?;
                let lhs = stack.pop().ok_or_else(missing)?;
                stack.push(apply_binary(*op, lhs, rhs)?);
            }
            Token::Neg => {
                let operand = stack.pop().ok_or(EvalError::MissingOperand("-"))?;
                stack.push(-operand);
            }
            Token::Func(func) => {
                let operand = stack.pop().ok_or(EvalError::MissingOperand(func.name()))?;
                stack.push(finite(func.apply(to_f64(&operand)), func.name())?);
            }
            Token::LParen | Token::RParen => return Err(EvalError::MismatchedParen),
        }
    }

    match stack.len() {
        0 => Err(EvalError::Empty),
        1 => stack.pop().ok_or(EvalError::Empty),
        _ => Err(EvalError::TrailingOperand),
    }
}
