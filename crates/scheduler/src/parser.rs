//! Recursive-descent parser from expression text to [`OperationTree`].
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := NUMBER | '(' expr ')'
//! NUMBER  := DIGIT+ ('.' DIGIT+)?
//! ```
//!
//! A sign in front of an operand that is already a number folds into that
//! number. A minus in front of anything else becomes `(-1) * operand`.
//!
//! Parentheses and prefix signs may nest at most [`MAX_NESTING`] deep.

use distcalc_core::Operator;

use crate::error::ParseError;
use crate::tree::{NodeId, OperationTree, TreeBuilder};

/// Deepest chain of open parentheses and prefix signs accepted.
pub const MAX_NESTING: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tok {
    Number(f64),
    Op(Operator),
    LParen,
    RParen,
    End,
}

impl Tok {
    fn describe(self) -> String {
        match self {
            Tok::Number(v) => v.to_string(),
            Tok::Op(op) => op.symbol().to_string(),
            Tok::LParen => "(".to_string(),
            Tok::RParen => ")".to_string(),
            Tok::End => "end of input".to_string(),
        }
    }
}

fn lex(text: &str) -> Result<Vec<(Tok, usize)>, ParseError> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;

        if c.is_ascii_digit() || c == b'.' {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i < bytes.len() && bytes[i] == b'.' {
                i += 1;
                let frac_start = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                if frac_start == i || start + 1 == frac_start {
                    return Err(ParseError::MalformedNumber { pos: start });
                }
            }
            let value = text[start..i]
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or(ParseError::MalformedNumber { pos: start })?;
            out.push((Tok::Number(value), start));
            continue;
        }

        let tok = match c {
            b'(' => Tok::LParen,
            b')' => Tok::RParen,
            _ => match Operator::from_char(c as char) {
                Some(op) => Tok::Op(op),
                None => {
                    let ch = text[i..].chars().next().unwrap_or('\u{fffd}');
                    return Err(ParseError::UnexpectedChar { ch, pos: i });
                }
            },
        };
        out.push((tok, start));
        i += 1;
    }

    out.push((Tok::End, text.len()));
    Ok(out)
}

struct Parser {
    tokens: Vec<(Tok, usize)>,
    cursor: usize,
    depth: usize,
    builder: TreeBuilder,
}

impl Parser {
    fn peek(&self) -> (Tok, usize) {
        self.tokens
            .get(self.cursor)
            .copied()
            .unwrap_or((Tok::End, usize::MAX))
    }

    fn bump(&mut self) -> (Tok, usize) {
        let tok = self.peek();
        if tok.0 != Tok::End {
            self.cursor += 1;
        }
        tok
    }

    /// Run `f` one nesting level deeper, failing at `pos` past the limit.
    fn nested<T>(
        &mut self,
        pos: usize,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::TooDeep { pos });
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    fn expr(&mut self) -> Result<NodeId, ParseError> {
        let mut lhs = self.term()?;
        while let (Tok::Op(op @ (Operator::Add | Operator::Sub)), _) = self.peek() {
            self.bump();
            let rhs = self.term()?;
            lhs = self.builder.op(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<NodeId, ParseError> {
        let mut lhs = self.unary()?;
        while let (Tok::Op(op @ (Operator::Mul | Operator::Div)), _) = self.peek() {
            self.bump();
            let rhs = self.unary()?;
            lhs = self.builder.op(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<NodeId, ParseError> {
        match self.peek().0 {
            Tok::Op(Operator::Add) => {
                let (_, pos) = self.bump();
                self.nested(pos, Self::unary)
            }
            Tok::Op(Operator::Sub) => {
                let (_, pos) = self.bump();
                let operand = self.nested(pos, Self::unary)?;
                match self.builder.leaf_value(operand) {
                    Some(v) => {
                        self.builder.set_leaf(operand, -v);
                        Ok(operand)
                    }
                    None => {
                        let minus_one = self.builder.leaf(-1.0);
                        Ok(self.builder.op(Operator::Mul, minus_one, operand))
                    }
                }
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<NodeId, ParseError> {
        match self.bump() {
            (Tok::Number(v), _) => Ok(self.builder.leaf(v)),
            (Tok::LParen, open) => {
                let inner = self.nested(open, Self::expr)?;
                match self.bump() {
                    (Tok::RParen, _) => Ok(inner),
                    (Tok::End, _) => Err(ParseError::UnclosedParen { pos: open }),
                    (tok, pos) => Err(ParseError::UnexpectedToken {
                        token: tok.describe(),
                        pos,
                    }),
                }
            }
            (_, pos) => Err(ParseError::ExpectedOperand { pos }),
        }
    }
}

/// Parse `text` into an operation tree.
pub fn parse(text: &str) -> Result<OperationTree, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let mut parser = Parser {
        tokens: lex(text)?,
        cursor: 0,
        depth: 0,
        builder: TreeBuilder::default(),
    };
    let root = parser.expr()?;
    match parser.peek() {
        (Tok::End, _) => Ok(parser.builder.finish(root)),
        (tok, pos) => Err(ParseError::UnexpectedToken {
            token: tok.describe(),
            pos,
        }),
    }
}
