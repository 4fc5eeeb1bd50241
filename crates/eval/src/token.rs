//! Tokenizer for the verification evaluator.
//!
//! Lexing happens in two passes. The first pass splits the text into raw
//! tokens and knows nothing about context, so every `-` and `+` comes out as
//! a binary operator. The second pass ([`disambiguate_unary`]) rewrites the
//! signs that sit in prefix position: `-` becomes [`Token::Neg`] and `+` is
//! dropped.

use crate::error::EvalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Mod,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Mod => "%",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge | BinaryOp::Eq | BinaryOp::Ne => 0,
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
            BinaryOp::Pow | BinaryOp::Mod => 3,
        }
    }

    pub fn is_right_assoc(self) -> bool {
        matches!(self, BinaryOp::Pow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sqrt,
    Sin,
    Cos,
    Tan,
    Ln,
    Arcsin,
    Arccos,
    Arctan,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sqrt" => Function::Sqrt,
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "ln" => Function::Ln,
            "arcsin" => Function::Arcsin,
            "arccos" => Function::Arccos,
            "arctan" => Function::Arctan,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Sqrt => "sqrt",
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Ln => "ln",
            Function::Arcsin => "arcsin",
            Function::Arccos => "arccos",
            Function::Arctan => "arctan",
        }
    }

    pub fn apply(self, x: f64) -> f64 {
        match self {
            Function::Sqrt => x.sqrt(),
            Function::Sin => x.sin(),
            Function::Cos => x.cos(),
            Function::Tan => x.tan(),
            Function::Ln => x.ln(),
            Function::Arcsin => x.asin(),
            Function::Arccos => x.acos(),
            Function::Arctan => x.atan(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Decimal literal, kept verbatim so it can be read exactly.
    Number(String),
    Binary(BinaryOp),
    /// Prefix negation.
    Neg,
    Func(Function),
    LParen,
    RParen,
}

impl Token {
    /// True when a following `-`/`+` has to be a sign rather than an operator.
    fn expects_operand(&self) -> bool {
        matches!(self, Token::Binary(_) | Token::Neg | Token::Func(_) | Token::LParen)
    }
}

/// Split `text` into tokens, including the unary-sign pass.
pub fn tokenize(text: &str) -> Result<Vec<Token>, EvalError> {
    Ok(disambiguate_unary(lex(text)?))
}

fn lex(text: &str) -> Result<Vec<Token>, EvalError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
            }
            tokens.push(Token::Number(text[start..i].to_string()));
            continue;
        }

        if c.is_ascii_alphabetic() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                i += 1;
            }
            let name = &text[start..i];
            let func = Function::from_name(name)
                .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;
            tokens.push(Token::Func(func));
            continue;
        }

        let next = bytes.get(i + 1).copied();
        let (token, width) = match (c, next) {
            (b'*', Some(b'*')) => (Token::Binary(BinaryOp::Pow), 2),
            (b'<', Some(b'=')) => (Token::Binary(BinaryOp::Le), 2),
            (b'>', Some(b'=')) => (Token::Binary(BinaryOp::Ge), 2),
            (b'=', Some(b'=')) => (Token::Binary(BinaryOp::Eq), 2),
            (b'!', Some(b'=')) => (Token::Binary(BinaryOp::Ne), 2),
            (b'+', _) => (Token::Binary(BinaryOp::Add), 1),
            (b'-', _) => (Token::Binary(BinaryOp::Sub), 1),
            (b'*', _) => (Token::Binary(BinaryOp::Mul), 1),
            (b'/', _) => (Token::Binary(BinaryOp::Div), 1),
            (b'^', _) => (Token::Binary(BinaryOp::Pow), 1),
            (b'%', _) => (Token::Binary(BinaryOp::Mod), 1),
            (b'<', _) => (Token::Binary(BinaryOp::Lt), 1),
            (b'>', _) => (Token::Binary(BinaryOp::Gt), 1),
            (b'(', _) => (Token::LParen, 1),
            (b')', _) => (Token::RParen, 1),
            _ => {
                let ch = text[i..].chars().next().unwrap_or('\u{fffd}');
                return Err(EvalError::UnexpectedChar { ch, pos: i });
            }
        };
        tokens.push(token);
        i += width;
    }

    Ok(tokens)
}

/// Rewrite signs in prefix position: `-` becomes [`Token::Neg`], `+` disappears.
///
/// A sign is in prefix position at the very start, or right after another
/// operator, an opening parenthesis, or a function name.
pub fn disambiguate_unary(raw: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(raw.len());
    for token in raw {
        let prefix = out.last().map_or(true, Token::expects_operand);
        match token {
            Token::Binary(BinaryOp::Sub) if prefix => out.push(Token::Neg),
            Token::Binary(BinaryOp::Add) if prefix => {}
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> Token {
        Token::Number(s.to_string())
    }

    #[test]
    fn lexes_numbers_and_operators() {
        let tokens = tokenize("10 + 2.5*(3)").unwrap();
        assert_eq!(
            tokens,
            vec![
                num("10"),
                Token::Binary(BinaryOp::Add),
                num("2.5"),
                Token::Binary(BinaryOp::Mul),
                Token::LParen,
                num("3"),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn two_char_operators() {
        let tokens = tokenize("2**3 <= 8 != 1").unwrap();
        assert_eq!(tokens[1], Token::Binary(BinaryOp::Pow));
        assert_eq!(tokens[3], Token::Binary(BinaryOp::Le));
        assert_eq!(tokens[5], Token::Binary(BinaryOp::Ne));
    }

    #[test]
    fn leading_minus_is_negation() {
        assert_eq!(tokenize("-3").unwrap(), vec![Token::Neg, num("3")]);
    }

    #[test]
    fn minus_after_operator_or_paren_is_negation() {
        let tokens = tokenize("2*-3").unwrap();
        assert_eq!(tokens[2], Token::Neg);
        let tokens = tokenize("(-1+2)").unwrap();
        assert_eq!(tokens[1], Token::Neg);
        assert_eq!(tokens[3], Token::Binary(BinaryOp::Add));
    }

    #[test]
    fn minus_after_operand_stays_binary() {
        let tokens = tokenize("5-2").unwrap();
        assert_eq!(tokens[1], Token::Binary(BinaryOp::Sub));
        let tokens = tokenize("(5)-2").unwrap();
        assert_eq!(tokens[3], Token::Binary(BinaryOp::Sub));
    }

    #[test]
    fn unary_plus_is_dropped() {
        assert_eq!(tokenize("+4.5").unwrap(), vec![num("4.5")]);
        assert_eq!(tokenize("1*+2").unwrap(), vec![num("1"), Token::Binary(BinaryOp::Mul), num("2")]);
    }

    #[test]
    fn functions_and_unknown_names() {
        assert_eq!(tokenize("sqrt(4)").unwrap()[0], Token::Func(Function::Sqrt));
        assert_eq!(tokenize("sin -1").unwrap()[1], Token::Neg);
        assert_eq!(tokenize("abc"), Err(EvalError::UnknownFunction("abc".to_string())));
    }

    #[test]
    fn rejects_stray_characters() {
        assert_eq!(tokenize("1 & 2"), Err(EvalError::UnexpectedChar { ch: '&', pos: 2 }));
        assert!(tokenize("3.").is_err());
        assert!(tokenize(".5").is_err());
        assert!(tokenize("1 = 2").is_err());
    }
}
