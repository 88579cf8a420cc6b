//! Tiny parser for the reconstructive representation of `varform` expressions and forms.
//!
//! The representation is a nested call syntax such as
//!
//! ```text
//! Form([Integral(Sum(Argument(FiniteElement('Lagrange', Cell('triangle'), 1), 0), FloatValue(1.5)), Measure('cell', 0))])
//! ```
//!
//! This crate only turns such strings into a generic tree of [`Term`]s. Interpreting the terms
//! as expressions is left to `varform` itself.
//!
//! The grammar is
//!
//! ```text
//! term  := call | tuple | list | str | atom
//! call  := ident '(' [term (',' term)* [',']] ')'
//! tuple := '(' [term (',' term)* [',']] ')'
//! list  := '[' [term (',' term)* [',']] ']'
//! str   := '\'' <any character except '\''>* '\''
//! atom  := integer | float | ident
//! ```
//!
//! where floats are anything accepted by Rust's `f64` parser, including `inf` and `NaN`.

use core::fmt;
use core::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    error: String,
}

impl ParseError {
    fn from_string(error: String) -> Self {
        Self { error }
    }

    fn at(position: usize, message: impl Display) -> Self {
        ParseError::from_string(format!("Parse error at position {}: {}", position, message))
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for ParseError {}

/// A node of the parsed representation.
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    Call { name: String, args: Vec<Term> },
    Tuple(Vec<Term>),
    List(Vec<Term>),
    Str(String),
    Integer(u64),
    Float(f64),
    Ident(String),
}

impl Term {
    pub fn as_call(&self) -> Option<(&str, &[Term])> {
        match self {
            Term::Call { name, args } => Some((name, args)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Term::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<u64> {
        match self {
            Term::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats and integers both convert to `f64`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Term::Float(x) => Some(*x),
            Term::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// The items of a tuple or a list.
    pub fn as_sequence(&self) -> Option<&[Term]> {
        match self {
            Term::Tuple(items) | Term::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Parses a complete string as a single term.
pub fn parse(input: &str) -> Result<Term, ParseError> {
    let mut parser = Parser { input, pos: 0 };
    let term = parser.parse_term()?;
    parser.skip_whitespace();
    if parser.pos < input.len() {
        return Err(ParseError::at(parser.pos, "unexpected trailing input"));
    }
    Ok(term)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

fn is_atom_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '+' | '-')
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let rest = &self.input[self.pos..];
        let len = rest.find(|c| !predicate(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn parse_term(&mut self) -> Result<Term, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(ParseError::at(self.pos, "unexpected end of input")),
            Some('(') => {
                self.pos += 1;
                Ok(Term::Tuple(self.parse_sequence(')')?))
            }
            Some('[') => {
                self.pos += 1;
                Ok(Term::List(self.parse_sequence(']')?))
            }
            Some('\'') => self.parse_string(),
            Some(c) if is_atom_char(c) => self.parse_atom_or_call(),
            Some(c) => Err(ParseError::at(self.pos, format!("unexpected character '{}'", c))),
        }
    }

    /// Parses comma-separated terms up to and including the closing delimiter.
    fn parse_sequence(&mut self, close: char) -> Result<Vec<Term>, ParseError> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(items);
            }
            items.push(self.parse_term()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(c) if c == close => {
                    self.pos += 1;
                    return Ok(items);
                }
                Some(c) => {
                    return Err(ParseError::at(
                        self.pos,
                        format!("expected ',' or '{}', found '{}'", close, c),
                    ))
                }
                None => return Err(ParseError::at(self.pos, format!("missing closing '{}'", close))),
            }
        }
    }

    fn parse_string(&mut self) -> Result<Term, ParseError> {
        let start = self.pos;
        // Skip the opening quote
        self.pos += 1;
        let content = self.take_while(|c| c != '\'');
        if self.peek() != Some('\'') {
            return Err(ParseError::at(start, "unterminated string"));
        }
        self.pos += 1;
        Ok(Term::Str(content.to_string()))
    }

    fn parse_atom_or_call(&mut self) -> Result<Term, ParseError> {
        let start = self.pos;
        let token = self.take_while(is_atom_char);
        let after_token = self.pos;
        self.skip_whitespace();

        if is_identifier(token) && self.peek() == Some('(') {
            self.pos += 1;
            let args = self.parse_sequence(')')?;
            return Ok(Term::Call {
                name: token.to_string(),
                args,
            });
        }

        self.pos = after_token;
        if token.chars().all(|c| c.is_ascii_digit()) {
            token
                .parse::<u64>()
                .map(Term::Integer)
                .map_err(|err| ParseError::at(start, format!("failed to parse {} as integer: {}", token, err)))
        } else if let Ok(value) = token.parse::<f64>() {
            Ok(Term::Float(value))
        } else if is_identifier(token) {
            Ok(Term::Ident(token.to_string()))
        } else {
            Err(ParseError::at(start, format!("invalid token '{}'", token)))
        }
    }
}
