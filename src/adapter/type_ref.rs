//! Declared return types, e.g. `Mono<Response<? extends User>>`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A generic type as written in a service declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A named type with zero or more type arguments.
    Named { name: String, args: Vec<TypeRef> },
    /// `?` or `? extends Bound`.
    Wildcard { upper: Option<Box<TypeRef>> },
}

impl TypeRef {
    /// An unparameterized type.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn parameterized(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self::Named {
            name: name.into(),
            args,
        }
    }

    /// `? extends upper`
    pub fn extends(upper: TypeRef) -> Self {
        Self::Wildcard {
            upper: Some(Box::new(upper)),
        }
    }

    /// The raw type name; `?` for wildcards.
    pub fn raw_name(&self) -> &str {
        match self {
            Self::Named { name, .. } => name,
            Self::Wildcard { .. } => "?",
        }
    }

    pub fn is_parameterized(&self) -> bool {
        matches!(self, Self::Named { args, .. } if !args.is_empty())
    }

    /// The type this stands for in covariant position: wildcards resolve to
    /// their bound, an unbounded `?` to `Object`.
    pub fn upper_bound(&self) -> TypeRef {
        match self {
            Self::Named { .. } => self.clone(),
            Self::Wildcard { upper: Some(upper) } => upper.upper_bound(),
            Self::Wildcard { upper: None } => Self::named("Object"),
        }
    }

    /// Upper bound of the type argument at `index`.
    pub fn parameter_upper_bound(&self, index: usize) -> Option<TypeRef> {
        match self {
            Self::Named { args, .. } => args.get(index).map(TypeRef::upper_bound),
            Self::Wildcard { .. } => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            Self::Wildcard { upper: Some(upper) } => write!(f, "? extends {upper}"),
            Self::Wildcard { upper: None } => f.write_str("?"),
        }
    }
}

impl FromStr for TypeRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let tokens = tokenize(s)?;
        let mut parser = Parser {
            input: s,
            tokens,
            pos: 0,
        };
        let ty = parser.named()?;
        if parser.pos != parser.tokens.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(ty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Open,
    Close,
    Comma,
    Question,
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '$' | ':')
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '<' | '>' | ',' | '?' => {
                chars.next();
                tokens.push(match c {
                    '<' => Token::Open,
                    '>' => Token::Close,
                    ',' => Token::Comma,
                    _ => Token::Question,
                });
            }
            c if is_ident_char(c) => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if !is_ident_char(c) {
                        break;
                    }
                    ident.push(c);
                    chars.next();
                }
                tokens.push(Token::Ident(ident));
            }
            other => {
                return Err(Error::configuration(format!(
                    "malformed type `{input}`: unexpected character `{other}`"
                )));
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, reason: &str) -> Error {
        Error::configuration(format!("malformed type `{}`: {reason}", self.input))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn named(&mut self) -> Result<TypeRef> {
        let name = match self.bump() {
            Some(Token::Ident(name)) if name != "extends" => name,
            _ => return Err(self.error("expected a type name")),
        };
        let mut args = Vec::new();
        if self.peek() == Some(&Token::Open) {
            self.pos += 1;
            loop {
                args.push(self.argument()?);
                match self.bump() {
                    Some(Token::Comma) => continue,
                    Some(Token::Close) => break,
                    _ => return Err(self.error("expected `,` or `>`")),
                }
            }
        }
        Ok(TypeRef::Named { name, args })
    }

    fn argument(&mut self) -> Result<TypeRef> {
        if self.peek() != Some(&Token::Question) {
            return self.named();
        }
        self.pos += 1;
        match self.peek() {
            Some(Token::Ident(kw)) if kw == "extends" => {
                self.pos += 1;
                Ok(TypeRef::extends(self.named()?))
            }
            _ => Ok(TypeRef::Wildcard { upper: None }),
        }
    }
}
