//! Schema shapes and the type-expression syntax used to declare them.
//!
//! Type expressions follow the runtime type registry convention:
//! `u32`, `Text`, `AccountId`, `Option<Balance>`, `Vec<u8>`,
//! `(MemberId, VoteKind)`, `Null`. Any other identifier is a reference to
//! a registered schema and is resolved at decode time.

use std::fmt;
use thiserror::Error;

/// Shape of a registered schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Zero-sized unit (payload of unit variants).
    Null,
    U8,
    U16,
    U32,
    U64,
    U128,
    /// Compact length-prefixed UTF-8.
    Text,
    /// 32 raw bytes.
    AccountId,
    Option(Box<Shape>),
    Vec(Box<Shape>),
    Tuple(Vec<Shape>),
    /// Named fields, encoded in declaration order.
    Struct(Vec<(String, Shape)>),
    /// Named arms; the wire index is the arm's position.
    Enum(Vec<(String, Shape)>),
    /// Reference to another registered schema by name.
    Named(String),
}

/// Malformed type expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid type expression `{expr}`: {reason}")]
pub struct ShapeParseError {
    pub expr: String,
    pub reason: String,
}

impl Shape {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn option(inner: Shape) -> Self {
        Self::Option(Box::new(inner))
    }

    pub fn vec(inner: Shape) -> Self {
        Self::Vec(Box::new(inner))
    }

    pub fn structure<N: Into<String>>(fields: impl IntoIterator<Item = (N, Shape)>) -> Self {
        Self::Struct(
            fields
                .into_iter()
                .map(|(name, shape)| (name.into(), shape))
                .collect(),
        )
    }

    pub fn enumeration<N: Into<String>>(arms: impl IntoIterator<Item = (N, Shape)>) -> Self {
        Self::Enum(
            arms.into_iter()
                .map(|(name, shape)| (name.into(), shape))
                .collect(),
        )
    }

    /// Enum whose arms carry no payload.
    pub fn unit_enum<N: Into<String>>(arms: impl IntoIterator<Item = N>) -> Self {
        Self::enumeration(arms.into_iter().map(|name| (name, Shape::Null)))
    }

    /// Parse a type expression such as `Option<Vec<u8>>`.
    pub fn parse(expr: &str) -> Result<Self, ShapeParseError> {
        let mut parser = Parser {
            expr,
            chars: expr.char_indices().peekable(),
        };
        let shape = parser.parse_shape()?;
        parser.skip_whitespace();
        if let Some((pos, c)) = parser.chars.next() {
            return Err(parser.error(format!("unexpected `{}` at position {}", c, pos)));
        }
        Ok(shape)
    }

    /// Smallest possible encoding in bytes. Named references count as zero.
    pub fn min_encoded_len(&self) -> usize {
        match self {
            Self::Null | Self::Named(_) => 0,
            Self::U8 | Self::Option(_) | Self::Vec(_) | Self::Text | Self::Enum(_) => 1,
            Self::U16 => 2,
            Self::U32 => 4,
            Self::U64 => 8,
            Self::U128 => 16,
            Self::AccountId => 32,
            Self::Tuple(items) => items.iter().map(Shape::min_encoded_len).sum(),
            Self::Struct(fields) => fields.iter().map(|(_, s)| s.min_encoded_len()).sum(),
        }
    }

    /// Names this shape refers to, in order of appearance.
    pub fn references(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_references(&mut names);
        names
    }

    fn collect_references<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Named(name) => names.push(name),
            Self::Option(inner) | Self::Vec(inner) => inner.collect_references(names),
            Self::Tuple(items) => items.iter().for_each(|s| s.collect_references(names)),
            Self::Struct(fields) | Self::Enum(fields) => {
                fields.iter().for_each(|(_, s)| s.collect_references(names))
            }
            _ => {}
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::U128 => write!(f, "u128"),
            Self::Text => write!(f, "Text"),
            Self::AccountId => write!(f, "AccountId"),
            Self::Option(inner) => write!(f, "Option<{}>", inner),
            Self::Vec(inner) => write!(f, "Vec<{}>", inner),
            Self::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Self::Struct(fields) => {
                write!(f, "{{ ")?;
                for (i, (name, shape)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, shape)?;
                }
                write!(f, " }}")
            }
            Self::Enum(arms) => {
                write!(f, "enum {{ ")?;
                for (i, (name, shape)) in arms.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match shape {
                        Self::Null => write!(f, "{}", name)?,
                        other => write!(f, "{}({})", name, other)?,
                    }
                }
                write!(f, " }}")
            }
            Self::Named(name) => write!(f, "{}", name),
        }
    }
}

struct Parser<'a> {
    expr: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl Parser<'_> {
    fn error(&self, reason: impl Into<String>) -> ShapeParseError {
        ShapeParseError {
            expr: self.expr.to_string(),
            reason: reason.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ShapeParseError> {
        self.skip_whitespace();
        match self.chars.next() {
            Some((_, c)) if c == expected => Ok(()),
            Some((pos, c)) => Err(self.error(format!(
                "expected `{}` at position {}, found `{}`",
                expected, pos, c
            ))),
            None => Err(self.error(format!("expected `{}`, found end of input", expected))),
        }
    }

    fn parse_shape(&mut self) -> Result<Shape, ShapeParseError> {
        self.skip_whitespace();
        match self.chars.peek().copied() {
            Some((_, '(')) => self.parse_tuple(),
            Some(_) => {
                let ident = self.parse_ident()?;
                self.skip_whitespace();
                if matches!(self.chars.peek(), Some((_, '<'))) {
                    self.chars.next();
                    let inner = self.parse_shape()?;
                    self.expect('>')?;
                    match ident.as_str() {
                        "Option" => Ok(Shape::option(inner)),
                        "Vec" => Ok(Shape::vec(inner)),
                        other => Err(self.error(format!("unknown generic `{}`", other))),
                    }
                } else {
                    Ok(primitive(&ident).unwrap_or(Shape::Named(ident)))
                }
            }
            None => Err(self.error("empty type expression")),
        }
    }

    fn parse_tuple(&mut self) -> Result<Shape, ShapeParseError> {
        self.expect('(')?;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if matches!(self.chars.peek(), Some((_, ')'))) {
                self.chars.next();
                break;
            }
            items.push(self.parse_shape()?);
            self.skip_whitespace();
            match self.chars.next() {
                Some((_, ',')) => continue,
                Some((_, ')')) => break,
                Some((pos, c)) => {
                    return Err(self.error(format!(
                        "expected `,` or `)` at position {}, found `{}`",
                        pos, c
                    )))
                }
                None => return Err(self.error("unterminated tuple")),
            }
        }
        if items.is_empty() {
            Ok(Shape::Null)
        } else {
            Ok(Shape::Tuple(items))
        }
    }

    fn parse_ident(&mut self) -> Result<String, ShapeParseError> {
        let mut ident = String::new();
        while let Some((_, c)) = self.chars.peek().copied() {
            if c.is_alphanumeric() || c == '_' || c == ':' {
                ident.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if ident.is_empty() {
            return match self.chars.peek().copied() {
                Some((pos, c)) => {
                    Err(self.error(format!("unexpected `{}` at position {}", c, pos)))
                }
                None => Err(self.error("expected a type name")),
            };
        }
        Ok(ident)
    }
}

fn primitive(ident: &str) -> Option<Shape> {
    let shape = match ident {
        "Null" => Shape::Null,
        "u8" => Shape::U8,
        "u16" => Shape::U16,
        "u32" => Shape::U32,
        "u64" => Shape::U64,
        "u128" => Shape::U128,
        "Text" | "String" => Shape::Text,
        "AccountId" | "GenericAccountId" => Shape::AccountId,
        _ => return None,
    };
    Some(shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_primitives() {
        assert_eq!(Shape::parse("u32").unwrap(), Shape::U32);
        assert_eq!(Shape::parse(" Text ").unwrap(), Shape::Text);
        assert_eq!(Shape::parse("GenericAccountId").unwrap(), Shape::AccountId);
        assert_eq!(Shape::parse("()").unwrap(), Shape::Null);
    }

    #[test]
    fn test_parse_generics() {
        assert_eq!(
            Shape::parse("Option<Balance>").unwrap(),
            Shape::option(Shape::named("Balance"))
        );
        assert_eq!(
            Shape::parse("Option<Vec<u8>>").unwrap(),
            Shape::option(Shape::vec(Shape::U8))
        );
    }

    #[test]
    fn test_parse_tuple() {
        assert_eq!(
            Shape::parse("Vec<(MemberId, VoteKind)>").unwrap(),
            Shape::vec(Shape::Tuple(vec![
                Shape::named("MemberId"),
                Shape::named("VoteKind")
            ]))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(Shape::parse("").is_err());
        assert!(Shape::parse("Option<u32").is_err());
        assert!(Shape::parse("Box<u32>").is_err());
        assert!(Shape::parse("u32 u64").is_err());
        assert!(Shape::parse("(u32,").is_err());
    }

    #[test]
    fn test_display_roundtrips_expressions() {
        for expr in ["Option<Balance>", "Vec<(MemberId, VoteKind)>", "u128", "Text"] {
            let shape = Shape::parse(expr).unwrap();
            assert_eq!(shape.to_string(), expr);
        }
    }

    #[test]
    fn test_display_composites() {
        let shape = Shape::enumeration([
            ("Active", Shape::option(Shape::named("ActiveStake"))),
            ("Finalized", Shape::named("FinalizationData")),
        ]);
        assert_eq!(
            shape.to_string(),
            "enum { Active(Option<ActiveStake>), Finalized(FinalizationData) }"
        );

        let shape = Shape::structure([("a", Shape::U32), ("b", Shape::Text)]);
        assert_eq!(shape.to_string(), "{ a: u32, b: Text }");
    }

    #[test]
    fn test_references() {
        let shape = Shape::structure([
            ("parameters", Shape::named("ProposalParameters")),
            ("votes", Shape::vec(Shape::named("VoteKind"))),
            ("count", Shape::U32),
        ]);
        assert_eq!(shape.references(), vec!["ProposalParameters", "VoteKind"]);
    }

    #[test]
    fn test_min_encoded_len() {
        assert_eq!(Shape::parse("(u32, u64)").unwrap().min_encoded_len(), 12);
        assert_eq!(Shape::parse("Option<u64>").unwrap().min_encoded_len(), 1);
        assert_eq!(Shape::named("Anything").min_encoded_len(), 0);
    }
}
