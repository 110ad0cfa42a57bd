//! Native values of literals and folded constant expressions.

use std::fmt;

use gscript_core::lang::keywords::{self, KeywordId};
use thiserror::Error;

use crate::ast::ConstantKind;

/// A compile-time value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    String(String),
    LocalizedString(String),
    Resource(String),
    Bool(bool),
    Undefined,
    Vector([f64; 3]),
}

/// Literal text that does not decode to a value of its kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("integer literal `{0}` is out of range")]
    IntegerOutOfRange(String),
    #[error("malformed numeric literal `{0}`")]
    MalformedNumber(String),
    #[error("unknown escape sequence `\\{0}` in string literal")]
    UnknownEscape(char),
    #[error("malformed {kind} literal `{raw}`")]
    Malformed { kind: &'static str, raw: String },
}

impl Value {
    /// Decode the raw source text of a literal.
    ///
    /// ## Parameters
    /// - `kind`: literal category assigned by the parser.
    /// - `raw`: the token text, quotes and sigils included (`"a\n"`, `&"HINT"`, `%anim`).
    pub fn decode(kind: ConstantKind, raw: &str) -> Result<Value, ValueError> {
        match kind {
            ConstantKind::Integer => decode_integer(raw).map(Value::Int),
            ConstantKind::Float => raw
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| ValueError::MalformedNumber(raw.to_string())),
            ConstantKind::String => unquote(raw, "string").map(Value::String),
            ConstantKind::LocalizedString => match raw.strip_prefix('&') {
                Some(rest) => unquote(rest, "localized string").map(Value::LocalizedString),
                None => Err(malformed("localized string", raw)),
            },
            ConstantKind::Resource => match raw.strip_prefix('%') {
                Some(name) if !name.is_empty() => Ok(Value::Resource(name.to_string())),
                _ => Err(malformed("resource", raw)),
            },
            ConstantKind::Bool => {
                if raw.eq_ignore_ascii_case(keywords::as_str(KeywordId::True)) {
                    Ok(Value::Bool(true))
                } else if raw.eq_ignore_ascii_case(keywords::as_str(KeywordId::False)) {
                    Ok(Value::Bool(false))
                } else {
                    Err(malformed("boolean", raw))
                }
            }
            ConstantKind::Undefined => Ok(Value::Undefined),
        }
    }

    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::LocalizedString(_) => "localized string",
            Value::Resource(_) => "resource",
            Value::Bool(_) => "bool",
            Value::Undefined => "undefined",
            Value::Vector(_) => "vector",
        }
    }

    /// Numeric view used for int/float promotion.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Truthiness used by `!`, `&&` and `||`.
    pub fn truthy(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(i) => Some(*i != 0),
            Value::Float(f) => Some(*f != 0.0),
            Value::Undefined => Some(false),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::LocalizedString(s) => write!(f, "&{s:?}"),
            Value::Resource(s) => write!(f, "%{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Undefined => f.write_str("undefined"),
            Value::Vector([x, y, z]) => write!(f, "({x:?}, {y:?}, {z:?})"),
        }
    }
}

fn malformed(kind: &'static str, raw: &str) -> ValueError {
    ValueError::Malformed {
        kind,
        raw: raw.to_string(),
    }
}

fn decode_integer(raw: &str) -> Result<i64, ValueError> {
    let hex = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X"));
    let parsed = match hex {
        Some(digits) => i64::from_str_radix(digits, 16),
        None => raw.parse::<i64>(),
    };
    parsed.map_err(|e| match e.kind() {
        std::num::IntErrorKind::PosOverflow | std::num::IntErrorKind::NegOverflow => {
            ValueError::IntegerOutOfRange(raw.to_string())
        }
        _ => ValueError::MalformedNumber(raw.to_string()),
    })
}

/// Strip the surrounding quotes (`"` or `'`) and resolve backslash escapes.
fn unquote(raw: &str, kind: &'static str) -> Result<String, ValueError> {
    let quote = raw.chars().next().filter(|c| *c == '"' || *c == '\'');
    let inner = match quote {
        Some(q) if raw.len() >= 2 && raw.ends_with(q) => &raw[1..raw.len() - 1],
        _ => return Err(malformed(kind, raw)),
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(c @ ('\\' | '"' | '\'')) => out.push(c),
            Some(other) => return Err(ValueError::UnknownEscape(other)),
            None => return Err(malformed(kind, raw)),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_numbers() {
        assert_eq!(Value::decode(ConstantKind::Integer, "42"), Ok(Value::Int(42)));
        assert_eq!(Value::decode(ConstantKind::Integer, "0x1F"), Ok(Value::Int(31)));
        assert_eq!(Value::decode(ConstantKind::Float, ".5"), Ok(Value::Float(0.5)));
        assert!(matches!(
            Value::decode(ConstantKind::Integer, "99999999999999999999"),
            Err(ValueError::IntegerOutOfRange(_))
        ));
    }

    #[test]
    fn decodes_strings_and_sigils() {
        assert_eq!(
            Value::decode(ConstantKind::String, r#""a\"b\n""#),
            Ok(Value::String("a\"b\n".to_string()))
        );
        assert_eq!(
            Value::decode(ConstantKind::LocalizedString, r#"&"HINT""#),
            Ok(Value::LocalizedString("HINT".to_string()))
        );
        assert_eq!(
            Value::decode(ConstantKind::Resource, "%run"),
            Ok(Value::Resource("run".to_string()))
        );
        assert_eq!(
            Value::decode(ConstantKind::String, r#""\q""#),
            Err(ValueError::UnknownEscape('q'))
        );
    }

    #[test]
    fn decodes_booleans_in_any_case() {
        assert_eq!(Value::decode(ConstantKind::Bool, "true"), Ok(Value::Bool(true)));
        assert_eq!(Value::decode(ConstantKind::Bool, "FALSE"), Ok(Value::Bool(false)));
        assert!(Value::decode(ConstantKind::Bool, "yes").is_err());
    }

    #[test]
    fn truthiness() {
        assert_eq!(Value::Int(0).truthy(), Some(false));
        assert_eq!(Value::Undefined.truthy(), Some(false));
        assert_eq!(Value::String("x".into()).truthy(), None);
    }
}
