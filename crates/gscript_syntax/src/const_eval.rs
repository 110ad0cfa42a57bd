//! Constant folding over expression subtrees.
//!
//! The parser folds `const` initializers and `case` labels through [`evaluate`]; a semantic analyzer can reuse it
//! with its own [`ConstantLookup`].

use std::collections::HashMap;

use gscript_core::lang::operators::OperatorId;
use thiserror::Error;

use crate::ast::{Expr, ReferenceKind};
use crate::value::{Value, ValueError};

/// Why an expression did not fold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("`{0}` is not a constant expression")]
    NotConstant(String),
    #[error("unknown constant `{0}`")]
    UnknownConstant(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("operator `{op}` cannot combine {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
    #[error("operator `{op}` cannot be applied to {operand}")]
    InvalidOperand { op: &'static str, operand: &'static str },
    #[error(transparent)]
    InvalidLiteral(#[from] ValueError),
    #[error("integer overflow in constant expression")]
    Overflow,
}

/// Resolves named constants referenced from an expression.
pub trait ConstantLookup {
    fn lookup(&self, name: &str) -> Option<&Value>;
}

/// A lookup that knows no names.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoConstants;

impl ConstantLookup for NoConstants {
    fn lookup(&self, _name: &str) -> Option<&Value> {
        None
    }
}

/// Keys are expected lowercase; names are case-insensitive.
impl ConstantLookup for HashMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(&name.to_ascii_lowercase())
    }
}

/// Fold `expr` to a value.
///
/// ## Notes
/// - Integer arithmetic is checked; division truncates toward zero.
/// - Mixing an integer with a float promotes to float.
/// - `&&` and `||` short-circuit on truthiness and yield a boolean.
/// - Variables resolve through `constants`; everything else that is not a literal, group, truple or operator fails
///   with [`EvalError::NotConstant`].
pub fn evaluate(expr: &Expr, constants: &dyn ConstantLookup) -> Result<Value, EvalError> {
    match expr {
        Expr::Constant(c) => c.value().cloned().map_err(|e| EvalError::InvalidLiteral(e.clone())),
        Expr::Reference(r) => match &r.kind {
            ReferenceKind::Variable(name) => constants
                .lookup(&name.name)
                .cloned()
                .ok_or_else(|| EvalError::UnknownConstant(name.name.clone())),
            _ => Err(EvalError::NotConstant(expr.to_string())),
        },
        Expr::Group(g) => evaluate(&g.inner, constants),
        Expr::Truple(t) => {
            let mut out = [0.0; 3];
            for (slot, item) in out.iter_mut().zip(t.items.iter()) {
                let value = evaluate(item, constants)?;
                *slot = value.as_f64().ok_or(EvalError::InvalidOperand {
                    op: "( , , )",
                    operand: value.type_name(),
                })?;
            }
            Ok(Value::Vector(out))
        }
        Expr::Unary(u) => unary(u.op, evaluate(&u.operand, constants)?),
        Expr::Binary(b) => match b.op {
            OperatorId::AndAnd | OperatorId::OrOr => {
                let left = evaluate(&b.left, constants)?;
                let l = truthy(b.op, &left)?;
                let decided = if b.op == OperatorId::AndAnd { !l } else { l };
                if decided {
                    return Ok(Value::Bool(l));
                }
                let right = evaluate(&b.right, constants)?;
                Ok(Value::Bool(truthy(b.op, &right)?))
            }
            op => binary(op, evaluate(&b.left, constants)?, evaluate(&b.right, constants)?),
        },
        _ => Err(EvalError::NotConstant(expr.to_string())),
    }
}

fn spelling(op: OperatorId) -> &'static str {
    gscript_core::lang::operators::as_str(op)
}

fn truthy(op: OperatorId, value: &Value) -> Result<bool, EvalError> {
    value.truthy().ok_or(EvalError::InvalidOperand {
        op: spelling(op),
        operand: value.type_name(),
    })
}

fn unary(op: OperatorId, value: Value) -> Result<Value, EvalError> {
    let invalid = |value: &Value| EvalError::InvalidOperand {
        op: spelling(op),
        operand: value.type_name(),
    };
    match (op, &value) {
        (OperatorId::Not, v) => Ok(Value::Bool(!truthy(op, v)?)),
        (OperatorId::Negate, Value::Int(i)) => i.checked_neg().map(Value::Int).ok_or(EvalError::Overflow),
        (OperatorId::Negate, Value::Float(f)) => Ok(Value::Float(-f)),
        (OperatorId::Negate, Value::Vector([x, y, z])) => Ok(Value::Vector([-x, -y, -z])),
        (OperatorId::BitNot, Value::Int(i)) => Ok(Value::Int(!i)),
        _ => Err(invalid(&value)),
    }
}

fn binary(op: OperatorId, left: Value, right: Value) -> Result<Value, EvalError> {
    use OperatorId::*;

    let mismatch = |left: &Value, right: &Value| EvalError::TypeMismatch {
        op: spelling(op),
        left: left.type_name(),
        right: right.type_name(),
    };

    match (&left, &right) {
        (Value::Int(l), Value::Int(r)) => int_binary(op, *l, *r).unwrap_or_else(|| Err(mismatch(&left, &right))),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            let (l, r) = (left.as_f64().unwrap_or_default(), right.as_f64().unwrap_or_default());
            float_binary(op, l, r).unwrap_or_else(|| Err(mismatch(&left, &right)))
        }
        (Value::String(l), Value::String(r)) => match op {
            Plus => Ok(Value::String(format!("{l}{r}"))),
            EqEq => Ok(Value::Bool(l == r)),
            NotEq => Ok(Value::Bool(l != r)),
            _ => Err(mismatch(&left, &right)),
        },
        (Value::String(l), Value::Int(_) | Value::Float(_)) if op == Plus => {
            Ok(Value::String(format!("{l}{}", number_text(&right))))
        }
        (Value::Int(_) | Value::Float(_), Value::String(r)) if op == Plus => {
            Ok(Value::String(format!("{}{r}", number_text(&left))))
        }
        (Value::Vector(l), Value::Vector(r)) => match op {
            Plus => Ok(Value::Vector([l[0] + r[0], l[1] + r[1], l[2] + r[2]])),
            Minus => Ok(Value::Vector([l[0] - r[0], l[1] - r[1], l[2] - r[2]])),
            EqEq => Ok(Value::Bool(l == r)),
            NotEq => Ok(Value::Bool(l != r)),
            _ => Err(mismatch(&left, &right)),
        },
        (Value::Vector(v), Value::Int(_) | Value::Float(_)) | (Value::Int(_) | Value::Float(_), Value::Vector(v))
            if op == Star =>
        {
            let k = match (&left, &right) {
                (Value::Vector(_), scalar) | (scalar, _) => scalar.as_f64().unwrap_or_default(),
            };
            Ok(Value::Vector([v[0] * k, v[1] * k, v[2] * k]))
        }
        (Value::Bool(l), Value::Bool(r)) => match op {
            EqEq => Ok(Value::Bool(l == r)),
            NotEq => Ok(Value::Bool(l != r)),
            _ => Err(mismatch(&left, &right)),
        },
        (Value::Undefined, _) | (_, Value::Undefined) if matches!(op, EqEq | NotEq) => {
            let equal = left == right;
            Ok(Value::Bool(if op == EqEq { equal } else { !equal }))
        }
        _ => Err(mismatch(&left, &right)),
    }
}

/// `None` when the operator does not apply to integers.
fn int_binary(op: OperatorId, l: i64, r: i64) -> Option<Result<Value, EvalError>> {
    use OperatorId::*;

    let checked = |v: Option<i64>| Some(v.map(Value::Int).ok_or(EvalError::Overflow));
    match op {
        Plus => checked(l.checked_add(r)),
        Minus => checked(l.checked_sub(r)),
        Star => checked(l.checked_mul(r)),
        Slash | Percent if r == 0 => Some(Err(EvalError::DivisionByZero)),
        Slash => checked(l.checked_div(r)),
        Percent => checked(l.checked_rem(r)),
        Shl | Shr => {
            let shift = u32::try_from(r).ok().filter(|s| *s < 64);
            match shift {
                Some(s) if op == Shl => checked(l.checked_shl(s)),
                Some(s) => checked(l.checked_shr(s)),
                None => Some(Err(EvalError::Overflow)),
            }
        }
        BitAnd => Some(Ok(Value::Int(l & r))),
        BitOr => Some(Ok(Value::Int(l | r))),
        BitXor => Some(Ok(Value::Int(l ^ r))),
        _ => compare(op, l.cmp(&r)).map(Ok),
    }
}

fn float_binary(op: OperatorId, l: f64, r: f64) -> Option<Result<Value, EvalError>> {
    use OperatorId::*;

    match op {
        Plus => Some(Ok(Value::Float(l + r))),
        Minus => Some(Ok(Value::Float(l - r))),
        Star => Some(Ok(Value::Float(l * r))),
        Slash | Percent if r == 0.0 => Some(Err(EvalError::DivisionByZero)),
        Slash => Some(Ok(Value::Float(l / r))),
        Percent => Some(Ok(Value::Float(l % r))),
        _ => l.partial_cmp(&r).and_then(|ordering| compare(op, ordering)).map(Ok),
    }
}

fn compare(op: OperatorId, ordering: std::cmp::Ordering) -> Option<Value> {
    use std::cmp::Ordering::*;
    use OperatorId::*;

    let result = match op {
        Lt => ordering == Less,
        LtEq => ordering != Greater,
        Gt => ordering == Greater,
        GtEq => ordering != Less,
        EqEq => ordering == Equal,
        NotEq => ordering != Equal,
        _ => return None,
    };
    Some(Value::Bool(result))
}

fn number_text(value: &Value) -> String {
    match value {
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Dialect, lex};
    use crate::parser::{ParseTarget, ParserConfig, parse};

    fn expr(source: &str) -> Expr {
        let tokens = lex(source, &Dialect::default()).unwrap();
        let output = parse(tokens, ParserConfig::new().with_target(ParseTarget::Expression));
        assert!(output.errors.is_empty(), "{:?}", output.errors);
        output.syntax.and_then(|s| s.as_expression().cloned()).unwrap()
    }

    fn eval(source: &str) -> Result<Value, EvalError> {
        evaluate(&expr(source), &NoConstants)
    }

    #[test]
    fn arithmetic_and_precedence() {
        assert_eq!(eval("2 + 3 * 4"), Ok(Value::Int(14)));
        assert_eq!(eval("(2 + 3) * 4"), Ok(Value::Int(20)));
        assert_eq!(eval("-7 / 2"), Ok(Value::Int(-3)));
        assert_eq!(eval("7 % 3"), Ok(Value::Int(1)));
        assert_eq!(eval("1 + 0.5"), Ok(Value::Float(1.5)));
        assert_eq!(eval("1 << 4 | 1"), Ok(Value::Int(17)));
        assert_eq!(eval("~0"), Ok(Value::Int(-1)));
    }

    #[test]
    fn logic_and_comparison() {
        assert_eq!(eval("1 < 2 && 3 >= 3"), Ok(Value::Bool(true)));
        assert_eq!(eval("!true || false"), Ok(Value::Bool(false)));
        assert_eq!(eval("\"a\" == \"a\""), Ok(Value::Bool(true)));
        assert_eq!(eval("undefined == undefined"), Ok(Value::Bool(true)));
        // The right side is never evaluated.
        assert_eq!(eval("false && \"x\""), Ok(Value::Bool(false)));
    }

    #[test]
    fn strings_and_vectors() {
        assert_eq!(eval("\"hp\" + 10"), Ok(Value::String("hp10".into())));
        assert_eq!(eval("(1, 2, 3) + (1, 1, 1)"), Ok(Value::Vector([2.0, 3.0, 4.0])));
        assert_eq!(eval("(1, 2, 3) * 2"), Ok(Value::Vector([2.0, 4.0, 6.0])));
    }

    #[test]
    fn failures() {
        assert_eq!(eval("1 / 0"), Err(EvalError::DivisionByZero));
        assert_eq!(eval("9223372036854775807 + 1"), Err(EvalError::Overflow));
        assert!(matches!(eval("\"a\" - 1"), Err(EvalError::TypeMismatch { .. })));
        assert!(matches!(eval("f()"), Err(EvalError::NotConstant(_))));
        assert_eq!(eval("MAX"), Err(EvalError::UnknownConstant("MAX".into())));
    }

    #[test]
    fn resolves_named_constants_case_insensitively() {
        let mut constants = HashMap::new();
        constants.insert("max".to_string(), Value::Int(10));
        assert_eq!(evaluate(&expr("MAX * 2"), &constants), Ok(Value::Int(20)));
    }
}
