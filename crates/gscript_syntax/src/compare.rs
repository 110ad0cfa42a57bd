//! Structural comparison of two syntax graphs.
//!
//! Used to certify that re-rendered or packed source still means the same thing: the graph parsed from the output is
//! compared against the graph parsed from the input. Node ids, locations and identifier casing are ignored; every
//! other field is divergence-relevant.
//!
//! ## Notes
//! - A kind or scalar mismatch records one [`Divergence`] and stops descending into that pair.
//! - Sequence length mismatches (imports, declarations, parameters, statements, cases, arguments) are reported once
//!   per level without pairing up the elements.
//!
//! ## Examples
//!
//! ```rust
//! use gscript_syntax::compare::compare;
//! use gscript_syntax::parser::{ParseTarget, ParserConfig, parse_source};
//!
//! let config = ParserConfig::new().with_target(ParseTarget::Expression);
//! let a = parse_source("1 + 2 * x", config.clone()).unwrap().syntax.unwrap();
//! let b = parse_source("1+2*X", config.clone()).unwrap().syntax.unwrap();
//! let c = parse_source("(1 + 2) * x", config).unwrap().syntax.unwrap();
//! assert!(compare(&a, &b).is_empty());
//! assert_eq!(compare(&a, &c).len(), 1);
//! ```

use std::fmt;

use crate::ast::*;
use crate::node::NodeRef;

/// One structural difference between two graphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    pub message: String,
    pub left_loc: Location,
    pub right_loc: Location,
    /// Rendering of the offending left node (source text for expressions, the node kind otherwise).
    pub left: String,
    pub right: String,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: `{}` at {} vs `{}` at {}",
            self.message, self.left, self.left_loc, self.right, self.right_loc
        )
    }
}

/// Compare two graphs.
///
/// ## Returns
/// Every divergence found, in depth-first order. An empty list certifies structural equality.
pub fn compare(left: &Syntax, right: &Syntax) -> Vec<Divergence> {
    let mut comparer = Comparer::default();
    comparer.node(NodeRef::from(left), NodeRef::from(right));
    comparer.divergences
}

#[derive(Default)]
struct Comparer {
    divergences: Vec<Divergence>,
}

impl Comparer {
    fn diverge(&mut self, message: impl Into<String>, left: NodeRef<'_>, right: NodeRef<'_>) {
        self.divergences.push(Divergence {
            message: message.into(),
            left_loc: left.loc(),
            right_loc: right.loc(),
            left: describe(left),
            right: describe(right),
        });
    }

    fn node(&mut self, left: NodeRef<'_>, right: NodeRef<'_>) {
        if left.tag() != right.tag() {
            self.diverge(
                format!("node kind differs ({:?} vs {:?})", left.tag(), right.tag()),
                left,
                right,
            );
            return;
        }

        let mismatch = match (left, right) {
            (NodeRef::Expr(a), NodeRef::Expr(b)) => expr_mismatch(a, b),
            (NodeRef::Stmt(a), NodeRef::Stmt(b)) => stmt_mismatch(a, b),
            (NodeRef::Function(a), NodeRef::Function(b)) => function_mismatch(a, b),
            (NodeRef::Param(a), NodeRef::Param(b)) => param_mismatch(a, b),
            (NodeRef::Directive(a), NodeRef::Directive(b)) => directive_mismatch(a, b),
            (NodeRef::Constant(a), NodeRef::Constant(b)) => {
                if !a.name.matches(&b.name.name) {
                    Some("constant name differs".to_string())
                } else if a.folded != b.folded {
                    Some("folded constant value differs".to_string())
                } else {
                    None
                }
            }
            (NodeRef::Module(a), NodeRef::Module(b)) => module_mismatch(a, b),
            _ => None,
        };
        if let Some(message) = mismatch {
            self.diverge(message, left, right);
            return;
        }

        let left_children = left.children();
        let right_children = right.children();
        if left_children.len() != right_children.len() {
            self.diverge(
                format!(
                    "operand count differs ({} vs {})",
                    left_children.len(),
                    right_children.len()
                ),
                left,
                right,
            );
            return;
        }
        for (a, b) in left_children.into_iter().zip(right_children) {
            self.node(a, b);
        }
    }
}

fn describe(node: NodeRef<'_>) -> String {
    match node {
        NodeRef::Expr(e) => e.to_string(),
        NodeRef::Function(f) => format!("function {}", f.name.name),
        NodeRef::Param(p) => p.to_string(),
        NodeRef::Directive(d) => d.to_string(),
        NodeRef::Constant(c) => format!("const {}", c.name.name),
        other => format!("{:?}", other.tag()),
    }
}

fn count_mismatch(what: &str, left: usize, right: usize) -> Option<String> {
    (left != right).then(|| format!("{what} count differs ({left} vs {right})"))
}

fn ident_mismatch(what: &str, left: &Ident, right: &Ident) -> Option<String> {
    (!left.matches(&right.name)).then(|| format!("{what} differs"))
}

fn function_ref_eq(left: &FunctionRef, right: &FunctionRef) -> bool {
    let qualifier_eq = match (&left.qualifier, &right.qualifier) {
        (Qualifier::None, Qualifier::None) | (Qualifier::Local, Qualifier::Local) => true,
        (Qualifier::Module(a), Qualifier::Module(b)) => a.matches(b),
        _ => false,
    };
    qualifier_eq && left.name.matches(&right.name.name)
}

fn expr_mismatch(left: &Expr, right: &Expr) -> Option<String> {
    match (left, right) {
        (Expr::Reference(a), Expr::Reference(b)) => match (&a.kind, &b.kind) {
            (ReferenceKind::Variable(x), ReferenceKind::Variable(y)) => ident_mismatch("variable name", x, y),
            (ReferenceKind::Function(x), ReferenceKind::Function(y)) => {
                (!function_ref_eq(x, y)).then(|| "function reference differs".to_string())
            }
            (ReferenceKind::Accessor { member: x, .. }, ReferenceKind::Accessor { member: y, .. }) => {
                ident_mismatch("member name", x, y)
            }
            _ => None,
        },
        (Expr::Constant(a), Expr::Constant(b)) => {
            if a.kind != b.kind {
                return Some("literal kind differs".to_string());
            }
            let same = match (a.value(), b.value()) {
                (Ok(x), Ok(y)) => x == y,
                _ => a.raw == b.raw,
            };
            (!same).then(|| "literal value differs".to_string())
        }
        (Expr::Binary(a), Expr::Binary(b)) => (a.op != b.op).then(|| "operator differs".to_string()),
        (Expr::Unary(a), Expr::Unary(b)) => (a.op != b.op).then(|| "operator differs".to_string()),
        (Expr::Postfix(a), Expr::Postfix(b)) => (a.op != b.op).then(|| "operator differs".to_string()),
        (Expr::Assignment(a), Expr::Assignment(b)) => (a.op != b.op).then(|| "assignment operator differs".to_string()),
        (Expr::InlineArray(a), Expr::InlineArray(b)) => count_mismatch("array item", a.items.len(), b.items.len()),
        (Expr::Call(a), Expr::Call(b)) => {
            if !function_ref_eq(&a.target, &b.target) {
                Some("call target differs".to_string())
            } else {
                call_shape_mismatch(
                    (a.self_expr.is_some(), a.modifier, a.args.len()),
                    (b.self_expr.is_some(), b.modifier, b.args.len()),
                )
            }
        }
        (Expr::PointerCall(a), Expr::PointerCall(b)) => call_shape_mismatch(
            (a.self_expr.is_some(), a.modifier, a.args.len()),
            (b.self_expr.is_some(), b.modifier, b.args.len()),
        ),
        _ => None,
    }
}

fn call_shape_mismatch(
    (left_self, left_modifier, left_args): (bool, Option<CallModifier>, usize),
    (right_self, right_modifier, right_args): (bool, Option<CallModifier>, usize),
) -> Option<String> {
    if left_self != right_self {
        Some("call self-expression differs".to_string())
    } else if left_modifier != right_modifier {
        Some("call modifier differs".to_string())
    } else {
        count_mismatch("argument", left_args, right_args)
    }
}

fn stmt_mismatch(left: &Stmt, right: &Stmt) -> Option<String> {
    match (left, right) {
        (Stmt::KeywordCall(a), Stmt::KeywordCall(b)) => {
            if a.keyword != b.keyword {
                Some("keyword differs".to_string())
            } else {
                (a.argument.is_some() != b.argument.is_some()).then(|| "keyword argument differs".to_string())
            }
        }
        (Stmt::FlowControl(a), Stmt::FlowControl(b)) => {
            (a.kind != b.kind || a.target.kind != b.target.kind).then(|| "flow control differs".to_string())
        }
        (Stmt::Block(a), Stmt::Block(b)) => count_mismatch("statement", a.statements.len(), b.statements.len()),
        (Stmt::If(a), Stmt::If(b)) => {
            (a.else_branch.is_some() != b.else_branch.is_some()).then(|| "else branch differs".to_string())
        }
        (Stmt::For(a), Stmt::For(b)) => {
            let shape = |s: &ForStmt| [s.init.is_some(), s.condition.is_some(), s.step.is_some()];
            (shape(a) != shape(b)).then(|| "for clauses differ".to_string())
        }
        (Stmt::Foreach(a), Stmt::Foreach(b)) => {
            let key_eq = match (&a.key, &b.key) {
                (Some(x), Some(y)) => x.matches(&y.name),
                (None, None) => true,
                _ => false,
            };
            if !key_eq {
                Some("foreach key differs".to_string())
            } else {
                ident_mismatch("foreach iterator", &a.value, &b.value)
            }
        }
        (Stmt::Switch(a), Stmt::Switch(b)) => {
            if let Some(message) = count_mismatch("case", a.cases.len(), b.cases.len()) {
                return Some(message);
            }
            if let Some(message) = count_mismatch("statement", a.body.statements.len(), b.body.statements.len()) {
                return Some(message);
            }
            a.cases.iter().zip(&b.cases).find_map(|(x, y)| {
                if x.range != y.range {
                    Some(format!("case range differs ({:?} vs {:?})", x.range, y.range))
                } else if x.labels.len() != y.labels.len() || x.is_default() != y.is_default() {
                    Some("case labels differ".to_string())
                } else {
                    None
                }
            })
        }
        _ => None,
    }
}

fn function_mismatch(left: &FunctionDef, right: &FunctionDef) -> Option<String> {
    ident_mismatch("function name", &left.name, &right.name)
        .or_else(|| count_mismatch("parameter", left.params.len(), right.params.len()))
        .or_else(|| (left.body.is_some() != right.body.is_some()).then(|| "function body presence differs".to_string()))
        .or_else(|| {
            let left_statements = left.body.as_ref().map_or(0, |b| b.statements.len());
            let right_statements = right.body.as_ref().map_or(0, |b| b.statements.len());
            count_mismatch("statement", left_statements, right_statements)
        })
}

fn param_mismatch(left: &Param, right: &Param) -> Option<String> {
    let name_eq = match (&left.name, &right.name) {
        (Some(x), Some(y)) => x.matches(&y.name),
        (None, None) => true,
        _ => false,
    };
    if !name_eq {
        Some("parameter name differs".to_string())
    } else {
        (left.modifiers != right.modifiers).then(|| "parameter modifiers differ".to_string())
    }
}

fn directive_mismatch(left: &Directive, right: &Directive) -> Option<String> {
    match (&left.kind, &right.kind) {
        (DirectiveKind::Import(a), DirectiveKind::Import(b)) => (!a.matches(b)).then(|| "import path differs".to_string()),
        (DirectiveKind::Declarative { name: a, args: x }, DirectiveKind::Declarative { name: b, args: y }) => {
            ident_mismatch("directive name", a, b).or_else(|| count_mismatch("directive argument", x.len(), y.len()))
        }
        (DirectiveKind::Listless { name: a }, DirectiveKind::Listless { name: b }) => ident_mismatch("directive name", a, b),
        _ => Some("directive kind differs".to_string()),
    }
}

fn module_mismatch(left: &Module, right: &Module) -> Option<String> {
    if left.declarative != right.declarative {
        return Some("declarative flag differs".to_string());
    }
    count_mismatch("import", left.imports.len(), right.imports.len())
        .or_else(|| count_mismatch("declaration", left.declarations.len(), right.declarations.len()))
        .or_else(|| count_mismatch("constant", left.constants.len(), right.constants.len()))
        .or_else(|| count_mismatch("global", left.globals.len(), right.globals.len()))
        .or_else(|| {
            left.globals
                .iter()
                .zip(&right.globals)
                .find_map(|(a, b)| ident_mismatch("global name", a, b))
        })
}
