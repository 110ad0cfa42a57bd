//! Canonical source rendering for expressions.
//!
//! `Display` on an [`Expr`] produces text that re-lexes and re-parses to the same expression. Binary operators are
//! written with surrounding spaces and no extra parentheses: [`Group`](crate::ast::Group) nodes survive parsing, so
//! the tree's shape already encodes every parenthesis the author wrote.

use std::fmt::{self, Display, Formatter, Write};

use gscript_core::lang::keywords::{self, KeywordId};
use gscript_core::lang::{extends_to_longer_symbol, operators};

use crate::ast::*;

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Reference(r) => r.fmt(f),
            Expr::Constant(c) => f.write_str(&c.raw),
            Expr::Binary(b) => write!(f, "{} {} {}", b.left, operators::as_str(b.op), b.right),
            Expr::Unary(u) => {
                let op = operators::as_str(u.op);
                let operand = u.operand.to_string();
                // `- -a` must not collapse into `--a`.
                let glue = operand.chars().next().map(|c| format!("{op}{c}"));
                if glue.is_some_and(|g| extends_to_longer_symbol(op) && operators::is_spelling(&g)) {
                    write!(f, "{op} {operand}")
                } else {
                    write!(f, "{op}{operand}")
                }
            }
            Expr::Postfix(p) => write!(f, "{}{}", p.operand, operators::as_str(p.op)),
            Expr::Group(g) => write!(f, "({})", g.inner),
            Expr::Truple(t) => {
                let [x, y, z] = &*t.items;
                write!(f, "({x}, {y}, {z})")
            }
            Expr::InlineArray(a) => {
                f.write_char('[')?;
                if matches!(a.items.first(), Some(Expr::InlineArray(_))) {
                    f.write_char(' ')?;
                }
                write_list(f, &a.items)?;
                f.write_char(']')
            }
            Expr::Assignment(a) => write!(f, "{} {} {}", a.target, operators::as_str(a.op), a.value),
            Expr::Call(c) => {
                write_call_prefix(f, c.self_expr.as_deref(), c.modifier)?;
                write!(f, "{}(", c.target)?;
                write_list(f, &c.args)?;
                f.write_char(')')
            }
            Expr::PointerCall(c) => {
                write_call_prefix(f, c.self_expr.as_deref(), c.modifier)?;
                write!(f, "[[{}]](", c.pointer)?;
                write_list(f, &c.args)?;
                f.write_char(')')
            }
        }
    }
}

impl Display for Reference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ReferenceKind::Variable(name) => f.write_str(&name.name),
            ReferenceKind::Function(func) => func.fmt(f),
            ReferenceKind::Indexer { target, index } => {
                let index = index.to_string();
                // `[[` always opens a pointer call.
                let pad = if index.starts_with('[') { " " } else { "" };
                write!(f, "{target}[{pad}{index}]")
            }
            ReferenceKind::Accessor { target, member } => write!(f, "{target}.{}", member.name),
        }
    }
}

impl Display for FunctionRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Qualifier::None => {}
            Qualifier::Local => f.write_str("::")?,
            Qualifier::Module(path) => write!(f, "{path}::")?,
        }
        f.write_str(&self.name.name)
    }
}

impl Display for CallModifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(keywords::as_str(self.keyword()))
    }
}

impl CallModifier {
    pub fn keyword(self) -> KeywordId {
        match self {
            CallModifier::Thread => KeywordId::Thread,
            CallModifier::ChildThread => KeywordId::ChildThread,
        }
    }
}

impl Display for CallKeyword {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(keywords::as_str(self.keyword()))
    }
}

impl CallKeyword {
    pub fn keyword(self) -> KeywordId {
        match self {
            CallKeyword::Return => KeywordId::Return,
            CallKeyword::Wait => KeywordId::Wait,
            CallKeyword::WaitTillFrameEnd => KeywordId::WaitTillFrameEnd,
            CallKeyword::Breakpoint => KeywordId::Breakpoint,
        }
    }
}

impl Display for FlowKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlowKind::Break => "break",
            FlowKind::Continue => "continue",
        })
    }
}

impl Display for Param {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.modifiers.by_ref {
            f.write_char('&')?;
        }
        if self.modifiers.optional {
            f.write_char('?')?;
        }
        if self.modifiers.variadic {
            f.write_str("...")?;
        }
        if let Some(name) = &self.name {
            f.write_str(&name.name)?;
        }
        Ok(())
    }
}

impl Display for Directive {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DirectiveKind::Import(path) => write!(f, "#include {path};"),
            DirectiveKind::Declarative { name, args } => {
                write!(f, "#{}(", name.name)?;
                write_list(f, args)?;
                f.write_str(");")
            }
            DirectiveKind::Listless { name } => write!(f, "#{};", name.name),
        }
    }
}

fn write_call_prefix(f: &mut Formatter<'_>, self_expr: Option<&Expr>, modifier: Option<CallModifier>) -> fmt::Result {
    if let Some(target) = self_expr {
        write!(f, "{target} ")?;
    }
    if let Some(modifier) = modifier {
        write!(f, "{modifier} ")?;
    }
    Ok(())
}

fn write_list(f: &mut Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        item.fmt(f)?;
    }
    Ok(())
}
