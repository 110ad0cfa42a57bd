//! Uniform, read-only view over syntax graph nodes.
//!
//! [`NodeRef`] lets tree walkers (the structural comparer, external analyzers, debugging tools) treat every node
//! kind alike: each exposes a discriminant [`NodeTag`], a location, and its immediate children in source order.
//! Tag-checked downcasts (`as_binary`, `as_if`, ...) are total and return `None` on mismatch.

use std::fmt;

use crate::ast::*;

/// Discriminant of every node kind in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTag {
    // Expressions
    Variable,
    FunctionReference,
    Indexer,
    Accessor,
    Constant,
    Binary,
    Unary,
    Postfix,
    Group,
    Truple,
    InlineArray,
    Assignment,
    FunctionCall,
    PointerCall,
    // Statements
    ExpressionStatement,
    KeywordCall,
    FlowControl,
    Block,
    If,
    While,
    For,
    Foreach,
    Switch,
    // Declarations
    Function,
    Param,
    Directive,
    ConstantDeclaration,
    Module,
}

impl fmt::Display for NodeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeTag::Variable => "variable",
            NodeTag::FunctionReference => "function reference",
            NodeTag::Indexer => "indexer",
            NodeTag::Accessor => "member access",
            NodeTag::Constant => "constant",
            NodeTag::Binary => "binary operation",
            NodeTag::Unary => "unary operation",
            NodeTag::Postfix => "postfix operation",
            NodeTag::Group => "group",
            NodeTag::Truple => "truple",
            NodeTag::InlineArray => "inline array",
            NodeTag::Assignment => "assignment",
            NodeTag::FunctionCall => "function call",
            NodeTag::PointerCall => "pointer call",
            NodeTag::ExpressionStatement => "expression statement",
            NodeTag::KeywordCall => "keyword call",
            NodeTag::FlowControl => "flow control",
            NodeTag::Block => "block",
            NodeTag::If => "if statement",
            NodeTag::While => "while loop",
            NodeTag::For => "for loop",
            NodeTag::Foreach => "foreach loop",
            NodeTag::Switch => "switch statement",
            NodeTag::Function => "function definition",
            NodeTag::Param => "parameter",
            NodeTag::Directive => "directive",
            NodeTag::ConstantDeclaration => "constant declaration",
            NodeTag::Module => "module",
        };
        f.write_str(name)
    }
}

/// A borrowed reference to any node.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Expr(&'a Expr),
    Stmt(&'a Stmt),
    Function(&'a FunctionDef),
    Param(&'a Param),
    Directive(&'a Directive),
    Constant(&'a ConstantDecl),
    Module(&'a Module),
}

impl<'a> NodeRef<'a> {
    pub fn tag(&self) -> NodeTag {
        match self {
            NodeRef::Expr(e) => e.tag(),
            NodeRef::Stmt(s) => s.tag(),
            NodeRef::Function(_) => NodeTag::Function,
            NodeRef::Param(_) => NodeTag::Param,
            NodeRef::Directive(_) => NodeTag::Directive,
            NodeRef::Constant(_) => NodeTag::ConstantDeclaration,
            NodeRef::Module(_) => NodeTag::Module,
        }
    }

    /// Location of the node's first token. A module has no single location and reports the origin.
    pub fn loc(&self) -> Location {
        match self {
            NodeRef::Expr(e) => e.loc(),
            NodeRef::Stmt(s) => s.loc(),
            NodeRef::Function(f) => f.loc,
            NodeRef::Param(p) => p.loc,
            NodeRef::Directive(d) => d.loc,
            NodeRef::Constant(c) => c.loc,
            NodeRef::Module(_) => Location::new(1, 1, 0),
        }
    }

    /// Immediate children in source order.
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        match *self {
            NodeRef::Expr(e) => e.children(),
            NodeRef::Stmt(s) => s.children(),
            NodeRef::Function(f) => {
                let mut out: Vec<NodeRef<'a>> = f.params.iter().map(NodeRef::Param).collect();
                if let Some(body) = &f.body {
                    out.extend(body.statements.iter().map(NodeRef::Stmt));
                }
                out
            }
            NodeRef::Param(_) => Vec::new(),
            NodeRef::Directive(d) => match &d.kind {
                DirectiveKind::Declarative { args, .. } => args.iter().map(NodeRef::Expr).collect(),
                DirectiveKind::Import(_) | DirectiveKind::Listless { .. } => Vec::new(),
            },
            NodeRef::Constant(c) => vec![NodeRef::Expr(&c.value)],
            NodeRef::Module(m) => {
                let mut out: Vec<NodeRef<'a>> = m.imports.iter().map(NodeRef::Directive).collect();
                out.extend(m.declarations.iter().map(|d| match d {
                    Declaration::Function(f) => NodeRef::Function(f),
                    Declaration::Directive(d) => NodeRef::Directive(d),
                }));
                out.extend(m.constants.iter().map(NodeRef::Constant));
                out
            }
        }
    }

    pub fn as_expr(&self) -> Option<&'a Expr> {
        match *self {
            NodeRef::Expr(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_stmt(&self) -> Option<&'a Stmt> {
        match *self {
            NodeRef::Stmt(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&'a FunctionDef> {
        match *self {
            NodeRef::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Depth-first pre-order walk over this node and every descendant.
    pub fn walk(&self, visit: &mut dyn FnMut(NodeRef<'a>)) {
        visit(*self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

impl<'a> From<&'a Syntax> for NodeRef<'a> {
    fn from(syntax: &'a Syntax) -> Self {
        match syntax {
            Syntax::Module(m) => NodeRef::Module(m),
            Syntax::Function(f) => NodeRef::Function(f),
            Syntax::Expression(e) => NodeRef::Expr(e),
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

impl Expr {
    pub fn tag(&self) -> NodeTag {
        match self {
            Expr::Reference(r) => match r.kind {
                ReferenceKind::Variable(_) => NodeTag::Variable,
                ReferenceKind::Function(_) => NodeTag::FunctionReference,
                ReferenceKind::Indexer { .. } => NodeTag::Indexer,
                ReferenceKind::Accessor { .. } => NodeTag::Accessor,
            },
            Expr::Constant(_) => NodeTag::Constant,
            Expr::Binary(_) => NodeTag::Binary,
            Expr::Unary(_) => NodeTag::Unary,
            Expr::Postfix(_) => NodeTag::Postfix,
            Expr::Group(_) => NodeTag::Group,
            Expr::Truple(_) => NodeTag::Truple,
            Expr::InlineArray(_) => NodeTag::InlineArray,
            Expr::Assignment(_) => NodeTag::Assignment,
            Expr::Call(_) => NodeTag::FunctionCall,
            Expr::PointerCall(_) => NodeTag::PointerCall,
        }
    }

    /// Immediate operands in source order.
    pub fn children(&self) -> Vec<NodeRef<'_>> {
        let exprs: Vec<&Expr> = match self {
            Expr::Reference(r) => match &r.kind {
                ReferenceKind::Variable(_) | ReferenceKind::Function(_) => Vec::new(),
                ReferenceKind::Indexer { target, index } => vec![&**target, &**index],
                ReferenceKind::Accessor { target, .. } => vec![&**target],
            },
            Expr::Constant(_) => Vec::new(),
            Expr::Binary(b) => vec![&*b.left, &*b.right],
            Expr::Unary(u) => vec![&*u.operand],
            Expr::Postfix(p) => vec![&*p.operand],
            Expr::Group(g) => vec![&*g.inner],
            Expr::Truple(t) => t.items.iter().collect(),
            Expr::InlineArray(a) => a.items.iter().collect(),
            Expr::Assignment(a) => vec![&*a.target, &*a.value],
            Expr::Call(c) => c.self_expr.as_deref().into_iter().chain(c.args.iter()).collect(),
            Expr::PointerCall(c) => c
                .self_expr
                .as_deref()
                .into_iter()
                .chain(std::iter::once(c.pointer.as_ref()))
                .chain(c.args.iter())
                .collect(),
        };
        exprs.into_iter().map(NodeRef::Expr).collect()
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Expr::Reference(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Ident> {
        match self {
            Expr::Reference(Reference {
                kind: ReferenceKind::Variable(name),
                ..
            }) => Some(name),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Expr::Constant(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&BinaryOp> {
        match self {
            Expr::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_unary(&self) -> Option<&UnaryOp> {
        match self {
            Expr::Unary(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_postfix(&self) -> Option<&PostfixOp> {
        match self {
            Expr::Postfix(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Expr::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_truple(&self) -> Option<&Truple> {
        match self {
            Expr::Truple(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_inline_array(&self) -> Option<&InlineArray> {
        match self {
            Expr::InlineArray(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_assignment(&self) -> Option<&Assignment> {
        match self {
            Expr::Assignment(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&FunctionCall> {
        match self {
            Expr::Call(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_pointer_call(&self) -> Option<&PointerCall> {
        match self {
            Expr::PointerCall(c) => Some(c),
            _ => None,
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

impl Stmt {
    pub fn tag(&self) -> NodeTag {
        match self {
            Stmt::Expr(_) => NodeTag::ExpressionStatement,
            Stmt::KeywordCall(_) => NodeTag::KeywordCall,
            Stmt::FlowControl(_) => NodeTag::FlowControl,
            Stmt::Block(_) => NodeTag::Block,
            Stmt::If(_) => NodeTag::If,
            Stmt::While(_) => NodeTag::While,
            Stmt::For(_) => NodeTag::For,
            Stmt::Foreach(_) => NodeTag::Foreach,
            Stmt::Switch(_) => NodeTag::Switch,
        }
    }

    /// Immediate children in source order: header expressions first, then body statements.
    pub fn children(&self) -> Vec<NodeRef<'_>> {
        match self {
            Stmt::Expr(s) => vec![NodeRef::Expr(&s.expr)],
            Stmt::KeywordCall(s) => s.argument.iter().map(NodeRef::Expr).collect(),
            Stmt::FlowControl(_) => Vec::new(),
            Stmt::Block(b) => b.statements.iter().map(NodeRef::Stmt).collect(),
            Stmt::If(s) => {
                let mut out = vec![NodeRef::Expr(&s.condition), NodeRef::Stmt(&s.then_branch)];
                if let Some(else_branch) = &s.else_branch {
                    out.push(NodeRef::Stmt(else_branch));
                }
                out
            }
            Stmt::While(s) => vec![NodeRef::Expr(&s.condition), NodeRef::Stmt(&s.body)],
            Stmt::For(s) => {
                let mut out: Vec<NodeRef<'_>> = [&s.init, &s.condition, &s.step]
                    .into_iter()
                    .flatten()
                    .map(NodeRef::Expr)
                    .collect();
                out.push(NodeRef::Stmt(&s.body));
                out
            }
            Stmt::Foreach(s) => vec![NodeRef::Expr(&s.collection), NodeRef::Stmt(&s.body)],
            Stmt::Switch(s) => {
                let mut out = vec![NodeRef::Expr(&s.subject)];
                for case in &s.cases {
                    out.extend(case.labels.iter().filter_map(|l| match l {
                        CaseLabel::Value(e) => Some(NodeRef::Expr(e)),
                        CaseLabel::Default(_) => None,
                    }));
                }
                out.extend(s.body.statements.iter().map(NodeRef::Stmt));
                out
            }
        }
    }

    pub fn as_expr_stmt(&self) -> Option<&ExprStmt> {
        match self {
            Stmt::Expr(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_keyword_call(&self) -> Option<&KeywordCall> {
        match self {
            Stmt::KeywordCall(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flow_control(&self) -> Option<&FlowControl> {
        match self {
            Stmt::FlowControl(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Stmt::Block(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_if(&self) -> Option<&IfStmt> {
        match self {
            Stmt::If(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_while(&self) -> Option<&WhileStmt> {
        match self {
            Stmt::While(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_for(&self) -> Option<&ForStmt> {
        match self {
            Stmt::For(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_foreach(&self) -> Option<&ForeachStmt> {
        match self {
            Stmt::Foreach(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_switch(&self) -> Option<&SwitchStmt> {
        match self {
            Stmt::Switch(s) => Some(s),
            _ => None,
        }
    }
}
