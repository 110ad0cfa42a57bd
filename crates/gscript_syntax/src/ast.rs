//! Syntax graph node types.
//!
//! The graph is a closed set of tagged sum types: [`Expr`] for expressions, [`Stmt`] for statements inside function
//! bodies, [`FunctionDef`] and [`Directive`] for root declarations, and [`Module`] for a whole file. Every node
//! carries a [`NodeId`] (unique within one parse session) and the [`Location`] of its first token.
//!
//! ## Notes
//! - Nodes are immutable once the parser seals them into a parent; construction-time state lives in the parser's
//!   pending nodes, never here.
//! - Identifiers keep their original spelling for display. Equality between identifiers is ASCII case-insensitive
//!   ([`Ident::matches`]).

use std::cell::OnceCell;
use std::fmt;
use std::ops::Range;

use gscript_core::lang::operators::OperatorId;

use crate::value::{Value, ValueError};

// ============================================================================
// Locations and identity
// ============================================================================

/// Source position of a token or node.
///
/// `line` and `column` are 1-based (column counts characters); `offset` is the byte offset into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Location {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl Location {
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Self { line, column, offset }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Identity of a node within one parse session.
///
/// Ids are handed out by a monotonic counter and carry no semantic meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// An identifier as written in source.
#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub loc: Location,
}

impl Ident {
    pub fn new(name: impl Into<String>, loc: Location) -> Self {
        Self { name: name.into(), loc }
    }

    /// Compare two names the way the language does (ASCII case-insensitive).
    pub fn matches(&self, other: &str) -> bool {
        self.name.eq_ignore_ascii_case(other)
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// An expression node.
#[derive(Debug, Clone)]
pub enum Expr {
    Reference(Reference),
    Constant(Constant),
    Binary(BinaryOp),
    Unary(UnaryOp),
    Postfix(PostfixOp),
    Group(Group),
    Truple(Truple),
    InlineArray(InlineArray),
    Assignment(Assignment),
    Call(FunctionCall),
    PointerCall(PointerCall),
}

/// A reference to storage or to a function.
#[derive(Debug, Clone)]
pub struct Reference {
    pub id: NodeId,
    pub loc: Location,
    pub kind: ReferenceKind,
}

#[derive(Debug, Clone)]
pub enum ReferenceKind {
    /// A local or global variable: `player`.
    Variable(Ident),
    /// A function used as a value: `::on_spawn`, `maps\mp\_utility::wait_for`.
    Function(FunctionRef),
    /// `target[index]`
    Indexer { target: Box<Expr>, index: Box<Expr> },
    /// `target.member`
    Accessor { target: Box<Expr>, member: Ident },
}

/// A syntactic function name together with the scope qualifier it was written with.
#[derive(Debug, Clone)]
pub struct FunctionRef {
    pub name: Ident,
    pub qualifier: Qualifier,
}

/// Syntactic scope of a function reference. The parser records this; it never resolves it.
#[derive(Debug, Clone)]
pub enum Qualifier {
    /// `foo(...)`: resolved by the analyzer through the current module and its imports.
    None,
    /// `::foo`: explicitly the current module.
    Local,
    /// `a\b::foo`: explicitly another module.
    Module(ModulePath),
}

/// A `\`-separated module path such as `maps\mp\_utility`.
#[derive(Debug, Clone)]
pub struct ModulePath {
    pub segments: Vec<Ident>,
}

impl ModulePath {
    /// Compare two paths segment-wise, ignoring case.
    pub fn matches(&self, other: &ModulePath) -> bool {
        self.segments.len() == other.segments.len()
            && self.segments.iter().zip(&other.segments).all(|(a, b)| a.matches(&b.name))
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("\\")?;
            }
            f.write_str(&segment.name)?;
        }
        Ok(())
    }
}

/// Literal category of a [`Constant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstantKind {
    Integer,
    Float,
    String,
    /// `&"HINT_TEXT"`
    LocalizedString,
    /// `%anim_name`
    Resource,
    Bool,
    Undefined,
}

/// A typed literal.
///
/// The raw source text is kept verbatim; the native [`Value`] is decoded lazily on first request and cached.
#[derive(Debug, Clone)]
pub struct Constant {
    pub id: NodeId,
    pub loc: Location,
    pub kind: ConstantKind,
    pub raw: String,
    value: OnceCell<Result<Value, ValueError>>,
}

impl Constant {
    pub fn new(id: NodeId, loc: Location, kind: ConstantKind, raw: impl Into<String>) -> Self {
        Self {
            id,
            loc,
            kind,
            raw: raw.into(),
            value: OnceCell::new(),
        }
    }

    /// Decode (once) and return the literal's native value.
    pub fn value(&self) -> Result<&Value, &ValueError> {
        self.value.get_or_init(|| Value::decode(self.kind, &self.raw)).as_ref()
    }
}

#[derive(Debug, Clone)]
pub struct BinaryOp {
    pub id: NodeId,
    pub loc: Location,
    pub op: OperatorId,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

/// Prefix `!`, `-` or `~`.
#[derive(Debug, Clone)]
pub struct UnaryOp {
    pub id: NodeId,
    pub loc: Location,
    pub op: OperatorId,
    pub operand: Box<Expr>,
}

/// Postfix `++` or `--`.
#[derive(Debug, Clone)]
pub struct PostfixOp {
    pub id: NodeId,
    pub loc: Location,
    pub op: OperatorId,
    pub operand: Box<Expr>,
}

/// A parenthesized expression. Kept in the graph so rendering never has to re-derive parentheses.
#[derive(Debug, Clone)]
pub struct Group {
    pub id: NodeId,
    pub loc: Location,
    pub inner: Box<Expr>,
}

/// `(x, y, z)`: exactly three items, enforced by the type.
#[derive(Debug, Clone)]
pub struct Truple {
    pub id: NodeId,
    pub loc: Location,
    pub items: Box<[Expr; 3]>,
}

/// `[]` or `[a, b]`.
#[derive(Debug, Clone)]
pub struct InlineArray {
    pub id: NodeId,
    pub loc: Location,
    pub items: Vec<Expr>,
}

/// `target op value` where `op` is `=` or a compound assignment.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub id: NodeId,
    pub loc: Location,
    pub op: OperatorId,
    pub target: Box<Expr>,
    pub value: Box<Expr>,
}

/// `thread` / `childthread` in front of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallModifier {
    Thread,
    ChildThread,
}

/// `[self] [modifier] name(args)`
#[derive(Debug, Clone)]
pub struct FunctionCall {
    pub id: NodeId,
    pub loc: Location,
    pub self_expr: Option<Box<Expr>>,
    pub modifier: Option<CallModifier>,
    pub target: FunctionRef,
    pub args: Vec<Expr>,
}

/// `[self] [modifier] [[pointer]](args)`
#[derive(Debug, Clone)]
pub struct PointerCall {
    pub id: NodeId,
    pub loc: Location,
    pub self_expr: Option<Box<Expr>>,
    pub modifier: Option<CallModifier>,
    pub pointer: Box<Expr>,
    pub args: Vec<Expr>,
}

impl Expr {
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Reference(e) => e.id,
            Expr::Constant(e) => e.id,
            Expr::Binary(e) => e.id,
            Expr::Unary(e) => e.id,
            Expr::Postfix(e) => e.id,
            Expr::Group(e) => e.id,
            Expr::Truple(e) => e.id,
            Expr::InlineArray(e) => e.id,
            Expr::Assignment(e) => e.id,
            Expr::Call(e) => e.id,
            Expr::PointerCall(e) => e.id,
        }
    }

    pub fn loc(&self) -> Location {
        match self {
            Expr::Reference(e) => e.loc,
            Expr::Constant(e) => e.loc,
            Expr::Binary(e) => e.loc,
            Expr::Unary(e) => e.loc,
            Expr::Postfix(e) => e.loc,
            Expr::Group(e) => e.loc,
            Expr::Truple(e) => e.loc,
            Expr::InlineArray(e) => e.loc,
            Expr::Assignment(e) => e.loc,
            Expr::Call(e) => e.loc,
            Expr::PointerCall(e) => e.loc,
        }
    }

    /// Variables, member accesses and indexers can be assigned to and incremented.
    pub fn is_mutable_reference(&self) -> bool {
        matches!(
            self,
            Expr::Reference(Reference {
                kind: ReferenceKind::Variable(_) | ReferenceKind::Indexer { .. } | ReferenceKind::Accessor { .. },
                ..
            })
        )
    }

    /// Expressions allowed on their own as a statement: assignments, calls and `++`/`--`.
    pub fn is_statement_kind(&self) -> bool {
        matches!(
            self,
            Expr::Assignment(_) | Expr::Call(_) | Expr::PointerCall(_) | Expr::Postfix(_)
        )
    }
}

// ============================================================================
// Statements
// ============================================================================

/// A statement inside a function body.
#[derive(Debug, Clone)]
pub enum Stmt {
    Expr(ExprStmt),
    KeywordCall(KeywordCall),
    FlowControl(FlowControl),
    Block(Block),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Foreach(ForeachStmt),
    Switch(SwitchStmt),
}

/// An assignment, call or postfix expression followed by `;`.
#[derive(Debug, Clone)]
pub struct ExprStmt {
    pub id: NodeId,
    pub loc: Location,
    pub expr: Expr,
}

/// Keyword shaped like a call with an optional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKeyword {
    Return,
    Wait,
    WaitTillFrameEnd,
    Breakpoint,
}

/// `return [expr];`, `wait expr;`, `waittillframeend;`, `breakpoint;`
#[derive(Debug, Clone)]
pub struct KeywordCall {
    pub id: NodeId,
    pub loc: Location,
    pub keyword: CallKeyword,
    pub argument: Option<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowKind {
    Break,
    Continue,
}

/// Which enclosing construct a `break`/`continue` leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Loop,
    Switch,
}

/// The nearest enclosing loop or switch, identified by the node id it was sealed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowTarget {
    pub kind: TargetKind,
    pub id: NodeId,
}

/// `break;` or `continue;`
#[derive(Debug, Clone)]
pub struct FlowControl {
    pub id: NodeId,
    pub loc: Location,
    pub kind: FlowKind,
    pub target: FlowTarget,
}

/// `{ ... }`
#[derive(Debug, Clone)]
pub struct Block {
    pub id: NodeId,
    pub loc: Location,
    pub statements: Vec<Stmt>,
}

/// `if (condition) then_branch [else else_branch]`
#[derive(Debug, Clone)]
pub struct IfStmt {
    pub id: NodeId,
    pub loc: Location,
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
}

/// `while (condition) body`
#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub id: NodeId,
    pub loc: Location,
    pub condition: Expr,
    pub body: Box<Stmt>,
}

/// `for (init; condition; step) body`; every clause is optional.
#[derive(Debug, Clone)]
pub struct ForStmt {
    pub id: NodeId,
    pub loc: Location,
    pub init: Option<Expr>,
    pub condition: Option<Expr>,
    pub step: Option<Expr>,
    pub body: Box<Stmt>,
}

/// `foreach ([key,] value in collection) body`
#[derive(Debug, Clone)]
pub struct ForeachStmt {
    pub id: NodeId,
    pub loc: Location,
    pub key: Option<Ident>,
    pub value: Ident,
    pub collection: Expr,
    pub body: Box<Stmt>,
}

/// A `case` value or the `default` marker.
#[derive(Debug, Clone)]
pub enum CaseLabel {
    Value(Expr),
    Default(Location),
}

/// One or more labels sharing a statement offset inside a switch body.
///
/// `range` is the run of `body.statements` the labels govern; it is computed once the switch body is sealed.
#[derive(Debug, Clone)]
pub struct Case {
    pub loc: Location,
    pub offset: usize,
    pub labels: Vec<CaseLabel>,
    pub range: Range<usize>,
}

impl Case {
    pub fn is_default(&self) -> bool {
        self.labels.iter().any(|l| matches!(l, CaseLabel::Default(_)))
    }
}

/// `switch (subject) { case ...: ... }`
///
/// `cases` are ordered by non-decreasing `offset`; ranges are contiguous and never overlap.
#[derive(Debug, Clone)]
pub struct SwitchStmt {
    pub id: NodeId,
    pub loc: Location,
    pub subject: Expr,
    pub body: Block,
    pub cases: Vec<Case>,
}

impl SwitchStmt {
    /// Label-grouped statement segments in source order.
    pub fn segments(&self) -> impl Iterator<Item = (&Case, &[Stmt])> + '_ {
        self.cases
            .iter()
            .map(|case| (case, &self.body.statements[case.range.clone()]))
    }
}

impl Stmt {
    pub fn id(&self) -> NodeId {
        match self {
            Stmt::Expr(s) => s.id,
            Stmt::KeywordCall(s) => s.id,
            Stmt::FlowControl(s) => s.id,
            Stmt::Block(s) => s.id,
            Stmt::If(s) => s.id,
            Stmt::While(s) => s.id,
            Stmt::For(s) => s.id,
            Stmt::Foreach(s) => s.id,
            Stmt::Switch(s) => s.id,
        }
    }

    pub fn loc(&self) -> Location {
        match self {
            Stmt::Expr(s) => s.loc,
            Stmt::KeywordCall(s) => s.loc,
            Stmt::FlowControl(s) => s.loc,
            Stmt::Block(s) => s.loc,
            Stmt::If(s) => s.loc,
            Stmt::While(s) => s.loc,
            Stmt::For(s) => s.loc,
            Stmt::Foreach(s) => s.loc,
            Stmt::Switch(s) => s.loc,
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// Modifiers written in front of (or instead of) a parameter name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ParamModifiers {
    /// `&name`
    pub by_ref: bool,
    /// `...name` or a bare `...`
    pub variadic: bool,
    /// `?name`: the parameter and every one after it may be omitted by callers.
    pub optional: bool,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub loc: Location,
    /// `None` only for a bare `...`.
    pub name: Option<Ident>,
    pub modifiers: ParamModifiers,
}

/// `name(params) { body }`, or `name(params);` in a declarative module.
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub id: NodeId,
    pub loc: Location,
    pub name: Ident,
    pub params: Vec<Param>,
    pub body: Option<Block>,
    pub variadic: bool,
    /// Number of leading parameters a caller must supply.
    pub min_args: usize,
}

#[derive(Debug, Clone)]
pub enum DirectiveKind {
    /// `#include path;`
    Import(ModulePath),
    /// `#name(args);`
    Declarative { name: Ident, args: Vec<Expr> },
    /// `#name;`
    Listless { name: Ident },
}

#[derive(Debug, Clone)]
pub struct Directive {
    pub id: NodeId,
    pub loc: Location,
    pub kind: DirectiveKind,
}

/// `const NAME = expr;`
#[derive(Debug, Clone)]
pub struct ConstantDecl {
    pub id: NodeId,
    pub loc: Location,
    pub name: Ident,
    pub value: Expr,
    /// The folded value, when the initializer could be evaluated.
    pub folded: Option<Value>,
}

/// A root-level declaration, in source order.
#[derive(Debug, Clone)]
pub enum Declaration {
    Function(FunctionDef),
    Directive(Directive),
}

/// A whole source file.
#[derive(Debug, Clone, Default)]
pub struct Module {
    /// `#include` directives, in source order.
    pub imports: Vec<Directive>,
    pub declarations: Vec<Declaration>,
    pub constants: Vec<ConstantDecl>,
    pub globals: Vec<Ident>,
    /// Set by `#declarative;`: every function is a forward declaration.
    pub declarative: bool,
}

impl Module {
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDef> + '_ {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Function(f) => Some(f),
            Declaration::Directive(_) => None,
        })
    }

    pub fn find_function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions().find(|f| f.name.matches(name))
    }
}

/// What a parse session produces, depending on the configured target.
#[derive(Debug, Clone)]
pub enum Syntax {
    Module(Module),
    Function(FunctionDef),
    Expression(Expr),
}

impl Syntax {
    pub fn as_module(&self) -> Option<&Module> {
        match self {
            Syntax::Module(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionDef> {
        match self {
            Syntax::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_expression(&self) -> Option<&Expr> {
        match self {
            Syntax::Expression(e) => Some(e),
            _ => None,
        }
    }
}
