/// Construction-time (pending) nodes.
///
/// This chunk defines the incomplete nodes that live on the parser's two working stacks:
/// - [`PendingExpr`] on the expression stack, next to the completed-expression slot;
/// - [`PendingStmt`] on the statement stack, one entry per open block or conditional.
///
/// ## Notes
/// - Pending nodes never escape the parser. Sealing one produces an immutable [`Expr`]/[`Stmt`].
/// - Each kind exposes its completion shape through [`PendingExpr::kind`]; the expression automaton dispatches on
///   that instead of matching on payloads while it mutates the stack.

// ============================================================================
// Expression stack
// ============================================================================

/// Self-expression and modifier collected in front of a callee.
#[derive(Debug, Default)]
struct CallPrefix {
    self_expr: Option<Box<Expr>>,
    modifier: Option<CallModifier>,
}

#[derive(Debug)]
enum Callee {
    Function(FunctionRef),
    Pointer(Box<Expr>),
}

#[derive(Debug)]
enum PendingExpr {
    /// `(` opened with an empty slot: a group, or a truple once a `,` is seen.
    Group { loc: Location, items: Vec<Expr> },
    /// `callee(` collecting arguments.
    Call {
        loc: Location,
        prefix: CallPrefix,
        callee: Callee,
        args: Vec<Expr>,
    },
    /// `self`, `thread`, or both, waiting for the callee.
    CallPrefix { loc: Location, prefix: CallPrefix },
    /// `[[` waiting for the pointer expression and `]]`.
    PointerCallee { loc: Location, prefix: CallPrefix },
    /// `[[pointer]]` waiting for `(`.
    PointerReady {
        loc: Location,
        prefix: CallPrefix,
        pointer: Box<Expr>,
    },
    /// `target[` waiting for the index and `]`.
    Indexer { target: Box<Expr> },
    /// `[` opened with an empty slot.
    InlineArray { loc: Location, items: Vec<Expr> },
    Binary { op: OperatorId, left: Box<Expr> },
    Unary { loc: Location, op: OperatorId },
    Assign { op: OperatorId, target: Box<Expr> },
    /// `target.` waiting for the member name.
    Member { target: Box<Expr> },
    /// `a\b` module path; `awaiting` after a `\`.
    Path {
        loc: Location,
        segments: Vec<Ident>,
        awaiting: bool,
    },
    /// `::` or `path::` waiting for the function name.
    Qualified { loc: Location, qualifier: Qualifier },
}

/// Payload-free view of a [`PendingExpr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingKind {
    Group,
    Call,
    CallPrefix,
    PointerCallee,
    PointerReady,
    Indexer,
    InlineArray,
    Binary(OperatorId),
    Unary,
    Assign,
    Member,
    Path { awaiting: bool },
    Qualified,
}

impl PendingExpr {
    fn kind(&self) -> PendingKind {
        match self {
            PendingExpr::Group { .. } => PendingKind::Group,
            PendingExpr::Call { .. } => PendingKind::Call,
            PendingExpr::CallPrefix { .. } => PendingKind::CallPrefix,
            PendingExpr::PointerCallee { .. } => PendingKind::PointerCallee,
            PendingExpr::PointerReady { .. } => PendingKind::PointerReady,
            PendingExpr::Indexer { .. } => PendingKind::Indexer,
            PendingExpr::InlineArray { .. } => PendingKind::InlineArray,
            PendingExpr::Binary { op, .. } => PendingKind::Binary(*op),
            PendingExpr::Unary { .. } => PendingKind::Unary,
            PendingExpr::Assign { .. } => PendingKind::Assign,
            PendingExpr::Member { .. } => PendingKind::Member,
            PendingExpr::Path { awaiting, .. } => PendingKind::Path { awaiting: *awaiting },
            PendingExpr::Qualified { .. } => PendingKind::Qualified,
        }
    }

    /// Append a finished item to a list-shaped node. Returns the item back for other kinds.
    fn fill(&mut self, item: Expr) -> Result<(), Expr> {
        match self {
            PendingExpr::Group { items, .. }
            | PendingExpr::Call { args: items, .. }
            | PendingExpr::InlineArray { items, .. } => {
                items.push(item);
                Ok(())
            }
            _ => Err(item),
        }
    }

    /// What closes this node, for diagnostics.
    fn describe(&self) -> &'static str {
        match self {
            PendingExpr::Group { .. } => "unclosed `(`",
            PendingExpr::Call { .. } => "unclosed argument list",
            PendingExpr::CallPrefix { .. } => "expected a function call after the call prefix",
            PendingExpr::PointerCallee { .. } => "unclosed `[[`",
            PendingExpr::PointerReady { .. } => "expected `(` after a function pointer",
            PendingExpr::Indexer { .. } | PendingExpr::InlineArray { .. } => "unclosed `[`",
            PendingExpr::Binary { .. } | PendingExpr::Unary { .. } | PendingExpr::Assign { .. } => {
                "missing operand"
            }
            PendingExpr::Member { .. } => "expected a member name after `.`",
            PendingExpr::Path { .. } => "expected `::` after a module path",
            PendingExpr::Qualified { .. } => "expected a function name after `::`",
        }
    }
}

impl PendingKind {
    /// Operators fold into the slot; everything else waits for a closing token.
    fn is_operator(self) -> bool {
        matches!(self, PendingKind::Binary(_) | PendingKind::Unary | PendingKind::Assign)
    }

    /// Kinds that only accept an identifier next.
    fn expects_name(self) -> bool {
        matches!(
            self,
            PendingKind::Member | PendingKind::Path { awaiting: true } | PendingKind::Qualified
        )
    }
}

/// Where the expression currently being built will be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExprContext {
    /// Expression statement, terminated by `;`.
    Statement,
    /// `if`/`while`/`switch` condition, terminated by `)`.
    Condition,
    /// `for` clause 0..=2.
    ForClause(u8),
    ForeachCollection,
    /// Argument of `return`, `wait`, ...
    KeywordArg,
    CaseLabel,
    ConstValue,
    DirectiveArgs,
    /// The whole input (expression target).
    TopLevel,
}

/// Result of closing an expression context.
#[derive(Debug)]
enum Completed {
    Value(Expr),
    /// No token contributed to the expression.
    Empty,
    /// An error was already reported.
    Failed,
}

// ============================================================================
// Statement stack
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockRole {
    FunctionBody,
    Nested,
    SwitchBody,
}

/// Case labels collected while a switch body is open.
#[derive(Debug, Default)]
struct SwitchCases {
    cases: Vec<Case>,
    values: Vec<Value>,
    has_default: bool,
}

#[derive(Debug)]
struct PendingBlock {
    id: NodeId,
    loc: Location,
    role: BlockRole,
    statements: Vec<Stmt>,
    switch: Option<SwitchCases>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IfPhase {
    Open,
    Condition,
    Then,
    /// Then-branch bound; the next significant token decides whether an `else` follows.
    AwaitElse,
    Else,
}

/// Shared by `while` and `switch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderPhase {
    Open,
    Condition,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForPhase {
    Open,
    Clause(u8),
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForeachPhase {
    Open,
    /// Reading `key, value`; `comma` is true right after a `,`.
    Names { comma: bool },
    Collection,
    Body,
}

#[derive(Debug)]
enum PendingStmt {
    Block(PendingBlock),
    If {
        id: NodeId,
        loc: Location,
        phase: IfPhase,
        condition: Option<Expr>,
        then_branch: Option<Box<Stmt>>,
    },
    While {
        id: NodeId,
        loc: Location,
        phase: HeaderPhase,
        condition: Option<Expr>,
    },
    For {
        id: NodeId,
        loc: Location,
        phase: ForPhase,
        clauses: [Option<Expr>; 3],
    },
    Foreach {
        id: NodeId,
        loc: Location,
        phase: ForeachPhase,
        names: Vec<Ident>,
        collection: Option<Expr>,
    },
    Switch {
        id: NodeId,
        loc: Location,
        phase: HeaderPhase,
        subject: Option<Expr>,
    },
    KeywordCall {
        id: NodeId,
        loc: Location,
        keyword: CallKeyword,
    },
    /// `break`/`continue` waiting for `;`.
    Flow {
        id: NodeId,
        loc: Location,
        kind: FlowKind,
        target: FlowTarget,
    },
    /// `case` waiting for its value and `:`.
    CaseLabel { loc: Location },
    /// `default` waiting for `:`.
    DefaultLabel { loc: Location },
}

impl PendingStmt {
    /// Still reading its header: recovery discards it.
    fn in_header(&self) -> bool {
        match self {
            PendingStmt::Block(_) => false,
            PendingStmt::If { phase, .. } => matches!(phase, IfPhase::Open | IfPhase::Condition),
            PendingStmt::While { phase, .. } => *phase != HeaderPhase::Body,
            // A switch in its body phase is still waiting for `{`.
            PendingStmt::Switch { .. } => true,
            PendingStmt::For { phase, .. } => *phase != ForPhase::Body,
            PendingStmt::Foreach { phase, .. } => *phase != ForeachPhase::Body,
            PendingStmt::KeywordCall { .. }
            | PendingStmt::Flow { .. }
            | PendingStmt::CaseLabel { .. }
            | PendingStmt::DefaultLabel { .. } => true,
        }
    }

    /// Waiting for the statement that forms its body or branch.
    fn awaits_body(&self) -> bool {
        match self {
            PendingStmt::If { phase, .. } => matches!(phase, IfPhase::Then | IfPhase::Else),
            PendingStmt::While { phase, .. } => *phase == HeaderPhase::Body,
            PendingStmt::For { phase, .. } => *phase == ForPhase::Body,
            PendingStmt::Foreach { phase, .. } => *phase == ForeachPhase::Body,
            _ => false,
        }
    }

    /// The flow target this statement offers to `break`/`continue` inside its body.
    fn flow_target(&self) -> Option<FlowTarget> {
        match self {
            PendingStmt::While {
                id,
                phase: HeaderPhase::Body,
                ..
            }
            | PendingStmt::For {
                id,
                phase: ForPhase::Body,
                ..
            }
            | PendingStmt::Foreach {
                id,
                phase: ForeachPhase::Body,
                ..
            } => Some(FlowTarget {
                kind: TargetKind::Loop,
                id: *id,
            }),
            // The switch sits below its body block once `{` is read.
            PendingStmt::Switch {
                id,
                phase: HeaderPhase::Body,
                ..
            } => Some(FlowTarget {
                kind: TargetKind::Switch,
                id: *id,
            }),
            _ => None,
        }
    }

    /// Seal a body-awaiting statement with its body.
    ///
    /// ## Panics
    /// - If called on a statement that is not waiting for a body, or whose header slots are unfilled. The parser
    ///   only calls this after [`PendingStmt::awaits_body`] returned true.
    fn seal(self, body: Stmt) -> Stmt {
        let body = Box::new(body);
        match self {
            PendingStmt::If {
                id,
                loc,
                condition: Some(condition),
                then_branch: Some(then_branch),
                phase: IfPhase::Else,
            } => Stmt::If(IfStmt {
                id,
                loc,
                condition,
                then_branch,
                else_branch: Some(body),
            }),
            PendingStmt::While {
                id,
                loc,
                condition: Some(condition),
                ..
            } => Stmt::While(WhileStmt {
                id,
                loc,
                condition,
                body,
            }),
            PendingStmt::For {
                id,
                loc,
                clauses: [init, condition, step],
                ..
            } => Stmt::For(ForStmt {
                id,
                loc,
                init,
                condition,
                step,
                body,
            }),
            PendingStmt::Foreach {
                id,
                loc,
                mut names,
                collection: Some(collection),
                ..
            } if !names.is_empty() => {
                let value = names.remove(names.len() - 1);
                Stmt::Foreach(ForeachStmt {
                    id,
                    loc,
                    key: names.pop(),
                    value,
                    collection,
                    body,
                })
            }
            other => unreachable!("sealed a statement that was not waiting for a body: {other:?}"),
        }
    }
}
