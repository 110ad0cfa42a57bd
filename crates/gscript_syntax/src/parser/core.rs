/// Parser core types and the step loop.
///
/// This chunk defines [`ParserConfig`], the [`Parser`] session type, its step/finish lifecycle and the dispatcher
/// that routes each significant token to the expression automaton, the statement automaton or the root-declaration
/// handlers.
///
/// ## Notes
/// - This file is `include!`'d into `crate::parser` to keep all parser methods in a single module while avoiding a
///   single "god file".

// ============================================================================
// CONFIGURATION
// ============================================================================

/// What one parse session produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseTarget {
    /// A whole source file.
    #[default]
    Module,
    /// Exactly one function definition.
    Function,
    /// Exactly one expression, optionally followed by `;`.
    Expression,
}

/// Parser configuration.
///
/// ## Examples
///
/// ```rust
/// use gscript_syntax::parser::{ParseTarget, ParserConfig};
///
/// let config = ParserConfig::new()
///     .with_target(ParseTarget::Function)
///     .with_assignment_expressions(true);
/// assert!(config.allow_assignment_expressions);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParserConfig {
    pub target: ParseTarget,
    /// Lexical dialect; the parser reads its keyword set.
    pub dialect: Dialect,
    /// Accept assignments outside statement position (`a = b = 1`, `f(a = 1)`).
    pub allow_assignment_expressions: bool,
    /// Accept `default` sharing an offset with `case` labels.
    pub allow_default_with_case: bool,
    /// Turn the first error into a fatal one.
    pub break_on_first_error: bool,
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: ParseTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_assignment_expressions(mut self, allow: bool) -> Self {
        self.allow_assignment_expressions = allow;
        self
    }

    pub fn with_default_with_case(mut self, allow: bool) -> Self {
        self.allow_default_with_case = allow;
        self
    }

    pub fn with_break_on_first_error(mut self, enabled: bool) -> Self {
        self.break_on_first_error = enabled;
        self
    }
}

// ============================================================================
// SESSION OUTPUT
// ============================================================================

/// Whether a session can take more steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Finished,
}

/// Everything a finished session produced.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    /// The graph, when the session reached the end of input without halting.
    pub syntax: Option<Syntax>,
    pub warnings: Vec<Diagnostic>,
    /// Errors and fatal errors, in the order they were raised.
    pub errors: Vec<Diagnostic>,
    /// A fatal error stopped the session early.
    pub halted: bool,
}

impl ParseOutput {
    /// A graph was produced and no error was recorded.
    pub fn is_success(&self) -> bool {
        self.syntax.is_some() && self.errors.is_empty()
    }
}

// ============================================================================
// PARSER STATE
// ============================================================================

/// Top-level mode of the session.
#[derive(Debug)]
enum Mode {
    Root(RootPhase),
    /// Inside a function body: the statement automaton owns the tokens.
    Body,
    /// Expression target, before the expression starts.
    Expression,
    /// Expression target, after `;`: only end of input may follow.
    ExpressionEnd,
    Done,
}

/// Token skipping after a non-fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recovery {
    /// Skip to `;`; stop before `{`, `}`, statement keywords and end of input.
    Statement,
    /// Skip to `;` at depth 0 or to the `}` that closes everything opened while skipping.
    Root { depth: usize },
}

/// Incremental, step-driven parser session.
///
/// ## Notes
/// - One call to [`Parser::step`] consumes exactly one token (or re-delivers a deferred one).
/// - All working state is private to the session; dropping the parser cancels the parse.
pub struct Parser {
    stream: TokenStream,
    config: ParserConfig,
    mode: Mode,
    recovery: Option<Recovery>,

    // Expression automaton
    exprs: Vec<PendingExpr>,
    slot: Option<Expr>,
    expr_ctx: Option<ExprContext>,
    /// A token contributed to the current expression.
    expr_started: bool,

    // Statement automaton
    stmts: Vec<PendingStmt>,

    // Root state
    module: Module,
    /// Folded `const` values, keyed by lowercase name.
    constants: HashMap<String, Value>,
    header: Option<FunctionHeader>,
    output: Option<Syntax>,

    warnings: Vec<Diagnostic>,
    errors: Vec<Diagnostic>,
    halted: bool,
    next_id: u32,
}

impl Parser {
    /// Create a session over a token sequence.
    ///
    /// ## Parameters
    /// - `tokens`: produced by [`crate::lexer::lex`]; a trailing `Eof` is added when missing.
    /// - `config`: target and language options.
    pub fn new(tokens: Vec<Token>, config: ParserConfig) -> Self {
        let mode = match config.target {
            ParseTarget::Module | ParseTarget::Function => Mode::Root(RootPhase::Idle),
            ParseTarget::Expression => Mode::Expression,
        };
        Self {
            stream: TokenStream::new(tokens),
            config,
            mode,
            recovery: None,
            exprs: Vec::new(),
            slot: None,
            expr_ctx: None,
            expr_started: false,
            stmts: Vec::new(),
            module: Module::default(),
            constants: HashMap::new(),
            header: None,
            output: None,
            warnings: Vec::new(),
            errors: Vec::new(),
            halted: false,
            next_id: 0,
        }
    }

    /// Consume one token.
    ///
    /// ## Returns
    /// - [`StepOutcome::Finished`] once the end of input was processed or a fatal error halted the session; further
    ///   calls are no-ops.
    pub fn step(&mut self) -> StepOutcome {
        if self.is_finished() {
            return StepOutcome::Finished;
        }

        let token = self.stream.read(false).clone();
        if token.is_trivia() {
            return StepOutcome::Continue;
        }
        tracing::trace!(kind = ?token.kind, text = %token.text, loc = %token.loc, "step");

        self.dispatch(token);

        if self.halted {
            tracing::warn!(errors = self.errors.len(), "parse session halted");
        }
        if self.is_finished() {
            StepOutcome::Finished
        } else {
            StepOutcome::Continue
        }
    }

    /// Step until the session finishes.
    pub fn run(&mut self) {
        while self.step() == StepOutcome::Continue {}
    }

    pub fn is_finished(&self) -> bool {
        self.halted || matches!(self.mode, Mode::Done)
    }

    /// Fraction of the token sequence consumed, in `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        self.stream.progress()
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// End the session and hand over its results.
    ///
    /// A session that has not reached the end of input (and did not halt) records an "incomplete" error and yields
    /// no graph.
    pub fn finish(mut self) -> ParseOutput {
        if !self.is_finished() {
            let loc = self.stream.peek().loc;
            self.errors
                .push(Diagnostic::error("parse session ended before the end of input", loc));
            self.output = None;
        }
        ParseOutput {
            syntax: if self.halted { None } else { self.output },
            warnings: self.warnings,
            errors: self.errors,
            halted: self.halted,
        }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    fn dispatch(&mut self, token: Token) {
        if let Some(recovery) = self.recovery {
            self.recover_token(recovery, &token);
            return;
        }

        if self.expr_ctx.is_some() {
            self.feed_expression(&token);
            return;
        }

        match std::mem::replace(&mut self.mode, Mode::Done) {
            Mode::Root(phase) => {
                self.mode = Mode::Root(RootPhase::Idle);
                self.root_token(phase, &token);
            }
            Mode::Body => {
                self.mode = Mode::Body;
                self.body_token(&token);
            }
            Mode::Expression => {
                self.mode = Mode::Expression;
                if token.is_eof() {
                    self.report(Diagnostic::error("expected an expression", token.loc));
                    self.mode = Mode::Done;
                } else {
                    self.begin_expression(ExprContext::TopLevel);
                    self.feed_expression(&token);
                }
            }
            Mode::ExpressionEnd => {
                if token.is_eof() {
                    self.mode = Mode::Done;
                } else {
                    self.report(errors::unexpected(&token.describe(), "end of input", token.loc));
                    self.mode = Mode::Done;
                }
            }
            Mode::Done => {}
        }
    }
}
