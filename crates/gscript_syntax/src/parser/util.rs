/// Parser utilities: diagnostic reporting, node ids and error recovery.
///
/// ## Notes
/// - Recovery never rewinds the stream. It skips forward and, when it stops *before* a token (a `{`, `}`, statement
///   keyword or end of input), re-delivers that token with [`TokenStream::defer`].

impl Parser {
    /// Record a diagnostic. `break_on_first_error` promotes errors to fatal; a fatal diagnostic halts the session.
    fn report(&mut self, mut diagnostic: Diagnostic) {
        if diagnostic.severity == Severity::Error && self.config.break_on_first_error {
            diagnostic.severity = Severity::Fatal;
        }
        match diagnostic.severity {
            Severity::Warning => {
                tracing::debug!(message = %diagnostic.message, loc = %diagnostic.location, "parse warning");
                self.warnings.push(diagnostic);
            }
            Severity::Error => {
                tracing::debug!(message = %diagnostic.message, loc = %diagnostic.location, "parse error");
                self.errors.push(diagnostic);
            }
            Severity::Fatal => {
                tracing::debug!(message = %diagnostic.message, loc = %diagnostic.location, "fatal parse error");
                self.errors.push(diagnostic);
                self.halted = true;
            }
        }
    }

    fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Stand-in for an expression that failed to parse, so the enclosing construct can still be sealed.
    fn placeholder(&mut self, loc: Location) -> Expr {
        let id = self.next_id();
        Expr::Constant(Constant::new(id, loc, ConstantKind::Undefined, "undefined"))
    }

    // ========================================================================
    // Recovery
    // ========================================================================

    /// Start skipping tokens after an error, according to the current mode.
    fn enter_recovery(&mut self) {
        self.clear_expression();
        match self.mode {
            Mode::Body => {
                // Half-read headers cannot be completed; bodies and blocks stay open.
                while self.stmts.last().is_some_and(PendingStmt::in_header) {
                    self.stmts.pop();
                }
                self.recovery = Some(Recovery::Statement);
            }
            Mode::Root(_) => {
                self.mode = Mode::Root(RootPhase::Idle);
                self.header = None;
                self.recovery = Some(Recovery::Root { depth: 0 });
            }
            Mode::Expression | Mode::ExpressionEnd => self.mode = Mode::Done,
            Mode::Done => {}
        }
    }

    /// Enter recovery and let the offending token take part in it.
    fn resync(&mut self, token: &Token) {
        self.enter_recovery();
        if let Some(recovery) = self.recovery {
            self.recover_token(recovery, token);
        }
    }

    fn recover_token(&mut self, recovery: Recovery, token: &Token) {
        match recovery {
            Recovery::Statement => {
                if token.is_symbol(';') {
                    self.recovery = None;
                } else if token.is_symbol('{') || token.is_symbol('}') || token.is_eof() || self.is_sync_keyword(token)
                {
                    self.recovery = None;
                    self.stream.defer();
                }
            }
            Recovery::Root { depth } => {
                if token.is_eof() {
                    self.recovery = None;
                    self.stream.defer();
                } else if token.is_symbol('{') {
                    self.recovery = Some(Recovery::Root { depth: depth + 1 });
                } else if token.is_symbol('}') {
                    self.recovery = if depth <= 1 {
                        None
                    } else {
                        Some(Recovery::Root { depth: depth - 1 })
                    };
                } else if token.is_symbol(';') && depth == 0 {
                    self.recovery = None;
                }
            }
        }
    }

    /// Keywords that begin a fresh statement. `else`, `case` and `default` are excluded: they only continue an
    /// enclosing construct, so resuming on them after an error would fail again on the same token.
    fn is_sync_keyword(&self, token: &Token) -> bool {
        token
            .keyword(self.config.dialect.keyword_set)
            .is_some_and(|k| keywords::starts_statement(k) && !matches!(k, KeywordId::Else | KeywordId::Case | KeywordId::Default))
    }

    /// Check that `token` is the symbol `expected`. Otherwise report (unless `quiet`) and resynchronize on it.
    fn expect_terminator(&mut self, token: &Token, expected: char, quiet: bool) -> bool {
        if token.is_symbol(expected) {
            return true;
        }
        if !quiet {
            let diagnostic = if expected == ';' {
                errors::missing_semicolon(token.loc)
            } else {
                errors::unexpected(&token.describe(), &format!("`{expected}`"), token.loc)
            };
            self.report(diagnostic);
        }
        self.resync(token);
        false
    }
}
