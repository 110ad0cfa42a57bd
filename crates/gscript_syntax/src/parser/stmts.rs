/// Statement automaton (function bodies).
///
/// Open blocks and conditionals live on `self.stmts`. A conditional moves through its header phases as tokens
/// arrive, then waits for the one statement that forms its body. Finished statements are handed to
/// [`Parser::push_statement`], which folds them upward until an open block takes them.
///
/// ## Notes
/// - `if` without a known `else` stays on the stack in [`IfPhase::AwaitElse`] until the next significant token
///   shows whether an `else` follows. Any other token seals it and is re-delivered with [`TokenStream::defer`].
/// - Switch case labels are recorded as offsets into the body's statement list; the statement ranges they govern
///   are only computed when the body closes.

/// Next token expected by a statement that is still reading its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderStep {
    /// `(` after `if`, `while`, `for`, `foreach` or `switch`.
    OpenParen,
    ForeachNames { comma: bool },
    /// `{` after a switch condition.
    SwitchBrace,
    /// `;` after `break`/`continue`.
    FlowEnd,
    /// `:` after `default`.
    DefaultColon,
}

impl Parser {
    // ========================================================================
    // Dispatch
    // ========================================================================

    fn body_token(&mut self, token: &Token) {
        if matches!(
            self.stmts.last(),
            Some(PendingStmt::If {
                phase: IfPhase::AwaitElse,
                ..
            })
        ) {
            self.await_else(token);
            return;
        }
        if let Some(step) = self.header_step() {
            self.header_token(step, token);
            return;
        }
        self.statement_start(token);
    }

    fn header_step(&self) -> Option<HeaderStep> {
        match self.stmts.last()? {
            PendingStmt::If {
                phase: IfPhase::Open, ..
            }
            | PendingStmt::While {
                phase: HeaderPhase::Open,
                ..
            }
            | PendingStmt::Switch {
                phase: HeaderPhase::Open,
                ..
            }
            | PendingStmt::For {
                phase: ForPhase::Open, ..
            }
            | PendingStmt::Foreach {
                phase: ForeachPhase::Open,
                ..
            } => Some(HeaderStep::OpenParen),
            PendingStmt::Foreach {
                phase: ForeachPhase::Names { comma },
                ..
            } => Some(HeaderStep::ForeachNames { comma: *comma }),
            PendingStmt::Switch {
                phase: HeaderPhase::Body,
                ..
            } => Some(HeaderStep::SwitchBrace),
            PendingStmt::Flow { .. } => Some(HeaderStep::FlowEnd),
            PendingStmt::DefaultLabel { .. } => Some(HeaderStep::DefaultColon),
            _ => None,
        }
    }

    fn await_else(&mut self, token: &Token) {
        if token.is_keyword(KeywordId::Else, self.config.dialect.keyword_set) {
            if let Some(PendingStmt::If { phase, .. }) = self.stmts.last_mut() {
                *phase = IfPhase::Else;
            }
            return;
        }
        if let Some(PendingStmt::If {
            id,
            loc,
            condition: Some(condition),
            then_branch: Some(then_branch),
            ..
        }) = self.stmts.pop()
        {
            self.push_statement(Stmt::If(IfStmt {
                id,
                loc,
                condition,
                then_branch,
                else_branch: None,
            }));
        }
        self.stream.defer();
    }

    // ========================================================================
    // Headers
    // ========================================================================

    fn header_token(&mut self, step: HeaderStep, token: &Token) {
        match step {
            HeaderStep::OpenParen => {
                if !self.expect_terminator(token, '(', false) {
                    return;
                }
                let ctx = match self.stmts.last_mut() {
                    Some(PendingStmt::If { phase, .. }) => {
                        *phase = IfPhase::Condition;
                        Some(ExprContext::Condition)
                    }
                    Some(PendingStmt::While { phase, .. } | PendingStmt::Switch { phase, .. }) => {
                        *phase = HeaderPhase::Condition;
                        Some(ExprContext::Condition)
                    }
                    Some(PendingStmt::For { phase, .. }) => {
                        *phase = ForPhase::Clause(0);
                        Some(ExprContext::ForClause(0))
                    }
                    Some(PendingStmt::Foreach { phase, .. }) => {
                        *phase = ForeachPhase::Names { comma: false };
                        None
                    }
                    _ => None,
                };
                if let Some(ctx) = ctx {
                    self.begin_expression(ctx);
                }
            }
            HeaderStep::ForeachNames { comma } => self.foreach_name(comma, token),
            HeaderStep::SwitchBrace => {
                if self.expect_terminator(token, '{', false) {
                    let id = self.next_id();
                    self.stmts.push(PendingStmt::Block(PendingBlock {
                        id,
                        loc: token.loc,
                        role: BlockRole::SwitchBody,
                        statements: Vec::new(),
                        switch: Some(SwitchCases::default()),
                    }));
                }
            }
            HeaderStep::FlowEnd => {
                if !self.expect_terminator(token, ';', false) {
                    return;
                }
                if let Some(PendingStmt::Flow { id, loc, kind, target }) = self.stmts.pop() {
                    self.push_statement(Stmt::FlowControl(FlowControl { id, loc, kind, target }));
                }
            }
            HeaderStep::DefaultColon => {
                if !self.expect_terminator(token, ':', false) {
                    return;
                }
                if let Some(PendingStmt::DefaultLabel { loc }) = self.stmts.pop() {
                    self.add_case_label(CaseLabel::Default(loc), None, loc);
                }
            }
        }
    }

    /// `foreach (` [key `,`] value `in`
    fn foreach_name(&mut self, comma: bool, token: &Token) {
        let set = self.config.dialect.keyword_set;
        let count = match self.stmts.last() {
            Some(PendingStmt::Foreach { names, .. }) => names.len(),
            _ => return,
        };

        if token.kind == TokenKind::Identifier && token.keyword(set).is_none() {
            if count != 0 && !(comma && count == 1) {
                self.report(errors::unexpected(&token.describe(), "`,` or `in`", token.loc));
                self.resync(token);
                return;
            }
            let name = Ident::new(token.text.clone(), token.loc);
            if self.shadows_foreach_iterator(&name) {
                self.report(
                    Diagnostic::warning(format!("iterator `{}` shadows an enclosing foreach iterator", name.name), name.loc)
                        .with_len(name.name.len()),
                );
            }
            if let Some(PendingStmt::Foreach { phase, names, .. }) = self.stmts.last_mut() {
                names.push(name);
                *phase = ForeachPhase::Names { comma: false };
            }
        } else if token.is_symbol(',') && count == 1 && !comma {
            if let Some(PendingStmt::Foreach { phase, .. }) = self.stmts.last_mut() {
                *phase = ForeachPhase::Names { comma: true };
            }
        } else if token.is_keyword(KeywordId::In, set) && count > 0 && !comma {
            if let Some(PendingStmt::Foreach { phase, .. }) = self.stmts.last_mut() {
                *phase = ForeachPhase::Collection;
            }
            self.begin_expression(ExprContext::ForeachCollection);
        } else {
            let expected = if count == 0 || comma { "an iterator name" } else { "`,` or `in`" };
            self.report(errors::unexpected(&token.describe(), expected, token.loc));
            self.resync(token);
        }
    }

    fn shadows_foreach_iterator(&self, name: &Ident) -> bool {
        self.stmts.iter().any(|stmt| match stmt {
            PendingStmt::Foreach {
                phase: ForeachPhase::Body,
                names,
                ..
            } => names.iter().any(|n| n.matches(&name.name)),
            _ => false,
        })
    }

    // ========================================================================
    // Statement starts
    // ========================================================================

    fn statement_start(&mut self, token: &Token) {
        match token.symbol() {
            Some('{') => {
                let id = self.next_id();
                self.stmts.push(PendingStmt::Block(PendingBlock {
                    id,
                    loc: token.loc,
                    role: BlockRole::Nested,
                    statements: Vec::new(),
                    switch: None,
                }));
                return;
            }
            Some('}') => {
                self.close_brace(token);
                return;
            }
            Some(';') => {
                self.report(errors::stray_semicolon(token.loc));
                if self.stmts.last().is_some_and(PendingStmt::awaits_body) {
                    self.bind_empty_body(token.loc);
                }
                return;
            }
            _ => {}
        }
        if token.is_eof() {
            self.report(errors::unbalanced_braces(token.loc));
            return;
        }

        let loc = token.loc;
        match token.keyword(self.config.dialect.keyword_set) {
            Some(KeywordId::If) => {
                let id = self.next_id();
                self.stmts.push(PendingStmt::If {
                    id,
                    loc,
                    phase: IfPhase::Open,
                    condition: None,
                    then_branch: None,
                });
            }
            Some(KeywordId::While) => {
                let id = self.next_id();
                self.stmts.push(PendingStmt::While {
                    id,
                    loc,
                    phase: HeaderPhase::Open,
                    condition: None,
                });
            }
            Some(KeywordId::For) => {
                let id = self.next_id();
                self.stmts.push(PendingStmt::For {
                    id,
                    loc,
                    phase: ForPhase::Open,
                    clauses: [None, None, None],
                });
            }
            Some(KeywordId::Foreach) => {
                let id = self.next_id();
                self.stmts.push(PendingStmt::Foreach {
                    id,
                    loc,
                    phase: ForeachPhase::Open,
                    names: Vec::new(),
                    collection: None,
                });
            }
            Some(KeywordId::Switch) => {
                let id = self.next_id();
                self.stmts.push(PendingStmt::Switch {
                    id,
                    loc,
                    phase: HeaderPhase::Open,
                    subject: None,
                });
            }
            Some(KeywordId::Return) => self.keyword_statement(CallKeyword::Return, loc),
            Some(KeywordId::Wait) => self.keyword_statement(CallKeyword::Wait, loc),
            Some(KeywordId::WaitTillFrameEnd) => self.keyword_statement(CallKeyword::WaitTillFrameEnd, loc),
            Some(KeywordId::Breakpoint) => self.keyword_statement(CallKeyword::Breakpoint, loc),
            Some(KeywordId::Break) => self.flow_statement(FlowKind::Break, loc),
            Some(KeywordId::Continue) => self.flow_statement(FlowKind::Continue, loc),
            Some(keyword @ (KeywordId::Case | KeywordId::Default)) => {
                let in_switch = matches!(
                    self.stmts.last(),
                    Some(PendingStmt::Block(PendingBlock {
                        role: BlockRole::SwitchBody,
                        ..
                    }))
                );
                if !in_switch {
                    let spelling = keywords::as_str(keyword);
                    self.report(
                        Diagnostic::error(format!("`{spelling}` label outside of a switch body"), loc)
                            .with_len(spelling.len()),
                    );
                    self.enter_recovery();
                } else if keyword == KeywordId::Case {
                    self.stmts.push(PendingStmt::CaseLabel { loc });
                    self.begin_expression(ExprContext::CaseLabel);
                } else {
                    self.stmts.push(PendingStmt::DefaultLabel { loc });
                }
            }
            Some(KeywordId::Else) => {
                self.report(Diagnostic::error("`else` without a matching `if`", loc).with_len(4));
                self.enter_recovery();
            }
            _ => {
                self.begin_expression(ExprContext::Statement);
                self.feed_expression(token);
            }
        }
    }

    fn keyword_statement(&mut self, keyword: CallKeyword, loc: Location) {
        let id = self.next_id();
        self.stmts.push(PendingStmt::KeywordCall { id, loc, keyword });
        self.begin_expression(ExprContext::KeywordArg);
    }

    fn flow_statement(&mut self, kind: FlowKind, loc: Location) {
        let target = self
            .stmts
            .iter()
            .rev()
            .filter_map(PendingStmt::flow_target)
            .find(|target| kind == FlowKind::Break || target.kind == TargetKind::Loop);
        let Some(target) = target else {
            let message = match kind {
                FlowKind::Break => "`break` outside of a loop or switch",
                FlowKind::Continue => "`continue` outside of a loop",
            };
            self.report(Diagnostic::error(message, loc));
            self.enter_recovery();
            return;
        };
        let id = self.next_id();
        self.stmts.push(PendingStmt::Flow { id, loc, kind, target });
    }

    // ========================================================================
    // Completion
    // ========================================================================

    fn close_brace(&mut self, token: &Token) {
        match self.stmts.last() {
            Some(PendingStmt::Block(_)) => self.close_block(token),
            Some(top) if top.awaits_body() => {
                self.report(errors::unexpected("`}`", "a statement", token.loc));
                self.bind_empty_body(token.loc);
                self.stream.defer();
            }
            _ => {
                self.report(errors::unexpected("`}`", "a statement", token.loc));
            }
        }
    }

    /// Give a body-awaiting statement an empty block so it can be sealed.
    fn bind_empty_body(&mut self, loc: Location) {
        let id = self.next_id();
        self.push_statement(Stmt::Block(Block {
            id,
            loc,
            statements: Vec::new(),
        }));
    }

    /// Fold a finished statement into the stack: bind it as a pending body, sealing as many levels as it completes.
    fn push_statement(&mut self, stmt: Stmt) {
        let mut stmt = stmt;
        loop {
            match self.stmts.last_mut() {
                Some(PendingStmt::Block(block)) => {
                    let before_first_case = block.switch.as_ref().is_some_and(|s| s.cases.is_empty());
                    if !before_first_case {
                        block.statements.push(stmt);
                        return;
                    }
                    self.report(Diagnostic::error("statement before the first `case` label", stmt.loc()));
                    return;
                }
                Some(PendingStmt::If {
                    phase, then_branch, ..
                }) if *phase == IfPhase::Then => {
                    *then_branch = Some(Box::new(stmt));
                    *phase = IfPhase::AwaitElse;
                    return;
                }
                Some(top) if top.awaits_body() => {
                    let Some(top) = self.stmts.pop() else {
                        return;
                    };
                    stmt = top.seal(stmt);
                }
                // The construct that would own the statement was discarded by recovery.
                _ => return,
            }
        }
    }

    fn close_block(&mut self, token: &Token) {
        let Some(PendingStmt::Block(block)) = self.stmts.pop() else {
            return;
        };
        match block.role {
            BlockRole::Nested => self.push_statement(Stmt::Block(Block {
                id: block.id,
                loc: block.loc,
                statements: block.statements,
            })),
            BlockRole::SwitchBody => self.close_switch(block, token),
            BlockRole::FunctionBody => {
                let body = Block {
                    id: block.id,
                    loc: block.loc,
                    statements: block.statements,
                };
                self.stmts.clear();
                self.mode = Mode::Root(RootPhase::Idle);
                if let Some(header) = self.header.take() {
                    self.define_function(header.into_def(Some(body)));
                }
            }
        }
    }

    fn close_switch(&mut self, block: PendingBlock, token: &Token) {
        let Some(PendingStmt::Switch {
            id,
            loc,
            subject: Some(subject),
            ..
        }) = self.stmts.pop()
        else {
            return;
        };

        let statements = block.statements;
        let mut cases = block.switch.map(|s| s.cases).unwrap_or_default();
        let ends: Vec<usize> = cases
            .iter()
            .skip(1)
            .map(|case| case.offset)
            .chain(std::iter::once(statements.len()))
            .collect();
        for (case, end) in cases.iter_mut().zip(ends) {
            case.range = case.offset..end;
        }

        if cases.is_empty() {
            self.report(Diagnostic::warning("empty switch", loc).with_len(6));
        }
        if let Some(Stmt::FlowControl(flow)) = statements.last() {
            if flow.kind == FlowKind::Break && flow.target.id == id {
                self.report(
                    Diagnostic::warning("redundant `break` at the end of a switch", flow.loc)
                        .with_len(5)
                        .with_note(format!("the switch ends at {}", token.loc)),
                );
            }
        }

        self.push_statement(Stmt::Switch(SwitchStmt {
            id,
            loc,
            subject,
            body: Block {
                id: block.id,
                loc: block.loc,
                statements,
            },
            cases,
        }));
    }

    /// Record a label at the current end of the innermost switch body.
    fn add_case_label(&mut self, label: CaseLabel, value: Option<Value>, loc: Location) {
        let allow_default_with_case = self.config.allow_default_with_case;
        let Some(PendingStmt::Block(PendingBlock {
            statements,
            switch: Some(switch),
            ..
        })) = self.stmts.last_mut()
        else {
            return;
        };

        let offset = statements.len();
        let group = switch.cases.last_mut().filter(|case| case.offset == offset);
        let group_has_value = group
            .as_ref()
            .is_some_and(|case| case.labels.iter().any(|l| matches!(l, CaseLabel::Value(_))));
        let group_has_default = group.as_ref().is_some_and(|case| case.is_default());

        let problem = match &label {
            CaseLabel::Default(_) if switch.has_default => Some(Diagnostic::error("duplicate `default` label", loc)),
            CaseLabel::Default(_) if group_has_value && !allow_default_with_case => Some(default_with_case(loc)),
            CaseLabel::Value(_) if group_has_default && !allow_default_with_case => Some(default_with_case(loc)),
            CaseLabel::Value(_) => value.as_ref().and_then(|value| {
                switch
                    .values
                    .contains(value)
                    .then(|| Diagnostic::error(format!("duplicate case value `{value}`"), loc))
            }),
            CaseLabel::Default(_) => None,
        };
        if let Some(problem) = problem {
            self.report(problem);
            return;
        }

        if matches!(label, CaseLabel::Default(_)) {
            switch.has_default = true;
        }
        if let Some(value) = value {
            switch.values.push(value);
        }
        match group {
            Some(case) => case.labels.push(label),
            None => switch.cases.push(Case {
                loc,
                offset,
                labels: vec![label],
                range: offset..offset,
            }),
        }
    }

    // ========================================================================
    // Expression owners
    // ========================================================================

    fn statement_expression_done(&mut self, completed: Completed, token: &Token) {
        match completed {
            Completed::Value(expr) => {
                let effective = expr.is_statement_kind();
                if !effective {
                    let text = expr.to_string();
                    self.report(errors::no_effect(&text, expr.loc()));
                }
                if self.expect_terminator(token, ';', false) && effective {
                    let id = self.next_id();
                    self.push_statement(Stmt::Expr(ExprStmt {
                        id,
                        loc: expr.loc(),
                        expr,
                    }));
                }
            }
            Completed::Empty => {
                self.report(errors::unexpected(&token.describe(), "a statement", token.loc));
                self.resync(token);
            }
            Completed::Failed => {
                self.expect_terminator(token, ';', true);
            }
        }
    }

    fn condition_done(&mut self, completed: Completed, token: &Token) {
        let failed = matches!(completed, Completed::Failed);
        let condition = match completed {
            Completed::Value(expr) => Some(expr),
            Completed::Empty => {
                self.report(Diagnostic::error("expected a condition", token.loc));
                None
            }
            Completed::Failed => None,
        };
        if !self.expect_terminator(token, ')', failed) {
            return;
        }
        let condition = match condition {
            Some(condition) => condition,
            None => self.placeholder(token.loc),
        };
        match self.stmts.last_mut() {
            Some(PendingStmt::If {
                phase, condition: slot, ..
            }) => {
                *slot = Some(condition);
                *phase = IfPhase::Then;
            }
            Some(PendingStmt::While {
                phase, condition: slot, ..
            })
            | Some(PendingStmt::Switch {
                phase, subject: slot, ..
            }) => {
                *slot = Some(condition);
                *phase = HeaderPhase::Body;
            }
            _ => {}
        }
    }

    fn for_clause_done(&mut self, index: u8, completed: Completed, token: &Token) {
        let last = index == 2;
        let expected = if last { ')' } else { ';' };
        let failed = matches!(completed, Completed::Failed);
        if !self.expect_terminator(token, expected, failed) {
            return;
        }
        let clause = match completed {
            Completed::Value(expr) => Some(expr),
            Completed::Empty | Completed::Failed => None,
        };
        if let Some(PendingStmt::For { phase, clauses, .. }) = self.stmts.last_mut() {
            clauses[usize::from(index)] = clause;
            *phase = if last { ForPhase::Body } else { ForPhase::Clause(index + 1) };
        }
        if !last {
            self.begin_expression(ExprContext::ForClause(index + 1));
        }
    }

    fn foreach_collection_done(&mut self, completed: Completed, token: &Token) {
        let failed = matches!(completed, Completed::Failed);
        let collection = match completed {
            Completed::Value(expr) => Some(expr),
            Completed::Empty => {
                self.report(Diagnostic::error("expected a collection after `in`", token.loc));
                None
            }
            Completed::Failed => None,
        };
        if !self.expect_terminator(token, ')', failed) {
            return;
        }
        let collection = match collection {
            Some(collection) => collection,
            None => self.placeholder(token.loc),
        };
        if let Some(PendingStmt::Foreach {
            phase, collection: slot, ..
        }) = self.stmts.last_mut()
        {
            *slot = Some(collection);
            *phase = ForeachPhase::Body;
        }
    }

    fn keyword_argument_done(&mut self, completed: Completed, token: &Token) {
        let Some(PendingStmt::KeywordCall { id, loc, keyword }) = self.stmts.pop() else {
            return;
        };
        let failed = matches!(completed, Completed::Failed);
        if !self.expect_terminator(token, ';', failed) || failed {
            return;
        }
        let argument = match completed {
            Completed::Value(expr) => Some(expr),
            Completed::Empty | Completed::Failed => None,
        };

        let problem = match (keyword, &argument) {
            (CallKeyword::Wait, None) => Some(Diagnostic::error("`wait` needs a duration", loc).with_len(4)),
            (CallKeyword::WaitTillFrameEnd | CallKeyword::Breakpoint, Some(arg)) => {
                Some(Diagnostic::error(format!("`{keyword}` takes no argument"), arg.loc()))
            }
            _ => None,
        };
        if let Some(problem) = problem {
            self.report(problem);
            return;
        }
        self.push_statement(Stmt::KeywordCall(KeywordCall {
            id,
            loc,
            keyword,
            argument,
        }));
    }

    fn case_label_done(&mut self, completed: Completed, token: &Token) {
        let Some(PendingStmt::CaseLabel { loc }) = self.stmts.pop() else {
            return;
        };
        let failed = matches!(completed, Completed::Failed);
        if !self.expect_terminator(token, ':', failed) {
            return;
        }
        let expr = match completed {
            Completed::Value(expr) => expr,
            Completed::Empty => {
                self.report(Diagnostic::error("expected a case value", token.loc));
                return;
            }
            Completed::Failed => return,
        };
        let value = match const_eval::evaluate(&expr, &self.constants) {
            Ok(value) => Some(value),
            Err(err) => {
                self.report(
                    Diagnostic::error(format!("case label `{expr}` is not a constant"), expr.loc())
                        .with_note(err.to_string()),
                );
                None
            }
        };
        self.add_case_label(CaseLabel::Value(expr), value, loc);
    }
}

fn default_with_case(loc: Location) -> Diagnostic {
    Diagnostic::error("`default` grouped with `case` labels", loc)
        .with_hint("give `default` its own statements, or enable `allow_default_with_case`")
}
