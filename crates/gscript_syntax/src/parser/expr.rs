/// Expression automaton.
///
/// This chunk implements the dual-stack operator-precedence machine: incomplete nodes live on `self.exprs`, the most
/// recently finished operand lives in `self.slot`. Every token either pushes a pending node, fills the slot, folds
/// pending operators into the slot, or terminates the expression so its owner (statement, condition, constant, ...)
/// can take it.
///
/// ## Notes
/// - Symbols arrive one character at a time. Multi-character operators, `::`, `[[` and `]]` are assembled through
///   [`TokenStream::read_consecutive_symbols`], so only adjacent characters ever combine.
/// - Binary operators fold while the stack top binds at least as tightly (left associativity). Assignment never
///   folds early, which makes it right-associative.

/// What the expression automaton did with a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExprFlow {
    Consumed,
    /// The token does not belong to the expression; the owner receives it with the finished expression.
    Terminated,
}

impl Parser {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    fn begin_expression(&mut self, ctx: ExprContext) {
        self.expr_ctx = Some(ctx);
        self.expr_started = false;
        self.exprs.clear();
        self.slot = None;
    }

    fn clear_expression(&mut self) {
        self.expr_ctx = None;
        self.expr_started = false;
        self.exprs.clear();
        self.slot = None;
    }

    fn feed_expression(&mut self, token: &Token) {
        let Some(ctx) = self.expr_ctx else {
            return;
        };
        match self.expression_token(ctx, token) {
            ExprFlow::Consumed => {}
            ExprFlow::Terminated => {
                let completed = self.finish_expression(token);
                self.expression_done(ctx, completed, token);
            }
        }
    }

    /// Abandon the current expression after a mid-expression error and resynchronize.
    fn expr_fail(&mut self, diagnostic: Diagnostic, token: &Token) -> ExprFlow {
        self.report(diagnostic);
        self.clear_expression();
        self.resync(token);
        ExprFlow::Consumed
    }

    /// Close the expression at `terminator`: fold every pending operator and check nothing is left open.
    fn finish_expression(&mut self, terminator: &Token) -> Completed {
        let started = std::mem::take(&mut self.expr_started);
        self.expr_ctx = None;

        if let Err(diagnostic) = self.fold_operators(terminator) {
            self.report(diagnostic);
            self.clear_expression();
            return Completed::Failed;
        }
        if let Some(open) = self.exprs.last() {
            let diagnostic = Diagnostic::error(open.describe(), terminator.loc)
                .with_note(format!("the expression ended at {}", terminator.describe()));
            self.report(diagnostic);
            self.clear_expression();
            return Completed::Failed;
        }
        match self.slot.take() {
            Some(expr) => Completed::Value(expr),
            None if started => Completed::Failed,
            None => Completed::Empty,
        }
    }

    /// Hand a finished expression to the construct that started it.
    fn expression_done(&mut self, ctx: ExprContext, completed: Completed, token: &Token) {
        match ctx {
            ExprContext::Statement => self.statement_expression_done(completed, token),
            ExprContext::Condition => self.condition_done(completed, token),
            ExprContext::ForClause(index) => self.for_clause_done(index, completed, token),
            ExprContext::ForeachCollection => self.foreach_collection_done(completed, token),
            ExprContext::KeywordArg => self.keyword_argument_done(completed, token),
            ExprContext::CaseLabel => self.case_label_done(completed, token),
            ExprContext::ConstValue => self.const_value_done(completed, token),
            ExprContext::DirectiveArgs => self.directive_argument_done(completed, token),
            ExprContext::TopLevel => self.top_level_done(completed, token),
        }
    }

    fn top_level_done(&mut self, completed: Completed, token: &Token) {
        match completed {
            Completed::Value(expr) => self.output = Some(Syntax::Expression(expr)),
            Completed::Empty => self.report(Diagnostic::error("expected an expression", token.loc)),
            Completed::Failed => {}
        }
        if token.is_symbol(';') {
            self.mode = Mode::ExpressionEnd;
        } else {
            if !token.is_eof() {
                self.report(errors::unexpected(&token.describe(), "`;` or end of input", token.loc));
            }
            self.mode = Mode::Done;
        }
    }

    // ========================================================================
    // Token handlers
    // ========================================================================

    fn expression_token(&mut self, ctx: ExprContext, token: &Token) -> ExprFlow {
        let flow = match token.kind {
            TokenKind::Identifier => self.expr_identifier(token),
            TokenKind::Number => {
                let kind = if token.text.contains('.') {
                    ConstantKind::Float
                } else {
                    ConstantKind::Integer
                };
                self.expr_literal(kind, token)
            }
            TokenKind::String => self.expr_literal(ConstantKind::String, token),
            TokenKind::MetaString => self.expr_literal(ConstantKind::LocalizedString, token),
            TokenKind::ResourceVar => self.expr_literal(ConstantKind::Resource, token),
            TokenKind::Symbol => self.expr_symbol(ctx, token),
            TokenKind::Eof | TokenKind::Comment | TokenKind::WhiteSpace => ExprFlow::Terminated,
        };
        if flow == ExprFlow::Consumed && self.expr_ctx.is_some() {
            self.expr_started = true;
        }
        flow
    }

    fn top_kind(&self) -> Option<PendingKind> {
        self.exprs.last().map(PendingExpr::kind)
    }

    /// A callee (name, `::name`, `[[`) may start here.
    fn callee_allowed(&self) -> bool {
        self.slot.is_none()
            && !self
                .top_kind()
                .is_some_and(|k| k.expects_name() || matches!(k, PendingKind::PointerReady | PendingKind::Path { .. }))
    }

    /// Any operand may start here.
    fn operand_allowed(&self) -> bool {
        self.callee_allowed() && self.top_kind() != Some(PendingKind::CallPrefix)
    }

    fn expr_literal(&mut self, kind: ConstantKind, token: &Token) -> ExprFlow {
        if !self.operand_allowed() {
            let expected = if self.slot.is_some() { "an operator" } else { "a function name" };
            return self.expr_fail(errors::unexpected(&token.describe(), expected, token.loc), token);
        }
        let id = self.next_id();
        self.slot = Some(Expr::Constant(Constant::new(id, token.loc, kind, token.text.clone())));
        ExprFlow::Consumed
    }

    fn expr_identifier(&mut self, token: &Token) -> ExprFlow {
        // After `.` any word is a member name, keywords included (`level.default`).
        let member_name = self.top_kind() == Some(PendingKind::Member);
        match token.keyword(self.config.dialect.keyword_set) {
            _ if member_name => {}
            Some(KeywordId::True | KeywordId::False) => return self.expr_literal(ConstantKind::Bool, token),
            Some(KeywordId::Undefined) => return self.expr_literal(ConstantKind::Undefined, token),
            Some(KeywordId::Thread) => return self.expr_modifier(CallModifier::Thread, token),
            Some(KeywordId::ChildThread) => return self.expr_modifier(CallModifier::ChildThread, token),
            Some(_) => return ExprFlow::Terminated,
            None => {}
        }

        let ident = Ident::new(token.text.clone(), token.loc);
        match self.top_kind() {
            Some(PendingKind::Member) => {
                if let Some(PendingExpr::Member { target }) = self.exprs.pop() {
                    let id = self.next_id();
                    let loc = target.loc();
                    self.slot = Some(Expr::Reference(Reference {
                        id,
                        loc,
                        kind: ReferenceKind::Accessor { target, member: ident },
                    }));
                }
            }
            Some(PendingKind::Path { awaiting: true }) => {
                if let Some(PendingExpr::Path { segments, awaiting, .. }) = self.exprs.last_mut() {
                    segments.push(ident);
                    *awaiting = false;
                }
            }
            Some(PendingKind::Qualified) => {
                if let Some(PendingExpr::Qualified { loc, qualifier }) = self.exprs.pop() {
                    let id = self.next_id();
                    self.slot = Some(Expr::Reference(Reference {
                        id,
                        loc,
                        kind: ReferenceKind::Function(FunctionRef { name: ident, qualifier }),
                    }));
                }
            }
            top if self.slot.is_some() => {
                // `self name(` : the finished expression becomes the call's self-expression.
                if matches!(top, Some(PendingKind::CallPrefix | PendingKind::PointerReady | PendingKind::Path { .. })) {
                    return self.expr_fail(errors::unexpected(&token.describe(), "`(`", token.loc), token);
                }
                let self_expr = self.slot.take().map(Box::new);
                let loc = self_expr.as_ref().map_or(token.loc, |e| e.loc());
                self.exprs.push(PendingExpr::CallPrefix {
                    loc,
                    prefix: CallPrefix {
                        self_expr,
                        modifier: None,
                    },
                });
                self.set_variable(ident);
            }
            _ => {
                if !self.callee_allowed() {
                    return self.expr_fail(errors::unexpected(&token.describe(), "`(`", token.loc), token);
                }
                self.set_variable(ident);
            }
        }
        ExprFlow::Consumed
    }

    fn set_variable(&mut self, ident: Ident) {
        let id = self.next_id();
        self.slot = Some(Expr::Reference(Reference {
            id,
            loc: ident.loc,
            kind: ReferenceKind::Variable(ident),
        }));
    }

    fn expr_modifier(&mut self, modifier: CallModifier, token: &Token) -> ExprFlow {
        if self.slot.is_some() {
            if self.top_kind() == Some(PendingKind::CallPrefix) {
                return self.expr_fail(errors::unexpected(&token.describe(), "`(`", token.loc), token);
            }
            let self_expr = self.slot.take().map(Box::new);
            let loc = self_expr.as_ref().map_or(token.loc, |e| e.loc());
            self.exprs.push(PendingExpr::CallPrefix {
                loc,
                prefix: CallPrefix {
                    self_expr,
                    modifier: Some(modifier),
                },
            });
            return ExprFlow::Consumed;
        }

        if let Some(PendingExpr::CallPrefix { prefix, .. }) = self.exprs.last_mut() {
            if prefix.modifier.is_some() {
                let diagnostic = Diagnostic::error(format!("duplicate call modifier `{modifier}`"), token.loc)
                    .with_hint("a call takes at most one of `thread` and `childthread`");
                return self.expr_fail(diagnostic, token);
            }
            prefix.modifier = Some(modifier);
            return ExprFlow::Consumed;
        }

        if !self.operand_allowed() {
            return self.expr_fail(errors::unexpected(&token.describe(), "an identifier", token.loc), token);
        }
        self.exprs.push(PendingExpr::CallPrefix {
            loc: token.loc,
            prefix: CallPrefix {
                self_expr: None,
                modifier: Some(modifier),
            },
        });
        ExprFlow::Consumed
    }

    fn expr_symbol(&mut self, ctx: ExprContext, token: &Token) -> ExprFlow {
        let Some(c) = token.symbol() else {
            return ExprFlow::Terminated;
        };

        match self.top_kind() {
            Some(kind) if kind.expects_name() => {
                return self.expr_fail(errors::unexpected(&token.describe(), "an identifier", token.loc), token);
            }
            Some(PendingKind::Path { awaiting: false }) if c != '\\' && c != ':' => {
                return self.expr_fail(errors::unexpected(&token.describe(), "`::`", token.loc), token);
            }
            Some(PendingKind::PointerReady) if c != '(' => {
                return self.expr_fail(errors::unexpected(&token.describe(), "`(`", token.loc), token);
            }
            _ => {}
        }

        match c {
            '(' => self.expr_open_paren(token),
            ')' => self.expr_close_paren(token),
            ',' => self.expr_comma(token),
            '[' => self.expr_open_bracket(token),
            ']' => self.expr_close_bracket(token),
            '.' => self.expr_member(token),
            '\\' => self.expr_path_separator(token),
            ':' => self.expr_colon(token),
            c if operators::SPELLING_CHARS.contains(c) => self.expr_operator(ctx, c, token),
            // `;`, `{`, `}`, `?`, `#`
            _ => ExprFlow::Terminated,
        }
    }

    // ========================================================================
    // Brackets and lists
    // ========================================================================

    fn expr_open_paren(&mut self, token: &Token) -> ExprFlow {
        if self.top_kind() == Some(PendingKind::PointerReady) {
            if let Some(PendingExpr::PointerReady { loc, prefix, pointer }) = self.exprs.pop() {
                self.exprs.push(PendingExpr::Call {
                    loc,
                    prefix,
                    callee: Callee::Pointer(pointer),
                    args: Vec::new(),
                });
            }
            return ExprFlow::Consumed;
        }

        let Some(expr) = self.slot.take() else {
            if !self.operand_allowed() {
                return self.expr_fail(errors::unexpected(&token.describe(), "a function name", token.loc), token);
            }
            self.exprs.push(PendingExpr::Group {
                loc: token.loc,
                items: Vec::new(),
            });
            return ExprFlow::Consumed;
        };

        let callee_loc = expr.loc();
        let target = match expr {
            Expr::Reference(Reference {
                kind: ReferenceKind::Variable(name),
                ..
            }) => FunctionRef {
                name,
                qualifier: Qualifier::None,
            },
            Expr::Reference(Reference {
                kind: ReferenceKind::Function(target),
                ..
            }) => target,
            other => {
                let diagnostic = Diagnostic::error(format!("`{other}` is not callable"), other.loc())
                    .with_hint("call a function pointer with `[[pointer]](args)`");
                return self.expr_fail(diagnostic, token);
            }
        };

        let (loc, prefix) = match self.top_kind() {
            Some(PendingKind::CallPrefix) => match self.exprs.pop() {
                Some(PendingExpr::CallPrefix { loc, prefix }) => (loc, prefix),
                _ => (callee_loc, CallPrefix::default()),
            },
            _ => (callee_loc, CallPrefix::default()),
        };
        self.exprs.push(PendingExpr::Call {
            loc,
            prefix,
            callee: Callee::Function(target),
            args: Vec::new(),
        });
        ExprFlow::Consumed
    }

    fn expr_close_paren(&mut self, token: &Token) -> ExprFlow {
        if let Err(diagnostic) = self.fold_operators(token) {
            return self.expr_fail(diagnostic, token);
        }

        match self.top_kind() {
            None => ExprFlow::Terminated,
            Some(PendingKind::Group) => {
                let Some(PendingExpr::Group { loc, mut items }) = self.exprs.pop() else {
                    return ExprFlow::Consumed;
                };
                match self.slot.take() {
                    Some(item) => items.push(item),
                    None => {
                        let message = if items.is_empty() {
                            "empty parentheses"
                        } else {
                            "expected an expression before `)`"
                        };
                        return self.expr_fail(Diagnostic::error(message, token.loc), token);
                    }
                }
                let id = self.next_id();
                let sealed = match <[Expr; 3]>::try_from(items) {
                    Ok(items) => Expr::Truple(Truple {
                        id,
                        loc,
                        items: Box::new(items),
                    }),
                    Err(mut items) => {
                        if items.len() != 1 {
                            self.report(
                                Diagnostic::error("a truple takes exactly three items", loc)
                                    .with_note(format!("found {} items", items.len())),
                            );
                        }
                        Expr::Group(Group {
                            id,
                            loc,
                            inner: Box::new(items.swap_remove(0)),
                        })
                    }
                };
                self.slot = Some(sealed);
                ExprFlow::Consumed
            }
            Some(PendingKind::Call) => {
                let Some(PendingExpr::Call {
                    loc,
                    prefix,
                    callee,
                    mut args,
                }) = self.exprs.pop()
                else {
                    return ExprFlow::Consumed;
                };
                match self.slot.take() {
                    Some(arg) => args.push(arg),
                    None if !args.is_empty() => {
                        return self.expr_fail(Diagnostic::error("expected an argument after `,`", token.loc), token);
                    }
                    None => {}
                }
                let id = self.next_id();
                self.slot = Some(match callee {
                    Callee::Function(target) => Expr::Call(FunctionCall {
                        id,
                        loc,
                        self_expr: prefix.self_expr,
                        modifier: prefix.modifier,
                        target,
                        args,
                    }),
                    Callee::Pointer(pointer) => Expr::PointerCall(PointerCall {
                        id,
                        loc,
                        self_expr: prefix.self_expr,
                        modifier: prefix.modifier,
                        pointer,
                        args,
                    }),
                });
                ExprFlow::Consumed
            }
            Some(_) => self.expr_fail(errors::unexpected("`)`", "an expression", token.loc), token),
        }
    }

    fn expr_comma(&mut self, token: &Token) -> ExprFlow {
        if let Err(diagnostic) = self.fold_operators(token) {
            return self.expr_fail(diagnostic, token);
        }

        match self.top_kind() {
            None => ExprFlow::Terminated,
            Some(PendingKind::Group | PendingKind::Call | PendingKind::InlineArray) => {
                let Some(item) = self.slot.take() else {
                    return self.expr_fail(Diagnostic::error("expected an expression before `,`", token.loc), token);
                };
                let mut full_truple = false;
                if let Some(top) = self.exprs.last_mut() {
                    if top.fill(item).is_err() {
                        return ExprFlow::Consumed;
                    }
                    full_truple = matches!(top, PendingExpr::Group { items, .. } if items.len() == 3);
                }
                if full_truple {
                    // A fourth item can never form a valid expression.
                    self.report(errors::truple_overflow(token.loc));
                    self.clear_expression();
                }
                ExprFlow::Consumed
            }
            Some(_) => self.expr_fail(errors::unexpected("`,`", "an expression", token.loc), token),
        }
    }

    fn expr_open_bracket(&mut self, token: &Token) -> ExprFlow {
        let (_, doubled) = self.stream.read_consecutive_symbols("[", 1);
        if doubled == 1 {
            self.stream.discard(1);
            let (loc, prefix) = if let Some(self_expr) = self.slot.take() {
                if self.top_kind() == Some(PendingKind::CallPrefix) {
                    return self.expr_fail(errors::unexpected("`[[`", "`(`", token.loc), token);
                }
                (
                    self_expr.loc(),
                    CallPrefix {
                        self_expr: Some(Box::new(self_expr)),
                        modifier: None,
                    },
                )
            } else if self.top_kind() == Some(PendingKind::CallPrefix) {
                match self.exprs.pop() {
                    Some(PendingExpr::CallPrefix { loc, prefix }) => (loc, prefix),
                    _ => (token.loc, CallPrefix::default()),
                }
            } else if self.operand_allowed() {
                (token.loc, CallPrefix::default())
            } else {
                return self.expr_fail(errors::unexpected("`[[`", "an expression", token.loc), token);
            };
            self.exprs.push(PendingExpr::PointerCallee { loc, prefix });
            return ExprFlow::Consumed;
        }

        match self.slot.take() {
            Some(target) => self.exprs.push(PendingExpr::Indexer {
                target: Box::new(target),
            }),
            None if self.operand_allowed() => self.exprs.push(PendingExpr::InlineArray {
                loc: token.loc,
                items: Vec::new(),
            }),
            None => return self.expr_fail(errors::unexpected("`[`", "a function name", token.loc), token),
        }
        ExprFlow::Consumed
    }

    fn expr_close_bracket(&mut self, token: &Token) -> ExprFlow {
        if let Err(diagnostic) = self.fold_operators(token) {
            return self.expr_fail(diagnostic, token);
        }

        match self.top_kind() {
            None => ExprFlow::Terminated,
            Some(PendingKind::PointerCallee) => {
                let (_, doubled) = self.stream.read_consecutive_symbols("]", 1);
                if doubled != 1 {
                    return self.expr_fail(errors::unexpected("`]`", "`]]`", token.loc), token);
                }
                self.stream.discard(1);
                let Some(pointer) = self.slot.take() else {
                    return self.expr_fail(Diagnostic::error("expected a function pointer inside `[[ ]]`", token.loc), token);
                };
                if let Some(PendingExpr::PointerCallee { loc, prefix }) = self.exprs.pop() {
                    self.exprs.push(PendingExpr::PointerReady {
                        loc,
                        prefix,
                        pointer: Box::new(pointer),
                    });
                }
                ExprFlow::Consumed
            }
            Some(PendingKind::Indexer) => {
                let Some(index) = self.slot.take() else {
                    return self.expr_fail(Diagnostic::error("expected an index inside `[]`", token.loc), token);
                };
                if let Some(PendingExpr::Indexer { target }) = self.exprs.pop() {
                    let id = self.next_id();
                    let loc = target.loc();
                    self.slot = Some(Expr::Reference(Reference {
                        id,
                        loc,
                        kind: ReferenceKind::Indexer {
                            target,
                            index: Box::new(index),
                        },
                    }));
                }
                ExprFlow::Consumed
            }
            Some(PendingKind::InlineArray) => {
                let Some(PendingExpr::InlineArray { loc, mut items }) = self.exprs.pop() else {
                    return ExprFlow::Consumed;
                };
                match self.slot.take() {
                    Some(item) => items.push(item),
                    None if !items.is_empty() => {
                        return self.expr_fail(Diagnostic::error("expected an expression before `]`", token.loc), token);
                    }
                    None => {}
                }
                let id = self.next_id();
                self.slot = Some(Expr::InlineArray(InlineArray { id, loc, items }));
                ExprFlow::Consumed
            }
            Some(_) => self.expr_fail(errors::unexpected("`]`", "an expression", token.loc), token),
        }
    }

    // ========================================================================
    // Names: members, module paths, qualifiers
    // ========================================================================

    fn expr_member(&mut self, token: &Token) -> ExprFlow {
        match self.slot.take() {
            Some(target) => {
                self.exprs.push(PendingExpr::Member {
                    target: Box::new(target),
                });
                ExprFlow::Consumed
            }
            None => self.expr_fail(errors::unexpected("`.`", "an expression", token.loc), token),
        }
    }

    fn expr_path_separator(&mut self, token: &Token) -> ExprFlow {
        if let Some(PendingExpr::Path { awaiting, .. }) = self.exprs.last_mut() {
            if self.slot.is_none() && !*awaiting {
                *awaiting = true;
                return ExprFlow::Consumed;
            }
        }
        match self.slot.take() {
            Some(Expr::Reference(Reference {
                kind: ReferenceKind::Variable(first),
                loc,
                ..
            })) => {
                self.exprs.push(PendingExpr::Path {
                    loc,
                    segments: vec![first],
                    awaiting: true,
                });
                ExprFlow::Consumed
            }
            _ => self.expr_fail(errors::unexpected("`\\`", "a module path", token.loc), token),
        }
    }

    fn expr_colon(&mut self, token: &Token) -> ExprFlow {
        let (_, doubled) = self.stream.read_consecutive_symbols(":", 1);
        if doubled != 1 {
            // A single `:` ends case labels.
            return ExprFlow::Terminated;
        }
        self.stream.discard(1);

        if self.top_kind() == Some(PendingKind::Path { awaiting: false }) && self.slot.is_none() {
            if let Some(PendingExpr::Path { loc, segments, .. }) = self.exprs.pop() {
                self.exprs.push(PendingExpr::Qualified {
                    loc,
                    qualifier: Qualifier::Module(ModulePath { segments }),
                });
            }
            return ExprFlow::Consumed;
        }

        match self.slot.take() {
            Some(Expr::Reference(Reference {
                kind: ReferenceKind::Variable(module),
                loc,
                ..
            })) => {
                self.exprs.push(PendingExpr::Qualified {
                    loc,
                    qualifier: Qualifier::Module(ModulePath { segments: vec![module] }),
                });
                ExprFlow::Consumed
            }
            None if self.callee_allowed() => {
                self.exprs.push(PendingExpr::Qualified {
                    loc: token.loc,
                    qualifier: Qualifier::Local,
                });
                ExprFlow::Consumed
            }
            _ => self.expr_fail(errors::unexpected("`::`", "an operator", token.loc), token),
        }
    }

    // ========================================================================
    // Operators
    // ========================================================================

    fn expr_operator(&mut self, ctx: ExprContext, first: char, token: &Token) -> ExprFlow {
        let (rest, _) =
            self.stream.read_consecutive_symbols(operators::SPELLING_CHARS, operators::MAX_SPELLING_LEN - 1);
        let mut candidate = String::with_capacity(operators::MAX_SPELLING_LEN);
        candidate.push(first);
        candidate.push_str(&rest);

        if self.slot.is_none() {
            let Some(op) = operators::lookup(&candidate[..1], Fixity::Prefix) else {
                return self.expr_fail(errors::unexpected(&token.describe(), "an expression", token.loc), token);
            };
            if !self.operand_allowed() {
                return self.expr_fail(errors::unexpected(&token.describe(), "an identifier", token.loc), token);
            }
            self.exprs.push(PendingExpr::Unary { loc: token.loc, op });
            return ExprFlow::Consumed;
        }

        // Maximal munch: `a<<-1` commits to `<<`, `a+++b` to `++`.
        let len = longest_symbol_prefix(&candidate);
        let found = candidate.get(..len).and_then(|spelling| {
            operators::lookup(spelling, Fixity::Postfix).or_else(|| operators::lookup(spelling, Fixity::Infix))
        });
        let Some(op) = found else {
            return self.expr_fail(errors::unexpected(&token.describe(), "an operator", token.loc), token);
        };
        self.stream.discard(len - 1);
        let spelling = operators::as_str(op);

        match operators::info_for(op).fixity {
            Fixity::Postfix => {
                let Some(operand) = self.slot.take() else {
                    return ExprFlow::Consumed;
                };
                if !operand.is_mutable_reference() {
                    return self.expr_fail(errors::not_assignable(&operand.to_string(), operand.loc()), token);
                }
                let id = self.next_id();
                self.slot = Some(Expr::Postfix(PostfixOp {
                    id,
                    loc: operand.loc(),
                    op,
                    operand: Box::new(operand),
                }));
            }
            Fixity::Assign => {
                match self.top_kind() {
                    Some(PendingKind::Binary(_) | PendingKind::Unary) => {
                        let diagnostic = Diagnostic::error(format!("`{spelling}` needs a variable on its left"), token.loc)
                            .with_hint("an operator on the left of an assignment binds tighter than the assignment");
                        return self.expr_fail(diagnostic, token);
                    }
                    // `a b = 1`: most likely a missing `;` after `a`.
                    Some(PendingKind::CallPrefix) => {
                        return self.expr_fail(errors::unexpected(&token.describe(), "`(`", token.loc), token);
                    }
                    _ => {}
                }
                let statement_position =
                    self.exprs.is_empty() && matches!(ctx, ExprContext::Statement | ExprContext::ForClause(0 | 2));
                if !statement_position && !self.config.allow_assignment_expressions {
                    self.report(errors::assignment_expression(token.loc));
                    self.clear_expression();
                    return ExprFlow::Consumed;
                }
                let Some(target) = self.slot.take() else {
                    return ExprFlow::Consumed;
                };
                if !target.is_mutable_reference() {
                    return self.expr_fail(errors::not_assignable(&target.to_string(), target.loc()), token);
                }
                self.exprs.push(PendingExpr::Assign {
                    op,
                    target: Box::new(target),
                });
            }
            Fixity::Infix => {
                let precedence = operators::info_for(op).precedence;
                let folded = self.fold_while(token, |kind| match kind {
                    PendingKind::Unary => true,
                    PendingKind::Binary(top) => operators::info_for(top).precedence >= precedence,
                    _ => false,
                });
                if let Err(diagnostic) = folded {
                    return self.expr_fail(diagnostic, token);
                }
                let Some(left) = self.slot.take() else {
                    return ExprFlow::Consumed;
                };
                self.exprs.push(PendingExpr::Binary {
                    op,
                    left: Box::new(left),
                });
            }
            Fixity::Prefix => {
                return self.expr_fail(errors::unexpected(&token.describe(), "an operator", token.loc), token);
            }
        }
        ExprFlow::Consumed
    }

    /// Fold every pending operator on top of the stack into the slot.
    fn fold_operators(&mut self, at: &Token) -> Result<(), Diagnostic> {
        self.fold_while(at, PendingKind::is_operator)
    }

    fn fold_while(&mut self, at: &Token, mut fold: impl FnMut(PendingKind) -> bool) -> Result<(), Diagnostic> {
        while let Some(kind) = self.top_kind() {
            if !fold(kind) {
                break;
            }
            let Some(operand) = self.slot.take() else {
                return Err(Diagnostic::error(
                    format!("missing operand before {}", at.describe()),
                    at.loc,
                ));
            };
            let id = self.next_id();
            let sealed = match self.exprs.pop() {
                Some(PendingExpr::Unary { loc, op }) => Expr::Unary(UnaryOp {
                    id,
                    loc,
                    op,
                    operand: Box::new(operand),
                }),
                Some(PendingExpr::Binary { op, left }) => Expr::Binary(BinaryOp {
                    id,
                    loc: left.loc(),
                    op,
                    left,
                    right: Box::new(operand),
                }),
                Some(PendingExpr::Assign { op, target }) => Expr::Assignment(Assignment {
                    id,
                    loc: target.loc(),
                    op,
                    target,
                    value: Box::new(operand),
                }),
                other => unreachable!("folded a non-operator pending node: {other:?}"),
            };
            self.slot = Some(sealed);
        }
        Ok(())
    }
}
