/// Root-declaration mode: directives, `#include`, constants, globals and function signatures.
///
/// The dispatcher resets the mode to [`RootPhase::Idle`] before handing a token here, so every handler that wants
/// to stay inside a declaration must store its next phase explicitly.

/// Progress through one root-level declaration.
#[derive(Debug)]
enum RootPhase {
    Idle,
    /// After `#`.
    DirectiveName { loc: Location },
    /// `#include a\b`; `awaiting` right after `include` or a `\`.
    Include {
        loc: Location,
        segments: Vec<Ident>,
        awaiting: bool,
    },
    /// `#name`, waiting for `(` or `;`.
    DirectiveHead { loc: Location, name: Ident },
    /// `#name(` collecting arguments.
    DirectiveArgs { loc: Location, name: Ident, args: Vec<Expr> },
    /// `#name(args)` waiting for `;`.
    DirectiveEnd { loc: Location, name: Ident, args: Vec<Expr> },
    ConstName { loc: Location },
    ConstEquals { loc: Location, name: Ident },
    ConstValue { loc: Location, name: Ident },
    Globals {
        loc: Location,
        names: Vec<Ident>,
        awaiting: bool,
    },
    /// A name at root level: a function definition must follow.
    FunctionOpen { loc: Location, name: Ident },
    /// Inside the parameter list; `separator` once a parameter is complete.
    Params { separator: bool },
    /// After `)`: `{` or (declarative modules) `;`.
    FunctionEnd,
}

/// Function signature collected before the body.
#[derive(Debug)]
struct FunctionHeader {
    id: NodeId,
    loc: Location,
    name: Ident,
    params: Vec<Param>,
    /// Modifiers read for the parameter being collected.
    pending: Option<(Location, ParamModifiers)>,
}

impl FunctionHeader {
    fn into_def(self, body: Option<Block>) -> FunctionDef {
        let variadic = self.params.last().is_some_and(|p| p.modifiers.variadic);
        let min_args = self
            .params
            .iter()
            .position(|p| p.modifiers.optional)
            .unwrap_or_else(|| self.params.iter().filter(|p| !p.modifiers.variadic).count());
        FunctionDef {
            id: self.id,
            loc: self.loc,
            name: self.name,
            params: self.params,
            body,
            variadic,
            min_args,
        }
    }
}

impl Parser {
    fn root_token(&mut self, phase: RootPhase, token: &Token) {
        if token.is_eof() && !matches!(phase, RootPhase::Idle) {
            self.report(errors::unexpected("end of input", "the rest of the declaration", token.loc));
            self.header = None;
            self.root_idle(token);
            return;
        }

        match phase {
            RootPhase::Idle => self.root_idle(token),
            RootPhase::DirectiveName { loc } => self.directive_name(loc, token),
            RootPhase::Include { loc, segments, awaiting } => self.include_path(loc, segments, awaiting, token),
            RootPhase::DirectiveHead { loc, name } => {
                if token.is_symbol(';') {
                    self.listless_directive(loc, name);
                } else if token.is_symbol('(') {
                    self.mode = Mode::Root(RootPhase::DirectiveArgs {
                        loc,
                        name,
                        args: Vec::new(),
                    });
                    self.begin_expression(ExprContext::DirectiveArgs);
                } else {
                    self.report(errors::unexpected(&token.describe(), "`(` or `;`", token.loc));
                    self.resync(token);
                }
            }
            // Arguments are collected by the expression owner below.
            RootPhase::DirectiveArgs { .. } => {}
            RootPhase::DirectiveEnd { loc, name, args } => {
                if self.expect_terminator(token, ';', false) {
                    let id = self.next_id();
                    self.module.declarations.push(Declaration::Directive(Directive {
                        id,
                        loc,
                        kind: DirectiveKind::Declarative { name, args },
                    }));
                }
            }
            RootPhase::ConstName { loc } => match self.plain_identifier(token) {
                Some(name) => self.mode = Mode::Root(RootPhase::ConstEquals { loc, name }),
                None => {
                    self.report(errors::unexpected(&token.describe(), "a constant name", token.loc));
                    self.resync(token);
                }
            },
            RootPhase::ConstEquals { loc, name } => {
                if self.expect_terminator(token, '=', false) {
                    self.mode = Mode::Root(RootPhase::ConstValue { loc, name });
                    self.begin_expression(ExprContext::ConstValue);
                }
            }
            RootPhase::ConstValue { .. } => {}
            RootPhase::Globals { loc, names, awaiting } => self.global_names(loc, names, awaiting, token),
            RootPhase::FunctionOpen { loc, name } => {
                if self.expect_terminator(token, '(', false) {
                    let id = self.next_id();
                    self.header = Some(FunctionHeader {
                        id,
                        loc,
                        name,
                        params: Vec::new(),
                        pending: None,
                    });
                    self.mode = Mode::Root(RootPhase::Params { separator: false });
                }
            }
            RootPhase::Params { separator } => self.param_token(separator, token),
            RootPhase::FunctionEnd => self.function_end(token),
        }
    }

    /// An identifier that is not reserved in the active keyword set.
    fn plain_identifier(&self, token: &Token) -> Option<Ident> {
        (token.kind == TokenKind::Identifier && token.keyword(self.config.dialect.keyword_set).is_none())
            .then(|| Ident::new(token.text.clone(), token.loc))
    }

    fn root_idle(&mut self, token: &Token) {
        if self.config.target == ParseTarget::Function {
            self.function_target_idle(token);
            return;
        }

        let set = self.config.dialect.keyword_set;
        if token.is_eof() {
            let module = std::mem::take(&mut self.module);
            tracing::debug!(
                declarations = module.declarations.len(),
                constants = module.constants.len(),
                "module parsed"
            );
            self.output = Some(Syntax::Module(module));
            self.mode = Mode::Done;
        } else if token.is_symbol('#') {
            self.mode = Mode::Root(RootPhase::DirectiveName { loc: token.loc });
        } else if token.is_symbol(';') {
            self.report(errors::stray_semicolon(token.loc));
        } else if token.is_keyword(KeywordId::Const, set) {
            self.mode = Mode::Root(RootPhase::ConstName { loc: token.loc });
        } else if token.is_keyword(KeywordId::Global, set) {
            self.mode = Mode::Root(RootPhase::Globals {
                loc: token.loc,
                names: Vec::new(),
                awaiting: true,
            });
        } else if let Some(name) = self.plain_identifier(token) {
            self.mode = Mode::Root(RootPhase::FunctionOpen { loc: token.loc, name });
        } else {
            self.report(errors::unexpected(&token.describe(), "a declaration", token.loc));
            self.resync(token);
        }
    }

    fn function_target_idle(&mut self, token: &Token) {
        if self.output.is_some() {
            if !token.is_eof() {
                self.report(errors::unexpected(&token.describe(), "end of input after the function", token.loc));
            }
            self.mode = Mode::Done;
            return;
        }
        if token.is_eof() {
            self.report(Diagnostic::error("expected a function definition", token.loc));
            self.mode = Mode::Done;
            return;
        }
        match self.plain_identifier(token) {
            Some(name) => self.mode = Mode::Root(RootPhase::FunctionOpen { loc: token.loc, name }),
            None => {
                self.report(errors::unexpected(&token.describe(), "a function definition", token.loc));
                self.resync(token);
            }
        }
    }

    // ========================================================================
    // Directives
    // ========================================================================

    fn directive_name(&mut self, loc: Location, token: &Token) {
        let Some(name) = self.plain_identifier(token) else {
            self.report(errors::unexpected(&token.describe(), "a directive name", token.loc));
            self.resync(token);
            return;
        };
        self.mode = Mode::Root(if directives::from_str(&name.name) == Some(DirectiveId::Include) {
            RootPhase::Include {
                loc,
                segments: Vec::new(),
                awaiting: true,
            }
        } else {
            RootPhase::DirectiveHead { loc, name }
        });
    }

    fn include_path(&mut self, loc: Location, mut segments: Vec<Ident>, awaiting: bool, token: &Token) {
        if awaiting {
            if let Some(segment) = self.plain_identifier(token) {
                segments.push(segment);
                self.mode = Mode::Root(RootPhase::Include {
                    loc,
                    segments,
                    awaiting: false,
                });
                return;
            }
        } else if token.is_symbol('\\') {
            self.mode = Mode::Root(RootPhase::Include {
                loc,
                segments,
                awaiting: true,
            });
            return;
        } else if token.is_symbol(';') {
            let id = self.next_id();
            self.module.imports.push(Directive {
                id,
                loc,
                kind: DirectiveKind::Import(ModulePath { segments }),
            });
            return;
        }
        let expected = if awaiting { "a path segment" } else { "`\\` or `;`" };
        self.report(errors::unexpected(&token.describe(), expected, token.loc));
        self.resync(token);
    }

    fn listless_directive(&mut self, loc: Location, name: Ident) {
        if directives::from_str(&name.name) == Some(DirectiveId::Declarative) {
            let module = &self.module;
            let first = module.imports.is_empty()
                && module.declarations.is_empty()
                && module.constants.is_empty()
                && module.globals.is_empty();
            if !first {
                let spelling = format!("#{}", directives::as_str(DirectiveId::Declarative));
                self.report(
                    Diagnostic::error(format!("`{spelling}` must come before every other declaration"), loc)
                        .with_len(spelling.len()),
                );
                return;
            }
            self.module.declarative = true;
        }
        let id = self.next_id();
        self.module.declarations.push(Declaration::Directive(Directive {
            id,
            loc,
            kind: DirectiveKind::Listless { name },
        }));
    }

    fn directive_argument_done(&mut self, completed: Completed, token: &Token) {
        let Mode::Root(RootPhase::DirectiveArgs { loc, name, mut args }) =
            std::mem::replace(&mut self.mode, Mode::Root(RootPhase::Idle))
        else {
            return;
        };

        match completed {
            Completed::Value(arg) => args.push(arg),
            Completed::Empty if token.is_symbol(')') && args.is_empty() => {}
            Completed::Empty => {
                self.report(errors::unexpected(&token.describe(), "a directive argument", token.loc));
                self.resync(token);
                return;
            }
            Completed::Failed => {
                self.resync(token);
                return;
            }
        }

        if token.is_symbol(',') {
            self.mode = Mode::Root(RootPhase::DirectiveArgs { loc, name, args });
            self.begin_expression(ExprContext::DirectiveArgs);
        } else if token.is_symbol(')') {
            self.mode = Mode::Root(RootPhase::DirectiveEnd { loc, name, args });
        } else {
            self.report(errors::unexpected(&token.describe(), "`,` or `)`", token.loc));
            self.resync(token);
        }
    }

    // ========================================================================
    // Constants and globals
    // ========================================================================

    fn const_value_done(&mut self, completed: Completed, token: &Token) {
        let Mode::Root(RootPhase::ConstValue { loc, name }) =
            std::mem::replace(&mut self.mode, Mode::Root(RootPhase::Idle))
        else {
            return;
        };
        let failed = matches!(completed, Completed::Failed);
        if !self.expect_terminator(token, ';', failed) {
            return;
        }
        let value = match completed {
            Completed::Value(value) => value,
            Completed::Empty => {
                self.report(Diagnostic::error(format!("constant `{}` needs a value", name.name), token.loc));
                return;
            }
            Completed::Failed => return,
        };

        let key = name.name.to_ascii_lowercase();
        if self.module.constants.iter().any(|c| c.name.matches(&name.name)) {
            self.report(
                Diagnostic::error(format!("constant `{}` is already defined", name.name), name.loc)
                    .with_len(name.name.len()),
            );
            return;
        }
        let folded = match const_eval::evaluate(&value, &self.constants) {
            Ok(folded) => {
                self.constants.insert(key, folded.clone());
                Some(folded)
            }
            Err(err) => {
                self.report(
                    Diagnostic::error(format!("value of constant `{}` is not a constant expression", name.name), value.loc())
                        .with_note(err.to_string()),
                );
                None
            }
        };
        let id = self.next_id();
        self.module.constants.push(ConstantDecl {
            id,
            loc,
            name,
            value,
            folded,
        });
    }

    fn global_names(&mut self, loc: Location, mut names: Vec<Ident>, awaiting: bool, token: &Token) {
        if awaiting {
            if let Some(name) = self.plain_identifier(token) {
                names.push(name);
                self.mode = Mode::Root(RootPhase::Globals {
                    loc,
                    names,
                    awaiting: false,
                });
                return;
            }
        } else if token.is_symbol(',') {
            self.mode = Mode::Root(RootPhase::Globals {
                loc,
                names,
                awaiting: true,
            });
            return;
        } else if token.is_symbol(';') {
            self.module.globals.extend(names);
            return;
        }
        let expected = if awaiting { "a global name" } else { "`,` or `;`" };
        self.report(errors::unexpected(&token.describe(), expected, token.loc));
        self.resync(token);
    }

    // ========================================================================
    // Function signatures
    // ========================================================================

    fn param_token(&mut self, separator: bool, token: &Token) {
        if separator {
            if token.is_symbol(',') {
                self.mode = Mode::Root(RootPhase::Params { separator: false });
            } else if token.is_symbol(')') {
                self.mode = Mode::Root(RootPhase::FunctionEnd);
            } else {
                self.report(errors::unexpected(&token.describe(), "`,` or `)`", token.loc));
                self.resync(token);
            }
            return;
        }

        let Some(header) = self.header.as_mut() else {
            return;
        };
        let (pending_loc, mut modifiers) = header.pending.unwrap_or((token.loc, ParamModifiers::default()));

        if let Some(name) = self.plain_identifier(token) {
            self.add_param(Param {
                loc: pending_loc,
                name: Some(name),
                modifiers,
            });
            self.mode = Mode::Root(RootPhase::Params { separator: true });
            return;
        }

        let duplicate = match token.symbol() {
            Some('&') => std::mem::replace(&mut modifiers.by_ref, true),
            Some('?') => std::mem::replace(&mut modifiers.optional, true),
            Some('.') => {
                let (_, dots) = self.stream.read_consecutive_symbols(".", 2);
                if dots != 2 {
                    self.report(errors::unexpected("`.`", "`...`", token.loc));
                    self.resync(token);
                    return;
                }
                self.stream.discard(2);
                std::mem::replace(&mut modifiers.variadic, true)
            }
            Some(')') => {
                self.close_params(token);
                return;
            }
            _ => {
                self.report(errors::unexpected(&token.describe(), "a parameter", token.loc));
                self.resync(token);
                return;
            }
        };
        if duplicate {
            self.report(Diagnostic::error(format!("repeated parameter modifier {}", token.describe()), token.loc));
        }
        if let Some(header) = self.header.as_mut() {
            header.pending = Some((pending_loc, modifiers));
        }
        self.mode = Mode::Root(RootPhase::Params { separator: false });
    }

    /// `)` while a parameter is expected: the list is empty, ends with a bare `...`, or is malformed.
    fn close_params(&mut self, token: &Token) {
        let Some(header) = self.header.as_mut() else {
            return;
        };
        match header.pending.take() {
            Some((loc, modifiers)) if modifiers.variadic && !modifiers.by_ref && !modifiers.optional => {
                self.add_param(Param {
                    loc,
                    name: None,
                    modifiers,
                });
            }
            Some(_) => {
                self.report(errors::unexpected("`)`", "a parameter name", token.loc));
                self.resync(token);
                return;
            }
            None if header.params.is_empty() => {}
            None => {
                self.report(errors::unexpected("`)`", "a parameter after `,`", token.loc));
                self.resync(token);
                return;
            }
        }
        self.mode = Mode::Root(RootPhase::FunctionEnd);
    }

    fn add_param(&mut self, param: Param) {
        let Some(header) = self.header.as_mut() else {
            return;
        };
        header.pending = None;

        let problem = if let Some(name) = param
            .name
            .as_ref()
            .filter(|name| header.params.iter().any(|p| p.name.as_ref().is_some_and(|n| n.matches(&name.name))))
        {
            Some(
                Diagnostic::error(format!("duplicate parameter `{}`", name.name), name.loc)
                    .with_len(name.name.len()),
            )
        } else if header.params.iter().any(|p| p.modifiers.variadic) {
            Some(Diagnostic::error("a variadic parameter must be the last parameter", param.loc))
        } else if !param.modifiers.optional
            && !param.modifiers.variadic
            && header.params.iter().any(|p| p.modifiers.optional)
        {
            Some(
                Diagnostic::error("required parameter after an optional one", param.loc)
                    .with_hint("mark it optional with `?`, or move it before the optional parameters"),
            )
        } else {
            None
        };

        header.params.push(param);
        if let Some(problem) = problem {
            self.report(problem);
        }
    }

    fn function_end(&mut self, token: &Token) {
        let declarative = self.module.declarative && self.config.target == ParseTarget::Module;
        if token.is_symbol('{') {
            if declarative {
                self.report(Diagnostic::error(
                    "function bodies are not allowed in a declarative module",
                    token.loc,
                ));
                self.resync(token);
                return;
            }
            let id = self.next_id();
            self.stmts.push(PendingStmt::Block(PendingBlock {
                id,
                loc: token.loc,
                role: BlockRole::FunctionBody,
                statements: Vec::new(),
                switch: None,
            }));
            self.mode = Mode::Body;
        } else if token.is_symbol(';') {
            let Some(header) = self.header.take() else {
                return;
            };
            if declarative {
                self.define_function(header.into_def(None));
            } else {
                self.report(
                    Diagnostic::error(format!("function `{}` has no body", header.name.name), header.loc)
                        .with_note("forward declarations are only allowed after `#declarative;`"),
                );
            }
        } else {
            self.report(errors::unexpected(&token.describe(), "`{`", token.loc));
            self.resync(token);
        }
    }

    fn define_function(&mut self, def: FunctionDef) {
        tracing::debug!(name = %def.name.name, params = def.params.len(), "function parsed");
        if self.config.target == ParseTarget::Function {
            self.output = Some(Syntax::Function(def));
            return;
        }
        if self.module.find_function(&def.name.name).is_some() {
            self.report(
                Diagnostic::error(format!("function `{}` is already defined", def.name.name), def.name.loc)
                    .with_len(def.name.name.len()),
            );
            return;
        }
        self.module.declarations.push(Declaration::Function(def));
    }
}
