#[cfg(test)]
/// Parser unit tests.
///
/// These cover operator precedence and multi-character disambiguation, statement wrapping (dangling `else`, switch
/// segmentation, flow targets), root declarations, and the recovery behavior (no cascaded errors after one mistake).
mod tests {
    use super::*;

    fn parse_with(source: &str, config: ParserConfig) -> ParseOutput {
        parse_source(source, config).unwrap()
    }

    fn module_of(output: &ParseOutput) -> &Module {
        output.syntax.as_ref().and_then(Syntax::as_module).expect("module output")
    }

    fn module(source: &str) -> Module {
        let output = parse_with(source, ParserConfig::default());
        assert!(output.is_success(), "unexpected errors: {:?}", output.errors);
        module_of(&output).clone()
    }

    fn statements(output: &ParseOutput) -> Vec<Stmt> {
        module_of(output)
            .functions()
            .next()
            .and_then(|f| f.body.clone())
            .map(|b| b.statements)
            .unwrap_or_default()
    }

    fn body_with(source: &str, config: ParserConfig) -> ParseOutput {
        parse_with(&format!("main() {{ {source} }}"), config)
    }

    fn body(source: &str) -> Vec<Stmt> {
        let output = body_with(source, ParserConfig::default());
        assert!(output.is_success(), "unexpected errors: {:?}", output.errors);
        statements(&output)
    }

    fn expr(source: &str) -> Expr {
        let output = parse_with(source, ParserConfig::new().with_target(ParseTarget::Expression));
        assert!(output.is_success(), "unexpected errors: {:?}", output.errors);
        output.syntax.and_then(|s| s.as_expression().cloned()).unwrap()
    }

    fn messages(diagnostics: &[Diagnostic]) -> Vec<&str> {
        diagnostics.iter().map(|d| d.message.as_str()).collect()
    }

    fn expr_stmt(stmt: &Stmt) -> &Expr {
        match stmt {
            Stmt::Expr(s) => &s.expr,
            other => panic!("expected an expression statement, got {other:?}"),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let Expr::Binary(add) = expr("2+3*4") else {
            panic!("expected a binary expression");
        };
        assert_eq!(add.op, OperatorId::Plus);
        assert!(matches!(&*add.left, Expr::Constant(c) if c.raw == "2"));
        assert!(matches!(&*add.right, Expr::Binary(mul) if mul.op == OperatorId::Star));
    }

    #[test]
    fn binary_operators_are_left_associative() {
        let Expr::Binary(outer) = expr("1 - 2 - 3") else {
            panic!("expected a binary expression");
        };
        assert!(matches!(&*outer.left, Expr::Binary(inner) if inner.op == OperatorId::Minus));
        assert!(matches!(&*outer.right, Expr::Constant(c) if c.raw == "3"));
    }

    #[test]
    fn prefix_operators_bind_tighter_than_binary() {
        let Expr::Binary(b) = expr("-a * b") else {
            panic!("expected a binary expression");
        };
        assert_eq!(b.op, OperatorId::Star);
        assert!(matches!(&*b.left, Expr::Unary(u) if u.op == OperatorId::Negate));
    }

    #[test]
    fn adjacent_symbols_form_longest_operator() {
        let stmts = body("a<<=1;");
        assert!(matches!(expr_stmt(&stmts[0]), Expr::Assignment(a) if a.op == OperatorId::ShlEq));

        assert!(matches!(expr("a<<1"), Expr::Binary(b) if b.op == OperatorId::Shl));

        let Expr::Binary(lt) = expr("a < -1") else {
            panic!("expected a comparison");
        };
        assert_eq!(lt.op, OperatorId::Lt);
        assert!(matches!(&*lt.right, Expr::Unary(u) if u.op == OperatorId::Negate));
    }

    #[test]
    fn separated_symbols_never_fold() {
        let output = parse_with("a < < 1", ParserConfig::new().with_target(ParseTarget::Expression));
        assert!(!output.errors.is_empty());
    }

    #[test]
    fn runs_commit_to_the_longest_operator() {
        let Expr::Binary(add) = expr("a+++b") else {
            panic!("expected a binary expression");
        };
        assert_eq!(add.op, OperatorId::Plus);
        assert!(matches!(&*add.left, Expr::Postfix(p) if p.op == OperatorId::Increment));

        let Expr::Binary(shl) = expr("a<<-1") else {
            panic!("expected a shift");
        };
        assert_eq!(shl.op, OperatorId::Shl);
        assert!(matches!(&*shl.right, Expr::Unary(u) if u.op == OperatorId::Negate));

        let stmts = body("a>>=b!=c;");
        let Expr::Assignment(assign) = expr_stmt(&stmts[0]) else {
            panic!("expected an assignment");
        };
        assert_eq!(assign.op, OperatorId::ShrEq);
        assert!(matches!(&*assign.value, Expr::Binary(b) if b.op == OperatorId::NotEq));
    }

    #[test]
    fn keywords_are_valid_member_names() {
        let stmts = body("x = level.default; y = self.in; level.thread = true;");
        let members: Vec<String> = stmts
            .iter()
            .map(|stmt| {
                let assign = expr_stmt(stmt);
                assert!(matches!(assign, Expr::Assignment(_)), "expected an assignment, got {assign:?}");
                assign.to_string()
            })
            .collect();
        assert_eq!(members, ["x = level.default", "y = self.in", "level.thread = true"]);

        let Expr::Assignment(assign) = expr_stmt(&stmts[0]) else {
            unreachable!();
        };
        let Expr::Reference(Reference { kind: ReferenceKind::Accessor { member, .. }, .. }) = &*assign.value else {
            panic!("expected a member access");
        };
        assert!(member.matches("default"));

        // Outside member position a keyword still ends the expression.
        let output = body_with("x = default;", ParserConfig::default());
        assert!(!output.errors.is_empty());
    }

    #[test]
    fn chained_assignment_is_fatal_by_default() {
        let output = body_with("a = b = 1;", ParserConfig::default());
        assert!(output.halted);
        assert!(output.syntax.is_none());
        let last = output.errors.last().unwrap();
        assert!(last.is_fatal());
        assert_eq!(last.message, "assignment used as an expression");
    }

    #[test]
    fn chained_assignment_is_right_associative_when_enabled() {
        let output = body_with("a = b = 1;", ParserConfig::new().with_assignment_expressions(true));
        assert!(output.is_success(), "{:?}", output.errors);
        let stmts = statements(&output);
        let Expr::Assignment(outer) = expr_stmt(&stmts[0]) else {
            panic!("expected an assignment");
        };
        assert!(matches!(&*outer.target, Expr::Reference(_)));
        assert!(matches!(&*outer.value, Expr::Assignment(inner) if inner.target.to_string() == "b"));
    }

    #[test]
    fn assignment_in_argument_is_fatal_by_default() {
        let output = body_with("f(a = 1);", ParserConfig::default());
        assert!(output.halted);
    }

    #[test]
    fn truple_needs_exactly_three_items() {
        assert!(matches!(expr("(1, 2, 3)"), Expr::Truple(_)));

        let pair = parse_with("(1, 2)", ParserConfig::new().with_target(ParseTarget::Expression));
        assert_eq!(messages(&pair.errors), ["a truple takes exactly three items"]);
        assert!(!pair.halted);
        assert!(matches!(pair.syntax, Some(Syntax::Expression(Expr::Group(_)))));

        let four = parse_with("(1, 2, 3, 4)", ParserConfig::new().with_target(ParseTarget::Expression));
        assert!(four.halted);
        assert!(four.syntax.is_none());
    }

    #[test]
    fn groups_are_kept_in_the_graph() {
        let Expr::Binary(mul) = expr("(2 + 3) * 4") else {
            panic!("expected a binary expression");
        };
        assert!(matches!(&*mul.left, Expr::Group(_)));
    }

    #[test]
    fn postfix_requires_a_mutable_reference() {
        let stmts = body("a[0]++; s.count--;");
        assert!(matches!(expr_stmt(&stmts[0]), Expr::Postfix(p) if p.op == OperatorId::Increment));
        assert!(matches!(expr_stmt(&stmts[1]), Expr::Postfix(p) if p.op == OperatorId::Decrement));

        let output = body_with("1++;", ParserConfig::default());
        assert_eq!(messages(&output.errors), ["cannot assign to `1`"]);
    }

    #[test]
    fn calls_pointers_and_qualifiers() {
        let stmts = body(
            "self thread [[ level.cb ]](1); maps\\mp\\util::go(); ::local(); childthread foo(a, b); x = [1, [2]];",
        );

        let Expr::PointerCall(pointer) = expr_stmt(&stmts[0]) else {
            panic!("expected a pointer call");
        };
        assert_eq!(pointer.modifier, Some(CallModifier::Thread));
        assert!(pointer.self_expr.is_some());
        assert_eq!(pointer.pointer.to_string(), "level.cb");
        assert_eq!(pointer.args.len(), 1);

        let Expr::Call(qualified) = expr_stmt(&stmts[1]) else {
            panic!("expected a call");
        };
        assert!(qualified.target.name.matches("go"));
        assert!(matches!(&qualified.target.qualifier, Qualifier::Module(path) if path.segments.len() == 3));

        let Expr::Call(local) = expr_stmt(&stmts[2]) else {
            panic!("expected a call");
        };
        assert!(matches!(local.target.qualifier, Qualifier::Local));

        let Expr::Call(threaded) = expr_stmt(&stmts[3]) else {
            panic!("expected a call");
        };
        assert_eq!(threaded.modifier, Some(CallModifier::ChildThread));
        assert!(threaded.self_expr.is_none());
        assert_eq!(threaded.args.len(), 2);

        let Expr::Assignment(array) = expr_stmt(&stmts[4]) else {
            panic!("expected an assignment");
        };
        assert!(matches!(&*array.value, Expr::InlineArray(a) if a.items.len() == 2));
    }

    #[test]
    fn identifier_after_expression_becomes_self() {
        let stmts = body("level.player notify(\"spawned\");");
        let Expr::Call(call) = expr_stmt(&stmts[0]) else {
            panic!("expected a call");
        };
        assert_eq!(call.self_expr.as_deref().map(ToString::to_string).as_deref(), Some("level.player"));
        assert!(call.target.name.matches("notify"));
    }

    #[test]
    fn non_callable_expression_is_rejected() {
        let output = body_with("(a)(b);", ParserConfig::default());
        assert_eq!(messages(&output.errors), ["`(a)` is not callable"]);
    }

    #[test]
    fn expression_without_effect_is_an_error() {
        let output = body_with("a + 1;", ParserConfig::default());
        assert_eq!(messages(&output.errors), ["expression `a + 1` has no effect"]);
    }

    // ========================================================================
    // Statements
    // ========================================================================

    #[test]
    fn else_binds_to_nearest_if() {
        let stmts = body("if(a) if(b) x(); else y();");
        assert_eq!(stmts.len(), 1);
        let Stmt::If(outer) = &stmts[0] else {
            panic!("expected an if statement");
        };
        assert!(outer.else_branch.is_none());
        let Stmt::If(inner) = &*outer.then_branch else {
            panic!("expected a nested if statement");
        };
        assert!(inner.else_branch.is_some());
    }

    #[test]
    fn if_without_else_completes_on_next_statement() {
        let stmts = body("if (a) b(); c();");
        assert_eq!(stmts.len(), 2);
        assert!(matches!(&stmts[0], Stmt::If(s) if s.else_branch.is_none()));
    }

    #[test]
    fn loops_collect_their_headers() {
        let stmts = body("for (i = 0; i < 3; i++) x(); for (;;) {} while (1) wait 0.05; foreach (k, v in arr) { x(); }");
        assert_eq!(stmts.len(), 4);

        let Stmt::For(full) = &stmts[0] else {
            panic!("expected a for loop");
        };
        assert!(full.init.is_some() && full.condition.is_some() && full.step.is_some());

        let Stmt::For(empty) = &stmts[1] else {
            panic!("expected a for loop");
        };
        assert!(empty.init.is_none() && empty.condition.is_none() && empty.step.is_none());

        assert!(matches!(&stmts[2], Stmt::While(w) if matches!(&*w.body, Stmt::KeywordCall(_))));

        let Stmt::Foreach(each) = &stmts[3] else {
            panic!("expected a foreach loop");
        };
        assert_eq!(each.key.as_ref().map(|k| k.name.as_str()), Some("k"));
        assert_eq!(each.value.name, "v");
    }

    #[test]
    fn shadowed_foreach_iterator_warns() {
        let output = body_with("foreach (v in a) foreach (v in b) x();", ParserConfig::default());
        assert!(output.is_success(), "{:?}", output.errors);
        assert_eq!(
            messages(&output.warnings),
            ["iterator `v` shadows an enclosing foreach iterator"]
        );
    }

    #[test]
    fn switch_segments_by_label_offset() {
        let stmts = body("switch(x){case 1: a(); case 2: b(); break; default: c();}");
        let Stmt::Switch(switch) = &stmts[0] else {
            panic!("expected a switch");
        };
        let ranges: Vec<_> = switch.cases.iter().map(|c| c.range.clone()).collect();
        assert_eq!(ranges, [0..1, 1..3, 3..4]);
        assert!(switch.cases[2].is_default());

        let segments: Vec<usize> = switch.segments().map(|(_, stmts)| stmts.len()).collect();
        assert_eq!(segments, [1, 2, 1]);
    }

    #[test]
    fn consecutive_labels_share_a_case() {
        let stmts = body("switch (state) { case 1: case 2: go(); break; default: idle(); }");
        let Stmt::Switch(switch) = &stmts[0] else {
            panic!("expected a switch");
        };
        assert_eq!(switch.cases.len(), 2);
        assert_eq!(switch.cases[0].labels.len(), 2);
    }

    #[test]
    fn duplicate_case_values_are_rejected() {
        let output = body_with("switch (x) { case 1: a(); case 1: b(); }", ParserConfig::default());
        assert_eq!(messages(&output.errors), ["duplicate case value `1`"]);
    }

    #[test]
    fn default_grouped_with_case_is_configurable() {
        let source = "switch (x) { case 1: default: go(); }";
        let rejected = body_with(source, ParserConfig::default());
        assert_eq!(messages(&rejected.errors), ["`default` grouped with `case` labels"]);

        let accepted = body_with(source, ParserConfig::new().with_default_with_case(true));
        assert!(accepted.is_success(), "{:?}", accepted.errors);
        let stmts = statements(&accepted);
        let Stmt::Switch(switch) = &stmts[0] else {
            panic!("expected a switch");
        };
        assert_eq!(switch.cases.len(), 1);
        assert!(switch.cases[0].is_default());
    }

    #[test]
    fn case_labels_must_be_constant() {
        let output = body_with("switch (x) { case y: go(); }", ParserConfig::default());
        assert_eq!(messages(&output.errors), ["case label `y` is not a constant"]);
    }

    #[test]
    fn switch_warnings() {
        let output = body_with("switch (x) {} switch (y) { case 1: a(); break; }", ParserConfig::default());
        assert!(output.is_success(), "{:?}", output.errors);
        assert_eq!(
            messages(&output.warnings),
            ["empty switch", "redundant `break` at the end of a switch"]
        );
    }

    #[test]
    fn flow_statements_target_the_nearest_construct() {
        let stmts = body("while (1) { switch (x) { case 1: continue; case 2: break; } }");
        let Stmt::While(w) = &stmts[0] else {
            panic!("expected a while loop");
        };
        let Stmt::Block(block) = &*w.body else {
            panic!("expected a block");
        };
        let Stmt::Switch(switch) = &block.statements[0] else {
            panic!("expected a switch");
        };
        let Stmt::FlowControl(cont) = &switch.body.statements[0] else {
            panic!("expected continue");
        };
        assert_eq!(cont.target, FlowTarget { kind: TargetKind::Loop, id: w.id });
        let Stmt::FlowControl(brk) = &switch.body.statements[1] else {
            panic!("expected break");
        };
        assert_eq!(brk.target, FlowTarget { kind: TargetKind::Switch, id: switch.id });
    }

    #[test]
    fn flow_statements_outside_their_target() {
        let output = body_with("break; switch (x) { case 1: continue; }", ParserConfig::default());
        assert_eq!(
            messages(&output.errors),
            ["`break` outside of a loop or switch", "`continue` outside of a loop"]
        );
    }

    #[test]
    fn keyword_calls() {
        let stmts = body("return; return 1; wait 0.05; waittillframeend;");
        assert_eq!(stmts.len(), 4);
        assert!(matches!(&stmts[0], Stmt::KeywordCall(k) if k.keyword == CallKeyword::Return && k.argument.is_none()));
        assert!(matches!(&stmts[2], Stmt::KeywordCall(k) if k.keyword == CallKeyword::Wait && k.argument.is_some()));

        let output = body_with("wait; waittillframeend 1;", ParserConfig::default());
        assert_eq!(
            messages(&output.errors),
            ["`wait` needs a duration", "`waittillframeend` takes no argument"]
        );
    }

    #[test]
    fn stray_semicolon_is_a_warning() {
        let output = body_with(";", ParserConfig::default());
        assert!(output.is_success());
        assert_eq!(messages(&output.warnings), ["stray `;`"]);
    }

    // ========================================================================
    // Root declarations
    // ========================================================================

    #[test]
    fn root_declarations() {
        let module = module(
            "#include maps\\mp\\_utility;\n#using_animtree(\"generic\");\nconst A = 2;\nconst B = A * 3;\nglobal g1, g2;\nmain() {}\n",
        );
        assert_eq!(module.imports.len(), 1);
        assert!(matches!(&module.imports[0].kind, DirectiveKind::Import(path) if path.segments.len() == 3));
        assert!(matches!(
            &module.declarations[0],
            Declaration::Directive(Directive { kind: DirectiveKind::Declarative { args, .. }, .. }) if args.len() == 1
        ));
        assert_eq!(module.constants.len(), 2);
        assert_eq!(module.constants[1].folded, Some(Value::Int(6)));
        assert_eq!(module.globals.len(), 2);
        assert!(module.find_function("MAIN").is_some());
    }

    #[test]
    fn constants_fold_into_case_labels() {
        let module = module("const B = 2 * 3;\nmain() { switch (x) { case B: go(); case 7: stop(); } }\n");
        assert_eq!(module.constants[0].folded, Some(Value::Int(6)));
    }

    #[test]
    fn constant_errors() {
        let output = parse_with("const A = 1;\nconst a = 2;\nconst C = f();\n", ParserConfig::default());
        assert_eq!(
            messages(&output.errors),
            [
                "constant `a` is already defined",
                "value of constant `C` is not a constant expression"
            ]
        );
    }

    #[test]
    fn parameters_and_min_args() {
        let module = module("f(a, &b, ?c, ?d) {}\ng(a, ...) {}\nh(...rest) {}\n");
        let f = module.find_function("f").unwrap();
        assert_eq!(f.min_args, 2);
        assert!(f.params[1].modifiers.by_ref);
        assert!(!f.variadic);

        let g = module.find_function("g").unwrap();
        assert!(g.variadic);
        assert_eq!(g.min_args, 1);
        assert!(g.params[1].name.is_none());

        let h = module.find_function("h").unwrap();
        assert!(h.variadic);
        assert_eq!(h.min_args, 0);
    }

    #[test]
    fn parameter_errors() {
        let output = parse_with("f(a, A) {}\ng(?a, b) {}\nh(...a, b) {}\n", ParserConfig::default());
        assert_eq!(
            messages(&output.errors),
            [
                "duplicate parameter `A`",
                "required parameter after an optional one",
                "a variadic parameter must be the last parameter"
            ]
        );
    }

    #[test]
    fn declarative_modules() {
        let module = module("#declarative;\nfoo(a, b);\nbar();\n");
        assert!(module.declarative);
        assert_eq!(module.functions().count(), 2);
        assert!(module.functions().all(|f| f.body.is_none()));

        let body = parse_with("#declarative;\nfoo() {}\n", ParserConfig::default());
        assert_eq!(
            messages(&body.errors),
            ["function bodies are not allowed in a declarative module"]
        );

        let forward = parse_with("foo();\n", ParserConfig::default());
        assert_eq!(messages(&forward.errors), ["function `foo` has no body"]);

        let late = parse_with("foo() {}\n#declarative;\n", ParserConfig::default());
        assert_eq!(
            messages(&late.errors),
            ["`#declarative` must come before every other declaration"]
        );
    }

    #[test]
    fn directive_names_ignore_case() {
        let included = module("#INCLUDE maps\\mp\\_utility;\nmain() {}\n");
        assert_eq!(included.imports.len(), 1);
        assert!(!included.declarative);

        let declarative = module("#Declarative;\nfoo();\n");
        assert!(declarative.declarative);

        let generic = module("#using_animtree(\"generic\");\nmain() {}\n");
        assert!(generic.imports.is_empty());
        assert!(!generic.declarative);
    }

    #[test]
    fn duplicate_functions_are_rejected() {
        let output = parse_with("main() {}\nMain() {}\n", ParserConfig::default());
        assert_eq!(messages(&output.errors), ["function `Main` is already defined"]);
    }

    #[test]
    fn function_target() {
        let config = ParserConfig::new().with_target(ParseTarget::Function);
        let output = parse_with("foo(a) { return a; }", config.clone());
        assert!(output.is_success(), "{:?}", output.errors);
        assert!(output.syntax.as_ref().and_then(Syntax::as_function).is_some());

        let two = parse_with("foo() {}\nbar() {}\n", config.clone());
        assert_eq!(two.errors.len(), 1);

        let none = parse_with("", config);
        assert_eq!(messages(&none.errors), ["expected a function definition"]);
    }

    // ========================================================================
    // Failure policy and recovery
    // ========================================================================

    #[test]
    fn missing_operand_recovers_at_semicolon() {
        let output = body_with("a = ; b();", ParserConfig::default());
        assert_eq!(messages(&output.errors), ["missing operand before `;`"]);
        assert!(!output.halted);
        let stmts = statements(&output);
        assert_eq!(stmts.len(), 1);
        assert_eq!(expr_stmt(&stmts[0]).to_string(), "b()");
    }

    #[test]
    fn missing_semicolon_resumes_at_statement_keyword() {
        let output = body_with("a() if (x) b();", ParserConfig::default());
        assert_eq!(messages(&output.errors), ["expected `;`"]);
        let stmts = statements(&output);
        assert_eq!(stmts.len(), 1);
        assert!(matches!(&stmts[0], Stmt::If(_)));
    }

    #[test]
    fn unclosed_call_is_a_single_error() {
        let output = body_with("foo(; bar();", ParserConfig::default());
        assert_eq!(messages(&output.errors), ["unclosed argument list"]);
        assert_eq!(statements(&output).len(), 1);
    }

    #[test]
    fn else_without_if() {
        let output = body_with("else x(); y();", ParserConfig::default());
        assert_eq!(messages(&output.errors), ["`else` without a matching `if`"]);
        assert_eq!(statements(&output).len(), 1);
    }

    #[test]
    fn root_recovery_skips_balanced_braces() {
        let output = parse_with("main( { a(); }\nother() {}\n", ParserConfig::default());
        assert_eq!(output.errors.len(), 1);
        let module = module_of(&output);
        assert_eq!(module.functions().count(), 1);
        assert!(module.find_function("other").is_some());
    }

    #[test]
    fn unbalanced_braces_are_fatal() {
        let output = parse_with("main() { a();", ParserConfig::default());
        assert!(output.halted);
        assert!(output.errors.last().is_some_and(Diagnostic::is_fatal));
        assert!(output.syntax.is_none());
    }

    #[test]
    fn break_on_first_error_halts() {
        let output = body_with("a = ; b = ;", ParserConfig::new().with_break_on_first_error(true));
        assert!(output.halted);
        assert_eq!(output.errors.len(), 1);
        assert!(output.errors[0].is_fatal());
    }

    // ========================================================================
    // Session API
    // ========================================================================

    #[test]
    fn step_until_finished() {
        let tokens = lex("main() { a(); }", &Dialect::default()).unwrap();
        let mut parser = Parser::new(tokens, ParserConfig::default());
        assert_eq!(parser.progress(), 0.0);

        let mut steps = 0;
        while parser.step() == StepOutcome::Continue {
            steps += 1;
        }
        assert!(steps > 5);
        assert!(parser.is_finished());
        assert_eq!(parser.step(), StepOutcome::Finished);
        assert_eq!(parser.progress(), 1.0);
        assert!(parser.finish().is_success());
    }

    #[test]
    fn graph_grows_while_stepping() {
        let tokens = lex("#include a\\b;\nconst A = 1;\nmain() { a(); }\n", &Dialect::default()).unwrap();
        let mut parser = Parser::new(tokens, ParserConfig::default());

        let mut last = parser.progress();
        while parser.module.imports.is_empty() {
            assert_eq!(parser.step(), StepOutcome::Continue);
            assert!(parser.progress() >= last);
            last = parser.progress();
        }

        assert!(!parser.is_finished());
        assert!(last > 0.0 && last < 1.0, "progress {last}");
        assert!(parser.errors().is_empty());
        assert!(parser.module.constants.is_empty());
        assert_eq!(parser.module.functions().count(), 0);

        parser.run();
        let output = parser.finish();
        let module = module_of(&output);
        assert_eq!(module.imports.len(), 1);
        assert_eq!(module.constants.len(), 1);
        assert_eq!(module.functions().count(), 1);
    }

    #[test]
    fn finishing_early_yields_no_graph() {
        let tokens = lex("main() { a(); }", &Dialect::default()).unwrap();
        let mut parser = Parser::new(tokens, ParserConfig::default());
        for _ in 0..3 {
            parser.step();
        }
        let output = parser.finish();
        assert!(output.syntax.is_none());
        assert_eq!(messages(&output.errors), ["parse session ended before the end of input"]);
    }

    #[test]
    fn expression_target_accepts_trailing_semicolon() {
        let output = parse_with("a + 1;", ParserConfig::new().with_target(ParseTarget::Expression));
        assert!(output.is_success(), "{:?}", output.errors);

        let trailing = parse_with("a + 1; b", ParserConfig::new().with_target(ParseTarget::Expression));
        assert_eq!(trailing.errors.len(), 1);
    }
}
