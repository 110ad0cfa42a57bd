//! Core formatting logic for gscript source code
//!
//! Walks the syntax graph and emits normalized source. Expressions render through their `Display` impls (canonical
//! spellings, spaced binary operators, every parenthesis the author wrote); this module lays out declarations, blocks
//! and statements around them.

use gscript_syntax::ast::*;

use super::config::{BraceStyle, FormatConfig};
use super::writer::FormatWriter;

/// Kind of the previous root item, for blank-line placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Item {
    Directive,
    Global,
    Constant,
    Function,
}

/// Formatter that transforms a syntax graph back to formatted source code
pub struct Formatter {
    writer: FormatWriter,
    blank_lines_between_functions: usize,
    previous: Option<Item>,
}

impl Formatter {
    pub fn new(config: &FormatConfig) -> Self {
        Self {
            writer: FormatWriter::new(config),
            blank_lines_between_functions: config.blank_lines_between_functions,
            previous: None,
        }
    }

    /// Format a parse result and return the formatted source
    pub fn format(mut self, syntax: &Syntax) -> String {
        match syntax {
            Syntax::Module(module) => self.format_module(module),
            Syntax::Function(func) => self.format_function(func),
            Syntax::Expression(expr) => self.writer.writeln(&expr.to_string()),
        }
        self.writer.finish()
    }

    // ========================================================================
    // Module
    // ========================================================================

    /// Root items are grouped by kind: `#declarative;`, imports, globals, constants, then the remaining directives
    /// and functions in source order. Constants keep their relative order, so initializers still only see earlier
    /// constants.
    fn format_module(&mut self, module: &Module) {
        let marker = usize::from(module.declarative && matches!(module.declarations.first(), Some(Declaration::Directive(_))));
        let (leading, rest) = module.declarations.split_at(marker);

        for decl in leading {
            self.format_declaration(decl);
        }
        for import in &module.imports {
            self.separate(Item::Directive);
            self.writer.writeln(&import.to_string());
        }
        if !module.globals.is_empty() {
            self.separate(Item::Global);
            let names: Vec<&str> = module.globals.iter().map(|g| g.name.as_str()).collect();
            self.writer.writeln(&format!("global {};", names.join(", ")));
        }
        for constant in &module.constants {
            self.separate(Item::Constant);
            self.writer.writeln(&format!("const {} = {};", constant.name.name, constant.value));
        }
        for decl in rest {
            self.format_declaration(decl);
        }
    }

    fn format_declaration(&mut self, decl: &Declaration) {
        match decl {
            Declaration::Directive(directive) => {
                self.separate(Item::Directive);
                self.writer.writeln(&directive.to_string());
            }
            Declaration::Function(func) => {
                self.separate(Item::Function);
                self.format_function(func);
            }
        }
    }

    /// Blank lines between root items: one when the kind changes, the configured count between functions.
    fn separate(&mut self, item: Item) {
        match self.previous {
            Some(Item::Function) if item == Item::Function => self.writer.blank_lines(self.blank_lines_between_functions),
            Some(previous) if previous != item || item == Item::Function => self.writer.blank_lines(1),
            _ => {}
        }
        self.previous = Some(item);
    }

    fn format_function(&mut self, func: &FunctionDef) {
        let params: Vec<String> = func.params.iter().map(ToString::to_string).collect();
        self.writer.write(&format!("{}({})", func.name.name, params.join(", ")));
        match &func.body {
            Some(body) => {
                self.writer.open_block();
                self.statements(&body.statements);
                self.writer.close_block();
                self.writer.end_line();
            }
            None => self.writer.writeln(";"),
        }
    }

    // ========================================================================
    // Blocks
    // ========================================================================

    fn statements(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.format_stmt(stmt);
        }
    }

    /// Body of a statement header.
    ///
    /// ## Returns
    /// `true` when the body was a block and the line holding its `}` is still open.
    fn branch(&mut self, body: &Stmt) -> bool {
        match body {
            Stmt::Block(block) => {
                self.writer.open_block();
                self.statements(&block.statements);
                self.writer.close_block();
                true
            }
            other => {
                self.writer.newline();
                self.writer.indent();
                self.format_stmt(other);
                self.writer.dedent();
                false
            }
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn format_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(s) => self.writer.writeln(&format!("{};", s.expr)),
            Stmt::KeywordCall(s) => match &s.argument {
                Some(argument) => self.writer.writeln(&format!("{} {argument};", s.keyword)),
                None => self.writer.writeln(&format!("{};", s.keyword)),
            },
            Stmt::FlowControl(s) => self.writer.writeln(&format!("{};", s.kind)),
            Stmt::Block(block) => {
                self.writer.writeln("{");
                self.writer.indent();
                self.statements(&block.statements);
                self.writer.close_block();
                self.writer.end_line();
            }
            Stmt::If(s) => self.format_if(s),
            Stmt::While(s) => {
                self.writer.write(&format!("while ({})", s.condition));
                self.branch(&s.body);
                self.writer.end_line();
            }
            Stmt::For(s) => {
                let mut header = String::from("for (");
                if let Some(init) = &s.init {
                    header.push_str(&init.to_string());
                }
                for clause in [&s.condition, &s.step] {
                    header.push(';');
                    if let Some(expr) = clause {
                        header.push(' ');
                        header.push_str(&expr.to_string());
                    }
                }
                header.push(')');
                self.writer.write(&header);
                self.branch(&s.body);
                self.writer.end_line();
            }
            Stmt::Foreach(s) => {
                let names = match &s.key {
                    Some(key) => format!("{}, {}", key.name, s.value.name),
                    None => s.value.name.clone(),
                };
                self.writer.write(&format!("foreach ({names} in {})", s.collection));
                self.branch(&s.body);
                self.writer.end_line();
            }
            Stmt::Switch(s) => self.format_switch(s),
        }
    }

    fn format_if(&mut self, stmt: &IfStmt) {
        self.writer.write(&format!("if ({})", stmt.condition));
        let open = self.branch(&stmt.then_branch);
        let Some(else_branch) = &stmt.else_branch else {
            self.writer.end_line();
            return;
        };

        if open && self.writer.brace_style() == BraceStyle::SameLine {
            self.writer.write(" else");
        } else {
            self.writer.end_line();
            self.writer.write("else");
        }
        match else_branch.as_ref() {
            Stmt::If(nested) => {
                self.writer.write(" ");
                self.format_if(nested);
            }
            other => {
                self.branch(other);
                self.writer.end_line();
            }
        }
    }

    fn format_switch(&mut self, stmt: &SwitchStmt) {
        self.writer.write(&format!("switch ({})", stmt.subject));
        self.writer.open_block();
        for (case, statements) in stmt.segments() {
            for label in &case.labels {
                match label {
                    CaseLabel::Value(value) => self.writer.writeln(&format!("case {value}:")),
                    CaseLabel::Default(_) => self.writer.writeln("default:"),
                }
            }
            self.writer.indent();
            self.statements(statements);
            self.writer.dedent();
        }
        self.writer.close_block();
        self.writer.end_line();
    }
}
