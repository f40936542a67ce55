//! Statement grammar.

use std::rc::Rc;

use pytex_ir::{
    BinaryOp, ExceptHandler, Expr, ExprKind, FunctionDef, ImportName, ImportNames, Module, Param,
    Span, Stmt, StmtKind, Target, TokenKind,
};

use crate::{ParseError, Parser};

impl Parser<'_> {
    pub(crate) fn module(&mut self) -> Result<Module, ParseError> {
        let mut body = Vec::new();
        loop {
            self.skip_newlines();
            match self.current_kind() {
                TokenKind::Eof => break,
                TokenKind::Indent => {
                    return Err(ParseError::UnexpectedIndent {
                        span: self.current_span(),
                    })
                }
                _ => body.extend(self.statement()?),
            }
        }
        Ok(Module { body })
    }

    /// One logical line: a compound statement, or simple statements joined
    /// by `;`.
    fn statement(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.nested(Self::logical_line)
    }

    fn logical_line(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let stmt = match self.current_kind() {
            TokenKind::If => self.if_stmt()?,
            TokenKind::While => self.while_stmt()?,
            TokenKind::For => self.for_stmt()?,
            TokenKind::Def => self.def_stmt()?,
            TokenKind::Try => self.try_stmt()?,
            _ => return self.simple_line(),
        };
        Ok(vec![stmt])
    }

    fn simple_line(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = vec![self.simple_stmt()?];
        while self.eat(&TokenKind::Semicolon) {
            if matches!(self.current_kind(), TokenKind::Newline | TokenKind::Eof) {
                break;
            }
            stmts.push(self.simple_stmt()?);
        }
        if !self.eat(&TokenKind::Newline) && !self.check(&TokenKind::Eof) {
            return Err(self.expected("end of line"));
        }
        Ok(stmts)
    }

    /// `: suite` where the suite is an indented block or simple statements on
    /// the same line.
    fn block(&mut self, context: &'static str) -> Result<Vec<Stmt>, ParseError> {
        self.expect(&TokenKind::Colon)?;
        if !self.eat(&TokenKind::Newline) {
            return self.simple_line();
        }
        if !self.eat(&TokenKind::Indent) {
            return Err(ParseError::ExpectedIndent {
                context,
                span: self.current_span(),
            });
        }
        let mut body = Vec::new();
        loop {
            self.skip_newlines();
            match self.current_kind() {
                TokenKind::Dedent => {
                    self.cursor.advance();
                    break;
                }
                TokenKind::Eof => break,
                TokenKind::Indent => {
                    return Err(ParseError::UnexpectedIndent {
                        span: self.current_span(),
                    })
                }
                _ => body.extend(self.statement()?),
            }
        }
        Ok(body)
    }

    fn simple_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current_span();
        let kind = match self.current_kind() {
            TokenKind::Pass => {
                self.cursor.advance();
                StmtKind::Pass
            }
            TokenKind::Break => {
                self.cursor.advance();
                if self.loop_depth == 0 {
                    return Err(ParseError::BreakOutsideLoop { span: start });
                }
                StmtKind::Break
            }
            TokenKind::Continue => {
                self.cursor.advance();
                if self.loop_depth == 0 {
                    return Err(ParseError::ContinueOutsideLoop { span: start });
                }
                StmtKind::Continue
            }
            TokenKind::Return => {
                self.cursor.advance();
                if self.function_depth == 0 {
                    return Err(ParseError::ReturnOutsideFunction { span: start });
                }
                let value = if self.current_kind().ends_statement() {
                    None
                } else {
                    Some(self.expression_list()?)
                };
                StmtKind::Return(value)
            }
            TokenKind::Raise => {
                self.cursor.advance();
                let value = if self.current_kind().ends_statement() {
                    None
                } else {
                    Some(self.expression()?)
                };
                StmtKind::Raise(value)
            }
            TokenKind::Global => {
                self.cursor.advance();
                let mut names = vec![self.expect_name()?.0];
                while self.eat(&TokenKind::Comma) {
                    names.push(self.expect_name()?.0);
                }
                StmtKind::Global(names)
            }
            TokenKind::Assert => {
                self.cursor.advance();
                let test = self.expression()?;
                let msg = if self.eat(&TokenKind::Comma) {
                    Some(self.expression()?)
                } else {
                    None
                };
                StmtKind::Assert { test, msg }
            }
            TokenKind::Import => {
                self.cursor.advance();
                let mut names = vec![self.import_name()?];
                while self.eat(&TokenKind::Comma) {
                    names.push(self.import_name()?);
                }
                StmtKind::Import(names)
            }
            TokenKind::From => self.from_import()?,
            _ => self.expression_stmt()?,
        };
        Ok(Stmt::new(kind, self.span_from(start)))
    }

    fn dotted_name(&mut self) -> Result<(String, Span), ParseError> {
        let (mut path, start) = self.expect_name()?;
        while self.eat(&TokenKind::Dot) {
            path.push('.');
            path.push_str(&self.expect_name()?.0);
        }
        Ok((path, self.span_from(start)))
    }

    fn import_name(&mut self) -> Result<ImportName, ParseError> {
        let (path, start) = self.dotted_name()?;
        let alias = if self.eat(&TokenKind::As) {
            Some(self.expect_name()?.0)
        } else {
            None
        };
        Ok(ImportName {
            path,
            alias,
            span: self.span_from(start),
        })
    }

    fn from_import(&mut self) -> Result<StmtKind, ParseError> {
        let from_span = self.expect(&TokenKind::From)?;
        let (module, _) = self.dotted_name()?;
        self.expect(&TokenKind::Import)?;
        if self.eat(&TokenKind::Star) {
            if self.function_depth > 0 {
                return Err(ParseError::StarImportInFunction {
                    span: self.span_from(from_span),
                });
            }
            return Ok(StmtKind::ImportFrom {
                module,
                names: ImportNames::Star,
            });
        }
        let parenthesized = self.eat(&TokenKind::LParen);
        let mut names = Vec::new();
        loop {
            let (path, start) = self.expect_name()?;
            let alias = if self.eat(&TokenKind::As) {
                Some(self.expect_name()?.0)
            } else {
                None
            };
            names.push(ImportName {
                path,
                alias,
                span: self.span_from(start),
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
            if parenthesized && self.check(&TokenKind::RParen) {
                break;
            }
        }
        if parenthesized {
            self.expect(&TokenKind::RParen)?;
        }
        Ok(StmtKind::ImportFrom {
            module,
            names: ImportNames::List(names),
        })
    }

    /// Expression statement, assignment, augmented or annotated assignment.
    fn expression_stmt(&mut self) -> Result<StmtKind, ParseError> {
        let first = self.expression_list()?;

        if let Some(op) = self.match_augmented_op() {
            let target = self.to_target(first)?;
            if let Target::Tuple(_, span) = target {
                return Err(ParseError::InvalidTarget {
                    what: "tuple in augmented assignment",
                    span,
                });
            }
            self.cursor.advance();
            let value = self.expression_list()?;
            return Ok(StmtKind::AugAssign { target, op, value });
        }

        if self.check(&TokenKind::Colon) {
            // Annotated assignment: the annotation is parsed and dropped.
            let target = self.to_target(first)?;
            self.cursor.advance();
            self.expression()?;
            if !self.eat(&TokenKind::Eq) {
                return Ok(StmtKind::Pass);
            }
            let value = self.expression_list()?;
            return Ok(StmtKind::Assign {
                targets: vec![target],
                value,
            });
        }

        if !self.check(&TokenKind::Eq) {
            return Ok(StmtKind::Expr(first));
        }

        let mut targets = vec![self.to_target(first)?];
        let mut value;
        loop {
            self.expect(&TokenKind::Eq)?;
            value = self.expression_list()?;
            if !self.check(&TokenKind::Eq) {
                break;
            }
            targets.push(self.to_target(value)?);
        }
        Ok(StmtKind::Assign { targets, value })
    }

    fn match_augmented_op(&self) -> Option<BinaryOp> {
        match self.current_kind() {
            TokenKind::PlusEq => Some(BinaryOp::Add),
            TokenKind::MinusEq => Some(BinaryOp::Sub),
            TokenKind::StarEq => Some(BinaryOp::Mul),
            TokenKind::SlashEq => Some(BinaryOp::Div),
            TokenKind::DoubleSlashEq => Some(BinaryOp::FloorDiv),
            TokenKind::PercentEq => Some(BinaryOp::Mod),
            TokenKind::DoubleStarEq => Some(BinaryOp::Pow),
            _ => None,
        }
    }

    /// Convert a parsed expression into an assignment target.
    pub(crate) fn to_target(&self, expr: Expr) -> Result<Target, ParseError> {
        let span = expr.span;
        match expr.into_kind() {
            ExprKind::Name(name) => Ok(Target::Name(name, span)),
            ExprKind::Tuple(items) | ExprKind::List(items) => {
                let targets = items
                    .into_iter()
                    .map(|item| self.to_target(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Target::Tuple(targets, span))
            }
            ExprKind::Subscript { object, index } => Ok(Target::Subscript {
                object,
                index,
                span,
            }),
            ExprKind::Attribute { object, name } => Ok(Target::Attribute { object, name, span }),
            other => Err(ParseError::InvalidTarget {
                what: describe_target(&other),
                span,
            }),
        }
    }

    fn if_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.advance().span;
        let test = self.expression()?;
        let body = self.block("'if' statement")?;
        let orelse = self.else_chain()?;
        Ok(Stmt::new(
            StmtKind::If { test, body, orelse },
            self.span_from(start),
        ))
    }

    /// `elif` clauses nest as an `if` inside the `else` branch.
    fn else_chain(&mut self) -> Result<Vec<Stmt>, ParseError> {
        if self.check(&TokenKind::Elif) {
            let start = self.cursor.advance().span;
            let test = self.expression()?;
            let body = self.block("'elif' statement")?;
            let orelse = self.else_chain()?;
            return Ok(vec![Stmt::new(
                StmtKind::If { test, body, orelse },
                self.span_from(start),
            )]);
        }
        self.else_block()
    }

    fn else_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        if self.eat(&TokenKind::Else) {
            self.block("'else' statement")
        } else {
            Ok(Vec::new())
        }
    }

    fn loop_body(&mut self, context: &'static str) -> Result<Vec<Stmt>, ParseError> {
        self.loop_depth += 1;
        let body = self.block(context);
        self.loop_depth -= 1;
        body
    }

    fn while_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.advance().span;
        let test = self.expression()?;
        let body = self.loop_body("'while' statement")?;
        let orelse = self.else_block()?;
        Ok(Stmt::new(
            StmtKind::While { test, body, orelse },
            self.span_from(start),
        ))
    }

    fn for_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.advance().span;
        let target = self.target_list()?;
        self.expect(&TokenKind::In)?;
        let iter = self.expression_list()?;
        let body = self.loop_body("'for' statement")?;
        let orelse = self.else_block()?;
        Ok(Stmt::new(
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
            },
            self.span_from(start),
        ))
    }

    fn def_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.advance().span;
        let (name, _) = self.expect_name()?;
        self.expect(&TokenKind::LParen)?;
        let params = self.params(&TokenKind::RParen, true)?;
        self.expect(&TokenKind::RParen)?;
        if self.check(&TokenKind::Minus) && matches!(self.cursor.peek_kind_at(1), TokenKind::Gt) {
            // Return annotation, parsed and dropped.
            self.cursor.advance();
            self.cursor.advance();
            self.expression()?;
        }

        let saved_loops = std::mem::replace(&mut self.loop_depth, 0);
        self.function_depth += 1;
        let body = self.block("function definition");
        self.function_depth -= 1;
        self.loop_depth = saved_loops;
        let body = body?;

        let span = self.span_from(start);
        let def = FunctionDef::new(name, params, body, span);
        Ok(Stmt::new(StmtKind::FunctionDef(Rc::new(def)), span))
    }

    /// Parameter list up to (not including) `close`. Annotations are allowed
    /// only in `def`.
    pub(crate) fn params(
        &mut self,
        close: &TokenKind,
        annotations: bool,
    ) -> Result<Vec<Param>, ParseError> {
        let mut params: Vec<Param> = Vec::new();
        while !self.check(close) {
            let (name, start) = self.expect_name()?;
            if params.iter().any(|p| p.name == name) {
                return Err(ParseError::DuplicateParam { name, span: start });
            }
            if annotations && self.eat(&TokenKind::Colon) {
                self.expression()?;
            }
            let default = if self.eat(&TokenKind::Eq) {
                Some(self.expression()?)
            } else {
                if params.iter().any(|p| p.default.is_some()) {
                    return Err(ParseError::NonDefaultAfterDefault { span: start });
                }
                None
            };
            params.push(Param {
                name,
                default,
                span: self.span_from(start),
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(params)
    }

    fn try_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.advance().span;
        let body = self.block("'try' statement")?;

        let mut handlers: Vec<ExceptHandler> = Vec::new();
        loop {
            if !self.check(&TokenKind::Except) {
                break;
            }
            let handler_start = self.cursor.advance().span;
            if handlers.last().is_some_and(|h| h.kind.is_none()) {
                return Err(ParseError::DefaultExceptNotLast {
                    span: handler_start,
                });
            }
            let (kind, name) = if self.check(&TokenKind::Colon) {
                (None, None)
            } else {
                let kind = self.expression()?;
                let name = if self.eat(&TokenKind::As) {
                    Some(self.expect_name()?.0)
                } else {
                    None
                };
                (Some(kind), name)
            };
            let handler_body = self.block("'except' statement")?;
            handlers.push(ExceptHandler {
                kind,
                name,
                body: handler_body,
                span: self.span_from(handler_start),
            });
        }

        let orelse = if handlers.is_empty() {
            Vec::new()
        } else {
            self.else_block()?
        };

        let finalbody = if self.eat(&TokenKind::Finally) {
            self.block("'finally' statement")?
        } else {
            if handlers.is_empty() {
                return Err(ParseError::MissingHandler {
                    span: self.current_span(),
                });
            }
            Vec::new()
        };

        Ok(Stmt::new(
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            },
            self.span_from(start),
        ))
    }
}

fn describe_target(kind: &ExprKind) -> &'static str {
    match kind {
        ExprKind::None | ExprKind::Bool(_) => "constant",
        ExprKind::Int(_) | ExprKind::Float(_) | ExprKind::Str(_) | ExprKind::FString(_) => {
            "literal"
        }
        ExprKind::Call { .. } => "function call",
        ExprKind::Lambda(_) => "lambda",
        ExprKind::Comprehension(_) => "comprehension",
        ExprKind::Dict(_) => "dict literal",
        ExprKind::IfExp { .. } => "conditional expression",
        ExprKind::Compare { .. } => "comparison",
        _ => "expression",
    }
}
