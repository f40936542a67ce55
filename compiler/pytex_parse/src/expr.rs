//! Expression grammar, lowest to highest precedence:
//!
//! ```text
//! expression_list := expression ("," expression)* [","]
//! expression      := lambda | or_test ["if" or_test "else" expression]
//! or_test         := and_test ("or" and_test)*
//! and_test        := not_test ("and" not_test)*
//! not_test        := "not" not_test | comparison
//! comparison      := arith (cmp_op arith)*
//! arith           := term (("+" | "-") term)*
//! term            := factor (("*" | "/" | "//" | "%") factor)*
//! factor          := ("+" | "-") factor | power
//! power           := postfix ["**" factor]
//! postfix         := atom (call | subscript | "." NAME)*
//! ```

use std::rc::Rc;

use pytex_ir::{
    Argument, BinaryOp, BoolOp, CmpOp, Comprehension, ComprehensionClause, ComprehensionKind,
    Expr, ExprKind, FStringPart, LambdaDef, Target, TokenKind, UnaryOp,
};

use crate::{fstring, ParseError, Parser};

/// Whether a token can begin an expression.
fn starts_expression(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Name(_)
            | TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Str(_)
            | TokenKind::FString { .. }
            | TokenKind::True
            | TokenKind::False
            | TokenKind::None
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::LBrace
            | TokenKind::Minus
            | TokenKind::Plus
            | TokenKind::Not
            | TokenKind::Lambda
    )
}

impl Parser<'_> {
    /// Comma-separated expressions; more than one (or a trailing comma)
    /// builds a tuple.
    pub(crate) fn expression_list(&mut self) -> Result<Expr, ParseError> {
        let first = self.expression()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let start = first.span;
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if !starts_expression(self.current_kind()) {
                break;
            }
            items.push(self.expression()?);
        }
        Ok(Expr::new(ExprKind::Tuple(items), self.span_from(start)))
    }

    pub(crate) fn expression(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::conditional)
    }

    fn conditional(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Lambda) {
            return self.lambda();
        }
        let body = self.or_test()?;
        if !self.eat(&TokenKind::If) {
            return Ok(body);
        }
        let test = self.or_test()?;
        self.expect(&TokenKind::Else)?;
        let orelse = self.expression()?;
        let span = body.span.merge(orelse.span);
        Ok(Expr::new(
            ExprKind::IfExp {
                test: Box::new(test),
                body: Box::new(body),
                orelse: Box::new(orelse),
            },
            span,
        ))
    }

    fn lambda(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.advance().span;
        let params = self.params(&TokenKind::Colon, false)?;
        self.expect(&TokenKind::Colon)?;
        let body = self.expression()?;
        let span = self.span_from(start);
        Ok(Expr::new(
            ExprKind::Lambda(Rc::new(LambdaDef { params, body, span })),
            span,
        ))
    }

    fn or_test(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.and_test()?;
        while self.eat(&TokenKind::Or) {
            let right = self.and_test()?;
            left = logical(BoolOp::Or, left, right);
        }
        Ok(left)
    }

    fn and_test(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.not_test()?;
        while self.eat(&TokenKind::And) {
            let right = self.not_test()?;
            left = logical(BoolOp::And, left, right);
        }
        Ok(left)
    }

    fn not_test(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Not) {
            let start = self.cursor.advance().span;
            let operand = self.nested(Self::not_test)?;
            let span = start.merge(operand.span);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.comparison()
    }

    fn match_comparison_op(&mut self) -> Option<CmpOp> {
        let op = match self.current_kind() {
            TokenKind::EqEq => CmpOp::Eq,
            TokenKind::NotEq => CmpOp::NotEq,
            TokenKind::Lt => CmpOp::Lt,
            TokenKind::LtEq => CmpOp::LtEq,
            TokenKind::Gt => CmpOp::Gt,
            TokenKind::GtEq => CmpOp::GtEq,
            TokenKind::In => CmpOp::In,
            TokenKind::Not if matches!(self.cursor.peek_kind_at(1), TokenKind::In) => {
                self.cursor.advance();
                CmpOp::NotIn
            }
            TokenKind::Is => {
                if matches!(self.cursor.peek_kind_at(1), TokenKind::Not) {
                    self.cursor.advance();
                    CmpOp::IsNot
                } else {
                    CmpOp::Is
                }
            }
            _ => return None,
        };
        self.cursor.advance();
        Some(op)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.arith()?;
        let mut rest = Vec::new();
        while let Some(op) = self.match_comparison_op() {
            rest.push((op, self.arith()?));
        }
        if rest.is_empty() {
            return Ok(left);
        }
        let span = rest
            .last()
            .map_or(left.span, |(_, right)| left.span.merge(right.span));
        Ok(Expr::new(
            ExprKind::Compare {
                left: Box::new(left),
                rest,
            },
            span,
        ))
    }

    fn arith(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.term()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.term()?;
            left = binary(op, left, right);
        }
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.factor()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::DoubleSlash => BinaryOp::FloorDiv,
                TokenKind::Percent => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.factor()?;
            left = binary(op, left, right);
        }
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Pos,
            _ => return self.power(),
        };
        let start = self.cursor.advance().span;
        let operand = self.nested(Self::factor)?;
        let span = start.merge(operand.span);
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    /// `**` is right-associative and binds tighter than a unary operator on
    /// its left: `-2 ** 2 == -4`, `2 ** -1 == 0.5`.
    fn power(&mut self) -> Result<Expr, ParseError> {
        let base = self.postfix()?;
        if !self.eat(&TokenKind::DoubleStar) {
            return Ok(base);
        }
        let exponent = self.factor()?;
        Ok(binary(BinaryOp::Pow, base, exponent))
    }

    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.atom()?;
        loop {
            match self.current_kind() {
                TokenKind::LParen => {
                    self.cursor.advance();
                    let args = self.call_args()?;
                    self.expect(&TokenKind::RParen)?;
                    let span = self.span_from(expr.span);
                    expr = Expr::new(
                        ExprKind::Call {
                            func: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    let index = self.subscript()?;
                    self.expect(&TokenKind::RBracket)?;
                    let span = self.span_from(expr.span);
                    expr = Expr::new(
                        ExprKind::Subscript {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                TokenKind::Dot => {
                    self.cursor.advance();
                    let (name, _) = self.expect_name()?;
                    let span = self.span_from(expr.span);
                    expr = Expr::new(
                        ExprKind::Attribute {
                            object: Box::new(expr),
                            name,
                        },
                        span,
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    fn call_args(&mut self) -> Result<Vec<Argument>, ParseError> {
        let mut args: Vec<Argument> = Vec::new();
        while !self.check(&TokenKind::RParen) {
            let start = self.current_span();
            let keyword = match (self.current_kind(), self.cursor.peek_kind_at(1)) {
                (TokenKind::Name(name), TokenKind::Eq) => Some(name.clone()),
                _ => None,
            };
            if let Some(name) = keyword {
                self.cursor.advance();
                self.cursor.advance();
                if args.iter().any(|a| a.name.as_deref() == Some(name.as_str())) {
                    return Err(ParseError::RepeatedKeyword { name, span: start });
                }
                let value = self.expression()?;
                args.push(Argument {
                    name: Some(name),
                    value,
                    span: self.span_from(start),
                });
            } else {
                if args.iter().any(|a| a.name.is_some()) {
                    return Err(ParseError::PositionalAfterKeyword { span: start });
                }
                let mut value = self.expression()?;
                if self.check(&TokenKind::For) {
                    value = self.comprehension(ComprehensionKind::Generator, value)?;
                    if !args.is_empty() || !self.check(&TokenKind::RParen) {
                        return Err(ParseError::UnparenthesizedGenerator { span: value.span });
                    }
                }
                args.push(Argument {
                    name: None,
                    value,
                    span: self.span_from(start),
                });
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(args)
    }

    /// Index inside `[...]`: an expression, a slice, or a tuple of them.
    fn subscript(&mut self) -> Result<Expr, ParseError> {
        let first = self.subscript_item()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let start = first.span;
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.check(&TokenKind::RBracket) {
                break;
            }
            items.push(self.subscript_item()?);
        }
        Ok(Expr::new(ExprKind::Tuple(items), self.span_from(start)))
    }

    fn subscript_item(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let lower = if self.check(&TokenKind::Colon) {
            None
        } else {
            let expr = self.expression()?;
            if !self.check(&TokenKind::Colon) {
                return Ok(expr);
            }
            Some(Box::new(expr))
        };
        self.expect(&TokenKind::Colon)?;
        let upper = self.optional_slice_part()?;
        let step = if self.eat(&TokenKind::Colon) {
            self.optional_slice_part()?
        } else {
            None
        };
        Ok(Expr::new(
            ExprKind::Slice { lower, upper, step },
            self.span_from(start),
        ))
    }

    fn optional_slice_part(&mut self) -> Result<Option<Box<Expr>>, ParseError> {
        if starts_expression(self.current_kind()) {
            Ok(Some(Box::new(self.expression()?)))
        } else {
            Ok(None)
        }
    }

    /// Loop target of `for` statements and comprehension clauses.
    pub(crate) fn target_list(&mut self) -> Result<Target, ParseError> {
        let first = self.arith()?;
        if !self.check(&TokenKind::Comma) {
            return self.to_target(first);
        }
        let start = first.span;
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.check(&TokenKind::In) {
                break;
            }
            items.push(self.arith()?);
        }
        let span = self.span_from(start);
        self.to_target(Expr::new(ExprKind::Tuple(items), span))
    }

    /// Clauses after the element of a comprehension; the cursor is on the
    /// first `for`.
    fn comprehension(&mut self, kind: ComprehensionKind, element: Expr) -> Result<Expr, ParseError> {
        let start = element.span;
        let mut clauses = Vec::new();
        loop {
            if self.eat(&TokenKind::For) {
                let target = self.target_list()?;
                self.expect(&TokenKind::In)?;
                let iter = self.or_test()?;
                clauses.push(ComprehensionClause::For { target, iter });
            } else if self.eat(&TokenKind::If) {
                clauses.push(ComprehensionClause::If(self.or_test()?));
            } else {
                break;
            }
        }
        let span = self.span_from(start);
        Ok(Expr::new(
            ExprKind::Comprehension(Box::new(Comprehension {
                kind,
                element,
                clauses,
            })),
            span,
        ))
    }

    fn atom(&mut self) -> Result<Expr, ParseError> {
        let span = self.current_span();
        let kind = match self.current_kind() {
            TokenKind::Name(name) => ExprKind::Name(name.clone()),
            TokenKind::Int(value) => ExprKind::Int(*value),
            TokenKind::Float(value) => ExprKind::Float(*value),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::None => ExprKind::None,
            TokenKind::Str(_) | TokenKind::FString { .. } => return self.strings(),
            TokenKind::LParen => return self.paren(),
            TokenKind::LBracket => return self.list(),
            TokenKind::LBrace => return self.dict(),
            _ => return Err(self.expected("an expression")),
        };
        self.cursor.advance();
        Ok(Expr::new(kind, span))
    }

    /// Adjacent string literals concatenate; any f-string among them makes
    /// the whole an f-string.
    fn strings(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let mut parts: Vec<FStringPart> = Vec::new();
        let mut formatted = false;
        loop {
            let token = self.cursor.current().clone();
            match token.kind {
                TokenKind::Str(text) => push_literal(&mut parts, &text),
                TokenKind::FString { body, raw } => {
                    formatted = true;
                    for part in fstring::parse(self.source, token.span, &body, raw)? {
                        match part {
                            FStringPart::Literal(text) => push_literal(&mut parts, &text),
                            field @ FStringPart::Field { .. } => parts.push(field),
                        }
                    }
                }
                _ => break,
            }
            self.cursor.advance();
        }
        let span = self.span_from(start);
        if formatted {
            return Ok(Expr::new(ExprKind::FString(parts), span));
        }
        let text = match parts.pop() {
            Some(FStringPart::Literal(text)) => text,
            _ => String::new(),
        };
        Ok(Expr::new(ExprKind::Str(Rc::from(text)), span))
    }

    /// `()`, `(expr)`, `(a, b)` or `(x for x in xs)`.
    fn paren(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.advance().span;
        if self.eat(&TokenKind::RParen) {
            return Ok(Expr::new(ExprKind::Tuple(Vec::new()), self.span_from(start)));
        }
        let first = self.expression()?;
        let kind = if self.check(&TokenKind::For) {
            let comprehension = self.comprehension(ComprehensionKind::Generator, first)?;
            comprehension.into_kind()
        } else if self.check(&TokenKind::Comma) {
            let mut items = vec![first];
            while self.eat(&TokenKind::Comma) {
                if self.check(&TokenKind::RParen) {
                    break;
                }
                items.push(self.expression()?);
            }
            ExprKind::Tuple(items)
        } else {
            self.expect(&TokenKind::RParen)?;
            // Keep the inner node; widen the span over the parentheses.
            return Ok(Expr::new(first.into_kind(), self.span_from(start)));
        };
        self.expect(&TokenKind::RParen)?;
        Ok(Expr::new(kind, self.span_from(start)))
    }

    fn list(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.advance().span;
        if self.eat(&TokenKind::RBracket) {
            return Ok(Expr::new(ExprKind::List(Vec::new()), self.span_from(start)));
        }
        let first = self.expression()?;
        let kind = if self.check(&TokenKind::For) {
            self.comprehension(ComprehensionKind::List, first)?.into_kind()
        } else {
            let mut items = vec![first];
            while self.eat(&TokenKind::Comma) {
                if self.check(&TokenKind::RBracket) {
                    break;
                }
                items.push(self.expression()?);
            }
            ExprKind::List(items)
        };
        self.expect(&TokenKind::RBracket)?;
        Ok(Expr::new(kind, self.span_from(start)))
    }

    fn dict(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.advance().span;
        let mut entries = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let key = self.expression()?;
            self.expect(&TokenKind::Colon)?;
            let value = self.expression()?;
            entries.push((key, value));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Expr::new(ExprKind::Dict(entries), self.span_from(start)))
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    Expr::new(
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}

fn logical(op: BoolOp, left: Expr, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    Expr::new(
        ExprKind::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}

fn push_literal(parts: &mut Vec<FStringPart>, text: &str) {
    if let Some(FStringPart::Literal(last)) = parts.last_mut() {
        last.push_str(text);
    } else {
        parts.push(FStringPart::Literal(text.to_owned()));
    }
}

