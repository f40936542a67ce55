//! Parser for the pytex embedded language.
//!
//! Recursive descent over the token list produced by `pytex_lexer`.
//! Statements are parsed in `stmt`, expressions by precedence climbing in
//! `expr`, and f-string bodies are split and sub-parsed in `fstring`.

mod cursor;
mod expr;
mod fstring;
mod stmt;

use pytex_ir::{Expr, Module, Span, TokenKind};
use pytex_lexer::LexError;
use pytex_stack::ensure_sufficient_stack;

use cursor::Cursor;

/// Parse failure. Reported to user code as `SyntaxError`, or
/// `IndentationError` when [`ParseError::is_indentation`] holds.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("expected {expected}, found {found}")]
    Expected {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("unexpected indent")]
    UnexpectedIndent { span: Span },
    #[error("expected an indented block after {context}")]
    ExpectedIndent { context: &'static str, span: Span },
    #[error("cannot assign to {what}")]
    InvalidTarget { what: &'static str, span: Span },
    #[error("'break' outside loop")]
    BreakOutsideLoop { span: Span },
    #[error("'continue' not properly in loop")]
    ContinueOutsideLoop { span: Span },
    #[error("'return' outside function")]
    ReturnOutsideFunction { span: Span },
    #[error("positional argument follows keyword argument")]
    PositionalAfterKeyword { span: Span },
    #[error("keyword argument repeated: {name}")]
    RepeatedKeyword { name: String, span: Span },
    #[error("parameter without a default follows parameter with a default")]
    NonDefaultAfterDefault { span: Span },
    #[error("duplicate argument '{name}' in function definition")]
    DuplicateParam { name: String, span: Span },
    #[error("Generator expression must be parenthesized")]
    UnparenthesizedGenerator { span: Span },
    #[error("import * only allowed at module level")]
    StarImportInFunction { span: Span },
    #[error("expected 'except' or 'finally' block")]
    MissingHandler { span: Span },
    #[error("default 'except:' must be last")]
    DefaultExceptNotLast { span: Span },
    #[error("f-string: {message}")]
    FString { message: String, span: Span },
    #[error("too many nested expressions and blocks")]
    TooDeeplyNested { span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Lex(err) => err.span(),
            ParseError::Expected { span, .. }
            | ParseError::UnexpectedIndent { span }
            | ParseError::ExpectedIndent { span, .. }
            | ParseError::InvalidTarget { span, .. }
            | ParseError::BreakOutsideLoop { span }
            | ParseError::ContinueOutsideLoop { span }
            | ParseError::ReturnOutsideFunction { span }
            | ParseError::PositionalAfterKeyword { span }
            | ParseError::RepeatedKeyword { span, .. }
            | ParseError::NonDefaultAfterDefault { span }
            | ParseError::DuplicateParam { span, .. }
            | ParseError::UnparenthesizedGenerator { span }
            | ParseError::StarImportInFunction { span }
            | ParseError::MissingHandler { span }
            | ParseError::DefaultExceptNotLast { span }
            | ParseError::FString { span, .. }
            | ParseError::TooDeeplyNested { span } => *span,
        }
    }

    /// Whether this is an indentation error rather than a plain syntax error.
    pub fn is_indentation(&self) -> bool {
        match self {
            ParseError::Lex(err) => err.is_indentation(),
            ParseError::UnexpectedIndent { .. } | ParseError::ExpectedIndent { .. } => true,
            _ => false,
        }
    }
}

/// Parse a block of statements.
pub fn parse_module(source: &str) -> Result<Module, ParseError> {
    let tokens = pytex_lexer::lex(source)?;
    let mut parser = Parser::new(source, tokens);
    let module = parser.module()?;
    tracing::trace!(statements = module.body.len(), "parsed module");
    Ok(module)
}

/// Parse a single expression (a bare tuple is allowed) filling all of
/// `source`.
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    let tokens = pytex_lexer::lex(source)?;
    let mut parser = Parser::new(source, tokens);
    parser.skip_newlines();
    let expr = parser.expression_list()?;
    parser.skip_newlines();
    parser.expect_end()?;
    Ok(expr)
}

/// Recursive-descent parser state.
/// Deepest expression or block nesting accepted.
pub const MAX_NESTING: u32 = 1000;

pub(crate) struct Parser<'a> {
    source: &'a str,
    cursor: Cursor,
    /// Nesting depth of `def` bodies; `return` is only valid inside one.
    function_depth: u32,
    /// Nesting depth of loop bodies in the current function.
    loop_depth: u32,
    /// Recursion depth of nested expressions and statements.
    nesting: u32,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, tokens: Vec<pytex_ir::Token>) -> Self {
        Parser {
            source,
            cursor: Cursor::new(tokens),
            function_depth: 0,
            loop_depth: 0,
            nesting: 0,
        }
    }

    /// Run a recursive production one nesting level deeper, failing past
    /// [`MAX_NESTING`].
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.nesting >= MAX_NESTING {
            return Err(ParseError::TooDeeplyNested {
                span: self.current_span(),
            });
        }
        self.nesting += 1;
        let result = ensure_sufficient_stack(|| parse(self));
        self.nesting -= 1;
        result
    }

    #[inline]
    pub(crate) fn current_kind(&self) -> &TokenKind {
        self.cursor.current_kind()
    }

    #[inline]
    pub(crate) fn current_span(&self) -> Span {
        self.cursor.current_span()
    }

    #[inline]
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.cursor.check(kind)
    }

    #[inline]
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        self.cursor.eat(kind)
    }

    /// Error for an unexpected current token.
    pub(crate) fn expected(&self, expected: impl Into<String>) -> ParseError {
        let found = self.current_kind().to_string();
        ParseError::Expected {
            expected: expected.into(),
            found,
            span: self.current_span(),
        }
    }

    /// Consume a token of `kind` or fail with "expected `kind`".
    pub(crate) fn expect(&mut self, kind: &TokenKind) -> Result<Span, ParseError> {
        if self.check(kind) {
            Ok(self.cursor.advance().span)
        } else {
            Err(self.expected(kind.to_string()))
        }
    }

    pub(crate) fn expect_name(&mut self) -> Result<(String, Span), ParseError> {
        if let TokenKind::Name(name) = self.current_kind() {
            let name = name.clone();
            let span = self.cursor.advance().span;
            Ok((name, span))
        } else {
            Err(self.expected("a name"))
        }
    }

    pub(crate) fn skip_newlines(&mut self) {
        while self.eat(&TokenKind::Newline) {}
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        if self.cursor.is_at_end() {
            Ok(())
        } else {
            Err(self.expected("end of input"))
        }
    }

    /// Span from `start` through the last consumed token.
    pub(crate) fn span_from(&self, start: Span) -> Span {
        start.merge(self.cursor.previous_span())
    }
}

#[cfg(test)]
mod tests;
