//! Pytex IR - tokens, spans and the syntax tree shared by the lexer, parser
//! and evaluator of the embedded pytex language.
//!
//! Nothing in this crate performs work on its own; it is the vocabulary the
//! other `pytex_*` crates speak.

pub mod ast;
pub mod format_spec;
mod span;
mod token;

pub use ast::{
    Argument, BinaryOp, BoolOp, CmpOp, Comprehension, ComprehensionClause, ComprehensionKind,
    ExceptHandler, Expr, ExprKind, FStringPart, FunctionDef, ImportName, ImportNames, LambdaDef,
    Module, Param, Stmt, StmtKind, Target, UnaryOp,
};
pub use span::Span;
pub use token::{Token, TokenKind};
