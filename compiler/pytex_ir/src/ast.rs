//! Syntax tree for the pytex language.
//!
//! A plain owned tree: statements and expressions carry their spans, function
//! and lambda definitions sit behind `Rc` so that function values can share
//! them with the tree they were defined in.

use std::rc::Rc;

use pytex_stack::ensure_sufficient_stack;

use crate::Span;

/// A parsed block of source: the unit the evaluator executes.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Module {
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    /// `a = b = value`; targets are assigned left to right.
    Assign {
        targets: Vec<Target>,
        value: Expr,
    },
    AugAssign {
        target: Target,
        op: BinaryOp,
        value: Expr,
    },
    Pass,
    Break,
    Continue,
    Return(Option<Expr>),
    Raise(Option<Expr>),
    Global(Vec<String>),
    Assert {
        test: Expr,
        msg: Option<Expr>,
    },
    Import(Vec<ImportName>),
    ImportFrom {
        module: String,
        names: ImportNames,
    },
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    While {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    For {
        target: Target,
        iter: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    FunctionDef(Rc<FunctionDef>),
    Try {
        body: Vec<Stmt>,
        handlers: Vec<ExceptHandler>,
        orelse: Vec<Stmt>,
        finalbody: Vec<Stmt>,
    },
}

/// `import a.b as c`: `path` is the dotted module name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportName {
    pub path: String,
    pub alias: Option<String>,
    pub span: Span,
}

impl ImportName {
    /// Name bound by a plain `import`: the alias, or the first path component.
    pub fn bound_name(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self.path.split('.').next().unwrap_or(&self.path),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportNames {
    Star,
    List(Vec<ImportName>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExceptHandler {
    /// Exception type filter; `None` for a bare `except:`.
    pub kind: Option<Expr>,
    pub name: Option<String>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub default: Option<Expr>,
    pub span: Span,
}

/// A `def` statement.
///
/// `locals` is every name the body binds that is not declared `global`;
/// those names never resolve past the function's own frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub span: Span,
    locals: Vec<String>,
    globals: Vec<String>,
}

impl FunctionDef {
    pub fn new(name: String, params: Vec<Param>, body: Vec<Stmt>, span: Span) -> Self {
        let mut bindings = Bindings::default();
        for param in &params {
            bindings.bound.push(param.name.clone());
        }
        bindings.block(&body);
        let Bindings { mut bound, mut globals } = bindings;
        globals.sort_unstable();
        globals.dedup();
        bound.retain(|name| globals.binary_search(name).is_err());
        bound.sort_unstable();
        bound.dedup();
        FunctionDef {
            name,
            params,
            body,
            span,
            locals: bound,
            globals,
        }
    }

    /// Whether `name` is local to this function.
    pub fn is_local(&self, name: &str) -> bool {
        self.locals
            .binary_search_by(|probe| probe.as_str().cmp(name))
            .is_ok()
    }

    /// Whether `name` is declared `global` in this function.
    pub fn is_global(&self, name: &str) -> bool {
        self.globals
            .binary_search_by(|probe| probe.as_str().cmp(name))
            .is_ok()
    }

    pub fn locals(&self) -> &[String] {
        &self.locals
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LambdaDef {
    pub params: Vec<Param>,
    pub body: Expr,
    pub span: Span,
}

impl LambdaDef {
    pub fn is_local(&self, name: &str) -> bool {
        self.params.iter().any(|param| param.name == name)
    }
}

/// Assignment target.
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    Name(String, Span),
    Tuple(Vec<Target>, Span),
    Subscript {
        object: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    Attribute {
        object: Box<Expr>,
        name: String,
        span: Span,
    },
}

impl Target {
    pub fn span(&self) -> Span {
        match self {
            Target::Name(_, span) | Target::Tuple(_, span) => *span,
            Target::Subscript { span, .. } | Target::Attribute { span, .. } => *span,
        }
    }

    /// Visit every plain name this target binds.
    pub fn for_each_name(&self, f: &mut impl FnMut(&str)) {
        match self {
            Target::Name(name, _) => f(name),
            Target::Tuple(items, _) => {
                for item in items {
                    item.for_each_name(f);
                }
            }
            Target::Subscript { .. } | Target::Attribute { .. } => {}
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    /// Take the node's kind, leaving `None` behind.
    pub fn into_kind(mut self) -> ExprKind {
        std::mem::replace(&mut self.kind, ExprKind::None)
    }
}

/// Children are dropped on a grown stack; left-deep chains such as
/// `a.b.c...` or `1 + 1 + ...` are not bounded by the parser's nesting limit.
impl Drop for Expr {
    fn drop(&mut self) {
        match self.kind {
            ExprKind::Name(_)
            | ExprKind::None
            | ExprKind::Bool(_)
            | ExprKind::Int(_)
            | ExprKind::Float(_)
            | ExprKind::Str(_) => {}
            _ => {
                let kind = std::mem::replace(&mut self.kind, ExprKind::None);
                ensure_sufficient_stack(move || drop(kind));
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Name(String),
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    FString(Vec<FStringPart>),
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Short-circuit `and`/`or`.
    Logical {
        op: BoolOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Chained comparison `a < b <= c`.
    Compare {
        left: Box<Expr>,
        rest: Vec<(CmpOp, Expr)>,
    },
    /// `body if test else orelse`
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    Lambda(Rc<LambdaDef>),
    Call {
        func: Box<Expr>,
        args: Vec<Argument>,
    },
    Attribute {
        object: Box<Expr>,
        name: String,
    },
    Subscript {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    /// `lower:upper:step`; only valid as a subscript index.
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    Comprehension(Box<Comprehension>),
}

/// Piece of an f-string.
#[derive(Clone, Debug, PartialEq)]
pub enum FStringPart {
    Literal(String),
    Field {
        expr: Expr,
        /// `r` or `s` from `!r` / `!s`.
        conversion: Option<char>,
        /// Format spec; may itself contain nested fields.
        spec: Vec<FStringPart>,
    },
}

/// Call argument; `name` is set for keyword arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct Argument {
    pub name: Option<String>,
    pub value: Expr,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ComprehensionKind {
    /// `[x for x in xs]`
    List,
    /// `(x for x in xs)`, collected eagerly.
    Generator,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Comprehension {
    pub kind: ComprehensionKind,
    pub element: Expr,
    /// Always starts with a `For` clause.
    pub clauses: Vec<ComprehensionClause>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ComprehensionClause {
    For { target: Target, iter: Expr },
    If(Expr),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

impl BinaryOp {
    /// Returns the source-level symbol for this operator.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::FloorDiv => "//",
            Self::Mod => "%",
            Self::Pow => "**",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    In,
    NotIn,
    Is,
    IsNot,
}

impl CmpOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::Is => "is",
            Self::IsNot => "is not",
        }
    }
}

/// Names bound and declared global by a function body.
///
/// Nested `def` bodies, lambdas and comprehensions have their own scopes and
/// are not entered; a nested `def` binds only its own name.
#[derive(Default)]
struct Bindings {
    bound: Vec<String>,
    globals: Vec<String>,
}

impl Bindings {
    fn block(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.stmt(stmt);
        }
    }

    fn target(&mut self, target: &Target) {
        target.for_each_name(&mut |name| self.bound.push(name.to_owned()));
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Assign { targets, .. } => {
                for target in targets {
                    self.target(target);
                }
            }
            StmtKind::AugAssign { target, .. } => self.target(target),
            StmtKind::Global(names) => self.globals.extend(names.iter().cloned()),
            StmtKind::Import(names) => {
                for name in names {
                    self.bound.push(name.bound_name().to_owned());
                }
            }
            StmtKind::ImportFrom {
                names: ImportNames::List(names),
                ..
            } => {
                for name in names {
                    self.bound
                        .push(name.alias.clone().unwrap_or_else(|| name.path.clone()));
                }
            }
            StmtKind::If { body, orelse, .. } | StmtKind::While { body, orelse, .. } => {
                self.block(body);
                self.block(orelse);
            }
            StmtKind::For {
                target,
                body,
                orelse,
                ..
            } => {
                self.target(target);
                self.block(body);
                self.block(orelse);
            }
            StmtKind::FunctionDef(def) => self.bound.push(def.name.clone()),
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => {
                self.block(body);
                for handler in handlers {
                    if let Some(name) = &handler.name {
                        self.bound.push(name.clone());
                    }
                    self.block(&handler.body);
                }
                self.block(orelse);
                self.block(finalbody);
            }
            StmtKind::Expr(_)
            | StmtKind::ImportFrom {
                names: ImportNames::Star,
                ..
            }
            | StmtKind::Pass
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Return(_)
            | StmtKind::Raise(_)
            | StmtKind::Assert { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests;
