//! Expression evaluation.

use std::rc::Rc;

use pytex_ir::{BoolOp, Comprehension, ComprehensionClause, Expr, ExprKind, FStringPart};
use pytex_stack::ensure_sufficient_stack;

use super::{Args, Frame, Interpreter};
use crate::errors::{type_error, EvalResult};
use crate::format::format_value;
use crate::iter::iterate;
use crate::methods::get_attribute;
use crate::operators::{binary, compare, unary};
use crate::subscript::{get_item, get_slice};
use crate::value::{Dict, FunctionCode};
use crate::Value;

impl Interpreter {
    pub(crate) fn eval(&mut self, expr: &Expr) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(expr)).map_err(|err| err.with_span(expr.span))
    }

    fn eval_inner(&mut self, expr: &Expr) -> EvalResult {
        match &expr.kind {
            ExprKind::Name(name) => self.lookup(name),
            ExprKind::None => Ok(Value::None),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Float(f) => Ok(Value::Float(*f)),
            ExprKind::Str(s) => Ok(Value::Str(Rc::clone(s))),
            ExprKind::FString(parts) => Ok(Value::from(self.eval_fstring(parts)?)),
            ExprKind::Tuple(items) => Ok(Value::tuple(self.eval_all(items)?)),
            ExprKind::List(items) => Ok(Value::list(self.eval_all(items)?)),
            ExprKind::Dict(entries) => {
                let mut dict = Dict::new();
                for (key, value) in entries {
                    let key = self.eval(key)?;
                    let value = self.eval(value)?;
                    dict.insert(key, value)?;
                }
                Ok(Value::dict(dict))
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.eval(operand)?;
                unary(*op, &operand)
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                binary(*op, &left, &right)
            }
            ExprKind::Logical { op, left, right } => {
                let left = self.eval(left)?;
                let short_circuits = match op {
                    BoolOp::And => !left.is_truthy(),
                    BoolOp::Or => left.is_truthy(),
                };
                if short_circuits {
                    Ok(left)
                } else {
                    self.eval(right)
                }
            }
            ExprKind::Compare { left, rest } => {
                let mut left = self.eval(left)?;
                for (op, right) in rest {
                    let right = self.eval(right)?;
                    if !compare(*op, &left, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }
            ExprKind::IfExp { test, body, orelse } => {
                if self.eval(test)?.is_truthy() {
                    self.eval(body)
                } else {
                    self.eval(orelse)
                }
            }
            ExprKind::Lambda(lambda) => {
                self.make_function(Rc::from("<lambda>"), FunctionCode::Lambda(Rc::clone(lambda)))
            }
            ExprKind::Call { func, args } => {
                let callee = self.eval(func)?;
                let mut evaluated = Args::new(Vec::with_capacity(args.len()));
                for arg in args {
                    let value = self.eval(&arg.value)?;
                    match &arg.name {
                        Some(name) => evaluated.keywords.push((name.clone(), value)),
                        None => evaluated.positional.push(value),
                    }
                }
                self.call(&callee, evaluated)
            }
            ExprKind::Attribute { object, name } => {
                let object = self.eval(object)?;
                get_attribute(&object, name)
            }
            ExprKind::Subscript { object, index } => {
                let object = self.eval(object)?;
                if let ExprKind::Slice { lower, upper, step } = &index.kind {
                    let bounds =
                        self.eval_slice_bounds(lower.as_deref(), upper.as_deref(), step.as_deref())?;
                    return get_slice(&object, &bounds);
                }
                let index = self.eval(index)?;
                get_item(&object, &index)
            }
            ExprKind::Slice { .. } => Err(type_error("slice syntax is only valid inside a subscript")),
            ExprKind::Comprehension(comprehension) => self.eval_comprehension(comprehension),
        }
    }

    fn eval_all(&mut self, exprs: &[Expr]) -> EvalResult<Vec<Value>> {
        exprs.iter().map(|expr| self.eval(expr)).collect()
    }

    fn eval_fstring(&mut self, parts: &[FStringPart]) -> EvalResult<String> {
        let mut out = String::new();
        for part in parts {
            match part {
                FStringPart::Literal(text) => out.push_str(text),
                FStringPart::Field {
                    expr,
                    conversion,
                    spec,
                } => {
                    let value = self.eval(expr)?;
                    let value = match conversion {
                        Some('r' | 'a') => Value::from(value.repr()),
                        Some(_) => Value::from(value.to_str()),
                        None => value,
                    };
                    let spec = self.eval_fstring(spec)?;
                    out.push_str(&format_value(&value, &spec).map_err(|err| err.with_span(expr.span))?);
                }
            }
        }
        Ok(out)
    }

    /// List comprehensions and generator expressions, both collected into a
    /// list inside their own frame.
    fn eval_comprehension(&mut self, comprehension: &Comprehension) -> EvalResult {
        let frame = Frame::comprehension(&self.frame);
        let mut guard = self.enter(frame)?;
        let mut out = Vec::new();
        guard.run_clauses(&comprehension.clauses, &comprehension.element, &mut out)?;
        Ok(Value::list(out))
    }

    fn run_clauses(
        &mut self,
        clauses: &[ComprehensionClause],
        element: &Expr,
        out: &mut Vec<Value>,
    ) -> EvalResult<()> {
        let Some((clause, rest)) = clauses.split_first() else {
            out.push(self.eval(element)?);
            return Ok(());
        };
        match clause {
            ComprehensionClause::For { target, iter } => {
                let iterable = self.eval(iter)?;
                for item in iterate(&iterable)? {
                    self.assign(target, item)?;
                    self.run_clauses(rest, element, out)?;
                }
            }
            ComprehensionClause::If(condition) => {
                if self.eval(condition)?.is_truthy() {
                    self.run_clauses(rest, element, out)?;
                }
            }
        }
        Ok(())
    }
}
