//! Assignment to names, tuples, subscripts and attributes.

use pytex_ir::{BinaryOp, Expr, ExprKind, Target};

use super::Interpreter;
use crate::errors::{value_error, EvalError, EvalResult, ExceptionKind};
use crate::iter::collect;
use crate::methods::{get_attribute, set_attribute};
use crate::operators::binary;
use crate::subscript::{get_item, get_slice, set_item, set_slice, SliceBounds};
use crate::Value;

impl Interpreter {
    pub(crate) fn assign(&mut self, target: &Target, value: Value) -> EvalResult<()> {
        match target {
            Target::Name(name, _) => {
                self.store(name, value);
                Ok(())
            }
            Target::Tuple(targets, span) => {
                let items = collect(&value).map_err(|err| err.with_span(*span))?;
                if items.len() != targets.len() {
                    let message = if items.len() > targets.len() {
                        format!("too many values to unpack (expected {})", targets.len())
                    } else {
                        format!(
                            "not enough values to unpack (expected {}, got {})",
                            targets.len(),
                            items.len()
                        )
                    };
                    return Err(value_error(message).with_span(*span));
                }
                for (target, item) in targets.iter().zip(items) {
                    self.assign(target, item)?;
                }
                Ok(())
            }
            Target::Subscript { object, index, span } => {
                let object = self.eval(object)?;
                if let ExprKind::Slice { lower, upper, step } = &index.kind {
                    let bounds =
                        self.eval_slice_bounds(lower.as_deref(), upper.as_deref(), step.as_deref())?;
                    return set_slice(&object, &bounds, &value).map_err(|err| err.with_span(*span));
                }
                let index = self.eval(index)?;
                set_item(&object, index, value).map_err(|err| err.with_span(*span))
            }
            Target::Attribute { object, name, span } => {
                let object = self.eval(object)?;
                set_attribute(&object, name, value).map_err(|err| err.with_span(*span))
            }
        }
    }

    /// `target op= value`: the target's object and index are evaluated once.
    /// `list += iterable` extends the list in place.
    pub(crate) fn aug_assign(&mut self, target: &Target, op: BinaryOp, value: &Expr) -> EvalResult<()> {
        match target {
            Target::Name(name, _) => {
                let current = self.lookup(name)?;
                let rhs = self.eval(value)?;
                let updated = in_place(op, current, &rhs)?;
                self.store(name, updated);
                Ok(())
            }
            Target::Subscript { object, index, span } => {
                let object = self.eval(object)?;
                if let ExprKind::Slice { lower, upper, step } = &index.kind {
                    let bounds =
                        self.eval_slice_bounds(lower.as_deref(), upper.as_deref(), step.as_deref())?;
                    let current = get_slice(&object, &bounds)?;
                    let rhs = self.eval(value)?;
                    let updated = in_place(op, current, &rhs)?;
                    return set_slice(&object, &bounds, &updated).map_err(|err| err.with_span(*span));
                }
                let index = self.eval(index)?;
                let current = get_item(&object, &index)?;
                let rhs = self.eval(value)?;
                let updated = in_place(op, current, &rhs)?;
                set_item(&object, index, updated).map_err(|err| err.with_span(*span))
            }
            Target::Attribute { object, name, span } => {
                let object = self.eval(object)?;
                let current = get_attribute(&object, name)?;
                let rhs = self.eval(value)?;
                let updated = in_place(op, current, &rhs)?;
                set_attribute(&object, name, updated).map_err(|err| err.with_span(*span))
            }
            Target::Tuple(_, span) => Err(EvalError::new(
                ExceptionKind::SyntaxError,
                "illegal expression for augmented assignment",
            )
            .with_span(*span)),
        }
    }

    pub(crate) fn eval_slice_bounds(
        &mut self,
        lower: Option<&Expr>,
        upper: Option<&Expr>,
        step: Option<&Expr>,
    ) -> EvalResult<SliceBounds> {
        Ok(SliceBounds {
            lower: self.eval_optional(lower)?,
            upper: self.eval_optional(upper)?,
            step: self.eval_optional(step)?,
        })
    }

    fn eval_optional(&mut self, expr: Option<&Expr>) -> EvalResult<Option<Value>> {
        expr.map(|expr| self.eval(expr)).transpose()
    }
}

fn in_place(op: BinaryOp, current: Value, rhs: &Value) -> EvalResult {
    if let (BinaryOp::Add, Value::List(items)) = (op, &current) {
        let extra = collect(rhs)?;
        items.borrow_mut().extend(extra);
        return Ok(current);
    }
    binary(op, &current, rhs)
}
