//! RAII frame switching for calls and comprehensions.
//!
//! [`Interpreter::enter`] swaps in a new [`Frame`] and returns a guard that
//! derefs to the interpreter. Dropping the guard puts the caller's frame
//! back and releases the call-depth slot, on every exit path.

use std::ops::{Deref, DerefMut};

use super::{Frame, Interpreter, MAX_CALL_DEPTH};
use crate::errors::{recursion_limit, EvalResult};

pub(crate) struct FrameGuard<'guard> {
    interpreter: &'guard mut Interpreter,
    saved: Option<Frame>,
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        if let Some(frame) = self.saved.take() {
            self.interpreter.frame = frame;
        }
        self.interpreter.depth -= 1;
    }
}

impl Deref for FrameGuard<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for FrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl Interpreter {
    /// Make `frame` current until the returned guard drops.
    ///
    /// Fails with `RecursionError` once [`MAX_CALL_DEPTH`] frames are active.
    pub(crate) fn enter(&mut self, frame: Frame) -> EvalResult<FrameGuard<'_>> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(recursion_limit());
        }
        self.depth += 1;
        let saved = std::mem::replace(&mut self.frame, frame);
        Ok(FrameGuard {
            interpreter: self,
            saved: Some(saved),
        })
    }
}
