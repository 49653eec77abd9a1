use std::io::Write;

use super::expr::EvalErr;

/// Nested calls allowed before evaluation gives up.
pub const MAX_CALL_DEPTH: usize = 2048;

/// Per-run state threaded through evaluation: where `print` writes and
/// how deep the call stack currently is.
pub struct Context<'o> {
    out: &'o mut dyn Write,
    depth: usize,
}

impl<'o> Context<'o> {
    pub fn new(out: &'o mut dyn Write) -> Self {
        Context { out, depth: 0 }
    }

    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(super) fn enter_call(&mut self) -> Result<(), EvalErr> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(EvalErr::RecursionLimit(MAX_CALL_DEPTH));
        }
        self.depth += 1;
        Ok(())
    }

    pub(super) fn leave_call(&mut self) {
        self.depth -= 1;
    }
}
