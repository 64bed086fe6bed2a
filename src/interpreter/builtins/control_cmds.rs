//! break / return builtins
//!
//! Both only raise a flag on the execution status. The replay loop and
//! the top-level runner react to the flags; the commands themselves
//! produce no output and never fail.

use crate::interpreter::types::{Diagnostic, ExecutionStatus};

pub fn handle_break(status: &mut ExecutionStatus) -> Result<(), Diagnostic> {
    status.break_invoked = true;
    Ok(())
}

pub fn handle_return(status: &mut ExecutionStatus) -> Result<(), Diagnostic> {
    status.return_invoked = true;
    Ok(())
}
