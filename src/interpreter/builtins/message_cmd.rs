//! message builtin
//!
//! `message([mode] text...)`. STATUS goes to the output prefixed with
//! "-- "; WARNING and AUTHOR_WARNING become warning diagnostics;
//! FATAL_ERROR and SEND_ERROR stop the run.

use crate::ast::types::Invocation;
use crate::interpreter::execution_engine::ExecutionEngine;
use crate::interpreter::expansion::expand_arguments;
use crate::interpreter::types::{Diagnostic, ExpandedArgument};

fn concat(args: &[ExpandedArgument]) -> String {
    args.iter().map(|a| a.value.as_str()).collect()
}

pub fn handle_message(
    engine: &mut ExecutionEngine,
    invocation: &Invocation,
) -> Result<(), Diagnostic> {
    let expanded = expand_arguments(&invocation.args, &engine.vars);
    if expanded.is_empty() {
        return Err(Diagnostic::fatal(
            &invocation.location,
            "message called with incorrect number of arguments",
        ));
    }

    match expanded[0].value.as_str() {
        "FATAL_ERROR" | "SEND_ERROR" => {
            Err(Diagnostic::fatal(&invocation.location, concat(&expanded[1..])))
        }
        "WARNING" | "AUTHOR_WARNING" => {
            let warning = Diagnostic::warning(&invocation.location, concat(&expanded[1..]));
            engine.diagnostics.push(warning);
            Ok(())
        }
        "STATUS" => {
            engine.output.push_str("-- ");
            engine.output.push_str(&concat(&expanded[1..]));
            engine.output.push('\n');
            Ok(())
        }
        _ => {
            engine.output.push_str(&concat(&expanded));
            engine.output.push('\n');
            Ok(())
        }
    }
}
