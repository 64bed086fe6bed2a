//! add_executable / add_library builtins
//!
//! Only the target name matters to this engine: it feeds the TARGET
//! predicate. Source arguments are accepted and ignored.

use crate::ast::types::Invocation;
use crate::interpreter::execution_engine::ExecutionEngine;
use crate::interpreter::expansion::expand_arguments;
use crate::interpreter::types::Diagnostic;

pub fn handle_add_target(
    engine: &mut ExecutionEngine,
    invocation: &Invocation,
) -> Result<(), Diagnostic> {
    let expanded = expand_arguments(&invocation.args, &engine.vars);
    if expanded.is_empty() {
        return Err(Diagnostic::fatal(
            &invocation.location,
            format!(
                "{} called with incorrect number of arguments",
                invocation.name
            ),
        ));
    }
    engine.targets.insert(expanded[0].value.clone());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::memory_fs::MemoryFs;
    use crate::interpreter::types::ExecutionStatus;
    use crate::parser::parse;
    use std::sync::Arc;

    fn run(script: &str) -> ExecutionEngine {
        let mut engine = ExecutionEngine::new(Arc::new(MemoryFs::new()));
        let invocations = parse(script, "test.cmake").unwrap();
        let mut status = ExecutionStatus::new();
        engine.run(&invocations, &mut status);
        engine
    }

    #[test]
    fn test_registers_target() {
        let engine = run("add_executable(app main.c)");
        assert!(engine.targets.contains("app"));
    }

    #[test]
    fn test_target_predicate_sees_new_target() {
        let engine = run("add_library(core core.c)\nif(TARGET core)\nmessage(have)\nendif()");
        assert_eq!(engine.output, "have\n");
    }

    #[test]
    fn test_missing_name_is_fatal() {
        let engine = run("add_library()");
        assert!(engine.fatal_occurred);
    }
}
