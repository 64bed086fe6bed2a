//! cmake_policy builtin
//!
//! `cmake_policy(SET CMP00NN OLD|NEW)`. Because the conditional
//! evaluator snapshots policy statuses per header, a change made here
//! takes effect from the next header on, never mid-expression.

use crate::ast::types::Invocation;
use crate::interpreter::execution_engine::ExecutionEngine;
use crate::interpreter::expansion::expand_arguments;
use crate::interpreter::policy::{PolicyId, PolicyStatus, PolicyStore};
use crate::interpreter::types::Diagnostic;

pub fn handle_cmake_policy(
    engine: &mut ExecutionEngine,
    invocation: &Invocation,
) -> Result<(), Diagnostic> {
    let expanded = expand_arguments(&invocation.args, &engine.vars);
    if expanded.is_empty() {
        return Err(Diagnostic::fatal(
            &invocation.location,
            "cmake_policy requires at least one argument.",
        ));
    }
    if expanded[0].value != "SET" {
        return Err(Diagnostic::fatal(
            &invocation.location,
            format!(
                "cmake_policy does not recognize sub-command {}",
                expanded[0].value
            ),
        ));
    }
    if expanded.len() != 3 {
        return Err(Diagnostic::fatal(
            &invocation.location,
            "cmake_policy SET requires a policy id and a behavior (OLD or NEW).",
        ));
    }

    let Some(id) = PolicyId::from_name(&expanded[1].value) else {
        return Err(Diagnostic::fatal(
            &invocation.location,
            format!(
                "Policy \"{}\" is not known to this version of cmake.",
                expanded[1].value
            ),
        ));
    };
    let Some(status) = PolicyStatus::from_name(&expanded[2].value) else {
        return Err(Diagnostic::fatal(
            &invocation.location,
            format!(
                "cmake_policy SET given unrecognized policy behavior \"{}\"",
                expanded[2].value
            ),
        ));
    };

    engine.policies.set_status(id, status);
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
    fn test_set_policy() {
        let engine = run("cmake_policy(SET CMP0054 NEW)");
        assert!(!engine.fatal_occurred);
        assert_eq!(engine.policies.status(PolicyId::Cmp0054), PolicyStatus::New);

        let engine = run("cmake_policy(SET CMP0012 OLD)");
        assert_eq!(engine.policies.status(PolicyId::Cmp0012), PolicyStatus::Old);
    }

    #[test]
    fn test_unknown_policy_is_fatal() {
        let engine = run("cmake_policy(SET CMP9999 NEW)");
        assert!(engine.fatal_occurred);
        assert!(engine.diagnostics[0].message.contains("CMP9999"));
    }

    #[test]
    fn test_bad_behavior_is_fatal() {
        let engine = run("cmake_policy(SET CMP0054 WARN)");
        assert!(engine.fatal_occurred);
        assert!(engine.diagnostics[0].message.contains("WARN"));
    }

    #[test]
    fn test_bad_subcommand_is_fatal() {
        let engine = run("cmake_policy(GET CMP0054 OUT)");
        assert!(engine.fatal_occurred);
        assert!(engine.diagnostics[0].message.contains("GET"));
    }
}
