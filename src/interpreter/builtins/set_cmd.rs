//! set / unset builtins
//!
//! `set(VAR v...)` joins multiple values with semicolons, the list
//! convention the expansion stage splits back apart. `set(VAR)` with no
//! value removes the variable. The `ENV{NAME}` form addresses the
//! environment instead of the variable store.

use crate::ast::types::Invocation;
use crate::interpreter::execution_engine::ExecutionEngine;
use crate::interpreter::expansion::expand_arguments;
use crate::interpreter::types::Diagnostic;
use crate::interpreter::variables::VariableStore;

/// `ENV{NAME}` → Some(NAME)
fn env_name(value: &str) -> Option<&str> {
    if value.len() > 4 && value.starts_with("ENV{") && value.ends_with('}') {
        Some(&value[4..value.len() - 1])
    } else {
        None
    }
}

pub fn handle_set(engine: &mut ExecutionEngine, invocation: &Invocation) -> Result<(), Diagnostic> {
    let expanded = expand_arguments(&invocation.args, &engine.vars);
    if expanded.is_empty() {
        return Err(Diagnostic::fatal(
            &invocation.location,
            "set called with incorrect number of arguments",
        ));
    }

    let name = expanded[0].value.clone();
    let values: Vec<&str> = expanded[1..].iter().map(|a| a.value.as_str()).collect();

    if let Some(env) = env_name(&name) {
        if values.is_empty() {
            engine.vars.unset_env(env);
        } else {
            engine.vars.set_env(env, &values.join(";"));
        }
        return Ok(());
    }

    if values.is_empty() {
        engine.vars.unset(&name);
    } else {
        engine.vars.set(&name, &values.join(";"));
    }
    Ok(())
}

pub fn handle_unset(engine: &mut ExecutionEngine, invocation: &Invocation) -> Result<(), Diagnostic> {
    let expanded = expand_arguments(&invocation.args, &engine.vars);
    if expanded.len() != 1 {
        return Err(Diagnostic::fatal(
            &invocation.location,
            "unset called with incorrect number of arguments",
        ));
    }

    let name = &expanded[0].value;
    if let Some(env) = env_name(name) {
        engine.vars.unset_env(env);
    } else {
        engine.vars.unset(name);
    }
    Ok(())
}
