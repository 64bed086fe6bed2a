//! Execution Engine
//!
//! Consumes invocations one at a time. An open `if` scope installs a
//! blocker that records everything up to its `endif`; closing the scope
//! replays the recorded body, evaluating `elseif` headers on the way and
//! dispatching the commands of exactly one branch. Replay dispatches
//! through the engine itself, so nested `if` headers install nested
//! blockers and the machinery composes across arbitrary nesting.

use std::collections::HashSet;
use std::sync::Arc;

use crate::ast::types::Invocation;
use crate::fs::types::FileSystemProbe;
use crate::interpreter::block_control::{BlockerAction, IfBlocker};
use crate::interpreter::builtins;
use crate::interpreter::conditional::{condition_error_message, ConditionEvaluator};
use crate::interpreter::expansion::expand_arguments;
use crate::interpreter::policy::PolicyRecords;
use crate::interpreter::types::{Diagnostic, ExecutionStatus, Registry};
use crate::interpreter::variables::ScriptVariables;

/// Command and target lookup backed by the engine's state.
struct EngineRegistry<'a> {
    targets: &'a HashSet<String>,
}

impl Registry for EngineRegistry<'_> {
    fn has_command(&self, name: &str) -> bool {
        builtins::is_command(name)
    }

    fn has_target(&self, name: &str) -> bool {
        self.targets.contains(name)
    }
}

/// The engine owning all run state: variables, policies, targets, the
/// blocker stack, collected output and diagnostics.
pub struct ExecutionEngine {
    pub vars: ScriptVariables,
    pub policies: PolicyRecords,
    pub fs: Arc<dyn FileSystemProbe>,
    pub targets: HashSet<String>,
    pub output: String,
    pub diagnostics: Vec<Diagnostic>,
    pub fatal_occurred: bool,
    blockers: Vec<IfBlocker>,
}

impl ExecutionEngine {
    pub fn new(fs: Arc<dyn FileSystemProbe>) -> Self {
        Self {
            vars: ScriptVariables::new(),
            policies: PolicyRecords::new(),
            fs,
            targets: HashSet::new(),
            output: String::new(),
            diagnostics: Vec::new(),
            fatal_occurred: false,
            blockers: Vec::new(),
        }
    }

    /// Run a stream of invocations. Stops on the first fatal diagnostic
    /// or when a dispatched command invokes break/return.
    pub fn run(&mut self, invocations: &[Invocation], status: &mut ExecutionStatus) {
        for invocation in invocations {
            if self.fatal_occurred {
                break;
            }
            if let Err(diagnostic) = self.execute(invocation, status) {
                self.diagnostics.push(diagnostic);
                self.fatal_occurred = true;
                break;
            }
            if status.terminated() {
                break;
            }
        }
    }

    /// The innermost `if` scope still open, if any. A scope left open at
    /// the end of a run is a script error the caller reports.
    pub fn open_block(&self) -> Option<&IfBlocker> {
        self.blockers.first()
    }

    /// Clear per-run state (open scopes, output, diagnostics, the fatal
    /// flag) while keeping variables, policies and targets.
    pub fn reset_run_state(&mut self) {
        self.blockers.clear();
        self.output.clear();
        self.diagnostics.clear();
        self.fatal_occurred = false;
    }

    /// Route one invocation: into the open blocker when a scope is
    /// recording, otherwise to command dispatch.
    pub fn execute(
        &mut self,
        invocation: &Invocation,
        status: &mut ExecutionStatus,
    ) -> Result<(), Diagnostic> {
        if let Some(blocker) = self.blockers.last_mut() {
            match blocker.observe(invocation) {
                BlockerAction::Recorded => return Ok(()),
                BlockerAction::Close => {
                    if let Some(closed) = self.blockers.pop() {
                        return self.replay(closed, status);
                    }
                    return Ok(());
                }
            }
        }
        self.dispatch(invocation, status)
    }

    fn dispatch(
        &mut self,
        invocation: &Invocation,
        status: &mut ExecutionStatus,
    ) -> Result<(), Diagnostic> {
        let name = invocation.name.to_ascii_lowercase();
        match name.as_str() {
            "if" => self.open_scope(invocation),
            "else" | "elseif" => Err(Diagnostic::fatal(
                &invocation.location,
                format!(
                    "An {} command was found outside of a proper IF ENDIF structure.",
                    name.to_ascii_uppercase()
                ),
            )),
            "endif" => Err(Diagnostic::fatal(
                &invocation.location,
                "An ENDIF command was found outside of a proper IF ENDIF structure.  \
                 Or its arguments did not match the opening IF command.",
            )),
            _ => builtins::dispatch(self, invocation, status),
        }
    }

    fn open_scope(&mut self, invocation: &Invocation) -> Result<(), Diagnostic> {
        let truth = self.evaluate_condition(invocation)?;
        self.blockers.push(IfBlocker::new(
            invocation.args.clone(),
            invocation.location.clone(),
            truth,
        ));
        Ok(())
    }

    /// Evaluate an `if`/`elseif` header. Warnings land in the engine's
    /// diagnostics; a fatal evaluation error is returned with the
    /// expanded arguments echoed.
    pub(crate) fn evaluate_condition(&mut self, invocation: &Invocation) -> Result<bool, Diagnostic> {
        let expanded = expand_arguments(&invocation.args, &self.vars);
        let registry = EngineRegistry { targets: &self.targets };
        let mut evaluator = ConditionEvaluator::new(
            &mut self.vars,
            &mut self.policies,
            self.fs.as_ref(),
            &registry,
            invocation.location.clone(),
        );
        let result = evaluator.evaluate(&expanded);
        let warnings = evaluator.take_warnings();
        self.diagnostics.extend(warnings);
        result.map_err(|error| {
            Diagnostic::fatal(
                &invocation.location,
                format!(
                    "{} {}",
                    invocation.name,
                    condition_error_message(&expanded, &error.to_string())
                ),
            )
        })
    }

    /// Walk a closed scope's body, selecting exactly one branch. Nested
    /// headers are dispatched like any command and install their own
    /// machines; the depth counter only exists to find this scope's own
    /// `else`/`elseif` headers and terminating `endif`.
    fn replay(&mut self, blocker: IfBlocker, status: &mut ExecutionStatus) -> Result<(), Diagnostic> {
        let mut is_blocking = blocker.is_blocking;
        let mut has_run = blocker.has_run;
        let mut depth: i32 = 0;

        for invocation in &blocker.body {
            if invocation.name_is("if") {
                depth += 1;
            }
            if invocation.name_is("endif") {
                depth -= 1;
                if depth < 0 {
                    // this scope's own endif
                    break;
                }
            }

            if depth == 0 && invocation.name_is("else") {
                is_blocking = has_run;
                has_run = true;
            } else if depth == 0 && invocation.name_is("elseif") {
                if has_run {
                    is_blocking = true;
                } else if self.evaluate_condition(invocation)? {
                    is_blocking = false;
                    has_run = true;
                }
            } else if !is_blocking {
                let mut inner = ExecutionStatus::new();
                self.execute(invocation, &mut inner)?;
                if inner.return_invoked {
                    status.return_invoked = true;
                    return Ok(());
                }
                if inner.break_invoked {
                    status.break_invoked = true;
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::memory_fs::MemoryFs;
    use crate::interpreter::policy::{PolicyId, PolicyStatus, PolicyStore};
    use crate::interpreter::types::Severity;
    use crate::interpreter::variables::VariableStore;
    use crate::parser::parse;

    fn engine() -> ExecutionEngine {
        let mut engine = ExecutionEngine::new(Arc::new(MemoryFs::new()));
        engine.policies.set_status(PolicyId::Cmp0012, PolicyStatus::New);
        engine.policies.set_status(PolicyId::Cmp0054, PolicyStatus::New);
        engine
    }

    fn run(engine: &mut ExecutionEngine, script: &str) -> ExecutionStatus {
        let invocations = parse(script, "test.cmake").unwrap();
        let mut status = ExecutionStatus::new();
        engine.run(&invocations, &mut status);
        status
    }

    #[test]
    fn test_true_branch_dispatches() {
        let mut e = engine();
        run(&mut e, "if(1)\nmessage(yes)\nendif()");
        assert_eq!(e.output, "yes\n");
        assert!(!e.fatal_occurred);
    }

    #[test]
    fn test_false_branch_suppressed() {
        let mut e = engine();
        run(&mut e, "if(0)\nmessage(no)\nendif()");
        assert_eq!(e.output, "");
    }

    #[test]
    fn test_else_branch() {
        let mut e = engine();
        run(&mut e, "if(0)\nmessage(a)\nelse()\nmessage(b)\nendif()");
        assert_eq!(e.output, "b\n");
    }

    #[test]
    fn test_elseif_chain_selects_first_true() {
        let mut e = engine();
        let script = "if(0)\nmessage(a)\nelseif(1)\nmessage(b)\nelseif(1)\nmessage(c)\nelse()\nmessage(d)\nendif()";
        run(&mut e, script);
        assert_eq!(e.output, "b\n");
    }

    #[test]
    fn test_branch_exclusivity_when_if_is_true() {
        let mut e = engine();
        let script = "if(1)\nmessage(a)\nelseif(1)\nmessage(b)\nelse()\nmessage(c)\nendif()";
        run(&mut e, script);
        assert_eq!(e.output, "a\n");
    }

    #[test]
    fn test_elseif_not_evaluated_after_branch_ran() {
        let mut e = engine();
        // a bad elseif header after a selected branch must not evaluate
        let script = "if(1)\nmessage(a)\nelseif(1 2)\nmessage(b)\nendif()";
        run(&mut e, script);
        assert_eq!(e.output, "a\n");
        assert!(!e.fatal_occurred);
    }

    #[test]
    fn test_nested_scopes_replay_in_order() {
        let mut e = engine();
        let script = "if(1)\nif(0)\nmessage(skip)\nendif()\nmessage(run)\nendif()";
        run(&mut e, script);
        assert_eq!(e.output, "run\n");
    }

    #[test]
    fn test_nested_true_scope_runs_inner_body() {
        let mut e = engine();
        let script = "if(1)\nmessage(outer)\nif(1)\nmessage(inner)\nendif()\nmessage(after)\nendif()";
        run(&mut e, script);
        assert_eq!(e.output, "outer\ninner\nafter\n");
    }

    #[test]
    fn test_nested_else_belongs_to_inner_scope() {
        let mut e = engine();
        let script = "if(1)\nif(0)\nmessage(a)\nelse()\nmessage(b)\nendif()\nendif()";
        run(&mut e, script);
        assert_eq!(e.output, "b\n");
    }

    #[test]
    fn test_blocked_outer_scope_suppresses_nested_blocks() {
        let mut e = engine();
        let script = "if(0)\nif(1)\nmessage(a)\nendif()\nmessage(b)\nendif()\nmessage(after)";
        run(&mut e, script);
        assert_eq!(e.output, "after\n");
    }

    #[test]
    fn test_variables_set_inside_branch() {
        let mut e = engine();
        run(&mut e, "if(1)\nset(X on)\nendif()\nif(X)\nmessage(seen)\nendif()");
        assert_eq!(e.vars.get("X"), Some("on"));
        assert_eq!(e.output, "seen\n");
    }

    #[test]
    fn test_condition_uses_variables_at_replay_time() {
        let mut e = engine();
        e.vars.set("FLAG", "1");
        let script = "if(0)\nmessage(a)\nelseif(FLAG)\nmessage(b)\nendif()";
        run(&mut e, script);
        assert_eq!(e.output, "b\n");
    }

    #[test]
    fn test_suppressed_branch_cannot_feed_its_own_elseif() {
        let mut e = engine();
        // the set() sits in the unselected branch, so it never runs and
        // the elseif sees FLAG undefined
        let script = "if(0)\nset(FLAG 1)\nelseif(FLAG)\nmessage(b)\nendif()";
        run(&mut e, script);
        assert_eq!(e.output, "");
        assert!(!e.vars.is_defined("FLAG"));
    }

    #[test]
    fn test_break_stops_replay() {
        let mut e = engine();
        let script = "if(1)\nmessage(a)\nbreak()\nmessage(b)\nendif()";
        let status = run(&mut e, script);
        assert!(status.break_invoked);
        assert!(!status.return_invoked);
        assert_eq!(e.output, "a\n");
    }

    #[test]
    fn test_return_propagates_through_nesting() {
        let mut e = engine();
        let script = "if(1)\nif(1)\nreturn()\nendif()\nmessage(after)\nendif()\nmessage(outside)";
        let status = run(&mut e, script);
        assert!(status.return_invoked);
        assert_eq!(e.output, "");
    }

    #[test]
    fn test_fatal_header_halts_replay() {
        let mut e = engine();
        let script = "if(0)\nmessage(a)\nelseif(1 2)\nmessage(b)\nendif()\nmessage(after)";
        run(&mut e, script);
        assert!(e.fatal_occurred);
        assert_eq!(e.output, "");
        let fatal = e.diagnostics.iter().find(|d| d.is_fatal()).unwrap();
        assert!(fatal.message.contains("Unknown arguments specified"));
        assert!(fatal.message.contains("given arguments"));
    }

    #[test]
    fn test_stray_else_and_endif_are_fatal() {
        let mut e = engine();
        run(&mut e, "else()");
        assert!(e.fatal_occurred);
        assert!(e.diagnostics[0].message.contains("ELSE"));

        let mut e = engine();
        run(&mut e, "endif()");
        assert!(e.fatal_occurred);
        assert!(e.diagnostics[0].message.contains("ENDIF"));
    }

    #[test]
    fn test_unknown_command_is_fatal() {
        let mut e = engine();
        run(&mut e, "frobnicate(1)");
        assert!(e.fatal_occurred);
        assert!(e.diagnostics[0]
            .message
            .contains("Unknown CMake command \"frobnicate\""));
    }

    #[test]
    fn test_unknown_command_inside_false_branch_is_ignored() {
        let mut e = engine();
        run(&mut e, "if(0)\nfrobnicate(1)\nendif()");
        assert!(!e.fatal_occurred);
    }

    #[test]
    fn test_mismatched_endif_arguments_keep_scope_open() {
        let mut e = engine();
        run(&mut e, "if(FOO)\nmessage(a)\nendif(BAR)");
        assert!(!e.fatal_occurred);
        // the machine refused to terminate and is still recording
        assert!(e.open_block().is_some());
        assert_eq!(e.output, "");
    }

    #[test]
    fn test_endif_repeating_if_arguments_closes_scope() {
        let mut e = engine();
        run(&mut e, "if(1)\nmessage(a)\nendif(1)");
        assert!(e.open_block().is_none());
        assert_eq!(e.output, "a\n");
    }

    #[test]
    fn test_header_expansion_happens_per_invocation() {
        let mut e = engine();
        e.vars.set("COND", "0");
        let script = "if(${COND})\nmessage(first)\nendif()\nset(COND 1)\nif(${COND})\nmessage(second)\nendif()";
        run(&mut e, script);
        assert_eq!(e.output, "second\n");
    }

    #[test]
    fn test_policy_change_inside_branch_affects_later_headers() {
        let mut e = engine();
        e.vars.set("X", "1");
        // the policy flips to OLD during replay of the first scope, so
        // the second header dereferences the quoted name
        let script = "if(1)\ncmake_policy(SET CMP0054 OLD)\nendif()\nif(\"X\")\nmessage(old)\nendif()";
        run(&mut e, script);
        assert_eq!(e.output, "old\n");
    }

    #[test]
    fn test_warning_from_header_does_not_stop_run() {
        let mut e = engine();
        e.policies.set_status(PolicyId::Cmp0012, PolicyStatus::Warn);
        run(&mut e, "if(TRUE)\nmessage(a)\nelse()\nmessage(b)\nendif()\nmessage(after)");
        assert!(!e.fatal_occurred);
        // WARN keeps the legacy result: TRUE is an undefined variable
        assert_eq!(e.output, "b\nafter\n");
        assert!(e
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::AuthorWarning && d.message.contains("CMP0012")));
    }
}
