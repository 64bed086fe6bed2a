//! CMake Environment
//!
//! Main entry point for the script environment. Ties together the
//! parser, the execution engine and the stores, and renders collected
//! diagnostics into an ExecResult.

use std::collections::HashMap;
use std::sync::Arc;

use crate::fs::os_fs::OsFs;
use crate::fs::types::FileSystemProbe;
use crate::interpreter::execution_engine::ExecutionEngine;
use crate::interpreter::policy::{PolicyId, PolicyStatus, PolicyStore};
use crate::interpreter::types::{Diagnostic, ExecResult, ExecutionStatus};
use crate::interpreter::variables::VariableStore;
use crate::parser::parse;

/// Options for creating a script environment.
#[derive(Default)]
pub struct CmakeOptions {
    /// Initial variable definitions
    pub vars: Option<HashMap<String, String>>,
    /// Environment variables; defaults to the process environment
    pub env: Option<HashMap<String, String>>,
    /// Filesystem probe (defaults to the real filesystem)
    pub fs: Option<Arc<dyn FileSystemProbe>>,
    /// Policy statuses; unset policies default to NEW here (the store's
    /// own default of WARN is what an unconfigured project would get)
    pub policies: Option<Vec<(PolicyId, PolicyStatus)>>,
    /// Script name used in diagnostics
    pub script_name: Option<String>,
}

/// The script environment facade.
pub struct Cmake {
    engine: ExecutionEngine,
    script_name: String,
}

impl Cmake {
    pub fn new(options: CmakeOptions) -> Self {
        let fs: Arc<dyn FileSystemProbe> = options.fs.unwrap_or_else(|| Arc::new(OsFs::new()));
        let mut engine = ExecutionEngine::new(fs);

        engine.policies.set_status(PolicyId::Cmp0012, PolicyStatus::New);
        engine.policies.set_status(PolicyId::Cmp0054, PolicyStatus::New);
        if let Some(policies) = options.policies {
            for (id, status) in policies {
                engine.policies.set_status(id, status);
            }
        }

        if let Some(vars) = options.vars {
            for (name, value) in vars {
                engine.vars.set(&name, &value);
            }
        }

        match options.env {
            Some(env) => {
                for (name, value) in env {
                    engine.vars.set_env(&name, &value);
                }
            }
            None => {
                for (name, value) in std::env::vars() {
                    engine.vars.set_env(&name, &value);
                }
            }
        }

        Self {
            engine,
            script_name: options.script_name.unwrap_or_else(|| "CMakeLists.txt".to_string()),
        }
    }

    /// Execute a script. Variables, policies and targets persist across
    /// calls; output and diagnostics are per call.
    pub fn exec(&mut self, script: &str) -> ExecResult {
        self.engine.reset_run_state();

        let invocations = match parse(script, &self.script_name) {
            Ok(invocations) => invocations,
            Err(error) => {
                return ExecResult::failure(format!("CMake Error: {}\n", error));
            }
        };

        let mut status = ExecutionStatus::new();
        self.engine.run(&invocations, &mut status);

        let unclosed = self.engine.open_block().map(|b| b.location.clone());
        if let Some(location) = unclosed {
            if !self.engine.fatal_occurred {
                self.engine.diagnostics.push(Diagnostic::fatal(
                    &location,
                    "A logical block opening with if() is not closed.",
                ));
                self.engine.fatal_occurred = true;
            }
        }

        let stderr: String = self
            .engine
            .diagnostics
            .iter()
            .map(|d| d.render())
            .collect();
        let stdout = std::mem::take(&mut self.engine.output);
        let exit_code = if self.engine.fatal_occurred { 1 } else { 0 };
        ExecResult::new(stdout, stderr, exit_code)
    }

    pub fn engine(&self) -> &ExecutionEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ExecutionEngine {
        &mut self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::memory_fs::MemoryFs;

    fn cmake() -> Cmake {
        Cmake::new(CmakeOptions {
            fs: Some(Arc::new(MemoryFs::new())),
            env: Some(HashMap::new()),
            ..Default::default()
        })
    }

    fn cmake_with_vars(pairs: &[(&str, &str)]) -> Cmake {
        let vars = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Cmake::new(CmakeOptions {
            fs: Some(Arc::new(MemoryFs::new())),
            env: Some(HashMap::new()),
            vars: Some(vars),
            ..Default::default()
        })
    }

    #[test]
    fn test_literal_condition() {
        let mut cm = cmake();
        let result = cm.exec("if(1)\nmessage(yes)\nendif()");
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, "yes\n");
        assert_eq!(result.stderr, "");
    }

    #[test]
    fn test_variable_condition() {
        let mut cm = cmake_with_vars(&[("FOO", "ON")]);
        let result = cm.exec(
            "if(FOO)\nmessage(foo)\nendif()\nif(NOT FOO)\nmessage(notfoo)\nendif()",
        );
        assert_eq!(result.stdout, "foo\n");
    }

    #[test]
    fn test_numeric_comparison() {
        let mut cm = cmake_with_vars(&[("V", "7")]);
        let result = cm.exec(
            "if(V GREATER 3)\nmessage(gt)\nendif()\nif(V LESS 3)\nmessage(lt)\nendif()",
        );
        assert_eq!(result.stdout, "gt\n");
    }

    #[test]
    fn test_matches_populates_match_registers() {
        let mut cm = cmake_with_vars(&[("S", "abcXYZ")]);
        let result = cm.exec(
            "if(S MATCHES \"a(b+)c\")\nmessage(\"m=${CMAKE_MATCH_1}\")\nendif()",
        );
        assert_eq!(result.stdout, "m=b\n");
    }

    #[test]
    fn test_grouped_condition() {
        let mut cm = cmake_with_vars(&[("A", "1"), ("B", "0")]);
        let result = cm.exec(
            "if(A AND (B OR 1))\nmessage(one)\nendif()\nif(A AND B)\nmessage(two)\nendif()",
        );
        assert_eq!(result.stdout, "one\n");
    }

    #[test]
    fn test_nested_recording_dispatches_one_branch() {
        let mut cm = cmake();
        let result = cm.exec(
            "if(1)\nif(0)\nmessage(skip)\nendif()\nmessage(run)\nendif()",
        );
        assert_eq!(result.stdout, "run\n");
    }

    #[test]
    fn test_quoted_argument_policy() {
        let mut cm = cmake_with_vars(&[("X", "1")]);
        // NEW by default: the quoted name is a literal, and "X" is not truthy
        let result = cm.exec("if(\"X\")\nmessage(deref)\nendif()");
        assert_eq!(result.stdout, "");

        let mut cm = Cmake::new(CmakeOptions {
            fs: Some(Arc::new(MemoryFs::new())),
            env: Some(HashMap::new()),
            vars: Some([("X".to_string(), "1".to_string())].into()),
            policies: Some(vec![(PolicyId::Cmp0054, PolicyStatus::Old)]),
            ..Default::default()
        });
        let result = cm.exec("if(\"X\")\nmessage(deref)\nendif()");
        assert_eq!(result.stdout, "deref\n");
    }

    #[test]
    fn test_state_persists_across_exec_calls() {
        let mut cm = cmake();
        cm.exec("set(COUNT 1)");
        let result = cm.exec("if(COUNT)\nmessage(kept)\nendif()");
        assert_eq!(result.stdout, "kept\n");
    }

    #[test]
    fn test_parse_error_reports_failure() {
        let mut cm = cmake();
        let result = cm.exec("if(1");
        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.contains("unbalanced parenthesis"));
    }

    #[test]
    fn test_unclosed_block_is_reported() {
        let mut cm = cmake();
        let result = cm.exec("if(1)\nmessage(a)");
        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.contains("not closed"));
        // the next exec starts from a clean slate
        let result = cm.exec("message(b)");
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, "b\n");
    }

    #[test]
    fn test_fatal_diagnostic_renders_with_location() {
        let mut cm = cmake();
        let result = cm.exec("message(ok)\nbad_command(1)");
        assert_eq!(result.exit_code, 1);
        assert!(result
            .stderr
            .contains("CMake Error at CMakeLists.txt:2:"));
        assert!(result.stderr.contains("Unknown CMake command \"bad_command\""));
    }

    #[test]
    fn test_env_option_feeds_env_references() {
        let mut env = HashMap::new();
        env.insert("CC".to_string(), "clang".to_string());
        let mut cm = Cmake::new(CmakeOptions {
            fs: Some(Arc::new(MemoryFs::new())),
            env: Some(env),
            ..Default::default()
        });
        let result = cm.exec("if(DEFINED ENV{CC})\nmessage($ENV{CC})\nendif()");
        assert_eq!(result.stdout, "clang\n");
    }

    #[test]
    fn test_filesystem_predicates_through_probe() {
        let mut fs = MemoryFs::new();
        fs.add_file("/proj/CMakeLists.txt");
        let mut cm = Cmake::new(CmakeOptions {
            fs: Some(Arc::new(fs)),
            env: Some(HashMap::new()),
            ..Default::default()
        });
        let result = cm.exec(
            "if(EXISTS /proj/CMakeLists.txt)\nmessage(found)\nendif()",
        );
        assert_eq!(result.stdout, "found\n");
    }
}
