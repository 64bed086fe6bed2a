//! Interpreter Types
//!
//! Shared types for the execution engine and the conditional evaluator:
//! expanded arguments, diagnostics, execution status and results.

use serde::Serialize;
use std::fmt;

use crate::ast::types::SourceLocation;

/// An argument after variable expansion, paired with its quoting flag.
/// The flag decides keyword recognition and variable dereferencing
/// during conditional evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedArgument {
    pub value: String,
    pub quoted: bool,
}

impl ExpandedArgument {
    pub fn new(value: impl Into<String>, quoted: bool) -> Self {
        Self { value: value.into(), quoted }
    }

    /// A boolean token synthesized by a reduction pass. Marked quoted so
    /// later passes treat it as a plain literal.
    pub fn from_bool(value: bool) -> Self {
        Self::new(if value { "1" } else { "0" }, true)
    }
}

impl fmt::Display for ExpandedArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Diagnostic severity. Warnings never affect control flow; a fatal
/// diagnostic stops the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    AuthorWarning,
    FatalError,
}

/// A structured diagnostic record attached to a source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub file: String,
    pub line: u32,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(location: &SourceLocation, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::AuthorWarning,
            file: location.file.clone(),
            line: location.line,
            message: message.into(),
        }
    }

    pub fn fatal(location: &SourceLocation, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::FatalError,
            file: location.file.clone(),
            line: location.line,
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::FatalError
    }

    /// Render in the conventional multi-line error format.
    pub fn render(&self) -> String {
        let label = match self.severity {
            Severity::AuthorWarning => "Warning (dev)",
            Severity::FatalError => "Error",
        };
        let mut out = format!("CMake {} at {}:{}:\n", label, self.file, self.line);
        for line in self.message.lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Early-termination flags reported by dispatched commands and
/// propagated through replay to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionStatus {
    pub return_invoked: bool,
    pub break_invoked: bool,
}

impl ExecutionStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terminated(&self) -> bool {
        self.return_invoked || self.break_invoked
    }
}

/// Lookup of commands and targets for the COMMAND / TARGET predicates.
pub trait Registry {
    fn has_command(&self, name: &str) -> bool;
    fn has_target(&self, name: &str) -> bool;
}

/// Result of running a script through the facade.
#[derive(Debug, Clone, Serialize)]
pub struct ExecResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecResult {
    pub fn new(stdout: String, stderr: String, exit_code: i32) -> Self {
        Self { stdout, stderr, exit_code }
    }

    /// Success result with no output
    pub fn ok() -> Self {
        Self::new(String::new(), String::new(), 0)
    }

    /// Failure result with stderr message
    pub fn failure(stderr: impl Into<String>) -> Self {
        Self::new(String::new(), stderr.into(), 1)
    }
}

impl Default for ExecResult {
    fn default() -> Self {
        Self::ok()
    }
}
