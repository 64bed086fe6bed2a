//! AST Types
//!
//! A script is a flat sequence of command invocations. Control flow
//! (if/elseif/else/endif) is not a tree here: the execution engine pairs
//! the headers at run time, so every invocation keeps its raw argument
//! list exactly as written.

use std::fmt;

/// Position of an invocation in its source script.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Script file name (or a synthetic name for inline scripts).
    pub file: String,
    /// 1-based line of the command name.
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self { file: file.into(), line }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A single argument as written in the script, before variable expansion.
///
/// The quoted flag survives into evaluation: quoting decides whether a
/// token may be recognized as a keyword or dereferenced as a variable.
#[derive(Debug, Clone, PartialEq)]
pub struct RawArgument {
    /// Argument text with escape sequences still intact.
    pub value: String,
    /// True when the argument was written as "..." in source.
    pub quoted: bool,
    /// 1-based source line of the argument.
    pub line: u32,
}

impl RawArgument {
    pub fn new(value: impl Into<String>, quoted: bool, line: u32) -> Self {
        Self { value: value.into(), quoted, line }
    }

    /// Token-wise equality: value and quoting, ignoring source position.
    /// Used to pair an `endif(...)` with its opening `if(...)`.
    pub fn same_token(&self, other: &RawArgument) -> bool {
        self.value == other.value && self.quoted == other.quoted
    }
}

/// A parsed command call: a name plus raw arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Command name as written; dispatch compares case-insensitively.
    pub name: String,
    pub args: Vec<RawArgument>,
    pub location: SourceLocation,
}

impl Invocation {
    pub fn new(name: impl Into<String>, args: Vec<RawArgument>, location: SourceLocation) -> Self {
        Self { name: name.into(), args, location }
    }

    /// Case-insensitive name check.
    pub fn name_is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_case_insensitive() {
        let inv = Invocation::new("IF", vec![], SourceLocation::new("s.cmake", 1));
        assert!(inv.name_is("if"));
        assert!(inv.name_is("If"));
        assert!(!inv.name_is("endif"));
    }

    #[test]
    fn test_same_token_ignores_line() {
        let a = RawArgument::new("FOO", false, 1);
        let b = RawArgument::new("FOO", false, 9);
        assert!(a.same_token(&b));

        let quoted = RawArgument::new("FOO", true, 1);
        assert!(!a.same_token(&quoted));

        let other = RawArgument::new("BAR", false, 1);
        assert!(!a.same_token(&other));
    }

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation::new("build.cmake", 12);
        assert_eq!(loc.to_string(), "build.cmake:12");
    }
}
