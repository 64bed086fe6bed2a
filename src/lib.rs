//! just-cmake - a simulated CMake script environment
//!
//! This library provides a parser and execution engine for the
//! conditional subset of the CMake language: if/elseif/else/endif
//! blocks, the condition grammar, variable expansion and a small set of
//! builtin commands.

pub mod ast;
pub mod cmake;
pub mod fs;
pub mod interpreter;
pub mod parser;

pub use ast::types::*;
pub use cmake::{Cmake, CmakeOptions};
pub use fs::{FileSystemProbe, MemoryFs, MtimeComparison, OsFs};
pub use interpreter::policy::{PolicyId, PolicyRecords, PolicyStatus, PolicyStore};
pub use interpreter::types::{
    Diagnostic, ExecResult, ExecutionStatus, ExpandedArgument, Severity,
};
pub use interpreter::variables::{ScriptVariables, VariableStore};
pub use parser::{parse, ParseError};
