//! AST Module
//!
//! Types describing a parsed script: invocations and their raw arguments.

pub mod types;

pub use types::*;
