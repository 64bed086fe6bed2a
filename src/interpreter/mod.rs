//! Interpreter module
//!
//! The execution engine, the conditional evaluator and their stores.

pub mod block_control;
pub mod builtins;
pub mod conditional;
pub mod execution_engine;
pub mod expansion;
pub mod policy;
pub mod types;
pub mod variables;

pub use block_control::*;
pub use conditional::{condition_error_message, ConditionEvaluator, EvalError};
pub use execution_engine::*;
pub use expansion::*;
pub use policy::*;
pub use types::*;
pub use variables::*;
