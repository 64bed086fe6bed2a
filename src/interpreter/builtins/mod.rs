//! Builtin Commands
//!
//! Script-level commands the engine can dispatch outside of control
//! flow. Control headers (if/elseif/else/endif) are not handled here;
//! the engine owns them.

pub mod control_cmds;
pub mod message_cmd;
pub mod policy_cmd;
pub mod set_cmd;
pub mod target_cmds;

pub use control_cmds::{handle_break, handle_return};
pub use message_cmd::handle_message;
pub use policy_cmd::handle_cmake_policy;
pub use set_cmd::{handle_set, handle_unset};
pub use target_cmds::handle_add_target;

use crate::ast::types::Invocation;
use crate::interpreter::execution_engine::ExecutionEngine;
use crate::interpreter::types::{Diagnostic, ExecutionStatus};

/// Every command name this engine answers to, control headers included.
/// The COMMAND predicate checks this list.
pub const COMMAND_NAMES: &[&str] = &[
    "if",
    "elseif",
    "else",
    "endif",
    "set",
    "unset",
    "message",
    "break",
    "return",
    "cmake_policy",
    "add_executable",
    "add_library",
];

/// Case-insensitive command existence check.
pub fn is_command(name: &str) -> bool {
    COMMAND_NAMES.iter().any(|c| name.eq_ignore_ascii_case(c))
}

/// Dispatch a non-control invocation to its handler. Unknown commands
/// are fatal.
pub fn dispatch(
    engine: &mut ExecutionEngine,
    invocation: &Invocation,
    status: &mut ExecutionStatus,
) -> Result<(), Diagnostic> {
    let name = invocation.name.to_ascii_lowercase();
    match name.as_str() {
        "set" => handle_set(engine, invocation),
        "unset" => handle_unset(engine, invocation),
        "message" => handle_message(engine, invocation),
        "break" => handle_break(status),
        "return" => handle_return(status),
        "cmake_policy" => handle_cmake_policy(engine, invocation),
        "add_executable" | "add_library" => handle_add_target(engine, invocation),
        _ => Err(Diagnostic::fatal(
            &invocation.location,
            format!("Unknown CMake command \"{}\".", invocation.name),
        )),
    }
}
