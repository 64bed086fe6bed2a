//! Block-control state machine
//!
//! One IfBlocker is installed per top-level `if(...)`. During the
//! recording phase it absorbs every invocation, tracking nesting with a
//! scope counter, until the `endif` that brings the counter to zero.
//! The replay phase then walks the recorded body and selects exactly
//! one branch; the execution engine drives replay because dispatching a
//! nested `if` must install a nested machine.

use crate::ast::types::{Invocation, RawArgument, SourceLocation};

/// What the recording phase did with an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockerAction {
    /// Recorded into the body; the scope stays open.
    Recorded,
    /// The scope closed on a matching `endif`; replay may begin.
    Close,
}

/// Recorder for a single `if`/`endif` scope.
#[derive(Debug, Clone)]
pub struct IfBlocker {
    /// Raw arguments of the opening `if`, kept to validate `endif(...)`.
    pub args: Vec<RawArgument>,
    /// Invocations recorded between the opening `if` and its `endif`,
    /// in source order, nested headers included.
    pub body: Vec<Invocation>,
    /// Nesting counter; 1 right after the opening header.
    pub scope_depth: i32,
    /// Whether commands at the replay cursor are suppressed.
    pub is_blocking: bool,
    /// Whether some branch of this scope has already been selected.
    pub has_run: bool,
    /// Where the scope opened, for unclosed-block diagnostics.
    pub location: SourceLocation,
}

impl IfBlocker {
    /// Install a blocker for an opening header whose condition already
    /// evaluated to `initially_true`.
    pub fn new(args: Vec<RawArgument>, location: SourceLocation, initially_true: bool) -> Self {
        Self {
            args,
            body: Vec::new(),
            scope_depth: 1,
            is_blocking: !initially_true,
            has_run: initially_true,
            location,
        }
    }

    /// Record one invocation. Returns Close only when an `endif` brings
    /// the depth to zero *and* its arguments match the opening header;
    /// a mismatched `endif` leaves the machine installed and recording.
    pub fn observe(&mut self, invocation: &Invocation) -> BlockerAction {
        if invocation.name_is("if") {
            self.scope_depth += 1;
        }
        if invocation.name_is("endif") {
            self.scope_depth -= 1;
            if self.scope_depth == 0 {
                self.body.push(invocation.clone());
                if self.closes_with(&invocation.args) {
                    return BlockerAction::Close;
                }
                return BlockerAction::Recorded;
            }
        }
        self.body.push(invocation.clone());
        BlockerAction::Recorded
    }

    /// `endif` arguments must be empty or token-equal to the opening
    /// `if` arguments.
    fn closes_with(&self, args: &[RawArgument]) -> bool {
        if args.is_empty() {
            return true;
        }
        args.len() == self.args.len()
            && args
                .iter()
                .zip(self.args.iter())
                .all(|(a, b)| a.same_token(b))
    }
}
