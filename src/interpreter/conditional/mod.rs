//! Conditional Expression Evaluation
//!
//! Reduces the expanded argument list of an `if(...)` or `elseif(...)`
//! header to a single boolean. The reduction runs five precedence
//! passes over the token list, each to a fixed point, leftmost rewrite
//! first:
//! - parentheses
//! - unary predicates (EXISTS, DEFINED, TARGET, ...)
//! - binary operators (MATCHES, LESS, STREQUAL, VERSION_LESS, ...)
//! - NOT
//! - AND / OR
//!
//! Two policies shape evaluation. CMP0054 decides whether quoted tokens
//! may still match keywords or dereference as variables. CMP0012
//! selects between the legacy and the current boolean coercion when the
//! two disagree. Both statuses are read once per header, so a policy
//! change mid-replay cannot flip semantics inside one expression.

pub mod coercion;
pub mod keywords;
pub mod numeric;
pub mod version;

use std::cmp::Ordering;

use regex_lite::Regex;
use thiserror::Error;

use crate::ast::types::SourceLocation;
use crate::fs::types::{path_is_absolute, FileSystemProbe};
use crate::interpreter::policy::{PolicyId, PolicyStatus, PolicyStore};
use crate::interpreter::types::{Diagnostic, ExpandedArgument, Registry};
use crate::interpreter::variables::{VariableStore, MAX_MATCH_GROUPS};

use coercion::{is_falsy, is_falsy_constant, is_truthy_constant};
use keywords::{BinaryOp, UnaryOp, KEY_AND, KEY_NOT, KEY_OR, KEY_PAREN_L, KEY_PAREN_R};
use numeric::{parse_double_full, parse_double_prefix, parse_int_prefix};
use version::version_compare;

/// Fatal evaluation failures. Warnings are collected separately and do
/// not interrupt the reduction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("mismatched parenthesis in condition")]
    MismatchedParenthesis,

    #[error("Regular expression \"{0}\" cannot compile")]
    RegexCompile(String),

    #[error("Unknown arguments specified")]
    UnknownArguments,

    #[error("{0}")]
    PolicyRequired(String),
}

/// Build the full diagnostic text for a failed header evaluation,
/// echoing the expanded arguments ahead of the failure reason.
pub fn condition_error_message(args: &[ExpandedArgument], reason: &str) -> String {
    let mut message = String::from("given arguments:\n ");
    for arg in args {
        message.push(' ');
        message.push('"');
        message.push_str(&arg.value);
        message.push('"');
    }
    message.push('\n');
    message.push_str(reason);
    message
}

/// One-shot evaluator for a single `if`/`elseif` header. Policy
/// statuses are cached at construction; warnings accumulate and are
/// drained by the caller after evaluation.
pub struct ConditionEvaluator<'a> {
    vars: &'a mut dyn VariableStore,
    policies: &'a mut dyn PolicyStore,
    fs: &'a dyn FileSystemProbe,
    registry: &'a dyn Registry,
    location: SourceLocation,
    policy12: PolicyStatus,
    policy54: PolicyStatus,
    warnings: Vec<Diagnostic>,
}

impl<'a> ConditionEvaluator<'a> {
    pub fn new(
        vars: &'a mut dyn VariableStore,
        policies: &'a mut dyn PolicyStore,
        fs: &'a dyn FileSystemProbe,
        registry: &'a dyn Registry,
        location: SourceLocation,
    ) -> Self {
        let policy12 = policies.status(PolicyId::Cmp0012);
        let policy54 = policies.status(PolicyId::Cmp0054);
        Self {
            vars,
            policies,
            fs,
            registry,
            location,
            policy12,
            policy54,
            warnings: Vec::new(),
        }
    }

    /// Reduce an argument list to its truth value. An empty list is
    /// false with no diagnostic.
    pub fn evaluate(&mut self, args: &[ExpandedArgument]) -> Result<bool, EvalError> {
        if args.is_empty() {
            return Ok(false);
        }
        let mut tokens = args.to_vec();
        self.reduce_parens(&mut tokens)?;
        self.reduce_unary(&mut tokens)?;
        self.reduce_binary(&mut tokens)?;
        self.reduce_not(&mut tokens)?;
        self.reduce_bool_ops(&mut tokens)?;

        if tokens.len() != 1 {
            return Err(EvalError::UnknownArguments);
        }
        self.coerce_gated(&tokens[0], true)
    }

    /// Warnings gathered so far, leaving the evaluator empty.
    pub fn take_warnings(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.warnings)
    }

    // ---- keyword recognition -------------------------------------------

    fn quoted_tokens_may_match(&self) -> bool {
        matches!(self.policy54, PolicyStatus::Old | PolicyStatus::Warn)
    }

    /// Whether `arg` is the given structural keyword, honoring the
    /// quoted-token policy.
    fn is_keyword(&mut self, keyword: &str, arg: &ExpandedArgument) -> bool {
        if arg.quoted && !self.quoted_tokens_may_match() {
            return false;
        }
        let matched = arg.value == keyword;
        if matched && arg.quoted && self.policy54 == PolicyStatus::Warn {
            self.warn_quoted(&arg.value, "keywords", "interpreted as keywords");
        }
        matched
    }

    fn match_unary_op(&mut self, arg: &ExpandedArgument) -> Option<UnaryOp> {
        let op = UnaryOp::from_str(&arg.value)?;
        self.keyword_policy_check(arg).then_some(op)
    }

    fn match_binary_op(&mut self, arg: &ExpandedArgument) -> Option<BinaryOp> {
        let op = BinaryOp::from_str(&arg.value)?;
        self.keyword_policy_check(arg).then_some(op)
    }

    fn keyword_policy_check(&mut self, arg: &ExpandedArgument) -> bool {
        if !arg.quoted {
            return true;
        }
        if !self.quoted_tokens_may_match() {
            return false;
        }
        if self.policy54 == PolicyStatus::Warn {
            self.warn_quoted(&arg.value, "keywords", "interpreted as keywords");
        }
        true
    }

    /// Push an author warning unless this location has warned already.
    fn warn_once(&mut self, message: String) {
        if self.policies.has_warned_at(&self.location) {
            return;
        }
        self.policies.record_warning_at(self.location.clone());
        self.warnings.push(Diagnostic::warning(&self.location, message));
    }

    fn warn_quoted(&mut self, value: &str, noun: &str, action: &str) {
        let text = self.policies.warning_text(PolicyId::Cmp0054);
        self.warn_once(format!(
            "{}\n\nQuoted {} like \"{}\" will no longer be {} when the policy is \
             set to NEW.  Since the policy is not set the OLD behavior will be \
             used.",
            text, noun, value, action
        ));
    }

    // ---- value resolution ----------------------------------------------

    /// The variable named by `arg`, if quoting policy allows the
    /// dereference and the variable is defined.
    fn resolve_variable(&mut self, arg: &ExpandedArgument) -> Option<String> {
        if arg.quoted && !self.quoted_tokens_may_match() {
            return None;
        }
        let def = self.vars.get(&arg.value).map(|s| s.to_string());
        if def.is_some() && arg.quoted && self.policy54 == PolicyStatus::Warn {
            self.warn_quoted(&arg.value, "variables", "dereferenced");
        }
        def
    }

    /// Variable value when defined, else the literal token text.
    fn as_variable_or_string(&mut self, arg: &ExpandedArgument) -> String {
        self.resolve_variable(arg)
            .unwrap_or_else(|| arg.value.clone())
    }

    // ---- boolean coercion ----------------------------------------------

    fn coerce_new(&mut self, arg: &ExpandedArgument) -> bool {
        match arg.value.as_str() {
            "0" => return false,
            "1" => return true,
            _ => {}
        }
        if is_truthy_constant(&arg.value) {
            return true;
        }
        if is_falsy_constant(&arg.value) {
            return false;
        }
        if let Some(number) = parse_double_full(&arg.value) {
            return number != 0.0;
        }
        let def = self.resolve_variable(arg);
        !is_falsy(def.as_deref())
    }

    /// Legacy coercion. The singleton form accepts only "0"/"1" as
    /// literals; the multi-argument form falls back to an integer parse
    /// when the name is undefined.
    fn coerce_old(&mut self, arg: &ExpandedArgument, singleton: bool) -> bool {
        if singleton {
            match arg.value.as_str() {
                "0" => return false,
                "1" => return true,
                _ => {}
            }
            let def = self.resolve_variable(arg);
            return !is_falsy(def.as_deref());
        }
        match self.resolve_variable(arg) {
            Some(def) => !is_falsy_constant(&def),
            None => parse_int_prefix(&arg.value) != 0,
        }
    }

    /// Coercion through the CMP0012 gate. When the legacy and current
    /// results disagree, WARN warns and keeps the legacy result while
    /// REQUIRED_* is fatal.
    fn coerce_gated(&mut self, arg: &ExpandedArgument, singleton: bool) -> Result<bool, EvalError> {
        match self.policy12 {
            PolicyStatus::New => Ok(self.coerce_new(arg)),
            PolicyStatus::Old => Ok(self.coerce_old(arg, singleton)),
            status => {
                let new_result = self.coerce_new(arg);
                let old_result = self.coerce_old(arg, singleton);
                if new_result == old_result {
                    return Ok(new_result);
                }
                if status == PolicyStatus::Warn {
                    let text = self.policies.warning_text(PolicyId::Cmp0012);
                    self.warn_once(format!(
                        "An argument named \"{}\" appears in a conditional \
                         statement.  {}",
                        arg.value, text
                    ));
                    return Ok(old_result);
                }
                let text = self.policies.required_text(PolicyId::Cmp0012);
                Err(EvalError::PolicyRequired(format!(
                    "An argument named \"{}\" appears in a conditional statement.  {}",
                    arg.value, text
                )))
            }
        }
    }

    // ---- pass 0: parentheses -------------------------------------------

    fn reduce_parens(&mut self, tokens: &mut Vec<ExpandedArgument>) -> Result<(), EvalError> {
        loop {
            let mut open = None;
            for i in 0..tokens.len() {
                if self.is_keyword(KEY_PAREN_L, &tokens[i]) {
                    open = Some(i);
                    break;
                }
            }
            let Some(open) = open else {
                return Ok(());
            };

            let mut depth = 1u32;
            let mut close = None;
            for j in open + 1..tokens.len() {
                if self.is_keyword(KEY_PAREN_L, &tokens[j]) {
                    depth += 1;
                } else if self.is_keyword(KEY_PAREN_R, &tokens[j]) {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(j);
                        break;
                    }
                }
            }
            let Some(close) = close else {
                return Err(EvalError::MismatchedParenthesis);
            };

            let inner: Vec<ExpandedArgument> = tokens[open + 1..close].to_vec();
            let value = self.evaluate(&inner)?;
            tokens.splice(open..=close, [ExpandedArgument::from_bool(value)]);
        }
    }

    // ---- pass 1: unary predicates --------------------------------------

    fn reduce_unary(&mut self, tokens: &mut Vec<ExpandedArgument>) -> Result<(), EvalError> {
        let mut reduced = true;
        while reduced {
            reduced = false;
            for i in 0..tokens.len() {
                let Some(op) = self.match_unary_op(&tokens[i]) else {
                    continue;
                };
                // a predicate without an operand is left in place; the
                // final singleton check reports it
                if i + 1 >= tokens.len() {
                    continue;
                }
                let operand = tokens[i + 1].clone();
                let value = self.apply_unary(op, &operand);
                tokens.splice(i..=i + 1, [ExpandedArgument::from_bool(value)]);
                reduced = true;
                break;
            }
        }
        Ok(())
    }

    fn apply_unary(&mut self, op: UnaryOp, operand: &ExpandedArgument) -> bool {
        match op {
            UnaryOp::Exists => self.fs.exists(&operand.value),
            UnaryOp::IsDirectory => self.fs.is_directory(&operand.value),
            UnaryOp::IsSymlink => self.fs.is_symlink(&operand.value),
            UnaryOp::IsAbsolute => path_is_absolute(&operand.value),
            UnaryOp::Command => self.registry.has_command(&operand.value),
            UnaryOp::Policy => self.policies.knows(&operand.value),
            UnaryOp::Target => self.registry.has_target(&operand.value),
            UnaryOp::Defined => {
                let value = &operand.value;
                if value.len() > 4 && value.starts_with("ENV{") && value.ends_with('}') {
                    let name = &value[4..value.len() - 1];
                    self.vars.get_env(name).is_some()
                } else {
                    self.vars.is_defined(value)
                }
            }
        }
    }

    // ---- pass 2: binary operators --------------------------------------

    fn reduce_binary(&mut self, tokens: &mut Vec<ExpandedArgument>) -> Result<(), EvalError> {
        let mut reduced = true;
        while reduced {
            reduced = false;
            let mut i = 0;
            while i + 1 < tokens.len() {
                let Some(op) = self.match_binary_op(&tokens[i + 1]) else {
                    i += 1;
                    continue;
                };
                if i + 2 < tokens.len() {
                    let lhs = tokens[i].clone();
                    let rhs = tokens[i + 2].clone();
                    let value = self.apply_binary(op, &lhs, &rhs)?;
                    tokens.splice(i..=i + 2, [ExpandedArgument::from_bool(value)]);
                } else if op == BinaryOp::Matches {
                    // MATCHES with a left but no right operand is false
                    tokens.splice(i..=i + 1, [ExpandedArgument::from_bool(false)]);
                } else {
                    i += 1;
                    continue;
                }
                reduced = true;
                break;
            }
        }
        Ok(())
    }

    fn apply_binary(
        &mut self,
        op: BinaryOp,
        lhs: &ExpandedArgument,
        rhs: &ExpandedArgument,
    ) -> Result<bool, EvalError> {
        Ok(match op {
            BinaryOp::Matches => {
                let subject = self.as_variable_or_string(lhs);
                let regex = Regex::new(&rhs.value)
                    .map_err(|_| EvalError::RegexCompile(rhs.value.clone()))?;
                match regex.captures(&subject) {
                    Some(captures) => {
                        let groups: Vec<Option<String>> = (0..MAX_MATCH_GROUPS)
                            .map(|i| captures.get(i).map(|m| m.as_str().to_string()))
                            .collect();
                        self.vars.clear_matches();
                        self.vars.store_matches(&groups);
                        true
                    }
                    None => false,
                }
            }
            BinaryOp::Less | BinaryOp::Greater | BinaryOp::Equal => {
                let l = parse_double_prefix(&self.as_variable_or_string(lhs));
                let r = parse_double_prefix(&self.as_variable_or_string(rhs));
                match (l, r) {
                    (Some(l), Some(r)) => match op {
                        BinaryOp::Less => l < r,
                        BinaryOp::Greater => l > r,
                        _ => l == r,
                    },
                    _ => false,
                }
            }
            BinaryOp::StrLess | BinaryOp::StrGreater | BinaryOp::StrEqual => {
                let l = self.as_variable_or_string(lhs);
                let r = self.as_variable_or_string(rhs);
                match op {
                    BinaryOp::StrLess => l < r,
                    BinaryOp::StrGreater => l > r,
                    _ => l == r,
                }
            }
            BinaryOp::VersionLess | BinaryOp::VersionGreater | BinaryOp::VersionEqual => {
                let l = self.as_variable_or_string(lhs);
                let r = self.as_variable_or_string(rhs);
                match (op, version_compare(&l, &r)) {
                    (BinaryOp::VersionLess, ordering) => ordering == Ordering::Less,
                    (BinaryOp::VersionGreater, ordering) => ordering == Ordering::Greater,
                    (_, ordering) => ordering == Ordering::Equal,
                }
            }
            BinaryOp::IsNewerThan => {
                let cmp = self.fs.mtime_compare(&lhs.value, &rhs.value);
                // unable to determine counts as newer
                !cmp.determined || cmp.left_newer_or_equal
            }
        })
    }

    // ---- pass 3: NOT ----------------------------------------------------

    fn reduce_not(&mut self, tokens: &mut Vec<ExpandedArgument>) -> Result<(), EvalError> {
        let mut reduced = true;
        while reduced {
            reduced = false;
            for i in 0..tokens.len() {
                if !self.is_keyword(KEY_NOT, &tokens[i]) {
                    continue;
                }
                if i + 1 >= tokens.len() {
                    continue;
                }
                let operand = tokens[i + 1].clone();
                let value = !self.coerce_gated(&operand, false)?;
                tokens.splice(i..=i + 1, [ExpandedArgument::from_bool(value)]);
                reduced = true;
                break;
            }
        }
        Ok(())
    }

    // ---- pass 4: AND / OR ----------------------------------------------

    fn reduce_bool_ops(&mut self, tokens: &mut Vec<ExpandedArgument>) -> Result<(), EvalError> {
        let mut reduced = true;
        while reduced {
            reduced = false;
            let mut i = 0;
            while i + 2 < tokens.len() {
                let is_and = self.is_keyword(KEY_AND, &tokens[i + 1]);
                let is_or = !is_and && self.is_keyword(KEY_OR, &tokens[i + 1]);
                if !is_and && !is_or {
                    i += 1;
                    continue;
                }
                let lhs = tokens[i].clone();
                let rhs = tokens[i + 2].clone();
                let l = self.coerce_gated(&lhs, false)?;
                let r = self.coerce_gated(&rhs, false)?;
                let value = if is_and { l && r } else { l || r };
                tokens.splice(i..=i + 2, [ExpandedArgument::from_bool(value)]);
                reduced = true;
                break;
            }
        }
        Ok(())
    }
}
