//! Argument Expansion
//!
//! Substitutes `${NAME}` and `$ENV{NAME}` references and decodes escape
//! sequences, producing the expanded arguments the evaluator and the
//! builtins consume. Runs per invocation, from the raw argument list.
//!
//! List semantics: an unquoted argument splits on the semicolons its
//! expansion produces and drops empty items; a quoted argument is always
//! exactly one expanded argument. Escaped semicolons never split.

use crate::ast::types::RawArgument;
use crate::interpreter::types::ExpandedArgument;
use crate::interpreter::variables::VariableStore;

/// Expand one invocation's raw arguments.
pub fn expand_arguments(args: &[RawArgument], vars: &dyn VariableStore) -> Vec<ExpandedArgument> {
    let mut expanded = Vec::with_capacity(args.len());
    for arg in args {
        if arg.quoted {
            let parts = expand_parts(&arg.value, vars, false);
            expanded.push(ExpandedArgument::new(parts.concat(), true));
        } else {
            for part in expand_parts(&arg.value, vars, true) {
                if !part.is_empty() {
                    expanded.push(ExpandedArgument::new(part, false));
                }
            }
        }
    }
    expanded
}

/// Expand reference syntax and escapes in one argument's text. With
/// `split`, unescaped semicolons (including those arriving from expanded
/// values) start a new part.
fn expand_parts(text: &str, vars: &dyn VariableStore, split: bool) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut parts = vec![String::new()];
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\\' && i + 1 < chars.len() {
            let escaped = chars[i + 1];
            let decoded = match escaped {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                other => other,
            };
            // an escaped semicolon is literal text, never a split point
            parts.last_mut().unwrap().push(decoded);
            i += 2;
            continue;
        }

        if c == '$' {
            if let Some((name_text, end)) = reference_at(&chars, i) {
                let name = expand_parts(name_text.text(), vars, false).concat();
                let value = if name_text.is_env {
                    vars.get_env(&name).unwrap_or_default()
                } else {
                    vars.get(&name).unwrap_or_default().to_string()
                };
                push_value(&mut parts, &value, split);
                i = end;
                continue;
            }
        }

        if c == ';' && split {
            parts.push(String::new());
            i += 1;
            continue;
        }

        parts.last_mut().unwrap().push(c);
        i += 1;
    }

    parts
}

struct Reference {
    inner: String,
    is_env: bool,
}

impl Reference {
    fn text(&self) -> &str {
        &self.inner
    }
}

/// Parse a `${...}` or `$ENV{...}` reference starting at `start`.
/// Returns the inner text and the index just past the closing brace.
/// Nested references are matched so `${${X}}` resolves innermost-first.
fn reference_at(chars: &[char], start: usize) -> Option<(Reference, usize)> {
    let is_env;
    let mut i;
    if starts_with_at(chars, start, "${") {
        is_env = false;
        i = start + 2;
    } else if starts_with_at(chars, start, "$ENV{") {
        is_env = true;
        i = start + 5;
    } else {
        return None;
    }

    let inner_start = i;
    let mut depth = 1u32;
    while i < chars.len() {
        if starts_with_at(chars, i, "${") {
            depth += 1;
            i += 2;
            continue;
        }
        if starts_with_at(chars, i, "$ENV{") {
            depth += 1;
            i += 5;
            continue;
        }
        if chars[i] == '}' {
            depth -= 1;
            if depth == 0 {
                let inner: String = chars[inner_start..i].iter().collect();
                return Some((Reference { inner, is_env }, i + 1));
            }
        }
        i += 1;
    }
    None
}

fn starts_with_at(chars: &[char], at: usize, needle: &str) -> bool {
    let mut i = at;
    for n in needle.chars() {
        if chars.get(i) != Some(&n) {
            return false;
        }
        i += 1;
    }
    true
}

fn push_value(parts: &mut Vec<String>, value: &str, split: bool) {
    for c in value.chars() {
        if c == ';' && split {
            parts.push(String::new());
        } else {
            parts.last_mut().unwrap().push(c);
        }
    }
}
