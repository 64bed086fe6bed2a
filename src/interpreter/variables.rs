//! Variable store
//!
//! Key/value storage for script variables plus the environment map and
//! the regex match registers (CMAKE_MATCH_0..9). The conditional
//! evaluator is the only writer of the match registers while an
//! expression is being reduced; everything else goes through set/unset.

use indexmap::IndexMap;

/// Highest match register index, inclusive.
pub const MAX_MATCH_GROUPS: usize = 10;

/// Read/write access to script variables and the environment.
pub trait VariableStore {
    fn get(&self, name: &str) -> Option<&str>;
    fn is_defined(&self, name: &str) -> bool;
    fn get_env(&self, name: &str) -> Option<String>;
    fn set(&mut self, name: &str, value: &str);
    fn unset(&mut self, name: &str);
    fn set_env(&mut self, name: &str, value: &str);
    fn unset_env(&mut self, name: &str);

    /// Reset the match registers written by the previous successful match.
    fn clear_matches(&mut self);
    /// Store capture groups into CMAKE_MATCH_0..9. `None` marks a group
    /// that did not participate in the match.
    fn store_matches(&mut self, groups: &[Option<String>]);
}

/// Default in-memory store.
#[derive(Debug, Default)]
pub struct ScriptVariables {
    vars: IndexMap<String, String>,
    env: IndexMap<String, String>,
    stored_matches: Vec<String>,
}

impl ScriptVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate definitions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn match_register(index: usize) -> String {
        format!("CMAKE_MATCH_{}", index)
    }
}

impl VariableStore for ScriptVariables {
    fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(|s| s.as_str())
    }

    fn is_defined(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    fn get_env(&self, name: &str) -> Option<String> {
        self.env.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_string(), value.to_string());
    }

    fn unset(&mut self, name: &str) {
        self.vars.shift_remove(name);
    }

    fn set_env(&mut self, name: &str, value: &str) {
        self.env.insert(name.to_string(), value.to_string());
    }

    fn unset_env(&mut self, name: &str) {
        self.env.shift_remove(name);
    }

    fn clear_matches(&mut self) {
        let stored = std::mem::take(&mut self.stored_matches);
        for name in stored {
            self.vars.insert(name, String::new());
        }
    }

    fn store_matches(&mut self, groups: &[Option<String>]) {
        for (i, group) in groups.iter().enumerate().take(MAX_MATCH_GROUPS) {
            if let Some(text) = group {
                let name = Self::match_register(i);
                self.vars.insert(name.clone(), text.clone());
                self.stored_matches.push(name);
            }
        }
    }
}
