//! Compatibility policies
//!
//! Each policy is a named switch selecting between legacy and current
//! semantics. The store keeps per-policy status plus the per-location
//! memo that limits WARN-status diagnostics to one per call site.

use std::collections::{HashMap, HashSet};

use crate::ast::types::SourceLocation;

/// Policies known to this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyId {
    /// if() recognizes numbers and boolean constants.
    Cmp0012,
    /// Only interpret if() arguments as variables or keywords when unquoted.
    Cmp0054,
}

impl PolicyId {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "CMP0012" => Some(PolicyId::Cmp0012),
            "CMP0054" => Some(PolicyId::Cmp0054),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyId::Cmp0012 => "CMP0012",
            PolicyId::Cmp0054 => "CMP0054",
        }
    }

    /// One-line summary used in policy diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            PolicyId::Cmp0012 => "if() recognizes numbers and boolean constants.",
            PolicyId::Cmp0054 => {
                "Only interpret if() arguments as variables or keywords when unquoted."
            }
        }
    }
}

/// Status of one policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyStatus {
    /// Legacy behavior, silently.
    Old,
    /// Legacy behavior plus a one-time warning per call site.
    Warn,
    /// Current behavior.
    New,
    /// Current behavior; relying on the legacy path is an error.
    RequiredIfUsed,
    RequiredAlways,
}

impl PolicyStatus {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "OLD" => Some(PolicyStatus::Old),
            "NEW" => Some(PolicyStatus::New),
            _ => None,
        }
    }
}

/// Access to policy statuses and the warned-location memo.
pub trait PolicyStore {
    fn status(&self, id: PolicyId) -> PolicyStatus;
    fn set_status(&mut self, id: PolicyId, status: PolicyStatus);
    /// Whether the name is a policy this engine knows (POLICY predicate).
    fn knows(&self, name: &str) -> bool;
    fn has_warned_at(&self, location: &SourceLocation) -> bool;
    fn record_warning_at(&mut self, location: SourceLocation);
    fn warning_text(&self, id: PolicyId) -> String;
    fn required_text(&self, id: PolicyId) -> String;
}

/// Default store. Policies start at WARN, the status an unconfigured
/// project gets.
#[derive(Debug, Default)]
pub struct PolicyRecords {
    statuses: HashMap<PolicyId, PolicyStatus>,
    warned_locations: HashSet<SourceLocation>,
}

impl PolicyRecords {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PolicyStore for PolicyRecords {
    fn status(&self, id: PolicyId) -> PolicyStatus {
        self.statuses.get(&id).copied().unwrap_or(PolicyStatus::Warn)
    }

    fn set_status(&mut self, id: PolicyId, status: PolicyStatus) {
        self.statuses.insert(id, status);
    }

    fn knows(&self, name: &str) -> bool {
        PolicyId::from_name(name).is_some()
    }

    fn has_warned_at(&self, location: &SourceLocation) -> bool {
        self.warned_locations.contains(location)
    }

    fn record_warning_at(&mut self, location: SourceLocation) {
        self.warned_locations.insert(location);
    }

    fn warning_text(&self, id: PolicyId) -> String {
        format!(
            "Policy {} is not set: {}  Run \"cmake --help-policy {}\" for policy \
             details.  Use the cmake_policy command to set the policy and \
             suppress this warning.",
            id.as_str(),
            id.describe(),
            id.as_str()
        )
    }

    fn required_text(&self, id: PolicyId) -> String {
        format!(
            "Policy {} is not set to NEW: {}  Run \"cmake --help-policy {}\" for \
             policy details.  CMake now requires this policy to be set to NEW by \
             the project.",
            id.as_str(),
            id.describe(),
            id.as_str()
        )
    }
}
