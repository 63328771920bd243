use std::collections::HashMap;

use crate::error::{NarrativeError, Result};
use crate::roles::RoleValue;

/// Per-role mapping from raw values to their stored descriptions.
///
/// Each description is a list whose first element is the display string
/// (e.g. the most representative phrase of a cluster). Further elements are
/// kept for callers that want them but are never displayed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelTable {
    roles: HashMap<String, HashMap<RoleValue, Vec<String>>>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, role: impl Into<String>, value: RoleValue, description: Vec<String>) {
        self.roles
            .entry(role.into())
            .or_default()
            .insert(value, description);
    }

    /// Insert a description made of the display string alone.
    pub fn insert_display(
        &mut self,
        role: impl Into<String>,
        value: RoleValue,
        display: impl Into<String>,
    ) {
        self.insert(role, value, vec![display.into()]);
    }

    pub fn description(&self, role: &str, value: &RoleValue) -> Option<&[String]> {
        self.roles.get(role)?.get(value).map(Vec::as_slice)
    }

    /// Display string of `value` for `role`. A missing or empty description
    /// is a configuration mismatch and fails.
    pub fn display(&self, role: &str, value: &RoleValue) -> Result<&str> {
        self.description(role, value)
            .and_then(|d| d.first())
            .map(String::as_str)
            .ok_or_else(|| NarrativeError::MissingLabel {
                role: role.to_string(),
                value: value.to_string(),
            })
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    /// Number of labelled values for `role`.
    pub fn count(&self, role: &str) -> usize {
        self.roles.get(role).map_or(0, HashMap::len)
    }
}
