//! Per-conversion evaluation scope.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use super::condition::ConditionStack;
use crate::entry::{Entry, Group};

/// Template-visible global variables.
pub type Globals = BTreeMap<String, String>;

pub const GROUP_KEY: &str = "groupkey";
pub const GROUP_ID: &str = "groupid";
pub const GROUP_COUNT: &str = "groupcount";

/// Condition stack, bound group/entry and globals for one evaluation scope.
///
/// Loop iterations never share a context: [`RenderContext::for_group`] and
/// [`RenderContext::for_entry`] derive a child with a fresh condition stack,
/// so conditionals inside one iteration cannot reach siblings or the parent.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub conditions: ConditionStack,
    group: Option<&'a Group>,
    entry: Option<&'a Entry>,
    globals: Globals,
}

impl<'a> RenderContext<'a> {
    pub fn new(globals: Globals) -> Self {
        Self {
            conditions: ConditionStack::new(),
            group: None,
            entry: None,
            globals,
        }
    }

    pub fn group(&self) -> Option<&'a Group> {
        self.group
    }

    pub fn entry(&self) -> Option<&'a Entry> {
        self.entry
    }

    pub fn global(&self, name: &str) -> Option<&str> {
        self.globals.get(name).map(String::as_str)
    }

    pub fn set_global(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.globals.insert(name.into(), value.into());
    }

    /// Child scope for one group-loop iteration.
    pub fn for_group(&self, group: &'a Group) -> Self {
        let mut child = Self {
            conditions: ConditionStack::new(),
            group: Some(group),
            entry: None,
            globals: self.globals.clone(),
        };
        child.set_global(GROUP_KEY, group.label.as_str());
        child.set_global(GROUP_ID, group_id(&group.label));
        child.set_global(GROUP_COUNT, group.len().to_string());
        child
    }

    /// Child scope for one entry-loop iteration.
    pub fn for_entry(&self, entry: &'a Entry) -> Self {
        Self {
            conditions: ConditionStack::new(),
            group: self.group,
            entry: Some(entry),
            globals: self.globals.clone(),
        }
    }
}

/// Stable identifier for a group key: hex SHA-256 of the key.
pub fn group_id(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}
