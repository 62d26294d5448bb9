use std::collections::HashMap;

use crate::eval::Value;

/// Names under which the per-call context is visible to a script. These
/// are a contract between the host and its rule authors, so they are
/// configuration rather than hardcoded identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingNames {
    pub issue: String,
    pub builder: String,
    pub line_number: String,
    pub file_name: String,
}

impl Default for BindingNames {
    fn default() -> Self {
        Self {
            issue: "issue".into(),
            builder: "builder".into(),
            line_number: "line_number".into(),
            file_name: "file_name".into(),
        }
    }
}

/// Variable scope for a single evaluation, built fresh per call and
/// dropped right after it.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    vars: HashMap<String, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }
}
