use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ExprError, Result};

/// Severity of a reported issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    High,
    #[default]
    Normal,
    Low,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::High => "high",
            Severity::Normal => "normal",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "high" => Ok(Severity::High),
            "normal" => Ok(Severity::Normal),
            "low" => Ok(Severity::Low),
            other => Err(ExprError::Runtime(format!("unknown severity `{other}`"))),
        }
    }
}

/// A single static-analysis finding. Position fields use 0 as the
/// "unknown" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Issue {
    pub file_name: String,
    pub line_start: u32,
    pub line_end: u32,
    pub column_start: u32,
    pub column_end: u32,
    pub category: String,
    pub kind: String,
    pub severity: Severity,
    pub message: String,
}

/// Fluent builder for [`Issue`]. Negative positions clamp to 0; an unset
/// end position defaults to the corresponding start on [`build`].
///
/// [`build`]: IssueBuilder::build
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IssueBuilder {
    issue: Issue,
}

impl IssueBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line_start(mut self, line: i64) -> Self {
        self.issue.line_start = clamp_position(line);
        self
    }

    pub fn line_end(mut self, line: i64) -> Self {
        self.issue.line_end = clamp_position(line);
        self
    }

    pub fn column_start(mut self, column: i64) -> Self {
        self.issue.column_start = clamp_position(column);
        self
    }

    pub fn column_end(mut self, column: i64) -> Self {
        self.issue.column_end = clamp_position(column);
        self
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.issue.file_name = name.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.issue.category = category.into();
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.issue.kind = kind.into();
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.issue.severity = severity;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.issue.message = message.into();
        self
    }

    /// Build the issue. The builder stays usable afterwards.
    pub fn build(&self) -> Issue {
        let mut issue = self.issue.clone();
        if issue.line_end == 0 {
            issue.line_end = issue.line_start;
        }
        if issue.column_end == 0 {
            issue.column_end = issue.column_start;
        }
        issue
    }
}

fn clamp_position(value: i64) -> u32 {
    u32::try_from(value.clamp(0, i64::from(u32::MAX))).unwrap_or(0)
}
