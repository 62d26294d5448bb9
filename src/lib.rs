//! Evaluates short user-authored expressions against static-analysis
//! issues: a script either yields a boolean verdict or builds a derived
//! issue, and every failure degrades to a caller-supplied fallback.

pub mod context;
pub mod errors;
pub mod functions; // plugin model
pub mod issue;

mod comparison;
mod eval;
mod expression;
mod matcher;
mod parser;

pub use context::{BindingNames, Scope};
pub use errors::{ExprError, Result};
pub use eval::Value;
pub use functions::{Function, Registry};
pub use issue::{Issue, IssueBuilder, Severity};
pub use matcher::{ExpressionMatcher, Program};

/// One-shot convenience: evaluate `source` against `issue` with a `false`
/// fallback, binding the issue's own position and file name. Compiles on
/// every call; hold an [`ExpressionMatcher`] to reuse the compiled form.
pub fn evaluate(source: &str, issue: &Issue) -> Value {
    ExpressionMatcher::new(source, Value::Bool(false)).run(
        Some(issue),
        IssueBuilder::new(),
        issue.line_start,
        &issue.file_name,
    )
}

/// One-shot boolean check with a `false` fallback.
pub fn matches(source: &str, issue: &Issue) -> bool {
    ExpressionMatcher::new(source, Value::Bool(false)).matches(
        Some(issue),
        IssueBuilder::new(),
        issue.line_start,
        &issue.file_name,
    )
}
