use std::sync::{Arc, OnceLock};

use tracing::{debug, trace};

use crate::context::{BindingNames, Scope};
use crate::errors::Result;
use crate::eval::{eval_expr, Value};
use crate::expression::{parse_script, Expr};
use crate::functions::Registry;
use crate::issue::{Issue, IssueBuilder};

/// A compiled, reusable script. The matcher depends on this seam only,
/// not on the engine behind it, so hosts can substitute their own.
pub trait Program: Send + Sync + std::fmt::Debug {
    fn execute(&self, scope: &Scope) -> Result<Value>;
}

/// The in-crate engine: a parsed expression tree plus the function
/// registry it resolves bare calls against.
struct ExpressionProgram {
    ast: Expr,
    registry: Registry,
}

impl std::fmt::Debug for ExpressionProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpressionProgram")
            .field("ast", &self.ast)
            .finish_non_exhaustive()
    }
}

impl Program for ExpressionProgram {
    fn execute(&self, scope: &Scope) -> Result<Value> {
        eval_expr(&self.ast, scope, &self.registry)
    }
}

/// Shape of a raw script result, decided before the fallback policy is
/// applied.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Outcome {
    Truth(bool),
    Produced(Issue),
    Other(Value),
}

pub(crate) fn classify(value: Value) -> Outcome {
    match value {
        Value::Bool(flag) => Outcome::Truth(flag),
        Value::Issue(issue) => Outcome::Produced(issue),
        other => Outcome::Other(other),
    }
}

/// Evaluates one user-supplied expression against issues, never letting a
/// broken script take down the surrounding batch: every runtime failure
/// and every unusable result degrades to the configured fallback.
///
/// The script compiles lazily on the first evaluation and the artifact is
/// cached for the matcher's lifetime; a compile failure is cached the
/// same way, so a matcher built from a bad source keeps returning its
/// fallback. Call [`compile`] eagerly to surface the failure instead.
///
/// [`compile`]: ExpressionMatcher::compile
pub struct ExpressionMatcher {
    source: String,
    fallback: Value,
    names: BindingNames,
    registry: Registry,
    program: OnceLock<Result<Arc<dyn Program>>>,
}

impl ExpressionMatcher {
    pub fn new(source: impl Into<String>, fallback: Value) -> Self {
        Self {
            source: source.into(),
            fallback,
            names: BindingNames::default(),
            registry: Registry::with_builtins(),
            program: OnceLock::new(),
        }
    }

    /// Override the names under which the context is visible to the
    /// script. Takes effect before the first evaluation.
    pub fn with_binding_names(mut self, names: BindingNames) -> Self {
        self.names = names;
        self
    }

    /// Replace the function registry (defaults to the builtins). Takes
    /// effect before the first evaluation.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Compile the script, reusing the cached artifact after the first
    /// call. A parse failure propagates to the caller; hosts that want
    /// script errors visible at configuration-load time call this
    /// eagerly instead of waiting for the first evaluation.
    pub fn compile(&self) -> Result<Arc<dyn Program>> {
        self.program
            .get_or_init(|| {
                trace!(source = %self.source, "compiling expression");
                parse_script(&self.source).map(|ast| {
                    Arc::new(ExpressionProgram {
                        ast,
                        registry: self.registry.clone(),
                    }) as Arc<dyn Program>
                })
            })
            .clone()
    }

    /// Evaluate against one issue context. Returns the script's result
    /// when it is a boolean or an issue; runtime failures, compile
    /// failures on this lazy path, and results of any other type all
    /// yield the fallback.
    pub fn run(
        &self,
        issue: Option<&Issue>,
        builder: IssueBuilder,
        line_number: u32,
        file_name: &str,
    ) -> Value {
        match self.execute(issue, builder, line_number, file_name) {
            Ok(value) => match classify(value) {
                Outcome::Truth(flag) => Value::Bool(flag),
                Outcome::Produced(produced) => Value::Issue(produced),
                Outcome::Other(other) => {
                    debug!(
                        source = %self.source,
                        result = other.type_name(),
                        "expression produced an unusable result, using fallback"
                    );
                    self.fallback.clone()
                }
            },
            Err(err) => {
                debug!(source = %self.source, %err, "expression failed, using fallback");
                self.fallback.clone()
            }
        }
    }

    /// Call site that expects the script to build an issue; any other
    /// outcome yields the fallback (as an issue when it is one, an empty
    /// issue otherwise).
    pub fn create_issue(
        &self,
        issue: Option<&Issue>,
        builder: IssueBuilder,
        line_number: u32,
        file_name: &str,
    ) -> Issue {
        match self.run(issue, builder, line_number, file_name) {
            Value::Issue(produced) => produced,
            _ => self.fallback_issue(),
        }
    }

    /// Call site that expects a boolean verdict; any other outcome reads
    /// the fallback as a boolean (`false` unless the fallback is `true`).
    pub fn matches(
        &self,
        issue: Option<&Issue>,
        builder: IssueBuilder,
        line_number: u32,
        file_name: &str,
    ) -> bool {
        match self.run(issue, builder, line_number, file_name) {
            Value::Bool(flag) => flag,
            _ => matches!(self.fallback, Value::Bool(true)),
        }
    }

    fn fallback_issue(&self) -> Issue {
        match &self.fallback {
            Value::Issue(issue) => issue.clone(),
            _ => Issue::default(),
        }
    }

    fn execute(
        &self,
        issue: Option<&Issue>,
        builder: IssueBuilder,
        line_number: u32,
        file_name: &str,
    ) -> Result<Value> {
        let program = self.compile()?;
        let mut scope = Scope::new();
        scope.bind(
            self.names.issue.clone(),
            issue.map_or(Value::Null, |i| Value::Issue(i.clone())),
        );
        scope.bind(self.names.builder.clone(), Value::Builder(builder));
        scope.bind(
            self.names.line_number.clone(),
            Value::Int(i64::from(line_number)),
        );
        scope.bind(self.names.file_name.clone(), Value::Str(file_name.to_string()));
        program.execute(&scope)
    }
}
