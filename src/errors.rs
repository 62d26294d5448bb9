use thiserror::Error;

/// Failure taxonomy of the matcher: compile errors are hard and propagate
/// to whoever asked for compilation, runtime errors are soft and are
/// converted to the caller's fallback by the evaluation entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("compile error: {0}")]
    Compile(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}

pub type Result<T> = std::result::Result<T, ExprError>;
