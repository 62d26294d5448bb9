use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::errors::Result;
use crate::eval::Value;

/// Trait for pluggable functions callable from an expression body.
pub trait Function: Send + Sync {
    fn name(&self) -> &'static str;
    fn arity(&self) -> RangeInclusive<usize>;
    fn call(&self, args: &[Value]) -> Result<Value>;
}

/// Thread-safe function registry shared by compiled scripts.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<HashMap<&'static str, Arc<dyn Function>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(builtins::Lower);
        registry.register(builtins::Upper);
        registry.register(builtins::Length);
        registry.register(builtins::Contains);
        registry.register(builtins::StartsWith);
        registry.register(builtins::EndsWith);
        registry.register(builtins::Matches);
        registry.register(builtins::Fail);
        registry
    }

    /// Register a function, replacing any previous one with the same name.
    pub fn register<F: Function + 'static>(&mut self, function: F) {
        let map = Arc::make_mut(&mut self.inner);
        map.insert(function.name(), Arc::new(function));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Function>> {
        self.inner.get(name).cloned()
    }
}

pub mod builtins {
    use regex::Regex;

    use super::{Function, RangeInclusive, Result, Value};
    use crate::errors::ExprError;

    fn text<'a>(name: &str, args: &'a [Value], index: usize) -> Result<&'a str> {
        match args.get(index) {
            Some(Value::Str(s)) => Ok(s),
            Some(other) => Err(ExprError::Runtime(format!(
                "`{name}` expects a string, got {}",
                other.type_name()
            ))),
            None => Err(ExprError::Runtime(format!("`{name}` is missing an argument"))),
        }
    }

    pub struct Lower;
    impl Function for Lower {
        fn name(&self) -> &'static str {
            "lower"
        }
        fn arity(&self) -> RangeInclusive<usize> {
            1..=1
        }
        fn call(&self, args: &[Value]) -> Result<Value> {
            Ok(match args.first() {
                Some(Value::Str(s)) => Value::Str(s.to_lowercase()),
                Some(other) => other.clone(),
                None => Value::Null,
            })
        }
    }

    pub struct Upper;
    impl Function for Upper {
        fn name(&self) -> &'static str {
            "upper"
        }
        fn arity(&self) -> RangeInclusive<usize> {
            1..=1
        }
        fn call(&self, args: &[Value]) -> Result<Value> {
            Ok(match args.first() {
                Some(Value::Str(s)) => Value::Str(s.to_uppercase()),
                Some(other) => other.clone(),
                None => Value::Null,
            })
        }
    }

    pub struct Length;
    impl Function for Length {
        fn name(&self) -> &'static str {
            "length"
        }
        fn arity(&self) -> RangeInclusive<usize> {
            1..=1
        }
        fn call(&self, args: &[Value]) -> Result<Value> {
            let len = match args.first() {
                Some(Value::Str(s)) => s.chars().count() as i64,
                _ => 0,
            };
            Ok(Value::Int(len))
        }
    }

    pub struct Contains;
    impl Function for Contains {
        fn name(&self) -> &'static str {
            "contains"
        }
        fn arity(&self) -> RangeInclusive<usize> {
            2..=2
        }
        fn call(&self, args: &[Value]) -> Result<Value> {
            let haystack = text("contains", args, 0)?;
            let needle = text("contains", args, 1)?;
            Ok(Value::Bool(haystack.contains(needle)))
        }
    }

    pub struct StartsWith;
    impl Function for StartsWith {
        fn name(&self) -> &'static str {
            "starts_with"
        }
        fn arity(&self) -> RangeInclusive<usize> {
            2..=2
        }
        fn call(&self, args: &[Value]) -> Result<Value> {
            let haystack = text("starts_with", args, 0)?;
            let prefix = text("starts_with", args, 1)?;
            Ok(Value::Bool(haystack.starts_with(prefix)))
        }
    }

    pub struct EndsWith;
    impl Function for EndsWith {
        fn name(&self) -> &'static str {
            "ends_with"
        }
        fn arity(&self) -> RangeInclusive<usize> {
            2..=2
        }
        fn call(&self, args: &[Value]) -> Result<Value> {
            let haystack = text("ends_with", args, 0)?;
            let suffix = text("ends_with", args, 1)?;
            Ok(Value::Bool(haystack.ends_with(suffix)))
        }
    }

    /// Regex match. The pattern is script data, so a bad pattern is a
    /// runtime error, not a compile error.
    pub struct Matches;
    impl Function for Matches {
        fn name(&self) -> &'static str {
            "matches"
        }
        fn arity(&self) -> RangeInclusive<usize> {
            2..=2
        }
        fn call(&self, args: &[Value]) -> Result<Value> {
            let haystack = text("matches", args, 0)?;
            let pattern = text("matches", args, 1)?;
            let re = Regex::new(pattern)
                .map_err(|e| ExprError::Runtime(format!("invalid pattern in `matches`: {e}")))?;
            Ok(Value::Bool(re.is_match(haystack)))
        }
    }

    /// Unconditionally raises a runtime error; the idiom for scripts
    /// that abort instead of producing a verdict.
    pub struct Fail;
    impl Function for Fail {
        fn name(&self) -> &'static str {
            "fail"
        }
        fn arity(&self) -> RangeInclusive<usize> {
            0..=1
        }
        fn call(&self, args: &[Value]) -> Result<Value> {
            let message = match args.first() {
                Some(value) => value.to_string(),
                None => "script aborted".to_string(),
            };
            Err(ExprError::Runtime(message))
        }
    }
}
