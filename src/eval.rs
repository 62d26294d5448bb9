use std::fmt;

use serde::Serialize;

use crate::comparison::{compare_values, values_equal};
use crate::context::Scope;
use crate::errors::{ExprError, Result};
use crate::expression::{BinaryOp, Expr, UnaryOp};
use crate::functions::Registry;
use crate::issue::IssueBuilder;

/// A runtime value flowing through an expression. Serializes to plain
/// JSON (booleans, numbers, strings, issue objects, null); builders only
/// exist while a script runs and never leave the matcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Issue(crate::issue::Issue),
    Builder(IssueBuilder),
    #[default]
    Null,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Issue(_) => "issue",
            Value::Builder(_) => "builder",
            Value::Null => "null",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Script-level truthiness: null and false are false, zero and the
    /// empty string are false, everything else is true.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Issue(_) | Value::Builder(_) => true,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::Issue(issue) => {
                write!(f, "{}:{}: {}", issue.file_name, issue.line_start, issue.message)
            }
            Value::Builder(_) => f.write_str("builder"),
            Value::Null => f.write_str("null"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<crate::issue::Issue> for Value {
    fn from(issue: crate::issue::Issue) -> Self {
        Value::Issue(issue)
    }
}

/// Walk the tree under the given scope, resolving bare calls through the
/// registry. Every failure path is an `ExprError::Runtime`.
pub(crate) fn eval_expr(expr: &Expr, scope: &Scope, registry: &Registry) -> Result<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Var(name) => scope
            .get(name)
            .cloned()
            .ok_or_else(|| ExprError::Runtime(format!("unbound variable `{name}`"))),
        Expr::Field { target, name } => {
            let value = eval_expr(target, scope, registry)?;
            field_access(&value, name)
        }
        Expr::Method { target, name, args } => {
            let value = eval_expr(target, scope, registry)?;
            let args = eval_args(args, scope, registry)?;
            method_call(value, name, &args)
        }
        Expr::Call { name, args } => {
            let function = registry
                .get(name)
                .ok_or_else(|| ExprError::Runtime(format!("unknown function `{name}`")))?;
            let args = eval_args(args, scope, registry)?;
            if !function.arity().contains(&args.len()) {
                return Err(ExprError::Runtime(format!(
                    "`{name}` called with {} arguments",
                    args.len()
                )));
            }
            function.call(&args)
        }
        Expr::Unary { op, operand } => {
            let value = eval_expr(operand, scope, registry)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!value.truthy())),
                UnaryOp::Neg => match value {
                    Value::Int(n) => n
                        .checked_neg()
                        .map(Value::Int)
                        .ok_or_else(|| ExprError::Runtime("integer overflow".into())),
                    Value::Float(f) => Ok(Value::Float(-f)),
                    other => Err(ExprError::Runtime(format!(
                        "cannot negate {}",
                        other.type_name()
                    ))),
                },
            }
        }
        Expr::Binary { op, left, right } => match op {
            BinaryOp::And => {
                if !eval_expr(left, scope, registry)?.truthy() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(eval_expr(right, scope, registry)?.truthy()))
            }
            BinaryOp::Or => {
                if eval_expr(left, scope, registry)?.truthy() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(eval_expr(right, scope, registry)?.truthy()))
            }
            BinaryOp::Eq | BinaryOp::Ne => {
                let lhs = eval_expr(left, scope, registry)?;
                let rhs = eval_expr(right, scope, registry)?;
                let equal = values_equal(&lhs, &rhs);
                Ok(Value::Bool(if *op == BinaryOp::Eq { equal } else { !equal }))
            }
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let lhs = eval_expr(left, scope, registry)?;
                let rhs = eval_expr(right, scope, registry)?;
                let ord = compare_values(&lhs, &rhs)?;
                let pass = match op {
                    BinaryOp::Lt => ord.is_lt(),
                    BinaryOp::Le => ord.is_le(),
                    BinaryOp::Gt => ord.is_gt(),
                    _ => ord.is_ge(),
                };
                Ok(Value::Bool(pass))
            }
            BinaryOp::Add => {
                let lhs = eval_expr(left, scope, registry)?;
                let rhs = eval_expr(right, scope, registry)?;
                add_values(lhs, rhs)
            }
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
                let lhs = eval_expr(left, scope, registry)?;
                let rhs = eval_expr(right, scope, registry)?;
                numeric_binary(*op, lhs, rhs)
            }
        },
    }
}

fn eval_args(args: &[Expr], scope: &Scope, registry: &Registry) -> Result<Vec<Value>> {
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        out.push(eval_expr(arg, scope, registry)?);
    }
    Ok(out)
}

fn field_access(value: &Value, name: &str) -> Result<Value> {
    match value {
        Value::Issue(issue) => match name {
            "file_name" => Ok(Value::Str(issue.file_name.clone())),
            "line_start" => Ok(Value::Int(i64::from(issue.line_start))),
            "line_end" => Ok(Value::Int(i64::from(issue.line_end))),
            "column_start" => Ok(Value::Int(i64::from(issue.column_start))),
            "column_end" => Ok(Value::Int(i64::from(issue.column_end))),
            "category" => Ok(Value::Str(issue.category.clone())),
            "kind" => Ok(Value::Str(issue.kind.clone())),
            "severity" => Ok(Value::Str(issue.severity.to_string())),
            "message" => Ok(Value::Str(issue.message.clone())),
            _ => Err(ExprError::Runtime(format!("issue has no field `{name}`"))),
        },
        other => Err(ExprError::Runtime(format!(
            "cannot read field `{name}` of {}",
            other.type_name()
        ))),
    }
}

fn method_call(value: Value, name: &str, args: &[Value]) -> Result<Value> {
    match value {
        Value::Builder(builder) => builder_call(builder, name, args),
        other => Err(ExprError::Runtime(format!(
            "cannot call `{name}` on {}",
            other.type_name()
        ))),
    }
}

fn builder_call(builder: IssueBuilder, name: &str, args: &[Value]) -> Result<Value> {
    if name == "build" {
        if !args.is_empty() {
            return Err(ExprError::Runtime("`build` takes no arguments".into()));
        }
        return Ok(Value::Issue(builder.build()));
    }
    let [arg] = args else {
        return Err(ExprError::Runtime(format!("`{name}` takes one argument")));
    };
    let updated = match name {
        "line_start" => builder.line_start(int_arg(name, arg)?),
        "line_end" => builder.line_end(int_arg(name, arg)?),
        "column_start" => builder.column_start(int_arg(name, arg)?),
        "column_end" => builder.column_end(int_arg(name, arg)?),
        "file_name" => builder.file_name(str_arg(name, arg)?),
        "category" => builder.category(str_arg(name, arg)?),
        "kind" => builder.kind(str_arg(name, arg)?),
        "message" => builder.message(str_arg(name, arg)?),
        "severity" => builder.severity(str_arg(name, arg)?.parse()?),
        _ => {
            return Err(ExprError::Runtime(format!(
                "builder has no method `{name}`"
            )))
        }
    };
    Ok(Value::Builder(updated))
}

fn int_arg(name: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Int(n) => Ok(*n),
        other => Err(ExprError::Runtime(format!(
            "`{name}` expects an integer, got {}",
            other.type_name()
        ))),
    }
}

fn str_arg<'a>(name: &str, value: &'a Value) -> Result<&'a str> {
    value.as_str().ok_or_else(|| {
        ExprError::Runtime(format!(
            "`{name}` expects a string, got {}",
            value.type_name()
        ))
    })
}

/// `+` concatenates when either side is a string, otherwise it is
/// numeric addition.
fn add_values(lhs: Value, rhs: Value) -> Result<Value> {
    match (lhs, rhs) {
        (Value::Str(a), b) => Ok(Value::Str(format!("{a}{b}"))),
        (a, Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
        (a, b) => numeric_binary(BinaryOp::Add, a, b),
    }
}

fn numeric_binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value> {
    match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => int_binary(op, *a, *b),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            Ok(Value::Float(float_binary(op, as_f64(&lhs), as_f64(&rhs))))
        }
        _ => Err(ExprError::Runtime(format!(
            "cannot apply `{}` to {} and {}",
            op.symbol(),
            lhs.type_name(),
            rhs.type_name()
        ))),
    }
}

fn int_binary(op: BinaryOp, a: i64, b: i64) -> Result<Value> {
    let out = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div => {
            if b == 0 {
                return Err(ExprError::Runtime("division by zero".into()));
            }
            a.checked_div(b)
        }
        BinaryOp::Rem => {
            if b == 0 {
                return Err(ExprError::Runtime("division by zero".into()));
            }
            a.checked_rem(b)
        }
        _ => None,
    };
    out.map(Value::Int)
        .ok_or_else(|| ExprError::Runtime("integer overflow".into()))
}

fn float_binary(op: BinaryOp, a: f64, b: f64) -> f64 {
    match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        _ => a % b,
    }
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Int(n) => *n as f64,
        Value::Float(f) => *f,
        _ => f64::NAN,
    }
}
