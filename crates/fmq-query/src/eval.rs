//! Expression interpreter.
//!
//! Evaluates an [`Expr`] against an [`Environment`] that supplies the only
//! names an expression can see. There is no assignment, no loops, and no
//! access to anything the environment does not expose. Coercions follow the
//! usual scripting conventions so that conditions written for dynamic
//! metadata behave as their authors expect:
//!
//! - `==` compares across types (`"2" == 2`), `===` does not
//! - `+` concatenates when either side is a string
//! - `<` and friends compare strings lexicographically, everything else numerically
//! - `&&` and `||` short-circuit and yield one of their operands

use std::cmp::Ordering;

use fmq_core::{EvalError, Value};
use fmq_parser::ast::{BinaryOp, Expr, Literal, UnaryOp};
use fmq_parser::parse_expression;

/// Names visible to an expression.
pub trait Environment {
    /// Value bound to a bare name.
    fn variable(&self, name: &str) -> Option<Value>;

    /// Whether `name` is the root of a helper namespace such as `tp`.
    fn is_namespace(&self, _name: &str) -> bool {
        false
    }

    /// Invoke the helper at `path` (e.g. `["tp", "date", "today"]`).
    ///
    /// Returns `None` when no helper lives at that path.
    fn call(&self, _path: &[&str], _args: &[Value]) -> Option<Result<Value, EvalError>> {
        None
    }
}

/// Parse and evaluate `source` in one step.
///
/// # Errors
///
/// Returns an [`EvalError`] on a syntax error or any evaluation failure.
pub fn eval_str(source: &str, env: &dyn Environment) -> Result<Value, EvalError> {
    evaluate(&parse_expression(source)?, env)
}

/// Evaluate a parsed expression.
///
/// # Errors
///
/// Returns [`EvalError::Undefined`] for unknown names,
/// [`EvalError::NotAFunction`] for calls to anything that is not a helper
/// or supported method, and [`EvalError::PropertyOfAbsent`] for member
/// access on a missing value.
pub fn evaluate(expr: &Expr, env: &dyn Environment) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(literal) => Ok(literal_value(literal)),
        Expr::Ident(name) => lookup(name, env),
        Expr::Member { object, property } => {
            let target = evaluate(object, env)?;
            property_of(&target, property)
        }
        Expr::Index { object, index } => {
            let target = evaluate(object, env)?;
            let key = evaluate(index, env)?;
            index_into(&target, &key)
        }
        Expr::Call { callee, args } => call(callee, args, env),
        Expr::Unary { op, operand } => {
            let value = evaluate(operand, env)?;
            Ok(match op {
                UnaryOp::Not => Value::Bool(!value.is_truthy()),
                UnaryOp::Neg => Value::Number(-value.to_number()),
                UnaryOp::Plus => Value::Number(value.to_number()),
            })
        }
        Expr::Binary { op, left, right } => binary(*op, left, right, env),
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::String(s) => Value::String(s.clone()),
        Literal::Number(n) => Value::Number(*n),
        Literal::Boolean(b) => Value::Bool(*b),
        Literal::Null => Value::Absent,
    }
}

fn lookup(name: &str, env: &dyn Environment) -> Result<Value, EvalError> {
    if let Some(value) = env.variable(name) {
        return Ok(value);
    }
    if env.is_namespace(name) {
        return Err(EvalError::Type(format!(
            "{name} is a helper namespace, not a value"
        )));
    }
    Err(EvalError::Undefined(name.to_string()))
}

fn property_of(target: &Value, property: &str) -> Result<Value, EvalError> {
    match target {
        Value::Absent => Err(EvalError::PropertyOfAbsent {
            target: "undefined".to_string(),
            property: property.to_string(),
        }),
        Value::Sequence(items) if property == "length" => Ok(Value::from(items.len() as f64)),
        Value::String(s) if property == "length" => {
            Ok(Value::from(s.encode_utf16().count() as f64))
        }
        Value::Record(record) => Ok(record.get(property).cloned().unwrap_or_default()),
        _ => Ok(Value::Absent),
    }
}

fn index_into(target: &Value, key: &Value) -> Result<Value, EvalError> {
    if target.is_absent() {
        return Err(EvalError::PropertyOfAbsent {
            target: "undefined".to_string(),
            property: key.to_string(),
        });
    }

    if let Some(position) = as_position(key) {
        match target {
            Value::Sequence(items) => return Ok(items.get(position).cloned().unwrap_or_default()),
            Value::String(s) => {
                return Ok(s
                    .chars()
                    .nth(position)
                    .map(|c| Value::String(c.to_string()))
                    .unwrap_or_default())
            }
            _ => {}
        }
    }

    property_of(target, &key.to_string())
}

/// A key usable as a sequence position: a non-negative integral number or
/// a string of digits.
fn as_position(key: &Value) -> Option<usize> {
    match key {
        Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 && *n <= f64::from(u32::MAX) => {
            Some(*n as usize)
        }
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse().ok()
        }
        _ => None,
    }
}

fn call(callee: &Expr, args: &[Expr], env: &dyn Environment) -> Result<Value, EvalError> {
    let args = args
        .iter()
        .map(|arg| evaluate(arg, env))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(path) = callee.name_path() {
        if let Some(result) = env.call(&path, &args) {
            return result;
        }
        if path.len() == 1 || env.is_namespace(path[0]) {
            return Err(EvalError::NotAFunction(path.join(".")));
        }
    }

    match callee {
        Expr::Member { object, property } => {
            let target = evaluate(object, env)?;
            call_method(&target, property, &args)
        }
        _ => Err(EvalError::NotAFunction("expression".to_string())),
    }
}

fn call_method(target: &Value, method: &str, args: &[Value]) -> Result<Value, EvalError> {
    let arg = |i: usize| args.get(i).cloned().unwrap_or_default();

    match (target, method) {
        (Value::Absent, _) => Err(EvalError::PropertyOfAbsent {
            target: "undefined".to_string(),
            property: method.to_string(),
        }),
        (Value::Sequence(items), "includes") => {
            let needle = arg(0);
            Ok(Value::Bool(items.iter().any(|item| strict_equals(item, &needle))))
        }
        (Value::String(s), "includes") => Ok(Value::Bool(s.contains(&arg(0).to_string()))),
        (Value::String(s), "startsWith") => Ok(Value::Bool(s.starts_with(&arg(0).to_string()))),
        (Value::String(s), "endsWith") => Ok(Value::Bool(s.ends_with(&arg(0).to_string()))),
        (Value::String(s), "toLowerCase") => Ok(Value::String(s.to_lowercase())),
        (Value::String(s), "toUpperCase") => Ok(Value::String(s.to_uppercase())),
        (Value::String(s), "trim") => Ok(Value::String(s.trim().to_string())),
        _ => Err(EvalError::NotAFunction(format!(
            "{}.{method}",
            target.type_name()
        ))),
    }
}

fn binary(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    env: &dyn Environment,
) -> Result<Value, EvalError> {
    let lhs = evaluate(left, env)?;

    match op {
        BinaryOp::And => {
            return if lhs.is_truthy() {
                evaluate(right, env)
            } else {
                Ok(lhs)
            }
        }
        BinaryOp::Or => {
            return if lhs.is_truthy() {
                Ok(lhs)
            } else {
                evaluate(right, env)
            }
        }
        _ => {}
    }

    let rhs = evaluate(right, env)?;

    Ok(match op {
        BinaryOp::Eq => Value::Bool(loose_equals(&lhs, &rhs)),
        BinaryOp::Ne => Value::Bool(!loose_equals(&lhs, &rhs)),
        BinaryOp::StrictEq => Value::Bool(strict_equals(&lhs, &rhs)),
        BinaryOp::StrictNe => Value::Bool(!strict_equals(&lhs, &rhs)),
        BinaryOp::Lt => Value::Bool(compare(&lhs, &rhs) == Some(Ordering::Less)),
        BinaryOp::Le => Value::Bool(matches!(
            compare(&lhs, &rhs),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Gt => Value::Bool(compare(&lhs, &rhs) == Some(Ordering::Greater)),
        BinaryOp::Ge => Value::Bool(matches!(
            compare(&lhs, &rhs),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::Add => {
            let (lhs, rhs) = (to_primitive(lhs), to_primitive(rhs));
            if matches!(lhs, Value::String(_)) || matches!(rhs, Value::String(_)) {
                Value::String(format!("{lhs}{rhs}"))
            } else {
                Value::Number(lhs.to_number() + rhs.to_number())
            }
        }
        BinaryOp::Sub => Value::Number(lhs.to_number() - rhs.to_number()),
        BinaryOp::Mul => Value::Number(lhs.to_number() * rhs.to_number()),
        BinaryOp::Div => Value::Number(lhs.to_number() / rhs.to_number()),
        BinaryOp::Rem => Value::Number(lhs.to_number() % rhs.to_number()),
        BinaryOp::And | BinaryOp::Or => unreachable!("short-circuit operators handled above"),
    })
}

/// Collections compare and concatenate through their string form.
fn to_primitive(value: Value) -> Value {
    match value {
        Value::Sequence(_) | Value::Record(_) => Value::String(value.to_string()),
        other => other,
    }
}

fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    let (lhs, rhs) = (to_primitive(lhs.clone()), to_primitive(rhs.clone()));
    match (&lhs, &rhs) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => lhs.to_number().partial_cmp(&rhs.to_number()),
    }
}

/// Equality without type coercion. Collections compare structurally.
#[must_use]
pub fn strict_equals(lhs: &Value, rhs: &Value) -> bool {
    lhs == rhs
}

/// Equality with the cross-type coercions of `==`.
#[must_use]
pub fn loose_equals(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Absent, Value::Absent) => true,
        (Value::Absent, _) | (_, Value::Absent) => false,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(n), Value::String(_)) | (Value::String(_), Value::Number(n)) => {
            let other = if matches!(lhs, Value::Number(_)) { rhs } else { lhs };
            *n == other.to_number()
        }
        (Value::Bool(b), other) | (other, Value::Bool(b)) => {
            loose_equals(&Value::Number(f64::from(u8::from(*b))), other)
        }
        (Value::Sequence(_) | Value::Record(_), Value::Sequence(_) | Value::Record(_)) => {
            lhs == rhs
        }
        (collection @ (Value::Sequence(_) | Value::Record(_)), primitive)
        | (primitive, collection @ (Value::Sequence(_) | Value::Record(_))) => {
            loose_equals(&to_primitive(collection.clone()), primitive)
        }
    }
}
