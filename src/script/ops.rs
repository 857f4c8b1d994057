//! Operators on values.
//!
//! `+` treats `Default` as its identity element; every other arithmetic
//! operator yields `Default` when either side is `Default`. Numbers widen
//! from `Int` to `Double` as needed.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::core::{ScriptError, ScriptResult};

use super::ast::{BinaryOp, UnaryOp};
use super::function::Composition;
use super::value::{equal, Value};

#[derive(Clone, Copy, Debug)]
enum Num {
    Int(i64),
    Double(f64),
}

impl Num {
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Double(d) => d,
        }
    }
}

impl From<Num> for Value {
    fn from(n: Num) -> Self {
        match n {
            Num::Int(i) => Value::Int(i),
            Num::Double(d) => Value::Double(d),
        }
    }
}

/// Numeric view of a value. Strings holding a number count as numbers.
fn numeric(v: &Value) -> Option<Num> {
    match v {
        Value::Int(i) => Some(Num::Int(*i)),
        Value::Double(d) => Some(Num::Double(*d)),
        Value::String(s) => {
            let t = s.trim();
            t.parse::<i64>()
                .map(Num::Int)
                .ok()
                .or_else(|| t.parse::<f64>().ok().map(Num::Double))
        }
        _ => None,
    }
}

fn operands(op: BinaryOp, a: &Value, b: &Value) -> ScriptError {
    ScriptError::operands(op.symbol(), &a.type_name(), &b.type_name())
}

fn numbers(op: BinaryOp, a: &Value, b: &Value) -> ScriptResult<(Num, Num)> {
    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(operands(op, a, b)),
    }
}

/// Apply a unary operator.
pub fn unary(op: UnaryOp, v: &Value) -> ScriptResult<Value> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!v.to_bool()?)),
        UnaryOp::Neg => match v {
            Value::Default => Ok(Value::Default),
            Value::Int(i) => Ok(Value::Int(i.wrapping_neg())),
            Value::Double(d) => Ok(Value::Double(-d)),
            other => match numeric(other) {
                Some(Num::Int(i)) => Ok(Value::Int(i.wrapping_neg())),
                Some(Num::Double(d)) => Ok(Value::Double(-d)),
                None => Err(ScriptError::Type(format!(
                    "can not negate {}",
                    other.type_name()
                ))),
            },
        },
    }
}

/// Apply a non short-circuiting binary operator.
pub fn binary(op: BinaryOp, a: &Value, b: &Value) -> ScriptResult<Value> {
    match op {
        BinaryOp::Add => add(a, b),
        BinaryOp::Eq => Ok(Value::Bool(equal(a, b))),
        BinaryOp::Ne => Ok(Value::Bool(!equal(a, b))),
        BinaryOp::Lt => Ok(Value::Bool(compare(op, a, b)? == Ordering::Less)),
        BinaryOp::Gt => Ok(Value::Bool(compare(op, a, b)? == Ordering::Greater)),
        BinaryOp::Le => Ok(Value::Bool(compare(op, a, b)? != Ordering::Greater)),
        BinaryOp::Ge => Ok(Value::Bool(compare(op, a, b)? != Ordering::Less)),
        BinaryOp::And => Ok(Value::Bool(a.to_bool()? && b.to_bool()?)),
        BinaryOp::Or => Ok(Value::Bool(a.to_bool()? || b.to_bool()?)),
        BinaryOp::Xor => Ok(Value::Bool(a.to_bool()? != b.to_bool()?)),
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::IntDiv | BinaryOp::Mod
        | BinaryOp::Pow => arithmetic(op, a, b),
    }
}

fn add(a: &Value, b: &Value) -> ScriptResult<Value> {
    match (a, b) {
        (Value::Default, other) | (other, Value::Default) => Ok(other.clone()),
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(x.wrapping_add(*y))),
        (Value::Int(_) | Value::Double(_), Value::Int(_) | Value::Double(_)) => {
            let (x, y) = numbers(BinaryOp::Add, a, b)?;
            Ok(Value::Double(x.as_f64() + y.as_f64()))
        }
        (Value::String(x), Value::String(y)) => {
            let mut s = String::with_capacity(x.len() + y.len());
            s.push_str(x);
            s.push_str(y);
            Ok(Value::from(s))
        }
        (Value::String(_), _) | (_, Value::String(_))
            if !matches!(a, Value::Function(_) | Value::Object(_) | Value::Collection(_))
                && !matches!(b, Value::Function(_) | Value::Object(_) | Value::Collection(_)) =>
        {
            Ok(Value::from(format!("{a}{b}")))
        }
        (Value::Collection(x), Value::Collection(y)) => Ok(Value::collection(
            x.iter().chain(y.iter()).cloned(),
        )),
        (Value::Function(f), Value::Function(g)) => Ok(Value::Function(Rc::new(
            Composition::new(f.clone(), g.clone()),
        ))),
        _ => Err(operands(BinaryOp::Add, a, b)),
    }
}

fn arithmetic(op: BinaryOp, a: &Value, b: &Value) -> ScriptResult<Value> {
    if a.is_default() || b.is_default() {
        return Ok(Value::Default);
    }
    let (x, y) = numbers(op, a, b)?;
    let result = match (op, x, y) {
        (BinaryOp::Sub, Num::Int(x), Num::Int(y)) => Num::Int(x.wrapping_sub(y)),
        (BinaryOp::Mul, Num::Int(x), Num::Int(y)) => Num::Int(x.wrapping_mul(y)),
        (BinaryOp::Sub, x, y) => Num::Double(x.as_f64() - y.as_f64()),
        (BinaryOp::Mul, x, y) => Num::Double(x.as_f64() * y.as_f64()),
        (BinaryOp::Div, x, y) => Num::Double(x.as_f64() / y.as_f64()),
        (BinaryOp::IntDiv | BinaryOp::Mod, Num::Int(_), Num::Int(0)) => {
            return Err(ScriptError::Usage("division by zero".into()))
        }
        (BinaryOp::IntDiv, Num::Int(x), Num::Int(y)) => Num::Int(x.wrapping_div(y)),
        (BinaryOp::IntDiv, x, y) => Num::Int((x.as_f64() / y.as_f64()).trunc() as i64),
        (BinaryOp::Mod, Num::Int(x), Num::Int(y)) => Num::Int(x.wrapping_rem(y)),
        (BinaryOp::Mod, x, y) => Num::Double(x.as_f64() % y.as_f64()),
        (BinaryOp::Pow, Num::Int(x), Num::Int(y)) if (0..=u32::MAX as i64).contains(&y) => {
            match x.checked_pow(y as u32) {
                Some(p) => Num::Int(p),
                None => Num::Double((x as f64).powf(y as f64)),
            }
        }
        (BinaryOp::Pow, x, y) => Num::Double(x.as_f64().powf(y.as_f64())),
        _ => return Err(operands(op, a, b)),
    };
    Ok(result.into())
}

/// Order two values for `<`, `>`, `<=`, `>=`.
pub fn compare(op: BinaryOp, a: &Value, b: &Value) -> ScriptResult<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (Value::Int(_) | Value::Double(_), Value::Int(_) | Value::Double(_)) => {
            let (x, y) = numbers(op, a, b)?;
            x.as_f64()
                .partial_cmp(&y.as_f64())
                .ok_or_else(|| ScriptError::Type("can not compare NaN".into()))
        }
        (Value::Bool(x), Value::Bool(y)) => Ok(x.cmp(y)),
        _ => Err(operands(op, a, b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_ok(a: impl Into<Value>, b: impl Into<Value>) -> Value {
        add(&a.into(), &b.into()).unwrap()
    }

    #[test]
    fn test_add() {
        assert_eq!(add_ok(1, 2), Value::Int(3));
        assert_eq!(add_ok(1, 0.5), Value::Double(1.5));
        assert_eq!(add_ok("a", "b"), Value::from("ab"));
        assert_eq!(add_ok("n=", 3), Value::from("n=3"));
        assert_eq!(add_ok(Value::Default, 4), Value::Int(4));
        assert_eq!(add_ok("x", Value::Default), Value::from("x"));
    }

    #[test]
    fn test_add_collections() {
        let a = Value::collection([Value::from(1)]);
        let b = Value::collection([Value::from(2)]);
        assert_eq!(
            add(&a, &b).unwrap(),
            Value::collection([Value::from(1), Value::from(2)])
        );
    }

    #[test]
    fn test_arithmetic() {
        let v = |op, a: i64, b: i64| binary(op, &Value::from(a), &Value::from(b)).unwrap();
        assert_eq!(v(BinaryOp::Sub, 5, 7), Value::Int(-2));
        assert_eq!(v(BinaryOp::Mul, 6, 7), Value::Int(42));
        assert_eq!(v(BinaryOp::Div, 7, 2), Value::Double(3.5));
        assert_eq!(v(BinaryOp::IntDiv, 7, 2), Value::Int(3));
        assert_eq!(v(BinaryOp::Mod, 7, 3), Value::Int(1));
        assert_eq!(v(BinaryOp::Pow, 2, 10), Value::Int(1024));
        assert!(binary(BinaryOp::Mod, &Value::from(1), &Value::from(0)).is_err());
    }

    #[test]
    fn test_default_propagates() {
        assert_eq!(
            binary(BinaryOp::Mul, &Value::Default, &Value::from(3)).unwrap(),
            Value::Default
        );
        assert_eq!(unary(UnaryOp::Neg, &Value::Default).unwrap(), Value::Default);
        assert_eq!(unary(UnaryOp::Not, &Value::Default).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_comparisons() {
        let lt = |a: Value, b: Value| binary(BinaryOp::Lt, &a, &b);
        assert_eq!(lt(Value::from(1), Value::from(1.5)), Ok(Value::Bool(true)));
        assert_eq!(lt(Value::from("b"), Value::from("a")), Ok(Value::Bool(false)));
        assert!(matches!(
            lt(Value::from("a"), Value::from(1)),
            Err(ScriptError::Type(_))
        ));
        // equality never fails
        assert_eq!(
            binary(BinaryOp::Eq, &Value::from("a"), &Value::from(1)),
            Ok(Value::Bool(false))
        );
    }

    #[test]
    fn test_type_errors() {
        assert!(binary(BinaryOp::Sub, &Value::from(true), &Value::from(1)).is_err());
        assert!(add(&Value::from(true), &Value::collection([])).is_err());
    }
}
