//! Tree-walking evaluator.

use std::rc::Rc;

use crate::core::{ScriptError, ScriptResult};

use super::ast::{BinaryOp, Expr, TemplatePart};
use super::context::Context;
use super::function::{Args, Closure};
use super::ops;
use super::value::Value;

/// Evaluate `expr` in `ctx`.
pub fn eval(expr: &Expr, ctx: &mut Context) -> ScriptResult<Value> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Template(parts) => {
            let mut out = String::new();
            for part in parts {
                match part {
                    TemplatePart::Text(text) => out.push_str(text),
                    TemplatePart::Code(code) => out.push_str(&eval(code, ctx)?.to_string()),
                }
            }
            Ok(Value::from(out))
        }
        Expr::List(items) => {
            let values = items
                .iter()
                .map(|e| eval(e, ctx))
                .collect::<ScriptResult<Vec<_>>>()?;
            Ok(Value::from(values))
        }
        Expr::Var(name) => ctx.get_variable(name),
        Expr::Assign(name, value) => {
            let v = eval(value, ctx)?;
            ctx.set_variable(name.clone(), v.clone());
            Ok(v)
        }
        Expr::Sequence(items) => {
            let mut last = Value::Default;
            for e in items {
                last = eval(e, ctx)?;
            }
            Ok(last)
        }
        Expr::If {
            cond,
            then,
            otherwise,
        } => {
            if eval(cond, ctx)?.to_bool()? {
                eval(then, ctx)
            } else if let Some(e) = otherwise {
                eval(e, ctx)
            } else {
                Ok(Value::Default)
            }
        }
        Expr::ForEach { var, items, body } => {
            let items = eval(items, ctx)?;
            if let Value::Object(o) = &items {
                ctx.mark_dependency_member(o.as_ref(), "cards");
            }
            let mut acc = Value::Default;
            for item in items.make_iterator()? {
                let result = ctx.with_child_scope(|ctx| {
                    ctx.set_variable(var.clone(), item);
                    eval(body, ctx)
                })?;
                acc = ops::binary(BinaryOp::Add, &acc, &result)?;
            }
            Ok(acc)
        }
        Expr::ForRange { var, from, to, body } => {
            let from = eval(from, ctx)?.to_int()?;
            let to = eval(to, ctx)?.to_int()?;
            let mut acc = Value::Default;
            for i in from..=to {
                let result = ctx.with_child_scope(|ctx| {
                    ctx.set_variable(var.clone(), Value::Int(i));
                    eval(body, ctx)
                })?;
                acc = ops::binary(BinaryOp::Add, &acc, &result)?;
            }
            Ok(acc)
        }
        Expr::Unary(op, operand) => {
            let v = eval(operand, ctx)?;
            ops::unary(*op, &v)
        }
        Expr::Binary(BinaryOp::And, l, r) => {
            if !eval(l, ctx)?.to_bool()? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(eval(r, ctx)?.to_bool()?))
        }
        Expr::Binary(BinaryOp::Or, l, r) => {
            if eval(l, ctx)?.to_bool()? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(eval(r, ctx)?.to_bool()?))
        }
        Expr::Binary(op, l, r) => {
            let a = eval(l, ctx)?;
            let b = eval(r, ctx)?;
            ops::binary(*op, &a, &b)
        }
        Expr::Call { callee, args } => {
            let function = eval(callee, ctx)?;
            let Value::Function(f) = function else {
                return Err(ScriptError::Type(format!(
                    "can not call {}",
                    function.type_name()
                )));
            };
            let mut values = Args::new();
            for arg in args {
                let v = eval(&arg.value, ctx)?;
                values.set(arg.name.clone(), v);
            }
            ctx.call(&f, values)
        }
        Expr::Member(object, name) => {
            let object = eval(object, ctx)?;
            member(ctx, &object, name)
        }
        Expr::Index(object, index) => {
            let object = eval(object, ctx)?;
            let index = eval(index, ctx)?;
            match (&object, &index) {
                (Value::Collection(items), Value::Int(i)) => usize::try_from(*i)
                    .ok()
                    .and_then(|i| items.get(i).cloned())
                    .ok_or_else(|| index_error(*i, items.len())),
                (Value::String(s), Value::Int(i)) => usize::try_from(*i)
                    .ok()
                    .and_then(|i| s.chars().nth(i))
                    .map(|c| Value::from(c.to_string()))
                    .ok_or_else(|| index_error(*i, s.chars().count())),
                _ => member(ctx, &object, &index.to_string()),
            }
        }
        Expr::Closure(body) => Ok(Value::Function(Rc::new(Closure::new(
            body.clone(),
            ctx.scope().clone(),
        )))),
    }
}

fn index_error(index: i64, len: usize) -> ScriptError {
    ScriptError::Usage(format!("index {index} out of range for {len} items"))
}

/// `object.name`, recording the read when `object` is document state.
fn member(ctx: &mut Context, object: &Value, name: &str) -> ScriptResult<Value> {
    match object {
        Value::Object(o) => {
            ctx.mark_dependency_member(o.as_ref(), name);
            o.member(name)
        }
        Value::Collection(items) => match name.parse::<usize>() {
            Ok(i) => items
                .get(i)
                .cloned()
                .ok_or_else(|| index_error(i as i64, items.len())),
            Err(_) => Err(ScriptError::Type(format!(
                "collection has no member '{name}'"
            ))),
        },
        other => Err(ScriptError::Type(format!(
            "{} has no member '{name}'",
            other.type_name()
        ))),
    }
}
