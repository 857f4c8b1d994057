//! Conversions between value kinds.

use crate::core::ScriptResult;
use crate::script::{Args, Builtin, Context, Value, INPUT};

pub(super) const FUNCTIONS: &[Builtin] = &[
    Builtin::new("to string", to_string),
    Builtin::new("to int", to_int),
    Builtin::new("to number", to_number),
    Builtin::new("to color", to_color),
    Builtin::new("length", length),
];

fn to_string(_: &mut Context, args: &Args) -> ScriptResult<Value> {
    Ok(Value::from(args.string(INPUT)?))
}

fn to_int(_: &mut Context, args: &Args) -> ScriptResult<Value> {
    Ok(Value::from(args.get(INPUT)?.to_int()?))
}

/// Integers stay integers; anything else that parses becomes a double.
fn to_number(_: &mut Context, args: &Args) -> ScriptResult<Value> {
    let input = args.get(INPUT)?;
    match &input {
        Value::Int(_) | Value::Double(_) => Ok(input),
        Value::Bool(b) => Ok(Value::from(i64::from(*b))),
        Value::Default => Ok(Value::from(0)),
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(i) => Ok(Value::from(i)),
            Err(_) => Ok(Value::from(input.to_double()?)),
        },
        _ => Ok(Value::from(input.to_double()?)),
    }
}

fn to_color(_: &mut Context, args: &Args) -> ScriptResult<Value> {
    Ok(Value::from(args.get(INPUT)?.to_color()?))
}

fn length(_: &mut Context, args: &Args) -> ScriptResult<Value> {
    Ok(Value::from(args.get(INPUT)?.item_count()?))
}

#[cfg(test)]
mod tests {
    use super::super::tests::{eval, eval_str};
    use crate::core::ScriptError;
    use crate::data::Color;
    use crate::script::Value;

    #[test]
    fn test_to_string() {
        assert_eq!(eval("to_string(12)"), Ok(Value::from("12")));
        assert_eq!(eval_str("to_string([1, 2])"), "[1, 2]");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(eval(r#"to_int("42")"#), Ok(Value::from(42)));
        assert_eq!(eval("to_int(2.9)"), Ok(Value::from(2)));
        assert_eq!(eval(r#"to_number("3")"#), Ok(Value::Int(3)));
        assert_eq!(eval(r#"to_number("2.5")"#), Ok(Value::Double(2.5)));
        assert!(matches!(eval(r#"to_int("x")"#), Err(ScriptError::Type(_))));
    }

    #[test]
    fn test_to_color() {
        assert_eq!(
            eval(r#"to_color("rgb(1, 2, 3)")"#),
            Ok(Value::from(Color::rgb(1, 2, 3)))
        );
        assert!(eval(r#"to_color("blue")"#).is_err());
    }

    #[test]
    fn test_length() {
        assert_eq!(eval(r#"length("abc")"#), Ok(Value::from(3)));
        assert_eq!(eval("length([1, 2])"), Ok(Value::from(2)));
    }
}
