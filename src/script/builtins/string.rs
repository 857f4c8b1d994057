//! String builtins: case conversion, substrings, formatting.

use crate::core::ScriptResult;
use crate::text::printf::{format_double, format_int, format_kind, format_str, FormatKind};
use crate::text::{substring as clamp_substring, to_title as title_case};

use crate::script::{make_rule, Args, Builtin, Context, Value, INPUT};

pub(super) const FUNCTIONS: &[Builtin] = &[
    Builtin::new("to upper", to_upper),
    Builtin::new("to lower", to_lower),
    Builtin::new("to title", to_title),
    Builtin::new("substring", substring),
    Builtin::new("contains", contains),
    Builtin::new("format", format),
    Builtin::new("format rule", format_rule),
];

fn to_upper(_: &mut Context, args: &Args) -> ScriptResult<Value> {
    Ok(Value::from(args.string(INPUT)?.to_uppercase()))
}

fn to_lower(_: &mut Context, args: &Args) -> ScriptResult<Value> {
    Ok(Value::from(args.string(INPUT)?.to_lowercase()))
}

fn to_title(_: &mut Context, args: &Args) -> ScriptResult<Value> {
    Ok(Value::from(title_case(&args.string(INPUT)?)))
}

fn substring(_: &mut Context, args: &Args) -> ScriptResult<Value> {
    let input = args.string(INPUT)?;
    let begin = args.int_or("begin", 0)?;
    let end = args.int_or("end", i64::MAX)?;
    Ok(Value::from(clamp_substring(&input, begin, end)))
}

fn contains(_: &mut Context, args: &Args) -> ScriptResult<Value> {
    let input = args.string(INPUT)?;
    let needle = args.string("match")?;
    Ok(Value::from(input.contains(needle.as_str())))
}

/// `format(input, format: "%02d")`; the conversion characters decide
/// which kind of value `input` is read as.
fn format(_: &mut Context, args: &Args) -> ScriptResult<Value> {
    let spec = args.string("format")?;
    let input = args.get(INPUT)?;
    let text = match format_kind(&spec)? {
        FormatKind::Int => format_int(&spec, input.to_int()?)?,
        FormatKind::Double => format_double(&spec, input.to_double()?)?,
        FormatKind::String => format_str(&spec, &input.to_string())?,
    };
    Ok(Value::from(text))
}

fn format_rule(_: &mut Context, args: &Args) -> ScriptResult<Value> {
    // reject a bad format when the rule is made, not when it is used
    format_kind(&args.string("format")?)?;
    Ok(make_rule("format rule", Builtin::new("format", format), args))
}

#[cfg(test)]
mod tests {
    use super::super::tests::eval_str;

    #[test]
    fn test_case_conversion() {
        assert_eq!(eval_str(r#"to_upper("abc")"#), "ABC");
        assert_eq!(eval_str(r#"to_lower("AbC")"#), "abc");
        assert_eq!(eval_str(r#"to_title("the dark")"#), "The Dark");
    }

    #[test]
    fn test_substring() {
        assert_eq!(eval_str(r#"substring("hello", begin: -3, end: 2)"#), "he");
        assert_eq!(eval_str(r#"substring("hello", begin: 10, end: 20)"#), "");
        assert_eq!(eval_str(r#"substring("hello")"#), "hello");
        assert_eq!(eval_str(r#"substring("hello", begin: 3, end: 2)"#), "");
    }

    #[test]
    fn test_contains() {
        assert_eq!(eval_str(r#"contains("flying", match: "fly")"#), "true");
        assert_eq!(eval_str(r#"contains("flying", match: "swim")"#), "false");
    }

    #[test]
    fn test_format() {
        assert_eq!(eval_str(r#"format(7, format: "%03d")"#), "007");
        assert_eq!(eval_str(r#"format("2.5", format: ".2f")"#), "2.50");
        assert_eq!(eval_str(r#"format("ab", format: "%-4s")"#), "ab  ");
        assert_eq!(eval_str(r#"f := format_rule(format: "%x"); f(255)"#), "ff");
    }
}
