//! Builtins working on tagged text.

use crate::core::ScriptResult;
use crate::script::{make_rule, Args, Builtin, Context, Value, INPUT};
use crate::text::{close_tag, match_close_tag, remove_tag as strip_tag, skip_tag};

pub(super) const FUNCTIONS: &[Builtin] = &[
    Builtin::new("tag contents", tag_contents),
    Builtin::new("remove tag", remove_tag),
    Builtin::new("tag contents rule", tag_contents_rule),
    Builtin::new("tag remove rule", tag_remove_rule),
];

/// Replace the contents of every `tag` in `input` by the result of
/// `contents`, called with the old contents as `input` and `contents`.
///
/// Scanning stops at the first tag without a close tag; the rest of the
/// input is kept as is.
fn replace_tag_contents(
    input: &str,
    tag: &str,
    contents: &Value,
    ctx: &mut Context,
) -> ScriptResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find(tag) {
        let Some(end) = match_close_tag(rest, pos) else {
            break;
        };
        let old = &rest[pos + tag.len()..end];
        let new = ctx.call_value(contents, Args::input(old).with("contents", old))?;
        out.push_str(&rest[..pos]);
        out.push_str(tag);
        out.push_str(&new.to_string());
        out.push_str(&close_tag(tag));
        rest = &rest[skip_tag(rest, end)..];
    }
    out.push_str(rest);
    Ok(out)
}

fn tag_contents(ctx: &mut Context, args: &Args) -> ScriptResult<Value> {
    let input = args.string(INPUT)?;
    let tag = args.string("tag")?;
    let contents = args.get("contents")?;
    Ok(Value::from(replace_tag_contents(&input, &tag, &contents, ctx)?))
}

fn remove_tag(_: &mut Context, args: &Args) -> ScriptResult<Value> {
    let input = args.string(INPUT)?;
    let tag = args.string("tag")?;
    Ok(Value::from(strip_tag(&input, &tag)))
}

fn tag_contents_rule(_: &mut Context, args: &Args) -> ScriptResult<Value> {
    args.string("tag")?;
    args.get("contents")?.as_function()?;
    Ok(make_rule(
        "tag contents rule",
        Builtin::new("tag contents", tag_contents),
        args,
    ))
}

fn tag_remove_rule(_: &mut Context, args: &Args) -> ScriptResult<Value> {
    args.string("tag")?;
    Ok(make_rule(
        "tag remove rule",
        Builtin::new("remove tag", remove_tag),
        args,
    ))
}

#[cfg(test)]
mod tests {
    use super::super::tests::eval_str;

    #[test]
    fn test_tag_contents() {
        assert_eq!(
            eval_str(r#"tag_contents("a<b>x</b>c<b>y</b>", tag: "<b>", contents: { to_upper(contents) })"#),
            "a<b>X</b>c<b>Y</b>"
        );
    }

    #[test]
    fn test_tag_contents_nested() {
        assert_eq!(
            eval_str(r#"tag_contents("<i>a<i>b</i></i>", tag: "<i>", contents: { "[" + input + "]" })"#),
            "<i>[a<i>b</i>]</i>"
        );
    }

    #[test]
    fn test_unterminated_tag_is_left_alone() {
        assert_eq!(
            eval_str(r#"tag_contents("<b>x</b> <b>open", tag: "<b>", contents: { "y" })"#),
            "<b>y</b> <b>open"
        );
    }

    #[test]
    fn test_remove_tag() {
        assert_eq!(eval_str(r#"remove_tag("<kw-a>Flying</kw-a>!", tag: "<kw-")"#), "Flying!");
        assert_eq!(
            eval_str(r#"r := tag_remove_rule(tag: "<b>"); r("<b>bold</b>")"#),
            "bold"
        );
    }

    #[test]
    fn test_tag_contents_rule() {
        assert_eq!(
            eval_str(r#"r := tag_contents_rule(tag: "<sym>", contents: { "T" }); r("<sym>X</sym>")"#),
            "<sym>T</sym>"
        );
    }
}
