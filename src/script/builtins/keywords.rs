//! `expand keywords` and its rule form.

use crate::core::{ScriptError, ScriptResult};
use crate::data::{expand_keywords as expand, SetObject};
use crate::deps::Source;
use crate::script::{make_rule, Args, Builtin, Context, Value, INPUT};

pub(super) const FUNCTIONS: &[Builtin] = &[
    Builtin::new("expand keywords", expand_keywords),
    Builtin::new("expand keywords rule", expand_keywords_rule),
];

/// The set to take keywords from: the `set` argument, else the `set`
/// variable.
fn keyword_set(ctx: &Context, args: &Args) -> ScriptResult<Value> {
    let set = args
        .opt("set")
        .or_else(|| ctx.get_variable_opt("set"))
        .ok_or_else(|| ScriptError::Name("set".into()))?;
    if set.as_object::<SetObject>().is_none() {
        return Err(ScriptError::expected("set", &set.type_name()));
    }
    Ok(set)
}

fn expand_keywords(ctx: &mut Context, args: &Args) -> ScriptResult<Value> {
    let input = args.string(INPUT)?;
    let set = keyword_set(ctx, args)?;
    let Some(set) = set.as_object::<SetObject>() else {
        return Err(ScriptError::expected("set", &set.type_name()));
    };
    ctx.mark_source(Source::Keywords);
    let entries = set.keyword_entries();
    let default_expand = args.opt("default expand");
    let combine = args.opt("combine");
    let text = expand(
        &entries,
        &input,
        default_expand.as_ref(),
        combine.as_ref(),
        ctx,
    )?;
    Ok(Value::from(text))
}

fn expand_keywords_rule(_: &mut Context, args: &Args) -> ScriptResult<Value> {
    for name in ["default expand", "combine"] {
        if let Some(f) = args.opt(name) {
            f.as_function()?;
        }
    }
    Ok(make_rule(
        "expand keywords rule",
        Builtin::new("expand keywords", expand_keywords),
        args,
    ))
}
