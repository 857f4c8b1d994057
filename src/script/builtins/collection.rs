//! Searching and counting.

use crate::core::{ScriptError, ScriptResult};
use crate::data::{CardObject, SetObject};
use crate::script::{equal, Args, Builtin, Context, Value};
use crate::text::char_position;

pub(super) const FUNCTIONS: &[Builtin] = &[
    Builtin::new("position", position),
    Builtin::new("number of items", number_of_items),
];

/// `position(of: x, in: xs)`: 0-based index of `x`, or -1.
///
/// - if either side is a string, the character offset of `of` in `in`
/// - with `order by`, the position of a card in its set sorted by that key
/// - otherwise the first item of `in` equal to `of`
fn position(ctx: &mut Context, args: &Args) -> ScriptResult<Value> {
    let of = args.get("of")?;
    let haystack = args.get("in")?;
    let order_by = args.opt("order by");

    if of.as_str().is_some() || haystack.as_str().is_some() {
        let found = char_position(&haystack.to_string(), &of.to_string());
        return Ok(Value::from(found.map_or(-1, |p| p as i64)));
    }

    let card_in_set = match (of.as_object::<CardObject>(), haystack.as_object::<SetObject>()) {
        (Some(card), Some(set)) => Some((card, set)),
        _ => None,
    };
    if card_in_set.is_some() {
        if let Value::Object(object) = &haystack {
            ctx.mark_dependency_member(object.as_ref(), "cards");
        }
        if let (Some(f), Some(dep)) = (&order_by, ctx.dependency()) {
            let f = f.as_function()?.clone();
            f.dependencies(ctx, &dep.make_card_independent())?;
        }
    }

    if let Some(order_by) = order_by {
        let Some((card, set)) = card_in_set else {
            return Err(ScriptError::Usage(
                "position: 'order by' is only supported for finding cards in a set".into(),
            ));
        };
        return Ok(Value::from(set.position_of_card(card, &order_by, ctx)?));
    }

    let index = haystack
        .make_iterator()?
        .position(|item| equal(&of, &item))
        .map_or(-1, |p| p as i64);
    Ok(Value::from(index))
}

fn number_of_items(ctx: &mut Context, args: &Args) -> ScriptResult<Value> {
    let items = args.get("in")?;
    if let Value::Object(object) = &items {
        ctx.mark_dependency_member(object.as_ref(), "cards");
    }
    Ok(Value::from(items.item_count()?))
}
