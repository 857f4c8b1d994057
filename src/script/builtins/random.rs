//! Random builtins, drawing from the engine's seeded generator.

use crate::core::{ScriptError, ScriptResult};
use crate::script::{Args, Builtin, Context, Value, INPUT};

pub(super) const FUNCTIONS: &[Builtin] = &[
    Builtin::new("random int", random_int),
    Builtin::new("random shuffle", random_shuffle),
    Builtin::new("random select", random_select),
];

/// `random int(begin: a, end: b)`, both bounds inclusive.
fn random_int(ctx: &mut Context, args: &Args) -> ScriptResult<Value> {
    let begin = args.int_or("begin", 0)?;
    let end = args.int_or("end", 1)?;
    let n = ctx.rng().borrow_mut().gen_range_inclusive(begin, end);
    Ok(Value::from(n))
}

fn random_shuffle(ctx: &mut Context, args: &Args) -> ScriptResult<Value> {
    let mut items: Vec<Value> = args.get(INPUT)?.make_iterator()?.collect();
    ctx.rng().borrow_mut().shuffle(&mut items);
    Ok(Value::from(items))
}

fn random_select(ctx: &mut Context, args: &Args) -> ScriptResult<Value> {
    let items: Vec<Value> = args.get(INPUT)?.make_iterator()?.collect();
    let chosen = ctx.rng().borrow_mut().choose(&items).cloned();
    chosen.ok_or_else(|| ScriptError::Usage("random select: nothing to select from".into()))
}

#[cfg(test)]
mod tests {
    use super::super::tests::eval;
    use crate::core::ScriptError;
    use crate::script::Value;

    #[test]
    fn test_random_int_in_range() {
        for _ in 0..20 {
            let n = eval("random_int(begin: 3, end: 5)").unwrap().to_int().unwrap();
            assert!((3..=5).contains(&n));
        }
        assert_eq!(eval("random_int(begin: 4, end: 4)"), Ok(Value::from(4)));
    }

    #[test]
    fn test_same_seed_same_results() {
        let a = eval("random_shuffle([1, 2, 3, 4, 5, 6, 7, 8])");
        let b = eval("random_shuffle([1, 2, 3, 4, 5, 6, 7, 8])");
        assert_eq!(a, b);
        assert_eq!(a.unwrap().item_count(), Ok(8));
    }

    #[test]
    fn test_random_select() {
        let v = eval("random_select([7])");
        assert_eq!(v, Ok(Value::from(7)));
        assert!(matches!(eval("random_select([])"), Err(ScriptError::Usage(_))));
    }
}
