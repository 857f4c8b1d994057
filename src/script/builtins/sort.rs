//! Sorting: plain, by key, and by a sort specification.
//!
//! ## Sort specifications
//!
//! A specification string is processed left to right:
//!
//! - `a`: every `a` of the input goes here
//! - `[abc]`: every `a`, `b` and `c`, in the order they occur in the input
//! - `<abc>`: `a`, `b` and `c` in that order, each at most once
//! - `(abc)`: `a`, `b` and `c` treated as a clockwise circle, see [`cycle_sort`]
//!
//! Magic colours sort with `XYZ<0123456789>(WUBRG)`: `"W1G"` becomes
//! `"1GW"`.

use crate::core::{ScriptError, ScriptResult};
use crate::data::SetObject;
use crate::deps::Dependency;
use crate::script::{rule_value, Args, Builtin, Context, ScriptFunction, Value, INPUT};

pub(super) const FUNCTIONS: &[Builtin] = &[
    Builtin::new("sort", sort),
    Builtin::new("sort rule", sort_rule),
];

/// Order the spec characters present in `input` around a circle.
///
/// Each character is repeated as often as it occurs in the input. The
/// starting point is the rotation that takes the shortest clockwise path,
/// has its holes (absent characters) earliest, and otherwise comes first
/// in the spec.
#[must_use]
pub fn cycle_sort(spec: &str, input: &str) -> String {
    let spec: Vec<char> = spec.chars().collect();
    let size = spec.len();
    let counts: Vec<usize> = spec
        .iter()
        .map(|s| input.chars().filter(|c| c == s).count())
        .collect();

    let mut best_start = 0;
    let mut best_score = u64::MAX;
    for start in 0..size {
        // presence bits rotated by `start`, read as a binary number
        // without trailing zeros
        let mut score: u64 = 0;
        let mut mul: u64 = 1;
        for i in 0..size {
            mul = mul.wrapping_mul(2);
            if counts[(start + i) % size] > 0 {
                score = score.wrapping_mul(mul).wrapping_add(1);
                mul = 1;
            }
        }
        if score < best_score {
            best_score = score;
            best_start = start;
        }
    }

    let mut out = String::new();
    for i in 0..size {
        let pos = (best_start + i) % size;
        out.extend(std::iter::repeat(spec[pos]).take(counts[pos]));
    }
    out
}

/// Check that every bracket in `spec` is closed.
fn validate_spec(spec: &str) -> ScriptResult<()> {
    let mut chars = spec.chars();
    while let Some(c) = chars.next() {
        let close = match c {
            '<' => '>',
            '[' => ']',
            '(' => ')',
            _ => continue,
        };
        if !chars.any(|d| d == close) {
            return Err(ScriptError::parse(format!(
                "expected '{close}' in sort specification"
            )));
        }
    }
    Ok(())
}

/// Reorder `input` according to the sort specification `spec`.
pub fn spec_sort(spec: &str, input: &str) -> ScriptResult<String> {
    let spec: Vec<char> = spec.chars().collect();
    let mut out = String::new();
    let mut pos = 0;
    while pos < spec.len() {
        let c = spec[pos];
        let close = match c {
            '<' => Some('>'),
            '[' => Some(']'),
            '(' => Some(')'),
            _ => None,
        };
        let Some(close) = close else {
            out.extend(input.chars().filter(|&d| d == c));
            pos += 1;
            continue;
        };
        let end = spec[pos + 1..]
            .iter()
            .position(|&d| d == close)
            .map(|i| pos + 1 + i)
            .ok_or_else(|| ScriptError::parse(format!("expected '{close}' in sort specification")))?;
        let group = &spec[pos + 1..end];
        match c {
            '<' => out.extend(group.iter().filter(|g| input.contains(**g))),
            '[' => out.extend(input.chars().filter(|d| group.contains(d))),
            _ => out.push_str(&cycle_sort(&group.iter().collect::<String>(), input)),
        }
        pos = end + 1;
    }
    Ok(out)
}

/// Characters of `s` in code point order.
fn sort_chars(s: &str) -> String {
    let mut chars: Vec<char> = s.chars().collect();
    chars.sort_unstable();
    chars.into_iter().collect()
}

/// Sort without a key: strings by character, collections by the string
/// rendering of their items.
fn sort_plain(input: &Value) -> ScriptResult<Value> {
    match input {
        Value::Collection(_) | Value::Object(_) => {
            let mut items: Vec<(String, Value)> = input
                .make_iterator()?
                .map(|v| (v.to_string(), v))
                .collect();
            items.sort_by(|a, b| a.0.cmp(&b.0));
            Ok(Value::collection(items.into_iter().map(|(_, v)| v)))
        }
        other => Ok(Value::from(sort_chars(&other.to_string()))),
    }
}

/// Stable sort of the items of `input` by the string rendering of
/// `order_by`'s result. When sorting a set, each card is bound as `card`.
fn sort_by_key(input: &Value, order_by: &Value, ctx: &mut Context) -> ScriptResult<Value> {
    if let Value::String(s) = input {
        return Ok(Value::from(sort_chars(s)));
    }
    let name = if let Value::Object(object) = input {
        ctx.mark_dependency_member(object.as_ref(), "cards");
        if input.as_object::<SetObject>().is_some() {
            "card"
        } else {
            INPUT
        }
    } else {
        INPUT
    };
    let mut keyed = Vec::new();
    for item in input.make_iterator()? {
        let key = ctx.call_value(order_by, Args::new().with(name, item.clone()))?;
        keyed.push((key.to_string(), item));
    }
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(Value::collection(keyed.into_iter().map(|(_, v)| v)))
}

/// A `sort rule`, prepared at construction.
pub enum SortRule {
    Plain,
    Order(String),
    OrderBy(Value),
}

impl SortRule {
    pub fn from_args(args: &Args) -> ScriptResult<Self> {
        if let Some(order) = args.opt("order") {
            let order = order.to_string();
            validate_spec(&order)?;
            Ok(SortRule::Order(order))
        } else if let Some(order_by) = args.opt("order by") {
            order_by.as_function()?;
            Ok(SortRule::OrderBy(order_by))
        } else {
            Ok(SortRule::Plain)
        }
    }

    fn apply(&self, input: &Value, ctx: &mut Context) -> ScriptResult<Value> {
        match self {
            SortRule::Plain => sort_plain(input),
            SortRule::Order(spec) => Ok(Value::from(spec_sort(spec, &input.to_string())?)),
            SortRule::OrderBy(order_by) => sort_by_key(input, order_by, ctx),
        }
    }
}

impl ScriptFunction for SortRule {
    fn name(&self) -> &str {
        "sort rule"
    }

    fn call(&self, ctx: &mut Context, args: Args) -> ScriptResult<Value> {
        let input = args.get(INPUT)?;
        self.apply(&input, ctx)
    }

    fn dependencies(&self, ctx: &mut Context, dep: &Dependency) -> ScriptResult<()> {
        match self {
            SortRule::OrderBy(Value::Function(f)) => f.dependencies(ctx, dep),
            _ => Ok(()),
        }
    }
}

fn sort(ctx: &mut Context, args: &Args) -> ScriptResult<Value> {
    let input = args.get(INPUT)?;
    SortRule::from_args(args)?.apply(&input, ctx)
}

fn sort_rule(_: &mut Context, args: &Args) -> ScriptResult<Value> {
    Ok(rule_value(SortRule::from_args(args)?))
}

#[cfg(test)]
mod tests {
    use super::super::tests::{eval, eval_str};
    use super::*;

    const MAGIC: &str = "XYZ<0123456789>(WUBRG)";

    #[test]
    fn test_spec_sort_examples() {
        assert_eq!(spec_sort(MAGIC, "W1G").unwrap(), "1GW");
        assert_eq!(spec_sort(MAGIC, "GRBUWWUG").unwrap(), "WWUUBRGG");
        assert_eq!(spec_sort(MAGIC, "WUR").unwrap(), "RWU");
    }

    #[test]
    fn test_cycle_sort() {
        assert_eq!(cycle_sort("WUBRG", "GW"), "GW");
        assert_eq!(cycle_sort("WUBRG", "UB"), "UB");
        assert_eq!(cycle_sort("WUBRG", ""), "");
        assert_eq!(cycle_sort("WUBRG", "BGW"), "BGW");
    }

    #[test]
    fn test_spec_sort_brackets() {
        // single copies in spec order
        assert_eq!(spec_sort("<ba>", "aabb").unwrap(), "ba");
        // any order, every occurrence
        assert_eq!(spec_sort("[ba]x", "axbxa").unwrap(), "abaxx");
        // characters not in the spec are dropped
        assert_eq!(spec_sort("a", "abc").unwrap(), "a");
    }

    #[test]
    fn test_malformed_specs() {
        for spec in ["<ab", "[ab", "(ab", "x(y"] {
            assert!(matches!(spec_sort(spec, "ab"), Err(ScriptError::Parse { .. })));
            assert!(validate_spec(spec).is_err());
        }
        assert!(matches!(
            eval(r#"sort_rule(order: "<abc")"#),
            Err(ScriptError::Parse { .. })
        ));
    }

    #[test]
    fn test_plain_sort() {
        assert_eq!(eval_str(r#"sort("dcba")"#), "abcd");
        assert_eq!(eval_str(r#"sort(["b", "c", "a"])"#), "[a, b, c]");
    }

    #[test]
    fn test_sort_by_key_is_stable() {
        assert_eq!(
            eval_str(r#"sort(["bb", "a", "cc", "d"], order_by: { number_of_items(in: input) })"#),
            "[a, d, bb, cc]"
        );
    }

    #[test]
    fn test_sort_rule_with_order() {
        assert_eq!(
            eval_str(r#"r := sort_rule(order: "XYZ<0123456789>(WUBRG)"); r("GRBUWWUG")"#),
            "WWUUBRGG"
        );
    }
}
