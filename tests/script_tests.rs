//! End-to-end tests of the expression language through the public engine.

use rust_cardsmith::script::builtins::cycle_sort;
use rust_cardsmith::script::ScriptEngine;
use rust_cardsmith::{EngineConfig, ScriptError, Value};

fn engine() -> ScriptEngine {
    ScriptEngine::new(EngineConfig::default())
}

fn run(src: &str) -> String {
    match engine().evaluate_source(src) {
        Ok(v) => v.to_string(),
        Err(e) => panic!("{src}: {e}"),
    }
}

// =============================================================================
// Strings
// =============================================================================

#[test]
fn test_substring_bounds() {
    assert_eq!(run(r#"substring("hello", begin: -3, end: 2)"#), "he");
    assert_eq!(run(r#"substring("hello", begin: 10, end: 20)"#), "");
    assert_eq!(run(r#"substring("hello")"#), "hello");
}

#[test]
fn test_position_in_string() {
    assert_eq!(run(r#"position(of: "lo", in: "hello")"#), "3");
    assert_eq!(run(r#"position(of: "z", in: "hello")"#), "-1");
}

#[test]
fn test_template_and_format() {
    assert_eq!(run(r#"power := 3; "{power}/{power + 1}""#), "3/4");
    assert_eq!(run(r#"format(5, format: "%02d")"#), "05");
}

// =============================================================================
// Sorting
// =============================================================================

#[test]
fn test_mana_cost_sorting() {
    let order = "XYZ<0123456789>(WUBRG)";
    assert_eq!(run(&format!(r#"sort("W1G", order: "{order}")"#)), "1GW");
    assert_eq!(run(&format!(r#"sort("GRBUWWUG", order: "{order}")"#)), "WWUUBRGG");
    assert_eq!(run(&format!(r#"sort("WUR", order: "{order}")"#)), "RWU");
}

#[test]
fn test_cycle_sort_rotations() {
    assert_eq!(cycle_sort("WUBRG", "GW"), "GW");
    assert_eq!(cycle_sort("WUBRG", "WU"), "WU");
    assert_eq!(cycle_sort("WUBRG", "RW"), "RW");
}

#[test]
fn test_plain_and_keyed_sort() {
    assert_eq!(run(r#"sort("dcba")"#), "abcd");
    // equal keys keep their order
    assert_eq!(
        run(r#"sort(["cc", "a", "bb", "d"], order_by: { number_of_items(in: input) })"#),
        "[a, d, cc, bb]"
    );
}

#[test]
fn test_malformed_sort_spec_fails_when_rule_is_made() {
    assert!(matches!(
        engine().evaluate_source(r#"sort_rule(order: "(WUBRG")"#),
        Err(ScriptError::Parse { .. })
    ));
}

// =============================================================================
// Rules
// =============================================================================

#[test]
fn test_replace_rule_in_context() {
    let script = r#"r := replace_rule(match: "x", in_context: "<match>!", replace: "y"); r("x x!")"#;
    assert_eq!(run(script), "x y!");
    // no context match: unchanged
    let script = r#"r := replace_rule(match: "x", in_context: "^z", replace: "y"); r("x x")"#;
    assert_eq!(run(script), "x x");
}

#[test]
fn test_filter_rule() {
    assert_eq!(run(r#"filter("no digits", match: "[0-9]")"#), "");
    assert_eq!(run(r#"f := filter_rule(match: "ab"); f("abab-ab")"#), "ababab");
}

#[test]
fn test_rules_compose() {
    let script = r#"upper := replace_rule(match: "[a-z]+", replace: { to_upper(input) })
        strip := tag_remove_rule(tag: "<b>")
        (strip + upper)("<b>bold</b> text")"#;
    assert_eq!(run(script), "BOLD TEXT");
}

#[test]
fn test_bad_regex_is_a_parse_error() {
    assert!(matches!(
        engine().evaluate_source(r#"filter_rule(match: "(")"#),
        Err(ScriptError::Parse { .. })
    ));
}

// =============================================================================
// Errors and limits
// =============================================================================

#[test]
fn test_error_kinds() {
    let e = engine();
    assert!(matches!(e.evaluate_source("nope"), Err(ScriptError::Name(_))));
    assert!(matches!(e.evaluate_source(r#"1 - "a""#), Err(ScriptError::Type(_))));
    assert!(matches!(e.evaluate_source("1 +"), Err(ScriptError::Parse { .. })));
    assert!(matches!(
        e.evaluate_source(r#"format(1, format: "%q")"#),
        Err(ScriptError::Format(_))
    ));
    assert!(matches!(
        e.evaluate_source(r#"position(of: "a", in: "abc", order_by: { input })"#),
        Err(ScriptError::Usage(_))
    ));
}

#[test]
fn test_call_depth_is_configurable() {
    let engine = ScriptEngine::new(EngineConfig::new().with_max_call_depth(8));
    assert_eq!(
        engine.evaluate_source("f := { f() }; f()"),
        Err(ScriptError::Recursion { limit: 8 })
    );
    assert_eq!(
        engine.evaluate_source("f := { if input > 0 then f(input - 1) else \"done\" }; f(5)"),
        Ok(Value::from("done"))
    );
}

#[test]
fn test_random_is_deterministic_per_seed() {
    let roll = |seed: u64| {
        let engine = ScriptEngine::new(EngineConfig::new().with_seed(seed));
        (0..10)
            .map(|_| engine.evaluate_source("random_int(begin: 1, end: 6)").unwrap())
            .collect::<Vec<_>>()
    };
    assert_eq!(roll(11), roll(11));
    for v in roll(11) {
        let n = v.to_int().unwrap();
        assert!((1..=6).contains(&n));
    }
}
