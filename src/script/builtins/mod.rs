//! The builtin function library.
//!
//! Builtins are registered in the global scope under their script names
//! (`"to upper"`, `"sort rule"`, ...). Scripts write the underscore form,
//! `to_upper`, which the parser maps to the same name.
//!
//! ## Groups
//!
//! - `string`: case conversion, substrings, printf-style formatting
//! - `tags`: tag-aware rewriting of card text
//! - `collection`: `position`, `number of items`
//! - `rules`: regex `replace` and `filter`
//! - `sort`: plain, keyed and spec-driven sorting
//! - `keywords`: keyword expansion
//! - `convert`, `random`: conversions and seeded randomness

mod collection;
mod convert;
mod keywords;
mod random;
mod rules;
mod sort;
mod string;
mod tags;

pub use rules::{FilterRule, ReplaceRule};
pub use sort::{cycle_sort, spec_sort, SortRule};

use std::rc::Rc;

use super::context::Scope;
use super::function::Builtin;
use super::value::Value;

const GROUPS: &[&[Builtin]] = &[
    string::FUNCTIONS,
    tags::FUNCTIONS,
    collection::FUNCTIONS,
    rules::FUNCTIONS,
    sort::FUNCTIONS,
    keywords::FUNCTIONS,
    convert::FUNCTIONS,
    random::FUNCTIONS,
];

/// Bind every builtin in `scope`.
pub fn register(scope: &Scope) {
    for builtin in GROUPS.iter().flat_map(|group| group.iter()) {
        scope.set(builtin.name, Value::Function(Rc::new(*builtin)));
    }
}

/// Names of all builtins, in registration order.
pub fn names() -> impl Iterator<Item = &'static str> {
    GROUPS.iter().flat_map(|group| group.iter().map(|b| b.name))
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::core::{EngineConfig, ScriptResult};
    use crate::script::{ScriptEngine, Value};

    /// Evaluate `src` in a fresh engine with default configuration.
    pub(crate) fn eval(src: &str) -> ScriptResult<Value> {
        ScriptEngine::new(EngineConfig::default()).evaluate_source(src)
    }

    /// Evaluate `src` and render the result, panicking on error.
    pub(crate) fn eval_str(src: &str) -> String {
        match eval(src) {
            Ok(v) => v.to_string(),
            Err(e) => panic!("{src}: {e}"),
        }
    }

    #[test]
    fn test_every_builtin_is_registered() {
        let engine = ScriptEngine::new(EngineConfig::default());
        for name in super::names() {
            assert!(engine.globals().lookup(name).is_some(), "{name} missing");
        }
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = super::names().collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
