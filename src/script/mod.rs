//! The expression language.
//!
//! Card fields are computed by small scripts:
//!
//! ```text
//! card.name + " " + sort(card.cost, order: "XYZ<0123456789>(WUBRG)")
//! ```
//!
//! ## Layers
//!
//! - `lexer`, `parser`: source text to [`ast::Expr`]
//! - `eval`, `ops`: tree-walking evaluation over [`Value`]s
//! - `context`: scopes, depth guard, dependency recording
//! - `function`, `object`: callable values and host objects
//! - `builtins`: the standard library
//! - `engine`: globals and the shared RNG for one document

pub mod ast;
pub mod builtins;
pub mod context;
pub mod engine;
pub mod eval;
pub mod function;
pub mod lexer;
pub mod object;
pub mod ops;
pub mod parser;
pub mod value;

pub use context::{Context, Scope};
pub use engine::ScriptEngine;
pub use eval::eval;
pub use function::{
    make_rule, rule_value, Args, BoundRule, Builtin, BuiltinFn, Closure, Composition,
    ScriptFunction, INPUT,
};
pub use object::ScriptObject;
pub use parser::{parse, parse_template, parse_with_depth, Script};
pub use value::{equal, Value, ValueIter, ValueKind};
