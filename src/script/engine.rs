//! The script engine: global scope, builtins and shared resources.
//!
//! One [`ScriptEngine`] exists per open document. It owns the global
//! scope (builtins plus whatever the game's init script defines) and the
//! seeded RNG shared by every evaluation.
//!
//! ## Example
//!
//! ```
//! use rust_cardsmith::core::EngineConfig;
//! use rust_cardsmith::script::{ScriptEngine, Value};
//!
//! let engine = ScriptEngine::new(EngineConfig::default());
//! let v = engine.evaluate_source(r#"to_upper("flying")"#).unwrap();
//! assert_eq!(v, Value::from("FLYING"));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::core::{EngineConfig, ScriptResult, ScriptRng, ScriptRngState};

use super::ast::Expr;
use super::builtins;
use super::context::{Context, Scope};
use super::eval::eval;
use super::parser::{parse_with_depth, Script};
use super::value::Value;

/// Globals, configuration and RNG for evaluating scripts.
#[derive(Debug)]
pub struct ScriptEngine {
    globals: Rc<Scope>,
    config: EngineConfig,
    rng: Rc<RefCell<ScriptRng>>,
}

impl ScriptEngine {
    /// An engine with every builtin registered.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let globals = Scope::root();
        builtins::register(&globals);
        let rng = Rc::new(RefCell::new(ScriptRng::new(config.rng_seed)));
        Self {
            globals,
            config,
            rng,
        }
    }

    #[must_use]
    pub fn globals(&self) -> &Rc<Scope> {
        &self.globals
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Where the shared RNG stands, for checkpointing.
    #[must_use]
    pub fn rng_state(&self) -> ScriptRngState {
        self.rng.borrow().state()
    }

    /// Rewind or fast-forward the shared RNG to a checkpoint.
    pub fn restore_rng(&self, state: &ScriptRngState) {
        *self.rng.borrow_mut() = ScriptRng::from_state(state);
    }

    /// A fresh evaluation context over the globals.
    #[must_use]
    pub fn context(&self) -> Context {
        Context::new(&self.globals, self.config.max_call_depth, self.rng.clone())
    }

    /// Evaluate an already parsed expression in `ctx`.
    pub fn evaluate(&self, expr: &Expr, ctx: &mut Context) -> ScriptResult<Value> {
        eval(expr, ctx)
    }

    /// Parse `source`, nesting at most `max_call_depth` levels deep.
    pub fn parse(&self, source: &str) -> ScriptResult<Expr> {
        parse_with_depth(source, self.config.max_call_depth)
    }

    /// Parse and evaluate `source` in a fresh context.
    pub fn evaluate_source(&self, source: &str) -> ScriptResult<Value> {
        let expr = self.parse(source)?;
        let mut ctx = self.context();
        eval(&expr, &mut ctx)
    }

    /// Run an init script with the global scope as its innermost scope,
    /// so its assignments become globals.
    pub fn run_init_script(&self, script: &Script) -> ScriptResult<()> {
        debug!("Running init script ({} bytes)", script.source().len());
        let mut ctx = Context::in_scope(
            self.globals.clone(),
            self.config.max_call_depth,
            self.rng.clone(),
        );
        eval(script.expr(), &mut ctx)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScriptError;

    #[test]
    fn test_init_script_defines_globals() {
        let engine = ScriptEngine::new(EngineConfig::default());
        let init = Script::parse(r#"greet := { "hello " + input }"#).unwrap();
        engine.run_init_script(&init).unwrap();
        assert_eq!(
            engine.evaluate_source(r#"greet("world")"#),
            Ok(Value::from("hello world"))
        );
    }

    #[test]
    fn test_evaluations_do_not_leak_variables() {
        let engine = ScriptEngine::new(EngineConfig::default());
        engine.evaluate_source("x := 1").unwrap();
        assert_eq!(
            engine.evaluate_source("x"),
            Err(ScriptError::Name("x".into()))
        );
    }

    #[test]
    fn test_depth_limit_comes_from_config() {
        let engine = ScriptEngine::new(EngineConfig::new().with_max_call_depth(4));
        let result = engine.evaluate_source("f := { f() }; f()");
        assert_eq!(result, Err(ScriptError::Recursion { limit: 4 }));
    }

    #[test]
    fn test_parse_errors_surface() {
        let engine = ScriptEngine::new(EngineConfig::default());
        assert!(matches!(
            engine.evaluate_source("1 +"),
            Err(ScriptError::Parse { .. })
        ));
    }
}
