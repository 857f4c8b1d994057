//! Callable script values.
//!
//! Every function value implements [`ScriptFunction`]. Builtins are plain
//! `fn` pointers wrapped in [`Builtin`]; user closures capture the scope
//! they were created in; rules are builtins with some arguments bound
//! ahead of time.
//!
//! ## Arguments
//!
//! Calls pass an [`Args`] list of named values. An unnamed argument is
//! bound to `input`, so `to_upper("x")` and `to_upper(input: "x")` are the
//! same call.

use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::core::{ScriptError, ScriptResult};
use crate::deps::{Dependency, Source};

use super::ast::Expr;
use super::context::{Context, Scope};
use super::value::Value;

/// Name an unnamed argument binds to.
pub const INPUT: &str = "input";

/// Named arguments of one call.
#[derive(Clone, Debug, Default)]
pub struct Args {
    items: SmallVec<[(String, Value); 4]>,
}

impl Args {
    /// No arguments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Just an `input` argument.
    pub fn input(value: impl Into<Value>) -> Self {
        Self::new().with(INPUT, value)
    }

    /// Add or replace an argument (builder style).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value.into());
        self
    }

    /// Add or replace an argument.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.items.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.items.push((name, value)),
        }
    }

    /// Remove an argument, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let pos = self.items.iter().position(|(n, _)| n == name)?;
        Some(self.items.remove(pos).1)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|(n, _)| n == name)
    }

    /// A required argument.
    pub fn get(&self, name: &str) -> ScriptResult<Value> {
        self.items
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| ScriptError::Name(name.to_string()))
    }

    /// An optional argument. Absent and `Default` arguments are `None`.
    #[must_use]
    pub fn opt(&self, name: &str) -> Option<Value> {
        self.items
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .filter(|v| !v.is_default())
    }

    /// A required argument rendered as a string.
    pub fn string(&self, name: &str) -> ScriptResult<String> {
        Ok(self.get(name)?.to_string())
    }

    /// An optional integer argument.
    pub fn int_or(&self, name: &str, default: i64) -> ScriptResult<i64> {
        match self.opt(name) {
            Some(v) => v.to_int(),
            None => Ok(default),
        }
    }

    /// An optional boolean argument.
    pub fn bool_or(&self, name: &str, default: bool) -> ScriptResult<bool> {
        match self.opt(name) {
            Some(v) => v.to_bool(),
            None => Ok(default),
        }
    }

    /// These arguments with `bound` layered on top.
    #[must_use]
    pub fn overlay(&self, bound: &Args) -> Args {
        let mut out = self.clone();
        for (name, value) in bound.iter() {
            out.set(name, value.clone());
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.items.iter().map(|(n, v)| (n.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A function value.
pub trait ScriptFunction {
    /// Name shown in messages, e.g. `"to upper"` or `"<closure>"`.
    fn name(&self) -> &str;

    /// Invoke the function.
    ///
    /// Callers go through [`Context::call`], which enforces the depth
    /// limit.
    fn call(&self, ctx: &mut Context, args: Args) -> ScriptResult<Value>;

    /// Record what calling this function would read on behalf of `dep`.
    ///
    /// Used when the function is evaluated outside the recording of its
    /// caller, e.g. an `order by` key function run once per card.
    fn dependencies(&self, ctx: &mut Context, dep: &Dependency) -> ScriptResult<()> {
        let _ = (ctx, dep);
        Ok(())
    }
}

/// Signature of a builtin implementation.
pub type BuiltinFn = fn(&mut Context, &Args) -> ScriptResult<Value>;

/// A function implemented in Rust.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl Builtin {
    #[must_use]
    pub const fn new(name: &'static str, func: BuiltinFn) -> Self {
        Self { name, func }
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

impl ScriptFunction for Builtin {
    fn name(&self) -> &str {
        self.name
    }

    fn call(&self, ctx: &mut Context, args: Args) -> ScriptResult<Value> {
        (self.func)(ctx, &args)
    }
}

/// A `{ ... }` block, closing over the scope it was created in.
///
/// Arguments are bound in a fresh child of the captured scope, so the
/// body sees its own parameters first, then the defining scope.
pub struct Closure {
    body: Rc<Expr>,
    scope: Rc<Scope>,
}

impl Closure {
    #[must_use]
    pub fn new(body: Rc<Expr>, scope: Rc<Scope>) -> Self {
        Self { body, scope }
    }

    #[must_use]
    pub fn body(&self) -> &Expr {
        &self.body
    }
}

impl ScriptFunction for Closure {
    fn name(&self) -> &str {
        "<closure>"
    }

    fn call(&self, ctx: &mut Context, args: Args) -> ScriptResult<Value> {
        let scope = Scope::child(&self.scope);
        for (name, value) in args.iter() {
            scope.set(name, value.clone());
        }
        ctx.with_scope(scope, |ctx| super::eval::eval(&self.body, ctx))
    }

    /// Walks the body for `object.member` and `object["member"]` reads.
    ///
    /// Variables are resolved against the captured scope. A read of
    /// `card.X` where `card` is not yet bound still counts as the `X`
    /// field of any card when `dep` is card-independent. An index that is
    /// not a string literal counts as a read of every member.
    fn dependencies(&self, ctx: &mut Context, dep: &Dependency) -> ScriptResult<()> {
        let mut reads: Vec<(String, Option<String>)> = Vec::new();
        self.body.walk(&mut |e| match e {
            Expr::Member(object, member) => {
                if let Expr::Var(var) = object.as_ref() {
                    reads.push((var.clone(), Some(member.clone())));
                }
            }
            Expr::Index(object, index) => {
                if let Expr::Var(var) = object.as_ref() {
                    let member = match index.as_ref() {
                        Expr::Literal(Value::String(m)) => Some(m.to_string()),
                        _ => None,
                    };
                    reads.push((var.clone(), member));
                }
            }
            _ => {}
        });
        for (var, member) in reads {
            match self.scope.lookup(&var) {
                Some(Value::Object(object)) => {
                    let members = match member {
                        Some(member) => vec![member],
                        None => object.member_names(),
                    };
                    for member in &members {
                        ctx.mark_dependency_member_for(object.as_ref(), member, dep);
                    }
                }
                None if var == "card" && dep.card_independent => {
                    if let Some(field) = member {
                        ctx.mark_source(Source::CardField { card: None, field });
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// `f + g`: feed the result of `f` to `g` as its input.
pub struct Composition {
    first: Rc<dyn ScriptFunction>,
    second: Rc<dyn ScriptFunction>,
}

impl Composition {
    #[must_use]
    pub fn new(first: Rc<dyn ScriptFunction>, second: Rc<dyn ScriptFunction>) -> Self {
        Self { first, second }
    }
}

impl ScriptFunction for Composition {
    fn name(&self) -> &str {
        "<composition>"
    }

    fn call(&self, ctx: &mut Context, args: Args) -> ScriptResult<Value> {
        let intermediate = ctx.call(&self.first, args.clone())?;
        let mut args = args;
        args.set(INPUT, intermediate);
        ctx.call(&self.second, args)
    }

    fn dependencies(&self, ctx: &mut Context, dep: &Dependency) -> ScriptResult<()> {
        self.first.dependencies(ctx, dep)?;
        self.second.dependencies(ctx, dep)
    }
}

/// A builtin with arguments bound ahead of time.
///
/// Calling it layers the bound arguments over the call's own, so only
/// `input` needs to be supplied.
pub struct BoundRule {
    name: String,
    target: Builtin,
    bound: Args,
}

impl BoundRule {
    #[must_use]
    pub fn new(name: impl Into<String>, target: Builtin, bound: Args) -> Self {
        Self {
            name: name.into(),
            target,
            bound,
        }
    }

    #[must_use]
    pub fn bound(&self) -> &Args {
        &self.bound
    }
}

impl ScriptFunction for BoundRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, ctx: &mut Context, args: Args) -> ScriptResult<Value> {
        (self.target.func)(ctx, &args.overlay(&self.bound))
    }

    fn dependencies(&self, ctx: &mut Context, dep: &Dependency) -> ScriptResult<()> {
        for (_, value) in self.bound.iter() {
            if let Value::Function(f) = value {
                f.dependencies(ctx, dep)?;
            }
        }
        Ok(())
    }
}

/// Wrap an already prepared function value as a rule result.
///
/// Used by rule builtins that precompile their arguments (regexes, sort
/// specs) at construction time.
#[must_use]
pub fn rule_value(rule: impl ScriptFunction + 'static) -> Value {
    Value::Function(Rc::new(rule))
}

/// The generic `X rule(...)`: bind every argument except `input`.
pub fn make_rule(name: &str, target: Builtin, args: &Args) -> Value {
    let mut bound = args.clone();
    bound.remove(INPUT);
    rule_value(BoundRule::new(name, target, bound))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::core::ScriptRng;

    fn context() -> Context {
        Context::new(&Scope::root(), 16, Rc::new(RefCell::new(ScriptRng::new(0))))
    }

    fn shout(_: &mut Context, args: &Args) -> ScriptResult<Value> {
        let suffix = args.opt("suffix").map(|v| v.to_string()).unwrap_or_default();
        Ok(Value::from(format!("{}{suffix}", args.string(INPUT)?.to_uppercase())))
    }

    #[test]
    fn test_args_replace_and_overlay() {
        let args = Args::input("a").with("x", 1).with("x", 2);
        assert_eq!(args.len(), 2);
        assert_eq!(args.get("x"), Ok(Value::from(2)));

        let bound = Args::new().with("x", 3);
        let merged = args.overlay(&bound);
        assert_eq!(merged.get("x"), Ok(Value::from(3)));
        assert_eq!(merged.get(INPUT), Ok(Value::from("a")));
    }

    #[test]
    fn test_opt_skips_default() {
        let args = Args::new().with("x", Value::Default);
        assert!(args.contains("x"));
        assert!(args.opt("x").is_none());
        assert_eq!(args.int_or("x", 7), Ok(7));
    }

    #[test]
    fn test_builtin_call() {
        let mut ctx = context();
        let f: Rc<dyn ScriptFunction> = Rc::new(Builtin::new("shout", shout));
        assert_eq!(ctx.call(&f, Args::input("hi")), Ok(Value::from("HI")));
    }

    #[test]
    fn test_rule_binds_arguments() {
        let mut ctx = context();
        let rule = make_rule(
            "shout rule",
            Builtin::new("shout", shout),
            &Args::input("ignored").with("suffix", "!"),
        );
        assert_eq!(ctx.call_value(&rule, Args::input("hey")), Ok(Value::from("HEY!")));
    }

    #[test]
    fn test_composition_feeds_input() {
        let mut ctx = context();
        let first: Rc<dyn ScriptFunction> = Rc::new(Builtin::new("shout", shout));
        let second = make_rule(
            "shout rule",
            Builtin::new("shout", shout),
            &Args::new().with("suffix", "?"),
        );
        let composed = Composition::new(first, second.as_function().unwrap().clone());
        assert_eq!(
            composed.call(&mut ctx, Args::input("a")),
            Ok(Value::from("A?"))
        );
    }
}
