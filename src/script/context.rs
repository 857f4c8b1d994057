//! Variable scopes and the evaluation context.
//!
//! A [`Context`] is the environment of one evaluation: a chain of
//! [`Scope`]s (innermost first), the call depth guard, the shared RNG and,
//! when the evaluation computes a document value, a dependency recorder.
//!
//! Scopes are reference counted so that a closure keeps the scope it was
//! defined in alive after the defining call has returned.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::core::{ScriptError, ScriptResult, ScriptRng};
use crate::deps::{mark_dependency_member, Dependency, DependencyRecorder, Source};

use super::function::{Args, ScriptFunction};
use super::object::ScriptObject;
use super::value::Value;

/// One level of variable bindings.
#[derive(Debug, Default)]
pub struct Scope {
    vars: RefCell<FxHashMap<String, Value>>,
    parent: Option<Rc<Scope>>,
}

impl Scope {
    /// A scope with no parent.
    #[must_use]
    pub fn root() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// A new empty scope whose lookups fall through to `parent`.
    #[must_use]
    pub fn child(parent: &Rc<Scope>) -> Rc<Self> {
        Rc::new(Self {
            vars: RefCell::default(),
            parent: Some(parent.clone()),
        })
    }

    /// Bind in this scope.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.vars.borrow_mut().insert(name.into(), value);
    }

    /// Look up through this scope and its ancestors.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.vars.borrow().get(name) {
            return Some(v.clone());
        }
        let mut scope = self.parent.as_deref();
        while let Some(s) = scope {
            if let Some(v) = s.vars.borrow().get(name) {
                return Some(v.clone());
            }
            scope = s.parent.as_deref();
        }
        None
    }

    /// Is `name` bound directly in this scope?
    #[must_use]
    pub fn contains_local(&self, name: &str) -> bool {
        self.vars.borrow().contains_key(name)
    }
}

/// The environment of one evaluation.
#[derive(Debug)]
pub struct Context {
    scope: Rc<Scope>,
    depth: usize,
    max_depth: usize,
    rng: Rc<RefCell<ScriptRng>>,
    recorder: Option<DependencyRecorder>,
    used_keywords: Vec<String>,
}

impl Context {
    /// A context evaluating in a fresh child of `globals`.
    pub fn new(globals: &Rc<Scope>, max_depth: usize, rng: Rc<RefCell<ScriptRng>>) -> Self {
        Self {
            scope: Scope::child(globals),
            depth: 0,
            max_depth,
            rng,
            recorder: None,
            used_keywords: Vec::new(),
        }
    }

    /// A context whose writes land directly in `scope`.
    ///
    /// Used to run init scripts into the global scope.
    pub fn in_scope(scope: Rc<Scope>, max_depth: usize, rng: Rc<RefCell<ScriptRng>>) -> Self {
        Self {
            scope,
            depth: 0,
            max_depth,
            rng,
            recorder: None,
            used_keywords: Vec::new(),
        }
    }

    // === Variables ===

    /// Bind `name` in the innermost scope. Shadowing is allowed.
    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.scope.set(name, value);
    }

    /// Look up `name`, failing with a name error if it is unbound.
    pub fn get_variable(&self, name: &str) -> ScriptResult<Value> {
        self.scope
            .lookup(name)
            .ok_or_else(|| ScriptError::Name(name.to_string()))
    }

    /// Look up `name` without failing.
    #[must_use]
    pub fn get_variable_opt(&self, name: &str) -> Option<Value> {
        self.scope.lookup(name)
    }

    /// The innermost scope.
    #[must_use]
    pub fn scope(&self) -> &Rc<Scope> {
        &self.scope
    }

    /// Run `f` in a new child scope; the current scope is restored after.
    pub fn with_child_scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let child = Scope::child(&self.scope);
        self.with_scope(child, f)
    }

    /// Run `f` with `scope` as the innermost scope, then restore.
    pub fn with_scope<R>(&mut self, scope: Rc<Scope>, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = std::mem::replace(&mut self.scope, scope);
        let result = f(self);
        self.scope = saved;
        result
    }

    // === Calls ===

    /// Call a function value, enforcing the depth limit.
    pub fn call(&mut self, function: &Rc<dyn ScriptFunction>, args: Args) -> ScriptResult<Value> {
        if self.depth >= self.max_depth {
            return Err(ScriptError::Recursion {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = function.call(self, args);
        self.depth -= 1;
        result
    }

    /// Call a value that must be a function.
    pub fn call_value(&mut self, function: &Value, args: Args) -> ScriptResult<Value> {
        let f = function.as_function()?.clone();
        self.call(&f, args)
    }

    /// Current call depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The shared random number generator.
    #[must_use]
    pub fn rng(&self) -> &Rc<RefCell<ScriptRng>> {
        &self.rng
    }

    // === Dependencies ===

    /// Start recording reads on behalf of `dep`.
    pub fn start_recording(&mut self, dep: Dependency) {
        self.recorder = Some(DependencyRecorder::new(dep));
    }

    /// Stop recording and hand back the recorder.
    pub fn take_recorder(&mut self) -> Option<DependencyRecorder> {
        self.recorder.take()
    }

    /// The dependency being recorded, if any.
    #[must_use]
    pub fn dependency(&self) -> Option<Dependency> {
        self.recorder.as_ref().map(|r| *r.dependency())
    }

    /// Record that `member` of `entity` was read.
    pub fn mark_dependency_member(&mut self, entity: &dyn ScriptObject, member: &str) {
        if let Some(recorder) = self.recorder.as_mut() {
            let dep = *recorder.dependency();
            mark_dependency_member(recorder, entity, member, &dep);
        }
    }

    /// Record that `member` of `entity` was read on behalf of `dep`.
    ///
    /// Used by [`ScriptFunction::dependencies`] to mark reads under a
    /// modified dependency (usually card-independent).
    pub fn mark_dependency_member_for(
        &mut self,
        entity: &dyn ScriptObject,
        member: &str,
        dep: &Dependency,
    ) {
        if let Some(recorder) = self.recorder.as_mut() {
            mark_dependency_member(recorder, entity, member, dep);
        }
    }

    /// Record a read of `source`.
    pub fn mark_source(&mut self, source: Source) {
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.mark(source);
        }
    }

    /// Note that keyword expansion used the keyword named `name`.
    pub fn note_keyword_used(&mut self, name: &str) {
        if !self.used_keywords.iter().any(|k| k == name) {
            self.used_keywords.push(name.to_string());
        }
    }

    /// Keywords used since the last call, in first-use order.
    pub fn take_used_keywords(&mut self) -> Vec<String> {
        std::mem::take(&mut self.used_keywords)
    }

    /// Run `f` without recording reads.
    pub fn without_recording<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        if let Some(r) = self.recorder.as_mut() {
            r.suspend();
        }
        let result = f(self);
        if let Some(r) = self.recorder.as_mut() {
            r.resume();
        }
        result
    }
}
