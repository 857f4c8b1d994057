//! An open set: the data, its script engine and its undo history.
//!
//! [`Document`] is what a host talks to. Edits come in as actions; after
//! every edit, undo or redo the document refreshes the values whose
//! recorded dependencies were touched.
//!
//! ## Refresh
//!
//! The set records what each mutation changed (see
//! [`PendingChanges`](crate::data::PendingChanges)). A refresh pass takes
//! those changes, asks the tracker which values read them, and evaluates
//! those values plus the ones marked dirty outright. A value whose display
//! changed is itself a change, so passes cascade until nothing is pending
//! or `max_update_passes` is reached; dependency cycles end there.
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use rust_cardsmith::actions::{AddCardAction, ValueAction};
//! use rust_cardsmith::core::{EngineConfig, FieldId};
//! use rust_cardsmith::data::{Field, FieldKind, Game, Set};
//! use rust_cardsmith::script::{Script, Value};
//! use rust_cardsmith::Document;
//!
//! let game = Game::new("demo")
//!     .with_card_field("name", FieldKind::Text)
//!     .with_card_field_def(
//!         Field::new(FieldId(1), "title", FieldKind::Text)
//!             .with_script(Script::parse("to_upper(card.name)").unwrap()),
//!     );
//! let mut doc = Document::new(Set::new(Rc::new(game)), EngineConfig::default()).unwrap();
//!
//! let add = AddCardAction::new_cards(doc.set_mut(), 1);
//! doc.apply_action(Box::new(add));
//! let card = doc.set().cards()[0].id();
//! let edit = ValueAction::card(doc.set(), card, FieldId(0), Value::from("bolt")).unwrap();
//! doc.apply_action(Box::new(edit));
//!
//! let title = doc.set().card(card).unwrap().value("title").unwrap().display().clone();
//! assert_eq!(title, Value::from("BOLT"));
//!
//! doc.undo();
//! let title = doc.set().card(card).unwrap().value("title").unwrap().display().clone();
//! assert_eq!(title, Value::from(""));
//! ```

use std::rc::Rc;

use log::{debug, trace, warn};
use rustc_hash::FxHashSet;

use crate::actions::{Action, ActionStack};
use crate::core::{CardId, EngineConfig, ScriptError, ScriptResult, ScriptRngState};
use crate::data::{Field, Set};
use crate::deps::{Dependency, Dependent, Source};
use crate::script::{Context, ScriptEngine, Value};

/// A set being edited.
pub struct Document {
    set: Set,
    engine: ScriptEngine,
    stack: ActionStack<Set>,
}

impl Document {
    /// Open `set`: run the game's init script and compute every value.
    ///
    /// Fails only if the init script fails.
    pub fn new(set: Set, config: EngineConfig) -> ScriptResult<Self> {
        let engine = ScriptEngine::new(config);
        if let Some(init) = set.game().init_script.clone() {
            engine.run_init_script(&init)?;
        }
        let stack = ActionStack::new().with_undo_limit(engine.config().undo_limit);
        let mut doc = Self { set, engine, stack };
        doc.set.mark_all_dirty();
        doc.refresh();
        Ok(doc)
    }

    #[must_use]
    pub fn set(&self) -> &Set {
        &self.set
    }

    /// Direct access to the set.
    ///
    /// Changes made here bypass the undo history; they are still picked
    /// up by the next [`refresh`](Self::refresh).
    pub fn set_mut(&mut self) -> &mut Set {
        &mut self.set
    }

    #[must_use]
    pub fn engine(&self) -> &ScriptEngine {
        &self.engine
    }

    #[must_use]
    pub fn stack(&self) -> &ActionStack<Set> {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut ActionStack<Set> {
        &mut self.stack
    }

    // === Evaluation ===

    fn context(&self) -> Context {
        let mut ctx = self.engine.context();
        ctx.set_variable("set", self.set.script_object());
        ctx
    }

    /// Evaluate `source` with `set` bound.
    pub fn evaluate(&self, source: &str) -> ScriptResult<Value> {
        let expr = self.engine.parse(source)?;
        let mut ctx = self.context();
        self.engine.evaluate(&expr, &mut ctx)
    }

    /// Evaluate `source` with `set` and `card` bound.
    pub fn evaluate_for_card(&self, card: CardId, source: &str) -> ScriptResult<Value> {
        let object = self
            .set
            .card_object(card)
            .ok_or_else(|| ScriptError::Usage(format!("no card with id {card}")))?;
        let expr = self.engine.parse(source)?;
        let mut ctx = self.context();
        ctx.set_variable("card", object);
        self.engine.evaluate(&expr, &mut ctx)
    }

    /// Values whose last evaluation read the field called `field`, on any
    /// card or on the set.
    #[must_use]
    pub fn dependents(&self, field: &str) -> Vec<Dependent> {
        self.set.tracker().dependents_of_field(field)
    }

    // === Editing ===

    /// Perform `action`, merging it into the previous one where possible,
    /// and refresh.
    pub fn apply_action(&mut self, action: Box<dyn Action<Set>>) {
        self.stack.add(action, &mut self.set, true);
        self.refresh();
    }

    /// Perform `action` as a separate undo step, and refresh.
    pub fn apply_action_unmerged(&mut self, action: Box<dyn Action<Set>>) {
        self.stack.add(action, &mut self.set, false);
        self.refresh();
    }

    /// Undo the last action. Returns its name.
    pub fn undo(&mut self) -> Option<String> {
        let name = self.stack.undo(&mut self.set)?;
        self.refresh();
        Some(name)
    }

    /// Redo the last undone action. Returns its name.
    pub fn redo(&mut self) -> Option<String> {
        let name = self.stack.redo(&mut self.set)?;
        self.refresh();
        Some(name)
    }

    /// Is the set unchanged since the last [`mark_saved`](Self::mark_saved)?
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.stack.at_save_point()
    }

    pub fn mark_saved(&mut self) {
        self.stack.set_save_point();
    }

    /// The random builtins' position, saved alongside the set so a reopened
    /// document draws the same numbers.
    #[must_use]
    pub fn rng_state(&self) -> ScriptRngState {
        self.engine.rng_state()
    }

    pub fn restore_rng_state(&mut self, state: &ScriptRngState) {
        self.engine.restore_rng(state);
    }

    // === Refresh ===

    /// Re-evaluate every value affected by pending changes.
    ///
    /// Returns the number of evaluations run.
    pub fn refresh(&mut self) -> usize {
        let max_passes = self.engine.config().max_update_passes;
        let mut evaluated = 0;
        let mut pass = 0;
        while self.set.has_pending() {
            if pass == max_passes {
                let dropped = self.set.take_pending();
                warn!(
                    "Refresh stopped after {max_passes} passes; {} changes not propagated",
                    dropped.sources.len() + dropped.dirty.len()
                );
                break;
            }
            pass += 1;

            let pending = self.set.take_pending();
            let mut todo: FxHashSet<Dependent> = pending.dirty.into_iter().collect();
            for source in &pending.sources {
                todo.extend(self.set.tracker().stale_after(source));
            }
            let mut todo: Vec<Dependent> = todo.into_iter().collect();
            todo.sort();
            trace!("Refresh pass {pass}: {} values", todo.len());

            for dependent in todo {
                if self.update_value(dependent) {
                    evaluated += 1;
                }
            }
        }
        if evaluated > 0 {
            debug!("Refreshed {evaluated} values in {pass} passes");
        }
        evaluated
    }

    /// Evaluate one value and store the result. Returns `false` if the
    /// value no longer exists or has no scripts.
    fn update_value(&mut self, dependent: Dependent) -> bool {
        let (field, stored, card_object) = match dependent {
            Dependent::CardValue { card, field } => {
                let Some(card) = self.set.card(card) else {
                    return false;
                };
                let Some(instance) = card.value_at(field) else {
                    return false;
                };
                (
                    instance.field().clone(),
                    instance.stored().clone(),
                    Some(crate::data::CardObject::value(card.clone())),
                )
            }
            Dependent::SetValue { field } => {
                let Some(instance) = self.set.values().get(field.index()) else {
                    return false;
                };
                (instance.field().clone(), instance.stored().clone(), None)
            }
        };
        if !field.is_scripted() {
            return false;
        }

        let mut ctx = self.context();
        if let Some(card) = card_object {
            ctx.set_variable("card", card);
        }
        ctx.start_recording(Dependency::new(dependent));
        let result = self.run_field_scripts(&field, stored, &mut ctx);
        let sources = ctx.take_recorder().map(|r| r.finish()).unwrap_or_default();
        let used_keywords = ctx.take_used_keywords();
        self.set.tracker_mut().record(dependent, sources);

        if let Err(e) = &result {
            warn!("Error in field '{}': {e}", field.name);
        }
        let changed = self.store_result(dependent, result, used_keywords);
        if changed {
            let source = match dependent {
                Dependent::CardValue { card, .. } => Source::CardField {
                    card: Some(card),
                    field: field.name.clone(),
                },
                Dependent::SetValue { .. } => Source::SetField(field.name.clone()),
            };
            self.set.mark_changed(source);
        }
        true
    }

    /// The default script fills in a `Default` stored value; the script
    /// then sees the result as `value`.
    fn run_field_scripts(&self, field: &Rc<Field>, stored: Value, ctx: &mut Context) -> ScriptResult<Value> {
        let mut value = stored;
        if value.is_default() {
            if let Some(default) = &field.default_script {
                ctx.set_variable("value", Value::Default);
                value = self.engine.evaluate(default.expr(), ctx)?;
            }
        }
        if let Some(script) = &field.script {
            ctx.set_variable("value", value);
            value = self.engine.evaluate(script.expr(), ctx)?;
        }
        Ok(value)
    }

    /// Store a result. Returns whether the displayed value changed.
    fn store_result(
        &mut self,
        dependent: Dependent,
        result: ScriptResult<Value>,
        used_keywords: Vec<String>,
    ) -> bool {
        match dependent {
            Dependent::CardValue { card, field } => {
                let Some(target) = self.set.card_mut(card) else {
                    return false;
                };
                target.set_keyword_usage(field, used_keywords);
                let Some(instance) = target.value_at_mut(field) else {
                    return false;
                };
                let before = instance.display().clone();
                instance.set_result(result);
                *instance.display() != before
            }
            Dependent::SetValue { field } => {
                let Some(instance) = self.set.value_at_mut(field) else {
                    return false;
                };
                let before = instance.display().clone();
                instance.set_result(result);
                *instance.display() != before
            }
        }
    }
}
