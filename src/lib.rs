//! # rust-cardsmith
//!
//! Scripting engine, dependency tracking and undo model for designing sets
//! of cards for a card game.
//!
//! ## Design Principles
//!
//! 1. **Game-Agnostic**: No hardcoded card fields, keywords or styles.
//!    A [`Game`] declares its fields, keyword modes and parameter types;
//!    field scripts compute everything else.
//!
//! 2. **Incremental**: Every script evaluation records what it read.
//!    After an edit only the values that read the changed state are
//!    evaluated again.
//!
//! 3. **Reversible**: Every edit is an [`Action`] whose undo restores the
//!    exact previous state.
//!
//! ## Architecture
//!
//! - **Snapshots**: Cards and keyword lists live in `im` vectors behind
//!   `Rc`, so the objects scripts see are cheap, consistent snapshots.
//!
//! - **Single-threaded**: Values share data through `Rc`; a [`Document`]
//!   and everything it owns stays on one thread.
//!
//! ## Modules
//!
//! - `core`: Ids, errors, configuration, RNG
//! - `script`: The expression language and its builtins
//! - `text`: Tagged text and `printf`-style formatting
//! - `data`: Games, sets, cards, keywords and symbols
//! - `deps`: Dependency recording and invalidation
//! - `actions`: Reversible edits and the undo stack
//! - `document`: An open set with refresh and undo

pub mod core;
pub mod script;
pub mod text;
pub mod data;
pub mod deps;
pub mod actions;
pub mod document;

// Re-export commonly used types
pub use crate::core::{
    CardId, FieldId, ObjectId, SetId,
    EngineConfig,
    ScriptError, ScriptResult,
    ScriptRng, ScriptRngState,
};

pub use crate::script::{
    Context, Scope, ScriptEngine, Script,
    Value, ValueKind,
    Args, ScriptFunction, ScriptObject,
};

pub use crate::data::{
    Card, Color, Field, FieldKind, Game, Set, ValueInstance,
    Keyword, KeywordMode, KeywordParamType, KeywordDatabase,
    Symbol, SymbolPart, SymbolShape, SymbolSymmetry, ControlPoint, Vector2D,
};

pub use crate::deps::{Dependency, DependencyTracker, Dependent, Source};

pub use crate::actions::{Action, ActionStack};

pub use crate::document::Document;
