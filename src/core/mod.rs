//! Core engine types: ids, errors, configuration, RNG.
//!
//! Everything here is independent of the script language and of the
//! document model.

pub mod config;
pub mod entity;
pub mod error;
pub mod rng;

pub use config::EngineConfig;
pub use entity::{CardId, FieldId, ObjectId, SetId};
pub use error::{ScriptError, ScriptResult};
pub use rng::{ScriptRng, ScriptRngState};
