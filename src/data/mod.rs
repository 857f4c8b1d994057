//! Document model: games, sets, cards, keywords and symbols.
//!
//! ## Key Types
//!
//! - `Game`: the schema (card fields, set fields, keywords)
//! - `Field`: one typed slot, optionally computed by scripts
//! - `Card`: one `ValueInstance` per card field
//! - `Set`: the document; cards, set values and set keywords
//! - `KeywordDatabase`: compiled keywords, built on first use
//! - `Symbol`: shapes and symmetries edited by the symbol actions
//!
//! Cards and sets reach scripts through `CardObject` and `SetObject`.

pub mod card;
pub mod color;
pub mod field;
pub mod game;
pub mod keyword;
pub mod keyword_db;
pub mod objects;
pub mod set;
pub mod symbol;
pub mod value;

pub use card::Card;
pub use color::Color;
pub use field::{ColorChoice, Field, FieldKind};
pub use game::Game;
pub use keyword::{Keyword, KeywordMode, KeywordParamType, KeywordText};
pub use keyword_db::{expand_keywords, CompiledKeyword, KeywordDatabase};
pub use objects::{CardObject, SetObject};
pub use set::{PendingChanges, Set};
pub use symbol::{
    ControlPoint, LockMode, SegmentMode, Symbol, SymbolPart, SymbolShape, SymbolSymmetry,
    SymmetryKind, Vector2D, WhichHandle,
};
pub use value::ValueInstance;
