//! Entity identification.
//!
//! Cards, fields and sets each get a small copyable id. Script objects
//! expose an [`ObjectId`] so that two handles to the same card compare
//! equal even after copy-on-write edits gave them different allocations.
//!
//! ```
//! use rust_cardsmith::core::{CardId, ObjectId};
//!
//! let card = CardId::new(7);
//! assert_eq!(ObjectId::Card(card), ObjectId::Card(CardId(7)));
//! assert_eq!(format!("{}", card), "Card(7)");
//! ```

use serde::{Deserialize, Serialize};

/// Identifier of a card within a set.
///
/// Ids are allocated by the set and never reused, so an undo that
/// re-inserts a removed card restores the same id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Identifier of a field definition; the index into its game's field list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldId(pub u16);

impl FieldId {
    /// Create a new field ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Index into the owning field list.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Field({})", self.0)
    }
}

/// Identifier of a set (document).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetId(pub u32);

impl std::fmt::Display for SetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Set({})", self.0)
    }
}

/// Identity of an opaque script object.
///
/// Object values compare by this id, never by content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectId {
    Card(CardId),
    Set(SetId),
    /// Host-defined objects; the host picks the numbers.
    Other(u64),
}
