//! Dependency tracking for incremental refresh.
//!
//! While a field script runs, every read of document state (a card field,
//! a set field, the card list, the keyword lists) is recorded as a
//! [`Source`]. The [`DependencyTracker`] keeps the edges
//! `source -> dependent` so that a later edit only re-evaluates the
//! values whose recorded sources intersect what changed.
//!
//! ## Card independence
//!
//! A script such as `position(of: card, in: set, order_by: {card.name})`
//! reads the `name` of *every* card, not just its own. Such reads are
//! recorded through a card-independent [`Dependency`], which turns
//! `card.name` into "the name field of any card".

mod recorder;
mod tracker;

pub use recorder::{mark_dependency_member, DependencyRecorder};
pub use tracker::DependencyTracker;

use serde::{Deserialize, Serialize};

use crate::core::{CardId, FieldId};

/// A value whose computation can depend on document state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dependent {
    /// A card field value.
    CardValue { card: CardId, field: FieldId },
    /// A set field value.
    SetValue { field: FieldId },
}

impl Dependent {
    /// The card this value lives on, if any.
    #[must_use]
    pub fn card(&self) -> Option<CardId> {
        match self {
            Dependent::CardValue { card, .. } => Some(*card),
            Dependent::SetValue { .. } => None,
        }
    }

    /// The field this value realizes.
    #[must_use]
    pub fn field(&self) -> FieldId {
        match self {
            Dependent::CardValue { field, .. } | Dependent::SetValue { field } => *field,
        }
    }
}

/// Document state that a script can read.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Source {
    /// A field of one card, or of any card when `card` is `None`.
    CardField { card: Option<CardId>, field: String },
    /// A set field.
    SetField(String),
    /// Membership and order of the set's cards.
    CardList,
    /// The game and set keyword lists.
    Keywords,
}

/// The dependent on whose behalf reads are being recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub dependent: Dependent,
    /// Reads of card fields count for every card.
    pub card_independent: bool,
}

impl Dependency {
    /// Dependency of a specific value.
    #[must_use]
    pub fn new(dependent: Dependent) -> Self {
        Self {
            dependent,
            card_independent: false,
        }
    }

    /// The same dependency, but card-independent.
    #[must_use]
    pub fn make_card_independent(&self) -> Self {
        Self {
            dependent: self.dependent,
            card_independent: true,
        }
    }

    /// Source for reading `field` of `card` under this dependency.
    #[must_use]
    pub fn card_field(&self, card: CardId, field: &str) -> Source {
        Source::CardField {
            card: if self.card_independent { None } else { Some(card) },
            field: field.to_string(),
        }
    }
}
