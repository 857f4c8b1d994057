//! Cards.
//!
//! A card owns one [`ValueInstance`] per card field of its game, indexed by
//! [`FieldId`]. Cards live in the set behind an `Rc` and are edited
//! copy-on-write, so script objects can hold a cheap snapshot.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::{CardId, FieldId};

use super::game::Game;
use super::value::ValueInstance;

/// Seconds since the Unix epoch.
pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// A card of a set.
#[derive(Clone, Debug)]
pub struct Card {
    id: CardId,

    /// One instance per card field; index is the field id.
    values: Vec<ValueInstance>,

    pub notes: String,

    pub time_created: u64,

    pub time_modified: u64,

    /// Stylesheet overriding the set's, by name.
    stylesheet: Option<String>,

    /// Keywords used by expansion, per field.
    keyword_usage: Vec<(FieldId, String)>,
}

impl Card {
    /// Create a card with fresh values for every card field of `game`.
    #[must_use]
    pub fn new(id: CardId, game: &Game) -> Self {
        let now = now_secs();
        let mut card = Self {
            id,
            values: Vec::new(),
            notes: String::new(),
            time_created: now,
            time_modified: now,
            stylesheet: None,
            keyword_usage: Vec::new(),
        };
        card.sync_fields(game);
        card
    }

    #[must_use]
    pub fn id(&self) -> CardId {
        self.id
    }

    /// Create the instances of fields the card does not have yet.
    ///
    /// Existing instances are kept; after this there is exactly one
    /// instance per card field of `game`.
    pub fn sync_fields(&mut self, game: &Game) {
        let fields = game.card_fields();
        self.values.truncate(fields.len());
        for field in fields.iter().skip(self.values.len()) {
            self.values.push(ValueInstance::new(field.clone()));
        }
    }

    #[must_use]
    pub fn values(&self) -> &[ValueInstance] {
        &self.values
    }

    #[must_use]
    pub fn value_at(&self, field: FieldId) -> Option<&ValueInstance> {
        self.values.get(field.index())
    }

    pub fn value_at_mut(&mut self, field: FieldId) -> Option<&mut ValueInstance> {
        self.values.get_mut(field.index())
    }

    /// Look a value up by field name.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&ValueInstance> {
        self.values.iter().find(|v| v.field().name == name)
    }

    pub fn value_mut(&mut self, name: &str) -> Option<&mut ValueInstance> {
        self.values.iter_mut().find(|v| v.field().name == name)
    }

    /// Something like a name or title; the first field's text.
    #[must_use]
    pub fn identification(&self) -> String {
        self.values
            .first()
            .map(ValueInstance::to_display_string)
            .unwrap_or_default()
    }

    /// Does any field contain `query` (case-insensitive)?
    #[must_use]
    pub fn contains(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.values
            .iter()
            .any(|v| v.to_display_string().to_lowercase().contains(&query))
    }

    #[must_use]
    pub fn stylesheet(&self) -> Option<&str> {
        self.stylesheet.as_deref()
    }

    /// Replace the stylesheet override, returning the old one.
    pub fn set_stylesheet(&mut self, stylesheet: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.stylesheet, stylesheet)
    }

    #[must_use]
    pub fn keyword_usage(&self) -> &[(FieldId, String)] {
        &self.keyword_usage
    }

    /// Replace the keywords recorded for `field`.
    pub fn set_keyword_usage(&mut self, field: FieldId, keywords: Vec<String>) {
        self.keyword_usage.retain(|(f, _)| *f != field);
        self.keyword_usage
            .extend(keywords.into_iter().map(|k| (field, k)));
    }
}
