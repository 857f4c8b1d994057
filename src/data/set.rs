//! Sets: the document being edited.
//!
//! A set holds the set-field values, the cards and the set's own keywords.
//! Every mutation goes through a method here so the set can record what
//! changed; the refresh loop of [`Document`](crate::document::Document)
//! drains those records and re-evaluates only the values that read them.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::{CardId, FieldId, SetId};
use crate::deps::{DependencyTracker, Dependent, Source};
use crate::script::Value;

use super::card::{now_secs, Card};
use super::game::Game;
use super::keyword::Keyword;
use super::keyword_db::KeywordDatabase;
use super::objects::SetObject;
use super::value::ValueInstance;

/// Changes recorded since the last refresh.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingChanges {
    /// Document state that changed.
    pub sources: Vec<Source>,
    /// Values that must be evaluated regardless of their dependencies.
    pub dirty: Vec<Dependent>,
}

impl PendingChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.dirty.is_empty()
    }
}

/// A set of cards.
#[derive(Clone, Debug)]
pub struct Set {
    id: SetId,
    game: Rc<Game>,

    /// One instance per set field; index is the field id.
    values: Vec<ValueInstance>,

    cards: im::Vector<Rc<Card>>,

    /// Keywords of this set, on top of the game's.
    keywords: im::Vector<Keyword>,

    keyword_db: Rc<RefCell<KeywordDatabase>>,

    next_card_id: u32,

    tracker: DependencyTracker,

    pending: PendingChanges,
}

impl Set {
    /// An empty set for `game`. Every scripted set value starts dirty.
    #[must_use]
    pub fn new(game: Rc<Game>) -> Self {
        let values: Vec<ValueInstance> = game
            .set_fields()
            .iter()
            .map(|f| ValueInstance::new(f.clone()))
            .collect();
        let mut set = Self {
            id: SetId(0),
            game,
            values,
            cards: im::Vector::new(),
            keywords: im::Vector::new(),
            keyword_db: Rc::new(RefCell::new(KeywordDatabase::new())),
            next_card_id: 0,
            tracker: DependencyTracker::new(),
            pending: PendingChanges::default(),
        };
        set.mark_all_dirty();
        set
    }

    #[must_use]
    pub fn with_id(mut self, id: SetId) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn id(&self) -> SetId {
        self.id
    }

    #[must_use]
    pub fn game(&self) -> &Rc<Game> {
        &self.game
    }

    // === Set values ===

    #[must_use]
    pub fn values(&self) -> &[ValueInstance] {
        &self.values
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<&ValueInstance> {
        self.values.iter().find(|v| v.field().name == name)
    }

    pub(crate) fn value_at_mut(&mut self, field: FieldId) -> Option<&mut ValueInstance> {
        self.values.get_mut(field.index())
    }

    /// Replace the stored value of a set field, returning the old one.
    pub fn set_value(&mut self, field: FieldId, value: Value) -> Option<Value> {
        let instance = self.values.get_mut(field.index())?;
        let name = instance.field().name.clone();
        let old = instance.set_stored(value);
        self.pending.sources.push(Source::SetField(name));
        self.pending.dirty.push(Dependent::SetValue { field });
        Some(old)
    }

    // === Cards ===

    #[must_use]
    pub fn cards(&self) -> &im::Vector<Rc<Card>> {
        &self.cards
    }

    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&Rc<Card>> {
        self.cards.iter().find(|c| c.id() == id)
    }

    #[must_use]
    pub fn card_index(&self, id: CardId) -> Option<usize> {
        self.cards.iter().position(|c| c.id() == id)
    }

    /// Mutable access to a card; the card is copied first if a script
    /// object still shares it. Changes made here are not recorded.
    pub(crate) fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        let index = self.card_index(id)?;
        self.cards.get_mut(index).map(Rc::make_mut)
    }

    /// A new card with a fresh id, not yet part of the set.
    pub fn new_card(&mut self) -> Card {
        let id = CardId::new(self.next_card_id);
        self.next_card_id += 1;
        Card::new(id, &self.game)
    }

    /// Insert `card` at `index` (clamped to the end).
    pub fn insert_card(&mut self, index: usize, card: Rc<Card>) {
        let index = index.min(self.cards.len());
        self.next_card_id = self.next_card_id.max(card.id().raw() + 1);
        self.mark_card_dirty(&card);
        self.cards.insert(index, card);
        self.pending.sources.push(Source::CardList);
    }

    /// Remove a card, returning where it was and the card itself.
    pub fn remove_card(&mut self, id: CardId) -> Option<(usize, Rc<Card>)> {
        let index = self.card_index(id)?;
        let card = self.cards.remove(index);
        self.tracker.forget_card(id);
        self.pending.dirty.retain(|d| d.card() != Some(id));
        self.pending.sources.push(Source::CardList);
        Some((index, card))
    }

    /// Replace the stored value of a card field, returning the old value
    /// and the card's previous modification time.
    pub fn set_card_value(&mut self, card: CardId, field: FieldId, value: Value) -> Option<(Value, u64)> {
        let target = self.card_mut(card)?;
        let instance = target.value_at_mut(field)?;
        let name = instance.field().name.clone();
        let old = instance.set_stored(value);
        let old_time = std::mem::replace(&mut target.time_modified, now_secs());
        self.mark_card_value_changed(card, field, name);
        Some((old, old_time))
    }

    /// Put back a value and modification time saved by [`set_card_value`].
    ///
    /// [`set_card_value`]: Self::set_card_value
    pub fn restore_card_value(&mut self, card: CardId, field: FieldId, value: Value, time: u64) -> Option<Value> {
        let (old, _) = self.set_card_value(card, field, value)?;
        if let Some(target) = self.card_mut(card) {
            target.time_modified = time;
        }
        Some(old)
    }

    fn mark_card_value_changed(&mut self, card: CardId, field: FieldId, name: String) {
        self.pending.sources.push(Source::CardField {
            card: Some(card),
            field: name,
        });
        self.pending.dirty.push(Dependent::CardValue { card, field });
    }

    fn mark_card_dirty(&mut self, card: &Card) {
        for instance in card.values() {
            if instance.field().is_scripted() {
                self.pending.dirty.push(Dependent::CardValue {
                    card: card.id(),
                    field: instance.field().id,
                });
            }
        }
    }

    /// Swap a card's stylesheet override.
    pub fn set_card_stylesheet(&mut self, card: CardId, stylesheet: Option<String>) -> Option<Option<String>> {
        let target = self.card_mut(card)?;
        let old = target.set_stylesheet(stylesheet);
        self.pending.sources.push(Source::CardField {
            card: Some(card),
            field: "stylesheet".into(),
        });
        Some(old)
    }

    // === Keywords ===

    #[must_use]
    pub fn keywords(&self) -> &im::Vector<Keyword> {
        &self.keywords
    }

    pub fn insert_keyword(&mut self, index: usize, keyword: Keyword) {
        let index = index.min(self.keywords.len());
        self.keywords.insert(index, keyword);
        self.keywords_changed();
    }

    pub fn remove_keyword(&mut self, index: usize) -> Option<Keyword> {
        if index >= self.keywords.len() {
            return None;
        }
        let keyword = self.keywords.remove(index);
        self.keywords_changed();
        Some(keyword)
    }

    /// Edit a keyword in place; the keyword database is rebuilt on next use.
    pub fn keyword_mut(&mut self, index: usize) -> Option<&mut Keyword> {
        if index >= self.keywords.len() {
            return None;
        }
        self.keywords_changed();
        self.keywords.get_mut(index)
    }

    fn keywords_changed(&mut self) {
        self.keyword_db.borrow_mut().clear();
        self.pending.sources.push(Source::Keywords);
    }

    #[must_use]
    pub fn keyword_db(&self) -> &Rc<RefCell<KeywordDatabase>> {
        &self.keyword_db
    }

    // === Dependencies ===

    #[must_use]
    pub fn tracker(&self) -> &DependencyTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut DependencyTracker {
        &mut self.tracker
    }

    /// Record that `source` changed outside the methods above.
    pub fn mark_changed(&mut self, source: Source) {
        self.pending.sources.push(source);
    }

    /// Mark every scripted value, on the set and on every card, dirty.
    pub fn mark_all_dirty(&mut self) {
        for instance in &self.values {
            if instance.field().is_scripted() {
                self.pending.dirty.push(Dependent::SetValue {
                    field: instance.field().id,
                });
            }
        }
        let cards = self.cards.clone();
        for card in &cards {
            self.mark_card_dirty(card);
        }
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Take the changes recorded since the last call.
    pub fn take_pending(&mut self) -> PendingChanges {
        std::mem::take(&mut self.pending)
    }

    // === Scripts ===

    /// A script object for this set as it is now.
    #[must_use]
    pub fn script_object(&self) -> Value {
        Value::object(SetObject::new(self))
    }

    /// A script object for one of the cards.
    #[must_use]
    pub fn card_object(&self, id: CardId) -> Option<Value> {
        self.card(id).map(|c| super::objects::CardObject::value(c.clone()))
    }
}
