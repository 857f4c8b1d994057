//! Actions on the cards and values of a set.

use std::any::Any;
use std::rc::Rc;

use crate::core::{CardId, FieldId};
use crate::data::card::now_secs;
use crate::data::{Card, Set};
use crate::script::Value;

use super::generic::GenericAddAction;
use super::Action;

// === Adding and removing cards ===

/// Adds cards to, or removes cards from, a set.
#[derive(Debug)]
pub struct AddCardAction {
    action: GenericAddAction<Rc<Card>>,
}

impl AddCardAction {
    /// Add `count` new blank cards at the end of the set.
    pub fn new_cards(set: &mut Set, count: usize) -> Self {
        let cards = (0..count).map(|_| set.new_card()).collect();
        Self::adding(set, cards)
    }

    /// Add the given cards at the end of the set.
    #[must_use]
    pub fn adding(set: &Set, cards: Vec<Card>) -> Self {
        let cards = cards.into_iter().map(Rc::new).collect();
        Self {
            action: GenericAddAction::adding(set.cards().len(), cards),
        }
    }

    /// Remove the cards with the given ids. `None` if none of them is in
    /// the set.
    #[must_use]
    pub fn removing(set: &Set, ids: &[CardId]) -> Option<Self> {
        let positions: Vec<(usize, Rc<Card>)> = ids
            .iter()
            .filter_map(|id| Some((set.card_index(*id)?, set.card(*id)?.clone())))
            .collect();
        if positions.is_empty() {
            return None;
        }
        Some(Self {
            action: GenericAddAction::removing(positions),
        })
    }

    /// Ids of the cards this action adds or removes.
    pub fn card_ids(&self) -> impl Iterator<Item = CardId> + '_ {
        self.action.steps.iter().map(|(_, card)| card.id())
    }
}

impl Action<Set> for AddCardAction {
    fn name(&self, _to_undo: bool) -> String {
        self.action.name("card")
    }

    fn perform(&mut self, set: &mut Set, to_undo: bool) {
        let set = std::cell::RefCell::new(set);
        self.action.perform(
            to_undo,
            |pos, card| set.borrow_mut().insert_card(pos, card),
            |_, card| {
                set.borrow_mut().remove_card(card.id());
            },
        );
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// === Changing values ===

/// The value a [`ValueAction`] edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueTarget {
    Card { card: CardId, field: FieldId },
    Set { field: FieldId },
}

/// Changes the stored value of a card or set field.
///
/// Card edits also swap the card's modification time, so undoing one
/// restores the time as well. Successive edits of the same value merge.
#[derive(Debug)]
pub struct ValueAction {
    target: ValueTarget,
    field_name: String,
    value: Value,
    time: u64,
}

impl ValueAction {
    /// Set `field` of `card` to `value`. `None` if there is no such value.
    #[must_use]
    pub fn card(set: &Set, card: CardId, field: FieldId, value: Value) -> Option<Self> {
        let instance = set.card(card)?.value_at(field)?;
        Some(Self {
            target: ValueTarget::Card { card, field },
            field_name: instance.field().name.clone(),
            value,
            time: now_secs(),
        })
    }

    /// Set the set field `field` to `value`.
    #[must_use]
    pub fn set(set: &Set, field: FieldId, value: Value) -> Option<Self> {
        let instance = set.values().get(field.index())?;
        Some(Self {
            target: ValueTarget::Set { field },
            field_name: instance.field().name.clone(),
            value,
            time: 0,
        })
    }

    #[must_use]
    pub fn target(&self) -> ValueTarget {
        self.target
    }
}

impl Action<Set> for ValueAction {
    fn name(&self, _to_undo: bool) -> String {
        format!("Change {}", self.field_name)
    }

    fn perform(&mut self, set: &mut Set, _to_undo: bool) {
        // a missing target is a no-op that keeps the held value
        match self.target {
            ValueTarget::Card { card, field } => {
                let Some(current_time) = set
                    .card(card)
                    .filter(|c| c.value_at(field).is_some())
                    .map(|c| c.time_modified)
                else {
                    return;
                };
                let value = std::mem::take(&mut self.value);
                if let Some(old) = set.restore_card_value(card, field, value, self.time) {
                    self.value = old;
                    self.time = current_time;
                }
            }
            ValueTarget::Set { field } => {
                if set.values().get(field.index()).is_none() {
                    return;
                }
                let value = std::mem::take(&mut self.value);
                if let Some(old) = set.set_value(field, value) {
                    self.value = old;
                }
            }
        }
    }

    fn merge(&mut self, other: &dyn Action<Set>) -> bool {
        // `self` still holds the value from before both edits
        other
            .as_any()
            .downcast_ref::<ValueAction>()
            .map_or(false, |other| other.target == self.target)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// === Styling ===

/// Changes the stylesheet a card is drawn with.
#[derive(Debug)]
pub struct ChangeCardStyleAction {
    card: CardId,
    stylesheet: Option<String>,
}

impl ChangeCardStyleAction {
    /// Use `stylesheet` for `card`, or the set's stylesheet for `None`.
    #[must_use]
    pub fn new(card: CardId, stylesheet: Option<String>) -> Self {
        Self { card, stylesheet }
    }
}

impl Action<Set> for ChangeCardStyleAction {
    fn name(&self, _to_undo: bool) -> String {
        "Change style".to_string()
    }

    fn perform(&mut self, set: &mut Set, _to_undo: bool) {
        let stylesheet = self.stylesheet.take();
        match set.set_card_stylesheet(self.card, stylesheet.clone()) {
            Some(old) => self.stylesheet = old,
            None => self.stylesheet = stylesheet,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FieldKind, Game};

    fn set() -> Set {
        let game = Game::new("g")
            .with_card_field("name", FieldKind::Text)
            .with_set_field("title", FieldKind::Text);
        Set::new(Rc::new(game))
    }

    fn names(set: &Set) -> Vec<String> {
        set.cards()
            .iter()
            .map(|c| c.value("name").unwrap().stored().to_string())
            .collect()
    }

    #[test]
    fn test_add_and_remove_cards() {
        let mut set = set();
        let mut add = AddCardAction::new_cards(&mut set, 3);
        add.perform(&mut set, false);
        assert_eq!(set.cards().len(), 3);
        assert_eq!(add.name(false), "Add cards");

        let ids: Vec<CardId> = set.cards().iter().map(|c| c.id()).collect();
        let mut remove = AddCardAction::removing(&set, &ids[1..2]).unwrap();
        remove.perform(&mut set, false);
        assert_eq!(set.cards().len(), 2);
        assert_eq!(set.card_index(ids[1]), None);
        remove.perform(&mut set, true);
        assert_eq!(set.card_index(ids[1]), Some(1));

        add.perform(&mut set, true);
        assert!(set.cards().is_empty());
        assert!(AddCardAction::removing(&set, &ids).is_none());
    }

    #[test]
    fn test_value_action_swaps() {
        let mut set = set();
        AddCardAction::new_cards(&mut set, 1).perform(&mut set, false);
        let card = set.cards()[0].id();
        let before_time = set.card(card).unwrap().time_modified;

        let mut action = ValueAction::card(&set, card, FieldId(0), Value::from("Bolt")).unwrap();
        action.perform(&mut set, false);
        assert_eq!(names(&set), vec!["Bolt"]);
        action.perform(&mut set, true);
        assert_eq!(names(&set), vec![""]);
        assert_eq!(set.card(card).unwrap().time_modified, before_time);
        action.perform(&mut set, false);
        assert_eq!(names(&set), vec!["Bolt"]);
    }

    #[test]
    fn test_value_action_on_missing_card_keeps_value() {
        let mut set = set();
        AddCardAction::new_cards(&mut set, 1).perform(&mut set, false);
        let card = set.cards()[0].id();
        let mut action = ValueAction::card(&set, card, FieldId(0), Value::from("Bolt")).unwrap();

        let (pos, removed) = set.remove_card(card).unwrap();
        action.perform(&mut set, false);
        set.insert_card(pos, removed);
        assert_eq!(names(&set), vec![""]);

        action.perform(&mut set, false);
        assert_eq!(names(&set), vec!["Bolt"]);
        action.perform(&mut set, true);
        assert_eq!(names(&set), vec![""]);
    }

    #[test]
    fn test_value_actions_merge_per_target() {
        let mut set = set();
        AddCardAction::new_cards(&mut set, 2).perform(&mut set, false);
        let a = set.cards()[0].id();
        let b = set.cards()[1].id();
        let mut first = ValueAction::card(&set, a, FieldId(0), Value::from("x")).unwrap();
        let same = ValueAction::card(&set, a, FieldId(0), Value::from("xy")).unwrap();
        let other = ValueAction::card(&set, b, FieldId(0), Value::from("z")).unwrap();
        assert!(first.merge(&same));
        assert!(!first.merge(&other));
        assert!(ValueAction::card(&set, a, FieldId(9), Value::Default).is_none());
    }

    #[test]
    fn test_set_value_action() {
        let mut set = set();
        let mut action = ValueAction::set(&set, FieldId(0), Value::from("Alpha")).unwrap();
        action.perform(&mut set, false);
        assert_eq!(set.value("title").unwrap().stored(), &Value::from("Alpha"));
        assert_eq!(action.name(false), "Change title");
        action.perform(&mut set, true);
        assert!(set.value("title").unwrap().stored().to_string().is_empty());
    }

    #[test]
    fn test_change_style() {
        let mut set = set();
        AddCardAction::new_cards(&mut set, 1).perform(&mut set, false);
        let card = set.cards()[0].id();
        let mut action = ChangeCardStyleAction::new(card, Some("planeswalker".into()));
        action.perform(&mut set, false);
        assert_eq!(set.card(card).unwrap().stylesheet(), Some("planeswalker"));
        action.perform(&mut set, true);
        assert_eq!(set.card(card).unwrap().stylesheet(), None);
    }
}
