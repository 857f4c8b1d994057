//! Script views of cards and sets.
//!
//! Both objects are snapshots: they hold `Rc`s to the card data and the
//! `im` vectors of the set as they were when the object was made, so an
//! evaluation always sees one consistent document.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::core::{ObjectId, ScriptError, ScriptResult, SetId};
use crate::deps::{Dependency, Source};
use crate::script::{Args, Context, ScriptObject, Value};

use super::card::Card;
use super::game::Game;
use super::keyword::Keyword;
use super::keyword_db::{CompiledKeyword, KeywordDatabase};
use super::set::Set;
use super::value::ValueInstance;

/// A card as seen by scripts. Members are the card's field values.
#[derive(Clone, Debug)]
pub struct CardObject {
    card: Rc<Card>,
}

impl CardObject {
    #[must_use]
    pub fn new(card: Rc<Card>) -> Self {
        Self { card }
    }

    /// Wrap a card as a script value.
    #[must_use]
    pub fn value(card: Rc<Card>) -> Value {
        Value::object(Self::new(card))
    }

    #[must_use]
    pub fn card(&self) -> &Rc<Card> {
        &self.card
    }
}

impl ScriptObject for CardObject {
    fn type_name(&self) -> &'static str {
        "card"
    }

    fn identity(&self) -> ObjectId {
        ObjectId::Card(self.card.id())
    }

    fn member(&self, name: &str) -> ScriptResult<Value> {
        if let Some(value) = self.card.value(name) {
            return Ok(value.display().clone());
        }
        match name {
            "notes" => Ok(Value::string(&self.card.notes)),
            "stylesheet" => Ok(self.card.stylesheet().map_or(Value::Default, Value::string)),
            _ => Err(ScriptError::Name(format!("card.{name}"))),
        }
    }

    fn dependency_source(&self, member: &str, dep: &Dependency) -> Option<Source> {
        if self.card.value(member).is_some() || member == "stylesheet" {
            Some(dep.card_field(self.card.id(), member))
        } else {
            None
        }
    }

    fn member_names(&self) -> Vec<String> {
        self.card
            .values()
            .iter()
            .map(|v| v.field().name.clone())
            .chain(std::iter::once("stylesheet".to_string()))
            .collect()
    }

    fn display(&self) -> String {
        self.card.identification()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A set as seen by scripts.
///
/// Iterating a set yields its cards; `set.cards` is the same list as a
/// collection; other members are set field values.
#[derive(Clone, Debug)]
pub struct SetObject {
    id: SetId,
    game: Rc<Game>,
    values: Vec<ValueInstance>,
    cards: im::Vector<Rc<Card>>,
    keywords: im::Vector<Keyword>,
    keyword_db: Rc<RefCell<KeywordDatabase>>,
}

impl SetObject {
    #[must_use]
    pub fn new(set: &Set) -> Self {
        Self {
            id: set.id(),
            game: set.game().clone(),
            values: set.values().to_vec(),
            cards: set.cards().clone(),
            keywords: set.keywords().clone(),
            keyword_db: set.keyword_db().clone(),
        }
    }

    #[must_use]
    pub fn game(&self) -> &Rc<Game> {
        &self.game
    }

    fn card_values(&self) -> Vec<Value> {
        self.cards.iter().map(|c| CardObject::value(c.clone())).collect()
    }

    /// The compiled keywords, building the database on first use.
    #[must_use]
    pub fn keyword_entries(&self) -> Vec<Rc<CompiledKeyword>> {
        let mut db = self.keyword_db.borrow_mut();
        if !db.is_built() {
            db.build(&self.game, self.keywords.iter());
        }
        db.entries().to_vec()
    }

    /// Position of `card` when the cards are sorted by `order_by`.
    ///
    /// The key function is called with the card bound to both `card` and
    /// `input`; keys are compared as strings and ties keep set order.
    /// Returns -1 when the card is not in the set.
    pub fn position_of_card(&self, card: &CardObject, order_by: &Value, ctx: &mut Context) -> ScriptResult<i64> {
        let mut keyed = Vec::with_capacity(self.cards.len());
        for c in &self.cards {
            let object = CardObject::value(c.clone());
            let args = Args::input(object.clone()).with("card", object);
            let key = ctx.without_recording(|ctx| ctx.call_value(order_by, args))?;
            keyed.push((key.to_string(), c.id()));
        }
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        let target = card.card().id();
        Ok(keyed
            .iter()
            .position(|(_, id)| *id == target)
            .map_or(-1, |p| p as i64))
    }
}

impl ScriptObject for SetObject {
    fn type_name(&self) -> &'static str {
        "set"
    }

    fn identity(&self) -> ObjectId {
        ObjectId::Set(self.id)
    }

    fn member(&self, name: &str) -> ScriptResult<Value> {
        if name == "cards" {
            return Ok(Value::from(self.card_values()));
        }
        self.values
            .iter()
            .find(|v| v.field().name == name)
            .map(|v| v.display().clone())
            .ok_or_else(|| ScriptError::Name(format!("set.{name}")))
    }

    fn items(&self) -> Option<Vec<Value>> {
        Some(self.card_values())
    }

    fn item_count(&self) -> Option<usize> {
        Some(self.cards.len())
    }

    fn dependency_source(&self, member: &str, _dep: &Dependency) -> Option<Source> {
        if member == "cards" {
            Some(Source::CardList)
        } else if self.values.iter().any(|v| v.field().name == member) {
            Some(Source::SetField(member.to_string()))
        } else {
            None
        }
    }

    fn member_names(&self) -> Vec<String> {
        std::iter::once("cards".to_string())
            .chain(self.values.iter().map(|v| v.field().name.clone()))
            .collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
