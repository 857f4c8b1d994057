//! Games: the schema a set is made for.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::FieldId;
use crate::script::Script;

use super::field::{Field, FieldKind};
use super::keyword::{Keyword, KeywordMode, KeywordParamType};

/// A game definition.
///
/// ## Example
///
/// ```
/// use rust_cardsmith::data::{FieldKind, Game};
///
/// let game = Game::new("magic")
///     .with_card_field("name", FieldKind::Text)
///     .with_card_field("rules", FieldKind::Text)
///     .with_set_field("title", FieldKind::Text);
///
/// assert_eq!(game.card_field("rules").map(|f| f.id.index()), Some(1));
/// assert_eq!(game.set_fields().len(), 1);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Game {
    pub name: String,

    card_fields: Vec<Rc<Field>>,

    set_fields: Vec<Rc<Field>>,

    /// Keywords every set of this game has.
    #[serde(default)]
    pub keywords: Vec<Keyword>,

    #[serde(default)]
    pub keyword_parameter_types: Vec<KeywordParamType>,

    #[serde(default)]
    pub keyword_modes: Vec<KeywordMode>,

    /// Run once into the global scope when a document is opened.
    #[serde(default)]
    pub init_script: Option<Script>,
}

fn push_field(fields: &mut Vec<Rc<Field>>, mut field: Field) {
    field.id = FieldId::new(fields.len() as u16);
    fields.push(Rc::new(field));
}

impl Game {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a card field without scripts (builder pattern).
    #[must_use]
    pub fn with_card_field(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.with_card_field_def(Field::new(FieldId(0), name, kind))
    }

    /// Add a card field; its id is assigned from its position.
    #[must_use]
    pub fn with_card_field_def(mut self, field: Field) -> Self {
        push_field(&mut self.card_fields, field);
        self
    }

    #[must_use]
    pub fn with_set_field(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.with_set_field_def(Field::new(FieldId(0), name, kind))
    }

    #[must_use]
    pub fn with_set_field_def(mut self, field: Field) -> Self {
        push_field(&mut self.set_fields, field);
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keywords.push(keyword);
        self
    }

    #[must_use]
    pub fn with_param_type(mut self, param_type: KeywordParamType) -> Self {
        self.keyword_parameter_types.push(param_type);
        self
    }

    #[must_use]
    pub fn with_keyword_mode(mut self, mode: KeywordMode) -> Self {
        self.keyword_modes.push(mode);
        self
    }

    #[must_use]
    pub fn with_init_script(mut self, script: Script) -> Self {
        self.init_script = Some(script);
        self
    }

    #[must_use]
    pub fn card_fields(&self) -> &[Rc<Field>] {
        &self.card_fields
    }

    #[must_use]
    pub fn set_fields(&self) -> &[Rc<Field>] {
        &self.set_fields
    }

    #[must_use]
    pub fn card_field(&self, name: &str) -> Option<&Rc<Field>> {
        self.card_fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn set_field(&self, name: &str) -> Option<&Rc<Field>> {
        self.set_fields.iter().find(|f| f.name == name)
    }

    /// The mode new keywords get: the one marked default, else the first.
    #[must_use]
    pub fn default_keyword_mode(&self) -> Option<&KeywordMode> {
        self.keyword_modes
            .iter()
            .find(|m| m.is_default)
            .or_else(|| self.keyword_modes.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_ids_follow_position() {
        let game = Game::new("g")
            .with_card_field("a", FieldKind::Text)
            .with_card_field("b", FieldKind::Boolean)
            .with_set_field("s", FieldKind::Text);
        let ids: Vec<u16> = game.card_fields().iter().map(|f| f.id.0).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(game.set_field("s").map(|f| f.id), Some(FieldId(0)));
    }

    #[test]
    fn test_default_keyword_mode() {
        let game = Game::new("g")
            .with_keyword_mode(KeywordMode::new("expert"))
            .with_keyword_mode(KeywordMode::new("core").with_default(true));
        assert_eq!(game.default_keyword_mode().map(|m| m.name.as_str()), Some("core"));
        assert!(Game::new("empty").default_keyword_mode().is_none());
    }

    #[test]
    fn test_serde_round_trip() {
        let game = Game::new("g")
            .with_card_field("name", FieldKind::Text)
            .with_init_script(Script::parse("x := 1").unwrap());
        let json = serde_json::to_string(&game).unwrap();
        let back: Game = serde_json::from_str(&json).unwrap();
        assert_eq!(back.card_fields().len(), 1);
        assert_eq!(back.init_script.map(|s| s.source().to_string()), Some("x := 1".into()));
    }
}
