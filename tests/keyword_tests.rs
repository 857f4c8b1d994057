//! Keyword expansion inside a document: field scripts, set keywords and
//! keyword edits.

use std::rc::Rc;

use rust_cardsmith::actions::{
    AddCardAction, AddKeywordAction, ChangeKeywordModeAction, ChangeKeywordTextAction, ValueAction,
};
use rust_cardsmith::data::KeywordText;
use rust_cardsmith::script::Script;
use rust_cardsmith::{
    CardId, Document, EngineConfig, Field, FieldId, FieldKind, Game, Keyword, KeywordMode,
    KeywordParamType, Set, Value,
};

const FLYING: &str = "<kw-A>Flying<atom-reminder> (This creature can fly.)</atom-reminder></kw-A>";

fn game(rules_script: &str) -> Game {
    Game::new("g")
        .with_keyword_mode(KeywordMode::new("core"))
        .with_keyword_mode(KeywordMode::new("expert").with_default(true))
        .with_param_type(KeywordParamType::new("number", "[0-9]+"))
        .with_keyword(Keyword::new("Flying").with_reminder("This creature can fly.").with_mode("core"))
        .with_keyword(
            Keyword::new("Cycling")
                .with_match("Cycling <atom-param>number</atom-param>")
                .with_reminder("{param1}, discard this card: draw a card.")
                .with_mode("expert"),
        )
        .with_card_field("name", FieldKind::Text)
        .with_card_field_def(
            Field::new(FieldId(1), "rules", FieldKind::Text)
                .with_script(Script::parse(rules_script).unwrap()),
        )
}

fn open(rules_script: &str) -> (Document, CardId) {
    let set = Set::new(Rc::new(game(rules_script)));
    let mut doc = Document::new(set, EngineConfig::default()).unwrap();
    let add = AddCardAction::new_cards(doc.set_mut(), 1);
    doc.apply_action(Box::new(add));
    let card = doc.set().cards()[0].id();
    (doc, card)
}

fn write_rules(doc: &mut Document, card: CardId, text: &str) {
    let edit = ValueAction::card(doc.set(), card, FieldId(1), Value::from(text)).unwrap();
    doc.apply_action_unmerged(Box::new(edit));
}

fn rules(doc: &Document, card: CardId) -> String {
    doc.set().card(card).unwrap().value("rules").unwrap().display().to_string()
}

#[test]
fn test_field_script_expands_keywords() {
    let (mut doc, card) = open("expand_keywords(value)");
    write_rules(&mut doc, card, "Flying");
    assert_eq!(rules(&doc, card), FLYING);
    assert!(doc.set().keyword_db().borrow().is_built());
}

#[test]
fn test_parameters_reach_the_reminder() {
    let (mut doc, card) = open("expand_keywords(value)");
    write_rules(&mut doc, card, "Cycling 2");
    assert_eq!(
        rules(&doc, card),
        "<kw-A>Cycling <param-number>2</param-number>\
         <atom-reminder> (2, discard this card: draw a card.)</atom-reminder></kw-A>"
    );
}

#[test]
fn test_keyword_usage_is_recorded() {
    let (mut doc, card) = open("expand_keywords(value)");
    write_rules(&mut doc, card, "Flying, Cycling 1");
    let used: Vec<String> = doc
        .set()
        .card(card)
        .unwrap()
        .keyword_usage()
        .iter()
        .map(|(_, k)| k.clone())
        .collect();
    assert_eq!(used, vec!["Flying".to_string(), "Cycling".to_string()]);
}

#[test]
fn test_default_expand_by_mode() {
    let (mut doc, card) = open(r#"expand_keywords(value, default_expand: { mode != "core" })"#);
    write_rules(&mut doc, card, "Flying");
    assert_eq!(rules(&doc, card), "<kw-a>Flying</kw-a>");
}

#[test]
fn test_adding_set_keyword_refreshes_cards() {
    let (mut doc, card) = open("expand_keywords(value)");
    write_rules(&mut doc, card, "Haste");
    assert_eq!(rules(&doc, card), "Haste");

    let haste = Keyword::new("Haste").with_reminder("It can attack right away.");
    let add = AddKeywordAction::adding(doc.set(), haste);
    doc.apply_action(Box::new(add));
    assert_eq!(
        rules(&doc, card),
        "<kw-A>Haste<atom-reminder> (It can attack right away.)</atom-reminder></kw-A>"
    );

    assert_eq!(doc.undo(), Some("Add keyword".to_string()));
    assert_eq!(rules(&doc, card), "Haste");
}

#[test]
fn test_keyword_edit_rebuilds_database() {
    let (mut doc, card) = open("expand_keywords(value)");
    let add = AddKeywordAction::adding(doc.set(), Keyword::new("Haste").with_reminder("Fast."));
    doc.apply_action(Box::new(add));
    write_rules(&mut doc, card, "Haste");
    assert!(doc.set().keyword_db().borrow().is_built());

    let edit = ChangeKeywordTextAction::new(doc.set(), 0, KeywordText::Reminder, "Very fast.").unwrap();
    doc.apply_action(Box::new(edit));
    assert!(doc.set().keyword_db().borrow().is_built());
    assert_eq!(
        rules(&doc, card),
        "<kw-A>Haste<atom-reminder> (Very fast.)</atom-reminder></kw-A>"
    );

    doc.undo();
    assert_eq!(
        rules(&doc, card),
        "<kw-A>Haste<atom-reminder> (Fast.)</atom-reminder></kw-A>"
    );
}

#[test]
fn test_mode_change_affects_policy() {
    let (mut doc, card) = open(r#"expand_keywords(value, default_expand: { mode != "core" })"#);
    let add = AddKeywordAction::new_keyword(doc.set());
    doc.apply_action(Box::new(add));
    let name = ChangeKeywordTextAction::new(doc.set(), 0, KeywordText::Name, "Reach").unwrap();
    doc.apply_action(Box::new(name));
    let reminder = ChangeKeywordTextAction::new(doc.set(), 0, KeywordText::Reminder, "Blocks fliers.").unwrap();
    doc.apply_action(Box::new(reminder));
    write_rules(&mut doc, card, "Reach");
    // new keywords start in the default "expert" mode
    assert_eq!(
        rules(&doc, card),
        "<kw-A>Reach<atom-reminder> (Blocks fliers.)</atom-reminder></kw-A>"
    );

    doc.apply_action(Box::new(ChangeKeywordModeAction::new(0, "core")));
    assert_eq!(rules(&doc, card), "<kw-a>Reach</kw-a>");
}

#[test]
fn test_user_choice_survives_reexpansion() {
    let (mut doc, card) = open("expand_keywords(value)");
    write_rules(&mut doc, card, "<kw-0>Flying</kw-0> and Flying");
    assert_eq!(rules(&doc, card), format!("<kw-0>Flying</kw-0> and {FLYING}"));
}

#[test]
fn test_expand_keywords_rule_in_init_script() {
    let game = game("expand(value)")
        .with_init_script(Script::parse("expand := expand_keywords_rule()").unwrap());
    let mut doc = Document::new(Set::new(Rc::new(game)), EngineConfig::default()).unwrap();
    let add = AddCardAction::new_cards(doc.set_mut(), 1);
    doc.apply_action(Box::new(add));
    let card = doc.set().cards()[0].id();
    write_rules(&mut doc, card, "Flying");
    assert_eq!(rules(&doc, card), FLYING);
}
