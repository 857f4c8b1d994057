//! Dependency tracking through a document: which edits re-evaluate which
//! values, and consistency of derived values over random edit sequences.

use std::rc::Rc;

use proptest::prelude::*;

use rust_cardsmith::actions::{AddCardAction, ValueAction};
use rust_cardsmith::script::Script;
use rust_cardsmith::{
    CardId, DependencyTracker, Dependent, Document, EngineConfig, Field, FieldId, FieldKind, Game,
    Set, Source, Value,
};

// =============================================================================
// Fixtures
// =============================================================================

const NAME: u16 = 0;
const POWER: u16 = 1;

fn scripted(id: u16, name: &str, script: &str) -> Field {
    Field::new(FieldId(id), name, FieldKind::Text).with_script(Script::parse(script).unwrap())
}

fn game() -> Game {
    Game::new("deps")
        .with_card_field("name", FieldKind::Text)
        .with_card_field("power", FieldKind::Text)
        .with_card_field_def(scripted(2, "title", "to_upper(card.name)"))
        .with_card_field_def(scripted(3, "count", "number_of_items(in: set)"))
        .with_card_field_def(scripted(
            4,
            "rank",
            "position(of: card, in: set, order_by: { card.name })",
        ))
        .with_set_field("edition", FieldKind::Text)
        .with_card_field_def(scripted(5, "footer", r#"set.edition + " #" + card.count"#))
}

fn open() -> Document {
    Document::new(Set::new(Rc::new(game())), EngineConfig::default()).unwrap()
}

fn add_card(doc: &mut Document) -> CardId {
    let action = AddCardAction::new_cards(doc.set_mut(), 1);
    let id = action.card_ids().next().unwrap();
    doc.apply_action(Box::new(action));
    id
}

fn rename(doc: &mut Document, card: CardId, name: &str) {
    let action = ValueAction::card(doc.set(), card, FieldId(NAME), Value::from(name)).unwrap();
    doc.apply_action(Box::new(action));
}

fn display(doc: &Document, card: CardId, field: &str) -> String {
    doc.set().card(card).unwrap().value(field).unwrap().display().to_string()
}

fn name_source(card: CardId) -> Source {
    Source::CardField {
        card: Some(card),
        field: "name".into(),
    }
}

// =============================================================================
// Invalidation
// =============================================================================

#[test]
fn test_unread_field_triggers_nothing() {
    let mut doc = open();
    let card = add_card(&mut doc);
    assert!(doc.dependents("power").is_empty());

    doc.set_mut().mark_changed(Source::CardField {
        card: Some(card),
        field: "power".into(),
    });
    assert_eq!(doc.refresh(), 0);
}

#[test]
fn test_read_field_triggers_its_readers() {
    let mut doc = open();
    let a = add_card(&mut doc);
    let b = add_card(&mut doc);

    // title of `a` reads its own name; rank reads the name of every card
    doc.set_mut().mark_changed(name_source(a));
    assert_eq!(doc.refresh(), 3);

    let readers = doc.dependents("name");
    assert!(readers.contains(&Dependent::CardValue { card: a, field: FieldId(2) }));
    assert!(readers.contains(&Dependent::CardValue { card: b, field: FieldId(4) }));
    assert!(!readers.contains(&Dependent::CardValue { card: b, field: FieldId(3) }));
}

#[test]
fn test_rank_follows_other_cards() {
    let mut doc = open();
    let bolt = add_card(&mut doc);
    let ante = add_card(&mut doc);
    let cat = add_card(&mut doc);
    rename(&mut doc, bolt, "Bolt");
    rename(&mut doc, ante, "Ante");
    rename(&mut doc, cat, "Cat");
    assert_eq!(display(&doc, ante, "rank"), "0");
    assert_eq!(display(&doc, bolt, "rank"), "1");
    assert_eq!(display(&doc, cat, "rank"), "2");

    // renaming one card moves the others
    rename(&mut doc, ante, "Zap");
    assert_eq!(display(&doc, bolt, "rank"), "0");
    assert_eq!(display(&doc, cat, "rank"), "1");
    assert_eq!(display(&doc, ante, "rank"), "2");

    doc.undo();
    assert_eq!(display(&doc, bolt, "rank"), "1");
}

fn open_ranked_by(key: &str) -> Document {
    let game = Game::new("index")
        .with_card_field("name", FieldKind::Text)
        .with_card_field_def(scripted(
            1,
            "rank",
            &format!("position(of: card, in: set, order_by: {{ {key} }})"),
        ));
    Document::new(Set::new(Rc::new(game)), EngineConfig::default()).unwrap()
}

#[test]
fn test_rank_by_indexed_field_follows_other_cards() {
    for key in [r#"card["name"]"#, r#"field := "name"; card[field]"#] {
        let mut doc = open_ranked_by(key);
        let ante = add_card(&mut doc);
        let bolt = add_card(&mut doc);
        rename(&mut doc, ante, "Ante");
        rename(&mut doc, bolt, "Bolt");
        assert_eq!(display(&doc, bolt, "rank"), "1", "{key}");

        rename(&mut doc, ante, "Zap");
        assert_eq!(display(&doc, bolt, "rank"), "0", "{key}");
        assert_eq!(display(&doc, ante, "rank"), "1", "{key}");
        assert_eq!(
            doc.evaluate_for_card(bolt, &format!("position(of: card, in: set, order_by: {{ {key} }})")),
            Ok(Value::from(0))
        );
    }
}

#[test]
fn test_set_field_reaches_cards() {
    let mut doc = open();
    let a = add_card(&mut doc);
    let edition = ValueAction::set(doc.set(), FieldId(0), Value::from("Alpha")).unwrap();
    doc.apply_action(Box::new(edition));
    assert_eq!(display(&doc, a, "footer"), "Alpha #1");

    // a changed count is a changed display, which reaches the footer
    add_card(&mut doc);
    assert_eq!(display(&doc, a, "footer"), "Alpha #2");
    assert!(doc
        .dependents("edition")
        .contains(&Dependent::CardValue { card: a, field: FieldId(5) }));
}

#[test]
fn test_tracker_card_independent_sources() {
    let mut tracker = DependencyTracker::new();
    let rank = Dependent::CardValue { card: CardId(1), field: FieldId(4) };
    let title = Dependent::CardValue { card: CardId(3), field: FieldId(2) };
    tracker.record(
        rank,
        [Source::CardField { card: None, field: "name".into() }, Source::CardList],
    );
    tracker.record(title, [name_source(CardId(3))]);

    assert!(tracker.stale_after(&name_source(CardId(7))).contains(&rank));
    assert!(!tracker.stale_after(&name_source(CardId(7))).contains(&title));
    let any_name = tracker.stale_after(&Source::CardField { card: None, field: "name".into() });
    assert!(any_name.contains(&rank) && any_name.contains(&title));

    tracker.forget_card(CardId(3));
    assert!(!tracker.is_recorded(title));
    assert_eq!(tracker.dependents_of(&Source::CardList), vec![rank]);
}

// =============================================================================
// Random edit sequences
// =============================================================================

#[derive(Clone, Debug)]
enum Edit {
    Add,
    Remove(usize),
    Rename(usize, String),
    Undo,
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        2 => Just(Edit::Add),
        1 => any::<usize>().prop_map(Edit::Remove),
        3 => (any::<usize>(), "[a-z]{0,6}").prop_map(|(i, s)| Edit::Rename(i, s)),
        1 => Just(Edit::Undo),
    ]
}

fn apply(doc: &mut Document, edit: &Edit) {
    let ids: Vec<CardId> = doc.set().cards().iter().map(|c| c.id()).collect();
    match edit {
        Edit::Add => {
            add_card(doc);
        }
        Edit::Remove(i) if !ids.is_empty() => {
            let id = ids[i % ids.len()];
            if let Some(action) = AddCardAction::removing(doc.set(), &[id]) {
                doc.apply_action(Box::new(action));
            }
        }
        Edit::Rename(i, name) if !ids.is_empty() => rename(doc, ids[i % ids.len()], name),
        Edit::Undo => {
            doc.undo();
        }
        _ => {}
    }
}

fn assert_consistent(doc: &Document) {
    let count = doc.set().cards().len().to_string();
    for card in doc.set().cards() {
        let name = card.value("name").unwrap().display().to_string();
        assert_eq!(card.value("title").unwrap().display().to_string(), name.to_uppercase());
        assert_eq!(card.value("count").unwrap().display().to_string(), count);
    }
    assert!(!doc.set().has_pending());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_derived_values_stay_consistent(edits in prop::collection::vec(edit_strategy(), 1..24)) {
        let mut doc = open();
        for edit in &edits {
            apply(&mut doc, edit);
            assert_consistent(&doc);
        }
        while doc.undo().is_some() {
            assert_consistent(&doc);
        }
        prop_assert!(doc.set().cards().is_empty());
        prop_assert!(doc.is_saved());
    }
}
