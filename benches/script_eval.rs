use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_cardsmith::actions::{AddCardAction, ValueAction};
use rust_cardsmith::script::{parse, ScriptEngine};
use rust_cardsmith::{Document, EngineConfig, Field, FieldId, FieldKind, Game, Set, Script, Value};

const SCRIPTS: &[(&str, &str)] = &[
    ("arithmetic", "1 + 2 * 3 - 4 / 2"),
    ("string", r#"to_upper("lightning " + "bolt")"#),
    ("sort_spec", r#"sort("2RWUU", order: "XYZ<0123456789>(WUBRG)")"#),
    ("replace", r#"replace("first strike, first strike", match: "first", replace: "double")"#),
    ("closure", "f := { input * 2 }\nf(f(f(21)))"),
];

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, source) in SCRIPTS {
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, source| {
            b.iter(|| parse(black_box(source)).expect("script parses"));
        });
    }
    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let engine = ScriptEngine::new(EngineConfig::default());
    let mut group = c.benchmark_group("evaluate");
    for (name, source) in SCRIPTS {
        let expr = parse(source).expect("script parses");
        group.bench_with_input(BenchmarkId::from_parameter(name), &expr, |b, expr| {
            b.iter(|| {
                let mut ctx = engine.context();
                engine.evaluate(black_box(expr), &mut ctx).expect("script runs")
            });
        });
    }
    group.finish();
}

fn bench_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("refresh");
    for cards in [10_usize, 100] {
        let game = Game::new("bench")
            .with_card_field("name", FieldKind::Text)
            .with_card_field_def(
                Field::new(FieldId(1), "title", FieldKind::Text)
                    .with_script(Script::parse("to_upper(card.name)").expect("script parses")),
            );
        let mut doc = Document::new(Set::new(Rc::new(game)), EngineConfig::default())
            .expect("document opens");
        let add = AddCardAction::new_cards(doc.set_mut(), cards);
        doc.apply_action(Box::new(add));
        let first = doc.set().cards()[0].id();

        group.bench_with_input(BenchmarkId::new("edit_one_card", cards), &cards, |b, _| {
            b.iter(|| {
                let edit = ValueAction::card(doc.set(), first, FieldId(0), Value::from("Shock"))
                    .expect("card exists");
                doc.apply_action_unmerged(Box::new(edit));
                doc.undo();
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_evaluate, bench_refresh);
criterion_main!(benches);
