//! Integration tests for compilation sessions

use ormeta_foundation::{CompileOptions, ErrorCategory, ExtentMode};
use ormeta_model::{Tag, TypeRecord};
use ormeta_runtime::{CompileUnit, Session};

fn hierarchy() -> Vec<TypeRecord> {
    vec![
        TypeRecord::class("A")
            .persistent()
            .field("id", "int", Tag::new().with("primarykey", "true")),
        TypeRecord::class("Mid").extends("A"),
        TypeRecord::class("C").extends("Mid").persistent(),
    ]
}

#[test]
fn empty_session_compiles_nothing() {
    let session = Session::new(CompileOptions::default());
    assert!(session.is_empty());
    assert!(session.compile().is_empty());
}

#[test]
fn outcomes_follow_unit_order() {
    let mut session = Session::new(CompileOptions::default().with_catalog("units"));
    for name in ["one", "two", "three"] {
        session.add_unit(CompileUnit::new(name, hierarchy())).unwrap();
    }
    assert_eq!(session.len(), 3);
    assert_eq!(session.options().catalog, "units");

    let outcomes = session.compile();
    let names: Vec<_> = outcomes.iter().map(|o| o.unit.as_str()).collect();
    assert_eq!(names, vec!["one", "two", "three"]);
    assert!(outcomes.iter().all(|o| o.descriptors().unwrap().catalog == "units"));
}

#[test]
fn units_are_isolated() {
    let mut session = Session::new(CompileOptions::default());
    session
        .add_unit(CompileUnit::new(
            "dangling",
            vec![TypeRecord::class("B")
                .persistent()
                .reference("a", "A", Tag::new())],
        ))
        .unwrap();
    session.add_unit(CompileUnit::new("complete", hierarchy())).unwrap();

    let outcomes = session.compile();
    assert_eq!(outcomes[0].error().unwrap().category(), ErrorCategory::Graph);
    assert!(outcomes[1].is_ok());
}

#[test]
fn option_sets_do_not_interfere() {
    let mut session = Session::new(CompileOptions::default());
    session.add_unit(CompileUnit::new("h", hierarchy())).unwrap();

    let auto = CompileOptions::default();
    let explicit = CompileOptions::default().with_extent_mode(ExtentMode::Explicit);
    let runs = session.compile_with(&[auto.clone(), explicit, auto]);

    let extents = |run: usize| {
        runs[run][0]
            .descriptors()
            .unwrap()
            .entity("A")
            .unwrap()
            .extents
            .clone()
    };
    assert_eq!(extents(0), vec!["C"]);
    assert!(extents(1).is_empty());
    assert_eq!(runs[0], runs[2]);
}
