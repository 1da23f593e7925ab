//! Integration tests for inheritance and extents through the full pipeline

use ormeta_engine::compile;
use ormeta_foundation::{CompileOptions, ErrorCategory, ErrorKind, ExtentMode};
use ormeta_model::{Tag, TypeRecord};

fn pk() -> Tag {
    Tag::new().with("primarykey", "true")
}

// =============================================================================
// Merged Views
// =============================================================================

#[test]
fn inherited_members_come_first() {
    let set = compile(
        &[
            TypeRecord::class("A").persistent().field("id", "int", pk()),
            TypeRecord::class("B")
                .extends("A")
                .persistent()
                .field("name", "string", Tag::new()),
        ],
        &CompileOptions::default(),
    )
    .unwrap();
    let b = set.entity("B").unwrap();
    let names: Vec<_> = b.attributes.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name"]);
    assert_eq!(b.attributes[0].declared_by, "A");
}

#[test]
fn non_persistent_intermediate_contributes_members() {
    let set = compile(
        &[
            TypeRecord::class("A").persistent().field("id", "int", pk()),
            TypeRecord::class("Mid").extends("A").field("note", "string", Tag::new()),
            TypeRecord::class("C").extends("Mid").persistent(),
        ],
        &CompileOptions::default(),
    )
    .unwrap();
    assert!(set.entity("Mid").is_none());
    assert!(set.entity("C").unwrap().attribute("note").is_some());
    assert_eq!(set.entity("A").unwrap().extents, vec!["C"]);
}

#[test]
fn contract_members_are_merged() {
    let set = compile(
        &[
            TypeRecord::interface("Named").field("label", "string", Tag::new()),
            TypeRecord::class("A")
                .implements("Named")
                .persistent()
                .field("id", "int", pk()),
        ],
        &CompileOptions::default(),
    )
    .unwrap();
    let a = set.entity("A").unwrap();
    assert_eq!(a.attributes[0].name, "label");
    assert_eq!(a.attributes[1].name, "id");
}

#[test]
fn override_and_suppression_reach_descendants() {
    let set = compile(
        &[
            TypeRecord::class("A")
                .persistent()
                .field("id", "int", pk())
                .field("code", "string", Tag::new())
                .field("legacy", "string", Tag::new()),
            TypeRecord::class("B")
                .extends("A")
                .persistent()
                .modify_inherited(Tag::new().with("name", "code").with("column", "B_CODE"))
                .modify_inherited(Tag::new().with("name", "legacy").with("ignore", "true")),
            TypeRecord::class("C").extends("B").persistent(),
        ],
        &CompileOptions::default(),
    )
    .unwrap();

    assert_eq!(set.entity("A").unwrap().attribute("code").unwrap().column, "code");
    for name in ["B", "C"] {
        let entity = set.entity(name).unwrap();
        assert_eq!(entity.attribute("code").unwrap().column, "B_CODE");
        assert!(entity.attribute("legacy").is_none());
    }
}

#[test]
fn redeclaring_without_override_is_a_uniqueness_error() {
    let err = compile(
        &[
            TypeRecord::class("A").persistent().field("x", "int", Tag::new()),
            TypeRecord::class("B")
                .extends("A")
                .persistent()
                .field("x", "int", Tag::new()),
        ],
        &CompileOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Uniqueness);
}

#[test]
fn override_without_target_is_an_override_error() {
    let err = compile(
        &[
            TypeRecord::class("A").persistent(),
            TypeRecord::class("B")
                .extends("A")
                .persistent()
                .modify_inherited(Tag::new().with("name", "ghost").with("column", "G")),
        ],
        &CompileOptions::lenient(),
    )
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::OverrideTargetMissing { .. }));
}

#[test]
fn inheritance_cycle_is_a_graph_error() {
    let err = compile(
        &[
            TypeRecord::class("A").extends("B").persistent(),
            TypeRecord::class("B").extends("A").persistent(),
        ],
        &CompileOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InheritanceCycle(_)));
}

#[test]
fn pinned_attribute_moves_to_front() {
    let set = compile(
        &[TypeRecord::class("A")
            .persistent()
            .field("a", "int", Tag::new())
            .field("b", "int", Tag::new())
            .field("c", "int", Tag::new().with("id", "1"))],
        &CompileOptions::default(),
    )
    .unwrap();
    let names: Vec<_> = set.entity("A").unwrap().attributes.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["c", "a", "b"]);
}

// =============================================================================
// Extents
// =============================================================================

fn extent_records() -> Vec<TypeRecord> {
    vec![
        TypeRecord::class("A").persistent().field("id", "int", pk()),
        TypeRecord::class("Mid").extends("A"),
        TypeRecord::class("C").extends("Mid").persistent(),
        TypeRecord::class("D").extends("A").persistent(),
    ]
}

#[test]
fn auto_mode_walks_through_intermediates() {
    let set = compile(&extent_records(), &CompileOptions::default()).unwrap();
    assert_eq!(set.entity("A").unwrap().extents, vec!["C", "D"]);
}

#[test]
fn explicit_mode_stops_at_intermediates() {
    let options = CompileOptions::default().with_extent_mode(ExtentMode::Explicit);
    let set = compile(&extent_records(), &options).unwrap();
    assert_eq!(set.entity("A").unwrap().extents, vec!["D"]);
}

#[test]
fn extent_class_must_be_a_persistent_descendant() {
    let mut records = extent_records();
    records[0] = TypeRecord::class("A")
        .persistent()
        .field("id", "int", pk())
        .extent_class("Unrelated");
    records.push(TypeRecord::class("Unrelated").persistent());
    let err = compile(&records, &CompileOptions::default()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Reference);
}
