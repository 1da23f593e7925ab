//! Integration tests for MessagePack descriptor snapshots

use ormeta_engine::compile;
use ormeta_foundation::{CompileOptions, ErrorCategory};
use ormeta_model::{Tag, TypeRecord};
use ormeta_runtime::{
    CompileUnit, Session, from_snapshot, load_snapshot, save_snapshot, to_snapshot,
    units_from_snapshot, units_to_snapshot,
};

fn library() -> Vec<TypeRecord> {
    vec![
        TypeRecord::class("lib.Item")
            .with_class_tag(Tag::new().with("table", "ITEM").with("attributes", "cache=lru"))
            .field("id", "long", Tag::new().with("primarykey", "true"))
            .field("title", "string", Tag::new().with("indexed", "true")),
        TypeRecord::class("lib.Book")
            .extends("lib.Item")
            .persistent()
            .field("isbn", "string", Tag::new()),
        TypeRecord::class("lib.Shelf")
            .persistent()
            .field("id", "long", Tag::new().with("primarykey", "true"))
            .collection(
                "items",
                "lib.Item",
                Tag::new()
                    .with("element-class-ref", "lib.Item")
                    .with("indirection-table", "SHELF_ITEM"),
            ),
    ]
}

#[test]
fn two_compilations_give_identical_bytes() {
    let options = CompileOptions::default();
    let first = to_snapshot(&compile(&library(), &options).unwrap()).unwrap();
    let second = to_snapshot(&compile(&library(), &options).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn snapshot_restores_descriptors() {
    let set = compile(&library(), &CompileOptions::default()).unwrap();
    let restored = from_snapshot(&to_snapshot(&set).unwrap()).unwrap();
    assert_eq!(restored, set);
    assert_eq!(restored.entity("lib.Item").unwrap().bag.get("cache"), Some("lru"));
    assert!(restored.table("SHELF_ITEM").unwrap().indirection);
}

#[test]
fn snapshot_file_roundtrip() {
    let set = compile(&library(), &CompileOptions::default().with_catalog("library")).unwrap();
    let path = std::env::temp_dir().join("ormeta_integration_snapshot.msgpack");

    save_snapshot(&set, &path).unwrap();
    let restored = load_snapshot(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(restored.catalog, "library");
    assert_eq!(restored, set);
}

#[test]
fn truncated_snapshot_is_rejected() {
    let bytes = to_snapshot(&compile(&library(), &CompileOptions::default()).unwrap()).unwrap();
    let err = from_snapshot(&bytes[..bytes.len() / 2]).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Io);
}

#[test]
fn unit_snapshots_skip_failed_units() {
    let mut session = Session::new(CompileOptions::default());
    session.add_unit(CompileUnit::new("library", library())).unwrap();
    session
        .add_unit(CompileUnit::new(
            "broken",
            vec![TypeRecord::class("X").extends("Nowhere").persistent()],
        ))
        .unwrap();

    let outcomes = session.compile();
    let units = units_from_snapshot(&units_to_snapshot(&outcomes).unwrap()).unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].unit, "library");
    assert_eq!(Some(&units[0].descriptors), outcomes[0].descriptors());
}
