//! Reference scenarios covering anonymous attributes, inheritance, index
//! replacement, indirection tables, nested flattening, and shared tables.

use ormeta_engine::compile;
use ormeta_foundation::{AccessMode, CompileOptions, StorageType};
use ormeta_model::{Tag, TypeRecord};

fn pk() -> Tag {
    Tag::new().with("primarykey", "true")
}

#[test]
fn anonymous_attribute_on_root_entity() {
    let set = compile(
        &[TypeRecord::class("A")
            .persistent()
            .anonymous_field(Tag::new().with("name", "attr").with("jdbc-type", "INTEGER"))],
        &CompileOptions::default(),
    )
    .unwrap();

    let a = set.entity("A").unwrap();
    assert_eq!(a.table, "A");
    assert_eq!(a.attributes.len(), 1);
    let attr = &a.attributes[0];
    assert_eq!(attr.name, "attr");
    assert_eq!(attr.column, "attr");
    assert_eq!(attr.storage, StorageType::Integer);
    assert_eq!(attr.access, AccessMode::Anonymous);
}

#[test]
fn subtype_inherits_primary_key_and_becomes_extent() {
    let set = compile(
        &[
            TypeRecord::class("A").persistent().field("attr", "int", pk()),
            TypeRecord::class("B").extends("A").persistent(),
        ],
        &CompileOptions::default(),
    )
    .unwrap();

    let b = set.entity("B").unwrap();
    let attr = b.attribute("attr").unwrap();
    assert!(attr.primary_key);
    assert_eq!(attr.declared_by, "A");
    assert_eq!(set.entity("A").unwrap().extents, vec!["B"]);
    assert!(b.extents.is_empty());
}

#[test]
fn redeclared_index_replaces_inherited_fields() {
    let set = compile(
        &[
            TypeRecord::class("A")
                .persistent()
                .field("attr1", "int", Tag::new().with("indexed", "true"))
                .field("attr2", "int", Tag::new())
                .index(Tag::new().with("fields", "attr1")),
            TypeRecord::class("B")
                .extends("A")
                .persistent()
                .index(Tag::new().with("name", "idx").with("fields", "attr1,attr2")),
            TypeRecord::class("C")
                .extends("B")
                .persistent()
                .modify_inherited(Tag::new().with("name", "attr2").with("ignore", "true"))
                .index(Tag::new().with("name", "idx").with("fields", "attr1")),
        ],
        &CompileOptions::default(),
    )
    .unwrap();

    let b_idx = set.entity("B").unwrap().index("idx").unwrap();
    assert_eq!(b_idx.fields, vec!["attr1", "attr2"]);

    let c = set.entity("C").unwrap();
    assert!(c.attribute("attr2").is_none());
    assert_eq!(c.index("idx").unwrap().fields, vec!["attr1"]);
    assert_eq!(c.indexes.len(), 2);
}

#[test]
fn indirection_keys_reference_each_other() {
    let collection = |element: &str| {
        Tag::new()
            .with("element-class-ref", element)
            .with("indirection-table", "A_B")
    };
    let set = compile(
        &[
            TypeRecord::class("A")
                .persistent()
                .field("id", "int", pk())
                .collection("bs", "B", collection("B")),
            TypeRecord::class("B")
                .persistent()
                .field("id", "int", pk())
                .collection("as", "A", collection("A")),
        ],
        &CompileOptions::default(),
    )
    .unwrap();

    let bs = set.entity("A").unwrap().association("bs").unwrap();
    let as_ = set.entity("B").unwrap().association("as").unwrap();
    let bs_spec = bs.collection().unwrap();
    let as_spec = as_.collection().unwrap();

    assert_eq!(bs.foreign_keys, vec!["A_id"]);
    assert_eq!(bs_spec.remote_foreign_keys, vec!["B_id"]);
    assert_eq!(as_.foreign_keys, bs_spec.remote_foreign_keys);
    assert_eq!(as_spec.remote_foreign_keys, bs.foreign_keys);

    let table = set.table("A_B").unwrap();
    let columns: Vec<_> = table.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(columns, vec!["A_id", "B_id"]);
    assert_eq!(table.foreign_keys.len(), 2);
}

#[test]
fn nested_attribute_column_can_be_overridden() {
    let records = |column: Option<&str>| {
        let mut a = TypeRecord::class("A")
            .persistent()
            .nested("attr", "Bee", Tag::new());
        if let Some(column) = column {
            a = a.modify_nested(Tag::new().with("name", "attr::id").with("column", column));
        }
        vec![TypeRecord::class("Bee").field("id", "int", Tag::new()), a]
    };

    let set = compile(&records(None), &CompileOptions::default()).unwrap();
    let flat = set.entity("A").unwrap().attribute("attr::id").unwrap();
    assert_eq!(flat.column, "attr_id");
    assert_eq!(flat.storage, StorageType::Integer);

    let set = compile(&records(Some("ID")), &CompileOptions::default()).unwrap();
    assert_eq!(set.entity("A").unwrap().attribute("attr::id").unwrap().column, "ID");
    assert!(set.entity("Bee").is_none());
}

#[test]
fn two_entities_share_one_table() {
    let table = || Tag::new().with("table", "TABLE");
    let set = compile(
        &[
            TypeRecord::class("A")
                .with_class_tag(table())
                .field("aid", "int", Tag::new()),
            TypeRecord::class("B")
                .with_class_tag(table())
                .field("bid", "int", Tag::new()),
        ],
        &CompileOptions::default(),
    )
    .unwrap();

    assert_eq!(set.entities.len(), 2);
    assert_eq!(set.entity("A").unwrap().table, "TABLE");
    assert_eq!(set.entity("B").unwrap().table, "TABLE");
    assert_eq!(set.tables.len(), 1);
    let merged = &set.tables[0];
    assert_eq!(merged.name, "TABLE");
    let columns: Vec<_> = merged.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(columns, vec!["aid", "bid"]);
    assert_eq!(merged.entities, vec!["A", "B"]);
}
