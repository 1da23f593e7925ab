//! Integration tests for the DeclarationAnalyzer
//!
//! Tests that raw records become typed declarations and that malformed
//! values are reported as value errors.

use ormeta_foundation::{ErrorCategory, ErrorKind, IsolationLevel, ProcedureKind, StorageType};
use ormeta_model::{
    ArgumentDecl, ArgumentSource, DeclarationAnalyzer, EntityDecl, MemberDecl, ProcedureTag, Tag,
    TypeKind, TypeRecord,
};

fn analyze(record: &TypeRecord) -> ormeta_foundation::Result<EntityDecl> {
    DeclarationAnalyzer::new().analyze(record)
}

// =============================================================================
// Records
// =============================================================================

#[test]
fn record_without_class_tag_is_not_persistent() {
    let decl = analyze(&TypeRecord::class("acme.Base").field("x", "int", Tag::new())).unwrap();
    assert!(!decl.persistent);
    assert_eq!(decl.simple_name, "Base");
    assert_eq!(decl.members.len(), 1);
}

#[test]
fn interface_keeps_kind_and_contracts() {
    let decl = analyze(
        &TypeRecord::interface("acme.Named")
            .implements("acme.Labelled")
            .persistent(),
    )
    .unwrap();
    assert_eq!(decl.kind, TypeKind::Interface);
    assert_eq!(decl.contracts, vec!["acme.Labelled"]);
}

#[test]
fn class_tag_values_reach_options() {
    let decl = analyze(&TypeRecord::class("A").with_class_tag(
        Tag::new()
            .with("table", "T_A")
            .with("isolation-level", "serializable")
            .with("generate-table-info", "false")
            .with("attributes", "cache=lru"),
    ))
    .unwrap();
    assert_eq!(decl.options.table.as_deref(), Some("T_A"));
    assert_eq!(decl.options.isolation, IsolationLevel::Serializable);
    assert!(!decl.options.generate_table_info);
    assert_eq!(decl.options.bag.get("cache"), Some("lru"));
}

#[test]
fn member_order_is_anonymous_then_members() {
    let mut analyzer = DeclarationAnalyzer::new();
    let decl = analyzer
        .analyze(
            &TypeRecord::class("A")
                .persistent()
                .field("b", "string", Tag::new())
                .anonymous_field(Tag::new().with("name", "a").with("jdbc-type", "INTEGER")),
        )
        .unwrap();
    assert_eq!(decl.anonymous[0].name(), "a");
    assert_eq!(decl.members[0].name(), "b");
    assert!(decl.anonymous[0].seq() < decl.members[0].seq());
}

#[test]
fn sequence_numbers_continue_across_records() {
    let decls = DeclarationAnalyzer::new()
        .analyze_all(&[
            TypeRecord::class("A").persistent().field("x", "int", Tag::new()),
            TypeRecord::class("B").persistent().field("y", "int", Tag::new()),
        ])
        .unwrap();
    assert!(decls[0].members[0].seq() < decls[1].members[0].seq());
}

#[test]
fn field_jdbc_type_wins_over_declared_type() {
    let decl = analyze(
        &TypeRecord::class("A")
            .persistent()
            .field("code", "int", Tag::new().with("jdbc-type", "VARCHAR").with("length", "12")),
    )
    .unwrap();
    let MemberDecl::Attribute(attr) = &decl.members[0] else {
        panic!("expected an attribute");
    };
    assert_eq!(attr.storage, StorageType::Varchar);
    assert_eq!(attr.length, Some(12));
}

#[test]
fn malformed_numbers_are_value_errors() {
    let err = analyze(
        &TypeRecord::class("A")
            .persistent()
            .field("code", "string", Tag::new().with("length", "many")),
    )
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidValue { .. }));
}

// =============================================================================
// Indexes
// =============================================================================

#[test]
fn named_index_lists_fields() {
    let decl = analyze(
        &TypeRecord::class("A").persistent().index(
            Tag::new()
                .with("name", "idx")
                .with("fields", "x, y")
                .with("unique", "true"),
        ),
    )
    .unwrap();
    let index = &decl.indexes[0];
    assert_eq!(index.name.as_deref(), Some("idx"));
    assert_eq!(index.fields, vec!["x", "y"]);
    assert!(index.unique);
}

#[test]
fn index_without_fields_is_rejected() {
    let err = analyze(&TypeRecord::class("A").persistent().index(Tag::new().with("name", "idx")))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingValue { .. }));
}

// =============================================================================
// Procedures
// =============================================================================

#[test]
fn explicit_procedure_arguments() {
    let decl = analyze(
        &TypeRecord::class("A").persistent().procedure(
            ProcedureTag::new(ProcedureKind::Update, Tag::new().with("name", "upd_a"))
                .runtime(Tag::new().with("field-ref", "x").with("return", "true"))
                .constant("42"),
        ),
    )
    .unwrap();
    let proc = &decl.procedures[0];
    assert_eq!(proc.source, ArgumentSource::Explicit);
    assert_eq!(
        proc.arguments,
        vec![
            ArgumentDecl::Runtime {
                field: Some("x".to_string()),
                returns: true,
            },
            ArgumentDecl::Constant("42".to_string()),
        ]
    );
}

#[test]
fn insert_cannot_take_primary_keys_only() {
    let err = analyze(&TypeRecord::class("A").persistent().procedure(ProcedureTag::new(
        ProcedureKind::Insert,
        Tag::new().with("name", "ins_a").with("include-pk-only", "true"),
    )))
    .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Value);

    let decl = analyze(&TypeRecord::class("A").persistent().procedure(ProcedureTag::new(
        ProcedureKind::Delete,
        Tag::new().with("name", "del_a").with("include-pk-only", "true"),
    )))
    .unwrap();
    assert_eq!(decl.procedures[0].source, ArgumentSource::PrimaryKeys);
}

#[test]
fn synthesized_arguments_exclude_explicit_ones() {
    let err = analyze(
        &TypeRecord::class("A").persistent().procedure(
            ProcedureTag::new(
                ProcedureKind::Update,
                Tag::new().with("name", "upd_a").with("include-all-fields", "true"),
            )
            .constant("1"),
        ),
    )
    .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Value);
}

#[test]
fn procedure_needs_a_name() {
    let err = analyze(
        &TypeRecord::class("A")
            .persistent()
            .procedure(ProcedureTag::new(ProcedureKind::Delete, Tag::new())),
    )
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingValue { .. }));
}
