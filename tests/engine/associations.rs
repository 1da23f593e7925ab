//! Integration tests for association resolution through the full pipeline

use ormeta_engine::{DescriptorSet, compile};
use ormeta_foundation::{AccessMode, CompileOptions, ErrorCategory, ErrorKind, OrderDirection};
use ormeta_model::{Tag, TypeRecord};

fn pk() -> Tag {
    Tag::new().with("primarykey", "true")
}

fn customer() -> TypeRecord {
    TypeRecord::class("shop.Customer")
        .persistent()
        .field("id", "long", pk())
        .field("name", "string", Tag::new())
}

fn compiled(records: &[TypeRecord]) -> DescriptorSet {
    compile(records, &CompileOptions::default()).unwrap()
}

// =============================================================================
// References
// =============================================================================

#[test]
fn implicit_reference_key_is_an_anonymous_attribute() {
    let set = compiled(&[
        customer(),
        TypeRecord::class("shop.Order")
            .persistent()
            .field("id", "long", pk())
            .reference("customer", "shop.Customer", Tag::new()),
    ]);
    let order = set.entity("shop.Order").unwrap();
    let assoc = order.association("customer").unwrap();
    assert_eq!(assoc.foreign_keys, vec!["customer_id"]);
    assert_eq!(assoc.target, "shop.Customer");

    let key = order.attribute("customer_id").unwrap();
    assert_eq!(key.access, AccessMode::Anonymous);
    assert_eq!(key.column, "customer_id");
}

#[test]
fn explicit_reference_key_is_checked() {
    let set = compiled(&[
        customer(),
        TypeRecord::class("shop.Order")
            .persistent()
            .field("id", "long", pk())
            .field("customerId", "long", Tag::new())
            .reference("customer", "shop.Customer", Tag::new().with("foreignkey", "customerId")),
    ]);
    let order = set.entity("shop.Order").unwrap();
    assert_eq!(order.association("customer").unwrap().foreign_keys, vec!["customerId"]);
    assert!(order.attribute("customer_id").is_none());
}

#[test]
fn reference_to_non_persistent_type_fails() {
    let err = compile(
        &[
            TypeRecord::class("shop.Address").field("street", "string", Tag::new()),
            TypeRecord::class("shop.Order")
                .persistent()
                .reference("address", "shop.Address", Tag::new()),
        ],
        &CompileOptions::lenient(),
    )
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnresolvedReference { .. }));
}

#[test]
fn reference_to_unknown_type_fails() {
    let err = compile(
        &[TypeRecord::class("shop.Order")
            .persistent()
            .reference("owner", "shop.Ghost", Tag::new())],
        &CompileOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Graph);
}

// =============================================================================
// Collections
// =============================================================================

fn order_with_lines(line_tag: Tag) -> Vec<TypeRecord> {
    vec![
        TypeRecord::class("shop.Order")
            .persistent()
            .field("id", "long", pk())
            .collection("lines", "shop.Line", line_tag.with("element-class-ref", "shop.Line")),
        TypeRecord::class("shop.Line")
            .persistent()
            .field("id", "long", pk())
            .field("position", "int", Tag::new()),
    ]
}

#[test]
fn inverse_collection_key_is_added_to_element() {
    let set = compiled(&order_with_lines(Tag::new()));
    let lines = set.entity("shop.Order").unwrap().association("lines").unwrap();
    assert_eq!(lines.foreign_keys, vec!["Order_id"]);
    assert!(lines.collection().is_some());

    let line = set.entity("shop.Line").unwrap();
    assert_eq!(line.attribute("Order_id").unwrap().declared_by, "shop.Line");
}

#[test]
fn order_by_resolves_against_element() {
    let set = compiled(&order_with_lines(Tag::new().with("orderby", "position=DESC")));
    let lines = set.entity("shop.Order").unwrap().association("lines").unwrap();
    let order_by = &lines.collection().unwrap().order_by;
    assert_eq!(order_by.len(), 1);
    assert_eq!(order_by[0].field, "position");
    assert_eq!(order_by[0].direction, OrderDirection::Desc);
}

#[test]
fn unknown_order_by_field_is_a_warning_when_lenient() {
    let records = order_with_lines(Tag::new().with("orderby", "weight"));
    assert!(compile(&records, &CompileOptions::strict()).is_err());

    let set = compile(&records, &CompileOptions::lenient()).unwrap();
    assert_eq!(set.warnings.len(), 1);
    assert_eq!(set.warnings[0].entity, "shop.Order");
}

#[test]
fn inherited_collection_is_resolved_per_entity() {
    let mut records = order_with_lines(Tag::new());
    records.push(TypeRecord::class("shop.RushOrder").extends("shop.Order").persistent());
    let set = compiled(&records);
    let rush = set.entity("shop.RushOrder").unwrap().association("lines").unwrap();
    assert_eq!(rush.declared_by, "shop.Order");
    assert_eq!(rush.foreign_keys, vec!["Order_id"]);
}
