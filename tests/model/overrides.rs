//! Integration tests for override patches
//!
//! Tests that modify-inherited directives become typed patches and that
//! applying them produces a new member without touching the original.

use ormeta_foundation::{AccessMode, AttrBag, ErrorKind, StorageType};
use ormeta_model::{
    AssociationDecl, AttributeDecl, DeclarationAnalyzer, MemberDecl, OverrideDecl, Tag, TypeRecord,
};

fn override_of(tag: Tag) -> OverrideDecl {
    let decl = DeclarationAnalyzer::new()
        .analyze(&TypeRecord::class("B").modify_inherited(tag))
        .unwrap();
    decl.overrides.into_iter().next().unwrap()
}

fn attribute_with_bag() -> MemberDecl {
    let mut attr = AttributeDecl::new("attr", StorageType::Integer, "A");
    attr.bag = AttrBag::parse("a=1,b=2").unwrap();
    MemberDecl::Attribute(attr)
}

fn as_attribute(member: &MemberDecl) -> &AttributeDecl {
    match member {
        MemberDecl::Attribute(attr) => attr,
        other => panic!("expected an attribute, got {other:?}"),
    }
}

#[test]
fn apply_leaves_original_untouched() {
    let original = attribute_with_bag();
    let ov = override_of(Tag::new().with("name", "attr").with("column", "ATTR"));
    let patched = ov.apply(&original).unwrap();

    assert_eq!(as_attribute(&patched).column_name(), "ATTR");
    assert_eq!(as_attribute(&original).column_name(), "attr");
}

#[test]
fn empty_bag_clears_every_entry() {
    let ov = override_of(Tag::new().with("name", "attr").with("attributes", ""));
    let patched = ov.apply(&attribute_with_bag()).unwrap();
    assert!(as_attribute(&patched).bag.is_empty());
}

#[test]
fn new_bag_replaces_whole_bag() {
    let ov = override_of(Tag::new().with("name", "attr").with("attributes", "c=3"));
    let patched = ov.apply(&attribute_with_bag()).unwrap();
    let entries: Vec<_> = as_attribute(&patched).bag.iter().collect();
    assert_eq!(entries, vec![("c", "3")]);
}

#[test]
fn access_can_be_reset() {
    let mut attr = AttributeDecl::new("attr", StorageType::Integer, "A");
    attr.access = AccessMode::ReadOnly;
    let ov = override_of(Tag::new().with("name", "attr").with("access", ""));
    let patched = ov.apply(&MemberDecl::Attribute(attr)).unwrap();
    assert_eq!(as_attribute(&patched).access, AccessMode::Normal);
}

#[test]
fn reference_keys_do_not_apply_to_attributes() {
    let ov = override_of(Tag::new().with("name", "attr").with("foreignkey", "x"));
    let err = ov.apply(&attribute_with_bag()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidOverride { .. }));
}

#[test]
fn reference_target_can_be_redirected() {
    let assoc = MemberDecl::Association(AssociationDecl::reference("owner", "Person", "A"));
    let ov = override_of(Tag::new().with("name", "owner").with("class-ref", "Company"));
    let MemberDecl::Association(patched) = ov.apply(&assoc).unwrap() else {
        panic!("expected an association");
    };
    assert_eq!(patched.target, "Company");
}

#[test]
fn target_cannot_be_cleared() {
    let assoc = MemberDecl::Association(AssociationDecl::reference("owner", "Person", "A"));
    let ov = override_of(Tag::new().with("name", "owner").with("class-ref", ""));
    assert!(ov.apply(&assoc).is_err());
}
