//! Anonymous item collapsing and nested flattening.

use ormeta_foundation::{Error, ErrorContext, Result, names};
use ormeta_model::{AssociationKind, EntityDecl, MemberDecl, NestedDecl};
use tracing::trace;

/// Returns a type's local members: anonymous items first, then members.
///
/// Anonymous attributes repeated with the same name and storage type
/// collapse to the first occurrence. Any other repeated name is an error.
pub(crate) fn local_members(decl: &EntityDecl) -> Result<Vec<MemberDecl>> {
    let mut locals: Vec<MemberDecl> = Vec::with_capacity(decl.anonymous.len() + decl.members.len());

    for item in &decl.anonymous {
        match locals.iter().find(|m| m.name() == item.name()) {
            None => locals.push(item.clone()),
            Some(MemberDecl::Attribute(first)) => match item {
                MemberDecl::Attribute(again) if again.storage == first.storage => {
                    trace!(
                        entity = %decl.name,
                        name = %again.name,
                        "collapsed repeated anonymous field"
                    );
                }
                _ => {
                    return Err(duplicate(decl, item, "conflicting anonymous declarations"));
                }
            },
            Some(_) => return Err(duplicate(decl, item, "repeated anonymous association")),
        }
    }

    for member in &decl.members {
        if locals.iter().any(|m| m.name() == member.name()) {
            return Err(duplicate(decl, member, "declared twice"));
        }
        locals.push(member.clone());
    }
    Ok(locals)
}

fn duplicate(decl: &EntityDecl, member: &MemberDecl, frame: &str) -> Error {
    Error::duplicate_member(&decl.name, member.name()).with_context(
        ErrorContext::new()
            .with_entity(&decl.name)
            .with_item(member.name())
            .with_frame(frame),
    )
}

/// Flattens the merged members of an embedded type under a nested member.
///
/// Names become `nested::member` and default columns `nested_column`. A
/// reference's foreign keys name attributes of the owner, so they move under
/// the same path; collection keys live elsewhere and are kept.
pub(crate) fn flatten<'a>(
    nested: &'a NestedDecl,
    embedded: impl IntoIterator<Item = &'a MemberDecl>,
) -> Vec<MemberDecl> {
    embedded
        .into_iter()
        .filter_map(|member| match member {
            MemberDecl::Attribute(attr) => {
                let mut flat = attr.clone();
                flat.name = names::nested_path(&nested.name, &attr.name);
                flat.column = Some(names::nested_column(&nested.name, attr.column_name()));
                flat.owner.clone_from(&nested.owner);
                flat.seq = nested.seq;
                Some(MemberDecl::Attribute(flat))
            }
            MemberDecl::Association(assoc) => {
                let mut flat = assoc.clone();
                flat.name = names::nested_path(&nested.name, &assoc.name);
                if matches!(assoc.kind, AssociationKind::Reference) {
                    flat.foreign_keys = assoc
                        .foreign_keys
                        .iter()
                        .map(|fk| names::nested_path(&nested.name, fk))
                        .collect();
                }
                flat.owner.clone_from(&nested.owner);
                flat.seq = nested.seq;
                Some(MemberDecl::Association(flat))
            }
            // Merged views hold no nested markers.
            MemberDecl::Nested(_) => None,
        })
        .collect()
}
