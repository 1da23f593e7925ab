//! Index resolution.

use ormeta_foundation::{Error, ErrorKind, Result};
use tracing::trace;

use crate::descriptor::IndexDescriptor;
use crate::entity::EntityState;
use crate::graph::TypeGraph;

/// Resolves the indexes of one entity.
///
/// Per-attribute `indexed` markers come first, in attribute order. Declared
/// indexes follow in first-declaration order across the inheritance scopes;
/// a later scope declaring a name again replaces the inherited fields and
/// uniqueness. Unnamed declarations matching an existing unnamed index are
/// dropped.
///
/// # Errors
///
/// Returns a uniqueness error when one type declares an index name twice and
/// a reference error when a resolved index names an unknown attribute.
pub fn resolve_indexes(graph: &TypeGraph, state: &EntityState) -> Result<Vec<IndexDescriptor>> {
    let mut indexes: Vec<IndexDescriptor> = state
        .attributes
        .iter()
        .filter(|a| a.indexed)
        .map(|a| IndexDescriptor {
            name: None,
            fields: vec![a.name.clone()],
            unique: false,
            documentation: None,
            declared_by: a.owner.clone(),
        })
        .collect();
    let markers = indexes.len();

    for scope in graph.inheritance_scopes(state.id) {
        let mut declared_here: Vec<&str> = Vec::new();
        for index in &graph.decl(scope).indexes {
            let resolved = IndexDescriptor {
                name: index.name.clone(),
                fields: index.fields.clone(),
                unique: index.unique,
                documentation: index.documentation.clone(),
                declared_by: index.owner.clone(),
            };
            let Some(name) = index.name.as_deref() else {
                if !indexes.iter().any(|i| i.name.is_none() && i.fields == index.fields) {
                    indexes.push(resolved);
                }
                continue;
            };

            if declared_here.contains(&name) {
                return Err(Error::new(ErrorKind::IndexConflict {
                    scope: graph.name(scope).to_string(),
                    index: name.to_string(),
                    message: "declared twice".to_string(),
                }));
            }
            declared_here.push(name);

            match indexes[markers..]
                .iter_mut()
                .find(|i| i.name.as_deref() == Some(name))
            {
                Some(inherited) => {
                    trace!(
                        entity = %state.name,
                        index = name,
                        scope = graph.name(scope),
                        "replacing index"
                    );
                    *inherited = resolved;
                }
                None => indexes.push(resolved),
            }
        }
    }

    for index in &indexes {
        for field in &index.fields {
            if state.attribute(field).is_none() {
                return Err(Error::unresolved(
                    &state.name,
                    index.name.as_deref().unwrap_or("index"),
                    field,
                    "no such attribute",
                ));
            }
        }
    }
    Ok(indexes)
}
