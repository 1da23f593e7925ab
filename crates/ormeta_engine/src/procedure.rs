//! Stored-procedure bindings.

use std::collections::BTreeMap;

use ormeta_foundation::{Error, ProcedureKind, Result};
use ormeta_model::{ArgumentDecl, ArgumentSource, AttributeDecl, ProcedureDecl};

use crate::descriptor::ProcedureDescriptor;
use crate::entity::EntityState;
use crate::graph::TypeGraph;

/// Resolves the insert, update and delete bindings of one entity.
///
/// Bindings are inherited by kind; a later inheritance scope replaces an
/// earlier one. Synthesized argument lists are built from the entity's
/// final attributes.
///
/// # Errors
///
/// Returns a uniqueness error when one type binds a kind twice and a
/// reference error for arguments or return fields naming unknown attributes.
pub fn resolve_procedures(
    graph: &TypeGraph,
    state: &EntityState,
) -> Result<Vec<ProcedureDescriptor>> {
    let mut by_kind: BTreeMap<ProcedureKind, &ProcedureDecl> = BTreeMap::new();
    for scope in graph.inheritance_scopes(state.id) {
        let mut declared_here = Vec::new();
        for procedure in &graph.decl(scope).procedures {
            if declared_here.contains(&procedure.kind) {
                return Err(Error::duplicate_member(
                    graph.name(scope),
                    procedure.kind.to_string(),
                ));
            }
            declared_here.push(procedure.kind);
            by_kind.insert(procedure.kind, procedure);
        }
    }

    by_kind
        .into_values()
        .map(|procedure| resolve_procedure(state, procedure))
        .collect()
}

fn resolve_procedure(
    state: &EntityState,
    procedure: &ProcedureDecl,
) -> Result<ProcedureDescriptor> {
    let runtime = |attr: &AttributeDecl| ArgumentDecl::Runtime {
        field: Some(attr.name.clone()),
        returns: false,
    };
    let arguments: Vec<ArgumentDecl> = match procedure.source {
        ArgumentSource::Explicit => procedure.arguments.clone(),
        ArgumentSource::PrimaryKeys => state.primary_keys().iter().map(runtime).collect(),
        ArgumentSource::AllAttributes => state.attributes.iter().map(runtime).collect(),
    };

    let referenced = arguments
        .iter()
        .filter_map(|argument| match argument {
            ArgumentDecl::Runtime { field, .. } => field.as_deref(),
            ArgumentDecl::Constant(_) => None,
        })
        .chain(procedure.return_field.as_deref());
    for field in referenced {
        if state.attribute(field).is_none() {
            return Err(Error::unresolved(
                &state.name,
                &procedure.name,
                field,
                "no such attribute",
            ));
        }
    }

    Ok(ProcedureDescriptor {
        kind: procedure.kind,
        name: procedure.name.clone(),
        arguments,
        return_field: procedure.return_field.clone(),
        documentation: procedure.documentation.clone(),
        bag: procedure.bag.clone(),
        declared_by: procedure.owner.clone(),
    })
}
