//! Foreign-key resolution for references and collections.
//!
//! References keep their keys on the owner, plain collections on the
//! element, and indirection collections in the indirection table. Keys that
//! are not declared are synthesized from the primary key they point to.

use ormeta_foundation::{AccessMode, Error, ErrorKind, Result, names};
use ormeta_model::{AssociationDecl, AssociationKind, AttributeDecl};
use tracing::{debug, trace};

use crate::entity::EntityStates;
use crate::graph::{TypeGraph, TypeId};
use crate::validate::Diagnostics;

/// Resolves the foreign keys of every association in place.
#[derive(Debug)]
pub struct AssociationResolver<'a> {
    graph: &'a TypeGraph,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> AssociationResolver<'a> {
    /// Creates a resolver reporting downgradable problems to `diagnostics`.
    pub fn new(graph: &'a TypeGraph, diagnostics: &'a mut Diagnostics) -> Self {
        Self { graph, diagnostics }
    }

    /// Resolves every association of every state, in input order.
    ///
    /// Synthesized foreign-key attributes are appended to the states that
    /// hold them; resolved key lists are written back to the associations.
    ///
    /// # Errors
    ///
    /// Returns a graph error for an unknown target and a reference error for
    /// non-persistent targets and foreign keys that do not match the primary
    /// key they point to.
    pub fn resolve_all(&mut self, states: &mut EntityStates) -> Result<()> {
        let graph = self.graph;
        let ids: Vec<TypeId> = states.keys().copied().collect();
        let mut resolved = 0;
        for id in ids {
            for index in 0..states[&id].associations.len() {
                let assoc = states[&id].associations[index].clone();
                let name = assoc.name.clone();
                let assoc = self.resolve(states, id, assoc).map_err(|e| {
                    e.with_frame(format!("resolving {name} of {}", graph.name(id)))
                })?;
                states[&id].associations[index] = assoc;
                resolved += 1;
            }
        }
        debug!(associations = resolved, "resolved associations");
        Ok(())
    }

    fn resolve(
        &mut self,
        states: &mut EntityStates,
        owner: TypeId,
        mut assoc: AssociationDecl,
    ) -> Result<AssociationDecl> {
        let graph = self.graph;
        let target = self.target_of(owner, &assoc)?;
        if !states.contains_key(&target) {
            return Err(Error::new(ErrorKind::Internal(format!(
                "no state for {}",
                assoc.target
            ))));
        }

        if assoc.indirection_table().is_some() {
            self.resolve_indirection(states, owner, target, &mut assoc)?;
        } else if assoc.is_collection() {
            self.resolve_inverse(states, owner, target, &mut assoc)?;
        } else {
            self.resolve_reference(states, owner, target, &mut assoc)?;
        }

        if let Some(spec) = assoc.collection_spec() {
            let owner_name = graph.name(owner);
            for order in &spec.order_by {
                if states[&target].attribute(&order.field).is_none() {
                    self.diagnostics.downgrade(
                        owner_name,
                        Error::unresolved(
                            owner_name,
                            &assoc.name,
                            &order.field,
                            format!("{} has no such attribute to order by", assoc.target),
                        ),
                    )?;
                }
            }
        }

        trace!(
            entity = graph.name(owner),
            association = %assoc.name,
            keys = ?assoc.foreign_keys,
            "resolved association"
        );
        Ok(assoc)
    }

    fn target_of(&self, owner: TypeId, assoc: &AssociationDecl) -> Result<TypeId> {
        let owner_name = self.graph.name(owner);
        let target = self.graph.id_of(&assoc.target).ok_or_else(|| {
            Error::unknown_type(&assoc.target, format!("{owner_name}.{}", assoc.name))
        })?;
        if !self.graph.decl(target).persistent {
            return Err(Error::unresolved(
                owner_name,
                &assoc.name,
                &assoc.target,
                "target is not persistent",
            ));
        }
        Ok(target)
    }

    fn resolve_reference(
        &mut self,
        states: &mut EntityStates,
        owner: TypeId,
        target: TypeId,
        assoc: &mut AssociationDecl,
    ) -> Result<()> {
        let pks = states[&target].primary_keys();
        let graph = self.graph;
        let owner_name = graph.name(owner);

        if assoc.foreign_keys.is_empty() {
            let pk = single_key(owner_name, assoc, &pks)?;
            let key = foreign_key_attribute(format!("{}_{}", assoc.name, pk.name), pk, assoc);
            assoc.foreign_keys = vec![key.name.clone()];
            return states[&owner].add_foreign_key(key, &assoc.name);
        }

        let keys: Vec<Option<AttributeDecl>> = assoc
            .foreign_keys
            .iter()
            .map(|k| states[&owner].attribute(k).cloned())
            .collect();
        self.check_keys(owner_name, owner_name, assoc, &keys, &pks)
    }

    fn resolve_inverse(
        &mut self,
        states: &mut EntityStates,
        owner: TypeId,
        target: TypeId,
        assoc: &mut AssociationDecl,
    ) -> Result<()> {
        let pks = states[&owner].primary_keys();
        let graph = self.graph;
        let owner_name = graph.name(owner);

        if assoc.foreign_keys.is_empty() {
            let pk = single_key(owner_name, assoc, &pks)?;
            let name = format!("{}_{}", names::simple_name(&assoc.owner), pk.name);
            let mut key = foreign_key_attribute(name, pk, assoc);
            key.owner = assoc.target.clone();
            assoc.foreign_keys = vec![key.name.clone()];

            // Every persistent element subtype maps the same rows.
            let holders: Vec<TypeId> = states
                .keys()
                .copied()
                .filter(|id| graph.is_subtype_of(*id, target))
                .collect();
            for holder in holders {
                states[&holder].add_foreign_key(key.clone(), &assoc.name)?;
            }
            return Ok(());
        }

        let keys: Vec<Option<AttributeDecl>> = assoc
            .foreign_keys
            .iter()
            .map(|k| states[&target].attribute(k).cloned())
            .collect();
        self.check_keys(owner_name, &assoc.target, assoc, &keys, &pks)
    }

    fn resolve_indirection(
        &self,
        states: &EntityStates,
        owner: TypeId,
        target: TypeId,
        assoc: &mut AssociationDecl,
    ) -> Result<()> {
        let owner_name = self.graph.name(owner);
        let owner_pks = states[&owner].primary_keys();
        let element_pks = states[&target].primary_keys();
        let table = assoc.indirection_table().unwrap_or_default().to_string();
        if owner_pks.is_empty() || element_pks.is_empty() {
            return Err(Error::unresolved(
                owner_name,
                &assoc.name,
                &table,
                "both sides of an indirection table need a primary key",
            ));
        }

        let partner = self.partner(states, owner, target, &table);
        let AssociationKind::Collection(spec) = &mut assoc.kind else {
            return Ok(());
        };

        if assoc.foreign_keys.is_empty() {
            if let Some(partner) = partner.and_then(AssociationDecl::collection_spec) {
                assoc.foreign_keys.clone_from(&partner.remote_foreign_keys);
            }
        }
        if assoc.foreign_keys.is_empty() {
            assoc.foreign_keys = implicit_columns(&states[&owner].table, &owner_pks);
        }
        if spec.remote_foreign_keys.is_empty() {
            if let Some(partner) = partner {
                spec.remote_foreign_keys.clone_from(&partner.foreign_keys);
            }
        }
        if spec.remote_foreign_keys.is_empty() {
            spec.remote_foreign_keys = implicit_columns(&states[&target].table, &element_pks);
        }

        if assoc.database_foreign_key {
            for (keys, pks) in [
                (&assoc.foreign_keys, &owner_pks),
                (&spec.remote_foreign_keys, &element_pks),
            ] {
                if keys.len() != pks.len() {
                    return Err(Error::new(ErrorKind::ForeignKeyArity {
                        entity: owner_name.to_string(),
                        association: assoc.name.clone(),
                        expected: pks.len(),
                        actual: keys.len(),
                    }));
                }
            }
        }
        Ok(())
    }

    /// Finds the element-side collection sharing the indirection table.
    fn partner<'s>(
        &self,
        states: &'s EntityStates,
        owner: TypeId,
        target: TypeId,
        table: &str,
    ) -> Option<&'s AssociationDecl> {
        states[&target].associations.iter().find(|other| {
            other.indirection_table() == Some(table)
                && self
                    .graph
                    .id_of(&other.target)
                    .is_some_and(|t| self.graph.is_subtype_of(owner, t))
        })
    }

    /// Checks declared foreign-key attributes against the primary key.
    ///
    /// Missing attributes are downgradable. A count mismatch only matters
    /// when a database constraint is emitted.
    fn check_keys(
        &mut self,
        owner: &str,
        holder: &str,
        assoc: &AssociationDecl,
        keys: &[Option<AttributeDecl>],
        pks: &[AttributeDecl],
    ) -> Result<()> {
        for (name, key) in assoc.foreign_keys.iter().zip(keys) {
            if key.is_none() {
                self.diagnostics.downgrade(
                    owner,
                    Error::unresolved(
                        owner,
                        &assoc.name,
                        name,
                        format!("{holder} has no such foreign-key attribute"),
                    ),
                )?;
            }
        }

        if !assoc.database_foreign_key {
            return Ok(());
        }
        if keys.len() != pks.len() {
            return Err(Error::new(ErrorKind::ForeignKeyArity {
                entity: owner.to_string(),
                association: assoc.name.clone(),
                expected: pks.len(),
                actual: keys.len(),
            }));
        }
        for (key, pk) in keys.iter().zip(pks) {
            if let Some(key) = key {
                if key.storage != pk.storage {
                    return Err(Error::new(ErrorKind::ForeignKeyType {
                        entity: owner.to_string(),
                        association: assoc.name.clone(),
                        attribute: key.name.clone(),
                        expected: pk.storage,
                        actual: key.storage,
                    }));
                }
            }
        }
        Ok(())
    }
}

/// The primary key an implicit foreign key copies.
fn single_key<'p>(
    owner: &str,
    assoc: &AssociationDecl,
    pks: &'p [AttributeDecl],
) -> Result<&'p AttributeDecl> {
    match pks {
        [pk] => Ok(pk),
        _ => Err(Error::new(ErrorKind::ForeignKeyArity {
            entity: owner.to_string(),
            association: assoc.name.clone(),
            expected: pks.len(),
            actual: 1,
        })),
    }
}

fn foreign_key_attribute(
    name: String,
    pk: &AttributeDecl,
    assoc: &AssociationDecl,
) -> AttributeDecl {
    let mut key = AttributeDecl::new(&name, pk.storage, &assoc.owner);
    if name.contains(names::PATH_SEPARATOR) {
        key.column = Some(name.replace(names::PATH_SEPARATOR, "_"));
    }
    key.length = pk.length;
    key.precision = pk.precision;
    key.scale = pk.scale;
    key.access = AccessMode::Anonymous;
    key.seq = assoc.seq;
    key
}

fn implicit_columns(table: &str, pks: &[AttributeDecl]) -> Vec<String> {
    pks.iter()
        .map(|pk| format!("{table}_{}", pk.column_name()))
        .collect()
}
