//! Per-entity working state shared by the passes after inheritance.

use indexmap::IndexMap;
use ormeta_foundation::{CompileOptions, Error, ErrorKind, Result};
use ormeta_model::{AssociationDecl, AttributeDecl};
use tracing::debug;

use crate::graph::{TypeGraph, TypeId};
use crate::inherit::{InheritanceResolver, MergedView, order_attributes};
use crate::table::table_name;

/// Ordered attributes and associations of one persistent type.
///
/// Starts as a copy of the merged view with attributes in emission order;
/// the association pass appends synthesized foreign-key attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityState {
    /// Type id.
    pub id: TypeId,
    /// Qualified name.
    pub name: String,
    /// Resolved table name.
    pub table: String,
    /// Attributes in emission order.
    pub attributes: Vec<AttributeDecl>,
    /// Associations in merge order.
    pub associations: Vec<AssociationDecl>,
}

/// Working states keyed by type id, in input order.
pub type EntityStates = IndexMap<TypeId, EntityState>;

impl EntityState {
    /// Creates the state from a merged view.
    #[must_use]
    pub fn from_view(id: TypeId, name: &str, table: String, view: &MergedView) -> Self {
        Self {
            id,
            name: name.to_string(),
            table,
            attributes: order_attributes(view.attributes()),
            associations: view.associations().cloned().collect(),
        }
    }

    /// Looks up an attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeDecl> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Returns the primary-key attributes in emission order.
    #[must_use]
    pub fn primary_keys(&self) -> Vec<AttributeDecl> {
        self.attributes
            .iter()
            .filter(|a| a.primary_key)
            .cloned()
            .collect()
    }

    /// Adds a synthesized foreign-key attribute.
    ///
    /// An attribute of the same name and storage type is reused.
    ///
    /// # Errors
    ///
    /// Returns a uniqueness error if an association has the name, or a
    /// reference error if an attribute of the name has another type.
    pub fn add_foreign_key(&mut self, attr: AttributeDecl, association: &str) -> Result<()> {
        if self.associations.iter().any(|a| a.name == attr.name) {
            return Err(Error::duplicate_member(&self.name, &attr.name));
        }
        match self.attribute(&attr.name) {
            Some(existing) if existing.storage == attr.storage => Ok(()),
            Some(existing) => Err(Error::new(ErrorKind::ForeignKeyType {
                entity: self.name.clone(),
                association: association.to_string(),
                attribute: existing.name.clone(),
                expected: attr.storage,
                actual: existing.storage,
            })),
            None => {
                self.attributes.push(attr);
                Ok(())
            }
        }
    }
}

/// Resolves the merged view of every persistent type into a working state.
///
/// # Errors
///
/// Returns the first inheritance, override or nesting error.
pub fn collect_states(graph: &TypeGraph, options: &CompileOptions) -> Result<EntityStates> {
    let mut resolver = InheritanceResolver::new(graph, options);
    let mut states = EntityStates::new();
    for id in graph.persistent() {
        let view = resolver.resolve(id)?;
        let state = EntityState::from_view(id, graph.name(id), table_name(graph, id), &view);
        states.insert(id, state);
    }
    debug!(entities = states.len(), "collected entity states");
    Ok(states)
}
