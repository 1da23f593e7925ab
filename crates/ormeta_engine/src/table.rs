//! Table naming and table merging.
//!
//! Entities resolving to the same table name share one table descriptor
//! whose columns are the name-deduplicated union of their attributes.
//! Indirection tables are built from the collections that name them.

use std::collections::HashMap;

use indexmap::IndexMap;
use ormeta_foundation::{Autoincrement, Error, ErrorKind, Result};
use tracing::{debug, trace};

use crate::descriptor::{
    AssociationDescriptor, AssociationShape, AttributeDescriptor, CollectionDescriptor,
    ColumnDescriptor, EntityDescriptor, ForeignKeyDescriptor, TableDescriptor, TableIndex,
};
use crate::graph::{TypeGraph, TypeId};

/// Resolves the table a persistent type maps to.
///
/// An explicit `table` wins, then the nearest ancestor's explicit table,
/// then the type's simple name.
#[must_use]
pub fn table_name(graph: &TypeGraph, id: TypeId) -> String {
    graph
        .parent_chain(id)
        .find_map(|t| graph.decl(t).options.table.clone())
        .unwrap_or_else(|| graph.decl(id).simple_name.clone())
}

/// Merges entity descriptors into table descriptors.
#[derive(Debug)]
pub struct TableResolver<'a> {
    graph: &'a TypeGraph,
    tables: IndexMap<String, TableDescriptor>,
    /// Declaring type of each named table index, keyed by (table, index).
    index_owners: HashMap<(String, String), String>,
}

impl<'a> TableResolver<'a> {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new(graph: &'a TypeGraph) -> Self {
        Self {
            graph,
            tables: IndexMap::new(),
            index_owners: HashMap::new(),
        }
    }

    /// Builds one descriptor per table, in first-use order.
    ///
    /// Entities declared with `generate-table-info=false` contribute neither
    /// columns nor constraints.
    ///
    /// # Errors
    ///
    /// Returns a uniqueness error when entities sharing a table disagree on a
    /// column's storage type, length, or primary-key status, or when
    /// unrelated entities declare the same index name differently. Returns a
    /// reference error when an indirection key has no primary-key attribute
    /// at its position.
    pub fn resolve(mut self, entities: &[EntityDescriptor]) -> Result<Vec<TableDescriptor>> {
        let generated: Vec<&EntityDescriptor> = entities
            .iter()
            .filter(|e| self.generates_table(e))
            .collect();

        for entity in &generated {
            self.merge_entity(entity)?;
        }
        for entity in &generated {
            for assoc in &entity.associations {
                self.add_constraints(entities, entity, assoc)?;
            }
        }

        debug!(tables = self.tables.len(), "resolved tables");
        Ok(self.tables.into_values().collect())
    }

    fn generates_table(&self, entity: &EntityDescriptor) -> bool {
        self.graph
            .id_of(&entity.name)
            .is_none_or(|id| self.graph.decl(id).options.generate_table_info)
    }

    fn table_mut(&mut self, name: &str) -> &mut TableDescriptor {
        table_entry(&mut self.tables, name)
    }

    fn merge_entity(&mut self, entity: &EntityDescriptor) -> Result<()> {
        let table = self.table_mut(&entity.table);
        table.entities.push(entity.name.clone());
        if let Some(doc) = &entity.table_documentation {
            if table.documentation.as_ref().is_some_and(|d| d != doc) {
                trace!(table = %table.name, entity = %entity.name, "replacing table documentation");
            }
            table.documentation = Some(doc.clone());
        }

        for attr in &entity.attributes {
            merge_column(table, column_of(attr))?;
        }

        for index in &entity.indexes {
            let columns = index
                .fields
                .iter()
                .filter_map(|f| entity.attribute(f))
                .map(|a| a.column.clone())
                .collect();
            self.merge_index(
                &entity.table,
                TableIndex {
                    name: index.name.clone(),
                    columns,
                    unique: index.unique,
                    documentation: index.documentation.clone(),
                },
                &index.declared_by,
            )?;
        }
        Ok(())
    }

    /// Adds an index to a table.
    ///
    /// A named index met again from a subtype of the type that declared the
    /// stored version replaces it; met again from a supertype it is ignored.
    fn merge_index(
        &mut self,
        table_name: &str,
        index: TableIndex,
        declared_by: &str,
    ) -> Result<()> {
        let graph = self.graph;
        let inherits = |sub: &str, sup: &str| match (graph.id_of(sub), graph.id_of(sup)) {
            (Some(sub), Some(sup)) => sub != sup && graph.is_subtype_of(sub, sup),
            _ => false,
        };
        let owner_key = index.name.clone().map(|name| (table_name.to_string(), name));
        let stored_owner = owner_key
            .as_ref()
            .and_then(|key| self.index_owners.get(key))
            .cloned()
            .unwrap_or_default();

        let table = table_entry(&mut self.tables, table_name);
        let position = table.indexes.iter().position(|i| match (&i.name, &index.name) {
            (Some(a), Some(b)) => a == b,
            (None, None) => i.columns == index.columns,
            _ => false,
        });
        let Some(position) = position else {
            table.indexes.push(index);
            if let Some(key) = owner_key {
                self.index_owners.insert(key, declared_by.to_string());
            }
            return Ok(());
        };

        let existing = &table.indexes[position];
        if existing.columns == index.columns && existing.unique == index.unique {
            return Ok(());
        }
        if inherits(declared_by, &stored_owner) {
            trace!(
                table = %table.name,
                declared_by,
                replaced = %stored_owner,
                "replacing inherited index"
            );
            table.indexes[position] = index;
            if let Some(key) = owner_key {
                self.index_owners.insert(key, declared_by.to_string());
            }
            return Ok(());
        }
        if inherits(&stored_owner, declared_by) {
            return Ok(());
        }
        Err(Error::new(ErrorKind::IndexConflict {
            scope: table.name.clone(),
            index: index.name.unwrap_or_default(),
            message: "entities sharing the table declare it differently".to_string(),
        }))
    }

    fn add_constraints(
        &mut self,
        entities: &[EntityDescriptor],
        entity: &EntityDescriptor,
        assoc: &AssociationDescriptor,
    ) -> Result<()> {
        let Some(target) = entities.iter().find(|e| e.name == assoc.target) else {
            return Ok(());
        };

        match &assoc.kind {
            AssociationShape::Reference => {
                if assoc.database_foreign_key {
                    if let Some(fk) = foreign_key(entity, &assoc.foreign_keys, target) {
                        add_foreign_key(self.table_mut(&entity.table), fk);
                    }
                }
                Ok(())
            }
            AssociationShape::Collection(spec) if spec.indirection_table.is_some() => {
                self.merge_indirection(entity, target, assoc, spec)
            }
            AssociationShape::Collection(_) => {
                if assoc.database_foreign_key && self.tables.contains_key(&target.table) {
                    if let Some(fk) = foreign_key(target, &assoc.foreign_keys, entity) {
                        add_foreign_key(self.table_mut(&target.table), fk);
                    }
                }
                Ok(())
            }
        }
    }

    fn merge_indirection(
        &mut self,
        owner: &EntityDescriptor,
        element: &EntityDescriptor,
        assoc: &AssociationDescriptor,
        spec: &CollectionDescriptor,
    ) -> Result<()> {
        let Some(name) = spec.indirection_table.as_deref() else {
            return Ok(());
        };
        let sides = [
            (&assoc.foreign_keys, owner, &spec.foreign_key_documentation),
            (&spec.remote_foreign_keys, element, &spec.remote_foreign_key_documentation),
        ];

        let table = self.table_mut(name);
        table.indirection = true;
        if spec.indirection_table_documentation.is_some() {
            table
                .documentation
                .clone_from(&spec.indirection_table_documentation);
        }

        for (keys, side, documentation) in sides {
            let pks: Vec<&AttributeDescriptor> = side.primary_keys().collect();
            for (position, key) in keys.iter().enumerate() {
                let Some(pk) = pks.get(position) else {
                    return Err(Error::unresolved(
                        &owner.name,
                        &assoc.name,
                        key,
                        format!(
                            "{} has no primary-key attribute at position {}",
                            side.name,
                            position + 1
                        ),
                    ));
                };
                merge_column(
                    table,
                    ColumnDescriptor {
                        name: key.clone(),
                        storage: pk.storage,
                        length: pk.length,
                        precision: pk.precision,
                        scale: pk.scale,
                        nullable: false,
                        primary_key: spec.indirection_table_primary_keys,
                        autoincrement: Autoincrement::None,
                        documentation: documentation.clone(),
                    },
                )?;
            }
            if assoc.database_foreign_key {
                add_foreign_key(
                    table,
                    ForeignKeyDescriptor {
                        columns: keys.clone(),
                        target_table: side.table.clone(),
                        target_columns: side.primary_keys().map(|pk| pk.column.clone()).collect(),
                    },
                );
            }
        }
        Ok(())
    }
}

fn column_of(attr: &AttributeDescriptor) -> ColumnDescriptor {
    ColumnDescriptor {
        name: attr.column.clone(),
        storage: attr.storage,
        length: attr.length,
        precision: attr.precision,
        scale: attr.scale,
        nullable: attr.nullable,
        primary_key: attr.primary_key,
        autoincrement: attr.autoincrement,
        documentation: attr.column_documentation.clone(),
    }
}

/// Adds a column, or checks it against the column of the same name.
///
/// Attributes mapped to different columns never meet here, whatever their
/// names.
fn merge_column(table: &mut TableDescriptor, column: ColumnDescriptor) -> Result<()> {
    let Some(existing) = table.columns.iter_mut().find(|c| c.name == column.name) else {
        if column.primary_key {
            table.primary_key.push(column.name.clone());
        }
        table.columns.push(column);
        return Ok(());
    };

    let conflict = if existing.storage != column.storage {
        Some(format!("declared {} and {}", existing.storage, column.storage))
    } else if existing.length != column.length {
        Some(format!(
            "declared with length {:?} and {:?}",
            existing.length, column.length
        ))
    } else if existing.primary_key != column.primary_key {
        Some("primary-key status differs".to_string())
    } else {
        None
    };
    if let Some(message) = conflict {
        return Err(Error::new(ErrorKind::ColumnConflict {
            table: table.name.clone(),
            column: column.name,
            message,
        }));
    }

    existing.nullable |= column.nullable;
    if existing.documentation.is_none() {
        existing.documentation = column.documentation;
    }
    Ok(())
}

fn table_entry<'t>(
    tables: &'t mut IndexMap<String, TableDescriptor>,
    name: &str,
) -> &'t mut TableDescriptor {
    tables
        .entry(name.to_string())
        .or_insert_with(|| TableDescriptor {
            name: name.to_string(),
            ..TableDescriptor::default()
        })
}

/// Builds the constraint from `holder`'s key attributes to `target`'s
/// primary key; `None` when a key is unresolved or the counts differ.
fn foreign_key(
    holder: &EntityDescriptor,
    keys: &[String],
    target: &EntityDescriptor,
) -> Option<ForeignKeyDescriptor> {
    let columns: Vec<String> = keys
        .iter()
        .map(|k| holder.attribute(k).map(|a| a.column.clone()))
        .collect::<Option<_>>()?;
    let target_columns: Vec<String> = target.primary_keys().map(|pk| pk.column.clone()).collect();
    (columns.len() == target_columns.len() && !columns.is_empty()).then(|| ForeignKeyDescriptor {
        columns,
        target_table: target.table.clone(),
        target_columns,
    })
}

fn add_foreign_key(table: &mut TableDescriptor, fk: ForeignKeyDescriptor) {
    if !table.foreign_keys.contains(&fk) {
        table.foreign_keys.push(fk);
    }
}
