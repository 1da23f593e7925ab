//! Resolved descriptors handed to the mapping and schema emitters.
//!
//! Everything here is plain ordered data. Two compilations of the same
//! records produce equal descriptor sets.

use ormeta_foundation::{
    AccessMode, AttrBag, Autoincrement, IsolationLevel, ProcedureKind, StorageType,
};
use ormeta_model::{
    ArgumentDecl, AssociationDecl, AssociationKind, AttributeDecl, Lifecycle, OrderBy, TypeKind,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// =============================================================================
// Descriptor Set
// =============================================================================

/// The output of one compilation unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DescriptorSet {
    /// Virtual catalog the emitters group output under.
    pub catalog: String,
    /// One descriptor per persistent type, in input order.
    pub entities: Vec<EntityDescriptor>,
    /// One descriptor per resolved table, in first-use order.
    pub tables: Vec<TableDescriptor>,
    /// Downgraded reference problems (lenient mode only).
    pub warnings: Vec<Warning>,
}

impl DescriptorSet {
    /// Looks up an entity descriptor by qualified name.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntityDescriptor> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Looks up a table descriptor by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// A reference problem accepted in lenient mode.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Warning {
    /// Entity the problem was found on.
    pub entity: String,
    /// Rendered error message.
    pub message: String,
}

// =============================================================================
// Entity Descriptor
// =============================================================================

/// A fully resolved persistent type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityDescriptor {
    /// Qualified name.
    pub name: String,
    /// Class or interface.
    pub kind: TypeKind,
    /// Resolved table name.
    pub table: String,
    /// Table documentation declared on this type.
    pub table_documentation: Option<String>,
    /// Entity documentation.
    pub documentation: Option<String>,
    /// Transaction isolation level.
    pub isolation: IsolationLevel,
    /// Factory binding.
    pub factory: Option<FactoryBinding>,
    /// Method run after materialization.
    pub initialization_method: Option<String>,
    /// Proxy type or `dynamic`.
    pub proxy: Option<String>,
    /// Number of proxies materialized together.
    pub proxy_prefetching_limit: Option<u32>,
    /// Refresh cached instances on load.
    pub refresh: bool,
    /// Custom row reader.
    pub row_reader: Option<String>,
    /// Whether the mapping emitter writes this entity.
    pub generate_repository_info: bool,
    /// Attributes in emission order.
    pub attributes: Vec<AttributeDescriptor>,
    /// Associations in merge order.
    pub associations: Vec<AssociationDescriptor>,
    /// Indexes: per-attribute ones first, then declared ones.
    pub indexes: Vec<IndexDescriptor>,
    /// Stored-procedure bindings, in insert, update, delete order.
    pub procedures: Vec<ProcedureDescriptor>,
    /// Nearest persistent subtypes.
    pub extents: Vec<String>,
    /// Free-form attribute bag.
    pub bag: AttrBag,
}

impl EntityDescriptor {
    /// Looks up an attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Looks up an association by name.
    #[must_use]
    pub fn association(&self, name: &str) -> Option<&AssociationDescriptor> {
        self.associations.iter().find(|a| a.name == name)
    }

    /// Looks up a named index.
    #[must_use]
    pub fn index(&self, name: &str) -> Option<&IndexDescriptor> {
        self.indexes
            .iter()
            .find(|i| i.name.as_deref() == Some(name))
    }

    /// Iterates primary-key attributes in emission order.
    pub fn primary_keys(&self) -> impl Iterator<Item = &AttributeDescriptor> {
        self.attributes.iter().filter(|a| a.primary_key)
    }
}

/// A factory class and method.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FactoryBinding {
    /// Type declaring the method; `None` means the entity itself.
    pub class: Option<String>,
    /// Zero-argument method.
    pub method: String,
}

/// A resolved attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AttributeDescriptor {
    /// Attribute name (`a::b` for nested paths).
    pub name: String,
    /// Column name.
    pub column: String,
    /// Storage type.
    pub storage: StorageType,
    /// Column length.
    pub length: Option<u32>,
    /// Numeric precision.
    pub precision: Option<u32>,
    /// Numeric scale.
    pub scale: Option<u32>,
    /// Accepts null.
    pub nullable: bool,
    /// Part of the primary key.
    pub primary_key: bool,
    /// Value assignment mode.
    pub autoincrement: Autoincrement,
    /// Sequence for engine-side assignment.
    pub sequence_name: Option<String>,
    /// Has a per-attribute index.
    pub indexed: bool,
    /// Access mode.
    pub access: AccessMode,
    /// Optimistic-locking attribute.
    pub locking: bool,
    /// Engine updates the locking value.
    pub update_lock: bool,
    /// Conversion class.
    pub conversion: Option<String>,
    /// Loaded eagerly.
    pub default_fetch: bool,
    /// Attribute documentation.
    pub documentation: Option<String>,
    /// Column documentation.
    pub column_documentation: Option<String>,
    /// Free-form attribute bag.
    pub bag: AttrBag,
    /// Type that declared the attribute.
    pub declared_by: String,
}

impl From<&AttributeDecl> for AttributeDescriptor {
    fn from(attr: &AttributeDecl) -> Self {
        Self {
            name: attr.name.clone(),
            column: attr.column_name().to_string(),
            storage: attr.storage,
            length: attr.length,
            precision: attr.precision,
            scale: attr.scale,
            nullable: attr.nullable,
            primary_key: attr.primary_key,
            autoincrement: attr.autoincrement,
            sequence_name: attr.sequence_name.clone(),
            indexed: attr.indexed,
            access: attr.access,
            locking: attr.locking,
            update_lock: attr.update_lock,
            conversion: attr.conversion.clone(),
            default_fetch: attr.default_fetch,
            documentation: attr.documentation.clone(),
            column_documentation: attr.column_documentation.clone(),
            bag: attr.bag.clone(),
            declared_by: attr.owner.clone(),
        }
    }
}

/// A resolved association.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AssociationDescriptor {
    /// Association name.
    pub name: String,
    /// Reference or collection data.
    pub kind: AssociationShape,
    /// Target (element) type.
    pub target: String,
    /// Resolved foreign keys, one per primary key of the side they point to.
    pub foreign_keys: Vec<String>,
    /// Lifecycle flags.
    pub lifecycle: Lifecycle,
    /// Emit a database constraint.
    pub database_foreign_key: bool,
    /// Access mode.
    pub access: AccessMode,
    /// Documentation.
    pub documentation: Option<String>,
    /// Free-form attribute bag.
    pub bag: AttrBag,
    /// Type that declared the association.
    pub declared_by: String,
}

impl AssociationDescriptor {
    /// Returns the collection data, if any.
    #[must_use]
    pub fn collection(&self) -> Option<&CollectionDescriptor> {
        match &self.kind {
            AssociationShape::Collection(c) => Some(c),
            AssociationShape::Reference => None,
        }
    }
}

impl From<&AssociationDecl> for AssociationDescriptor {
    fn from(assoc: &AssociationDecl) -> Self {
        let kind = match &assoc.kind {
            AssociationKind::Reference => AssociationShape::Reference,
            AssociationKind::Collection(spec) => AssociationShape::Collection(CollectionDescriptor {
                indirection_table: spec.indirection_table.clone(),
                indirection_table_documentation: spec.indirection_table_documentation.clone(),
                indirection_table_primary_keys: spec.indirection_table_primary_keys,
                remote_foreign_keys: spec.remote_foreign_keys.clone(),
                foreign_key_documentation: spec.foreign_key_documentation.clone(),
                remote_foreign_key_documentation: spec.remote_foreign_key_documentation.clone(),
                order_by: spec.order_by.clone(),
                collection_class: spec.collection_class.clone(),
                query_customizer: spec.query_customizer.clone(),
            }),
        };
        Self {
            name: assoc.name.clone(),
            kind,
            target: assoc.target.clone(),
            foreign_keys: assoc.foreign_keys.clone(),
            lifecycle: assoc.lifecycle,
            database_foreign_key: assoc.database_foreign_key,
            access: assoc.access,
            documentation: assoc.documentation.clone(),
            bag: assoc.bag.clone(),
            declared_by: assoc.owner.clone(),
        }
    }
}

/// Single- or multi-valued.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AssociationShape {
    /// Foreign keys are owner attributes.
    Reference,
    /// Foreign keys are element attributes or indirection columns.
    Collection(CollectionDescriptor),
}

/// Collection-only data.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollectionDescriptor {
    /// Indirection table, if the collection uses one.
    pub indirection_table: Option<String>,
    /// Indirection table documentation.
    pub indirection_table_documentation: Option<String>,
    /// Whether the indirection columns form the table's primary key.
    pub indirection_table_primary_keys: bool,
    /// Indirection columns pointing to the element.
    pub remote_foreign_keys: Vec<String>,
    /// Documentation of the owner-side indirection columns.
    pub foreign_key_documentation: Option<String>,
    /// Documentation of the element-side indirection columns.
    pub remote_foreign_key_documentation: Option<String>,
    /// Element ordering.
    pub order_by: Vec<OrderBy>,
    /// Container kind.
    pub collection_class: Option<String>,
    /// Query customizer.
    pub query_customizer: Option<String>,
}

/// A resolved index over attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexDescriptor {
    /// Name; unnamed indexes cover one attribute.
    pub name: Option<String>,
    /// Attribute names in index order.
    pub fields: Vec<String>,
    /// Unique index.
    pub unique: bool,
    /// Documentation.
    pub documentation: Option<String>,
    /// Type whose declaration this index comes from.
    pub declared_by: String,
}

/// A resolved stored-procedure binding.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProcedureDescriptor {
    /// Replaced operation.
    pub kind: ProcedureKind,
    /// Procedure name.
    pub name: String,
    /// Arguments, synthesized ones included.
    pub arguments: Vec<ArgumentDecl>,
    /// Attribute receiving the return value.
    pub return_field: Option<String>,
    /// Documentation.
    pub documentation: Option<String>,
    /// Free-form attribute bag.
    pub bag: AttrBag,
    /// Type that declared the binding.
    pub declared_by: String,
}

// =============================================================================
// Table Descriptor
// =============================================================================

/// One schema table, shared by every entity resolving to its name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TableDescriptor {
    /// Table name.
    pub name: String,
    /// Documentation (last declaration wins).
    pub documentation: Option<String>,
    /// Entities mapped to the table; empty for indirection tables.
    pub entities: Vec<String>,
    /// Name-deduplicated columns in first-declaration order.
    pub columns: Vec<ColumnDescriptor>,
    /// Primary-key columns.
    pub primary_key: Vec<String>,
    /// Database foreign keys.
    pub foreign_keys: Vec<ForeignKeyDescriptor>,
    /// Indexes over columns.
    pub indexes: Vec<TableIndex>,
    /// Whether the table only links a collection's two sides.
    pub indirection: bool,
}

impl TableDescriptor {
    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A table column.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,
    /// Storage type.
    pub storage: StorageType,
    /// Length.
    pub length: Option<u32>,
    /// Precision.
    pub precision: Option<u32>,
    /// Scale.
    pub scale: Option<u32>,
    /// Accepts null.
    pub nullable: bool,
    /// Part of the primary key.
    pub primary_key: bool,
    /// Value assignment mode.
    pub autoincrement: Autoincrement,
    /// Column documentation.
    pub documentation: Option<String>,
}

/// A database foreign-key constraint.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ForeignKeyDescriptor {
    /// Local columns.
    pub columns: Vec<String>,
    /// Referenced table.
    pub target_table: String,
    /// Referenced columns.
    pub target_columns: Vec<String>,
}

/// An index over table columns.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TableIndex {
    /// Name; unnamed indexes cover one column.
    pub name: Option<String>,
    /// Columns in index order.
    pub columns: Vec<String>,
    /// Unique index.
    pub unique: bool,
    /// Documentation.
    pub documentation: Option<String>,
}
