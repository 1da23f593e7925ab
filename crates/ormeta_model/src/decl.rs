//! Typed declarations extracted from raw tag records.
//!
//! Declarations are immutable once analyzed. The engine derives merged views
//! from them by cloning and patching, never by mutating in place.

use ormeta_foundation::{
    AccessMode, AttrBag, Autoincrement, CascadeMode, IsolationLevel, OrderDirection,
    ProcedureKind, StorageType, Tristate,
};

use crate::raw::TypeKind;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use crate::patch::OverrideDecl;

// =============================================================================
// Entity Declaration
// =============================================================================

/// Class-level options of a type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassOptions {
    /// Explicit table name.
    pub table: Option<String>,
    /// Documentation attached to the table (never inherited).
    pub table_documentation: Option<String>,
    /// Free-text documentation of the entity itself.
    pub documentation: Option<String>,
    /// Transaction isolation level.
    pub isolation: IsolationLevel,
    /// Type providing the factory method.
    pub factory_class: Option<String>,
    /// Zero-argument factory method.
    pub factory_method: Option<String>,
    /// Zero-argument method run after materialization.
    pub initialization_method: Option<String>,
    /// Proxy type name or `dynamic`.
    pub proxy: Option<String>,
    /// Number of proxies materialized together.
    pub proxy_prefetching_limit: Option<u32>,
    /// Whether cached instances are refreshed on load.
    pub refresh: bool,
    /// Custom row reader.
    pub row_reader: Option<String>,
    /// Whether extent detection walks through this type.
    pub determine_extents: Tristate,
    /// Whether ancestor items are merged into this type.
    pub include_inherited: bool,
    /// Whether a mapping descriptor is produced.
    pub generate_repository_info: bool,
    /// Whether the type contributes to table descriptors.
    pub generate_table_info: bool,
    /// Free-form attribute bag.
    pub bag: AttrBag,
}

impl Default for ClassOptions {
    fn default() -> Self {
        Self {
            table: None,
            table_documentation: None,
            documentation: None,
            isolation: IsolationLevel::default(),
            factory_class: None,
            factory_method: None,
            initialization_method: None,
            proxy: None,
            proxy_prefetching_limit: None,
            refresh: false,
            row_reader: None,
            determine_extents: Tristate::Unset,
            include_inherited: true,
            generate_repository_info: true,
            generate_table_info: true,
            bag: AttrBag::new(),
        }
    }
}

/// A fully analyzed type declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityDecl {
    /// Qualified name.
    pub name: String,
    /// Last segment of the qualified name.
    pub simple_name: String,
    /// Class or interface.
    pub kind: TypeKind,
    /// Whether the type carries a class tag.
    pub persistent: bool,
    /// Direct parent type.
    pub parent: Option<String>,
    /// Implemented contracts.
    pub contracts: Vec<String>,
    /// Class-level options.
    pub options: ClassOptions,
    /// Type-level (anonymous) attributes and associations, in declaration order.
    pub anonymous: Vec<MemberDecl>,
    /// Member-attached declarations, in declaration order.
    pub members: Vec<MemberDecl>,
    /// Index declarations.
    pub indexes: Vec<IndexDecl>,
    /// Stored-procedure bindings.
    pub procedures: Vec<ProcedureDecl>,
    /// `modify-inherited` directives.
    pub overrides: Vec<OverrideDecl>,
    /// `modify-nested` directives.
    pub nested_overrides: Vec<OverrideDecl>,
    /// Explicit extent classes.
    pub extent_classes: Vec<String>,
    /// Zero-argument methods declared on the type.
    pub methods: Vec<String>,
}

impl EntityDecl {
    /// Creates an empty declaration for the given qualified name.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        let name = name.into();
        Self {
            simple_name: ormeta_foundation::names::simple_name(&name).to_string(),
            name,
            kind,
            persistent: false,
            parent: None,
            contracts: Vec::new(),
            options: ClassOptions::default(),
            anonymous: Vec::new(),
            members: Vec::new(),
            indexes: Vec::new(),
            procedures: Vec::new(),
            overrides: Vec::new(),
            nested_overrides: Vec::new(),
            extent_classes: Vec::new(),
            methods: Vec::new(),
        }
    }
}

// =============================================================================
// Members
// =============================================================================

/// A declaration occupying a name in an entity's member namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberDecl {
    /// Scalar attribute.
    Attribute(AttributeDecl),
    /// Single- or multi-valued association.
    Association(AssociationDecl),
    /// Embedded value type, flattened during resolution.
    Nested(NestedDecl),
}

impl MemberDecl {
    /// Returns the member name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Attribute(a) => &a.name,
            Self::Association(a) => &a.name,
            Self::Nested(n) => &n.name,
        }
    }

    /// Returns the declaring type.
    #[must_use]
    pub fn owner(&self) -> &str {
        match self {
            Self::Attribute(a) => &a.owner,
            Self::Association(a) => &a.owner,
            Self::Nested(n) => &n.owner,
        }
    }

    /// Returns the declaration-order id.
    #[must_use]
    pub fn seq(&self) -> u32 {
        match self {
            Self::Attribute(a) => a.seq,
            Self::Association(a) => a.seq,
            Self::Nested(n) => n.seq,
        }
    }

    /// Returns a short description of the member kind.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Attribute(_) => "attribute",
            Self::Association(a) if a.is_collection() => "collection",
            Self::Association(_) => "reference",
            Self::Nested(_) => "nested",
        }
    }
}

/// A scalar persisted attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeDecl {
    /// Attribute name.
    pub name: String,
    /// Explicit column name.
    pub column: Option<String>,
    /// Storage type.
    pub storage: StorageType,
    /// Column length.
    pub length: Option<u32>,
    /// Numeric precision.
    pub precision: Option<u32>,
    /// Numeric scale.
    pub scale: Option<u32>,
    /// Whether the column accepts null.
    pub nullable: bool,
    /// Part of the primary key.
    pub primary_key: bool,
    /// How the value is assigned.
    pub autoincrement: Autoincrement,
    /// Sequence used by engine-side autoincrement.
    pub sequence_name: Option<String>,
    /// Whether a single-column index is generated.
    pub indexed: bool,
    /// Access mode.
    pub access: AccessMode,
    /// Optimistic-locking attribute.
    pub locking: bool,
    /// Whether the engine updates the locking value.
    pub update_lock: bool,
    /// Value conversion class.
    pub conversion: Option<String>,
    /// Loaded eagerly by default.
    pub default_fetch: bool,
    /// Documentation of the attribute.
    pub documentation: Option<String>,
    /// Documentation of the column.
    pub column_documentation: Option<String>,
    /// Explicit 1-based emission position.
    pub order: Option<u32>,
    /// Free-form attribute bag.
    pub bag: AttrBag,
    /// Declaring type.
    pub owner: String,
    /// Declaration-order id.
    pub seq: u32,
}

impl AttributeDecl {
    /// Creates an attribute with default flags.
    #[must_use]
    pub fn new(name: impl Into<String>, storage: StorageType, owner: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column: None,
            storage,
            length: storage.default_length(),
            precision: None,
            scale: None,
            nullable: true,
            primary_key: false,
            autoincrement: Autoincrement::None,
            sequence_name: None,
            indexed: false,
            access: AccessMode::Normal,
            locking: false,
            update_lock: true,
            conversion: None,
            default_fetch: false,
            documentation: None,
            column_documentation: None,
            order: None,
            bag: AttrBag::new(),
            owner: owner.into(),
            seq: 0,
        }
    }

    /// Returns the column name, defaulting to the attribute name.
    #[must_use]
    pub fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }
}

/// Lifecycle flags of an association.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Lifecycle {
    /// Load the target together with the owner.
    pub auto_retrieve: bool,
    /// Cascade on store.
    pub auto_update: CascadeMode,
    /// Cascade on delete.
    pub auto_delete: CascadeMode,
    /// Refresh cached targets on load.
    pub refresh: bool,
    /// Materialize the target lazily.
    pub proxy: bool,
    /// Target lifetime is bound to the owner.
    pub otm_dependent: bool,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            auto_retrieve: true,
            auto_update: CascadeMode::None,
            auto_delete: CascadeMode::None,
            refresh: false,
            proxy: false,
            otm_dependent: false,
        }
    }
}

/// One `field [ASC|DESC]` entry of a collection's ordering.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBy {
    /// Attribute of the element entity.
    pub field: String,
    /// Sort direction.
    pub direction: OrderDirection,
}

/// Additional data of a multi-valued association.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectionSpec {
    /// Indirection table holding the link rows.
    pub indirection_table: Option<String>,
    /// Documentation of the indirection table.
    pub indirection_table_documentation: Option<String>,
    /// Whether the indirection columns form the table's primary key.
    pub indirection_table_primary_keys: bool,
    /// Indirection columns pointing to the element entity.
    pub remote_foreign_keys: Vec<String>,
    /// Documentation of the owner-side indirection columns.
    pub foreign_key_documentation: Option<String>,
    /// Documentation of the element-side indirection columns.
    pub remote_foreign_key_documentation: Option<String>,
    /// Ordering of the elements.
    pub order_by: Vec<OrderBy>,
    /// Container kind.
    pub collection_class: Option<String>,
    /// Query customizer class.
    pub query_customizer: Option<String>,
}

/// Single- or multi-valued.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssociationKind {
    /// Reference to one target.
    Reference,
    /// Collection of elements.
    Collection(CollectionSpec),
}

/// A link between entities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssociationDecl {
    /// Association name.
    pub name: String,
    /// Single- or multi-valued with collection data.
    pub kind: AssociationKind,
    /// Referenced (or element) type.
    pub target: String,
    /// Foreign-key names in primary-key order.
    ///
    /// For references these are attributes of the owner; for plain
    /// collections attributes of the element; for indirection-table
    /// collections columns of the indirection table.
    pub foreign_keys: Vec<String>,
    /// Lifecycle flags.
    pub lifecycle: Lifecycle,
    /// Whether a database foreign-key constraint is emitted.
    pub database_foreign_key: bool,
    /// Access mode.
    pub access: AccessMode,
    /// Documentation.
    pub documentation: Option<String>,
    /// Free-form attribute bag.
    pub bag: AttrBag,
    /// Declaring type.
    pub owner: String,
    /// Declaration-order id.
    pub seq: u32,
}

impl AssociationDecl {
    /// Creates a reference with default flags.
    #[must_use]
    pub fn reference(
        name: impl Into<String>,
        target: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: AssociationKind::Reference,
            target: target.into(),
            foreign_keys: Vec::new(),
            lifecycle: Lifecycle::default(),
            database_foreign_key: true,
            access: AccessMode::Normal,
            documentation: None,
            bag: AttrBag::new(),
            owner: owner.into(),
            seq: 0,
        }
    }

    /// Creates a collection with default flags.
    #[must_use]
    pub fn collection(
        name: impl Into<String>,
        element: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            kind: AssociationKind::Collection(CollectionSpec::default()),
            ..Self::reference(name, element, owner)
        }
    }

    /// Returns true for multi-valued associations.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self.kind, AssociationKind::Collection(_))
    }

    /// Returns the collection data, if any.
    #[must_use]
    pub fn collection_spec(&self) -> Option<&CollectionSpec> {
        match &self.kind {
            AssociationKind::Collection(spec) => Some(spec),
            AssociationKind::Reference => None,
        }
    }

    /// Returns the indirection table, if the association uses one.
    #[must_use]
    pub fn indirection_table(&self) -> Option<&str> {
        self.collection_spec()
            .and_then(|spec| spec.indirection_table.as_deref())
    }
}

/// An embedded value type flattened into the owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NestedDecl {
    /// Member name, used as the path prefix.
    pub name: String,
    /// Embedded type.
    pub type_name: String,
    /// Declaring type.
    pub owner: String,
    /// Declaration-order id.
    pub seq: u32,
}

// =============================================================================
// Indexes and Procedures
// =============================================================================

/// An index over one or more attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexDecl {
    /// Index name; unnamed indexes cover exactly one attribute.
    pub name: Option<String>,
    /// Attribute names in index order.
    pub fields: Vec<String>,
    /// Unique index.
    pub unique: bool,
    /// Documentation.
    pub documentation: Option<String>,
    /// Declaring type.
    pub owner: String,
}

/// Where a procedure's arguments come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ArgumentSource {
    /// The declared argument list.
    #[default]
    Explicit,
    /// One runtime argument per primary-key attribute.
    PrimaryKeys,
    /// One runtime argument per attribute.
    AllAttributes,
}

/// One procedure argument.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ArgumentDecl {
    /// A literal value.
    Constant(String),
    /// A value read from (and optionally written back to) an attribute.
    Runtime {
        /// Referenced attribute; `None` passes null.
        field: Option<String>,
        /// Whether the procedure writes the value back.
        returns: bool,
    },
}

/// An insert, update, or delete stored-procedure binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcedureDecl {
    /// Operation replaced by the procedure.
    pub kind: ProcedureKind,
    /// Procedure name.
    pub name: String,
    /// Declared arguments.
    pub arguments: Vec<ArgumentDecl>,
    /// Attribute receiving the return value.
    pub return_field: Option<String>,
    /// Argument synthesis mode.
    pub source: ArgumentSource,
    /// Documentation.
    pub documentation: Option<String>,
    /// Free-form attribute bag.
    pub bag: AttrBag,
    /// Declaring type.
    pub owner: String,
}
