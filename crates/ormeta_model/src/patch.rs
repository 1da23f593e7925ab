//! Typed override patches.
//!
//! A `modify-inherited` or `modify-nested` directive targets one member by
//! name. Each of its tag attributes becomes a [`Patch`]: a non-empty value
//! sets the field, an empty value clears it back to "not declared". Patches
//! are applied to a clone of the inherited member, so an ancestor shared by
//! several descendants is never changed.

use ormeta_foundation::{
    AccessMode, AttrBag, Autoincrement, CascadeMode, Error, ErrorKind, OrderDirection, Result,
    StorageType, names, parse_bool,
};

use crate::decl::{AssociationDecl, AssociationKind, AttributeDecl, MemberDecl, OrderBy};

/// A field that an override can set or clear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PatchKey {
    /// `column`
    Column,
    /// `jdbc-type`
    JdbcType,
    /// `length`
    Length,
    /// `precision`
    Precision,
    /// `scale`
    Scale,
    /// `nullable`
    Nullable,
    /// `primarykey`
    PrimaryKey,
    /// `autoincrement`
    Autoincrement,
    /// `sequence-name`
    SequenceName,
    /// `indexed`
    Indexed,
    /// `access`
    Access,
    /// `locking`
    Locking,
    /// `update-lock`
    UpdateLock,
    /// `conversion`
    Conversion,
    /// `default-fetch`
    DefaultFetch,
    /// `documentation`
    Documentation,
    /// `column-documentation`
    ColumnDocumentation,
    /// `id`
    Id,
    /// `attributes`
    Attributes,
    /// `class-ref` / `element-class-ref`
    ClassRef,
    /// `foreignkey`
    ForeignKey,
    /// `auto-retrieve`
    AutoRetrieve,
    /// `auto-update`
    AutoUpdate,
    /// `auto-delete`
    AutoDelete,
    /// `proxy`
    Proxy,
    /// `refresh`
    Refresh,
    /// `otm-dependent`
    OtmDependent,
    /// `database-foreignkey`
    DatabaseForeignKey,
    /// `indirection-table`
    IndirectionTable,
    /// `indirection-table-documentation`
    IndirectionTableDocumentation,
    /// `indirection-table-primarykeys`
    IndirectionTablePrimaryKeys,
    /// `remote-foreignkey`
    RemoteForeignKey,
    /// `foreignkey-documentation`
    ForeignKeyDocumentation,
    /// `remote-foreignkey-documentation`
    RemoteForeignKeyDocumentation,
    /// `orderby`
    OrderBy,
    /// `collection-class`
    CollectionClass,
    /// `query-customizer`
    QueryCustomizer,
}

impl PatchKey {
    /// Maps a tag attribute name to its key.
    #[must_use]
    pub fn from_tag(key: &str) -> Option<Self> {
        let key = match key {
            "column" => Self::Column,
            "jdbc-type" => Self::JdbcType,
            "length" => Self::Length,
            "precision" => Self::Precision,
            "scale" => Self::Scale,
            "nullable" => Self::Nullable,
            "primarykey" => Self::PrimaryKey,
            "autoincrement" => Self::Autoincrement,
            "sequence-name" => Self::SequenceName,
            "indexed" => Self::Indexed,
            "access" => Self::Access,
            "locking" => Self::Locking,
            "update-lock" => Self::UpdateLock,
            "conversion" => Self::Conversion,
            "default-fetch" => Self::DefaultFetch,
            "documentation" => Self::Documentation,
            "column-documentation" => Self::ColumnDocumentation,
            "id" => Self::Id,
            "attributes" => Self::Attributes,
            "class-ref" | "element-class-ref" => Self::ClassRef,
            "foreignkey" => Self::ForeignKey,
            "auto-retrieve" => Self::AutoRetrieve,
            "auto-update" => Self::AutoUpdate,
            "auto-delete" => Self::AutoDelete,
            "proxy" => Self::Proxy,
            "refresh" => Self::Refresh,
            "otm-dependent" => Self::OtmDependent,
            "database-foreignkey" => Self::DatabaseForeignKey,
            "indirection-table" => Self::IndirectionTable,
            "indirection-table-documentation" => Self::IndirectionTableDocumentation,
            "indirection-table-primarykeys" => Self::IndirectionTablePrimaryKeys,
            "remote-foreignkey" => Self::RemoteForeignKey,
            "foreignkey-documentation" => Self::ForeignKeyDocumentation,
            "remote-foreignkey-documentation" => Self::RemoteForeignKeyDocumentation,
            "orderby" => Self::OrderBy,
            "collection-class" => Self::CollectionClass,
            "query-customizer" => Self::QueryCustomizer,
            _ => return None,
        };
        Some(key)
    }

    /// Parses a non-empty raw value for this key.
    #[must_use]
    pub fn parse(self, raw: &str) -> Option<PatchValue> {
        let value = match self {
            Self::Column
            | Self::SequenceName
            | Self::Conversion
            | Self::Documentation
            | Self::ColumnDocumentation
            | Self::ClassRef
            | Self::IndirectionTable
            | Self::IndirectionTableDocumentation
            | Self::ForeignKeyDocumentation
            | Self::RemoteForeignKeyDocumentation
            | Self::CollectionClass
            | Self::QueryCustomizer => PatchValue::Text(raw.to_string()),
            Self::JdbcType => PatchValue::Storage(StorageType::from_tag(raw)?),
            Self::Length | Self::Precision | Self::Scale | Self::Id => {
                PatchValue::Number(raw.trim().parse().ok()?)
            }
            Self::Nullable
            | Self::PrimaryKey
            | Self::Indexed
            | Self::Locking
            | Self::UpdateLock
            | Self::DefaultFetch
            | Self::AutoRetrieve
            | Self::Proxy
            | Self::Refresh
            | Self::OtmDependent
            | Self::DatabaseForeignKey
            | Self::IndirectionTablePrimaryKeys => PatchValue::Flag(parse_bool(raw)?),
            Self::Autoincrement => PatchValue::Autoincrement(Autoincrement::from_tag(raw)?),
            Self::Access => PatchValue::Access(AccessMode::from_tag(raw)?),
            Self::AutoUpdate | Self::AutoDelete => PatchValue::Cascade(CascadeMode::from_tag(raw)?),
            Self::ForeignKey | Self::RemoteForeignKey => PatchValue::Names(names::split_list(raw)),
            Self::OrderBy => PatchValue::Order(parse_order_by(raw)?),
            Self::Attributes => PatchValue::Bag(AttrBag::parse(raw)?),
        };
        Some(value)
    }
}

/// A parsed override value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatchValue {
    /// Free text or a name.
    Text(String),
    /// Boolean flag.
    Flag(bool),
    /// Non-negative number.
    Number(u32),
    /// Storage type.
    Storage(StorageType),
    /// Autoincrement mode.
    Autoincrement(Autoincrement),
    /// Access mode.
    Access(AccessMode),
    /// Cascade mode.
    Cascade(CascadeMode),
    /// Name list.
    Names(Vec<String>),
    /// Order-by list.
    Order(Vec<OrderBy>),
    /// Attribute bag.
    Bag(AttrBag),
}

/// Set a field to a value, or clear it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatchOp {
    /// Replace the field.
    Set(PatchValue),
    /// Reset the field to its undeclared state.
    Clear,
}

/// One field change of an override.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Patch {
    /// Targeted field.
    pub key: PatchKey,
    /// Change to apply.
    pub op: PatchOp,
}

/// A `modify-inherited` or `modify-nested` directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverrideDecl {
    /// Targeted member name (a `::` path for nested members).
    pub name: String,
    /// Whether the target is suppressed.
    pub ignore: bool,
    /// Field changes, in declaration order.
    pub patches: Vec<Patch>,
    /// Declaring type.
    pub owner: String,
}

impl OverrideDecl {
    /// Applies the patches to a copy of `member`.
    ///
    /// # Errors
    ///
    /// Returns an override error if a patch does not apply to the member's
    /// kind or clears a field that must stay declared.
    pub fn apply(&self, member: &MemberDecl) -> Result<MemberDecl> {
        let mut patched = member.clone();
        for patch in &self.patches {
            let outcome = match &mut patched {
                MemberDecl::Attribute(attr) => patch_attribute(attr, patch),
                MemberDecl::Association(assoc) => patch_association(assoc, patch),
                MemberDecl::Nested(_) => Err("nested members cannot be patched before flattening"),
            };
            outcome.map_err(|message| self.invalid(format!("{message} ({:?})", patch.key)))?;
        }
        Ok(patched)
    }

    fn invalid(&self, message: String) -> Error {
        Error::new(ErrorKind::InvalidOverride {
            entity: self.owner.clone(),
            name: self.name.clone(),
            message,
        })
    }
}

fn patch_attribute(
    attr: &mut AttributeDecl,
    patch: &Patch,
) -> std::result::Result<(), &'static str> {
    use PatchValue as V;

    match (patch.key, &patch.op) {
        (PatchKey::Column, PatchOp::Set(V::Text(v))) => attr.column = Some(v.clone()),
        (PatchKey::Column, PatchOp::Clear) => attr.column = None,
        (PatchKey::JdbcType, PatchOp::Set(V::Storage(ty))) => attr.storage = *ty,
        (PatchKey::JdbcType, PatchOp::Clear) => return Err("storage type cannot be cleared"),
        (PatchKey::Length, PatchOp::Set(V::Number(n))) => attr.length = Some(*n),
        (PatchKey::Length, PatchOp::Clear) => attr.length = attr.storage.default_length(),
        (PatchKey::Precision, PatchOp::Set(V::Number(n))) => attr.precision = Some(*n),
        (PatchKey::Precision, PatchOp::Clear) => attr.precision = None,
        (PatchKey::Scale, PatchOp::Set(V::Number(n))) => attr.scale = Some(*n),
        (PatchKey::Scale, PatchOp::Clear) => attr.scale = None,
        (PatchKey::Nullable, op) => attr.nullable = flag(op, true)?,
        (PatchKey::PrimaryKey, op) => attr.primary_key = flag(op, false)?,
        (PatchKey::Autoincrement, PatchOp::Set(V::Autoincrement(mode))) => {
            attr.autoincrement = *mode;
        }
        (PatchKey::Autoincrement, PatchOp::Clear) => attr.autoincrement = Autoincrement::None,
        (PatchKey::SequenceName, op) => attr.sequence_name = text(op)?,
        (PatchKey::Indexed, op) => attr.indexed = flag(op, false)?,
        (PatchKey::Access, PatchOp::Set(V::Access(mode))) => attr.access = *mode,
        (PatchKey::Access, PatchOp::Clear) => attr.access = AccessMode::Normal,
        (PatchKey::Locking, op) => attr.locking = flag(op, false)?,
        (PatchKey::UpdateLock, op) => attr.update_lock = flag(op, true)?,
        (PatchKey::Conversion, op) => attr.conversion = text(op)?,
        (PatchKey::DefaultFetch, op) => attr.default_fetch = flag(op, false)?,
        (PatchKey::Documentation, op) => attr.documentation = text(op)?,
        (PatchKey::ColumnDocumentation, op) => attr.column_documentation = text(op)?,
        (PatchKey::Id, PatchOp::Set(V::Number(n))) => attr.order = Some(*n),
        (PatchKey::Id, PatchOp::Clear) => attr.order = None,
        (PatchKey::Attributes, op) => attr.bag = bag(op)?,
        _ => return Err("field does not apply to attributes"),
    }
    Ok(())
}

fn patch_association(
    assoc: &mut AssociationDecl,
    patch: &Patch,
) -> std::result::Result<(), &'static str> {
    use PatchValue as V;

    match (patch.key, &patch.op) {
        (PatchKey::ClassRef, PatchOp::Set(V::Text(v))) => assoc.target = v.clone(),
        (PatchKey::ClassRef, PatchOp::Clear) => return Err("target type cannot be cleared"),
        (PatchKey::ForeignKey, PatchOp::Set(V::Names(names))) => assoc.foreign_keys = names.clone(),
        (PatchKey::ForeignKey, PatchOp::Clear) => assoc.foreign_keys.clear(),
        (PatchKey::AutoRetrieve, op) => assoc.lifecycle.auto_retrieve = flag(op, true)?,
        (PatchKey::AutoUpdate, op) => assoc.lifecycle.auto_update = cascade(op)?,
        (PatchKey::AutoDelete, op) => assoc.lifecycle.auto_delete = cascade(op)?,
        (PatchKey::Proxy, op) => assoc.lifecycle.proxy = flag(op, false)?,
        (PatchKey::Refresh, op) => assoc.lifecycle.refresh = flag(op, false)?,
        (PatchKey::OtmDependent, op) => assoc.lifecycle.otm_dependent = flag(op, false)?,
        (PatchKey::DatabaseForeignKey, op) => assoc.database_foreign_key = flag(op, true)?,
        (PatchKey::Access, PatchOp::Set(V::Access(mode))) => assoc.access = *mode,
        (PatchKey::Access, PatchOp::Clear) => assoc.access = AccessMode::Normal,
        (PatchKey::Documentation, op) => assoc.documentation = text(op)?,
        (PatchKey::Attributes, op) => assoc.bag = bag(op)?,
        (key, op) => {
            let AssociationKind::Collection(spec) = &mut assoc.kind else {
                return Err("field does not apply to references");
            };
            match (key, op) {
                (PatchKey::IndirectionTable, op) => spec.indirection_table = text(op)?,
                (PatchKey::IndirectionTableDocumentation, op) => {
                    spec.indirection_table_documentation = text(op)?;
                }
                (PatchKey::IndirectionTablePrimaryKeys, op) => {
                    spec.indirection_table_primary_keys = flag(op, false)?;
                }
                (PatchKey::RemoteForeignKey, PatchOp::Set(V::Names(names))) => {
                    spec.remote_foreign_keys = names.clone();
                }
                (PatchKey::RemoteForeignKey, PatchOp::Clear) => spec.remote_foreign_keys.clear(),
                (PatchKey::ForeignKeyDocumentation, op) => {
                    spec.foreign_key_documentation = text(op)?;
                }
                (PatchKey::RemoteForeignKeyDocumentation, op) => {
                    spec.remote_foreign_key_documentation = text(op)?;
                }
                (PatchKey::OrderBy, PatchOp::Set(V::Order(order))) => spec.order_by = order.clone(),
                (PatchKey::OrderBy, PatchOp::Clear) => spec.order_by.clear(),
                (PatchKey::CollectionClass, op) => spec.collection_class = text(op)?,
                (PatchKey::QueryCustomizer, op) => spec.query_customizer = text(op)?,
                _ => return Err("field does not apply to associations"),
            }
        }
    }
    Ok(())
}

fn flag(op: &PatchOp, default: bool) -> std::result::Result<bool, &'static str> {
    match op {
        PatchOp::Set(PatchValue::Flag(b)) => Ok(*b),
        PatchOp::Clear => Ok(default),
        PatchOp::Set(_) => Err("expected a boolean"),
    }
}

fn text(op: &PatchOp) -> std::result::Result<Option<String>, &'static str> {
    match op {
        PatchOp::Set(PatchValue::Text(t)) => Ok(Some(t.clone())),
        PatchOp::Clear => Ok(None),
        PatchOp::Set(_) => Err("expected text"),
    }
}

fn cascade(op: &PatchOp) -> std::result::Result<CascadeMode, &'static str> {
    match op {
        PatchOp::Set(PatchValue::Cascade(mode)) => Ok(*mode),
        PatchOp::Clear => Ok(CascadeMode::None),
        PatchOp::Set(_) => Err("expected a cascade mode"),
    }
}

fn bag(op: &PatchOp) -> std::result::Result<AttrBag, &'static str> {
    match op {
        PatchOp::Set(PatchValue::Bag(b)) => Ok(b.clone()),
        PatchOp::Clear => Ok(AttrBag::new()),
        PatchOp::Set(_) => Err("expected an attribute bag"),
    }
}

/// Parses `field[=ASC|DESC],...`.
pub(crate) fn parse_order_by(raw: &str) -> Option<Vec<OrderBy>> {
    names::split_list(raw)
        .into_iter()
        .map(|entry| {
            let (field, direction) = match entry.split_once('=') {
                Some((f, d)) => (f.trim().to_string(), OrderDirection::from_tag(d.trim())?),
                None => (entry, OrderDirection::Asc),
            };
            (!field.is_empty()).then_some(OrderBy { field, direction })
        })
        .collect()
}
