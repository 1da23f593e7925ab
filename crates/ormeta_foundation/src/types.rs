//! Enumerated value kinds carried by persistence tags.
//!
//! Each kind parses from its tag spelling with `from_tag` and displays back
//! to the same spelling, so descriptors can be rendered without a lookup table.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scalar storage kind of a column.
///
/// These are the JDBC type names used by the mapping descriptor; they are
/// not tied to any source-language type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StorageType {
    /// Single bit.
    Bit,
    /// 8-bit integer.
    TinyInt,
    /// 16-bit integer.
    SmallInt,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInt,
    /// Single precision float.
    Real,
    /// Float of implementation-defined precision.
    Float,
    /// Double precision float.
    Double,
    /// Exact numeric with precision and scale.
    Numeric,
    /// Exact decimal with precision and scale.
    Decimal,
    /// Fixed-length characters.
    Char,
    /// Variable-length characters.
    Varchar,
    /// Long variable-length characters.
    LongVarchar,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time.
    Timestamp,
    /// Fixed-length bytes.
    Binary,
    /// Variable-length bytes.
    VarBinary,
    /// Long variable-length bytes.
    LongVarBinary,
    /// Character large object.
    Clob,
    /// Binary large object.
    Blob,
    /// Boolean.
    Boolean,
    /// Structured value.
    Struct,
    /// Array value.
    Array,
    /// Reference to a structured value.
    Ref,
    /// External link.
    Datalink,
}

impl StorageType {
    const NAMES: &'static [(&'static str, StorageType)] = &[
        ("BIT", Self::Bit),
        ("TINYINT", Self::TinyInt),
        ("SMALLINT", Self::SmallInt),
        ("INTEGER", Self::Integer),
        ("BIGINT", Self::BigInt),
        ("REAL", Self::Real),
        ("FLOAT", Self::Float),
        ("DOUBLE", Self::Double),
        ("NUMERIC", Self::Numeric),
        ("DECIMAL", Self::Decimal),
        ("CHAR", Self::Char),
        ("VARCHAR", Self::Varchar),
        ("LONGVARCHAR", Self::LongVarchar),
        ("DATE", Self::Date),
        ("TIME", Self::Time),
        ("TIMESTAMP", Self::Timestamp),
        ("BINARY", Self::Binary),
        ("VARBINARY", Self::VarBinary),
        ("LONGVARBINARY", Self::LongVarBinary),
        ("CLOB", Self::Clob),
        ("BLOB", Self::Blob),
        ("BOOLEAN", Self::Boolean),
        ("STRUCT", Self::Struct),
        ("ARRAY", Self::Array),
        ("REF", Self::Ref),
        ("DATALINK", Self::Datalink),
    ];

    /// Parses a tag spelling (case-insensitive).
    #[must_use]
    pub fn from_tag(value: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(value.trim()))
            .map(|(_, ty)| *ty)
    }

    /// Returns the canonical tag spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(_, ty)| *ty == self)
            .map_or("OTHER", |(name, _)| *name)
    }

    /// Derives the storage type for a member's declared type name.
    ///
    /// Only the last path segment is considered, so `java.lang.String`,
    /// `std::string::String` and `string` all map to `VARCHAR`.
    #[must_use]
    pub fn for_type_name(type_name: &str) -> Option<Self> {
        let simple = crate::names::simple_name(type_name).to_ascii_lowercase();
        let ty = match simple.as_str() {
            "bool" | "boolean" => Self::Bit,
            "byte" | "i8" | "u8" => Self::TinyInt,
            "short" | "i16" | "u16" => Self::SmallInt,
            "int" | "integer" | "i32" | "u32" => Self::Integer,
            "long" | "i64" | "u64" => Self::BigInt,
            "float" | "f32" => Self::Real,
            "double" | "f64" => Self::Double,
            "char" | "character" => Self::Char,
            "string" | "str" => Self::Varchar,
            "bigdecimal" | "decimal" => Self::Decimal,
            "biginteger" => Self::Numeric,
            "date" => Self::Date,
            "time" => Self::Time,
            "timestamp" | "datetime" | "instant" => Self::Timestamp,
            "bytes" | "byte[]" | "vec<u8>" => Self::LongVarBinary,
            "clob" => Self::Clob,
            "blob" => Self::Blob,
            _ => return None,
        };
        Some(ty)
    }

    /// Length applied when none is declared.
    #[must_use]
    pub const fn default_length(self) -> Option<u32> {
        match self {
            Self::Varchar => Some(254),
            _ => None,
        }
    }

    /// Whether the type can hold an optimistic-locking counter or stamp.
    #[must_use]
    pub const fn is_lockable(self) -> bool {
        matches!(self, Self::Integer | Self::BigInt | Self::Timestamp)
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a primary-key value is assigned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Autoincrement {
    /// The application assigns the value.
    #[default]
    None,
    /// The persistence engine assigns the value (e.g. from a sequence).
    Engine,
    /// The database assigns the value.
    Database,
}

impl Autoincrement {
    /// Parses a tag spelling.
    #[must_use]
    pub fn from_tag(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "engine" | "ojb" => Some(Self::Engine),
            "database" => Some(Self::Database),
            _ => None,
        }
    }
}

/// Access mode of an attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AccessMode {
    /// Read and written through a member.
    #[default]
    Normal,
    /// Read through a member, never written.
    ReadOnly,
    /// No backing member; declared at type level.
    Anonymous,
}

impl AccessMode {
    /// Parses a tag spelling.
    #[must_use]
    pub fn from_tag(value: &str) -> Option<Self> {
        match value {
            "readwrite" => Some(Self::Normal),
            "readonly" => Some(Self::ReadOnly),
            "anonymous" => Some(Self::Anonymous),
            _ => None,
        }
    }

    /// Returns the tag spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "readwrite",
            Self::ReadOnly => "readonly",
            Self::Anonymous => "anonymous",
        }
    }
}

/// Transaction isolation level of an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IsolationLevel {
    /// Dirty reads allowed.
    ReadUncommitted,
    /// Only committed data is read.
    #[default]
    ReadCommitted,
    /// Reads are repeatable within a transaction.
    RepeatableRead,
    /// Full serializability.
    Serializable,
    /// Optimistic concurrency control.
    Optimistic,
    /// No isolation handling.
    None,
}

impl IsolationLevel {
    /// Parses a tag spelling.
    #[must_use]
    pub fn from_tag(value: &str) -> Option<Self> {
        match value {
            "read-uncommitted" => Some(Self::ReadUncommitted),
            "read-committed" => Some(Self::ReadCommitted),
            "repeatable-read" => Some(Self::RepeatableRead),
            "serializable" => Some(Self::Serializable),
            "optimistic" => Some(Self::Optimistic),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    /// Returns the tag spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadUncommitted => "read-uncommitted",
            Self::ReadCommitted => "read-committed",
            Self::RepeatableRead => "repeatable-read",
            Self::Serializable => "serializable",
            Self::Optimistic => "optimistic",
            Self::None => "none",
        }
    }
}

/// Cascade behaviour of an association on update or delete.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CascadeMode {
    /// Nothing is cascaded.
    #[default]
    None,
    /// Only the link (foreign key or indirection row) is maintained.
    Link,
    /// The referenced objects are stored or deleted as well.
    Object,
}

impl CascadeMode {
    /// Parses a tag spelling; `true`/`false` are accepted as `object`/`none`.
    #[must_use]
    pub fn from_tag(value: &str) -> Option<Self> {
        match value {
            "none" | "false" => Some(Self::None),
            "link" => Some(Self::Link),
            "object" | "true" => Some(Self::Object),
            _ => None,
        }
    }
}

/// A per-type flag that may be left unset to inherit from the nearest ancestor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Tristate {
    /// Not declared on this type.
    #[default]
    Unset,
    /// Declared on.
    On,
    /// Declared off.
    Off,
}

impl Tristate {
    /// Returns the declared value, if any.
    #[must_use]
    pub const fn value(self) -> Option<bool> {
        match self {
            Self::Unset => None,
            Self::On => Some(true),
            Self::Off => Some(false),
        }
    }
}

impl From<bool> for Tristate {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

/// Sort direction of an order-by entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderDirection {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl OrderDirection {
    /// Parses `ASC`/`DESC` (case-insensitive).
    #[must_use]
    pub fn from_tag(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }
}

/// Which persistence operation a stored procedure replaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ProcedureKind {
    /// Insert.
    Insert,
    /// Update.
    Update,
    /// Delete.
    Delete,
}

impl ProcedureKind {
    /// Returns the tag prefix (`insert`, `update`, `delete`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-procedure", self.as_str())
    }
}

/// Parses a `true`/`false` tag value.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
