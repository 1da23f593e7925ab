//! Error types for the ormeta system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context. Every
//! error aborts the compilation unit it was raised in; [`ErrorCategory`]
//! groups the kinds so callers can report them by class.

use std::fmt;

use thiserror::Error;

use crate::types::StorageType;

/// Result alias used by every fallible ormeta operation.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for ormeta operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Pushes a resolution frame, creating the context if needed.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_frame(frame));
        self
    }

    /// Returns the taxonomy class of this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Creates an unknown type error.
    #[must_use]
    pub fn unknown_type(name: impl Into<String>, referenced_by: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownType {
            name: name.into(),
            referenced_by: referenced_by.into(),
        })
    }

    /// Creates a duplicate member error.
    #[must_use]
    pub fn duplicate_member(entity: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateMember {
            entity: entity.into(),
            name: name.into(),
        })
    }

    /// Creates an override-without-target error.
    #[must_use]
    pub fn override_target_missing(entity: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(ErrorKind::OverrideTargetMissing {
            entity: entity.into(),
            name: name.into(),
        })
    }

    /// Creates an unresolved reference error.
    #[must_use]
    pub fn unresolved(
        entity: impl Into<String>,
        item: impl Into<String>,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::UnresolvedReference {
            entity: entity.into(),
            item: item.into(),
            target: target.into(),
            message: message.into(),
        })
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(
        item: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::InvalidValue {
            item: item.into(),
            key: key.into(),
            value: value.into(),
            message: message.into(),
        })
    }

    /// Creates a missing value error.
    #[must_use]
    pub fn missing_value(item: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingValue {
            item: item.into(),
            key: key.into(),
        })
    }

    /// Creates a recursion depth error.
    #[must_use]
    pub fn depth_exceeded(limit: usize, path: impl Into<String>) -> Self {
        Self::new(ErrorKind::DepthExceeded {
            limit,
            path: path.into(),
        })
    }
}

/// Taxonomy classes of [`ErrorKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Unknown parent/contract types and cycles.
    Graph,
    /// Override directives with no target or an incompatible value.
    Override,
    /// Duplicate names and incompatible merges.
    Uniqueness,
    /// Foreign-key and binding references that do not resolve.
    Reference,
    /// Malformed tag values.
    Value,
    /// Recursion bounds.
    Limit,
    /// Snapshot encoding and file access.
    Io,
    /// Invariant breakage inside the engine.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Graph => "graph",
            Self::Override => "override",
            Self::Uniqueness => "uniqueness",
            Self::Reference => "reference",
            Self::Value => "value",
            Self::Limit => "limit",
            Self::Io => "io",
            Self::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// A parent, contract, or referenced type is not part of the graph.
    #[error("unknown type {name} (referenced by {referenced_by})")]
    UnknownType {
        /// The name that failed to resolve.
        name: String,
        /// The type or item holding the reference.
        referenced_by: String,
    },

    /// Two records declare the same qualified type name.
    #[error("type declared twice: {0}")]
    DuplicateType(String),

    /// The extends/implements edges form a cycle.
    #[error("cyclic inheritance: {0}")]
    InheritanceCycle(String),

    /// Nested (embedded) types contain themselves.
    #[error("cyclic nesting: {0}")]
    NestingCycle(String),

    /// An override directive names nothing in the ancestry.
    #[error("override of {name} in {entity} has no inherited target")]
    OverrideTargetMissing {
        /// The entity declaring the override.
        entity: String,
        /// The targeted attribute or association name.
        name: String,
    },

    /// An override directive cannot be applied to its target.
    #[error("invalid override of {name} in {entity}: {message}")]
    InvalidOverride {
        /// The entity declaring the override.
        entity: String,
        /// The targeted name.
        name: String,
        /// What made the override inapplicable.
        message: String,
    },

    /// An attribute or association name occurs twice in a merged view.
    #[error("duplicate member {name} in {entity}")]
    DuplicateMember {
        /// The entity whose merged view collides.
        entity: String,
        /// The colliding name.
        name: String,
    },

    /// Entities sharing a table redefine a column incompatibly.
    #[error("incompatible column {column} in table {table}: {message}")]
    ColumnConflict {
        /// The shared table.
        table: String,
        /// The redefined column.
        column: String,
        /// Which property differs.
        message: String,
    },

    /// Two index declarations with one name cannot be merged.
    #[error("incompatible index {index} in {scope}: {message}")]
    IndexConflict {
        /// The entity or table holding the indexes.
        scope: String,
        /// The index name.
        index: String,
        /// What made the merge fail.
        message: String,
    },

    /// A foreign-key list does not match the referenced primary key.
    #[error(
        "foreign key of {association} in {entity} has {actual} attribute(s), \
         referenced primary key has {expected}"
    )]
    ForeignKeyArity {
        /// The owning entity.
        entity: String,
        /// The association.
        association: String,
        /// Number of primary-key attributes of the referenced entity.
        expected: usize,
        /// Number of foreign-key attributes declared or synthesizable.
        actual: usize,
    },

    /// A foreign-key attribute's storage type differs from the primary key.
    #[error(
        "foreign key {attribute} of {association} in {entity} is {actual}, \
         referenced primary key is {expected}"
    )]
    ForeignKeyType {
        /// The owning entity.
        entity: String,
        /// The association.
        association: String,
        /// The foreign-key attribute.
        attribute: String,
        /// Storage type of the primary key.
        expected: StorageType,
        /// Storage type of the foreign key.
        actual: StorageType,
    },

    /// A name used by an association, index, procedure, or binding is dangling.
    #[error("unresolved reference {target} from {item} in {entity}: {message}")]
    UnresolvedReference {
        /// The entity holding the reference.
        entity: String,
        /// The declaring item.
        item: String,
        /// The name that did not resolve.
        target: String,
        /// Description of what was expected.
        message: String,
    },

    /// A tag value is malformed.
    #[error("invalid value {value:?} for {key} on {item}: {message}")]
    InvalidValue {
        /// The declaring item.
        item: String,
        /// The tag key.
        key: String,
        /// The raw value.
        value: String,
        /// What was expected.
        message: String,
    },

    /// A required tag value is absent.
    #[error("missing {key} on {item}")]
    MissingValue {
        /// The declaring item.
        item: String,
        /// The tag key.
        key: String,
    },

    /// Nesting or ancestry walking exceeded the configured depth.
    #[error("recursion depth {limit} exceeded at {path}")]
    DepthExceeded {
        /// The configured limit.
        limit: usize,
        /// Where the walk was when the limit was hit.
        path: String,
    },

    /// Snapshot encoding or decoding failed.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Reading or writing a snapshot file failed.
    #[error("I/O error: {0}")]
    IoError(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ErrorKind {
    /// Returns the taxonomy class of this kind.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownType { .. }
            | Self::DuplicateType(_)
            | Self::InheritanceCycle(_)
            | Self::NestingCycle(_) => ErrorCategory::Graph,
            Self::OverrideTargetMissing { .. } | Self::InvalidOverride { .. } => {
                ErrorCategory::Override
            }
            Self::DuplicateMember { .. }
            | Self::ColumnConflict { .. }
            | Self::IndexConflict { .. } => ErrorCategory::Uniqueness,
            Self::ForeignKeyArity { .. }
            | Self::ForeignKeyType { .. }
            | Self::UnresolvedReference { .. } => ErrorCategory::Reference,
            Self::InvalidValue { .. } | Self::MissingValue { .. } => ErrorCategory::Value,
            Self::DepthExceeded { .. } => ErrorCategory::Limit,
            Self::SerializationError(_) | Self::IoError(_) => ErrorCategory::Io,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Entity being resolved.
    pub entity: Option<String>,
    /// Item (attribute, association, index, procedure) being resolved.
    pub item: Option<String>,
    /// Resolution frames, outermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entity.
    #[must_use]
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Sets the item.
    #[must_use]
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(entity) = &self.entity {
            write!(f, "in {entity}")?;
            if let Some(item) = &self.item {
                write!(f, ".{item}")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  while {frame}")?;
            }
        }
        Ok(())
    }
}
