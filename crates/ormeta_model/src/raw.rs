//! Raw per-type records as handed over by the tag parser.
//!
//! Records are plain data: the parser fills them, the analyzer reads them.
//! Builder methods exist so record sets can be assembled by hand in tests
//! and by embedders that produce tags from something other than comments.

use indexmap::IndexMap;
use ormeta_foundation::ProcedureKind;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An order-preserving list of tag attributes (`name="value"` pairs).
///
/// An attribute that is present with an empty value is "not set" for most
/// keys, but overrides use the distinction to clear inherited values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tag {
    attrs: IndexMap<String, String>,
}

impl Tag {
    /// Creates an empty tag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute (builder form).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Adds or replaces an attribute.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    /// Returns the raw value, including empty strings.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Returns the value if present and non-empty.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Returns true if the attribute is present (even if empty).
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.attrs.contains_key(key)
    }

    /// Iterates attributes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns true if the tag carries no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tag = Self::new();
        for (k, v) in iter {
            tag.set(k, v);
        }
        tag
    }
}

/// Whether a record describes a class or an interface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TypeKind {
    /// A concrete or abstract class.
    #[default]
    Class,
    /// An interface (contract).
    Interface,
}

/// A member of a type together with its persistence tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberRecord {
    /// Member name.
    pub name: String,
    /// Declared type name of the member.
    pub type_name: String,
    /// The single persistence tag attached to the member.
    pub tag: MemberTag,
}

/// The persistence tag attached to a member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberTag {
    /// Scalar attribute.
    Field(Tag),
    /// Single-valued association.
    Reference(Tag),
    /// Multi-valued association.
    Collection(Tag),
    /// Embedded value type to flatten.
    Nested(Tag),
}

/// A runtime or constant argument of a stored-procedure tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgumentTag {
    /// Argument bound to an attribute (`field-ref`, `return`).
    Runtime(Tag),
    /// Literal argument (`value`).
    Constant(Tag),
}

/// An insert/update/delete stored-procedure tag with its ordered arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcedureTag {
    /// Which operation the procedure performs.
    pub kind: ProcedureKind,
    /// Procedure-level attributes.
    pub tag: Tag,
    /// Argument tags in declaration order.
    pub arguments: Vec<ArgumentTag>,
}

impl ProcedureTag {
    /// Creates a procedure tag.
    #[must_use]
    pub fn new(kind: ProcedureKind, tag: Tag) -> Self {
        Self {
            kind,
            tag,
            arguments: Vec::new(),
        }
    }

    /// Appends a runtime argument.
    #[must_use]
    pub fn runtime(mut self, tag: Tag) -> Self {
        self.arguments.push(ArgumentTag::Runtime(tag));
        self
    }

    /// Appends a constant argument.
    #[must_use]
    pub fn constant(mut self, value: impl Into<String>) -> Self {
        self.arguments
            .push(ArgumentTag::Constant(Tag::new().with("value", value)));
        self
    }
}

/// Everything the tag parser found on one type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeRecord {
    /// Qualified type name.
    pub name: String,
    /// Class or interface.
    pub kind: TypeKind,
    /// Direct parent type, if any.
    pub parent: Option<String>,
    /// Implemented (or, for interfaces, extended) contracts.
    pub contracts: Vec<String>,
    /// Class-level persistence tag; its presence makes the type persistent.
    pub class_tag: Option<Tag>,
    /// Tagged members in declaration order.
    pub members: Vec<MemberRecord>,
    /// Class-level field tags (anonymous attributes).
    pub fields: Vec<Tag>,
    /// Class-level reference tags (anonymous references).
    pub references: Vec<Tag>,
    /// Class-level collection tags (anonymous collections).
    pub collections: Vec<Tag>,
    /// Index tags.
    pub indexes: Vec<Tag>,
    /// Stored-procedure tags.
    pub procedures: Vec<ProcedureTag>,
    /// `modify-inherited` tags.
    pub modify_inherited: Vec<Tag>,
    /// `modify-nested` tags.
    pub modify_nested: Vec<Tag>,
    /// Explicit `extent-class` references.
    pub extent_classes: Vec<String>,
    /// Names of zero-argument methods declared on the type.
    pub methods: Vec<String>,
}

impl TypeRecord {
    /// Creates a class record.
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates an interface record.
    #[must_use]
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Interface,
            ..Self::default()
        }
    }

    /// Sets the parent type.
    #[must_use]
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Adds an implemented contract.
    #[must_use]
    pub fn implements(mut self, contract: impl Into<String>) -> Self {
        self.contracts.push(contract.into());
        self
    }

    /// Marks the type persistent with an empty class tag.
    #[must_use]
    pub fn persistent(self) -> Self {
        self.with_class_tag(Tag::new())
    }

    /// Marks the type persistent with the given class tag.
    #[must_use]
    pub fn with_class_tag(mut self, tag: Tag) -> Self {
        self.class_tag = Some(tag);
        self
    }

    /// Adds a tagged member.
    #[must_use]
    pub fn member(
        mut self,
        name: impl Into<String>,
        type_name: impl Into<String>,
        tag: MemberTag,
    ) -> Self {
        self.members.push(MemberRecord {
            name: name.into(),
            type_name: type_name.into(),
            tag,
        });
        self
    }

    /// Adds a field member.
    #[must_use]
    pub fn field(self, name: impl Into<String>, type_name: impl Into<String>, tag: Tag) -> Self {
        self.member(name, type_name, MemberTag::Field(tag))
    }

    /// Adds a reference member.
    #[must_use]
    pub fn reference(
        self,
        name: impl Into<String>,
        type_name: impl Into<String>,
        tag: Tag,
    ) -> Self {
        self.member(name, type_name, MemberTag::Reference(tag))
    }

    /// Adds a collection member.
    #[must_use]
    pub fn collection(
        self,
        name: impl Into<String>,
        type_name: impl Into<String>,
        tag: Tag,
    ) -> Self {
        self.member(name, type_name, MemberTag::Collection(tag))
    }

    /// Adds a nested member.
    #[must_use]
    pub fn nested(self, name: impl Into<String>, type_name: impl Into<String>, tag: Tag) -> Self {
        self.member(name, type_name, MemberTag::Nested(tag))
    }

    /// Adds a class-level field tag.
    #[must_use]
    pub fn anonymous_field(mut self, tag: Tag) -> Self {
        self.fields.push(tag);
        self
    }

    /// Adds a class-level reference tag.
    #[must_use]
    pub fn anonymous_reference(mut self, tag: Tag) -> Self {
        self.references.push(tag);
        self
    }

    /// Adds a class-level collection tag.
    #[must_use]
    pub fn anonymous_collection(mut self, tag: Tag) -> Self {
        self.collections.push(tag);
        self
    }

    /// Adds an index tag.
    #[must_use]
    pub fn index(mut self, tag: Tag) -> Self {
        self.indexes.push(tag);
        self
    }

    /// Adds a stored-procedure tag.
    #[must_use]
    pub fn procedure(mut self, procedure: ProcedureTag) -> Self {
        self.procedures.push(procedure);
        self
    }

    /// Adds a `modify-inherited` tag.
    #[must_use]
    pub fn modify_inherited(mut self, tag: Tag) -> Self {
        self.modify_inherited.push(tag);
        self
    }

    /// Adds a `modify-nested` tag.
    #[must_use]
    pub fn modify_nested(mut self, tag: Tag) -> Self {
        self.modify_nested.push(tag);
        self
    }

    /// Adds an explicit extent class.
    #[must_use]
    pub fn extent_class(mut self, name: impl Into<String>) -> Self {
        self.extent_classes.push(name.into());
        self
    }

    /// Records a zero-argument method.
    #[must_use]
    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.methods.push(name.into());
        self
    }
}
