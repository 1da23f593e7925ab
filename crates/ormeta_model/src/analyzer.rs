//! Declaration analyzer implementation.
//!
//! Contains the `DeclarationAnalyzer` struct, which turns raw tag records
//! into typed declarations and reports every malformed value.

use ormeta_foundation::{
    AccessMode, AttrBag, Autoincrement, CascadeMode, Error, IsolationLevel, ProcedureKind, Result,
    StorageType, Tristate, names, parse_bool,
};
use tracing::trace;

use crate::decl::{
    ArgumentDecl, ArgumentSource, AssociationDecl, AssociationKind, AttributeDecl, ClassOptions,
    CollectionSpec, EntityDecl, IndexDecl, Lifecycle, MemberDecl, NestedDecl, ProcedureDecl,
};
use crate::patch::{OverrideDecl, Patch, PatchKey, PatchOp, parse_order_by};
use crate::raw::{ArgumentTag, MemberRecord, MemberTag, ProcedureTag, Tag, TypeRecord};

/// Analyzes raw records and extracts typed declarations.
///
/// The analyzer numbers every attribute, association and nested member in
/// the order it sees them; the numbers break ordering ties later on.
#[derive(Debug, Default)]
pub struct DeclarationAnalyzer {
    next_seq: u32,
}

impl DeclarationAnalyzer {
    /// Creates an analyzer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzes every record in input order.
    ///
    /// # Errors
    ///
    /// Returns the first value error encountered.
    pub fn analyze_all(&mut self, records: &[TypeRecord]) -> Result<Vec<EntityDecl>> {
        records.iter().map(|record| self.analyze(record)).collect()
    }

    /// Analyzes one record.
    ///
    /// # Errors
    ///
    /// Returns a value error for malformed enumerated, boolean or numeric
    /// values and for missing required keys.
    pub fn analyze(&mut self, record: &TypeRecord) -> Result<EntityDecl> {
        let mut decl = EntityDecl::new(&record.name, record.kind);
        decl.parent.clone_from(&record.parent);
        decl.contracts.clone_from(&record.contracts);
        decl.extent_classes.clone_from(&record.extent_classes);
        decl.methods.clone_from(&record.methods);

        if let Some(tag) = &record.class_tag {
            decl.persistent = true;
            decl.options = Self::analyze_class(&record.name, tag)?;
        }

        // Anonymous items, in the order the parser reports them.
        for tag in &record.fields {
            let attr = self.analyze_anonymous_field(&record.name, tag)?;
            decl.anonymous.push(MemberDecl::Attribute(attr));
        }
        for tag in &record.references {
            let assoc = self.analyze_anonymous_association(&record.name, tag, false)?;
            decl.anonymous.push(MemberDecl::Association(assoc));
        }
        for tag in &record.collections {
            let assoc = self.analyze_anonymous_association(&record.name, tag, true)?;
            decl.anonymous.push(MemberDecl::Association(assoc));
        }

        for member in &record.members {
            let member = self.analyze_member(&record.name, member)?;
            decl.members.push(member);
        }

        for tag in &record.indexes {
            decl.indexes.push(Self::analyze_index(&record.name, tag)?);
        }
        for proc in &record.procedures {
            decl.procedures
                .push(Self::analyze_procedure(&record.name, proc)?);
        }
        for tag in &record.modify_inherited {
            decl.overrides
                .push(Self::analyze_override(&record.name, tag, "modify-inherited")?);
        }
        for tag in &record.modify_nested {
            decl.nested_overrides
                .push(Self::analyze_override(&record.name, tag, "modify-nested")?);
        }

        trace!(
            entity = %decl.name,
            anonymous = decl.anonymous.len(),
            members = decl.members.len(),
            overrides = decl.overrides.len(),
            "analyzed record"
        );
        Ok(decl)
    }

    fn next_seq(&mut self) -> u32 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    // =========================================================================
    // Class Options
    // =========================================================================

    fn analyze_class(entity: &str, tag: &Tag) -> Result<ClassOptions> {
        let r = TagReader::new(entity, tag);
        let mut options = ClassOptions {
            table: r.text("table"),
            table_documentation: r.text("table-documentation"),
            documentation: r.text("documentation"),
            factory_class: r.text("factory-class"),
            factory_method: r.text("factory-method"),
            initialization_method: r.text("initialization-method"),
            proxy: r.text("proxy"),
            proxy_prefetching_limit: r.number("proxy-prefetching-limit")?,
            row_reader: r.text("row-reader"),
            bag: r.bag("attributes")?,
            ..ClassOptions::default()
        };
        if let Some(level) =
            r.parse("isolation-level", IsolationLevel::from_tag, "unknown isolation level")?
        {
            options.isolation = level;
        }
        if let Some(refresh) = r.flag("refresh")? {
            options.refresh = refresh;
        }
        if let Some(determine) = r.flag("determine-extents")? {
            options.determine_extents = Tristate::from(determine);
        }
        if let Some(include) = r.flag("include-inherited")? {
            options.include_inherited = include;
        }
        if let Some(generate) = r.flag("generate-repository-info")? {
            options.generate_repository_info = generate;
        }
        if let Some(generate) = r.flag("generate-table-info")? {
            options.generate_table_info = generate;
        }
        if options.factory_method.is_none() && options.factory_class.is_some() {
            return Err(Error::missing_value(entity, "factory-method"));
        }
        Ok(options)
    }

    // =========================================================================
    // Members
    // =========================================================================

    fn analyze_member(&mut self, entity: &str, member: &MemberRecord) -> Result<MemberDecl> {
        let item = format!("{entity}.{}", member.name);
        let decl = match &member.tag {
            MemberTag::Field(tag) => MemberDecl::Attribute(self.analyze_field(
                entity,
                &item,
                &member.name,
                Some(&member.type_name),
                tag,
            )?),
            MemberTag::Reference(tag) => MemberDecl::Association(self.analyze_association(
                entity,
                &item,
                &member.name,
                Some(&member.type_name),
                tag,
                false,
            )?),
            MemberTag::Collection(tag) => MemberDecl::Association(self.analyze_association(
                entity,
                &item,
                &member.name,
                None,
                tag,
                true,
            )?),
            MemberTag::Nested(_) => MemberDecl::Nested(NestedDecl {
                name: member.name.clone(),
                type_name: member.type_name.clone(),
                owner: entity.to_string(),
                seq: self.next_seq(),
            }),
        };
        Ok(decl)
    }

    fn analyze_anonymous_field(&mut self, entity: &str, tag: &Tag) -> Result<AttributeDecl> {
        let name = required_name(entity, tag, "field")?;
        let item = format!("{entity}.{name}");
        let mut attr = self.analyze_field(entity, &item, &name, None, tag)?;
        attr.access = AccessMode::Anonymous;
        Ok(attr)
    }

    fn analyze_anonymous_association(
        &mut self,
        entity: &str,
        tag: &Tag,
        collection: bool,
    ) -> Result<AssociationDecl> {
        let name = required_name(entity, tag, if collection { "collection" } else { "reference" })?;
        let item = format!("{entity}.{name}");
        let mut assoc = self.analyze_association(entity, &item, &name, None, tag, collection)?;
        assoc.access = AccessMode::Anonymous;
        Ok(assoc)
    }

    fn analyze_field(
        &mut self,
        entity: &str,
        item: &str,
        name: &str,
        type_name: Option<&str>,
        tag: &Tag,
    ) -> Result<AttributeDecl> {
        let r = TagReader::new(item, tag);

        let storage = match r.parse("jdbc-type", StorageType::from_tag, "unknown jdbc type")? {
            Some(ty) => ty,
            None => match type_name {
                Some(ty) => StorageType::for_type_name(ty).ok_or_else(|| {
                    Error::invalid_value(item, "jdbc-type", ty, "cannot derive a jdbc type")
                })?,
                None => return Err(Error::missing_value(item, "jdbc-type")),
            },
        };

        let mut attr = AttributeDecl::new(name, storage, entity);
        attr.seq = self.next_seq();
        attr.column = r.text("column");
        if let Some(length) = r.number("length")? {
            attr.length = Some(length);
        }
        attr.precision = r.number("precision")?;
        attr.scale = r.number("scale")?;
        attr.primary_key = r.flag("primarykey")?.unwrap_or(false);
        attr.nullable = match r.flag("nullable")? {
            Some(true) if attr.primary_key => {
                return Err(Error::invalid_value(
                    item,
                    "nullable",
                    "true",
                    "a primary key cannot be nullable",
                ));
            }
            Some(nullable) => nullable,
            None => !attr.primary_key,
        };
        if let Some(mode) =
            r.parse("autoincrement", Autoincrement::from_tag, "unknown autoincrement mode")?
        {
            attr.autoincrement = mode;
        }
        attr.sequence_name = r.text("sequence-name");
        if let Some(sequence) = &attr.sequence_name {
            if attr.autoincrement != Autoincrement::Engine {
                return Err(Error::invalid_value(
                    item,
                    "sequence-name",
                    sequence,
                    "requires engine autoincrement",
                ));
            }
        }
        attr.indexed = r.flag("indexed")?.unwrap_or(false);
        if let Some(access) = r.parse("access", AccessMode::from_tag, "unknown access mode")? {
            attr.access = access;
        }
        attr.locking = r.flag("locking")?.unwrap_or(false);
        if let Some(update_lock) = r.flag("update-lock")? {
            attr.update_lock = update_lock;
        }
        if (attr.locking || tag.value("update-lock").is_some()) && !storage.is_lockable() {
            return Err(Error::invalid_value(
                item,
                "locking",
                storage.as_str(),
                "locking requires INTEGER, BIGINT or TIMESTAMP",
            ));
        }
        attr.conversion = r.text("conversion");
        attr.default_fetch = r.flag("default-fetch")?.unwrap_or(false);
        attr.documentation = r.text("documentation");
        attr.column_documentation = r.text("column-documentation");
        attr.order = r.number("id")?;
        attr.bag = r.bag("attributes")?;
        Ok(attr)
    }

    fn analyze_association(
        &mut self,
        entity: &str,
        item: &str,
        name: &str,
        type_name: Option<&str>,
        tag: &Tag,
        collection: bool,
    ) -> Result<AssociationDecl> {
        let r = TagReader::new(item, tag);

        let target_key = if collection { "element-class-ref" } else { "class-ref" };
        let target = r
            .text(target_key)
            .or_else(|| type_name.map(String::from))
            .ok_or_else(|| Error::missing_value(item, target_key))?;

        let mut assoc = if collection {
            AssociationDecl::collection(name, target, entity)
        } else {
            AssociationDecl::reference(name, target, entity)
        };
        assoc.seq = self.next_seq();
        assoc.foreign_keys = r.list("foreignkey");
        assoc.lifecycle = Self::analyze_lifecycle(&r)?;
        if let Some(db) = r.flag("database-foreignkey")? {
            assoc.database_foreign_key = db;
        }
        if let Some(access) = r.parse("access", AccessMode::from_tag, "unknown access mode")? {
            assoc.access = access;
        }
        assoc.documentation = r.text("documentation");
        assoc.bag = r.bag("attributes")?;

        if collection {
            let spec = CollectionSpec {
                indirection_table: r.text("indirection-table"),
                indirection_table_documentation: r.text("indirection-table-documentation"),
                indirection_table_primary_keys: r
                    .flag("indirection-table-primarykeys")?
                    .unwrap_or(false),
                remote_foreign_keys: r.list("remote-foreignkey"),
                foreign_key_documentation: r.text("foreignkey-documentation"),
                remote_foreign_key_documentation: r.text("remote-foreignkey-documentation"),
                order_by: match tag.value("orderby") {
                    Some(raw) => parse_order_by(raw).ok_or_else(|| {
                        Error::invalid_value(item, "orderby", raw, "expected field[=ASC|DESC],...")
                    })?,
                    None => Vec::new(),
                },
                collection_class: r.text("collection-class"),
                query_customizer: r.text("query-customizer"),
            };
            if spec.indirection_table.is_none() && !spec.remote_foreign_keys.is_empty() {
                return Err(Error::invalid_value(
                    item,
                    "remote-foreignkey",
                    spec.remote_foreign_keys.join(","),
                    "requires an indirection table",
                ));
            }
            assoc.kind = AssociationKind::Collection(spec);
        }
        Ok(assoc)
    }

    fn analyze_lifecycle(r: &TagReader<'_>) -> Result<Lifecycle> {
        let mut lifecycle = Lifecycle::default();
        if let Some(v) = r.flag("auto-retrieve")? {
            lifecycle.auto_retrieve = v;
        }
        if let Some(v) = r.parse("auto-update", CascadeMode::from_tag, "unknown cascade mode")? {
            lifecycle.auto_update = v;
        }
        if let Some(v) = r.parse("auto-delete", CascadeMode::from_tag, "unknown cascade mode")? {
            lifecycle.auto_delete = v;
        }
        if let Some(v) = r.flag("refresh")? {
            lifecycle.refresh = v;
        }
        if let Some(v) = r.flag("proxy")? {
            lifecycle.proxy = v;
        }
        if let Some(v) = r.flag("otm-dependent")? {
            lifecycle.otm_dependent = v;
        }
        Ok(lifecycle)
    }

    // =========================================================================
    // Indexes, Procedures, Overrides
    // =========================================================================

    fn analyze_index(entity: &str, tag: &Tag) -> Result<IndexDecl> {
        let name = tag.value("name").map(String::from);
        let item = format!("{entity}.{}", name.as_deref().unwrap_or("<index>"));
        let r = TagReader::new(&item, tag);
        let fields = r.list("fields");

        if fields.is_empty() {
            return Err(Error::missing_value(&item, "fields"));
        }
        if name.is_none() && fields.len() > 1 {
            return Err(Error::invalid_value(
                &item,
                "fields",
                fields.join(","),
                "an unnamed index covers exactly one field",
            ));
        }

        Ok(IndexDecl {
            name,
            fields,
            unique: r.flag("unique")?.unwrap_or(false),
            documentation: r.text("documentation"),
            owner: entity.to_string(),
        })
    }

    fn analyze_procedure(entity: &str, proc: &ProcedureTag) -> Result<ProcedureDecl> {
        let item = format!("{entity}.{}", proc.kind);
        let r = TagReader::new(&item, &proc.tag);
        let name = r
            .text("name")
            .ok_or_else(|| Error::missing_value(&item, "name"))?;

        let source = match (
            r.flag("include-pk-only")?.unwrap_or(false),
            r.flag("include-all-fields")?.unwrap_or(false),
        ) {
            (true, true) => {
                return Err(Error::invalid_value(
                    &item,
                    "include-all-fields",
                    "true",
                    "include-pk-only and include-all-fields are exclusive",
                ));
            }
            (true, false) if proc.kind == ProcedureKind::Insert => {
                return Err(Error::invalid_value(
                    &item,
                    "include-pk-only",
                    "true",
                    "insert procedures need every field",
                ));
            }
            (true, false) => ArgumentSource::PrimaryKeys,
            (false, true) => ArgumentSource::AllAttributes,
            (false, false) => ArgumentSource::Explicit,
        };

        let mut arguments = Vec::with_capacity(proc.arguments.len());
        for argument in &proc.arguments {
            arguments.push(match argument {
                ArgumentTag::Runtime(tag) => {
                    let r = TagReader::new(&item, tag);
                    ArgumentDecl::Runtime {
                        field: r.text("field-ref"),
                        returns: r.flag("return")?.unwrap_or(false),
                    }
                }
                ArgumentTag::Constant(tag) => ArgumentDecl::Constant(
                    tag.get("value").unwrap_or_default().to_string(),
                ),
            });
        }

        if source != ArgumentSource::Explicit && !arguments.is_empty() {
            return Err(Error::invalid_value(
                &item,
                "runtime-argument",
                arguments.len().to_string(),
                "arguments are synthesized from fields",
            ));
        }

        Ok(ProcedureDecl {
            kind: proc.kind,
            name,
            arguments,
            return_field: r.text("return-field-ref"),
            source,
            documentation: r.text("documentation"),
            bag: r.bag("attributes")?,
            owner: entity.to_string(),
        })
    }

    fn analyze_override(entity: &str, tag: &Tag, directive: &str) -> Result<OverrideDecl> {
        let name = tag
            .value("name")
            .ok_or_else(|| Error::missing_value(format!("{entity}.{directive}"), "name"))?
            .to_string();
        let item = format!("{entity}.{name}");
        let r = TagReader::new(&item, tag);
        let ignore = r.flag("ignore")?.unwrap_or(false);

        let mut patches = Vec::new();
        for (key, raw) in tag.iter() {
            if matches!(key, "name" | "ignore") {
                continue;
            }
            let Some(patch_key) = PatchKey::from_tag(key) else {
                trace!(item = %item, key, "ignoring unknown override key");
                continue;
            };
            let op = if raw.is_empty() {
                PatchOp::Clear
            } else {
                PatchOp::Set(patch_key.parse(raw).ok_or_else(|| {
                    Error::invalid_value(&item, key, raw, "malformed override value")
                })?)
            };
            patches.push(Patch { key: patch_key, op });
        }

        Ok(OverrideDecl {
            name,
            ignore,
            patches,
            owner: entity.to_string(),
        })
    }
}

fn required_name(entity: &str, tag: &Tag, kind: &str) -> Result<String> {
    tag.value("name")
        .map(String::from)
        .ok_or_else(|| Error::missing_value(format!("{entity}.<{kind}>"), "name"))
}

/// Typed access to one tag's values, reporting errors against `item`.
struct TagReader<'a> {
    item: &'a str,
    tag: &'a Tag,
}

impl<'a> TagReader<'a> {
    fn new(item: &'a str, tag: &'a Tag) -> Self {
        Self { item, tag }
    }

    fn text(&self, key: &str) -> Option<String> {
        self.tag.value(key).map(String::from)
    }

    fn list(&self, key: &str) -> Vec<String> {
        self.tag.value(key).map(names::split_list).unwrap_or_default()
    }

    fn parse<T>(
        &self,
        key: &str,
        parse: impl FnOnce(&str) -> Option<T>,
        message: &str,
    ) -> Result<Option<T>> {
        self.tag
            .value(key)
            .map(|raw| {
                parse(raw).ok_or_else(|| Error::invalid_value(self.item, key, raw, message))
            })
            .transpose()
    }

    fn flag(&self, key: &str) -> Result<Option<bool>> {
        self.parse(key, parse_bool, "expected true or false")
    }

    fn number(&self, key: &str) -> Result<Option<u32>> {
        self.parse(key, |raw| raw.trim().parse().ok(), "expected a non-negative number")
    }

    fn bag(&self, key: &str) -> Result<AttrBag> {
        Ok(self
            .parse(key, AttrBag::parse, "expected key=value,...")?
            .unwrap_or_default())
    }
}
