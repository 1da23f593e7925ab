//! Inheritance resolution.
//!
//! A type's merged view is its parent's view, extended by its contracts'
//! views, its own anonymous and member declarations, and finally patched by
//! its override directives. Views are persistent vectors, so a descendant
//! starts from a structural copy of its parent's view and never touches it.

use im::{OrdSet, Vector};
use ormeta_foundation::{CompileOptions, Error, ErrorContext, ErrorKind, Result, names};
use ormeta_model::{AssociationDecl, AttributeDecl, MemberDecl, OverrideDecl};
use tracing::{debug, trace};

use crate::expand;
use crate::graph::{TypeGraph, TypeId};

// =============================================================================
// Merged View
// =============================================================================

/// The attributes and associations visible to one type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergedView {
    members: Vector<MemberDecl>,
    suppressed: OrdSet<String>,
}

impl MergedView {
    /// Number of visible members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if nothing is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterates members in merge order.
    pub fn members(&self) -> impl Iterator<Item = &MemberDecl> {
        self.members.iter()
    }

    /// Looks up a member by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MemberDecl> {
        self.members.iter().find(|m| m.name() == name)
    }

    /// Returns true if a member of that name is visible.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns true if an override suppressed the name.
    #[must_use]
    pub fn is_suppressed(&self, name: &str) -> bool {
        self.suppressed.contains(name)
    }

    /// Iterates attributes in merge order.
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDecl> {
        self.members.iter().filter_map(|m| match m {
            MemberDecl::Attribute(attr) => Some(attr),
            _ => None,
        })
    }

    /// Iterates associations in merge order.
    pub fn associations(&self) -> impl Iterator<Item = &AssociationDecl> {
        self.members.iter().filter_map(|m| match m {
            MemberDecl::Association(assoc) => Some(assoc),
            _ => None,
        })
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name() == name)
    }

    fn insert_local(&mut self, member: MemberDecl, entity: &str) -> Result<()> {
        if self.contains(member.name()) {
            return Err(Error::duplicate_member(entity, member.name()).with_context(
                ErrorContext::new()
                    .with_entity(entity)
                    .with_item(member.name())
                    .with_frame("redeclaring an inherited member requires modify-inherited"),
            ));
        }
        self.suppressed.remove(member.name());
        self.members.push_back(member);
        Ok(())
    }

    /// Adds a contract's members that the view does not already carry.
    fn absorb(&mut self, other: &Self, entity: &str) -> Result<()> {
        for member in &other.members {
            if self.is_suppressed(member.name()) {
                continue;
            }
            match self.get(member.name()) {
                None => self.members.push_back(member.clone()),
                Some(existing)
                    if existing.owner() == member.owner() && existing.seq() == member.seq() => {}
                Some(_) => return Err(Error::duplicate_member(entity, member.name())),
            }
        }
        self.suppressed = self.suppressed.clone().union(other.suppressed.clone());
        Ok(())
    }

    fn apply_override(
        &mut self,
        directive: &OverrideDecl,
        entity: &str,
        nested: bool,
    ) -> Result<()> {
        let position = self.position(&directive.name).filter(|pos| {
            let target = &self.members[*pos];
            if nested {
                target.name().contains(names::PATH_SEPARATOR)
            } else {
                target.owner() != entity
            }
        });
        let Some(position) = position else {
            return Err(Error::override_target_missing(entity, &directive.name));
        };

        if directive.ignore {
            let removed = self.members.remove(position);
            trace!(entity, name = %removed.name(), "suppressed member");
            self.suppressed.insert(directive.name.clone());
        } else {
            let patched = directive.apply(&self.members[position])?;
            self.members.set(position, patched);
        }
        Ok(())
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Computes merged views on demand, memoizing each type once.
#[derive(Debug)]
pub struct InheritanceResolver<'g> {
    graph: &'g TypeGraph,
    options: &'g CompileOptions,
    views: Vec<Option<MergedView>>,
    resolving: Vec<TypeId>,
}

impl<'g> InheritanceResolver<'g> {
    /// Creates a resolver over a graph.
    #[must_use]
    pub fn new(graph: &'g TypeGraph, options: &'g CompileOptions) -> Self {
        Self {
            graph,
            options,
            views: vec![None; graph.len()],
            resolving: Vec::new(),
        }
    }

    /// Returns the merged view of a type.
    ///
    /// # Errors
    ///
    /// Returns uniqueness errors for name collisions, override errors for
    /// directives without target or with invalid values, a graph error for
    /// cyclic nesting, and a limit error past `max_depth`.
    pub fn resolve(&mut self, id: TypeId) -> Result<MergedView> {
        if let Some(view) = &self.views[id.index()] {
            return Ok(view.clone());
        }

        if let Some(pos) = self.resolving.iter().position(|r| *r == id) {
            let mut path = self.resolving[pos..].to_vec();
            path.push(id);
            return Err(Error::new(ErrorKind::NestingCycle(self.graph.format_path(&path))));
        }
        if self.resolving.len() >= self.options.max_depth {
            let mut path = self.resolving.clone();
            path.push(id);
            return Err(Error::depth_exceeded(
                self.options.max_depth,
                self.graph.format_path(&path),
            ));
        }

        self.resolving.push(id);
        let result = self.merge(id);
        self.resolving.pop();

        let view = result.map_err(|e| e.with_frame(format!("resolving {}", self.graph.name(id))))?;
        self.views[id.index()] = Some(view.clone());
        Ok(view)
    }

    fn merge(&mut self, id: TypeId) -> Result<MergedView> {
        let graph = self.graph;
        let node = graph.node(id);
        let decl = &node.decl;

        let mut view = MergedView::default();
        if decl.options.include_inherited {
            if let Some(parent) = node.parent {
                view = self.resolve(parent)?;
            }
            for contract in &node.contracts {
                let inherited = self.resolve(*contract)?;
                view.absorb(&inherited, &decl.name)?;
            }
        }
        let inherited = view.len();

        for member in expand::local_members(decl)? {
            match member {
                MemberDecl::Nested(nested) => {
                    let embedded = graph
                        .id_of(&nested.type_name)
                        .ok_or_else(|| Error::unknown_type(&nested.type_name, &decl.name))?;
                    let embedded_view = self.resolve(embedded)?;
                    for flat in expand::flatten(&nested, embedded_view.members()) {
                        view.insert_local(flat, &decl.name)?;
                    }
                }
                other => view.insert_local(other, &decl.name)?,
            }
        }

        for directive in &decl.overrides {
            view.apply_override(directive, &decl.name, false)?;
        }
        for directive in &decl.nested_overrides {
            view.apply_override(directive, &decl.name, true)?;
        }

        debug!(
            entity = %decl.name,
            inherited,
            visible = view.len(),
            "merged view"
        );
        Ok(view)
    }
}

// =============================================================================
// Ordering
// =============================================================================

/// Orders attributes by their pinned positions.
///
/// Unpinned attributes keep their order. Pinned attributes are inserted in
/// ascending `(id, seq)` order at 1-based position `min(id, len + 1)`, never
/// before an attribute pinned earlier.
#[must_use]
pub fn order_attributes<'a>(
    attributes: impl IntoIterator<Item = &'a AttributeDecl>,
) -> Vec<AttributeDecl> {
    let (mut pinned, mut ordered): (Vec<AttributeDecl>, Vec<AttributeDecl>) = attributes
        .into_iter()
        .cloned()
        .partition(|attr| attr.order.is_some());
    pinned.sort_by_key(|attr| (attr.order, attr.seq));

    let mut floor = 0;
    for attr in pinned {
        let wanted = attr.order.unwrap_or_default() as usize;
        let position = wanted.saturating_sub(1).min(ordered.len()).max(floor);
        ordered.insert(position, attr);
        floor = position + 1;
    }
    ordered
}
