//! Arena type graph.
//!
//! Every declared type becomes a [`TypeNode`] addressed by a [`TypeId`].
//! Edges ("extends" and "implements") are ids, never references, so walks
//! are deterministic and cycles are detectable with a plain id stack.

use indexmap::IndexMap;
use ormeta_foundation::{CompileOptions, Error, ErrorKind, Result};
use ormeta_model::{EntityDecl, MemberDecl};
use tracing::debug;

/// Index of a type in the graph arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    /// Returns the arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Wraps an arena index. `TypeGraph::build` rejects arenas whose length
    /// does not fit in `u32`.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

/// A type together with its resolved edges.
#[derive(Clone, Debug)]
pub struct TypeNode {
    /// The analyzed declaration.
    pub decl: EntityDecl,
    /// Direct parent.
    pub parent: Option<TypeId>,
    /// Implemented contracts, in declaration order.
    pub contracts: Vec<TypeId>,
    /// Direct subtypes (extending or implementing), in input order.
    pub subtypes: Vec<TypeId>,
}

/// The type graph of one compilation unit.
#[derive(Clone, Debug)]
pub struct TypeGraph {
    nodes: Vec<TypeNode>,
    by_name: IndexMap<String, TypeId>,
    linearizations: Vec<Vec<TypeId>>,
}

impl TypeGraph {
    /// Builds the graph, resolving parent and contract names.
    ///
    /// # Errors
    ///
    /// Returns a graph error for duplicate types, unknown parents, contracts
    /// or nested types, and inheritance cycles. Ancestry deeper than
    /// `options.max_depth` is a limit error.
    pub fn build(decls: Vec<EntityDecl>, options: &CompileOptions) -> Result<Self> {
        let mut by_name = IndexMap::with_capacity(decls.len());
        for (index, decl) in decls.iter().enumerate() {
            let id = TypeId(u32::try_from(index).map_err(|_| {
                Error::new(ErrorKind::Internal("too many types".to_string()))
            })?);
            if by_name.insert(decl.name.clone(), id).is_some() {
                return Err(Error::new(ErrorKind::DuplicateType(decl.name.clone())));
            }
        }

        let lookup = |name: &str, referenced_by: &str| {
            by_name
                .get(name)
                .copied()
                .ok_or_else(|| Error::unknown_type(name, referenced_by))
        };

        let mut nodes = Vec::with_capacity(decls.len());
        for decl in decls {
            let parent = decl
                .parent
                .as_deref()
                .map(|p| lookup(p, &decl.name))
                .transpose()?;
            let contracts = decl
                .contracts
                .iter()
                .map(|c| lookup(c, &decl.name))
                .collect::<Result<Vec<_>>>()?;
            for member in &decl.members {
                if let MemberDecl::Nested(nested) = member {
                    lookup(&nested.type_name, &format!("{}.{}", decl.name, nested.name))?;
                }
            }
            nodes.push(TypeNode {
                decl,
                parent,
                contracts,
                subtypes: Vec::new(),
            });
        }

        for index in 0..nodes.len() {
            let id = TypeId::from_index(index);
            let supertypes: Vec<TypeId> = nodes[index]
                .parent
                .into_iter()
                .chain(nodes[index].contracts.iter().copied())
                .collect();
            for supertype in supertypes {
                let subtypes = &mut nodes[supertype.index()].subtypes;
                if !subtypes.contains(&id) {
                    subtypes.push(id);
                }
            }
        }

        let linearizations = linearize_all(&nodes, options.max_depth)?;

        debug!(types = nodes.len(), "built type graph");
        Ok(Self {
            nodes,
            by_name,
            linearizations,
        })
    }

    /// Number of types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph holds no types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates all ids in input order.
    pub fn ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        (0..self.nodes.len()).map(TypeId::from_index)
    }

    /// Returns a node.
    #[must_use]
    pub fn node(&self, id: TypeId) -> &TypeNode {
        &self.nodes[id.index()]
    }

    /// Returns a node's declaration.
    #[must_use]
    pub fn decl(&self, id: TypeId) -> &EntityDecl {
        &self.nodes[id.index()].decl
    }

    /// Returns the qualified name of a type.
    #[must_use]
    pub fn name(&self, id: TypeId) -> &str {
        &self.decl(id).name
    }

    /// Looks up a type by qualified name.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Iterates persistent types in input order.
    pub fn persistent(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.ids().filter(|id| self.decl(*id).persistent)
    }

    /// Returns the ancestry linearization, ending with `id` itself.
    ///
    /// The parent's linearization comes first, then each contract's in
    /// declaration order; repeated types keep their first position.
    #[must_use]
    pub fn linearization(&self, id: TypeId) -> &[TypeId] {
        &self.linearizations[id.index()]
    }

    /// Returns true if `id` is `ancestor` or inherits from it.
    #[must_use]
    pub fn is_subtype_of(&self, id: TypeId, ancestor: TypeId) -> bool {
        self.linearization(id).contains(&ancestor)
    }

    /// Iterates `id` and its parents, nearest first.
    pub fn parent_chain(&self, id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        std::iter::successors(Some(id), |current| self.node(*current).parent)
    }

    /// Returns the types whose declarations `id` merges, root-first, ending
    /// with `id`.
    ///
    /// A type declared with `include-inherited=false` cuts off its own
    /// ancestors, but descendants still see the types it merged.
    #[must_use]
    pub fn inheritance_scopes(&self, id: TypeId) -> Vec<TypeId> {
        let node = self.node(id);
        let mut scopes = Vec::new();
        if node.decl.options.include_inherited {
            for supertype in node.parent.iter().chain(&node.contracts) {
                for scope in self.inheritance_scopes(*supertype) {
                    if !scopes.contains(&scope) {
                        scopes.push(scope);
                    }
                }
            }
        }
        scopes.push(id);
        scopes
    }

    /// Formats a path of ids as `a -> b -> c`.
    #[must_use]
    pub fn format_path(&self, path: &[TypeId]) -> String {
        path.iter()
            .map(|id| self.name(*id))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

fn linearize_all(nodes: &[TypeNode], max_depth: usize) -> Result<Vec<Vec<TypeId>>> {
    let mut memo: Vec<Option<Vec<TypeId>>> = vec![None; nodes.len()];
    let mut stack = Vec::new();
    for index in 0..nodes.len() {
        linearize(nodes, TypeId::from_index(index), &mut memo, &mut stack, max_depth)?;
    }
    Ok(memo.into_iter().map(Option::unwrap_or_default).collect())
}

fn linearize(
    nodes: &[TypeNode],
    id: TypeId,
    memo: &mut [Option<Vec<TypeId>>],
    stack: &mut Vec<TypeId>,
    max_depth: usize,
) -> Result<Vec<TypeId>> {
    if let Some(done) = &memo[id.index()] {
        return Ok(done.clone());
    }
    let name = |id: TypeId| nodes[id.index()].decl.name.as_str();

    if let Some(pos) = stack.iter().position(|s| *s == id) {
        let path: Vec<&str> = stack[pos..].iter().map(|s| name(*s)).chain([name(id)]).collect();
        return Err(Error::new(ErrorKind::InheritanceCycle(path.join(" -> "))));
    }
    if stack.len() >= max_depth {
        return Err(Error::depth_exceeded(max_depth, name(id)));
    }

    stack.push(id);
    let node = &nodes[id.index()];
    let mut lin = Vec::new();
    for supertype in node.parent.iter().chain(&node.contracts) {
        for ancestor in linearize(nodes, *supertype, memo, stack, max_depth)? {
            if !lin.contains(&ancestor) {
                lin.push(ancestor);
            }
        }
    }
    lin.push(id);
    stack.pop();
    if lin.len() > max_depth {
        return Err(Error::depth_exceeded(max_depth, name(id)));
    }

    memo[id.index()] = Some(lin.clone());
    Ok(lin)
}
