//! Extent propagation.
//!
//! An entity's extents are the nearest persistent subtypes along every
//! downward path. Non-persistent intermediates are walked through in
//! [`ExtentMode::Auto`]; in [`ExtentMode::Explicit`] only when their
//! effective `determine-extents` flag is on.

use ormeta_foundation::{CompileOptions, Error, ExtentMode, Result};
use tracing::trace;

use crate::graph::{TypeGraph, TypeId};

/// Computes extent lists over a type graph.
#[derive(Debug)]
pub struct ExtentPropagator<'g> {
    graph: &'g TypeGraph,
    options: &'g CompileOptions,
}

impl<'g> ExtentPropagator<'g> {
    /// Creates a propagator.
    #[must_use]
    pub fn new(graph: &'g TypeGraph, options: &'g CompileOptions) -> Self {
        Self { graph, options }
    }

    /// Returns the extents of `id`: detected ones first, then explicitly
    /// declared ones not already present.
    ///
    /// # Errors
    ///
    /// Returns a graph error for an unknown `extent-class` and a reference
    /// error when it names a type that is not a persistent subtype.
    pub fn extents(&self, id: TypeId) -> Result<Vec<TypeId>> {
        let mut found = Vec::new();
        let mut visited = Vec::new();
        self.walk(id, 0, &mut found, &mut visited)?;

        let decl = self.graph.decl(id);
        for name in &decl.extent_classes {
            let extent = self
                .graph
                .id_of(name)
                .ok_or_else(|| Error::unknown_type(name, &decl.name))?;
            if extent == id
                || !self.graph.decl(extent).persistent
                || !self.graph.is_subtype_of(extent, id)
            {
                return Err(Error::unresolved(
                    &decl.name,
                    "extent-class",
                    name,
                    "not a persistent subtype",
                ));
            }
            if !found.contains(&extent) {
                found.push(extent);
            }
        }

        trace!(entity = %decl.name, extents = found.len(), "propagated extents");
        Ok(found)
    }

    fn walk(
        &self,
        id: TypeId,
        depth: usize,
        found: &mut Vec<TypeId>,
        visited: &mut Vec<TypeId>,
    ) -> Result<()> {
        if depth >= self.options.max_depth {
            return Err(Error::depth_exceeded(self.options.max_depth, self.graph.name(id)));
        }
        for &sub in &self.graph.node(id).subtypes {
            if visited.contains(&sub) {
                continue;
            }
            visited.push(sub);
            if self.graph.decl(sub).persistent {
                found.push(sub);
            } else if self.walks_through(sub) {
                self.walk(sub, depth + 1, found, visited)?;
            }
        }
        Ok(())
    }

    fn walks_through(&self, id: TypeId) -> bool {
        match self.options.extent_mode {
            ExtentMode::Auto => true,
            ExtentMode::Explicit => self.determines_extents(id),
        }
    }

    /// Effective `determine-extents`: the nearest declaration on the parent
    /// chain, off when none is declared.
    fn determines_extents(&self, id: TypeId) -> bool {
        self.graph
            .parent_chain(id)
            .find_map(|t| self.graph.decl(t).options.determine_extents.value())
            .unwrap_or(false)
    }
}
