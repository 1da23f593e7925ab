//! Invariant checks and the strictness-aware diagnostics sink.

use ormeta_foundation::{CompileOptions, Error, ErrorContext, Result};
use tracing::warn;

use crate::descriptor::Warning;
use crate::entity::EntityState;
use crate::graph::{TypeGraph, TypeId};

/// Collects downgraded reference errors.
///
/// Only reference checks that may pass an opaque value through call
/// [`Diagnostics::downgrade`]; every other error is returned directly.
#[derive(Debug)]
pub struct Diagnostics {
    strict: bool,
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Creates a sink for the given options.
    #[must_use]
    pub fn new(options: &CompileOptions) -> Self {
        Self {
            strict: options.strict,
            warnings: Vec::new(),
        }
    }

    /// Returns `err` in strict mode, records it as a warning otherwise.
    ///
    /// # Errors
    ///
    /// Returns `err` unchanged in strict mode.
    pub fn downgrade(&mut self, entity: &str, err: Error) -> Result<()> {
        if self.strict {
            return Err(err);
        }
        warn!(entity, error = %err, "accepting unresolved reference");
        self.warnings.push(Warning {
            entity: entity.to_string(),
            message: err.to_string(),
        });
        Ok(())
    }

    /// Number of recorded warnings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    /// Returns true if nothing was downgraded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Consumes the sink, returning the warnings in report order.
    #[must_use]
    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

/// Checks factory, initializer and proxy bindings of a persistent type.
///
/// Methods are looked up on the type and its ancestry; a factory class must
/// be a known type declaring the method.
pub(crate) fn check_class_bindings(
    graph: &TypeGraph,
    id: TypeId,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let decl = graph.decl(id);
    let options = &decl.options;

    if let Some(method) = &options.factory_method {
        let holder = match &options.factory_class {
            Some(class) => {
                let found = graph.id_of(class);
                if found.is_none() {
                    diagnostics.downgrade(
                        &decl.name,
                        Error::unresolved(&decl.name, "factory-class", class, "unknown type"),
                    )?;
                }
                found
            }
            None => Some(id),
        };
        if let Some(holder) = holder {
            if !declares_method(graph, holder, method) {
                diagnostics.downgrade(
                    &decl.name,
                    Error::unresolved(
                        &decl.name,
                        "factory-method",
                        method,
                        format!("{} declares no such zero-argument method", graph.name(holder)),
                    ),
                )?;
            }
        }
    }

    if let Some(method) = &options.initialization_method {
        if !declares_method(graph, id, method) {
            diagnostics.downgrade(
                &decl.name,
                Error::unresolved(
                    &decl.name,
                    "initialization-method",
                    method,
                    "no such zero-argument method",
                ),
            )?;
        }
    }

    if let Some(proxy) = &options.proxy {
        if proxy != "dynamic" && graph.id_of(proxy).is_none() {
            diagnostics.downgrade(
                &decl.name,
                Error::unresolved(&decl.name, "proxy", proxy, "unknown proxy type"),
            )?;
        }
    }
    Ok(())
}

fn declares_method(graph: &TypeGraph, id: TypeId, method: &str) -> bool {
    graph
        .linearization(id)
        .iter()
        .any(|t| graph.decl(*t).methods.iter().any(|m| m == method))
}

/// Checks that attribute and association names are unique in a final state.
pub(crate) fn check_unique_members(state: &EntityState) -> Result<()> {
    let names: Vec<&str> = state
        .attributes
        .iter()
        .map(|a| a.name.as_str())
        .chain(state.associations.iter().map(|a| a.name.as_str()))
        .collect();
    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Err(Error::duplicate_member(&state.name, *name)
                .with_context(ErrorContext::new().with_entity(&state.name).with_item(*name)));
        }
    }
    Ok(())
}
