//! The compilation pipeline.
//!
//! Each pass consumes the complete output of the previous one:
//!
//! 1. analyze records into declarations
//! 2. build the type graph
//! 3. resolve merged views into entity states
//! 4. resolve associations, synthesizing foreign keys
//! 5. validate bindings and member names, resolve indexes, procedures and extents
//! 6. merge tables
//!
//! The first error aborts the whole unit; no partial descriptor set is
//! returned.

use ormeta_foundation::{CompileOptions, ErrorContext, Result};
use ormeta_model::{DeclarationAnalyzer, EntityDecl, TypeRecord};
use tracing::{debug, instrument};

use crate::association::AssociationResolver;
use crate::descriptor::{
    AssociationDescriptor, AttributeDescriptor, DescriptorSet, EntityDescriptor, FactoryBinding,
};
use crate::entity::{EntityState, collect_states};
use crate::extent::ExtentPropagator;
use crate::graph::TypeGraph;
use crate::index::resolve_indexes;
use crate::procedure::resolve_procedures;
use crate::table::TableResolver;
use crate::validate::{Diagnostics, check_class_bindings, check_unique_members};

/// Compiles raw records into a descriptor set.
///
/// # Errors
///
/// Returns the first value, graph, override, uniqueness or reference error.
/// Downgradable reference problems become warnings in lenient mode.
#[instrument(skip_all, fields(records = records.len(), catalog = %options.catalog))]
pub fn compile(records: &[TypeRecord], options: &CompileOptions) -> Result<DescriptorSet> {
    let decls = DeclarationAnalyzer::new().analyze_all(records)?;
    compile_declarations(decls, options)
}

/// Compiles already analyzed declarations.
///
/// # Errors
///
/// See [`compile`].
pub fn compile_declarations(
    decls: Vec<EntityDecl>,
    options: &CompileOptions,
) -> Result<DescriptorSet> {
    let graph = TypeGraph::build(decls, options)?;
    let mut states = collect_states(&graph, options)?;
    let mut diagnostics = Diagnostics::new(options);
    AssociationResolver::new(&graph, &mut diagnostics).resolve_all(&mut states)?;

    let propagator = ExtentPropagator::new(&graph, options);
    let mut entities = Vec::with_capacity(states.len());
    for state in states.values() {
        let entity = describe(&graph, &propagator, state, &mut diagnostics).map_err(|mut e| {
            let context = e.context.get_or_insert_with(ErrorContext::new);
            if context.entity.is_none() {
                context.entity = Some(state.name.clone());
            }
            e
        })?;
        entities.push(entity);
    }

    let tables = TableResolver::new(&graph).resolve(&entities)?;
    debug!(
        entities = entities.len(),
        tables = tables.len(),
        warnings = diagnostics.len(),
        "compiled unit"
    );
    Ok(DescriptorSet {
        catalog: options.catalog.clone(),
        entities,
        tables,
        warnings: diagnostics.into_warnings(),
    })
}

fn describe(
    graph: &TypeGraph,
    propagator: &ExtentPropagator<'_>,
    state: &EntityState,
    diagnostics: &mut Diagnostics,
) -> Result<EntityDescriptor> {
    check_class_bindings(graph, state.id, diagnostics)?;
    check_unique_members(state)?;

    let decl = graph.decl(state.id);
    let options = &decl.options;
    let extents = propagator
        .extents(state.id)?
        .into_iter()
        .map(|id| graph.name(id).to_string())
        .collect();

    Ok(EntityDescriptor {
        name: state.name.clone(),
        kind: decl.kind,
        table: state.table.clone(),
        table_documentation: options.table_documentation.clone(),
        documentation: options.documentation.clone(),
        isolation: options.isolation,
        factory: options.factory_method.as_ref().map(|method| FactoryBinding {
            class: options.factory_class.clone(),
            method: method.clone(),
        }),
        initialization_method: options.initialization_method.clone(),
        proxy: options.proxy.clone(),
        proxy_prefetching_limit: options.proxy_prefetching_limit,
        refresh: options.refresh,
        row_reader: options.row_reader.clone(),
        generate_repository_info: options.generate_repository_info,
        attributes: state.attributes.iter().map(AttributeDescriptor::from).collect(),
        associations: state
            .associations
            .iter()
            .map(AssociationDescriptor::from)
            .collect(),
        indexes: resolve_indexes(graph, state)?,
        procedures: resolve_procedures(graph, state)?,
        extents,
        bag: options.bag.clone(),
    })
}
