//! Type graph, inheritance resolution, and descriptor assembly for ormeta.
//!
//! This crate provides:
//! - [`TypeGraph`] - The arena of declared types with parent and contract edges
//! - [`InheritanceResolver`] - Merged member views with overrides applied
//! - [`ExtentPropagator`] - Nearest persistent subtypes
//! - [`AssociationResolver`] - Foreign-key resolution and synthesis
//! - [`TableResolver`] - Shared-table and indirection-table merging
//! - [`compile`] - The whole pipeline, producing a [`DescriptorSet`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod association;
pub mod descriptor;
mod entity;
mod expand;
mod extent;
mod graph;
mod index;
mod inherit;
mod pipeline;
mod procedure;
mod table;
mod validate;

pub use association::AssociationResolver;
pub use descriptor::{
    AssociationDescriptor, AssociationShape, AttributeDescriptor, CollectionDescriptor,
    ColumnDescriptor, DescriptorSet, EntityDescriptor, FactoryBinding, ForeignKeyDescriptor,
    IndexDescriptor, ProcedureDescriptor, TableDescriptor, TableIndex, Warning,
};
pub use entity::{EntityState, EntityStates, collect_states};
pub use extent::ExtentPropagator;
pub use graph::{TypeGraph, TypeId, TypeNode};
pub use index::resolve_indexes;
pub use inherit::{InheritanceResolver, MergedView, order_attributes};
pub use pipeline::{compile, compile_declarations};
pub use procedure::resolve_procedures;
pub use table::{TableResolver, table_name};
pub use validate::Diagnostics;
