//! Raw tag records, typed declarations, and the declaration analyzer.
//!
//! The flow is: tag parser → [`TypeRecord`] → [`DeclarationAnalyzer`] →
//! [`EntityDecl`] → engine
//!
//! # Module Structure
//!
//! - `raw` - The input boundary: per-type records of order-preserving tags
//! - `decl` - Typed declarations for entities and their members
//! - `patch` - Typed override patches applied by name during inheritance
//! - `analyzer` - The `DeclarationAnalyzer` turning records into declarations

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod analyzer;
pub mod decl;
pub mod patch;
pub mod raw;


pub use analyzer::DeclarationAnalyzer;
pub use decl::{
    ArgumentDecl, ArgumentSource, AssociationDecl, AssociationKind, AttributeDecl, ClassOptions,
    CollectionSpec, EntityDecl, IndexDecl, Lifecycle, MemberDecl, NestedDecl, OrderBy,
    OverrideDecl, ProcedureDecl,
};
pub use patch::{Patch, PatchKey, PatchOp, PatchValue};
pub use raw::{ArgumentTag, MemberRecord, MemberTag, ProcedureTag, Tag, TypeKind, TypeRecord};
