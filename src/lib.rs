//! Ormeta - Compiler for inherited persistence annotations
//!
//! This crate re-exports all layers of the ormeta system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: ormeta_runtime     - Compilation units, sessions, descriptor snapshots
//! Layer 2: ormeta_engine      - Type graph, resolvers, validation, pipeline
//! Layer 1: ormeta_model       - Raw tag records, typed declarations, analyzer
//! Layer 0: ormeta_foundation  - Core types (Error, AttrBag, CompileOptions)
//! ```

pub use ormeta_engine as engine;
pub use ormeta_foundation as foundation;
pub use ormeta_model as model;
pub use ormeta_runtime as runtime;
