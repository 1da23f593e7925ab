//! Compilation units, sessions, and descriptor snapshots for ormeta.
//!
//! This crate provides:
//! - [`Session`] - Independent compilation of named [`CompileUnit`]s
//! - Parallel runs of one session under several option sets
//! - Descriptor snapshot serialization and deserialization

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod serialize;
pub mod session;

pub use serialize::{
    UnitSnapshot, from_snapshot, load_snapshot, save_snapshot, to_snapshot, units_from_snapshot,
    units_to_snapshot,
};
pub use session::{CompileUnit, Session, UnitOutcome};
