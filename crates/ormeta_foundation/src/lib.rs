//! Core types, errors, attribute bags, and compile options for ormeta.
//!
//! This crate provides:
//! - [`Error`] - Rich error types with resolution context
//! - [`StorageType`] and the other enumerated value kinds declared by tags
//! - [`AttrBag`] - Ordered free-form name/value attribute bags
//! - [`CompileOptions`] - The immutable configuration threaded through every pass
//! - Name helpers for simple names, nested paths, and column joins

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod bag;
mod config;
mod error;
pub mod names;
mod types;

pub use bag::AttrBag;
pub use config::{CompileOptions, ExtentMode};
pub use error::{Error, ErrorCategory, ErrorContext, ErrorKind, Result};
pub use types::{
    AccessMode, Autoincrement, CascadeMode, IsolationLevel, OrderDirection, ProcedureKind,
    StorageType, Tristate, parse_bool,
};
