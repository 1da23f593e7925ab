//! End-to-end scenarios
//!
//! Small annotated models compiled from raw records to descriptor sets, and
//! how strictness changes the outcome of the same model.

mod catalog;
mod strictness;
