//! Integration tests for Layer 2: Engine
//!
//! Tests for inheritance, extents, associations, tables, and the laws the
//! pipeline upholds for any input.

mod associations;
mod hierarchy;
mod properties;
