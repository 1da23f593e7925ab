//! Integration tests for Layer 1: Model
//!
//! Tests for raw records, the declaration analyzer, and override patches.

mod analyzer;
mod overrides;
