//! Integration tests for Layer 0: Foundation
//!
//! Tests for errors, enumerated value kinds, attribute bags, names, and options.

mod errors;
