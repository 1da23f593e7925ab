//! Integration tests for Layer 3: Runtime
//!
//! Tests for descriptor snapshots and multi-unit sessions.

mod sessions;
mod snapshots;
