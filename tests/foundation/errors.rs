//! Integration tests for Error types
//!
//! Tests error construction, categories, display, and context.

use ormeta_foundation::{Error, ErrorCategory, ErrorContext, ErrorKind};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_unknown_type() {
    let err = Error::unknown_type("Base", "Derived");
    assert!(matches!(err.kind, ErrorKind::UnknownType { .. }));
    let msg = format!("{err}");
    assert!(msg.contains("Base"));
    assert!(msg.contains("Derived"));
}

#[test]
fn error_duplicate_member() {
    let err = Error::duplicate_member("Order", "total");
    assert!(matches!(err.kind, ErrorKind::DuplicateMember { .. }));
    assert_eq!(err.category(), ErrorCategory::Uniqueness);
    assert!(err.to_string().contains("total"));
}

#[test]
fn error_invalid_value() {
    let err = Error::invalid_value("Order", "isolation-level", "dirty", "unknown level");
    let msg = err.to_string();
    assert!(msg.contains("\"dirty\""));
    assert!(msg.contains("isolation-level"));
    assert_eq!(err.category(), ErrorCategory::Value);
}

#[test]
fn error_missing_value() {
    let err = Error::missing_value("Order.lines", "element-class-ref");
    assert!(matches!(err.kind, ErrorKind::MissingValue { .. }));
    assert_eq!(err.category(), ErrorCategory::Value);
}

// =============================================================================
// Error Categories
// =============================================================================

#[test]
fn graph_errors() {
    for kind in [
        ErrorKind::DuplicateType("A".to_string()),
        ErrorKind::InheritanceCycle("A -> B -> A".to_string()),
        ErrorKind::NestingCycle("attr::self".to_string()),
    ] {
        assert_eq!(kind.category(), ErrorCategory::Graph);
    }
}

#[test]
fn io_errors() {
    assert_eq!(
        ErrorKind::SerializationError("bad marker".to_string()).category(),
        ErrorCategory::Io
    );
    assert_eq!(
        ErrorKind::IoError("denied".to_string()).category(),
        ErrorCategory::Io
    );
}

#[test]
fn limit_and_internal() {
    assert_eq!(Error::depth_exceeded(8, "a::b::c").category(), ErrorCategory::Limit);
    assert_eq!(
        Error::new(ErrorKind::Internal("oops".to_string())).category(),
        ErrorCategory::Internal
    );
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn new_error_has_no_context() {
    assert!(Error::duplicate_member("A", "x").context.is_none());
}

#[test]
fn with_context_replaces_context() {
    let err = Error::override_target_missing("B", "attr")
        .with_context(ErrorContext::new().with_entity("B").with_item("attr"));
    let ctx = err.context.unwrap();
    assert_eq!(ctx.entity.as_deref(), Some("B"));
    assert_eq!(ctx.item.as_deref(), Some("attr"));
    assert!(ctx.stack.is_empty());
}

#[test]
fn frames_are_kept_in_order() {
    let err = Error::unresolved("A", "b", "B", "not persistent")
        .with_frame("resolving A")
        .with_frame("compiling unit");
    let ctx = err.context.unwrap();
    assert_eq!(ctx.stack, vec!["resolving A", "compiling unit"]);
}
