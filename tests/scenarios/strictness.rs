//! The same model under strict and lenient options.
//!
//! Lenient compilation passes unresolved bindings through as opaque values
//! and reports each one as a warning; strict compilation fails on the first.

use ormeta_engine::compile;
use ormeta_foundation::{CompileOptions, ErrorCategory};
use ormeta_model::{Tag, TypeRecord};

fn model() -> Vec<TypeRecord> {
    vec![
        TypeRecord::class("app.Factory").method("create"),
        TypeRecord::class("app.Account")
            .with_class_tag(
                Tag::new()
                    .with("factory-class", "app.Factory")
                    .with("factory-method", "build")
                    .with("proxy", "app.AccountProxy"),
            )
            .field("id", "int", Tag::new().with("primarykey", "true")),
        TypeRecord::class("app.Statement")
            .persistent()
            .field("id", "int", Tag::new().with("primarykey", "true"))
            .reference(
                "account",
                "app.Account",
                Tag::new().with("foreignkey", "accountId"),
            ),
    ]
}

#[test]
fn strict_compilation_fails_on_first_unresolved_binding() {
    let err = compile(&model(), &CompileOptions::strict()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Reference);
}

#[test]
fn lenient_compilation_reports_every_unresolved_binding() {
    let set = compile(&model(), &CompileOptions::lenient()).unwrap();

    let entities: Vec<_> = set.warnings.iter().map(|w| w.entity.as_str()).collect();
    assert_eq!(entities, vec!["app.Statement", "app.Account", "app.Account"]);

    let account = set.entity("app.Account").unwrap();
    let factory = account.factory.as_ref().unwrap();
    assert_eq!(factory.class.as_deref(), Some("app.Factory"));
    assert_eq!(factory.method, "build");
    assert_eq!(account.proxy.as_deref(), Some("app.AccountProxy"));
}

#[test]
fn resolvable_bindings_produce_no_warnings() {
    let mut records = model();
    records[1] = TypeRecord::class("app.Account")
        .with_class_tag(
            Tag::new()
                .with("factory-class", "app.Factory")
                .with("factory-method", "create")
                .with("proxy", "dynamic"),
        )
        .field("id", "int", Tag::new().with("primarykey", "true"));
    records[2] = TypeRecord::class("app.Statement")
        .persistent()
        .field("id", "int", Tag::new().with("primarykey", "true"))
        .field("accountId", "int", Tag::new())
        .reference("account", "app.Account", Tag::new().with("foreignkey", "accountId"));

    let set = compile(&records, &CompileOptions::strict()).unwrap();
    assert!(set.warnings.is_empty());
}

#[test]
fn uniqueness_errors_are_never_downgraded() {
    let records = [TypeRecord::class("A")
        .persistent()
        .anonymous_field(Tag::new().with("name", "x").with("jdbc-type", "INTEGER"))
        .field("x", "int", Tag::new())];
    let err = compile(&records, &CompileOptions::lenient()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Uniqueness);
}
