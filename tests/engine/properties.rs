//! Property tests for laws the pipeline upholds for any input

use std::collections::HashMap;

use ormeta_engine::{InheritanceResolver, TypeGraph, compile};
use ormeta_foundation::{CompileOptions, ErrorKind};
use ormeta_model::{DeclarationAnalyzer, Tag, TypeRecord};
use proptest::prelude::*;

fn pk() -> Tag {
    Tag::new().with("primarykey", "true")
}

/// A chain `T0 <- T1 <- ...` where level `n` declares `fields[n]` fields and
/// optionally suppresses the first field of its parent.
fn chain(fields: &[usize], suppress: &[bool]) -> Vec<TypeRecord> {
    fields
        .iter()
        .enumerate()
        .map(|(level, count)| {
            let mut record = TypeRecord::class(format!("T{level}"));
            if level > 0 {
                record = record.extends(format!("T{}", level - 1));
                if suppress[level] && fields[level - 1] > 0 {
                    record = record.modify_inherited(
                        Tag::new()
                            .with("name", format!("f{}_0", level - 1))
                            .with("ignore", "true"),
                    );
                }
            }
            for j in 0..*count {
                record = record.field(format!("f{level}_{j}"), "int", Tag::new());
            }
            record.persistent()
        })
        .collect()
}

/// A random forest of persistent types: every fourth type is a root with a
/// primary key, the others extend an earlier type and may reference one.
fn forest(shape: &[(usize, usize, Option<usize>)]) -> Vec<TypeRecord> {
    shape
        .iter()
        .enumerate()
        .map(|(i, (parent, fields, reference))| {
            let mut record = TypeRecord::class(format!("p.T{i}")).persistent();
            if i % 4 == 0 {
                record = record.field("id", "long", pk());
            } else {
                record = record.extends(format!("p.T{}", parent % i));
            }
            for j in 0..*fields {
                let tag = if j == 0 {
                    Tag::new().with("indexed", "true")
                } else {
                    Tag::new()
                };
                record = record.field(format!("f{i}_{j}"), "string", tag);
            }
            if let Some(target) = reference {
                if i > 0 {
                    record = record.reference(format!("r{i}"), format!("p.T{}", target % i), Tag::new());
                }
            }
            record
        })
        .collect()
}

fn forest_shape() -> impl Strategy<Value = Vec<(usize, usize, Option<usize>)>> {
    prop::collection::vec((0usize..64, 0usize..4, prop::option::of(0usize..64)), 1..24)
}

proptest! {
    #[test]
    fn merge_is_monotone(
        fields in prop::collection::vec(0usize..4, 2..7),
        suppress in prop::collection::vec(any::<bool>(), 7),
    ) {
        let options = CompileOptions::default();
        let records = chain(&fields, &suppress);
        let decls = DeclarationAnalyzer::new().analyze_all(&records).unwrap();
        let graph = TypeGraph::build(decls, &options).unwrap();
        let mut resolver = InheritanceResolver::new(&graph, &options);

        for level in 1..fields.len() {
            let parent = resolver.resolve(graph.id_of(&format!("T{}", level - 1)).unwrap()).unwrap();
            let child_id = graph.id_of(&format!("T{level}")).unwrap();
            let child = resolver.resolve(child_id).unwrap();
            let ignored: Vec<&str> = graph
                .decl(child_id)
                .overrides
                .iter()
                .filter(|o| o.ignore)
                .map(|o| o.name.as_str())
                .collect();

            for member in parent.members() {
                prop_assert!(
                    child.contains(member.name()) || ignored.contains(&member.name()),
                    "T{} lost {}", level, member.name()
                );
            }
        }
    }

    #[test]
    fn shared_table_columns_are_a_then_b(a_count in 1usize..6, b_count in 1usize..6) {
        let table = || Tag::new().with("table", "TABLE");
        let mut a = TypeRecord::class("A").with_class_tag(table());
        for i in 0..a_count {
            a = a.field(format!("a{i}"), "int", Tag::new());
        }
        let mut b = TypeRecord::class("B").with_class_tag(table());
        for i in 0..b_count {
            b = b.field(format!("b{i}"), "int", Tag::new());
        }

        let set = compile(&[a, b], &CompileOptions::default()).unwrap();
        let expected: Vec<String> = (0..a_count)
            .map(|i| format!("a{i}"))
            .chain((0..b_count).map(|i| format!("b{i}")))
            .collect();
        let columns: Vec<String> = set.tables[0].columns.iter().map(|c| c.name.clone()).collect();

        prop_assert_eq!(set.tables.len(), 1);
        prop_assert_eq!(columns, expected);
        prop_assert_eq!(set.entities.len(), 2);
        prop_assert_eq!(set.entity("A").unwrap().attributes.len(), a_count);
    }

    #[test]
    fn implicit_key_needs_exactly_one_primary_key(keys in 0usize..4) {
        let mut target = TypeRecord::class("B").persistent();
        for i in 0..keys {
            target = target.field(format!("k{i}"), "int", pk());
        }
        let records = [
            TypeRecord::class("A").persistent().reference("b", "B", Tag::new()),
            target,
        ];

        match compile(&records, &CompileOptions::default()) {
            Ok(set) => {
                prop_assert_eq!(keys, 1);
                prop_assert_eq!(&set.entity("A").unwrap().associations[0].foreign_keys, &vec!["b_k0".to_string()]);
            }
            Err(err) => {
                prop_assert_ne!(keys, 1);
                prop_assert!(matches!(err.kind, ErrorKind::ForeignKeyArity { .. }), "unexpected {:?}", err.kind);
            }
        }
    }

    #[test]
    fn repeated_anonymous_fields_collapse_to_first(
        fields in prop::collection::vec((0usize..3, any::<bool>()), 1..8),
    ) {
        let names = ["a", "b", "c"];
        let mut record = TypeRecord::class("A").persistent();
        for (name, varchar) in &fields {
            let jdbc = if *varchar { "VARCHAR" } else { "INTEGER" };
            record = record.anonymous_field(Tag::new().with("name", names[*name]).with("jdbc-type", jdbc));
        }

        let mut first: Vec<(usize, bool)> = Vec::new();
        let mut conflict = false;
        let mut seen: HashMap<usize, bool> = HashMap::new();
        for (name, varchar) in &fields {
            match seen.get(name) {
                None => {
                    seen.insert(*name, *varchar);
                    first.push((*name, *varchar));
                }
                Some(kind) if kind != varchar => conflict = true,
                Some(_) => {}
            }
        }

        match compile(&[record], &CompileOptions::default()) {
            Ok(set) => {
                prop_assert!(!conflict);
                let resolved: Vec<&str> = set.entity("A").unwrap().attributes.iter().map(|a| a.name.as_str()).collect();
                let expected: Vec<&str> = first.iter().map(|(n, _)| names[*n]).collect();
                prop_assert_eq!(resolved, expected);
            }
            Err(err) => {
                prop_assert!(conflict);
                prop_assert!(matches!(err.kind, ErrorKind::DuplicateMember { .. }), "unexpected {:?}", err.kind);
            }
        }
    }

    #[test]
    fn compilation_is_idempotent(shape in forest_shape()) {
        let records = forest(&shape);
        let options = CompileOptions::default();
        let first = compile(&records, &options).unwrap();
        let second = compile(&records, &options).unwrap();
        prop_assert_eq!(first, second);
    }
}
