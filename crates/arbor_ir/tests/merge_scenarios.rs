//! End-to-end merges of small translation units written in the dump format.

use arbor_ir::{merge, reader, IrError, Merger, Node, NodeId, NodeStore, SchemaBuilder, Schema};

fn id(raw: u32) -> NodeId {
    NodeId::from_raw(raw)
}

fn unit(text: &str) -> NodeStore {
    let mut store = NodeStore::new();
    reader::load(&mut store, text).unwrap();
    store
}

fn name_of(store: &NodeStore, node: &Node) -> Option<String> {
    let name = node
        .decl()
        .and_then(|d| d.name)
        .or_else(|| node.type_fields().and_then(|t| t.name))?;
    store.identifier_text(name).map(str::to_string)
}

fn named<'s>(store: &'s NodeStore, name: &str) -> Vec<(NodeId, &'s Node)> {
    store
        .iter()
        .filter(|(_, node)| !matches!(node, Node::Identifier(_)))
        .filter(|(_, node)| name_of(store, node).as_deref() == Some(name))
        .collect()
}

#[test]
fn definition_replaces_forward_declaration() {
    let mut dest = unit(
        r#"
@1 identifier_node strg: "foo" lngt: 3
@2 function_type
@3 function_decl name: @1 type: @2
@4 call_expr type: @2 fn: @3
"#,
    );
    let source = unit(
        r#"
@1 identifier_node strg: "foo" lngt: 3
@2 function_type
@3 statement_list
@4 function_decl name: @1 type: @2 body: @3
"#,
    );

    let summary = Merger::default().merge(&mut dest, &source).unwrap();
    assert_eq!(summary.overwritten, 1);

    let foo = named(&dest, "foo");
    assert_eq!(foo.len(), 1);
    let (foo_id, foo_node) = foo[0];
    assert!(foo_node.has_body());
    assert_eq!(dest.function_index("foo"), Some(foo_id));
    assert_eq!(dest.implementation_of(foo_id), Some(foo_id));

    let Node::Call(call) = dest.get(id(4)).unwrap() else {
        panic!("expected call_expr at @4");
    };
    assert_eq!(call.callee, foo_id);
}

#[test]
fn defining_variable_replaces_extern() {
    let mut dest = unit(
        r#"
@1 identifier_node strg: "x" lngt: 1
@2 identifier_node strg: "int" lngt: 3
@3 integer_type name: @2 prec: 32
@4 var_decl name: @1 type: @3 extern
"#,
    );
    let source = unit(
        r#"
@1 identifier_node strg: "int" lngt: 3
@2 integer_type name: @1 prec: 32
@3 identifier_node strg: "x" lngt: 1
@4 integer_cst type: @2 value: 0
@5 var_decl name: @3 type: @2 init: @4
"#,
    );

    merge(&mut dest, &source).unwrap();

    let xs = named(&dest, "x");
    assert_eq!(xs.len(), 1);
    let Node::VarDecl(x) = xs[0].1 else {
        panic!("expected var_decl");
    };
    assert!(!x.is_extern);
    let init = x.init.unwrap();
    assert!(matches!(dest.get(init).unwrap(), Node::IntegerCst(c) if c.value == 0));
    assert_eq!(x.decl.ty, Some(id(3)));
    assert_eq!(named(&dest, "int").len(), 1);
}

#[test]
fn identical_records_unify() {
    let mut dest = unit(
        r#"
@1 identifier_node strg: "Point" lngt: 5
@2 identifier_node strg: "x" lngt: 1
@3 identifier_node strg: "y" lngt: 1
@4 identifier_node strg: "int" lngt: 3
@5 integer_type name: @4 prec: 32
@6 record_type name: @1 struct flds: @7 flds: @8
@7 field_decl name: @2 type: @5 scpe: @6
@8 field_decl name: @3 type: @5 scpe: @6
@9 pointer_type ptd: @6
"#,
    );
    let source = unit(
        r#"
@1 identifier_node strg: "int" lngt: 3
@2 integer_type name: @1 prec: 32
@3 identifier_node strg: "Point" lngt: 5
@4 record_type name: @3 struct flds: @7 flds: @8
@5 identifier_node strg: "x" lngt: 1
@6 identifier_node strg: "y" lngt: 1
@7 field_decl name: @5 type: @2 scpe: @4
@8 field_decl name: @6 type: @2 scpe: @4
@9 identifier_node strg: "origin" lngt: 6
@10 var_decl name: @9 type: @4
"#,
    );

    let summary = Merger::default().merge(&mut dest, &source).unwrap();
    assert_eq!(summary.overwritten, 0);

    let points = named(&dest, "Point");
    assert_eq!(points.len(), 1);
    let point = points[0].0;
    assert_eq!(point, id(6));
    assert_eq!(named(&dest, "x").len(), 1);
    assert_eq!(named(&dest, "y").len(), 1);

    let origin = named(&dest, "origin");
    assert_eq!(origin.len(), 1);
    assert_eq!(origin[0].1.decl().and_then(|d| d.ty), Some(point));
    let Node::PointerType(ptr) = dest.get(id(9)).unwrap() else {
        panic!("expected pointer_type at @9");
    };
    assert_eq!(ptr.ptd, Some(point));
}

const COUNTER_UNIT: &str = r#"
@1 identifier_node strg: "int" lngt: 3
@2 integer_type name: @1 prec: 32
@3 identifier_node strg: "counter" lngt: 7
@4 var_decl name: @3 type: @2 static
"#;

fn static_names(store: &NodeStore) -> Vec<String> {
    let mut names: Vec<String> = store
        .iter()
        .filter(|(_, node)| node.is_static())
        .filter_map(|(_, node)| name_of(store, node))
        .collect();
    names.sort();
    names
}

#[test]
fn colliding_statics_survive_under_fresh_names() {
    let mut dest = unit(COUNTER_UNIT);
    merge(&mut dest, &unit(COUNTER_UNIT)).unwrap();
    assert_eq!(static_names(&dest), ["counter", "counter1"]);

    merge(&mut dest, &unit(COUNTER_UNIT)).unwrap();
    assert_eq!(static_names(&dest), ["counter", "counter1", "counter2"]);
    assert_eq!(named(&dest, "int").len(), 1);
}

#[test]
fn static_prototype_and_definition_share_one_node() {
    let source = unit(
        r#"
@1 identifier_node strg: "helper" lngt: 6
@2 function_decl name: @1 static
@3 statement_list
@4 function_decl name: @1 static body: @3
@5 identifier_node strg: "main" lngt: 4
@6 call_expr fn: @2
@7 statement_list stmt: @6
@8 function_decl name: @5 body: @7
"#,
    );
    let mut dest = NodeStore::new();
    merge(&mut dest, &source).unwrap();

    let helpers = named(&dest, "helper");
    assert_eq!(helpers.len(), 1);
    let (helper, node) = helpers[0];
    assert!(node.has_body());

    let calls: Vec<NodeId> = dest
        .iter()
        .filter_map(|(_, node)| match node {
            Node::Call(call) => Some(call.callee),
            _ => None,
        })
        .collect();
    assert_eq!(calls, [helper]);
    assert_eq!(dest.functions().count(), 2);
}

#[test]
fn unreferenced_source_identifiers_are_not_copied() {
    let source = unit(
        r#"
@1 identifier_node strg: "unused" lngt: 6
@2 identifier_node strg: "f" lngt: 1
@3 function_decl name: @2
"#,
    );
    let mut dest = NodeStore::new();
    merge(&mut dest, &source).unwrap();
    assert!(dest.find_identifier("unused").is_none());
    assert!(dest.function_index("f").is_some());
}

#[test]
fn dangling_source_reference_is_fatal() {
    let source = unit(
        r#"
@1 identifier_node strg: "g" lngt: 1
@2 function_decl name: @1 type: @9
"#,
    );
    let mut dest = NodeStore::new();
    let err = merge(&mut dest, &source).unwrap_err();
    assert!(matches!(err, IrError::UnknownNode { id, .. } if id == NodeId::from_raw(9)));
}

#[test]
fn unsupported_kind_leaves_store_untouched() {
    let mut store = unit(COUNTER_UNIT);
    let before = store.len();
    let err = SchemaBuilder::new(&mut store)
        .build_named(id(40), "for_stmt", &Schema::new())
        .unwrap_err();
    assert!(matches!(err, IrError::UnsupportedKind(kind) if kind == "for_stmt"));
    assert_eq!(store.len(), before);
    assert!(!store.is_known(id(40)));

    let err = reader::load(&mut store, "@41 while_stmt\n").unwrap_err();
    assert!(matches!(err, IrError::UnsupportedKind(_)));
    assert!(!store.is_known(id(41)));
}

#[test]
fn typedef_of_anonymous_record_unifies_with_its_members() {
    let mut dest = unit(
        r#"
@1 identifier_node strg: "int" lngt: 3
@2 integer_type name: @1 prec: 32
@3 identifier_node strg: "pair_t" lngt: 6
@4 record_type struct flds: @7
@5 type_decl name: @3 type: @6
@6 record_type name: @5 unql: @4 struct flds: @7
@7 field_decl name: @8 type: @2 scpe: @4
@8 identifier_node strg: "a" lngt: 1
"#,
    );
    let source = unit(
        r#"
@1 identifier_node strg: "pair_t" lngt: 6
@2 identifier_node strg: "a" lngt: 1
@3 identifier_node strg: "int" lngt: 3
@4 integer_type name: @3 prec: 32
@5 record_type struct flds: @8
@6 record_type name: @7 unql: @5 struct flds: @8
@7 type_decl name: @1 type: @6
@8 field_decl name: @2 type: @4 scpe: @5
@9 identifier_node strg: "p" lngt: 1
@10 var_decl name: @9 type: @6
"#,
    );

    let summary = Merger::default().merge(&mut dest, &source).unwrap();
    assert_eq!(summary.types_unified, 3);
    assert_eq!(summary.decls_unified, 2);
    assert_eq!(summary.overwritten, 0);

    let records = dest
        .iter()
        .filter(|(_, node)| matches!(node, Node::RecordType(_)))
        .count();
    assert_eq!(records, 2);
    let fields = dest
        .iter()
        .filter(|(_, node)| matches!(node, Node::FieldDecl(_)))
        .count();
    assert_eq!(fields, 1);
    assert_eq!(named(&dest, "pair_t").len(), 1);

    let p = named(&dest, "p");
    assert_eq!(p.len(), 1);
    assert_eq!(p[0].1.decl().and_then(|d| d.ty), Some(id(6)));
}

#[test]
fn forward_declared_union_is_completed() {
    let mut dest = unit(
        r#"
@1 identifier_node strg: "Value" lngt: 5
@2 union_type name: @1
@3 pointer_type ptd: @2
"#,
    );
    let source = unit(
        r#"
@1 identifier_node strg: "int" lngt: 3
@2 integer_type name: @1 prec: 32
@3 identifier_node strg: "Value" lngt: 5
@4 union_type name: @3 flds: @6
@5 identifier_node strg: "i" lngt: 1
@6 field_decl name: @5 type: @2 scpe: @4
"#,
    );

    let summary = Merger::default().merge(&mut dest, &source).unwrap();
    assert_eq!(summary.overwritten, 1);

    let unions = named(&dest, "Value");
    assert_eq!(unions.len(), 1);
    let (union_id, union) = unions[0];
    assert_eq!(union_id, id(2));
    let fields = union.record_fields().unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(dest.get(fields[0]).unwrap().decl().and_then(|d| d.scpe), Some(union_id));

    let Node::PointerType(ptr) = dest.get(id(3)).unwrap() else {
        panic!("expected pointer_type at @3");
    };
    assert_eq!(ptr.ptd, Some(union_id));
}
