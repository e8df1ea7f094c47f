use super::*;
use crate::compiler::ir::{BuiltinKind, Member, MetaId, Rank, TypeRef};
use crate::compiler::semantics::{SemanticError, Warning};

fn expect_err(tree: Vec<Decl>) -> SemanticError {
    let (result, ..) = run(tree);
    match result {
        Err(e) => e.inner(),
        Ok(_) => panic!("expected a fatal error"),
    }
}

fn first_field<'a>(o: &'a Object) -> &'a crate::compiler::ir::Field {
    match &o.fields[0] {
        Member::Field(f) => f,
        other => panic!("unexpected member {:?}", other),
    }
}

#[test]
fn field_type_resolves_and_links() {
    let tree = vec![
        fssuper(vec![scalar("root", "struct inode", vec![])]),
        strukt("inode", vec![anno("FSSTRUCT", &[])], vec![scalar("n", "le32", vec![])]),
    ];
    let (result, diag, st) = run(tree);
    let fs = result.expect("compilation failed");
    assert!(diag.is_clean());

    let sb = fs.object(fs.super_id.expect("no super"));
    let inode = obj(&fs, &st, "struct inode");
    match first_field(sb).ty {
        TypeRef::Resolved(MetaId::Object(id)) => {
            assert_eq!(fs.object(id).typename, inode.typename)
        }
        other => panic!("field did not resolve: {:?}", other),
    }
    assert_eq!(inode.refcount(), 1);
}

#[test]
fn unresolved_field_type_warns_but_continues() {
    let tree = vec![fssuper(vec![scalar("x", "struct nope", vec![])])];
    let (result, diag, _st) = run(tree);
    assert!(result.is_ok());
    assert!(!diag.is_clean());
    assert!(diag
        .warnings()
        .iter()
        .any(|w| matches!(w, Warning::UnresolvedFieldType { .. })));
}

#[test]
fn enum_typed_field_becomes_builtin_with_binding() {
    let tree = vec![
        fssuper(vec![scalar("c", "color_t", vec![])]),
        Decl::Enum(EnumDecl {
            name: "color".into(),
            aliases: vec!["color_t".into()],
            anno: anno("FSCONST", &[]),
            enumerators: vec![Enumerator {
                name: "RED".into(),
                value: None,
                line: 1,
            }],
            line: 1,
        }),
    ];
    let (result, diag, _st) = run(tree);
    let fs = result.expect("compilation failed");
    assert!(diag.is_clean());
    let f = first_field(fs.object(fs.super_id.expect("no super")));
    assert_eq!(f.ty, TypeRef::Builtin(BuiltinKind::Enum));
    assert!(f.category.is_some());
    assert_eq!(fs.enums[0].refcount, 1);
}

#[test]
fn undeclared_enum_binding_is_fatal() {
    let tree = vec![fssuper(vec![scalar(
        "c",
        "le32",
        vec![anno("FIELD", &[("type", "nope_t")])],
    )])];
    match expect_err(tree) {
        SemanticError::EnumNotFound { .. } => (),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn pseudo_enum_binding_is_accepted() {
    let tree = vec![fssuper(vec![scalar(
        "mtime",
        "le64",
        vec![anno("FIELD", &[("type", "timestamp")])],
    )])];
    let (result, diag, _st) = run(tree);
    let fs = result.expect("compilation failed");
    assert!(diag.is_clean());
    assert!(first_field(fs.object(fs.super_id.expect("no super")))
        .category
        .is_none());
}

#[test]
fn pointer_to_builtin_is_fatal() {
    let tree = vec![fssuper(vec![scalar(
        "p",
        "le32",
        vec![anno("POINTER", &[("repr", "byte"), ("type", "le32")])],
    )])];
    match expect_err(tree) {
        SemanticError::PointerToBuiltin { .. } => (),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn offset_pointer_to_object_is_accepted() {
    let tree = vec![
        fssuper(vec![scalar(
            "root",
            "le64",
            vec![anno("POINTER", &[("repr", "offset"), ("type", "struct inode")])],
        )]),
        strukt("inode", vec![anno("FSSTRUCT", &[])], vec![scalar("n", "le32", vec![])]),
    ];
    let (result, diag, _st) = run(tree);
    let fs = result.expect("compilation failed");
    assert!(diag.is_clean());
    let ptr = &first_field(fs.object(fs.super_id.expect("no super"))).pointers[0];
    assert!(ptr.target.is_some());
    assert!(ptr.addrspace.is_some());
}

#[test]
fn non_offset_pointer_to_object_is_fatal() {
    let tree = vec![
        fssuper(vec![scalar(
            "root",
            "le64",
            vec![anno("POINTER", &[("repr", "byte"), ("type", "struct inode")])],
        )]),
        strukt("inode", vec![anno("FSSTRUCT", &[])], vec![scalar("n", "le32", vec![])]),
    ];
    match expect_err(tree) {
        SemanticError::NonOffsetToObject { .. } => (),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn offset_pointer_to_container_is_fatal() {
    let tree = vec![
        fssuper(vec![scalar(
            "bmap",
            "le64",
            vec![anno("POINTER", &[("repr", "offset"), ("type", "blocks")])],
        )]),
        Decl::Directive(anno("VECTOR", &[("name", "blocks"), ("type", "data")])),
    ];
    match expect_err(tree) {
        SemanticError::OffsetToNonObject { .. } => (),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn mixing_offset_and_plain_pointers_is_fatal() {
    let tree = vec![
        fssuper(vec![scalar(
            "p",
            "le64",
            vec![
                anno("POINTER", &[("repr", "offset"), ("type", "struct inode")]),
                anno("POINTER", &[("repr", "byte"), ("type", "blocks")]),
            ],
        )]),
        strukt("inode", vec![anno("FSSTRUCT", &[])], vec![]),
        Decl::Directive(anno("VECTOR", &[("name", "blocks"), ("type", "data")])),
    ];
    match expect_err(tree) {
        SemanticError::MixedOffsetPointers(_) => (),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn mixing_conditional_and_plain_pointers_is_fatal() {
    let tree = vec![
        fssuper(vec![scalar(
            "p",
            "le64",
            vec![
                anno(
                    "POINTER",
                    &[("repr", "byte"), ("type", "blocks"), ("when", "sb.v == 2")],
                ),
                anno("POINTER", &[("repr", "byte"), ("type", "blocks")]),
            ],
        )]),
        Decl::Directive(anno("VECTOR", &[("name", "blocks"), ("type", "data")])),
    ];
    match expect_err(tree) {
        SemanticError::MixedConditionalPointers(_) => (),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn pointer_storage_mismatch_warns_once_and_dedups() {
    let tree = vec![
        fssuper(vec![
            scalar(
                "a",
                "le32",
                vec![anno("POINTER", &[("repr", "byte"), ("type", "blocks")])],
            ),
            scalar(
                "b",
                "le64",
                vec![anno("POINTER", &[("repr", "byte"), ("type", "blocks")])],
            ),
        ]),
        Decl::Directive(anno("VECTOR", &[("name", "blocks"), ("type", "data")])),
    ];
    let (result, diag, _st) = run(tree);
    let fs = result.expect("compilation failed");
    assert_eq!(fs.pointer_table.len(), 1);
    let mismatches = diag
        .warnings()
        .iter()
        .filter(|w| matches!(w, Warning::PointerStorageMismatch { .. }))
        .count();
    assert_eq!(mismatches, 1);
}

#[test]
fn unresolved_addrspace_warns() {
    let tree = vec![
        fssuper(vec![scalar(
            "bmap",
            "le64",
            vec![anno("POINTER", &[("repr", "cluster"), ("type", "blocks")])],
        )]),
        Decl::Directive(anno("VECTOR", &[("name", "blocks"), ("type", "data")])),
    ];
    let (result, diag, _st) = run(tree);
    assert!(result.is_ok());
    assert!(diag
        .warnings()
        .iter()
        .any(|w| matches!(w, Warning::UnresolvedAddrspace { .. })));
}

#[test]
fn declared_addrspace_binds_by_exact_name() {
    let tree = vec![
        Decl::Directive(anno(
            "ADDRSPACE",
            &[("name", "cluster"), ("size", "4"), ("null", "0")],
        )),
        fssuper(vec![scalar(
            "bmap",
            "le64",
            vec![anno("POINTER", &[("repr", "cluster"), ("type", "blocks")])],
        )]),
        Decl::Directive(anno("VECTOR", &[("name", "blocks"), ("type", "data")])),
    ];
    let (result, diag, st) = run(tree);
    let fs = result.expect("compilation failed");
    assert!(diag.is_clean());
    let ptr = &first_field(fs.object(fs.super_id.expect("no super"))).pointers[0];
    let space = fs.addrspace(ptr.addrspace.expect("no addrspace bound"));
    assert_eq!(st.get(space.name).as_deref(), Ok("cluster"));
    assert!(!space.generic);
}

fn grp_pointer() -> AstMember {
    scalar(
        "g",
        "le64",
        vec![anno("POINTER", &[("repr", "byte"), ("type", "struct grp")])],
    )
}

#[test]
fn container_struct_embedding_nonobject_is_fatal() {
    let tree = vec![
        fssuper(vec![grp_pointer()]),
        strukt(
            "grp",
            vec![anno("FSSTRUCT", &[("rank", "container")])],
            vec![scalar("bm", "blocks", vec![])],
        ),
        Decl::Directive(anno("VECTOR", &[("name", "blocks"), ("type", "data")])),
    ];
    match expect_err(tree) {
        SemanticError::ContainerFieldRank { .. } => (),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn container_struct_of_objects_is_accepted() {
    let tree = vec![
        fssuper(vec![grp_pointer()]),
        strukt(
            "grp",
            vec![anno("FSSTRUCT", &[("rank", "container")])],
            vec![scalar("i", "struct inode", vec![])],
        ),
        strukt("inode", vec![anno("FSSTRUCT", &[])], vec![scalar("n", "le32", vec![])]),
    ];
    let (result, diag, _st) = run(tree);
    assert!(result.is_ok());
    assert!(diag.is_clean());
}

#[test]
fn super_block_embedding_nonobject_is_fatal() {
    let tree = vec![
        fssuper(vec![scalar("g", "struct grp", vec![])]),
        strukt(
            "grp",
            vec![anno("FSSTRUCT", &[("rank", "container")])],
            vec![],
        ),
    ];
    match expect_err(tree) {
        SemanticError::ContainerFieldRank { .. } => (),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn plain_pointer_to_super_block_is_accepted() {
    let tree = vec![
        fssuper(vec![scalar("i", "struct inode", vec![])]),
        strukt(
            "inode",
            vec![anno("FSSTRUCT", &[])],
            vec![scalar(
                "parent",
                "le64",
                vec![anno("POINTER", &[("repr", "byte"), ("type", "struct sb")])],
            )],
        ),
    ];
    let (result, diag, st) = run(tree);
    let fs = result.expect("compilation failed");
    assert!(diag.is_clean());
    let inode = obj(&fs, &st, "struct inode");
    let ptr = &first_field(inode).pointers[0];
    assert_eq!(ptr.target, Some(MetaId::Object(fs.super_id.expect("no super"))));
}

#[test]
fn derived_rank_is_raised_and_size_inherited() {
    // base is referenced through the inheritance edge alone.
    let tree = vec![
        fssuper(vec![]),
        strukt(
            "base",
            vec![anno("FSSTRUCT", &[("rank", "container"), ("size", "64")])],
            vec![],
        ),
        strukt(
            "derived",
            vec![anno("FSSTRUCT", &[("base", "struct base"), ("when", "b.kind == 1")])],
            vec![],
        ),
    ];
    let (result, diag, st) = run(tree);
    let fs = result.expect("compilation failed");
    assert!(diag.is_clean());
    let d = obj(&fs, &st, "struct derived");
    assert_eq!(d.rank, Rank::Container);
    assert_eq!(d.size.as_ref().map(|s| s.text()), Some("64"));
    assert!(d.base.as_ref().and_then(|b| b.target).is_some());
}

#[test]
fn explicit_extent_over_lower_base_is_fatal() {
    let tree = vec![
        fssuper(vec![scalar("b", "struct base", vec![])]),
        strukt("base", vec![anno("FSSTRUCT", &[])], vec![]),
        strukt(
            "derived",
            vec![anno(
                "FSSTRUCT",
                &[("base", "struct base"), ("rank", "extent"), ("size", "64")],
            )],
            vec![],
        ),
    ];
    match expect_err(tree) {
        SemanticError::ExtentBaseRank { .. } => (),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn direct_extent_struct_is_unsupported() {
    let tree = vec![
        fssuper(vec![]),
        strukt(
            "big",
            vec![anno("FSSTRUCT", &[("rank", "extent"), ("size", "1024")])],
            vec![],
        ),
    ];
    match expect_err(tree) {
        SemanticError::ExtentUnsupported(_) => (),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn extent_without_size_reports_the_size_first() {
    let tree = vec![
        fssuper(vec![]),
        strukt("big", vec![anno("FSSTRUCT", &[("rank", "extent")])], vec![]),
    ];
    match expect_err(tree) {
        SemanticError::ExtentSizeMissing(_) => (),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn missing_base_is_fatal() {
    let tree = vec![
        fssuper(vec![]),
        strukt(
            "derived",
            vec![anno("FSSTRUCT", &[("base", "struct nope")])],
            vec![],
        ),
    ];
    match expect_err(tree) {
        SemanticError::BaseNotFound { .. } => (),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn unused_types_and_enums_warn() {
    let tree = vec![
        fssuper(vec![]),
        strukt("orphan", vec![anno("FSSTRUCT", &[])], vec![]),
        enum_decl("color", None, &[("RED", None)]),
    ];
    let (result, diag, _st) = run(tree);
    assert!(result.is_ok());
    assert!(diag
        .warnings()
        .iter()
        .any(|w| matches!(w, Warning::UnusedType(_))));
    assert!(diag
        .warnings()
        .iter()
        .any(|w| matches!(w, Warning::UnusedCategory(_))));
}

#[test]
fn xrefs_collect_in_declaration_order() {
    let tree = vec![
        fssuper(vec![
            scalar("g", "struct grp", vec![]),
            scalar("i", "struct inode", vec![]),
        ]),
        strukt(
            "grp",
            vec![anno("FSSTRUCT", &[("name", "grp")])],
            vec![scalar("n", "le32", vec![])],
        ),
        strukt(
            "inode",
            vec![anno("FSSTRUCT", &[("name", "ino")])],
            vec![scalar("n", "le32", vec![])],
        ),
    ];
    let (result, diag, st) = run(tree);
    let fs = result.expect("compilation failed");
    assert!(diag.is_clean());
    let names: Vec<String> = fs
        .xrefs
        .iter()
        .map(|&id| st.get(fs.object(id).xref.expect("missing xref")).expect("bad id"))
        .collect();
    assert_eq!(names, vec!["grp".to_string(), "ino".to_string()]);

    // Lexical query: which xref'd objects does an expression mention.
    let mut e = crate::compiler::ir::CExpr::new("grp.first_block + 4");
    e.analyze(&st);
    let hits = fs.xrefs_in(&e);
    assert_eq!(hits.len(), 1);
    assert_eq!(fs.object(hits[0]).xref, st.find("grp"));
}
