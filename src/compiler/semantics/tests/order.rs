use super::*;

#[test]
fn super_block_alone_orders_trivially() {
    let (result, diag, st) = run(vec![fssuper(vec![])]);
    let fs = result.expect("compilation failed");
    assert!(diag.is_clean());
    assert_eq!(table_names(&fs, &st), vec!["struct sb".to_string()]);
    assert!(fs.forward_decl.is_empty());
}

#[test]
fn embedded_types_come_before_their_embedders() {
    // sb embeds a, a embeds the vector, the vector holds b.  The pointer
    // from b back to a is a reference, not an embedding, and must not
    // constrain the order.
    let tree = vec![
        fssuper(vec![scalar("root", "struct a", vec![])]),
        strukt(
            "a",
            vec![anno("FSSTRUCT", &[])],
            vec![scalar("blks", "blocks", vec![])],
        ),
        Decl::Directive(anno("VECTOR", &[("name", "blocks"), ("type", "struct b")])),
        strukt(
            "b",
            vec![anno("FSSTRUCT", &[])],
            vec![scalar(
                "back",
                "le64",
                vec![anno("POINTER", &[("repr", "offset"), ("type", "struct a")])],
            )],
        ),
    ];
    let (result, diag, st) = run(tree);
    let fs = result.expect("compilation failed");
    assert!(diag.is_clean());
    assert_eq!(
        table_names(&fs, &st),
        vec![
            "struct b".to_string(),
            "blocks".to_string(),
            "struct a".to_string(),
            "struct sb".to_string(),
        ]
    );
    assert!(forward_names(&fs, &st).is_empty());
}

#[test]
fn pointer_only_vector_still_enters_the_table() {
    // The vector is reached exclusively through a pointer, yet it and the
    // struct embedded beneath it still need declarations.
    let tree = vec![
        fssuper(vec![scalar(
            "itab",
            "le64",
            vec![anno("POINTER", &[("repr", "byte"), ("type", "inode_table")])],
        )]),
        Decl::Directive(anno(
            "VECTOR",
            &[("name", "inode_table"), ("type", "struct dinode")],
        )),
        strukt(
            "dinode",
            vec![anno("FSSTRUCT", &[])],
            vec![scalar("n", "le32", vec![])],
        ),
    ];
    let (result, diag, st) = run(tree);
    let fs = result.expect("compilation failed");
    assert!(diag.is_clean());
    assert_eq!(
        table_names(&fs, &st),
        vec![
            "struct dinode".to_string(),
            "inode_table".to_string(),
            "struct sb".to_string(),
        ]
    );
    assert!(fs.forward_decl.is_empty());
}

fn mutually_embedding_tree() -> Vec<Decl> {
    vec![
        fssuper(vec![scalar("a", "struct a", vec![])]),
        strukt(
            "a",
            vec![anno("FSSTRUCT", &[])],
            vec![scalar("b", "struct b", vec![])],
        ),
        strukt(
            "b",
            vec![anno("FSSTRUCT", &[])],
            vec![scalar("a2", "struct a", vec![])],
        ),
    ]
}

#[test]
fn embedding_cycle_terminates_and_forward_declares() {
    let (result, diag, st) = run(mutually_embedding_tree());
    let fs = result.expect("compilation failed");
    assert!(diag.is_clean());
    assert_eq!(
        table_names(&fs, &st),
        vec![
            "struct a".to_string(),
            "struct b".to_string(),
            "struct sb".to_string(),
        ]
    );
    // The re-reached member of the cycle gets a stub, nothing else does.
    assert_eq!(forward_names(&fs, &st), vec!["struct b".to_string()]);
}

#[test]
fn ordering_is_deterministic() {
    let (first, ..) = run(mutually_embedding_tree());
    let (second, ..) = run(mutually_embedding_tree());
    let (fs1, fs2) = (
        first.expect("compilation failed"),
        second.expect("compilation failed"),
    );
    assert_eq!(fs1.object_table, fs2.object_table);
    assert_eq!(fs1.forward_decl, fs2.forward_decl);
}
