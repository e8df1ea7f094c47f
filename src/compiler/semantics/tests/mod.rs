//! Shared builders for the semantic tests: a tiny DSL for assembling
//! annotation trees without a front end.

mod order;
mod resolver;

use crate::compiler::ast::{
    Annotation, ArrayMember, Decl, EnumDecl, Enumerator, Member as AstMember, ScalarMember,
    StructDecl,
};
use crate::compiler::ir::{FileSystem, Object};
use crate::compiler::semantics::{resolve, Diagnostics, SemanticResult};
use crate::compiler::StringTable;

fn anno(name: &str, args: &[(&str, &str)]) -> Annotation {
    let mut a = Annotation::new(name, 1);
    for (k, v) in args {
        a.args.insert(k.to_string(), v.to_string());
    }
    a
}

fn strukt(tag: &str, annos: Vec<Annotation>, members: Vec<AstMember>) -> Decl {
    Decl::Struct(StructDecl {
        name: tag.into(),
        aliases: Vec::new(),
        annos,
        members,
        line: 1,
    })
}

fn scalar(name: &str, ty: &str, annos: Vec<Annotation>) -> AstMember {
    AstMember::Scalar(ScalarMember {
        name: name.into(),
        ty: ty.into(),
        annos,
        line: 1,
    })
}

fn array(name: &str, ty: &str, dims: &[&str], annos: Vec<Annotation>) -> AstMember {
    AstMember::Array(ArrayMember {
        name: name.into(),
        ty: ty.into(),
        dims: dims.iter().map(|d| d.to_string()).collect(),
        annos,
        line: 1,
    })
}

fn enum_decl(tag: &str, kind: Option<&str>, enumerators: &[(&str, Option<&str>)]) -> Decl {
    let anno = match kind {
        Some(k) => self::anno("FSCONST", &[("type", k)]),
        None => self::anno("FSCONST", &[]),
    };
    Decl::Enum(EnumDecl {
        name: tag.into(),
        aliases: Vec::new(),
        anno,
        enumerators: enumerators
            .iter()
            .map(|(n, v)| Enumerator {
                name: n.to_string(),
                value: v.map(|v| v.to_string()),
                line: 1,
            })
            .collect(),
        line: 1,
    })
}

/// A minimal super block, required by every compilation.
fn fssuper(members: Vec<AstMember>) -> Decl {
    strukt("sb", vec![anno("FSSUPER", &[])], members)
}

fn run(tree: Vec<Decl>) -> (SemanticResult<FileSystem>, Diagnostics, StringTable) {
    let st = StringTable::new();
    let name = st.insert("testfs".into());
    let mut diag = Diagnostics::new();
    let result = resolve(name, &tree, &st, &mut diag);
    (result, diag, st)
}

/// Looks an object up by its canonical type name.
fn obj<'a>(fs: &'a FileSystem, st: &StringTable, name: &str) -> &'a Object {
    let id = st.find(name).expect("name was never interned");
    fs.objects
        .iter()
        .find(|o| o.typename == id)
        .expect("no object with that typename")
}

fn table_names(fs: &FileSystem, st: &StringTable) -> Vec<String> {
    fs.object_table
        .iter()
        .map(|&m| st.get(fs.meta_name(m)).expect("unknown name in table"))
        .collect()
}

fn forward_names(fs: &FileSystem, st: &StringTable) -> Vec<String> {
    fs.forward_decl
        .iter()
        .map(|&m| st.get(fs.meta_name(m)).expect("unknown name in forward set"))
        .collect()
}
