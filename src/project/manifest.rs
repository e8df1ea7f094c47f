use serde::{Deserialize, Serialize};

use crate::compiler::ir::{
    CExpr, ConstValue, Dimension, FileSystem, Member, ObjectKind, TypeRef,
};
use crate::compiler::{CompilerDisplayError, StringId, StringTable};

/// The serialized hand-off to the external code generator: the finished
/// file system with every interned id resolved back to text.
#[derive(Serialize, Deserialize, Debug)]
pub struct Manifest {
    name: String,
    addrspaces: Vec<AddrspaceEntry>,
    enums: Vec<EnumEntry>,
    objects: Vec<ObjectEntry>,
    containers: Vec<ContainerEntry>,
    xrefs: Vec<String>,
    pointer_table: Vec<PointerTableEntry>,
    object_table: Vec<String>,
    forward_decl: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AddrspaceEntry {
    name: String,
    size: String,
    null: String,
    generic: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct EnumEntry {
    name: String,
    kind: String,
    simple: bool,
    constants: Vec<ConstantEntry>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ConstantEntry {
    name: String,
    value: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ObjectEntry {
    name: String,
    rank: String,
    #[serde(rename = "super")]
    is_super: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    xref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    when: Option<String>,
    checks: Vec<String>,
    members: Vec<MemberEntry>,
}

#[derive(Serialize, Deserialize, Debug)]
pub enum MemberEntry {
    #[serde(rename = "field")]
    Field(FieldEntry),
    #[serde(rename = "nested")]
    Nested {
        name: String,
        kind: String,
        members: Vec<MemberEntry>,
    },
}

#[derive(Serialize, Deserialize, Debug)]
pub struct FieldEntry {
    name: String,

    /// The declared storage type text.
    ty: String,

    /// Canonical name of the resolved metadata type, when the field embeds
    /// one.
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved: Option<String>,

    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    enum_name: Option<String>,

    /// One entry per array dimension; a flexible dimension is `None`.
    dims: Vec<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    when: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sentinel: Option<String>,

    implicit: bool,

    pointers: Vec<PointerEntry>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PointerEntry {
    repr: String,
    ty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    addrspace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    when: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expr: Option<String>,
    relative: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ContainerEntry {
    name: String,
    element: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved: Option<String>,
    rank: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sentinel: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PointerTableEntry {
    repr: String,
    ty: String,
    field: String,
    storage: String,
    implicit: bool,
}

impl Manifest {
    /// Builds the fully string-resolved view of a finished file system.
    pub fn extract(fs: &FileSystem, st: &StringTable) -> Result<Manifest, CompilerDisplayError> {
        let mut objects = Vec::with_capacity(fs.objects.len());
        for obj in &fs.objects {
            let (is_super, location) = match &obj.kind {
                ObjectKind::Super { location } => (true, Some(location.text().to_string())),
                ObjectKind::Struct => (false, None),
            };
            objects.push(ObjectEntry {
                name: s(st, obj.typename)?,
                rank: obj.rank.as_str().into(),
                is_super,
                location,
                size: expr(&obj.size),
                xref: opt(st, obj.xref)?,
                base: match &obj.base {
                    Some(b) => Some(s(st, b.name)?),
                    None => None,
                },
                when: expr(&obj.when),
                checks: obj.checks.iter().map(|c| c.text().to_string()).collect(),
                members: members(fs, st, &obj.fields)?,
            });
        }

        let mut containers = Vec::with_capacity(fs.containers.len());
        for (i, c) in fs.containers.iter().enumerate() {
            let cid = crate::compiler::ir::ContainerId::new(i);
            containers.push(ContainerEntry {
                name: s(st, c.name)?,
                element: s(st, c.element_name)?,
                resolved: match c.element {
                    TypeRef::Resolved(m) => Some(s(st, fs.meta_name(m))?),
                    _ => None,
                },
                rank: fs
                    .rank_of(crate::compiler::ir::MetaId::Container(cid))
                    .as_str()
                    .into(),
                size: expr(&c.size),
                count: expr(&c.count),
                sentinel: expr(&c.sentinel),
            });
        }

        let mut enums = Vec::with_capacity(fs.enums.len());
        for cat in &fs.enums {
            let mut constants = Vec::with_capacity(cat.constants.len());
            for c in &cat.constants {
                constants.push(ConstantEntry {
                    name: s(st, c.name)?,
                    value: match &c.value {
                        ConstValue::Int(v) => v.to_string(),
                        ConstValue::Expr(e) => e.clone(),
                    },
                });
            }
            enums.push(EnumEntry {
                name: s(st, cat.name)?,
                kind: cat.kind.as_str().into(),
                simple: cat.simple,
                constants,
            });
        }

        let mut addrspaces = Vec::with_capacity(fs.addrspaces.len());
        for a in &fs.addrspaces {
            addrspaces.push(AddrspaceEntry {
                name: s(st, a.name)?,
                size: a.size.text().into(),
                null: a.null.text().into(),
                generic: a.generic,
            });
        }

        let mut xrefs = Vec::with_capacity(fs.xrefs.len());
        for &id in &fs.xrefs {
            if let Some(x) = fs.object(id).xref {
                xrefs.push(s(st, x)?);
            }
        }

        let mut pointer_table = Vec::with_capacity(fs.pointer_table.len());
        for p in &fs.pointer_table {
            pointer_table.push(PointerTableEntry {
                repr: s(st, p.repr)?,
                ty: s(st, p.ty_name)?,
                field: s(st, p.field)?,
                storage: s(st, p.storage)?,
                implicit: p.implicit,
            });
        }

        let mut object_table = Vec::with_capacity(fs.object_table.len());
        for &m in &fs.object_table {
            object_table.push(s(st, fs.meta_name(m))?);
        }
        let mut forward_decl = Vec::with_capacity(fs.forward_decl.len());
        for &m in &fs.forward_decl {
            forward_decl.push(s(st, fs.meta_name(m))?);
        }

        Ok(Manifest {
            name: s(st, fs.name)?,
            addrspaces,
            enums,
            objects,
            containers,
            xrefs,
            pointer_table,
            object_table,
            forward_decl,
        })
    }

    pub fn object_table(&self) -> &[String] {
        &self.object_table
    }

    pub fn forward_decl(&self) -> &[String] {
        &self.forward_decl
    }

    /// Loads a manifest from the given file.
    pub fn read(file: &mut std::fs::File) -> Result<Manifest, serde_yaml::Error> {
        let manifest: Manifest = serde_yaml::from_reader(file)?;
        Ok(manifest)
    }

    /// Writes the manifest to the given file as YAML.
    pub fn write(&self, file: &mut std::fs::File) -> Result<(), serde_yaml::Error> {
        serde_yaml::to_writer(file, self)
    }

    /// Writes the manifest to the given file as JSON.
    pub fn write_json(&self, file: &mut std::fs::File) -> Result<(), serde_json::Error> {
        serde_json::to_writer_pretty(file, self)
    }
}

fn members(
    fs: &FileSystem,
    st: &StringTable,
    list: &[Member],
) -> Result<Vec<MemberEntry>, CompilerDisplayError> {
    let mut out = Vec::with_capacity(list.len());
    for m in list {
        match m {
            Member::Field(f) => {
                let mut pointers = Vec::with_capacity(f.pointers.len());
                for p in &f.pointers {
                    pointers.push(PointerEntry {
                        repr: s(st, p.repr)?,
                        ty: s(st, p.ty_name)?,
                        target: match p.target {
                            Some(m) => Some(s(st, fs.meta_name(m))?),
                            None => None,
                        },
                        addrspace: match p.addrspace {
                            Some(id) => Some(s(st, fs.addrspace(id).name)?),
                            None => None,
                        },
                        when: expr(&p.when),
                        expr: expr(&p.expr),
                        relative: p.relative,
                    });
                }
                out.push(MemberEntry::Field(FieldEntry {
                    name: s(st, f.name)?,
                    ty: s(st, f.ty_name)?,
                    resolved: match f.ty {
                        TypeRef::Resolved(m) => Some(s(st, fs.meta_name(m))?),
                        _ => None,
                    },
                    enum_name: opt(st, f.enum_name)?,
                    dims: f
                        .dims
                        .iter()
                        .map(|d| match d {
                            Dimension::Fixed(e) => Some(e.text().to_string()),
                            Dimension::Flexible => None,
                        })
                        .collect(),
                    when: expr(&f.when),
                    expr: expr(&f.expr),
                    size: expr(&f.size),
                    count: expr(&f.count),
                    sentinel: expr(&f.sentinel),
                    implicit: f.implicit,
                    pointers,
                }));
            }
            Member::Nested(n) => out.push(MemberEntry::Nested {
                name: s(st, n.name)?,
                kind: match n.kind {
                    crate::compiler::ir::NestedKind::Struct => "struct".into(),
                    crate::compiler::ir::NestedKind::Union => "union".into(),
                },
                members: members(fs, st, &n.members)?,
            }),
        }
    }
    Ok(out)
}

fn s(st: &StringTable, id: StringId) -> Result<String, CompilerDisplayError> {
    Ok(st.get(id)?)
}

fn opt(st: &StringTable, id: Option<StringId>) -> Result<Option<String>, CompilerDisplayError> {
    match id {
        Some(id) => Ok(Some(s(st, id)?)),
        None => Ok(None),
    }
}

fn expr(e: &Option<CExpr>) -> Option<String> {
    e.as_ref().map(|e| e.text().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ast::{Annotation, Decl, Member as AstMember, ScalarMember, StructDecl};
    use crate::compiler::semantics::{self, Diagnostics};

    fn strukt(tag: &str, anno_name: &str, args: &[(&str, &str)], members: Vec<AstMember>) -> Decl {
        let mut anno = Annotation::new(anno_name, 1);
        for (k, v) in args {
            anno.args.insert(k.to_string(), v.to_string());
        }
        Decl::Struct(StructDecl {
            name: tag.into(),
            aliases: Vec::new(),
            annos: vec![anno],
            members,
            line: 1,
        })
    }

    fn scalar(name: &str, ty: &str) -> AstMember {
        AstMember::Scalar(ScalarMember {
            name: name.into(),
            ty: ty.into(),
            annos: Vec::new(),
            line: 1,
        })
    }

    #[test]
    fn extract_renders_ids_back_to_text() {
        let st = StringTable::new();
        let name = st.insert("testfs".into());
        let tree = vec![
            strukt("sb", "FSSUPER", &[], vec![scalar("root", "struct inode")]),
            strukt(
                "inode",
                "FSSTRUCT",
                &[("name", "ino")],
                vec![scalar("n", "le32")],
            ),
        ];
        let mut diag = Diagnostics::new();
        let fs = semantics::resolve(name, &tree, &st, &mut diag).expect("compilation failed");
        assert!(diag.is_clean());

        let manifest = Manifest::extract(&fs, &st).expect("extraction failed");
        assert_eq!(
            manifest.object_table(),
            &["struct inode".to_string(), "struct sb".to_string()]
        );
        assert!(manifest.forward_decl().is_empty());
        assert_eq!(manifest.xrefs, vec!["ino".to_string()]);

        let text = serde_yaml::to_string(&manifest).expect("serialization failed");
        let reloaded: Manifest = serde_yaml::from_str(&text).expect("round trip failed");
        assert_eq!(reloaded.object_table(), manifest.object_table());
    }
}
