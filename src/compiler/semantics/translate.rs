//! Pass 1: turn the annotation tree into the entity model.
//!
//! Everything here is local, per-declaration validation: annotation
//! argument whitelists, mandatory arguments, rank keywords, enumerator
//! value tracking, implicit pointer pseudo-fields.  No name resolution
//! happens yet; every type reference leaves this pass as
//! `TypeRef::Unresolved`.

use std::collections::HashSet;

use log::debug;

use crate::compiler::ast::{Annotation, Decl, EnumDecl, Member as AstMember, StructDecl};
use crate::compiler::ir::{
    Addrspace, BaseRef, BuiltinTable, CExpr, Category, CategoryKind, ConstValue, Constant,
    Container, Dimension, Field, FileSystem, Member, Nested, NestedKind, Object, ObjectKind,
    Pointer, Rank, TypeRef,
};
use crate::compiler::{CompilerError, StringId, StringTable};

use super::{SemanticError, SemanticResult};

const FSSTRUCT_ARGS: &[&str] = &["size", "name", "base", "when", "rank"];
const FSSUPER_ARGS: &[&str] = &["size", "location", "name"];
const FSCONST_ARGS: &[&str] = &["type"];
const VECTOR_ARGS: &[&str] = &["name", "type", "size", "count", "sentinel"];
const ADDRSPACE_ARGS: &[&str] = &["name", "size", "null"];
const DEFINE_ARGS: &[&str] = &["name", "expr"];
const POINTER_ARGS: &[&str] = &["name", "repr", "type", "when", "expr", "size", "count"];
const FIELD_MEMBER_ARGS: &[&str] = &["type", "size", "count", "sentinel", "when"];
const FIELD_PROP_ARGS: &[&str] = &["name", "type", "expr", "when", "size"];
const CHECK_ARGS: &[&str] = &["expr"];

pub(super) fn translate(
    name: StringId,
    tree: &[Decl],
    st: &StringTable,
) -> SemanticResult<FileSystem> {
    let mut t = Translator {
        st,
        builtins: BuiltinTable::new(),
        names: HashSet::new(),
    };
    let mut fs = FileSystem::new(name, st);
    for decl in tree {
        match decl {
            Decl::Struct(sd) => t.struct_decl(&mut fs, sd)?,
            Decl::Enum(ed) => t.enum_decl(&mut fs, ed)?,
            Decl::Directive(anno) => t.directive(&mut fs, anno)?,
        }
    }
    if fs.super_id.is_none() {
        return Err(CompilerError::new(None, SemanticError::MissingSuper));
    }
    Ok(fs)
}

fn err<T>(line: u32, inner: SemanticError) -> SemanticResult<T> {
    Err(CompilerError::new(Some(line), inner))
}

struct Translator<'a> {
    st: &'a StringTable,
    builtins: BuiltinTable,

    // Every canonical name and alias declared so far.
    names: HashSet<StringId>,
}

impl<'a> Translator<'a> {
    fn check_args(&self, anno: &Annotation, allowed: &[&str]) -> SemanticResult<()> {
        for key in anno.args.keys() {
            if !allowed.contains(&key.as_str()) {
                return err(
                    anno.line,
                    SemanticError::InvalidArgument {
                        anno: anno.name.clone(),
                        arg: key.clone(),
                    },
                );
            }
        }
        Ok(())
    }

    fn require<'x>(&self, anno: &'x Annotation, key: &str) -> SemanticResult<&'x str> {
        match anno.get(key) {
            Some(v) => Ok(v),
            None => err(
                anno.line,
                SemanticError::MissingArgument {
                    anno: anno.name.clone(),
                    arg: key.into(),
                },
            ),
        }
    }

    fn claim_name(&mut self, name: StringId, line: u32) -> SemanticResult<()> {
        if !self.names.insert(name) {
            return err(line, SemanticError::DuplicateType(name));
        }
        Ok(())
    }

    fn directive(&mut self, fs: &mut FileSystem, anno: &Annotation) -> SemanticResult<()> {
        match anno.name.as_str() {
            "VECTOR" => {
                self.check_args(anno, VECTOR_ARGS)?;
                let name = self.st.insert(self.require(anno, "name")?.into());
                let element = self.require(anno, "type")?;
                self.claim_name(name, anno.line)?;
                let element_name = self.st.insert(element.into());
                debug!("declared vector {}", anno.get_or("name", ""));
                fs.add_container(Container {
                    name,
                    element_name,
                    element: TypeRef::Unresolved(element_name),
                    size: anno.get("size").map(CExpr::new),
                    count: anno.get("count").map(CExpr::new),
                    sentinel: anno.get("sentinel").map(CExpr::new),
                    parents: Vec::new(),
                    children: Vec::new(),
                    line: anno.line,
                });
                Ok(())
            }
            "ADDRSPACE" => {
                self.check_args(anno, ADDRSPACE_ARGS)?;
                let name = self.st.insert(self.require(anno, "name")?.into());
                if fs.find_addrspace(name).is_some() {
                    return err(anno.line, SemanticError::DuplicateAddrspace(name));
                }
                debug!("declared address space {}", anno.get_or("name", ""));
                fs.add_addrspace(Addrspace::new(
                    name,
                    CExpr::new(anno.get_or("size", "0")),
                    CExpr::new(anno.get_or("null", "0")),
                ));
                Ok(())
            }
            "DEFINE" => {
                self.check_args(anno, DEFINE_ARGS)?;
                let name = self.require(anno, "name")?.to_string();
                let expr = self.require(anno, "expr")?.to_string();
                fs.macros.push((name, expr));
                Ok(())
            }
            other => err(anno.line, SemanticError::UnknownAnnotation(other.into())),
        }
    }

    fn enum_decl(&mut self, fs: &mut FileSystem, ed: &EnumDecl) -> SemanticResult<()> {
        let anno = &ed.anno;
        self.check_args(anno, FSCONST_ARGS)?;

        let canon = match ed.aliases.first() {
            Some(a) => self.st.insert(a.clone()),
            None => self.st.insert(format!("enum {}", ed.name)),
        };
        let mut aliases = Vec::new();
        for a in &ed.aliases {
            let id = self.st.insert(a.clone());
            if id != canon && !aliases.contains(&id) {
                aliases.push(id);
            }
        }
        if !ed.name.is_empty() {
            let tag = self.st.insert(format!("enum {}", ed.name));
            if tag != canon && !aliases.contains(&tag) {
                aliases.push(tag);
            }
        }
        self.claim_name(canon, ed.line)?;
        for &a in &aliases {
            self.claim_name(a, ed.line)?;
        }

        let kw = anno.get_or("type", "enum");
        let kind = match CategoryKind::from_keyword(kw) {
            Some(k) => k,
            None => {
                return err(
                    anno.line,
                    SemanticError::InvalidEnumKind {
                        category: canon,
                        kind: kw.into(),
                    },
                )
            }
        };

        let mut simple = true;
        let mut prev = ConstValue::Int(-1);
        let mut constants = Vec::new();
        for e in &ed.enumerators {
            let value = match &e.value {
                Some(text) => match parse_int(text) {
                    Some(v) => {
                        // Duplicate values (alias constants) stay simple;
                        // only a strictly decreasing value taints.
                        if let ConstValue::Int(p) = prev {
                            if v < p {
                                simple = false;
                            }
                        }
                        ConstValue::Int(v)
                    }
                    None => {
                        simple = false;
                        ConstValue::Expr(text.trim().to_string())
                    }
                },
                None => match &prev {
                    ConstValue::Int(p) => ConstValue::Int(p + 1),
                    ConstValue::Expr(e) => ConstValue::Expr(format!("({})+1", e)),
                },
            };
            prev = value.clone();
            constants.push(Constant {
                name: self.st.insert(e.name.clone()),
                value,
            });
        }

        debug!("declared enum {} ({} constants)", ed.name, constants.len());
        fs.add_category(Category {
            name: canon,
            aliases,
            kind,
            constants,
            simple,
            refcount: 0,
            line: ed.line,
        });
        Ok(())
    }

    fn struct_decl(&mut self, fs: &mut FileSystem, sd: &StructDecl) -> SemanticResult<()> {
        let first = match sd.annos.first() {
            Some(a) => a,
            None => return Ok(()),
        };

        let tag = self.st.insert(sd.name.clone());
        let struct_form = if sd.name.is_empty() {
            None
        } else {
            Some(self.st.insert(format!("struct {}", sd.name)))
        };
        let typename = match sd.aliases.first() {
            Some(a) => self.st.insert(a.clone()),
            None => match struct_form {
                Some(f) => f,
                None => tag,
            },
        };
        let mut aliases = Vec::new();
        for a in &sd.aliases {
            let id = self.st.insert(a.clone());
            if id != typename && !aliases.contains(&id) {
                aliases.push(id);
            }
        }
        if let Some(f) = struct_form {
            if f != typename && !aliases.contains(&f) {
                aliases.push(f);
            }
        }
        self.claim_name(typename, sd.line)?;
        for &a in &aliases {
            self.claim_name(a, sd.line)?;
        }

        let (kind, rank, base, when) = match first.name.as_str() {
            "FSSUPER" => {
                self.check_args(first, FSSUPER_ARGS)?;
                if fs.super_id.is_some() {
                    return err(first.line, SemanticError::MultipleSuper(typename));
                }
                let location = CExpr::new(first.get_or("location", "0"));
                // The super block aggregates everything else, so it ranks
                // as a container: non-offset pointers may target it and its
                // own embedded fields must be object-ranked.
                (ObjectKind::Super { location }, Rank::Container, None, None)
            }
            "FSSTRUCT" => {
                self.check_args(first, FSSTRUCT_ARGS)?;
                let kw = first.get_or("rank", "object");
                let rank = match Rank::from_keyword(kw) {
                    Some(r) => r,
                    None => {
                        return err(
                            first.line,
                            SemanticError::InvalidRank {
                                object: typename,
                                rank: kw.into(),
                            },
                        )
                    }
                };
                let base = first.get("base").map(|b| BaseRef {
                    name: self.st.insert(b.into()),
                    target: None,
                });
                let when = first.get("when").map(CExpr::new);
                if when.is_some() && base.is_none() {
                    return err(first.line, SemanticError::WhenWithoutBase(typename));
                }
                (ObjectKind::Struct, rank, base, when)
            }
            "VECTOR" => return err(first.line, SemanticError::VectorAsProperty(typename)),
            other => return err(first.line, SemanticError::UnknownAnnotation(other.into())),
        };

        let mut fields = self.members(&sd.members, "")?;
        let mut checks = Vec::new();
        for anno in &sd.annos[1..] {
            match anno.name.as_str() {
                "CHECK" => {
                    self.check_args(anno, CHECK_ARGS)?;
                    checks.push(CExpr::new(self.require(anno, "expr")?));
                }
                "POINTER" => self.add_implicit_pointer(&mut fields, anno)?,
                "FIELD" => self.add_computed_field(&mut fields, anno)?,
                "VECTOR" => return err(anno.line, SemanticError::VectorAsProperty(typename)),
                other => {
                    return err(anno.line, SemanticError::UnknownAnnotation(other.into()))
                }
            }
        }

        debug!("translated struct {} ({} members)", sd.name, sd.members.len());
        let is_super = matches!(kind, ObjectKind::Super { .. });
        let id = fs.add_object(Object {
            name: tag,
            typename,
            aliases,
            kind,
            rank,
            size: first.get("size").map(CExpr::new),
            xref: first.get("name").map(|n| self.st.insert(n.into())),
            base,
            when,
            checks,
            fields,
            derived: Vec::new(),
            parents: Vec::new(),
            children: Vec::new(),
            line: sd.line,
        });
        if is_super {
            fs.super_id = Some(id);
        }
        Ok(())
    }

    fn members(&self, members: &[AstMember], prefix: &str) -> SemanticResult<Vec<Member>> {
        let mut out = Vec::with_capacity(members.len());
        for m in members {
            match m {
                AstMember::Scalar(s) => out.push(Member::Field(self.build_field(
                    prefix, &s.name, &s.ty, &[], &s.annos, s.line,
                )?)),
                AstMember::Array(a) => out.push(Member::Field(self.build_field(
                    prefix, &a.name, &a.ty, &a.dims, &a.annos, a.line,
                )?)),
                AstMember::Inner(inner) => {
                    let full = join_name(prefix, &inner.name);
                    let fname = self.st.insert(full.clone());
                    let kind = match inner.ty.as_str() {
                        "union" => NestedKind::Union,
                        _ => NestedKind::Struct,
                    };
                    let mut when = None;
                    for anno in &inner.annos {
                        match anno.name.as_str() {
                            "FIELD" => {
                                self.check_args(anno, FIELD_MEMBER_ARGS)?;
                                for &key in &["type", "size"] {
                                    if anno.has(key) {
                                        return err(
                                            anno.line,
                                            SemanticError::InnerFieldArgument {
                                                field: fname,
                                                arg: key.into(),
                                            },
                                        );
                                    }
                                }
                                when = anno.get("when").map(CExpr::new);
                            }
                            other => {
                                return err(
                                    anno.line,
                                    SemanticError::UnknownAnnotation(other.into()),
                                )
                            }
                        }
                    }
                    out.push(Member::Nested(Nested {
                        name: fname,
                        kind,
                        dims: dimensions(&inner.dims),
                        when,
                        members: self.members(&inner.members, &full)?,
                        line: inner.line,
                    }));
                }
                AstMember::Vector(anno) => {
                    out.push(Member::Field(self.vector_field(prefix, anno)?))
                }
            }
        }
        Ok(out)
    }

    fn build_field(
        &self,
        prefix: &str,
        name: &str,
        ty: &str,
        dims: &[String],
        annos: &[Annotation],
        line: u32,
    ) -> SemanticResult<Field> {
        let fname = self.st.insert(join_name(prefix, name));
        if !dims.is_empty() && (ty.starts_with("struct ") || ty.starts_with("union ")) {
            return err(line, SemanticError::ArrayOfStructs(fname));
        }

        // A buffer kind declared as the field's type describes the content,
        // not the storage; the storage is raw bytes.
        let (ty_str, enum_name) = match ty {
            "bitmap" | "data" | "skip" => {
                ("unsigned char".to_string(), Some(self.st.insert(ty.into())))
            }
            _ => (ty.to_string(), None),
        };
        let ty_name = self.st.insert(ty_str);

        let mut field = Field {
            name: fname,
            ty_name,
            ty: TypeRef::Unresolved(ty_name),
            enum_name,
            category: None,
            dims: dimensions(dims),
            when: None,
            expr: None,
            size: None,
            count: None,
            sentinel: None,
            pointers: Vec::new(),
            implicit: false,
            line,
        };

        let mut saw_field_anno = false;
        for anno in annos {
            match anno.name.as_str() {
                "FIELD" => {
                    if saw_field_anno {
                        return err(anno.line, SemanticError::MultipleFieldAnnotations(fname));
                    }
                    saw_field_anno = true;
                    self.check_args(anno, FIELD_MEMBER_ARGS)?;
                    if let Some(t) = anno.get("type") {
                        field.enum_name = Some(self.st.insert(t.into()));
                    }
                    let flexible = field.is_flexible();
                    for &key in &["count", "sentinel"] {
                        if anno.has(key) && !flexible {
                            return err(
                                anno.line,
                                SemanticError::CountOnNonFlexible {
                                    field: fname,
                                    arg: key.into(),
                                },
                            );
                        }
                    }
                    field.when = anno.get("when").map(CExpr::new);
                    field.size = anno.get("size").map(CExpr::new);
                    field.count = anno.get("count").map(CExpr::new);
                    field.sentinel = anno.get("sentinel").map(CExpr::new);
                }
                "POINTER" => field.pointers.push(self.pointer(anno)?),
                other => {
                    return err(anno.line, SemanticError::UnknownAnnotation(other.into()))
                }
            }
        }

        if field.is_flexible() && field.count.is_none() && field.sentinel.is_none() {
            return err(line, SemanticError::FlexibleArrayNeedsCount(fname));
        }
        Ok(field)
    }

    /// A VECTOR annotation in member position declares a variable-length
    /// embedded region as a field of the enclosing struct.
    fn vector_field(&self, prefix: &str, anno: &Annotation) -> SemanticResult<Field> {
        self.check_args(anno, VECTOR_ARGS)?;
        let name = self
            .st
            .insert(join_name(prefix, self.require(anno, "name")?));
        let ty = self.require(anno, "type")?;
        let (ty_str, enum_name) = match ty {
            "bitmap" | "data" | "skip" => {
                ("unsigned char".to_string(), Some(self.st.insert(ty.into())))
            }
            _ => (ty.to_string(), None),
        };
        let ty_name = self.st.insert(ty_str);

        let field = Field {
            name,
            ty_name,
            ty: TypeRef::Unresolved(ty_name),
            enum_name,
            category: None,
            dims: vec![Dimension::Flexible],
            when: None,
            expr: None,
            size: anno.get("size").map(CExpr::new),
            count: anno.get("count").map(CExpr::new),
            sentinel: anno.get("sentinel").map(CExpr::new),
            pointers: Vec::new(),
            implicit: false,
            line: anno.line,
        };
        if field.size.is_none() && field.count.is_none() && field.sentinel.is_none() {
            return err(anno.line, SemanticError::FlexibleArrayNeedsCount(name));
        }
        Ok(field)
    }

    fn pointer(&self, anno: &Annotation) -> SemanticResult<Pointer> {
        self.check_args(anno, POINTER_ARGS)?;
        Ok(Pointer {
            repr: self.st.insert(self.require(anno, "repr")?.into()),
            ty_name: self.st.insert(self.require(anno, "type")?.into()),
            when: anno.get("when").map(CExpr::new),
            expr: anno.get("expr").map(CExpr::new),
            relative: false,
            size: anno.get("size").map(CExpr::new),
            count: anno.get("count").map(CExpr::new),
            target: None,
            addrspace: None,
            line: anno.line,
        })
    }

    /// A POINTER annotation on the struct itself: its location is computed
    /// rather than stored, so it lives in a pseudo-field.  Several implicit
    /// pointers may share one pseudo-field by name.
    fn add_implicit_pointer(
        &self,
        fields: &mut Vec<Member>,
        anno: &Annotation,
    ) -> SemanticResult<()> {
        let ptr = self.pointer(anno)?;
        if ptr.expr.is_none() {
            return err(
                anno.line,
                SemanticError::MissingArgument {
                    anno: anno.name.clone(),
                    arg: "expr".into(),
                },
            );
        }
        let name = self.st.insert(self.require(anno, "name")?.into());

        for m in fields.iter_mut() {
            let f = match m {
                Member::Field(f) if f.name == name => f,
                _ => continue,
            };
            if !f.implicit {
                return err(anno.line, SemanticError::ImplicitFieldExists(name));
            }
            let conditional = ptr.when.is_some();
            let mixed = f
                .pointers
                .iter()
                .any(|p| p.when.is_some() != conditional);
            if mixed {
                return err(anno.line, SemanticError::MixedConditionalPointers(name));
            }
            f.pointers.push(ptr);
            return Ok(());
        }

        let ty_name = self.st.insert("long".into());
        fields.push(Member::Field(Field {
            name,
            ty_name,
            ty: TypeRef::Unresolved(ty_name),
            enum_name: None,
            category: None,
            dims: Vec::new(),
            when: None,
            expr: None,
            size: None,
            count: None,
            sentinel: None,
            pointers: vec![ptr],
            implicit: true,
            line: anno.line,
        }));
        Ok(())
    }

    /// A FIELD annotation on the struct itself declares a computed field:
    /// a value derived from other fields rather than stored.
    fn add_computed_field(
        &self,
        fields: &mut Vec<Member>,
        anno: &Annotation,
    ) -> SemanticResult<()> {
        self.check_args(anno, FIELD_PROP_ARGS)?;
        let name = self.st.insert(self.require(anno, "name")?.into());
        let expr = CExpr::new(self.require(anno, "expr")?);

        let ty = anno.get_or("type", "long");
        let (ty_str, enum_name) = if self.builtins.classify(ty).is_some() {
            (ty.to_string(), None)
        } else {
            ("long".to_string(), Some(self.st.insert(ty.into())))
        };
        let ty_name = self.st.insert(ty_str);

        fields.push(Member::Field(Field {
            name,
            ty_name,
            ty: TypeRef::Unresolved(ty_name),
            enum_name,
            category: None,
            dims: Vec::new(),
            when: anno.get("when").map(CExpr::new),
            expr: Some(expr),
            size: anno.get("size").map(CExpr::new),
            count: None,
            sentinel: None,
            pointers: Vec::new(),
            implicit: false,
            line: anno.line,
        }));
        Ok(())
    }
}

fn join_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn dimensions(raw: &[String]) -> Vec<Dimension> {
    raw.iter()
        .map(|d| {
            if d.trim().is_empty() {
                Dimension::Flexible
            } else {
                Dimension::Fixed(CExpr::new(d))
            }
        })
        .collect()
}

fn parse_int(text: &str) -> Option<i64> {
    let t = text.trim();
    let (neg, t) = match t.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, t),
    };
    let v = if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        t.parse::<i64>().ok()?
    };
    Some(if neg { -v } else { v })
}
