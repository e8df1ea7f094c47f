//! Passes 4 and 6: name resolution, pointer binding and the rank checks,
//! plus the end-of-compilation unused-type sweep.
//!
//! Resolution is keyed entirely on interned ids.  The resolver prebuilds a
//! type index (every canonical name and alias of every object, container
//! and enumeration, in declaration order) once; a name resolves to the
//! first index entry that lists it, after the builtin table has had first
//! refusal.

use log::debug;

use crate::compiler::ir::{
    is_pseudo_enum, BuiltinKind, BuiltinTable, CategoryId, ContainerId, Field, FileSystem, Member,
    MetaId, ObjectId, Pointer, PointerSig, Rank, TypeId, TypeRef,
};
use crate::compiler::{CompilerError, StringId, StringTable};

use super::{Diagnostics, SemanticError, SemanticResult, Warning};

enum Resolution {
    Builtin(BuiltinKind),
    Type(TypeId),
    NotFound,
}

pub(super) struct Resolver<'a> {
    st: &'a StringTable,
    builtins: BuiltinTable,
    index: Vec<(TypeId, Vec<StringId>)>,
    offset: StringId,
}

fn err<T>(line: u32, inner: SemanticError) -> SemanticResult<T> {
    Err(CompilerError::new(Some(line), inner))
}

impl<'a> Resolver<'a> {
    pub fn new(fs: &FileSystem, st: &'a StringTable) -> Resolver<'a> {
        let mut index = Vec::new();
        for tid in fs.type_ids() {
            let names = match tid {
                TypeId::Object(id) => {
                    let o = fs.object(id);
                    let mut v = vec![o.typename];
                    v.extend(o.aliases.iter().copied());
                    v
                }
                TypeId::Container(id) => vec![fs.container(id).name],
                TypeId::Category(id) => {
                    let c = fs.category(id);
                    let mut v = vec![c.name];
                    v.extend(c.aliases.iter().copied());
                    v
                }
            };
            index.push((tid, names));
        }
        Resolver {
            st,
            builtins: BuiltinTable::new(),
            index,
            offset: st.insert("offset".into()),
        }
    }

    fn classify(&self, name: StringId) -> Option<BuiltinKind> {
        match self.st.get(name) {
            Ok(s) => self.builtins.classify(&s),
            Err(_) => None,
        }
    }

    fn is_pseudo(&self, name: StringId) -> bool {
        match self.st.get(name) {
            Ok(s) => is_pseudo_enum(&s),
            Err(_) => false,
        }
    }

    fn lookup(&self, name: StringId) -> Resolution {
        if let Some(b) = self.classify(name) {
            return Resolution::Builtin(b);
        }
        for (tid, names) in &self.index {
            if names.contains(&name) {
                return Resolution::Type(*tid);
            }
        }
        Resolution::NotFound
    }

    /// Pass 4: per-object field, pointer, enum and rank validation.
    pub fn validate_file_system(
        &self,
        fs: &mut FileSystem,
        diag: &mut Diagnostics,
    ) -> SemanticResult<()> {
        for i in 0..fs.objects.len() {
            self.validate_object(fs, ObjectId::new(i), diag)?;
        }
        Ok(())
    }

    fn validate_object(
        &self,
        fs: &mut FileSystem,
        oid: ObjectId,
        diag: &mut Diagnostics,
    ) -> SemanticResult<()> {
        let owner = MetaId::Object(oid);
        let (typename, rank, line) = {
            let o = fs.object(oid);
            (o.typename, o.rank, o.line)
        };
        debug!("validating object {}", oid);

        // Extent rank on a struct without a base is unsupported outright;
        // a missing size is the more specific complaint.
        if rank == Rank::Extent && fs.object(oid).base.is_none() {
            if fs.object(oid).size.is_none() {
                return err(line, SemanticError::ExtentSizeMissing(typename));
            }
            return err(line, SemanticError::ExtentUnsupported(typename));
        }

        if let Some(base_name) = fs.object(oid).base.as_ref().map(|b| b.name) {
            let target = self.index.iter().find_map(|(tid, names)| match tid {
                TypeId::Object(id) if names.contains(&base_name) => Some(*id),
                _ => None,
            });
            let base_id = match target {
                Some(id) => id,
                None => {
                    return err(
                        line,
                        SemanticError::BaseNotFound {
                            derived: typename,
                            base: base_name,
                        },
                    )
                }
            };
            if let Some(b) = fs.object_mut(oid).base.as_mut() {
                b.target = Some(base_id);
            }
            fs.object_mut(base_id).derived.push(oid);
            fs.add_embed_edge(owner, MetaId::Object(base_id));
        }

        // Take the member list out so the file system stays mutable while
        // fields are rewritten in place.
        let mut fields = std::mem::take(&mut fs.object_mut(oid).fields);
        let result = self.validate_members(fs, owner, typename, rank, &mut fields, diag);
        fs.object_mut(oid).fields = fields;
        result
    }

    fn validate_members(
        &self,
        fs: &mut FileSystem,
        owner: MetaId,
        typename: StringId,
        owner_rank: Rank,
        members: &mut [Member],
        diag: &mut Diagnostics,
    ) -> SemanticResult<()> {
        for m in members {
            match m {
                Member::Field(f) => {
                    self.validate_field(fs, owner, typename, owner_rank, f, diag)?
                }
                Member::Nested(n) => {
                    self.validate_members(fs, owner, typename, owner_rank, &mut n.members, diag)?
                }
            }
        }
        Ok(())
    }

    fn validate_field(
        &self,
        fs: &mut FileSystem,
        owner: MetaId,
        typename: StringId,
        owner_rank: Rank,
        f: &mut Field,
        diag: &mut Diagnostics,
    ) -> SemanticResult<()> {
        if !f.pointers.is_empty() {
            let offsets = f.pointers.iter().filter(|p| p.repr == self.offset).count();
            if offsets != 0 && offsets != f.pointers.len() {
                return err(f.line, SemanticError::MixedOffsetPointers(f.name));
            }
            let conditional = f.pointers.iter().filter(|p| p.when.is_some()).count();
            if conditional != 0 && conditional != f.pointers.len() {
                return err(f.line, SemanticError::MixedConditionalPointers(f.name));
            }
        }

        if let TypeRef::Unresolved(name) = f.ty {
            match self.lookup(name) {
                Resolution::Builtin(b) => f.ty = TypeRef::Builtin(b),
                // Enumerations are not metadata; a field declared with an
                // enum type stores an integer and carries the binding.
                Resolution::Type(TypeId::Category(_)) => {
                    f.ty = TypeRef::Builtin(BuiltinKind::Enum)
                }
                Resolution::Type(TypeId::Object(id)) => {
                    f.ty = TypeRef::Resolved(MetaId::Object(id));
                    fs.add_embed_edge(owner, MetaId::Object(id));
                }
                Resolution::Type(TypeId::Container(id)) => {
                    f.ty = TypeRef::Resolved(MetaId::Container(id));
                    fs.add_embed_edge(owner, MetaId::Container(id));
                }
                Resolution::NotFound => diag.warn(
                    self.st,
                    Warning::UnresolvedFieldType {
                        object: typename,
                        field: f.name,
                        ty: name,
                    },
                ),
            }
        }

        if owner_rank == Rank::Container {
            if let TypeRef::Resolved(m) = f.ty {
                if fs.rank_of(m) != Rank::Object {
                    return err(
                        f.line,
                        SemanticError::ContainerFieldRank {
                            object: typename,
                            field: f.name,
                        },
                    );
                }
            }
        }

        self.bind_enum(fs, f)?;

        let (field, storage, implicit) = (f.name, f.ty_name, f.implicit);
        for p in &mut f.pointers {
            self.validate_pointer(fs, owner, field, storage, implicit, p, diag)?;
        }
        Ok(())
    }

    fn bind_enum(&self, fs: &mut FileSystem, f: &mut Field) -> SemanticResult<()> {
        let mut bound = None;
        for (i, cat) in fs.enums.iter().enumerate() {
            let matches =
                |n: StringId| cat.name == n || cat.aliases.contains(&n);
            if matches(f.ty_name) || f.enum_name.map(matches).unwrap_or(false) {
                bound = Some(CategoryId::new(i));
                break;
            }
        }
        if let Some(cid) = bound {
            f.category = Some(cid);
            fs.category_mut(cid).refcount += 1;
            return Ok(());
        }
        if let Some(name) = f.enum_name {
            if !self.is_pseudo(name) {
                return err(f.line, SemanticError::EnumNotFound { field: f.name, name });
            }
        }
        Ok(())
    }

    fn validate_pointer(
        &self,
        fs: &mut FileSystem,
        owner: MetaId,
        field: StringId,
        storage: StringId,
        implicit: bool,
        p: &mut Pointer,
        diag: &mut Diagnostics,
    ) -> SemanticResult<()> {
        if p.target.is_none() {
            match self.lookup(p.ty_name) {
                Resolution::Builtin(_) | Resolution::Type(TypeId::Category(_)) => {
                    return err(
                        p.line,
                        SemanticError::PointerToBuiltin {
                            field,
                            ty: p.ty_name,
                        },
                    )
                }
                Resolution::Type(TypeId::Object(id)) => {
                    p.target = Some(MetaId::Object(id));
                    fs.add_ref_edge(owner, MetaId::Object(id));
                }
                Resolution::Type(TypeId::Container(id)) => {
                    p.target = Some(MetaId::Container(id));
                    fs.add_ref_edge(owner, MetaId::Container(id));
                }
                Resolution::NotFound => diag.warn(
                    self.st,
                    Warning::UnresolvedPointerType {
                        field,
                        ty: p.ty_name,
                    },
                ),
            }
        }

        if let Some(m) = p.target {
            let is_offset = p.repr == self.offset;
            if fs.rank_of(m) == Rank::Object {
                if !is_offset {
                    return err(
                        p.line,
                        SemanticError::NonOffsetToObject {
                            field,
                            ty: p.ty_name,
                        },
                    );
                }
            } else if is_offset {
                return err(
                    p.line,
                    SemanticError::OffsetToNonObject {
                        field,
                        ty: p.ty_name,
                    },
                );
            }
        }

        match fs.find_addrspace(p.repr) {
            Some(id) => p.addrspace = Some(id),
            None => diag.warn(
                self.st,
                Warning::UnresolvedAddrspace {
                    field,
                    repr: p.repr,
                },
            ),
        }

        let sig = PointerSig {
            repr: p.repr,
            ty_name: p.ty_name,
            field,
            storage,
            implicit,
        };
        if let Some(existing) = fs.register_pointer(sig) {
            diag.warn(
                self.st,
                Warning::PointerStorageMismatch {
                    field,
                    other: existing.field,
                    repr: p.repr,
                    ty: p.ty_name,
                },
            );
        }
        Ok(())
    }

    /// Pass 6: resolve every container's element type.
    pub fn resolve_container_elements(&self, fs: &mut FileSystem, diag: &mut Diagnostics) {
        for i in 0..fs.containers.len() {
            let cid = ContainerId::new(i);
            let (element, cname) = {
                let c = fs.container(cid);
                (c.element, c.name)
            };
            let name = match element {
                TypeRef::Unresolved(name) => name,
                _ => continue,
            };
            match self.lookup(name) {
                Resolution::Builtin(b) => fs.container_mut(cid).element = TypeRef::Builtin(b),
                Resolution::Type(TypeId::Category(_)) => {
                    fs.container_mut(cid).element = TypeRef::Builtin(BuiltinKind::Enum)
                }
                Resolution::Type(TypeId::Object(id)) => {
                    fs.container_mut(cid).element = TypeRef::Resolved(MetaId::Object(id));
                    fs.add_embed_edge(MetaId::Container(cid), MetaId::Object(id));
                }
                Resolution::Type(TypeId::Container(id)) => {
                    fs.container_mut(cid).element = TypeRef::Resolved(MetaId::Container(id));
                    fs.add_embed_edge(MetaId::Container(cid), MetaId::Container(id));
                }
                Resolution::NotFound => diag.warn(
                    self.st,
                    Warning::UnresolvedContainerType {
                        container: cname,
                        ty: name,
                    },
                ),
            }
        }
    }

    /// End of compilation: anything annotated but never referenced.
    pub fn report_unused(&self, fs: &FileSystem, diag: &mut Diagnostics) {
        for obj in &fs.objects {
            if !obj.is_super() && obj.refcount() == 0 {
                diag.warn(self.st, Warning::UnusedType(obj.typename));
            }
        }
        for c in &fs.containers {
            if c.refcount() == 0 {
                diag.warn(self.st, Warning::UnusedType(c.name));
            }
        }
        for cat in &fs.enums {
            if cat.refcount == 0 {
                diag.warn(self.st, Warning::UnusedCategory(cat.name));
            }
        }
    }
}
