use std::collections::HashMap;

use crate::compiler::stringtable::{StringId, StringTable};

use super::{
    Addrspace, AddrspaceId, CExpr, Category, CategoryId, Container, ContainerId, MetaId, Object,
    ObjectId, Rank, TypeId, TypeRef,
};

/// A deduplicated entry in the file-system-wide pointer table, keyed by
/// representation and target type.  The owning field's name and storage
/// type are kept so a later duplicate with a different storage type can be
/// reported against the first owner.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerSig {
    pub repr: StringId,
    pub ty_name: StringId,
    pub field: StringId,
    pub storage: StringId,
    pub implicit: bool,
}

/**
The aggregate the whole compilation mutates in place: arenas for every
entity kind, plus the derived structures the resolution passes compute
(`xrefs`, `pointer_table`, `object_table`, `forward_decl`).

The two generic address spaces are seeded at construction: `byte` (raw
byte offsets, null value `0`) and `offset` (self-relative offsets, null
value `-1`).
 */
pub struct FileSystem {
    pub name: StringId,

    pub objects: Vec<Object>,
    pub containers: Vec<Container>,
    pub enums: Vec<Category>,
    pub addrspaces: Vec<Addrspace>,

    /// DEFINE macro pairs, substituted into every expression slot.
    pub macros: Vec<(String, String)>,

    pub super_id: Option<ObjectId>,

    /// Externally nameable objects, in declaration order.
    pub xrefs: Vec<ObjectId>,

    pub pointer_table: Vec<PointerSig>,

    /// Final declaration order, least-depended-upon first.
    pub object_table: Vec<MetaId>,

    /// Types needing a stub declaration ahead of their definition.
    pub forward_decl: Vec<MetaId>,

    // Embedding adjacency, deduplicated; feeds the orderer.  Pointer
    // relationships never appear here.
    embeds: HashMap<MetaId, Vec<MetaId>>,
    embed_parents: HashMap<MetaId, usize>,
}

impl FileSystem {
    pub fn new(name: StringId, st: &StringTable) -> FileSystem {
        let byte = st.insert("byte".into());
        let offset = st.insert("offset".into());
        FileSystem {
            name,
            objects: Vec::new(),
            containers: Vec::new(),
            enums: Vec::new(),
            addrspaces: vec![
                Addrspace::generic(byte, CExpr::new("0"), CExpr::new("0")),
                Addrspace::generic(offset, CExpr::new("0"), CExpr::new("-1")),
            ],
            macros: Vec::new(),
            super_id: None,
            xrefs: Vec::new(),
            pointer_table: Vec::new(),
            object_table: Vec::new(),
            forward_decl: Vec::new(),
            embeds: HashMap::new(),
            embed_parents: HashMap::new(),
        }
    }

    pub fn add_object(&mut self, obj: Object) -> ObjectId {
        let id = ObjectId::new(self.objects.len());
        self.objects.push(obj);
        id
    }

    pub fn add_container(&mut self, c: Container) -> ContainerId {
        let id = ContainerId::new(self.containers.len());
        self.containers.push(c);
        id
    }

    pub fn add_category(&mut self, cat: Category) -> CategoryId {
        let id = CategoryId::new(self.enums.len());
        self.enums.push(cat);
        id
    }

    pub fn add_addrspace(&mut self, a: Addrspace) -> AddrspaceId {
        let id = AddrspaceId::new(self.addrspaces.len());
        self.addrspaces.push(a);
        id
    }

    pub fn object(&self, id: ObjectId) -> &Object {
        &self.objects[id.index()]
    }

    pub fn object_mut(&mut self, id: ObjectId) -> &mut Object {
        &mut self.objects[id.index()]
    }

    pub fn container(&self, id: ContainerId) -> &Container {
        &self.containers[id.index()]
    }

    pub fn container_mut(&mut self, id: ContainerId) -> &mut Container {
        &mut self.containers[id.index()]
    }

    pub fn category(&self, id: CategoryId) -> &Category {
        &self.enums[id.index()]
    }

    pub fn category_mut(&mut self, id: CategoryId) -> &mut Category {
        &mut self.enums[id.index()]
    }

    pub fn addrspace(&self, id: AddrspaceId) -> &Addrspace {
        &self.addrspaces[id.index()]
    }

    pub fn find_addrspace(&self, name: StringId) -> Option<AddrspaceId> {
        self.addrspaces
            .iter()
            .position(|a| a.name == name)
            .map(AddrspaceId::new)
    }

    /// Canonical name of a metadata entity.
    pub fn meta_name(&self, m: MetaId) -> StringId {
        match m {
            MetaId::Object(id) => self.object(id).typename,
            MetaId::Container(id) => self.container(id).name,
        }
    }

    /// Rank of a metadata entity.  Objects carry their rank; a container's
    /// rank is derived from its element: holding plain objects (or raw
    /// buffer bytes) makes it a container, holding anything
    /// container-ranked or higher makes it an extent.
    pub fn rank_of(&self, m: MetaId) -> Rank {
        match m {
            MetaId::Object(id) => self.object(id).rank,
            MetaId::Container(id) => match self.container(id).element {
                TypeRef::Resolved(MetaId::Object(o)) => {
                    if self.object(o).rank == Rank::Object {
                        Rank::Container
                    } else {
                        Rank::Extent
                    }
                }
                TypeRef::Resolved(MetaId::Container(_)) => Rank::Extent,
                TypeRef::Builtin(_) | TypeRef::Unresolved(_) => Rank::Container,
            },
        }
    }

    pub fn refcount(&self, m: MetaId) -> usize {
        match m {
            MetaId::Object(id) => self.object(id).refcount(),
            MetaId::Container(id) => self.container(id).refcount(),
        }
    }

    /// Records that `parent` references `child`.  Pointer targets and
    /// embedded types alike go through here; only the latter also get an
    /// embedding edge.
    pub fn add_ref_edge(&mut self, parent: MetaId, child: MetaId) {
        match parent {
            MetaId::Object(id) => self.object_mut(id).children.push(child),
            MetaId::Container(id) => self.container_mut(id).children.push(child),
        }
        match child {
            MetaId::Object(id) => self.object_mut(id).parents.push(parent),
            MetaId::Container(id) => self.container_mut(id).parents.push(parent),
        }
    }

    /// Records that `parent` structurally embeds `child`.  The edge is
    /// deduplicated; a struct with three fields of one type depends on that
    /// type once.
    pub fn add_embed_edge(&mut self, parent: MetaId, child: MetaId) {
        let children = self.embeds.entry(parent).or_insert_with(Vec::new);
        if children.contains(&child) {
            return;
        }
        children.push(child);
        *self.embed_parents.entry(child).or_insert(0) += 1;
        self.add_ref_edge(parent, child);
    }

    pub fn embed_children(&self, m: MetaId) -> &[MetaId] {
        self.embeds.get(&m).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn embed_parent_count(&self, m: MetaId) -> usize {
        self.embed_parents.get(&m).copied().unwrap_or(0)
    }

    /// The unified type table scanned by name resolution and exposed to
    /// downstream tooling: objects, then containers, then enumerations, in
    /// declaration order within each group.
    pub fn type_ids(&self) -> Vec<TypeId> {
        let mut ids = Vec::with_capacity(
            self.objects.len() + self.containers.len() + self.enums.len(),
        );
        ids.extend((0..self.objects.len()).map(|i| TypeId::Object(ObjectId::new(i))));
        ids.extend((0..self.containers.len()).map(|i| TypeId::Container(ContainerId::new(i))));
        ids.extend((0..self.enums.len()).map(|i| TypeId::Category(CategoryId::new(i))));
        ids
    }

    /// Which cross-referenced objects an expression mentions by name.
    pub fn xrefs_in(&self, expr: &CExpr) -> Vec<ObjectId> {
        self.xrefs
            .iter()
            .copied()
            .filter(|&id| match self.object(id).xref {
                Some(name) => expr.mentions(name),
                None => false,
            })
            .collect()
    }

    /// Registers a pointer into the deduplicated pointer table.  Returns
    /// the previously registered entry when the new pointer shares the
    /// (representation, type) pair but its owning field has a different
    /// storage type, so the caller can warn about the conflict.  Implicit
    /// pointers never trigger the conflict.
    pub fn register_pointer(&mut self, sig: PointerSig) -> Option<PointerSig> {
        if let Some(existing) = self
            .pointer_table
            .iter()
            .find(|p| p.repr == sig.repr && p.ty_name == sig.ty_name)
        {
            if !sig.implicit && existing.storage != sig.storage {
                return Some(existing.clone());
            }
            return None;
        }
        self.pointer_table.push(sig);
        None
    }
}
