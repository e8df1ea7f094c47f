//! The entity/metadata model: the in-memory representation that the
//! semantic passes build from the annotation tree and mutate in place.
//!
//! All entities live in arenas owned by [`FileSystem`]; relationships
//! between entities are stored as index ids ([`ObjectId`], [`ContainerId`],
//! [`CategoryId`], [`AddrspaceId`]) rather than owning references, so the
//! graph can hold pointer-mediated cycles.  A type reference held by a
//! field or container is a [`TypeRef`] and moves through exactly one
//! transition, from unresolved name to builtin marker or resolved entity.

mod addrspace;
mod builtin;
mod category;
mod container;
mod expr;
mod field;
mod filesystem;
mod object;
mod rank;

pub use addrspace::Addrspace;
pub use builtin::{is_pseudo_enum, BufferKind, BuiltinKind, BuiltinTable, Endian, IntSpec};
pub use category::{Category, CategoryKind, ConstValue, Constant};
pub use container::Container;
pub use expr::CExpr;
pub use field::{Dimension, Field, Member, Nested, NestedKind, Pointer, TypeRef};
pub use filesystem::{FileSystem, PointerSig};
pub use object::{BaseRef, Object, ObjectKind};
pub use rank::Rank;

/// Index of an [`Object`] within its owning [`FileSystem`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

/// Index of a [`Container`] within its owning [`FileSystem`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(usize);

/// Index of a [`Category`] within its owning [`FileSystem`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryId(usize);

/// Index of an [`Addrspace`] within its owning [`FileSystem`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AddrspaceId(usize);

macro_rules! id_impl {
    ($t:ident) => {
        impl $t {
            pub fn new(idx: usize) -> $t {
                $t(idx)
            }

            pub fn index(self) -> usize {
                self.0
            }
        }

        impl std::fmt::Display for $t {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_fmt(format_args!("{}", self.0))
            }
        }
    };
}

id_impl!(ObjectId);
id_impl!(ContainerId);
id_impl!(CategoryId);
id_impl!(AddrspaceId);

/// Identifies a metadata entity: something that occupies a region of the
/// file system and can be embedded, contained or pointed to.  Enumerations
/// are deliberately excluded; they never participate in containment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetaId {
    Object(ObjectId),
    Container(ContainerId),
}

/// Identifies any named type: metadata entities plus enumerations.  This is
/// the domain of the unified type table that name resolution scans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeId {
    Object(ObjectId),
    Container(ContainerId),
    Category(CategoryId),
}

impl From<MetaId> for TypeId {
    fn from(m: MetaId) -> TypeId {
        match m {
            MetaId::Object(id) => TypeId::Object(id),
            MetaId::Container(id) => TypeId::Container(id),
        }
    }
}
