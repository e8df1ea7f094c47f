use crate::compiler::stringtable::StringId;

use super::{CExpr, Member, MetaId, ObjectId, Rank};

/// Distinguishes the singular super block from ordinary structs.
#[derive(Clone, Debug, PartialEq)]
pub enum ObjectKind {
    Struct,

    /// The root of the file system; `location` is where it sits on disk.
    Super { location: CExpr },
}

/// A single-inheritance base reference, resolved from the declared name to
/// the base object during validation.
#[derive(Clone, Debug, PartialEq)]
pub struct BaseRef {
    pub name: StringId,
    pub target: Option<ObjectId>,
}

/// An annotated struct declaration: a contiguous region of file-system
/// metadata with typed fields.
#[derive(Clone, Debug, PartialEq)]
pub struct Object {
    /// The struct tag as written, possibly empty for anonymous typedefs.
    pub name: StringId,

    /// Canonical type name used for resolution and output: the first
    /// typedef alias when present, otherwise `struct <tag>`.
    pub typename: StringId,

    pub aliases: Vec<StringId>,

    pub kind: ObjectKind,

    pub rank: Rank,

    pub size: Option<CExpr>,

    /// Cross-reference name, when the object is externally nameable.
    pub xref: Option<StringId>,

    pub base: Option<BaseRef>,

    /// Discriminant guard; only legal together with `base`.
    pub when: Option<CExpr>,

    /// Boolean invariants from CHECK annotations.
    pub checks: Vec<CExpr>,

    pub fields: Vec<Member>,

    /// Objects that declare this one as their base.
    pub derived: Vec<ObjectId>,

    /// Entities that reference this one (through embedding or pointers).
    pub parents: Vec<MetaId>,

    /// Entities this one references.
    pub children: Vec<MetaId>,

    pub line: u32,
}

impl Object {
    pub fn is_super(&self) -> bool {
        matches!(self.kind, ObjectKind::Super { .. })
    }

    /// Reference count: how many entities name this one, plus one when the
    /// object derives from a base.
    pub fn refcount(&self) -> usize {
        self.parents.len() + if self.base.is_some() { 1 } else { 0 }
    }
}
