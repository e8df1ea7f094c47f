use crate::compiler::stringtable::StringId;

use super::{CExpr, MetaId, TypeRef};

/// A contiguous region holding instances of a single element type,
/// declared with a VECTOR annotation.  Its rank is not stored; it is
/// derived from the element's kind by [`super::FileSystem::rank_of`].
#[derive(Clone, Debug, PartialEq)]
pub struct Container {
    pub name: StringId,

    /// The element type text as written.
    pub element_name: StringId,

    pub element: TypeRef,

    pub size: Option<CExpr>,
    pub count: Option<CExpr>,
    pub sentinel: Option<CExpr>,

    pub parents: Vec<MetaId>,
    pub children: Vec<MetaId>,

    pub line: u32,
}

impl Container {
    pub fn refcount(&self) -> usize {
        self.parents.len()
    }
}
