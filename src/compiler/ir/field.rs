use crate::compiler::stringtable::StringId;

use super::{AddrspaceId, BuiltinKind, CExpr, CategoryId, MetaId};

/// A type reference held by a field or container element.
///
/// Starts life as the unresolved declared name and makes exactly one
/// forward transition during resolution, to a builtin marker or to a
/// resolved metadata entity.  It never moves back.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TypeRef {
    Unresolved(StringId),
    Builtin(BuiltinKind),
    Resolved(MetaId),
}

impl TypeRef {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, TypeRef::Unresolved(_))
    }
}

/// One array dimension.  A flexible dimension has no bound expression and
/// needs a count or sentinel on the field to be traversable.
#[derive(Clone, Debug, PartialEq)]
pub enum Dimension {
    Fixed(CExpr),
    Flexible,
}

/// A member of an object: either a concrete field or an inline
/// struct/union with members of its own.
#[derive(Clone, Debug, PartialEq)]
pub enum Member {
    Field(Field),
    Nested(Nested),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: StringId,

    /// The declared type text as written.  Kept even after resolution; the
    /// pointer-table mismatch warning compares raw storage types.
    pub ty_name: StringId,

    pub ty: TypeRef,

    /// The enum binding name from a FIELD `type` argument or from a buffer
    /// kind declared as the field's type.
    pub enum_name: Option<StringId>,

    /// Filled by the enum binder when `enum_name` names a declared
    /// category.
    pub category: Option<CategoryId>,

    pub dims: Vec<Dimension>,

    pub when: Option<CExpr>,

    /// Present on computed fields; the value is derived, not stored.
    pub expr: Option<CExpr>,

    pub size: Option<CExpr>,
    pub count: Option<CExpr>,
    pub sentinel: Option<CExpr>,

    pub pointers: Vec<Pointer>,

    /// True for the pseudo-field holding implicit pointers declared on the
    /// struct rather than on a member.
    pub implicit: bool,

    pub line: u32,
}

impl Field {
    /// True when the field has a flexible (unsized) array dimension.
    pub fn is_flexible(&self) -> bool {
        self.dims.iter().any(|d| matches!(d, Dimension::Flexible))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NestedKind {
    Struct,
    Union,
}

/// An inline struct or union member.
#[derive(Clone, Debug, PartialEq)]
pub struct Nested {
    pub name: StringId,
    pub kind: NestedKind,
    pub dims: Vec<Dimension>,
    pub when: Option<CExpr>,
    pub members: Vec<Member>,
    pub line: u32,
}

/// A pointer from a field's stored value (or computed location) to another
/// metadata region.
#[derive(Clone, Debug, PartialEq)]
pub struct Pointer {
    /// The representation token: an address-space name or `offset`.
    pub repr: StringId,

    /// The declared target type text.
    pub ty_name: StringId,

    pub when: Option<CExpr>,

    /// Location formula of an implicit pointer.
    pub expr: Option<CExpr>,

    /// True when `expr` was written relative to the containing object
    /// (spelled with the `container` keyword).
    pub relative: bool,

    pub size: Option<CExpr>,
    pub count: Option<CExpr>,

    pub target: Option<MetaId>,
    pub addrspace: Option<AddrspaceId>,

    pub line: u32,
}
