use crate::compiler::stringtable::StringId;

use super::CExpr;

/// A named domain in which a pointer representation's raw value is
/// interpreted.  The two generic spaces, raw byte offsets (`byte`) and
/// self-relative offsets (`offset`), are pre-seeded into every file system.
#[derive(Clone, Debug, PartialEq)]
pub struct Addrspace {
    pub name: StringId,

    /// Width in bytes of a stored address in this space.
    pub size: CExpr,

    /// The value that encodes "no target" in this space.
    pub null: CExpr,

    /// True for the two built-in spaces.
    pub generic: bool,
}

impl Addrspace {
    pub fn new(name: StringId, size: CExpr, null: CExpr) -> Addrspace {
        Addrspace {
            name,
            size,
            null,
            generic: false,
        }
    }

    pub fn generic(name: StringId, size: CExpr, null: CExpr) -> Addrspace {
        Addrspace {
            name,
            size,
            null,
            generic: true,
        }
    }
}
