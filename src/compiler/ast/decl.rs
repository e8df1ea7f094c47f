use serde::{Deserialize, Serialize};

use super::{Annotation, Member};

/// A top-level node of the annotation tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Decl {
    /// An annotated struct declaration (FSSTRUCT or FSSUPER).
    Struct(StructDecl),

    /// An annotated enum declaration (FSCONST).
    Enum(EnumDecl),

    /// A free-standing annotation: DEFINE, VECTOR or ADDRSPACE.
    Directive(Annotation),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructDecl {
    /// The struct tag; empty for an anonymous typedef'ed struct.
    pub name: String,

    /// Typedef aliases, in declaration order.
    pub aliases: Vec<String>,

    /// The property annotations; the first one is FSSTRUCT or FSSUPER,
    /// the rest are POINTER/FIELD/CHECK annotations on the struct body.
    pub annos: Vec<Annotation>,

    pub members: Vec<Member>,

    pub line: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnumDecl {
    /// The enum tag; empty for an anonymous typedef'ed enum.
    pub name: String,

    pub aliases: Vec<String>,

    /// The FSCONST annotation.
    pub anno: Annotation,

    pub enumerators: Vec<Enumerator>,

    pub line: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Enumerator {
    pub name: String,

    /// The raw initializer text, when one was written.
    pub value: Option<String>,

    pub line: u32,
}
