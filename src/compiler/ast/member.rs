use serde::{Deserialize, Serialize};

use super::Annotation;

/// A member of a struct declaration body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Member {
    Scalar(ScalarMember),
    Array(ArrayMember),
    Inner(InnerMember),

    /// A VECTOR annotation written inside a struct body, declaring a
    /// variable-length embedded region as a field.
    Vector(Annotation),
}

/// A plain field: `le32 i_blocks;`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScalarMember {
    pub name: String,

    /// The raw declared type text, e.g. `le32` or `struct ext4_extent`.
    pub ty: String,

    /// POINTER/FIELD annotations written on this member.
    pub annos: Vec<Annotation>,

    pub line: u32,
}

/// An array field: `le32 i_block[EXT4_N_BLOCKS];`.  A flexible array
/// member has a single empty dimension.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrayMember {
    pub name: String,

    pub ty: String,

    /// Raw dimension expressions, outermost first.  An empty string is a
    /// flexible (unsized) dimension.
    pub dims: Vec<String>,

    pub annos: Vec<Annotation>,

    pub line: u32,
}

/// An inline struct or union member with its own body:
/// `union { ... } osd1;`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InnerMember {
    pub name: String,

    /// `struct` or `union`.
    pub ty: String,

    /// Array dimensions when the inner member is itself an array.
    pub dims: Vec<String>,

    pub members: Vec<Member>,

    pub annos: Vec<Annotation>,

    pub line: u32,
}
