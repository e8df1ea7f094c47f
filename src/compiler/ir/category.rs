use crate::compiler::stringtable::StringId;

/// How the constants of a category combine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoryKind {
    /// Exactly one constant at a time.
    Enum,

    /// Constants are single bits and combine by OR.
    Flag,

    /// An enum whose constant list is knowingly incomplete; unlisted
    /// values are legal.
    Partial,
}

impl CategoryKind {
    pub fn from_keyword(kw: &str) -> Option<CategoryKind> {
        match kw {
            "enum" => Some(CategoryKind::Enum),
            "flag" => Some(CategoryKind::Flag),
            "partial" => Some(CategoryKind::Partial),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Enum => "enum",
            CategoryKind::Flag => "flag",
            CategoryKind::Partial => "partial",
        }
    }
}

/// A resolved enumerator value: either a concrete integer or the raw
/// initializer expression when it could not be evaluated here.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstValue {
    Int(i64),
    Expr(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Constant {
    pub name: StringId,
    pub value: ConstValue,
}

/// An enumerated-constant category declared with FSCONST.  Categories are
/// named types for resolution purposes but never metadata: they occupy no
/// region and cannot be embedded or pointed to.
#[derive(Clone, Debug, PartialEq)]
pub struct Category {
    /// Canonical name: the first typedef alias, or `enum <tag>`.
    pub name: StringId,

    pub aliases: Vec<StringId>,

    pub kind: CategoryKind,

    pub constants: Vec<Constant>,

    /// False once any constant value decreases or is symbolic; a simple
    /// category can be rendered as a plain value-indexed table downstream.
    pub simple: bool,

    /// Number of fields bound to this category.
    pub refcount: u32,

    pub line: u32,
}
