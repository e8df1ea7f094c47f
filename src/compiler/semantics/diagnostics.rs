use crate::compiler::{CompilerDisplay, CompilerDisplayError, StringTable};
use crate::StringId;

/// A recoverable semantic gap.  Warnings never stop a pass; they are
/// printed as they occur and remembered, and the compilation as a whole
/// fails once any was emitted.
#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    UnresolvedFieldType {
        object: StringId,
        field: StringId,
        ty: StringId,
    },
    UnresolvedPointerType {
        field: StringId,
        ty: StringId,
    },
    UnresolvedContainerType {
        container: StringId,
        ty: StringId,
    },
    UnresolvedAddrspace {
        field: StringId,
        repr: StringId,
    },
    PointerStorageMismatch {
        field: StringId,
        other: StringId,
        repr: StringId,
        ty: StringId,
    },
    UnusedType(StringId),
    UnusedCategory(StringId),
}

impl CompilerDisplay for Warning {
    fn fmt(&self, st: &StringTable) -> Result<String, CompilerDisplayError> {
        use Warning::*;
        Ok(match self {
            UnresolvedFieldType { object, field, ty } => format!(
                "cannot resolve type {} of field {} in {}",
                ty.fmt(st)?,
                field.fmt(st)?,
                object.fmt(st)?
            ),
            UnresolvedPointerType { field, ty } => format!(
                "cannot resolve pointer type {} on field {}",
                ty.fmt(st)?,
                field.fmt(st)?
            ),
            UnresolvedContainerType { container, ty } => format!(
                "cannot resolve element type {} of vector {}",
                ty.fmt(st)?,
                container.fmt(st)?
            ),
            UnresolvedAddrspace { field, repr } => format!(
                "cannot resolve address space {} on field {}",
                repr.fmt(st)?,
                field.fmt(st)?
            ),
            PointerStorageMismatch {
                field,
                other,
                repr,
                ty,
            } => format!(
                "pointer ({}, {}) on field {} has a different storage type than field {}",
                repr.fmt(st)?,
                ty.fmt(st)?,
                field.fmt(st)?,
                other.fmt(st)?
            ),
            UnusedType(name) => format!("type {} is never used", name.fmt(st)?),
            UnusedCategory(name) => format!("enum {} is never used", name.fmt(st)?),
        })
    }
}

/// The warning sink for one compilation: prints each warning immediately
/// and tracks the aggregate success flag.
pub struct Diagnostics {
    warnings: Vec<Warning>,
    clean: bool,
}

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics {
            warnings: Vec::new(),
            clean: true,
        }
    }

    pub fn warn(&mut self, st: &StringTable, w: Warning) {
        match w.fmt(st) {
            Ok(msg) => eprintln!("Warning, {}", msg),
            Err(_) => eprintln!("Warning, {:?}", w),
        }
        self.clean = false;
        self.warnings.push(w);
    }

    /// True while no warning has been emitted.
    pub fn is_clean(&self) -> bool {
        self.clean
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Diagnostics::new()
    }
}
