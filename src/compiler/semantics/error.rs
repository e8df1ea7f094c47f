use crate::compiler::{CompilerDisplay, CompilerDisplayError, StringTable};
use crate::StringId;

/// A structural impossibility that makes continued analysis unsafe.  These
/// abort the compilation immediately; recoverable gaps go through
/// [`super::Diagnostics`] as warnings instead.
#[derive(Clone, Debug, PartialEq)]
pub enum SemanticError {
    UnknownAnnotation(String),
    InvalidArgument {
        anno: String,
        arg: String,
    },
    MissingArgument {
        anno: String,
        arg: String,
    },
    MultipleFieldAnnotations(StringId),
    MultipleSuper(StringId),
    MissingSuper,
    DuplicateType(StringId),
    InvalidRank {
        object: StringId,
        rank: String,
    },
    WhenWithoutBase(StringId),
    InvalidEnumKind {
        category: StringId,
        kind: String,
    },
    DuplicateAddrspace(StringId),
    FlexibleArrayNeedsCount(StringId),
    CountOnNonFlexible {
        field: StringId,
        arg: String,
    },
    ArrayOfStructs(StringId),
    InnerFieldArgument {
        field: StringId,
        arg: String,
    },
    VectorAsProperty(StringId),
    ImplicitFieldExists(StringId),
    MixedOffsetPointers(StringId),
    MixedConditionalPointers(StringId),
    BaseNotFound {
        derived: StringId,
        base: StringId,
    },
    ExtentUnsupported(StringId),
    ExtentSizeMissing(StringId),
    ContainerFieldRank {
        object: StringId,
        field: StringId,
    },
    PointerToBuiltin {
        field: StringId,
        ty: StringId,
    },
    NonOffsetToObject {
        field: StringId,
        ty: StringId,
    },
    OffsetToNonObject {
        field: StringId,
        ty: StringId,
    },
    EnumNotFound {
        field: StringId,
        name: StringId,
    },
    ExtentBaseRank {
        derived: StringId,
        base: StringId,
    },
}

impl CompilerDisplay for SemanticError {
    fn fmt(&self, st: &StringTable) -> Result<String, CompilerDisplayError> {
        use SemanticError::*;
        Ok(match self {
            UnknownAnnotation(anno) => format!("unknown annotation {}", anno),
            InvalidArgument { anno, arg } => {
                format!("invalid argument {} for {}", arg, anno)
            }
            MissingArgument { anno, arg } => {
                format!("missing argument {} for {}", arg, anno)
            }
            MultipleFieldAnnotations(field) => format!(
                "multiple FIELD annotations on member {}",
                field.fmt(st)?
            ),
            MultipleSuper(name) => format!(
                "more than one FSSUPER declaration ({} is not the first)",
                name.fmt(st)?
            ),
            MissingSuper => "no FSSUPER declaration found".into(),
            DuplicateType(name) => {
                format!("type {} declared more than once", name.fmt(st)?)
            }
            InvalidRank { object, rank } => format!(
                "invalid rank {} for struct {}",
                rank,
                object.fmt(st)?
            ),
            WhenWithoutBase(name) => format!(
                "struct {} has a when discriminant but no base",
                name.fmt(st)?
            ),
            InvalidEnumKind { category, kind } => format!(
                "invalid enum kind {} for {}",
                kind,
                category.fmt(st)?
            ),
            DuplicateAddrspace(name) => format!(
                "address space {} declared more than once",
                name.fmt(st)?
            ),
            FlexibleArrayNeedsCount(field) => format!(
                "flexible array {} needs a count or sentinel",
                field.fmt(st)?
            ),
            CountOnNonFlexible { field, arg } => format!(
                "{} given for non-flexible member {}",
                arg,
                field.fmt(st)?
            ),
            ArrayOfStructs(field) => format!(
                "array of structs is unsupported (member {})",
                field.fmt(st)?
            ),
            InnerFieldArgument { field, arg } => format!(
                "{} is not valid on inner member {}",
                arg,
                field.fmt(st)?
            ),
            VectorAsProperty(object) => format!(
                "VECTOR annotation used as a property of struct {}",
                object.fmt(st)?
            ),
            ImplicitFieldExists(field) => format!(
                "implicit pointer collides with existing field {}",
                field.fmt(st)?
            ),
            MixedOffsetPointers(field) => format!(
                "field {} mixes offset and non-offset pointers",
                field.fmt(st)?
            ),
            MixedConditionalPointers(field) => format!(
                "field {} mixes conditional and unconditional pointers",
                field.fmt(st)?
            ),
            BaseNotFound { derived, base } => format!(
                "base {} of struct {} is not declared",
                base.fmt(st)?,
                derived.fmt(st)?
            ),
            ExtentUnsupported(name) => format!(
                "extent rank on struct {} is unsupported",
                name.fmt(st)?
            ),
            ExtentSizeMissing(name) => format!(
                "extent struct {} must declare a size",
                name.fmt(st)?
            ),
            ContainerFieldRank { object, field } => format!(
                "container struct {} embeds non-object field {}",
                object.fmt(st)?,
                field.fmt(st)?
            ),
            PointerToBuiltin { field, ty } => format!(
                "pointer on field {} targets builtin type {}",
                field.fmt(st)?,
                ty.fmt(st)?
            ),
            NonOffsetToObject { field, ty } => format!(
                "pointer on field {} targets object {} without offset representation",
                field.fmt(st)?,
                ty.fmt(st)?
            ),
            OffsetToNonObject { field, ty } => format!(
                "offset pointer on field {} targets non-object {}",
                field.fmt(st)?,
                ty.fmt(st)?
            ),
            EnumNotFound { field, name } => format!(
                "enum {} bound by field {} is not declared",
                name.fmt(st)?,
                field.fmt(st)?
            ),
            ExtentBaseRank { derived, base } => format!(
                "extent struct {} cannot derive from lower-ranked base {}",
                derived.fmt(st)?,
                base.fmt(st)?
            ),
        })
    }
}
