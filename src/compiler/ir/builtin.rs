use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
    Native,
}

/// Shape of a builtin integer field type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntSpec {
    pub bits: u8,
    pub signed: bool,
    pub endian: Endian,
}

/// The recognized raw-buffer field kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferKind {
    Bitmap,
    Data,
}

impl BufferKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BufferKind::Bitmap => "bitmap",
            BufferKind::Data => "data",
        }
    }
}

/// Marker for a type reference that does not resolve to a declared entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuiltinKind {
    Int(IntSpec),
    Buffer(BufferKind),

    /// Padding that the code generator skips over.
    Skip,

    /// A field whose declared type named an enumeration; the category
    /// binding on the field carries the detail.  Never produced by
    /// [`BuiltinTable::classify`].
    Enum,
}

/**
The closed table of builtin type names, populated once at startup.

Fixed-width names are generated from the endianness/signedness prefixes
(`le`, `be`, `u`, `s`, `U`, `S`), the widths 8/16/32/64, and the kernel
style leading-underscore variants, so `le32`, `__le32` and `__u64` all
classify without pattern matching on free text.  Core C integer spellings
(`unsigned long`, `signed char`, ...) are recognized token by token.
 */
pub struct BuiltinTable {
    ints: HashMap<String, IntSpec>,
}

impl BuiltinTable {
    pub fn new() -> BuiltinTable {
        let mut ints = HashMap::new();
        let prefixes: &[(&str, bool, Endian)] = &[
            ("le", false, Endian::Little),
            ("be", false, Endian::Big),
            ("u", false, Endian::Native),
            ("s", true, Endian::Native),
            ("U", false, Endian::Native),
            ("S", true, Endian::Native),
        ];
        for &(prefix, signed, endian) in prefixes {
            for &bits in &[8u8, 16, 32, 64] {
                for &lead in &["", "_", "__"] {
                    ints.insert(
                        format!("{}{}{}", lead, prefix, bits),
                        IntSpec {
                            bits,
                            signed,
                            endian,
                        },
                    );
                }
            }
        }
        BuiltinTable { ints }
    }

    /// Classifies a declared type name.  `None` means the name must be
    /// resolved against the declared type table instead.
    pub fn classify(&self, name: &str) -> Option<BuiltinKind> {
        if let Some(spec) = self.ints.get(name) {
            return Some(BuiltinKind::Int(*spec));
        }
        if let Some(spec) = core_int(name) {
            return Some(BuiltinKind::Int(spec));
        }
        match name {
            "bitmap" => Some(BuiltinKind::Buffer(BufferKind::Bitmap)),
            "data" => Some(BuiltinKind::Buffer(BufferKind::Data)),
            "skip" => Some(BuiltinKind::Skip),
            _ => None,
        }
    }
}

impl Default for BuiltinTable {
    fn default() -> Self {
        BuiltinTable::new()
    }
}

/// The enum-binding names that are reserved for generator-known kinds and
/// never looked up among the declared enumerations.
pub fn is_pseudo_enum(name: &str) -> bool {
    matches!(name, "timestamp" | "uuid" | "bitmap" | "data" | "skip")
}

/// Recognizes integer types written with the core C keywords only, such as
/// `unsigned long` or `signed char`.
fn core_int(name: &str) -> Option<IntSpec> {
    let mut any = false;
    let mut signed = true;
    let mut bits = 32u8;
    for tok in name.split_whitespace() {
        match tok {
            "unsigned" => signed = false,
            "signed" => signed = true,
            "char" => bits = 8,
            "short" => bits = 16,
            "int" => bits = 32,
            "long" => bits = 64,
            _ => return None,
        }
        any = true;
    }
    if any {
        Some(IntSpec {
            bits,
            signed,
            endian: Endian::Native,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_names_classify_as_ints() {
        let table = BuiltinTable::new();
        assert_eq!(
            table.classify("le32"),
            Some(BuiltinKind::Int(IntSpec {
                bits: 32,
                signed: false,
                endian: Endian::Little,
            }))
        );
        assert_eq!(
            table.classify("__u64"),
            Some(BuiltinKind::Int(IntSpec {
                bits: 64,
                signed: false,
                endian: Endian::Native,
            }))
        );
        assert_eq!(
            table.classify("_be16"),
            Some(BuiltinKind::Int(IntSpec {
                bits: 16,
                signed: false,
                endian: Endian::Big,
            }))
        );
    }

    #[test]
    fn core_word_types_classify_as_ints() {
        let table = BuiltinTable::new();
        match table.classify("unsigned long") {
            Some(BuiltinKind::Int(spec)) => {
                assert_eq!(spec.bits, 64);
                assert!(!spec.signed);
            }
            other => panic!("expected int, got {:?}", other),
        }
        assert!(table.classify("signed char").is_some());
    }

    #[test]
    fn buffer_and_skip_kinds() {
        let table = BuiltinTable::new();
        assert_eq!(
            table.classify("bitmap"),
            Some(BuiltinKind::Buffer(BufferKind::Bitmap))
        );
        assert_eq!(
            table.classify("data"),
            Some(BuiltinKind::Buffer(BufferKind::Data))
        );
        assert_eq!(table.classify("skip"), Some(BuiltinKind::Skip));
    }

    #[test]
    fn declared_types_are_not_builtin() {
        let table = BuiltinTable::new();
        assert_eq!(table.classify("struct ext4_inode"), None);
        assert_eq!(table.classify("blkgrp_t"), None);
    }

    #[test]
    fn pseudo_enum_names() {
        assert!(is_pseudo_enum("timestamp"));
        assert!(is_pseudo_enum("uuid"));
        assert!(is_pseudo_enum("bitmap"));
        assert!(!is_pseudo_enum("color"));
    }
}
