use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single annotation attached to a declaration or a member, e.g.
/// `FSSTRUCT(rank="container", size="sb.block_size")`.
///
/// The argument map is ordered so that argument validation and error
/// reporting are deterministic across runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// The annotation keyword: FSSTRUCT, FSSUPER, FSCONST, VECTOR, POINTER,
    /// FIELD, CHECK, ADDRSPACE or DEFINE.
    pub name: String,

    /// Keyword arguments, raw text values.
    pub args: BTreeMap<String, String>,

    /// Source line the annotation appeared on.
    pub line: u32,
}

impl Annotation {
    pub fn new(name: &str, line: u32) -> Annotation {
        Annotation {
            name: name.into(),
            args: BTreeMap::new(),
            line,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.args.get(key).map(|v| v.as_str())
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn has(&self, key: &str) -> bool {
        self.args.contains_key(key)
    }
}
