/**
 * The compiler takes an annotation tree that has been produced by the front
 * end and converts it into a validated, dependency-ordered internal
 * representation of a file system's metadata layout.
 *
 * Internally, the compiler runs a fixed sequence of whole-program passes
 * over a single in-memory `FileSystem` aggregate: translation of the
 * annotation tree into entities, macro substitution over raw C-expression
 * text, expression analysis, per-object field/pointer/enum/rank validation,
 * inheritance propagation, container element resolution, and finally
 * cross-reference collection plus the topological ordering of all metadata
 * types.  Pass order is significant: later passes assume that all upstream
 * mutations are complete.
 *
 * Errors split into two tiers.  A WARNING is a recoverable semantic gap
 * (for example an unresolved type reference); it is printed immediately and
 * flips an aggregate flag but processing continues so that every such issue
 * in one compilation is surfaced together.  An ERROR is a structural
 * impossibility that makes continued analysis unsafe; it aborts the whole
 * pipeline via `Result` propagation.  If only warnings occurred, the
 * process still terminates with a failure status after completing every
 * passable check.
 */
pub mod ast;
pub mod error;
pub mod ir;
pub mod semantics;
pub mod stringtable;

pub use error::CompilerError;
pub use stringtable::{StringId, StringTable};

use stringtable::StringTableError;

/// Errors that occur while formatting a compiler message for the user.
#[derive(Debug)]
pub enum CompilerDisplayError {
    StringIdNotFound,
}

impl From<StringTableError> for CompilerDisplayError {
    fn from(ste: StringTableError) -> Self {
        match ste {
            StringTableError::NotFound => Self::StringIdNotFound,
        }
    }
}

impl std::fmt::Display for CompilerDisplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompilerDisplayError::StringIdNotFound => f.write_str("StringId Not Found"),
        }
    }
}

/// Renders a compiler value into a human readable string.  This is used
/// instead of [`std::fmt::Display`] because interned [`StringId`]s can only
/// be turned back into text with the [`StringTable`] at hand.
pub trait CompilerDisplay {
    fn fmt(&self, st: &StringTable) -> Result<String, CompilerDisplayError>;
}
