//! The semantic resolution and dependency-ordering engine.
//!
//! Runs a fixed sequence of whole-program passes over one [`FileSystem`]:
//!
//! 1. translate the annotation tree into entities,
//! 2. substitute DEFINE macros into every expression,
//! 3. analyze every expression (free variables, `$name.` rewrite),
//! 4. per-object field/pointer/enum/rank validation,
//! 5. inheritance propagation,
//! 6. container element resolution,
//! 7. cross-reference collection and topological ordering,
//!
//! followed by the unused-type sweep.  The order is a correctness
//! dependency; later passes assume upstream mutations are complete.
//!
//! Errors are two-tier: fatal structural violations propagate as
//! [`SemanticError`] through `Result` and abort the pipeline; recoverable
//! gaps are [`Warning`]s collected by [`Diagnostics`], which never stop a
//! pass but fail the compilation as a whole.

mod diagnostics;
mod error;
mod inherit;
mod macros;
mod order;
mod resolver;
mod translate;

#[cfg(test)]
mod tests;

use log::debug;

use crate::compiler::ast::Decl;
use crate::compiler::ir::FileSystem;
use crate::compiler::{CompilerError, StringId, StringTable};

pub use diagnostics::{Diagnostics, Warning};
pub use error::SemanticError;

use resolver::Resolver;

pub type SemanticResult<T> = Result<T, CompilerError<SemanticError>>;

/// Resolves an annotation tree into a finished, ordered [`FileSystem`].
///
/// A fatal error aborts immediately.  Warnings are reported through
/// `diag`; callers must treat a non-clean [`Diagnostics`] as failure even
/// when this returns `Ok`.
pub fn resolve(
    name: StringId,
    tree: &[Decl],
    st: &StringTable,
    diag: &mut Diagnostics,
) -> SemanticResult<FileSystem> {
    debug!("translating annotation tree ({} declarations)", tree.len());
    let mut fs = translate::translate(name, tree, st)?;

    macros::substitute_all(&mut fs);
    macros::analyze_all(&mut fs, st);

    let resolver = Resolver::new(&fs, st);
    debug!("validating {} objects", fs.objects.len());
    resolver.validate_file_system(&mut fs, diag)?;
    inherit::propagate(&mut fs)?;
    resolver.resolve_container_elements(&mut fs, diag);

    order::setup(&mut fs);
    resolver.report_unused(&fs, diag);

    Ok(fs)
}
