//! The annotation tree: the input contract between the external front end
//! (lexer/parser for the annotated C header language) and this compiler.
//!
//! The front end hands over a sequence of [`Decl`] nodes.  Every node
//! carries its annotations as name → value argument maps together with the
//! source line they appeared on, so diagnostics can point back into the
//! header file.  All types here derive the serde traits: the front end is a
//! separate process and serializes the tree as JSON.

mod annotation;
mod decl;
mod member;

pub use annotation::Annotation;
pub use decl::{Decl, EnumDecl, Enumerator, StructDecl};
pub use member::{ArrayMember, InnerMember, Member, ScalarMember};
