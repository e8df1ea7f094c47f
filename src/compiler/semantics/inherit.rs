//! Pass 5: propagate size and rank through single inheritance.

use log::debug;

use crate::compiler::ir::{FileSystem, ObjectId, Rank};
use crate::compiler::CompilerError;

use super::{SemanticError, SemanticResult};

/// Runs once, after all per-object validation has resolved every base
/// reference.  For each base/derived pair: the derived struct inherits the
/// base's size when it has none of its own; a rank below the base's is
/// silently raised to match; an explicitly extent-ranked struct over a
/// strictly lower-ranked base is rejected.
pub(super) fn propagate(fs: &mut FileSystem) -> SemanticResult<()> {
    for i in 0..fs.objects.len() {
        let oid = ObjectId::new(i);
        let base_id = match fs.object(oid).base.as_ref().and_then(|b| b.target) {
            Some(id) => id,
            None => continue,
        };
        let (base_rank, base_size, base_name) = {
            let b = fs.object(base_id);
            (b.rank, b.size.clone(), b.typename)
        };

        let obj = fs.object_mut(oid);
        if obj.size.is_none() {
            obj.size = base_size;
        }
        if obj.rank == Rank::Extent && base_rank < Rank::Extent {
            return Err(CompilerError::new(
                Some(obj.line),
                SemanticError::ExtentBaseRank {
                    derived: obj.typename,
                    base: base_name,
                },
            ));
        }
        if obj.rank < base_rank {
            debug!("raising rank of {} to {}", oid, base_rank);
            obj.rank = base_rank;
        }
        if obj.rank == Rank::Extent && obj.size.is_none() {
            return Err(CompilerError::new(
                Some(obj.line),
                SemanticError::ExtentSizeMissing(obj.typename),
            ));
        }
    }
    Ok(())
}
