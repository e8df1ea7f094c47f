//! Pass 7: cross-reference collection and the dependency orderer.
//!
//! The orderer consumes only the embedding edges recorded during
//! resolution.  Pointer relationships are excluded on purpose: the code
//! generator can always forward-declare a pointer target, so mutually
//! pointer-referencing types must not force an unsatisfiable order.

use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;

use crate::compiler::ir::{ContainerId, FileSystem, MetaId, ObjectId};

/// Computes `xrefs`, `object_table` and `forward_decl`.
///
/// The worklist is a modified Kahn sweep.  Each popped item moves to the
/// front of the output, displacing any earlier placement; a later
/// discovery of a dependency means it must be declared earlier than
/// previously thought.  Re-reaching a child through a parent it already
/// depends on signals a structural cycle, so the child is forward-declared
/// and, if not yet placed, appended at the tail without disturbing
/// placements already made.  Every embedding edge enqueues its child at
/// most once, so the sweep terminates on any finite input.
pub(super) fn setup(fs: &mut FileSystem) {
    fs.xrefs = (0..fs.objects.len())
        .map(ObjectId::new)
        .filter(|&id| fs.object(id).xref.is_some())
        .collect();

    // Every metadata entity nothing embeds yet is a root, containers
    // included: a vector reached only through pointers still has to be
    // declared, together with everything embedded beneath it.
    let mut work: VecDeque<MetaId> = (0..fs.objects.len())
        .map(|i| MetaId::Object(ObjectId::new(i)))
        .chain((0..fs.containers.len()).map(|i| MetaId::Container(ContainerId::new(i))))
        .filter(|&m| fs.embed_parent_count(m) == 0)
        .collect();

    let mut output: VecDeque<MetaId> = VecDeque::new();
    let mut depend: HashMap<MetaId, HashSet<MetaId>> = HashMap::new();
    let mut forward: Vec<MetaId> = Vec::new();

    while let Some(curr) = work.pop_front() {
        if let Some(pos) = output.iter().position(|&m| m == curr) {
            output.remove(pos);
        }
        output.push_front(curr);

        let children: Vec<MetaId> = fs.embed_children(curr).to_vec();
        for child in children {
            if work.contains(&child) && !forward.contains(&child) {
                debug!("forward declaration for in-flight dependency");
                forward.push(child);
            }

            let curr_deps = depend.get(&curr).cloned().unwrap_or_default();
            let child_deps = depend.entry(child).or_insert_with(HashSet::new);
            if !child_deps.contains(&curr) {
                child_deps.extend(curr_deps);
                child_deps.insert(curr);
                work.push_back(child);
            } else {
                // Structural recursion: the child already depends on the
                // current item and was reached from it again.
                if !forward.contains(&child) {
                    forward.push(child);
                }
                if !output.contains(&child) {
                    output.push_back(child);
                }
            }
        }
    }

    fs.object_table = output.into_iter().collect();
    fs.forward_decl = forward;
}
