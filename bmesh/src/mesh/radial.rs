//! Radial cycles.
//!
//! Each edge threads the loops that lie on it (one per use of the edge by a
//! face) into a circular, doubly linked list. The length of this cycle
//! classifies the edge: zero is a wire edge, one is a boundary, two is
//! manifold, and more is non-manifold.
//!
//! A loop that is not in any radial cycle links to itself and has a null
//! edge.

use std::iter;

use crate::entity::storage::Key;
use crate::mesh::core::Core;
use crate::mesh::cycle_limit_exceeded;
use crate::mesh::key::{EdgeKey, FaceKey, LoopKey, VertexKey};

/// Inserts `lp` into the radial cycle of `edge` and sets the loop's edge.
///
/// Panics if the loop already belongs to a radial cycle.
pub fn append(core: &mut Core, edge: EdgeKey, lp: LoopKey) {
    {
        let lp = &core.loops[lp];
        if !lp.edge.is_null() {
            panic!("internal error: loop already belongs to a radial cycle");
        }
    }
    match core.edges[edge].radial {
        None => {
            core.edges[edge].radial = Some(lp);
            let entity = &mut core.loops[lp];
            entity.radial_next = lp;
            entity.radial_prev = lp;
        }
        Some(anchor) => {
            let prev = core.loops[anchor].radial_prev;
            {
                let entity = &mut core.loops[lp];
                entity.radial_next = anchor;
                entity.radial_prev = prev;
            }
            core.loops[anchor].radial_prev = lp;
            core.loops[prev].radial_next = lp;
        }
    }
    core.loops[lp].edge = edge;
}

/// Removes `lp` from the radial cycle of `edge`.
///
/// If `lp` is the anchor of the edge, then the anchor moves to its successor
/// or is cleared if the cycle becomes empty. The removed loop is detached.
pub fn remove(core: &mut Core, lp: LoopKey, edge: EdgeKey) {
    debug_assert_eq!(core.loops[lp].edge, edge);
    let next = core.loops[lp].radial_next;
    let prev = core.loops[lp].radial_prev;
    if next == lp {
        debug_assert_eq!(core.edges[edge].radial, Some(lp));
        core.edges[edge].radial = None;
    }
    else {
        core.loops[prev].radial_next = next;
        core.loops[next].radial_prev = prev;
        if core.edges[edge].radial == Some(lp) {
            core.edges[edge].radial = Some(next);
        }
    }
    let entity = &mut core.loops[lp];
    entity.radial_next = lp;
    entity.radial_prev = lp;
    entity.edge = EdgeKey::null();
}

/// Gets an iterator over the radial cycle of `edge`, starting at its anchor.
///
/// Panics if the walk exceeds `limit` steps.
pub fn loops(core: &Core, edge: EdgeKey, limit: usize) -> impl '_ + Iterator<Item = LoopKey> {
    let first = core.edges[edge].radial;
    let mut steps = 0usize;
    iter::successors(first, move |lp| {
        let next = core.loops[*lp].radial_next;
        (Some(next) != first).then(|| next)
    })
    .inspect(move |_| {
        steps += 1;
        if steps > limit {
            cycle_limit_exceeded(limit);
        }
    })
}

/// Gets the number of faces that use `edge`.
pub fn count(core: &Core, edge: EdgeKey, limit: usize) -> usize {
    loops(core, edge, limit).count()
}

/// Finds the loop of `face` in the radial cycle of `edge`.
pub fn find_face(core: &Core, edge: EdgeKey, face: FaceKey, limit: usize) -> Option<LoopKey> {
    loops(core, edge, limit).find(|lp| core.loops[*lp].face == face)
}

/// Finds the first loop in the radial cycle of `edge` that originates at
/// `vertex`.
pub fn first_loop_at_vertex(
    core: &Core,
    edge: EdgeKey,
    vertex: VertexKey,
    limit: usize,
) -> Option<LoopKey> {
    loops(core, edge, limit).find(|lp| core.loops[*lp].vertex == vertex)
}

/// Finds the loop after `lp` in its radial cycle that originates at
/// `vertex`.
///
/// The walk wraps around, so `lp` itself is returned if no other loop in the
/// cycle originates at `vertex`.
pub fn next_loop_at_vertex(core: &Core, lp: LoopKey, vertex: VertexKey, limit: usize) -> LoopKey {
    let mut current = lp;
    for _ in 0..=limit {
        current = core.loops[current].radial_next;
        if current == lp || core.loops[current].vertex == vertex {
            return current;
        }
    }
    cycle_limit_exceeded(limit)
}
