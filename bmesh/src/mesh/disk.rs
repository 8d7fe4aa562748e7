//! Disk cycles.
//!
//! Each vertex threads its incident edges into a circular, doubly linked
//! list. The links are embedded in the edges themselves: an edge carries one
//! `DiskLink` per endpoint and the link that belongs to a given vertex is
//! selected with `Edge::side`. A vertex refers to any one edge of its cycle
//! (the anchor), or to no edge at all if it is isolated.
//!
//! Passing an edge with a vertex that is not one of its endpoints is a
//! consistency violation and panics.

use std::iter;

use crate::mesh::core::Core;
use crate::mesh::edge::{DiskLink, Side};
use crate::mesh::key::{EdgeKey, VertexKey};
use crate::mesh::{cycle_limit_exceeded, OptionExt as _};

fn side_of(core: &Core, edge: EdgeKey, vertex: VertexKey) -> Side {
    core.edges[edge].side(vertex).expect_consistent()
}

/// Inserts `edge` into the disk cycle of `vertex`.
///
/// The edge becomes the sole member of the cycle if the vertex is isolated.
/// Otherwise, it is inserted immediately before the anchor.
pub fn append(core: &mut Core, edge: EdgeKey, vertex: VertexKey) {
    let side = side_of(core, edge, vertex);
    match core.vertices[vertex].edge {
        None => {
            *core.edges[edge].link_mut(side) = DiskLink {
                next: Some(edge),
                prev: Some(edge),
            };
            core.vertices[vertex].edge = Some(edge);
        }
        Some(anchor) => {
            let anchor_side = side_of(core, anchor, vertex);
            let prev = core.edges[anchor]
                .link(anchor_side)
                .prev
                .expect_consistent();
            let prev_side = side_of(core, prev, vertex);
            *core.edges[edge].link_mut(side) = DiskLink {
                next: Some(anchor),
                prev: Some(prev),
            };
            core.edges[anchor].link_mut(anchor_side).prev = Some(edge);
            core.edges[prev].link_mut(prev_side).next = Some(edge);
        }
    }
}

/// Removes `edge` from the disk cycle of `vertex`.
///
/// If `edge` is the anchor of the vertex, then the anchor moves to its
/// successor or is cleared if the cycle becomes empty. The removed link is
/// reset.
pub fn remove(core: &mut Core, edge: EdgeKey, vertex: VertexKey) {
    let side = side_of(core, edge, vertex);
    let link = *core.edges[edge].link(side);
    let next = link.next.expect_consistent();
    let prev = link.prev.expect_consistent();
    if next == edge {
        debug_assert_eq!(core.vertices[vertex].edge, Some(edge));
        core.vertices[vertex].edge = None;
    }
    else {
        let next_side = side_of(core, next, vertex);
        let prev_side = side_of(core, prev, vertex);
        core.edges[prev].link_mut(prev_side).next = Some(next);
        core.edges[next].link_mut(next_side).prev = Some(prev);
        if core.vertices[vertex].edge == Some(edge) {
            core.vertices[vertex].edge = Some(next);
        }
    }
    *core.edges[edge].link_mut(side) = DiskLink::default();
}

/// Gets the edge after `edge` in the disk cycle of `vertex`.
pub fn next(core: &Core, edge: EdgeKey, vertex: VertexKey) -> EdgeKey {
    core.edges[edge]
        .link(side_of(core, edge, vertex))
        .next
        .expect_consistent()
}

/// Gets the edge before `edge` in the disk cycle of `vertex`.
pub fn previous(core: &Core, edge: EdgeKey, vertex: VertexKey) -> EdgeKey {
    core.edges[edge]
        .link(side_of(core, edge, vertex))
        .prev
        .expect_consistent()
}

/// Gets an iterator over the disk cycle of `vertex`, starting at its anchor.
///
/// Panics if the walk exceeds `limit` steps.
pub fn edges(core: &Core, vertex: VertexKey, limit: usize) -> impl '_ + Iterator<Item = EdgeKey> {
    let first = core.vertices[vertex].edge;
    let mut steps = 0usize;
    iter::successors(first, move |edge| {
        let next = next(core, *edge, vertex);
        (Some(next) != first).then(|| next)
    })
    .inspect(move |_| {
        steps += 1;
        if steps > limit {
            cycle_limit_exceeded(limit);
        }
    })
}

pub fn count(core: &Core, vertex: VertexKey, limit: usize) -> usize {
    edges(core, vertex, limit).count()
}

/// Finds an edge between `a` and `b` by scanning the disk cycle of `a`.
pub fn find_edge(core: &Core, a: VertexKey, b: VertexKey, limit: usize) -> Option<EdgeKey> {
    edges(core, a, limit).find(|edge| core.edges[*edge].connects(a, b))
}
