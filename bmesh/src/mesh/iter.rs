//! Cursors over mesh cycles.
//!
//! A `Cursor` walks one kind of adjacency, described by a `Query`. Queries
//! establish their first result in `begin` and advance in `step`; `Cursor`
//! adapts them into an `Iterator`. Cursors borrow their mesh, so the mesh
//! cannot be mutated while a cursor is live. Collect keys first to mutate the
//! elements they refer to.
//!
//! Iteration follows cycle order, which depends on the order in which
//! elements were created and is otherwise not meaningful.
//!
//! # Examples
//!
//! ```rust
//! use bmesh::mesh::iter::{Cursor, VerticesOfFace};
//! use bmesh::mesh::{Duplicates, Mesh};
//!
//! let mut mesh = Mesh::new();
//! let a = mesh.make_vertex([0.0, 0.0, 0.0]);
//! let b = mesh.make_vertex([1.0, 0.0, 0.0]);
//! let c = mesh.make_vertex([0.0, 1.0, 0.0]);
//! let face = mesh
//!     .make_face_from_vertices(&[a, b, c], Duplicates::Reject)
//!     .unwrap();
//!
//! let vertices: Vec<_> = Cursor::<VerticesOfFace>::begin(&mesh, face).collect();
//! assert_eq!(vec![a, b, c], vertices);
//! ```

use crate::mesh::key::{EdgeKey, FaceKey, LoopKey, VertexKey};
use crate::mesh::{cycle_limit_exceeded, disk, radial, Mesh};

/// Adjacency walked by a `Cursor`.
pub trait Query: Sized {
    type Seed: Copy;
    type Item: Copy;

    /// Establishes the state of the query and its first result, if any.
    fn begin(mesh: &Mesh, seed: Self::Seed) -> (Self, Option<Self::Item>);

    /// Advances the query, returning `None` when it is exhausted.
    fn step(&mut self, mesh: &Mesh) -> Option<Self::Item>;
}

/// Iterator over the results of a `Query`.
///
/// Panics if more than `MeshConfig::cycle_limit` results are produced, which
/// indicates corrupted cycle links.
#[derive(Clone)]
pub struct Cursor<'a, Q>
where
    Q: Query,
{
    mesh: &'a Mesh,
    query: Q,
    pending: Option<Q::Item>,
    steps: usize,
}

impl<'a, Q> Cursor<'a, Q>
where
    Q: Query,
{
    pub fn begin(mesh: &'a Mesh, seed: Q::Seed) -> Self {
        let (query, pending) = Q::begin(mesh, seed);
        Cursor {
            mesh,
            query,
            pending,
            steps: 0,
        }
    }
}

impl<'a, Q> Iterator for Cursor<'a, Q>
where
    Q: Query,
{
    type Item = Q::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.pending.take()?;
        self.steps += 1;
        let limit = self.mesh.config.cycle_limit;
        if self.steps > limit {
            cycle_limit_exceeded(limit);
        }
        self.pending = self.query.step(self.mesh);
        Some(item)
    }
}

/// Edges in the disk cycle of a vertex.
#[derive(Clone, Copy, Debug)]
pub struct EdgesOfVertex {
    vertex: VertexKey,
    first: EdgeKey,
    current: EdgeKey,
}

impl Query for EdgesOfVertex {
    type Seed = VertexKey;
    type Item = EdgeKey;

    fn begin(mesh: &Mesh, vertex: VertexKey) -> (Self, Option<EdgeKey>) {
        let first = mesh.core.vertices[vertex].edge;
        let key = first.unwrap_or_default();
        (
            EdgesOfVertex {
                vertex,
                first: key,
                current: key,
            },
            first,
        )
    }

    fn step(&mut self, mesh: &Mesh) -> Option<EdgeKey> {
        let next = disk::next(&mesh.core, self.current, self.vertex);
        if next == self.first {
            None
        }
        else {
            self.current = next;
            Some(next)
        }
    }
}

/// Loops that originate at a vertex.
///
/// Walks the disk cycle of the vertex and, for each edge, the loops of its
/// radial cycle that originate at the vertex.
#[derive(Clone, Copy, Debug)]
pub struct LoopsOfVertex {
    vertex: VertexKey,
    first_edge: EdgeKey,
    edge: EdgeKey,
    first: LoopKey,
    current: LoopKey,
}

impl LoopsOfVertex {
    /// Finds the first edge at or after `edge` in the disk cycle that has a
    /// loop originating at the vertex and enters its radial cycle.
    fn enter(&mut self, mesh: &Mesh, mut edge: EdgeKey) -> Option<LoopKey> {
        let limit = mesh.config.cycle_limit;
        loop {
            if let Some(lp) = radial::first_loop_at_vertex(&mesh.core, edge, self.vertex, limit) {
                self.edge = edge;
                self.first = lp;
                self.current = lp;
                return Some(lp);
            }
            edge = disk::next(&mesh.core, edge, self.vertex);
            if edge == self.first_edge {
                return None;
            }
        }
    }
}

impl Query for LoopsOfVertex {
    type Seed = VertexKey;
    type Item = LoopKey;

    fn begin(mesh: &Mesh, vertex: VertexKey) -> (Self, Option<LoopKey>) {
        let mut query = LoopsOfVertex {
            vertex,
            first_edge: Default::default(),
            edge: Default::default(),
            first: Default::default(),
            current: Default::default(),
        };
        let item = mesh.core.vertices[vertex].edge.and_then(|anchor| {
            query.first_edge = anchor;
            query.enter(mesh, anchor)
        });
        (query, item)
    }

    fn step(&mut self, mesh: &Mesh) -> Option<LoopKey> {
        let limit = mesh.config.cycle_limit;
        let next = radial::next_loop_at_vertex(&mesh.core, self.current, self.vertex, limit);
        if next != self.first {
            self.current = next;
            return Some(next);
        }
        let edge = disk::next(&mesh.core, self.edge, self.vertex);
        if edge == self.first_edge {
            None
        }
        else {
            self.enter(mesh, edge)
        }
    }
}

/// Faces that include a vertex.
///
/// A face that includes the vertex more than once is produced once per
/// inclusion.
#[derive(Clone, Copy, Debug)]
pub struct FacesOfVertex(LoopsOfVertex);

impl Query for FacesOfVertex {
    type Seed = VertexKey;
    type Item = FaceKey;

    fn begin(mesh: &Mesh, vertex: VertexKey) -> (Self, Option<FaceKey>) {
        let (query, item) = LoopsOfVertex::begin(mesh, vertex);
        (
            FacesOfVertex(query),
            item.map(|lp| mesh.core.loops[lp].face),
        )
    }

    fn step(&mut self, mesh: &Mesh) -> Option<FaceKey> {
        self.0.step(mesh).map(|lp| mesh.core.loops[lp].face)
    }
}

/// Loops in the radial cycle of an edge.
#[derive(Clone, Copy, Debug)]
pub struct LoopsOfEdge {
    first: LoopKey,
    current: LoopKey,
}

impl Query for LoopsOfEdge {
    type Seed = EdgeKey;
    type Item = LoopKey;

    fn begin(mesh: &Mesh, edge: EdgeKey) -> (Self, Option<LoopKey>) {
        let first = mesh.core.edges[edge].radial;
        let key = first.unwrap_or_default();
        (
            LoopsOfEdge {
                first: key,
                current: key,
            },
            first,
        )
    }

    fn step(&mut self, mesh: &Mesh) -> Option<LoopKey> {
        let next = mesh.core.loops[self.current].radial_next;
        if next == self.first {
            None
        }
        else {
            self.current = next;
            Some(next)
        }
    }
}

/// Faces that use an edge.
#[derive(Clone, Copy, Debug)]
pub struct FacesOfEdge(LoopsOfEdge);

impl Query for FacesOfEdge {
    type Seed = EdgeKey;
    type Item = FaceKey;

    fn begin(mesh: &Mesh, edge: EdgeKey) -> (Self, Option<FaceKey>) {
        let (query, item) = LoopsOfEdge::begin(mesh, edge);
        (FacesOfEdge(query), item.map(|lp| mesh.core.loops[lp].face))
    }

    fn step(&mut self, mesh: &Mesh) -> Option<FaceKey> {
        self.0.step(mesh).map(|lp| mesh.core.loops[lp].face)
    }
}

/// Loops in the loop cycle of a face.
#[derive(Clone, Copy, Debug)]
pub struct LoopsOfFace {
    first: LoopKey,
    current: LoopKey,
}

impl Query for LoopsOfFace {
    type Seed = FaceKey;
    type Item = LoopKey;

    fn begin(mesh: &Mesh, face: FaceKey) -> (Self, Option<LoopKey>) {
        let first = mesh.core.faces[face].first;
        (
            LoopsOfFace {
                first,
                current: first,
            },
            Some(first),
        )
    }

    fn step(&mut self, mesh: &Mesh) -> Option<LoopKey> {
        let next = mesh.core.loops[self.current].next;
        if next == self.first {
            None
        }
        else {
            self.current = next;
            Some(next)
        }
    }
}

/// Vertices of a face in winding order.
#[derive(Clone, Copy, Debug)]
pub struct VerticesOfFace(LoopsOfFace);

impl Query for VerticesOfFace {
    type Seed = FaceKey;
    type Item = VertexKey;

    fn begin(mesh: &Mesh, face: FaceKey) -> (Self, Option<VertexKey>) {
        let (query, item) = LoopsOfFace::begin(mesh, face);
        (
            VerticesOfFace(query),
            item.map(|lp| mesh.core.loops[lp].vertex),
        )
    }

    fn step(&mut self, mesh: &Mesh) -> Option<VertexKey> {
        self.0.step(mesh).map(|lp| mesh.core.loops[lp].vertex)
    }
}

/// Edges of a face in winding order.
#[derive(Clone, Copy, Debug)]
pub struct EdgesOfFace(LoopsOfFace);

impl Query for EdgesOfFace {
    type Seed = FaceKey;
    type Item = EdgeKey;

    fn begin(mesh: &Mesh, face: FaceKey) -> (Self, Option<EdgeKey>) {
        let (query, item) = LoopsOfFace::begin(mesh, face);
        (EdgesOfFace(query), item.map(|lp| mesh.core.loops[lp].edge))
    }

    fn step(&mut self, mesh: &Mesh) -> Option<EdgeKey> {
        self.0.step(mesh).map(|lp| mesh.core.loops[lp].edge)
    }
}

/// Other loops in the radial cycle of a loop.
#[derive(Clone, Copy, Debug)]
pub struct LoopsOfLoop {
    origin: LoopKey,
    current: LoopKey,
}

impl Query for LoopsOfLoop {
    type Seed = LoopKey;
    type Item = LoopKey;

    fn begin(mesh: &Mesh, origin: LoopKey) -> (Self, Option<LoopKey>) {
        let next = mesh.core.loops[origin].radial_next;
        (
            LoopsOfLoop {
                origin,
                current: next,
            },
            (next != origin).then(|| next),
        )
    }

    fn step(&mut self, mesh: &Mesh) -> Option<LoopKey> {
        let next = mesh.core.loops[self.current].radial_next;
        if next == self.origin {
            None
        }
        else {
            self.current = next;
            Some(next)
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use std::collections::HashSet;

    use crate::mesh::iter::{
        Cursor, EdgesOfVertex, FacesOfEdge, FacesOfVertex, LoopsOfEdge, LoopsOfVertex,
    };
    use crate::mesh::{disk, radial, Duplicates, Mesh, MeshConfig};

    /// Asserts that the disk and radial cycles of every element agree with
    /// their cursors.
    fn assert_cycles_agree_with_cursors(mesh: &Mesh) {
        let limit = mesh.config().cycle_limit;
        for vertex in mesh.vertex_keys() {
            let edges: HashSet<_> = Cursor::<EdgesOfVertex>::begin(mesh, vertex).collect();
            assert_eq!(disk::count(&mesh.core, vertex, limit), edges.len());
            for edge in edges {
                assert!(mesh.core.edges[edge].contains_vertex(vertex));
            }
        }
        for edge in mesh.edge_keys() {
            let faces: HashSet<_> = Cursor::<FacesOfEdge>::begin(mesh, edge).collect();
            assert_eq!(radial::count(&mesh.core, edge, limit), faces.len());
            for lp in Cursor::<LoopsOfEdge>::begin(mesh, edge) {
                assert_eq!(edge, mesh.core.loops[lp].edge);
            }
        }
    }

    #[test]
    fn loops_of_vertex_in_non_manifold_fan() {
        // Three triangles share the edge `ab`.
        let mut mesh = Mesh::new();
        let a = mesh.make_vertex([0.0, 0.0, 0.0]);
        let b = mesh.make_vertex([1.0, 0.0, 0.0]);
        let others: Vec<_> = (0..3)
            .map(|n| mesh.make_vertex([0.5, n as f64, 1.0]))
            .collect();
        let faces: HashSet<_> = others
            .iter()
            .map(|&c| {
                mesh.make_face_from_vertices(&[a, b, c], Duplicates::Reject)
                    .unwrap()
            })
            .collect();

        let loops: Vec<_> = Cursor::<LoopsOfVertex>::begin(&mesh, a).collect();
        assert_eq!(3, loops.len());
        for lp in &loops {
            assert_eq!(a, mesh.face_loop(*lp).unwrap().vertex());
        }
        let around: HashSet<_> = Cursor::<FacesOfVertex>::begin(&mesh, a).collect();
        assert_eq!(faces, around);

        let ab = mesh.edge_between(a, b).unwrap();
        assert_eq!(3, Cursor::<LoopsOfEdge>::begin(&mesh, ab).count());
        let over: HashSet<_> = Cursor::<FacesOfEdge>::begin(&mesh, ab).collect();
        assert_eq!(faces, over);
        // Edges: `ab` plus one edge to each apex.
        assert_eq!(4, Cursor::<EdgesOfVertex>::begin(&mesh, a).count());
    }

    #[test]
    fn cursors_over_isolated_elements_are_empty() {
        let mut mesh = Mesh::new();
        let a = mesh.make_vertex([0.0, 0.0, 0.0]);
        let b = mesh.make_vertex([1.0, 0.0, 0.0]);
        let c = mesh.make_vertex([0.0, 1.0, 0.0]);
        let ab = mesh.make_edge(a, b, false).unwrap();

        assert_eq!(0, Cursor::<EdgesOfVertex>::begin(&mesh, c).count());
        assert_eq!(0, Cursor::<LoopsOfVertex>::begin(&mesh, a).count());
        assert_eq!(0, Cursor::<LoopsOfEdge>::begin(&mesh, ab).count());
        assert_eq!(1, Cursor::<EdgesOfVertex>::begin(&mesh, a).count());
    }

    #[test]
    #[should_panic(expected = "cycle limit")]
    fn cursor_panics_beyond_cycle_limit() {
        let mut mesh = Mesh::with_config(MeshConfig::default().with_cycle_limit(2));
        let hub = mesh.make_vertex([0.0, 0.0, 0.0]);
        for n in 0..3 {
            let other = mesh.make_vertex([n as f64, 1.0, 0.0]);
            mesh.make_edge(hub, other, false).unwrap();
        }
        let _ = Cursor::<EdgesOfVertex>::begin(&mesh, hub).count();
    }

    proptest! {
        #[test]
        fn cycles_agree_with_cursors_after_splits(
            n in 1usize..4,
            splits in prop::collection::vec(
                (any::<bool>(), any::<prop::sample::Index>(), any::<prop::sample::Index>()),
                0..8,
            ),
        ) {
            let mut mesh = crate::mesh::tests::grid(n);
            assert_cycles_agree_with_cursors(&mesh);
            for (face, element, corner) in splits {
                if face {
                    let faces: Vec<_> = mesh.face_keys().collect();
                    let face = faces[element.index(faces.len())];
                    let vertices: Vec<_> = mesh.face(face).unwrap().vertices().collect();
                    if vertices.len() < 4 {
                        continue;
                    }
                    let i = corner.index(vertices.len());
                    mesh.split_face(face, vertices[i], vertices[(i + 2) % vertices.len()]);
                }
                else {
                    let edges: Vec<_> = mesh.edge_keys().collect();
                    let edge = edges[element.index(edges.len())];
                    let (a, _) = mesh.edge(edge).unwrap().vertices();
                    mesh.split_edge(edge, a, 0.5);
                }
                assert_cycles_agree_with_cursors(&mesh);
                prop_assert_eq!(Ok(()), mesh.validate());
            }
        }
    }
}
