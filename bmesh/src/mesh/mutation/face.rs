use itertools::Itertools;
use log::trace;
use smallvec::SmallVec;

use crate::entity::header::ElementMask;
use crate::entity::storage::{Get, Insert, Remove};
use crate::mesh::face::Face;
use crate::mesh::iter::{Cursor, EdgesOfFace, LoopsOfEdge, VerticesOfFace};
use crate::mesh::key::{EdgeKey, FaceKey, LoopKey, VertexKey};
use crate::mesh::loops::Loop;
use crate::mesh::{cycle_limit_exceeded, disk, radial, Mesh, MeshError, OptionExt as _};
use crate::IteratorExt as _;

/// Policy for faces that duplicate an existing face.
///
/// A face duplicates another if it is bounded by the same vertices.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Duplicates {
    /// Inserts a new face regardless of existing faces.
    Allow,
    /// Fails with `MeshError::FaceExists`.
    Reject,
    /// Returns the existing face.
    Reuse,
}

impl Default for Duplicates {
    fn default() -> Self {
        Duplicates::Reject
    }
}

impl Mesh {
    /// Creates a face bounded by existing edges.
    ///
    /// `edges[n]` must connect `vertices[n]` and `vertices[n + 1]`, wrapping
    /// around to the first vertex. A loop is inserted into the radial cycle
    /// of each edge.
    pub fn make_face(&mut self, vertices: &[VertexKey], edges: &[EdgeKey]) -> FaceKey {
        debug_assert!(vertices.len() >= 2, "face has fewer than two vertices");
        debug_assert_eq!(vertices.len(), edges.len());
        debug_assert!(
            vertices
                .iter()
                .copied()
                .perimeter()
                .zip(edges)
                .all(|((a, b), edge)| self.core.edges[*edge].connects(a, b)),
            "face edge does not connect its vertices"
        );
        let face = self.core.faces.insert(Face::new());
        let loops: SmallVec<[LoopKey; 8]> = vertices
            .iter()
            .map(|vertex| {
                self.core
                    .loops
                    .insert_with_key(|key| Loop::detached(key, *vertex, face))
            })
            .collect();
        for (previous, next) in loops.iter().copied().perimeter() {
            self.core.loops[previous].next = next;
            self.core.loops[next].prev = previous;
        }
        for (lp, edge) in loops.iter().zip(edges) {
            radial::append(&mut self.core, *edge, *lp);
        }
        let entity = &mut self.core.faces[face];
        entity.first = loops[0];
        entity.len = loops.len();
        self.mark_dirty(ElementMask::LOOP | ElementMask::FACE);
        trace!("made face {:?} with {} loops", face, loops.len());
        face
    }

    /// Creates a face over a ring of vertices, creating any missing edges.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than three vertices are given, if a vertex
    /// does not exist or is repeated, or if `duplicates` is `Reject` and a
    /// face over the same vertices exists. The mesh is not changed on error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bmesh::mesh::{Duplicates, Mesh, MeshError};
    ///
    /// let mut mesh = Mesh::new();
    /// let a = mesh.make_vertex([0.0, 0.0, 0.0]);
    /// let b = mesh.make_vertex([1.0, 0.0, 0.0]);
    /// let c = mesh.make_vertex([0.0, 1.0, 0.0]);
    /// let face = mesh
    ///     .make_face_from_vertices(&[a, b, c], Duplicates::Reject)
    ///     .unwrap();
    ///
    /// assert_eq!(
    ///     Err(MeshError::FaceExists(face)),
    ///     mesh.make_face_from_vertices(&[b, c, a], Duplicates::Reject),
    /// );
    /// assert_eq!(Ok(face), mesh.make_face_from_vertices(&[c, a, b], Duplicates::Reuse));
    /// ```
    pub fn make_face_from_vertices(
        &mut self,
        vertices: &[VertexKey],
        duplicates: Duplicates,
    ) -> Result<FaceKey, MeshError> {
        if vertices.len() < 3 {
            return Err(MeshError::ArityNonPolygonal);
        }
        if !vertices
            .iter()
            .all(|vertex| self.core.vertices.contains_key(vertex))
        {
            return Err(MeshError::TopologyNotFound);
        }
        if vertices.iter().unique().count() != vertices.len() {
            return Err(MeshError::TopologyMalformed);
        }
        if let Some(face) = self.face_exists(vertices) {
            match duplicates {
                Duplicates::Allow => {}
                Duplicates::Reject => return Err(MeshError::FaceExists(face)),
                Duplicates::Reuse => return Ok(face),
            }
        }
        let edges: SmallVec<[EdgeKey; 8]> = vertices
            .iter()
            .copied()
            .perimeter()
            .map(|(a, b)| self.make_edge(a, b, false).expect_consistent())
            .collect();
        Ok(self.make_face(vertices, &edges))
    }

    /// Removes a face and its loops.
    ///
    /// The edges and vertices of the face are not removed, even if they are
    /// no longer used by any face.
    pub fn kill_face(&mut self, face: FaceKey) {
        for lp in self.face_loops(face) {
            let edge = self.core.loops[lp].edge;
            radial::remove(&mut self.core, lp, edge);
            self.core.loops.remove(&lp).expect_consistent();
            self.attributes.loops.remove(lp);
        }
        self.core.faces.remove(&face).expect_consistent();
        self.attributes.faces.remove(face);
        self.mark_dirty(ElementMask::LOOP | ElementMask::FACE);
        trace!("killed face {:?}", face);
    }

    /// Removes a face along with any of its edges that are no longer used by
    /// a face.
    pub fn kill_face_with_edges(&mut self, face: FaceKey) {
        let edges: SmallVec<[EdgeKey; 8]> = Cursor::<EdgesOfFace>::begin(self, face).collect();
        self.kill_face(face);
        for edge in edges {
            if self.core.edges[edge].radial.is_none() {
                self.kill_edge(edge);
            }
        }
    }

    /// Removes a face along with any of its edges and vertices that are no
    /// longer used by a face.
    ///
    /// Vertices are only removed if they become isolated.
    pub fn kill_face_with_vertices(&mut self, face: FaceKey) {
        let vertices: SmallVec<[VertexKey; 8]> =
            Cursor::<VerticesOfFace>::begin(self, face).collect();
        self.kill_face_with_edges(face);
        for vertex in vertices {
            if self.core.vertices[vertex].edge.is_none() {
                self.kill_vertex(vertex);
            }
        }
    }

    /// Splits a face with a new edge between two of its vertices.
    ///
    /// `v1` and `v2` must both be vertices of the face and must not be
    /// adjacent. The face keeps the loops from `v1` up to `v2` and a new face
    /// takes the loops from `v2` up to `v1`. The new face copies the
    /// properties and attributes of the split face.
    ///
    /// Returns the new face and its loop on the new edge.
    pub fn split_face(&mut self, face: FaceKey, v1: VertexKey, v2: VertexKey) -> (FaceKey, LoopKey) {
        let (l1, l2) = {
            let view = self.face(face).expect_consistent();
            (
                view.loop_at_vertex(v1).expect_consistent(),
                view.loop_at_vertex(v2).expect_consistent(),
            )
        };
        let (p1, p2) = (self.core.loops[l1].prev, self.core.loops[l2].prev);
        debug_assert!(
            l1 != l2 && p1 != l2 && p2 != l1,
            "split vertices are not distinct and non-adjacent"
        );

        let edge = self.make_edge(v1, v2, true).expect_consistent();
        let split = {
            let entity = &self.core.faces[face];
            let mut split = Face::new();
            split.header.flags = entity.header.flags;
            split.material = entity.material;
            split.normal = entity.normal;
            self.core.faces.insert(split)
        };
        self.attributes.faces.copy(face, split);

        // The loop at `v2` closes the original face and the loop at `v1`
        // closes the new face.
        let la = self
            .core
            .loops
            .insert_with_key(|key| Loop::detached(key, v2, face));
        let lb = self
            .core
            .loops
            .insert_with_key(|key| Loop::detached(key, v1, split));
        self.link_loops(p2, la, l1);
        self.link_loops(p1, lb, l2);
        radial::append(&mut self.core, edge, la);
        radial::append(&mut self.core, edge, lb);
        self.attributes.loops.copy(l2, la);
        self.attributes.loops.copy(l1, lb);

        let len = self.relabel_loops(lb, split);
        self.core.faces[split].first = lb;
        self.core.faces[split].len = len;
        self.core.faces[face].first = la;
        self.core.faces[face].len = self.face_loops(face).len();
        self.mark_dirty(ElementMask::LOOP | ElementMask::FACE);
        trace!("split face {:?} into {:?} along {:?}", face, split, edge);
        (split, lb)
    }

    /// Merges two faces across an edge that they share and removes the edge.
    ///
    /// The edge must be used by exactly `f1` and `f2`, which must be wound
    /// in opposite directions along it. `f2` is removed and `f1` takes all
    /// of its loops.
    ///
    /// Returns `None` without changing the mesh if these conditions do not
    /// hold. See `join_faces` for a checked operation.
    pub fn join_face_kill_edge(&mut self, f1: FaceKey, f2: FaceKey, edge: EdgeKey) -> Option<FaceKey> {
        let limit = self.config.cycle_limit;
        if f1 == f2 || radial::count(&self.core, edge, limit) != 2 {
            return None;
        }
        let l1 = radial::find_face(&self.core, edge, f1, limit)?;
        let l2 = radial::find_face(&self.core, edge, f2, limit)?;
        if self.core.loops[l1].vertex == self.core.loops[l2].vertex {
            return None;
        }
        let (p1, n1) = (self.core.loops[l1].prev, self.core.loops[l1].next);
        let (p2, n2) = (self.core.loops[l2].prev, self.core.loops[l2].next);

        radial::remove(&mut self.core, l1, edge);
        radial::remove(&mut self.core, l2, edge);
        self.core.loops[p1].next = n2;
        self.core.loops[n2].prev = p1;
        self.core.loops[p2].next = n1;
        self.core.loops[n1].prev = p2;
        for lp in [l1, l2] {
            self.core.loops.remove(&lp).expect_consistent();
            self.attributes.loops.remove(lp);
        }
        let len = self.relabel_loops(n1, f1);
        self.core.faces[f1].first = n1;
        self.core.faces[f1].len = len;

        let (a, b) = self.core.edges[edge].vertices();
        disk::remove(&mut self.core, edge, a);
        disk::remove(&mut self.core, edge, b);
        self.core.edges.remove(&edge).expect_consistent();
        self.attributes.edges.remove(edge);
        self.core.faces.remove(&f2).expect_consistent();
        self.attributes.faces.remove(f2);
        self.mark_dirty(ElementMask::EDGE | ElementMask::LOOP | ElementMask::FACE);
        trace!("joined face {:?} into {:?} and killed edge {:?}", f2, f1, edge);
        Some(f1)
    }

    /// Merges the two faces that use an edge and removes the edge.
    ///
    /// # Errors
    ///
    /// Returns `MeshError::JoinFacesFailed` if the edge is not used by
    /// exactly two distinct faces that are wound consistently and share no
    /// other edge. The mesh is not changed on error.
    pub fn join_faces(&mut self, edge: EdgeKey) -> Result<FaceKey, MeshError> {
        if !self.core.edges.contains_key(&edge) {
            return Err(MeshError::TopologyNotFound);
        }
        let loops: SmallVec<[LoopKey; 2]> = Cursor::<LoopsOfEdge>::begin(self, edge).take(3).collect();
        if loops.len() != 2 {
            return Err(MeshError::JoinFacesFailed);
        }
        let (l1, l2) = (&self.core.loops[loops[0]], &self.core.loops[loops[1]]);
        let (f1, f2) = (l1.face, l2.face);
        if f1 == f2
            || l1.vertex == l2.vertex
            || self.face(f1).expect_consistent().shared_edges(f2).len() != 1
        {
            return Err(MeshError::JoinFacesFailed);
        }
        self.join_face_kill_edge(f1, f2, edge)
            .ok_or(MeshError::JoinFacesFailed)
    }

    /// Reverses the winding of a face.
    ///
    /// Each loop keeps its vertex and moves to the edge of the loop that
    /// preceded it.
    pub fn reverse_face(&mut self, face: FaceKey) {
        let loops = self.face_loops(face);
        let edges: SmallVec<[EdgeKey; 8]> = loops
            .iter()
            .map(|lp| self.core.loops[*lp].edge)
            .collect();
        for (lp, edge) in loops.iter().zip(&edges) {
            radial::remove(&mut self.core, *lp, *edge);
        }
        for lp in &loops {
            let entity = &mut self.core.loops[*lp];
            std::mem::swap(&mut entity.next, &mut entity.prev);
        }
        // Pair each loop with the edge of its predecessor.
        for (n, lp) in loops.iter().enumerate() {
            let edge = edges[(n + loops.len() - 1) % loops.len()];
            radial::append(&mut self.core, edge, *lp);
        }
        self.mark_dirty(ElementMask::LOOP);
        trace!("reversed face {:?}", face);
    }

    fn link_loops(&mut self, previous: LoopKey, lp: LoopKey, next: LoopKey) {
        self.core.loops[previous].next = lp;
        self.core.loops[next].prev = lp;
        let entity = &mut self.core.loops[lp];
        entity.prev = previous;
        entity.next = next;
    }

    /// Assigns every loop in the loop cycle of `first` to `face` and returns
    /// the length of the cycle.
    fn relabel_loops(&mut self, first: LoopKey, face: FaceKey) -> usize {
        let limit = self.config.cycle_limit;
        let mut lp = first;
        for len in 1..=limit {
            let entity = &mut self.core.loops[lp];
            entity.face = face;
            lp = entity.next;
            if lp == first {
                return len;
            }
        }
        cycle_limit_exceeded(limit)
    }
}
