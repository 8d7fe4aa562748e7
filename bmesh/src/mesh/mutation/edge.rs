use log::trace;
use nalgebra::Vector3;
use smallvec::SmallVec;

use crate::entity::header::ElementMask;
use crate::entity::storage::{Get, Insert, Key, Remove};
use crate::mesh::edge::Edge;
use crate::mesh::iter::{Cursor, FacesOfEdge};
use crate::mesh::key::{EdgeKey, FaceKey, LoopKey, VertexKey};
use crate::mesh::loops::Loop;
use crate::mesh::vertex::Vertex;
use crate::mesh::{disk, radial, Mesh, OptionExt as _};

impl Mesh {
    /// Creates an edge between two vertices.
    ///
    /// If `allow_duplicate` is `false` and an edge already connects the
    /// vertices, then that edge is returned instead. Returns `None` if `a`
    /// and `b` are the same vertex.
    pub fn make_edge(&mut self, a: VertexKey, b: VertexKey, allow_duplicate: bool) -> Option<EdgeKey> {
        if a == b {
            return None;
        }
        if !allow_duplicate {
            if let Some(edge) = disk::find_edge(&self.core, a, b, self.config.cycle_limit) {
                return Some(edge);
            }
        }
        let edge = self.core.edges.insert(Edge::new(a, b));
        disk::append(&mut self.core, edge, a);
        disk::append(&mut self.core, edge, b);
        self.mark_dirty(ElementMask::EDGE);
        trace!("made edge {:?} between {:?} and {:?}", edge, a, b);
        Some(edge)
    }

    /// Removes an edge that is not used by any face.
    pub fn kill_edge(&mut self, edge: EdgeKey) {
        let (a, b) = self.core.edges[edge].vertices();
        debug_assert!(
            self.core.edges[edge].radial.is_none(),
            "killed edge is used by a face"
        );
        disk::remove(&mut self.core, edge, a);
        disk::remove(&mut self.core, edge, b);
        self.core.edges.remove(&edge).expect_consistent();
        self.attributes.edges.remove(edge);
        self.mark_dirty(ElementMask::EDGE);
        trace!("killed edge {:?}", edge);
    }

    /// Removes an edge and all faces that use it.
    pub fn remove_edge(&mut self, edge: EdgeKey) {
        let mut faces: SmallVec<[FaceKey; 4]> = Cursor::<FacesOfEdge>::begin(self, edge).collect();
        faces.sort_unstable();
        faces.dedup();
        for face in faces {
            self.kill_face(face);
        }
        self.kill_edge(edge);
    }

    /// Splits an edge by inserting a vertex into it.
    ///
    /// The new vertex is placed at `factor` along the edge from `pivot`
    /// towards its other endpoint. The edge is shortened to span `pivot` and
    /// the new vertex and a new edge spans the new vertex and the other
    /// endpoint. Every face that uses the edge gains a loop at the new
    /// vertex. Vertex and loop attributes are interpolated and edge
    /// attributes are copied to the new edge.
    ///
    /// Returns the new vertex and the new edge.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bmesh::mesh::{Duplicates, Mesh};
    ///
    /// let mut mesh = Mesh::new();
    /// let a = mesh.make_vertex([0.0, 0.0, 0.0]);
    /// let b = mesh.make_vertex([4.0, 0.0, 0.0]);
    /// let c = mesh.make_vertex([0.0, 4.0, 0.0]);
    /// let face = mesh
    ///     .make_face_from_vertices(&[a, b, c], Duplicates::Reject)
    ///     .unwrap();
    ///
    /// let ab = mesh.edge_between(a, b).unwrap();
    /// let (m, _) = mesh.split_edge(ab, a, 0.25);
    /// assert_eq!(1.0, mesh.vertex(m).unwrap().position().x);
    /// assert_eq!(4, mesh.face(face).unwrap().arity());
    /// ```
    pub fn split_edge(&mut self, edge: EdgeKey, pivot: VertexKey, factor: f64) -> (VertexKey, EdgeKey) {
        let other = self.core.edges[edge].other_vertex(pivot).expect_consistent();
        let vertex = {
            let (p, q) = (&self.core.vertices[pivot], &self.core.vertices[other]);
            let mut vertex = Vertex::new(p.position + (q.position - p.position) * factor);
            vertex.normal = p
                .normal
                .lerp(&q.normal, factor)
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::zeros);
            vertex
        };
        let middle = self.core.vertices.insert(vertex);
        self.attributes
            .vertices
            .interpolate(&[(pivot, 1.0 - factor), (other, factor)], middle);

        // Move the far end of the edge to the new vertex.
        disk::remove(&mut self.core, edge, other);
        self.core.edges[edge].replace_vertex(other, middle);
        disk::append(&mut self.core, edge, middle);
        let split = self.core.edges.insert(Edge::new(middle, other));
        disk::append(&mut self.core, split, middle);
        disk::append(&mut self.core, split, other);
        self.attributes.edges.copy(edge, split);

        let loops: SmallVec<[LoopKey; 4]> =
            radial::loops(&self.core, edge, self.config.cycle_limit).collect();
        for lp in loops {
            let (face, next) = {
                let lp = &self.core.loops[lp];
                (lp.face, lp.next)
            };
            let inserted = self
                .core
                .loops
                .insert_with_key(|key| Loop::detached(key, middle, face));
            {
                let entity = &mut self.core.loops[inserted];
                entity.prev = lp;
                entity.next = next;
            }
            self.core.loops[lp].next = inserted;
            self.core.loops[next].prev = inserted;
            self.core.faces[face].len += 1;
            if self.core.loops[lp].vertex == pivot {
                // pivot -> middle -> other
                radial::append(&mut self.core, split, inserted);
                self.attributes
                    .loops
                    .interpolate(&[(lp, 1.0 - factor), (next, factor)], inserted);
            }
            else {
                // other -> middle -> pivot
                radial::remove(&mut self.core, lp, edge);
                radial::append(&mut self.core, split, lp);
                radial::append(&mut self.core, edge, inserted);
                self.attributes
                    .loops
                    .interpolate(&[(next, 1.0 - factor), (lp, factor)], inserted);
            }
        }
        self.mark_dirty(ElementMask::VERTEX | ElementMask::EDGE | ElementMask::LOOP);
        trace!("split edge {:?} at {:?} into {:?}", edge, middle, split);
        (middle, split)
    }

    /// Splits an edge into `cuts + 1` edges of equal length.
    ///
    /// Returns the new vertices ordered from `pivot` towards the other
    /// endpoint of the edge.
    pub fn split_edge_multi(&mut self, edge: EdgeKey, pivot: VertexKey, cuts: usize) -> Vec<VertexKey> {
        let mut vertices = Vec::with_capacity(cuts);
        let (mut edge, mut pivot) = (edge, pivot);
        for n in 0..cuts {
            let factor = 1.0 / (cuts + 1 - n) as f64;
            let (vertex, split) = self.split_edge(edge, pivot, factor);
            vertices.push(vertex);
            edge = split;
            pivot = vertex;
        }
        vertices
    }

    /// Joins the two edges of a vertex and removes the vertex.
    ///
    /// `vertex` must have exactly two edges, one of which is `edge`. The
    /// vertex is collapsed onto the other endpoint of `edge` and `edge` is
    /// removed. The remaining edge is returned and now spans the endpoints
    /// of the removed edges that were not `vertex`. Loop attributes at the
    /// surviving endpoint are interpolated towards the removed loops by
    /// `weight`.
    ///
    /// Returns `None` without changing the mesh if the vertex does not have
    /// exactly two edges, if those edges are not used by the same number of
    /// faces, if both edges lead to the same vertex, or if a face through
    /// the vertex is a triangle and would collapse to two sides.
    pub fn join_edge_kill_vertex(
        &mut self,
        edge: EdgeKey,
        vertex: VertexKey,
        weight: f64,
    ) -> Option<EdgeKey> {
        let (target, survivor) = self.collapsible(edge, vertex)?;
        let limit = self.config.cycle_limit;
        if radial::loops(&self.core, edge, limit)
            .any(|lp| self.core.faces[self.core.loops[lp].face].len < 4)
        {
            return None;
        }
        Some(self.collapse_vertex(edge, vertex, target, survivor, weight))
    }

    /// Gets the far endpoint of `edge` and the other edge of `vertex` if the
    /// vertex can be collapsed along `edge`.
    ///
    /// Faces that would degenerate are not considered.
    pub(in crate::mesh::mutation) fn collapsible(
        &self,
        edge: EdgeKey,
        vertex: VertexKey,
    ) -> Option<(VertexKey, EdgeKey)> {
        let limit = self.config.cycle_limit;
        let target = self.core.edges.get(&edge)?.other_vertex(vertex)?;
        let edges: SmallVec<[EdgeKey; 2]> = disk::edges(&self.core, vertex, limit).take(3).collect();
        if edges.len() != 2 {
            return None;
        }
        let survivor = if edges[0] == edge { edges[1] } else { edges[0] };
        let far = self.core.edges[survivor].other_vertex(vertex).expect_consistent();
        if far == target || radial::count(&self.core, edge, limit) != radial::count(&self.core, survivor, limit)
        {
            return None;
        }
        Some((target, survivor))
    }

    /// Collapses `vertex` along `edge` onto `target`.
    ///
    /// The collapse must have been accepted by `collapsible`. Triangles
    /// through the vertex are left with two sides.
    pub(in crate::mesh::mutation) fn collapse_vertex(
        &mut self,
        edge: EdgeKey,
        vertex: VertexKey,
        target: VertexKey,
        survivor: EdgeKey,
        weight: f64,
    ) -> EdgeKey {
        let limit = self.config.cycle_limit;
        let loops: SmallVec<[LoopKey; 4]> = radial::loops(&self.core, edge, limit).collect();
        for lp in loops {
            let (killed, kept) = if self.core.loops[lp].vertex == vertex {
                // far -> vertex -> target
                radial::remove(&mut self.core, lp, edge);
                (lp, self.core.loops[lp].next)
            }
            else {
                // target -> vertex -> far
                let killed = self.core.loops[lp].next;
                radial::remove(&mut self.core, lp, edge);
                radial::remove(&mut self.core, killed, survivor);
                radial::append(&mut self.core, survivor, lp);
                (killed, lp)
            };
            self.attributes
                .loops
                .interpolate(&[(kept, 1.0 - weight), (killed, weight)], kept);
            self.unlink_loop(killed);
        }

        disk::remove(&mut self.core, survivor, vertex);
        disk::remove(&mut self.core, edge, vertex);
        disk::remove(&mut self.core, edge, target);
        self.core.edges[survivor].replace_vertex(vertex, target);
        disk::append(&mut self.core, survivor, target);

        self.core.edges.remove(&edge).expect_consistent();
        self.attributes.edges.remove(edge);
        self.core.vertices.remove(&vertex).expect_consistent();
        self.attributes.vertices.remove(vertex);
        self.mark_dirty(ElementMask::VERTEX | ElementMask::EDGE | ElementMask::LOOP);
        trace!("joined edge {:?} and killed vertex {:?}", edge, vertex);
        survivor
    }

    /// Removes a detached loop from its face's loop cycle and frees it.
    pub(in crate::mesh::mutation) fn unlink_loop(&mut self, lp: LoopKey) {
        let entity = self.core.loops.remove(&lp).expect_consistent();
        debug_assert!(entity.edge.is_null(), "unlinked loop is in a radial cycle");
        self.core.loops[entity.prev].next = entity.next;
        self.core.loops[entity.next].prev = entity.prev;
        let face = &mut self.core.faces[entity.face];
        if face.first == lp {
            face.first = entity.next;
        }
        face.len -= 1;
        self.attributes.loops.remove(lp);
    }
}
