use itertools::Itertools;
use log::trace;
use nalgebra::Point3;
use smallvec::SmallVec;

use crate::entity::header::ElementMask;
use crate::entity::storage::{Insert, Remove};
use crate::mesh::iter::{Cursor, EdgesOfVertex, FacesOfEdge, FacesOfVertex, LoopsOfVertex};
use crate::mesh::key::{EdgeKey, FaceKey, VertexKey};
use crate::mesh::vertex::Vertex;
use crate::mesh::{Mesh, MeshError, OptionExt as _};

impl Mesh {
    /// Creates an isolated vertex.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bmesh::mesh::Mesh;
    ///
    /// let mut mesh = Mesh::new();
    /// let vertex = mesh.make_vertex([1.0, 0.0, 0.0]);
    /// assert!(mesh.vertex(vertex).unwrap().is_isolated());
    /// ```
    pub fn make_vertex(&mut self, position: impl Into<Point3<f64>>) -> VertexKey {
        let vertex = self.core.vertices.insert(Vertex::new(position.into()));
        self.mark_dirty(ElementMask::VERTEX);
        trace!("made vertex {:?}", vertex);
        vertex
    }

    /// Removes an isolated vertex.
    ///
    /// The vertex must have no incident edges. See `remove_vertex` to remove
    /// a vertex along with its edges and faces.
    pub fn kill_vertex(&mut self, vertex: VertexKey) {
        let entity = self.core.vertices.remove(&vertex).expect_consistent();
        debug_assert!(entity.edge.is_none(), "killed vertex is not isolated");
        self.attributes.vertices.remove(vertex);
        self.mark_dirty(ElementMask::VERTEX);
        trace!("killed vertex {:?}", vertex);
    }

    /// Removes a vertex and all edges and faces that use it.
    pub fn remove_vertex(&mut self, vertex: VertexKey) {
        let edges: SmallVec<[EdgeKey; 8]> = Cursor::<EdgesOfVertex>::begin(self, vertex).collect();
        for edge in edges {
            self.remove_edge(edge);
        }
        self.kill_vertex(vertex);
    }

    /// Dissolves a vertex, merging the faces around it.
    ///
    /// - An isolated vertex is removed.
    /// - A vertex with exactly two edges is removed by joining its edges
    ///   with `join_edge_kill_vertex`. Both edges must be used by the same
    ///   number of faces and no face through the vertex may be a triangle.
    /// - A vertex at the center of a closed, manifold fan of distinct faces
    ///   is removed by joining its faces into one face.
    ///
    /// Returns the merged face, if any. Any other configuration is rejected
    /// with `MeshError::DissolveFailed` before the mesh is changed.
    pub fn dissolve_vertex(&mut self, vertex: VertexKey) -> Result<Option<FaceKey>, MeshError> {
        let view = self.vertex(vertex).ok_or(MeshError::TopologyNotFound)?;
        let edges: SmallVec<[EdgeKey; 8]> = view.edges().collect();
        match edges.len() {
            0 => {
                self.kill_vertex(vertex);
                Ok(None)
            }
            1 => Err(MeshError::DissolveFailed),
            2 => {
                self.join_edge_kill_vertex(edges[0], vertex, 0.5)
                    .ok_or(MeshError::DissolveFailed)?;
                Ok(None)
            }
            _ => {
                if !self.is_dissolvable_fan(vertex, &edges) {
                    return Err(MeshError::DissolveFailed);
                }
                trace!("dissolving fan of {} faces at {:?}", edges.len(), vertex);
                // Joining all but two spokes leaves two faces with two spokes
                // between them. Each join keeps the fan closed, so the faces
                // on either side of a spoke are always distinct.
                for &edge in &edges[..edges.len() - 2] {
                    let (f1, f2) = self.faces_of_manifold_edge(edge);
                    self.join_face_kill_edge(f1, f2, edge).expect_consistent();
                }
                let spoke = edges[edges.len() - 2];
                // A triangle on one side collapses to two sides here and is
                // absorbed by the final join.
                let (target, survivor) = self.collapsible(spoke, vertex).expect_consistent();
                let edge = self.collapse_vertex(spoke, vertex, target, survivor, 0.5);
                let (f1, f2) = self.faces_of_manifold_edge(edge);
                let face = self.join_face_kill_edge(f1, f2, edge).expect_consistent();
                Ok(Some(face))
            }
        }
    }

    fn is_dissolvable_fan(&self, vertex: VertexKey, edges: &[EdgeKey]) -> bool {
        let view = match self.vertex(vertex) {
            Some(view) => view,
            None => return false,
        };
        if !view.is_manifold() || view.is_boundary() {
            return false;
        }
        // Every face must include the vertex exactly once.
        let faces: SmallVec<[FaceKey; 8]> = Cursor::<FacesOfVertex>::begin(self, vertex).collect();
        if faces.len() != edges.len() || faces.iter().unique().count() != faces.len() {
            return false;
        }
        // Adjacent faces must be wound consistently and share only their
        // spoke. The far endpoints of the spokes must also differ, or the
        // final join would collapse a face.
        let far: SmallVec<[VertexKey; 8]> = edges
            .iter()
            .map(|edge| self.core.edges[*edge].other_vertex(vertex).expect_consistent())
            .collect();
        if far.iter().unique().count() != far.len() {
            return false;
        }
        edges.iter().all(|&edge| {
            let loops: SmallVec<[_; 2]> = self.edge(edge).expect_consistent().loops().collect();
            let (l1, l2) = (&self.core.loops[loops[0]], &self.core.loops[loops[1]]);
            l1.vertex != l2.vertex
                && self
                    .face(l1.face)
                    .expect_consistent()
                    .shared_edges(l2.face)
                    .len()
                    == 1
        }) && Cursor::<LoopsOfVertex>::begin(self, vertex).count() == edges.len()
    }

    fn faces_of_manifold_edge(&self, edge: EdgeKey) -> (FaceKey, FaceKey) {
        let mut faces = Cursor::<FacesOfEdge>::begin(self, edge);
        let f1 = faces.next().expect_consistent();
        let f2 = faces.next().expect_consistent();
        debug_assert!(faces.next().is_none());
        (f1, f2)
    }
}
