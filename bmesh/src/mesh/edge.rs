use std::ops::Deref;

use crate::entity::header::{ElementKind, Header};
use crate::entity::storage::Get;
use crate::entity::view::ClosedView;
use crate::entity::Entity;
use crate::mesh::iter::{Cursor, FacesOfEdge, LoopsOfEdge};
use crate::mesh::key::{EdgeKey, FaceKey, LoopKey, VertexKey};
use crate::mesh::radial;
use crate::mesh::Mesh;

/// Endpoint of an edge.
///
/// Selects which of the two disk links embedded in an edge belongs to the
/// disk cycle of a given vertex.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Side {
    V1,
    V2,
}

impl Side {
    fn index(self) -> usize {
        match self {
            Side::V1 => 0,
            Side::V2 => 1,
        }
    }
}

/// Links of an edge in the disk cycle of one of its endpoints.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DiskLink {
    pub(in crate::mesh) next: Option<EdgeKey>,
    pub(in crate::mesh) prev: Option<EdgeKey>,
}

impl DiskLink {
    pub fn next(&self) -> Option<EdgeKey> {
        self.next
    }

    pub fn previous(&self) -> Option<EdgeKey> {
        self.prev
    }

    pub fn is_linked(&self) -> bool {
        self.next.is_some() && self.prev.is_some()
    }
}

/// Mesh edge.
#[derive(Clone, Debug)]
pub struct Edge {
    pub(in crate::mesh) header: Header,
    pub(in crate::mesh) v1: VertexKey,
    pub(in crate::mesh) v2: VertexKey,
    pub(in crate::mesh) disk: [DiskLink; 2],
    /// Anchor of the radial cycle, if any faces use the edge.
    pub(in crate::mesh) radial: Option<LoopKey>,
}

impl Edge {
    pub(in crate::mesh) fn new(v1: VertexKey, v2: VertexKey) -> Self {
        Edge {
            header: Header::new(ElementKind::Edge),
            v1,
            v2,
            disk: Default::default(),
            radial: None,
        }
    }

    pub fn vertices(&self) -> (VertexKey, VertexKey) {
        (self.v1, self.v2)
    }

    pub fn radial(&self) -> Option<LoopKey> {
        self.radial
    }

    pub fn side(&self, vertex: VertexKey) -> Option<Side> {
        if vertex == self.v1 {
            Some(Side::V1)
        }
        else if vertex == self.v2 {
            Some(Side::V2)
        }
        else {
            None
        }
    }

    pub fn contains_vertex(&self, vertex: VertexKey) -> bool {
        self.side(vertex).is_some()
    }

    /// Returns `true` if the edge connects `a` and `b` in either direction.
    pub fn connects(&self, a: VertexKey, b: VertexKey) -> bool {
        (self.v1 == a && self.v2 == b) || (self.v1 == b && self.v2 == a)
    }

    pub fn other_vertex(&self, vertex: VertexKey) -> Option<VertexKey> {
        self.side(vertex).map(|side| match side {
            Side::V1 => self.v2,
            Side::V2 => self.v1,
        })
    }

    pub fn link(&self, side: Side) -> &DiskLink {
        &self.disk[side.index()]
    }

    pub(in crate::mesh) fn link_mut(&mut self, side: Side) -> &mut DiskLink {
        &mut self.disk[side.index()]
    }

    pub(in crate::mesh) fn replace_vertex(&mut self, old: VertexKey, new: VertexKey) {
        match self.side(old) {
            Some(Side::V1) => self.v1 = new,
            Some(Side::V2) => self.v2 = new,
            None => panic!("internal error: vertex is not an endpoint of edge"),
        }
    }
}

impl Entity for Edge {
    type Key = EdgeKey;

    const KIND: ElementKind = ElementKind::Edge;

    fn header(&self) -> &Header {
        &self.header
    }

    fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }
}

/// View of an edge in a mesh.
#[derive(Clone, Copy)]
pub struct EdgeView<'a> {
    mesh: &'a Mesh,
    key: EdgeKey,
}

impl<'a> EdgeView<'a> {
    pub(in crate::mesh) fn bind(mesh: &'a Mesh, key: EdgeKey) -> Option<Self> {
        mesh.core
            .edges
            .contains_key(&key)
            .then(|| EdgeView { mesh, key })
    }

    pub fn entity(&self) -> &'a Edge {
        &self.mesh.core.edges[self.key]
    }

    /// Gets an iterator over the loops of the edge's radial cycle.
    pub fn loops(&self) -> Cursor<'a, LoopsOfEdge> {
        Cursor::begin(self.mesh, self.key)
    }

    /// Gets an iterator over the faces that use the edge.
    pub fn faces(&self) -> Cursor<'a, FacesOfEdge> {
        Cursor::begin(self.mesh, self.key)
    }

    /// Gets the length of the radial cycle, which is the number of faces that
    /// use the edge.
    pub fn radial_count(&self) -> usize {
        radial::count(&self.mesh.core, self.key, self.mesh.config.cycle_limit)
    }

    /// Returns `true` if no faces use the edge.
    pub fn is_wire(&self) -> bool {
        self.radial.is_none()
    }

    /// Returns `true` if exactly one face uses the edge.
    pub fn is_boundary(&self) -> bool {
        self.radial_count() == 1
    }

    /// Returns `true` if exactly two faces use the edge.
    pub fn is_manifold(&self) -> bool {
        self.radial_count() == 2
    }

    /// Returns `true` if the edge is used by more than two faces.
    pub fn is_non_manifold(&self) -> bool {
        self.radial_count() > 2
    }

    pub fn contains_face(&self, face: FaceKey) -> bool {
        radial::find_face(
            &self.mesh.core,
            self.key,
            face,
            self.mesh.config.cycle_limit,
        )
        .is_some()
    }

    /// Gets the first loop of the radial cycle that originates at `vertex`.
    pub fn loop_at_vertex(&self, vertex: VertexKey) -> Option<LoopKey> {
        radial::first_loop_at_vertex(
            &self.mesh.core,
            self.key,
            vertex,
            self.mesh.config.cycle_limit,
        )
    }

    /// Returns `true` if some face uses both the edge and `other`.
    pub fn shares_face_with(&self, other: EdgeKey) -> bool {
        let mesh = self.mesh;
        let limit = mesh.config.cycle_limit;
        self.faces()
            .any(|face| radial::find_face(&mesh.core, other, face, limit).is_some())
    }
}

impl<'a> ClosedView for EdgeView<'a> {
    type Key = EdgeKey;
    type Entity = Edge;

    fn key(&self) -> Self::Key {
        self.key
    }
}

impl<'a> Deref for EdgeView<'a> {
    type Target = Edge;

    fn deref(&self) -> &Self::Target {
        self.entity()
    }
}

#[cfg(test)]
mod tests {
    use crate::mesh::edge::Side;
    use crate::mesh::{Duplicates, Mesh};

    #[test]
    fn sides_and_other_vertex() {
        let mut mesh = Mesh::new();
        let a = mesh.make_vertex([0.0, 0.0, 0.0]);
        let b = mesh.make_vertex([1.0, 0.0, 0.0]);
        let c = mesh.make_vertex([2.0, 0.0, 0.0]);
        let ab = mesh.make_edge(a, b, false).unwrap();

        let edge = mesh.edge(ab).unwrap();
        assert_eq!((a, b), edge.vertices());
        assert_eq!(Some(Side::V1), edge.side(a));
        assert_eq!(Some(Side::V2), edge.side(b));
        assert_eq!(None, edge.side(c));
        assert_eq!(Some(b), edge.other_vertex(a));
        assert_eq!(None, edge.other_vertex(c));
        assert!(edge.connects(b, a));
        assert!(edge.is_wire());
        assert_eq!(0, edge.radial_count());
    }

    #[test]
    fn radial_count_classifies_edges() {
        let mut mesh = Mesh::new();
        let a = mesh.make_vertex([0.0, 0.0, 0.0]);
        let b = mesh.make_vertex([1.0, 0.0, 0.0]);
        let c = mesh.make_vertex([0.0, 1.0, 0.0]);
        let d = mesh.make_vertex([1.0, 1.0, 0.0]);
        let e = mesh.make_vertex([0.0, 0.0, 1.0]);
        let abc = mesh
            .make_face_from_vertices(&[a, b, c], Duplicates::Reject)
            .unwrap();
        let cbd = mesh
            .make_face_from_vertices(&[c, b, d], Duplicates::Reject)
            .unwrap();

        let bc = mesh.edge_between(b, c).unwrap();
        let ab = mesh.edge_between(a, b).unwrap();
        assert!(mesh.edge(bc).unwrap().is_manifold());
        assert!(mesh.edge(ab).unwrap().is_boundary());
        assert!(mesh.edge(bc).unwrap().contains_face(abc));
        assert!(mesh.edge(bc).unwrap().contains_face(cbd));
        assert!(!mesh.edge(ab).unwrap().contains_face(cbd));
        assert!(mesh.edge(ab).unwrap().shares_face_with(bc));

        // A third face over `bc` makes the edge non-manifold.
        mesh.make_face_from_vertices(&[b, c, e], Duplicates::Reject)
            .unwrap();
        let edge = mesh.edge(bc).unwrap();
        assert!(edge.is_non_manifold());
        assert_eq!(3, edge.radial_count());
        assert_eq!(3, edge.faces().count());
        for lp in edge.loops() {
            assert_eq!(bc, mesh.face_loop(lp).unwrap().edge());
        }
        assert!(edge.loop_at_vertex(b).is_some());
        assert!(edge.loop_at_vertex(c).is_some());
        assert_eq!(None, edge.loop_at_vertex(a));
    }
}
