use std::ops::Deref;

use crate::entity::header::{ElementKind, Header};
use crate::entity::storage::{Get, Key};
use crate::entity::view::ClosedView;
use crate::entity::Entity;
use crate::mesh::iter::{Cursor, LoopsOfLoop};
use crate::mesh::key::{EdgeKey, FaceKey, LoopKey, VertexKey};
use crate::mesh::Mesh;

/// Face corner.
///
/// A loop joins a vertex, the edge leaving that vertex along the boundary of
/// a face, and the face itself. Loops are members of two cycles at once: the
/// loop cycle of their face (`next` and `prev`) and the radial cycle of their
/// edge (`radial_next` and `radial_prev`).
#[derive(Clone, Debug)]
pub struct Loop {
    pub(in crate::mesh) header: Header,
    pub(in crate::mesh) vertex: VertexKey,
    pub(in crate::mesh) edge: EdgeKey,
    pub(in crate::mesh) face: FaceKey,
    pub(in crate::mesh) next: LoopKey,
    pub(in crate::mesh) prev: LoopKey,
    pub(in crate::mesh) radial_next: LoopKey,
    pub(in crate::mesh) radial_prev: LoopKey,
}

impl Loop {
    /// Creates a loop that is linked only to itself and has no edge.
    pub(in crate::mesh) fn detached(key: LoopKey, vertex: VertexKey, face: FaceKey) -> Self {
        Loop {
            header: Header::new(ElementKind::Loop),
            vertex,
            edge: EdgeKey::null(),
            face,
            next: key,
            prev: key,
            radial_next: key,
            radial_prev: key,
        }
    }

    pub fn vertex(&self) -> VertexKey {
        self.vertex
    }

    pub fn edge(&self) -> EdgeKey {
        self.edge
    }

    pub fn face(&self) -> FaceKey {
        self.face
    }

    pub fn next(&self) -> LoopKey {
        self.next
    }

    pub fn previous(&self) -> LoopKey {
        self.prev
    }

    pub fn radial_next(&self) -> LoopKey {
        self.radial_next
    }

    pub fn radial_previous(&self) -> LoopKey {
        self.radial_prev
    }
}

impl Entity for Loop {
    type Key = LoopKey;

    const KIND: ElementKind = ElementKind::Loop;

    fn header(&self) -> &Header {
        &self.header
    }

    fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }
}

/// View of a loop in a mesh.
#[derive(Clone, Copy)]
pub struct LoopView<'a> {
    mesh: &'a Mesh,
    key: LoopKey,
}

impl<'a> LoopView<'a> {
    pub(in crate::mesh) fn bind(mesh: &'a Mesh, key: LoopKey) -> Option<Self> {
        mesh.core
            .loops
            .contains_key(&key)
            .then(|| LoopView { mesh, key })
    }

    pub fn entity(&self) -> &'a Loop {
        &self.mesh.core.loops[self.key]
    }

    /// Gets an iterator over the other loops in the radial cycle.
    pub fn radial_loops(&self) -> Cursor<'a, LoopsOfLoop> {
        Cursor::begin(self.mesh, self.key)
    }

    /// Gets the vertex at the far end of the loop's edge.
    pub fn destination(&self) -> VertexKey {
        self.mesh.core.loops[self.next].vertex
    }

    /// Returns `true` if no other face uses the loop's edge.
    pub fn is_boundary(&self) -> bool {
        self.radial_next == self.key
    }
}

impl<'a> ClosedView for LoopView<'a> {
    type Key = LoopKey;
    type Entity = Loop;

    fn key(&self) -> Self::Key {
        self.key
    }
}

impl<'a> Deref for LoopView<'a> {
    type Target = Loop;

    fn deref(&self) -> &Self::Target {
        self.entity()
    }
}

#[cfg(test)]
mod tests {
    use crate::mesh::{Duplicates, Mesh};

    #[test]
    fn loops_link_vertex_edge_and_face() {
        let mut mesh = Mesh::new();
        let a = mesh.make_vertex([0.0, 0.0, 0.0]);
        let b = mesh.make_vertex([1.0, 0.0, 0.0]);
        let c = mesh.make_vertex([0.0, 1.0, 0.0]);
        let face = mesh
            .make_face_from_vertices(&[a, b, c], Duplicates::Reject)
            .unwrap();

        for lp in mesh.face(face).unwrap().loops() {
            let view = mesh.face_loop(lp).unwrap();
            assert_eq!(face, view.face());
            assert!(view.is_boundary());
            assert_eq!(0, view.radial_loops().count());
            let edge = mesh.edge(view.edge()).unwrap();
            assert!(edge.connects(view.vertex(), view.destination()));
            assert_eq!(lp, mesh.face_loop(view.next()).unwrap().previous());
        }
    }

    #[test]
    fn radial_loops_exclude_origin() {
        let mesh = crate::mesh::tests::tetrahedron();
        for lp in mesh.loop_keys() {
            let view = mesh.face_loop(lp).unwrap();
            let others: Vec<_> = view.radial_loops().collect();
            assert_eq!(1, others.len());
            assert_ne!(lp, others[0]);
            assert_eq!(view.edge(), mesh.face_loop(others[0]).unwrap().edge());
        }
    }
}
