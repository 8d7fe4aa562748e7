use nalgebra::Vector3;
use smallvec::SmallVec;
use std::ops::Deref;

use crate::entity::header::{ElementKind, Header};
use crate::entity::storage::{Get, Key};
use crate::entity::view::ClosedView;
use crate::entity::Entity;
use crate::mesh::iter::{Cursor, EdgesOfFace, LoopsOfFace, LoopsOfLoop, VerticesOfFace};
use crate::mesh::key::{EdgeKey, FaceKey, LoopKey, VertexKey};
use crate::mesh::Mesh;

/// Mesh face.
#[derive(Clone, Debug)]
pub struct Face {
    pub(in crate::mesh) header: Header,
    /// Any loop of the face's loop cycle.
    pub(in crate::mesh) first: LoopKey,
    pub(in crate::mesh) len: usize,
    pub material: u16,
    pub normal: Vector3<f64>,
}

impl Face {
    pub(in crate::mesh) fn new() -> Self {
        Face {
            header: Header::new(ElementKind::Face),
            first: LoopKey::null(),
            len: 0,
            material: 0,
            normal: Vector3::zeros(),
        }
    }

    pub fn first(&self) -> LoopKey {
        self.first
    }

    /// Gets the number of loops (and so vertices and edges) of the face.
    pub fn arity(&self) -> usize {
        self.len
    }
}

impl Entity for Face {
    type Key = FaceKey;

    const KIND: ElementKind = ElementKind::Face;

    fn header(&self) -> &Header {
        &self.header
    }

    fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }
}

/// View of a face in a mesh.
#[derive(Clone, Copy)]
pub struct FaceView<'a> {
    mesh: &'a Mesh,
    key: FaceKey,
}

impl<'a> FaceView<'a> {
    pub(in crate::mesh) fn bind(mesh: &'a Mesh, key: FaceKey) -> Option<Self> {
        mesh.core
            .faces
            .contains_key(&key)
            .then(|| FaceView { mesh, key })
    }

    pub fn entity(&self) -> &'a Face {
        &self.mesh.core.faces[self.key]
    }

    /// Gets an iterator over the loops of the face's loop cycle.
    pub fn loops(&self) -> Cursor<'a, LoopsOfFace> {
        Cursor::begin(self.mesh, self.key)
    }

    pub fn vertices(&self) -> Cursor<'a, VerticesOfFace> {
        Cursor::begin(self.mesh, self.key)
    }

    pub fn edges(&self) -> Cursor<'a, EdgesOfFace> {
        Cursor::begin(self.mesh, self.key)
    }

    /// Gets the loop of the face that originates at `vertex`.
    pub fn loop_at_vertex(&self, vertex: VertexKey) -> Option<LoopKey> {
        let mesh = self.mesh;
        self.loops()
            .find(|lp| mesh.core.loops[*lp].vertex == vertex)
    }

    /// Gets the loop of the face that lies on `edge`.
    pub fn loop_on_edge(&self, edge: EdgeKey) -> Option<LoopKey> {
        let mesh = self.mesh;
        self.loops().find(|lp| mesh.core.loops[*lp].edge == edge)
    }

    pub fn contains_vertex(&self, vertex: VertexKey) -> bool {
        self.loop_at_vertex(vertex).is_some()
    }

    pub fn contains_edge(&self, edge: EdgeKey) -> bool {
        self.loop_on_edge(edge).is_some()
    }

    /// Gets the edges that the face shares with `other`.
    pub fn shared_edges(&self, other: FaceKey) -> SmallVec<[EdgeKey; 4]> {
        let mesh = self.mesh;
        self.edges()
            .filter(|edge| {
                Cursor::<LoopsOfFace>::begin(mesh, other)
                    .any(|lp| mesh.core.loops[lp].edge == *edge)
            })
            .collect()
    }

    /// Returns `true` if the face and `other` share at least one edge.
    pub fn shares_edge_with(&self, other: FaceKey) -> bool {
        !self.shared_edges(other).is_empty()
    }

    /// Gets an iterator over the faces that share an edge with the face.
    ///
    /// A face that shares more than one edge is produced more than once.
    pub fn neighbors(&self) -> impl Iterator<Item = FaceKey> + 'a {
        let mesh = self.mesh;
        let key = self.key;
        self.loops()
            .flat_map(move |lp| Cursor::<LoopsOfLoop>::begin(mesh, lp))
            .map(move |lp| mesh.core.loops[lp].face)
            .filter(move |face| *face != key)
    }
}

impl<'a> ClosedView for FaceView<'a> {
    type Key = FaceKey;
    type Entity = Face;

    fn key(&self) -> Self::Key {
        self.key
    }
}

impl<'a> Deref for FaceView<'a> {
    type Target = Face;

    fn deref(&self) -> &Self::Target {
        self.entity()
    }
}
