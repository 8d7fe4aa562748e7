//! Boundary representation of polygonal meshes.
//!
//! This module provides a [`Mesh`] built from four kinds of elements:
//! vertices, edges, loops, and faces. A _loop_ is a corner of a face: it
//! joins a vertex, the edge that leaves that vertex along the face's
//! boundary, and the face itself. Elements reference each other through
//! three kinds of circular, doubly linked lists.
//!
//! | Cycle  | Owner  | Members                           |
//! |--------|--------|-----------------------------------|
//! | Disk   | Vertex | Edges incident to the vertex.     |
//! | Radial | Edge   | Loops (one per face) on the edge. |
//! | Loop   | Face   | Loops around the face's boundary. |
//!
//! Unlike half-edge structures, this representation supports non-manifold
//! topology: wire edges (no faces), edges shared by more than two faces, and
//! isolated vertices are all representable.
//!
//! # Euler Operators
//!
//! Topology is only ever changed by Euler operators, which move a mesh from
//! one consistent state to another. Each `make_*` operator has a matching
//! `kill_*` operator, and the split and join operators are inverses of one
//! another.
//!
//! | Operator                 | Effect                                       |
//! |--------------------------|----------------------------------------------|
//! | `make_vertex`            | Creates an isolated vertex.                  |
//! | `make_edge`              | Connects two vertices.                       |
//! | `make_face`              | Bounds a face with existing edges.           |
//! | `kill_vertex`            | Removes an isolated vertex.                  |
//! | `kill_edge`              | Removes an edge that no face uses.           |
//! | `kill_face`              | Removes a face and its loops.                |
//! | `split_edge`             | Inserts a vertex into an edge.               |
//! | `split_face`             | Divides a face with a new edge.              |
//! | `join_edge_kill_vertex`  | Removes a vertex between two edges.          |
//! | `join_face_kill_edge`    | Merges two faces across a shared edge.       |
//!
//! The primitive operators check their preconditions with debug assertions
//! only. Composed operations such as `make_face_from_vertices`,
//! `dissolve_vertex`, and `join_faces` check their input before mutating and
//! report failures as [`MeshError`]s.
//!
//! # Keys and Views
//!
//! Elements are addressed by opaque, generational keys. A key to a removed
//! element never refers to a new element, so lookups with stale keys fail.
//! Views bind a key to a mesh and expose traversals and queries.
//!
//! # Examples
//!
//! Building a quadrilateral and splitting it along a diagonal:
//!
//! ```rust
//! use bmesh::mesh::{Duplicates, Mesh};
//!
//! let mut mesh = Mesh::new();
//! let a = mesh.make_vertex([0.0, 0.0, 0.0]);
//! let b = mesh.make_vertex([1.0, 0.0, 0.0]);
//! let c = mesh.make_vertex([1.0, 1.0, 0.0]);
//! let d = mesh.make_vertex([0.0, 1.0, 0.0]);
//! let abcd = mesh
//!     .make_face_from_vertices(&[a, b, c, d], Duplicates::Reject)
//!     .unwrap();
//!
//! let (acd, _) = mesh.split_face(abcd, a, c);
//! assert_eq!(3, mesh.face(abcd).unwrap().arity());
//! assert_eq!(3, mesh.face(acd).unwrap().arity());
//! assert!(mesh.edge(mesh.edge_between(a, c).unwrap()).unwrap().is_manifold());
//! assert!(mesh.validate().is_ok());
//! ```

mod builder;
mod config;
mod core;
mod disk;
mod edge;
mod face;
pub mod iter;
mod key;
mod loops;
mod mutation;
mod radial;
mod trace;
mod validate;
mod vertex;

use derivative::Derivative;
use smallvec::SmallVec;
use thiserror::Error;

use crate::attribute::{AttributeError, Attributes};
use crate::entity::storage::{Enumerate, Get, SlotStorage};
use crate::entity::Entity;
use crate::mesh::core::Core;
use crate::mesh::iter::{Cursor, LoopsOfFace, VerticesOfFace};
use crate::transact::Transact;

pub use crate::entity::header::{ElementKind, ElementMask, Flags, Header};
pub use crate::mesh::builder::MeshBuilder;
pub use crate::mesh::config::MeshConfig;
pub use crate::mesh::edge::{DiskLink, Edge, EdgeView, Side};
pub use crate::mesh::face::{Face, FaceView};
pub use crate::mesh::key::{EdgeKey, ElementKey, FaceKey, LoopKey, VertexKey};
pub use crate::mesh::loops::{Loop, LoopView};
pub use crate::mesh::mutation::{Duplicates, EditHook, IndexRefresh, Mutation};
pub use crate::mesh::validate::Invariants;
pub use crate::mesh::vertex::{Vertex, VertexView};

#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    #[error("required topology not found")]
    TopologyNotFound,
    #[error("topology malformed")]
    TopologyMalformed,
    #[error("arity is non-polygonal")]
    ArityNonPolygonal,
    /// A face over the same vertices already exists.
    #[error("face already exists: {0:?}")]
    FaceExists(FaceKey),
    /// The disk cycle of a vertex is not a closed cycle of its incident
    /// edges.
    #[error("malformed disk cycle at vertex {vertex:?}")]
    DiskCycle { vertex: VertexKey },
    /// The radial cycle of an edge is not a closed cycle of the loops on the
    /// edge.
    #[error("malformed radial cycle at edge {edge:?}")]
    RadialCycle { edge: EdgeKey },
    /// The loop cycle of a face does not close after exactly the arity of
    /// the face.
    #[error("malformed loop cycle at face {face:?}")]
    LoopCycle { face: FaceKey },
    #[error("cycle exceeded limit of {limit} steps")]
    CycleLimit { limit: usize },
    #[error("faces cannot be joined")]
    JoinFacesFailed,
    #[error("vertex cannot be dissolved")]
    DissolveFailed,
    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

trait OptionExt<T> {
    fn expect_consistent(self) -> T;
}

impl<T> OptionExt<T> for Option<T> {
    fn expect_consistent(self) -> T {
        self.expect("internal error: mesh consistency violated")
    }
}

fn cycle_limit_exceeded(limit: usize) -> ! {
    panic!("internal error: cycle limit ({}) exceeded", limit)
}

/// Boundary representation of a polygonal mesh.
///
/// See the module documentation.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct Mesh {
    core: Core,
    #[derivative(Debug = "ignore")]
    attributes: Attributes,
    /// Kinds of elements with stale scratch indices.
    dirty: ElementMask,
    config: MeshConfig,
}

impl Mesh {
    /// Creates an empty `Mesh`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bmesh::mesh::Mesh;
    ///
    /// let mesh = Mesh::new();
    /// assert!(mesh.is_empty());
    /// ```
    pub fn new() -> Self {
        Mesh::with_config(Default::default())
    }

    pub fn with_config(config: MeshConfig) -> Self {
        Mesh {
            core: Core::default(),
            attributes: Attributes::default(),
            dirty: ElementMask::empty(),
            config,
        }
    }

    /// Creates an empty `Mesh` with storage for the given number of vertices,
    /// edges, loops, and faces.
    pub fn with_capacity(vertices: usize, edges: usize, loops: usize, faces: usize) -> Self {
        Mesh {
            core: Core::with_capacity(vertices, edges, loops, faces),
            ..Mesh::new()
        }
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut MeshConfig {
        &mut self.config
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    /// Begins a scoped edit session.
    ///
    /// See [`Mutation`].
    pub fn edit(&mut self) -> Mutation<'_> {
        Mutation::new(self)
    }

    /// Applies a function to a scoped edit session and commits it.
    ///
    /// The session is aborted if the function fails.
    pub fn edit_with<F, T>(&mut self, f: F) -> Result<T, MeshError>
    where
        F: FnOnce(&mut Mutation<'_>) -> Result<T, MeshError>,
    {
        self.edit().commit_with(f).map(|(_, output)| output)
    }

    pub fn vertex(&self, key: VertexKey) -> Option<VertexView<'_>> {
        VertexView::bind(self, key)
    }

    pub fn edge(&self, key: EdgeKey) -> Option<EdgeView<'_>> {
        EdgeView::bind(self, key)
    }

    pub fn face_loop(&self, key: LoopKey) -> Option<LoopView<'_>> {
        LoopView::bind(self, key)
    }

    pub fn face(&self, key: FaceKey) -> Option<FaceView<'_>> {
        FaceView::bind(self, key)
    }

    /// Gets the properties of a vertex for modification.
    ///
    /// Only geometric properties are exposed; topology is changed through
    /// the Euler operators.
    pub fn vertex_mut(&mut self, key: VertexKey) -> Option<&mut Vertex> {
        self.core.vertices.get_mut(&key)
    }

    pub fn face_mut(&mut self, key: FaceKey) -> Option<&mut Face> {
        self.core.faces.get_mut(&key)
    }

    /// Gets an iterator over a view of each vertex in the mesh.
    pub fn vertices(&self) -> impl Iterator<Item = VertexView<'_>> {
        self.vertex_keys()
            .map(move |key| VertexView::bind(self, key).expect_consistent())
    }

    /// Gets an iterator over a view of each edge in the mesh.
    pub fn edges(&self) -> impl Iterator<Item = EdgeView<'_>> {
        self.edge_keys()
            .map(move |key| EdgeView::bind(self, key).expect_consistent())
    }

    /// Gets an iterator over a view of each loop in the mesh.
    pub fn loops(&self) -> impl Iterator<Item = LoopView<'_>> {
        self.loop_keys()
            .map(move |key| LoopView::bind(self, key).expect_consistent())
    }

    /// Gets an iterator over a view of each face in the mesh.
    pub fn faces(&self) -> impl Iterator<Item = FaceView<'_>> {
        self.face_keys()
            .map(move |key| FaceView::bind(self, key).expect_consistent())
    }

    pub fn vertex_keys(&self) -> impl '_ + Iterator<Item = VertexKey> {
        self.core.vertices.keys()
    }

    pub fn edge_keys(&self) -> impl '_ + Iterator<Item = EdgeKey> {
        self.core.edges.keys()
    }

    pub fn loop_keys(&self) -> impl '_ + Iterator<Item = LoopKey> {
        self.core.loops.keys()
    }

    pub fn face_keys(&self) -> impl '_ + Iterator<Item = FaceKey> {
        self.core.faces.keys()
    }

    pub fn vertex_count(&self) -> usize {
        self.core.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.core.edges.len()
    }

    pub fn loop_count(&self) -> usize {
        self.core.loops.len()
    }

    pub fn face_count(&self) -> usize {
        self.core.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.is_empty()
    }

    /// Returns `true` if the mesh has an element with the given key.
    pub fn contains(&self, key: impl Into<ElementKey>) -> bool {
        self.header(key).is_some()
    }

    /// Gets the edge between two vertices, if any.
    ///
    /// If more than one edge connects the vertices, then the first edge found
    /// in the disk cycle of `a` is returned.
    pub fn edge_between(&self, a: VertexKey, b: VertexKey) -> Option<EdgeKey> {
        if !(self.core.vertices.contains_key(&a) && self.core.vertices.contains_key(&b)) {
            return None;
        }
        disk::find_edge(&self.core, a, b, self.config.cycle_limit)
    }

    /// Finds a face bounded by exactly the given vertices in any order.
    pub fn face_exists(&self, vertices: &[VertexKey]) -> Option<FaceKey> {
        let first = *vertices.first()?;
        self.vertex(first)?.faces().find(|face| {
            self.core.faces[*face].len == vertices.len()
                && Cursor::<VerticesOfFace>::begin(self, *face)
                    .all(|vertex| vertices.contains(&vertex))
        })
    }

    pub fn header(&self, key: impl Into<ElementKey>) -> Option<&Header> {
        match key.into() {
            ElementKey::Vertex(key) => self.core.vertices.get(&key).map(Entity::header),
            ElementKey::Edge(key) => self.core.edges.get(&key).map(Entity::header),
            ElementKey::Loop(key) => self.core.loops.get(&key).map(Entity::header),
            ElementKey::Face(key) => self.core.faces.get(&key).map(Entity::header),
        }
    }

    pub fn header_mut(&mut self, key: impl Into<ElementKey>) -> Option<&mut Header> {
        match key.into() {
            ElementKey::Vertex(key) => self.core.vertices.get_mut(&key).map(Entity::header_mut),
            ElementKey::Edge(key) => self.core.edges.get_mut(&key).map(Entity::header_mut),
            ElementKey::Loop(key) => self.core.loops.get_mut(&key).map(Entity::header_mut),
            ElementKey::Face(key) => self.core.faces.get_mut(&key).map(Entity::header_mut),
        }
    }

    /// Returns `true` if the element has all of the given flags.
    ///
    /// Returns `false` if the element does not exist.
    pub fn test_flag(&self, key: impl Into<ElementKey>, flags: Flags) -> bool {
        self.header(key)
            .map_or(false, |header| header.flags.contains(flags))
    }

    pub fn set_flag(&mut self, key: impl Into<ElementKey>, flags: Flags) {
        if let Some(header) = self.header_mut(key) {
            header.flags.insert(flags);
        }
    }

    pub fn clear_flag(&mut self, key: impl Into<ElementKey>, flags: Flags) {
        if let Some(header) = self.header_mut(key) {
            header.flags.remove(flags);
        }
    }

    pub fn toggle_flag(&mut self, key: impl Into<ElementKey>, flags: Flags) {
        if let Some(header) = self.header_mut(key) {
            header.flags.toggle(flags);
        }
    }

    /// Gets the scratch index of an element.
    ///
    /// The index is stale if `index_dirty` is `true` for the element's kind.
    pub fn index(&self, key: impl Into<ElementKey>) -> Option<i32> {
        self.header(key).map(|header| header.index)
    }

    /// Sets the scratch index of an element.
    ///
    /// This does not affect dirtiness; callers that assign their own indices
    /// are responsible for their validity.
    pub fn set_index(&mut self, key: impl Into<ElementKey>, index: i32) {
        if let Some(header) = self.header_mut(key) {
            header.index = index;
        }
    }

    /// Returns `true` if elements of the given kind have been created or
    /// destroyed since their indices were last updated.
    pub fn index_dirty(&self, kind: ElementKind) -> bool {
        self.dirty.contains(kind.mask())
    }

    /// Assigns contiguous scratch indices to the elements of the given kinds.
    ///
    /// Vertices, edges, and faces are numbered in storage order. Loops are
    /// numbered face by face in winding order.
    pub fn update_indices(&mut self, mask: ElementMask) {
        for kind in mask.kinds() {
            match kind {
                ElementKind::Vertex => reindex(&mut self.core.vertices),
                ElementKind::Edge => reindex(&mut self.core.edges),
                ElementKind::Face => reindex(&mut self.core.faces),
                ElementKind::Loop => {
                    let loops: Vec<LoopKey> = self
                        .core
                        .faces
                        .keys()
                        .flat_map(|face| Cursor::<LoopsOfFace>::begin(self, face))
                        .collect();
                    for (index, lp) in loops.into_iter().enumerate() {
                        self.core.loops[lp].header.index = index as i32;
                    }
                }
            }
            self.dirty.remove(kind.mask());
        }
    }

    /// Removes all elements and attribute values from the mesh.
    pub fn clear(&mut self) {
        self.core.clear();
        self.attributes.clear();
        self.dirty = ElementMask::ALL;
    }

    fn mark_dirty(&mut self, mask: ElementMask) {
        self.dirty |= mask;
    }

    /// Gets the loops of a face as a buffer of keys.
    fn face_loops(&self, face: FaceKey) -> SmallVec<[LoopKey; 8]> {
        Cursor::<LoopsOfFace>::begin(self, face).collect()
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Mesh::new()
    }
}

fn reindex<E>(storage: &mut SlotStorage<E>)
where
    E: Entity,
{
    for (index, (_, entity)) in storage.iter_mut().enumerate() {
        entity.header_mut().index = index as i32;
    }
}

#[cfg(test)]
pub mod tests {
    use crate::entity::header::{ElementKind, ElementMask, Flags};
    use crate::mesh::{Duplicates, Mesh, MeshError, VertexKey};

    /// Builds a closed tetrahedron with consistently wound triangles.
    pub fn tetrahedron() -> Mesh {
        let mut mesh = Mesh::new();
        let a = mesh.make_vertex([0.0, 0.0, 0.0]);
        let b = mesh.make_vertex([1.0, 0.0, 0.0]);
        let c = mesh.make_vertex([0.0, 1.0, 0.0]);
        let d = mesh.make_vertex([0.0, 0.0, 1.0]);
        for face in [[a, c, b], [a, b, d], [b, c, d], [c, a, d]] {
            mesh.make_face_from_vertices(&face, Duplicates::Reject)
                .unwrap();
        }
        mesh
    }

    /// Builds a grid of `n` by `n` quadrilaterals in the XY plane.
    pub fn grid(n: usize) -> Mesh {
        let mut mesh = Mesh::new();
        let vertices: Vec<Vec<VertexKey>> = (0..=n)
            .map(|y| {
                (0..=n)
                    .map(|x| mesh.make_vertex([x as f64, y as f64, 0.0]))
                    .collect()
            })
            .collect();
        for y in 0..n {
            for x in 0..n {
                mesh.make_face_from_vertices(
                    &[
                        vertices[y][x],
                        vertices[y][x + 1],
                        vertices[y + 1][x + 1],
                        vertices[y + 1][x],
                    ],
                    Duplicates::Reject,
                )
                .unwrap();
            }
        }
        mesh
    }

    #[test]
    fn tetrahedron_counts() {
        let mesh = tetrahedron();
        assert_eq!(4, mesh.vertex_count());
        assert_eq!(6, mesh.edge_count());
        assert_eq!(12, mesh.loop_count());
        assert_eq!(4, mesh.face_count());
        for edge in mesh.edges() {
            assert!(edge.is_manifold());
        }
        assert_eq!(Ok(()), mesh.validate());
    }

    #[test]
    fn grid_counts() {
        let mesh = grid(3);
        assert_eq!(16, mesh.vertex_count());
        assert_eq!(24, mesh.edge_count());
        assert_eq!(9, mesh.face_count());
        assert_eq!(12, mesh.edges().filter(|edge| edge.is_boundary()).count());
        assert_eq!(Ok(()), mesh.validate());
    }

    #[test]
    fn flags_by_element_key() {
        let mut mesh = tetrahedron();
        let vertex = mesh.vertex_keys().next().unwrap();
        let face = mesh.face_keys().next().unwrap();

        assert!(!mesh.test_flag(vertex, Flags::SELECT));
        mesh.set_flag(vertex, Flags::SELECT | Flags::SEAM);
        assert!(mesh.test_flag(vertex, Flags::SELECT));
        assert!(mesh.test_flag(vertex, Flags::SEAM));
        mesh.clear_flag(vertex, Flags::SELECT);
        assert!(!mesh.test_flag(vertex, Flags::SELECT));
        assert!(mesh.test_flag(vertex, Flags::SEAM));

        mesh.toggle_flag(face, Flags::HIDDEN);
        assert!(mesh.test_flag(face, Flags::HIDDEN));
        assert_eq!(ElementKind::Face, mesh.header(face).unwrap().kind());
    }

    #[test]
    fn flags_of_removed_element() {
        let mut mesh = Mesh::new();
        let vertex = mesh.make_vertex([0.0, 0.0, 0.0]);
        mesh.kill_vertex(vertex);

        mesh.set_flag(vertex, Flags::SELECT);
        assert!(!mesh.test_flag(vertex, Flags::SELECT));
        assert!(!mesh.contains(vertex));
        assert_eq!(None, mesh.index(vertex));
    }

    #[test]
    fn update_indices_clears_dirtiness() {
        let mut mesh = tetrahedron();
        assert!(mesh.index_dirty(ElementKind::Vertex));
        assert!(mesh.index_dirty(ElementKind::Loop));

        mesh.update_indices(ElementMask::VERTEX | ElementMask::LOOP);
        assert!(!mesh.index_dirty(ElementKind::Vertex));
        assert!(!mesh.index_dirty(ElementKind::Loop));
        assert!(mesh.index_dirty(ElementKind::Edge));

        let mut indices: Vec<_> = mesh
            .vertex_keys()
            .map(|vertex| mesh.index(vertex).unwrap())
            .collect();
        indices.sort_unstable();
        assert_eq!(vec![0, 1, 2, 3], indices);
        let mut indices: Vec<_> = mesh
            .loop_keys()
            .map(|lp| mesh.index(lp).unwrap())
            .collect();
        indices.sort_unstable();
        assert_eq!((0..12).collect::<Vec<_>>(), indices);

        mesh.make_vertex([2.0, 2.0, 2.0]);
        assert!(mesh.index_dirty(ElementKind::Vertex));
    }

    #[test]
    fn face_exists_ignores_order() {
        let mut mesh = Mesh::new();
        let a = mesh.make_vertex([0.0, 0.0, 0.0]);
        let b = mesh.make_vertex([1.0, 0.0, 0.0]);
        let c = mesh.make_vertex([0.0, 1.0, 0.0]);
        let d = mesh.make_vertex([1.0, 1.0, 0.0]);
        let face = mesh
            .make_face_from_vertices(&[a, b, c], Duplicates::Reject)
            .unwrap();

        assert_eq!(Some(face), mesh.face_exists(&[c, a, b]));
        assert_eq!(None, mesh.face_exists(&[a, b, d]));
        assert_eq!(None, mesh.face_exists(&[a, b]));
        assert_eq!(None, mesh.face_exists(&[]));
    }

    #[test]
    fn clear_removes_everything() {
        let mut mesh = tetrahedron();
        mesh.clear();
        assert!(mesh.is_empty());
        assert_eq!(0, mesh.loop_count());
        assert!(mesh.index_dirty(ElementKind::Face));
    }

    #[test]
    fn clone_is_independent() {
        let mesh = tetrahedron();
        let mut other = mesh.clone();
        let face = other.face_keys().next().unwrap();
        other.kill_face(face);

        assert_eq!(4, mesh.face_count());
        assert_eq!(3, other.face_count());
        assert_eq!(Ok(()), mesh.validate());
        assert_eq!(Ok(()), other.validate());
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            "cycle exceeded limit of 8 steps",
            MeshError::CycleLimit { limit: 8 }.to_string()
        );
        assert_eq!("faces cannot be joined", MeshError::JoinFacesFailed.to_string());
    }
}
