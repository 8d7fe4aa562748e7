use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;
use std::ops::Deref;

use crate::entity::header::{ElementKind, Header};
use crate::entity::storage::Get;
use crate::entity::view::ClosedView;
use crate::entity::Entity;
use crate::mesh::disk;
use crate::mesh::iter::{Cursor, EdgesOfVertex, FacesOfVertex, LoopsOfVertex, VerticesOfFace};
use crate::mesh::key::{EdgeKey, LoopKey, VertexKey};
use crate::mesh::radial;
use crate::mesh::Mesh;

/// Mesh vertex.
#[derive(Clone, Debug)]
pub struct Vertex {
    pub(in crate::mesh) header: Header,
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
    /// Anchor of the disk cycle, if any edges are incident.
    pub(in crate::mesh) edge: Option<EdgeKey>,
}

impl Vertex {
    pub(in crate::mesh) fn new(position: Point3<f64>) -> Self {
        Vertex {
            header: Header::new(ElementKind::Vertex),
            position,
            normal: Vector3::zeros(),
            edge: None,
        }
    }

    pub fn edge(&self) -> Option<EdgeKey> {
        self.edge
    }
}

impl Entity for Vertex {
    type Key = VertexKey;

    const KIND: ElementKind = ElementKind::Vertex;

    fn header(&self) -> &Header {
        &self.header
    }

    fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }
}

/// View of a vertex in a mesh.
///
/// Provides traversals and queries related to vertices. Views borrow their
/// mesh immutably; see `Mesh::edit` for mutations.
#[derive(Clone, Copy)]
pub struct VertexView<'a> {
    mesh: &'a Mesh,
    key: VertexKey,
}

impl<'a> VertexView<'a> {
    pub(in crate::mesh) fn bind(mesh: &'a Mesh, key: VertexKey) -> Option<Self> {
        mesh.core
            .vertices
            .contains_key(&key)
            .then(|| VertexView { mesh, key })
    }

    pub fn entity(&self) -> &'a Vertex {
        &self.mesh.core.vertices[self.key]
    }

    pub fn position(&self) -> &'a Point3<f64> {
        &self.entity().position
    }

    /// Gets an iterator over the edges of the vertex's disk cycle.
    pub fn edges(&self) -> Cursor<'a, EdgesOfVertex> {
        Cursor::begin(self.mesh, self.key)
    }

    /// Gets an iterator over the loops that originate at the vertex.
    pub fn loops(&self) -> Cursor<'a, LoopsOfVertex> {
        Cursor::begin(self.mesh, self.key)
    }

    /// Gets an iterator over the faces that include the vertex.
    pub fn faces(&self) -> Cursor<'a, FacesOfVertex> {
        Cursor::begin(self.mesh, self.key)
    }

    /// Gets an iterator over the vertices that share an edge with the vertex.
    pub fn neighbors(&self) -> impl Iterator<Item = VertexKey> + 'a {
        let mesh = self.mesh;
        let key = self.key;
        self.edges()
            .filter_map(move |edge| mesh.core.edges[edge].other_vertex(key))
    }

    /// Gets the number of edges incident to the vertex.
    pub fn valence(&self) -> usize {
        disk::count(&self.mesh.core, self.key, self.mesh.config.cycle_limit)
    }

    /// Gets the edge between the vertex and another vertex, if any.
    pub fn edge_to(&self, other: VertexKey) -> Option<EdgeKey> {
        disk::find_edge(
            &self.mesh.core,
            self.key,
            other,
            self.mesh.config.cycle_limit,
        )
    }

    pub fn is_isolated(&self) -> bool {
        self.edge.is_none()
    }

    /// Returns `true` if the vertex has edges and none of them are used by a
    /// face.
    pub fn is_wire(&self) -> bool {
        !self.is_isolated() && self.loops().next().is_none()
    }

    /// Returns `true` if any incident edge is used by exactly one face.
    pub fn is_boundary(&self) -> bool {
        self.edges()
            .any(|edge| radial::count(&self.mesh.core, edge, self.mesh.config.cycle_limit) == 1)
    }

    /// Returns `true` if the faces around the vertex form a single fan.
    ///
    /// Every incident edge must be used by one or two faces and the faces
    /// must be reachable from each other by crossing those edges. Isolated
    /// and wire vertices are not manifold.
    pub fn is_manifold(&self) -> bool {
        let core = &self.mesh.core;
        let limit = self.mesh.config.cycle_limit;
        if self.is_isolated() {
            return false;
        }
        if self
            .edges()
            .map(|edge| radial::count(core, edge, limit))
            .any(|count| count == 0 || count > 2)
        {
            return false;
        }
        let loops: SmallVec<[LoopKey; 8]> = self.loops().collect();
        let first = match loops.first() {
            Some(first) => *first,
            None => return false,
        };
        // Walk the fan in both directions, crossing the outgoing and incoming
        // edges of each corner. Stop at the start (closed fan) or at a
        // boundary edge.
        let mut visited = 1;
        let mut closed = false;
        let mut current = first;
        while let Some(next) = self.cross(core.loops[current].edge, current) {
            if next == first {
                closed = true;
                break;
            }
            visited += 1;
            if visited > loops.len() {
                return false;
            }
            current = next;
        }
        if !closed {
            current = first;
            loop {
                let previous = core.loops[current].prev;
                match self.cross(core.loops[previous].edge, previous) {
                    Some(next) if next != first => {
                        visited += 1;
                        if visited > loops.len() {
                            return false;
                        }
                        current = next;
                    }
                    _ => break,
                }
            }
        }
        visited == loops.len()
    }

    /// Crosses `edge` from the face of `lp` into the adjacent face and gets
    /// the loop of that face that originates at this vertex.
    fn cross(&self, edge: EdgeKey, lp: LoopKey) -> Option<LoopKey> {
        let core = &self.mesh.core;
        debug_assert_eq!(core.loops[lp].edge, edge);
        let adjacent = core.loops[lp].radial_next;
        if adjacent == lp {
            None
        }
        else if core.loops[adjacent].vertex == self.key {
            Some(adjacent)
        }
        else {
            Some(core.loops[adjacent].next)
        }
    }

    /// Returns `true` if the vertex and `other` are both used by some face.
    pub fn shares_face_with(&self, other: VertexKey) -> bool {
        let mesh = self.mesh;
        self.faces().any(|face| {
            Cursor::<VerticesOfFace>::begin(mesh, face)
                .any(|vertex| vertex == other)
        })
    }
}

impl<'a> ClosedView for VertexView<'a> {
    type Key = VertexKey;
    type Entity = Vertex;

    fn key(&self) -> Self::Key {
        self.key
    }
}

impl<'a> Deref for VertexView<'a> {
    type Target = Vertex;

    fn deref(&self) -> &Self::Target {
        self.entity()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use nalgebra::Point3;

    use crate::mesh::{Duplicates, Mesh};

    #[test]
    fn isolated_vertex() {
        let mut mesh = Mesh::new();
        let a = mesh.make_vertex([1.0, 2.0, 3.0]);
        let vertex = mesh.vertex(a).unwrap();

        assert!(vertex.is_isolated());
        assert!(!vertex.is_wire());
        assert!(!vertex.is_manifold());
        assert_eq!(0, vertex.valence());
        assert_eq!(0, vertex.edges().count());
        assert_abs_diff_eq!(Point3::new(1.0, 2.0, 3.0), *vertex.position());
    }

    #[test]
    fn wire_vertex() {
        let mut mesh = Mesh::new();
        let a = mesh.make_vertex([0.0, 0.0, 0.0]);
        let b = mesh.make_vertex([1.0, 0.0, 0.0]);
        let c = mesh.make_vertex([0.0, 1.0, 0.0]);
        let ab = mesh.make_edge(a, b, false).unwrap();
        let ac = mesh.make_edge(a, c, false).unwrap();

        let vertex = mesh.vertex(a).unwrap();
        assert!(vertex.is_wire());
        assert!(!vertex.is_boundary());
        assert_eq!(2, vertex.valence());
        assert_eq!(Some(ab), vertex.edge_to(b));
        assert_eq!(Some(ac), vertex.edge_to(c));
        assert_eq!(None, mesh.vertex(b).unwrap().edge_to(c));

        let mut neighbors: Vec<_> = vertex.neighbors().collect();
        neighbors.sort();
        let mut expected = vec![b, c];
        expected.sort();
        assert_eq!(expected, neighbors);
    }

    #[test]
    fn boundary_and_manifold_vertices() {
        // Two triangles sharing the edge `bc`.
        let mut mesh = Mesh::new();
        let a = mesh.make_vertex([0.0, 0.0, 0.0]);
        let b = mesh.make_vertex([1.0, 0.0, 0.0]);
        let c = mesh.make_vertex([0.0, 1.0, 0.0]);
        let d = mesh.make_vertex([1.0, 1.0, 0.0]);
        mesh.make_face_from_vertices(&[a, b, c], Duplicates::Reject)
            .unwrap();
        mesh.make_face_from_vertices(&[c, b, d], Duplicates::Reject)
            .unwrap();

        let vertex = mesh.vertex(b).unwrap();
        assert!(vertex.is_boundary());
        assert!(vertex.is_manifold());
        assert_eq!(2, vertex.faces().count());
        assert!(vertex.shares_face_with(d));
        assert!(!mesh.vertex(a).unwrap().shares_face_with(d));
    }

    #[test]
    fn closed_fan_is_manifold() {
        let mesh = crate::mesh::tests::tetrahedron();
        for vertex in mesh.vertices() {
            assert!(vertex.is_manifold());
            assert!(!vertex.is_boundary());
            assert_eq!(3, vertex.valence());
            assert_eq!(3, vertex.faces().count());
        }
    }

    #[test]
    fn bowtie_vertex_is_not_manifold() {
        // Two triangles touching only at `o`.
        let mut mesh = Mesh::new();
        let o = mesh.make_vertex([0.0, 0.0, 0.0]);
        let a = mesh.make_vertex([1.0, 0.0, 0.0]);
        let b = mesh.make_vertex([1.0, 1.0, 0.0]);
        let c = mesh.make_vertex([-1.0, 0.0, 0.0]);
        let d = mesh.make_vertex([-1.0, -1.0, 0.0]);
        mesh.make_face_from_vertices(&[o, a, b], Duplicates::Reject)
            .unwrap();
        mesh.make_face_from_vertices(&[o, c, d], Duplicates::Reject)
            .unwrap();

        let vertex = mesh.vertex(o).unwrap();
        assert!(!vertex.is_manifold());
        assert_eq!(4, vertex.valence());
        assert_eq!(2, vertex.faces().count());
    }
}
