//! Structural validation.
//!
//! Validation walks every cycle of a mesh without trusting its links and
//! reports the first inconsistency as a `MeshError`. It is `O(n)` in the
//! number of elements and is intended for tests and debugging, not for use
//! after every operation.

use ahash::AHashSet;

use crate::entity::storage::{Enumerate, Get};
use crate::mesh::edge::Side;
use crate::mesh::key::{EdgeKey, FaceKey, LoopKey, VertexKey};
use crate::mesh::trace::{Trace, TraceAny};
use crate::mesh::{Mesh, MeshError};

/// Checks the invariants of a data structure.
pub trait Invariants {
    /// Validates all invariants and returns the first violation.
    fn validate_invariants(&self) -> Result<(), MeshError>;

    /// Panics if an invariant is violated.
    ///
    /// This does nothing unless debug assertions or the `check-invariants`
    /// feature are enabled.
    fn debug_assert_invariants(&self) {
        if cfg!(any(debug_assertions, feature = "check-invariants")) {
            if let Err(error) = self.validate_invariants() {
                panic!("[invariants] mesh: {}", error);
            }
        }
    }
}

impl Invariants for Mesh {
    fn validate_invariants(&self) -> Result<(), MeshError> {
        self.validate()
    }
}

impl Mesh {
    /// Validates the structure of the mesh.
    ///
    /// The following are checked:
    ///
    /// - The disk cycle of every vertex is closed, doubly linked, and
    ///   contains only edges incident to the vertex. Every edge appears in
    ///   the disk cycles of both of its endpoints.
    /// - The radial cycle of every edge is closed, doubly linked, and
    ///   contains only loops that lie on the edge. Every loop appears in the
    ///   radial cycle of its edge.
    /// - Every face has at least three sides.
    /// - The loop cycle of every face closes after exactly the arity of the
    ///   face in both directions and each loop's edge connects the loop's
    ///   vertex to the next loop's vertex. Every loop belongs to the loop
    ///   cycle of its face.
    ///
    /// # Errors
    ///
    /// Returns `DiskCycle`, `RadialCycle`, or `LoopCycle` naming the element
    /// that owns the first malformed cycle that is found, or `CycleLimit` if
    /// a cycle is longer than `MeshConfig::cycle_limit`.
    pub fn validate(&self) -> Result<(), MeshError> {
        let sides = self.validate_disk_cycles()?;
        for (edge, entity) in self.core.edges.iter() {
            let (v1, v2) = entity.vertices();
            if v1 == v2 {
                return Err(MeshError::DiskCycle { vertex: v1 });
            }
            if !sides.contains(&(edge, Side::V1)) {
                return Err(MeshError::DiskCycle { vertex: v1 });
            }
            if !sides.contains(&(edge, Side::V2)) {
                return Err(MeshError::DiskCycle { vertex: v2 });
            }
        }
        let radial = self.validate_radial_cycles()?;
        let mut cycles = AHashSet::with_capacity(self.core.loops.len());
        for face in self.core.faces.keys() {
            cycles.extend(self.walk_face(face)?);
        }
        for (lp, entity) in self.core.loops.iter() {
            if !cycles.contains(&lp) {
                return Err(MeshError::LoopCycle { face: entity.face });
            }
            if !radial.contains(&lp) {
                return Err(MeshError::RadialCycle { edge: entity.edge });
            }
        }
        Ok(())
    }

    /// Validates the loop cycle of a single face.
    ///
    /// # Errors
    ///
    /// Returns `LoopCycle` if the face does not exist or its loop cycle is
    /// malformed.
    pub fn validate_face(&self, face: FaceKey) -> Result<(), MeshError> {
        self.walk_face(face).map(|_| ())
    }

    fn validate_disk_cycles(&self) -> Result<AHashSet<(EdgeKey, Side)>, MeshError> {
        let limit = self.config.cycle_limit;
        let mut sides = AHashSet::with_capacity(self.core.edges.len() * 2);
        for (vertex, entity) in self.core.vertices.iter() {
            let anchor = match entity.edge {
                Some(anchor) => anchor,
                None => continue,
            };
            let malformed = || MeshError::DiskCycle { vertex };
            let mut trace = TraceAny::default();
            let mut edge = anchor;
            for steps in 0.. {
                if steps >= limit {
                    return Err(MeshError::CycleLimit { limit });
                }
                if !trace.insert(edge) {
                    return Err(malformed());
                }
                let side = self.disk_side(edge, vertex).ok_or_else(malformed)?;
                sides.insert((edge, side));
                let next = self.core.edges[edge]
                    .link(side)
                    .next
                    .ok_or_else(malformed)?;
                let side = self.disk_side(next, vertex).ok_or_else(malformed)?;
                if self.core.edges[next].link(side).prev != Some(edge) {
                    return Err(malformed());
                }
                if next == anchor {
                    break;
                }
                edge = next;
            }
        }
        Ok(sides)
    }

    fn disk_side(&self, edge: EdgeKey, vertex: VertexKey) -> Option<Side> {
        self.core.edges.get(&edge)?.side(vertex)
    }

    fn validate_radial_cycles(&self) -> Result<AHashSet<LoopKey>, MeshError> {
        let limit = self.config.cycle_limit;
        let mut loops = AHashSet::with_capacity(self.core.loops.len());
        for (edge, entity) in self.core.edges.iter() {
            let anchor = match entity.radial {
                Some(anchor) => anchor,
                None => continue,
            };
            let malformed = || MeshError::RadialCycle { edge };
            let mut trace = TraceAny::default();
            let mut lp = anchor;
            for steps in 0.. {
                if steps >= limit {
                    return Err(MeshError::CycleLimit { limit });
                }
                if !trace.insert(lp) {
                    return Err(malformed());
                }
                let current = self.core.loops.get(&lp).ok_or_else(malformed)?;
                if current.edge != edge || !entity.contains_vertex(current.vertex) {
                    return Err(malformed());
                }
                let next = current.radial_next;
                if self
                    .core
                    .loops
                    .get(&next)
                    .map_or(true, |next| next.radial_prev != lp)
                {
                    return Err(malformed());
                }
                loops.insert(lp);
                if next == anchor {
                    break;
                }
                lp = next;
            }
        }
        Ok(loops)
    }

    fn walk_face(&self, face: FaceKey) -> Result<Vec<LoopKey>, MeshError> {
        let limit = self.config.cycle_limit;
        let malformed = || MeshError::LoopCycle { face };
        let entity = self.core.faces.get(&face).ok_or_else(malformed)?;
        if entity.len > limit {
            return Err(MeshError::CycleLimit { limit });
        }
        if entity.len < 3 {
            return Err(malformed());
        }
        let mut trace = TraceAny::default();
        let mut loops = Vec::with_capacity(entity.len);
        let mut lp = entity.first;
        for _ in 0..entity.len {
            if !trace.insert(lp) {
                return Err(malformed());
            }
            let current = self.core.loops.get(&lp).ok_or_else(malformed)?;
            let next = self.core.loops.get(&current.next).ok_or_else(malformed)?;
            if current.face != face || next.prev != lp {
                return Err(malformed());
            }
            let connected = self
                .core
                .edges
                .get(&current.edge)
                .map_or(false, |edge| edge.connects(current.vertex, next.vertex));
            if !connected {
                return Err(malformed());
            }
            loops.push(lp);
            lp = current.next;
        }
        if lp != entity.first {
            return Err(malformed());
        }
        // Walk backwards as well, since `next` and `prev` are independent.
        for _ in 0..entity.len {
            lp = self.core.loops.get(&lp).ok_or_else(malformed)?.prev;
        }
        if lp != entity.first {
            return Err(malformed());
        }
        Ok(loops)
    }
}

#[cfg(test)]
mod tests {
    use crate::mesh::edge::Side;
    use crate::mesh::{Duplicates, Invariants, Mesh, MeshError};

    #[test]
    fn consistent_meshes_validate() {
        assert_eq!(Ok(()), Mesh::new().validate());
        assert_eq!(Ok(()), crate::mesh::tests::tetrahedron().validate());
        assert_eq!(Ok(()), crate::mesh::tests::grid(3).validate_invariants());

        let mut mesh = Mesh::new();
        let a = mesh.make_vertex([0.0, 0.0, 0.0]);
        let b = mesh.make_vertex([1.0, 0.0, 0.0]);
        mesh.make_vertex([2.0, 0.0, 0.0]);
        mesh.make_edge(a, b, true).unwrap();
        mesh.make_edge(a, b, true).unwrap();
        assert_eq!(Ok(()), mesh.validate());
    }

    #[test]
    fn broken_disk_link() {
        let mut mesh = crate::mesh::tests::tetrahedron();
        let vertex = mesh.vertex_keys().next().unwrap();
        let edge = mesh.core.vertices[vertex].edge.unwrap();
        let side = mesh.core.edges[edge].side(vertex).unwrap();
        mesh.core.edges[edge].link_mut(side).next = Some(edge);
        assert_eq!(Err(MeshError::DiskCycle { vertex }), mesh.validate());
    }

    #[test]
    fn edge_missing_from_disk_cycle() {
        let mut mesh = Mesh::new();
        let a = mesh.make_vertex([0.0, 0.0, 0.0]);
        let b = mesh.make_vertex([1.0, 0.0, 0.0]);
        let edge = mesh.make_edge(a, b, false).unwrap();
        mesh.core.vertices[b].edge = None;
        *mesh.core.edges[edge].link_mut(Side::V2) = Default::default();
        assert_eq!(Err(MeshError::DiskCycle { vertex: b }), mesh.validate());
    }

    #[test]
    fn broken_radial_link() {
        let mut mesh = crate::mesh::tests::tetrahedron();
        let edge = mesh.edge_keys().next().unwrap();
        let lp = mesh.core.edges[edge].radial.unwrap();
        let next = mesh.core.loops[lp].radial_next;
        mesh.core.loops[next].radial_prev = next;
        assert_eq!(Err(MeshError::RadialCycle { edge }), mesh.validate());
    }

    #[test]
    fn broken_loop_link() {
        let mut mesh = Mesh::new();
        let a = mesh.make_vertex([0.0, 0.0, 0.0]);
        let b = mesh.make_vertex([1.0, 0.0, 0.0]);
        let c = mesh.make_vertex([1.0, 1.0, 0.0]);
        let d = mesh.make_vertex([0.0, 1.0, 0.0]);
        let face = mesh
            .make_face_from_vertices(&[a, b, c, d], Duplicates::Reject)
            .unwrap();
        let first = mesh.core.faces[face].first;
        let next = mesh.core.loops[first].next;
        mesh.core.loops[next].prev = next;
        assert_eq!(Err(MeshError::LoopCycle { face }), mesh.validate_face(face));
        assert_eq!(Err(MeshError::LoopCycle { face }), mesh.validate());
    }

    #[test]
    fn two_sided_face_is_malformed() {
        let mut mesh = Mesh::new();
        let a = mesh.make_vertex([0.0, 0.0, 0.0]);
        let b = mesh.make_vertex([1.0, 0.0, 0.0]);
        let ab = mesh.make_edge(a, b, true).unwrap();
        let ba = mesh.make_edge(b, a, true).unwrap();
        let face = mesh.make_face(&[a, b], &[ab, ba]);
        assert_eq!(Err(MeshError::LoopCycle { face }), mesh.validate_face(face));
        assert_eq!(Err(MeshError::LoopCycle { face }), mesh.validate());
    }

    #[test]
    fn cycle_limit_is_reported() {
        let mut mesh = crate::mesh::tests::tetrahedron();
        mesh.config_mut().cycle_limit = 2;
        assert_eq!(Err(MeshError::CycleLimit { limit: 2 }), mesh.validate());
    }

    #[test]
    #[should_panic(expected = "[invariants]")]
    fn debug_assert_invariants_panics() {
        let mut mesh = crate::mesh::tests::tetrahedron();
        let face = mesh.face_keys().next().unwrap();
        mesh.core.faces[face].len = 2;
        mesh.debug_assert_invariants();
    }
}
