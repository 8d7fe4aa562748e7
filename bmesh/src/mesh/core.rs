use crate::entity::storage::{Enumerate, Remove, SlotStorage};
use crate::mesh::edge::Edge;
use crate::mesh::face::Face;
use crate::mesh::loops::Loop;
use crate::mesh::vertex::Vertex;

/// Element arenas of a mesh.
///
/// `Core` owns storage only. It has no notion of consistency; the Euler
/// operators in the `mutation` module are responsible for keeping the cycles
/// threaded through these arenas intact.
#[derive(Clone, Debug, Default)]
pub struct Core {
    pub(in crate::mesh) vertices: SlotStorage<Vertex>,
    pub(in crate::mesh) edges: SlotStorage<Edge>,
    pub(in crate::mesh) loops: SlotStorage<Loop>,
    pub(in crate::mesh) faces: SlotStorage<Face>,
}

impl Core {
    pub fn with_capacity(vertices: usize, edges: usize, loops: usize, faces: usize) -> Self {
        Core {
            vertices: SlotStorage::with_capacity(vertices),
            edges: SlotStorage::with_capacity(edges),
            loops: SlotStorage::with_capacity(loops),
            faces: SlotStorage::with_capacity(faces),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
            && self.edges.is_empty()
            && self.loops.is_empty()
            && self.faces.is_empty()
    }

    pub fn clear(&mut self) {
        self.faces.clear();
        self.loops.clear();
        self.edges.clear();
        self.vertices.clear();
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use crate::entity::storage::{Enumerate, Get, Insert, Remove};
    use crate::mesh::core::Core;
    use crate::mesh::vertex::Vertex;

    #[test]
    fn storage_keys_track_removal() {
        let mut core = Core::default();
        let a = core.vertices.insert(Vertex::new(Point3::origin()));
        let b = core.vertices.insert(Vertex::new(Point3::new(1.0, 0.0, 0.0)));
        let mut keys: Vec<_> = core.vertices.keys().collect();
        keys.sort_unstable();
        let mut expected = vec![a, b];
        expected.sort_unstable();
        assert_eq!(expected, keys);

        core.vertices.remove(&a).unwrap();
        assert_eq!(vec![b], core.vertices.keys().collect::<Vec<_>>());
        assert!(core.vertices.get(&a).is_none());

        core.clear();
        assert!(core.is_empty());
        assert_eq!(0, core.vertices.keys().count());
    }
}
