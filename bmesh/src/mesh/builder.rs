use log::{debug, warn};
use nalgebra::Point3;
use smallvec::SmallVec;

use crate::mesh::config::MeshConfig;
use crate::mesh::key::{FaceKey, VertexKey};
use crate::mesh::mutation::Duplicates;
use crate::mesh::{Mesh, MeshError};
use crate::transact::Transact;
use crate::FromRawBuffers;

/// Incremental mesh construction.
///
/// Vertices and faces are inserted into a mesh that is only returned when the
/// builder is committed. Committing validates the mesh if the configuration
/// requests it.
///
/// # Examples
///
/// ```rust
/// use bmesh::mesh::MeshBuilder;
/// use bmesh::prelude::*;
///
/// let mut builder = MeshBuilder::new();
/// let a = builder.insert_vertex([0.0, 0.0, 0.0]);
/// let b = builder.insert_vertex([1.0, 0.0, 0.0]);
/// let c = builder.insert_vertex([0.0, 1.0, 0.0]);
/// builder.insert_face(&[a, b, c]).unwrap();
/// let mesh = builder.commit().unwrap();
///
/// assert_eq!(1, mesh.face_count());
/// ```
#[derive(Debug, Default)]
pub struct MeshBuilder {
    mesh: Mesh,
    duplicates: Duplicates,
}

impl MeshBuilder {
    pub fn new() -> Self {
        MeshBuilder::default()
    }

    pub fn with_config(config: MeshConfig) -> Self {
        MeshBuilder {
            mesh: Mesh::with_config(config),
            duplicates: Duplicates::default(),
        }
    }

    /// Sets the policy for faces that duplicate an inserted face.
    ///
    /// The default policy is `Duplicates::Reject`.
    pub fn duplicates(mut self, duplicates: Duplicates) -> Self {
        self.duplicates = duplicates;
        self
    }

    pub fn insert_vertex(&mut self, position: impl Into<Point3<f64>>) -> VertexKey {
        self.mesh.make_vertex(position)
    }

    /// Inserts a face over a ring of inserted vertices.
    ///
    /// See `Mesh::make_face_from_vertices`.
    pub fn insert_face(&mut self, vertices: &[VertexKey]) -> Result<FaceKey, MeshError> {
        self.mesh.make_face_from_vertices(vertices, self.duplicates)
    }
}

impl Transact for MeshBuilder {
    type Output = Mesh;
    type Error = MeshError;

    fn commit(self) -> Result<Self::Output, Self::Error> {
        let MeshBuilder { mesh, .. } = self;
        if mesh.config().is_validating() {
            if let Err(error) = mesh.validate() {
                warn!("built mesh failed validation: {}", error);
                return Err(error);
            }
        }
        debug!(
            "built mesh with {} vertices and {} faces",
            mesh.vertex_count(),
            mesh.face_count()
        );
        Ok(mesh)
    }
}

impl<P, T> FromRawBuffers<P, T> for Mesh
where
    P: AsRef<[usize]>,
    T: Into<Point3<f64>>,
{
    type Error = MeshError;

    /// Constructs a mesh from a buffer of faces, each a ring of indices into
    /// a buffer of vertex positions.
    ///
    /// # Errors
    ///
    /// Returns `TopologyNotFound` if an index is out of bounds and otherwise
    /// fails like `Mesh::make_face_from_vertices` with `Duplicates::Reject`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bmesh::prelude::*;
    ///
    /// let mesh = Mesh::from_raw_buffers(
    ///     vec![[0usize, 1, 2, 3]],
    ///     vec![
    ///         [0.0, 0.0, 0.0],
    ///         [1.0, 0.0, 0.0],
    ///         [1.0, 1.0, 0.0],
    ///         [0.0, 1.0, 0.0],
    ///     ],
    /// )
    /// .unwrap();
    /// assert_eq!(4, mesh.edge_count());
    /// ```
    fn from_raw_buffers<I, J>(indices: I, vertices: J) -> Result<Self, Self::Error>
    where
        I: IntoIterator<Item = P>,
        J: IntoIterator<Item = T>,
    {
        let mut builder = MeshBuilder::new();
        let vertices: Vec<_> = vertices
            .into_iter()
            .map(|position| builder.insert_vertex(position))
            .collect();
        for face in indices {
            let perimeter = face
                .as_ref()
                .iter()
                .map(|index| vertices.get(*index).copied())
                .collect::<Option<SmallVec<[_; 4]>>>()
                .ok_or(MeshError::TopologyNotFound)?;
            builder.insert_face(&perimeter)?;
        }
        builder.commit()
    }
}

#[cfg(test)]
mod tests {
    use crate::mesh::{Duplicates, Mesh, MeshBuilder, MeshConfig, MeshError};
    use crate::transact::Transact;
    use crate::FromRawBuffers;

    #[test]
    fn build_from_raw_buffers() {
        // Octahedron.
        let mesh = Mesh::from_raw_buffers(
            vec![
                [0usize, 1, 4],
                [1, 2, 4],
                [2, 3, 4],
                [3, 0, 4],
                [1, 0, 5],
                [2, 1, 5],
                [3, 2, 5],
                [0, 3, 5],
            ],
            vec![
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [-1.0, 0.0, 0.0],
                [0.0, -1.0, 0.0],
                [0.0, 0.0, 1.0],
                [0.0, 0.0, -1.0],
            ],
        )
        .unwrap();

        assert_eq!(6, mesh.vertex_count());
        assert_eq!(12, mesh.edge_count());
        assert_eq!(8, mesh.face_count());
        assert!(mesh.edges().all(|edge| edge.is_manifold()));
        assert!(mesh.vertices().all(|vertex| vertex.valence() == 4));
    }

    #[test]
    fn index_out_of_bounds() {
        let result = Mesh::from_raw_buffers(vec![[0usize, 1, 7]], vec![[0.0; 3], [1.0, 0.0, 0.0]]);
        assert_eq!(Some(MeshError::TopologyNotFound), result.err());
    }

    #[test]
    fn builder_duplicate_policy() {
        let mut builder = MeshBuilder::new();
        let a = builder.insert_vertex([0.0, 0.0, 0.0]);
        let b = builder.insert_vertex([1.0, 0.0, 0.0]);
        let c = builder.insert_vertex([0.0, 1.0, 0.0]);
        let face = builder.insert_face(&[a, b, c]).unwrap();
        assert_eq!(Err(MeshError::FaceExists(face)), builder.insert_face(&[c, a, b]));

        let mut builder = builder.duplicates(Duplicates::Reuse);
        assert_eq!(Ok(face), builder.insert_face(&[b, c, a]));
        let mesh = builder.commit().unwrap();
        assert_eq!(1, mesh.face_count());
    }

    #[test]
    fn builder_with_config() {
        let config = MeshConfig::default()
            .with_cycle_limit(64)
            .with_validate_on_commit(true);
        let builder = MeshBuilder::with_config(config);
        let mesh = builder.commit().unwrap();
        assert_eq!(&config, mesh.config());
    }
}
