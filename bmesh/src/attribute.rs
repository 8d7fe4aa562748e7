//! Per-element attribute layers.
//!
//! Each kind of element has a `LayerSet`: an ordered collection of named,
//! typed layers that map element keys to values. Layers are independent of
//! the topology of a mesh. The Euler operators copy, interpolate, and remove
//! values as elements are created and destroyed, but never read them.
//!
//! # Examples
//!
//! Interpolating a per-vertex weight when splitting an edge:
//!
//! ```rust
//! use bmesh::mesh::Mesh;
//!
//! let mut mesh = Mesh::new();
//! let weight = mesh
//!     .attributes_mut()
//!     .vertices
//!     .add_layer::<f64>("weight")
//!     .unwrap();
//! let a = mesh.make_vertex([0.0, 0.0, 0.0]);
//! let b = mesh.make_vertex([1.0, 0.0, 0.0]);
//! mesh.attributes_mut().vertices.set(weight, a, 0.0).unwrap();
//! mesh.attributes_mut().vertices.set(weight, b, 1.0).unwrap();
//!
//! let ab = mesh.make_edge(a, b, false).unwrap();
//! let (m, _) = mesh.split_edge(ab, a, 0.25);
//! assert_eq!(Some(&0.25), mesh.attributes().vertices.get(weight, m).unwrap());
//! ```

use derivative::Derivative;
use nalgebra::{Point, SVector};
use slotmap::SecondaryMap;
use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use thiserror::Error;

use crate::entity::storage::{InnerKey, Key};
use crate::mesh::{EdgeKey, FaceKey, LoopKey, VertexKey};

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum AttributeError {
    #[error("attribute layer not found")]
    LayerNotFound,
    #[error("attribute layer has a different type")]
    TypeMismatch,
    #[error("attribute layer already exists: {0}")]
    LayerConflict(String),
}

/// Value stored in an attribute layer.
///
/// `interpolate` combines weighted samples into a new value when elements
/// are split or merged. The default implementation copies the sample with
/// the greatest weight, which suits discrete data like identifiers and
/// flags. Numeric and vector types blend their samples.
pub trait Attribute: Clone + 'static {
    fn interpolate(samples: &[(&Self, f64)]) -> Option<Self> {
        samples
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(value, _)| (*value).clone())
    }
}

macro_rules! impl_discrete_attribute {
    ($($t:ty),* $(,)?) => {$(
        impl Attribute for $t {}
    )*};
}
impl_discrete_attribute!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, String);

impl Attribute for f32 {
    fn interpolate(samples: &[(&Self, f64)]) -> Option<Self> {
        (!samples.is_empty()).then(|| {
            samples
                .iter()
                .map(|(value, weight)| f64::from(**value) * weight)
                .sum::<f64>() as f32
        })
    }
}

impl Attribute for f64 {
    fn interpolate(samples: &[(&Self, f64)]) -> Option<Self> {
        (!samples.is_empty()).then(|| samples.iter().map(|(value, weight)| **value * weight).sum())
    }
}

impl<const N: usize> Attribute for [f32; N] {
    fn interpolate(samples: &[(&Self, f64)]) -> Option<Self> {
        (!samples.is_empty()).then(|| {
            let mut output = [0.0f32; N];
            for (value, weight) in samples {
                for (output, value) in output.iter_mut().zip(value.iter()) {
                    *output += (f64::from(*value) * weight) as f32;
                }
            }
            output
        })
    }
}

impl<const N: usize> Attribute for [f64; N] {
    fn interpolate(samples: &[(&Self, f64)]) -> Option<Self> {
        (!samples.is_empty()).then(|| {
            let mut output = [0.0; N];
            for (value, weight) in samples {
                for (output, value) in output.iter_mut().zip(value.iter()) {
                    *output += value * weight;
                }
            }
            output
        })
    }
}

impl<const D: usize> Attribute for SVector<f64, D> {
    fn interpolate(samples: &[(&Self, f64)]) -> Option<Self> {
        (!samples.is_empty()).then(|| {
            samples
                .iter()
                .fold(SVector::<f64, D>::zeros(), |sum, (value, weight)| {
                    sum + *value * *weight
                })
        })
    }
}

impl<const D: usize> Attribute for Point<f64, D> {
    fn interpolate(samples: &[(&Self, f64)]) -> Option<Self> {
        (!samples.is_empty()).then(|| {
            Point::from(
                samples
                    .iter()
                    .fold(SVector::<f64, D>::zeros(), |sum, (value, weight)| {
                        sum + value.coords * *weight
                    }),
            )
        })
    }
}

trait Layer<K>: Any
where
    K: Key + 'static,
{
    fn name(&self) -> &str;

    fn copy(&mut self, from: K, to: K);

    fn interpolate(&mut self, samples: &[(K, f64)], to: K);

    fn remove(&mut self, key: K);

    fn clear(&mut self);

    fn clone_layer(&self) -> Box<dyn Layer<K>>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct TypedLayer<K, T>
where
    K: Key,
{
    name: String,
    values: SecondaryMap<InnerKey<K>, T>,
}

impl<K, T> Layer<K> for TypedLayer<K, T>
where
    K: Key + 'static,
    T: Attribute,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn copy(&mut self, from: K, to: K) {
        match self.values.get(from.into_inner()).cloned() {
            Some(value) => {
                self.values.insert(to.into_inner(), value);
            }
            None => {
                self.values.remove(to.into_inner());
            }
        }
    }

    fn interpolate(&mut self, samples: &[(K, f64)], to: K) {
        let mut samples: Vec<_> = samples
            .iter()
            .filter_map(|(key, weight)| {
                self.values
                    .get(key.into_inner())
                    .map(|value| (value, *weight))
            })
            .collect();
        // Samples without a value are dropped, so the remaining weights are
        // rescaled to sum to one. If they sum to zero, they are weighted
        // equally.
        let total: f64 = samples.iter().map(|(_, weight)| weight).sum();
        let n = samples.len() as f64;
        for (_, weight) in samples.iter_mut() {
            *weight = if total > f64::EPSILON { *weight / total } else { 1.0 / n };
        }
        match T::interpolate(&samples) {
            Some(value) => {
                self.values.insert(to.into_inner(), value);
            }
            None => {
                self.values.remove(to.into_inner());
            }
        }
    }

    fn remove(&mut self, key: K) {
        self.values.remove(key.into_inner());
    }

    fn clear(&mut self) {
        self.values.clear();
    }

    fn clone_layer(&self) -> Box<dyn Layer<K>> {
        Box::new(TypedLayer::<K, T> {
            name: self.name.clone(),
            values: self.values.clone(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Typed handle to a layer in a `LayerSet`.
#[derive(Derivative)]
#[derivative(
    Clone(bound = ""),
    Copy(bound = ""),
    Debug(bound = ""),
    Eq(bound = ""),
    Hash(bound = ""),
    PartialEq(bound = "")
)]
pub struct LayerId<T> {
    index: usize,
    #[derivative(Debug = "ignore")]
    phantom: PhantomData<fn() -> T>,
}

/// Attribute layers for one kind of element.
pub struct LayerSet<K>
where
    K: Key + 'static,
{
    layers: Vec<Box<dyn Layer<K>>>,
}

impl<K> LayerSet<K>
where
    K: Key + 'static,
{
    /// Adds an empty layer.
    ///
    /// # Errors
    ///
    /// Returns `AttributeError::LayerConflict` if a layer with the same name
    /// already exists.
    pub fn add_layer<T>(&mut self, name: impl Into<String>) -> Result<LayerId<T>, AttributeError>
    where
        T: Attribute,
    {
        let name = name.into();
        if self.layers.iter().any(|layer| layer.name() == name) {
            return Err(AttributeError::LayerConflict(name));
        }
        self.layers.push(Box::new(TypedLayer::<K, T> {
            name,
            values: SecondaryMap::new(),
        }));
        Ok(LayerId {
            index: self.layers.len() - 1,
            phantom: PhantomData,
        })
    }

    pub fn layer_by_name<T>(&self, name: &str) -> Result<LayerId<T>, AttributeError>
    where
        T: Attribute,
    {
        let index = self
            .layers
            .iter()
            .position(|layer| layer.name() == name)
            .ok_or(AttributeError::LayerNotFound)?;
        let id = LayerId {
            index,
            phantom: PhantomData,
        };
        self.typed(id).map(|_| id)
    }

    /// Gets an iterator over the names of the layers in the order in which
    /// they were added.
    pub fn names(&self) -> impl '_ + Iterator<Item = &str> {
        self.layers.iter().map(|layer| layer.name())
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get<T>(&self, id: LayerId<T>, key: K) -> Result<Option<&T>, AttributeError>
    where
        T: Attribute,
    {
        self.typed(id)
            .map(|layer| layer.values.get(key.into_inner()))
    }

    pub fn get_mut<T>(&mut self, id: LayerId<T>, key: K) -> Result<Option<&mut T>, AttributeError>
    where
        T: Attribute,
    {
        self.typed_mut(id)
            .map(|layer| layer.values.get_mut(key.into_inner()))
    }

    /// Sets the value of an element, returning its previous value if any.
    pub fn set<T>(&mut self, id: LayerId<T>, key: K, value: T) -> Result<Option<T>, AttributeError>
    where
        T: Attribute,
    {
        self.typed_mut(id)
            .map(|layer| layer.values.insert(key.into_inner(), value))
    }

    /// Removes the value of an element, returning it if any.
    pub fn unset<T>(&mut self, id: LayerId<T>, key: K) -> Result<Option<T>, AttributeError>
    where
        T: Attribute,
    {
        self.typed_mut(id)
            .map(|layer| layer.values.remove(key.into_inner()))
    }

    pub(crate) fn copy(&mut self, from: K, to: K) {
        for layer in &mut self.layers {
            layer.copy(from, to);
        }
    }

    /// Interpolates the values of weighted samples into `to`.
    ///
    /// `to` may also be a sample.
    pub(crate) fn interpolate(&mut self, samples: &[(K, f64)], to: K) {
        for layer in &mut self.layers {
            layer.interpolate(samples, to);
        }
    }

    pub(crate) fn remove(&mut self, key: K) {
        for layer in &mut self.layers {
            layer.remove(key);
        }
    }

    /// Removes all values but keeps the layers.
    pub(crate) fn clear(&mut self) {
        for layer in &mut self.layers {
            layer.clear();
        }
    }

    fn typed<T>(&self, id: LayerId<T>) -> Result<&TypedLayer<K, T>, AttributeError>
    where
        T: Attribute,
    {
        self.layers
            .get(id.index)
            .ok_or(AttributeError::LayerNotFound)?
            .as_any()
            .downcast_ref::<TypedLayer<K, T>>()
            .ok_or(AttributeError::TypeMismatch)
    }

    fn typed_mut<T>(&mut self, id: LayerId<T>) -> Result<&mut TypedLayer<K, T>, AttributeError>
    where
        T: Attribute,
    {
        self.layers
            .get_mut(id.index)
            .ok_or(AttributeError::LayerNotFound)?
            .as_any_mut()
            .downcast_mut::<TypedLayer<K, T>>()
            .ok_or(AttributeError::TypeMismatch)
    }
}

impl<K> Clone for LayerSet<K>
where
    K: Key + 'static,
{
    fn clone(&self) -> Self {
        LayerSet {
            layers: self.layers.iter().map(|layer| layer.clone_layer()).collect(),
        }
    }
}

impl<K> Debug for LayerSet<K>
where
    K: Key + 'static,
{
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.names()).finish()
    }
}

impl<K> Default for LayerSet<K>
where
    K: Key + 'static,
{
    fn default() -> Self {
        LayerSet { layers: Vec::new() }
    }
}

/// Attribute layers of a mesh.
#[derive(Clone, Debug, Default)]
pub struct Attributes {
    pub vertices: LayerSet<VertexKey>,
    pub edges: LayerSet<EdgeKey>,
    pub loops: LayerSet<LoopKey>,
    pub faces: LayerSet<FaceKey>,
}

impl Attributes {
    pub(crate) fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.loops.clear();
        self.faces.clear();
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use nalgebra::{Point3, Vector2};

    use crate::attribute::{Attribute, AttributeError, LayerSet};
    use crate::entity::view::ClosedView;
    use crate::mesh::{Duplicates, Mesh, VertexKey};

    #[test]
    fn discrete_values_copy_heaviest_sample() {
        assert_eq!(Some(7u32), u32::interpolate(&[(&3, 0.25), (&7, 0.75)]));
        assert_eq!(None, u32::interpolate(&[]));
    }

    #[test]
    fn vectors_blend_samples() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(1.0, 2.0);
        assert_abs_diff_eq!(
            Vector2::new(0.5, 1.0),
            <Vector2<f64> as Attribute>::interpolate(&[(&a, 0.5), (&b, 0.5)]).unwrap()
        );
        let p = Point3::new(2.0, 0.0, 0.0);
        let q = Point3::new(0.0, 2.0, 0.0);
        assert_abs_diff_eq!(
            Point3::new(1.5, 0.5, 0.0),
            <Point3<f64> as Attribute>::interpolate(&[(&p, 0.75), (&q, 0.25)]).unwrap()
        );
    }

    #[test]
    fn layers_are_named_and_typed() {
        let mut layers = LayerSet::<VertexKey>::default();
        let id = layers.add_layer::<f32>("weight").unwrap();
        assert_eq!(
            Err(AttributeError::LayerConflict("weight".to_owned())),
            layers.add_layer::<f64>("weight").map(|_| ())
        );
        assert_eq!(Ok(id), layers.layer_by_name::<f32>("weight"));
        assert_eq!(
            Err(AttributeError::TypeMismatch),
            layers.layer_by_name::<u8>("weight").map(|_| ())
        );
        assert_eq!(
            Err(AttributeError::LayerNotFound),
            layers.layer_by_name::<f32>("color").map(|_| ())
        );
        assert_eq!(vec!["weight"], layers.names().collect::<Vec<_>>());
    }

    #[test]
    fn values_follow_elements() {
        let mut mesh = Mesh::new();
        let id = mesh
            .attributes_mut()
            .vertices
            .add_layer::<u32>("id")
            .unwrap();
        let a = mesh.make_vertex([0.0, 0.0, 0.0]);
        assert_eq!(Ok(None), mesh.attributes_mut().vertices.set(id, a, 7));
        *mesh.attributes_mut().vertices.get_mut(id, a).unwrap().unwrap() += 1;
        assert_eq!(Ok(Some(&8)), mesh.attributes().vertices.get(id, a));

        mesh.kill_vertex(a);
        assert_eq!(Ok(None), mesh.attributes().vertices.get(id, a));
    }

    #[test]
    fn split_face_copies_loop_values() {
        let mut mesh = crate::mesh::tests::grid(1);
        let uv = mesh
            .attributes_mut()
            .loops
            .add_layer::<Vector2<f64>>("uv")
            .unwrap();
        let face = mesh.face_keys().next().unwrap();
        let loops: Vec<_> = mesh.face(face).unwrap().loops().collect();
        for lp in loops {
            let position = *mesh.vertex(mesh.face_loop(lp).unwrap().vertex()).unwrap().position();
            mesh.attributes_mut()
                .loops
                .set(uv, lp, position.xy().coords)
                .unwrap();
        }
        let vertices: Vec<_> = mesh.face(face).unwrap().vertices().collect();

        mesh.split_face(face, vertices[0], vertices[2]);
        for lp in mesh.loops() {
            let position = *mesh.vertex(lp.vertex()).unwrap().position();
            assert_eq!(
                Some(&position.xy().coords),
                mesh.attributes().loops.get(uv, lp.key()).unwrap()
            );
        }
    }

    #[test]
    fn split_edge_interpolates_loop_values() {
        let mut mesh = Mesh::new();
        let uv = mesh
            .attributes_mut()
            .loops
            .add_layer::<[f32; 2]>("uv")
            .unwrap();
        let a = mesh.make_vertex([0.0, 0.0, 0.0]);
        let b = mesh.make_vertex([1.0, 0.0, 0.0]);
        let c = mesh.make_vertex([0.0, 1.0, 0.0]);
        let face = mesh
            .make_face_from_vertices(&[a, b, c], Duplicates::Reject)
            .unwrap();
        let loops: Vec<_> = mesh.face(face).unwrap().loops().collect();
        for (lp, value) in loops.into_iter().zip([[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]) {
            mesh.attributes_mut().loops.set(uv, lp, value).unwrap();
        }

        let ab = mesh.edge_between(a, b).unwrap();
        let (m, _) = mesh.split_edge(ab, a, 0.5);
        let lp = mesh.face(face).unwrap().loop_at_vertex(m).unwrap();
        assert_eq!(Ok(Some(&[0.5, 0.0])), mesh.attributes().loops.get(uv, lp));
    }

    #[test]
    fn missing_samples_do_not_scale_values() {
        let mut mesh = Mesh::new();
        let weight = mesh
            .attributes_mut()
            .vertices
            .add_layer::<f64>("weight")
            .unwrap();
        let a = mesh.make_vertex([0.0, 0.0, 0.0]);
        let b = mesh.make_vertex([1.0, 0.0, 0.0]);
        mesh.attributes_mut().vertices.set(weight, a, 2.0).unwrap();

        let ab = mesh.make_edge(a, b, false).unwrap();
        let (m, _) = mesh.split_edge(ab, a, 0.25);
        assert_abs_diff_eq!(
            2.0,
            *mesh.attributes().vertices.get(weight, m).unwrap().unwrap()
        );

        // The only valued sample has no weight.
        let c = mesh.make_vertex([0.0, 1.0, 0.0]);
        let bc = mesh.make_edge(b, c, false).unwrap();
        mesh.attributes_mut().vertices.set(weight, c, 3.0).unwrap();
        let (n, _) = mesh.split_edge(bc, b, 0.0);
        assert_abs_diff_eq!(
            3.0,
            *mesh.attributes().vertices.get(weight, n).unwrap().unwrap()
        );
    }
}
