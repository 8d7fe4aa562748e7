//! Euler operators and scoped edit sessions.
//!
//! The Euler operators are implemented as inherent functions of `Mesh` in the
//! `vertex`, `edge`, and `face` submodules. This module provides `Mutation`,
//! an edit session that brackets a batch of operators with hooks and
//! optionally validates the mesh when it is committed.

mod edge;
mod face;
mod vertex;

use derivative::Derivative;
use log::{debug, warn};
use std::ops::{Deref, DerefMut};

use crate::entity::header::ElementMask;
use crate::mesh::{Mesh, MeshError};
use crate::transact::{Drain, Transact};

pub use crate::mesh::mutation::face::Duplicates;

/// Hook that brackets an edit session.
///
/// `begin` is called when the hook is attached to a session and `end` is
/// called when the session ends, whether it is committed, aborted, or
/// dropped. Hooks end in the reverse order in which they began.
pub trait EditHook {
    fn begin(&mut self, mesh: &mut Mesh) {
        let _ = mesh;
    }

    fn end(&mut self, mesh: &mut Mesh) {
        let _ = mesh;
    }
}

/// Hook that updates scratch indices when an edit session ends.
#[derive(Clone, Copy, Debug)]
pub struct IndexRefresh(pub ElementMask);

impl Default for IndexRefresh {
    fn default() -> Self {
        IndexRefresh(ElementMask::ALL)
    }
}

impl EditHook for IndexRefresh {
    fn end(&mut self, mesh: &mut Mesh) {
        mesh.update_indices(self.0);
    }
}

/// Scoped edit session.
///
/// A `Mutation` dereferences to its `Mesh`, so all operators are available
/// through it. Committing the session ends its hooks and, if
/// `MeshConfig::validate_on_commit` is set (or the `check-invariants` feature
/// is enabled), validates the mesh. Operators apply immediately: aborting a
/// session ends its hooks but does not roll back any changes.
///
/// # Examples
///
/// ```rust
/// use bmesh::mesh::{Duplicates, ElementMask, IndexRefresh, Mesh};
/// use bmesh::prelude::*;
///
/// let mut mesh = Mesh::new();
/// let mut mutation = mesh.edit().with_hook(IndexRefresh(ElementMask::VERTEX));
/// let a = mutation.make_vertex([0.0, 0.0, 0.0]);
/// let b = mutation.make_vertex([1.0, 0.0, 0.0]);
/// let c = mutation.make_vertex([0.0, 1.0, 0.0]);
/// mutation
///     .make_face_from_vertices(&[a, b, c], Duplicates::Reject)
///     .unwrap();
/// let mesh = mutation.commit().unwrap();
///
/// assert_eq!(1, mesh.face_count());
/// assert!(mesh.index(a).unwrap() >= 0);
/// ```
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Mutation<'a> {
    mesh: Option<&'a mut Mesh>,
    #[derivative(Debug = "ignore")]
    hooks: Vec<Box<dyn 'a + EditHook>>,
}

impl<'a> Mutation<'a> {
    pub(in crate::mesh) fn new(mesh: &'a mut Mesh) -> Self {
        debug!("began mesh edit");
        Mutation {
            mesh: Some(mesh),
            hooks: Vec::new(),
        }
    }

    /// Attaches a hook to the session and begins it.
    pub fn with_hook<H>(mut self, mut hook: H) -> Self
    where
        H: 'a + EditHook,
    {
        hook.begin(&mut *self);
        self.hooks.push(Box::new(hook));
        self
    }

    fn end(&mut self) -> Option<&'a mut Mesh> {
        let mesh = self.try_drain()?;
        for hook in self.hooks.iter_mut().rev() {
            hook.end(mesh);
        }
        self.hooks.clear();
        Some(mesh)
    }
}

impl<'a> Deref for Mutation<'a> {
    type Target = Mesh;

    fn deref(&self) -> &Self::Target {
        self.mesh.as_deref().expect("drained")
    }
}

impl<'a> DerefMut for Mutation<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.mesh.as_deref_mut().expect("drained")
    }
}

impl<'a> Drain<&'a mut Mesh> for Mutation<'a> {
    fn as_option_mut(&mut self) -> &mut Option<&'a mut Mesh> {
        &mut self.mesh
    }
}

impl<'a> Drop for Mutation<'a> {
    fn drop(&mut self) {
        if self.end().is_some() {
            debug!("dropped mesh edit");
        }
    }
}

impl<'a> Transact<&'a mut Mesh> for Mutation<'a> {
    type Output = &'a mut Mesh;
    type Error = MeshError;

    fn commit(mut self) -> Result<Self::Output, Self::Error> {
        let mesh = self.end().expect("drained");
        if mesh.config().is_validating() {
            if let Err(error) = mesh.validate() {
                warn!("mesh failed validation on commit: {}", error);
                return Err(error);
            }
        }
        debug!("committed mesh edit");
        Ok(mesh)
    }

    fn abort(mut self) {
        if self.end().is_some() {
            debug!("aborted mesh edit");
        }
    }
}
