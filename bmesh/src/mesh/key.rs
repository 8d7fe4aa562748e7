//! Keys for mesh storage.
//!
//! This module defines opaque keys for looking up mesh elements in storage.
//! Keys do not expose their underlying data and enforce that lookups for a
//! particular element use an appropriate key type. `ElementKey` erases the
//! kind of a key so that operations over headers can accept any element.

use slotmap::DefaultKey;

use crate::entity::header::ElementKind;
use crate::entity::storage::Key;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct VertexKey(DefaultKey);

impl Key for VertexKey {
    type Inner = DefaultKey;

    fn from_inner(key: Self::Inner) -> Self {
        VertexKey(key)
    }

    fn into_inner(self) -> Self::Inner {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EdgeKey(DefaultKey);

impl Key for EdgeKey {
    type Inner = DefaultKey;

    fn from_inner(key: Self::Inner) -> Self {
        EdgeKey(key)
    }

    fn into_inner(self) -> Self::Inner {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct LoopKey(DefaultKey);

impl Key for LoopKey {
    type Inner = DefaultKey;

    fn from_inner(key: Self::Inner) -> Self {
        LoopKey(key)
    }

    fn into_inner(self) -> Self::Inner {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FaceKey(DefaultKey);

impl Key for FaceKey {
    type Inner = DefaultKey;

    fn from_inner(key: Self::Inner) -> Self {
        FaceKey(key)
    }

    fn into_inner(self) -> Self::Inner {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ElementKey {
    Vertex(VertexKey),
    Edge(EdgeKey),
    Loop(LoopKey),
    Face(FaceKey),
}

impl ElementKey {
    pub fn kind(&self) -> ElementKind {
        match *self {
            ElementKey::Vertex(_) => ElementKind::Vertex,
            ElementKey::Edge(_) => ElementKind::Edge,
            ElementKey::Loop(_) => ElementKind::Loop,
            ElementKey::Face(_) => ElementKind::Face,
        }
    }
}

impl From<VertexKey> for ElementKey {
    fn from(key: VertexKey) -> Self {
        ElementKey::Vertex(key)
    }
}

impl From<EdgeKey> for ElementKey {
    fn from(key: EdgeKey) -> Self {
        ElementKey::Edge(key)
    }
}

impl From<LoopKey> for ElementKey {
    fn from(key: LoopKey) -> Self {
        ElementKey::Loop(key)
    }
}

impl From<FaceKey> for ElementKey {
    fn from(key: FaceKey) -> Self {
        ElementKey::Face(key)
    }
}
