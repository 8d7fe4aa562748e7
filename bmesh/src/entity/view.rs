use crate::entity::storage::Key;
use crate::entity::Entity;

/// View of an entity that is closed over its key.
pub trait ClosedView {
    type Key: Key;
    type Entity: Entity<Key = Self::Key>;

    fn key(&self) -> Self::Key;
}
