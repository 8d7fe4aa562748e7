mod slot;

use std::fmt::Debug;
use std::hash::Hash;

use crate::entity::Entity;

pub use crate::entity::storage::slot::SlotStorage;

pub use slotmap::Key as SlotKey;

pub type InnerKey<K> = <K as Key>::Inner;

/// Opaque key of an entity.
///
/// Keys are generational: a key to a removed entity is never reused, so stale
/// keys fail lookups instead of aliasing new entities.
pub trait Key: Copy + Debug + Eq + Hash + Sized {
    type Inner: SlotKey;

    fn from_inner(key: Self::Inner) -> Self;

    fn into_inner(self) -> Self::Inner;

    /// Gets a key that never refers to an entity.
    fn null() -> Self {
        Self::from_inner(Self::Inner::null())
    }

    fn is_null(&self) -> bool {
        self.into_inner().is_null()
    }
}

pub trait Enumerate<E>
where
    E: Entity,
{
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn iter<'a>(&'a self) -> Box<dyn 'a + Iterator<Item = (E::Key, &E)>>;

    fn iter_mut<'a>(&'a mut self) -> Box<dyn 'a + Iterator<Item = (E::Key, &mut E)>>;

    fn keys<'a>(&'a self) -> Box<dyn 'a + Iterator<Item = E::Key>> {
        Box::new(self.iter().map(|(key, _)| key))
    }
}

pub trait Get<E>
where
    E: Entity,
{
    fn get(&self, key: &E::Key) -> Option<&E>;

    fn get_mut(&mut self, key: &E::Key) -> Option<&mut E>;

    fn contains_key(&self, key: &E::Key) -> bool {
        self.get(key).is_some()
    }
}

pub trait Insert<E>
where
    E: Entity,
{
    fn insert(&mut self, entity: E) -> E::Key;

    /// Inserts an entity constructed from its own key. This allows entities
    /// that link to themselves (such as detached loops) to be created
    /// in a single step.
    fn insert_with_key<F>(&mut self, f: F) -> E::Key
    where
        F: FnOnce(E::Key) -> E;
}

pub trait Remove<E>
where
    E: Entity,
{
    fn remove(&mut self, key: &E::Key) -> Option<E>;

    fn clear(&mut self);
}
