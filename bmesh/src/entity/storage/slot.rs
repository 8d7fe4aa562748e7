use slotmap::SlotMap;
use std::fmt::{self, Debug, Formatter};
use std::ops::{Index, IndexMut};

use crate::entity::storage::{Enumerate, Get, InnerKey, Insert, Key, Remove};
use crate::entity::Entity;

// Indexing a storage with a key that has no entity indicates corrupted
// topology rather than a user error, so it panics with the same message as
// `OptionExt::expect_consistent`.
const INCONSISTENT: &str = "internal error: mesh consistency violated";

pub struct SlotStorage<E>
where
    E: Entity,
{
    inner: SlotMap<InnerKey<E::Key>, E>,
}

impl<E> SlotStorage<E>
where
    E: Entity,
{
    pub fn with_capacity(capacity: usize) -> Self {
        SlotStorage {
            inner: SlotMap::with_capacity_and_key(capacity),
        }
    }
}

impl<E> Clone for SlotStorage<E>
where
    E: Clone + Entity,
{
    fn clone(&self) -> Self {
        SlotStorage {
            inner: self.inner.clone(),
        }
    }
}

impl<E> Debug for SlotStorage<E>
where
    E: Debug + Entity,
{
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.inner.iter()).finish()
    }
}

impl<E> Default for SlotStorage<E>
where
    E: Entity,
{
    fn default() -> Self {
        SlotStorage {
            inner: Default::default(),
        }
    }
}

impl<E> Enumerate<E> for SlotStorage<E>
where
    E: Entity,
{
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn iter<'a>(&'a self) -> Box<dyn 'a + Iterator<Item = (E::Key, &E)>> {
        Box::new(
            self.inner
                .iter()
                .map(|(key, entity)| (E::Key::from_inner(key), entity)),
        )
    }

    fn iter_mut<'a>(&'a mut self) -> Box<dyn 'a + Iterator<Item = (E::Key, &mut E)>> {
        Box::new(
            self.inner
                .iter_mut()
                .map(|(key, entity)| (E::Key::from_inner(key), entity)),
        )
    }
}

impl<E> Get<E> for SlotStorage<E>
where
    E: Entity,
{
    fn get(&self, key: &E::Key) -> Option<&E> {
        self.inner.get(key.into_inner())
    }

    fn get_mut(&mut self, key: &E::Key) -> Option<&mut E> {
        self.inner.get_mut(key.into_inner())
    }
}

impl<E> Insert<E> for SlotStorage<E>
where
    E: Entity,
{
    fn insert(&mut self, entity: E) -> E::Key {
        E::Key::from_inner(self.inner.insert(entity))
    }

    fn insert_with_key<F>(&mut self, f: F) -> E::Key
    where
        F: FnOnce(E::Key) -> E,
    {
        E::Key::from_inner(self.inner.insert_with_key(|key| f(E::Key::from_inner(key))))
    }
}

impl<E> Remove<E> for SlotStorage<E>
where
    E: Entity,
{
    fn remove(&mut self, key: &E::Key) -> Option<E> {
        self.inner.remove(key.into_inner())
    }

    fn clear(&mut self) {
        self.inner.clear();
    }
}

impl<E> Index<E::Key> for SlotStorage<E>
where
    E: Entity,
{
    type Output = E;

    fn index(&self, key: E::Key) -> &Self::Output {
        self.inner.get(key.into_inner()).expect(INCONSISTENT)
    }
}

impl<E> IndexMut<E::Key> for SlotStorage<E>
where
    E: Entity,
{
    fn index_mut(&mut self, key: E::Key) -> &mut Self::Output {
        self.inner.get_mut(key.into_inner()).expect(INCONSISTENT)
    }
}
