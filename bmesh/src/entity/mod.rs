pub mod header;
pub mod storage;
pub mod view;

use crate::entity::header::{ElementKind, Header};
use crate::entity::storage::Key;

/// Element of a mesh that is stored in its own arena and addressed by a key.
pub trait Entity: 'static + Sized {
    type Key: Key;

    const KIND: ElementKind;

    fn header(&self) -> &Header;

    fn header_mut(&mut self) -> &mut Header;
}
