//! Element headers.
//!
//! Every element carries a header with its kind, a set of flags, and a
//! scratch index. Flags are free for use by algorithms; the kernel never
//! interprets them. Indices are only meaningful after a refresh (see
//! `Mesh::update_indices`) and are otherwise `-1` or stale.

use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ElementKind {
    Vertex,
    Edge,
    Loop,
    Face,
}

impl ElementKind {
    pub const ALL: [ElementKind; 4] = [
        ElementKind::Vertex,
        ElementKind::Edge,
        ElementKind::Loop,
        ElementKind::Face,
    ];

    pub fn mask(self) -> ElementMask {
        match self {
            ElementKind::Vertex => ElementMask::VERTEX,
            ElementKind::Edge => ElementMask::EDGE,
            ElementKind::Loop => ElementMask::LOOP,
            ElementKind::Face => ElementMask::FACE,
        }
    }
}

/// Set of element kinds.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ElementMask(u8);

impl ElementMask {
    pub const VERTEX: Self = ElementMask(1 << 0);
    pub const EDGE: Self = ElementMask(1 << 1);
    pub const LOOP: Self = ElementMask(1 << 2);
    pub const FACE: Self = ElementMask(1 << 3);
    pub const ALL: Self = ElementMask(0b1111);

    pub const fn empty() -> Self {
        ElementMask(0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn kinds(self) -> impl Iterator<Item = ElementKind> {
        ElementKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(kind.mask()))
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for ElementMask {
    type Output = Self;

    fn bitor(self, other: Self) -> Self::Output {
        ElementMask(self.0 | other.0)
    }
}

impl BitOrAssign for ElementMask {
    fn bitor_assign(&mut self, other: Self) {
        self.insert(other);
    }
}

impl From<ElementKind> for ElementMask {
    fn from(kind: ElementKind) -> Self {
        kind.mask()
    }
}

/// Per-element flag bits.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Flags(u8);

impl Flags {
    pub const SELECT: Self = Flags(1 << 0);
    pub const HIDDEN: Self = Flags(1 << 1);
    pub const SEAM: Self = Flags(1 << 2);
    pub const SHARP: Self = Flags(1 << 3);
    pub const INTERNAL: Self = Flags(1 << 4);

    pub const fn empty() -> Self {
        Flags(0)
    }

    pub const fn from_bits(bits: u8) -> Self {
        Flags(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    pub fn toggle(&mut self, other: Self) {
        self.0 ^= other.0;
    }

    pub fn set(&mut self, other: Self, value: bool) {
        if value {
            self.insert(other);
        }
        else {
            self.remove(other);
        }
    }
}

impl BitAnd for Flags {
    type Output = Self;

    fn bitand(self, other: Self) -> Self::Output {
        Flags(self.0 & other.0)
    }
}

impl BitOr for Flags {
    type Output = Self;

    fn bitor(self, other: Self) -> Self::Output {
        Flags(self.0 | other.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, other: Self) {
        self.insert(other);
    }
}

impl Not for Flags {
    type Output = Self;

    fn not(self) -> Self::Output {
        Flags(!self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Header {
    kind: ElementKind,
    pub flags: Flags,
    pub index: i32,
}

impl Header {
    pub fn new(kind: ElementKind) -> Self {
        Header {
            kind,
            flags: Flags::empty(),
            index: -1,
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use crate::entity::header::{ElementKind, ElementMask, Flags};

    #[test]
    fn flags_set_and_clear() {
        let mut flags = Flags::empty();
        flags.insert(Flags::SELECT | Flags::INTERNAL);
        assert!(flags.contains(Flags::SELECT));
        assert!(flags.contains(Flags::SELECT | Flags::INTERNAL));
        assert!(!flags.intersects(Flags::HIDDEN));

        flags.remove(Flags::SELECT);
        assert!(!flags.contains(Flags::SELECT));
        assert!(flags.contains(Flags::INTERNAL));

        flags.toggle(Flags::INTERNAL);
        assert!(flags.is_empty());
    }

    #[test]
    fn mask_kinds() {
        let mask = ElementMask::VERTEX | ElementMask::FACE;
        assert_eq!(
            vec![ElementKind::Vertex, ElementKind::Face],
            mask.kinds().collect::<Vec<_>>()
        );
        assert!(ElementMask::ALL.contains(mask));
    }
}
