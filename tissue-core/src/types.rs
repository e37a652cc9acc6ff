use std::fmt;

/// Conversion between a typed identity and the slot index it names.
///
/// Identities are indices into the matching [`crate::arena::Arena`] and are
/// only meaningful within the lifetime of a given `Tissue` instance.
pub trait SlotId: Copy + Eq {
    fn from_index(index: usize) -> Self;
    fn index(self) -> usize;
}

macro_rules! slot_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub usize);

        impl SlotId for $name {
            #[inline]
            fn from_index(index: usize) -> Self {
                Self(index)
            }

            #[inline]
            fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

slot_id!(
    /// Identifier for a [`crate::vertex::Vertex`] slot.
    VertexId,
    "v"
);
slot_id!(
    /// Identifier for an [`crate::edge::Edge`] slot.
    EdgeId,
    "e"
);
slot_id!(
    /// Identifier for a [`crate::cell::Cell`] slot.
    CellId,
    "c"
);

/// The three kinds of entity stored by a tissue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Vertex,
    Edge,
    Cell,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Vertex => "vertex",
            EntityKind::Edge => "edge",
            EntityKind::Cell => "cell",
        };
        f.write_str(name)
    }
}
