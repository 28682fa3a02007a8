//! Strongly typed, zero-cost handles into the track arenas.
//!
//! The graph is an arena of nodes, segments and signals addressed by index.
//! Edges store these handles rather than references, so cache propagation
//! can rewrite edge records freely.  All IDs are `Copy + Ord + Hash`.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as an arena index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a track node (graph vertex).
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a track segment (graph edge geometry).
    pub struct SegmentId(u32);
}

typed_id! {
    /// Index of a signal in the graph's signal arena.
    pub struct SignalId(u32);
}

typed_id! {
    /// Index of a vehicle in the simulation's fleet.
    pub struct VehicleId(u32);
}
