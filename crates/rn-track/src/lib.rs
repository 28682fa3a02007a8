//! `rn-track`: track geometry, the node graph, signals and topology editing.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                      |
//! |--------------|---------------------------------------------------------------|
//! | [`shape`]    | `TrackShape` (straight / circular arc), `ShapeKind`           |
//! | [`segment`]  | `TrackSegment`: geometry, occupancy, removal stamp            |
//! | [`node`]     | `TrackNode`, `Side`, `Edge`, `JunctionReach`, `NodeKind`      |
//! | [`graph`]    | `TrackGraph` arena, junction-cache propagation, verification  |
//! | [`signal`]   | `Signal`, placement, lazy sight, visibility invalidation      |
//! | [`editor`]   | `extend`, `connect`, `split`, `remove`                        |
//! | [`error`]    | `TrackError`, `TrackResult<T>`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod editor;
pub mod error;
pub mod graph;
mod index;
pub mod node;
pub mod segment;
pub mod shape;
pub mod signal;

#[cfg(test)]
mod tests;

pub use editor::{Removal, Split, TrackRun};
pub use error::{TrackError, TrackResult};
pub use graph::TrackGraph;
pub use node::{Edge, JunctionReach, NodeKind, Side, TrackNode};
pub use segment::TrackSegment;
pub use shape::{ShapeKind, TrackShape};
pub use signal::Signal;
