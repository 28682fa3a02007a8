//! `rn-route`: signal block routing and reservation.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`path`]     | `ReservedPath`                                              |
//! | [`target`]   | `SchedulingTarget`, `TargetSource`, `NoTargets`             |
//! | [`explore`]  | `Origin`, `explore`, `Exploration`, `Stop`                  |
//! | [`router`]   | `BlockRouter`, `TravelDirection`                            |
//!
//! Routing failures are not errors: an impossible or conflicting request
//! yields an empty `ReservedPath` and the vehicle holds.

mod estimate;
pub mod explore;
pub mod path;
pub mod router;
pub mod target;


pub use explore::{Exploration, Origin, Stop, StopKind, explore};
pub use path::ReservedPath;
pub use router::{BlockRouter, TravelDirection};
pub use target::{NoTargets, SchedulingTarget, TargetSource};
