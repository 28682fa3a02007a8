//! `rn-core`: foundational types for the `railnet` track engine.
//!
//! This crate is a dependency of every other `rn-*` crate.  It has no `rn-*`
//! dependencies and only a handful of external ones (`glam`, `rand`,
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `SegmentId`, `SignalId`, `VehicleId`        |
//! | [`geom`]        | `DVec3` re-export, horizontal-plane helpers           |
//! | [`time`]        | `Tick`, `SimTime`, `SimClock`                         |
//! | [`rng`]         | `VehicleRng` (per-vehicle)                            |
//! | [`config`]      | `TrackConfig`, `RouterConfig`, `MotionConfig`, `SimConfig` |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geom;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{MotionConfig, RouterConfig, SimConfig, TrackConfig};
pub use error::{CoreError, CoreResult};
pub use geom::{DVec2, DVec3};
pub use ids::{NodeId, SegmentId, SignalId, VehicleId};
pub use rng::VehicleRng;
pub use time::{SimClock, SimTime, Tick};
