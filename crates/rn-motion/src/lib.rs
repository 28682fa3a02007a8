//! `rn-motion`: continuous vehicle motion along the track graph.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                      |
//! |----------------|---------------------------------------------------------------|
//! | [`state`]      | `MotionState`, `MotionHistory` and its samples                |
//! | [`controller`] | `TrackController` trait, `PathFollower`, `RandomController`   |
//! | [`engine`]     | `MotionIntegrator`: tick step, boundary crossing, poses      |
//! | [`error`]      | `MotionError`, `MotionResult<T>`                              |
//!
//! # Motion model
//!
//! A vehicle is a scalar distance along its current segment plus a travel
//! sign.  Simulation advances it in fixed steps; rendering asks for poses at
//! arbitrary times and gets them by interpolating the recorded
//! `(segment, time)` and `(distance, time)` samples, so frame rate and tick
//! rate are independent.

pub mod controller;
pub mod engine;
pub mod error;
pub mod state;


pub use controller::{PathFollower, RandomController, TrackController};
pub use engine::{Advance, MotionIntegrator, Pose};
pub use error::{MotionError, MotionResult};
pub use state::{DistanceSample, MotionHistory, MotionState, SegmentSample};
