//! `rn-sim`: sequential tick orchestrator for the railnet track engine.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   for vehicle in ascending VehicleId order:
//!     ① Reserve   queue empty or too short? reserve the next block from
//!                 the far end of the reserved track (BlockRouter).
//!     ② Hold      still short? slow to stop exactly at the boundary.
//!     ③ Advance   MotionIntegrator step, following the reserved segments.
//!     ④ Release   clear occupancy of segments left; tick off itinerary
//!                 stops passed.
//! ```
//!
//! Vehicles never run concurrently: a reservation and its occupancy marks
//! are complete before the next vehicle plans.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use rn_core::SimConfig;
//! use rn_sim::{Itinerary, NoopObserver, SimBuilder, VehicleSpec};
//!
//! let mut sim = SimBuilder::new(SimConfig::default())
//!     .graph(graph)
//!     .vehicle(VehicleSpec::new(segment, 0.0, true).itinerary(Itinerary::cyclic(stops)))
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;
pub mod vehicle;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{HaltReason, NoopObserver, SimObserver};
pub use sim::Sim;
pub use vehicle::{Itinerary, Vehicle, VehicleSpec};
