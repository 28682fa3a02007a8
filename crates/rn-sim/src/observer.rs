//! Simulation observer trait for progress reporting and data collection.

use rn_core::{Tick, VehicleId};
use rn_route::ReservedPath;

/// Why a vehicle stopped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HaltReason {
    /// No reservation covered the distance it would have travelled; it was
    /// held at the end of what it had.
    NoReservation,
    /// The track ended.
    DeadEnd,
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, moving: usize) {
///         if tick.0 % self.interval == 0 {
///             println!("tick {tick}: {moving} vehicles moving");
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any vehicle moves.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick.
    ///
    /// `moving` is the number of vehicles that covered any distance this
    /// tick.
    fn on_tick_end(&mut self, _tick: Tick, _moving: usize) {}

    /// Called after every reservation attempt.  `path` is empty when the
    /// attempt failed.
    fn on_reservation(&mut self, _tick: Tick, _vehicle: VehicleId, _path: &ReservedPath) {}

    /// Called when a vehicle is brought to a stop.
    fn on_halt(&mut self, _tick: Tick, _vehicle: VehicleId, _reason: HaltReason) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
