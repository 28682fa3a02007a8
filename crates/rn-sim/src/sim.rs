//! The `Sim` struct and its tick loop.

use log::debug;

use rn_core::{SimClock, SimConfig, Tick};
use rn_motion::MotionIntegrator;
use rn_route::{BlockRouter, Origin, TargetSource};
use rn_track::TrackGraph;

use crate::vehicle::Vehicle;
use crate::{HaltReason, SimObserver, SimResult};

/// Upper bound on reservations one vehicle makes in a single tick.  Each
/// reservation ends at a signal, so this limits how many blocks a vehicle
/// can claim while catching up with its own speed.
const MAX_RESERVATIONS_PER_TICK: usize = 8;

/// Fraction of the remaining distance a held vehicle covers, keeping it
/// strictly short of the boundary it may not cross.
const HOLD_MARGIN: f64 = 1.0 - 1e-12;

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// Each tick processes vehicles strictly one after another in ascending
/// `VehicleId` order:
///
/// 1. **Reserve**: while the vehicle has no reserved track ahead, or less
///    than it would cover this tick, reserve the next block from the far
///    end of what it holds, routing toward its itinerary.
/// 2. **Hold**: if it would still run past its reservation, slow it so it
///    stops at the boundary.
/// 3. **Advance**: integrate motion, following the reserved segments.
/// 4. **Release**: clear the occupancy of every segment left behind and
///    tick off itinerary stops passed on the way.
///
/// Reservation locks segments before the next vehicle plans, so no vehicle
/// is ever granted a segment that another holds.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    pub config: SimConfig,

    /// Simulation clock; tracks the current tick and maps it to sim time.
    pub clock: SimClock,

    /// Track layout and occupancy.  Editing it between ticks is allowed;
    /// removing a segment a vehicle stands on makes the next tick fail.
    pub graph: TrackGraph,

    /// Fleet, indexed by `VehicleId`.
    pub vehicles: Vec<Vehicle>,

    pub router: BlockRouter,

    pub integrator: MotionIntegrator,
}

impl Sim {
    // ── Public API ────────────────────────────────────────────────────────

    /// Tick at which [`run`](Self::run) stops.
    pub fn end_tick(&self) -> Tick {
        Tick(self.config.total_ticks)
    }

    /// Run the simulation from the current tick to [`end_tick`](Self::end_tick).
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.current_tick < self.end_tick() {
            self.tick(observer)?;
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.tick(observer)?;
        }
        Ok(())
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn tick<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        let mut moving = 0;
        for index in 0..self.vehicles.len() {
            if self.step_vehicle(index, now, observer)? {
                moving += 1;
            }
        }
        observer.on_tick_end(now, moving);
        self.clock.advance();
        Ok(())
    }

    /// Reserve, hold, advance and release for one vehicle.  Returns whether
    /// it moved.
    fn step_vehicle<O: SimObserver>(
        &mut self,
        index:    usize,
        tick:     Tick,
        observer: &mut O,
    ) -> SimResult<bool> {
        let now = self.clock.now();
        let dt = self.config.tick_secs;
        // Explicit field borrows so the borrow checker sees disjoint access.
        let graph = &mut self.graph;
        let router = &self.router;
        let integrator = &self.integrator;
        let vehicle = &mut self.vehicles[index];
        graph.try_segment(vehicle.motion.segment)?;

        // ── Reserve ───────────────────────────────────────────────────────
        vehicle.drive(dt);
        let needed = vehicle.motion.speed * dt;
        for _ in 0..MAX_RESERVATIONS_PER_TICK {
            if !vehicle.follower.is_empty() && vehicle.lookahead(graph) >= needed {
                break;
            }
            let (node, via) = vehicle.frontier(graph);
            // A stop at the frontier is already covered by what is reserved.
            let side = graph.side_at(node, via);
            let covered = vehicle.itinerary.current().is_some_and(|t| t.node == node && t.accepts(side));
            let itinerary = &vehicle.itinerary;
            let targets = |rank: usize| itinerary.target(rank + usize::from(covered));
            let origin = Origin::Arrived { node, via };
            let path = router.reserve(graph, origin, &targets, vehicle.rng.inner());
            observer.on_reservation(tick, vehicle.id, &path);
            if path.is_empty() {
                break;
            }
            vehicle.follower.load(&path);
        }

        // ── Hold ──────────────────────────────────────────────────────────
        let ahead = vehicle.lookahead(graph);
        let held = needed > ahead;
        if held {
            debug!("{} held {:.2} short of its reservation limit", vehicle.id, ahead);
            vehicle.motion.acceleration = 0.0;
            vehicle.motion.speed = ahead / dt * HOLD_MARGIN;
            observer.on_halt(tick, vehicle.id, HaltReason::NoReservation);
        }

        // ── Advance ───────────────────────────────────────────────────────
        let before = (vehicle.motion.segment, vehicle.motion.distance);
        let advance = integrator.advance(
            &mut vehicle.motion,
            graph,
            &mut vehicle.follower,
            vehicle.rng.inner(),
            now,
            dt,
        );
        if held {
            vehicle.motion.speed = 0.0;
        }
        if advance.halted {
            observer.on_halt(tick, vehicle.id, HaltReason::DeadEnd);
        }

        // ── Release ───────────────────────────────────────────────────────
        for (&segment, &node) in advance.left.iter().zip(&advance.passed) {
            graph.set_occupied(segment, false);
            let side = graph.side_at(node, segment);
            if vehicle.itinerary.current().is_some_and(|t| t.node == node && t.accepts(side)) {
                debug!("{} passed stop {node}", vehicle.id);
                vehicle.itinerary.advance();
            }
        }

        Ok((vehicle.motion.segment, vehicle.motion.distance) != before)
    }
}
