//! Vehicles and the itineraries they route toward.

use rn_core::{NodeId, SegmentId, VehicleId, VehicleRng};
use rn_motion::{MotionState, PathFollower};
use rn_route::{SchedulingTarget, TargetSource};
use rn_track::TrackGraph;

// ── Itinerary ─────────────────────────────────────────────────────────────────

/// Ordered places a vehicle should pass through.
///
/// Acts as the router's [`TargetSource`]: rank 0 is the next unvisited
/// stop.  A cyclic itinerary starts over after its last stop.
#[derive(Clone, Debug, Default)]
pub struct Itinerary {
    stops:  Vec<SchedulingTarget>,
    next:   usize,
    cyclic: bool,
}

impl Itinerary {
    pub fn new(stops: Vec<SchedulingTarget>) -> Self {
        Self { stops, next: 0, cyclic: false }
    }

    pub fn cyclic(stops: Vec<SchedulingTarget>) -> Self {
        Self { stops, next: 0, cyclic: true }
    }

    /// The stop the vehicle is heading for.
    pub fn current(&self) -> Option<SchedulingTarget> {
        self.target(0)
    }

    /// Number of stops passed so far, counting repeats of a cyclic route.
    pub fn position(&self) -> usize {
        self.next
    }

    pub fn is_finished(&self) -> bool {
        self.current().is_none()
    }

    /// Mark the current stop as passed.
    pub fn advance(&mut self) {
        if !self.is_finished() {
            self.next += 1;
        }
    }
}

impl TargetSource for Itinerary {
    fn target(&self, rank: usize) -> Option<SchedulingTarget> {
        let len = self.stops.len();
        if self.cyclic {
            (rank < len).then(|| self.stops[(self.next + rank) % len])
        } else {
            self.stops.get(self.next + rank).copied()
        }
    }
}

// ── VehicleSpec ───────────────────────────────────────────────────────────────

/// Initial placement and driving parameters, handed to
/// [`SimBuilder::vehicle`][crate::SimBuilder::vehicle].
#[derive(Clone, Debug)]
pub struct VehicleSpec {
    pub segment:      SegmentId,
    /// Distance from the segment's start node.
    pub distance:     f64,
    pub forward:      bool,
    /// Speed the vehicle accelerates toward (m/s).
    pub cruise_speed: f64,
    /// Acceleration while below cruise speed (m/s²).
    pub acceleration: f64,
    pub itinerary:    Itinerary,
}

impl VehicleSpec {
    pub fn new(segment: SegmentId, distance: f64, forward: bool) -> Self {
        Self {
            segment,
            distance,
            forward,
            cruise_speed: 10.0,
            acceleration: 1.0,
            itinerary:    Itinerary::default(),
        }
    }

    pub fn cruise(mut self, speed: f64) -> Self {
        self.cruise_speed = speed;
        self
    }

    pub fn accelerating(mut self, acceleration: f64) -> Self {
        self.acceleration = acceleration;
        self
    }

    pub fn itinerary(mut self, itinerary: Itinerary) -> Self {
        self.itinerary = itinerary;
        self
    }
}

// ── Vehicle ───────────────────────────────────────────────────────────────────

pub struct Vehicle {
    pub id:           VehicleId,
    pub motion:       MotionState,
    /// Reserved segments not yet entered.
    pub follower:     PathFollower,
    pub itinerary:    Itinerary,
    pub cruise_speed: f64,
    pub acceleration: f64,
    pub(crate) rng:   VehicleRng,
}

impl Vehicle {
    /// Set this step's acceleration so speed approaches cruise speed without
    /// exceeding it.
    pub(crate) fn drive(&mut self, dt: f64) {
        let gap = self.cruise_speed - self.motion.speed;
        self.motion.acceleration = if gap > 0.0 { self.acceleration.min(gap / dt) } else { 0.0 };
    }

    /// Distance the vehicle may cover before running out of reserved track.
    pub fn lookahead(&self, graph: &TrackGraph) -> f64 {
        self.motion.remaining(graph) + self.follower.planned_length(graph)
    }

    /// Node at the far end of the reserved track, and the segment that
    /// reaches it.
    pub fn frontier(&self, graph: &TrackGraph) -> (NodeId, SegmentId) {
        let mut node = self.motion.node_ahead(graph);
        let mut via = self.motion.segment;
        for segment in self.follower.segments() {
            node = graph.segment(segment).other_end(node);
            via = segment;
        }
        (node, via)
    }
}
