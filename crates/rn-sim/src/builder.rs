//! Fluent builder for constructing a [`Sim`].

use rustc_hash::FxHashMap;

use rn_core::{SegmentId, SimConfig, SimTime, VehicleId, VehicleRng};
use rn_motion::{MotionIntegrator, PathFollower};
use rn_route::BlockRouter;
use rn_track::TrackGraph;

use crate::vehicle::{Vehicle, VehicleSpec};
use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`]: tick length, total ticks, seed, per-component sections
///
/// # Optional inputs (have defaults)
///
/// | Method          | Default                                   |
/// |-----------------|-------------------------------------------|
/// | `.graph(g)`     | Empty `TrackGraph` with `config.track`    |
/// | `.vehicle(v)`   | No vehicles                               |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config)
///     .graph(graph)
///     .vehicle(VehicleSpec::new(segment, 0.0, true).cruise(20.0))
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:   SimConfig,
    graph:    Option<TrackGraph>,
    vehicles: Vec<VehicleSpec>,
}

impl SimBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self { config, graph: None, vehicles: Vec::new() }
    }

    /// Supply the track layout.  Its own `TrackConfig` is kept.
    pub fn graph(mut self, graph: TrackGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Add a vehicle.  Vehicles get ids in the order they are added.
    pub fn vehicle(mut self, spec: VehicleSpec) -> Self {
        self.vehicles.push(spec);
        self
    }

    /// Validate inputs, place every vehicle and mark the segment under it
    /// occupied, and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim> {
        self.config.validate()?;
        let mut graph = self.graph.unwrap_or_else(|| TrackGraph::new(self.config.track.clone()));
        let integrator = MotionIntegrator::new(self.config.motion.clone());

        let mut holders: FxHashMap<SegmentId, VehicleId> = FxHashMap::default();
        let mut vehicles = Vec::with_capacity(self.vehicles.len());
        for (i, spec) in self.vehicles.into_iter().enumerate() {
            let id = VehicleId(i as u32);
            if !(spec.cruise_speed > 0.0 && spec.cruise_speed.is_finite()) {
                return Err(SimError::InvalidVehicle { vehicle: id, reason: "cruise speed must be positive" });
            }
            if !(spec.acceleration > 0.0 && spec.acceleration.is_finite()) {
                return Err(SimError::InvalidVehicle { vehicle: id, reason: "acceleration must be positive" });
            }
            if let Some(&holder) = holders.get(&spec.segment) {
                return Err(SimError::SegmentTaken { segment: spec.segment, holder });
            }
            let motion = integrator.place(&graph, spec.segment, spec.distance, spec.forward, SimTime::ZERO)?;
            holders.insert(spec.segment, id);
            graph.set_occupied(spec.segment, true);
            vehicles.push(Vehicle {
                id,
                motion,
                follower:     PathFollower::new(),
                itinerary:    spec.itinerary,
                cruise_speed: spec.cruise_speed,
                acceleration: spec.acceleration,
                rng:          VehicleRng::new(self.config.seed, id),
            });
        }

        Ok(Sim {
            clock:  self.config.make_clock(),
            router: BlockRouter::new(self.config.router.clone()),
            config: self.config,
            graph,
            vehicles,
            integrator,
        })
    }
}
