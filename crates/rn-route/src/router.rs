//! Block reservation.
//!
//! # Algorithm
//!
//! 1. [`explore`] the block from the origin.
//! 2. Without a target, pick uniformly at random among the unoccupied stops
//!    (signals and dead ends).  The random pick is a routing policy for
//!    vehicles with nowhere particular to go, not a derived rule.
//! 3. With targets, take them in rank order.  A target reached inside the
//!    block is appended; if a signal governing the arrival stands there the
//!    reservation ends, otherwise the block is re-explored from the target
//!    and the next rank is tried.  A target beyond the block selects the
//!    exit signal minimising `score + coarse distance to target`.  A target
//!    repeating its predecessor, or the end of the ranking, stops the loop.
//! 4. Otherwise fall back to the nearest signal from the last exploration
//!    by score (first found wins ties); failing that, return what the
//!    targets produced, possibly nothing.
//!
//! Reservation is all-or-nothing: a path touching any occupied segment is
//! never granted.

use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;

use rn_core::{NodeId, RouterConfig, SignalId};
use rn_track::{Side, TrackGraph};

use crate::estimate::distance_to_target;
use crate::explore::{Exploration, Origin, Stop, explore};
use crate::path::ReservedPath;
use crate::target::{SchedulingTarget, TargetSource};

/// Direction to reserve in, relative to the start node's direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TravelDirection {
    /// Leave by the B side.
    Forward,
    /// Leave by the A side.
    Backward,
    /// Whichever side yields the lower-scoring path.
    Either,
}

pub struct BlockRouter {
    config: RouterConfig,
}

impl BlockRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    // ── Reservation ───────────────────────────────────────────────────────

    /// Plan from `origin` and lock the result.
    pub fn reserve<T, R>(
        &self,
        graph: &mut TrackGraph,
        origin: Origin,
        targets: &T,
        rng: &mut R,
    ) -> ReservedPath
    where
        T: TargetSource + ?Sized,
        R: Rng + ?Sized,
    {
        let path = self.plan(graph, origin, targets, rng);
        lock(graph, path)
    }

    /// Plan from `node` in `direction` and lock the result.
    pub fn reserve_from<T, R>(
        &self,
        graph: &mut TrackGraph,
        node: NodeId,
        direction: TravelDirection,
        targets: &T,
        rng: &mut R,
    ) -> ReservedPath
    where
        T: TargetSource + ?Sized,
        R: Rng + ?Sized,
    {
        let departing = |side| Origin::Departing { node, side };
        let path = match direction {
            TravelDirection::Forward => self.plan(graph, departing(Side::B), targets, rng),
            TravelDirection::Backward => self.plan(graph, departing(Side::A), targets, rng),
            TravelDirection::Either => {
                let forward = self.plan(graph, departing(Side::B), targets, rng);
                let backward = self.plan(graph, departing(Side::A), targets, rng);
                let penalty = self.config.occupancy_penalty;
                match (forward.is_empty(), backward.is_empty()) {
                    (false, false) if backward.score(penalty) < forward.score(penalty) => backward,
                    (true, _) => backward,
                    _ => forward,
                }
            }
        };
        lock(graph, path)
    }

    /// Reserve the block ahead of `signal` in the direction it governs.
    pub fn reserve_for_signal<T, R>(
        &self,
        graph: &mut TrackGraph,
        signal: SignalId,
        targets: &T,
        rng: &mut R,
    ) -> ReservedPath
    where
        T: TargetSource + ?Sized,
        R: Rng + ?Sized,
    {
        let sig = graph.signal(signal);
        let origin = Origin::Departing { node: sig.node, side: sig.departure_side() };
        self.reserve(graph, origin, targets, rng)
    }

    // ── Planning ──────────────────────────────────────────────────────────

    /// Compute the path a reservation from `origin` would take, without
    /// locking anything.
    pub fn plan<T, R>(
        &self,
        graph: &TrackGraph,
        origin: Origin,
        targets: &T,
        rng: &mut R,
    ) -> ReservedPath
    where
        T: TargetSource + ?Sized,
        R: Rng + ?Sized,
    {
        let limit = self.config.max_search_length;
        let mut exploration = explore(graph, origin, limit);

        if targets.target(0).is_none() {
            let free: Vec<&Stop> = exploration.stops.iter().filter(|s| !s.path.occupied).collect();
            return match free.choose(rng) {
                Some(stop) => stop.path.clone(),
                None => {
                    debug!("no free stop from {}", origin.node());
                    ReservedPath::default()
                }
            };
        }

        let mut path = ReservedPath::default();
        let mut previous: Option<SchedulingTarget> = None;
        for rank in 0..self.config.max_target_hops {
            let Some(target) = targets.target(rank) else {
                break;
            };
            if previous == Some(target) {
                break;
            }
            previous = Some(target);

            if let Some((via, leg)) = exploration.best_arrival(&target) {
                path.append(&leg);
                let arrival = graph.side_at(target.node, via);
                let stops_here = graph
                    .signal_at(target.node)
                    .is_some_and(|s| graph.signal(s).governs(arrival));
                if stops_here {
                    return path;
                }
                exploration = explore(graph, Origin::Arrived { node: target.node, via }, limit);
                continue;
            }

            if let Some(stop) = self.exit_toward(graph, &exploration, &target) {
                path.append(&stop.path);
                return path;
            }
            debug!("target {} unreachable", target.node);
            break;
        }

        match self.nearest_signal(&exploration) {
            Some(stop) => path.append(&stop.path),
            None => debug!("no safe path from {}", origin.node()),
        }
        path
    }

    /// Exit signal of the block minimising path score plus the coarse
    /// distance onward to `target`.
    fn exit_toward<'e>(
        &self,
        graph: &TrackGraph,
        exploration: &'e Exploration,
        target: &SchedulingTarget,
    ) -> Option<&'e Stop> {
        let penalty = self.config.occupancy_penalty;
        let limit = self.config.max_search_length;
        exploration
            .signal_stops()
            .filter_map(|stop| {
                distance_to_target(graph, stop.node, stop.via, target, limit)
                    .map(|onward| (stop.path.score(penalty) + onward, stop))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, stop)| stop)
    }

    fn nearest_signal<'e>(&self, exploration: &'e Exploration) -> Option<&'e Stop> {
        let penalty = self.config.occupancy_penalty;
        exploration
            .signal_stops()
            .min_by(|a, b| a.path.score(penalty).total_cmp(&b.path.score(penalty)))
    }
}

impl Default for BlockRouter {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

/// Mark every segment of `path` occupied, or return an empty path if any of
/// them already is.
fn lock(graph: &mut TrackGraph, mut path: ReservedPath) -> ReservedPath {
    if path.is_empty() {
        return path;
    }
    if let Some(&taken) = path.segments.iter().find(|&&s| graph.is_occupied(s)) {
        debug!("reservation refused: {taken} is occupied");
        return ReservedPath::default();
    }
    for &segment in &path.segments {
        graph.set_occupied(segment, true);
    }
    path.occupied = false;
    debug!("reserved {} segment(s), {:.1} long", path.len(), path.length);
    path
}
