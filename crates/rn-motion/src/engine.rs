//! Tick integration and pose reconstruction.
//!
//! # Step
//!
//! Each call to [`MotionIntegrator::advance`] moves the vehicle by
//! `speed * dt` along its direction of travel, then updates
//! `speed += acceleration * dt` (never below zero).  If the new distance
//! leaves `[0, length]`, the crossing time is interpolated linearly over the
//! step, the controller picks the next edge at the node reached, and the
//! overshoot is carried onto the new segment, entering at its start or its
//! end depending on which endpoint is the node crossed.  A node with no
//! onward edge stops the vehicle at the boundary with zero speed and
//! acceleration.
//!
//! Every boundary and the final position are logged to the history so
//! [`MotionIntegrator::pose_at`] can place the vehicle at any retained time.

use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;

use rn_core::{DVec3, MotionConfig, NodeId, SegmentId, SimTime};
use rn_track::TrackGraph;

use crate::controller::TrackController;
use crate::state::{MotionHistory, MotionState};
use crate::{MotionError, MotionResult};

/// Outcome of one [`MotionIntegrator::advance`] step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Advance {
    /// Segments the vehicle left during the step, in order.
    pub left:   Vec<SegmentId>,
    /// Node crossed on leaving each segment of `left`.
    pub passed: Vec<NodeId>,
    /// The vehicle ran out of track and stopped.
    pub halted: bool,
}

/// Where a vehicle is and which way it faces.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pose {
    pub segment:   SegmentId,
    pub position:  DVec3,
    /// Unit direction of travel.
    pub direction: DVec3,
}

pub struct MotionIntegrator {
    config: MotionConfig,
}

impl MotionIntegrator {
    pub fn new(config: MotionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// A stationary vehicle on `segment`, `distance` from its start.
    pub fn place(
        &self,
        graph: &TrackGraph,
        segment: SegmentId,
        distance: f64,
        forward: bool,
        now: SimTime,
    ) -> MotionResult<MotionState> {
        let length = graph.try_segment(segment)?.length;
        if !(0.0..=length).contains(&distance) {
            return Err(MotionError::OutOfRange { segment, distance, length });
        }
        let mut history = MotionHistory::default();
        history.record_segment(segment, forward, now);
        history.record_distance(segment, distance, now);
        Ok(MotionState { segment, forward, distance, speed: 0.0, acceleration: 0.0, history })
    }

    /// Integrate `state` over `[now, now + dt]`.
    pub fn advance<C, R>(
        &self,
        state: &mut MotionState,
        graph: &TrackGraph,
        controller: &mut C,
        rng: &mut R,
        now: SimTime,
        dt: f64,
    ) -> Advance
    where
        C: TrackController + ?Sized,
        R: Rng + ?Sized,
    {
        let end = now + dt;
        let mut out = Advance::default();

        // Motion within the step is uniform at the speed it started with.
        let mut leg_start = (now, state.distance);
        state.distance += state.sign() * state.speed * dt;
        state.speed = (state.speed + state.acceleration * dt).max(0.0);

        loop {
            let seg = graph.segment(state.segment);
            let (boundary, overshoot, node) = if state.distance > seg.length {
                (seg.length, state.distance - seg.length, seg.end)
            } else if state.distance < 0.0 {
                (0.0, -state.distance, seg.start)
            } else {
                break;
            };

            let (t0, d0) = leg_start;
            let travelled = (state.distance - d0).abs();
            let fraction = if travelled > 0.0 { (boundary - d0).abs() / travelled } else { 1.0 };
            let crossing = t0.lerp(end, fraction);
            state.history.record_distance(state.segment, boundary, crossing);

            let options = graph.next_edges(node, state.segment);
            let choice = if options.is_empty() {
                None
            } else {
                controller
                    .pick_next_track(graph, state.segment, options)
                    .or_else(|| options.choose(rng).copied())
            };
            let Some(edge) = choice else {
                debug!("vehicle halted at {node} on {}", state.segment);
                state.distance = boundary;
                state.speed = 0.0;
                state.acceleration = 0.0;
                out.halted = true;
                break;
            };

            out.left.push(state.segment);
            out.passed.push(node);
            let next = graph.segment(edge.segment);
            let forward = next.start == node;
            let entry = if forward { 0.0 } else { next.length };
            state.segment = edge.segment;
            state.forward = forward;
            state.distance = if forward { overshoot } else { next.length - overshoot };
            state.history.record_segment(edge.segment, forward, crossing);
            state.history.record_distance(edge.segment, entry, crossing);
            leg_start = (crossing, entry);
        }

        state.history.record_distance(state.segment, state.distance, end);
        state.history.prune(SimTime(end.secs() - self.config.history_secs));
        out
    }

    /// Position and heading at `time`, from the retained history.  `None`
    /// for times before the oldest sample.
    pub fn pose_at(&self, state: &MotionState, graph: &TrackGraph, time: SimTime) -> Option<Pose> {
        let entered = state.history.segment_at(time)?;
        let distance = state.history.distance_at(entered.segment, time)?;
        let segment = graph.segment(entered.segment);
        let fraction = if segment.length > 0.0 {
            (distance / segment.length).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let sign = if entered.forward { 1.0 } else { -1.0 };
        Some(Pose {
            segment:   entered.segment,
            position:  segment.position_at(fraction),
            direction: segment.direction_at(fraction) * sign,
        })
    }

    /// Current pose, from the state itself rather than history.
    pub fn pose(&self, state: &MotionState, graph: &TrackGraph) -> Pose {
        let segment = graph.segment(state.segment);
        let fraction = if segment.length > 0.0 { state.distance / segment.length } else { 0.0 };
        Pose {
            segment:   state.segment,
            position:  segment.position_at(fraction),
            direction: segment.direction_at(fraction) * state.sign(),
        }
    }
}

impl Default for MotionIntegrator {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}
