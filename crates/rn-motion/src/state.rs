//! Per-vehicle motion state and its time-stamped history.

use std::collections::VecDeque;

use rn_core::{NodeId, SegmentId, SimTime};
use rn_track::TrackGraph;

/// The vehicle entered `segment` at `time`, travelling toward its end if
/// `forward`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SegmentSample {
    pub segment: SegmentId,
    pub forward: bool,
    pub time:    SimTime,
}

/// The vehicle was `distance` from the start of `segment` at `time`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DistanceSample {
    pub segment:  SegmentId,
    pub distance: f64,
    pub time:     SimTime,
}

/// Recent samples, oldest first, kept so positions can be reconstructed at
/// any time inside the retained window without re-simulating.
#[derive(Clone, Debug, Default)]
pub struct MotionHistory {
    segments:  VecDeque<SegmentSample>,
    distances: VecDeque<DistanceSample>,
}

impl MotionHistory {
    pub(crate) fn record_segment(&mut self, segment: SegmentId, forward: bool, time: SimTime) {
        self.segments.push_back(SegmentSample { segment, forward, time });
    }

    pub(crate) fn record_distance(&mut self, segment: SegmentId, distance: f64, time: SimTime) {
        self.distances.push_back(DistanceSample { segment, distance, time });
    }

    /// Drop samples older than `cutoff`, keeping the newest one at or before
    /// it so queries at `cutoff` still resolve.
    pub(crate) fn prune(&mut self, cutoff: SimTime) {
        while self.segments.len() > 1 && self.segments[1].time <= cutoff {
            self.segments.pop_front();
        }
        while self.distances.len() > 1 && self.distances[1].time <= cutoff {
            self.distances.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Time of the oldest retained sample.
    pub fn earliest(&self) -> Option<SimTime> {
        self.distances.front().map(|s| s.time)
    }

    /// Segment occupied at `time`: the newest entry at or before it.
    pub fn segment_at(&self, time: SimTime) -> Option<SegmentSample> {
        self.segments.iter().rev().find(|s| s.time <= time).copied()
    }

    /// Distance along `segment` at `time`, linearly interpolated between the
    /// samples on that segment bracketing `time`.
    pub fn distance_at(&self, segment: SegmentId, time: SimTime) -> Option<f64> {
        let on_segment = || self.distances.iter().filter(move |s| s.segment == segment);
        let before = on_segment().filter(|s| s.time <= time).last()?;
        let Some(after) = on_segment().find(|s| s.time > time) else {
            return Some(before.distance);
        };
        let span = after.time - before.time;
        if span <= 0.0 {
            return Some(after.distance);
        }
        let t = (time - before.time) / span;
        Some(before.distance + (after.distance - before.distance) * t)
    }
}

/// Continuous motion of one vehicle along the track.
#[derive(Clone, Debug)]
pub struct MotionState {
    pub segment:      SegmentId,
    /// Travelling toward the segment's end node.
    pub forward:      bool,
    /// Distance from the segment's start node, in `[0, length]`.
    pub distance:     f64,
    pub speed:        f64,
    pub acceleration: f64,
    pub history:      MotionHistory,
}

impl MotionState {
    /// +1 when travelling toward the segment end, -1 otherwise.
    #[inline]
    pub fn sign(&self) -> f64 {
        if self.forward { 1.0 } else { -1.0 }
    }

    /// Distance left before the boundary in the direction of travel.
    pub fn remaining(&self, graph: &TrackGraph) -> f64 {
        if self.forward {
            graph.segment(self.segment).length - self.distance
        } else {
            self.distance
        }
    }

    /// Node at the boundary ahead.
    pub fn node_ahead(&self, graph: &TrackGraph) -> NodeId {
        let seg = graph.segment(self.segment);
        if self.forward { seg.end } else { seg.start }
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.speed == 0.0 && self.acceleration <= 0.0
    }
}
