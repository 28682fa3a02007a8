//! Controllers decide which track a vehicle takes at a node.
//!
//! The integrator asks its controller whenever the vehicle crosses into a
//! node.  A controller returning `None` defers to a uniform random choice
//! among the options.

use std::collections::VecDeque;

use rn_core::SegmentId;
use rn_route::ReservedPath;
use rn_track::{Edge, TrackGraph};

pub trait TrackController {
    /// Choose the next edge after leaving `from`.  `options` is never empty.
    fn pick_next_track(&mut self, graph: &TrackGraph, from: SegmentId, options: &[Edge]) -> Option<Edge>;
}

/// No plan: every choice is random.
#[derive(Copy, Clone, Debug, Default)]
pub struct RandomController;

impl TrackController for RandomController {
    fn pick_next_track(&mut self, _graph: &TrackGraph, _from: SegmentId, _options: &[Edge]) -> Option<Edge> {
        None
    }
}

/// Follows the segments of reserved paths in order.
#[derive(Clone, Debug, Default)]
pub struct PathFollower {
    queue: VecDeque<SegmentId>,
}

impl PathFollower {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue every segment of `path` after whatever is already planned.
    pub fn load(&mut self, path: &ReservedPath) {
        self.queue.extend(path.segments.iter().copied());
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn peek(&self) -> Option<SegmentId> {
        self.queue.front().copied()
    }

    /// Planned segments, next first.
    pub fn segments(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.queue.iter().copied()
    }

    /// Total length of the planned segments.
    pub fn planned_length(&self, graph: &TrackGraph) -> f64 {
        self.segments().map(|s| graph.segment(s).length).sum()
    }

    /// Forget the plan and return the segments that were still queued.
    pub fn clear(&mut self) -> Vec<SegmentId> {
        self.queue.drain(..).collect()
    }
}

impl TrackController for PathFollower {
    fn pick_next_track(&mut self, _graph: &TrackGraph, _from: SegmentId, options: &[Edge]) -> Option<Edge> {
        let planned = self.peek()?;
        let edge = options.iter().find(|e| e.segment == planned).copied()?;
        self.queue.pop_front();
        Some(edge)
    }
}
