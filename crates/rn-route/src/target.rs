//! Scheduling targets and the ranked source the router pulls them from.

use rn_core::NodeId;
use rn_track::Side;

/// A place a vehicle intends to pass through.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SchedulingTarget {
    pub node:     NodeId,
    /// Side of `node` the vehicle must arrive on.  `None` accepts either.
    pub approach: Option<Side>,
}

impl SchedulingTarget {
    pub fn new(node: NodeId) -> Self {
        Self { node, approach: None }
    }

    pub fn approaching(node: NodeId, side: Side) -> Self {
        Self { node, approach: Some(side) }
    }

    /// Does arriving on `side` satisfy this target?
    #[inline]
    pub fn accepts(&self, side: Side) -> bool {
        self.approach.is_none_or(|s| s == side)
    }
}

/// Ranked sequence of targets: `target(0)` is the next place to go,
/// `target(1)` the one after, and so on.  `None` ends the sequence.
pub trait TargetSource {
    fn target(&self, rank: usize) -> Option<SchedulingTarget>;
}

impl<F> TargetSource for F
where
    F: Fn(usize) -> Option<SchedulingTarget>,
{
    fn target(&self, rank: usize) -> Option<SchedulingTarget> {
        self(rank)
    }
}

impl TargetSource for [SchedulingTarget] {
    fn target(&self, rank: usize) -> Option<SchedulingTarget> {
        self.get(rank).copied()
    }
}

/// A source with nothing scheduled.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoTargets;

impl TargetSource for NoTargets {
    fn target(&self, _rank: usize) -> Option<SchedulingTarget> {
        None
    }
}
