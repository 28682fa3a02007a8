//! Signals and their lazily re-derived sight.
//!
//! A signal hangs off exactly one node and is not part of the graph itself.
//! `facing = true` means it governs travel in the node's canonical direction
//! (arriving on the A side, leaving on the B side).  Travel against the
//! facing direction is only allowed when `opposite_traffic` is set.
//!
//! Each signal caches its *sight*: the distance to the next signal that
//! governs the same direction of travel.  Edits never recompute sight
//! eagerly; they walk outward from the changed track and mark the first
//! signal they meet on each branch as stale (see
//! [`TrackGraph::invalidate_visibility`]).

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use rn_core::{NodeId, SegmentId, SignalId, SimTime};

use crate::graph::TrackGraph;
use crate::node::{Edge, Side};
use crate::{TrackError, TrackResult};

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub(crate) enum Sight {
    Stale,
    Known(Option<f64>),
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Signal {
    pub node:             NodeId,
    pub facing:           bool,
    pub opposite_traffic: bool,
    pub removed_at:       Option<SimTime>,
    pub(crate) sight:     Sight,
}

impl Signal {
    /// Does this signal govern a train arriving at its node on `arrival`?
    #[inline]
    pub fn governs(&self, arrival: Side) -> bool {
        self.facing == (arrival == Side::A)
    }

    /// May a train arriving on `arrival` pass (or stop at) this signal?
    #[inline]
    pub fn permits(&self, arrival: Side) -> bool {
        self.governs(arrival) || self.opposite_traffic
    }

    /// Side of the host node a train leaves by when obeying this signal.
    #[inline]
    pub fn departure_side(&self) -> Side {
        if self.facing { Side::B } else { Side::A }
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed_at.is_some()
    }

    #[inline]
    pub fn is_stale(&self) -> bool {
        self.sight == Sight::Stale
    }
}

impl TrackGraph {
    /// Place a signal on `node`.
    pub fn place_signal(
        &mut self,
        node: NodeId,
        facing: bool,
        opposite_traffic: bool,
    ) -> TrackResult<SignalId> {
        let host = self.try_node(node)?;
        if let Some(signal) = host.signal {
            return Err(TrackError::SignalExists { node, signal });
        }
        let id = SignalId(self.signals.len() as u32);
        self.signals.push(Signal {
            node,
            facing,
            opposite_traffic,
            removed_at: None,
            sight: Sight::Stale,
        });
        self.nodes[node.index()].signal = Some(id);

        // Signals behind this one now see it instead of whatever lay beyond.
        self.invalidate_around(node);
        debug!("placed {id} at {node} (facing={facing}, opposite_traffic={opposite_traffic})");
        Ok(id)
    }

    /// Detach `signal` from its node as of `time`.
    pub fn remove_signal(&mut self, signal: SignalId, time: SimTime) -> TrackResult<()> {
        let sig = self.signals.get_mut(signal.index()).ok_or(TrackError::SignalNotFound(signal))?;
        if sig.removed_at.is_some() {
            return Ok(());
        }
        sig.removed_at = Some(time);
        let node = sig.node;
        self.nodes[node.index()].signal = None;

        self.invalidate_around(node);
        debug!("removed {signal} from {node} at {time}");
        Ok(())
    }

    /// The live signal hosted by `node`, if any.
    pub fn signal_at(&self, node: NodeId) -> Option<SignalId> {
        self.nodes[node.index()].signal
    }

    /// Distance from `signal` to the next signal governing the same
    /// direction, or `None` if there is none within
    /// `TrackConfig::max_signal_sight`.  Recomputed only when stale.
    pub fn signal_sight(&mut self, signal: SignalId) -> Option<f64> {
        if let Sight::Known(sight) = self.signals[signal.index()].sight {
            return sight;
        }
        let sight = self.compute_sight(signal);
        self.signals[signal.index()].sight = Sight::Known(sight);
        sight
    }

    fn compute_sight(&self, signal: SignalId) -> Option<f64> {
        let sig = &self.signals[signal.index()];
        let limit = self.config.max_signal_sight;
        let mut best: Option<f64> = None;
        let mut settled: FxHashMap<(SegmentId, NodeId), f64> = FxHashMap::default();
        let mut stack: Vec<(Edge, f64)> = self.nodes[sig.node.index()]
            .edges(sig.departure_side())
            .iter()
            .map(|e| (*e, 0.0))
            .collect();

        while let Some((edge, base)) = stack.pop() {
            let dist = base + self.segments[edge.segment.index()].length;
            if dist > limit || best.is_some_and(|b| dist >= b) {
                continue;
            }
            let key = (edge.segment, edge.neighbor);
            if settled.get(&key).is_some_and(|&d| d <= dist) {
                continue;
            }
            settled.insert(key, dist);

            let arrival = self.side_at(edge.neighbor, edge.segment);
            if let Some(other) = self.nodes[edge.neighbor.index()].signal {
                let other = &self.signals[other.index()];
                if other.governs(arrival) {
                    best = Some(dist);
                    continue;
                }
                if !other.opposite_traffic {
                    continue;
                }
            }
            for next in self.next_edges(edge.neighbor, edge.segment) {
                stack.push((*next, dist));
            }
        }
        best
    }

    /// Mark stale every signal whose sight may pass over `via`, walking
    /// outward from `node` away from `via`.
    ///
    /// A branch stops at the first node hosting a signal (beyond it nothing
    /// can see the change) or at a junction already visited in this call.
    pub fn invalidate_visibility(&mut self, node: NodeId, via: SegmentId) {
        self.invalidate_beyond(node, via);
    }

    /// Invalidate outward on every branch leaving `node`.
    fn invalidate_around(&mut self, node: NodeId) {
        let edges: Vec<Edge> = self.nodes[node.index()].all_edges().copied().collect();
        for edge in edges {
            self.invalidate_beyond(edge.neighbor, edge.segment);
        }
    }

    fn invalidate_beyond(&mut self, node: NodeId, via: SegmentId) {
        let mut junctions: FxHashSet<NodeId> = FxHashSet::default();
        let mut walked: FxHashSet<(NodeId, SegmentId)> = FxHashSet::default();
        let mut stack = vec![(node, via)];
        while let Some((node, via)) = stack.pop() {
            if !walked.insert((node, via)) {
                continue;
            }
            if let Some(signal) = self.nodes[node.index()].signal {
                self.signals[signal.index()].sight = Sight::Stale;
                continue;
            }
            if self.nodes[node.index()].is_junction() && !junctions.insert(node) {
                continue;
            }
            for edge in self.next_edges(node, via) {
                stack.push((edge.neighbor, edge.segment));
            }
        }
    }
}
