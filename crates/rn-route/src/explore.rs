//! Depth-first block exploration.
//!
//! Starting from an [`Origin`], every branch is walked until it reaches a
//! signal that governs the direction of travel (the end of the block), a
//! dead end, or `max_search_length`.  Along the way the shortest arrival at
//! every `(node, arrival side)` is recorded so targets inside the block can
//! be routed to without a second walk.
//!
//! A signal that does not permit the arrival direction closes the branch
//! outright: it is neither a stop nor passable.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use rn_core::{NodeId, SegmentId, SignalId};
use rn_track::{Edge, Side, TrackGraph};

use crate::path::{ReservedPath, Trail};
use crate::target::SchedulingTarget;

/// Where a search starts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Standing at `node`, leaving by the edges on `side`.
    Departing { node: NodeId, side: Side },
    /// Having just arrived at `node` along `via`; continues through it.
    Arrived { node: NodeId, via: SegmentId },
}

impl Origin {
    pub fn node(&self) -> NodeId {
        match *self {
            Origin::Departing { node, .. } | Origin::Arrived { node, .. } => node,
        }
    }

    pub(crate) fn edges<'g>(&self, graph: &'g TrackGraph) -> &'g [Edge] {
        match *self {
            Origin::Departing { node, side } => graph.node(node).edges(side),
            Origin::Arrived { node, via } => graph.next_edges(node, via),
        }
    }
}

/// Why a branch ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopKind {
    DeadEnd,
    Signal(SignalId),
}

/// A candidate end of the block and the shortest path to it.
#[derive(Clone, Debug)]
pub struct Stop {
    pub node: NodeId,
    /// Segment the stop is reached through.
    pub via:  SegmentId,
    pub kind: StopKind,
    pub path: ReservedPath,
}

impl Stop {
    #[inline]
    pub fn is_signal(&self) -> bool {
        matches!(self.kind, StopKind::Signal(_))
    }
}

/// Result of one [`explore`] call.
pub struct Exploration {
    /// In discovery order.
    pub stops: Vec<Stop>,
    reached:   FxHashMap<(NodeId, Side), (SegmentId, Rc<Trail>)>,
}

impl Exploration {
    /// Shortest recorded arrival at `node` on `side`.
    pub fn arrival(&self, node: NodeId, side: Side) -> Option<(SegmentId, ReservedPath)> {
        self.reached.get(&(node, side)).map(|(via, trail)| (*via, trail.to_path()))
    }

    /// Shortest recorded arrival satisfying `target`.
    pub fn best_arrival(&self, target: &SchedulingTarget) -> Option<(SegmentId, ReservedPath)> {
        [Side::A, Side::B]
            .into_iter()
            .filter(|side| target.accepts(*side))
            .filter_map(|side| self.reached.get(&(target.node, side)))
            .min_by(|a, b| a.1.length.total_cmp(&b.1.length))
            .map(|(via, trail)| (*via, trail.to_path()))
    }

    pub fn signal_stops(&self) -> impl Iterator<Item = &Stop> + '_ {
        self.stops.iter().filter(|s| s.is_signal())
    }
}

/// Walk every branch leaving `origin`.  Edges are taken in list order.
pub fn explore(graph: &TrackGraph, origin: Origin, max_length: f64) -> Exploration {
    let mut stops: Vec<Stop> = Vec::new();
    let mut stop_index: FxHashMap<(NodeId, SegmentId), usize> = FxHashMap::default();
    let mut reached: FxHashMap<(NodeId, Side), (SegmentId, Rc<Trail>)> = FxHashMap::default();
    let mut settled: FxHashMap<(NodeId, SegmentId), f64> = FxHashMap::default();

    let mut stack: Vec<(NodeId, Rc<Trail>)> = origin
        .edges(graph)
        .iter()
        .rev()
        .map(|e| (e.neighbor, Trail::start(graph, e.segment)))
        .collect();

    while let Some((node, trail)) = stack.pop() {
        let via = trail.head();
        if trail.length > max_length {
            continue;
        }
        if settled.get(&(node, via)).is_some_and(|&d| d <= trail.length) {
            continue;
        }
        settled.insert((node, via), trail.length);

        let arrival = graph.side_at(node, via);
        let signal = graph.signal_at(node);
        let governing = match signal {
            Some(id) => {
                let sig = graph.signal(id);
                if !sig.permits(arrival) {
                    continue;
                }
                sig.governs(arrival).then_some(id)
            }
            None => None,
        };

        let shorter = reached.get(&(node, arrival)).is_none_or(|(_, t)| trail.length < t.length);
        if shorter {
            reached.insert((node, arrival), (via, Rc::clone(&trail)));
        }

        let next = graph.next_edges(node, via);
        let kind = match governing {
            Some(id) => Some(StopKind::Signal(id)),
            None if next.is_empty() => Some(StopKind::DeadEnd),
            None => None,
        };
        if let Some(kind) = kind {
            let stop = Stop { node, via, kind, path: trail.to_path() };
            match stop_index.get(&(node, via)) {
                Some(&i) if stops[i].path.length <= stop.path.length => {}
                Some(&i) => stops[i] = stop,
                None => {
                    stop_index.insert((node, via), stops.len());
                    stops.push(stop);
                }
            }
            continue;
        }

        for edge in next.iter().rev() {
            if trail.contains(edge.segment) {
                continue;
            }
            stack.push((edge.neighbor, trail.step(graph, edge.segment)));
        }
    }

    Exploration { stops, reached }
}
