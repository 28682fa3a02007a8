//! Coarse distance from a block exit to a target lying beyond the block.
//!
//! Rather than walking every segment, the search runs Dijkstra over
//! junction states `(junction, entry segment)` and steps between them using
//! the [`JunctionReach`](rn_track::JunctionReach) cached on each edge.  The
//! only explicit walk is the first leg from the exit node to the nearest
//! junction, since the caches describe chains as seen from a node.
//!
//! A target that is not a junction is found through its own cache: the edge
//! on its approach side names the junction and exit segment that lead onto
//! its chain, and how far along the chain it sits.
//!
//! The caches know nothing of signals, so every chain the search steps along
//! is walked once to confirm each signal on it permits travel in that
//! direction.  A chain with a one-way signal facing the other way is never
//! taken, however short.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;

use rn_core::{NodeId, SegmentId};
use rn_track::{Edge, Side, TrackGraph};

use crate::target::SchedulingTarget;

/// Chain entrance that leads to a non-junction target.
struct ChainGoal {
    junction: NodeId,
    exit:     SegmentId,
    /// Segment the target is finally arrived through.
    via:      SegmentId,
    distance: f64,
}

fn chain_goals(graph: &TrackGraph, target: &SchedulingTarget) -> Vec<ChainGoal> {
    let node = graph.node(target.node);
    if node.is_junction() {
        return Vec::new();
    }
    [Side::A, Side::B]
        .into_iter()
        .filter(|side| target.accepts(*side))
        .filter_map(|side| node.edges(side).first())
        .filter_map(|edge| match (edge.reach.junction, edge.reach.entry) {
            (Some(junction), Some(exit)) => Some(ChainGoal {
                junction,
                exit,
                via: edge.segment,
                distance: edge.reach.distance,
            }),
            _ => None,
        })
        .collect()
}

/// May a train arriving at `node` along `via` continue past its signal?
fn passable(graph: &TrackGraph, node: NodeId, via: SegmentId) -> bool {
    graph
        .signal_at(node)
        .is_none_or(|s| graph.signal(s).permits(graph.side_at(node, via)))
}

/// Walk the chain leaving `from` along `edge` up to the next junction, or to
/// `goal` if it comes first, checking every arrival on the way.
fn chain_clear(graph: &TrackGraph, from: NodeId, edge: &Edge, goal: Option<NodeId>) -> bool {
    let (mut node, mut via) = (edge.neighbor, edge.segment);
    loop {
        if !passable(graph, node, via) {
            return false;
        }
        if Some(node) == goal || node == from || graph.node(node).is_junction() {
            return true;
        }
        match graph.next_edges(node, via) {
            [next] => (node, via) = (next.neighbor, next.segment),
            _ => return true,
        }
    }
}

/// Estimated track distance from having arrived at `node` along `via` to
/// arriving at `target`, or `None` if it cannot be reached within `limit`.
pub(crate) fn distance_to_target(
    graph: &TrackGraph,
    node: NodeId,
    via: SegmentId,
    target: &SchedulingTarget,
    limit: f64,
) -> Option<f64> {
    graph.try_node(target.node).ok()?;

    // First leg: explicit walk to the nearest junction.
    let (start, start_via) = (node, via);
    let (mut cur, mut via, mut cost) = (node, via, 0.0);
    loop {
        if cur == target.node && target.accepts(graph.side_at(cur, via)) {
            return Some(cost);
        }
        if graph.node(cur).is_junction() {
            break;
        }
        let [edge] = graph.next_edges(cur, via) else {
            return None;
        };
        cost += graph.segment(edge.segment).length;
        if cost > limit || (edge.neighbor == start && edge.segment == start_via) {
            return None;
        }
        cur = edge.neighbor;
        via = edge.segment;
        if !passable(graph, cur, via) {
            return None;
        }
    }

    let goals = chain_goals(graph, target);
    let mut clear: FxHashMap<(NodeId, SegmentId), bool> = FxHashMap::default();
    let mut best: FxHashMap<(NodeId, SegmentId), f64> = FxHashMap::default();
    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, NodeId, SegmentId)>> = BinaryHeap::new();
    best.insert((cur, via), cost);
    heap.push(Reverse((OrderedFloat(cost), cur, via)));

    while let Some(Reverse((OrderedFloat(cost), node, via))) = heap.pop() {
        if cost > limit {
            return None;
        }
        if node == target.node && target.accepts(graph.side_at(node, via)) {
            return Some(cost);
        }
        if best.get(&(node, via)).is_some_and(|&d| d < cost) || !graph.node(node).is_junction() {
            continue;
        }

        let mut relax = |state: (NodeId, SegmentId), next: f64| {
            if best.get(&state).is_none_or(|&d| next < d) {
                best.insert(state, next);
                heap.push(Reverse((OrderedFloat(next), state.0, state.1)));
            }
        };
        for edge in graph.next_edges(node, via) {
            for goal in goals.iter().filter(|g| g.junction == node && g.exit == edge.segment) {
                if chain_clear(graph, node, edge, Some(target.node)) {
                    relax((target.node, goal.via), cost + goal.distance);
                }
            }
            if let (Some(junction), Some(entry)) = (edge.reach.junction, edge.reach.entry) {
                let open = *clear
                    .entry((node, edge.segment))
                    .or_insert_with(|| chain_clear(graph, node, edge, None));
                if open {
                    relax((junction, entry), cost + edge.reach.distance);
                }
            }
        }
    }
    None
}
