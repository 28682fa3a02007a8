//! The track graph arena and junction-distance cache propagation.
//!
//! # Arena layout
//!
//! Nodes, segments and signals live in three `Vec`s addressed by
//! `NodeId` / `SegmentId` / `SignalId`.  Nothing is ever removed from an
//! arena: removed segments keep a `removed_at` stamp and nodes that lose
//! their last edge are marked retired.  Handles therefore stay valid for
//! history queries after an edit.
//!
//! # Cache propagation
//!
//! The [`JunctionReach`] stored on an edge at node `X` pointing to `N` depends
//! only on `N`: if `N` is a junction it is `N` itself, if `N` is an end the
//! walk stops there, and if `N` is straight it is `N`'s far-side edge reach
//! plus the connecting segment's length.  After any change at `N` the edges
//! pointing into `N` are recomputed, and the update is relayed backwards
//! through straight nodes until a recomputed value equals the stored one.
//! A relay that comes back to where it started has found a junction-free
//! loop and settles on [`JunctionReach::unbounded`].

use log::trace;
use rustc_hash::FxHashSet;

use rn_core::{DVec3, NodeId, SegmentId, SignalId, SimTime, TrackConfig};

use crate::index::NodeIndex;
use crate::node::{horizontal, Edge, JunctionReach, NodeKind, Side, TrackNode};
use crate::segment::TrackSegment;
use crate::shape::TrackShape;
use crate::signal::Signal;
use crate::{TrackError, TrackResult};

/// Mutable track network.  See the module docs for the cache model.
pub struct TrackGraph {
    pub(crate) nodes:    Vec<TrackNode>,
    pub(crate) segments: Vec<TrackSegment>,
    pub(crate) signals:  Vec<Signal>,
    pub(crate) config:   TrackConfig,
    index:               NodeIndex,
}

impl TrackGraph {
    pub fn new(config: TrackConfig) -> Self {
        Self {
            nodes:    Vec::new(),
            segments: Vec::new(),
            signals:  Vec::new(),
            config,
            index:    NodeIndex::default(),
        }
    }

    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    /// Segments not yet removed.
    pub fn live_segments(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_removed())
            .map(|(i, _)| SegmentId(i as u32))
    }

    /// Nodes not yet retired.
    pub fn live_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.is_retired())
            .map(|(i, _)| NodeId(i as u32))
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    /// # Panics
    /// Panics if `id` was not issued by this graph.
    #[inline]
    pub fn node(&self, id: NodeId) -> &TrackNode {
        &self.nodes[id.index()]
    }

    /// # Panics
    /// Panics if `id` was not issued by this graph.
    #[inline]
    pub fn segment(&self, id: SegmentId) -> &TrackSegment {
        &self.segments[id.index()]
    }

    /// # Panics
    /// Panics if `id` was not issued by this graph.
    #[inline]
    pub fn signal(&self, id: SignalId) -> &Signal {
        &self.signals[id.index()]
    }

    /// Checked lookup of a node that is still part of the network.
    pub fn try_node(&self, id: NodeId) -> TrackResult<&TrackNode> {
        let node = self.nodes.get(id.index()).ok_or(TrackError::NodeNotFound(id))?;
        if node.is_retired() {
            return Err(TrackError::NodeRetired(id));
        }
        Ok(node)
    }

    /// Checked lookup of a segment that is still part of the network.
    pub fn try_segment(&self, id: SegmentId) -> TrackResult<&TrackSegment> {
        let seg = self.segments.get(id.index()).ok_or(TrackError::SegmentNotFound(id))?;
        if seg.is_removed() {
            return Err(TrackError::SegmentRemoved(id));
        }
        Ok(seg)
    }

    /// Nearest live node within `radius` (plan distance) of `position`.
    pub fn nearest_node(&self, position: DVec3, radius: f64) -> Option<NodeId> {
        self.index.nearest(position, radius)
    }

    #[cfg(test)]
    pub(crate) fn indexed_node_count(&self) -> usize {
        self.index.len()
    }

    // ── Construction ──────────────────────────────────────────────────────

    /// Create an isolated node.
    pub fn add_node(&mut self, position: DVec3, direction: DVec3, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(TrackNode::new(position, direction, kind));
        self.index.insert(position, id);
        id
    }

    /// Create a segment with `shape` from `start` to `end` and link it into
    /// both nodes.
    ///
    /// Each node receives one edge on the side matching the segment's
    /// departure direction, then the junction cache is propagated from both
    /// endpoints.
    ///
    /// # Panics
    /// Panics if `start == end` or either node is retired.
    pub fn add_segment(&mut self, shape: TrackShape, start: NodeId, end: NodeId) -> SegmentId {
        assert_ne!(start, end, "a segment must join two distinct nodes");
        assert!(!self.nodes[start.index()].is_retired(), "{start} is retired");
        assert!(!self.nodes[end.index()].is_retired(), "{end} is retired");

        let id = SegmentId(self.segments.len() as u32);
        let segment = TrackSegment::new(shape, start, end);
        // A node created without a direction takes it from its first segment.
        for node in [start, end] {
            let n = &mut self.nodes[node.index()];
            if n.direction == DVec3::ZERO {
                n.direction = horizontal(segment.departure_from(node));
            }
        }
        debug_assert!(
            self.nodes[start.index()].direction.dot(segment.direction_at(0.0)).abs() > 1e-6,
            "{id} leaves {start} perpendicular to its direction"
        );
        self.segments.push(segment);
        self.link(id);
        id
    }

    fn link(&mut self, id: SegmentId) {
        let (start, end) = {
            let s = &self.segments[id.index()];
            (s.start, s.end)
        };
        for (node, neighbor) in [(start, end), (end, start)] {
            let departure = self.segments[id.index()].departure_from(node);
            let n = &mut self.nodes[node.index()];
            let side = n.side_for(departure);
            n.edges_mut(side).push(Edge { neighbor, segment: id, reach: JunctionReach::EMPTY });
        }
        self.refresh_around(start);
        self.refresh_around(end);
    }

    /// Remove the edge between `a` and `b` from both nodes and return the
    /// segment that joined them.
    ///
    /// # Panics
    /// Panics if `a` and `b` are not connected.
    pub fn disconnect(&mut self, a: NodeId, b: NodeId) -> SegmentId {
        let segment = self.nodes[a.index()]
            .all_edges()
            .find(|e| e.neighbor == b)
            .map(|e| e.segment);
        let Some(segment) = segment else {
            panic!("{a} and {b} are not connected");
        };
        self.unlink(segment);
        segment
    }

    pub(crate) fn unlink(&mut self, id: SegmentId) {
        let (start, end) = {
            let s = &self.segments[id.index()];
            (s.start, s.end)
        };
        for node in [start, end] {
            let n = &mut self.nodes[node.index()];
            let before = n.degree();
            n.a_side.retain(|e| e.segment != id);
            n.b_side.retain(|e| e.segment != id);
            assert_eq!(n.degree() + 1, before, "{id} was not linked at {node}");
        }
        self.refresh_around(start);
        self.refresh_around(end);
    }

    pub(crate) fn mark_removed(&mut self, id: SegmentId, time: SimTime) {
        let seg = &mut self.segments[id.index()];
        seg.removed_at = Some(time);
        seg.occupied = false;
        seg.highlighted = false;
    }

    /// Drop a node that has lost all of its edges from the spatial index.
    pub(crate) fn retire(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.index()];
        debug_assert!(node.is_detached());
        if !node.retired {
            node.retired = true;
            let position = node.position;
            self.index.remove(position, id);
        }
    }

    // ── Traversal ─────────────────────────────────────────────────────────

    /// Side of `node` holding `segment`.
    ///
    /// # Panics
    /// Panics if `segment` is not linked at `node`.
    pub fn side_at(&self, node: NodeId, segment: SegmentId) -> Side {
        match self.nodes[node.index()].side_of(segment) {
            Some(side) => side,
            None => panic!("{segment} is not linked at {node}"),
        }
    }

    /// Edges continuing forward after arriving at `node` along `via`: the
    /// edge list on the side opposite the one holding `via`.  Empty when
    /// `node` is an end in that direction.
    pub fn next_edges(&self, node: NodeId, via: SegmentId) -> &[Edge] {
        let side = self.side_at(node, via);
        self.nodes[node.index()].edges(side.opposite())
    }

    // ── Occupancy ─────────────────────────────────────────────────────────

    pub fn set_occupied(&mut self, id: SegmentId, occupied: bool) {
        self.segments[id.index()].occupied = occupied;
    }

    #[inline]
    pub fn is_occupied(&self, id: SegmentId) -> bool {
        self.segments[id.index()].occupied
    }

    /// Clear every occupancy flag (e.g. after removing all vehicles).
    pub fn clear_occupancy(&mut self) {
        for seg in &mut self.segments {
            seg.occupied = false;
        }
    }

    pub fn set_highlighted(&mut self, id: SegmentId, highlighted: bool) {
        self.segments[id.index()].highlighted = highlighted;
    }

    // ── Junction cache ────────────────────────────────────────────────────

    /// The reach an edge pointing into `node` across `via` should hold.
    fn reach_through(&self, node: NodeId, via: SegmentId) -> JunctionReach {
        let n = &self.nodes[node.index()];
        let length = self.segments[via.index()].length;
        if n.is_junction() {
            JunctionReach::at(node, via, length)
        } else if n.is_end() {
            JunctionReach::dead_end(length)
        } else {
            let side = self.side_at(node, via);
            n.edges(side.opposite())[0].reach.extended(length)
        }
    }

    /// Recompute every edge that points into `node`.
    fn refresh_around(&mut self, node: NodeId) {
        let incoming: Vec<SegmentId> = self.nodes[node.index()].all_edges().map(|e| e.segment).collect();
        for via in incoming {
            self.relay(node, via);
        }
    }

    /// Rewrite the edge entering `node` across `via` and carry the change
    /// backwards through straight nodes until it reaches a fixed point.
    fn relay(&mut self, mut node: NodeId, mut via: SegmentId) {
        let mut seen: FxHashSet<(NodeId, SegmentId)> = FxHashSet::default();
        loop {
            let reach = if seen.insert((node, via)) {
                self.reach_through(node, via)
            } else {
                JunctionReach::unbounded()
            };
            let upstream = self.segments[via.index()].other_end(node);
            let up = &mut self.nodes[upstream.index()];
            let Some(edge) = up.edge_via_mut(via) else {
                panic!("{via} is not linked at {upstream}");
            };
            if edge.reach == reach {
                return;
            }
            trace!("reach of {upstream} via {via} -> {:?} at {:.3}", reach.junction, reach.distance);
            edge.reach = reach;

            if !up.is_straight() {
                return;
            }
            let Some(side) = up.side_of(via) else {
                unreachable!("edge lookup above found {via} at {upstream}");
            };
            via = up.edges(side.opposite())[0].segment;
            node = upstream;
        }
    }

    /// Uncached walk to the nearest junction through `edge` at `node`.
    ///
    /// This is the ground truth the edge caches must agree with.
    pub fn walk_to_junction(&self, node: NodeId, edge: &Edge) -> JunctionReach {
        let mut via = edge.segment;
        let mut cur = edge.neighbor;
        let mut distance = self.segments[via.index()].length;
        loop {
            let n = &self.nodes[cur.index()];
            if n.is_junction() {
                return JunctionReach::at(cur, via, distance);
            }
            if n.is_end() {
                return JunctionReach::dead_end(distance);
            }
            let next = n.edges(self.side_at(cur, via).opposite())[0];
            if cur == node && next.segment == edge.segment {
                return JunctionReach::unbounded();
            }
            distance += self.segments[next.segment.index()].length;
            via = next.segment;
            cur = next.neighbor;
        }
    }

    /// Edges whose cached reach disagrees with [`walk_to_junction`]
    /// (distances compared within `tolerance`).
    ///
    /// [`walk_to_junction`]: Self::walk_to_junction
    pub fn junction_cache_mismatches(&self, tolerance: f64) -> Vec<(NodeId, SegmentId)> {
        let mut bad = Vec::new();
        for id in self.live_nodes() {
            for edge in self.node(id).all_edges() {
                let truth = self.walk_to_junction(id, edge);
                let cached = edge.reach;
                let same_distance = if truth.distance.is_infinite() || cached.distance.is_infinite() {
                    truth.distance == cached.distance
                } else {
                    (truth.distance - cached.distance).abs() <= tolerance
                };
                if truth.junction != cached.junction || truth.entry != cached.entry || !same_distance {
                    bad.push((id, edge.segment));
                }
            }
        }
        bad
    }

    /// Edges filed on the wrong side of their node: A-side departures must
    /// have a negative dot product with the node direction, B-side ones a
    /// non-negative one.
    pub fn side_partition_violations(&self) -> Vec<(NodeId, SegmentId)> {
        let mut bad = Vec::new();
        for id in self.live_nodes() {
            let node = self.node(id);
            for side in [Side::A, Side::B] {
                for edge in node.edges(side) {
                    let departure = self.segments[edge.segment.index()].departure_from(id);
                    if node.side_for(departure) != side {
                        bad.push((id, edge.segment));
                    }
                }
            }
        }
        bad
    }
}

impl Default for TrackGraph {
    fn default() -> Self {
        Self::new(TrackConfig::default())
    }
}
