//! Track nodes and their two-sided edge lists.
//!
//! # Side partition
//!
//! Every node has a horizontal direction vector.  Edges whose departure
//! direction has a negative dot product with it live on the **A side**; the rest live on the
//! **B side**.  Moving from an A-side edge through the node onto a B-side
//! edge is travelling in the node's canonical ("forward") direction.
//!
//! # Junction cache
//!
//! Each [`Edge`] carries a [`JunctionReach`]: the nearest junction reached by
//! leaving the node along that edge without passing another junction, the
//! segment through which it is entered, and the track distance to it.  It is
//! denormalised data kept consistent by `TrackGraph` on every edit.

use rn_core::geom::flat_dir;
use rn_core::{DVec3, NodeId, SegmentId, SignalId};

/// Which edge list of a node.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    A,
    B,
}

impl Side {
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// Node type tag.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// Plain track geometry point.
    #[default]
    Track,
    /// Stopping point for passenger or cargo service.
    Platform,
    /// End-of-line buffer stop.
    Buffer,
}

/// Cached nearest junction reachable through an edge.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JunctionReach {
    /// `None` when the walk ends at a dead end or circles forever.
    pub junction: Option<NodeId>,
    /// Segment through which `junction` is entered.
    pub entry: Option<SegmentId>,
    /// Track distance to the junction (or to the dead end; `+inf` on a
    /// junction-free loop).
    pub distance: f64,
}

impl JunctionReach {
    /// Placeholder stored on freshly linked edges until propagation runs.
    pub const EMPTY: JunctionReach = JunctionReach { junction: None, entry: None, distance: 0.0 };

    #[inline]
    pub fn at(junction: NodeId, entry: SegmentId, distance: f64) -> Self {
        Self { junction: Some(junction), entry: Some(entry), distance }
    }

    #[inline]
    pub fn dead_end(distance: f64) -> Self {
        Self { junction: None, entry: None, distance }
    }

    /// The walk never meets a junction or an end.
    #[inline]
    pub fn unbounded() -> Self {
        Self::dead_end(f64::INFINITY)
    }

    /// The same reach seen from one segment further back.
    #[inline]
    pub fn extended(self, length: f64) -> Self {
        Self { distance: self.distance + length, ..self }
    }
}

/// One connection from a node to a neighbour.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub neighbor: NodeId,
    pub segment:  SegmentId,
    pub reach:    JunctionReach,
}

/// A graph vertex.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackNode {
    pub position:  DVec3,
    /// Unit canonical direction in the horizontal plane.  Zero until the
    /// first segment sets it.
    pub direction: DVec3,
    pub kind:      NodeKind,
    pub(crate) a_side: Vec<Edge>,
    pub(crate) b_side: Vec<Edge>,
    pub(crate) signal: Option<SignalId>,
    pub(crate) retired: bool,
}

impl TrackNode {
    pub(crate) fn new(position: DVec3, direction: DVec3, kind: NodeKind) -> Self {
        Self {
            position,
            direction: horizontal(direction),
            kind,
            a_side: Vec::new(),
            b_side: Vec::new(),
            signal: None,
            retired: false,
        }
    }

    #[inline]
    pub fn edges(&self, side: Side) -> &[Edge] {
        match side {
            Side::A => &self.a_side,
            Side::B => &self.b_side,
        }
    }

    #[inline]
    pub(crate) fn edges_mut(&mut self, side: Side) -> &mut Vec<Edge> {
        match side {
            Side::A => &mut self.a_side,
            Side::B => &mut self.b_side,
        }
    }

    /// Both edge lists, A side first.
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.a_side.iter().chain(self.b_side.iter())
    }

    pub fn degree(&self) -> usize {
        self.a_side.len() + self.b_side.len()
    }

    /// Network-critical: more than one edge on at least one side.
    #[inline]
    pub fn is_junction(&self) -> bool {
        self.a_side.len() > 1 || self.b_side.len() > 1
    }

    /// At least one side has no edges.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.a_side.is_empty() || self.b_side.is_empty()
    }

    /// Exactly one edge per side.
    #[inline]
    pub fn is_straight(&self) -> bool {
        self.a_side.len() == 1 && self.b_side.len() == 1
    }

    #[inline]
    pub fn is_detached(&self) -> bool {
        self.a_side.is_empty() && self.b_side.is_empty()
    }

    /// Removed from the network after losing its last edge.
    #[inline]
    pub fn is_retired(&self) -> bool {
        self.retired
    }

    #[inline]
    pub fn signal(&self) -> Option<SignalId> {
        self.signal
    }

    /// Side whose edge list holds `segment`.
    pub fn side_of(&self, segment: SegmentId) -> Option<Side> {
        if self.a_side.iter().any(|e| e.segment == segment) {
            Some(Side::A)
        } else if self.b_side.iter().any(|e| e.segment == segment) {
            Some(Side::B)
        } else {
            None
        }
    }

    pub fn edge_via(&self, segment: SegmentId) -> Option<&Edge> {
        self.all_edges().find(|e| e.segment == segment)
    }

    pub(crate) fn edge_via_mut(&mut self, segment: SegmentId) -> Option<&mut Edge> {
        self.a_side
            .iter_mut()
            .chain(self.b_side.iter_mut())
            .find(|e| e.segment == segment)
    }

    /// Side an edge departing along `departure` belongs to.
    #[inline]
    pub fn side_for(&self, departure: DVec3) -> Side {
        if self.direction.dot(departure) < 0.0 { Side::A } else { Side::B }
    }
}

/// Unit horizontal part of `v`, or zero when `v` is vertical or zero.
pub(crate) fn horizontal(v: DVec3) -> DVec3 {
    flat_dir(v).map_or(DVec3::ZERO, |d| d.extend(0.0))
}
