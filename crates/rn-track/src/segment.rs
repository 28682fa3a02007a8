//! Track segments: immutable geometry between two nodes.

use rn_core::{DVec3, NodeId, SimTime};

use crate::shape::{ShapeKind, TrackShape};

/// One piece of track between `start` and `end`.
///
/// Geometry never changes after creation; only the occupancy flag, the
/// highlight marker and the removal stamp are mutable.  `shape.direction_at(0)`
/// is parallel (or anti-parallel) to the start node's direction.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackSegment {
    pub shape: TrackShape,
    pub start: NodeId,
    pub end:   NodeId,
    /// Cached `shape.length()`.
    pub length: f64,
    /// Set by a reservation; cleared by the vehicle once it has passed.
    pub occupied: bool,
    /// Transient marker for editor previews.
    pub highlighted: bool,
    /// Simulation time the segment was removed from the network, if it was.
    pub removed_at: Option<SimTime>,
}

impl TrackSegment {
    pub(crate) fn new(shape: TrackShape, start: NodeId, end: NodeId) -> Self {
        Self {
            length: shape.length(),
            shape,
            start,
            end,
            occupied: false,
            highlighted: false,
            removed_at: None,
        }
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed_at.is_some()
    }

    #[inline]
    pub fn position_at(&self, fraction: f64) -> DVec3 {
        self.shape.position_at(fraction)
    }

    #[inline]
    pub fn direction_at(&self, fraction: f64) -> DVec3 {
        self.shape.direction_at(fraction)
    }

    /// The endpoint that is not `node`.
    ///
    /// # Panics
    /// Panics if `node` is not an endpoint of this segment.
    #[inline]
    pub fn other_end(&self, node: NodeId) -> NodeId {
        if node == self.start {
            self.end
        } else {
            assert_eq!(node, self.end, "{node} is not an endpoint of this segment");
            self.start
        }
    }

    /// Direction of travel when leaving `node` along this segment.
    pub fn departure_from(&self, node: NodeId) -> DVec3 {
        if node == self.start {
            self.shape.direction_at(0.0)
        } else {
            -self.shape.direction_at(1.0)
        }
    }
}
