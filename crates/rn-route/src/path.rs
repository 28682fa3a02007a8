//! Reserved paths and the persistent trail used while searching for them.

use std::rc::Rc;

use rn_core::SegmentId;
use rn_track::TrackGraph;

// ── ReservedPath ──────────────────────────────────────────────────────────────

/// An ordered run of segments with its total length.
///
/// `occupied` is true if any segment was already marked occupied when the
/// path was computed.  A path returned by a successful reservation always
/// has `occupied == false` and all its segments are now marked occupied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReservedPath {
    pub segments: Vec<SegmentId>,
    pub length:   f64,
    pub occupied: bool,
}

impl ReservedPath {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn last(&self) -> Option<SegmentId> {
        self.segments.last().copied()
    }

    /// Append `segment`, reading its length and occupancy from `graph`.
    pub fn push(&mut self, graph: &TrackGraph, segment: SegmentId) {
        self.length += graph.segment(segment).length;
        self.occupied |= graph.is_occupied(segment);
        self.segments.push(segment);
    }

    /// Append every segment of `other`.
    pub fn append(&mut self, other: &ReservedPath) {
        self.segments.extend_from_slice(&other.segments);
        self.length += other.length;
        self.occupied |= other.occupied;
    }

    /// Ranking key: length, plus `penalty` if any segment is occupied.
    #[inline]
    pub fn score(&self, penalty: f64) -> f64 {
        if self.occupied { self.length + penalty } else { self.length }
    }
}

// ── Trail ─────────────────────────────────────────────────────────────────────

/// Immutable cons list of walked segments, newest first.
///
/// Branches of a depth-first walk share their common prefix through `Rc`
/// instead of pushing to and popping from one mutable buffer.
#[derive(Debug)]
pub(crate) struct Trail {
    segment:  SegmentId,
    parent:   Option<Rc<Trail>>,
    pub(crate) length:   f64,
    pub(crate) occupied: bool,
}

impl Trail {
    pub(crate) fn start(graph: &TrackGraph, segment: SegmentId) -> Rc<Trail> {
        Rc::new(Trail {
            segment,
            parent: None,
            length: graph.segment(segment).length,
            occupied: graph.is_occupied(segment),
        })
    }

    pub(crate) fn step(self: &Rc<Self>, graph: &TrackGraph, segment: SegmentId) -> Rc<Trail> {
        Rc::new(Trail {
            segment,
            parent: Some(Rc::clone(self)),
            length: self.length + graph.segment(segment).length,
            occupied: self.occupied || graph.is_occupied(segment),
        })
    }

    #[inline]
    pub(crate) fn head(&self) -> SegmentId {
        self.segment
    }

    /// Segments from the newest back to the first.
    fn iter(&self) -> impl Iterator<Item = &Trail> {
        std::iter::successors(Some(self), |t| t.parent.as_deref())
    }

    pub(crate) fn contains(&self, segment: SegmentId) -> bool {
        self.iter().any(|t| t.segment == segment)
    }

    /// Materialise into a path in travel order.
    pub(crate) fn to_path(&self) -> ReservedPath {
        let mut segments: Vec<SegmentId> = self.iter().map(|t| t.segment).collect();
        segments.reverse();
        ReservedPath { segments, length: self.length, occupied: self.occupied }
    }
}
