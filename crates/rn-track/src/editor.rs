//! Topology editing: extend, connect, split and remove.
//!
//! Every operation keeps the junction cache consistent (through
//! `add_segment` / `unlink`) and invalidates signal sight outward from the
//! track it touched.  Degenerate requests (too short, no valid tangent
//! geometry, retired nodes) return `None` instead of creating a zero-length
//! segment.

use log::debug;

use rn_core::geom::{angle_deg, flat, flat_dir, ray_intersection};
use rn_core::{DVec2, DVec3, NodeId, SegmentId, SignalId, SimTime};

use crate::graph::TrackGraph;
use crate::node::NodeKind;
use crate::shape::TrackShape;

/// Nodes, segments and signals created by one `extend` or `connect`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackRun {
    /// New nodes in travel order (excludes the endpoints passed in).
    pub nodes:    Vec<NodeId>,
    pub segments: Vec<SegmentId>,
    pub signals:  Vec<SignalId>,
}

impl TrackRun {
    /// Last node of the run, if it created any.
    pub fn last_node(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }
}

/// Outcome of [`TrackGraph::split`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Split {
    /// The split point was within `min_segment_length` of an endpoint; that
    /// endpoint is returned and nothing changed.
    Existing(NodeId),
    /// A new node now divides the old segment into `first` and `second`.
    Created { node: NodeId, first: SegmentId, second: SegmentId },
}

impl Split {
    pub fn node(&self) -> NodeId {
        match *self {
            Split::Existing(node) | Split::Created { node, .. } => node,
        }
    }
}

/// Outcome of [`TrackGraph::remove`].
#[derive(Clone, Debug, PartialEq)]
pub struct Removal {
    pub segment:         SegmentId,
    /// Endpoints left without any edge (now retired).
    pub detached:        Vec<NodeId>,
    pub removed_signals: Vec<SignalId>,
}

impl TrackGraph {
    /// Lay new track from `from` toward `toward`.
    ///
    /// Straight if `toward` lies within `straight_tolerance_deg` of the
    /// node's direction (either way along it), otherwise a circular arc
    /// tangent to that direction at `from`.  With a finite `signal_spacing`
    /// the run is cut into pieces no longer than the spacing, with a signal
    /// at each cut unless one already sits closer than
    /// `spacing * min_signal_gap_ratio` behind it.
    pub fn extend(
        &mut self,
        from: NodeId,
        toward: DVec3,
        signal_spacing: Option<f64>,
    ) -> Option<TrackRun> {
        let node = self.try_node(from).ok()?;
        let start = node.position;
        let delta = toward - start;
        if flat(delta).length() < self.config.min_segment_length {
            debug!("extend from {from} rejected: too short");
            return None;
        }
        let plan = flat_dir(delta)?;
        let tangent = oriented(node.direction, plan);

        let shape = if angle_deg(tangent, plan) <= self.config.straight_tolerance_deg {
            TrackShape::straight(start, toward)
        } else {
            TrackShape::arc_from_tangent(start, tangent.extend(0.0), toward)
                .unwrap_or_else(|| TrackShape::straight(start, toward))
        };
        let run = self.lay_run(from, vec![shape], None, signal_spacing);
        debug!("extended {from} by {} segment(s)", run.segments.len());
        Some(run)
    }

    /// Join two existing nodes with track that is tangent to both.
    ///
    /// - Tangents agree and point along the gap: one straight.
    /// - Tangents agree but are offset sideways: two arcs meeting at the
    ///   midpoint (reverse curve).
    /// - Otherwise the direction rays are intersected; the node farther from
    ///   the intersection gets a straight lead-in and the nearer one an arc,
    ///   meeting at a synthesised node whose height is interpolated by plan
    ///   length.
    ///
    /// Returns `None` for gaps shorter than `min_segment_length`, rays that
    /// do not meet ahead of both nodes, or retired nodes.
    pub fn connect(
        &mut self,
        a: NodeId,
        b: NodeId,
        signal_spacing: Option<f64>,
    ) -> Option<TrackRun> {
        let pieces = self.connector(a, b)?;
        let run = self.lay_run(a, pieces, Some(b), signal_spacing);
        debug!("connected {a} to {b} with {} segment(s)", run.segments.len());
        Some(run)
    }

    /// Track shapes joining `a` to `b`; `None` if any piece would be shorter
    /// than `min_segment_length`.
    fn connector(&self, a: NodeId, b: NodeId) -> Option<Vec<TrackShape>> {
        let pieces = self.connector_pieces(a, b)?;
        let min = self.config.min_segment_length;
        if pieces.iter().any(|p| p.length() < min) {
            debug!("connect {a}-{b} rejected: a piece is shorter than {min}");
            return None;
        }
        Some(pieces)
    }

    fn connector_pieces(&self, a: NodeId, b: NodeId) -> Option<Vec<TrackShape>> {
        let (na, nb) = (self.try_node(a).ok()?, self.try_node(b).ok()?);
        let (pa, pb) = (na.position, nb.position);
        let min = self.config.min_segment_length;
        let tol = self.config.straight_tolerance_deg;
        if flat(pb - pa).length() < min {
            return None;
        }
        let plan = flat_dir(pb - pa)?;
        // Leaving `a` toward `b`, and leaving `b` toward `a`.
        let ta = oriented(na.direction, plan);
        let tb = oriented(nb.direction, -plan);

        if angle_deg(ta, -tb) <= tol {
            if angle_deg(ta, plan) <= tol {
                return Some(vec![TrackShape::straight(pa, pb)]);
            }
            let mid = pa.lerp(pb, 0.5);
            let first = TrackShape::arc_from_tangent(pa, ta.extend(0.0), mid)?;
            let second = TrackShape::arc_from_tangent(pb, tb.extend(0.0), mid)?.reversed();
            return Some(vec![first, second]);
        }

        let (s, u) = ray_intersection(flat(pa), ta, flat(pb), tb)?;
        if s <= 0.0 || u <= 0.0 {
            debug!("connect {a}-{b} rejected: direction rays do not meet ahead");
            return None;
        }
        if (s - u).abs() < min {
            return Some(vec![TrackShape::arc_from_tangent(pa, ta.extend(0.0), pb)?]);
        }

        if s > u {
            // `a` is farther from the intersection: straight, then arc into `b`.
            let lead = s - u;
            let meet = flat(pa) + ta * lead;
            let arc_plan = plan_arc_length(meet, ta, flat(pb))?;
            let z = pa.z + (pb.z - pa.z) * lead / (lead + arc_plan);
            let meet = meet.extend(z);
            Some(vec![
                TrackShape::straight(pa, meet),
                TrackShape::arc_from_tangent(meet, ta.extend(0.0), pb)?,
            ])
        } else {
            // `b` is farther: arc out of `a`, then straight into `b`.
            let lead = u - s;
            let meet = flat(pb) + tb * lead;
            let arc_plan = plan_arc_length(flat(pa), ta, meet)?;
            let z = pa.z + (pb.z - pa.z) * arc_plan / (arc_plan + lead);
            let meet = meet.extend(z);
            Some(vec![
                TrackShape::arc_from_tangent(pa, ta.extend(0.0), meet)?,
                TrackShape::straight(meet, pb),
            ])
        }
    }

    /// Divide `segment` at `fraction`.
    ///
    /// Signals on the adjoining nodes are left untouched; sight is
    /// invalidated outward from both original endpoints and the old segment
    /// is stamped removed at `time`.  Reservation state carries over to both
    /// halves.
    ///
    /// # Panics
    /// Panics if `segment` has already been removed.
    pub fn split(&mut self, segment: SegmentId, fraction: f64, time: SimTime) -> Split {
        let old = self.segment(segment).clone();
        assert!(!old.is_removed(), "cannot split removed {segment}");

        let fraction = fraction.clamp(0.0, 1.0);
        let min = self.config.min_segment_length;
        if old.length * fraction < min {
            return Split::Existing(old.start);
        }
        if old.length * (1.0 - fraction) < min {
            return Split::Existing(old.end);
        }

        let head = old.shape.sub(0.0, fraction);
        let tail = old.shape.sub(fraction, 1.0);
        let node = self.add_node(head.end(), head.direction_at(1.0), NodeKind::Track);

        self.unlink(segment);
        self.mark_removed(segment, time);
        let first = self.add_segment(head, old.start, node);
        let second = self.add_segment(tail, node, old.end);
        self.set_occupied(first, old.occupied);
        self.set_occupied(second, old.occupied);

        self.invalidate_visibility(old.start, first);
        self.invalidate_visibility(old.end, second);
        debug!("split {segment} at {fraction:.3} -> {node} ({first}, {second})");
        Split::Created { node, first, second }
    }

    /// Remove `segment` from the network as of `time`.
    ///
    /// Sight is invalidated before unlinking so the outward walk still sees
    /// the segment.  Endpoints left without edges are retired and lose their
    /// signal.  Returns `None` if the segment was already removed.
    pub fn remove(&mut self, segment: SegmentId, time: SimTime) -> Option<Removal> {
        let seg = self.try_segment(segment).ok()?;
        let (start, end) = (seg.start, seg.end);

        self.invalidate_visibility(start, segment);
        self.invalidate_visibility(end, segment);
        self.unlink(segment);
        self.mark_removed(segment, time);

        let mut removal = Removal { segment, detached: Vec::new(), removed_signals: Vec::new() };
        for node in [start, end] {
            if !self.node(node).is_detached() {
                continue;
            }
            if let Some(signal) = self.signal_at(node) {
                if self.remove_signal(signal, time).is_ok() {
                    removal.removed_signals.push(signal);
                }
            }
            self.retire(node);
            removal.detached.push(node);
        }
        debug!("removed {segment} at {time}; detached {:?}", removal.detached);
        Some(removal)
    }

    /// Lay `pieces` end to end starting at `from`, creating intermediate
    /// nodes and closing onto `to` if given.
    fn lay_run(
        &mut self,
        from: NodeId,
        pieces: Vec<TrackShape>,
        to: Option<NodeId>,
        signal_spacing: Option<f64>,
    ) -> TrackRun {
        let spacing = signal_spacing.filter(|s| s.is_finite() && *s > 0.0);
        let departure = pieces[0].direction_at(0.0);
        let mut since_signal = match spacing {
            Some(s) => self.distance_to_signal_behind(from, departure, s),
            None => 0.0,
        };

        let mut run = TrackRun::default();
        let mut prev = from;
        let last_piece = pieces.len() - 1;
        for (i, piece) in pieces.iter().enumerate() {
            let count = match spacing {
                Some(s) => ((piece.length() / s).ceil() as usize).max(1),
                None => 1,
            };
            for k in 0..count {
                let sub = if count == 1 {
                    *piece
                } else {
                    piece.sub(k as f64 / count as f64, (k + 1) as f64 / count as f64)
                };
                let closing = i == last_piece && k + 1 == count;
                let next = match to {
                    Some(to) if closing => to,
                    _ => {
                        let n = self.add_node(sub.end(), sub.direction_at(1.0), NodeKind::Track);
                        run.nodes.push(n);
                        n
                    }
                };
                run.segments.push(self.add_segment(sub, prev, next));

                if let Some(s) = spacing {
                    since_signal += sub.length();
                    let gap = s * self.config.min_signal_gap_ratio;
                    if since_signal + 1e-9 >= gap && self.signal_at(next).is_none() {
                        let facing = self.node(next).direction.dot(sub.direction_at(1.0)) >= 0.0;
                        if let Ok(signal) = self.place_signal(next, facing, true) {
                            run.signals.push(signal);
                            since_signal = 0.0;
                        }
                    }
                }
                prev = next;
            }
        }

        if let Some(&first) = run.segments.first() {
            self.invalidate_visibility(from, first);
        }
        if let (Some(to), Some(&last)) = (to, run.segments.last()) {
            self.invalidate_visibility(to, last);
        }
        run
    }

    /// Track distance behind `from` (against `departure`) to the nearest
    /// signal, capped at `cap`.  Stops at junctions.
    fn distance_to_signal_behind(&self, from: NodeId, departure: DVec3, cap: f64) -> f64 {
        if self.signal_at(from).is_some() {
            return 0.0;
        }
        let node = self.node(from);
        let behind = node.edges(node.side_for(departure).opposite());
        let [first] = behind else {
            return cap;
        };
        let mut edge = *first;
        let mut distance = 0.0;
        loop {
            distance += self.segment(edge.segment).length;
            if distance >= cap {
                return cap;
            }
            if self.signal_at(edge.neighbor).is_some() {
                return distance;
            }
            match self.next_edges(edge.neighbor, edge.segment) {
                [next] => edge = *next,
                _ => return cap,
            }
        }
    }
}

/// `direction` flipped if needed so it points along `plan`; `plan` itself
/// when the node has no horizontal direction yet.
fn oriented(direction: DVec3, plan: DVec2) -> DVec2 {
    match flat_dir(direction) {
        Some(d) if d.dot(plan) >= 0.0 => d,
        Some(d) => -d,
        None => plan,
    }
}

/// Plan-view length of the arc leaving `start` along `tangent` to `end`.
fn plan_arc_length(start: DVec2, tangent: DVec2, end: DVec2) -> Option<f64> {
    TrackShape::arc_from_tangent(start.extend(0.0), tangent.extend(0.0), end.extend(0.0))
        .map(|arc| arc.length())
}
