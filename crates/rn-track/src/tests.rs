//! Unit tests for rn-track.
//!
//! Networks are built by hand on the `z = 0` plane unless a test is about
//! grade.

#[cfg(test)]
pub(crate) mod helpers {
    use rn_core::{DVec3, NodeId, SegmentId};

    use crate::{NodeKind, TrackGraph, TrackShape};

    /// `n` nodes on the x axis, `spacing` apart, joined by straights.
    pub fn line(n: usize, spacing: f64) -> (TrackGraph, Vec<NodeId>, Vec<SegmentId>) {
        let mut g = TrackGraph::default();
        let nodes: Vec<NodeId> = (0..n)
            .map(|i| g.add_node(DVec3::new(i as f64 * spacing, 0.0, 0.0), DVec3::X, NodeKind::Track))
            .collect();
        let segments = nodes
            .windows(2)
            .map(|w| {
                let shape = TrackShape::straight(g.node(w[0]).position, g.node(w[1]).position);
                g.add_segment(shape, w[0], w[1])
            })
            .collect();
        (g, nodes, segments)
    }

    /// Trunk `n0 -> n1`, then a straight `n1 -> n2` and a curved branch
    /// `n1 -> n3` diverging to the left.
    ///
    /// ```text
    ///                    n3
    ///                 .-'
    ///   n0 ------ n1 -------- n2
    /// ```
    pub fn y_junction() -> (TrackGraph, [NodeId; 4], [SegmentId; 3]) {
        let mut g = TrackGraph::default();
        let n0 = g.add_node(DVec3::new(0.0, 0.0, 0.0), DVec3::X, NodeKind::Track);
        let n1 = g.add_node(DVec3::new(10.0, 0.0, 0.0), DVec3::X, NodeKind::Track);
        let n2 = g.add_node(DVec3::new(20.0, 0.0, 0.0), DVec3::X, NodeKind::Track);
        let s0 = g.add_segment(TrackShape::straight(g.node(n0).position, g.node(n1).position), n0, n1);
        let s1 = g.add_segment(TrackShape::straight(g.node(n1).position, g.node(n2).position), n1, n2);

        let branch = TrackShape::arc_from_tangent(
            DVec3::new(10.0, 0.0, 0.0),
            DVec3::X,
            DVec3::new(20.0, 5.0, 0.0),
        )
        .unwrap();
        let n3 = g.add_node(branch.end(), branch.direction_at(1.0), NodeKind::Track);
        let s2 = g.add_segment(branch, n1, n3);
        (g, [n0, n1, n2, n3], [s0, s1, s2])
    }

    /// A circle of radius 10 made of four quarter arcs; no junctions.
    pub fn ring() -> (TrackGraph, Vec<NodeId>) {
        let mut g = TrackGraph::default();
        let points = [
            (DVec3::new(10.0, 0.0, 0.0), DVec3::Y),
            (DVec3::new(0.0, 10.0, 0.0), DVec3::NEG_X),
            (DVec3::new(-10.0, 0.0, 0.0), DVec3::NEG_Y),
            (DVec3::new(0.0, -10.0, 0.0), DVec3::X),
        ];
        let nodes: Vec<NodeId> =
            points.iter().map(|&(p, d)| g.add_node(p, d, NodeKind::Track)).collect();
        for i in 0..4 {
            let (p, d) = points[i];
            let (q, _) = points[(i + 1) % 4];
            let arc = TrackShape::arc_from_tangent(p, d, q).unwrap();
            g.add_segment(arc, nodes[i], nodes[(i + 1) % 4]);
        }
        (g, nodes)
    }

    pub fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }
}

// ── Shapes ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod shape {
    use std::f64::consts::FRAC_PI_2;

    use rn_core::DVec3;

    use super::helpers::approx;
    use crate::{ShapeKind, TrackShape};

    fn close(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < 1e-6
    }

    #[test]
    fn straight_length_includes_grade() {
        let s = TrackShape::straight(DVec3::ZERO, DVec3::new(3.0, 0.0, 4.0));
        assert!(approx(s.length(), 5.0));
        assert_eq!(s.kind(), ShapeKind::Straight);
    }

    #[test]
    fn left_quarter_arc() {
        let arc = TrackShape::arc_from_tangent(DVec3::ZERO, DVec3::X, DVec3::new(10.0, 10.0, 0.0))
            .unwrap();
        assert_eq!(arc.kind(), ShapeKind::Arc);
        assert!(approx(arc.length(), 10.0 * FRAC_PI_2));
        assert!(close(arc.start(), DVec3::ZERO));
        assert!(close(arc.end(), DVec3::new(10.0, 10.0, 0.0)));
        assert!(close(arc.direction_at(0.0), DVec3::X));
        assert!(close(arc.direction_at(1.0), DVec3::Y));
    }

    #[test]
    fn right_quarter_arc() {
        let arc = TrackShape::arc_from_tangent(DVec3::ZERO, DVec3::X, DVec3::new(10.0, -10.0, 0.0))
            .unwrap();
        assert!(close(arc.direction_at(0.0), DVec3::X));
        assert!(close(arc.direction_at(1.0), DVec3::NEG_Y));
        assert!(close(arc.end(), DVec3::new(10.0, -10.0, 0.0)));
    }

    #[test]
    fn arc_to_point_on_tangent_line_is_rejected() {
        assert!(TrackShape::arc_from_tangent(DVec3::ZERO, DVec3::X, DVec3::new(10.0, 0.0, 0.0))
            .is_none());
        assert!(TrackShape::arc_from_tangent(DVec3::ZERO, DVec3::Z, DVec3::new(5.0, 5.0, 0.0))
            .is_none());
    }

    #[test]
    fn sub_pieces_add_up() {
        let arc = TrackShape::arc_from_tangent(DVec3::ZERO, DVec3::X, DVec3::new(10.0, 10.0, 2.0))
            .unwrap();
        let head = arc.sub(0.0, 0.3);
        let tail = arc.sub(0.3, 1.0);
        assert!(approx(head.length() + tail.length(), arc.length()));
        assert!(close(head.end(), tail.start()));
        assert!(close(tail.end(), arc.end()));
    }

    #[test]
    fn reversed_swaps_ends_and_flips_direction() {
        let arc = TrackShape::arc_from_tangent(DVec3::ZERO, DVec3::X, DVec3::new(10.0, 10.0, 0.0))
            .unwrap();
        let rev = arc.reversed();
        assert!(close(rev.start(), arc.end()));
        assert!(close(rev.end(), arc.start()));
        assert!(close(rev.direction_at(0.0), -arc.direction_at(1.0)));
        assert!(approx(rev.length(), arc.length()));
    }
}

// ── Graph structure & junction cache ───────────────────────────────────────────

#[cfg(test)]
mod graph {
    use rand::rngs::SmallRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    use rn_core::{DVec3, NodeId, SegmentId, SimTime};

    use super::helpers::{approx, line, ring, y_junction};
    use crate::{JunctionReach, Side};

    #[test]
    fn line_classification() {
        let (g, n, _) = line(3, 10.0);
        assert!(g.node(n[0]).is_end());
        assert!(g.node(n[1]).is_straight());
        assert!(g.node(n[2]).is_end());
        assert!(!g.node(n[1]).is_junction());
    }

    #[test]
    fn edges_land_on_departure_side() {
        let (g, n, s) = line(3, 10.0);
        assert_eq!(g.side_at(n[1], s[0]), Side::A);
        assert_eq!(g.side_at(n[1], s[1]), Side::B);
        assert!(g.side_partition_violations().is_empty());
    }

    #[test]
    fn next_edges_continue_through_node() {
        let (g, n, s) = line(3, 10.0);
        let next = g.next_edges(n[1], s[0]);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].segment, s[1]);
        assert!(g.next_edges(n[2], s[1]).is_empty());
    }

    #[test]
    fn dead_end_chain_reports_distance_to_end() {
        let (g, n, s) = line(4, 10.0);
        let edge = g.node(n[0]).edge_via(s[0]).unwrap();
        assert_eq!(edge.reach.junction, None);
        assert!(approx(edge.reach.distance, 30.0));
        assert!(g.junction_cache_mismatches(1e-9).is_empty());
    }

    #[test]
    fn junction_classification_and_reach() {
        let (g, [n0, n1, n2, n3], [s0, s1, s2]) = y_junction();
        assert!(g.node(n1).is_junction());
        assert_eq!(g.node(n1).edges(Side::B).len(), 2);

        let from_trunk = g.node(n0).edge_via(s0).unwrap().reach;
        assert_eq!(from_trunk, JunctionReach::at(n1, s0, 10.0));
        let from_straight = g.node(n2).edge_via(s1).unwrap().reach;
        assert_eq!(from_straight, JunctionReach::at(n1, s1, 10.0));
        let from_branch = g.node(n3).edge_via(s2).unwrap().reach;
        assert_eq!(from_branch.junction, Some(n1));
        assert_eq!(from_branch.entry, Some(s2));
        assert!(g.junction_cache_mismatches(1e-9).is_empty());
    }

    #[test]
    fn disconnect_demotes_junction() {
        let (mut g, [n0, n1, _, n3], [_, _, s2]) = y_junction();
        assert_eq!(g.disconnect(n1, n3), s2);
        assert!(g.node(n1).is_straight());
        assert!(g.junction_cache_mismatches(1e-9).is_empty());
        let reach = g.node(n0).all_edges().next().unwrap().reach;
        assert_eq!(reach.junction, None);
        assert!(approx(reach.distance, 20.0));
    }

    #[test]
    fn junction_free_loop_is_unbounded() {
        let (g, nodes) = ring();
        for id in nodes {
            assert!(g.node(id).is_straight());
            for edge in g.node(id).all_edges() {
                assert_eq!(edge.reach, JunctionReach::unbounded());
            }
        }
        assert!(g.junction_cache_mismatches(1e-9).is_empty());
        assert!(g.side_partition_violations().is_empty());
    }

    #[test]
    fn cache_matches_ground_truth_after_random_edits() {
        for seed in 0..40 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let (mut g, _, _) = line(4, 20.0);
            for step in 0..150 {
                let nodes: Vec<NodeId> = g.live_nodes().collect();
                let segments: Vec<SegmentId> = g.live_segments().collect();
                let time = SimTime(step as f64);
                let spacing = rng.gen_bool(0.5).then(|| rng.gen_range(5.0..25.0));
                match rng.gen_range(0..4) {
                    0 => {
                        if let Some(&from) = nodes.choose(&mut rng) {
                            let offset = DVec3::new(
                                rng.gen_range(-40.0..40.0),
                                rng.gen_range(-40.0..40.0),
                                rng.gen_range(-4.0..4.0),
                            );
                            let toward = g.node(from).position + offset;
                            g.extend(from, toward, spacing);
                        }
                    }
                    1 => {
                        if let Some(&seg) = segments.choose(&mut rng) {
                            g.split(seg, rng.gen_range(0.0..1.0), time);
                        }
                    }
                    2 if segments.len() > 4 => {
                        if let Some(&seg) = segments.choose(&mut rng) {
                            g.remove(seg, time);
                        }
                    }
                    _ => {
                        let pair: Vec<NodeId> = nodes.choose_multiple(&mut rng, 2).copied().collect();
                        if let [a, b] = pair[..] {
                            g.connect(a, b, spacing);
                        }
                    }
                }
                assert!(
                    g.junction_cache_mismatches(1e-6).is_empty(),
                    "cache drifted at seed {seed} step {step}"
                );
                assert!(
                    g.side_partition_violations().is_empty(),
                    "side mix-up at seed {seed} step {step}"
                );
            }
        }
    }

    #[test]
    fn nearest_node_snaps_within_radius() {
        let (mut g, n, s) = line(3, 10.0);
        assert_eq!(g.nearest_node(DVec3::new(11.0, 1.0, 0.0), 5.0), Some(n[1]));
        assert_eq!(g.nearest_node(DVec3::new(11.0, 1.0, 0.0), 0.5), None);

        g.remove(s[1], SimTime::ZERO).unwrap();
        assert_eq!(g.indexed_node_count(), 2);
        assert_eq!(g.nearest_node(DVec3::new(20.0, 0.0, 0.0), 1.0), None);
    }

    #[test]
    fn occupancy_flags() {
        let (mut g, _, s) = line(3, 10.0);
        g.set_occupied(s[0], true);
        assert!(g.is_occupied(s[0]));
        assert!(!g.is_occupied(s[1]));
        g.clear_occupancy();
        assert!(!g.is_occupied(s[0]));
    }
}

// ── Signals ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod signals {
    use rn_core::SimTime;

    use super::helpers::{approx, line};
    use crate::{Side, TrackError};

    #[test]
    fn facing_governs_forward_arrivals() {
        let (mut g, n, _) = line(3, 10.0);
        let sig = g.place_signal(n[1], true, false).unwrap();
        let signal = g.signal(sig);
        assert!(signal.governs(Side::A));
        assert!(!signal.governs(Side::B));
        assert!(!signal.permits(Side::B));
        assert_eq!(signal.departure_side(), Side::B);
    }

    #[test]
    fn one_signal_per_node() {
        let (mut g, n, _) = line(3, 10.0);
        let first = g.place_signal(n[1], true, true).unwrap();
        let err = g.place_signal(n[1], false, true).unwrap_err();
        assert!(matches!(err, TrackError::SignalExists { signal, .. } if signal == first));
    }

    #[test]
    fn sight_reaches_next_governing_signal() {
        let (mut g, n, _) = line(5, 10.0);
        let a = g.place_signal(n[1], true, true).unwrap();
        let b = g.place_signal(n[3], true, true).unwrap();
        assert!(approx(g.signal_sight(a).unwrap(), 20.0));
        assert_eq!(g.signal_sight(b), None);
    }

    #[test]
    fn blocking_signal_hides_everything_behind_it() {
        let (mut g, n, _) = line(5, 10.0);
        let a = g.place_signal(n[1], true, true).unwrap();
        g.place_signal(n[2], false, false).unwrap();
        g.place_signal(n[3], true, true).unwrap();
        assert_eq!(g.signal_sight(a), None);
    }

    #[test]
    fn placing_a_signal_stales_the_one_behind() {
        let (mut g, n, _) = line(5, 10.0);
        let a = g.place_signal(n[1], true, true).unwrap();
        assert_eq!(g.signal_sight(a), None);
        assert!(!g.signal(a).is_stale());

        g.place_signal(n[3], true, true).unwrap();
        assert!(g.signal(a).is_stale());
        assert!(approx(g.signal_sight(a).unwrap(), 20.0));
    }

    #[test]
    fn removing_a_signal_restores_longer_sight() {
        let (mut g, n, _) = line(5, 10.0);
        let a = g.place_signal(n[1], true, true).unwrap();
        let mid = g.place_signal(n[2], true, true).unwrap();
        g.place_signal(n[4], true, true).unwrap();
        assert!(approx(g.signal_sight(a).unwrap(), 10.0));

        g.remove_signal(mid, SimTime(1.0)).unwrap();
        assert!(g.signal(mid).is_removed());
        assert_eq!(g.signal_at(n[2]), None);
        assert!(g.signal(a).is_stale());
        assert!(approx(g.signal_sight(a).unwrap(), 30.0));
    }

    #[test]
    fn split_invalidates_adjacent_signals() {
        let (mut g, n, s) = line(5, 10.0);
        let a = g.place_signal(n[1], true, true).unwrap();
        g.place_signal(n[3], true, true).unwrap();
        g.signal_sight(a);

        g.split(s[1], 0.5, SimTime(2.0));
        assert!(g.signal(a).is_stale());
        assert!(approx(g.signal_sight(a).unwrap(), 20.0));
    }

    #[test]
    fn invalidation_stops_at_first_signal() {
        let (mut g, n, s) = line(5, 10.0);
        let near = g.place_signal(n[2], true, true).unwrap();
        let far = g.place_signal(n[1], true, true).unwrap();
        g.signal_sight(near);
        g.signal_sight(far);

        g.invalidate_visibility(n[3], s[3]);
        assert!(g.signal(near).is_stale());
        assert!(!g.signal(far).is_stale());
    }
}

// ── Editor ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod editor {
    use rn_core::{DVec3, SimTime};

    use super::helpers::{approx, line};
    use crate::{NodeKind, ShapeKind, Split, TrackGraph};

    fn close(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < 1e-6
    }

    #[test]
    fn extend_straight_ahead() {
        let mut g = TrackGraph::default();
        let a = g.add_node(DVec3::ZERO, DVec3::X, NodeKind::Track);
        let run = g.extend(a, DVec3::new(30.0, 0.0, 0.0), None).unwrap();
        assert_eq!(run.nodes.len(), 1);
        assert_eq!(run.segments.len(), 1);
        assert!(run.signals.is_empty());
        assert_eq!(g.segment(run.segments[0]).kind(), ShapeKind::Straight);
        assert!(approx(g.segment(run.segments[0]).length, 30.0));
    }

    #[test]
    fn extend_off_axis_lays_an_arc() {
        let mut g = TrackGraph::default();
        let a = g.add_node(DVec3::ZERO, DVec3::X, NodeKind::Track);
        let target = DVec3::new(20.0, 10.0, 0.0);
        let run = g.extend(a, target, None).unwrap();
        let seg = g.segment(run.segments[0]);
        assert_eq!(seg.kind(), ShapeKind::Arc);
        assert!(close(seg.position_at(1.0), target));
        assert!(close(seg.direction_at(0.0), DVec3::X));
        assert!(g.side_partition_violations().is_empty());
    }

    #[test]
    fn extend_backwards_uses_reversed_tangent() {
        let (mut g, n, _) = line(2, 10.0);
        let run = g.extend(n[0], DVec3::new(-20.0, 0.0, 0.0), None).unwrap();
        assert!(g.node(n[0]).is_straight());
        assert!(approx(g.segment(run.segments[0]).length, 20.0));
        assert!(g.junction_cache_mismatches(1e-9).is_empty());
    }

    #[test]
    fn extend_with_spacing_places_signals() {
        let mut g = TrackGraph::default();
        let a = g.add_node(DVec3::ZERO, DVec3::X, NodeKind::Track);
        let run = g.extend(a, DVec3::new(30.0, 0.0, 0.0), Some(10.0)).unwrap();
        assert_eq!(run.segments.len(), 3);
        assert_eq!(run.nodes.len(), 3);
        assert_eq!(run.signals.len(), 3);
        for sig in &run.signals {
            assert!(g.signal(*sig).facing);
        }
    }

    #[test]
    fn extend_respects_existing_signal_behind() {
        let mut g = TrackGraph::default();
        let a = g.add_node(DVec3::ZERO, DVec3::X, NodeKind::Track);
        g.place_signal(a, true, true).unwrap();
        let run = g.extend(a, DVec3::new(4.0, 0.0, 0.0), Some(10.0)).unwrap();
        // 4 m is less than half the spacing from the signal at `a`.
        assert!(run.signals.is_empty());
    }

    #[test]
    fn signal_gap_counts_track_behind_the_start() {
        let (mut g, n, _) = line(2, 1.0);
        g.place_signal(n[0], true, true).unwrap();
        // 1 m behind plus 3 m laid stays under half the spacing.
        let run = g.extend(n[1], DVec3::new(4.0, 0.0, 0.0), Some(10.0)).unwrap();
        assert!(run.signals.is_empty());
        // 1 m behind plus 5 m reaches it.
        let end = run.last_node().unwrap();
        g.remove(run.segments[0], SimTime::ZERO).unwrap();
        assert!(g.try_node(end).is_err());
        let run = g.extend(n[1], DVec3::new(6.0, 0.0, 0.0), Some(10.0)).unwrap();
        assert_eq!(run.signals.len(), 1);
    }

    #[test]
    fn degenerate_extend_is_rejected() {
        let (mut g, n, s) = line(2, 10.0);
        assert!(g.extend(n[1], DVec3::new(10.1, 0.0, 0.0), None).is_none());
        g.remove(s[0], SimTime::ZERO).unwrap();
        assert!(g.extend(n[1], DVec3::new(30.0, 0.0, 0.0), None).is_none());
    }

    #[test]
    fn stacked_points_are_rejected() {
        let mut g = TrackGraph::default();
        let a = g.add_node(DVec3::ZERO, DVec3::X, NodeKind::Track);
        let b = g.add_node(DVec3::new(1e-12, 0.0, 1.0), DVec3::X, NodeKind::Track);
        assert!(g.connect(a, b, None).is_none());
        assert!(g.extend(a, DVec3::new(1e-12, 0.0, 1.0), None).is_none());
        assert!(g.extend(a, DVec3::new(0.2, 0.0, 50.0), None).is_none());
        assert_eq!(g.segment_count(), 0);
    }

    #[test]
    fn graded_node_direction_stays_horizontal() {
        let mut g = TrackGraph::default();
        let a = g.add_node(DVec3::ZERO, DVec3::new(1.0, 0.0, 1.0), NodeKind::Track);
        assert!(close(g.node(a).direction, DVec3::X));
        let run = g.extend(a, DVec3::new(20.0, 0.0, 5.0), None).unwrap();
        let end = run.last_node().unwrap();
        assert!(close(g.node(end).direction, DVec3::X));
        assert!(g.extend(end, DVec3::new(40.0, 0.0, -5.0), None).is_some());
        assert!(g.side_partition_violations().is_empty());
        assert!(g.junction_cache_mismatches(1e-9).is_empty());
    }

    #[test]
    fn connect_aligned_nodes_with_one_straight() {
        let mut g = TrackGraph::default();
        let a = g.add_node(DVec3::ZERO, DVec3::X, NodeKind::Track);
        let b = g.add_node(DVec3::new(30.0, 0.0, 0.0), DVec3::X, NodeKind::Track);
        let run = g.connect(a, b, None).unwrap();
        assert!(run.nodes.is_empty());
        assert_eq!(run.segments.len(), 1);
        assert_eq!(g.segment(run.segments[0]).kind(), ShapeKind::Straight);
        assert!(g.side_partition_violations().is_empty());
    }

    #[test]
    fn connect_perpendicular_nodes_with_lead_and_arc() {
        let mut g = TrackGraph::default();
        let a = g.add_node(DVec3::ZERO, DVec3::X, NodeKind::Track);
        let b = g.add_node(DVec3::new(30.0, 20.0, 0.0), DVec3::Y, NodeKind::Track);
        let run = g.connect(a, b, None).unwrap();
        let kinds: Vec<ShapeKind> = run.segments.iter().map(|s| g.segment(*s).kind()).collect();
        assert_eq!(kinds, [ShapeKind::Straight, ShapeKind::Arc]);
        assert!(close(g.node(run.nodes[0]).position, DVec3::new(10.0, 0.0, 0.0)));

        let last = g.segment(run.segments[1]);
        assert!(close(last.position_at(1.0), DVec3::new(30.0, 20.0, 0.0)));
        assert!(close(last.direction_at(1.0), DVec3::Y));
        assert!(g.side_partition_violations().is_empty());
    }

    #[test]
    fn connect_offset_parallel_nodes_with_reverse_curve() {
        let mut g = TrackGraph::default();
        let a = g.add_node(DVec3::ZERO, DVec3::X, NodeKind::Track);
        let b = g.add_node(DVec3::new(40.0, 10.0, 0.0), DVec3::X, NodeKind::Track);
        let run = g.connect(a, b, None).unwrap();
        assert_eq!(run.segments.len(), 2);
        assert!(close(g.node(run.nodes[0]).position, DVec3::new(20.0, 5.0, 0.0)));
        assert!(g.node(run.nodes[0]).is_straight());
        assert!(g.side_partition_violations().is_empty());
    }

    #[test]
    fn connect_rejects_rays_that_never_meet() {
        let mut g = TrackGraph::default();
        let a = g.add_node(DVec3::ZERO, DVec3::X, NodeKind::Track);
        let b = g.add_node(DVec3::new(10.0, 10.0, 0.0), DVec3::new(-1.0, 1.0, 0.0), NodeKind::Track);
        assert!(g.connect(a, b, None).is_none());
        assert!(g.connect(a, a, None).is_none());
        assert_eq!(g.segment_count(), 0);
    }

    #[test]
    fn split_in_the_middle() {
        let (mut g, _, s) = line(2, 30.0);
        g.set_occupied(s[0], true);
        let t = SimTime(5.0);
        let Split::Created { node, first, second } = g.split(s[0], 0.5, t) else {
            panic!("expected a new node");
        };
        assert!(close(g.node(node).position, DVec3::new(15.0, 0.0, 0.0)));
        assert_eq!(g.segment(s[0]).removed_at, Some(t));
        assert!(approx(g.segment(first).length + g.segment(second).length, 30.0));
        assert!(g.is_occupied(first) && g.is_occupied(second));
        assert!(g.node(node).is_straight());
        assert_eq!(g.live_segments().count(), 2);
        assert!(g.junction_cache_mismatches(1e-9).is_empty());
    }

    #[test]
    fn split_near_endpoint_returns_it() {
        let (mut g, n, s) = line(2, 30.0);
        assert_eq!(g.split(s[0], 0.01, SimTime::ZERO), Split::Existing(n[0]));
        assert_eq!(g.split(s[0], 0.99, SimTime::ZERO), Split::Existing(n[1]));
        assert_eq!(g.live_segments().count(), 1);
    }

    #[test]
    fn remove_retires_detached_nodes_and_their_signals() {
        let (mut g, n, s) = line(3, 10.0);
        let sig = g.place_signal(n[2], true, true).unwrap();
        let removal = g.remove(s[1], SimTime(3.0)).unwrap();
        assert_eq!(removal.detached, vec![n[2]]);
        assert_eq!(removal.removed_signals, vec![sig]);
        assert!(g.node(n[2]).is_retired());
        assert!(!g.node(n[1]).is_retired());
        assert!(g.signal(sig).is_removed());
        assert!(g.remove(s[1], SimTime(4.0)).is_none());
        assert!(g.junction_cache_mismatches(1e-9).is_empty());
    }
}
