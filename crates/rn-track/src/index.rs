//! R-tree over node positions for snapping edit points to existing nodes.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use rn_core::{DVec3, NodeId};

/// Entry stored in the R-tree: a plan-view `[x, y]` point and its node.
#[derive(Clone, Debug, PartialEq)]
struct NodeEntry {
    point: [f64; 2],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

#[derive(Default)]
pub(crate) struct NodeIndex(RTree<NodeEntry>);

impl NodeIndex {
    pub(crate) fn insert(&mut self, position: DVec3, id: NodeId) {
        self.0.insert(NodeEntry { point: [position.x, position.y], id });
    }

    pub(crate) fn remove(&mut self, position: DVec3, id: NodeId) {
        self.0.remove(&NodeEntry { point: [position.x, position.y], id });
    }

    /// Nearest indexed node within `radius` (plan distance) of `position`.
    pub(crate) fn nearest(&self, position: DVec3, radius: f64) -> Option<NodeId> {
        let query = [position.x, position.y];
        self.0
            .nearest_neighbor(&query)
            .filter(|e| e.distance_2(&query) <= radius * radius)
            .map(|e| e.id)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.0.size()
    }
}
