use crate::error::{GraphError, Result};
use crate::graph::WaypointGraph;
use crate::math::{NavPoint, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A query point snapped onto the nearest unblocked edge.
///
/// `point == lerp(position(node_a), position(node_b), t)` with `node_a`/`node_b` being the
/// edge's source and destination.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeProjection<P = Vec2> {
    pub point: P,
    pub edge: usize,
    pub node_a: usize,
    pub node_b: usize,
    pub t: f32,
    pub distance_squared: f32,
}

impl<P> EdgeProjection<P> {
    /// The endpoint the projection is closer to along the edge (`node_b` only past the midpoint).
    pub fn nearest_node(&self) -> usize {
        if self.t > 0.5 {
            self.node_b
        } else {
            self.node_a
        }
    }

    /// The endpoint that is not `node`.
    pub fn other_node(&self, node: usize) -> usize {
        if node == self.node_a {
            self.node_b
        } else {
            self.node_a
        }
    }

    /// `true` if both projections lie on an edge between the same pair of nodes.
    pub fn shares_edge_with(&self, other: &Self) -> bool {
        (self.node_a == other.node_a && self.node_b == other.node_b)
            || (self.node_a == other.node_b && self.node_b == other.node_a)
    }
}

impl<P: NavPoint> WaypointGraph<P> {
    /// Project `point` onto the closest unblocked edge.
    ///
    /// Scans every edge in index order and keeps the first strict minimum. Returns `None` when
    /// no edge is unblocked.
    pub fn find_nearest_point(&self, point: P) -> Result<Option<EdgeProjection<P>>> {
        let coords = self.coordinates().ok_or(GraphError::MissingCoordinates)?;

        let mut best: Option<EdgeProjection<P>> = None;
        for (idx, edge) in self.edges().iter().enumerate() {
            if edge.blocked {
                continue;
            }
            let a = coords[edge.source];
            let b = coords[edge.destination];
            let (q, t) = closest_point_on_segment(point, a, b);
            let d2 = q.distance_squared(point);
            match best {
                Some(ref current) if d2 >= current.distance_squared => {}
                _ => {
                    best = Some(EdgeProjection {
                        point: q,
                        edge: idx,
                        node_a: edge.source,
                        node_b: edge.destination,
                        t,
                        distance_squared: d2,
                    })
                }
            }
        }
        Ok(best)
    }
}

/// Clamped perpendicular foot of `p` on segment `a..b`, with its interpolation parameter.
/// Degenerate segments project onto `a` with `t = 0`.
pub fn closest_point_on_segment<P: NavPoint>(p: P, a: P, b: P) -> (P, f32) {
    let ab = b - a;
    let denom = ab.dot(ab);
    if denom <= f32::EPSILON {
        return (a, 0.0);
    }
    let t = ((p - a).dot(ab) / denom).clamp(0.0, 1.0);
    (a + ab * t, t)
}
