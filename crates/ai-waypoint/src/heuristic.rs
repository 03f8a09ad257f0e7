use crate::graph::WaypointGraph;
use crate::math::NavPoint;

/// Remaining-cost estimate used to order the open set.
///
/// Must never overestimate the true remaining cost, or the solver may return a suboptimal path.
/// [`ZeroHeuristic`] turns the search into plain Dijkstra.
pub trait Heuristic<P> {
    fn estimate(&self, graph: &WaypointGraph<P>, from: usize, to: usize) -> f32;
}

/// Dijkstra: every node is estimated at zero remaining cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZeroHeuristic;

impl<P> Heuristic<P> for ZeroHeuristic {
    fn estimate(&self, _graph: &WaypointGraph<P>, _from: usize, _to: usize) -> f32 {
        0.0
    }
}

/// Straight-line distance between node coordinates; zero on graphs without coordinates.
///
/// Admissible as long as every edge costs at least its Euclidean length, which holds for
/// derived costs but is not checked for caller-supplied ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EuclideanHeuristic;

impl<P: NavPoint> Heuristic<P> for EuclideanHeuristic {
    fn estimate(&self, graph: &WaypointGraph<P>, from: usize, to: usize) -> f32 {
        match (graph.position(from), graph.position(to)) {
            (Some(a), Some(b)) => a.distance(b),
            _ => 0.0,
        }
    }
}

impl<P, F> Heuristic<P> for F
where
    F: Fn(usize, usize) -> f32,
{
    fn estimate(&self, _graph: &WaypointGraph<P>, from: usize, to: usize) -> f32 {
        self(from, to)
    }
}
