use crate::error::Result;
use crate::graph::{Edge, WaypointGraph};
use crate::heuristic::{EuclideanHeuristic, Heuristic};
use crate::math::{NavPoint, Vec2};
use crate::project::EdgeProjection;
use crate::search::SearchScratch;

/// A waypoint graph bundled with its own search scratch and heuristic.
///
/// This is the single-owner form of the engine: every query reuses the same scratch, so after
/// construction the `_into` queries run without allocating. Use [`WaypointGraph`] with separate
/// [`SearchScratch`] sets (or [`BatchSolver`](crate::BatchSolver)) to query one graph from
/// several places at once.
#[derive(Debug)]
pub struct Pathfinder<P = Vec2, H = EuclideanHeuristic> {
    graph: WaypointGraph<P>,
    scratch: SearchScratch,
    heuristic: H,
}

impl<P: NavPoint> Pathfinder<P, EuclideanHeuristic> {
    /// A* when the graph has coordinates, Dijkstra otherwise.
    pub fn new(graph: WaypointGraph<P>) -> Self {
        Self::with_heuristic(graph, EuclideanHeuristic)
    }
}

impl<P: NavPoint, H: Heuristic<P>> Pathfinder<P, H> {
    pub fn with_heuristic(graph: WaypointGraph<P>, heuristic: H) -> Self {
        let scratch = SearchScratch::for_graph(&graph);
        Self {
            graph,
            scratch,
            heuristic,
        }
    }

    pub fn graph(&self) -> &WaypointGraph<P> {
        &self.graph
    }

    pub fn into_graph(self) -> WaypointGraph<P> {
        self.graph
    }

    pub fn heuristic(&self) -> &H {
        &self.heuristic
    }

    /// Toggle an edge; call [`refresh`](Self::refresh) before the next query.
    pub fn set_edge_blocked(&mut self, edge: usize, blocked: bool) -> Result<()> {
        self.graph.set_edge_blocked(edge, blocked)
    }

    pub fn refresh(&mut self) {
        self.graph.refresh();
        self.scratch.invalidate();
    }

    pub fn reinitialize(&mut self, edges: Vec<Edge>) -> Result<()> {
        self.graph.reinitialize(edges)?;
        self.after_topology_change();
        Ok(())
    }

    pub fn reinitialize_with_coordinates(
        &mut self,
        edges: Vec<Edge>,
        coordinates: Vec<P>,
    ) -> Result<()> {
        self.graph
            .reinitialize_with_coordinates(edges, coordinates)?;
        self.after_topology_change();
        Ok(())
    }

    /// Run a search and keep its result in the scratch for [`cost`](Self::cost) and the
    /// reconstruction queries.
    pub fn solve(&mut self, start: usize, destination: usize) -> Result<bool> {
        self.scratch
            .solve(&self.graph, start, destination, &self.heuristic)
    }

    pub fn cost(&self, destination: usize) -> Option<f32> {
        self.scratch.cost(destination)
    }

    /// Node path of the last [`solve`](Self::solve); empty unless it reached `destination`.
    pub fn reconstruct_nodes(&self, destination: usize, out: &mut Vec<usize>) {
        self.scratch.reconstruct_nodes(destination, out);
    }

    pub fn reconstruct_edges(&self, destination: usize, out: &mut Vec<usize>) {
        self.scratch.reconstruct_edges(destination, out);
    }

    pub fn solve_node_path_into(
        &mut self,
        start: usize,
        destination: usize,
        out: &mut Vec<usize>,
    ) -> Result<bool> {
        let found = self.solve(start, destination)?;
        self.scratch.reconstruct_nodes(destination, out);
        Ok(found)
    }

    pub fn solve_edge_path_into(
        &mut self,
        start: usize,
        destination: usize,
        out: &mut Vec<usize>,
    ) -> Result<bool> {
        let found = self.solve(start, destination)?;
        self.scratch.reconstruct_edges(destination, out);
        Ok(found)
    }

    /// Nodes from `start` to `destination`, or empty when unreachable.
    pub fn solve_node_path(&mut self, start: usize, destination: usize) -> Result<Vec<usize>> {
        let mut out = Vec::new();
        self.solve_node_path_into(start, destination, &mut out)?;
        Ok(out)
    }

    /// Edge indices from `start` to `destination`, or empty when unreachable or trivial.
    pub fn solve_edge_path(&mut self, start: usize, destination: usize) -> Result<Vec<usize>> {
        let mut out = Vec::new();
        self.solve_edge_path_into(start, destination, &mut out)?;
        Ok(out)
    }

    /// Slice form of the node query for callers with fixed buffers.
    pub fn write_node_path(
        &mut self,
        start: usize,
        destination: usize,
        out: &mut [usize],
    ) -> Result<usize> {
        self.solve(start, destination)?;
        self.scratch.write_node_path(destination, out)
    }

    pub fn write_edge_path(
        &mut self,
        start: usize,
        destination: usize,
        out: &mut [usize],
    ) -> Result<usize> {
        self.solve(start, destination)?;
        self.scratch.write_edge_path(destination, out)
    }

    pub fn find_nearest_point(&self, point: P) -> Result<Option<EdgeProjection<P>>> {
        self.graph.find_nearest_point(point)
    }

    pub fn solve_position_path_into(&mut self, start: P, end: P, out: &mut Vec<P>) -> Result<()> {
        self.graph
            .solve_position_path_into(start, end, &mut self.scratch, &self.heuristic, out)
    }

    pub fn solve_position_path(&mut self, start: P, end: P) -> Result<Vec<P>> {
        let mut out = Vec::new();
        self.solve_position_path_into(start, end, &mut out)?;
        Ok(out)
    }

    fn after_topology_change(&mut self) {
        self.scratch.reserve_nodes(self.graph.node_count());
        self.scratch.invalidate();
    }
}
