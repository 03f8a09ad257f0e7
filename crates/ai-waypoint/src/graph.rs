use crate::error::{GraphError, Result};
use crate::math::{NavPoint, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An undirected, weighted connection between two waypoints.
///
/// A cost `<= 0` on a graph with coordinates is replaced by the Euclidean length of the edge
/// when the adjacency is built.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edge {
    pub source: usize,
    pub destination: usize,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub blocked: bool,
}

impl Edge {
    pub fn new(source: usize, destination: usize, cost: f32) -> Self {
        Self {
            source,
            destination,
            cost,
            blocked: false,
        }
    }

    /// Edge whose cost is derived from the node coordinates.
    pub fn unweighted(source: usize, destination: usize) -> Self {
        Self::new(source, destination, 0.0)
    }

    pub fn with_blocked(mut self, blocked: bool) -> Self {
        self.blocked = blocked;
        self
    }

    /// The endpoint opposite `node`, if `node` is one of this edge's endpoints.
    pub fn other(&self, node: usize) -> Option<usize> {
        if node == self.source {
            Some(self.destination)
        } else if node == self.destination {
            Some(self.source)
        } else {
            None
        }
    }

    pub fn connects(&self, a: usize, b: usize) -> bool {
        (self.source == a && self.destination == b) || (self.source == b && self.destination == a)
    }
}

/// One outgoing half of an unblocked edge, as stored in the adjacency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub target: usize,
    pub edge: usize,
    pub cost: f32,
}

/// Compressed sparse row adjacency: `offsets[n]..offsets[n + 1]` indexes the flat arrays.
#[derive(Debug, Clone, Default)]
struct Adjacency {
    offsets: Vec<usize>,
    targets: Vec<usize>,
    edges: Vec<usize>,
    costs: Vec<f32>,
}

impl Adjacency {
    /// Rebuild in place, reusing the existing allocations.
    fn rebuild(&mut self, node_count: usize, edges: &[Edge], costs: &[f32]) {
        self.offsets.clear();
        self.offsets.resize(node_count + 1, 0);

        for edge in edges.iter().filter(|e| !e.blocked) {
            self.offsets[edge.source + 1] += 1;
            if edge.destination != edge.source {
                self.offsets[edge.destination + 1] += 1;
            }
        }
        for i in 0..node_count {
            self.offsets[i + 1] += self.offsets[i];
        }

        let total = self.offsets[node_count];
        self.targets.clear();
        self.targets.resize(total, 0);
        self.edges.clear();
        self.edges.resize(total, 0);
        self.costs.clear();
        self.costs.resize(total, 0.0);

        // `offsets[n]` doubles as the write cursor for row `n`; shifting it back afterwards
        // restores the row starts.
        for (idx, edge) in edges.iter().enumerate() {
            if edge.blocked {
                continue;
            }
            self.insert(edge.source, edge.destination, idx, costs[idx]);
            if edge.destination != edge.source {
                self.insert(edge.destination, edge.source, idx, costs[idx]);
            }
        }
        for i in (1..=node_count).rev() {
            self.offsets[i] = self.offsets[i - 1];
        }
        if let Some(first) = self.offsets.first_mut() {
            *first = 0;
        }
    }

    fn insert(&mut self, from: usize, to: usize, edge: usize, cost: f32) {
        let slot = self.offsets[from];
        self.targets[slot] = to;
        self.edges[slot] = edge;
        self.costs[slot] = cost;
        self.offsets[from] += 1;
    }

    fn row(&self, node: usize) -> core::ops::Range<usize> {
        self.offsets[node]..self.offsets[node + 1]
    }

    fn link_count(&self) -> usize {
        self.targets.len()
    }
}

/// Largest accepted node count. Endpoints at or above it are rejected when the graph is built,
/// so a stray index in a graph file can't size the adjacency arrays.
pub const MAX_NODES: usize = 1 << 24;

/// A sparse waypoint graph with CSR adjacency over its unblocked edges.
///
/// Queries borrow the graph immutably and keep their mutable state in a
/// [`SearchScratch`](crate::SearchScratch), so one graph can serve many scratch sets at once.
/// Toggling an edge with [`set_edge_blocked`](Self::set_edge_blocked) leaves the adjacency stale
/// until [`refresh`](Self::refresh) is called.
#[derive(Debug, Clone)]
pub struct WaypointGraph<P = Vec2> {
    edges: Vec<Edge>,
    costs: Vec<f32>,
    coordinates: Option<Vec<P>>,
    node_count: usize,
    adjacency: Adjacency,
    stale: bool,
}

impl<P: NavPoint> WaypointGraph<P> {
    /// Build a graph without coordinates. Costs are taken literally and queries run as Dijkstra.
    pub fn new(edges: Vec<Edge>) -> Result<Self> {
        Self::from_parts(edges, None)
    }

    /// Build a graph whose nodes sit at `coordinates[node]`.
    pub fn with_coordinates(edges: Vec<Edge>, coordinates: Vec<P>) -> Result<Self> {
        Self::from_parts(edges, Some(coordinates))
    }

    pub fn from_parts(edges: Vec<Edge>, coordinates: Option<Vec<P>>) -> Result<Self> {
        let mut graph = Self {
            edges: Vec::new(),
            costs: Vec::new(),
            coordinates: None,
            node_count: 0,
            adjacency: Adjacency::default(),
            stale: false,
        };
        graph.replace(edges, coordinates)?;
        Ok(graph)
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of directed links in the current adjacency.
    pub fn link_count(&self) -> usize {
        self.adjacency.link_count()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, edge: usize) -> Option<&Edge> {
        self.edges.get(edge)
    }

    /// Cost used by the solver for `edge`, after coordinate-based derivation.
    pub fn edge_cost(&self, edge: usize) -> Option<f32> {
        self.costs.get(edge).copied()
    }

    pub fn coordinates(&self) -> Option<&[P]> {
        self.coordinates.as_deref()
    }

    pub fn has_coordinates(&self) -> bool {
        self.coordinates.is_some()
    }

    pub fn position(&self, node: usize) -> Option<P> {
        self.coordinates.as_ref()?.get(node).copied()
    }

    /// `true` after a blocking change that has not been followed by [`refresh`](Self::refresh).
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn is_edge_blocked(&self, edge: usize) -> Result<bool> {
        self.edges
            .get(edge)
            .map(|e| e.blocked)
            .ok_or(GraphError::EdgeOutOfRange {
                edge,
                edge_count: self.edges.len(),
            })
    }

    /// Toggle an edge. The adjacency does not change until the next [`refresh`](Self::refresh).
    pub fn set_edge_blocked(&mut self, edge: usize, blocked: bool) -> Result<()> {
        let edge_count = self.edges.len();
        let e = self
            .edges
            .get_mut(edge)
            .ok_or(GraphError::EdgeOutOfRange { edge, edge_count })?;
        if e.blocked != blocked {
            e.blocked = blocked;
            self.stale = true;
        }
        Ok(())
    }

    /// Rebuild the adjacency from the current edge flags.
    pub fn refresh(&mut self) {
        self.adjacency
            .rebuild(self.node_count, &self.edges, &self.costs);
        self.stale = false;
        tracing::debug!(
            nodes = self.node_count,
            edges = self.edges.len(),
            links = self.adjacency.link_count(),
            "refreshed waypoint adjacency"
        );
    }

    /// Replace the topology, keeping the current coordinates.
    ///
    /// On error the graph is left untouched.
    pub fn reinitialize(&mut self, edges: Vec<Edge>) -> Result<()> {
        let coordinates = self.coordinates.take();
        match Self::validate(&edges, coordinates.as_deref()) {
            Ok(()) => self.replace(edges, coordinates),
            Err(err) => {
                self.coordinates = coordinates;
                Err(err)
            }
        }
    }

    /// Replace both the topology and the coordinates.
    pub fn reinitialize_with_coordinates(
        &mut self,
        edges: Vec<Edge>,
        coordinates: Vec<P>,
    ) -> Result<()> {
        Self::validate(&edges, Some(&coordinates))?;
        self.replace(edges, Some(coordinates))
    }

    /// Outgoing links of `node` over unblocked edges, in edge-array order.
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = Link> + '_ {
        let row = if node < self.node_count {
            self.adjacency.row(node)
        } else {
            0..0
        };
        row.map(move |i| Link {
            target: self.adjacency.targets[i],
            edge: self.adjacency.edges[i],
            cost: self.adjacency.costs[i],
        })
    }

    pub(crate) fn check_node(&self, node: usize) -> Result<()> {
        if node < self.node_count {
            Ok(())
        } else {
            Err(GraphError::NodeOutOfRange {
                node,
                node_count: self.node_count,
            })
        }
    }

    fn validate(edges: &[Edge], coordinates: Option<&[P]>) -> Result<()> {
        if let Some(coords) = coordinates {
            if let Some(node) = coords.iter().position(|p| !p.is_finite()) {
                return Err(GraphError::InvalidCoordinate { node });
            }
        }
        for (idx, edge) in edges.iter().enumerate() {
            if !edge.cost.is_finite() {
                return Err(GraphError::InvalidCost {
                    edge: idx,
                    cost: edge.cost,
                });
            }
            for node in [edge.source, edge.destination] {
                if node >= MAX_NODES {
                    return Err(GraphError::NodeLimit {
                        edge: idx,
                        node,
                        max: MAX_NODES,
                    });
                }
            }
            if let Some(coords) = coordinates {
                for node in [edge.source, edge.destination] {
                    if node >= coords.len() {
                        return Err(GraphError::MissingCoordinate {
                            edge: idx,
                            node,
                            coordinate_count: coords.len(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn replace(&mut self, edges: Vec<Edge>, coordinates: Option<Vec<P>>) -> Result<()> {
        Self::validate(&edges, coordinates.as_deref())?;

        self.node_count = edges
            .iter()
            .map(|e| e.source.max(e.destination) + 1)
            .max()
            .unwrap_or(0);

        self.costs.clear();
        self.costs.extend(edges.iter().map(|e| match coordinates.as_deref() {
            Some(coords) if e.cost <= 0.0 => coords[e.source].distance(coords[e.destination]),
            _ => e.cost.max(0.0),
        }));

        self.edges = edges;
        self.coordinates = coordinates;
        self.adjacency
            .rebuild(self.node_count, &self.edges, &self.costs);
        self.stale = false;

        tracing::debug!(
            nodes = self.node_count,
            edges = self.edges.len(),
            links = self.adjacency.link_count(),
            coordinates = self.coordinates.is_some(),
            "built waypoint graph"
        );
        Ok(())
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct WaypointGraphSerde<P> {
    edges: Vec<Edge>,
    coordinates: Option<Vec<P>>,
}

#[cfg(feature = "serde")]
impl<P: NavPoint + Serialize> Serialize for WaypointGraph<P> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        WaypointGraphSerde {
            edges: self.edges.clone(),
            coordinates: self.coordinates.clone(),
        }
        .serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, P: NavPoint + Deserialize<'de>> Deserialize<'de> for WaypointGraph<P> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let data = WaypointGraphSerde::deserialize(deserializer)?;
        WaypointGraph::from_parts(data.edges, data.coordinates).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(graph: &WaypointGraph, node: usize) -> Vec<usize> {
        graph.neighbors(node).map(|l| l.target).collect()
    }

    #[test]
    fn adjacency_is_undirected_and_ordered_by_edge_index() {
        let graph: WaypointGraph = WaypointGraph::new(vec![
            Edge::new(0, 1, 1.0),
            Edge::new(2, 0, 1.0),
            Edge::new(0, 3, 1.0),
        ])
        .unwrap();

        assert_eq!(graph.node_count(), 4);
        assert_eq!(targets(&graph, 0), vec![1, 2, 3]);
        assert_eq!(targets(&graph, 2), vec![0]);
        assert_eq!(graph.link_count(), 6);
    }

    #[test]
    fn blocked_edges_are_excluded_after_refresh() {
        let mut graph: WaypointGraph =
            WaypointGraph::new(vec![Edge::new(0, 1, 1.0), Edge::new(1, 2, 1.0)]).unwrap();

        graph.set_edge_blocked(0, true).unwrap();
        assert!(graph.is_stale());
        assert_eq!(targets(&graph, 0), vec![1]);

        graph.refresh();
        assert!(!graph.is_stale());
        assert!(targets(&graph, 0).is_empty());
        assert_eq!(targets(&graph, 1), vec![2]);

        graph.refresh();
        assert_eq!(graph.link_count(), 2);
    }

    #[test]
    fn self_loops_are_stored_once() {
        let graph: WaypointGraph = WaypointGraph::new(vec![Edge::new(1, 1, 2.0)]).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(targets(&graph, 1), vec![1]);
        assert!(targets(&graph, 0).is_empty());
    }

    #[test]
    fn derives_costs_from_coordinates() {
        let graph = WaypointGraph::with_coordinates(
            vec![Edge::unweighted(0, 1), Edge::new(0, 1, 7.0)],
            vec![Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0)],
        )
        .unwrap();
        assert_eq!(graph.edge_cost(0), Some(5.0));
        assert_eq!(graph.edge_cost(1), Some(7.0));
    }

    #[test]
    fn failed_reinitialize_keeps_previous_topology() {
        let mut graph = WaypointGraph::with_coordinates(
            vec![Edge::unweighted(0, 1)],
            vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)],
        )
        .unwrap();

        let err = graph.reinitialize(vec![Edge::unweighted(0, 5)]).unwrap_err();
        assert!(matches!(err, GraphError::MissingCoordinate { node: 5, .. }));
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.has_coordinates());
        assert_eq!(targets(&graph, 0), vec![1]);
    }
}
