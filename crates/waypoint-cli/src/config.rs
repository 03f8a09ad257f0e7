//! Graph file loading.

use std::path::Path;

use ai_waypoint::{Edge, EuclideanHeuristic, Heuristic, Vec2, WaypointGraph, ZeroHeuristic};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// A waypoint graph as stored on disk, in YAML or JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphFile {
    /// Node positions as `[x, y]` pairs, indexed by node.
    pub coordinates: Option<Vec<[f32; 2]>>,

    pub edges: Vec<Edge>,

    /// Search heuristic. Euclidean degrades to Dijkstra on graphs without coordinates.
    pub heuristic: HeuristicKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeuristicKind {
    #[default]
    Euclidean,
    Zero,
}

impl Heuristic<Vec2> for HeuristicKind {
    fn estimate(&self, graph: &WaypointGraph<Vec2>, from: usize, to: usize) -> f32 {
        match self {
            HeuristicKind::Euclidean => EuclideanHeuristic.estimate(graph, from, to),
            HeuristicKind::Zero => ZeroHeuristic.estimate(graph, from, to),
        }
    }
}

impl GraphFile {
    /// Load a graph file. `.json` is parsed as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read graph from {}", path.display()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let file: Self = if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse graph from {}", path.display()))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse graph from {}", path.display()))?
        };
        Ok(file)
    }

    /// Build the graph, applying `blocked` on top of the per-edge flags.
    pub fn build(&self, blocked: &[usize]) -> Result<WaypointGraph> {
        let coordinates = self
            .coordinates
            .as_ref()
            .map(|coords| coords.iter().copied().map(Vec2::from).collect());
        let mut graph = WaypointGraph::from_parts(self.edges.clone(), coordinates)
            .context("Invalid waypoint graph")?;

        if !blocked.is_empty() {
            for &edge in blocked {
                if edge >= graph.edge_count() {
                    bail!(
                        "--block {edge}: graph only has {} edges",
                        graph.edge_count()
                    );
                }
                graph.set_edge_blocked(edge, true)?;
            }
            graph.refresh();
        }
        Ok(graph)
    }
}
