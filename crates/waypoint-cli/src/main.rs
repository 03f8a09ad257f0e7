//! Waypoint CLI - query waypoint graph files.
//!
//! - `waypoint info` - node, edge and link counts
//! - `waypoint path` - shortest node/edge path between two nodes
//! - `waypoint nearest` - project a point onto the graph
//! - `waypoint route` - position-to-position route

mod config;

use std::path::PathBuf;

use ai_waypoint::{Pathfinder, Vec2};
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::GraphFile;

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(about = "Shortest paths over waypoint graphs", version)]
struct Cli {
    /// Graph file (YAML, or JSON with a .json extension)
    #[arg(short, long, global = true, default_value = "graph.yaml")]
    graph: PathBuf,

    /// Block an edge before querying (repeatable)
    #[arg(long = "block", global = true)]
    blocked: Vec<usize>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show graph size
    Info,

    /// Shortest path between two nodes
    Path { start: usize, end: usize },

    /// Closest point on any unblocked edge
    #[command(allow_negative_numbers = true)]
    Nearest { x: f32, y: f32 },

    /// Route between two positions
    #[command(allow_negative_numbers = true)]
    Route { x0: f32, y0: f32, x1: f32, y1: f32 },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let file = GraphFile::load(&cli.graph)?;
    let graph = file.build(&cli.blocked)?;
    tracing::debug!(
        graph = %cli.graph.display(),
        blocked = cli.blocked.len(),
        heuristic = ?file.heuristic,
        "loaded graph"
    );
    let mut finder = Pathfinder::with_heuristic(graph, file.heuristic);

    match cli.command {
        Commands::Info => {
            let graph = finder.graph();
            let blocked = graph.edges().iter().filter(|e| e.blocked).count();
            println!("Nodes: {}", graph.node_count());
            println!("Edges: {} ({} blocked)", graph.edge_count(), blocked);
            println!("Links: {}", graph.link_count());
            println!(
                "Coordinates: {}",
                if graph.has_coordinates() { "yes" } else { "no" }
            );
        }
        Commands::Path { start, end } => {
            if !finder.solve(start, end)? {
                println!("No path from {start} to {end}");
                return Ok(());
            }
            let (mut nodes, mut edges) = (Vec::new(), Vec::new());
            finder.reconstruct_nodes(end, &mut nodes);
            finder.reconstruct_edges(end, &mut edges);
            println!("Nodes: {}", join(&nodes));
            println!("Edges: {}", join(&edges));
            if let Some(cost) = finder.cost(end) {
                println!("Cost: {cost}");
            }
        }
        Commands::Nearest { x, y } => match finder.find_nearest_point(Vec2::new(x, y))? {
            Some(hit) => {
                println!("Point: ({}, {})", hit.point.x, hit.point.y);
                println!("Edge: {} ({} - {})", hit.edge, hit.node_a, hit.node_b);
                println!("t: {}", hit.t);
                println!("Distance: {}", hit.distance_squared.sqrt());
                println!("Nearest node: {}", hit.nearest_node());
            }
            None => println!("No unblocked edges"),
        },
        Commands::Route { x0, y0, x1, y1 } => {
            let points = finder.solve_position_path(Vec2::new(x0, y0), Vec2::new(x1, y1))?;
            if points.is_empty() {
                println!("No route");
            }
            for p in &points {
                println!("{} {}", p.x, p.y);
            }
        }
    }

    Ok(())
}

fn join(items: &[usize]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
