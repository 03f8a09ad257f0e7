//! Waypoint graph navigation: CSR adjacency, A*/Dijkstra over reusable scratch, point-to-edge
//! projection, and position-to-position routes.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod batch;
pub mod error;
pub mod graph;
mod heap;
pub mod heuristic;
pub mod math;
pub mod navigator;
pub mod pathfinder;
pub mod project;
pub mod schedule;
pub mod search;
mod stitch;

pub use batch::{BatchHandle, BatchOutput, BatchPath, BatchSolver, PathRequest};
pub use error::{GraphError, Result};
pub use graph::{Edge, Link, WaypointGraph, MAX_NODES};
pub use heuristic::{EuclideanHeuristic, Heuristic, ZeroHeuristic};
pub use math::{NavPoint, Vec2, Vec3};
pub use navigator::{NavPath, Navigator};
pub use pathfinder::Pathfinder;
pub use project::{closest_point_on_segment, EdgeProjection};
pub use schedule::FrameScheduler;
pub use search::SearchScratch;
