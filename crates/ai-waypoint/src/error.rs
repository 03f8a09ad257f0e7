use thiserror::Error;

/// Errors raised by graph construction and queries.
///
/// An unreachable destination is never an error: solves report it as `Ok(false)` and the path
/// queries return an empty sequence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("node {node} is out of range (node count {node_count})")]
    NodeOutOfRange { node: usize, node_count: usize },

    #[error("edge {edge} is out of range (edge count {edge_count})")]
    EdgeOutOfRange { edge: usize, edge_count: usize },

    #[error("edge {edge} references node {node} but only {coordinate_count} coordinates were supplied")]
    MissingCoordinate {
        edge: usize,
        node: usize,
        coordinate_count: usize,
    },

    #[error("edge {edge} references node {node}, beyond the limit of {max} nodes")]
    NodeLimit { edge: usize, node: usize, max: usize },

    #[error("coordinate of node {node} is not finite")]
    InvalidCoordinate { node: usize },

    #[error("edge {edge} has non-finite cost {cost}")]
    InvalidCost { edge: usize, cost: f32 },

    #[error("position queries need node coordinates")]
    MissingCoordinates,

    #[error("output buffer holds {available} entries but {required} are needed")]
    Capacity { required: usize, available: usize },

    #[error("batch worker exited without producing a result")]
    BatchAborted,
}

impl GraphError {
    /// `true` for malformed input (bad indices, missing coordinates, bad costs).
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            GraphError::Capacity { .. } | GraphError::BatchAborted
        )
    }
}

pub type Result<T, E = GraphError> = core::result::Result<T, E>;
