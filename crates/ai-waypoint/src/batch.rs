//! Data-parallel path solving over one shared, read-only graph.
//!
//! Each parallel unit owns a [`SearchScratch`]; the graph's adjacency is only borrowed. Blocking
//! or refreshing needs `&mut WaypointGraph`, so it cannot overlap a running batch.

use std::sync::Arc;

use rayon::prelude::*;
use tokio::sync::oneshot;

use crate::error::{GraphError, Result};
use crate::graph::WaypointGraph;
use crate::heuristic::Heuristic;
use crate::math::NavPoint;
use crate::search::SearchScratch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathRequest {
    pub start: usize,
    pub destination: usize,
}

impl PathRequest {
    pub fn new(start: usize, destination: usize) -> Self {
        Self { start, destination }
    }
}

/// Solved path for one request. `nodes` and `edges` are empty and `cost` is `None` when the
/// destination is unreachable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchPath {
    pub nodes: Vec<usize>,
    pub edges: Vec<usize>,
    pub cost: Option<f32>,
}

impl BatchPath {
    pub fn found(&self) -> bool {
        self.cost.is_some()
    }
}

/// A pool of scratch sets, one per parallel unit of work.
#[derive(Debug)]
pub struct BatchSolver {
    scratch: Vec<SearchScratch>,
}

impl BatchSolver {
    /// `units` scratch sets, each preallocated for `graph`. At least one set is always created.
    pub fn new<P: NavPoint>(graph: &WaypointGraph<P>, units: usize) -> Self {
        let scratch = (0..units.max(1))
            .map(|_| SearchScratch::for_graph(graph))
            .collect();
        Self { scratch }
    }

    /// One scratch set per rayon worker thread.
    pub fn per_thread<P: NavPoint>(graph: &WaypointGraph<P>) -> Self {
        Self::new(graph, rayon::current_num_threads())
    }

    pub fn units(&self) -> usize {
        self.scratch.len()
    }

    /// Solve every request; results keep request order.
    ///
    /// Requests are split into contiguous chunks, one per scratch set, and the chunks run in
    /// parallel. A request with an out-of-range node yields its own `Err` without affecting the
    /// others.
    pub fn solve<P, H>(
        &mut self,
        graph: &WaypointGraph<P>,
        requests: &[PathRequest],
        heuristic: &H,
    ) -> Vec<Result<BatchPath>>
    where
        P: NavPoint,
        H: Heuristic<P> + Sync + ?Sized,
    {
        if requests.is_empty() {
            return Vec::new();
        }
        let chunk = requests.len().div_ceil(self.scratch.len());

        let chunks: Vec<Vec<Result<BatchPath>>> = self
            .scratch
            .par_iter_mut()
            .zip(requests.par_chunks(chunk))
            .map(|(scratch, chunk)| {
                chunk
                    .iter()
                    .map(|req| solve_one(graph, scratch, *req, heuristic))
                    .collect()
            })
            .collect();

        let results: Vec<_> = chunks.into_iter().flatten().collect();
        tracing::debug!(
            requests = requests.len(),
            units = self.scratch.len(),
            found = results
                .iter()
                .filter(|r| r.as_ref().is_ok_and(BatchPath::found))
                .count(),
            "batch solve finished"
        );
        results
    }

    /// Run the batch on the rayon pool and hand back a [`BatchHandle`] to complete later.
    ///
    /// The solver travels with the job and is returned in [`BatchOutput`] so its scratch can be
    /// reused for the next batch.
    pub fn spawn<P, H>(
        mut self,
        graph: Arc<WaypointGraph<P>>,
        requests: Vec<PathRequest>,
        heuristic: H,
    ) -> BatchHandle
    where
        P: NavPoint,
        H: Heuristic<P> + Send + Sync + 'static,
    {
        let (tx, rx) = oneshot::channel();
        rayon::spawn(move || {
            let results = self.solve(&graph, &requests, &heuristic);
            // The receiver may have been dropped; the results are simply discarded then.
            let _ = tx.send(BatchOutput {
                requests,
                results,
                solver: self,
            });
        });
        BatchHandle {
            rx: Some(rx),
            done: None,
        }
    }
}

fn solve_one<P, H>(
    graph: &WaypointGraph<P>,
    scratch: &mut SearchScratch,
    req: PathRequest,
    heuristic: &H,
) -> Result<BatchPath>
where
    P: NavPoint,
    H: Heuristic<P> + ?Sized,
{
    let mut path = BatchPath::default();
    if scratch.solve(graph, req.start, req.destination, heuristic)? {
        scratch.reconstruct_nodes(req.destination, &mut path.nodes);
        scratch.reconstruct_edges(req.destination, &mut path.edges);
        path.cost = scratch.cost(req.destination);
    }
    Ok(path)
}

/// Everything a finished batch hands back.
#[derive(Debug)]
pub struct BatchOutput {
    pub requests: Vec<PathRequest>,
    pub results: Vec<Result<BatchPath>>,
    pub solver: BatchSolver,
}

/// Completion handle for a batch started with [`BatchSolver::spawn`].
#[derive(Debug)]
pub struct BatchHandle {
    rx: Option<oneshot::Receiver<BatchOutput>>,
    done: Option<BatchOutput>,
}

impl BatchHandle {
    /// Non-blocking check. Once this returns `true` the output is buffered in the handle.
    pub fn is_complete(&mut self) -> bool {
        if self.done.is_some() {
            return true;
        }
        let Some(rx) = self.rx.as_mut() else {
            // Worker went away without a result; treat as finished so `complete` reports it.
            return true;
        };
        match rx.try_recv() {
            Ok(output) => {
                self.done = Some(output);
                self.rx = None;
                true
            }
            Err(oneshot::error::TryRecvError::Empty) => false,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.rx = None;
                true
            }
        }
    }

    /// Take the output if the batch has finished.
    pub fn try_complete(&mut self) -> Option<Result<BatchOutput>> {
        if !self.is_complete() {
            return None;
        }
        Some(self.done.take().ok_or(GraphError::BatchAborted))
    }

    /// Block until the batch finishes. Must not be called from inside an async runtime.
    pub fn complete(mut self) -> Result<BatchOutput> {
        if let Some(output) = self.done.take() {
            return Ok(output);
        }
        let rx = self.rx.take().ok_or(GraphError::BatchAborted)?;
        rx.blocking_recv().map_err(|_| GraphError::BatchAborted)
    }
}
