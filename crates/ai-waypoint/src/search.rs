use crate::error::{GraphError, Result};
use crate::graph::WaypointGraph;
use crate::heap::{IndexedMinHeap, Priority};
use crate::heuristic::Heuristic;
use crate::math::NavPoint;

const NO_PARENT: usize = usize::MAX;

/// Per-node search label. Only meaningful when `epoch` matches the scratch's current epoch.
#[derive(Debug, Clone, Copy)]
struct NodeLabel {
    epoch: u32,
    g: f32,
    f: f32,
    parent: usize,
    parent_edge: usize,
    closed: bool,
}

impl Default for NodeLabel {
    fn default() -> Self {
        Self {
            epoch: 0,
            g: f32::INFINITY,
            f: f32::INFINITY,
            parent: NO_PARENT,
            parent_edge: NO_PARENT,
            closed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SolvedQuery {
    start: usize,
    destination: usize,
}

/// Reusable scratch buffers for [`WaypointGraph`] searches.
///
/// Sized to the graph's node count once; each solve bumps an epoch instead of clearing the
/// labels, so steady-state queries do not allocate. One scratch set serves one query at a time.
#[derive(Debug, Default)]
pub struct SearchScratch {
    labels: Vec<NodeLabel>,
    heap: IndexedMinHeap,
    epoch: u32,
    seq: u64,
    settled: usize,
    solved: Option<SolvedQuery>,
    pub(crate) node_path: Vec<usize>,
}

impl SearchScratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scratch preallocated for `graph`.
    pub fn for_graph<P: NavPoint>(graph: &WaypointGraph<P>) -> Self {
        let mut scratch = Self::default();
        scratch.reserve_nodes(graph.node_count());
        scratch
    }

    /// Grow the buffers to cover `nodes`. Never shrinks.
    pub fn reserve_nodes(&mut self, nodes: usize) {
        if self.labels.len() < nodes {
            self.labels.resize(nodes, NodeLabel::default());
        }
        self.heap.reserve_nodes(nodes);
        if self.node_path.capacity() < nodes {
            self.node_path.reserve(nodes - self.node_path.len());
        }
    }

    /// Number of nodes the buffers currently cover.
    pub fn capacity(&self) -> usize {
        self.labels.len()
    }

    /// Forget the last solve so reconstruction yields nothing until the next one.
    pub fn invalidate(&mut self) {
        self.solved = None;
    }

    /// Nodes settled by the last solve.
    pub fn settled_count(&self) -> usize {
        self.settled
    }

    /// Run a label-setting search from `start` to `destination`.
    ///
    /// Returns `Ok(false)` when `destination` is unreachable. Indices are validated before any
    /// scratch state changes.
    pub fn solve<P, H>(
        &mut self,
        graph: &WaypointGraph<P>,
        start: usize,
        destination: usize,
        heuristic: &H,
    ) -> Result<bool>
    where
        P: NavPoint,
        H: Heuristic<P> + ?Sized,
    {
        graph.check_node(start)?;
        graph.check_node(destination)?;

        if cfg!(debug_assertions) && graph.is_stale() {
            tracing::warn!(start, destination, "solving against stale waypoint adjacency");
        }

        self.reserve_nodes(graph.node_count());
        self.begin_epoch();

        let epoch = self.epoch;
        let h0 = heuristic.estimate(graph, start, destination);
        self.labels[start] = NodeLabel {
            epoch,
            g: 0.0,
            f: h0,
            parent: NO_PARENT,
            parent_edge: NO_PARENT,
            closed: false,
        };

        if start == destination {
            self.labels[start].closed = true;
            self.settled = 1;
            self.solved = Some(SolvedQuery { start, destination });
            return Ok(true);
        }

        let priority = self.next_priority(h0);
        self.heap.push(start, priority);

        let mut found = false;
        while let Some((node, _)) = self.heap.pop() {
            if self.labels[node].closed {
                continue;
            }
            self.labels[node].closed = true;
            self.settled += 1;

            if node == destination {
                found = true;
                break;
            }

            let g = self.labels[node].g;
            for link in graph.neighbors(node) {
                let label = &mut self.labels[link.target];
                if label.epoch != epoch {
                    *label = NodeLabel {
                        epoch,
                        ..NodeLabel::default()
                    };
                } else if label.closed {
                    continue;
                }

                let tentative = g + link.cost;
                if tentative >= label.g {
                    continue;
                }

                let f = tentative + heuristic.estimate(graph, link.target, destination);
                let label = &mut self.labels[link.target];
                label.g = tentative;
                label.f = f;
                label.parent = node;
                label.parent_edge = link.edge;

                let priority = self.next_priority(f);
                self.heap.push_or_decrease(link.target, priority);
            }
        }

        if found {
            self.solved = Some(SolvedQuery { start, destination });
        }

        tracing::trace!(
            start,
            destination,
            found,
            settled = self.settled,
            "waypoint search finished"
        );
        Ok(found)
    }

    /// Path cost to `destination` from the last successful solve that ended there.
    pub fn cost(&self, destination: usize) -> Option<f32> {
        self.is_solved_for(destination)
            .then(|| self.labels[destination].g)
    }

    /// Write the node path of the last successful solve, source first.
    ///
    /// `out` is left empty if the last solve did not reach `destination`.
    pub fn reconstruct_nodes(&self, destination: usize, out: &mut Vec<usize>) {
        out.clear();
        if !self.is_solved_for(destination) {
            return;
        }
        let mut current = destination;
        while current != NO_PARENT {
            out.push(current);
            current = self.labels[current].parent;
        }
        out.reverse();
    }

    /// Write the edge indices of the last successful solve; `edges[i]` joins `nodes[i]` and
    /// `nodes[i + 1]`.
    pub fn reconstruct_edges(&self, destination: usize, out: &mut Vec<usize>) {
        out.clear();
        if !self.is_solved_for(destination) {
            return;
        }
        let mut current = destination;
        while self.labels[current].parent != NO_PARENT {
            out.push(self.labels[current].parent_edge);
            current = self.labels[current].parent;
        }
        out.reverse();
    }

    /// Number of nodes on the reconstructed path, or `0` if there is none.
    pub fn path_len(&self, destination: usize) -> usize {
        if !self.is_solved_for(destination) {
            return 0;
        }
        let mut len = 0;
        let mut current = destination;
        while current != NO_PARENT {
            len += 1;
            current = self.labels[current].parent;
        }
        len
    }

    /// Slice form of [`reconstruct_nodes`](Self::reconstruct_nodes). Returns the number of
    /// nodes written.
    pub fn write_node_path(&self, destination: usize, out: &mut [usize]) -> Result<usize> {
        let len = self.path_len(destination);
        if len > out.len() {
            return Err(GraphError::Capacity {
                required: len,
                available: out.len(),
            });
        }
        let mut current = destination;
        for slot in out[..len].iter_mut().rev() {
            *slot = current;
            current = self.labels[current].parent;
        }
        Ok(len)
    }

    /// Slice form of [`reconstruct_edges`](Self::reconstruct_edges). Returns the number of
    /// edges written.
    pub fn write_edge_path(&self, destination: usize, out: &mut [usize]) -> Result<usize> {
        let len = self.path_len(destination).saturating_sub(1);
        if len > out.len() {
            return Err(GraphError::Capacity {
                required: len,
                available: out.len(),
            });
        }
        let mut current = destination;
        for slot in out[..len].iter_mut().rev() {
            *slot = self.labels[current].parent_edge;
            current = self.labels[current].parent;
        }
        Ok(len)
    }

    fn is_solved_for(&self, destination: usize) -> bool {
        self.solved.is_some_and(|q| q.destination == destination)
    }

    fn begin_epoch(&mut self) {
        self.heap.clear();
        self.solved = None;
        self.settled = 0;
        self.seq = 0;
        self.epoch = self.epoch.wrapping_add(1);
        if self.epoch == 0 {
            // Wrapped: old stamps could alias the new epoch.
            self.labels.fill(NodeLabel::default());
            self.epoch = 1;
        }
    }

    fn next_priority(&mut self, f: f32) -> Priority {
        let seq = self.seq;
        self.seq += 1;
        Priority { f, seq }
    }
}
