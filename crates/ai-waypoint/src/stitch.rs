use crate::error::Result;
use crate::graph::WaypointGraph;
use crate::heuristic::Heuristic;
use crate::math::NavPoint;
use crate::project::EdgeProjection;
use crate::search::SearchScratch;

impl<P: NavPoint> WaypointGraph<P> {
    /// Route between two arbitrary positions.
    ///
    /// Both points are snapped onto their nearest unblocked edges, the node search runs between
    /// the endpoints each projection is closest to, and the projections are spliced onto the
    /// node path. A node that would make the path double back along the start or end edge is
    /// dropped. If the node search fails, `out` holds the two projections joined directly.
    /// `out` is empty only when there is no unblocked edge to project onto.
    pub fn solve_position_path_into<H>(
        &self,
        start: P,
        end: P,
        scratch: &mut SearchScratch,
        heuristic: &H,
        out: &mut Vec<P>,
    ) -> Result<()>
    where
        H: Heuristic<P> + ?Sized,
    {
        out.clear();

        let Some(from) = self.find_nearest_point(start)? else {
            return Ok(());
        };
        let Some(to) = self.find_nearest_point(end)? else {
            return Ok(());
        };

        if from.shares_edge_with(&to) {
            out.push(from.point);
            out.push(to.point);
            return Ok(());
        }

        let from_node = from.nearest_node();
        let to_node = to.nearest_node();
        if from_node == to_node {
            out.push(from.point);
            out.extend(self.position(from_node));
            out.push(to.point);
            return Ok(());
        }

        if !scratch.solve(self, from_node, to_node, heuristic)? {
            out.push(from.point);
            out.push(to.point);
            return Ok(());
        }

        let mut nodes = std::mem::take(&mut scratch.node_path);
        scratch.reconstruct_nodes(to_node, &mut nodes);
        let (first, last) = trim_backtracking(&nodes, &from, &to);

        out.reserve(last - first + 2);
        out.push(from.point);
        out.extend(nodes[first..last].iter().filter_map(|&n| self.position(n)));
        out.push(to.point);

        scratch.node_path = nodes;
        Ok(())
    }

    /// Allocating form of [`solve_position_path_into`](Self::solve_position_path_into) using a
    /// temporary scratch set.
    pub fn solve_position_path<H>(&self, start: P, end: P, heuristic: &H) -> Result<Vec<P>>
    where
        H: Heuristic<P> + ?Sized,
    {
        let mut scratch = SearchScratch::for_graph(self);
        let mut out = Vec::new();
        self.solve_position_path_into(start, end, &mut scratch, heuristic, &mut out)?;
        Ok(out)
    }
}

/// Range of `nodes` to keep between the two projections.
///
/// The first node is redundant when the path immediately continues to the other endpoint of the
/// start edge: the projection already lies on that edge. Same for the last node and the end edge.
/// At least one node is always kept.
fn trim_backtracking<P>(
    nodes: &[usize],
    from: &EdgeProjection<P>,
    to: &EdgeProjection<P>,
) -> (usize, usize) {
    let mut first = 0;
    let mut last = nodes.len();
    if nodes.len() < 2 {
        return (first, last);
    }

    if nodes[1] == from.other_node(nodes[0]) {
        first = 1;
    }
    if last - first >= 2 && nodes[last - 2] == to.other_node(nodes[last - 1]) {
        last -= 1;
    }
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec2;

    fn projection(node_a: usize, node_b: usize, t: f32) -> EdgeProjection<Vec2> {
        EdgeProjection {
            point: Vec2::ZERO,
            edge: 0,
            node_a,
            node_b,
            t,
            distance_squared: 0.0,
        }
    }

    #[test]
    fn trims_nodes_that_double_back_along_projection_edges() {
        // Start sits on 0-1 near 0, end sits on 3-4 near 4; path 0,1,2,3,4.
        let from = projection(0, 1, 0.2);
        let to = projection(3, 4, 0.9);
        assert_eq!(trim_backtracking(&[0, 1, 2, 3, 4], &from, &to), (1, 4));
    }

    #[test]
    fn keeps_nodes_when_path_leaves_through_another_edge() {
        let from = projection(0, 1, 0.2);
        let to = projection(5, 4, 0.1);
        assert_eq!(trim_backtracking(&[0, 2, 5], &from, &to), (0, 3));
    }

    #[test]
    fn never_trims_below_one_node() {
        let from = projection(0, 1, 0.2);
        let to = projection(0, 2, 0.9);
        // Path 0 -> 1 with the end edge also touching node 0.
        assert_eq!(trim_backtracking(&[0, 1], &from, &to), (1, 2));
    }
}
