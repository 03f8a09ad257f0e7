use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use ai_waypoint::{
    BatchSolver, Edge, EuclideanHeuristic, FrameScheduler, GraphError, PathRequest, Pathfinder,
    Vec2, WaypointGraph, ZeroHeuristic,
};

/// `side x side` lattice with unit spacing and 4-neighbour edges.
fn lattice(side: usize) -> WaypointGraph {
    let coords = (0..side * side)
        .map(|i| Vec2::new((i % side) as f32, (i / side) as f32))
        .collect();
    let mut edges = Vec::new();
    for y in 0..side {
        for x in 0..side {
            let i = y * side + x;
            if x + 1 < side {
                edges.push(Edge::unweighted(i, i + 1));
            }
            if y + 1 < side {
                edges.push(Edge::unweighted(i, i + side));
            }
        }
    }
    WaypointGraph::with_coordinates(edges, coords).expect("lattice")
}

fn requests(node_count: usize) -> Vec<PathRequest> {
    (0..node_count)
        .step_by(3)
        .map(|s| PathRequest::new(s, node_count - 1 - s))
        .collect()
}

#[test]
fn batch_results_match_sequential_solves_in_request_order() {
    let graph = lattice(6);
    let reqs = requests(graph.node_count());

    let mut batch = BatchSolver::new(&graph, 4);
    assert_eq!(batch.units(), 4);
    let results = batch.solve(&graph, &reqs, &EuclideanHeuristic);
    assert_eq!(results.len(), reqs.len());

    let mut finder = Pathfinder::new(graph.clone());
    for (req, result) in reqs.iter().zip(&results) {
        let path = result.as_ref().expect("valid request");
        let nodes = finder.solve_node_path(req.start, req.destination).unwrap();
        assert_eq!(path.nodes, nodes);
        assert_eq!(path.cost, finder.cost(req.destination));
        assert_eq!(path.edges.len() + 1, path.nodes.len());
    }
}

#[test]
fn batch_reports_bad_requests_individually() {
    let mut graph = lattice(3);
    // Cut node 8 off.
    let into_corner: Vec<usize> = (0..graph.edge_count())
        .filter(|&e| graph.edge(e).is_some_and(|edge| edge.source == 8 || edge.destination == 8))
        .collect();
    assert_eq!(into_corner.len(), 2);
    for edge in into_corner {
        graph.set_edge_blocked(edge, true).unwrap();
    }
    graph.refresh();

    let reqs = vec![
        PathRequest::new(0, 4),
        PathRequest::new(0, 99),
        PathRequest::new(0, 8),
    ];
    let mut batch = BatchSolver::new(&graph, 2);
    let results = batch.solve(&graph, &reqs, &ZeroHeuristic);

    assert!(results[0].as_ref().unwrap().found());
    assert!(matches!(
        results[1],
        Err(GraphError::NodeOutOfRange { node: 99, .. })
    ));
    let unreachable = results[2].as_ref().unwrap();
    assert!(!unreachable.found());
    assert!(unreachable.nodes.is_empty());
}

#[test]
fn empty_batches_and_zero_units_are_handled() {
    let graph = lattice(2);
    let mut batch = BatchSolver::new(&graph, 0);
    assert_eq!(batch.units(), 1);
    assert!(batch.solve(&graph, &[], &ZeroHeuristic).is_empty());
}

#[test]
fn spawned_batch_returns_results_and_solver() {
    let graph = Arc::new(lattice(5));
    let reqs = requests(graph.node_count());
    let expected = BatchSolver::new(&*graph, 1).solve(&*graph, &reqs, &EuclideanHeuristic);

    let handle = BatchSolver::per_thread(&*graph).spawn(
        Arc::clone(&graph),
        reqs.clone(),
        EuclideanHeuristic,
    );
    let output = handle.complete().expect("batch finishes");

    assert_eq!(output.requests, reqs);
    assert_eq!(output.results, expected);
    assert!(output.solver.units() >= 1);
}

#[test]
fn frame_scheduler_completes_batches_at_the_barrier() {
    let graph = Arc::new(lattice(4));
    let mut scheduler = FrameScheduler::new();
    let completed = Rc::new(RefCell::new(Vec::new()));

    assert_eq!(scheduler.begin_frame(), 1);
    for start in 0..3 {
        let handle = BatchSolver::new(&*graph, 2).spawn(
            Arc::clone(&graph),
            vec![PathRequest::new(start, 15)],
            EuclideanHeuristic,
        );
        let sink = Rc::clone(&completed);
        scheduler.schedule(handle, move |output| {
            let output = output.expect("batch output");
            let path = output.results[0].as_ref().expect("valid request");
            sink.borrow_mut().push((start, path.cost));
        });
    }
    assert_eq!(scheduler.pending(), 3);

    // Whatever finished early is collected by `poll`; the barrier picks up the rest.
    let early = scheduler.poll();
    let late = scheduler.complete_all();
    assert_eq!(early + late, 3);
    assert_eq!(scheduler.pending(), 0);

    let mut done = completed.borrow().clone();
    done.sort_by_key(|(start, _)| *start);
    assert_eq!(
        done,
        vec![(0, Some(6.0)), (1, Some(5.0)), (2, Some(4.0))]
    );
}

#[test]
fn try_complete_eventually_yields_the_output() {
    let graph = Arc::new(lattice(3));
    let mut handle = BatchSolver::new(&*graph, 1).spawn(
        Arc::clone(&graph),
        vec![PathRequest::new(0, 8)],
        ZeroHeuristic,
    );

    let output = loop {
        if let Some(output) = handle.try_complete() {
            break output.expect("batch output");
        }
        std::thread::yield_now();
    };
    assert_eq!(output.results[0].as_ref().unwrap().cost, Some(4.0));
}
