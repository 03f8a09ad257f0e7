use ai_waypoint::{Edge, EuclideanHeuristic, Pathfinder, Vec2, WaypointGraph, ZeroHeuristic};

/// Small deterministic generator so graph shapes are stable across runs.
struct SplitMix64(u64);

impl SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn unit(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}

fn random_edges(rng: &mut SplitMix64, nodes: usize, count: usize) -> Vec<Edge> {
    (0..count)
        .map(|_| {
            let a = rng.below(nodes as u64) as usize;
            let b = rng.below(nodes as u64) as usize;
            let cost = 0.5 + (rng.below(8) as f32);
            Edge::new(a, b, cost).with_blocked(rng.below(5) == 0)
        })
        .collect()
}

/// All-pairs shortest distances over the unblocked edges.
fn floyd_warshall(graph: &WaypointGraph<Vec2>) -> Vec<Vec<f32>> {
    let n = graph.node_count();
    let mut dist = vec![vec![f32::INFINITY; n]; n];
    for (i, row) in dist.iter_mut().enumerate() {
        row[i] = 0.0;
    }
    for (idx, e) in graph.edges().iter().enumerate() {
        if e.blocked {
            continue;
        }
        let c = graph.edge_cost(idx).unwrap();
        let (a, b) = (e.source, e.destination);
        if c < dist[a][b] {
            dist[a][b] = c;
            dist[b][a] = c;
        }
    }
    for k in 0..n {
        for i in 0..n {
            for j in 0..n {
                let via = dist[i][k] + dist[k][j];
                if via < dist[i][j] {
                    dist[i][j] = via;
                }
            }
        }
    }
    dist
}

fn check_all_pairs<H: ai_waypoint::Heuristic<Vec2>>(finder: &mut Pathfinder<Vec2, H>) {
    let dist = floyd_warshall(finder.graph());
    let n = finder.graph().node_count();

    for a in 0..n {
        for b in 0..n {
            let nodes = finder.solve_node_path(a, b).unwrap();
            let edges = finder.solve_edge_path(a, b).unwrap();

            if dist[a][b].is_infinite() {
                assert!(nodes.is_empty(), "{a}->{b} should be unreachable");
                assert!(edges.is_empty());
                continue;
            }

            assert_eq!(nodes.first(), Some(&a));
            assert_eq!(nodes.last(), Some(&b));
            assert_eq!(edges.len(), nodes.len() - 1);

            let mut total = 0.0;
            for (pair, &edge) in nodes.windows(2).zip(&edges) {
                let e = finder.graph().edge(edge).unwrap();
                assert!(!e.blocked, "path {a}->{b} uses blocked edge {edge}");
                assert!(e.connects(pair[0], pair[1]));
                total += finder.graph().edge_cost(edge).unwrap();
            }

            assert!(
                (total - dist[a][b]).abs() < 1e-3,
                "{a}->{b}: path cost {total}, optimum {}",
                dist[a][b]
            );
            let reported = finder.cost(b).unwrap();
            assert!((reported - total).abs() < 1e-3);
        }
    }
}

#[test]
fn dijkstra_matches_floyd_warshall_on_random_graphs() {
    let mut rng = SplitMix64(7);
    for _ in 0..40 {
        let nodes = 3 + rng.below(6) as usize;
        let edges = random_edges(&mut rng, nodes, nodes * 2);
        let graph: WaypointGraph = WaypointGraph::new(edges).unwrap();
        let mut finder = Pathfinder::with_heuristic(graph, ZeroHeuristic);
        check_all_pairs(&mut finder);
    }
}

#[test]
fn astar_matches_floyd_warshall_with_derived_costs() {
    let mut rng = SplitMix64(99);
    for _ in 0..40 {
        let nodes = 3 + rng.below(6) as usize;
        let coords: Vec<Vec2> = (0..nodes)
            .map(|_| Vec2::new(rng.unit() * 10.0, rng.unit() * 10.0))
            .collect();
        let edges: Vec<Edge> = random_edges(&mut rng, nodes, nodes * 2)
            .into_iter()
            .map(|e| Edge::unweighted(e.source, e.destination).with_blocked(e.blocked))
            .collect();
        let graph = WaypointGraph::with_coordinates(edges, coords).unwrap();
        let mut finder = Pathfinder::with_heuristic(graph, EuclideanHeuristic);
        check_all_pairs(&mut finder);
    }
}

#[test]
fn refresh_after_random_blocking_still_matches_floyd_warshall() {
    let mut rng = SplitMix64(1234);
    let edges = random_edges(&mut rng, 7, 16);
    let graph: WaypointGraph = WaypointGraph::new(edges).unwrap();
    let mut finder = Pathfinder::new(graph);

    for _ in 0..10 {
        let edge = rng.below(16) as usize;
        let blocked = !finder.graph().is_edge_blocked(edge).unwrap();
        finder.set_edge_blocked(edge, blocked).unwrap();
        finder.refresh();
        check_all_pairs(&mut finder);
    }
}
