//! Property tests: the router against exhaustive search on small graphs.

use campus_nav::graph::{path_distance, route, route_with_distance, CampusGraph};
use campus_nav::models::{CampusEdge, CampusNode, NodeCategory, NodeId};
use proptest::prelude::*;

fn node_id(index: usize) -> NodeId {
    NodeId::new(format!("n{index}"))
}

fn build(n: usize, edges: &[(usize, usize, u32)]) -> CampusGraph {
    let nodes = (0..n)
        .map(|i| CampusNode {
            id: node_id(i),
            name: format!("Node {i}"),
            category: NodeCategory::Outdoor,
            x: i as f64,
            y: 0.0,
            description: String::new(),
        })
        .collect();
    let edges = edges
        .iter()
        .map(|&(a, b, w)| CampusEdge {
            from: node_id(a),
            to: node_id(b),
            distance: f64::from(w),
            instruction: None,
        })
        .collect();
    CampusGraph::new(nodes, edges).expect("generated graph is valid")
}

/// Cheapest simple path by trying every one of them.
fn brute_force(n: usize, edges: &[(usize, usize, u32)], start: usize, end: usize) -> Option<u32> {
    fn walk(
        at: usize,
        end: usize,
        cost: u32,
        visited: &mut Vec<bool>,
        edges: &[(usize, usize, u32)],
        best: &mut Option<u32>,
    ) {
        if at == end {
            *best = Some(best.map_or(cost, |b| b.min(cost)));
            return;
        }
        for &(a, b, w) in edges {
            let next = if a == at {
                b
            } else if b == at {
                a
            } else {
                continue;
            };
            if !visited[next] {
                visited[next] = true;
                walk(next, end, cost + w, visited, edges, best);
                visited[next] = false;
            }
        }
    }

    let mut visited = vec![false; n];
    visited[start] = true;
    let mut best = None;
    walk(start, end, 0, &mut visited, edges, &mut best);
    best
}

fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize, u32)>, usize, usize)> {
    (2usize..7).prop_flat_map(|n| {
        let edge = (0..n, 0..n, 1u32..20).prop_filter("no self-loops", |(a, b, _)| a != b);
        (Just(n), prop::collection::vec(edge, 0..12), 0..n, 0..n)
    })
}

proptest! {
    #[test]
    fn route_matches_exhaustive_search((n, edges, start, end) in graph_strategy()) {
        let graph = build(n, &edges);
        let expected = brute_force(n, &edges, start, end);
        let found = route_with_distance(&graph, &node_id(start), &node_id(end));

        match (expected, found) {
            (None, None) => {}
            (Some(best), Some(found)) => {
                prop_assert_eq!(found.distance, f64::from(best));
                prop_assert_eq!(found.nodes.first(), Some(&node_id(start)));
                prop_assert_eq!(found.nodes.last(), Some(&node_id(end)));
                prop_assert_eq!(path_distance(&graph, &found.nodes), Some(found.distance));

                let mut seen = found.nodes.clone();
                seen.sort();
                seen.dedup();
                prop_assert_eq!(seen.len(), found.nodes.len(), "path revisits a node");
            }
            (expected, found) => {
                prop_assert!(false, "reachability mismatch: brute force {:?}, router {:?}", expected, found);
            }
        }
    }

    #[test]
    fn route_is_deterministic((n, edges, start, end) in graph_strategy()) {
        let graph = build(n, &edges);
        let first = route(&graph, &node_id(start), &node_id(end));
        let second = route(&graph, &node_id(start), &node_id(end));
        prop_assert_eq!(first, second);
    }
}

#[test]
fn unknown_endpoints_give_empty_route() {
    let graph = build(3, &[(0, 1, 5), (1, 2, 10)]);
    assert!(route(&graph, &node_id(0), &NodeId::from("nowhere")).is_empty());
    assert!(route(&graph, &NodeId::from("nowhere"), &node_id(0)).is_empty());
}
