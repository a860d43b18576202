//! Shortest-path routing over the campus graph.
//!
//! Dijkstra by cumulative edge distance. Frontier ties are broken by the
//! smallest node id, and a node's predecessor is only replaced by a strictly
//! shorter distance, so among equal-cost routes the result is fixed by the
//! graph alone (never by hash order).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;

use crate::models::NodeId;

use super::CampusGraph;

/// A computed route with its total walking distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub nodes: Vec<NodeId>,
    pub distance: f64,
}

struct Frontier<'a> {
    cost: f64,
    node: usize,
    id: &'a str,
}

impl PartialEq for Frontier<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier<'_> {}

impl PartialOrd for Frontier<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier<'_> {
    // BinaryHeap is a max-heap: reverse so the cheapest, then smallest id, pops first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.id.cmp(self.id))
    }
}

/// Shortest path from `start` to `end` as a node sequence.
///
/// Empty when either id is unknown or no path connects them.
/// `route(g, s, s) == [s]` for any known `s`.
pub fn route(graph: &CampusGraph, start: &NodeId, end: &NodeId) -> Vec<NodeId> {
    route_with_distance(graph, start, end)
        .map(|route| route.nodes)
        .unwrap_or_default()
}

/// Like [`route`], but also reports the total distance.
pub fn route_with_distance(graph: &CampusGraph, start: &NodeId, end: &NodeId) -> Option<Route> {
    let source = graph.index_of(start)?;
    let target = graph.index_of(end)?;

    if source == target {
        return Some(Route {
            nodes: vec![start.clone()],
            distance: 0.0,
        });
    }

    let mut dist = vec![f64::INFINITY; graph.len()];
    let mut previous: Vec<Option<usize>> = vec![None; graph.len()];
    let mut settled = vec![false; graph.len()];
    let mut frontier = BinaryHeap::new();

    dist[source] = 0.0;
    frontier.push(Frontier {
        cost: 0.0,
        node: source,
        id: graph.node_at(source).id.as_str(),
    });

    while let Some(Frontier { cost, node, .. }) = frontier.pop() {
        if settled[node] {
            continue;
        }
        settled[node] = true;

        if node == target {
            break;
        }

        for &(next, edge) in graph.adjacency_of(node) {
            if settled[next] {
                continue;
            }
            let candidate = cost + graph.edge_at(edge).distance;
            if candidate < dist[next] {
                dist[next] = candidate;
                previous[next] = Some(node);
                frontier.push(Frontier {
                    cost: candidate,
                    node: next,
                    id: graph.node_at(next).id.as_str(),
                });
            }
        }
    }

    if !settled[target] {
        return None;
    }

    let mut nodes = vec![graph.node_at(target).id.clone()];
    let mut cursor = target;
    while let Some(prev) = previous[cursor] {
        nodes.push(graph.node_at(prev).id.clone());
        cursor = prev;
    }
    nodes.reverse();

    Some(Route {
        nodes,
        distance: dist[target],
    })
}

/// Sum of edge distances along `path`, using the cheapest edge between each
/// consecutive pair. `None` if two consecutive nodes are not adjacent.
pub fn path_distance(graph: &CampusGraph, path: &[NodeId]) -> Option<f64> {
    path.windows(2).try_fold(0.0, |total, pair| {
        graph
            .edge_between(&pair[0], &pair[1])
            .map(|edge| total + edge.distance)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CampusEdge, CampusNode, NodeCategory};

    fn graph(ids: &[&str], edges: &[(&str, &str, f64)]) -> CampusGraph {
        let nodes = ids
            .iter()
            .map(|id| CampusNode {
                id: NodeId::from(*id),
                name: id.to_string(),
                category: NodeCategory::Outdoor,
                x: 0.0,
                y: 0.0,
                description: String::new(),
            })
            .collect();
        let edges = edges
            .iter()
            .map(|&(from, to, distance)| CampusEdge {
                from: NodeId::from(from),
                to: NodeId::from(to),
                distance,
                instruction: None,
            })
            .collect();
        CampusGraph::new(nodes, edges).unwrap()
    }

    fn ids(path: &[NodeId]) -> Vec<&str> {
        path.iter().map(NodeId::as_str).collect()
    }

    #[test]
    fn test_prefers_cheaper_two_hop_route() {
        let g = graph(&["A", "B", "C"], &[("A", "B", 10.0), ("B", "C", 5.0), ("A", "C", 20.0)]);
        let found = route_with_distance(&g, &"A".into(), &"C".into()).unwrap();
        assert_eq!(ids(&found.nodes), vec!["A", "B", "C"]);
        assert_eq!(found.distance, 15.0);
        assert_eq!(path_distance(&g, &found.nodes), Some(15.0));
    }

    #[test]
    fn test_same_start_and_end() {
        let g = graph(&["A", "B"], &[("A", "B", 1.0)]);
        assert_eq!(ids(&route(&g, &"A".into(), &"A".into())), vec!["A"]);
    }

    #[test]
    fn test_unknown_ids_yield_empty() {
        let g = graph(&["A", "B"], &[("A", "B", 1.0)]);
        assert!(route(&g, &"A".into(), &"Z".into()).is_empty());
        assert!(route(&g, &"Z".into(), &"A".into()).is_empty());
        assert!(route(&g, &"Z".into(), &"Z".into()).is_empty());
    }

    #[test]
    fn test_disconnected_yields_empty() {
        let g = graph(&["A", "B", "C", "D"], &[("A", "B", 1.0), ("C", "D", 1.0)]);
        assert!(route(&g, &"A".into(), &"D".into()).is_empty());
        assert!(route_with_distance(&g, &"B".into(), &"C".into()).is_none());
    }

    #[test]
    fn test_equal_cost_tie_prefers_smallest_id() {
        // S -> {M, N} -> T, both branches cost 2. M sorts before N.
        let g = graph(
            &["S", "N", "M", "T"],
            &[("S", "N", 1.0), ("S", "M", 1.0), ("N", "T", 1.0), ("M", "T", 1.0)],
        );
        for _ in 0..5 {
            assert_eq!(ids(&route(&g, &"S".into(), &"T".into())), vec!["S", "M", "T"]);
        }
    }

    #[test]
    fn test_parallel_edges_use_cheapest() {
        let g = graph(&["A", "B"], &[("A", "B", 7.0), ("A", "B", 3.0)]);
        let found = route_with_distance(&g, &"A".into(), &"B".into()).unwrap();
        assert_eq!(found.distance, 3.0);
    }

    #[test]
    fn test_path_distance_rejects_non_adjacent_pairs() {
        let g = graph(&["A", "B", "C"], &[("A", "B", 1.0)]);
        assert_eq!(path_distance(&g, &["A".into(), "C".into()]), None);
        assert_eq!(path_distance(&g, &["A".into()]), Some(0.0));
    }
}
