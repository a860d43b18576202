use crate::models::{CampusEdge, CampusNode, NodeCategory, NodeId};

use super::CampusGraph;

const NODES: &[(&str, &str, NodeCategory, f64, f64, &str)] = &[
    ("gate", "Main Gate", NodeCategory::Entrance, 10.0, 50.0, "The primary entrance to the campus."),
    ("admin", "Admin Block", NodeCategory::Office, 30.0, 30.0, "Administrative offices and student services."),
    ("library", "Central Library", NodeCategory::Indoor, 50.0, 20.0, "The hub of academic resources."),
    ("canteen", "Main Canteen", NodeCategory::Outdoor, 40.0, 70.0, "Food court and relaxation zone."),
    ("blockA", "Academic Block A", NodeCategory::Lab, 70.0, 40.0, "Engineering and Science classrooms."),
    ("blockB", "Academic Block B", NodeCategory::Indoor, 80.0, 60.0, "Humanities and Business classrooms."),
    ("auditorium", "Main Auditorium", NodeCategory::Indoor, 60.0, 80.0, "Large venue for events."),
];

const EDGES: &[(&str, &str, f64)] = &[
    ("gate", "admin", 200.0),
    ("admin", "library", 150.0),
    ("admin", "canteen", 180.0),
    ("library", "blockA", 120.0),
    ("canteen", "auditorium", 100.0),
    ("blockA", "blockB", 150.0),
    ("blockB", "auditorium", 130.0),
    ("blockA", "auditorium", 250.0),
];

impl CampusGraph {
    /// The default campus shipped with the app.
    pub fn builtin() -> Self {
        let nodes = NODES
            .iter()
            .map(|&(id, name, category, x, y, description)| CampusNode {
                id: NodeId::from(id),
                name: name.to_string(),
                category,
                x,
                y,
                description: description.to_string(),
            })
            .collect();
        let edges = EDGES
            .iter()
            .map(|&(from, to, distance)| CampusEdge {
                from: NodeId::from(from),
                to: NodeId::from(to),
                distance,
                instruction: None,
            })
            .collect();

        match CampusGraph::new(nodes, edges) {
            Ok(graph) => graph,
            // The tables above are static; a failure here is a programming error.
            Err(err) => unreachable!("built-in campus is invalid: {err}"),
        }
    }
}
