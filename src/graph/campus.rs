use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::models::{CampusEdge, CampusNode, NodeId};

/// On-disk layout of a campus map: `{ "nodes": [...], "edges": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampusConfig {
    pub nodes: Vec<CampusNode>,
    pub edges: Vec<CampusEdge>,
}

/// Immutable, validated campus graph.
///
/// Nodes keep their declaration order; adjacency is stored by node index so
/// the router never hashes strings inside its hot loop. Parallel edges are
/// kept as declared.
#[derive(Debug, Clone)]
pub struct CampusGraph {
    nodes: Vec<CampusNode>,
    edges: Vec<CampusEdge>,
    index: HashMap<NodeId, usize>,
    /// node index -> [(neighbour index, edge index)]
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl CampusGraph {
    pub fn new(nodes: Vec<CampusNode>, edges: Vec<CampusEdge>) -> Result<Self, GraphError> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            if node.id.as_str().is_empty() {
                return Err(GraphError::EmptyNodeId(position));
            }
            if index.insert(node.id.clone(), position).is_some() {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
        }

        let mut adjacency = vec![Vec::new(); nodes.len()];
        for (edge_idx, edge) in edges.iter().enumerate() {
            let lookup = |id: &NodeId| {
                index.get(id).copied().ok_or_else(|| GraphError::UnknownEndpoint {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    missing: id.clone(),
                })
            };
            let a = lookup(&edge.from)?;
            let b = lookup(&edge.to)?;

            if a == b {
                return Err(GraphError::SelfLoop(edge.from.clone()));
            }
            if !edge.distance.is_finite() || edge.distance <= 0.0 {
                return Err(GraphError::InvalidDistance {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    distance: edge.distance,
                });
            }

            adjacency[a].push((b, edge_idx));
            adjacency[b].push((a, edge_idx));
        }

        Ok(Self {
            nodes,
            edges,
            index,
            adjacency,
        })
    }

    pub fn from_config(config: CampusConfig) -> Result<Self, GraphError> {
        Self::new(config.nodes, config.edges)
    }

    /// Load a campus map from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read campus map from {}", path.display()))?;
        let config: CampusConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse campus map {}", path.display()))?;
        Self::from_config(config)
            .with_context(|| format!("Invalid campus map {}", path.display()))
    }

    pub fn nodes(&self) -> &[CampusNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[CampusEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &NodeId) -> Option<&CampusNode> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    /// Case-insensitive lookup by display name.
    pub fn node_by_name(&self, name: &str) -> Option<&CampusNode> {
        let wanted = name.trim();
        self.nodes
            .iter()
            .find(|node| node.name.eq_ignore_ascii_case(wanted))
    }

    /// Display name for `id`, falling back to the raw id.
    pub fn display_name(&self, id: &NodeId) -> String {
        self.node(id)
            .map(|node| node.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Neighbours of `id` paired with the connecting edge.
    pub fn neighbours<'a>(
        &'a self,
        id: &NodeId,
    ) -> impl Iterator<Item = (&'a CampusNode, &'a CampusEdge)> + 'a {
        let adjacent = self
            .index
            .get(id)
            .map(|&idx| self.adjacency[idx].as_slice())
            .unwrap_or(&[]);
        adjacent
            .iter()
            .map(move |&(other, edge)| (&self.nodes[other], &self.edges[edge]))
    }

    /// Cheapest edge directly connecting `a` and `b`.
    pub fn edge_between(&self, a: &NodeId, b: &NodeId) -> Option<&CampusEdge> {
        self.neighbours(a)
            .map(|(_, edge)| edge)
            .filter(|edge| edge.other_end(a) == Some(b))
            .min_by(|lhs, rhs| lhs.distance.total_cmp(&rhs.distance))
    }

    pub(crate) fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub(crate) fn adjacency_of(&self, idx: usize) -> &[(usize, usize)] {
        &self.adjacency[idx]
    }

    pub(crate) fn node_at(&self, idx: usize) -> &CampusNode {
        &self.nodes[idx]
    }

    pub(crate) fn edge_at(&self, idx: usize) -> &CampusEdge {
        &self.edges[idx]
    }
}
