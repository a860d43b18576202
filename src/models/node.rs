use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a campus location vertex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NodeCategory {
    Outdoor,
    Indoor,
    Cabin,
    Lab,
    Office,
    Entrance,
}

impl NodeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeCategory::Outdoor => "outdoor",
            NodeCategory::Indoor => "indoor",
            NodeCategory::Cabin => "cabin",
            NodeCategory::Lab => "lab",
            NodeCategory::Office => "office",
            NodeCategory::Entrance => "entrance",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CampusNode {
    pub id: NodeId,
    pub name: String,
    pub category: NodeCategory,
    /// Planar map position in percent of map width/height. Rendering only.
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CampusEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub distance: f64,
    /// Micro-instruction for walking this edge, e.g. "take the stairs".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
}

impl CampusEdge {
    /// The endpoint opposite `id`, if `id` is one of this edge's endpoints.
    pub fn other_end(&self, id: &NodeId) -> Option<&NodeId> {
        if &self.from == id {
            Some(&self.to)
        } else if &self.to == id {
            Some(&self.from)
        } else {
            None
        }
    }
}
