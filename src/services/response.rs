//! Parsing of JSON replies from a vision model.
//!
//! Models often wrap JSON in markdown fences and sometimes answer with a
//! node's display name instead of its id; both are tolerated here.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::graph::CampusGraph;
use crate::models::{ArrivalVerdict, DetectionResult, NodeId};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectionReply {
    location_id: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArrivalReply {
    arrived: bool,
    #[serde(default)]
    confidence: f64,
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse a detection reply. Returns `Ok(None)` when the named location is not
/// on the campus; malformed JSON is an error.
pub fn parse_detection_reply(graph: &CampusGraph, text: &str) -> Result<Option<DetectionResult>> {
    let reply: DetectionReply = serde_json::from_str(strip_code_fence(text))
        .context("detection reply is not valid JSON")?;

    let candidate = reply.location_id.trim();
    let node = graph
        .node(&NodeId::from(candidate))
        .or_else(|| graph.node_by_name(candidate));

    Ok(node.map(|node| DetectionResult::new(node.id.clone(), reply.confidence, reply.description)))
}

pub fn parse_arrival_reply(text: &str) -> Result<ArrivalVerdict> {
    let reply: ArrivalReply = serde_json::from_str(strip_code_fence(text))
        .context("arrival reply is not valid JSON")?;
    Ok(ArrivalVerdict {
        arrived: reply.arrived,
        confidence: reply.confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_with_id() {
        let graph = CampusGraph::builtin();
        let text = r#"{"locationId":"library","confidence":0.91,"description":"glass facade"}"#;
        let result = parse_detection_reply(&graph, text).unwrap().unwrap();
        assert_eq!(result.node_id.as_str(), "library");
        assert_eq!(result.confidence, 0.91);
        assert_eq!(result.rationale, "glass facade");
    }

    #[test]
    fn test_reply_with_name_in_code_fence() {
        let graph = CampusGraph::builtin();
        let text = "```json\n{\"locationId\":\"main canteen\",\"confidence\":0.5,\"description\":\"tables\"}\n```";
        let result = parse_detection_reply(&graph, text).unwrap().unwrap();
        assert_eq!(result.node_id.as_str(), "canteen");
    }

    #[test]
    fn test_reply_with_unknown_location() {
        let graph = CampusGraph::builtin();
        let text = r#"{"locationId":"Swimming Pool","confidence":0.9,"description":"water"}"#;
        assert!(parse_detection_reply(&graph, text).unwrap().is_none());
    }

    #[test]
    fn test_malformed_reply_is_error() {
        let graph = CampusGraph::builtin();
        assert!(parse_detection_reply(&graph, "I think it's the library").is_err());
    }

    #[test]
    fn test_arrival_reply() {
        let verdict = parse_arrival_reply(r#"{"arrived":true,"confidence":0.8}"#).unwrap();
        assert!(verdict.arrived);
        assert_eq!(verdict.confidence, 0.8);
        assert!(parse_arrival_reply("{}").is_err());
    }
}
