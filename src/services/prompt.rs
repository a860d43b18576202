//! Prompt text for model-backed collaborators.

use crate::graph::CampusGraph;
use crate::models::DetectionRole;

fn node_names(graph: &CampusGraph) -> String {
    graph
        .nodes()
        .iter()
        .map(|node| node.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn system_prompt(graph: &CampusGraph) -> String {
    format!(
        "You are a Campus Navigation Assistant.\n\
         You are given a map of nodes: {}.\n\
         Your job is to identify a location from a visual description or image and provide navigation instructions.\n\
         If identifying from an image, analyze landmarks like signage, building colors, and surroundings.\n\
         When providing directions, use a helpful, student-friendly tone.\n\
         Always refer to the nodes by their official names.",
        node_names(graph)
    )
}

pub fn detection_prompt(graph: &CampusGraph, role: DetectionRole) -> String {
    let question = match role {
        DetectionRole::Locate => "Identify which campus location this is.",
        DetectionRole::Destination => {
            "The user is pointing the camera at the place they want to go. Identify which campus location this is."
        }
    };
    format!(
        "{question} Choose from: {}. Return your answer in JSON format with \"locationId\" \
         (the internal ID), \"confidence\" (0-1), and a brief \"description\" of why you think so.",
        node_names(graph)
    )
}

pub fn arrival_prompt(destination_name: &str) -> String {
    format!(
        "The user believes they have reached the {destination_name}. Does this image show the \
         {destination_name}? Return JSON with \"arrived\" (true or false) and \"confidence\" (0-1)."
    )
}

pub fn advice_prompt(path_names: &[String]) -> String {
    let (current, destination) = match (path_names.first(), path_names.last()) {
        (Some(first), Some(last)) => (first.as_str(), last.as_str()),
        _ => ("an unknown place", "an unknown place"),
    };
    format!(
        "I am currently at {current} and want to go to {destination}. The suggested path is: {}. \
         Give me some helpful tips or landmarks I should look for along this route.",
        path_names.join(" -> ")
    )
}
