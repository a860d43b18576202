use anyhow::Result;
use async_trait::async_trait;

use super::{InstructionGenerator, SpeechSynthesizer};

/// Speech backend that stays silent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSpeech;

#[async_trait]
impl SpeechSynthesizer for NoSpeech {
    async fn speak(&self, _text: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

/// Offline route advice built from the path alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateInstructions;

#[async_trait]
impl InstructionGenerator for TemplateInstructions {
    async fn instructions(&self, path_names: &[String], verbose: bool) -> Result<Vec<String>> {
        let (Some(first), Some(last)) = (path_names.first(), path_names.last()) else {
            return Ok(Vec::new());
        };
        if path_names.len() == 1 {
            return Ok(vec![format!("You are already at the {last}.")]);
        }

        if !verbose {
            return Ok(vec![format!(
                "Follow the arrows from the {first} to the {last}."
            )]);
        }

        let mut lines: Vec<String> = path_names
            .windows(2)
            .map(|pair| format!("From the {}, head towards the {}.", pair[0], pair[1]))
            .collect();
        lines.push(format!("Look for the {last} signage as you approach."));
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[tokio::test]
    async fn test_template_brief_and_verbose() {
        let path = names(&["Main Gate", "Admin Block", "Central Library"]);

        let brief = TemplateInstructions.instructions(&path, false).await.unwrap();
        assert_eq!(brief, vec!["Follow the arrows from the Main Gate to the Central Library."]);

        let verbose = TemplateInstructions.instructions(&path, true).await.unwrap();
        assert_eq!(verbose.len(), 3);
        assert_eq!(verbose[0], "From the Main Gate, head towards the Admin Block.");
    }

    #[tokio::test]
    async fn test_template_edge_paths() {
        assert!(TemplateInstructions.instructions(&[], true).await.unwrap().is_empty());
        let single = TemplateInstructions
            .instructions(&names(&["Main Canteen"]), false)
            .await
            .unwrap();
        assert_eq!(single, vec!["You are already at the Main Canteen."]);
    }

    #[tokio::test]
    async fn test_no_speech_returns_nothing() {
        assert!(NoSpeech.speak("hello").await.unwrap().is_none());
    }
}
