use serde::Deserialize;

use crate::models::{DetectionRole, NodeId};

use super::controller::{NavigationController, NavigationSnapshot};

/// Commands the presentation layer can send, e.g. as
/// `{"command": "setDestination", "nodeId": "library"}`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum NavigationCommand {
    GetState,
    #[serde(rename_all = "camelCase")]
    SetLocation {
        node_id: NodeId,
    },
    #[serde(rename_all = "camelCase")]
    SetDestination {
        node_id: NodeId,
    },
    AdvanceStep,
    Reset,
    ConfirmPending {
        role: DetectionRole,
    },
    DismissPending {
        role: DetectionRole,
    },
    SendMessage {
        text: String,
    },
}

pub async fn dispatch(
    controller: &NavigationController,
    command: NavigationCommand,
) -> Result<NavigationSnapshot, String> {
    match command {
        NavigationCommand::GetState => Ok(controller.snapshot().await),
        NavigationCommand::SetLocation { node_id } => controller
            .set_location(node_id)
            .await
            .map_err(|e| e.to_string()),
        NavigationCommand::SetDestination { node_id } => controller
            .set_destination(node_id)
            .await
            .map_err(|e| e.to_string()),
        NavigationCommand::AdvanceStep => controller.advance_step().await.map_err(|e| e.to_string()),
        NavigationCommand::Reset => Ok(controller.reset().await),
        NavigationCommand::ConfirmPending { role } => controller
            .confirm_pending(role)
            .await
            .map_err(|e| e.to_string()),
        NavigationCommand::DismissPending { role } => controller
            .dismiss_pending(role)
            .await
            .map_err(|e| e.to_string()),
        NavigationCommand::SendMessage { text } => controller
            .post_message(&text)
            .await
            .map_err(|e| e.to_string()),
    }
}

/// Parse and run a JSON command.
pub async fn dispatch_json(
    controller: &NavigationController,
    payload: &str,
) -> Result<NavigationSnapshot, String> {
    let command: NavigationCommand =
        serde_json::from_str(payload).map_err(|e| format!("invalid command: {e}"))?;
    dispatch(controller, command).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_format() {
        let command: NavigationCommand =
            serde_json::from_str(r#"{"command":"setDestination","nodeId":"library"}"#).unwrap();
        assert_eq!(
            command,
            NavigationCommand::SetDestination {
                node_id: NodeId::from("library")
            }
        );

        let command: NavigationCommand =
            serde_json::from_str(r#"{"command":"confirmPending","role":"locate"}"#).unwrap();
        assert_eq!(
            command,
            NavigationCommand::ConfirmPending {
                role: DetectionRole::Locate
            }
        );

        let command: NavigationCommand =
            serde_json::from_str(r#"{"command":"sendMessage","text":"where is the canteen?"}"#)
                .unwrap();
        assert_eq!(
            command,
            NavigationCommand::SendMessage {
                text: "where is the canteen?".to_string()
            }
        );

        assert!(serde_json::from_str::<NavigationCommand>(r#"{"command":"fly"}"#).is_err());
    }
}
