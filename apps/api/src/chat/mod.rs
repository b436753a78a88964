// Career chat assistant: relays a short conversation to the hosted model.
// Nothing is stored server-side; the client sends the full history on every turn.

pub mod handlers;
pub mod prompts;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chat::prompts::CHAT_SYSTEM_INSTRUCTION;
use crate::llm_client::{ChatTurn, CompletionModel, LlmError, Role};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("History is required")]
    Empty,

    #[error("Last message must be from the user")]
    LastTurnNotFromUser,
}

/// Shapes a client history into turns the model accepts.
///
/// A conversation may not open with a model turn, so a single leading greeting from
/// the assistant is dropped. The final turn must be the user's pending message.
pub fn prepare_turns(mut history: Vec<ChatTurn>) -> Result<Vec<ChatTurn>, HistoryError> {
    if history.is_empty() {
        return Err(HistoryError::Empty);
    }
    if history[0].role == Role::Model {
        history.remove(0);
    }
    match history.last() {
        Some(turn) if turn.role == Role::User => Ok(history),
        _ => Err(HistoryError::LastTurnNotFromUser),
    }
}

/// Sends the prepared conversation and returns the model's reply.
pub async fn reply_to(turns: &[ChatTurn], model: &dyn CompletionModel) -> Result<String, LlmError> {
    model.converse(CHAT_SYSTEM_INSTRUCTION, turns).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::{Call, ScriptedModel};

    fn turn(role: Role, content: &str) -> ChatTurn {
        ChatTurn {
            role,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_empty_history_is_rejected() {
        assert_eq!(prepare_turns(vec![]).unwrap_err(), HistoryError::Empty);
    }

    #[test]
    fn test_leading_model_greeting_is_dropped() {
        let turns = prepare_turns(vec![
            turn(Role::Model, "Hi! How can I help?"),
            turn(Role::User, "How long should my resume be?"),
        ])
        .unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::User);
    }

    #[test]
    fn test_only_one_leading_model_turn_is_dropped() {
        let turns = prepare_turns(vec![
            turn(Role::Model, "Hi!"),
            turn(Role::Model, "Ask me anything."),
            turn(Role::User, "Cover letters?"),
        ])
        .unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::Model);
    }

    #[test]
    fn test_last_turn_must_be_from_user() {
        let err = prepare_turns(vec![
            turn(Role::User, "Hello"),
            turn(Role::Model, "Hi there"),
        ])
        .unwrap_err();
        assert_eq!(err, HistoryError::LastTurnNotFromUser);
    }

    #[test]
    fn test_lone_model_greeting_leaves_no_user_turn() {
        let err = prepare_turns(vec![turn(Role::Model, "Hi!")]).unwrap_err();
        assert_eq!(err, HistoryError::LastTurnNotFromUser);
    }

    #[tokio::test]
    async fn test_reply_uses_chat_system_instruction() {
        let model = ScriptedModel::new().reply("1. Keep it to one page.");
        let turns = vec![turn(Role::User, "How long should my resume be?")];

        let reply = reply_to(&turns, &model).await.unwrap();
        assert_eq!(reply, "1. Keep it to one page.");

        let calls = model.calls();
        assert!(matches!(
            &calls[0],
            Call::Converse { system, turns } if system.contains("markdown") && *turns == 1
        ));
    }
}
