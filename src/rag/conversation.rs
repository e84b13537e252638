//! Conversation assembly for chat completions.

use crate::error::{LeseError, Result};
use crate::store::ChatTurn;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
};

/// Assemble the full message sequence for one completion call.
///
/// Order: the system instruction, each prior turn as a user/assistant
/// pair in chronological order, then the new question. Callers with no
/// session pass an empty turn slice.
pub fn assemble_messages(
    system_instruction: &str,
    prior_turns: &[ChatTurn],
    question: &str,
) -> Result<Vec<ChatCompletionRequestMessage>> {
    let mut messages: Vec<ChatCompletionRequestMessage> =
        Vec::with_capacity(prior_turns.len() * 2 + 2);

    messages.push(
        ChatCompletionRequestSystemMessageArgs::default()
            .content(system_instruction.to_string())
            .build()
            .map_err(|e| LeseError::Generation(e.to_string()))?
            .into(),
    );

    for turn in prior_turns {
        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(turn.question.clone())
                .build()
                .map_err(|e| LeseError::Generation(e.to_string()))?
                .into(),
        );
        messages.push(
            ChatCompletionRequestAssistantMessageArgs::default()
                .content(turn.response.clone())
                .build()
                .map_err(|e| LeseError::Generation(e.to_string()))?
                .into(),
        );
    }

    messages.push(
        ChatCompletionRequestUserMessageArgs::default()
            .content(question.to_string())
            .build()
            .map_err(|e| LeseError::Generation(e.to_string()))?
            .into(),
    );

    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::types::{
        ChatCompletionRequestAssistantMessageContent, ChatCompletionRequestSystemMessageContent,
        ChatCompletionRequestUserMessageContent,
    };

    fn role_and_text(msg: &ChatCompletionRequestMessage) -> (&'static str, String) {
        match msg {
            ChatCompletionRequestMessage::System(m) => {
                let text = match &m.content {
                    ChatCompletionRequestSystemMessageContent::Text(t) => t.clone(),
                    _ => String::new(),
                };
                ("system", text)
            }
            ChatCompletionRequestMessage::User(m) => {
                let text = match &m.content {
                    ChatCompletionRequestUserMessageContent::Text(t) => t.clone(),
                    _ => String::new(),
                };
                ("user", text)
            }
            ChatCompletionRequestMessage::Assistant(m) => {
                let text = match &m.content {
                    Some(ChatCompletionRequestAssistantMessageContent::Text(t)) => t.clone(),
                    _ => String::new(),
                };
                ("assistant", text)
            }
            _ => ("other", String::new()),
        }
    }

    fn turn(question: &str, response: &str) -> ChatTurn {
        ChatTurn {
            question: question.to_string(),
            response: response.to_string(),
            document_id: None,
        }
    }

    #[test]
    fn test_message_order_is_exact() {
        let turns = vec![turn("q1", "r1"), turn("q2", "r2")];
        let messages = assemble_messages("be helpful", &turns, "q3").unwrap();

        let sequence: Vec<(&str, String)> =
            messages.iter().map(role_and_text).collect();
        assert_eq!(
            sequence,
            vec![
                ("system", "be helpful".to_string()),
                ("user", "q1".to_string()),
                ("assistant", "r1".to_string()),
                ("user", "q2".to_string()),
                ("assistant", "r2".to_string()),
                ("user", "q3".to_string()),
            ]
        );
    }

    #[test]
    fn test_no_prior_turns_yields_system_and_question() {
        let messages = assemble_messages("be helpful", &[], "hello?").unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(role_and_text(&messages[0]), ("system", "be helpful".to_string()));
        assert_eq!(role_and_text(&messages[1]), ("user", "hello?".to_string()));
    }
}
