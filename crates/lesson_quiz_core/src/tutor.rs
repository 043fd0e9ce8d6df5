//! crates/lesson_quiz_core/src/tutor.rs
//!
//! The tutoring conversation attached to a lesson. The chat model itself is an
//! external service; this keeps the history and degrades failures to an apology.

use tracing::{error, warn};

use crate::domain::{ChatMessage, ChatRole};
use crate::ports::ChatAssistantService;

pub const ERROR_REPLY: &str = "Sorry, there was an error processing your request.";
pub const EMPTY_REPLY: &str = "Sorry, I couldn't generate a response.";

#[derive(Debug, Clone)]
pub struct TutorConversation {
    messages: Vec<ChatMessage>,
}

impl TutorConversation {
    /// Seeds the conversation with the tutoring system prompt for a lesson.
    pub fn new(lesson_title: &str, lesson_content: &str) -> Self {
        let system = format!(
            "You are a helpful tutor. The student is learning about {}. The learning content is {}",
            lesson_title, lesson_content
        );
        Self {
            messages: vec![ChatMessage::new(ChatRole::System, system)],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Everything but the system prompt.
    pub fn visible_messages(&self) -> &[ChatMessage] {
        &self.messages[1..]
    }

    /// Sends the student's `input` and returns the assistant's reply.
    /// Blank input is ignored and returns `None`.
    pub async fn ask(
        &mut self,
        assistant: &dyn ChatAssistantService,
        input: &str,
    ) -> Option<String> {
        if input.trim().is_empty() {
            return None;
        }
        self.messages.push(ChatMessage::new(ChatRole::User, input));

        let reply = match assistant.reply(&self.messages).await {
            Ok(Some(content)) if !content.is_empty() => content,
            Ok(_) => {
                warn!("Chat assistant returned no content.");
                EMPTY_REPLY.to_string()
            }
            Err(e) => {
                error!("Error calling chat assistant: {:?}", e);
                ERROR_REPLY.to_string()
            }
        };

        self.messages
            .push(ChatMessage::new(ChatRole::Assistant, reply.clone()));
        Some(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{PortError, PortResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedAssistant {
        reply: fn() -> PortResult<Option<String>>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedAssistant {
        fn new(reply: fn() -> PortResult<Option<String>>) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatAssistantService for ScriptedAssistant {
        async fn reply(&self, conversation: &[ChatMessage]) -> PortResult<Option<String>> {
            self.seen.lock().unwrap().push(conversation.to_vec());
            (self.reply)()
        }
    }

    #[test]
    fn seeds_system_prompt() {
        let convo = TutorConversation::new("Photosynthesis", "Plants turn light into sugar.");
        assert_eq!(
            convo.messages(),
            &[ChatMessage::new(
                ChatRole::System,
                "You are a helpful tutor. The student is learning about Photosynthesis. The learning content is Plants turn light into sugar."
            )]
        );
        assert!(convo.visible_messages().is_empty());
    }

    #[tokio::test]
    async fn appends_turns_in_order() {
        let assistant = ScriptedAssistant::new(|| Ok(Some("Chlorophyll.".into())));
        let mut convo = TutorConversation::new("Plants", "Leaves");

        let reply = convo.ask(&assistant, "What makes leaves green?").await;
        assert_eq!(reply.as_deref(), Some("Chlorophyll."));

        let roles: Vec<ChatRole> = convo.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![ChatRole::System, ChatRole::User, ChatRole::Assistant]
        );
        // The assistant saw the system prompt and the user turn.
        assert_eq!(assistant.seen.lock().unwrap()[0].len(), 2);
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let assistant = ScriptedAssistant::new(|| Ok(Some("unused".into())));
        let mut convo = TutorConversation::new("Plants", "Leaves");
        assert_eq!(convo.ask(&assistant, "   ").await, None);
        assert_eq!(convo.messages().len(), 1);
        assert!(assistant.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failure_degrades_to_apology() {
        let assistant =
            ScriptedAssistant::new(|| Err(PortError::Unexpected("timeout".into())));
        let mut convo = TutorConversation::new("Plants", "Leaves");
        assert_eq!(
            convo.ask(&assistant, "Why?").await.as_deref(),
            Some(ERROR_REPLY)
        );
        assert_eq!(convo.visible_messages().len(), 2);
    }

    #[tokio::test]
    async fn empty_reply_degrades_to_apology() {
        let assistant = ScriptedAssistant::new(|| Ok(None));
        let mut convo = TutorConversation::new("Plants", "Leaves");
        assert_eq!(
            convo.ask(&assistant, "Why?").await.as_deref(),
            Some(EMPTY_REPLY)
        );
    }
}
