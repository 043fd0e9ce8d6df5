//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the API server
//! for a single quiz attempt.

use lesson_quiz_core::{Answer, Question, SessionEvent};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// A selected answer: a JSON number picks an option, a JSON string is free text.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum AnswerPayload {
    Choice(usize),
    Text(String),
}

impl From<AnswerPayload> for Answer {
    fn from(payload: AnswerPayload) -> Self {
        match payload {
            AnswerPayload::Choice(index) => Answer::Choice(index),
            AnswerPayload::Text(text) => Answer::Text(text),
        }
    }
}

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Opens the quiz for a lesson. This must be the first message sent on the connection.
    Init { lesson_id: Uuid },

    /// Picks or replaces the pending answer for the current question.
    SelectAnswer { answer: AnswerPayload },

    /// Submits the pending answer for grading.
    Advance,

    /// A question for the lesson's tutoring assistant.
    Chat { message: String },
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// A question as the student sees it. The correct answer is never sent.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionView {
    MultipleChoice { text: String, options: Vec<String> },
    ShortAnswer { text: String },
}

impl From<Question> for QuestionView {
    fn from(question: Question) -> Self {
        match question {
            Question::MultipleChoice { text, options, .. } => {
                QuestionView::MultipleChoice { text, options }
            }
            Question::ShortAnswer { text, .. } => QuestionView::ShortAnswer { text },
        }
    }
}

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms the lesson was loaded and the quiz has started.
    SessionInitialized {
        lesson_id: Uuid,
        title: String,
        content: String,
        total_questions: usize,
    },

    /// The question that is now current.
    Question { index: usize, question: QuestionView },

    /// The verdict on the last submitted answer. Cleared by the next `question` or `completed`.
    Feedback {
        correct: bool,
        correct_answer: Option<String>,
    },

    /// The quiz is over.
    Completed { score: u32, total_questions: usize },

    /// The lesson was added to the student's completed lessons.
    ProgressSaved { lesson_id: Uuid },

    /// The tutoring assistant's answer to a `chat` message.
    ChatReply { content: String },

    /// Reports an error to the client, which should display the message inline.
    Error { message: String },
}

impl From<SessionEvent> for ServerMessage {
    fn from(event: SessionEvent) -> Self {
        match event {
            SessionEvent::Question { index, question } => ServerMessage::Question {
                index,
                question: question.into(),
            },
            SessionEvent::Feedback(feedback) => ServerMessage::Feedback {
                correct: feedback.correct,
                correct_answer: feedback.correct_answer,
            },
            SessionEvent::Completed {
                score,
                total_questions,
            } => ServerMessage::Completed {
                score,
                total_questions,
            },
            SessionEvent::ProgressRecorded { lesson_id } => {
                ServerMessage::ProgressSaved { lesson_id }
            }
            SessionEvent::ProgressFailed { message } => ServerMessage::Error { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_quiz_core::Feedback;

    #[test]
    fn select_answer_accepts_number_or_text() {
        let choice: ClientMessage =
            serde_json::from_str(r#"{"type":"select_answer","answer":2}"#).unwrap();
        let text: ClientMessage =
            serde_json::from_str(r#"{"type":"select_answer","answer":"Paris"}"#).unwrap();

        assert!(matches!(
            choice,
            ClientMessage::SelectAnswer {
                answer: AnswerPayload::Choice(2)
            }
        ));
        match text {
            ClientMessage::SelectAnswer { answer } => {
                assert_eq!(Answer::from(answer), Answer::Text("Paris".into()))
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn advance_has_no_payload() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"advance"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Advance));
    }

    #[test]
    fn question_view_hides_the_answer() {
        let msg = ServerMessage::from(SessionEvent::Question {
            index: 0,
            question: Question::MultipleChoice {
                text: "2+2?".into(),
                options: vec!["3".into(), "4".into()],
                correct_answer: 1,
            },
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "question");
        assert_eq!(json["question"]["kind"], "multiple_choice");
        assert!(json["question"].get("correct_answer").is_none());
    }

    #[test]
    fn wrong_feedback_carries_the_correct_answer() {
        let msg = ServerMessage::from(SessionEvent::Feedback(Feedback {
            correct: false,
            correct_answer: Some("Paris, France".into()),
        }));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "feedback", "correct": false, "correct_answer": "Paris, France"})
        );
    }

    #[test]
    fn progress_failure_becomes_an_inline_error() {
        let msg = ServerMessage::from(SessionEvent::ProgressFailed {
            message: "Failed to update progress".into(),
        });
        assert_eq!(
            msg,
            ServerMessage::Error {
                message: "Failed to update progress".into()
            }
        );
    }
}
