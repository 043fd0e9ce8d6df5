//! crates/lesson_quiz_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These types are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub type LessonId = Uuid;
pub type UserId = Uuid;

//=========================================================================================
// Questions and Answers
//=========================================================================================

/// A single quiz question embedded in a lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Question {
    /// Pick one of `options`; `correct_answer` indexes into it.
    MultipleChoice {
        text: String,
        options: Vec<String>,
        correct_answer: usize,
    },
    /// Free-text answer, optionally accepted on a keyword match.
    ShortAnswer {
        text: String,
        correct_answer: String,
        keyword: Option<String>,
    },
}

impl Question {
    pub fn text(&self) -> &str {
        match self {
            Question::MultipleChoice { text, .. } | Question::ShortAnswer { text, .. } => text,
        }
    }

    /// The literal correct answer as shown to a student after a wrong attempt.
    ///
    /// For short-answer questions this is the canonical answer, never the keyword.
    pub fn correct_answer_text(&self) -> String {
        match self {
            Question::MultipleChoice {
                options,
                correct_answer,
                ..
            } => options
                .get(*correct_answer)
                .cloned()
                .unwrap_or_else(|| correct_answer.to_string()),
            Question::ShortAnswer { correct_answer, .. } => correct_answer.clone(),
        }
    }
}

/// A candidate answer for the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Choice(usize),
    Text(String),
}

impl Answer {
    /// A text answer with nothing but whitespace counts as no answer at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Answer::Choice(_) => false,
            Answer::Text(text) => text.trim().is_empty(),
        }
    }
}

//=========================================================================================
// Lessons
//=========================================================================================

/// An authored unit of content plus an ordered quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    pub content: String,
    pub questions: Vec<Question>,
    pub order: i64,
    pub created_at: DateTime<Utc>,
}

/// The slice of a lesson shown in the dashboard listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonSummary {
    pub id: LessonId,
    pub title: String,
    pub order: i64,
}

impl From<&Lesson> for LessonSummary {
    fn from(lesson: &Lesson) -> Self {
        Self {
            id: lesson.id,
            title: lesson.title.clone(),
            order: lesson.order,
        }
    }
}

//=========================================================================================
// Users and Progress
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Who is acting, passed explicitly into every operation that needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: UserId,
    pub role: Role,
}

/// The per-student set of completed lessons. Completion percentage is derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub student_id: UserId,
    pub completed_lessons: BTreeSet<LessonId>,
}

impl ProgressRecord {
    pub fn empty(student_id: UserId) -> Self {
        Self {
            student_id,
            completed_lessons: BTreeSet::new(),
        }
    }
}

//=========================================================================================
// Tutoring Chat
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// Represents a single turn in a tutoring conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiple_choice_correct_answer_is_the_option_text() {
        let q = Question::MultipleChoice {
            text: "2 + 2?".into(),
            options: vec!["3".into(), "4".into()],
            correct_answer: 1,
        };
        assert_eq!(q.correct_answer_text(), "4");
    }

    #[test]
    fn short_answer_reveals_canonical_answer_not_keyword() {
        let q = Question::ShortAnswer {
            text: "Capital of France?".into(),
            correct_answer: "Paris, France".into(),
            keyword: Some("paris".into()),
        };
        assert_eq!(q.correct_answer_text(), "Paris, France");
    }

    #[test]
    fn whitespace_text_answer_is_empty() {
        assert!(Answer::Text("   ".into()).is_empty());
        assert!(!Answer::Text(" a ".into()).is_empty());
        assert!(!Answer::Choice(0).is_empty());
    }

    #[test]
    fn role_round_trips_through_str() {
        assert_eq!("teacher".parse::<Role>().unwrap(), Role::Teacher);
        assert_eq!(Role::Student.to_string(), "student");
        assert!("admin".parse::<Role>().is_err());
    }
}
