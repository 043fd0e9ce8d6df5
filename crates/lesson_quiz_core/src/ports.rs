//! crates/lesson_quiz_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the hosted document store and the chat model behind it.

use async_trait::async_trait;

use crate::domain::{ChatMessage, Lesson, LessonId, ProgressRecord, Question, Role, UserId};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Repository Ports (Traits)
//=========================================================================================

/// A lesson as submitted for creation; the repository assigns its id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLesson {
    pub title: String,
    pub content: String,
    pub questions: Vec<Question>,
}

#[async_trait]
pub trait LessonRepository: Send + Sync {
    async fn get_lesson(&self, lesson_id: LessonId) -> PortResult<Lesson>;

    /// All lessons sorted by `order` ascending.
    async fn list_lessons(&self) -> PortResult<Vec<Lesson>>;

    /// The highest `order` among existing lessons, `None` when there are none.
    async fn max_order(&self) -> PortResult<Option<i64>>;

    async fn create_lesson(&self, lesson: NewLesson, order: i64) -> PortResult<LessonId>;
}

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    async fn get_progress(&self, student_id: UserId) -> PortResult<Option<ProgressRecord>>;

    /// Full replace of the student's record.
    async fn put_progress(&self, record: ProgressRecord) -> PortResult<()>;

    /// Union `lesson_id` into an existing record's completed set.
    async fn add_completed_lesson(&self, student_id: UserId, lesson_id: LessonId)
        -> PortResult<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_role(&self, user_id: UserId) -> PortResult<Option<Role>>;

    async fn set_role(&self, user_id: UserId, role: Role) -> PortResult<()>;
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait ChatAssistantService: Send + Sync {
    /// Produces the next assistant utterance for the whole conversation so far.
    /// `Ok(None)` means the model answered without any text.
    async fn reply(&self, conversation: &[ChatMessage]) -> PortResult<Option<String>>;
}
