//! services/api/src/web/state.rs
//!
//! Defines the application's shared and session-specific states.

use crate::config::Config;
use lesson_quiz_core::{
    ports::{ChatAssistantService, LessonRepository, ProgressRepository, UserRepository},
    Lesson, LessonId, ProgressTracker, QuizRunner, SessionContext, SessionEvent,
    TutorConversation,
};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub lessons: Arc<dyn LessonRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub users: Arc<dyn UserRepository>,
    pub chat: Arc<dyn ChatAssistantService>,
    pub config: Arc<Config>,
}

//=========================================================================================
// SessionState (Specific to One WebSocket Connection)
//=========================================================================================

/// The state for a single quiz attempt. Dropping it cancels any pending transition.
pub struct SessionState {
    pub context: SessionContext,
    pub lesson_id: LessonId,
    pub runner: QuizRunner,
    pub conversation: TutorConversation,
}

impl SessionState {
    /// Starts the quiz for `lesson` and seeds the tutoring conversation with its content.
    pub fn new(
        app_state: &AppState,
        context: SessionContext,
        lesson: Lesson,
    ) -> (Self, UnboundedReceiver<SessionEvent>) {
        let lesson_id = lesson.id;
        let conversation = TutorConversation::new(&lesson.title, &lesson.content);
        let (runner, events) = QuizRunner::start(
            lesson,
            context,
            ProgressTracker::new(app_state.progress.clone()),
            app_state.config.feedback_display,
        );

        let state = Self {
            context,
            lesson_id,
            runner,
            conversation,
        };
        (state, events)
    }
}
