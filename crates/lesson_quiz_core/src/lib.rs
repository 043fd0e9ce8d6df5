pub mod authoring;
pub mod domain;
pub mod enrollment;
pub mod grading;
pub mod ports;
pub mod progress;
pub mod runner;
pub mod session;
pub mod tutor;

pub use authoring::{create_lesson, next_order, CreateLessonError, DraftError, LessonDraft};
pub use domain::{
    Answer, ChatMessage, ChatRole, Lesson, LessonId, LessonSummary, ProgressRecord, Question,
    Role, SessionContext, UserId,
};
pub use enrollment::{dashboard, enroll, Dashboard, EnrollmentRequest};
pub use grading::grade;
pub use ports::{
    ChatAssistantService, LessonRepository, NewLesson, PortError, PortResult, ProgressRepository,
    UserRepository,
};
pub use progress::{percent_complete, ProgressTracker};
pub use runner::{QuizRunner, SessionEvent, DEFAULT_FEEDBACK_DELAY};
pub use session::{Feedback, QuizError, QuizSession, QuizState, Transition};
pub use tutor::TutorConversation;
