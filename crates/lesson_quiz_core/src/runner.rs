//! crates/lesson_quiz_core/src/runner.rs
//!
//! Drives a `QuizSession` in real time for one student.
//!
//! After an answer is graded the feedback stays up for `feedback_delay`, then the
//! runner moves on by itself. That step runs on a spawned task and is cancelled
//! when the runner is closed or dropped, so an abandoned session never changes.
//!
//! A lesson without questions is complete as soon as it starts, and its
//! completion is recorded right away.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::domain::{Answer, Lesson, LessonId, Question, SessionContext, UserId};
use crate::progress::ProgressTracker;
use crate::session::{Feedback, QuizError, QuizSession, Transition};

pub const DEFAULT_FEEDBACK_DELAY: Duration = Duration::from_secs(2);

/// Events the runner reports to whoever presents the quiz.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A question is now current.
    Question { index: usize, question: Question },
    Feedback(Feedback),
    Completed { score: u32, total_questions: usize },
    ProgressRecorded { lesson_id: LessonId },
    ProgressFailed { message: String },
}

pub struct QuizRunner {
    session: Arc<Mutex<QuizSession>>,
    context: SessionContext,
    tracker: ProgressTracker,
    events: mpsc::UnboundedSender<SessionEvent>,
    feedback_delay: Duration,
    shutdown: CancellationToken,
}

impl QuizRunner {
    /// Starts an attempt at `lesson` and announces the first question.
    pub fn start(
        lesson: Lesson,
        context: SessionContext,
        tracker: ProgressTracker,
        feedback_delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let session = QuizSession::new(lesson);

        let first = match session.current_question() {
            Some(question) => SessionEvent::Question {
                index: 0,
                question: question.clone(),
            },
            None => SessionEvent::Completed {
                score: 0,
                total_questions: 0,
            },
        };
        let _ = events.send(first);

        if session.is_completed() {
            tokio::spawn(record_completion(
                tracker.clone(),
                events.clone(),
                context.user_id,
                session.lesson().id,
            ));
        }

        let runner = Self {
            session: Arc::new(Mutex::new(session)),
            context,
            tracker,
            events,
            feedback_delay,
            shutdown: CancellationToken::new(),
        };
        (runner, receiver)
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// A copy of the current session, for inspection.
    pub async fn snapshot(&self) -> QuizSession {
        self.session.lock().await.clone()
    }

    pub async fn select_answer(&self, answer: Answer) -> Result<(), QuizError> {
        self.ensure_open("select an answer")?;
        self.session.lock().await.select_answer(answer)
    }

    /// Grades the selected answer, emits feedback, and schedules the move to the
    /// next question (or completion) after the feedback delay.
    pub async fn advance(&self) -> Result<Feedback, QuizError> {
        self.ensure_open("advance")?;
        let feedback = self.session.lock().await.advance()?;
        let _ = self.events.send(SessionEvent::Feedback(feedback.clone()));
        self.schedule_transition();
        Ok(feedback)
    }

    /// Cancels any pending transition. The session will not change afterwards.
    pub fn close(&self) {
        self.shutdown.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    fn ensure_open(&self, operation: &'static str) -> Result<(), QuizError> {
        if self.is_closed() {
            return Err(QuizError::InvalidTransition {
                operation,
                state: "closed",
            });
        }
        Ok(())
    }

    fn schedule_transition(&self) {
        let token = self.shutdown.clone();
        let session = self.session.clone();
        let tracker = self.tracker.clone();
        let events = self.events.clone();
        let student_id = self.context.user_id;
        let delay = self.feedback_delay;

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Pending quiz transition cancelled.");
                }
                _ = tokio::time::sleep(delay) => {
                    complete_transition(session, tracker, events, student_id).await;
                }
            }
        });
    }
}

impl Drop for QuizRunner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn complete_transition(
    session: Arc<Mutex<QuizSession>>,
    tracker: ProgressTracker,
    events: mpsc::UnboundedSender<SessionEvent>,
    student_id: UserId,
) {
    let (transition, lesson_id, next_question) = {
        let mut session = session.lock().await;
        let transition = match session.finish_feedback() {
            Ok(transition) => transition,
            Err(e) => {
                debug!("Ignoring scheduled transition: {}", e);
                return;
            }
        };
        (
            transition,
            session.lesson().id,
            session.current_question().cloned(),
        )
    };

    match transition {
        Transition::NextQuestion { index } => {
            if let Some(question) = next_question {
                let _ = events.send(SessionEvent::Question { index, question });
            }
        }
        Transition::Completed {
            score,
            total_questions,
        } => {
            info!(
                "Student {} finished lesson {} with {}/{}.",
                student_id, lesson_id, score, total_questions
            );
            let _ = events.send(SessionEvent::Completed {
                score,
                total_questions,
            });
            record_completion(tracker, events, student_id, lesson_id).await;
        }
    }
}

/// Writes the completion and reports the outcome. Failures are not retried.
async fn record_completion(
    tracker: ProgressTracker,
    events: mpsc::UnboundedSender<SessionEvent>,
    student_id: UserId,
    lesson_id: LessonId,
) {
    let outcome = match tracker.mark_completed(student_id, lesson_id).await {
        Ok(()) => SessionEvent::ProgressRecorded { lesson_id },
        Err(e) => {
            error!("Failed to update progress for student {}: {:?}", student_id, e);
            SessionEvent::ProgressFailed {
                message: "Failed to update progress".to_string(),
            }
        }
    };
    let _ = events.send(outcome);
}
