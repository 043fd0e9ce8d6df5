//! crates/lesson_quiz_core/src/session.rs
//!
//! The quiz session state machine for one student's attempt at one lesson.
//!
//! `InProgress` → (`advance`) → `ShowingFeedback` → (`finish_feedback`) →
//! `InProgress` on the next question, or `Completed` after the last one.
//! Calls made in the wrong state are rejected and leave the state untouched.

use crate::domain::{Answer, Lesson, Question};
use crate::grading::grade;

/// The verdict shown to the student after an answer is graded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub correct: bool,
    /// The literal correct answer, present only when the attempt was wrong.
    pub correct_answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizState {
    InProgress {
        current_index: usize,
        selected_answer: Option<Answer>,
        score: u32,
    },
    /// The current question is graded; waiting for the feedback interval to elapse.
    ShowingFeedback {
        current_index: usize,
        score: u32,
        feedback: Feedback,
    },
    Completed {
        score: u32,
        total_questions: usize,
    },
}

impl QuizState {
    fn name(&self) -> &'static str {
        match self {
            QuizState::InProgress { .. } => "in_progress",
            QuizState::ShowingFeedback { .. } => "showing_feedback",
            QuizState::Completed { .. } => "completed",
        }
    }
}

/// What happened once feedback was cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    NextQuestion { index: usize },
    Completed { score: u32, total_questions: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    #[error("cannot {operation} while the session is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: &'static str,
    },
    #[error("cannot advance without a selected answer")]
    NoAnswerSelected,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    lesson: Lesson,
    state: QuizState,
}

impl QuizSession {
    /// Starts at the first question. A lesson without questions is complete from the outset.
    pub fn new(lesson: Lesson) -> Self {
        let state = if lesson.questions.is_empty() {
            QuizState::Completed {
                score: 0,
                total_questions: 0,
            }
        } else {
            QuizState::InProgress {
                current_index: 0,
                selected_answer: None,
                score: 0,
            }
        };
        Self { lesson, state }
    }

    pub fn lesson(&self) -> &Lesson {
        &self.lesson
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn total_questions(&self) -> usize {
        self.lesson.questions.len()
    }

    pub fn score(&self) -> u32 {
        match &self.state {
            QuizState::InProgress { score, .. }
            | QuizState::ShowingFeedback { score, .. }
            | QuizState::Completed { score, .. } => *score,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, QuizState::Completed { .. })
    }

    pub fn current_index(&self) -> Option<usize> {
        match &self.state {
            QuizState::InProgress { current_index, .. }
            | QuizState::ShowingFeedback { current_index, .. } => Some(*current_index),
            QuizState::Completed { .. } => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_index()
            .and_then(|index| self.lesson.questions.get(index))
    }

    /// Stores `answer` as the pending answer for the current question, replacing any earlier one.
    pub fn select_answer(&mut self, answer: Answer) -> Result<(), QuizError> {
        match &mut self.state {
            QuizState::InProgress {
                selected_answer, ..
            } => {
                *selected_answer = Some(answer);
                Ok(())
            }
            other => Err(QuizError::InvalidTransition {
                operation: "select an answer",
                state: other.name(),
            }),
        }
    }

    /// Grades the pending answer and moves to `ShowingFeedback`.
    pub fn advance(&mut self) -> Result<Feedback, QuizError> {
        let (current_index, answer, score) = match &self.state {
            QuizState::InProgress {
                current_index,
                selected_answer: Some(answer),
                score,
            } if !answer.is_empty() => (*current_index, answer, *score),
            QuizState::InProgress { .. } => return Err(QuizError::NoAnswerSelected),
            other => {
                return Err(QuizError::InvalidTransition {
                    operation: "advance",
                    state: other.name(),
                })
            }
        };

        let question = &self.lesson.questions[current_index];
        let correct = grade(question, answer);
        let feedback = Feedback {
            correct,
            correct_answer: (!correct).then(|| question.correct_answer_text()),
        };

        self.state = QuizState::ShowingFeedback {
            current_index,
            score: if correct { score + 1 } else { score },
            feedback: feedback.clone(),
        };
        Ok(feedback)
    }

    /// Clears the feedback and moves to the next question, or completes after the last one.
    pub fn finish_feedback(&mut self) -> Result<Transition, QuizError> {
        let (current_index, score) = match &self.state {
            QuizState::ShowingFeedback {
                current_index,
                score,
                ..
            } => (*current_index, *score),
            other => {
                return Err(QuizError::InvalidTransition {
                    operation: "finish feedback",
                    state: other.name(),
                })
            }
        };

        let total_questions = self.total_questions();
        if current_index + 1 >= total_questions {
            self.state = QuizState::Completed {
                score,
                total_questions,
            };
            Ok(Transition::Completed {
                score,
                total_questions,
            })
        } else {
            let index = current_index + 1;
            self.state = QuizState::InProgress {
                current_index: index,
                selected_answer: None,
                score,
            };
            Ok(Transition::NextQuestion { index })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn lesson(questions: Vec<Question>) -> Lesson {
        Lesson {
            id: Uuid::new_v4(),
            title: "Geography".into(),
            content: "Capitals of Europe".into(),
            questions,
            order: 1,
            created_at: Utc::now(),
        }
    }

    fn mc(correct_answer: usize) -> Question {
        Question::MultipleChoice {
            text: "Pick".into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer,
        }
    }

    fn answer_and_continue(session: &mut QuizSession, answer: Answer) -> Feedback {
        session.select_answer(answer).unwrap();
        let feedback = session.advance().unwrap();
        session.finish_feedback().unwrap();
        feedback
    }

    #[test]
    fn starts_in_progress_at_first_question() {
        let session = QuizSession::new(lesson(vec![mc(0)]));
        assert_eq!(
            session.state(),
            &QuizState::InProgress {
                current_index: 0,
                selected_answer: None,
                score: 0
            }
        );
    }

    #[test]
    fn empty_lesson_starts_completed() {
        let session = QuizSession::new(lesson(vec![]));
        assert_eq!(
            session.state(),
            &QuizState::Completed {
                score: 0,
                total_questions: 0
            }
        );
    }

    #[test]
    fn reselecting_overwrites_pending_answer() {
        let mut session = QuizSession::new(lesson(vec![mc(1)]));
        session.select_answer(Answer::Choice(0)).unwrap();
        session.select_answer(Answer::Choice(1)).unwrap();
        assert!(session.advance().unwrap().correct);
    }

    #[test]
    fn advance_without_answer_is_rejected_and_state_unchanged() {
        let mut session = QuizSession::new(lesson(vec![mc(0)]));
        let before = session.state().clone();
        assert_eq!(session.advance(), Err(QuizError::NoAnswerSelected));
        assert_eq!(session.state(), &before);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn blank_text_answer_counts_as_unselected() {
        let q = Question::ShortAnswer {
            text: "Capital?".into(),
            correct_answer: "".into(),
            keyword: None,
        };
        let mut session = QuizSession::new(lesson(vec![q]));
        session.select_answer(Answer::Text("  ".into())).unwrap();
        assert_eq!(session.advance(), Err(QuizError::NoAnswerSelected));
    }

    #[test]
    fn wrong_answer_reveals_correct_answer() {
        let mut session = QuizSession::new(lesson(vec![mc(2)]));
        let feedback = answer_and_continue(&mut session, Answer::Choice(0));
        assert_eq!(
            feedback,
            Feedback {
                correct: false,
                correct_answer: Some("c".into())
            }
        );
    }

    #[test]
    fn calls_during_feedback_are_rejected() {
        let mut session = QuizSession::new(lesson(vec![mc(0), mc(0)]));
        session.select_answer(Answer::Choice(0)).unwrap();
        session.advance().unwrap();
        let before = session.state().clone();

        assert!(matches!(
            session.select_answer(Answer::Choice(1)),
            Err(QuizError::InvalidTransition { .. })
        ));
        assert!(matches!(
            session.advance(),
            Err(QuizError::InvalidTransition { .. })
        ));
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn n_questions_complete_after_n_advances() {
        let mut session = QuizSession::new(lesson(vec![mc(0), mc(1), mc(2)]));
        answer_and_continue(&mut session, Answer::Choice(0));
        answer_and_continue(&mut session, Answer::Choice(0));
        assert!(!session.is_completed());
        answer_and_continue(&mut session, Answer::Choice(2));
        assert_eq!(
            session.state(),
            &QuizState::Completed {
                score: 2,
                total_questions: 3
            }
        );
    }

    #[test]
    fn completed_session_rejects_everything() {
        let mut session = QuizSession::new(lesson(vec![mc(0)]));
        answer_and_continue(&mut session, Answer::Choice(0));
        assert!(session.select_answer(Answer::Choice(0)).is_err());
        assert!(session.advance().is_err());
        assert!(session.finish_feedback().is_err());
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn finish_feedback_requires_feedback_state() {
        let mut session = QuizSession::new(lesson(vec![mc(0)]));
        assert!(matches!(
            session.finish_feedback(),
            Err(QuizError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn next_question_clears_selected_answer() {
        let mut session = QuizSession::new(lesson(vec![mc(0), mc(0)]));
        session.select_answer(Answer::Choice(0)).unwrap();
        session.advance().unwrap();
        assert_eq!(
            session.finish_feedback(),
            Ok(Transition::NextQuestion { index: 1 })
        );
        assert_eq!(session.advance(), Err(QuizError::NoAnswerSelected));
    }
}
