//! crates/lesson_quiz_core/src/authoring.rs
//!
//! Lesson drafts and lesson creation.
//!
//! A draft is an immutable value: each edit returns a new draft. Creation asks
//! the repository for the current maximum order and assigns the next one. Two
//! lessons created at the same time can read the same maximum and end up with
//! the same order; nothing here serializes creations.

use tracing::info;

use crate::domain::{LessonId, Question, Role, SessionContext};
use crate::ports::{LessonRepository, NewLesson, PortError, PortResult};

/// Number of options a freshly added multiple-choice question starts with.
pub const DEFAULT_OPTION_COUNT: usize = 4;

/// Display order for a new lesson given the current maximum.
pub fn next_order(existing_max_order: Option<i64>) -> i64 {
    existing_max_order.map_or(1, |max| max + 1)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("lesson title is empty")]
    EmptyTitle,
    #[error("lesson content is empty")]
    EmptyContent,
    #[error("lesson has no questions")]
    NoQuestions,
    #[error("question {0} has no text")]
    EmptyQuestionText(usize),
    #[error("question {question} option {option} is empty")]
    EmptyOption { question: usize, option: usize },
    #[error("question {0} needs at least two options")]
    TooFewOptions(usize),
    #[error("question {question} marks option {correct_answer} correct but has {options} options")]
    CorrectAnswerOutOfRange {
        question: usize,
        correct_answer: usize,
        options: usize,
    },
    #[error("question {0} has no correct answer")]
    EmptyCorrectAnswer(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonDraft {
    pub title: String,
    pub content: String,
    pub questions: Vec<Question>,
}

impl LessonDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }

    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self.clone()
        }
    }

    /// Appends a blank multiple-choice question with four empty options.
    pub fn with_question_added(&self) -> Self {
        self.with_question(Question::MultipleChoice {
            text: String::new(),
            options: vec![String::new(); DEFAULT_OPTION_COUNT],
            correct_answer: 0,
        })
    }

    pub fn with_question(&self, question: Question) -> Self {
        let mut questions = self.questions.clone();
        questions.push(question);
        Self {
            questions,
            ..self.clone()
        }
    }

    pub fn with_question_removed(&self, index: usize) -> Self {
        let questions = self
            .questions
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, q)| q.clone())
            .collect();
        Self {
            questions,
            ..self.clone()
        }
    }

    pub fn with_question_text(&self, index: usize, new_text: impl Into<String>) -> Self {
        let new_text = new_text.into();
        self.map_question(index, |question| match question {
            Question::MultipleChoice {
                options,
                correct_answer,
                ..
            } => Question::MultipleChoice {
                text: new_text,
                options: options.clone(),
                correct_answer: *correct_answer,
            },
            Question::ShortAnswer {
                correct_answer,
                keyword,
                ..
            } => Question::ShortAnswer {
                text: new_text,
                correct_answer: correct_answer.clone(),
                keyword: keyword.clone(),
            },
        })
    }

    /// Replaces one option of a multiple-choice question. Other shapes are left as they are.
    pub fn with_option(&self, index: usize, option: usize, value: impl Into<String>) -> Self {
        let value = value.into();
        self.map_question(index, |question| match question {
            Question::MultipleChoice {
                text,
                options,
                correct_answer,
            } if option < options.len() => {
                let mut options = options.clone();
                options[option] = value;
                Question::MultipleChoice {
                    text: text.clone(),
                    options,
                    correct_answer: *correct_answer,
                }
            }
            other => other.clone(),
        })
    }

    pub fn with_correct_choice(&self, index: usize, choice: usize) -> Self {
        self.map_question(index, |question| match question {
            Question::MultipleChoice { text, options, .. } => Question::MultipleChoice {
                text: text.clone(),
                options: options.clone(),
                correct_answer: choice,
            },
            other => other.clone(),
        })
    }

    /// Turns the question at `index` into a short-answer question, keeping its text.
    pub fn with_short_answer(
        &self,
        index: usize,
        correct_answer: impl Into<String>,
        keyword: Option<String>,
    ) -> Self {
        let correct_answer = correct_answer.into();
        self.map_question(index, |question| Question::ShortAnswer {
            text: question.text().to_string(),
            correct_answer,
            keyword,
        })
    }

    fn map_question(&self, index: usize, f: impl FnOnce(&Question) -> Question) -> Self {
        let mut questions = self.questions.clone();
        if let Some(slot) = questions.get_mut(index) {
            *slot = f(slot);
        }
        Self {
            questions,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), DraftError> {
        if self.title.trim().is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        if self.content.trim().is_empty() {
            return Err(DraftError::EmptyContent);
        }
        if self.questions.is_empty() {
            return Err(DraftError::NoQuestions);
        }
        for (i, question) in self.questions.iter().enumerate() {
            if question.text().trim().is_empty() {
                return Err(DraftError::EmptyQuestionText(i));
            }
            match question {
                Question::MultipleChoice {
                    options,
                    correct_answer,
                    ..
                } => {
                    if options.len() < 2 {
                        return Err(DraftError::TooFewOptions(i));
                    }
                    if let Some(option) = options.iter().position(|o| o.trim().is_empty()) {
                        return Err(DraftError::EmptyOption {
                            question: i,
                            option,
                        });
                    }
                    if *correct_answer >= options.len() {
                        return Err(DraftError::CorrectAnswerOutOfRange {
                            question: i,
                            correct_answer: *correct_answer,
                            options: options.len(),
                        });
                    }
                }
                Question::ShortAnswer { correct_answer, .. } => {
                    if correct_answer.trim().is_empty() {
                        return Err(DraftError::EmptyCorrectAnswer(i));
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CreateLessonError {
    #[error("invalid lesson: {0}")]
    Invalid(#[from] DraftError),
    #[error(transparent)]
    Port(#[from] PortError),
}

/// Validates `draft` and stores it with the next display order. Teachers only.
pub async fn create_lesson(
    repo: &dyn LessonRepository,
    context: &SessionContext,
    draft: LessonDraft,
) -> Result<LessonId, CreateLessonError> {
    if context.role != Role::Teacher {
        return Err(PortError::Unauthorized.into());
    }
    draft.validate()?;

    let order = next_order(repo.max_order().await?);
    let lesson = NewLesson {
        title: draft.title,
        content: draft.content,
        questions: draft.questions,
    };
    let id = repo.create_lesson(lesson, order).await?;
    info!("Teacher {} created lesson {} at order {}.", context.user_id, id, order);
    Ok(id)
}
