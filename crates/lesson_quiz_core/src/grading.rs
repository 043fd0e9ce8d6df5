//! crates/lesson_quiz_core/src/grading.rs
//!
//! The grading engine: a pure verdict for a question and a candidate answer.
//!
//! Short answers are compared case-insensitively. When the question carries a
//! non-empty keyword, any answer that contains the keyword is also accepted.
//! That fallback is lenient on purpose: "not paris at all" passes for keyword
//! "paris". It is a known precision/recall tradeoff for open-ended answers.

use crate::domain::{Answer, Question};

/// Returns whether `answer` is correct for `question`.
///
/// An answer of the wrong kind (a text answer to a multiple-choice question or
/// the reverse) and an out-of-range choice index are simply wrong.
pub fn grade(question: &Question, answer: &Answer) -> bool {
    match (question, answer) {
        (Question::MultipleChoice { correct_answer, .. }, Answer::Choice(index)) => {
            index == correct_answer
        }
        (
            Question::ShortAnswer {
                correct_answer,
                keyword,
                ..
            },
            Answer::Text(text),
        ) => grade_short_answer(correct_answer, keyword.as_deref(), text),
        (Question::MultipleChoice { .. }, Answer::Text(_))
        | (Question::ShortAnswer { .. }, Answer::Choice(_)) => false,
    }
}

fn grade_short_answer(correct_answer: &str, keyword: Option<&str>, candidate: &str) -> bool {
    let candidate = normalize(candidate);
    if candidate == normalize(correct_answer) {
        return true;
    }

    match keyword {
        Some(keyword) if !keyword.is_empty() => candidate.contains(&normalize(keyword)),
        _ => false,
    }
}

fn normalize(text: &str) -> String {
    text.to_lowercase()
}
