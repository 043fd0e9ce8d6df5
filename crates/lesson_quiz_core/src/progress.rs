//! crates/lesson_quiz_core/src/progress.rs
//!
//! Records finished lessons and derives the completion percentage.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use crate::domain::{LessonId, ProgressRecord, UserId};
use crate::ports::{PortResult, ProgressRepository};

/// Writes lesson completions through the progress repository.
#[derive(Clone)]
pub struct ProgressTracker {
    repo: Arc<dyn ProgressRepository>,
}

impl ProgressTracker {
    pub fn new(repo: Arc<dyn ProgressRepository>) -> Self {
        Self { repo }
    }

    /// Idempotently adds `lesson_id` to the student's completed set,
    /// creating the record if the student has none yet.
    pub async fn mark_completed(&self, student_id: UserId, lesson_id: LessonId) -> PortResult<()> {
        match self.repo.get_progress(student_id).await? {
            None => {
                info!("Creating progress record for student {}.", student_id);
                self.repo
                    .put_progress(ProgressRecord {
                        student_id,
                        completed_lessons: BTreeSet::from([lesson_id]),
                    })
                    .await
            }
            Some(_) => self.repo.add_completed_lesson(student_id, lesson_id).await,
        }
    }
}

/// `100 * completed / total`, clamped to `[0, 100]`. Zero lessons is 0%.
pub fn percent_complete(record: &ProgressRecord, total_lesson_count: usize) -> f64 {
    if total_lesson_count == 0 {
        return 0.0;
    }
    let percent = 100.0 * record.completed_lessons.len() as f64 / total_lesson_count as f64;
    percent.min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn record(completed: usize) -> ProgressRecord {
        ProgressRecord {
            student_id: Uuid::new_v4(),
            completed_lessons: (0..completed).map(|_| Uuid::new_v4()).collect(),
        }
    }

    #[test]
    fn zero_lessons_is_zero_percent() {
        assert_eq!(percent_complete(&record(0), 0), 0.0);
        assert_eq!(percent_complete(&record(3), 0), 0.0);
    }

    #[test]
    fn percentage_is_fraction_of_total() {
        assert_eq!(percent_complete(&record(1), 4), 25.0);
        assert_eq!(percent_complete(&record(4), 4), 100.0);
    }

    #[test]
    fn stale_completions_never_exceed_one_hundred() {
        assert_eq!(percent_complete(&record(5), 2), 100.0);
    }
}
