//! In-memory repository fakes shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use lesson_quiz_core::{
    Lesson, LessonId, LessonRepository, NewLesson, PortError, PortResult, ProgressRecord,
    ProgressRepository, Question, Role, UserId, UserRepository,
};
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryLessons {
    lessons: Mutex<Vec<Lesson>>,
}

impl InMemoryLessons {
    pub fn insert(&self, lesson: Lesson) {
        self.lessons.lock().unwrap().push(lesson);
    }
}

#[async_trait]
impl LessonRepository for InMemoryLessons {
    async fn get_lesson(&self, lesson_id: LessonId) -> PortResult<Lesson> {
        self.lessons
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == lesson_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Lesson {} not found", lesson_id)))
    }

    async fn list_lessons(&self) -> PortResult<Vec<Lesson>> {
        let mut lessons = self.lessons.lock().unwrap().clone();
        lessons.sort_by_key(|l| l.order);
        Ok(lessons)
    }

    async fn max_order(&self) -> PortResult<Option<i64>> {
        Ok(self.lessons.lock().unwrap().iter().map(|l| l.order).max())
    }

    async fn create_lesson(&self, lesson: NewLesson, order: i64) -> PortResult<LessonId> {
        let id = Uuid::new_v4();
        self.insert(Lesson {
            id,
            title: lesson.title,
            content: lesson.content,
            questions: lesson.questions,
            order,
            created_at: Utc::now(),
        });
        Ok(id)
    }
}

#[derive(Default)]
pub struct InMemoryProgress {
    records: Mutex<HashMap<UserId, ProgressRecord>>,
    pub puts: AtomicU32,
    pub adds: AtomicU32,
    pub fail_writes: bool,
}

impl InMemoryProgress {
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn writes(&self) -> u32 {
        self.puts.load(Ordering::SeqCst) + self.adds.load(Ordering::SeqCst)
    }

    pub fn record(&self, student_id: UserId) -> Option<ProgressRecord> {
        self.records.lock().unwrap().get(&student_id).cloned()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgress {
    async fn get_progress(&self, student_id: UserId) -> PortResult<Option<ProgressRecord>> {
        Ok(self.record(student_id))
    }

    async fn put_progress(&self, record: ProgressRecord) -> PortResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(PortError::Unexpected("backend unavailable".into()));
        }
        self.records
            .lock()
            .unwrap()
            .insert(record.student_id, record);
        Ok(())
    }

    async fn add_completed_lesson(
        &self,
        student_id: UserId,
        lesson_id: LessonId,
    ) -> PortResult<()> {
        self.adds.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(PortError::Unexpected("backend unavailable".into()));
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(&student_id)
            .ok_or_else(|| PortError::NotFound(format!("Progress for {} not found", student_id)))?;
        record.completed_lessons.insert(lesson_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryUsers {
    roles: Mutex<HashMap<UserId, Role>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn get_role(&self, user_id: UserId) -> PortResult<Option<Role>> {
        Ok(self.roles.lock().unwrap().get(&user_id).copied())
    }

    async fn set_role(&self, user_id: UserId, role: Role) -> PortResult<()> {
        self.roles.lock().unwrap().insert(user_id, role);
        Ok(())
    }
}

pub fn multiple_choice(text: &str, correct_answer: usize) -> Question {
    Question::MultipleChoice {
        text: text.into(),
        options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
        correct_answer,
    }
}

pub fn lesson(order: i64, questions: Vec<Question>) -> Lesson {
    Lesson {
        id: Uuid::new_v4(),
        title: format!("Lesson {}", order),
        content: "Some content".into(),
        questions,
        order,
        created_at: Utc::now(),
    }
}
