//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the repository ports from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lesson_quiz_core::domain::{Lesson, LessonId, ProgressRecord, Question, Role, UserId};
use lesson_quiz_core::ports::{
    LessonRepository, NewLesson, PortError, PortResult, ProgressRepository, UserRepository,
};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the lesson, progress and user repositories.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

/// The JSONB shape of one question inside `lessons.questions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum QuestionRecord {
    MultipleChoice {
        text: String,
        options: Vec<String>,
        correct_answer: usize,
    },
    ShortAnswer {
        text: String,
        correct_answer: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        keyword: Option<String>,
    },
}

impl QuestionRecord {
    fn to_domain(self) -> Question {
        match self {
            QuestionRecord::MultipleChoice {
                text,
                options,
                correct_answer,
            } => Question::MultipleChoice {
                text,
                options,
                correct_answer,
            },
            QuestionRecord::ShortAnswer {
                text,
                correct_answer,
                keyword,
            } => Question::ShortAnswer {
                text,
                correct_answer,
                keyword,
            },
        }
    }

    fn from_domain(question: Question) -> Self {
        match question {
            Question::MultipleChoice {
                text,
                options,
                correct_answer,
            } => QuestionRecord::MultipleChoice {
                text,
                options,
                correct_answer,
            },
            Question::ShortAnswer {
                text,
                correct_answer,
                keyword,
            } => QuestionRecord::ShortAnswer {
                text,
                correct_answer,
                keyword,
            },
        }
    }
}

#[derive(FromRow)]
struct LessonRecord {
    id: Uuid,
    title: String,
    content: String,
    questions: Json<Vec<QuestionRecord>>,
    order: i64,
    created_at: DateTime<Utc>,
}
impl LessonRecord {
    fn to_domain(self) -> Lesson {
        Lesson {
            id: self.id,
            title: self.title,
            content: self.content,
            questions: self
                .questions
                .0
                .into_iter()
                .map(QuestionRecord::to_domain)
                .collect(),
            order: self.order,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct ProgressRow {
    student_id: Uuid,
    completed_lessons: Vec<Uuid>,
}
impl ProgressRow {
    fn to_domain(self) -> ProgressRecord {
        ProgressRecord {
            student_id: self.student_id,
            completed_lessons: self.completed_lessons.into_iter().collect(),
        }
    }
}

//=========================================================================================
// `LessonRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl LessonRepository for DbAdapter {
    async fn get_lesson(&self, lesson_id: LessonId) -> PortResult<Lesson> {
        let record = sqlx::query_as::<_, LessonRecord>(
            r#"SELECT id, title, content, questions, "order", created_at FROM lessons WHERE id = $1"#,
        )
        .bind(lesson_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Lesson {} not found", lesson_id))
            }
            _ => PortError::Unexpected(e.to_string()),
        })?;
        Ok(record.to_domain())
    }

    async fn list_lessons(&self) -> PortResult<Vec<Lesson>> {
        let records = sqlx::query_as::<_, LessonRecord>(
            r#"SELECT id, title, content, questions, "order", created_at FROM lessons ORDER BY "order" ASC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let lessons = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(lessons)
    }

    async fn max_order(&self) -> PortResult<Option<i64>> {
        sqlx::query_scalar::<_, Option<i64>>(r#"SELECT MAX("order") FROM lessons"#)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }

    async fn create_lesson(&self, lesson: NewLesson, order: i64) -> PortResult<LessonId> {
        let questions: Vec<QuestionRecord> = lesson
            .questions
            .into_iter()
            .map(QuestionRecord::from_domain)
            .collect();

        sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO lessons (id, title, content, questions, "order") VALUES ($1, $2, $3, $4, $5) RETURNING id"#,
        )
        .bind(Uuid::new_v4())
        .bind(lesson.title)
        .bind(lesson.content)
        .bind(Json(questions))
        .bind(order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

//=========================================================================================
// `ProgressRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProgressRepository for DbAdapter {
    async fn get_progress(&self, student_id: UserId) -> PortResult<Option<ProgressRecord>> {
        let record = sqlx::query_as::<_, ProgressRow>(
            "SELECT student_id, completed_lessons FROM progress WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.map(ProgressRow::to_domain))
    }

    async fn put_progress(&self, record: ProgressRecord) -> PortResult<()> {
        let completed: Vec<Uuid> = record.completed_lessons.into_iter().collect();
        sqlx::query(
            "INSERT INTO progress (student_id, completed_lessons) VALUES ($1, $2)
             ON CONFLICT (student_id) DO UPDATE
             SET completed_lessons = EXCLUDED.completed_lessons, updated_at = NOW()",
        )
        .bind(record.student_id)
        .bind(completed)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn add_completed_lesson(
        &self,
        student_id: UserId,
        lesson_id: LessonId,
    ) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO progress (student_id, completed_lessons) VALUES ($1, ARRAY[$2::uuid])
             ON CONFLICT (student_id) DO UPDATE
             SET completed_lessons = CASE
                     WHEN $2::uuid = ANY(progress.completed_lessons) THEN progress.completed_lessons
                     ELSE array_append(progress.completed_lessons, $2::uuid)
                 END,
                 updated_at = NOW()",
        )
        .bind(student_id)
        .bind(lesson_id)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}

//=========================================================================================
// `UserRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl UserRepository for DbAdapter {
    async fn get_role(&self, user_id: UserId) -> PortResult<Option<Role>> {
        let role = sqlx::query_scalar::<_, String>("SELECT role FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        role.map(|r| r.parse::<Role>())
            .transpose()
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }

    async fn set_role(&self, user_id: UserId, role: Role) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO users (user_id, role) VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE SET role = EXCLUDED.role",
        )
        .bind(user_id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
