//! crates/lesson_quiz_core/src/enrollment.rs
//!
//! First sign-in role assignment and the per-user dashboard.

use tracing::info;

use crate::domain::{LessonSummary, ProgressRecord, Role, SessionContext, UserId};
use crate::ports::{LessonRepository, PortResult, ProgressRepository, UserRepository};
use crate::progress::percent_complete;

/// What a user asks for on first sign-in.
#[derive(Debug, Clone, Default)]
pub struct EnrollmentRequest {
    pub wants_teacher: bool,
    pub teacher_password: Option<String>,
}

/// Returns the user's role, assigning one on first sign-in.
///
/// A new user becomes a teacher only when they ask for it and supply the
/// configured teacher password. With no configured password nobody does.
/// New students get an empty progress record.
pub async fn enroll(
    users: &dyn UserRepository,
    progress: &dyn ProgressRepository,
    user_id: UserId,
    request: &EnrollmentRequest,
    configured_teacher_password: Option<&str>,
) -> PortResult<Role> {
    if let Some(role) = users.get_role(user_id).await? {
        return Ok(role);
    }

    let password_matches = match (configured_teacher_password, request.teacher_password.as_deref())
    {
        (Some(expected), Some(given)) => expected == given,
        _ => false,
    };
    let role = if request.wants_teacher && password_matches {
        Role::Teacher
    } else {
        Role::Student
    };

    users.set_role(user_id, role).await?;
    if role == Role::Student {
        progress.put_progress(ProgressRecord::empty(user_id)).await?;
    }
    info!("Enrolled user {} as {}.", user_id, role);
    Ok(role)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub role: Role,
    pub lessons: Vec<LessonSummary>,
    /// Completion percentage, students only.
    pub progress_percent: Option<f64>,
}

pub async fn dashboard(
    lessons: &dyn LessonRepository,
    progress: &dyn ProgressRepository,
    context: &SessionContext,
) -> PortResult<Dashboard> {
    let lessons: Vec<LessonSummary> = lessons
        .list_lessons()
        .await?
        .iter()
        .map(LessonSummary::from)
        .collect();

    let progress_percent = match context.role {
        Role::Teacher => None,
        Role::Student => {
            let record = progress
                .get_progress(context.user_id)
                .await?
                .unwrap_or_else(|| ProgressRecord::empty(context.user_id));
            Some(percent_complete(&record, lessons.len()))
        }
    };

    Ok(Dashboard {
        role: context.role,
        lessons,
        progress_percent,
    })
}
