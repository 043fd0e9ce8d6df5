//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::{create_lesson_status, port_status};
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use lesson_quiz_core::{
    create_lesson, dashboard, enroll, EnrollmentRequest, LessonDraft, Question, SessionContext,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        enroll_handler,
        dashboard_handler,
        get_lesson_handler,
        create_lesson_handler,
    ),
    components(
        schemas(
            EnrollRequest,
            EnrollResponse,
            DashboardResponse,
            LessonSummaryResponse,
            LessonResponse,
            CreateLessonRequest,
            QuestionPayload,
            CreateLessonResponse
        )
    ),
    tags(
        (name = "Lesson Quiz API", description = "API endpoints for lessons, quizzes and student progress.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema, Default)]
pub struct EnrollRequest {
    /// Ask to be enrolled as a teacher.
    #[serde(default)]
    pub teacher: bool,
    pub teacher_password: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EnrollResponse {
    user_id: Uuid,
    role: String,
}

#[derive(Serialize, ToSchema)]
pub struct LessonSummaryResponse {
    id: Uuid,
    title: String,
    order: i64,
}

#[derive(Serialize, ToSchema)]
pub struct DashboardResponse {
    role: String,
    lessons: Vec<LessonSummaryResponse>,
    /// Present for students only.
    progress_percent: Option<f64>,
}

#[derive(Serialize, ToSchema)]
pub struct LessonResponse {
    id: Uuid,
    title: String,
    content: String,
    order: i64,
    question_count: usize,
}

/// A question as authored by a teacher.
#[derive(Deserialize, ToSchema, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionPayload {
    MultipleChoice {
        text: String,
        options: Vec<String>,
        correct_answer: usize,
    },
    ShortAnswer {
        text: String,
        correct_answer: String,
        keyword: Option<String>,
    },
}

impl From<QuestionPayload> for Question {
    fn from(payload: QuestionPayload) -> Self {
        match payload {
            QuestionPayload::MultipleChoice {
                text,
                options,
                correct_answer,
            } => Question::MultipleChoice {
                text,
                options,
                correct_answer,
            },
            QuestionPayload::ShortAnswer {
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
}

#[derive(Deserialize, ToSchema)]
pub struct CreateLessonRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub questions: Vec<QuestionPayload>,
}

impl CreateLessonRequest {
    fn into_draft(self) -> LessonDraft {
        self.questions.into_iter().fold(
            LessonDraft::new()
                .with_title(self.title)
                .with_content(self.content),
            |draft, question| draft.with_question(question.into()),
        )
    }
}

#[derive(Serialize, ToSchema)]
pub struct CreateLessonResponse {
    lesson_id: Uuid,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Enroll the caller on first sign-in and return their role.
#[utoipa::path(
    post,
    path = "/enroll",
    request_body = EnrollRequest,
    responses(
        (status = 200, description = "Role assigned or already present", body = EnrollResponse),
        (status = 401, description = "Missing identity"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn enroll_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<EnrollRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let request = EnrollmentRequest {
        wants_teacher: req.teacher,
        teacher_password: req.teacher_password,
    };

    let role = enroll(
        app_state.users.as_ref(),
        app_state.progress.as_ref(),
        user_id,
        &request,
        app_state.config.teacher_password.as_deref(),
    )
    .await
    .map_err(|e| {
        error!("Failed to enroll user {}: {:?}", user_id, e);
        (port_status(&e), "Failed to enroll".to_string())
    })?;

    Ok(Json(EnrollResponse {
        user_id,
        role: role.to_string(),
    }))
}

/// The caller's lesson list and, for students, their completion percentage.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 401, description = "Missing identity"),
        (status = 403, description = "Not enrolled"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn dashboard_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(context): Extension<SessionContext>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let view = dashboard(
        app_state.lessons.as_ref(),
        app_state.progress.as_ref(),
        &context,
    )
    .await
    .map_err(|e| {
        error!("Failed to load dashboard: {:?}", e);
        (port_status(&e), "Failed to load dashboard".to_string())
    })?;

    Ok(Json(DashboardResponse {
        role: view.role.to_string(),
        lessons: view
            .lessons
            .into_iter()
            .map(|l| LessonSummaryResponse {
                id: l.id,
                title: l.title,
                order: l.order,
            })
            .collect(),
        progress_percent: view.progress_percent,
    }))
}

/// A lesson's text. Questions are served one at a time over the quiz WebSocket.
#[utoipa::path(
    get,
    path = "/lessons/{id}",
    responses(
        (status = 200, description = "Lesson found", body = LessonResponse),
        (status = 404, description = "Lesson not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = Uuid, Path, description = "The lesson ID."),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn get_lesson_handler(
    State(app_state): State<Arc<AppState>>,
    Path(lesson_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let lesson = app_state.lessons.get_lesson(lesson_id).await.map_err(|e| {
        let status = port_status(&e);
        if status == StatusCode::NOT_FOUND {
            (status, "Lesson not found".to_string())
        } else {
            error!("Failed to fetch lesson {}: {:?}", lesson_id, e);
            (status, "Error fetching lesson".to_string())
        }
    })?;

    Ok(Json(LessonResponse {
        id: lesson.id,
        title: lesson.title,
        content: lesson.content,
        order: lesson.order,
        question_count: lesson.questions.len(),
    }))
}

/// Create a lesson at the end of the lesson order. Teachers only.
#[utoipa::path(
    post,
    path = "/lessons",
    request_body = CreateLessonRequest,
    responses(
        (status = 201, description = "Lesson created", body = CreateLessonResponse),
        (status = 400, description = "Invalid lesson"),
        (status = 403, description = "Caller is not a teacher"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn create_lesson_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(context): Extension<SessionContext>,
    Json(req): Json<CreateLessonRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    match create_lesson(app_state.lessons.as_ref(), &context, req.into_draft()).await {
        Ok(lesson_id) => Ok((StatusCode::CREATED, Json(CreateLessonResponse { lesson_id }))),
        Err(e) => {
            let status = create_lesson_status(&e);
            if status == StatusCode::INTERNAL_SERVER_ERROR {
                error!("Error creating lesson: {:?}", e);
            }
            Err((status, e.to_string()))
        }
    }
}
