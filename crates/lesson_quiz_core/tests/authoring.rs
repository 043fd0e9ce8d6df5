mod common;

use common::{lesson, InMemoryLessons};
use lesson_quiz_core::{
    create_lesson, CreateLessonError, DraftError, LessonDraft, LessonRepository, PortError, Role,
    SessionContext,
};
use uuid::Uuid;

fn teacher() -> SessionContext {
    SessionContext {
        user_id: Uuid::new_v4(),
        role: Role::Teacher,
    }
}

fn draft(title: &str) -> LessonDraft {
    LessonDraft::new()
        .with_title(title)
        .with_content("Body")
        .with_question_added()
        .with_question_text(0, "Which?")
        .with_option(0, 0, "w")
        .with_option(0, 1, "x")
        .with_option(0, 2, "y")
        .with_option(0, 3, "z")
        .with_correct_choice(0, 2)
}

#[tokio::test]
async fn first_lesson_gets_order_one() {
    let repo = InMemoryLessons::default();
    let id = create_lesson(&repo, &teacher(), draft("First")).await.unwrap();

    let stored = repo.get_lesson(id).await.unwrap();
    assert_eq!(stored.order, 1);
    assert_eq!(stored.title, "First");
    assert_eq!(stored.questions.len(), 1);
}

#[tokio::test]
async fn new_lesson_goes_after_the_current_maximum() {
    let repo = InMemoryLessons::default();
    repo.insert(lesson(7, vec![]));
    repo.insert(lesson(3, vec![]));

    let id = create_lesson(&repo, &teacher(), draft("Next")).await.unwrap();
    assert_eq!(repo.get_lesson(id).await.unwrap().order, 8);
}

#[tokio::test]
async fn students_cannot_create_lessons() {
    let repo = InMemoryLessons::default();
    let student = SessionContext {
        user_id: Uuid::new_v4(),
        role: Role::Student,
    };

    let err = create_lesson(&repo, &student, draft("Nope")).await.unwrap_err();
    assert!(matches!(err, CreateLessonError::Port(PortError::Unauthorized)));
    assert!(repo.list_lessons().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_draft_is_not_stored() {
    let repo = InMemoryLessons::default();
    let err = create_lesson(&repo, &teacher(), draft("")).await.unwrap_err();
    assert!(matches!(
        err,
        CreateLessonError::Invalid(DraftError::EmptyTitle)
    ));
    assert!(repo.list_lessons().await.unwrap().is_empty());
}

#[tokio::test]
async fn lesson_without_questions_is_rejected() {
    let repo = InMemoryLessons::default();
    let empty = LessonDraft::new().with_title("Reading").with_content("Body");

    let err = create_lesson(&repo, &teacher(), empty).await.unwrap_err();
    assert!(matches!(
        err,
        CreateLessonError::Invalid(DraftError::NoQuestions)
    ));
    assert!(repo.list_lessons().await.unwrap().is_empty());
}
