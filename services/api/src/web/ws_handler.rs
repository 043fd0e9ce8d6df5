//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a quiz WebSocket connection.
//! One connection is one attempt: the session lives exactly as long as the socket.

use crate::web::{
    event_task::{forward_events, send_server_message, WsSender},
    protocol::{ClientMessage, ServerMessage},
    state::{AppState, SessionState},
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    Extension,
};
use futures::stream::{SplitStream, StreamExt};
use lesson_quiz_core::{ports::PortError, Lesson, QuizError, SessionContext};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
    Extension(context): Extension<SessionContext>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state, context))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>, context: SessionContext) {
    info!("New quiz connection established for user: {}", context.user_id);

    // The sender is wrapped in an Arc<Mutex<>> so the event task can share it.
    let (sender, mut receiver) = socket.split();
    let ws_sender: WsSender = Arc::new(Mutex::new(sender));

    // --- 1. Initialization Phase ---
    let Some(lesson) = init_lesson(&mut receiver, &app_state, &ws_sender).await else {
        return;
    };

    let initialized = ServerMessage::SessionInitialized {
        lesson_id: lesson.id,
        title: lesson.title.clone(),
        content: lesson.content.clone(),
        total_questions: lesson.questions.len(),
    };
    // Sent before the runner starts so it precedes the first question.
    if send_server_message(&ws_sender, &initialized).await.is_err() {
        error!("Failed to send session initialized message.");
        return;
    }

    let (mut session, events) = SessionState::new(&app_state, context, lesson);
    let event_task = tokio::spawn(forward_events(events, ws_sender.clone()));

    // --- 2. Main Message Loop ---
    loop {
        match receiver.next().await {
            Some(Ok(Message::Text(text))) => {
                handle_text_message(text.as_str(), &app_state, &mut session, &ws_sender).await;
            }
            Some(Ok(Message::Close(_))) => {
                info!("Client sent close message.");
                break;
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
            None => {
                info!("Client disconnected.");
                break;
            }
        }
    }

    // --- 3. Cleanup ---
    // Abandoning the attempt discards it. Nothing partial is saved.
    session.runner.close();
    info!(
        "Quiz connection for lesson {} closed by user {}.",
        session.lesson_id, session.context.user_id
    );
    drop(session);
    event_task.abort();
}

/// Waits for the `init` message and loads the requested lesson.
/// Any failure is reported to the client and ends the connection.
async fn init_lesson(
    receiver: &mut SplitStream<WebSocket>,
    app_state: &Arc<AppState>,
    ws_sender: &WsSender,
) -> Option<Lesson> {
    let init_json = match receiver.next().await {
        Some(Ok(Message::Text(text))) => text,
        _ => {
            error!("Client disconnected before sending Init message.");
            return None;
        }
    };

    let lesson_id = match serde_json::from_str::<ClientMessage>(init_json.as_str()) {
        Ok(ClientMessage::Init { lesson_id }) => lesson_id,
        _ => {
            error!("First message was not a valid Init message.");
            send_error(ws_sender, "Expected an init message.").await;
            return None;
        }
    };

    info!("Initializing quiz for lesson: {}", lesson_id);
    match app_state.lessons.get_lesson(lesson_id).await {
        Ok(lesson) => Some(lesson),
        Err(PortError::NotFound(_)) => {
            send_error(ws_sender, "Lesson not found").await;
            None
        }
        Err(e) => {
            error!("Error fetching lesson: {:?}", e);
            send_error(ws_sender, "Error fetching lesson").await;
            None
        }
    }
}

/// Reports `message` to the client. The connection is closing, so a failed send is only logged.
async fn send_error(ws_sender: &WsSender, message: &str) {
    let error = ServerMessage::Error {
        message: message.to_string(),
    };
    if let Err(e) = send_server_message(ws_sender, &error).await {
        warn!("Failed to send error message to client: {:?}", e);
    }
}

/// Helper function to handle the logic for different `ClientMessage` variants.
async fn handle_text_message(
    text: &str,
    app_state: &Arc<AppState>,
    session: &mut SessionState,
    ws_sender: &WsSender,
) {
    let client_msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            return;
        }
    };

    match client_msg {
        ClientMessage::SelectAnswer { answer } => {
            if let Err(e) = session.runner.select_answer(answer.into()).await {
                log_rejected(&e);
            }
        }
        ClientMessage::Advance => {
            // Feedback and the next question reach the client through the event task.
            if let Err(e) = session.runner.advance().await {
                log_rejected(&e);
            }
        }
        ClientMessage::Chat { message } => {
            if let Some(content) = session
                .conversation
                .ask(app_state.chat.as_ref(), &message)
                .await
            {
                let reply = ServerMessage::ChatReply { content };
                if send_server_message(ws_sender, &reply).await.is_err() {
                    error!("Failed to send chat reply.");
                }
            }
        }
        ClientMessage::Init { .. } => {
            warn!("Received subsequent Init message, which is ignored.");
        }
    }
}

fn log_rejected(error: &QuizError) {
    debug!("Ignoring quiz call: {}", error);
}
