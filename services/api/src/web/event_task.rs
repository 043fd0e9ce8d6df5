//! services/api/src/web/event_task.rs
//!
//! The asynchronous "worker" that forwards quiz session events to the client.

use crate::web::protocol::ServerMessage;
use axum::extract::ws::{Message, WebSocket};
use futures::{stream::SplitSink, SinkExt};
use lesson_quiz_core::{
    ports::{PortError, PortResult},
    SessionEvent,
};
use std::sync::Arc;
use tokio::sync::{mpsc::UnboundedReceiver, Mutex};
use tracing::{error, info};

pub type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// Serializes `message` and sends it as a text frame.
pub async fn send_server_message(ws_sender: &WsSender, message: &ServerMessage) -> PortResult<()> {
    let json =
        serde_json::to_string(message).map_err(|e| PortError::Unexpected(e.to_string()))?;
    ws_sender
        .lock()
        .await
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))
}

/// Runs until the session's event channel closes or the client goes away.
pub async fn forward_events(mut events: UnboundedReceiver<SessionEvent>, ws_sender: WsSender) {
    info!("Event forwarding started.");
    while let Some(event) = events.recv().await {
        let message = ServerMessage::from(event);
        if let Err(e) = send_server_message(&ws_sender, &message).await {
            error!("Failed to send session event to client: {:?}", e);
            break;
        }
    }
    info!("Event forwarding finished.");
}
