use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use dashshare_core::error::CoreError;
use dashshare_core::types::DbId;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::Query;
use crate::middleware::auth::authenticate;
use crate::state::AppState;
use crate::ws::events::{ClientEvent, ServerEvent};

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: Option<String>,
}

/// GET /api/v1/ws?token=<jwt>
///
/// Authenticates before upgrading; a bad or missing token is a plain 401.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let token = params.token.ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized("Missing token query parameter".into()))
    })?;
    let user = authenticate(&state, &token).await?;

    Ok(ws
        .on_upgrade(move |socket| handle_socket(socket, state, user.id))
        .into_response())
}

/// Drive one upgraded connection.
///
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Answers client frames on the current task.
///   4. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState, user_id: DbId) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let mut rx = state.ws_manager.add(conn_id.clone(), user_id).await;
    let user_connections = state.ws_manager.user_connection_count(user_id).await;
    tracing::info!(conn_id = %conn_id, user_id, user_connections, "WebSocket connected");

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => {
                let reply = respond(&state, user_id, text.as_str()).await;
                if !state
                    .ws_manager
                    .send_to_connection(&conn_id, Message::Text(reply.into()))
                    .await
                {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    state.ws_manager.remove(&conn_id).await;
    send_task.abort();
    let user_connections = state.ws_manager.user_connection_count(user_id).await;
    tracing::info!(conn_id = %conn_id, user_id, user_connections, "WebSocket disconnected");
}

/// Answer one client frame. Failures become an `error` frame; the
/// connection stays open.
async fn respond(state: &AppState, user_id: DbId, text: &str) -> String {
    let outcome = match serde_json::from_str::<ClientEvent>(text) {
        Ok(ClientEvent::MarkRead { notification_id }) => state
            .notifications
            .mark_as_read(notification_id, user_id)
            .await
            .map(|_| ServerEvent::NotificationRead { notification_id }),
        Ok(ClientEvent::GetUnreadCount) => state
            .notifications
            .get_unread_count(user_id)
            .await
            .map(|count| ServerEvent::UnreadCount { count }),
        Err(e) => Err(AppError::BadRequest(format!("Unrecognised message: {e}"))),
    };

    let event = outcome.unwrap_or_else(|e| {
        tracing::debug!(user_id, error = %e, "WebSocket request failed");
        ServerEvent::Error {
            message: e.client_message(),
        }
    });

    event.to_json().unwrap_or_else(|e| {
        tracing::warn!(user_id, error = %e, "Failed to encode WebSocket reply");
        r#"{"type":"error","data":{"message":"Internal error"}}"#.to_string()
    })
}
