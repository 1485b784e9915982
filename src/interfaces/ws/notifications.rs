//! WebSocket stream of audit notifications
//!
//! Browsers cannot set headers on a WebSocket upgrade, so the session
//! token travels as `?token=`. Each client only receives the
//! notifications its role is entitled to.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::select;
use tracing::{debug, error, info, warn};

use crate::application::events::{Notification, SharedEventBus};
use crate::domain::user::CurrentUser;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::middleware::{auth_error_response, authenticate, AuthError};

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    pub token: Option<String>,
    /// Comma-separated action types, e.g. `SLOT_CREATED,SLOT_UPDATED`
    pub event_types: Option<String>,
}

impl NotificationQuery {
    fn wants(&self, notification: &Notification) -> bool {
        match &self.event_types {
            None => true,
            Some(types) => types
                .split(',')
                .map(str::trim)
                .any(|t| t.eq_ignore_ascii_case(notification.event_type())),
        }
    }
}

#[derive(Clone)]
pub struct NotificationState {
    pub event_bus: SharedEventBus,
    pub jwt_config: JwtConfig,
}

pub fn create_notification_state(
    event_bus: SharedEventBus,
    jwt_config: JwtConfig,
) -> NotificationState {
    NotificationState {
        event_bus,
        jwt_config,
    }
}

pub async fn ws_notifications_handler(
    ws: WebSocketUpgrade,
    State(state): State<NotificationState>,
    Query(query): Query<NotificationQuery>,
) -> Response {
    let viewer = match query.token.as_deref() {
        None => return auth_error_response(AuthError::MissingToken),
        Some(token) => match authenticate(token, &state.jwt_config) {
            Ok(user) => user,
            Err(e) => return auth_error_response(e),
        },
    };

    info!(user_id = %viewer.id, role = %viewer.role, "Notification client connecting");
    ws.on_upgrade(move |socket| handle_socket(socket, state, viewer, query))
        .into_response()
}

async fn handle_socket(
    socket: WebSocket,
    state: NotificationState,
    viewer: CurrentUser,
    query: NotificationQuery,
) {
    let (mut sender, mut receiver) = socket.split();
    let mut subscriber = state.event_bus.subscribe();

    let welcome = serde_json::json!({
        "type": "connected",
        "role": viewer.role,
        "event_types": query.event_types,
    });
    if let Err(e) = sender.send(Message::Text(welcome.to_string().into())).await {
        error!(error = %e, "Failed to send welcome message");
        return;
    }

    loop {
        select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!(error = %e, "Notification socket error");
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }

            notification = subscriber.recv() => {
                let Some(notification) = notification else {
                    warn!("Event bus closed");
                    break;
                };
                if !notification.is_for(&viewer) || !query.wants(&notification) {
                    continue;
                }
                match serde_json::to_string(&notification) {
                    Ok(json) => {
                        if let Err(e) = sender.send(Message::Text(json.into())).await {
                            debug!(error = %e, "Notification client went away");
                            break;
                        }
                    }
                    Err(e) => error!(error = %e, "Failed to serialize notification"),
                }
            }
        }
    }

    info!(user_id = %viewer.id, "Notification client disconnected");
}
