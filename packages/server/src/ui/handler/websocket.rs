//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::IntoResponse,
};
use futures_util::stream::StreamExt;
use serde::Deserialize;

use crate::{
    domain::{BoardId, Credentials, Identity},
    ui::state::AppState,
    usecase::{ConnectError, ConnectRequest, Connection},
};

use super::pump::{inbound_pump, outbound_pump};

/// Query parameters for WebSocket connection
#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    pub board_id: Option<String>,
    pub user_id: Option<String>,
    pub email: Option<String>,
    /// Browsers cannot set headers on a WebSocket handshake, so the token may
    /// ride in the query string.
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    let bearer_token = query.token.or_else(|| bearer_from(&headers));
    let request = ConnectRequest {
        board_id: query.board_id,
        credentials: Credentials {
            user_id: query.user_id,
            email: query.email,
            bearer_token,
        },
    };

    let (board_id, identity) = match state.connect_participant_usecase.authenticate(request).await
    {
        Ok(validated) => validated,
        Err(ConnectError::MissingParameter(name)) => {
            tracing::warn!("Rejecting connection: missing '{}'", name);
            return Err(StatusCode::BAD_REQUEST);
        }
        Err(ConnectError::Unauthorized(e)) => {
            tracing::warn!("Rejecting connection: {}", e);
            return Err(StatusCode::UNAUTHORIZED);
        }
        Err(ConnectError::Room(e)) => {
            tracing::error!("Rejecting connection: {}", e);
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
    };

    let max_size = state.config.max_message_size;
    Ok(ws
        .max_message_size(max_size)
        .max_frame_size(max_size)
        .on_failed_upgrade(|e| tracing::warn!("WebSocket upgrade failed: {}", e))
        .on_upgrade(move |socket| handle_socket(socket, state, board_id, identity)))
}

fn bearer_from(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, board_id: BoardId, identity: Identity) {
    let user_id = identity.user_id.clone();
    let Connection {
        room,
        session,
        inbox,
    } = match state
        .connect_participant_usecase
        .execute(board_id.clone(), identity)
        .await
    {
        Ok(connection) => connection,
        Err(e) => {
            tracing::warn!("User '{}' could not join board '{}': {}", user_id, board_id, e);
            return;
        }
    };
    tracing::info!(
        "User '{}' connected to board '{}' as session {}",
        user_id,
        board_id,
        session.id()
    );

    let config = &state.config;
    let (sender, receiver) = socket.split();

    let mut outbound = tokio::spawn(outbound_pump(
        sender,
        inbox,
        config.ping_interval,
        config.write_wait,
    ));
    let mut inbound = tokio::spawn(inbound_pump(
        receiver,
        room.clone(),
        session.clone(),
        state.send_message_usecase.clone(),
        config.pong_wait,
    ));

    // Whichever pump stops first ends the session.
    tokio::select! {
        exit = &mut inbound => {
            tracing::debug!("Inbound pump for session {} stopped: {:?}", session.id(), exit);
            state.disconnect_participant_usecase.execute(&room, session.id());
            // Let the outbound pump flush and send its close frame.
            if tokio::time::timeout(config.write_wait, &mut outbound).await.is_err() {
                outbound.abort();
            }
        }
        exit = &mut outbound => {
            tracing::debug!("Outbound pump for session {} stopped: {:?}", session.id(), exit);
            inbound.abort();
            state.disconnect_participant_usecase.execute(&room, session.id());
        }
    }

    tracing::info!(
        "User '{}' disconnected from board '{}' (session {})",
        user_id,
        board_id,
        session.id()
    );
}
