//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::http::{MemberDetailDto, RoomDetailDto, RoomSummaryDto},
    ui::state::AppState,
    usecase::GetRoomDetailError,
};
use boardchat_shared::time::timestamp_to_rfc3339;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of live rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    let room_summaries: Vec<RoomSummaryDto> = rooms
        .into_iter()
        .map(|room| RoomSummaryDto {
            board_id: room.board_id.to_string(),
            member_count: room.members.len(),
            members: room
                .members
                .iter()
                .map(|m| m.identity.user_id.to_string())
                .collect(),
        })
        .collect();

    Json(room_summaries)
}

/// Get room detail by board ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(board_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    match state.get_room_detail_usecase.execute(board_id).await {
        Ok(room) => {
            // Domain Model から DTO への変換
            let room_detail = RoomDetailDto {
                board_id: room.board_id.to_string(),
                members: room
                    .members
                    .into_iter()
                    .map(|m| MemberDetailDto {
                        session_id: m.session_id.to_string(),
                        user_id: m.identity.user_id.to_string(),
                        email: m.identity.email,
                        joined_at: timestamp_to_rfc3339(m.joined_at.value()).unwrap_or_default(),
                    })
                    .collect(),
            };
            Ok(Json(room_detail))
        }
        Err(GetRoomDetailError::RoomNotFound(board_id)) => {
            tracing::debug!("No active room for board '{}'", board_id);
            Err(StatusCode::NOT_FOUND)
        }
    }
}
