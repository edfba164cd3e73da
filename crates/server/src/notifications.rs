//! Notifications API endpoints

use api_types::notification::{NotificationView, NotificationsResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<NotificationsResponse>, ServerError> {
    let user_id = user.member_id()?;
    let notifications = state.engine.list_notifications(user_id).await?;
    let unread = state.engine.unread_notifications(user_id).await?;

    Ok(Json(NotificationsResponse {
        notifications: notifications
            .into_iter()
            .map(|n| NotificationView {
                id: n.id,
                message: n.message,
                read: n.read,
                created_at: n.created_at,
            })
            .collect(),
        unread,
    }))
}

pub async fn mark_read(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .mark_notification_read(id, user.member_id()?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
