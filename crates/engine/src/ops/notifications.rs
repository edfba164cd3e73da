use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Notification, ResultEngine, notifications};

use super::{Engine, with_tx};

impl Engine {
    /// Lists a member's notifications, newest first.
    pub async fn list_notifications(&self, user_id: Uuid) -> ResultEngine<Vec<Notification>> {
        with_tx!(self, |db_tx| {
            let models: Vec<notifications::Model> = notifications::Entity::find()
                .filter(notifications::Column::UserId.eq(user_id.to_string()))
                .order_by_desc(notifications::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            models.into_iter().map(Notification::try_from).collect()
        })
    }

    /// Number of unread notifications for a member.
    pub async fn unread_notifications(&self, user_id: Uuid) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            notifications::Entity::find()
                .filter(notifications::Column::UserId.eq(user_id.to_string()))
                .filter(notifications::Column::Read.eq(false))
                .count(&db_tx)
                .await
                .map_err(Into::into)
        })
    }

    /// Marks a notification as read. Owner-only; idempotent.
    pub async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = notifications::Entity::find_by_id(notification_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("notification".to_string()))?;
            if model.user_id != user_id.to_string() {
                return Err(EngineError::NotFound("notification".to_string()));
            }

            let update = notifications::ActiveModel {
                id: ActiveValue::Set(notification_id.to_string()),
                read: ActiveValue::Set(true),
                ..Default::default()
            };
            update.update(&db_tx).await?;
            Ok(())
        })
    }
}
