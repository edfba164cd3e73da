//! Notifications table.
//!
//! Rows are created as a side effect of transaction creation and are never
//! mutated afterwards except for the read flag.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub member_id: Uuid,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Notification {
    pub fn new(member_id: Uuid, message: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_id,
            message,
            read: false,
            created_at: Utc::now(),
        }
    }
}

impl From<&Notification> for ActiveModel {
    fn from(notification: &Notification) -> Self {
        Self {
            id: ActiveValue::Set(notification.id.to_string()),
            user_id: ActiveValue::Set(notification.member_id.to_string()),
            message: ActiveValue::Set(notification.message.clone()),
            read: ActiveValue::Set(notification.read),
            created_at: ActiveValue::Set(notification.created_at),
        }
    }
}

impl TryFrom<Model> for Notification {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("notification".to_string()))?,
            member_id: Uuid::parse_str(&model.user_id)
                .map_err(|_| EngineError::NotFound("member".to_string()))?,
            message: model.message,
            read: model.read,
            created_at: model.created_at,
        })
    }
}
