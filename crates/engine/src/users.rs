//! Members table.
//!
//! A member is identified by an opaque uuid; the email is unique and
//! immutable once created, the display name may change.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::EngineError;

/// A registered member, as the engine sees it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::group_members::Entity")]
    GroupMembers,
    #[sea_orm(has_many = "super::notifications::Entity")]
    Notifications,
}

impl Related<super::group_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupMembers.def()
    }
}

impl Related<super::notifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Member {
    pub fn new(name: String, email: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            created_at: Utc::now(),
        }
    }
}

impl TryFrom<Model> for Member {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("member".to_string()))?,
            name: model.name,
            email: model.email,
            created_at: model.created_at,
        })
    }
}

/// Builds the row for a new member. The password is stored opaquely;
/// credential hardening is out of scope here.
pub(crate) fn active_model(member: &Member, password: &str) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::Set(member.id.to_string()),
        name: ActiveValue::Set(member.name.clone()),
        email: ActiveValue::Set(member.email.clone()),
        password: ActiveValue::Set(password.to_string()),
        created_at: ActiveValue::Set(member.created_at),
    }
}
