//! Participant shares.
//!
//! One row per (transaction, member) pair: the portion of an expense that
//! member owes, plus its settlement state. `paid_at` is set iff `paid`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, MoneyCents};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Share {
    pub transaction_id: Uuid,
    pub member_id: Uuid,
    pub owed: MoneyCents,
    pub paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Share {
    pub fn new(transaction_id: Uuid, member_id: Uuid, owed: MoneyCents, paid: bool) -> Self {
        Self {
            transaction_id,
            member_id,
            owed,
            paid,
            paid_at: paid.then(Utc::now),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "participant_shares")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub transaction_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub owed_minor: i64,
    pub paid: bool,
    pub paid_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Transactions,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Share> for ActiveModel {
    fn from(share: &Share) -> Self {
        Self {
            transaction_id: ActiveValue::Set(share.transaction_id.to_string()),
            user_id: ActiveValue::Set(share.member_id.to_string()),
            owed_minor: ActiveValue::Set(share.owed.cents()),
            paid: ActiveValue::Set(share.paid),
            paid_at: ActiveValue::Set(share.paid_at),
        }
    }
}

impl TryFrom<Model> for Share {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            transaction_id: Uuid::parse_str(&model.transaction_id)
                .map_err(|_| EngineError::NotFound("transaction".to_string()))?,
            member_id: Uuid::parse_str(&model.user_id)
                .map_err(|_| EngineError::NotFound("member".to_string()))?,
            owed: MoneyCents::new(model.owed_minor),
            paid: model.paid,
            paid_at: model.paid_at,
        })
    }
}
