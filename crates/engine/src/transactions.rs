//! Transaction primitives.
//!
//! A `Transaction` is either an expense (one payer, a set of owed shares) or
//! a direct payment between two members. Its status is derived from its
//! shares (expenses) or from recipient confirmation (payments) and
//! transitions `pending -> completed`; un-marking a share walks it back.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, shares::Share};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionKind {
    Expense,
    Payment,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Payment => "payment",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "expense" => Ok(Self::Expense),
            "payment" => Ok(Self::Payment),
            other => Err(EngineError::Validation(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Completed,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(EngineError::Integrity(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub group_id: Uuid,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub description: String,
    pub amount: MoneyCents,
    pub payer_id: Uuid,
    pub recipient_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    /// Filled for group-detail reads; left empty by list operations.
    pub shares: Vec<Share>,
}

impl Transaction {
    pub fn new(
        group_id: Uuid,
        kind: TransactionKind,
        description: String,
        amount: MoneyCents,
        payer_id: Uuid,
        recipient_id: Option<Uuid>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::Validation(
                "amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            group_id,
            kind,
            status: TransactionStatus::Pending,
            description,
            amount,
            payer_id,
            recipient_id,
            created_at: Utc::now(),
            shares: Vec::new(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    pub kind: String,
    pub status: String,
    pub description: String,
    pub amount_minor: i64,
    pub payer_id: String,
    pub recipient_id: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Groups,
    #[sea_orm(has_many = "super::shares::Entity")]
    Shares,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::shares::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shares.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            group_id: ActiveValue::Set(tx.group_id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            status: ActiveValue::Set(tx.status.as_str().to_string()),
            description: ActiveValue::Set(tx.description.clone()),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            payer_id: ActiveValue::Set(tx.payer_id.to_string()),
            recipient_id: ActiveValue::Set(tx.recipient_id.map(|id| id.to_string())),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

// Stored ids must reconcile on read; a row that does not parse is corrupt,
// not absent.
impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("transaction".to_string()))?,
            group_id: Uuid::parse_str(&model.group_id)
                .map_err(|_| EngineError::NotFound("group".to_string()))?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            status: TransactionStatus::try_from(model.status.as_str())?,
            description: model.description,
            amount: MoneyCents::new(model.amount_minor),
            payer_id: Uuid::parse_str(&model.payer_id)
                .map_err(|_| EngineError::NotFound("member".to_string()))?,
            recipient_id: model
                .recipient_id
                .map(|s| {
                    Uuid::parse_str(&s)
                        .map_err(|_| EngineError::Integrity("invalid recipient id".to_string()))
                })
                .transpose()?,
            created_at: model.created_at,
            shares: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment_model() -> Model {
        Model {
            id: Uuid::new_v4().to_string(),
            group_id: Uuid::new_v4().to_string(),
            kind: "payment".to_string(),
            status: "pending".to_string(),
            description: "settle".to_string(),
            amount_minor: 1000,
            payer_id: Uuid::new_v4().to_string(),
            recipient_id: Some(Uuid::new_v4().to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn corrupt_recipient_id_is_an_integrity_error() {
        let mut model = payment_model();
        model.recipient_id = Some("not-a-uuid".to_string());

        let err = Transaction::try_from(model).unwrap_err();
        assert_eq!(
            err,
            EngineError::Integrity("invalid recipient id".to_string())
        );
    }

    #[test]
    fn valid_payment_model_round_trips_recipient() {
        let model = payment_model();
        let recipient = model.recipient_id.clone();

        let tx = Transaction::try_from(model).unwrap();
        assert_eq!(tx.recipient_id.map(|id| id.to_string()), recipient);
    }
}
