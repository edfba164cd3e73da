use std::collections::{HashMap, HashSet};

use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, JoinType, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};

use crate::{
    CreateTransactionCmd, EngineError, MoneyCents, Notification, ResultEngine, Share, ShareInput,
    Transaction, TransactionKind, TransactionStatus, group_members, groups, ledger, notifications,
    shares, transactions,
};

use super::{Engine, normalize_required_text, with_tx};

/// One page of a member's transaction feed, newest first.
#[derive(Clone, Debug)]
pub struct TransactionPage {
    /// `(transaction, group name)` pairs; shares are not loaded here.
    pub transactions: Vec<(Transaction, String)>,
    /// Opaque cursor for the next (older) page.
    pub next_cursor: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct FeedCursor {
    created_at: DateTime<Utc>,
    transaction_id: String,
}

impl FeedCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid feed cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("invalid feed cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid feed cursor".to_string()))
    }
}

impl Engine {
    /// Creates a transaction and its shares, and fans out notifications to
    /// every group member except the payer. Returns the transaction id.
    ///
    /// Expense split policy: explicit shares are used verbatim after strict
    /// validation (unique members, non-negative, summing exactly to the
    /// amount); with no shares the amount is split equally across all
    /// current members in membership order, the payer's own share starting
    /// settled. A payment carries no shares and starts `pending` until the
    /// recipient confirms it.
    pub async fn create_transaction(&self, cmd: CreateTransactionCmd) -> ResultEngine<Uuid> {
        let description = normalize_required_text(&cmd.description, "description")?;

        with_tx!(self, |db_tx| {
            let group_model = self
                .require_group_member(&db_tx, cmd.group_id, cmd.user_id)
                .await?;
            if self
                .group_role(&db_tx, cmd.group_id, cmd.payer_id)
                .await?
                .is_none()
            {
                return Err(EngineError::Validation(
                    "payer must be a group member".to_string(),
                ));
            }

            match cmd.kind {
                TransactionKind::Payment => {
                    if cmd.shares.as_ref().is_some_and(|s| !s.is_empty()) {
                        return Err(EngineError::Validation(
                            "a payment carries no shares".to_string(),
                        ));
                    }
                    let recipient_id = cmd.recipient_id.ok_or_else(|| {
                        EngineError::Validation("payment requires a recipient".to_string())
                    })?;
                    if recipient_id == cmd.payer_id {
                        return Err(EngineError::Validation(
                            "payer and recipient must differ".to_string(),
                        ));
                    }
                    if self
                        .group_role(&db_tx, cmd.group_id, recipient_id)
                        .await?
                        .is_none()
                    {
                        return Err(EngineError::Validation(
                            "recipient must be a group member".to_string(),
                        ));
                    }
                }
                TransactionKind::Expense => {
                    if cmd.recipient_id.is_some() {
                        return Err(EngineError::Validation(
                            "an expense has no recipient".to_string(),
                        ));
                    }
                }
            }

            let mut tx = Transaction::new(
                cmd.group_id,
                cmd.kind,
                description.clone(),
                cmd.amount,
                cmd.payer_id,
                cmd.recipient_id,
            )?;

            if tx.kind == TransactionKind::Expense {
                tx.shares = match &cmd.shares {
                    Some(inputs) if !inputs.is_empty() => {
                        self.build_explicit_shares(&db_tx, &tx, inputs).await?
                    }
                    _ => self.build_equal_split(&db_tx, &tx).await?,
                };
                if tx.shares.iter().all(|s| s.paid) {
                    tx.status = TransactionStatus::Completed;
                }
            }

            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            for share in &tx.shares {
                shares::ActiveModel::from(share).insert(&db_tx).await?;
            }

            self.notify_group(&db_tx, &group_model, &tx).await?;

            Ok(tx.id)
        })
    }

    async fn build_explicit_shares(
        &self,
        db_tx: &DatabaseTransaction,
        tx: &Transaction,
        inputs: &[ShareInput],
    ) -> ResultEngine<Vec<Share>> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(inputs.len());
        for input in inputs {
            if !seen.insert(input.member_id) {
                return Err(EngineError::Validation(
                    "duplicate share member".to_string(),
                ));
            }
            if input.owed.is_negative() {
                return Err(EngineError::Validation(
                    "owed amount must be >= 0".to_string(),
                ));
            }
            if self
                .group_role(db_tx, tx.group_id, input.member_id)
                .await?
                .is_none()
            {
                return Err(EngineError::Validation(
                    "share member must belong to the group".to_string(),
                ));
            }
            out.push(Share::new(tx.id, input.member_id, input.owed, input.paid));
        }

        let total: MoneyCents = out.iter().map(|s| s.owed).sum();
        if total != tx.amount {
            return Err(EngineError::Integrity(format!(
                "shares sum to {total}, transaction amount is {}",
                tx.amount
            )));
        }
        Ok(out)
    }

    async fn build_equal_split(
        &self,
        db_tx: &DatabaseTransaction,
        tx: &Transaction,
    ) -> ResultEngine<Vec<Share>> {
        let member_ids = self.group_member_ids(db_tx, tx.group_id).await?;
        if member_ids.is_empty() {
            return Err(EngineError::Validation(
                "no members to split the expense among".to_string(),
            ));
        }

        let portions = ledger::split_even(tx.amount, member_ids.len());
        Ok(member_ids
            .into_iter()
            .zip(portions)
            .map(|(member_id, owed)| {
                // Self-debt is settled the moment it exists.
                Share::new(tx.id, member_id, owed, member_id == tx.payer_id)
            })
            .collect())
    }

    async fn notify_group(
        &self,
        db_tx: &DatabaseTransaction,
        group_model: &groups::Model,
        tx: &Transaction,
    ) -> ResultEngine<()> {
        let payer = self.require_member_exists(db_tx, tx.payer_id).await?;
        let message = format!(
            "{} added \"{}\" for {} in \"{}\"",
            payer.name, tx.description, tx.amount, group_model.name
        );

        for member_id in self.group_member_ids(db_tx, tx.group_id).await? {
            if member_id == tx.payer_id {
                continue;
            }
            let notification = Notification::new(member_id, message.clone());
            notifications::ActiveModel::from(&notification)
                .insert(db_tx)
                .await?;
        }
        Ok(())
    }

    /// Marks a pending payment completed. Recipient-only; idempotent.
    pub async fn confirm_payment(&self, transaction_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction_visible(&db_tx, transaction_id, user_id)
                .await?;
            let tx = Transaction::try_from(model)?;

            if tx.kind != TransactionKind::Payment {
                return Err(EngineError::Validation(
                    "only payments can be confirmed".to_string(),
                ));
            }
            if tx.recipient_id != Some(user_id) {
                return Err(EngineError::Validation(
                    "only the recipient can confirm a payment".to_string(),
                ));
            }
            if tx.status == TransactionStatus::Completed {
                return Ok(());
            }

            let update = transactions::ActiveModel {
                id: ActiveValue::Set(transaction_id.to_string()),
                status: ActiveValue::Set(TransactionStatus::Completed.as_str().to_string()),
                ..Default::default()
            };
            update.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Toggles a participant share's settled state and rederives the owning
    /// transaction's status in the same database transaction.
    ///
    /// Status is `completed` iff every share is paid; un-marking a share
    /// therefore walks a completed transaction back to `pending`. Repeating
    /// the same call leaves the same observable state.
    pub async fn set_participant_paid(
        &self,
        transaction_id: Uuid,
        member_id: Uuid,
        paid: bool,
        user_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_transaction_visible(&db_tx, transaction_id, user_id)
                .await?;

            let share = shares::Entity::find_by_id((
                transaction_id.to_string(),
                member_id.to_string(),
            ))
            .one(&db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound("share".to_string()))?;

            let paid_at = if paid {
                share.paid_at.or_else(|| Some(Utc::now()))
            } else {
                None
            };
            let update = shares::ActiveModel {
                transaction_id: ActiveValue::Set(transaction_id.to_string()),
                user_id: ActiveValue::Set(member_id.to_string()),
                paid: ActiveValue::Set(paid),
                paid_at: ActiveValue::Set(paid_at),
                ..Default::default()
            };
            update.update(&db_tx).await?;

            let unpaid = shares::Entity::find()
                .filter(shares::Column::TransactionId.eq(transaction_id.to_string()))
                .filter(shares::Column::Paid.eq(false))
                .count(&db_tx)
                .await?;

            let status = if unpaid == 0 {
                TransactionStatus::Completed
            } else {
                TransactionStatus::Pending
            };
            let tx_update = transactions::ActiveModel {
                id: ActiveValue::Set(transaction_id.to_string()),
                status: ActiveValue::Set(status.as_str().to_string()),
                ..Default::default()
            };
            tx_update.update(&db_tx).await?;

            Ok(())
        })
    }

    /// Lists the transactions visible to a member across all their groups,
    /// newest first, with cursor-based pagination.
    ///
    /// Pagination is newest -> older by `(created_at DESC, id DESC)`; the
    /// cursor is an opaque base64 token from `next_cursor`.
    pub async fn list_transactions_for_member(
        &self,
        user_id: Uuid,
        limit: u64,
        cursor: Option<&str>,
    ) -> ResultEngine<TransactionPage> {
        let cursor = cursor.map(FeedCursor::decode).transpose()?;

        with_tx!(self, |db_tx| {
            let mut query = transactions::Entity::find()
                .join(JoinType::InnerJoin, transactions::Relation::Groups.def())
                .join(JoinType::InnerJoin, groups::Relation::GroupMembers.def())
                .filter(group_members::Column::UserId.eq(user_id.to_string()))
                .order_by_desc(transactions::Column::CreatedAt)
                .order_by_desc(transactions::Column::Id)
                .limit(limit.saturating_add(1));

            if let Some(cursor) = &cursor {
                query = query.filter(
                    Condition::any()
                        .add(transactions::Column::CreatedAt.lt(cursor.created_at))
                        .add(
                            Condition::all()
                                .add(transactions::Column::CreatedAt.eq(cursor.created_at))
                                .add(transactions::Column::Id.lt(cursor.transaction_id.clone())),
                        ),
                );
            }

            let mut models: Vec<transactions::Model> = query.all(&db_tx).await?;
            let next_cursor = if models.len() as u64 > limit {
                models.truncate(limit as usize);
                models.last().map(|m| FeedCursor {
                    created_at: m.created_at,
                    transaction_id: m.id.clone(),
                })
            } else {
                None
            };
            let next_cursor = next_cursor.map(|c| c.encode()).transpose()?;

            let group_ids: HashSet<String> = models.iter().map(|m| m.group_id.clone()).collect();
            let group_names: HashMap<String, String> = groups::Entity::find()
                .filter(groups::Column::Id.is_in(group_ids))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|g| (g.id, g.name))
                .collect();

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                let group_name = group_names
                    .get(&model.group_id)
                    .cloned()
                    .ok_or_else(|| EngineError::Integrity("transaction without group".to_string()))?;
                out.push((Transaction::try_from(model)?, group_name));
            }

            Ok(TransactionPage {
                transactions: out,
                next_cursor,
            })
        })
    }
}
