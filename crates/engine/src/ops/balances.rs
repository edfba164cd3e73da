use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Balances, ResultEngine, Share, Transaction, ledger, shares, transactions};

use super::{Engine, with_tx};

impl Engine {
    /// Computes the signed net balance of every member of a group.
    ///
    /// Loads the group's transactions with their shares and hands them to
    /// the pure [`ledger::balances`] aggregation; the caller must be a group
    /// member. Positive means the member is owed money.
    pub async fn compute_balances(&self, group_id: Uuid, user_id: Uuid) -> ResultEngine<Balances> {
        with_tx!(self, |db_tx| {
            self.require_group_member(&db_tx, group_id, user_id).await?;

            let member_ids = self.group_member_ids(&db_tx, group_id).await?;

            let tx_models: Vec<transactions::Model> = transactions::Entity::find()
                .filter(transactions::Column::GroupId.eq(group_id.to_string()))
                .all(&db_tx)
                .await?;

            let tx_ids: Vec<String> = tx_models.iter().map(|m| m.id.clone()).collect();
            let share_models: Vec<shares::Model> = shares::Entity::find()
                .filter(shares::Column::TransactionId.is_in(tx_ids))
                .all(&db_tx)
                .await?;

            let mut txs = Vec::with_capacity(tx_models.len());
            for model in tx_models {
                txs.push(Transaction::try_from(model)?);
            }
            for model in share_models {
                let share = Share::try_from(model)?;
                if let Some(tx) = txs.iter_mut().find(|t| t.id == share.transaction_id) {
                    tx.shares.push(share);
                }
            }

            Ok(ledger::balances(&member_ids, &txs))
        })
    }
}
