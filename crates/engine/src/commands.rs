//! Command structs for engine write operations.
//!
//! These group parameters for the wider operations, keeping call sites
//! readable and avoiding long argument lists.

use uuid::Uuid;

use crate::{MoneyCents, TransactionKind};

/// One explicit participant share supplied by a caller.
#[derive(Clone, Debug)]
pub struct ShareInput {
    pub member_id: Uuid,
    pub owed: MoneyCents,
    /// Starts the share already settled (e.g. the payer's own portion).
    pub paid: bool,
}

/// Create a transaction inside a group.
///
/// For an expense, `shares` may be omitted to request an equal split across
/// all current group members; explicit shares must sum to `amount`. Payments
/// require `recipient_id` and carry no shares.
#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub group_id: Uuid,
    pub kind: TransactionKind,
    pub description: String,
    pub amount: MoneyCents,
    pub payer_id: Uuid,
    pub recipient_id: Option<Uuid>,
    pub shares: Option<Vec<ShareInput>>,
    pub user_id: Uuid,
}

impl CreateTransactionCmd {
    #[must_use]
    pub fn expense(group_id: Uuid, payer_id: Uuid, description: impl Into<String>, amount: MoneyCents) -> Self {
        Self {
            group_id,
            kind: TransactionKind::Expense,
            description: description.into(),
            amount,
            payer_id,
            recipient_id: None,
            shares: None,
            user_id: payer_id,
        }
    }

    #[must_use]
    pub fn payment(
        group_id: Uuid,
        payer_id: Uuid,
        recipient_id: Uuid,
        description: impl Into<String>,
        amount: MoneyCents,
    ) -> Self {
        Self {
            group_id,
            kind: TransactionKind::Payment,
            description: description.into(),
            amount,
            payer_id,
            recipient_id: Some(recipient_id),
            shares: None,
            user_id: payer_id,
        }
    }

    #[must_use]
    pub fn shares(mut self, shares: Vec<ShareInput>) -> Self {
        self.shares = Some(shares);
        self
    }

    #[must_use]
    pub fn acting_user(mut self, user_id: Uuid) -> Self {
        self.user_id = user_id;
        self
    }
}
