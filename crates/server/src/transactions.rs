//! Transactions API endpoints

use api_types::transaction::{
    FeedEntry, SetPaid, ShareView, TransactionCreated, TransactionKind as ApiKind,
    TransactionListResponse, TransactionNew, TransactionStatus as ApiStatus, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};
use engine::{CreateTransactionCmd, MoneyCents, ShareInput};

fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Expense => ApiKind::Expense,
        engine::TransactionKind::Payment => ApiKind::Payment,
    }
}

fn map_status(status: engine::TransactionStatus) -> ApiStatus {
    match status {
        engine::TransactionStatus::Pending => ApiStatus::Pending,
        engine::TransactionStatus::Completed => ApiStatus::Completed,
    }
}

pub(crate) fn map_transaction(tx: &engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        group_id: tx.group_id,
        kind: map_kind(tx.kind),
        status: map_status(tx.status),
        description: tx.description.clone(),
        amount_minor: tx.amount.cents(),
        payer_id: tx.payer_id,
        recipient_id: tx.recipient_id,
        created_at: tx.created_at,
        shares: tx
            .shares
            .iter()
            .map(|s| ShareView {
                member_id: s.member_id,
                owed_minor: s.owed.cents(),
                paid: s.paid,
                paid_at: s.paid_at,
            })
            .collect(),
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let user_id = user.member_id()?;

    let mut cmd = match payload.kind {
        ApiKind::Expense => CreateTransactionCmd::expense(
            payload.group_id,
            payload.payer_id,
            payload.description,
            MoneyCents::new(payload.amount_minor),
        ),
        ApiKind::Payment => {
            let recipient_id = payload.recipient_id.ok_or_else(|| {
                ServerError::Generic("payment requires a recipient_id".to_string())
            })?;
            CreateTransactionCmd::payment(
                payload.group_id,
                payload.payer_id,
                recipient_id,
                payload.description,
                MoneyCents::new(payload.amount_minor),
            )
        }
    }
    .acting_user(user_id);

    if let Some(shares) = payload.shares {
        cmd = cmd.shares(
            shares
                .into_iter()
                .map(|s| ShareInput {
                    member_id: s.member_id,
                    owed: MoneyCents::new(s.owed_minor),
                    paid: s.paid,
                })
                .collect(),
        );
    }

    let id = state.engine.create_transaction(cmd).await?;
    Ok((StatusCode::CREATED, Json(TransactionCreated { id })))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u64>,
    /// Opaque pagination cursor (base64), from `next_cursor`.
    pub cursor: Option<String>,
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let limit = query.limit.unwrap_or(50);

    let page = state
        .engine
        .list_transactions_for_member(user.member_id()?, limit, query.cursor.as_deref())
        .await?;

    let transactions = page
        .transactions
        .into_iter()
        .map(|(tx, group_name)| FeedEntry {
            id: tx.id,
            group_id: tx.group_id,
            group_name,
            kind: map_kind(tx.kind),
            status: map_status(tx.status),
            description: tx.description,
            amount_minor: tx.amount.cents(),
            payer_id: tx.payer_id,
            recipient_id: tx.recipient_id,
            created_at: tx.created_at,
        })
        .collect();

    Ok(Json(TransactionListResponse {
        transactions,
        next_cursor: page.next_cursor,
    }))
}

pub async fn confirm(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.confirm_payment(id, user.member_id()?).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_paid(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((id, member_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SetPaid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .set_participant_paid(id, member_id, payload.paid, user.member_id()?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
