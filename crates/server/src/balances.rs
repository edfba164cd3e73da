//! Group balances endpoint

use api_types::balance::{BalancesResponse, MemberBalance};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<BalancesResponse>, ServerError> {
    let balances = state
        .engine
        .compute_balances(group_id, user.member_id()?)
        .await?;

    // Stable output order for clients and tests.
    let mut balances: Vec<MemberBalance> = balances
        .into_iter()
        .map(|(member_id, balance)| MemberBalance {
            member_id,
            balance_minor: balance.cents(),
        })
        .collect();
    balances.sort_by_key(|b| b.member_id);

    Ok(Json(BalancesResponse { balances }))
}
