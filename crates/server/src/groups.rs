//! Groups API endpoints

use api_types::group::{
    GroupCreated, GroupDetailResponse, GroupNew, GroupRole as ApiRole, GroupView, GroupsResponse,
    MemberView, MembersAdd, MembersAdded,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, transactions, user};

fn map_role(role: engine::GroupRole) -> ApiRole {
    match role {
        engine::GroupRole::Admin => ApiRole::Admin,
        engine::GroupRole::Member => ApiRole::Member,
    }
}

pub(crate) fn map_group(group: engine::Group) -> GroupView {
    GroupView {
        id: group.id,
        name: group.name,
        description: group.description,
        admin_id: group.admin_id,
        created_at: group.created_at,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<(StatusCode, Json<GroupCreated>), ServerError> {
    let id = state
        .engine
        .new_group(&payload.name, payload.description.as_deref(), user.member_id()?)
        .await?;

    Ok((StatusCode::CREATED, Json(GroupCreated { id })))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<GroupsResponse>, ServerError> {
    let groups = state
        .engine
        .list_groups_for_member(user.member_id()?)
        .await?;

    Ok(Json(GroupsResponse {
        groups: groups.into_iter().map(map_group).collect(),
    }))
}

pub async fn detail(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupDetailResponse>, ServerError> {
    let detail = state.engine.group_detail(group_id, user.member_id()?).await?;

    Ok(Json(GroupDetailResponse {
        group: map_group(detail.group),
        members: detail
            .members
            .into_iter()
            .map(|m| MemberView {
                id: m.member_id,
                name: m.name,
                email: m.email,
                role: map_role(m.role),
            })
            .collect(),
        transactions: detail
            .transactions
            .iter()
            .map(transactions::map_transaction)
            .collect(),
    }))
}

pub async fn add_members(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<MembersAdd>,
) -> Result<Json<MembersAdded>, ServerError> {
    let added = state
        .engine
        .add_members_by_email(group_id, &payload.emails, user.member_id()?)
        .await?;

    Ok(Json(MembersAdded { added }))
}
