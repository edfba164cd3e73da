//! Registration, login, and the users entity backing Basic auth.

use api_types::user::{Login, UserCreated, UserNew, UserView};
use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The row id as a uuid.
    pub fn member_id(&self) -> Result<Uuid, ServerError> {
        Uuid::parse_str(&self.id).map_err(|_| ServerError::Generic("invalid user id".to_string()))
    }
}

pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserCreated>), ServerError> {
    let id = state
        .engine
        .register_member(&payload.name, &payload.email, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(UserCreated { id })))
}

/// Credentials check. The API authenticates every request with Basic auth;
/// this endpoint lets a client validate credentials up front and learn its
/// own profile.
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<Login>,
) -> Result<Json<UserView>, ServerError> {
    let user = Entity::find()
        .filter(Column::Email.eq(payload.email.trim().to_lowercase()))
        .filter(Column::Password.eq(payload.password))
        .one(&state.db)
        .await
        .map_err(|err| ServerError::Generic(err.to_string()))?
        .ok_or_else(|| ServerError::Generic("invalid credentials".to_string()))?;

    Ok(Json(UserView {
        id: user.member_id()?,
        name: user.name,
        email: user.email,
    }))
}
