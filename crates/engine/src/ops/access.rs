use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, GroupRole, ResultEngine, group_members, groups, transactions, users};

use super::Engine;

impl Engine {
    pub(super) async fn require_member_exists(
        &self,
        db: &DatabaseTransaction,
        member_id: Uuid,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(member_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("member".to_string()))
    }

    pub(super) async fn find_member_by_email(
        &self,
        db: &DatabaseTransaction,
        email: &str,
    ) -> ResultEngine<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email.to_string()))
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn group_role(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Option<GroupRole>> {
        let row = group_members::Entity::find_by_id((group_id.to_string(), user_id.to_string()))
            .one(db)
            .await?;
        row.as_ref()
            .map(|m| GroupRole::try_from(m.role.as_str()))
            .transpose()
    }

    /// Loads the group and checks the caller is one of its members.
    ///
    /// Membership failures report `NotFound`, not `Forbidden`: a group a
    /// member cannot see does not exist for them.
    pub(super) async fn require_group_member(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<groups::Model> {
        let model = groups::Entity::find_by_id(group_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("group".to_string()))?;
        if self.group_role(db, group_id, user_id).await?.is_none() {
            return Err(EngineError::NotFound("group".to_string()));
        }
        Ok(model)
    }

    pub(super) async fn require_group_admin(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<groups::Model> {
        let model = self.require_group_member(db, group_id, user_id).await?;
        match self.group_role(db, group_id, user_id).await? {
            Some(GroupRole::Admin) => Ok(model),
            _ => Err(EngineError::NotFound("group".to_string())),
        }
    }

    /// Loads a transaction visible to the caller (a member of its group).
    pub(super) async fn require_transaction_visible(
        &self,
        db: &DatabaseTransaction,
        transaction_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<transactions::Model> {
        let model = transactions::Entity::find_by_id(transaction_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("transaction".to_string()))?;
        let group_id = Uuid::parse_str(&model.group_id)
            .map_err(|_| EngineError::Integrity("invalid group id".to_string()))?;
        if self.group_role(db, group_id, user_id).await?.is_none() {
            return Err(EngineError::NotFound("transaction".to_string()));
        }
        Ok(model)
    }

    /// Member ids of a group, in membership insertion order (rowid order in
    /// sqlite). The equal-split remainder assignment depends on this order
    /// being stable.
    pub(super) async fn group_member_ids(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<Vec<Uuid>> {
        let rows = group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id.to_string()))
            .all(db)
            .await?;
        rows.iter()
            .map(|m| {
                Uuid::parse_str(&m.user_id)
                    .map_err(|_| EngineError::Integrity("invalid member id".to_string()))
            })
            .collect()
    }
}
