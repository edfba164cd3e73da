use sea_orm::{
    ActiveValue, JoinType, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, Group, GroupRole, ResultEngine, Share, Transaction, group_members, groups,
    shares, transactions, users,
};

use super::{Engine, normalize_optional_text, normalize_required_text, with_tx};

/// A group member with their profile fields and role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupMember {
    pub member_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: GroupRole,
}

/// Everything a client needs to render one group: the group itself, its
/// members, and its transactions newest-first with shares attached.
#[derive(Clone, Debug)]
pub struct GroupDetail {
    pub group: Group,
    pub members: Vec<GroupMember>,
    pub transactions: Vec<Transaction>,
}

impl Engine {
    /// Creates a group and its admin membership atomically.
    pub async fn new_group(
        &self,
        name: &str,
        description: Option<&str>,
        admin_id: Uuid,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_text(name, "group name")?;
        let description = normalize_optional_text(description);

        with_tx!(self, |db_tx| {
            self.require_member_exists(&db_tx, admin_id).await?;

            let group = Group::new(name.clone(), description.clone(), admin_id);
            groups::ActiveModel::from(&group).insert(&db_tx).await?;

            let membership = group_members::ActiveModel {
                group_id: ActiveValue::Set(group.id.to_string()),
                user_id: ActiveValue::Set(admin_id.to_string()),
                role: ActiveValue::Set(GroupRole::Admin.as_str().to_string()),
            };
            membership.insert(&db_tx).await?;

            Ok(group.id)
        })
    }

    /// Adds members to a group by email (admin-only).
    ///
    /// Unknown emails are skipped and an existing membership is silently
    /// absorbed, mirroring the add-by-invitation flow: the caller learns
    /// which ids were actually added, nothing fails halfway.
    pub async fn add_members_by_email(
        &self,
        group_id: Uuid,
        emails: &[String],
        user_id: Uuid,
    ) -> ResultEngine<Vec<Uuid>> {
        with_tx!(self, |db_tx| {
            self.require_group_admin(&db_tx, group_id, user_id).await?;

            let mut added = Vec::new();
            for email in emails {
                let email = email.trim().to_lowercase();
                let Some(member) = self.find_member_by_email(&db_tx, &email).await? else {
                    continue;
                };

                let existing = group_members::Entity::find_by_id((
                    group_id.to_string(),
                    member.id.clone(),
                ))
                .one(&db_tx)
                .await?;
                if existing.is_some() {
                    continue;
                }

                let membership = group_members::ActiveModel {
                    group_id: ActiveValue::Set(group_id.to_string()),
                    user_id: ActiveValue::Set(member.id.clone()),
                    role: ActiveValue::Set(GroupRole::Member.as_str().to_string()),
                };
                membership.insert(&db_tx).await?;

                let member_id = Uuid::parse_str(&member.id)
                    .map_err(|_| EngineError::Integrity("invalid member id".to_string()))?;
                added.push(member_id);
            }

            Ok(added)
        })
    }

    /// Lists the groups a member belongs to, newest first.
    pub async fn list_groups_for_member(&self, user_id: Uuid) -> ResultEngine<Vec<Group>> {
        with_tx!(self, |db_tx| {
            let models: Vec<groups::Model> = groups::Entity::find()
                .join(JoinType::InnerJoin, groups::Relation::GroupMembers.def())
                .filter(group_members::Column::UserId.eq(user_id.to_string()))
                .order_by_desc(groups::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            models.into_iter().map(Group::try_from).collect()
        })
    }

    /// Full group view: members with roles plus transactions newest-first,
    /// each carrying its participant shares.
    pub async fn group_detail(&self, group_id: Uuid, user_id: Uuid) -> ResultEngine<GroupDetail> {
        with_tx!(self, |db_tx| {
            let group_model = self.require_group_member(&db_tx, group_id, user_id).await?;
            let group = Group::try_from(group_model)?;

            let member_rows: Vec<(group_members::Model, Option<users::Model>)> =
                group_members::Entity::find()
                    .filter(group_members::Column::GroupId.eq(group_id.to_string()))
                    .find_also_related(users::Entity)
                    .all(&db_tx)
                    .await?;

            let mut members = Vec::with_capacity(member_rows.len());
            for (membership, user) in member_rows {
                let user = user.ok_or_else(|| {
                    EngineError::Integrity("membership without member row".to_string())
                })?;
                members.push(GroupMember {
                    member_id: Uuid::parse_str(&user.id)
                        .map_err(|_| EngineError::Integrity("invalid member id".to_string()))?,
                    name: user.name,
                    email: user.email,
                    role: GroupRole::try_from(membership.role.as_str())?,
                });
            }

            let tx_models: Vec<transactions::Model> = transactions::Entity::find()
                .filter(transactions::Column::GroupId.eq(group_id.to_string()))
                .order_by_desc(transactions::Column::CreatedAt)
                .order_by_desc(transactions::Column::Id)
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

            Ok(GroupDetail {
                group,
                members,
                transactions: txs,
            })
        })
    }
}
