use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub name: String,
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserCreated {
        pub id: Uuid,
    }

    /// Credentials check; the API itself authenticates per request with
    /// HTTP Basic.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
    }
}

pub mod group {
    use super::*;

    /// Role of a member inside a group.
    ///
    /// - `admin`: created the group and can add members.
    /// - `member`: everyone else.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum GroupRole {
        Admin,
        Member,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub admin_id: Uuid,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupsResponse {
        pub groups: Vec<GroupView>,
    }

    /// Request body for inviting members by email.
    ///
    /// Unknown emails are skipped; the response lists the ids that were
    /// actually added.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersAdd {
        pub emails: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersAdded {
        pub added: Vec<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub role: GroupRole,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupDetailResponse {
        pub group: GroupView,
        pub members: Vec<MemberView>,
        pub transactions: Vec<super::transaction::TransactionView>,
    }
}

pub mod balance {
    use super::*;

    /// One member's net position. Positive means the group owes them.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberBalance {
        pub member_id: Uuid,
        pub balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancesResponse {
        pub balances: Vec<MemberBalance>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Expense,
        Payment,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionStatus {
        Pending,
        Completed,
    }

    /// One explicit participant share in a create request.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareNew {
        pub member_id: Uuid,
        pub owed_minor: i64,
        #[serde(default)]
        pub paid: bool,
    }

    /// Create an expense or payment.
    ///
    /// For expenses, omitting `shares` requests an equal split across all
    /// current group members; explicit shares must sum to `amount_minor`.
    /// Payments require `recipient_id` and carry no shares.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub group_id: Uuid,
        pub kind: TransactionKind,
        pub description: String,
        pub amount_minor: i64,
        pub payer_id: Uuid,
        pub recipient_id: Option<Uuid>,
        pub shares: Option<Vec<ShareNew>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareView {
        pub member_id: Uuid,
        pub owed_minor: i64,
        pub paid: bool,
        pub paid_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub group_id: Uuid,
        pub kind: TransactionKind,
        pub status: TransactionStatus,
        pub description: String,
        pub amount_minor: i64,
        pub payer_id: Uuid,
        pub recipient_id: Option<Uuid>,
        pub created_at: DateTime<Utc>,
        pub shares: Vec<ShareView>,
    }

    /// One feed entry: a transaction plus the name of its group.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FeedEntry {
        pub id: Uuid,
        pub group_id: Uuid,
        pub group_name: String,
        pub kind: TransactionKind,
        pub status: TransactionStatus,
        pub description: String,
        pub amount_minor: i64,
        pub payer_id: Uuid,
        pub recipient_id: Option<Uuid>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<FeedEntry>,
        /// Opaque cursor for fetching the next page (older items).
        pub next_cursor: Option<String>,
    }

    /// Marks one participant share settled or not.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SetPaid {
        pub paid: bool,
    }
}

pub mod notification {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NotificationView {
        pub id: Uuid,
        pub message: String,
        pub read: bool,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NotificationsResponse {
        pub notifications: Vec<NotificationView>,
        pub unread: u64,
    }
}
