//! Ledger core for a shared-expense tracker.
//!
//! Groups of members record expenses (split into per-member owed shares) and
//! direct payments; the engine derives signed net balances and tracks
//! per-share settlement until a transaction completes. All multi-step writes
//! run inside one database transaction; the database is the only source of
//! truth.

pub use commands::{CreateTransactionCmd, ShareInput};
pub use error::EngineError;
pub use group_members::GroupRole;
pub use groups::Group;
pub use ledger::{Balances, balances, split_even};
pub use money::MoneyCents;
pub use notifications::Notification;
pub use ops::{Engine, EngineBuilder, GroupDetail, GroupMember, TransactionPage};
pub use shares::Share;
pub use transactions::{Transaction, TransactionKind, TransactionStatus};
pub use users::Member;

mod commands;
mod error;
mod group_members;
mod groups;
mod ledger;
mod money;
mod notifications;
mod ops;
mod shares;
mod transactions;
mod users;

pub(crate) type ResultEngine<T> = Result<T, EngineError>;
