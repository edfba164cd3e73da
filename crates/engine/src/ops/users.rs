use sea_orm::{TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Member, ResultEngine, users};

use super::{Engine, normalize_required_text, with_tx};

impl Engine {
    /// Registers a new member.
    ///
    /// The email is the unique handle; a duplicate registration fails with
    /// [`EngineError::Conflict`]. The password is stored opaquely and only
    /// ever compared by the server's auth layer.
    pub async fn register_member(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_text(name, "name")?;
        let email = normalize_required_text(email, "email")?.to_lowercase();
        if password.is_empty() {
            return Err(EngineError::Validation(
                "password must not be empty".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            if self.find_member_by_email(&db_tx, &email).await?.is_some() {
                return Err(EngineError::Conflict(format!(
                    "email {email} already registered"
                )));
            }

            let member = Member::new(name.clone(), email.clone());
            users::active_model(&member, password).insert(&db_tx).await?;
            Ok(member.id)
        })
    }

    /// Returns a member by id.
    pub async fn member(&self, member_id: Uuid) -> ResultEngine<Member> {
        with_tx!(self, |db_tx| {
            let model = self.require_member_exists(&db_tx, member_id).await?;
            Member::try_from(model)
        })
    }
}
