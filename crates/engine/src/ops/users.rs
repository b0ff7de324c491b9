use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, Operation, ResultEngine, User, users,
    util::{normalize_phone, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates the user or refreshes their display name and phone.
    ///
    /// Authentication happens upstream; the engine trusts `user_id`.
    pub async fn register_user(
        &self,
        user_id: &str,
        display_name: &str,
        phone: Option<&str>,
    ) -> ResultEngine<User> {
        let op = Operation::RegisterUser;
        let user_id = normalize_required_text(op, user_id, "user id")?;
        let display_name = normalize_required_text(op, display_name, "display name")?;
        let phone = normalize_phone(phone);

        with_tx!(self, |db_tx| {
            let existing = users::Entity::find_by_id(user_id.clone()).one(&db_tx).await?;
            let model = match existing {
                Some(model) => {
                    let mut active: users::ActiveModel = model.into();
                    active.display_name = ActiveValue::Set(display_name);
                    active.phone = ActiveValue::Set(phone);
                    active.update(&db_tx).await?
                }
                None => {
                    users::ActiveModel {
                        id: ActiveValue::Set(user_id.clone()),
                        display_name: ActiveValue::Set(display_name),
                        phone: ActiveValue::Set(phone),
                        created_at: ActiveValue::Set(Utc::now()),
                    }
                    .insert(&db_tx)
                    .await?
                }
            };
            tracing::debug!(user_id = %model.id, "user registered");
            Ok(User::from(model))
        })
    }

    pub async fn user(&self, user_id: &str) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            users::Entity::find_by_id(user_id.to_string())
                .one(&db_tx)
                .await?
                .map(User::from)
                .ok_or_else(|| EngineError::not_found(Operation::ReadUser, user_id))
        })
    }

    pub async fn users(&self) -> ResultEngine<Vec<User>> {
        with_tx!(self, |db_tx| {
            Ok(users::Entity::find()
                .order_by_asc(users::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(User::from)
                .collect())
        })
    }
}
