use sea_orm::{
    ActiveModelTrait, ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, Friend, FriendFilter, FriendSummary, Operation, ResultEngine, aggregate,
    friends, lekkas,
    util::{normalize_phone, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Saves a contact.
    ///
    /// The caller's Lekkas that are not linked to a contact yet and carry the
    /// same phone snapshot get linked to the new friend.
    pub async fn add_friend(
        &self,
        user_id: &str,
        name: &str,
        phone: Option<&str>,
    ) -> ResultEngine<Friend> {
        let op = Operation::AddFriend;
        let name = normalize_required_text(op, name, "friend name")?;
        let phone = normalize_phone(phone);

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id, op).await?;
            if let Some(phone) = &phone {
                let taken = friends::Entity::find()
                    .filter(friends::Column::OwnerId.eq(user_id.to_string()))
                    .filter(friends::Column::Phone.eq(phone.clone()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if taken {
                    return Err(EngineError::validation(
                        op,
                        format!("a friend with phone {phone} already exists"),
                    ));
                }
            }

            let friend = Friend::new(user_id.to_string(), name, phone);
            let model: friends::ActiveModel = (&friend).into();
            model.insert(&db_tx).await?;

            if let Some(phone) = &friend.phone {
                let linked = lekkas::Entity::update_many()
                    .col_expr(lekkas::Column::FriendId, Expr::value(friend.id.to_string()))
                    .filter(lekkas::Column::CreatorId.eq(user_id.to_string()))
                    .filter(lekkas::Column::FriendId.is_null())
                    .filter(lekkas::Column::FriendPhone.eq(phone.clone()))
                    .exec(&db_tx)
                    .await?
                    .rows_affected;
                tracing::debug!(friend_id = %friend.id, linked, "friend added");
            }
            Ok(friend)
        })
    }

    /// Lists the caller's friends with their rollups, by name.
    pub async fn friends(
        &self,
        user_id: &str,
        filter: FriendFilter,
    ) -> ResultEngine<Vec<FriendSummary>> {
        with_tx!(self, |db_tx| {
            let lekkas = self.load_user_lekkas(&db_tx, user_id).await?;
            let models = friends::Entity::find()
                .filter(friends::Column::OwnerId.eq(user_id.to_string()))
                .order_by_asc(friends::Column::Name)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                let summary =
                    aggregate::friend_summary(self.currency, Friend::try_from(model)?, &lekkas)?;
                if filter.keeps(&summary) {
                    out.push(summary);
                }
            }
            Ok(out)
        })
    }

    pub async fn friend(&self, user_id: &str, friend_id: Uuid) -> ResultEngine<FriendSummary> {
        let op = Operation::ReadFriend;
        with_tx!(self, |db_tx| {
            let model = self
                .require_friend_owned(&db_tx, friend_id, user_id, op)
                .await?;
            let lekkas = self.load_user_lekkas(&db_tx, user_id).await?;
            aggregate::friend_summary(self.currency, Friend::try_from(model)?, &lekkas)
        })
    }

    /// Edits the contact. Lekka snapshots keep the old name and phone.
    pub async fn update_friend(
        &self,
        user_id: &str,
        friend_id: Uuid,
        name: Option<&str>,
        phone: Option<&str>,
    ) -> ResultEngine<Friend> {
        let op = Operation::UpdateFriend;
        let name = name
            .map(|name| normalize_required_text(op, name, "friend name"))
            .transpose()?;

        let phone_given = phone.is_some();
        let phone = normalize_phone(phone);

        with_tx!(self, |db_tx| {
            let model = self
                .require_friend_owned(&db_tx, friend_id, user_id, op)
                .await?;
            if let Some(phone) = &phone {
                let taken = friends::Entity::find()
                    .filter(friends::Column::OwnerId.eq(user_id.to_string()))
                    .filter(friends::Column::Phone.eq(phone.clone()))
                    .filter(friends::Column::Id.ne(friend_id.to_string()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if taken {
                    return Err(EngineError::validation(
                        op,
                        format!("a friend with phone {phone} already exists"),
                    ));
                }
            }

            let mut active: friends::ActiveModel = model.into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if phone_given {
                active.phone = ActiveValue::Set(phone);
            }
            let model = active.update(&db_tx).await?;
            Friend::try_from(model)
        })
    }

    /// Removes the contact. Its Lekkas stay, unlinked, with their snapshots.
    pub async fn delete_friend(&self, user_id: &str, friend_id: Uuid) -> ResultEngine<()> {
        let op = Operation::DeleteFriend;
        with_tx!(self, |db_tx| {
            let model = self
                .require_friend_owned(&db_tx, friend_id, user_id, op)
                .await?;
            lekkas::Entity::update_many()
                .col_expr(lekkas::Column::FriendId, Expr::value(Option::<String>::None))
                .filter(lekkas::Column::CreatorId.eq(user_id.to_string()))
                .filter(lekkas::Column::FriendId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;
            friends::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            Ok(())
        })
    }
}
