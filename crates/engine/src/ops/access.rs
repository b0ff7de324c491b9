use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, prelude::*,
};
use uuid::Uuid;

use crate::{
    Contribution, EngineError, Lekka, Operation, ResultEngine, TimelineAction, TimelineEvent,
    contributions, friends, group_pools, lekka_events, lekkas, users,
};

use super::Engine;

impl Engine {
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        op: Operation,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::not_found(op, user_id))
    }

    /// Loads a Lekka only if `user_id` created it. Other users see
    /// `KeyNotFound`, exactly as for an unknown id.
    pub(super) async fn require_lekka_owned(
        &self,
        db: &DatabaseTransaction,
        lekka_id: Uuid,
        user_id: &str,
        op: Operation,
    ) -> ResultEngine<Lekka> {
        let model = lekkas::Entity::find_by_id(lekka_id.to_string())
            .filter(lekkas::Column::CreatorId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::not_found(op, lekka_id))?;
        Lekka::try_from(model)
    }

    pub(super) async fn require_friend_owned(
        &self,
        db: &DatabaseTransaction,
        friend_id: Uuid,
        user_id: &str,
        op: Operation,
    ) -> ResultEngine<friends::Model> {
        friends::Entity::find_by_id(friend_id.to_string())
            .filter(friends::Column::OwnerId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::not_found(op, friend_id))
    }

    pub(super) async fn require_pool(
        &self,
        db: &DatabaseTransaction,
        pool_id: Uuid,
        op: Operation,
    ) -> ResultEngine<group_pools::Model> {
        group_pools::Entity::find_by_id(pool_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::not_found(op, pool_id))
    }

    pub(super) async fn require_pool_owned(
        &self,
        db: &DatabaseTransaction,
        pool_id: Uuid,
        user_id: &str,
        op: Operation,
    ) -> ResultEngine<group_pools::Model> {
        let model = self.require_pool(db, pool_id, op).await?;
        if model.owner_id != user_id {
            return Err(EngineError::not_found(op, pool_id));
        }
        Ok(model)
    }

    /// Appends one event at the end of a Lekka's timeline.
    pub(super) async fn append_event(
        &self,
        db: &DatabaseTransaction,
        lekka_id: Uuid,
        action: TimelineAction,
        description: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<TimelineEvent> {
        let len = lekka_events::Entity::find()
            .filter(lekka_events::Column::LekkaId.eq(lekka_id.to_string()))
            .count(db)
            .await?;
        let seq = i32::try_from(len).map_err(|_| {
            EngineError::invalid_state(Operation::ReadLekka, lekka_id, "timeline is full")
        })?;
        let event = TimelineEvent::new(lekka_id, seq, action, description, occurred_at);
        let model: lekka_events::ActiveModel = (&event).into();
        model.insert(db).await?;
        Ok(event)
    }

    pub(super) async fn load_timeline(
        &self,
        db: &DatabaseTransaction,
        lekka_id: Uuid,
    ) -> ResultEngine<Vec<TimelineEvent>> {
        lekka_events::Entity::find()
            .filter(lekka_events::Column::LekkaId.eq(lekka_id.to_string()))
            .order_by_asc(lekka_events::Column::Seq)
            .all(db)
            .await?
            .into_iter()
            .map(TimelineEvent::try_from)
            .collect()
    }

    /// Re-reads a Lekka with its timeline after a write.
    pub(super) async fn load_lekka_detail(
        &self,
        db: &DatabaseTransaction,
        lekka_id: Uuid,
        op: Operation,
    ) -> ResultEngine<Lekka> {
        let model = lekkas::Entity::find_by_id(lekka_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::not_found(op, lekka_id))?;
        let mut lekka = Lekka::try_from(model)?;
        lekka.timeline = self.load_timeline(db, lekka_id).await?;
        Ok(lekka)
    }

    /// Every Lekka created by `user_id`, newest first.
    pub(super) async fn load_user_lekkas(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<Vec<Lekka>> {
        lekkas::Entity::find()
            .filter(lekkas::Column::CreatorId.eq(user_id.to_string()))
            .order_by_desc(lekkas::Column::CreatedAt)
            .order_by_desc(lekkas::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(Lekka::try_from)
            .collect()
    }

    pub(super) async fn load_contributions(
        &self,
        db: &DatabaseTransaction,
        pool_id: Uuid,
    ) -> ResultEngine<Vec<Contribution>> {
        contributions::Entity::find()
            .filter(contributions::Column::PoolId.eq(pool_id.to_string()))
            .order_by_asc(contributions::Column::Seq)
            .all(db)
            .await?
            .into_iter()
            .map(Contribution::try_from)
            .collect()
    }
}
