use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Contribution, ContributeCmd, CreatePoolCmd, EngineError, GroupPool, Operation, PoolProgress,
    PoolStatus, ResultEngine, contributions, group_pools,
    util::{ensure_positive_amount, normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Bumps the pool version if nobody changed the pool since `seen` was
    /// read and it is still active.
    async fn bump_pool_version(
        &self,
        db: &DatabaseTransaction,
        seen: &group_pools::Model,
        close: bool,
        op: Operation,
    ) -> ResultEngine<()> {
        let mut update = group_pools::Entity::update_many()
            .col_expr(
                group_pools::Column::Version,
                Expr::col(group_pools::Column::Version).add(1),
            )
            .filter(group_pools::Column::Id.eq(seen.id.clone()))
            .filter(group_pools::Column::Version.eq(seen.version))
            .filter(group_pools::Column::Status.eq(PoolStatus::Active.as_str()));
        if close {
            update = update
                .col_expr(
                    group_pools::Column::Status,
                    Expr::value(PoolStatus::Closed.as_str()),
                )
                .col_expr(group_pools::Column::ClosedAt, Expr::value(Utc::now()));
        }
        if update.exec(db).await?.rows_affected > 0 {
            return Ok(());
        }

        let current = group_pools::Entity::find_by_id(seen.id.clone())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::not_found(op, &seen.id))?;
        if current.status == PoolStatus::Closed.as_str() {
            return Err(EngineError::invalid_state(op, &seen.id, "pool is closed"));
        }
        Err(EngineError::conflict(op, &seen.id))
    }

    async fn load_pool_detail(
        &self,
        db: &DatabaseTransaction,
        pool_id: Uuid,
        op: Operation,
    ) -> ResultEngine<GroupPool> {
        let model = self.require_pool(db, pool_id, op).await?;
        let mut pool = GroupPool::try_from(model)?;
        pool.contributions = self.load_contributions(db, pool_id).await?;
        Ok(pool)
    }

    pub async fn create_pool(&self, cmd: CreatePoolCmd) -> ResultEngine<GroupPool> {
        let op = Operation::CreatePool;
        let name = normalize_required_text(op, &cmd.name, "pool name")?;
        ensure_positive_amount(op, self.currency, cmd.target, "target amount")?;
        let pool = GroupPool::new(
            cmd.user_id.clone(),
            name,
            normalize_optional_text(cmd.description.as_deref()),
            cmd.target,
        )?;

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, &cmd.user_id, op).await?;
            let model: group_pools::ActiveModel = (&pool).into();
            model.insert(&db_tx).await?;
            tracing::debug!(pool_id = %pool.id, "pool created");
            Ok(pool)
        })
    }

    /// Appends a contribution and returns the pool's new progress.
    ///
    /// Fails with `InvalidState` once the pool is closed. If a close lands
    /// between the read and the write, the contribution is rejected, never
    /// dropped after the fact.
    pub async fn contribute(&self, cmd: ContributeCmd) -> ResultEngine<PoolProgress> {
        let op = Operation::Contribute;
        ensure_positive_amount(op, self.currency, cmd.amount, "amount")?;
        let contributor_ref = normalize_required_text(op, &cmd.contributor_ref, "contributor")?;

        with_tx!(self, |db_tx| {
            let model = self.require_pool(&db_tx, cmd.pool_id, op).await?;
            if PoolStatus::try_from(model.status.as_str())? == PoolStatus::Closed {
                return Err(EngineError::invalid_state(op, cmd.pool_id, "pool is closed"));
            }
            self.bump_pool_version(&db_tx, &model, false, op).await?;

            let len = contributions::Entity::find()
                .filter(contributions::Column::PoolId.eq(model.id.clone()))
                .count(&db_tx)
                .await?;
            let mut contribution =
                Contribution::new(cmd.pool_id, contributor_ref, cmd.amount, cmd.user_id.clone());
            contribution.seq = i32::try_from(len)
                .map_err(|_| EngineError::invalid_state(op, cmd.pool_id, "pool log is full"))?;
            let active: contributions::ActiveModel = (&contribution).into();
            active.insert(&db_tx).await?;

            let pool = self.load_pool_detail(&db_tx, cmd.pool_id, op).await?;
            let progress = pool.progress()?;
            tracing::debug!(
                pool_id = %pool.id,
                progress_bps = progress.progress_bps,
                "contribution recorded"
            );
            Ok(progress)
        })
    }

    /// Closes an active pool for good. Owner only.
    pub async fn close_pool(&self, user_id: &str, pool_id: Uuid) -> ResultEngine<GroupPool> {
        let op = Operation::ClosePool;
        with_tx!(self, |db_tx| {
            let model = self
                .require_pool_owned(&db_tx, pool_id, user_id, op)
                .await?;
            if PoolStatus::try_from(model.status.as_str())? == PoolStatus::Closed {
                return Err(EngineError::invalid_state(op, pool_id, "pool is already closed"));
            }
            self.bump_pool_version(&db_tx, &model, true, op).await?;
            tracing::debug!(%pool_id, "pool closed");
            self.load_pool_detail(&db_tx, pool_id, op).await
        })
    }

    pub async fn pool_progress(&self, pool_id: Uuid) -> ResultEngine<PoolProgress> {
        with_tx!(self, |db_tx| {
            self.load_pool_detail(&db_tx, pool_id, Operation::ReadPool)
                .await?
                .progress()
        })
    }

    /// One pool with its contribution log, oldest first.
    pub async fn pool(&self, pool_id: Uuid) -> ResultEngine<GroupPool> {
        with_tx!(self, |db_tx| {
            self.load_pool_detail(&db_tx, pool_id, Operation::ReadPool)
                .await
        })
    }

    /// The caller's pools, newest first, each with its progress.
    pub async fn pools(&self, user_id: &str) -> ResultEngine<Vec<(GroupPool, PoolProgress)>> {
        with_tx!(self, |db_tx| {
            let models = group_pools::Entity::find()
                .filter(group_pools::Column::OwnerId.eq(user_id.to_string()))
                .order_by_desc(group_pools::Column::CreatedAt)
                .order_by_desc(group_pools::Column::Id)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                let mut pool = GroupPool::try_from(model)?;
                pool.contributions = self.load_contributions(&db_tx, pool.id).await?;
                let progress = pool.progress()?;
                out.push((pool, progress));
            }
            Ok(out)
        })
    }
}
