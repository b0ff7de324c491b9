use sea_orm::{PaginatorTrait, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    DashboardStats, Friend, FriendSummary, Money, MonthlyStat, Operation, ProfileStats,
    ResultEngine, aggregate, friends, util::ensure_ledger_currency,
};

use super::{Engine, with_tx};

impl Engine {
    /// Net balance between the caller and one friend. Positive: the friend
    /// owes the caller.
    pub async fn net_balance(&self, user_id: &str, friend_id: Uuid) -> ResultEngine<Money> {
        let op = Operation::NetBalance;
        with_tx!(self, |db_tx| {
            self.require_friend_owned(&db_tx, friend_id, user_id, op)
                .await?;
            let lekkas = self.load_user_lekkas(&db_tx, user_id).await?;
            for lekka in &lekkas {
                ensure_ledger_currency(op, self.currency, lekka.amount.currency())?;
            }
            aggregate::net_balance(
                self.currency,
                lekkas.iter().filter(|l| l.friend_id == Some(friend_id)),
            )
        })
    }

    pub async fn dashboard_stats(&self, user_id: &str) -> ResultEngine<DashboardStats> {
        with_tx!(self, |db_tx| {
            let lekkas = self.load_user_lekkas(&db_tx, user_id).await?;
            for lekka in &lekkas {
                ensure_ledger_currency(Operation::Stats, self.currency, lekka.amount.currency())?;
            }
            aggregate::dashboard_stats(self.currency, &lekkas)
        })
    }

    pub async fn friend_stats(&self, user_id: &str, friend_id: Uuid) -> ResultEngine<FriendSummary> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_friend_owned(&db_tx, friend_id, user_id, Operation::Stats)
                .await?;
            let lekkas = self.load_user_lekkas(&db_tx, user_id).await?;
            aggregate::friend_summary(self.currency, Friend::try_from(model)?, &lekkas)
        })
    }

    pub async fn monthly_stats(&self, user_id: &str) -> ResultEngine<Vec<MonthlyStat>> {
        with_tx!(self, |db_tx| {
            let lekkas = self.load_user_lekkas(&db_tx, user_id).await?;
            aggregate::monthly_stats(self.currency, &lekkas)
        })
    }

    pub async fn profile_stats(&self, user_id: &str) -> ResultEngine<ProfileStats> {
        with_tx!(self, |db_tx| {
            let lekkas = self.load_user_lekkas(&db_tx, user_id).await?;
            let total_friends = friends::Entity::find()
                .filter(friends::Column::OwnerId.eq(user_id.to_string()))
                .count(&db_tx)
                .await?;
            Ok(aggregate::profile_stats(&lekkas, total_friends))
        })
    }
}
