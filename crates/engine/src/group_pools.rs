//! Group pools.
//!
//! A pool collects contributions toward a target amount. The contribution log
//! is the only source of truth: `collected` and friends are derived by
//! [`PoolProgress::compute`] and never stored.
//!
//! Closing is one-way (`Active → Closed`). Every mutation bumps `version`, and
//! writers only succeed against the version they read, so a contribution and a
//! close racing on the same pool cannot both win silently.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Money, Operation, ResultEngine,
    contributions::Contribution,
    util::{model_currency, parse_uuid},
};

/// 100% expressed in basis points.
pub const FULL_PROGRESS_BPS: u32 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolStatus {
    Active,
    Closed,
}

impl PoolStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }
}

impl TryFrom<&str> for PoolStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "closed" => Ok(Self::Closed),
            other => Err(EngineError::validation(
                Operation::ReadPool,
                format!("invalid pool status: {other}"),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPool {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub target: Money,
    pub status: PoolStatus,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Oldest first. Empty unless loaded through a detail read.
    pub contributions: Vec<Contribution>,
}

impl GroupPool {
    pub fn new(
        owner_id: String,
        name: String,
        description: Option<String>,
        target: Money,
    ) -> ResultEngine<Self> {
        if !target.is_positive() {
            return Err(EngineError::validation(
                Operation::CreatePool,
                "target amount must be > 0",
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            description,
            target,
            status: PoolStatus::Active,
            version: 0,
            created_at: Utc::now(),
            closed_at: None,
            contributions: Vec::new(),
        })
    }

    pub fn progress(&self) -> ResultEngine<PoolProgress> {
        PoolProgress::compute(self.target, &self.contributions)
    }
}

/// Funding state of a pool, derived from its contribution log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolProgress {
    pub target: Money,
    pub collected: Money,
    /// `max(target - collected, 0)`.
    pub remaining: Money,
    /// `min(collected / target, 1)` in basis points (`0..=10_000`).
    pub progress_bps: u32,
    /// Distinct contributor refs.
    pub contributors: u64,
}

impl PoolProgress {
    pub fn compute(target: Money, contributions: &[Contribution]) -> ResultEngine<Self> {
        let overflow = || EngineError::validation(Operation::ReadPool, "pool total overflows");

        let collected = Money::checked_sum(
            target.currency(),
            contributions.iter().map(|c| c.amount),
        )
        .ok_or_else(overflow)?;

        let remaining = target
            .checked_sub(collected)
            .ok_or_else(overflow)?
            .minor()
            .max(0);

        let progress_bps = if collected.minor() >= target.minor() {
            FULL_PROGRESS_BPS
        } else {
            // collected < target here, so the ratio stays below 10_000.
            let bps = i128::from(collected.minor().max(0)) * i128::from(FULL_PROGRESS_BPS)
                / i128::from(target.minor());
            u32::try_from(bps).map_err(|_| overflow())?
        };

        let contributors = contributions
            .iter()
            .map(|c| c.contributor_ref.as_str())
            .collect::<HashSet<_>>()
            .len() as u64;

        Ok(Self {
            target,
            collected,
            remaining: Money::new(remaining, target.currency()),
            progress_bps,
            contributors,
        })
    }

    /// Progress as a fraction in `0.0..=1.0`, for presentation.
    pub fn as_fraction(&self) -> f64 {
        f64::from(self.progress_bps) / f64::from(FULL_PROGRESS_BPS)
    }

    pub fn is_funded(&self) -> bool {
        self.progress_bps == FULL_PROGRESS_BPS
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "group_pools")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub target_minor: i64,
    pub currency: String,
    pub status: String,
    pub version: i64,
    pub created_at: DateTimeUtc,
    pub closed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::contributions::Entity")]
    Contributions,
}

impl Related<super::contributions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contributions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&GroupPool> for ActiveModel {
    fn from(pool: &GroupPool) -> Self {
        Self {
            id: ActiveValue::Set(pool.id.to_string()),
            owner_id: ActiveValue::Set(pool.owner_id.clone()),
            name: ActiveValue::Set(pool.name.clone()),
            description: ActiveValue::Set(pool.description.clone()),
            target_minor: ActiveValue::Set(pool.target.minor()),
            currency: ActiveValue::Set(pool.target.currency().code().to_string()),
            status: ActiveValue::Set(pool.status.as_str().to_string()),
            version: ActiveValue::Set(pool.version),
            created_at: ActiveValue::Set(pool.created_at),
            closed_at: ActiveValue::Set(pool.closed_at),
        }
    }
}

impl TryFrom<Model> for GroupPool {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, Operation::ReadPool)?,
            owner_id: model.owner_id,
            name: model.name,
            description: model.description,
            target: Money::new(model.target_minor, model_currency(&model.currency)?),
            status: PoolStatus::try_from(model.status.as_str())?,
            version: model.version,
            created_at: model.created_at,
            closed_at: model.closed_at,
            contributions: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Currency;

    fn contribution(who: &str, minor: i64) -> Contribution {
        Contribution::new(Uuid::nil(), who.to_string(), Money::new(minor, Currency::Inr), "owner".to_string())
    }

    #[test]
    fn partial_funding() {
        let target = Money::new(5000, Currency::Inr);
        let log = [contribution("asha", 2000), contribution("ravi", 2000)];
        let progress = PoolProgress::compute(target, &log).unwrap();
        assert_eq!(progress.collected.minor(), 4000);
        assert_eq!(progress.remaining.minor(), 1000);
        assert_eq!(progress.progress_bps, 8000);
        assert_eq!(progress.as_fraction(), 0.8);
        assert_eq!(progress.contributors, 2);
        assert!(!progress.is_funded());
    }

    #[test]
    fn overfunding_clamps() {
        let target = Money::new(5000, Currency::Inr);
        let log = [
            contribution("asha", 2000),
            contribution("ravi", 2000),
            contribution("asha", 2000),
        ];
        let progress = PoolProgress::compute(target, &log).unwrap();
        assert_eq!(progress.collected.minor(), 6000);
        assert_eq!(progress.remaining.minor(), 0);
        assert_eq!(progress.progress_bps, FULL_PROGRESS_BPS);
        assert_eq!(progress.contributors, 2);
        assert!(progress.is_funded());
    }

    #[test]
    fn empty_log_is_zero_progress() {
        let target = Money::new(300, Currency::Inr);
        let progress = PoolProgress::compute(target, &[]).unwrap();
        assert_eq!(progress.collected.minor(), 0);
        assert_eq!(progress.remaining, target);
        assert_eq!(progress.progress_bps, 0);
    }

    #[test]
    fn progress_rounds_down() {
        let target = Money::new(3, Currency::Inr);
        let progress = PoolProgress::compute(target, &[contribution("a", 1)]).unwrap();
        assert_eq!(progress.progress_bps, 3333);
    }

    #[test]
    fn new_pool_rejects_non_positive_target() {
        let err = GroupPool::new("o".into(), "Trip".into(), None, Money::new(0, Currency::Inr))
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation { op: Operation::CreatePool, .. }));
    }
}
