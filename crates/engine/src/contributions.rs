//! Pool contributions: append-only, never edited or removed.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Money, Operation,
    util::{model_currency, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: Uuid,
    pub pool_id: Uuid,
    /// Who the money came from, as given by the caller (name, phone, user id).
    pub contributor_ref: String,
    pub amount: Money,
    /// The user who recorded the contribution.
    pub recorded_by: String,
    /// Position in the pool log, starting at 0.
    pub seq: i32,
    pub created_at: DateTime<Utc>,
}

impl Contribution {
    pub fn new(pool_id: Uuid, contributor_ref: String, amount: Money, recorded_by: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            pool_id,
            contributor_ref,
            amount,
            recorded_by,
            seq: 0,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "contributions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub pool_id: String,
    pub contributor_ref: String,
    pub amount_minor: i64,
    pub currency: String,
    pub recorded_by: String,
    pub seq: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::group_pools::Entity",
        from = "Column::PoolId",
        to = "super::group_pools::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    GroupPools,
}

impl Related<super::group_pools::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupPools.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Contribution> for ActiveModel {
    fn from(c: &Contribution) -> Self {
        Self {
            id: ActiveValue::Set(c.id.to_string()),
            pool_id: ActiveValue::Set(c.pool_id.to_string()),
            contributor_ref: ActiveValue::Set(c.contributor_ref.clone()),
            amount_minor: ActiveValue::Set(c.amount.minor()),
            currency: ActiveValue::Set(c.amount.currency().code().to_string()),
            recorded_by: ActiveValue::Set(c.recorded_by.clone()),
            seq: ActiveValue::Set(c.seq),
            created_at: ActiveValue::Set(c.created_at),
        }
    }
}

impl TryFrom<Model> for Contribution {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, Operation::ReadPool)?,
            pool_id: parse_uuid(&model.pool_id, Operation::ReadPool)?,
            contributor_ref: model.contributor_ref,
            amount: Money::new(model.amount_minor, model_currency(&model.currency)?),
            recorded_by: model.recorded_by,
            seq: model.seq,
            created_at: model.created_at,
        })
    }
}
