//! Friends: the creator's contact book.
//!
//! A friend is just a name and a phone owned by one user. Rollups
//! (`total_lekkas`, `pending_lekkas`, `net_balance`) live in
//! [`FriendSummary`] and are always recomputed from the Lekka set.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, Operation, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Friend {
    pub fn new(owner_id: String, name: String, phone: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            phone,
            created_at: Utc::now(),
        }
    }
}

/// A friend together with rollups derived from the owner's Lekkas.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendSummary {
    pub friend: Friend,
    pub total_lekkas: u64,
    pub pending_lekkas: u64,
    /// Positive: the friend owes the owner. Negative: the owner owes.
    pub net_balance: Money,
}

/// Which friends to list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendFilter {
    #[default]
    All,
    /// Friends with a positive balance (they owe the user).
    Owed,
    /// Friends with a negative balance (the user owes them).
    Owing,
}

impl FriendFilter {
    pub fn keeps(self, summary: &FriendSummary) -> bool {
        match self {
            Self::All => true,
            Self::Owed => summary.net_balance.is_positive(),
            Self::Owing => summary.net_balance.is_negative(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "friends")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Friend> for ActiveModel {
    fn from(friend: &Friend) -> Self {
        Self {
            id: ActiveValue::Set(friend.id.to_string()),
            owner_id: ActiveValue::Set(friend.owner_id.clone()),
            name: ActiveValue::Set(friend.name.clone()),
            phone: ActiveValue::Set(friend.phone.clone()),
            created_at: ActiveValue::Set(friend.created_at),
        }
    }
}

impl TryFrom<Model> for Friend {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, Operation::ReadFriend)?,
            owner_id: model.owner_id,
            name: model.name,
            phone: model.phone,
            created_at: model.created_at,
        })
    }
}
