//! Lekka timeline.
//!
//! Append-only audit trail of what happened to a Lekka. Events are only ever
//! inserted; they disappear together with their Lekka on deletion.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Operation, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineAction {
    Created,
    Updated,
    Confirmed,
    ReminderSent,
    ProofAttached,
    Settled,
}

impl TimelineAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Confirmed => "confirmed",
            Self::ReminderSent => "reminder_sent",
            Self::ProofAttached => "proof_attached",
            Self::Settled => "settled",
        }
    }
}

impl TryFrom<&str> for TimelineAction {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            "confirmed" => Ok(Self::Confirmed),
            "reminder_sent" => Ok(Self::ReminderSent),
            "proof_attached" => Ok(Self::ProofAttached),
            "settled" => Ok(Self::Settled),
            other => Err(EngineError::validation(
                Operation::ReadLekka,
                format!("invalid timeline action: {other}"),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: Uuid,
    pub lekka_id: Uuid,
    /// Position in the timeline, starting at 0.
    pub seq: i32,
    pub action: TimelineAction,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

impl TimelineEvent {
    pub fn new(
        lekka_id: Uuid,
        seq: i32,
        action: TimelineAction,
        description: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            lekka_id,
            seq,
            action,
            description: description.into(),
            occurred_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lekka_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub lekka_id: String,
    pub seq: i32,
    pub action: String,
    pub description: String,
    pub occurred_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lekkas::Entity",
        from = "Column::LekkaId",
        to = "super::lekkas::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Lekkas,
}

impl Related<super::lekkas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lekkas.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TimelineEvent> for ActiveModel {
    fn from(event: &TimelineEvent) -> Self {
        Self {
            id: ActiveValue::Set(event.id.to_string()),
            lekka_id: ActiveValue::Set(event.lekka_id.to_string()),
            seq: ActiveValue::Set(event.seq),
            action: ActiveValue::Set(event.action.as_str().to_string()),
            description: ActiveValue::Set(event.description.clone()),
            occurred_at: ActiveValue::Set(event.occurred_at),
        }
    }
}

impl TryFrom<Model> for TimelineEvent {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, Operation::ReadLekka)?,
            lekka_id: parse_uuid(&model.lekka_id, Operation::ReadLekka)?,
            seq: model.seq,
            action: TimelineAction::try_from(model.action.as_str())?,
            description: model.description,
            occurred_at: model.occurred_at,
        })
    }
}
