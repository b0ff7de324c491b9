//! Lekka primitives.
//!
//! A `Lekka` is one informal debt recorded by its creator. `kind` is read from
//! the creator's side: `Lent` means the creator is owed, `Borrowed` means the
//! creator owes. The counterparty's name and phone are snapshotted at creation
//! time and never rewritten by contact edits.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ConfirmationToken, EngineError, LekkaState, LekkaStatus, Money, Operation,
    lekka_events::TimelineEvent,
    util::{model_currency, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LekkaKind {
    Lent,
    Borrowed,
}

impl LekkaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lent => "lent",
            Self::Borrowed => "borrowed",
        }
    }

    /// `+1` when the creator is owed, `-1` when the creator owes.
    pub fn sign(self) -> i64 {
        match self {
            Self::Lent => 1,
            Self::Borrowed => -1,
        }
    }
}

impl TryFrom<&str> for LekkaKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "lent" => Ok(Self::Lent),
            "borrowed" => Ok(Self::Borrowed),
            other => Err(EngineError::validation(
                Operation::ReadLekka,
                format!("invalid lekka kind: {other}"),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lekka {
    pub id: Uuid,
    pub creator_id: String,
    pub friend_id: Option<Uuid>,
    pub friend_name: String,
    pub friend_phone: Option<String>,
    pub kind: LekkaKind,
    pub amount: Money,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub state: LekkaState,
    pub proof_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Empty unless loaded through a detail read.
    pub timeline: Vec<TimelineEvent>,
}

impl Lekka {
    pub fn status(&self) -> LekkaStatus {
        self.state.status()
    }

    pub fn confirmation_token(&self) -> Option<&ConfirmationToken> {
        self.state.token()
    }

    /// Signed effect on the creator's balance: zero while pending.
    pub fn signed_minor(&self) -> i64 {
        if self.status().is_binding() {
            self.kind.sign() * self.amount.minor()
        } else {
            0
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lekkas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub creator_id: String,
    pub friend_id: Option<String>,
    pub friend_name: String,
    pub friend_phone: Option<String>,
    pub kind: String,
    pub amount_minor: i64,
    pub currency: String,
    pub description: Option<String>,
    pub due_date: Option<Date>,
    pub status: String,
    #[sea_orm(unique)]
    pub confirmation_token: Option<String>,
    pub token_issued_at: Option<DateTimeUtc>,
    pub proof_ref: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::lekka_events::Entity")]
    Events,
}

impl Related<super::lekka_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Lekka> for ActiveModel {
    fn from(lekka: &Lekka) -> Self {
        let (token, issued_at) = match &lekka.state {
            LekkaState::Pending { token, issued_at } => {
                (Some(token.as_str().to_string()), Some(*issued_at))
            }
            LekkaState::Confirmed | LekkaState::Settled => (None, None),
        };
        Self {
            id: ActiveValue::Set(lekka.id.to_string()),
            creator_id: ActiveValue::Set(lekka.creator_id.clone()),
            friend_id: ActiveValue::Set(lekka.friend_id.map(|id| id.to_string())),
            friend_name: ActiveValue::Set(lekka.friend_name.clone()),
            friend_phone: ActiveValue::Set(lekka.friend_phone.clone()),
            kind: ActiveValue::Set(lekka.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(lekka.amount.minor()),
            currency: ActiveValue::Set(lekka.amount.currency().code().to_string()),
            description: ActiveValue::Set(lekka.description.clone()),
            due_date: ActiveValue::Set(lekka.due_date),
            status: ActiveValue::Set(lekka.status().as_str().to_string()),
            confirmation_token: ActiveValue::Set(token),
            token_issued_at: ActiveValue::Set(issued_at),
            proof_ref: ActiveValue::Set(lekka.proof_ref.clone()),
            created_at: ActiveValue::Set(lekka.created_at),
        }
    }
}

impl TryFrom<Model> for Lekka {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let status = LekkaStatus::try_from(model.status.as_str())?;
        let token = model
            .confirmation_token
            .as_deref()
            .map(|raw| {
                ConfirmationToken::parse(raw).ok_or_else(|| {
                    EngineError::invalid_state(
                        Operation::ReadLekka,
                        &model.id,
                        "stored confirmation token is malformed",
                    )
                })
            })
            .transpose()?;
        let state = LekkaState::from_parts(status, token, model.token_issued_at).ok_or_else(
            || {
                EngineError::invalid_state(
                    Operation::ReadLekka,
                    &model.id,
                    "confirmation token does not match status",
                )
            },
        )?;

        Ok(Self {
            id: parse_uuid(&model.id, Operation::ReadLekka)?,
            creator_id: model.creator_id,
            friend_id: model
                .friend_id
                .as_deref()
                .map(|id| parse_uuid(id, Operation::ReadLekka))
                .transpose()?,
            friend_name: model.friend_name,
            friend_phone: model.friend_phone,
            kind: LekkaKind::try_from(model.kind.as_str())?,
            amount: Money::new(model.amount_minor, model_currency(&model.currency)?),
            description: model.description,
            due_date: model.due_date,
            state,
            proof_ref: model.proof_ref,
            created_at: model.created_at,
            timeline: Vec::new(),
        })
    }
}
