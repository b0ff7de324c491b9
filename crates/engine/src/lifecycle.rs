//! Lekka lifecycle state machine.
//!
//! ```text
//!   Pending ──confirm──▶ Confirmed ──settle──▶ Settled
//!     │  ▲                  │
//!     └──┘ remind, edit     └── attach proof (stays Confirmed)
//! ```
//!
//! Deletion is not a status: the record is removed from any state.
//! `Pending` is the only state holding a confirmation token and the only one
//! excluded from balance math.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ConfirmationToken, EngineError, Operation};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LekkaStatus {
    Pending,
    Confirmed,
    Settled,
}

impl LekkaStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Settled => "settled",
        }
    }

    /// Whether the counterparty has acknowledged the debt.
    pub fn is_binding(self) -> bool {
        matches!(self, Self::Confirmed | Self::Settled)
    }
}

impl TryFrom<&str> for LekkaStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "settled" => Ok(Self::Settled),
            other => Err(EngineError::validation(
                Operation::ReadLekka,
                format!("invalid lekka status: {other}"),
            )),
        }
    }
}

/// Operations that consult the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Confirm,
    Remind,
    Edit,
    AttachProof,
    Settle,
}

impl Transition {
    fn operation(self) -> Operation {
        match self {
            Self::Confirm => Operation::RedeemConfirmation,
            Self::Remind => Operation::Remind,
            Self::Edit => Operation::UpdateLekka,
            Self::AttachProof => Operation::AttachProof,
            Self::Settle => Operation::Settle,
        }
    }
}

/// Returns the status reached by applying `transition` to `from`, or the
/// reason the edge does not exist.
pub fn next_status(from: LekkaStatus, transition: Transition) -> Result<LekkaStatus, &'static str> {
    use LekkaStatus::*;
    use Transition::*;

    match (from, transition) {
        (Pending, Confirm) => Ok(Confirmed),
        (Pending, Remind) => Ok(Pending),
        (Pending, Edit) => Ok(Pending),
        (Confirmed, AttachProof) => Ok(Confirmed),
        (Confirmed, Settle) => Ok(Settled),
        (Pending, AttachProof) | (Pending, Settle) => Err("lekka is not confirmed yet"),
        (Confirmed, Confirm) | (Settled, Confirm) => Err("lekka is already confirmed"),
        (Confirmed, Remind) | (Settled, Remind) => Err("reminders are only sent while pending"),
        (Confirmed, Edit) | (Settled, Edit) => Err("lekka is immutable once confirmed"),
        (Settled, AttachProof) | (Settled, Settle) => Err("lekka is already settled"),
    }
}

/// [`next_status`] with the rejection mapped to an engine error for `id`.
pub(crate) fn advance(
    id: impl ToString,
    from: LekkaStatus,
    transition: Transition,
) -> Result<LekkaStatus, EngineError> {
    next_status(from, transition)
        .map_err(|reason| EngineError::invalid_state(transition.operation(), id, reason))
}

/// Current state of a Lekka, carrying the token only where it may exist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LekkaState {
    Pending {
        token: ConfirmationToken,
        issued_at: DateTime<Utc>,
    },
    Confirmed,
    Settled,
}

impl LekkaState {
    pub fn status(&self) -> LekkaStatus {
        match self {
            Self::Pending { .. } => LekkaStatus::Pending,
            Self::Confirmed => LekkaStatus::Confirmed,
            Self::Settled => LekkaStatus::Settled,
        }
    }

    pub fn token(&self) -> Option<&ConfirmationToken> {
        match self {
            Self::Pending { token, .. } => Some(token),
            Self::Confirmed | Self::Settled => None,
        }
    }

    /// Rebuilds a state from stored columns, refusing rows that break the
    /// token/status pairing.
    pub(crate) fn from_parts(
        status: LekkaStatus,
        token: Option<ConfirmationToken>,
        issued_at: Option<DateTime<Utc>>,
    ) -> Option<Self> {
        match (status, token, issued_at) {
            (LekkaStatus::Pending, Some(token), Some(issued_at)) => {
                Some(Self::Pending { token, issued_at })
            }
            (LekkaStatus::Confirmed, None, _) => Some(Self::Confirmed),
            (LekkaStatus::Settled, None, _) => Some(Self::Settled),
            _ => None,
        }
    }
}
