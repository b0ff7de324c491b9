//! The module contains the errors the engine can throw.
//!
//! Every error carries the [`Operation`] it was raised from and, when one is
//! known, the id of the entity involved:
//!
//! - [`Validation`] bad caller input (non-positive amount, past due date,
//!   empty name). Never retried.
//! - [`InvalidState`] the operation is not legal in the current lifecycle or
//!   pool state (e.g. settling a pending Lekka).
//! - [`InvalidToken`] the confirmation link is unknown, already used, expired
//!   or its Lekka was deleted.
//! - [`KeyNotFound`] unknown id, or an id the caller does not own.
//! - [`ConcurrencyConflict`] a concurrent writer won the race; safe to retry
//!   once after re-reading.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`InvalidState`]: EngineError::InvalidState
//!  [`InvalidToken`]: EngineError::InvalidToken
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ConcurrencyConflict`]: EngineError::ConcurrencyConflict
use std::fmt;

use sea_orm::DbErr;
use thiserror::Error;

/// Tag naming the engine operation an error comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    RegisterUser,
    ReadUser,
    CreateLekka,
    UpdateLekka,
    ResolveConfirmation,
    RedeemConfirmation,
    Remind,
    AttachProof,
    Settle,
    DeleteLekka,
    ReadLekka,
    AddFriend,
    UpdateFriend,
    DeleteFriend,
    ReadFriend,
    NetBalance,
    Stats,
    CreatePool,
    Contribute,
    ClosePool,
    ReadPool,
    ParseAmount,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RegisterUser => "register_user",
            Self::ReadUser => "read_user",
            Self::CreateLekka => "create_lekka",
            Self::UpdateLekka => "update_lekka",
            Self::ResolveConfirmation => "resolve_confirmation",
            Self::RedeemConfirmation => "redeem_confirmation",
            Self::Remind => "remind",
            Self::AttachProof => "attach_proof",
            Self::Settle => "settle",
            Self::DeleteLekka => "delete_lekka",
            Self::ReadLekka => "read_lekka",
            Self::AddFriend => "add_friend",
            Self::UpdateFriend => "update_friend",
            Self::DeleteFriend => "delete_friend",
            Self::ReadFriend => "read_friend",
            Self::NetBalance => "net_balance",
            Self::Stats => "stats",
            Self::CreatePool => "create_pool",
            Self::Contribute => "contribute",
            Self::ClosePool => "close_pool",
            Self::ReadPool => "read_pool",
            Self::ParseAmount => "parse_amount",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{op}: invalid input: {reason}")]
    Validation { op: Operation, reason: String },
    #[error("{op}: not allowed on \"{id}\": {reason}")]
    InvalidState {
        op: Operation,
        id: String,
        reason: String,
    },
    #[error("{op}: confirmation link is invalid, expired or already used")]
    InvalidToken { op: Operation },
    #[error("{op}: \"{id}\" key not found!")]
    KeyNotFound { op: Operation, id: String },
    #[error("{op}: concurrent update on \"{id}\", retry")]
    ConcurrencyConflict { op: Operation, id: String },
    #[error("notification failed: {0}")]
    Notify(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    pub(crate) fn validation(op: Operation, reason: impl Into<String>) -> Self {
        Self::Validation {
            op,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_state(
        op: Operation,
        id: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidState {
            op,
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(op: Operation, id: impl ToString) -> Self {
        Self::KeyNotFound {
            op,
            id: id.to_string(),
        }
    }

    pub(crate) fn conflict(op: Operation, id: impl ToString) -> Self {
        Self::ConcurrencyConflict {
            op,
            id: id.to_string(),
        }
    }

    /// The operation the error was raised from, if it carries one.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Validation { op, .. }
            | Self::InvalidState { op, .. }
            | Self::InvalidToken { op }
            | Self::KeyNotFound { op, .. }
            | Self::ConcurrencyConflict { op, .. } => Some(*op),
            Self::Notify(_) | Self::Database(_) => None,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Validation { op: a, reason: ra },
                Self::Validation { op: b, reason: rb },
            ) => a == b && ra == rb,
            (
                Self::InvalidState {
                    op: a,
                    id: ia,
                    reason: ra,
                },
                Self::InvalidState {
                    op: b,
                    id: ib,
                    reason: rb,
                },
            ) => a == b && ia == ib && ra == rb,
            (Self::InvalidToken { op: a }, Self::InvalidToken { op: b }) => a == b,
            (Self::KeyNotFound { op: a, id: ia }, Self::KeyNotFound { op: b, id: ib }) => {
                a == b && ia == ib
            }
            (
                Self::ConcurrencyConflict { op: a, id: ia },
                Self::ConcurrencyConflict { op: b, id: ib },
            ) => a == b && ia == ib,
            (Self::Notify(a), Self::Notify(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
