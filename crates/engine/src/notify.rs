//! Notify port.
//!
//! The engine never talks to SMS/WhatsApp/push itself. It hands a
//! [`Notification`] to the injected [`Notifier`] and lets the caller decide
//! how (and whether) it reaches the counterparty. Implementations must not
//! block for long: the engine calls them while holding its transaction, so an
//! async channel or a queue is the usual backend.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::{ConfirmationToken, LekkaKind, Money};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    /// A new Lekka waits for the counterparty to confirm it.
    ConfirmationLink {
        lekka_id: Uuid,
        token: ConfirmationToken,
        creator_name: String,
        friend_name: String,
        friend_phone: Option<String>,
        kind: LekkaKind,
        amount: Money,
        due_date: Option<NaiveDate>,
    },
    /// The creator nudged the counterparty about a pending Lekka.
    Reminder {
        lekka_id: Uuid,
        token: ConfirmationToken,
        creator_name: String,
        friend_name: String,
        friend_phone: Option<String>,
        amount: Money,
    },
}

impl Notification {
    pub fn lekka_id(&self) -> Uuid {
        match self {
            Self::ConfirmationLink { lekka_id, .. } | Self::Reminder { lekka_id, .. } => *lekka_id,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct NotifyError(pub String);

pub trait Notifier: Send + Sync {
    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        (**self).deliver(notification)
    }
}

/// Drops every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn deliver(&self, _notification: &Notification) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Writes notifications to the log; handy for local runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        match notification {
            Notification::ConfirmationLink {
                lekka_id,
                token,
                creator_name,
                friend_name,
                amount,
                ..
            } => tracing::info!(
                %lekka_id,
                "confirmation link for {friend_name} from {creator_name} ({amount}): /confirm/{token}"
            ),
            Notification::Reminder {
                lekka_id,
                token,
                creator_name,
                friend_name,
                amount,
                ..
            } => tracing::info!(
                %lekka_id,
                "reminder for {friend_name} from {creator_name} ({amount}): /confirm/{token}"
            ),
        }
        Ok(())
    }
}
