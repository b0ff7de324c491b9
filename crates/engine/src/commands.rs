//! Command structs for engine operations.
//!
//! These types group parameters for write operations
//! (create/update a Lekka, create a pool, contribute), keeping call sites
//! readable and avoiding long argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{LekkaKind, Money};

/// Counterparty of a new Lekka.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FriendRef {
    /// A contact already in the creator's friend list.
    Existing(Uuid),
    /// Someone not (yet) saved as a contact.
    New { name: String, phone: Option<String> },
}

impl FriendRef {
    #[must_use]
    pub fn new_contact(name: impl Into<String>, phone: Option<String>) -> Self {
        Self::New {
            name: name.into(),
            phone,
        }
    }
}

/// Create a Lekka.
#[derive(Clone, Debug)]
pub struct CreateLekkaCmd {
    pub user_id: String,
    pub friend: FriendRef,
    pub kind: LekkaKind,
    pub amount: Money,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl CreateLekkaCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, friend: FriendRef, kind: LekkaKind, amount: Money) -> Self {
        Self {
            user_id: user_id.into(),
            friend,
            kind,
            amount,
            description: None,
            due_date: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Edit a pending Lekka. Unset fields are left unchanged.
#[derive(Clone, Debug)]
pub struct UpdateLekkaCmd {
    pub user_id: String,
    pub lekka_id: Uuid,
    pub amount: Option<Money>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl UpdateLekkaCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, lekka_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            lekka_id,
            amount: None,
            description: None,
            due_date: None,
        }
    }

    #[must_use]
    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.amount.is_none() && self.description.is_none() && self.due_date.is_none()
    }
}

/// Create a group pool.
#[derive(Clone, Debug)]
pub struct CreatePoolCmd {
    pub user_id: String,
    pub name: String,
    pub target: Money,
    pub description: Option<String>,
}

impl CreatePoolCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, target: Money) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            target,
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Append a contribution to a pool.
#[derive(Clone, Debug)]
pub struct ContributeCmd {
    /// The user recording the contribution.
    pub user_id: String,
    pub pool_id: Uuid,
    pub contributor_ref: String,
    pub amount: Money,
}

impl ContributeCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        pool_id: Uuid,
        contributor_ref: impl Into<String>,
        amount: Money,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            pool_id,
            contributor_ref: contributor_ref.into(),
            amount,
        }
    }
}
