//! Lekka ledger engine.
//!
//! Records informal debts between people, drives each one through its
//! confirmation lifecycle and derives balances from the confirmed set. Group
//! pools track contributions toward a target.
//!
//! The engine owns no I/O of its own besides the `sea-orm` connection it is
//! built with and the [`Notifier`] it hands out-of-band messages to.

pub use aggregate::{Counterparty, DashboardStats, MonthlyStat, ProfileStats};
pub use commands::{ContributeCmd, CreateLekkaCmd, CreatePoolCmd, FriendRef, UpdateLekkaCmd};
pub use contributions::Contribution;
pub use currency::Currency;
pub use error::{EngineError, Operation};
pub use friends::{Friend, FriendFilter, FriendSummary};
pub use group_pools::{FULL_PROGRESS_BPS, GroupPool, PoolProgress, PoolStatus};
pub use lekka_events::{TimelineAction, TimelineEvent};
pub use lekkas::{Lekka, LekkaKind};
pub use lifecycle::{LekkaState, LekkaStatus, Transition, next_status};
pub use money::Money;
pub use notify::{LogNotifier, NoopNotifier, Notification, Notifier, NotifyError};
pub use ops::{ConfirmationView, Engine, EngineBuilder, LekkaListFilter};
pub use token::{ConfirmationToken, MaxAge, NoExpiry, TokenPolicy};
pub use users::User;

pub mod aggregate;
mod commands;
mod contributions;
mod currency;
mod error;
mod friends;
mod group_pools;
mod lekka_events;
mod lekkas;
mod lifecycle;
mod money;
mod notify;
mod ops;
mod token;
mod users;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
