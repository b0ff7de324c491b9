use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Inr,
    Eur,
    Usd,
}

/// An amount in integer minor units (e.g. paise) with its currency code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub minor: i64,
    pub currency: Currency,
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserRegister {
        pub display_name: String,
        pub phone: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: String,
        pub display_name: String,
        pub phone: Option<String>,
    }
}

pub mod lekka {
    use super::*;

    /// Read from the creator's side: `lent` means the creator is owed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum LekkaKind {
        Lent,
        Borrowed,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum LekkaStatus {
        Pending,
        Confirmed,
        Settled,
    }

    /// Request body for creating a Lekka.
    ///
    /// Either `friend_id` (a saved contact) or `friend_name` (someone new,
    /// optionally with `friend_phone`) must be given.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct LekkaNew {
        pub friend_id: Option<Uuid>,
        pub friend_name: Option<String>,
        pub friend_phone: Option<String>,
        pub kind: LekkaKind,
        pub amount_minor: i64,
        pub currency: Option<Currency>,
        pub description: Option<String>,
        pub due_date: Option<NaiveDate>,
    }

    /// Request body for editing a pending Lekka. Absent fields are kept.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct LekkaUpdate {
        pub amount_minor: Option<i64>,
        pub currency: Option<Currency>,
        pub description: Option<String>,
        pub due_date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LekkaListQuery {
        pub status: Option<LekkaStatus>,
        pub kind: Option<LekkaKind>,
        pub friend_id: Option<Uuid>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProofAttach {
        /// Opaque reference produced by the blob store.
        pub proof_ref: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TimelineEntry {
        pub action: String,
        pub description: String,
        pub occurred_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LekkaView {
        pub id: Uuid,
        pub friend_id: Option<Uuid>,
        pub friend_name: String,
        pub friend_phone: Option<String>,
        pub kind: LekkaKind,
        pub amount: Amount,
        pub description: Option<String>,
        pub due_date: Option<NaiveDate>,
        pub status: LekkaStatus,
        /// Present only while the Lekka is pending.
        pub confirmation_token: Option<String>,
        pub proof_ref: Option<String>,
        pub created_at: DateTime<Utc>,
        /// Empty in list responses.
        pub timeline: Vec<TimelineEntry>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LekkaListResponse {
        pub lekkas: Vec<LekkaView>,
    }
}

pub mod confirmation {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ConfirmationView {
        pub lekka_id: Uuid,
        pub creator_name: String,
        pub friend_name: String,
        pub kind: lekka::LekkaKind,
        pub amount: Amount,
        pub description: Option<String>,
        pub due_date: Option<NaiveDate>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ConfirmationRedeem {
        /// Name the confirming person wants to appear under.
        pub display_name: Option<String>,
    }
}

pub mod friend {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum FriendFilter {
        #[default]
        All,
        Owed,
        Owing,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FriendNew {
        pub name: String,
        pub phone: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FriendUpdate {
        pub name: Option<String>,
        pub phone: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FriendListQuery {
        pub filter: Option<FriendFilter>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FriendView {
        pub id: Uuid,
        pub name: String,
        pub phone: Option<String>,
        pub total_lekkas: u64,
        pub pending_lekkas: u64,
        /// Positive: the friend owes the caller.
        pub net_balance: Amount,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FriendListResponse {
        pub friends: Vec<FriendView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub friend_id: Uuid,
        pub net_balance: Amount,
    }
}

pub mod pool {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PoolStatus {
        Active,
        Closed,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PoolNew {
        pub name: String,
        pub description: Option<String>,
        pub target_minor: i64,
        pub currency: Option<Currency>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContributionNew {
        pub contributor: String,
        pub amount_minor: i64,
        pub currency: Option<Currency>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContributionView {
        pub contributor: String,
        pub amount: Amount,
        pub recorded_by: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProgressView {
        pub target: Amount,
        pub collected: Amount,
        pub remaining: Amount,
        /// `0..=10000`, clamped at 10000 when overfunded.
        pub progress_bps: u32,
        pub funded: bool,
        pub contributors: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PoolView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub status: PoolStatus,
        pub created_at: DateTime<Utc>,
        pub closed_at: Option<DateTime<Utc>>,
        pub progress: ProgressView,
        /// Oldest first. Empty in list responses.
        pub contributions: Vec<ContributionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PoolListResponse {
        pub pools: Vec<PoolView>,
    }
}

pub mod stats {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardStats {
        pub total_lekkas: u64,
        pub pending_lekkas: u64,
        pub net_balance: Amount,
        pub total_tracked: Amount,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyStat {
        pub year: i32,
        pub month: u32,
        pub count: u64,
        pub lent: Amount,
        pub borrowed: Amount,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyStatsResponse {
        pub months: Vec<MonthlyStat>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileStats {
        pub total_lekkas: u64,
        pub total_friends: u64,
        pub settled_lekkas: u64,
    }
}
