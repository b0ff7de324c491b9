//! Mapping between engine values and the wire DTOs in `api_types`.

use api_types::{
    Amount, Currency as ApiCurrency,
    confirmation::ConfirmationView,
    friend::{FriendFilter as ApiFriendFilter, FriendView},
    lekka::{LekkaKind as ApiLekkaKind, LekkaStatus as ApiLekkaStatus, LekkaView, TimelineEntry},
    pool::{ContributionView, PoolStatus as ApiPoolStatus, PoolView, ProgressView},
};
use engine::{
    Contribution, Currency, FriendFilter, FriendSummary, GroupPool, Lekka, LekkaKind,
    LekkaStatus, Money, PoolProgress, PoolStatus,
};

pub(crate) fn currency(value: ApiCurrency) -> Currency {
    match value {
        ApiCurrency::Inr => Currency::Inr,
        ApiCurrency::Eur => Currency::Eur,
        ApiCurrency::Usd => Currency::Usd,
    }
}

fn api_currency(value: Currency) -> ApiCurrency {
    match value {
        Currency::Inr => ApiCurrency::Inr,
        Currency::Eur => ApiCurrency::Eur,
        Currency::Usd => ApiCurrency::Usd,
    }
}

/// Builds an engine amount; a missing currency means the ledger's own.
pub(crate) fn money(minor: i64, requested: Option<ApiCurrency>, ledger: Currency) -> Money {
    Money::new(minor, requested.map(currency).unwrap_or(ledger))
}

pub(crate) fn amount(value: Money) -> Amount {
    Amount {
        minor: value.minor(),
        currency: api_currency(value.currency()),
    }
}

pub(crate) fn kind(value: ApiLekkaKind) -> LekkaKind {
    match value {
        ApiLekkaKind::Lent => LekkaKind::Lent,
        ApiLekkaKind::Borrowed => LekkaKind::Borrowed,
    }
}

fn api_kind(value: LekkaKind) -> ApiLekkaKind {
    match value {
        LekkaKind::Lent => ApiLekkaKind::Lent,
        LekkaKind::Borrowed => ApiLekkaKind::Borrowed,
    }
}

pub(crate) fn status(value: ApiLekkaStatus) -> LekkaStatus {
    match value {
        ApiLekkaStatus::Pending => LekkaStatus::Pending,
        ApiLekkaStatus::Confirmed => LekkaStatus::Confirmed,
        ApiLekkaStatus::Settled => LekkaStatus::Settled,
    }
}

fn api_status(value: LekkaStatus) -> ApiLekkaStatus {
    match value {
        LekkaStatus::Pending => ApiLekkaStatus::Pending,
        LekkaStatus::Confirmed => ApiLekkaStatus::Confirmed,
        LekkaStatus::Settled => ApiLekkaStatus::Settled,
    }
}

pub(crate) fn friend_filter(value: ApiFriendFilter) -> FriendFilter {
    match value {
        ApiFriendFilter::All => FriendFilter::All,
        ApiFriendFilter::Owed => FriendFilter::Owed,
        ApiFriendFilter::Owing => FriendFilter::Owing,
    }
}

pub(crate) fn lekka_view(lekka: Lekka) -> LekkaView {
    let status = lekka.status();
    let confirmation_token = lekka.confirmation_token().map(|t| t.as_str().to_string());
    LekkaView {
        id: lekka.id,
        friend_id: lekka.friend_id,
        friend_name: lekka.friend_name,
        friend_phone: lekka.friend_phone,
        kind: api_kind(lekka.kind),
        amount: amount(lekka.amount),
        description: lekka.description,
        due_date: lekka.due_date,
        status: api_status(status),
        confirmation_token,
        proof_ref: lekka.proof_ref,
        created_at: lekka.created_at,
        timeline: lekka
            .timeline
            .into_iter()
            .map(|event| TimelineEntry {
                action: event.action.as_str().to_string(),
                description: event.description,
                occurred_at: event.occurred_at,
            })
            .collect(),
    }
}

/// List rows leave the timeline out.
pub(crate) fn lekka_row(mut lekka: Lekka) -> LekkaView {
    lekka.timeline.clear();
    lekka_view(lekka)
}

pub(crate) fn confirmation_view(view: engine::ConfirmationView) -> ConfirmationView {
    ConfirmationView {
        lekka_id: view.lekka_id,
        creator_name: view.creator_name,
        friend_name: view.friend_name,
        kind: api_kind(view.kind),
        amount: amount(view.amount),
        description: view.description,
        due_date: view.due_date,
        created_at: view.created_at,
    }
}

pub(crate) fn friend_view(summary: FriendSummary) -> FriendView {
    FriendView {
        id: summary.friend.id,
        name: summary.friend.name,
        phone: summary.friend.phone,
        total_lekkas: summary.total_lekkas,
        pending_lekkas: summary.pending_lekkas,
        net_balance: amount(summary.net_balance),
    }
}

pub(crate) fn progress_view(progress: &PoolProgress) -> ProgressView {
    ProgressView {
        target: amount(progress.target),
        collected: amount(progress.collected),
        remaining: amount(progress.remaining),
        progress_bps: progress.progress_bps,
        funded: progress.is_funded(),
        contributors: progress.contributors,
    }
}

fn contribution_view(contribution: Contribution) -> ContributionView {
    ContributionView {
        contributor: contribution.contributor_ref,
        amount: amount(contribution.amount),
        recorded_by: contribution.recorded_by,
        created_at: contribution.created_at,
    }
}

pub(crate) fn pool_view(pool: GroupPool, progress: &PoolProgress) -> PoolView {
    PoolView {
        id: pool.id,
        name: pool.name,
        description: pool.description,
        status: match pool.status {
            PoolStatus::Active => ApiPoolStatus::Active,
            PoolStatus::Closed => ApiPoolStatus::Closed,
        },
        created_at: pool.created_at,
        closed_at: pool.closed_at,
        progress: progress_view(progress),
        contributions: pool
            .contributions
            .into_iter()
            .map(contribution_view)
            .collect(),
    }
}
