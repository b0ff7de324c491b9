//! Balance aggregation.
//!
//! Everything here is a pure function over a slice of Lekkas belonging to one
//! user. Nothing is cached or stored: the engine loads the Lekka set inside a
//! transaction and recomputes on every read.
//!
//! Sign convention: a positive balance means the user is owed, a negative one
//! means the user owes. Pending Lekkas never move a balance but are counted.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, EngineError, Friend, FriendSummary, Lekka, LekkaKind, LekkaStatus, Money,
    Operation, ResultEngine,
};

/// Who a Lekka is with, as far as grouping is concerned.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Counterparty {
    Friend(Uuid),
    /// Not linked to a contact: keyed by the phone snapshot, or the name
    /// snapshot when no phone was given.
    Unlinked(String),
}

impl Counterparty {
    pub fn of(lekka: &Lekka) -> Self {
        match lekka.friend_id {
            Some(id) => Self::Friend(id),
            None => Self::Unlinked(
                lekka
                    .friend_phone
                    .clone()
                    .unwrap_or_else(|| lekka.friend_name.trim().to_lowercase()),
            ),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_lekkas: u64,
    pub net_balance: Money,
    pub pending_lekkas: u64,
    /// Sum of amounts over every Lekka regardless of status.
    pub total_tracked: Money,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyStat {
    pub year: i32,
    pub month: u32,
    pub count: u64,
    pub lent: Money,
    pub borrowed: Money,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStats {
    pub total_lekkas: u64,
    pub total_friends: u64,
    pub settled_lekkas: u64,
}

fn overflow(op: Operation) -> EngineError {
    EngineError::validation(op, "balance overflows")
}

fn add(op: Operation, acc: Money, amount: Money) -> ResultEngine<Money> {
    acc.checked_add(amount).ok_or_else(|| overflow(op))
}

/// Signed contribution of one Lekka to its creator's balance.
fn signed(lekka: &Lekka) -> Money {
    Money::new(lekka.signed_minor(), lekka.amount.currency())
}

/// Net balance over `lekkas`, excluding pending ones.
pub fn net_balance<'a, I>(currency: Currency, lekkas: I) -> ResultEngine<Money>
where
    I: IntoIterator<Item = &'a Lekka>,
{
    lekkas
        .into_iter()
        .filter(|l| l.status().is_binding())
        .try_fold(Money::zero(currency), |acc, l| {
            add(Operation::NetBalance, acc, signed(l))
        })
}

/// Net balance per counterparty.
pub fn balances_by_counterparty(
    currency: Currency,
    lekkas: &[Lekka],
) -> ResultEngine<BTreeMap<Counterparty, Money>> {
    let mut out: BTreeMap<Counterparty, Money> = BTreeMap::new();
    for lekka in lekkas {
        let entry = out
            .entry(Counterparty::of(lekka))
            .or_insert(Money::zero(currency));
        if lekka.status().is_binding() {
            *entry = add(Operation::NetBalance, *entry, signed(lekka))?;
        }
    }
    Ok(out)
}

pub fn dashboard_stats(currency: Currency, lekkas: &[Lekka]) -> ResultEngine<DashboardStats> {
    let op = Operation::Stats;
    let per_counterparty = balances_by_counterparty(currency, lekkas)?;
    let net_balance = Money::checked_sum(currency, per_counterparty.into_values())
        .ok_or_else(|| overflow(op))?;
    let total_tracked =
        Money::checked_sum(currency, lekkas.iter().map(|l| l.amount)).ok_or_else(|| overflow(op))?;
    let pending_lekkas = lekkas
        .iter()
        .filter(|l| l.status() == LekkaStatus::Pending)
        .count() as u64;

    Ok(DashboardStats {
        total_lekkas: lekkas.len() as u64,
        net_balance,
        pending_lekkas,
        total_tracked,
    })
}

/// Rollups for one friend; `lekkas` may hold the user's whole set.
pub fn friend_summary(
    currency: Currency,
    friend: Friend,
    lekkas: &[Lekka],
) -> ResultEngine<FriendSummary> {
    let linked: Vec<&Lekka> = lekkas
        .iter()
        .filter(|l| l.friend_id == Some(friend.id))
        .collect();
    let pending_lekkas = linked
        .iter()
        .filter(|l| l.status() == LekkaStatus::Pending)
        .count() as u64;
    Ok(FriendSummary {
        total_lekkas: linked.len() as u64,
        pending_lekkas,
        net_balance: net_balance(currency, linked.iter().copied())?,
        friend,
    })
}

/// Per calendar month (UTC, by creation time), newest month first.
pub fn monthly_stats(currency: Currency, lekkas: &[Lekka]) -> ResultEngine<Vec<MonthlyStat>> {
    let op = Operation::Stats;
    let mut months: BTreeMap<(i32, u32), MonthlyStat> = BTreeMap::new();
    for lekka in lekkas {
        let key = (lekka.created_at.year(), lekka.created_at.month());
        let stat = months.entry(key).or_insert(MonthlyStat {
            year: key.0,
            month: key.1,
            count: 0,
            lent: Money::zero(currency),
            borrowed: Money::zero(currency),
        });
        stat.count += 1;
        match lekka.kind {
            LekkaKind::Lent => stat.lent = add(op, stat.lent, lekka.amount)?,
            LekkaKind::Borrowed => stat.borrowed = add(op, stat.borrowed, lekka.amount)?,
        }
    }
    Ok(months.into_values().rev().collect())
}

pub fn profile_stats(lekkas: &[Lekka], total_friends: u64) -> ProfileStats {
    ProfileStats {
        total_lekkas: lekkas.len() as u64,
        total_friends,
        settled_lekkas: lekkas
            .iter()
            .filter(|l| l.status() == LekkaStatus::Settled)
            .count() as u64,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{ConfirmationToken, LekkaState};

    fn lekka(friend: Option<Uuid>, kind: LekkaKind, minor: i64, status: LekkaStatus) -> Lekka {
        let state = match status {
            LekkaStatus::Pending => LekkaState::Pending {
                token: ConfirmationToken::generate(),
                issued_at: Utc::now(),
            },
            LekkaStatus::Confirmed => LekkaState::Confirmed,
            LekkaStatus::Settled => LekkaState::Settled,
        };
        Lekka {
            id: Uuid::new_v4(),
            creator_id: "me".to_string(),
            friend_id: friend,
            friend_name: "Ravi".to_string(),
            friend_phone: None,
            kind,
            amount: Money::new(minor, Currency::Inr),
            description: None,
            due_date: None,
            state,
            proof_ref: None,
            created_at: Utc::now(),
            timeline: Vec::new(),
        }
    }

    #[test]
    fn pending_never_moves_balance() {
        let f1 = Uuid::new_v4();
        let mut set = vec![lekka(Some(f1), LekkaKind::Lent, 200_000, LekkaStatus::Pending)];
        assert_eq!(net_balance(Currency::Inr, &set).unwrap().minor(), 0);

        set[0].state = LekkaState::Confirmed;
        assert_eq!(net_balance(Currency::Inr, &set).unwrap().minor(), 200_000);

        set[0].state = LekkaState::Settled;
        assert_eq!(net_balance(Currency::Inr, &set).unwrap().minor(), 200_000);
    }

    #[test]
    fn dashboard_mixed_pending_and_settled() {
        let set = [
            lekka(None, LekkaKind::Lent, 500, LekkaStatus::Pending),
            lekka(None, LekkaKind::Borrowed, 1000, LekkaStatus::Settled),
        ];
        let stats = dashboard_stats(Currency::Inr, &set).unwrap();
        assert_eq!(stats.total_lekkas, 2);
        assert_eq!(stats.pending_lekkas, 1);
        assert_eq!(stats.total_tracked.minor(), 1500);
        assert_eq!(stats.net_balance.minor(), -1000);
    }

    #[test]
    fn dashboard_net_equals_sum_of_friend_balances() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let set = [
            lekka(Some(a), LekkaKind::Lent, 700, LekkaStatus::Confirmed),
            lekka(Some(a), LekkaKind::Borrowed, 200, LekkaStatus::Settled),
            lekka(Some(b), LekkaKind::Borrowed, 900, LekkaStatus::Confirmed),
            lekka(Some(b), LekkaKind::Lent, 50, LekkaStatus::Pending),
        ];
        let per = balances_by_counterparty(Currency::Inr, &set).unwrap();
        assert_eq!(per[&Counterparty::Friend(a)].minor(), 500);
        assert_eq!(per[&Counterparty::Friend(b)].minor(), -900);
        let stats = dashboard_stats(Currency::Inr, &set).unwrap();
        assert_eq!(stats.net_balance.minor(), -400);
    }

    #[test]
    fn friend_summary_counts_only_linked() {
        let friend = Friend::new("me".into(), "Asha".into(), None);
        let set = [
            lekka(Some(friend.id), LekkaKind::Lent, 300, LekkaStatus::Pending),
            lekka(Some(friend.id), LekkaKind::Lent, 100, LekkaStatus::Confirmed),
            lekka(None, LekkaKind::Lent, 999, LekkaStatus::Confirmed),
        ];
        let summary = friend_summary(Currency::Inr, friend, &set).unwrap();
        assert_eq!(summary.total_lekkas, 2);
        assert_eq!(summary.pending_lekkas, 1);
        assert_eq!(summary.net_balance.minor(), 100);
    }

    #[test]
    fn monthly_groups_newest_first() {
        let mut jan = lekka(None, LekkaKind::Lent, 100, LekkaStatus::Pending);
        jan.created_at = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let mut jan2 = lekka(None, LekkaKind::Borrowed, 40, LekkaStatus::Settled);
        jan2.created_at = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 0).unwrap();
        let mut mar = lekka(None, LekkaKind::Lent, 7, LekkaStatus::Confirmed);
        mar.created_at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let stats = monthly_stats(Currency::Inr, &[jan, mar, jan2]).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!((stats[0].year, stats[0].month, stats[0].count), (2024, 3, 1));
        assert_eq!((stats[1].month, stats[1].count), (1, 2));
        assert_eq!(stats[1].lent.minor(), 100);
        assert_eq!(stats[1].borrowed.minor(), 40);
    }

    #[test]
    fn totals_report_overflow() {
        let set = [
            lekka(None, LekkaKind::Lent, i64::MAX, LekkaStatus::Pending),
            lekka(None, LekkaKind::Lent, 1, LekkaStatus::Pending),
        ];
        assert!(matches!(
            dashboard_stats(Currency::Inr, &set),
            Err(EngineError::Validation { op: Operation::Stats, .. })
        ));
    }
}
