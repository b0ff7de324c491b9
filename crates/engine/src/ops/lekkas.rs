use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    ConfirmationToken, CreateLekkaCmd, EngineError, FriendRef, Lekka, LekkaKind, LekkaState,
    LekkaStatus, Notification, Operation, ResultEngine, TimelineAction, Transition,
    UpdateLekkaCmd, friends, lekka_events, lekkas,
    lifecycle::advance,
    util::{
        ensure_due_date, ensure_positive_amount, normalize_optional_text, normalize_phone,
        normalize_required_text, parse_uuid,
    },
};

use super::{Engine, with_tx};

/// Filters for listing a user's Lekkas. Unset fields match everything.
#[derive(Clone, Debug, Default)]
pub struct LekkaListFilter {
    pub status: Option<LekkaStatus>,
    pub kind: Option<LekkaKind>,
    pub friend_id: Option<Uuid>,
    pub limit: Option<u64>,
}

fn created_description(creator: &str, lekka: &Lekka) -> String {
    match lekka.kind {
        LekkaKind::Lent => format!("{creator} lent {} to {}", lekka.amount, lekka.friend_name),
        LekkaKind::Borrowed => format!(
            "{creator} borrowed {} from {}",
            lekka.amount, lekka.friend_name
        ),
    }
}

impl Engine {
    /// Records a new Lekka in `Pending` and mints its confirmation token.
    ///
    /// The confirmation link is handed to the notifier after commit. A failed
    /// delivery is logged and does not undo the Lekka; the creator can share
    /// the link by other means or send a reminder.
    pub async fn create_lekka(&self, cmd: CreateLekkaCmd) -> ResultEngine<Lekka> {
        let op = Operation::CreateLekka;
        ensure_positive_amount(op, self.currency, cmd.amount, "amount")?;
        ensure_due_date(op, cmd.due_date)?;
        let description = normalize_optional_text(cmd.description.as_deref());
        let now = Utc::now();

        let (lekka, creator_name) = with_tx!(self, |db_tx| {
            let creator = self.require_user(&db_tx, &cmd.user_id, op).await?;

            let (friend_id, friend_name, friend_phone) = match &cmd.friend {
                FriendRef::Existing(friend_id) => {
                    let friend = self
                        .require_friend_owned(&db_tx, *friend_id, &cmd.user_id, op)
                        .await?;
                    (Some(*friend_id), friend.name, friend.phone)
                }
                FriendRef::New { name, phone } => {
                    let name = normalize_required_text(op, name, "friend name")?;
                    let phone = normalize_phone(phone.as_deref());
                    // Same phone as a saved contact: link to it.
                    let linked = match &phone {
                        Some(phone) => friends::Entity::find()
                            .filter(friends::Column::OwnerId.eq(cmd.user_id.clone()))
                            .filter(friends::Column::Phone.eq(phone.clone()))
                            .one(&db_tx)
                            .await?
                            .map(|friend| parse_uuid(&friend.id, op))
                            .transpose()?,
                        None => None,
                    };
                    (linked, name, phone)
                }
            };

            let mut lekka = Lekka {
                id: Uuid::new_v4(),
                creator_id: cmd.user_id.clone(),
                friend_id,
                friend_name,
                friend_phone,
                kind: cmd.kind,
                amount: cmd.amount,
                description,
                due_date: cmd.due_date,
                state: LekkaState::Pending {
                    token: ConfirmationToken::generate(),
                    issued_at: now,
                },
                proof_ref: None,
                created_at: now,
                timeline: Vec::new(),
            };
            let model: lekkas::ActiveModel = (&lekka).into();
            model.insert(&db_tx).await?;

            let event = self
                .append_event(
                    &db_tx,
                    lekka.id,
                    TimelineAction::Created,
                    created_description(&creator.display_name, &lekka),
                    now,
                )
                .await?;
            lekka.timeline.push(event);
            Ok::<_, EngineError>((lekka, creator.display_name))
        })?;

        tracing::debug!(lekka_id = %lekka.id, kind = lekka.kind.as_str(), "lekka created");

        if let LekkaState::Pending { token, .. } = &lekka.state {
            let notification = Notification::ConfirmationLink {
                lekka_id: lekka.id,
                token: token.clone(),
                creator_name,
                friend_name: lekka.friend_name.clone(),
                friend_phone: lekka.friend_phone.clone(),
                kind: lekka.kind,
                amount: lekka.amount,
                due_date: lekka.due_date,
            };
            if let Err(err) = self.notifier.deliver(&notification) {
                tracing::warn!(
                    lekka_id = %notification.lekka_id(),
                    "confirmation link not delivered: {err}"
                );
            }
        }

        Ok(lekka)
    }

    /// Edits a Lekka the counterparty has not confirmed yet.
    pub async fn update_lekka(&self, cmd: UpdateLekkaCmd) -> ResultEngine<Lekka> {
        let op = Operation::UpdateLekka;
        if let Some(amount) = cmd.amount {
            ensure_positive_amount(op, self.currency, amount, "amount")?;
        }
        ensure_due_date(op, cmd.due_date)?;
        if cmd.is_empty() {
            return Err(EngineError::validation(op, "nothing to update"));
        }
        let description = cmd.description.as_deref().map(|d| normalize_optional_text(Some(d)));

        with_tx!(self, |db_tx| {
            let lekka = self
                .require_lekka_owned(&db_tx, cmd.lekka_id, &cmd.user_id, op)
                .await?;
            advance(lekka.id, lekka.status(), Transition::Edit)?;

            let mut update = lekkas::Entity::update_many()
                .filter(lekkas::Column::Id.eq(lekka.id.to_string()))
                .filter(lekkas::Column::Status.eq(LekkaStatus::Pending.as_str()));
            let mut changes = Vec::new();
            if let Some(amount) = cmd.amount {
                update = update
                    .col_expr(lekkas::Column::AmountMinor, Expr::value(amount.minor()))
                    .col_expr(lekkas::Column::Currency, Expr::value(amount.currency().code()));
                changes.push(format!("amount {} -> {amount}", lekka.amount));
            }
            if let Some(description) = description {
                update = update.col_expr(lekkas::Column::Description, Expr::value(description));
                changes.push("description".to_string());
            }
            if let Some(due_date) = cmd.due_date {
                update = update.col_expr(lekkas::Column::DueDate, Expr::value(due_date));
                changes.push(format!("due date {due_date}"));
            }
            if update.exec(&db_tx).await?.rows_affected == 0 {
                return Err(EngineError::conflict(op, lekka.id));
            }

            self.append_event(
                &db_tx,
                lekka.id,
                TimelineAction::Updated,
                format!("Updated {}", changes.join(", ")),
                Utc::now(),
            )
            .await?;
            self.load_lekka_detail(&db_tx, lekka.id, op).await
        })
    }

    /// Nudges the counterparty about a pending Lekka.
    ///
    /// The reminder is delivered inside the transaction: if the notifier
    /// fails, no "reminder sent" event is recorded.
    pub async fn remind(&self, user_id: &str, lekka_id: Uuid) -> ResultEngine<Lekka> {
        let op = Operation::Remind;
        with_tx!(self, |db_tx| {
            let lekka = self.require_lekka_owned(&db_tx, lekka_id, user_id, op).await?;
            advance(lekka.id, lekka.status(), Transition::Remind)?;
            let Some(token) = lekka.confirmation_token().cloned() else {
                return Err(EngineError::invalid_state(op, lekka.id, "lekka has no pending link"));
            };
            let creator = self.require_user(&db_tx, user_id, op).await?;

            self.append_event(
                &db_tx,
                lekka.id,
                TimelineAction::ReminderSent,
                format!("Reminder sent to {}", lekka.friend_name),
                Utc::now(),
            )
            .await?;

            self.notifier
                .deliver(&Notification::Reminder {
                    lekka_id: lekka.id,
                    token,
                    creator_name: creator.display_name,
                    friend_name: lekka.friend_name.clone(),
                    friend_phone: lekka.friend_phone.clone(),
                    amount: lekka.amount,
                })
                .map_err(|err| EngineError::Notify(err.to_string()))?;

            tracing::debug!(lekka_id = %lekka.id, "reminder sent");
            self.load_lekka_detail(&db_tx, lekka.id, op).await
        })
    }

    /// Attaches an opaque proof reference (e.g. a blob key) to a confirmed
    /// Lekka. A later call replaces the reference.
    pub async fn attach_proof(
        &self,
        user_id: &str,
        lekka_id: Uuid,
        proof_ref: &str,
    ) -> ResultEngine<Lekka> {
        let op = Operation::AttachProof;
        let proof_ref = normalize_required_text(op, proof_ref, "proof reference")?;

        with_tx!(self, |db_tx| {
            let lekka = self.require_lekka_owned(&db_tx, lekka_id, user_id, op).await?;
            advance(lekka.id, lekka.status(), Transition::AttachProof)?;

            let result = lekkas::Entity::update_many()
                .col_expr(lekkas::Column::ProofRef, Expr::value(proof_ref))
                .filter(lekkas::Column::Id.eq(lekka.id.to_string()))
                .filter(lekkas::Column::Status.eq(LekkaStatus::Confirmed.as_str()))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::conflict(op, lekka.id));
            }

            self.append_event(
                &db_tx,
                lekka.id,
                TimelineAction::ProofAttached,
                "Payment proof attached",
                Utc::now(),
            )
            .await?;
            self.load_lekka_detail(&db_tx, lekka.id, op).await
        })
    }

    /// Marks a confirmed Lekka as paid back. Balances do not change.
    pub async fn settle(&self, user_id: &str, lekka_id: Uuid) -> ResultEngine<Lekka> {
        let op = Operation::Settle;
        with_tx!(self, |db_tx| {
            let lekka = self.require_lekka_owned(&db_tx, lekka_id, user_id, op).await?;
            let next = advance(lekka.id, lekka.status(), Transition::Settle)?;

            let result = lekkas::Entity::update_many()
                .col_expr(lekkas::Column::Status, Expr::value(next.as_str()))
                .filter(lekkas::Column::Id.eq(lekka.id.to_string()))
                .filter(lekkas::Column::Status.eq(lekka.status().as_str()))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::conflict(op, lekka.id));
            }

            self.append_event(
                &db_tx,
                lekka.id,
                TimelineAction::Settled,
                "Marked as settled",
                Utc::now(),
            )
            .await?;
            tracing::debug!(lekka_id = %lekka.id, "lekka settled");
            self.load_lekka_detail(&db_tx, lekka.id, op).await
        })
    }

    /// Removes a Lekka in any status together with its timeline. Its
    /// confirmation link, if any, stops resolving.
    pub async fn delete_lekka(&self, user_id: &str, lekka_id: Uuid) -> ResultEngine<()> {
        let op = Operation::DeleteLekka;
        with_tx!(self, |db_tx| {
            let lekka = self.require_lekka_owned(&db_tx, lekka_id, user_id, op).await?;

            lekka_events::Entity::delete_many()
                .filter(lekka_events::Column::LekkaId.eq(lekka.id.to_string()))
                .exec(&db_tx)
                .await?;
            lekkas::Entity::delete_by_id(lekka.id.to_string())
                .exec(&db_tx)
                .await?;

            tracing::debug!(lekka_id = %lekka.id, status = lekka.status().as_str(), "lekka deleted");
            Ok(())
        })
    }

    /// Returns one Lekka with its full timeline.
    pub async fn lekka(&self, user_id: &str, lekka_id: Uuid) -> ResultEngine<Lekka> {
        let op = Operation::ReadLekka;
        with_tx!(self, |db_tx| {
            let mut lekka = self.require_lekka_owned(&db_tx, lekka_id, user_id, op).await?;
            lekka.timeline = self.load_timeline(&db_tx, lekka.id).await?;
            Ok(lekka)
        })
    }

    /// Lists the caller's Lekkas, newest first, without timelines.
    pub async fn lekkas(&self, user_id: &str, filter: &LekkaListFilter) -> ResultEngine<Vec<Lekka>> {
        with_tx!(self, |db_tx| {
            let mut query = lekkas::Entity::find()
                .filter(lekkas::Column::CreatorId.eq(user_id.to_string()))
                .order_by_desc(lekkas::Column::CreatedAt)
                .order_by_desc(lekkas::Column::Id);
            if let Some(status) = filter.status {
                query = query.filter(lekkas::Column::Status.eq(status.as_str()));
            }
            if let Some(kind) = filter.kind {
                query = query.filter(lekkas::Column::Kind.eq(kind.as_str()));
            }
            if let Some(friend_id) = filter.friend_id {
                query = query.filter(lekkas::Column::FriendId.eq(friend_id.to_string()));
            }
            if let Some(limit) = filter.limit {
                query = query.limit(limit);
            }

            query
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Lekka::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }
}
