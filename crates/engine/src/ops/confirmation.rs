use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ConfirmationToken, EngineError, Lekka, LekkaKind, LekkaState, LekkaStatus, Money,
    Operation, ResultEngine, TimelineAction, Transition, lekkas,
    lifecycle::advance,
    users,
    util::normalize_optional_text,
};

use super::{Engine, with_tx};

/// What the counterparty sees before confirming.
///
/// `kind` is from the creator's side: `Lent` means the viewer owes the
/// creator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationView {
    pub lekka_id: Uuid,
    pub creator_name: String,
    pub friend_name: String,
    pub kind: LekkaKind,
    pub amount: Money,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Engine {
    /// Finds the pending Lekka a token is bound to, applying the token policy.
    async fn lekka_for_token(
        &self,
        db: &DatabaseTransaction,
        raw: &str,
        op: Operation,
    ) -> ResultEngine<(ConfirmationToken, Lekka)> {
        let token = ConfirmationToken::parse(raw).ok_or(EngineError::InvalidToken { op })?;
        let model = lekkas::Entity::find()
            .filter(lekkas::Column::ConfirmationToken.eq(token.as_str()))
            .filter(lekkas::Column::Status.eq(LekkaStatus::Pending.as_str()))
            .one(db)
            .await?
            .ok_or(EngineError::InvalidToken { op })?;
        let lekka = Lekka::try_from(model)?;

        let LekkaState::Pending { issued_at, .. } = &lekka.state else {
            return Err(EngineError::InvalidToken { op });
        };
        if !self.token_policy.accepts(*issued_at, Utc::now()) {
            tracing::debug!(lekka_id = %lekka.id, "confirmation link rejected by policy");
            return Err(EngineError::InvalidToken { op });
        }
        Ok((token, lekka))
    }

    /// Read-only view of the Lekka behind a confirmation link. Does not
    /// consume the token.
    pub async fn resolve_confirmation(&self, token: &str) -> ResultEngine<ConfirmationView> {
        let op = Operation::ResolveConfirmation;
        with_tx!(self, |db_tx| {
            let (_, lekka) = self.lekka_for_token(&db_tx, token, op).await?;
            let creator_name = users::Entity::find_by_id(lekka.creator_id.clone())
                .one(&db_tx)
                .await?
                .map_or_else(|| lekka.creator_id.clone(), |user| user.display_name);

            Ok(ConfirmationView {
                lekka_id: lekka.id,
                creator_name,
                friend_name: lekka.friend_name,
                kind: lekka.kind,
                amount: lekka.amount,
                description: lekka.description,
                due_date: lekka.due_date,
                created_at: lekka.created_at,
            })
        })
    }

    /// Confirms the Lekka behind `token`, consuming it.
    ///
    /// The status flip and the token clear are a single conditional update
    /// on `(id, status = pending, token)`. Of two concurrent redemptions
    /// exactly one matches a row; the other gets `InvalidToken`.
    pub async fn redeem_confirmation(
        &self,
        token: &str,
        display_name: Option<&str>,
    ) -> ResultEngine<Lekka> {
        let op = Operation::RedeemConfirmation;
        let display_name = normalize_optional_text(display_name);

        with_tx!(self, |db_tx| {
            let (token, lekka) = self.lekka_for_token(&db_tx, token, op).await?;
            let next = advance(lekka.id, lekka.status(), Transition::Confirm)?;
            let friend_name = display_name.unwrap_or_else(|| lekka.friend_name.clone());

            let result = lekkas::Entity::update_many()
                .col_expr(lekkas::Column::Status, Expr::value(next.as_str()))
                .col_expr(
                    lekkas::Column::ConfirmationToken,
                    Expr::value(Option::<String>::None),
                )
                .col_expr(
                    lekkas::Column::TokenIssuedAt,
                    Expr::value(Option::<DateTime<Utc>>::None),
                )
                .col_expr(lekkas::Column::FriendName, Expr::value(friend_name.clone()))
                .filter(lekkas::Column::Id.eq(lekka.id.to_string()))
                .filter(lekkas::Column::Status.eq(LekkaStatus::Pending.as_str()))
                .filter(lekkas::Column::ConfirmationToken.eq(token.as_str()))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::InvalidToken { op });
            }

            self.append_event(
                &db_tx,
                lekka.id,
                TimelineAction::Confirmed,
                format!("Confirmed by {friend_name}"),
                Utc::now(),
            )
            .await?;
            tracing::debug!(lekka_id = %lekka.id, "lekka confirmed");
            self.load_lekka_detail(&db_tx, lekka.id, op).await
        })
    }
}
