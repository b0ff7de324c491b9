//! Public confirmation link endpoints.
//!
//! The friend opening the link has no account; the token alone grants
//! access to one pending Lekka.

use api_types::{
    confirmation::{ConfirmationRedeem, ConfirmationView},
    lekka::LekkaView,
};
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{ServerError, convert, server::ServerState};

/// Shows what the friend is asked to confirm. Can be called repeatedly.
pub async fn resolve(
    State(state): State<ServerState>,
    Path(token): Path<String>,
) -> Result<Json<ConfirmationView>, ServerError> {
    let view = state.engine.resolve_confirmation(&token).await?;
    Ok(Json(convert::confirmation_view(view)))
}

/// Confirms the Lekka. Works once per token.
pub async fn redeem(
    State(state): State<ServerState>,
    Path(token): Path<String>,
    payload: Option<Json<ConfirmationRedeem>>,
) -> Result<Json<LekkaView>, ServerError> {
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();
    let mut lekka = state
        .engine
        .redeem_confirmation(&token, payload.display_name.as_deref())
        .await?;
    // The friend sees the outcome, not the creator's private history.
    lekka.timeline.clear();
    Ok(Json(convert::lekka_view(lekka)))
}
