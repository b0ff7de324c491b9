//! Lekka API endpoints.

use api_types::lekka::{
    LekkaListQuery, LekkaListResponse, LekkaNew, LekkaUpdate, LekkaView, ProofAttach,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{CreateLekkaCmd, FriendRef, LekkaListFilter, UpdateLekkaCmd, User};
use uuid::Uuid;

use crate::{ServerError, convert, server::ServerState};

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<LekkaNew>,
) -> Result<(StatusCode, Json<LekkaView>), ServerError> {
    let friend = match (payload.friend_id, payload.friend_name) {
        (Some(friend_id), _) => FriendRef::Existing(friend_id),
        (None, Some(name)) => FriendRef::new_contact(name, payload.friend_phone),
        (None, None) => {
            return Err(ServerError::Generic(
                "friend_id or friend_name required".to_string(),
            ));
        }
    };
    let amount = convert::money(
        payload.amount_minor,
        payload.currency,
        state.engine.currency(),
    );

    let mut cmd = CreateLekkaCmd::new(user.id, friend, convert::kind(payload.kind), amount);
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(due_date) = payload.due_date {
        cmd = cmd.due_date(due_date);
    }

    let lekka = state.engine.create_lekka(cmd).await?;
    Ok((StatusCode::CREATED, Json(convert::lekka_view(lekka))))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<LekkaListQuery>,
) -> Result<Json<LekkaListResponse>, ServerError> {
    let filter = LekkaListFilter {
        status: query.status.map(convert::status),
        kind: query.kind.map(convert::kind),
        friend_id: query.friend_id,
        limit: query.limit,
    };
    let lekkas = state.engine.lekkas(&user.id, &filter).await?;

    Ok(Json(LekkaListResponse {
        lekkas: lekkas.into_iter().map(convert::lekka_row).collect(),
    }))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(lekka_id): Path<Uuid>,
) -> Result<Json<LekkaView>, ServerError> {
    let lekka = state.engine.lekka(&user.id, lekka_id).await?;
    Ok(Json(convert::lekka_view(lekka)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(lekka_id): Path<Uuid>,
    Json(payload): Json<LekkaUpdate>,
) -> Result<Json<LekkaView>, ServerError> {
    let mut cmd = UpdateLekkaCmd::new(user.id, lekka_id);
    if let Some(minor) = payload.amount_minor {
        cmd = cmd.amount(convert::money(
            minor,
            payload.currency,
            state.engine.currency(),
        ));
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(due_date) = payload.due_date {
        cmd = cmd.due_date(due_date);
    }

    let lekka = state.engine.update_lekka(cmd).await?;
    Ok(Json(convert::lekka_view(lekka)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(lekka_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_lekka(&user.id, lekka_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn settle(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(lekka_id): Path<Uuid>,
) -> Result<Json<LekkaView>, ServerError> {
    let lekka = state.engine.settle(&user.id, lekka_id).await?;
    Ok(Json(convert::lekka_view(lekka)))
}

/// Re-sends the confirmation link of a pending Lekka.
pub async fn remind(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(lekka_id): Path<Uuid>,
) -> Result<Json<LekkaView>, ServerError> {
    let lekka = state.engine.remind(&user.id, lekka_id).await?;
    Ok(Json(convert::lekka_view(lekka)))
}

pub async fn attach_proof(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(lekka_id): Path<Uuid>,
    Json(payload): Json<ProofAttach>,
) -> Result<Json<LekkaView>, ServerError> {
    let lekka = state
        .engine
        .attach_proof(&user.id, lekka_id, &payload.proof_ref)
        .await?;
    Ok(Json(convert::lekka_view(lekka)))
}
