//! Friends API endpoints.

use api_types::friend::{
    BalanceView, FriendListQuery, FriendListResponse, FriendNew, FriendUpdate, FriendView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::User;
use uuid::Uuid;

use crate::{ServerError, convert, server::ServerState};

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<FriendNew>,
) -> Result<(StatusCode, Json<FriendView>), ServerError> {
    let friend = state
        .engine
        .add_friend(&user.id, &payload.name, payload.phone.as_deref())
        .await?;
    let summary = state.engine.friend(&user.id, friend.id).await?;

    Ok((StatusCode::CREATED, Json(convert::friend_view(summary))))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<FriendListQuery>,
) -> Result<Json<FriendListResponse>, ServerError> {
    let filter = convert::friend_filter(query.filter.unwrap_or_default());
    let friends = state.engine.friends(&user.id, filter).await?;

    Ok(Json(FriendListResponse {
        friends: friends.into_iter().map(convert::friend_view).collect(),
    }))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(friend_id): Path<Uuid>,
) -> Result<Json<FriendView>, ServerError> {
    let summary = state.engine.friend(&user.id, friend_id).await?;
    Ok(Json(convert::friend_view(summary)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(friend_id): Path<Uuid>,
    Json(payload): Json<FriendUpdate>,
) -> Result<Json<FriendView>, ServerError> {
    if payload.name.is_none() && payload.phone.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of name or phone".to_string(),
        ));
    }

    state
        .engine
        .update_friend(
            &user.id,
            friend_id,
            payload.name.as_deref(),
            payload.phone.as_deref(),
        )
        .await?;
    let summary = state.engine.friend(&user.id, friend_id).await?;
    Ok(Json(convert::friend_view(summary)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(friend_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_friend(&user.id, friend_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Net balance with one friend over confirmed Lekkas.
pub async fn balance(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(friend_id): Path<Uuid>,
) -> Result<Json<BalanceView>, ServerError> {
    let net_balance = state.engine.net_balance(&user.id, friend_id).await?;
    Ok(Json(BalanceView {
        friend_id,
        net_balance: convert::amount(net_balance),
    }))
}
