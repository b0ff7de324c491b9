//! Group pool API endpoints.

use api_types::pool::{ContributionNew, PoolListResponse, PoolNew, PoolView, ProgressView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{ContributeCmd, CreatePoolCmd, User};
use uuid::Uuid;

use crate::{ServerError, convert, server::ServerState};

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<PoolNew>,
) -> Result<(StatusCode, Json<PoolView>), ServerError> {
    let target = convert::money(
        payload.target_minor,
        payload.currency,
        state.engine.currency(),
    );
    let mut cmd = CreatePoolCmd::new(user.id, payload.name, target);
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }

    let pool = state.engine.create_pool(cmd).await?;
    let progress = pool.progress()?;
    Ok((StatusCode::CREATED, Json(convert::pool_view(pool, &progress))))
}

/// Pools owned by the caller, newest first, without their contribution log.
pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<PoolListResponse>, ServerError> {
    let pools = state.engine.pools(&user.id).await?;

    Ok(Json(PoolListResponse {
        pools: pools
            .into_iter()
            .map(|(mut pool, progress)| {
                pool.contributions.clear();
                convert::pool_view(pool, &progress)
            })
            .collect(),
    }))
}

/// Any participant holding the pool id can read it.
pub async fn get(
    Extension(_user): Extension<User>,
    State(state): State<ServerState>,
    Path(pool_id): Path<Uuid>,
) -> Result<Json<PoolView>, ServerError> {
    let pool = state.engine.pool(pool_id).await?;
    let progress = pool.progress()?;
    Ok(Json(convert::pool_view(pool, &progress)))
}

pub async fn contribute(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(pool_id): Path<Uuid>,
    Json(payload): Json<ContributionNew>,
) -> Result<(StatusCode, Json<ProgressView>), ServerError> {
    let amount = convert::money(
        payload.amount_minor,
        payload.currency,
        state.engine.currency(),
    );
    let progress = state
        .engine
        .contribute(ContributeCmd::new(
            user.id,
            pool_id,
            payload.contributor,
            amount,
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(convert::progress_view(&progress))))
}

pub async fn close(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(pool_id): Path<Uuid>,
) -> Result<Json<PoolView>, ServerError> {
    let pool = state.engine.close_pool(&user.id, pool_id).await?;
    let progress = pool.progress()?;
    Ok(Json(convert::pool_view(pool, &progress)))
}
