//! Statistics API endpoints

use api_types::{
    friend::FriendView,
    stats::{DashboardStats, MonthlyStat, MonthlyStatsResponse, ProfileStats},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::User;
use uuid::Uuid;

use crate::{ServerError, convert, server::ServerState};

/// Handle requests for the caller's dashboard
pub async fn dashboard(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<DashboardStats>, ServerError> {
    let stats = state.engine.dashboard_stats(&user.id).await?;

    Ok(Json(DashboardStats {
        total_lekkas: stats.total_lekkas,
        pending_lekkas: stats.pending_lekkas,
        net_balance: convert::amount(stats.net_balance),
        total_tracked: convert::amount(stats.total_tracked),
    }))
}

pub async fn monthly(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<MonthlyStatsResponse>, ServerError> {
    let months = state.engine.monthly_stats(&user.id).await?;

    Ok(Json(MonthlyStatsResponse {
        months: months
            .into_iter()
            .map(|month| MonthlyStat {
                year: month.year,
                month: month.month,
                count: month.count,
                lent: convert::amount(month.lent),
                borrowed: convert::amount(month.borrowed),
            })
            .collect(),
    }))
}

pub async fn friend(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(friend_id): Path<Uuid>,
) -> Result<Json<FriendView>, ServerError> {
    let summary = state.engine.friend_stats(&user.id, friend_id).await?;
    Ok(Json(convert::friend_view(summary)))
}

pub async fn profile(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<ProfileStats>, ServerError> {
    let stats = state.engine.profile_stats(&user.id).await?;

    Ok(Json(ProfileStats {
        total_lekkas: stats.total_lekkas,
        total_friends: stats.total_friends,
        settled_lekkas: stats.settled_lekkas,
    }))
}
