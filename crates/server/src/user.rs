//! Caller registration and profile.

use api_types::user::{UserRegister, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use axum_extra::TypedHeader;
use engine::User;

use crate::{
    ServerError,
    server::{LekkaUserHeader, ServerState},
};

fn view(user: User) -> UserView {
    UserView {
        id: user.id,
        display_name: user.display_name,
        phone: user.phone,
    }
}

/// Registers the caller named by the header, or refreshes their profile.
pub async fn register(
    TypedHeader(LekkaUserHeader(user_id)): TypedHeader<LekkaUserHeader>,
    State(state): State<ServerState>,
    Json(payload): Json<UserRegister>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .engine
        .register_user(&user_id, &payload.display_name, payload.phone.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(view(user))))
}

pub async fn me(Extension(user): Extension<User>) -> Json<UserView> {
    Json(view(user))
}
