use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};

use std::sync::Arc;

use crate::{confirmation, friends, lekkas, pools, statistics, user};
use engine::{Engine, EngineError};

static LEKKA_USER_HEADER: axum::http::HeaderName =
    axum::http::HeaderName::from_static("lekka-user-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// `TypedHeader` carrying the caller's user id.
///
/// Every authenticated request must contain a "lekka-user-id" entry in the
/// header. Session handling lives in front of this service.
#[derive(Debug)]
pub(crate) struct LekkaUserHeader(pub(crate) String);

impl Header for LekkaUserHeader {
    fn name() -> &'static axum::http::HeaderName {
        &LEKKA_USER_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let value = value.trim();
        if value.is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(LekkaUserHeader(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode lekka-user-id header"),
        }
    }
}

/// Resolves the header to a registered user and hands it to the handlers.
async fn auth(
    user_header: Option<TypedHeader<LekkaUserHeader>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(LekkaUserHeader(user_id))) = user_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let user = match state.engine.user(&user_id).await {
        Ok(user) => user,
        Err(EngineError::KeyNotFound { .. }) => return Err(StatusCode::UNAUTHORIZED),
        Err(err) => {
            tracing::error!("failed to load caller {user_id}: {err}");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(engine: Arc<Engine>) -> Router {
    let state = ServerState { engine };

    let authenticated = Router::new()
        .route("/users/me", get(user::me))
        .route("/lekkas", post(lekkas::create).get(lekkas::list))
        .route(
            "/lekkas/{id}",
            get(lekkas::get).put(lekkas::update).delete(lekkas::delete),
        )
        .route("/lekkas/{id}/settle", post(lekkas::settle))
        .route("/lekkas/{id}/remind", post(lekkas::remind))
        .route("/lekkas/{id}/proof", post(lekkas::attach_proof))
        .route("/friends", get(friends::list).post(friends::create))
        .route(
            "/friends/{id}",
            get(friends::get).put(friends::update).delete(friends::delete),
        )
        .route("/friends/{id}/balance", get(friends::balance))
        .route("/groups", get(pools::list).post(pools::create))
        .route("/groups/{id}", get(pools::get))
        .route("/groups/{id}/contribute", post(pools::contribute))
        .route("/groups/{id}/close", post(pools::close))
        .route("/stats/dashboard", get(statistics::dashboard))
        .route("/stats/monthly", get(statistics::monthly))
        .route("/stats/friend/{id}", get(statistics::friend))
        .route("/stats/profile", get(statistics::profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    // Reachable without a registered caller: the confirmation link is opened
    // by the friend, and registration creates the caller.
    let public = Router::new()
        .route(
            "/confirm/{token}",
            get(confirmation::resolve).post(confirmation::redeem),
        )
        .route("/users", post(user::register));

    authenticated.merge(public).with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(Arc::new(engine))).await
}
