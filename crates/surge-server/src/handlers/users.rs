//! Users API.
//!
//! Read handlers send the repository's serialized payload untouched, so a
//! cache hit is returned byte for byte as it was stored.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use surge_core::{NewUser, User, UserId};
use surge_store::Fetched;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Header telling whether the payload came from the cache.
pub static CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-cache");

/// Body of `POST /api/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

impl From<CreateUserRequest> for NewUser {
    fn from(request: CreateUserRequest) -> Self {
        NewUser::new(request.name, request.email)
    }
}

/// GET /api/users
#[instrument(skip_all)]
pub async fn list_users(State(state): State<AppState>) -> Result<Response, AppError> {
    let fetched = state.repository().list_users().await?;
    Ok(json_payload(fetched))
}

/// GET /api/users/{id}
#[instrument(skip_all)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&raw_id)?;
    let fetched = state.repository().find_user(id).await?;
    Ok(json_payload(fetched))
}

/// POST /api/users
#[instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let Json(request) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

    let user = state.repository().create_user(request.into()).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

fn parse_id(raw: &str) -> Result<UserId, AppError> {
    raw.parse::<UserId>()
        .map_err(|_| AppError::bad_request(format!("invalid user id '{raw}'")))
}

fn json_payload(fetched: Fetched) -> Response {
    let origin = fetched.origin();
    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (CACHE_STATUS_HEADER.clone(), origin.as_header()),
        ],
        fetched.into_body(),
    )
        .into_response()
}
