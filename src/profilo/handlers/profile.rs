//! Thin adapters translating the profile routes to service calls.
//!
//! No policy lives here: handlers deserialize the request, call the service,
//! and let the response envelope carry its own status code.

use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    Json,
};
use tracing::instrument;

use super::SharedProfileService;
use crate::profile::models::{PatchOp, UserProfile};
use crate::profile::response::{ProfileListResponse, ProfileResponse};

#[utoipa::path(
    get,
    path= "/profile",
    responses (
        (status = 200, description = "All stored profiles", body = ProfileListResponse),
        (status = 500, description = "Store failure", body = ProfileListResponse),
    ),
    tag= "profile"
)]
#[instrument]
pub async fn list(service: Extension<SharedProfileService>) -> impl IntoResponse {
    service.get().await
}

#[utoipa::path(
    get,
    path= "/profile/{id}",
    params(
        ("id" = i32, Path, description = "Profile id"),
    ),
    responses (
        (status = 200, description = "The stored profile", body = ProfileResponse),
        (status = 400, description = "Invalid or unknown id", body = ProfileResponse),
    ),
    tag= "profile"
)]
#[instrument]
pub async fn get_by_id(
    service: Extension<SharedProfileService>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    service.get_by_id(Some(id)).await
}

#[utoipa::path(
    delete,
    path= "/profile/{id}",
    params(
        ("id" = i32, Path, description = "Profile id"),
    ),
    responses (
        (status = 200, description = "Profile deleted", body = ProfileResponse),
        (status = 400, description = "Invalid or unknown id", body = ProfileResponse),
    ),
    tag= "profile"
)]
#[instrument]
pub async fn delete_by_id(
    service: Extension<SharedProfileService>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    service.delete_by_id(Some(id)).await
}

#[utoipa::path(
    patch,
    path= "/profile/{id}",
    params(
        ("id" = i32, Path, description = "Profile id"),
    ),
    request_body = [PatchOp],
    responses (
        (status = 200, description = "The freshly re-read profile", body = ProfileResponse),
        (status = 400, description = "Missing id, empty patch, or unknown profile", body = ProfileResponse),
    ),
    tag= "profile"
)]
#[instrument]
pub async fn patch(
    service: Extension<SharedProfileService>,
    Path(id): Path<i32>,
    payload: Option<Json<Vec<PatchOp>>>,
) -> impl IntoResponse {
    service.update(Some(id), payload.map(|Json(ops)| ops)).await
}

#[utoipa::path(
    put,
    path= "/profile",
    request_body = UserProfile,
    responses (
        (status = 200, description = "The merged profile", body = ProfileResponse),
        (status = 401, description = "No profile stored for the username", body = ProfileResponse),
    ),
    tag= "profile"
)]
#[instrument]
pub async fn update(
    service: Extension<SharedProfileService>,
    payload: Option<Json<UserProfile>>,
) -> impl IntoResponse {
    service
        .update_profile(payload.map(|Json(profile)| profile))
        .await
}
