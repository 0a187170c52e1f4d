use axum::{extract::Extension, response::IntoResponse, Json};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use super::SharedProfileService;
use crate::profile::{models::UserProfile, response::ProfileResponse};

#[derive(ToSchema, Deserialize, Debug)]
pub struct UserLogin {
    username: String,
    #[schema(value_type = String)]
    password: SecretString,
}

#[utoipa::path(
    post,
    path= "/user/login",
    request_body = UserLogin,
    responses (
        (status = 200, description = "Login successful", body = ProfileResponse),
        (status = 401, description = "Unauthorized", body = ProfileResponse),
    ),
    tag= "login"
)]
// axum handler for login
#[instrument]
pub async fn login(
    service: Extension<SharedProfileService>,
    payload: Option<Json<UserLogin>>,
) -> impl IntoResponse {
    let profile = payload.map(|Json(user)| {
        debug!("user: {:?}", user);

        UserProfile {
            username: user.username,
            password: user.password.expose_secret().to_string(),
            ..UserProfile::default()
        }
    });

    service.login(profile).await
}
