use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

use super::SharedProfileService;
use crate::profile::{
    models::{AdditionalData, UserProfile},
    response::ProfileResponse,
    service::INTERNAL_SERVER_ERROR_MSG,
};

#[derive(ToSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserRegister {
    username: String,
    email: String,
    #[schema(value_type = String)]
    password: SecretString,
    #[serde(default)]
    additional_data: Option<AdditionalData>,
}

impl UserRegister {
    fn into_profile(self) -> UserProfile {
        UserProfile {
            id: None,
            username: self.username,
            email: self.email,
            password: self.password.expose_secret().to_string(),
            additional_data: self.additional_data,
        }
    }
}

#[utoipa::path(
    post,
    path= "/user/register",
    request_body = UserRegister,
    responses (
        (status = 200, description = "Registration successful", body = ProfileResponse),
        (status = 400, description = "Invalid input or duplicate username/email", body = ProfileResponse),
    ),
    tag= "register"
)]
// axum handler for register
#[instrument]
pub async fn register(
    service: Extension<SharedProfileService>,
    payload: Option<Json<UserRegister>>,
) -> Response {
    let profile = payload.map(|Json(user)| {
        debug!("user: {:?}", user);

        user.into_profile()
    });

    match service.add(profile).await {
        Ok(response) => response.into_response(),
        Err(error) => {
            // The service re-raises duplicates on unrecognized constraints;
            // this generic arm is the transport-level fallback
            error!("Failed to register profile: {error}");

            ProfileResponse::with_explanation(
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_SERVER_ERROR_MSG,
            )
            .into_response()
        }
    }
}
