//! Uniform response envelopes returned by the profile service.
//!
//! A response pairs an HTTP-shaped status code with either a payload or an
//! explanation string, and is immutable once constructed. Equality is
//! value-based: feedback plus the profile's username, email and additional
//! data — `id` and `password` are intentionally excluded.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Serialize, Serializer};
use utoipa::ToSchema;

use super::models::UserProfile;

/// Status code plus optional human-readable explanation.
#[derive(ToSchema, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ApiFeedback {
    #[serde(serialize_with = "serialize_status")]
    #[schema(value_type = u16)]
    pub code: StatusCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

fn serialize_status<S>(code: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(code.as_u16())
}

impl ApiFeedback {
    #[must_use]
    pub const fn new(code: StatusCode) -> Self {
        Self {
            code,
            explanation: None,
        }
    }

    #[must_use]
    pub fn with_explanation(code: StatusCode, explanation: impl Into<String>) -> Self {
        Self {
            code,
            explanation: Some(explanation.into()),
        }
    }
}

#[derive(ToSchema, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub api_feedback: ApiFeedback,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<UserProfile>,
}

impl ProfileResponse {
    #[must_use]
    pub const fn from_code(code: StatusCode) -> Self {
        Self {
            api_feedback: ApiFeedback::new(code),
            user_profile: None,
        }
    }

    #[must_use]
    pub fn with_explanation(code: StatusCode, explanation: impl Into<String>) -> Self {
        Self {
            api_feedback: ApiFeedback::with_explanation(code, explanation),
            user_profile: None,
        }
    }

    #[must_use]
    pub const fn with_profile(code: StatusCode, profile: UserProfile) -> Self {
        Self {
            api_feedback: ApiFeedback::new(code),
            user_profile: Some(profile),
        }
    }
}

impl PartialEq for ProfileResponse {
    fn eq(&self, other: &Self) -> bool {
        self.api_feedback == other.api_feedback
            && match (&self.user_profile, &other.user_profile) {
                (None, None) => true,
                (Some(own), Some(input)) => {
                    own.username == input.username
                        && own.email == input.email
                        && own.additional_data == input.additional_data
                }
                _ => false,
            }
    }
}

impl IntoResponse for ProfileResponse {
    fn into_response(self) -> Response {
        (self.api_feedback.code, Json(self)).into_response()
    }
}

#[derive(ToSchema, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProfileListResponse {
    pub api_feedback: ApiFeedback,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_profiles: Option<Vec<UserProfile>>,
}

impl ProfileListResponse {
    #[must_use]
    pub fn with_explanation(code: StatusCode, explanation: impl Into<String>) -> Self {
        Self {
            api_feedback: ApiFeedback::with_explanation(code, explanation),
            user_profiles: None,
        }
    }

    #[must_use]
    pub const fn with_profiles(code: StatusCode, profiles: Vec<UserProfile>) -> Self {
        Self {
            api_feedback: ApiFeedback::new(code),
            user_profiles: Some(profiles),
        }
    }
}

impl IntoResponse for ProfileListResponse {
    fn into_response(self) -> Response {
        (self.api_feedback.code, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::models::AdditionalData;

    fn profile(username: &str, email: &str) -> UserProfile {
        UserProfile {
            username: username.to_string(),
            email: email.to_string(),
            additional_data: Some(AdditionalData {
                first_name: Some("Ada".to_string()),
                last_name: None,
            }),
            ..UserProfile::default()
        }
    }

    #[test]
    fn test_equality_ignores_id_and_password() {
        let mut left = profile("ada", "ada@lovelace.org");
        left.id = Some(1);
        left.password = "first".to_string();

        let mut right = profile("ada", "ada@lovelace.org");
        right.id = Some(99);
        right.password = "second".to_string();

        assert_eq!(
            ProfileResponse::with_profile(StatusCode::OK, left),
            ProfileResponse::with_profile(StatusCode::OK, right)
        );
    }

    #[test]
    fn test_equality_compares_feedback_and_profile_fields() {
        let ok = ProfileResponse::with_profile(StatusCode::OK, profile("ada", "ada@lovelace.org"));

        assert_ne!(
            ok,
            ProfileResponse::with_profile(StatusCode::OK, profile("grace", "ada@lovelace.org"))
        );
        assert_ne!(ok, ProfileResponse::from_code(StatusCode::OK));
        assert_ne!(
            ProfileResponse::from_code(StatusCode::BAD_REQUEST),
            ProfileResponse::with_explanation(StatusCode::BAD_REQUEST, "Please try again")
        );
        assert_eq!(
            ProfileResponse::with_explanation(StatusCode::BAD_REQUEST, "Please try again"),
            ProfileResponse::with_explanation(StatusCode::BAD_REQUEST, "Please try again")
        );
    }

    #[test]
    fn test_serialization_shape() {
        let response =
            ProfileResponse::with_profile(StatusCode::OK, profile("ada", "ada@lovelace.org"));
        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&response).unwrap()).unwrap();

        assert_eq!(value["apiFeedback"]["code"], 200);
        assert_eq!(value["userProfile"]["username"], "ada");
        assert_eq!(value["userProfile"]["additionalData"]["firstName"], "Ada");
        assert!(value["userProfile"].get("password").is_none());
    }
}
