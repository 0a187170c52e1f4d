//! Request validation and outcome classification for profile operations.
//!
//! The service is stateless per call and polymorphic over the data
//! collaborator: it validates input, delegates persistence, and converts
//! every anticipated failure into a typed response envelope. Truly
//! unexpected store failures become a generic 500 with full detail logged
//! server-side only; the single fatal path (a duplicate on an unrecognized
//! constraint) is re-raised for the transport fallback to handle.

use axum::http::StatusCode;
use regex::Regex;
use tracing::{debug, error, warn};

use super::models::{PatchOp, UserProfile};
use super::response::{ProfileListResponse, ProfileResponse};
use super::store::{ConflictKind, ProfileStore, StoreError};
use crate::password::PasswordCodec;

pub const INTERNAL_SERVER_ERROR_MSG: &str =
    "Please try again. If the problem persists then report it to the webmaster";
pub const LOGIN_FAILED_MSG: &str = "Sorry we cannot find you. Try again or Register";
pub const BAD_REQUEST_MSG: &str = "Please try again";
pub const DUPLICATE_EMAIL: &str = "Email duplicate";
pub const DUPLICATE_USERNAME: &str = "Username duplicate";
pub const INVALID_EMAIL: &str = "Email invalid";

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

const fn positive_id(id: Option<i32>) -> Option<i32> {
    match id {
        Some(id) if id >= 1 => Some(id),
        _ => None,
    }
}

fn internal_error() -> ProfileResponse {
    ProfileResponse::with_explanation(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR_MSG)
}

#[derive(Debug)]
pub struct ProfileService<S> {
    store: S,
    codec: PasswordCodec,
}

impl<S: ProfileStore> ProfileService<S> {
    #[must_use]
    pub const fn new(store: S, codec: PasswordCodec) -> Self {
        Self { store, codec }
    }

    pub async fn get(&self) -> ProfileListResponse {
        match self.store.get().await {
            Ok(profiles) => ProfileListResponse::with_profiles(StatusCode::OK, profiles),
            Err(error) => {
                error!("Failed to get profile list: {error}");
                ProfileListResponse::with_explanation(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_SERVER_ERROR_MSG,
                )
            }
        }
    }

    pub async fn get_by_id(&self, id: Option<i32>) -> ProfileResponse {
        let Some(id) = positive_id(id) else {
            warn!("id should be a positive integer");
            return ProfileResponse::with_explanation(StatusCode::BAD_REQUEST, BAD_REQUEST_MSG);
        };

        match self.store.get_by_id(id).await {
            Ok(Some(profile)) => ProfileResponse::with_profile(StatusCode::OK, profile),
            Ok(None) => {
                error!("Failed to get profile for id {id}");
                ProfileResponse::with_explanation(StatusCode::BAD_REQUEST, BAD_REQUEST_MSG)
            }
            Err(error) => {
                error!("Failed to get profile for id {id}: {error}");
                internal_error()
            }
        }
    }

    pub async fn delete_by_id(&self, id: Option<i32>) -> ProfileResponse {
        let Some(id) = positive_id(id) else {
            warn!("id should be a positive integer");
            return ProfileResponse::with_explanation(StatusCode::BAD_REQUEST, BAD_REQUEST_MSG);
        };

        match self.store.delete_by_id(id).await {
            // The store reports its outcome as a status code; wrap it as-is
            Ok(code) => ProfileResponse::from_code(code),
            Err(error) => {
                error!("Failed to delete profile for id {id}: {error}");
                internal_error()
            }
        }
    }

    /// Register a new profile.
    ///
    /// # Errors
    ///
    /// Returns the underlying store error when a duplicate is reported on a
    /// constraint naming neither `email` nor `username`. Every other outcome,
    /// including anticipated failures, is a response.
    pub async fn add(&self, profile: Option<UserProfile>) -> Result<ProfileResponse, StoreError> {
        let Some(mut profile) = profile else {
            warn!("user profile should not be null");
            return Ok(ProfileResponse::from_code(StatusCode::BAD_REQUEST));
        };

        profile.trim_whitespace();

        if is_bad_profile(&profile) {
            return Ok(ProfileResponse::with_explanation(
                StatusCode::BAD_REQUEST,
                BAD_REQUEST_MSG,
            ));
        }

        if !valid_email(&profile.email) {
            warn!("email is invalid: {}", profile.email);
            return Ok(ProfileResponse::with_explanation(
                StatusCode::BAD_REQUEST,
                BAD_REQUEST_MSG,
            ));
        }

        let credential = self.codec.hash(&profile.password);

        match self.store.add(&profile, &credential).await {
            Ok(stored) => Ok(ProfileResponse::with_profile(StatusCode::OK, stored)),
            Err(StoreError::Duplicate(ConflictKind::Email)) => {
                debug!("Failed to add duplicate email for username {}", profile.username);
                Ok(ProfileResponse::with_explanation(
                    StatusCode::BAD_REQUEST,
                    DUPLICATE_EMAIL,
                ))
            }
            Err(StoreError::Duplicate(ConflictKind::Username)) => {
                debug!("Failed to add duplicate username {}", profile.username);
                Ok(ProfileResponse::with_explanation(
                    StatusCode::BAD_REQUEST,
                    DUPLICATE_USERNAME,
                ))
            }
            Err(error @ StoreError::Duplicate(ConflictKind::Unknown)) => {
                error!("Failed to add duplicate on unrecognized column: {error}");
                Err(error)
            }
            Err(error) => {
                error!("Failed to add profile: {error}");
                Ok(internal_error())
            }
        }
    }

    /// Patch-based update: apply `ops` to the stored profile, then re-read.
    pub async fn update(&self, id: Option<i32>, ops: Option<Vec<PatchOp>>) -> ProfileResponse {
        let Some(id) = id else {
            warn!("id should not be null");
            return ProfileResponse::with_explanation(StatusCode::BAD_REQUEST, BAD_REQUEST_MSG);
        };

        let Some(ops) = ops.filter(|ops| !ops.is_empty()) else {
            warn!("patch should not be null or empty");
            return ProfileResponse::with_explanation(StatusCode::BAD_REQUEST, BAD_REQUEST_MSG);
        };

        match self.store.patch(id, &ops).await {
            Ok(StatusCode::OK) => self.updated_profile(id).await,
            Ok(code) => ProfileResponse::from_code(code),
            Err(error) => {
                error!("Failed to patch profile for id {id}: {error}");
                internal_error()
            }
        }
    }

    // Round-trip read in its own transaction; staleness between the patch
    // and the re-read is accepted
    async fn updated_profile(&self, id: i32) -> ProfileResponse {
        match self.store.get_by_id(id).await {
            Ok(Some(profile)) => ProfileResponse::with_profile(StatusCode::OK, profile),
            Ok(None) => internal_error(),
            Err(error) => {
                error!("Failed to read back profile for id {id}: {error}");
                internal_error()
            }
        }
    }

    /// Whole-object update: merge recognized mutable fields onto the stored
    /// profile resolved by username.
    pub async fn update_profile(&self, profile: Option<UserProfile>) -> ProfileResponse {
        let Some(mut input) = profile else {
            warn!("user profile should not be null");
            return ProfileResponse::with_explanation(StatusCode::BAD_REQUEST, BAD_REQUEST_MSG);
        };

        input.trim_whitespace();

        // An absent email is a no-op, not an error
        if !input.email.is_empty() && !valid_email(&input.email) {
            warn!("email is invalid: {}", input.email);
            return ProfileResponse::with_explanation(StatusCode::BAD_REQUEST, INVALID_EMAIL);
        }

        let stored = match self.store.get_by_username(&input.username).await {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                debug!("No profile stored for username {}", input.username);
                return ProfileResponse::with_explanation(
                    StatusCode::UNAUTHORIZED,
                    LOGIN_FAILED_MSG,
                );
            }
            Err(error) => {
                error!("Failed to get profile for username {}: {error}", input.username);
                return internal_error();
            }
        };

        let mut merged = stored;
        if !input.email.is_empty() {
            merged.email = input.email;
        }

        match self.store.update(&merged).await {
            Ok(1) => ProfileResponse::with_profile(StatusCode::OK, merged),
            Ok(count) => {
                error!("Update touched {count} rows for username {}", merged.username);
                internal_error()
            }
            Err(error) => {
                error!("Failed to update profile for username {}: {error}", merged.username);
                internal_error()
            }
        }
    }

    pub async fn login(&self, profile: Option<UserProfile>) -> ProfileResponse {
        let Some(mut input) = profile else {
            warn!("user profile should not be null");
            return ProfileResponse::with_explanation(StatusCode::BAD_REQUEST, BAD_REQUEST_MSG);
        };

        input.trim_whitespace();

        if is_bad_profile(&input) {
            return ProfileResponse::with_explanation(StatusCode::BAD_REQUEST, BAD_REQUEST_MSG);
        }

        let stored = match self.store.get_by_username(&input.username).await {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                debug!("Failed to login username {}", input.username);
                return ProfileResponse::with_explanation(
                    StatusCode::UNAUTHORIZED,
                    LOGIN_FAILED_MSG,
                );
            }
            Err(error) => {
                error!("Failed to login username {}: {error}", input.username);
                return internal_error();
            }
        };

        let Some(user_id) = stored.id else {
            debug!("Failed to login username {}", input.username);
            return ProfileResponse::with_explanation(StatusCode::UNAUTHORIZED, LOGIN_FAILED_MSG);
        };

        let authentication = match self.store.get_authentication(user_id).await {
            Ok(Some(authentication)) => authentication,
            Ok(None) => {
                // A profile without its credential row is a data-integrity
                // fault, not a client error
                error!("Missing credential for profile {user_id}");
                return internal_error();
            }
            Err(error) => {
                error!("Failed to get credential for profile {user_id}: {error}");
                return internal_error();
            }
        };

        if self
            .codec
            .verify(&authentication.password_hash, &input.password)
        {
            ProfileResponse::with_profile(StatusCode::OK, stored)
        } else {
            debug!("Unauthorized");
            ProfileResponse::with_explanation(StatusCode::UNAUTHORIZED, LOGIN_FAILED_MSG)
        }
    }
}

fn is_bad_profile(profile: &UserProfile) -> bool {
    if profile.password.trim().is_empty() {
        warn!("password should not be blank");
        return true;
    }

    if profile.username.is_empty() {
        warn!("username should not be blank");
        return true;
    }

    false
}
