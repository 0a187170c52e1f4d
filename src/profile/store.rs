//! The data collaborator capability the profile service is generic over.

use async_trait::async_trait;
use axum::http::StatusCode;
use std::fmt;
use thiserror::Error;

use super::models::{Credential, PatchOp, UserProfile};

/// Which unique column a rejected insert collided with.
///
/// Decided once, at the storage boundary, so the service never inspects
/// driver error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    Email,
    Username,
    Unknown,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => write!(f, "email"),
            Self::Username => write!(f, "username"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("duplicate {0} value")]
    Duplicate(ConflictKind),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence operations for profiles and their credentials.
///
/// `patch` and `delete_by_id` report their outcome as an HTTP-shaped status
/// code which the service wraps directly; the other operations return rows
/// or typed errors.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self) -> Result<Vec<UserProfile>, StoreError>;

    async fn get_by_id(&self, id: i32) -> Result<Option<UserProfile>, StoreError>;

    async fn get_by_username(&self, username: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Insert a profile and its credential, then return the freshly stored
    /// profile.
    async fn add(
        &self,
        profile: &UserProfile,
        credential: &Credential,
    ) -> Result<UserProfile, StoreError>;

    /// Persist a whole profile, returning the number of updated rows.
    async fn update(&self, profile: &UserProfile) -> Result<u64, StoreError>;

    async fn patch(&self, id: i32, ops: &[PatchOp]) -> Result<StatusCode, StoreError>;

    async fn delete_by_id(&self, id: i32) -> Result<StatusCode, StoreError>;

    async fn get_authentication(&self, user_id: i32) -> Result<Option<Credential>, StoreError>;
}
